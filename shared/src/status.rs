use serde::{Deserialize, Serialize};

/// Colour family a status badge is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTone {
    Neutral,
    Info,
    Success,
    Warning,
    Danger,
}

impl BadgeTone {
    /// CSS modifier class used by the frontend.
    pub fn css_class(&self) -> &'static str {
        match self {
            BadgeTone::Neutral => "badge badge-neutral",
            BadgeTone::Info => "badge badge-info",
            BadgeTone::Success => "badge badge-success",
            BadgeTone::Warning => "badge badge-warning",
            BadgeTone::Danger => "badge badge-danger",
        }
    }
}

/// Declares a record status enum stored as a snake_case key.
///
/// Each variant lists `(key, label, tone)`: the key is the wire and database
/// form, the label is what the tables display.
macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => ($key:literal, $label:literal, $tone:ident)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $key)] $variant),+
        }

        impl $name {
            pub fn key(&self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn tone(&self) -> BadgeTone {
                match self {
                    $($name::$variant => BadgeTone::$tone),+
                }
            }

            pub fn from_key(key: &str) -> Option<Self> {
                match key {
                    $($key => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn all() -> &'static [$name] {
                &[$($name::$variant),+]
            }
        }
    };
}

status_enum! {
    pub enum SurveyStatus {
        Scheduled => ("scheduled", "Scheduled", Info),
        Completed => ("completed", "Completed", Success),
        Rejected => ("rejected", "Rejected", Danger),
    }
}

status_enum! {
    pub enum LoanApprovalStatus {
        Pending => ("pending", "Pending", Warning),
        Approved => ("approved", "Approved", Success),
        Rejected => ("rejected", "Rejected", Danger),
    }
}

status_enum! {
    pub enum DisbursementStatus {
        Pending => ("pending", "Pending", Warning),
        Disbursed => ("disbursed", "Disbursed", Success),
        Failed => ("failed", "Failed", Danger),
    }
}

status_enum! {
    pub enum DeliveryStatus {
        Pending => ("pending", "Pending", Warning),
        Dispatched => ("dispatched", "Dispatched", Info),
        Delivered => ("delivered", "Delivered", Success),
        Returned => ("returned", "Returned", Danger),
    }
}

status_enum! {
    pub enum ExecutionStatus {
        Assigned => ("assigned", "Assigned", Neutral),
        InProgress => ("in_progress", "In Progress", Info),
        Completed => ("completed", "Completed", Success),
        Cancelled => ("cancelled", "Cancelled", Danger),
    }
}

status_enum! {
    pub enum MeterStatus {
        Pending => ("pending", "Pending", Warning),
        Installed => ("installed", "Installed", Info),
        Verified => ("verified", "Verified", Success),
    }
}

status_enum! {
    pub enum PortalStatus {
        Submitted => ("submitted", "Submitted", Neutral),
        UnderReview => ("under_review", "Under Review", Info),
        Approved => ("approved", "Approved", Success),
        Rejected => ("rejected", "Rejected", Danger),
    }
}

status_enum! {
    pub enum SubsidyStatus {
        Pending => ("pending", "Pending", Warning),
        Released => ("released", "Released", Info),
        Credited => ("credited", "Credited", Success),
        Rejected => ("rejected", "Rejected", Danger),
    }
}

status_enum! {
    pub enum MeterType {
        Net => ("net", "Net Meter", Neutral),
        Bidirectional => ("bidirectional", "Bi-directional", Neutral),
    }
}

status_enum! {
    /// Roles carried in session claims.
    pub enum Role {
        Admin => ("admin", "Admin", Info),
        Ddp => ("ddp", "District Development Partner", Neutral),
        Bdp => ("bdp", "Business Development Partner", Neutral),
        CustomerPartner => ("customer_partner", "Customer Partner", Neutral),
    }
}

status_enum! {
    pub enum PartnerRole {
        Bdp => ("bdp", "BDP", Info),
        Ddp => ("ddp", "DDP", Info),
        CustomerPartner => ("customer_partner", "Customer Partner", Neutral),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_round_trip {
        ($($name:ident),+ $(,)?) => {
            $(
                assert!(!$name::all().is_empty(), stringify!($name));
                for v in $name::all() {
                    assert_eq!($name::from_key(v.key()), Some(*v), stringify!($name));
                    assert!(!v.as_str().is_empty());
                    let json = serde_json::to_string(v).unwrap();
                    assert_eq!(json, format!("\"{}\"", v.key()));
                }
            )+
        };
    }

    #[test]
    fn keys_round_trip_for_every_variant() {
        assert_round_trip!(
            SurveyStatus,
            LoanApprovalStatus,
            DisbursementStatus,
            DeliveryStatus,
            ExecutionStatus,
            MeterStatus,
            PortalStatus,
            SubsidyStatus,
            MeterType,
            Role,
            PartnerRole,
        );
    }

    #[test]
    fn serde_uses_the_key() {
        let json = serde_json::to_string(&PortalStatus::UnderReview).unwrap();
        assert_eq!(json, "\"under_review\"");
        let back: PortalStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PortalStatus::UnderReview);
    }

    #[test]
    fn unknown_key_is_none() {
        assert_eq!(SubsidyStatus::from_key("paid"), None);
    }

    #[test]
    fn tones_follow_outcome() {
        assert_eq!(SubsidyStatus::Credited.tone(), BadgeTone::Success);
        assert_eq!(DeliveryStatus::Returned.tone(), BadgeTone::Danger);
        assert_eq!(LoanApprovalStatus::Pending.tone(), BadgeTone::Warning);
        assert_eq!(BadgeTone::Info.css_class(), "badge badge-info");
    }
}
