//! Rooftop solar cost, subsidy and EMI estimation.
//!
//! Everything here is a closed-form calculation over [`SubsidyRates`]. A
//! capacity that is not a positive finite number yields `None`, which callers
//! render as "no estimate".

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelType {
    /// Domestic Content Requirement panels, eligible for central subsidy.
    Dcr,
    NonDcr,
}

impl PanelType {
    pub fn key(&self) -> &'static str {
        match self {
            PanelType::Dcr => "dcr",
            PanelType::NonDcr => "non_dcr",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PanelType::Dcr => "DCR",
            PanelType::NonDcr => "Non-DCR",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "dcr" => Some(PanelType::Dcr),
            "non_dcr" => Some(PanelType::NonDcr),
            _ => None,
        }
    }

    pub fn all() -> &'static [PanelType] {
        &[PanelType::Dcr, PanelType::NonDcr]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsidyRates {
    /// Central subsidy per kW for the first tier.
    pub tier1_rate_per_kw: f64,
    pub tier1_limit_kw: f64,
    /// Central subsidy per kW between the first and second tier limits.
    pub tier2_rate_per_kw: f64,
    pub tier2_limit_kw: f64,
    pub max_subsidy: f64,
    /// DCR system cost per kW, hybrid inverter included.
    pub dcr_cost_per_kw: f64,
    pub non_dcr_cost_per_kw: f64,
    pub units_per_kw_per_day: f64,
    pub tariff_per_unit: f64,
    pub days_per_month: f64,
    pub annual_interest_rate: f64,
    pub loan_term_months: u32,
}

impl Default for SubsidyRates {
    fn default() -> Self {
        Self {
            tier1_rate_per_kw: 30_000.0,
            tier1_limit_kw: 2.0,
            tier2_rate_per_kw: 18_000.0,
            tier2_limit_kw: 3.0,
            max_subsidy: 78_000.0,
            dcr_cost_per_kw: 65_000.0,
            non_dcr_cost_per_kw: 55_000.0,
            units_per_kw_per_day: 4.0,
            tariff_per_unit: 7.0,
            days_per_month: 30.0,
            annual_interest_rate: 0.10,
            loan_term_months: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsidyEstimate {
    pub capacity_kw: f64,
    pub panel_type: PanelType,
    pub total_cost: f64,
    pub subsidy: f64,
    pub net_cost: f64,
    pub daily_units: f64,
    pub monthly_units: f64,
    pub annual_units: f64,
    pub monthly_savings: f64,
    pub annual_savings: f64,
    pub emi: f64,
    pub loan_term_months: u32,
    /// `None` when the system produces no savings.
    pub payback_years: Option<f64>,
}

/// Estimate with the scheme's published rates.
pub fn estimate(capacity_kw: f64, panel_type: PanelType) -> Option<SubsidyEstimate> {
    SubsidyRates::default().estimate(capacity_kw, panel_type)
}

/// Estimate from raw form input; anything that is not a positive number is
/// treated as "no estimate".
pub fn estimate_from_input(capacity: &str, panel_type: PanelType) -> Option<SubsidyEstimate> {
    let capacity_kw: f64 = capacity.trim().parse().ok()?;
    estimate(capacity_kw, panel_type)
}

impl SubsidyRates {
    pub fn estimate(&self, capacity_kw: f64, panel_type: PanelType) -> Option<SubsidyEstimate> {
        if !capacity_kw.is_finite() || capacity_kw <= 0.0 {
            return None;
        }

        let total_cost = capacity_kw * self.cost_per_kw(panel_type);
        let subsidy = self.subsidy(capacity_kw, panel_type);
        let net_cost = (total_cost - subsidy).max(0.0);

        let daily_units = capacity_kw * self.units_per_kw_per_day;
        let monthly_units = daily_units * self.days_per_month;
        let annual_units = monthly_units * 12.0;
        let monthly_savings = monthly_units * self.tariff_per_unit;
        let annual_savings = monthly_savings * 12.0;

        let emi = self.emi(net_cost);
        // Capacities near f64::MAX overflow the derived figures.
        if ![total_cost, net_cost, annual_savings, emi].iter().all(|x| x.is_finite()) {
            return None;
        }

        let payback_years = if annual_savings > 0.0 {
            Some(net_cost / annual_savings)
        } else {
            None
        };

        Some(SubsidyEstimate {
            capacity_kw,
            panel_type,
            total_cost,
            subsidy,
            net_cost,
            daily_units,
            monthly_units,
            annual_units,
            monthly_savings,
            annual_savings,
            emi,
            loan_term_months: self.loan_term_months,
            payback_years,
        })
    }

    pub fn cost_per_kw(&self, panel_type: PanelType) -> f64 {
        match panel_type {
            PanelType::Dcr => self.dcr_cost_per_kw,
            PanelType::NonDcr => self.non_dcr_cost_per_kw,
        }
    }

    /// Tiered central subsidy. Only DCR systems qualify.
    pub fn subsidy(&self, capacity_kw: f64, panel_type: PanelType) -> f64 {
        if panel_type == PanelType::NonDcr || capacity_kw <= 0.0 {
            return 0.0;
        }
        let tier1_kw = capacity_kw.min(self.tier1_limit_kw);
        let tier2_kw = (capacity_kw - self.tier1_limit_kw)
            .clamp(0.0, self.tier2_limit_kw - self.tier1_limit_kw);
        let raw = tier1_kw * self.tier1_rate_per_kw + tier2_kw * self.tier2_rate_per_kw;
        raw.min(self.max_subsidy)
    }

    /// Fixed-rate amortized monthly instalment over `loan_term_months`.
    pub fn emi(&self, principal: f64) -> f64 {
        let n = self.loan_term_months as i32;
        if principal <= 0.0 || n == 0 {
            return 0.0;
        }
        let r = self.annual_interest_rate / 12.0;
        if r == 0.0 {
            return principal / n as f64;
        }
        let growth = (1.0 + r).powi(n);
        principal * r * growth / (growth - 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6 * b.abs().max(1.0)
    }

    #[test]
    fn non_positive_capacity_has_no_estimate() {
        assert_eq!(estimate(0.0, PanelType::Dcr), None);
        assert_eq!(estimate(-2.0, PanelType::NonDcr), None);
        assert_eq!(estimate(f64::NAN, PanelType::Dcr), None);
        assert_eq!(estimate(f64::INFINITY, PanelType::Dcr), None);
    }

    #[test]
    fn overflowing_capacity_has_no_estimate() {
        assert_eq!(estimate(1e305, PanelType::Dcr), None);
        assert_eq!(estimate(f64::MAX, PanelType::NonDcr), None);

        let e = estimate(1e9, PanelType::Dcr).unwrap();
        assert!(e.annual_savings > 0.0);
        let payback = e.payback_years.unwrap();
        assert!(payback.is_finite() && payback >= 0.0);
    }

    #[test]
    fn unparseable_input_has_no_estimate() {
        assert_eq!(estimate_from_input("", PanelType::Dcr), None);
        assert_eq!(estimate_from_input("three", PanelType::Dcr), None);
        assert_eq!(estimate_from_input("0", PanelType::Dcr), None);
        assert!(estimate_from_input(" 3 ", PanelType::Dcr).is_some());
    }

    #[test]
    fn dcr_three_kw_reaches_max_subsidy() {
        let e = estimate(3.0, PanelType::Dcr).unwrap();
        assert_eq!(e.subsidy, 78_000.0);
        assert_eq!(e.total_cost, 195_000.0);
        assert_eq!(e.net_cost, e.total_cost - 78_000.0);
    }

    #[test]
    fn dcr_two_kw_uses_first_tier_only() {
        let e = estimate(2.0, PanelType::Dcr).unwrap();
        assert_eq!(e.subsidy, 2.0 * 30_000.0);
    }

    #[test]
    fn dcr_subsidy_is_capped_above_three_kw() {
        let e = estimate(5.0, PanelType::Dcr).unwrap();
        assert_eq!(e.subsidy, 78_000.0);
        let half = estimate(2.5, PanelType::Dcr).unwrap();
        assert_eq!(half.subsidy, 60_000.0 + 9_000.0);
    }

    #[test]
    fn non_dcr_has_no_subsidy() {
        for kw in 6..=10 {
            let e = estimate(kw as f64, PanelType::NonDcr).unwrap();
            assert_eq!(e.subsidy, 0.0);
            assert_eq!(e.total_cost, kw as f64 * 55_000.0);
            assert_eq!(e.net_cost, e.total_cost);
        }
    }

    #[test]
    fn generation_figures_are_consistent() {
        let e = estimate(4.0, PanelType::Dcr).unwrap();
        assert_eq!(e.daily_units, 16.0);
        assert_eq!(e.monthly_units, e.daily_units * 30.0);
        assert_eq!(e.annual_units, e.monthly_units * 12.0);
        assert_eq!(e.monthly_savings, e.monthly_units * 7.0);
        assert_eq!(e.annual_savings, e.monthly_savings * 12.0);
    }

    #[test]
    fn emi_satisfies_amortization_identity() {
        let rates = SubsidyRates::default();
        let principal = 117_000.0;
        let emi = rates.emi(principal);
        let r: f64 = 0.10 / 12.0;

        // Discounting every instalment back to today recovers the principal.
        let present_value: f64 = (1..=60).map(|k| emi / (1.0 + r).powi(k)).sum();
        assert!(close(present_value, principal));

        // Total repaid exceeds principal by the interest over five years.
        let total = emi * 60.0;
        assert!(total > principal);
        assert!((emi - 2_485.9).abs() < 0.1);
    }

    #[test]
    fn emi_of_zero_principal_is_zero() {
        assert_eq!(SubsidyRates::default().emi(0.0), 0.0);
    }

    #[test]
    fn zero_interest_splits_evenly() {
        let rates = SubsidyRates {
            annual_interest_rate: 0.0,
            ..SubsidyRates::default()
        };
        assert_eq!(rates.emi(6_000.0), 100.0);
    }

    #[test]
    fn payback_is_net_cost_over_annual_savings() {
        let e = estimate(3.0, PanelType::Dcr).unwrap();
        let payback = e.payback_years.unwrap();
        assert!(payback.is_finite() && payback >= 0.0);
        assert!(close(payback, e.net_cost / e.annual_savings));
    }

    #[test]
    fn payback_is_none_without_savings() {
        let rates = SubsidyRates {
            tariff_per_unit: 0.0,
            ..SubsidyRates::default()
        };
        let e = rates.estimate(3.0, PanelType::Dcr).unwrap();
        assert_eq!(e.payback_years, None);
    }

    #[test]
    fn net_cost_never_negative() {
        let rates = SubsidyRates {
            dcr_cost_per_kw: 10_000.0,
            ..SubsidyRates::default()
        };
        let e = rates.estimate(3.0, PanelType::Dcr).unwrap();
        assert_eq!(e.net_cost, 0.0);
        assert_eq!(e.emi, 0.0);
        assert_eq!(e.payback_years, Some(0.0));
    }

    #[test]
    fn panel_type_keys() {
        for p in PanelType::all() {
            assert_eq!(PanelType::from_key(p.key()), Some(*p));
        }
        assert_eq!(
            serde_json::to_string(&PanelType::NonDcr).unwrap(),
            "\"non_dcr\""
        );
    }
}
