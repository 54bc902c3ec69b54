use shared::SubsidyEstimate;
use yew::prelude::*;

/// Rupees with Indian digit grouping, rounded to whole rupees: `1,95,000`.
pub fn format_inr(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, last3) = digits.split_at(digits.len() - 3);
        let mut parts: Vec<&str> = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (left, pair) = rest.split_at(rest.len() - 2);
            parts.push(pair);
            rest = left;
        }
        parts.push(rest);
        parts.reverse();
        format!("{},{}", parts.join(","), last3)
    };

    if negative {
        format!("-\u{20b9}{}", grouped)
    } else {
        format!("\u{20b9}{}", grouped)
    }
}

#[derive(Properties, PartialEq)]
pub struct EstimateCardProps {
    pub estimate: Option<SubsidyEstimate>,
    /// Cost lines only, for inline use in forms.
    #[prop_or(false)]
    pub compact: bool,
}

#[function_component(EstimateCard)]
pub fn estimate_card(props: &EstimateCardProps) -> Html {
    let Some(est) = props.estimate.as_ref() else {
        return html! {
            <div class="estimate-card estimate-empty">
                <p>{ "Enter a capacity above zero to see an estimate." }</p>
            </div>
        };
    };

    let row = |label: &str, value: String| {
        html! {
            <tr>
                <th>{ label.to_string() }</th>
                <td>{ value }</td>
            </tr>
        }
    };

    html! {
        <div class="estimate-card">
            <table class="table estimate-table">
                <tbody>
                    { row("Total cost", format_inr(est.total_cost)) }
                    { row("Central subsidy", format_inr(est.subsidy)) }
                    { row("Net cost", format_inr(est.net_cost)) }
                    { row(&format!("EMI ({} months)", est.loan_term_months), format_inr(est.emi)) }
                    if !props.compact {
                        { row("Generation / day", format!("{:.1} units", est.daily_units)) }
                        { row("Generation / month", format!("{:.0} units", est.monthly_units)) }
                        { row("Generation / year", format!("{:.0} units", est.annual_units)) }
                        { row("Savings / month", format_inr(est.monthly_savings)) }
                        { row("Savings / year", format_inr(est.annual_savings)) }
                        { row("Payback", match est.payback_years {
                            Some(years) => format!("{:.1} years", years),
                            None => "-".to_string(),
                        }) }
                    }
                </tbody>
            </table>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_lakhs_and_crores() {
        assert_eq!(format_inr(0.0), "\u{20b9}0");
        assert_eq!(format_inr(950.4), "\u{20b9}950");
        assert_eq!(format_inr(78_000.0), "\u{20b9}78,000");
        assert_eq!(format_inr(195_000.0), "\u{20b9}1,95,000");
        assert_eq!(format_inr(12_345_678.0), "\u{20b9}1,23,45,678");
        assert_eq!(format_inr(-2_485.9), "-\u{20b9}2,486");
    }
}
