use shared::{estimate_from_input, PanelType};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use crate::components::estimate_card::EstimateCard;

/// Stand-alone subsidy and EMI calculator. Runs entirely in the browser.
#[function_component(Calculator)]
pub fn calculator() -> Html {
    let capacity = use_state(|| "3".to_string());
    let panel_type = use_state(|| PanelType::Dcr);

    let on_capacity_input = {
        let capacity = capacity.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            capacity.set(input.value());
        })
    };

    let on_panel_change = {
        let panel_type = panel_type.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            if let Some(p) = PanelType::from_key(&select.value()) {
                panel_type.set(p);
            }
        })
    };

    let estimate = estimate_from_input(&capacity, *panel_type);

    html! {
        <main>
            <div class="page-header">
                <h2>{ "Subsidy Calculator" }</h2>
            </div>
            <div class="calculator-form">
                <div class="form-group">
                    <label for="calc-capacity">{ "System capacity (kW)" }</label>
                    <input
                        id="calc-capacity"
                        type="number"
                        min="0"
                        step="0.5"
                        value={(*capacity).clone()}
                        oninput={on_capacity_input}
                    />
                </div>
                <div class="form-group">
                    <label for="calc-panel">{ "Panel type" }</label>
                    <select id="calc-panel" onchange={on_panel_change}>
                        { for PanelType::all().iter().map(|p| html! {
                            <option value={p.key()} selected={*p == *panel_type}>{ p.as_str() }</option>
                        })}
                    </select>
                </div>
            </div>
            <EstimateCard estimate={estimate} />
            if *panel_type == PanelType::NonDcr {
                <p class="muted">{ "Non-DCR panels are not eligible for the central subsidy." }</p>
            }
        </main>
    }
}
