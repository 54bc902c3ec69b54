use shared::{CustomerProgress, DashboardResponse, WorkflowStep};
use yew::prelude::*;

use crate::api;
use crate::components::activity_sidebar::ActivitySidebar;
use crate::components::status_badge::StatusBadge;

#[derive(Properties, PartialEq)]
struct ProgressPanelProps {
    customer_id: i32,
    on_close: Callback<()>,
}

#[function_component(ProgressPanel)]
fn progress_panel(props: &ProgressPanelProps) -> Html {
    let progress = use_state(|| None::<Result<CustomerProgress, String>>);

    {
        let progress = progress.clone();
        use_effect_with(props.customer_id, move |id| {
            let url = format!("/api/ddp/customers/{}/progress", id);
            wasm_bindgen_futures::spawn_local(async move {
                progress.set(Some(api::get_json::<CustomerProgress>(&url).await));
            });
            || ()
        });
    }

    let body = match (*progress).clone() {
        None => html! { <p>{ "Loading..." }</p> },
        Some(Err(e)) => html! { <p class="error">{ e }</p> },
        Some(Ok(p)) => {
            let tone = WorkflowStep::from_number(p.current_step)
                .map(|s| s.tone())
                .unwrap_or(shared::BadgeTone::Neutral);
            html! {
                <>
                    <h3>{ &p.customer_name }</h3>
                    <p>
                        <StatusBadge label={format!("Step {}", p.current_step)} tone={tone} />
                        { " " }
                        { &p.current_label }
                    </p>
                    <progress max="1" value={p.progress.to_string()} />
                    <p class="muted">
                        { match p.next_label.as_deref() {
                            Some(next) => format!("Next: {}", next),
                            None => "Workflow complete".to_string(),
                        } }
                    </p>
                </>
            }
        }
    };

    let on_close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };

    html! {
        <div class="progress-panel">
            <button class="btn-close" onclick={on_close}>{ "\u{00d7}" }</button>
            { body }
        </div>
    }
}

#[function_component(Dashboard)]
pub fn dashboard() -> Html {
    let data = use_state(|| None::<DashboardResponse>);
    let error = use_state(|| None::<String>);
    let selected_customer = use_state(|| None::<i32>);

    {
        let data = data.clone();
        let error = error.clone();
        use_effect_with((), move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                match api::get_json::<DashboardResponse>("/api/admin/dashboard").await {
                    Ok(d) => data.set(Some(d)),
                    Err(e) => error.set(Some(e)),
                }
            });
            || ()
        });
    }

    let on_select_customer = {
        let selected_customer = selected_customer.clone();
        Callback::from(move |id: i32| selected_customer.set(Some(id)))
    };

    let on_progress_close = {
        let selected_customer = selected_customer.clone();
        Callback::from(move |_| selected_customer.set(None))
    };

    let pipeline = match (*data).as_ref() {
        None => html! { <p>{ "Loading..." }</p> },
        Some(d) => {
            let widest = d.steps.iter().map(|s| s.customers).max().unwrap_or(0).max(1);
            html! {
                <>
                    <p class="dashboard-total">{ format!("{} customers", d.total_customers) }</p>
                    <table class="table pipeline-table">
                        <tbody>
                            { for d.steps.iter().map(|s| {
                                let width = s.customers as f64 / widest as f64 * 100.0;
                                html! {
                                    <tr>
                                        <td class="step-number">{ s.step }</td>
                                        <td>{ &s.label }</td>
                                        <td class="step-bar-cell">
                                            <div class="step-bar" style={format!("width: {:.0}%", width)} />
                                        </td>
                                        <td class="step-count">{ s.customers }</td>
                                    </tr>
                                }
                            })}
                        </tbody>
                    </table>
                </>
            }
        }
    };

    html! {
        <div class="dashboard-layout">
            <main>
                <div class="page-header">
                    <h2>{ "Pipeline" }</h2>
                </div>
                if let Some(err) = (*error).clone() {
                    <p class="error">{ err }</p>
                }
                if let Some(id) = *selected_customer {
                    <ProgressPanel customer_id={id} on_close={on_progress_close} />
                }
                { pipeline }
            </main>
            <ActivitySidebar on_select_customer={on_select_customer} refresh_trigger={0} />
        </div>
    }
}
