use chrono::{DateTime, Utc};
use gloo_storage::{LocalStorage, Storage};
use js_sys::{Date, Object, Reflect};
use shared::{WorkflowEventResponse, WorkflowStep};
use wasm_bindgen::JsValue;
use yew::prelude::*;

use crate::api;

const STORAGE_KEY: &str = "activity_last_viewed";

fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let js_date = Date::new(&JsValue::from_f64(dt.timestamp_millis() as f64));
    let options = Object::new();
    let _ = Reflect::set(&options, &"month".into(), &"short".into());
    let _ = Reflect::set(&options, &"day".into(), &"numeric".into());
    let _ = Reflect::set(&options, &"hour".into(), &"2-digit".into());
    let _ = Reflect::set(&options, &"minute".into(), &"2-digit".into());

    js_date
        .to_locale_string("default", &options)
        .as_string()
        .unwrap_or_else(|| dt.format("%b %d %H:%M").to_string())
}

fn activity_url(since: &str) -> String {
    if since.is_empty() {
        "/api/admin/activity?limit=50".to_string()
    } else {
        format!(
            "/api/admin/activity?since={}&limit=50",
            js_sys::encode_uri_component(since)
        )
    }
}

#[derive(Properties, PartialEq)]
pub struct ActivitySidebarProps {
    pub on_select_customer: Callback<i32>,
    pub refresh_trigger: u32,
}

/// Workflow changes since this browser last looked.
#[function_component(ActivitySidebar)]
pub fn activity_sidebar(props: &ActivitySidebarProps) -> Html {
    let entries = use_state(Vec::<WorkflowEventResponse>::new);
    let loading = use_state(|| true);

    {
        let entries = entries.clone();
        let loading = loading.clone();
        let refresh = props.refresh_trigger;

        use_effect_with(refresh, move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                let since: String =
                    LocalStorage::get(STORAGE_KEY).unwrap_or_else(|_| String::new());

                match api::get_json::<Vec<WorkflowEventResponse>>(&activity_url(&since)).await {
                    Ok(data) => entries.set(data),
                    Err(e) => log::warn!("activity feed unavailable: {}", e),
                }

                let now = Utc::now().to_rfc3339();
                let _ = LocalStorage::set(STORAGE_KEY, now);

                loading.set(false);
            });
            || ()
        });
    }

    let entry_count = entries.len();

    let activity_content = if *loading {
        html! { <p class="activity-empty">{ "Loading..." }</p> }
    } else if entries.is_empty() {
        html! { <p class="activity-empty">{ "No step changes since your last visit." }</p> }
    } else {
        html! {
            <ul class="activity-list">
                { for entries.iter().map(|entry| {
                    let on_click = {
                        let on_select = props.on_select_customer.clone();
                        let id = entry.customer_id;
                        Callback::from(move |_: MouseEvent| on_select.emit(id))
                    };

                    let tone = WorkflowStep::from_number(entry.step)
                        .map(|s| s.tone().css_class())
                        .unwrap_or("badge badge-neutral");

                    html! {
                        <li class="activity-entry" onclick={on_click}>
                            <div class="activity-entry-header">
                                <span class="activity-customer">{ &entry.customer_name }</span>
                                <span class="activity-time">{ format_relative_time(&entry.changed_at) }</span>
                            </div>
                            <div class="activity-step">
                                <span class={tone}>{ format!("Step {}", entry.step) }</span>
                                { " " }
                                { &entry.step_label }
                            </div>
                            if let Some(comment) = entry.comment.as_ref() {
                                <div class="activity-detail">{ comment }</div>
                            }
                        </li>
                    }
                })}
            </ul>
        }
    };

    let on_clear = {
        let entries = entries.clone();
        Callback::from(move |_: MouseEvent| {
            let _ = LocalStorage::set(STORAGE_KEY, Utc::now().to_rfc3339());
            entries.set(Vec::new());
        })
    };

    html! {
        <aside class="activity-sidebar">
            <details class="activity-panel" open={true}>
                <summary>
                    { "Workflow activity" }
                    if entry_count > 0 {
                        <span class="activity-count">{ entry_count }</span>
                    }
                </summary>
                { activity_content }
                if entry_count > 0 {
                    <button class="btn btn-small" onclick={on_clear}>{ "Mark all seen" }</button>
                }
            </details>
        </aside>
    }
}
