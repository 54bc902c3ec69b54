use serde_json::{json, Value};
use shared::{matches_query, Resource, WorkflowStep};
use web_sys::{window, HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use crate::api;
use crate::components::record_dialog::RecordDialog;
use crate::components::status_badge::{badge_for, StatusBadge};
use crate::schema::{self, FieldKind};

#[derive(Clone, PartialEq)]
enum Dialog {
    Closed,
    New,
    Edit(Value),
}

fn list_url(resource: Resource, status: &str, include_archived: bool) -> String {
    let mut params = Vec::new();
    if !status.is_empty() {
        params.push(format!("status={}", status));
    }
    if include_archived {
        params.push("include_archived=true".to_string());
    }
    if params.is_empty() {
        resource.collection_path()
    } else {
        format!("{}?{}", resource.collection_path(), params.join("&"))
    }
}

fn record_id(record: &Value) -> Option<i32> {
    record
        .get("id")
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
}

/// Step a customer row sits on; the API serializes it as a snake_case key.
fn customer_step(record: &Value) -> Option<WorkflowStep> {
    serde_json::from_value(record.get("current_step")?.clone()).ok()
}

fn confirm(message: &str) -> bool {
    window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

#[derive(Properties, PartialEq)]
pub struct ResourcePageProps {
    pub resource: Resource,
}

/// List, search, create, edit and delete for one admin collection.
#[function_component(ResourcePage)]
pub fn resource_page(props: &ResourcePageProps) -> Html {
    let resource = props.resource;
    let records = use_state(Vec::<Value>::new);
    let loading = use_state(|| true);
    let error = use_state(|| None::<String>);
    let refresh_trigger = use_state(|| 0u32);
    let search = use_state(String::new);
    let status_filter = use_state(String::new);
    let include_archived = use_state(|| false);
    let dialog = use_state(|| Dialog::Closed);

    {
        let records = records.clone();
        let loading = loading.clone();
        let error = error.clone();
        let url = list_url(resource, &status_filter, *include_archived);

        use_effect_with((url, *refresh_trigger), move |(url, _)| {
            let url = url.clone();
            loading.set(true);
            wasm_bindgen_futures::spawn_local(async move {
                match api::get_json::<Vec<Value>>(&url).await {
                    Ok(data) => {
                        records.set(data);
                        error.set(None);
                    }
                    Err(e) => error.set(Some(e)),
                }
                loading.set(false);
            });
            || ()
        });
    }

    let refresh = {
        let refresh_trigger = refresh_trigger.clone();
        Callback::from(move |_: ()| refresh_trigger.set(*refresh_trigger + 1))
    };

    let on_search_input = {
        let search = search.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            search.set(input.value());
        })
    };

    let on_status_change = {
        let status_filter = status_filter.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            status_filter.set(select.value());
        })
    };

    let on_archived_toggle = {
        let include_archived = include_archived.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            include_archived.set(input.checked());
        })
    };

    let on_new_click = {
        let dialog = dialog.clone();
        Callback::from(move |_: MouseEvent| dialog.set(Dialog::New))
    };

    let on_dialog_close = {
        let dialog = dialog.clone();
        Callback::from(move |_| dialog.set(Dialog::Closed))
    };

    let on_saved = {
        let dialog = dialog.clone();
        let refresh = refresh.clone();
        Callback::from(move |_| {
            dialog.set(Dialog::Closed);
            refresh.emit(());
        })
    };

    let columns: Vec<_> = schema::fields(resource)
        .into_iter()
        .filter(|f| f.listed)
        .collect();

    let filtered: Vec<&Value> = records
        .iter()
        .filter(|r| {
            let text = schema::search_text(resource, r);
            let fields: Vec<&str> = text.iter().map(String::as_str).collect();
            matches_query(&fields, &search)
        })
        .collect();

    let statuses = resource.status_keys();

    let rows = filtered.iter().map(|record| {
        let record = (*record).clone();
        let id = record_id(&record);

        let on_edit = {
            let dialog = dialog.clone();
            let record = record.clone();
            Callback::from(move |_: MouseEvent| dialog.set(Dialog::Edit(record.clone())))
        };

        let on_delete = {
            let error = error.clone();
            let refresh = refresh.clone();
            Callback::from(move |_: MouseEvent| {
                let Some(id) = id else { return };
                if !confirm(&format!("Delete {} #{}?", resource.title(), id)) {
                    return;
                }
                let error = error.clone();
                let refresh = refresh.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    match api::delete(&resource.item_path(id)).await {
                        Ok(()) => refresh.emit(()),
                        Err(e) => error.set(Some(e)),
                    }
                });
            })
        };

        let step = if resource == Resource::Customers {
            customer_step(&record)
        } else {
            None
        };

        let advance_button = match (step.and_then(|s| s.next()), id) {
            (Some(next), Some(id)) => {
                let error = error.clone();
                let refresh = refresh.clone();
                let on_advance = Callback::from(move |_: MouseEvent| {
                    let error = error.clone();
                    let refresh = refresh.clone();
                    wasm_bindgen_futures::spawn_local(async move {
                        let url = format!("{}/advance", Resource::Customers.item_path(id));
                        let body = json!({ "step": next.number() });
                        match api::post_json(&url, &body).await {
                            Ok(()) => refresh.emit(()),
                            Err(e) => error.set(Some(e)),
                        }
                    });
                });
                html! {
                    <button type="button" class="btn btn-small" onclick={on_advance}
                        title={format!("Move to {}", next.as_str())}>
                        { "Advance" }
                    </button>
                }
            }
            _ => html! {},
        };

        let archived = record.get("archived").and_then(Value::as_bool).unwrap_or(false);

        html! {
            <tr class={classes!(archived.then_some("vendor-archived"))}>
                <td>{ id.map(|i| i.to_string()).unwrap_or_default() }</td>
                { for columns.iter().map(|f| {
                    let value = record.get(f.key);
                    match f.kind {
                        FieldKind::Select(schema::Choices::Status) => html! {
                            <td>{ badge_for(resource, &schema::cell_text(value)) }</td>
                        },
                        FieldKind::Select(choices) => {
                            let key = schema::cell_text(value);
                            let label = schema::choices(resource, choices)
                                .into_iter()
                                .find(|(k, _)| *k == key)
                                .map(|(_, label)| label.to_string())
                                .unwrap_or(key);
                            html! { <td>{ label }</td> }
                        }
                        _ => html! { <td>{ schema::cell_text(value) }</td> },
                    }
                })}
                if let Some(step) = step {
                    <td>
                        <StatusBadge
                            label={format!("{}. {}", step.number(), step.as_str())}
                            tone={step.tone()}
                        />
                    </td>
                }
                <td class="row-actions">
                    { advance_button }
                    <button type="button" class="btn btn-small" onclick={on_edit}>{ "Edit" }</button>
                    <button type="button" class="btn btn-small btn-danger" onclick={on_delete}>{ "Delete" }</button>
                </td>
            </tr>
        }
    });

    let dialog_html = match (*dialog).clone() {
        Dialog::Closed => html! {},
        Dialog::New => html! {
            <RecordDialog {resource} on_close={on_dialog_close} {on_saved} />
        },
        Dialog::Edit(record) => html! {
            <RecordDialog {resource} record={Some(record)} on_close={on_dialog_close} {on_saved} />
        },
    };

    html! {
        <main>
            <div class="page-header">
                <h2>{ resource.title() }</h2>
                <div class="header-actions">
                    <button type="button" class="btn btn-primary" onclick={on_new_click}>
                        { "+ New" }
                    </button>
                </div>
            </div>

            <div class="filters">
                <div class="filter-group">
                    <input type="search" placeholder="Search..." value={(*search).clone()} oninput={on_search_input} />
                </div>
                if !statuses.is_empty() {
                    <div class="filter-group">
                        <label>{ "Status:" }</label>
                        <select onchange={on_status_change}>
                            <option value="" selected={status_filter.is_empty()}>{ "All" }</option>
                            { for statuses.iter().map(|key| {
                                let label = resource.badge(key).map(|(l, _)| l).unwrap_or(*key);
                                html! {
                                    <option value={*key} selected={*status_filter == *key}>{ label }</option>
                                }
                            })}
                        </select>
                    </div>
                }
                if resource == Resource::Vendors {
                    <div class="filter-group">
                        <label>
                            <input type="checkbox" checked={*include_archived} onchange={on_archived_toggle} />
                            { " Show archived" }
                        </label>
                    </div>
                }
            </div>

            if let Some(err) = (*error).clone() {
                <p class="error">{ err }</p>
            }

            { dialog_html }

            if *loading {
                <p>{ "Loading..." }</p>
            } else if records.is_empty() {
                <p>{ format!("No {} yet. Click '+ New' to add one.", resource.title().to_lowercase()) }</p>
            } else if filtered.is_empty() {
                <p>{ "Nothing matches the current search." }</p>
            } else {
                <table class="table records-table">
                    <thead>
                        <tr>
                            <th>{ "ID" }</th>
                            { for columns.iter().map(|f| html! { <th>{ f.label }</th> }) }
                            if resource == Resource::Customers {
                                <th>{ "Step" }</th>
                            }
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        { for rows }
                    </tbody>
                </table>
            }
        </main>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_url_carries_filters() {
        assert_eq!(
            list_url(Resource::Vendors, "", false),
            "/api/admin/vendors"
        );
        assert_eq!(
            list_url(Resource::Vendors, "", true),
            "/api/admin/vendors?include_archived=true"
        );
        assert_eq!(
            list_url(Resource::GoodsDeliveries, "delivered", false),
            "/api/admin/goods-deliveries?status=delivered"
        );
    }

    #[test]
    fn reads_customer_step_key() {
        let row = json!({"id": 4, "current_step": "loan_approval"});
        assert_eq!(customer_step(&row), Some(WorkflowStep::LoanApproval));
        assert_eq!(record_id(&row), Some(4));
        assert_eq!(customer_step(&json!({"id": 4})), None);
    }
}
