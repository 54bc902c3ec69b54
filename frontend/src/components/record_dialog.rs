use serde_json::Value;
use shared::{estimate_from_input, PanelType, Resource};
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::api;
use crate::components::date_input::DateInput;
use crate::components::estimate_card::EstimateCard;
use crate::schema::{self, Field, FieldKind, FormState};

#[derive(Properties, PartialEq)]
pub struct RecordDialogProps {
    pub resource: Resource,
    /// The record being edited; `None` opens an empty create form.
    #[prop_or_default]
    pub record: Option<Value>,
    pub on_close: Callback<()>,
    pub on_saved: Callback<()>,
}

fn record_id(record: &Option<Value>) -> Option<i32> {
    record
        .as_ref()
        .and_then(|r| r.get("id"))
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
}

#[function_component(RecordDialog)]
pub fn record_dialog(props: &RecordDialogProps) -> Html {
    let resource = props.resource;
    let editing_id = record_id(&props.record);
    let form = {
        let record = props.record.clone();
        use_state(move || schema::form_state(resource, record.as_ref()))
    };
    let error = use_state(|| None::<String>);
    let submitting = use_state(|| false);

    let set_field = {
        let form = form.clone();
        Callback::from(move |(key, value): (&'static str, String)| {
            let mut next: FormState = (*form).clone();
            next.insert(key, value);
            form.set(next);
        })
    };

    let on_submit = {
        let form = form.clone();
        let error = error.clone();
        let submitting = submitting.clone();
        let on_saved = props.on_saved.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();

            let body = match schema::payload(resource, &form, editing_id.is_some()) {
                Ok(body) => body,
                Err(msg) => {
                    error.set(Some(msg));
                    return;
                }
            };

            let error = error.clone();
            let submitting = submitting.clone();
            let on_saved = on_saved.clone();
            submitting.set(true);
            error.set(None);

            wasm_bindgen_futures::spawn_local(async move {
                let result = match editing_id {
                    Some(id) => api::patch_json(&resource.item_path(id), &body).await,
                    None => api::post_json(&resource.collection_path(), &body).await,
                };
                submitting.set(false);
                match result {
                    Ok(()) => on_saved.emit(()),
                    Err(msg) => error.set(Some(msg)),
                }
            });
        })
    };

    let on_backdrop_click = {
        let on_close = props.on_close.clone();
        Callback::from(move |_| on_close.emit(()))
    };
    let on_modal_click = Callback::from(|e: MouseEvent| e.stop_propagation());

    let inputs = schema::fields(resource)
        .into_iter()
        .filter(|f| !(editing_id.is_none() && f.edit_only))
        .map(|f| {
            let value = form.get(f.key).cloned().unwrap_or_default();
            let disabled = editing_id.is_some() && f.create_only;
            field_input(resource, f, value, disabled, set_field.clone())
        })
        .collect::<Html>();

    // Customers get a live subsidy estimate while capacity is typed
    let estimate = if resource == Resource::Customers {
        let capacity = form.get("proposed_capacity_kw").cloned().unwrap_or_default();
        let panel = form
            .get("panel_type")
            .and_then(|p| PanelType::from_key(p))
            .unwrap_or(PanelType::Dcr);
        html! { <EstimateCard estimate={estimate_from_input(&capacity, panel)} compact=true /> }
    } else {
        html! {}
    };

    let title = match editing_id {
        Some(id) => format!("Edit {} #{}", resource.title(), id),
        None => format!("New {}", resource.title()),
    };

    html! {
        <div class="modal-backdrop" onclick={on_backdrop_click}>
            <div class="modal" onclick={on_modal_click}>
                <div class="modal-header">
                    <h2>{ title }</h2>
                    <button class="btn-close" onclick={
                        let on_close = props.on_close.clone();
                        Callback::from(move |_: MouseEvent| on_close.emit(()))
                    }>{ "\u{00d7}" }</button>
                </div>

                <form class="modal-body record-form" onsubmit={on_submit}>
                    if let Some(err) = (*error).clone() {
                        <p class="error">{ err }</p>
                    }
                    { inputs }
                    { estimate }
                    <div class="form-actions">
                        <button type="button" class="btn" onclick={
                            let on_close = props.on_close.clone();
                            Callback::from(move |_: MouseEvent| on_close.emit(()))
                        }>{ "Cancel" }</button>
                        <button type="submit" class="btn btn-primary" disabled={*submitting}>
                            { if *submitting { "Saving..." } else { "Save" } }
                        </button>
                    </div>
                </form>
            </div>
        </div>
    }
}

fn field_input(
    resource: Resource,
    f: Field,
    value: String,
    disabled: bool,
    set_field: Callback<(&'static str, String)>,
) -> Html {
    let key = f.key;
    let id = format!("field-{}", key);
    let label = html! {
        <label for={id.clone()}>
            { f.label }
            if f.required { <span class="required">{ " *" }</span> }
        </label>
    };

    match f.kind {
        FieldKind::Date => html! {
            <DateInput
                id={id}
                label={f.label}
                value={value}
                required={f.required}
                disabled={disabled}
                onchange={set_field.reform(move |v| (key, v))}
            />
        },
        FieldKind::Checkbox => {
            let checked = value == "true";
            let onchange = set_field.reform(move |e: Event| {
                let input: HtmlInputElement = e.target_unchecked_into();
                (key, input.checked().to_string())
            });
            html! {
                <div class="form-group form-check">
                    <input type="checkbox" id={id.clone()} checked={checked} {onchange} disabled={disabled} />
                    <label for={id}>{ f.label }</label>
                </div>
            }
        }
        FieldKind::Select(choices) => {
            let onchange = set_field.reform(move |e: Event| {
                let select: HtmlSelectElement = e.target_unchecked_into();
                (key, select.value())
            });
            html! {
                <div class="form-group">
                    { label }
                    <select id={id} {onchange} disabled={disabled}>
                        if !f.required {
                            <option value="" selected={value.is_empty()}>{ "-" }</option>
                        }
                        { for schema::choices(resource, choices).into_iter().map(|(k, text)| html! {
                            <option value={k} selected={value == k}>{ text }</option>
                        })}
                    </select>
                </div>
            }
        }
        FieldKind::LongText => {
            let oninput = set_field.reform(move |e: InputEvent| {
                let area: HtmlTextAreaElement = e.target_unchecked_into();
                (key, area.value())
            });
            html! {
                <div class="form-group">
                    { label }
                    <textarea id={id} value={value} {oninput} disabled={disabled} rows="3" />
                </div>
            }
        }
        kind => {
            let input_type = match kind {
                FieldKind::Number | FieldKind::Integer => "number",
                FieldKind::Email => "email",
                FieldKind::Phone => "tel",
                _ => "text",
            };
            let step = match kind {
                FieldKind::Number => Some("any"),
                _ => None,
            };
            let oninput = set_field.reform(move |e: InputEvent| {
                let input: HtmlInputElement = e.target_unchecked_into();
                (key, input.value())
            });
            html! {
                <div class="form-group">
                    { label }
                    <input type={input_type} id={id} value={value} {step} {oninput} disabled={disabled} />
                </div>
            }
        }
    }
}
