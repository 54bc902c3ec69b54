use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct DateInputProps {
    pub value: String,
    pub onchange: Callback<String>,
    pub label: AttrValue,
    pub id: AttrValue,
    #[prop_or(false)]
    pub required: bool,
    #[prop_or(false)]
    pub disabled: bool,
}

/// `YYYY-MM-DD` picker; an empty string means no date.
#[function_component(DateInput)]
pub fn date_input(props: &DateInputProps) -> Html {
    let on_input = {
        let onchange = props.onchange.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            onchange.emit(input.value());
        })
    };

    html! {
        <div class="form-group">
            <label for={props.id.clone()}>
                { &props.label }
                if props.required { <span class="required">{ " *" }</span> }
            </label>
            <input
                type="date"
                id={props.id.clone()}
                value={props.value.clone()}
                oninput={on_input}
                disabled={props.disabled}
            />
        </div>
    }
}
