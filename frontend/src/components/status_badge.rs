use shared::{BadgeTone, Resource};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct StatusBadgeProps {
    pub label: AttrValue,
    pub tone: BadgeTone,
}

#[function_component(StatusBadge)]
pub fn status_badge(props: &StatusBadgeProps) -> Html {
    html! {
        <span class={props.tone.css_class()}>{ &props.label }</span>
    }
}

/// Badge for a stored status key; unknown keys render as plain neutral text.
pub fn badge_for(resource: Resource, key: &str) -> Html {
    let (label, tone) = resource
        .badge(key)
        .map(|(label, tone)| (label.to_string(), tone))
        .unwrap_or_else(|| (key.to_string(), BadgeTone::Neutral));
    html! { <StatusBadge label={label} tone={tone} /> }
}
