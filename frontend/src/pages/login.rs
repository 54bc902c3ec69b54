use yew::prelude::*;

#[function_component(Login)]
pub fn login() -> Html {
    html! {
        <div class="login-container">
            <div class="login-card">
                <h1 class="login-title">{ "PM Surya Ghar" }</h1>
                <p class="login-subtitle">{ "Subsidy Administration" }</p>
                <p>{ "Your session has expired or you are not signed in." }</p>
                <p>{ "Sign in through the partner portal, then reload this page." }</p>
            </div>
        </div>
    }
}
