use shared::{CurrentUserResponse, Resource, Role};
use yew::prelude::*;
use yew_router::prelude::*;

mod api;
mod components;
mod pages;
mod schema;

use components::Header;

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Dashboard,
    #[at("/admin/:slug")]
    Resource { slug: String },
    #[at("/calculator")]
    Calculator,
    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Dashboard => html! { <pages::dashboard::Dashboard /> },
        Route::Resource { slug } => match Resource::from_slug(&slug) {
            Some(resource) => html! {
                <pages::resource_page::ResourcePage key={slug} resource={resource} />
            },
            None => html! { <Redirect<Route> to={Route::Dashboard} /> },
        },
        Route::Calculator => html! { <pages::calculator::Calculator /> },
        Route::NotFound => html! { <Redirect<Route> to={Route::Dashboard} /> },
    }
}

/// Partner roles only get the calculator; everything else is admin data.
fn partner_switch(routes: Route) -> Html {
    match routes {
        Route::Calculator => html! { <pages::calculator::Calculator /> },
        _ => html! { <Redirect<Route> to={Route::Calculator} /> },
    }
}

#[function_component(App)]
fn app() -> Html {
    let auth_state = use_state(|| None::<Option<CurrentUserResponse>>);

    {
        let auth_state = auth_state.clone();
        use_effect_with((), move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                match api::get_json::<CurrentUserResponse>("/auth/me").await {
                    Ok(user) => auth_state.set(Some(Some(user))),
                    Err(e) => {
                        log::info!("not signed in: {}", e);
                        auth_state.set(Some(None));
                    }
                }
            });
            || ()
        });
    }

    match (*auth_state).clone() {
        None => html! {
            <div class="login-container">
                <div class="login-card">
                    <p>{ "Loading..." }</p>
                </div>
            </div>
        },
        Some(None) => html! { <pages::login::Login /> },
        Some(Some(user)) => {
            let admin = user.role == Role::Admin;
            let render = if admin {
                switch
            } else {
                partner_switch
            };
            html! {
                <BrowserRouter>
                    <Header user_name={user.name.clone()} {admin} />
                    <div class="container">
                        <Switch<Route> render={render} />
                    </div>
                </BrowserRouter>
            }
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<App>::new().render();
}
