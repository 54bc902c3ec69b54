use gloo_net::http::Request;
use shared::Resource;
use web_sys::window;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::Route;

#[derive(Properties, PartialEq)]
pub struct HeaderProps {
    pub user_name: AttrValue,
    /// Partner roles only see the calculator link.
    #[prop_or(true)]
    pub admin: bool,
}

#[function_component(Header)]
pub fn header(props: &HeaderProps) -> Html {
    let logging_out = use_state(|| false);
    let current = use_route::<Route>();

    let on_logout = {
        let logging_out = logging_out.clone();
        Callback::from(move |_: MouseEvent| {
            let logging_out = logging_out.clone();
            logging_out.set(true);
            wasm_bindgen_futures::spawn_local(async move {
                let _ = Request::post("/auth/logout").send().await;
                if let Some(w) = window() {
                    let _ = w.location().reload();
                }
            });
        })
    };

    let nav_class = |route: &Route| {
        if current.as_ref() == Some(route) {
            "nav-link active"
        } else {
            "nav-link"
        }
    };

    html! {
        <header class="header">
            <nav>
                <Link<Route> to={Route::Dashboard}>
                    <h1>{ "Surya Ghar Admin" }</h1>
                </Link<Route>>
                <div class="nav-links">
                    { for Resource::all().iter().filter(|_| props.admin).map(|r| {
                        let route = Route::Resource { slug: r.slug().to_string() };
                        html! {
                            <Link<Route> to={route.clone()} classes={nav_class(&route)}>
                                { r.title() }
                            </Link<Route>>
                        }
                    })}
                    <Link<Route> to={Route::Calculator} classes={nav_class(&Route::Calculator)}>
                        { "Calculator" }
                    </Link<Route>>
                </div>
                <span class="user-name">{ &props.user_name }</span>
                <button class="btn-logout" onclick={on_logout} disabled={*logging_out}>
                    { if *logging_out { "Logging out..." } else { "Logout" } }
                </button>
            </nav>
        </header>
    }
}
