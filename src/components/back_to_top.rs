use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{MouseEvent, ScrollBehavior, ScrollToOptions};
use yew::prelude::*;

use crate::throttle::Throttle;

const SHOW_AFTER_PX: f64 = 600.0;
const SCROLL_THROTTLE_MS: f64 = 100.0;

pub fn should_show(scroll_y: f64) -> bool {
    scroll_y > SHOW_AFTER_PX
}

#[derive(Properties, PartialEq)]
pub struct BackToTopProps {
    pub reduced_motion: bool,
}

#[function_component(BackToTop)]
pub fn back_to_top(props: &BackToTopProps) -> Html {
    let visible = use_state(|| false);

    {
        let visible = visible.clone();
        use_effect_with_deps(
            move |_| {
                let destructor: Box<dyn FnOnce()> = if let Some(window) = web_sys::window() {
                    let mut throttle = Throttle::new(SCROLL_THROTTLE_MS);
                    let callback = Closure::<dyn FnMut()>::new({
                        let visible = visible.clone();
                        move || {
                            if !throttle.accept(crate::throttle::now_ms()) {
                                return;
                            }
                            if let Some(win) = web_sys::window() {
                                if let Ok(scroll_y) = win.scroll_y() {
                                    visible.set(should_show(scroll_y));
                                }
                            }
                        }
                    });
                    if let Err(e) = window
                        .add_event_listener_with_callback("scroll", callback.as_ref().unchecked_ref())
                    {
                        log::warn!("back to top: could not listen for scroll: {:?}", e);
                    }
                    if let Ok(scroll_y) = window.scroll_y() {
                        visible.set(should_show(scroll_y));
                    }
                    Box::new(move || {
                        let _ = window.remove_event_listener_with_callback(
                            "scroll",
                            callback.as_ref().unchecked_ref(),
                        );
                    })
                } else {
                    Box::new(|| ())
                };
                move || {
                    destructor();
                }
            },
            (),
        );
    }

    let onclick = {
        let smooth = !props.reduced_motion;
        Callback::from(move |_: MouseEvent| {
            if let Some(window) = web_sys::window() {
                let options = ScrollToOptions::new();
                options.set_top(0.0);
                options.set_behavior(if smooth {
                    ScrollBehavior::Smooth
                } else {
                    ScrollBehavior::Instant
                });
                window.scroll_to_with_scroll_to_options(&options);
            }
        })
    };

    html! {
        <button
            id="backToTop"
            type="button"
            aria-label="Volver arriba"
            class={classes!((*visible).then(|| "show"))}
            {onclick}
        >
            {"↑"}
        </button>
    }
}

/// Appends a host to `<body>` and mounts the button there.
pub fn mount(reduced_motion: bool) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let (Ok(host), Some(body)) = (document.create_element("div"), document.body()) else {
        log::warn!("could not create back to top host");
        return;
    };
    if let Err(e) = body.append_child(&host) {
        log::warn!("could not attach back to top: {:?}", e);
        return;
    }
    yew::Renderer::<BackToTop>::with_root_and_props(host, BackToTopProps { reduced_motion }).render();
    log::info!("back to top installed");
}
