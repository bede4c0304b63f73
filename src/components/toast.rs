use gloo_timers::callback::Timeout;
use yew::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    pub fn colors(self) -> (&'static str, &'static str) {
        match self {
            ToastKind::Success => ("#155724", "#d4edda"),
            ToastKind::Error => ("#721c24", "#f8d7da"),
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct ToastProps {
    pub message: String,
    pub kind: ToastKind,
}

#[function_component(Toast)]
pub fn toast(props: &ToastProps) -> Html {
    let (color, background) = props.kind.colors();
    let role = match props.kind {
        ToastKind::Success => "status",
        ToastKind::Error => "alert",
    };
    html! {
        <div class="toast" role={role} style={format!(
            "position: fixed; left: 50%; bottom: 24px; transform: translateX(-50%); \
             padding: 12px 16px; border-radius: 12px; color: {}; background: {}; \
             box-shadow: 0 8px 24px rgba(0,0,0,.15); z-index: 2000;",
            color, background
        )}>
            {&props.message}
        </div>
    }
}

/// Mounts a toast on its own host element and removes it after `duration_ms`.
pub fn show(message: &str, kind: ToastKind, duration_ms: u32) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let (Ok(host), Some(body)) = (document.create_element("div"), document.body()) else {
        log::warn!("could not create toast host");
        return;
    };
    if let Err(e) = body.append_child(&host) {
        log::warn!("could not attach toast: {:?}", e);
        return;
    }

    let handle = yew::Renderer::<Toast>::with_root_and_props(
        host.clone(),
        ToastProps {
            message: message.to_string(),
            kind,
        },
    )
    .render();

    Timeout::new(duration_ms, move || {
        handle.destroy();
        host.remove();
    })
    .forget();
}
