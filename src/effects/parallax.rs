use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlElement, MouseEvent};

use crate::dom;
use crate::page::Page;
use crate::throttle::throttled;

const MOUSE_THROTTLE_MS: f64 = 40.0;
const STRENGTH_STEP_PX: f64 = 6.0;

/// Cursor position relative to the viewport centre, roughly `[-1, 1]`.
pub fn cursor_offset(position: f64, extent: f64) -> f64 {
    let center = extent / 2.0;
    if center <= 0.0 {
        return 0.0;
    }
    (position - center) / center
}

pub fn orb_strength(index: usize) -> f64 {
    (index as f64 + 1.0) * STRENGTH_STEP_PX
}

pub fn orb_transform(index: usize, dx: f64, dy: f64) -> String {
    let strength = orb_strength(index);
    format!("translate({}px, {}px)", dx * strength, dy * strength)
}

pub fn install(page: &Rc<Page>) {
    if page.reduced_motion {
        log::debug!("reduced motion, parallax disabled");
        return;
    }
    let orbs: Vec<HtmlElement> = page
        .query_all(".hero-orb")
        .into_iter()
        .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
        .collect();
    if orbs.is_empty() {
        return;
    }

    let count = orbs.len();
    let handler_page = page.clone();
    dom::listen(
        &page.window,
        "mousemove",
        throttled(MOUSE_THROTTLE_MS, move |event: Event| {
            let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let dx = cursor_offset(f64::from(mouse.client_x()), handler_page.viewport_width());
            let dy = cursor_offset(f64::from(mouse.client_y()), handler_page.viewport_height());
            for (index, orb) in orbs.iter().enumerate() {
                dom::set_style(orb, "transform", &orb_transform(index, dx, dy));
            }
        }),
    );
    log::info!("parallax installed on {} orbs", count);
}
