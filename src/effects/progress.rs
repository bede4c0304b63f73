use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

use crate::dom;
use crate::motion;
use crate::page::Page;

const BAR_THRESHOLD: f64 = 0.5;

/// `data-progress` clamped to `[0, 100]`; anything unparseable counts as 0.
pub fn target_percent(raw: Option<&str>) -> f64 {
    let value = raw
        .and_then(|v| v.trim().trim_end_matches('%').trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0);
    value.clamp(0.0, 100.0)
}

pub fn width(percent: f64) -> String {
    format!("{}%", percent)
}

/// Width a bar starts with, and whether it still has to animate from there.
/// Under reduced motion the bar starts at its target and never animates.
pub fn initial_width(target: f64, reduced_motion: bool) -> (String, bool) {
    if reduced_motion {
        (width(target), false)
    } else {
        (width(0.0), true)
    }
}

pub fn install(page: &Rc<Page>) {
    let mut bars: Vec<(Element, Option<(HtmlElement, f64)>)> = page
        .query_all(".progress-bar[data-progress]")
        .into_iter()
        .filter_map(|el| {
            let target = target_percent(el.get_attribute("data-progress").as_deref());
            let bar = el.clone().dyn_into::<HtmlElement>().ok()?;
            Some((el, Some((bar, target))))
        })
        .collect();
    if bars.is_empty() {
        return;
    }

    let mut animate = false;
    for (_, slot) in &bars {
        if let Some((bar, target)) = slot {
            let (start, pending) = initial_width(*target, page.reduced_motion);
            dom::set_style(bar, "width", &start);
            animate |= pending;
        }
    }
    if !animate {
        log::info!("progress bars set without animation");
        return;
    }

    let targets: Vec<Element> = bars.iter().map(|(el, _)| el.clone()).collect();
    let window = page.window.clone();
    let duration = f64::from(page.config.progress_duration_ms);
    let result = dom::observe_once(
        &targets,
        BAR_THRESHOLD,
        Some(dom::BOTTOM_INSET_MARGIN),
        move |entered| {
            let Some((_, slot)) = bars.iter_mut().find(|(el, _)| el == entered) else {
                return;
            };
            let Some((bar, target)) = slot.take() else {
                return;
            };
            motion::run_frames(&window, duration, move |p| {
                dom::set_style(&bar, "width", &width(motion::interpolate(p, 0.0, target)));
            });
        },
    );
    if let Err(e) = result {
        log::warn!("progress bar observer unavailable: {:?}", e);
        for target in &targets {
            if let Some(bar) = target.dyn_ref::<HtmlElement>() {
                let percent = target_percent(target.get_attribute("data-progress").as_deref());
                dom::set_style(bar, "width", &width(percent));
            }
        }
    }
}
