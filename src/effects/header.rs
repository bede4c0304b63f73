use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlElement};

use crate::dom;
use crate::page::Page;
use crate::throttle::throttled;

const SCROLLED_AFTER_PX: f64 = 10.0;
const SCROLL_THROTTLE_MS: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeaderState {
    pub scrolled: bool,
}

impl HeaderState {
    pub fn at(scroll_y: f64) -> Self {
        Self { scrolled: scroll_y > SCROLLED_AFTER_PX }
    }
}

/// How far through the document the viewport is, in `[0, 1]`.
/// Pages that fit in one screen report 0.
pub fn scroll_ratio(scroll_y: f64, document_height: f64, viewport_height: f64) -> f64 {
    let scrollable = document_height - viewport_height;
    if scrollable <= 0.0 {
        return 0.0;
    }
    (scroll_y / scrollable).clamp(0.0, 1.0)
}

pub fn progress_width(ratio: f64) -> String {
    format!("{}%", ratio * 100.0)
}

/// Where the scroll progress bar comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarSource {
    /// The page already has a `.scroll-progress` element, header or not.
    Existing,
    /// No bar in the markup; one is appended to the header.
    CreateInHeader,
    None,
}

pub fn bar_source(has_bar: bool, has_header: bool) -> BarSource {
    match (has_bar, has_header) {
        (true, _) => BarSource::Existing,
        (false, true) => BarSource::CreateInHeader,
        (false, false) => BarSource::None,
    }
}

pub fn install(page: &Rc<Page>) {
    let Some(header) = page.header.clone() else {
        log::debug!("no header, sticky header disabled");
        return;
    };

    let apply = {
        let page = page.clone();
        move || {
            let state = HeaderState::at(page.scroll_y());
            dom::set_class(&header, "is-scrolled", state.scrolled);
        }
    };
    apply();

    dom::listen(
        &page.window,
        "scroll",
        throttled(SCROLL_THROTTLE_MS, move |_: Event| apply()),
    );
    log::info!("sticky header installed");
}

pub fn install_scroll_progress(page: &Rc<Page>) {
    let existing = dom::query_html(&page.document, ".scroll-progress");
    let bar = match bar_source(existing.is_some(), page.header.is_some()) {
        BarSource::Existing => existing,
        BarSource::CreateInHeader => page.header.as_ref().and_then(|h| create_bar(page, h)),
        BarSource::None => None,
    };
    let Some(bar) = bar else {
        log::debug!("no scroll progress bar");
        return;
    };

    let apply = {
        let page = page.clone();
        move || {
            let ratio = scroll_ratio(page.scroll_y(), page.document_height(), page.viewport_height());
            dom::set_style(&bar, "width", &progress_width(ratio));
        }
    };
    apply();

    dom::listen(
        &page.window,
        "scroll",
        throttled(SCROLL_THROTTLE_MS, move |_: Event| apply()),
    );
    log::info!("scroll progress installed");
}

fn create_bar(page: &Page, header: &HtmlElement) -> Option<HtmlElement> {
    let bar = page
        .document
        .create_element("div")
        .ok()?
        .dyn_into::<HtmlElement>()
        .ok()?;
    bar.set_class_name("scroll-progress");
    dom::set_attr(&bar, "aria-hidden", "true");
    if let Err(e) = header.append_child(&bar) {
        log::warn!("could not attach scroll progress bar: {:?}", e);
        return None;
    }
    Some(bar)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrolled_only_past_threshold() {
        assert!(!HeaderState::at(0.0).scrolled);
        assert!(!HeaderState::at(10.0).scrolled);
        assert!(HeaderState::at(10.5).scrolled);
    }

    #[test]
    fn ratio_is_capped_at_one() {
        assert_eq!(scroll_ratio(500.0, 2000.0, 1000.0), 0.5);
        assert_eq!(scroll_ratio(1500.0, 2000.0, 1000.0), 1.0);
    }

    #[test]
    fn single_screen_page_reports_zero() {
        assert_eq!(scroll_ratio(0.0, 800.0, 800.0), 0.0);
        assert_eq!(scroll_ratio(30.0, 600.0, 800.0), 0.0);
    }

    #[test]
    fn existing_bar_is_used_without_header() {
        assert_eq!(bar_source(true, false), BarSource::Existing);
        assert_eq!(bar_source(true, true), BarSource::Existing);
    }

    #[test]
    fn bar_is_created_only_inside_a_header() {
        assert_eq!(bar_source(false, true), BarSource::CreateInHeader);
        assert_eq!(bar_source(false, false), BarSource::None);
    }

    #[test]
    fn width_is_percentage() {
        assert_eq!(progress_width(0.25), "25%");
        assert_eq!(progress_width(1.0), "100%");
    }
}
