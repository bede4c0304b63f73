use std::rc::Rc;

use web_sys::{Element, Event, ScrollBehavior, ScrollToOptions};

use crate::dom;
use crate::page::Page;
use crate::throttle::throttled;

const ACTIVE_THROTTLE_MS: f64 = 150.0;
const ACTIVE_MARGIN_PX: f64 = 20.0;

/// Element id an in-page href points to, percent-decoded. `None` for bare `#`
/// and anything that is not a fragment link.
pub fn fragment_target(href: &str) -> Option<String> {
    let fragment = href.strip_prefix('#')?;
    if fragment.is_empty() {
        return None;
    }
    match urlencoding::decode(fragment) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(_) => Some(fragment.to_string()),
    }
}

pub fn scroll_target_y(rect_top: f64, page_y: f64, offset: f64) -> f64 {
    (rect_top + page_y - offset).max(0.0)
}

/// Picks the last section (document order) whose top, adjusted by the header
/// offset and a small margin, is at or above the viewport top. Falls back to
/// the first section; `None` only when there are no sections.
pub fn active_section<'a>(sections: &'a [(String, f64)], offset: f64) -> Option<&'a str> {
    let mut current = sections.first().map(|(id, _)| id.as_str());
    for (id, top) in sections {
        if top - offset - ACTIVE_MARGIN_PX <= 0.0 {
            current = Some(id.as_str());
        }
    }
    current
}

pub fn install_smooth_scroll(page: &Rc<Page>) {
    let links = page.query_all("a[href^=\"#\"]");
    for link in &links {
        let page = page.clone();
        let anchor = link.clone();
        dom::listen(link, "click", move |event: Event| {
            let Some(id) = anchor.get_attribute("href").as_deref().and_then(fragment_target) else {
                return;
            };
            event.prevent_default();
            scroll_to(&page, &id);
        });
    }
    log::info!("smooth scroll installed on {} links", links.len());
}

fn scroll_to(page: &Page, id: &str) {
    let Some(target) = page.document.get_element_by_id(id) else {
        log::debug!("no element #{}", id);
        return;
    };
    let page_y = page.window.page_y_offset().unwrap_or(0.0);
    let y = scroll_target_y(target.get_bounding_client_rect().top(), page_y, page.header_offset());

    let options = ScrollToOptions::new();
    options.set_top(y);
    options.set_behavior(if page.reduced_motion {
        ScrollBehavior::Instant
    } else {
        ScrollBehavior::Smooth
    });
    page.window.scroll_to_with_scroll_to_options(&options);
}

pub fn install_active_section(page: &Rc<Page>) {
    let sections = page.query_all("section[id]");
    if sections.is_empty() {
        log::debug!("no sections, active link tracking disabled");
        return;
    }
    let links: Vec<(Element, Option<String>)> = page
        .query_all(".menu a[href^=\"#\"]")
        .into_iter()
        .map(|link| {
            let target = link.get_attribute("href").as_deref().and_then(fragment_target);
            (link, target)
        })
        .collect();

    let update = {
        let page = page.clone();
        move || {
            let tops: Vec<(String, f64)> = sections
                .iter()
                .map(|section| (section.id(), section.get_bounding_client_rect().top()))
                .collect();
            let current = active_section(&tops, page.header_offset());
            for (link, target) in &links {
                dom::set_class(link, "active", target.as_deref() == current);
            }
        }
    };
    update();

    dom::listen(
        &page.window,
        "scroll",
        throttled(ACTIVE_THROTTLE_MS, move |_: Event| update()),
    );
    log::info!("active section tracking installed");
}
