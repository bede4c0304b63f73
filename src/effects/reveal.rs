use std::rc::Rc;

use crate::dom;
use crate::page::Page;

const REVEAL_THRESHOLD: f64 = 0.15;

pub fn install(page: &Rc<Page>) {
    let targets = page.query_all(".reveal");
    if targets.is_empty() {
        return;
    }
    let count = targets.len();
    let result = dom::observe_once(
        &targets,
        REVEAL_THRESHOLD,
        Some(dom::BOTTOM_INSET_MARGIN),
        |element| dom::set_class(element, "is-visible", true),
    );
    match result {
        Ok(()) => log::info!("reveal installed on {} elements", count),
        Err(e) => {
            log::warn!("reveal observer unavailable: {:?}", e);
            for element in &targets {
                dom::set_class(element, "is-visible", true);
            }
        }
    }
}
