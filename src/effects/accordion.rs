use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::js_sys::Array;
use web_sys::{
    Element, Event, HtmlElement, MutationObserver, MutationObserverInit, MutationRecord,
    ResizeObserver,
};

use crate::config::AccordionMode;
use crate::dom;
use crate::page::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    Expanded,
    #[default]
    Collapsed,
}

impl PanelState {
    pub fn toggled(self) -> Self {
        match self {
            PanelState::Expanded => PanelState::Collapsed,
            PanelState::Collapsed => PanelState::Expanded,
        }
    }

    pub fn is_expanded(self) -> bool {
        self == PanelState::Expanded
    }

    pub fn aria_expanded(self) -> &'static str {
        if self.is_expanded() { "true" } else { "false" }
    }

    pub fn max_height(self, scroll_height: i32) -> String {
        match self {
            PanelState::Expanded => format!("{}px", scroll_height.max(0)),
            PanelState::Collapsed => "0px".to_string(),
        }
    }
}

/// State for one `[data-accordion]` group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccordionState {
    mode: AccordionMode,
    panels: Vec<PanelState>,
}

impl AccordionState {
    pub fn new(mode: AccordionMode, len: usize) -> Self {
        Self {
            mode,
            panels: vec![PanelState::Collapsed; len],
        }
    }

    pub fn panel(&self, index: usize) -> PanelState {
        self.panels.get(index).copied().unwrap_or_default()
    }

    pub fn panels(&self) -> &[PanelState] {
        &self.panels
    }

    /// Flips one panel. In exclusive mode every other panel collapses first.
    pub fn toggle(&mut self, index: usize) {
        let Some(current) = self.panels.get(index).copied() else {
            return;
        };
        if self.mode == AccordionMode::Exclusive {
            for (i, panel) in self.panels.iter_mut().enumerate() {
                if i != index {
                    *panel = PanelState::Collapsed;
                }
            }
        }
        self.panels[index] = current.toggled();
    }
}

/// Group attribute wins over the site-wide default.
pub fn group_mode(attribute: Option<&str>, default: AccordionMode) -> AccordionMode {
    match attribute.map(str::trim) {
        Some("exclusive") => AccordionMode::Exclusive,
        Some("independent") => AccordionMode::Independent,
        _ => default,
    }
}

struct Item {
    trigger: Element,
    panel: HtmlElement,
}

fn apply(item: &Item, state: PanelState) {
    dom::set_attr(&item.trigger, "aria-expanded", state.aria_expanded());
    item.panel.set_hidden(!state.is_expanded());
    measure(&item.panel, state);
}

fn measure(panel: &HtmlElement, state: PanelState) {
    dom::set_style(panel, "max-height", &state.max_height(panel.scroll_height()));
}

pub fn install(page: &Rc<Page>) {
    let groups = page.query_all("[data-accordion]");
    for group in &groups {
        install_group(page, group);
    }
    if !groups.is_empty() {
        log::info!("accordion installed on {} groups", groups.len());
    }
}

fn install_group(page: &Page, group: &Element) {
    let items: Vec<Item> = dom::query_all(group, ".acc-item")
        .into_iter()
        .filter_map(|item| {
            let trigger = item.query_selector(".acc-trigger").ok().flatten()?;
            let panel = item
                .query_selector(".acc-panel")
                .ok()
                .flatten()?
                .dyn_into::<HtmlElement>()
                .ok()?;
            Some(Item { trigger, panel })
        })
        .collect();
    if items.is_empty() {
        return;
    }

    let mode = group_mode(
        group.get_attribute("data-accordion").as_deref(),
        page.config.accordion_mode,
    );
    let state = Rc::new(RefCell::new(AccordionState::new(mode, items.len())));
    let items = Rc::new(items);

    for item in items.iter() {
        apply(item, PanelState::Collapsed);
    }

    for (index, item) in items.iter().enumerate() {
        let click_state = state.clone();
        let all = items.clone();
        dom::listen(&item.trigger, "click", move |_: Event| {
            let mut state = click_state.borrow_mut();
            state.toggle(index);
            for (item, panel) in all.iter().zip(state.panels()) {
                apply(item, *panel);
            }
        });

        watch_size(&item.panel, index, &state);
    }
}

/// Re-measures the panel whenever its content changes size. The panel's own
/// box is capped by `max-height`, so the content elements are watched too,
/// including ones inserted later.
fn watch_size(panel: &HtmlElement, index: usize, state: &Rc<RefCell<AccordionState>>) {
    let state = state.clone();
    let target = panel.clone();
    let callback = Closure::<dyn FnMut(Array)>::new(move |_entries: Array| {
        let current = state.borrow().panel(index);
        measure(&target, current);
    });
    let observer = match ResizeObserver::new(callback.as_ref().unchecked_ref()) {
        Ok(observer) => observer,
        Err(e) => {
            log::warn!("resize observer unavailable: {:?}", e);
            return;
        }
    };
    callback.forget();

    observer.observe(panel);
    let children = panel.children();
    for i in 0..children.length() {
        if let Some(child) = children.item(i) {
            observer.observe(&child);
        }
    }
    watch_inserted(panel, observer);
}

fn watch_inserted(panel: &HtmlElement, observer: ResizeObserver) {
    let callback = Closure::<dyn FnMut(Array)>::new(move |records: Array| {
        for record in records.iter() {
            let record: MutationRecord = record.unchecked_into();
            let added = record.added_nodes();
            for i in 0..added.length() {
                if let Some(element) = added.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                    observer.observe(&element);
                }
            }
        }
    });
    let mutations = match MutationObserver::new(callback.as_ref().unchecked_ref()) {
        Ok(mutations) => mutations,
        Err(e) => {
            log::warn!("mutation observer unavailable: {:?}", e);
            return;
        }
    };
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    match mutations.observe_with_options(panel, &options) {
        Ok(()) => callback.forget(),
        Err(e) => log::warn!("could not watch panel content: {:?}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expanded_panel_uses_scroll_height() {
        let state = PanelState::Collapsed.toggled();
        assert_eq!(state.aria_expanded(), "true");
        assert_eq!(state.max_height(240), "240px");
    }

    #[test]
    fn collapsed_panel_is_zero_high() {
        let state = PanelState::Expanded.toggled();
        assert_eq!(state.aria_expanded(), "false");
        assert_eq!(state.max_height(240), "0px");
    }

    #[test]
    fn remeasure_follows_new_content_height() {
        let state = PanelState::Expanded;
        assert_eq!(state.max_height(120), "120px");
        assert_eq!(state.max_height(310), "310px");
    }

    #[test]
    fn collapsed_panel_stays_closed_when_content_grows() {
        let state = PanelState::Collapsed;
        assert_eq!(state.max_height(120), "0px");
        assert_eq!(state.max_height(300), "0px");
    }

    #[test]
    fn click_and_resize_handles_share_group_state() {
        let group = Rc::new(RefCell::new(AccordionState::new(AccordionMode::Independent, 2)));
        let click_state = group.clone();
        click_state.borrow_mut().toggle(1);
        assert_eq!(group.borrow().panel(1), PanelState::Expanded);
        assert_eq!(group.borrow().panel(1).max_height(300), "300px");
        assert_eq!(group.borrow().panel(0), PanelState::Collapsed);
    }

    #[test]
    fn independent_panels_do_not_affect_each_other() {
        let mut group = AccordionState::new(AccordionMode::Independent, 3);
        group.toggle(0);
        group.toggle(2);
        assert_eq!(
            group.panels(),
            &[PanelState::Expanded, PanelState::Collapsed, PanelState::Expanded]
        );
        group.toggle(0);
        assert_eq!(group.panel(0), PanelState::Collapsed);
        assert_eq!(group.panel(2), PanelState::Expanded);
    }

    #[test]
    fn exclusive_mode_closes_siblings() {
        let mut group = AccordionState::new(AccordionMode::Exclusive, 3);
        group.toggle(0);
        group.toggle(1);
        assert_eq!(
            group.panels(),
            &[PanelState::Collapsed, PanelState::Expanded, PanelState::Collapsed]
        );
        group.toggle(1);
        assert!(group.panels().iter().all(|p| *p == PanelState::Collapsed));
    }

    #[test]
    fn out_of_range_toggle_is_ignored() {
        let mut group = AccordionState::new(AccordionMode::Independent, 1);
        group.toggle(4);
        assert_eq!(group.panel(0), PanelState::Collapsed);
        assert_eq!(group.panel(4), PanelState::Collapsed);
    }

    #[test]
    fn group_attribute_overrides_default() {
        assert_eq!(group_mode(Some("exclusive"), AccordionMode::Independent), AccordionMode::Exclusive);
        assert_eq!(group_mode(Some(""), AccordionMode::Exclusive), AccordionMode::Exclusive);
        assert_eq!(group_mode(None, AccordionMode::Independent), AccordionMode::Independent);
        assert_eq!(group_mode(Some("independent"), AccordionMode::Exclusive), AccordionMode::Independent);
    }
}
