use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Element, Event, KeyboardEvent};

use crate::dom;
use crate::page::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    Open,
    #[default]
    Closed,
}

impl MenuState {
    pub fn toggled(self) -> Self {
        match self {
            MenuState::Open => MenuState::Closed,
            MenuState::Closed => MenuState::Open,
        }
    }

    pub fn is_open(self) -> bool {
        self == MenuState::Open
    }

    pub fn aria_expanded(self) -> &'static str {
        if self.is_open() { "true" } else { "false" }
    }

    /// Label describes what the toggle will do next.
    pub fn aria_label(self) -> &'static str {
        if self.is_open() { "Close menu" } else { "Open menu" }
    }
}

/// What the page shows for a menu state: the panel's `open` class and the
/// toggle's aria attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuView {
    pub open_class: bool,
    pub aria_expanded: &'static str,
    pub aria_label: &'static str,
}

impl From<MenuState> for MenuView {
    fn from(state: MenuState) -> Self {
        Self {
            open_class: state.is_open(),
            aria_expanded: state.aria_expanded(),
            aria_label: state.aria_label(),
        }
    }
}

/// Mobile navigation: the toggle button, the panel and its current state.
pub struct Menu {
    toggle: Option<Element>,
    panel: Element,
    state: Cell<MenuState>,
}

impl Menu {
    pub fn toggle(&self) {
        self.set(self.state.get().toggled());
    }

    pub fn close(&self) {
        self.set(MenuState::Closed);
    }

    fn set(&self, state: MenuState) {
        self.state.set(state);
        let view = MenuView::from(state);
        dom::set_class(&self.panel, "open", view.open_class);
        if let Some(toggle) = &self.toggle {
            dom::set_attr(toggle, "aria-expanded", view.aria_expanded);
            dom::set_attr(toggle, "aria-label", view.aria_label);
        }
    }
}

pub fn install(page: &Rc<Page>) {
    let Some(panel) = page.document.query_selector(".menu").ok().flatten() else {
        log::debug!("no .menu, mobile menu disabled");
        return;
    };
    let toggle = page.document.get_element_by_id("nav-toggle");
    let menu = Rc::new(Menu {
        toggle: toggle.clone(),
        panel: panel.clone(),
        state: Cell::new(MenuState::Closed),
    });
    menu.close();

    if let Some(toggle) = &toggle {
        let menu = menu.clone();
        dom::listen(toggle, "click", move |_: Event| menu.toggle());
    }

    for link in dom::query_all(&panel, "a[href^=\"#\"]") {
        let menu = menu.clone();
        dom::listen(&link, "click", move |_: Event| menu.close());
    }

    {
        let menu = menu.clone();
        dom::listen(&page.window, "keydown", move |event: Event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>().map(|e| e.key()) else {
                return;
            };
            if key == "Escape" {
                menu.close();
            }
        });
    }

    log::info!("mobile menu installed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_toggle_returns_to_closed() {
        let state = MenuState::Closed.toggled().toggled();
        assert_eq!(state, MenuState::Closed);
        assert_eq!(state.aria_expanded(), "false");
        assert_eq!(state.aria_label(), "Open menu");
    }

    #[test]
    fn open_state_projection() {
        let state = MenuState::Closed.toggled();
        assert!(state.is_open());
        assert_eq!(state.aria_expanded(), "true");
        assert_eq!(state.aria_label(), "Close menu");
    }

    #[test]
    fn view_after_double_toggle_matches_closed() {
        let view = MenuView::from(MenuState::Closed.toggled().toggled());
        assert_eq!(
            view,
            MenuView {
                open_class: false,
                aria_expanded: "false",
                aria_label: "Open menu",
            }
        );
    }

    #[test]
    fn open_view_sets_class_and_label() {
        let view = MenuView::from(MenuState::Open);
        assert!(view.open_class);
        assert_eq!(view.aria_expanded, "true");
        assert_eq!(view.aria_label, "Close menu");
    }

    #[test]
    fn escape_close_is_idempotent() {
        let once = MenuView::from(MenuState::Open.toggled());
        let twice = MenuView::from(MenuState::Closed);
        assert_eq!(once, twice);
    }

    #[test]
    fn default_is_closed() {
        assert_eq!(MenuState::default(), MenuState::Closed);
    }
}
