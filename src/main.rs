use log::{info, Level};
use web_sys::window;

mod config;
mod dom;
mod motion;
mod page;
mod throttle;
mod components {
    pub mod back_to_top;
    pub mod toast;
}
mod effects {
    pub mod accordion;
    pub mod contact;
    pub mod counters;
    pub mod header;
    pub mod menu;
    pub mod parallax;
    pub mod progress;
    pub mod reveal;
    pub mod scroll;
}

use config::SiteConfig;
use page::Page;

#[cfg(debug_assertions)]
const LOG_LEVEL: Level = Level::Debug;
#[cfg(not(debug_assertions))]
const LOG_LEVEL: Level = Level::Info;

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging; fails only if a logger is already set
    let _ = console_log::init_with_level(LOG_LEVEL);

    let Some(window) = window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    info!("Starting page interactivity");
    let config = SiteConfig::load(&window);
    let page = Page::new(window, document, config);

    effects::header::install(&page);
    effects::header::install_scroll_progress(&page);
    effects::menu::install(&page);
    effects::scroll::install_smooth_scroll(&page);
    effects::scroll::install_active_section(&page);
    effects::reveal::install(&page);
    effects::counters::install(&page);
    effects::progress::install(&page);
    effects::parallax::install(&page);
    components::back_to_top::mount(page.reduced_motion);
    effects::accordion::install(&page);
    effects::contact::install(&page);
}
