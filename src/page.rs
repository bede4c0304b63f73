use std::rc::Rc;

use web_sys::{Document, Element, HtmlElement, Window};

use crate::config::SiteConfig;
use crate::dom;
use crate::motion;

/// Header height used for offsets, plus margin; `fallback` when there is no header.
pub fn header_offset(header_height: Option<f64>, margin: f64, fallback: f64) -> f64 {
    match header_height {
        Some(height) => height + margin,
        None => fallback,
    }
}

/// Shared handles for every behaviour on the page. Built once at start-up.
pub struct Page {
    pub window: Window,
    pub document: Document,
    pub config: SiteConfig,
    pub header: Option<HtmlElement>,
    pub reduced_motion: bool,
}

impl Page {
    pub fn new(window: Window, document: Document, config: SiteConfig) -> Rc<Self> {
        let header = dom::query_html(&document, ".header")
            .or_else(|| dom::query_html(&document, "#site-header"));
        let reduced_motion = motion::prefers_reduced_motion(&window);
        Rc::new(Self {
            window,
            document,
            config,
            header,
            reduced_motion,
        })
    }

    pub fn query_all(&self, selector: &str) -> Vec<Element> {
        dom::query_all(&self.document, selector)
    }

    pub fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    pub fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0)
    }

    pub fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(0.0)
    }

    pub fn document_height(&self) -> f64 {
        self.document
            .document_element()
            .map(|root| f64::from(root.scroll_height()))
            .unwrap_or(0.0)
    }

    /// Recomputed on every call so a header that changes height is honoured.
    pub fn header_offset(&self) -> f64 {
        header_offset(
            self.header.as_ref().map(|h| f64::from(h.offset_height())),
            self.config.header_margin_px,
            self.config.fallback_offset_px,
        )
    }
}
