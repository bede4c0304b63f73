use serde::Deserialize;
use thiserror::Error;
use wasm_bindgen::JsValue;
use web_sys::js_sys::Reflect;
use web_sys::Window;

/// Name of the optional global the host page may define before loading the bundle.
pub const CONFIG_GLOBAL: &str = "__SITE_CONFIG__";

#[cfg(debug_assertions)]
pub fn get_backend_url() -> &'static str {
    "http://localhost:3001"  // Development URL when running locally
}

#[cfg(not(debug_assertions))]
pub fn get_backend_url() -> &'static str {
    ""  // Production URL
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read __SITE_CONFIG__: {0}")]
    Lookup(String),
    #[error("invalid site config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccordionMode {
    #[default]
    Independent,
    Exclusive,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub accordion_mode: AccordionMode,
    pub thousands_separator: String,
    pub decimal_separator: String,
    pub counter_duration_ms: u32,
    pub progress_duration_ms: u32,
    pub submit_delay_ms: u32,
    pub toast_duration_ms: u32,
    pub header_margin_px: f64,
    pub fallback_offset_px: f64,
    pub contact_endpoint: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            accordion_mode: AccordionMode::Independent,
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            counter_duration_ms: 1400,
            progress_duration_ms: 900,
            submit_delay_ms: 900,
            toast_duration_ms: 3200,
            header_margin_px: 12.0,
            fallback_offset_px: 90.0,
            contact_endpoint: format!("{}/api/contact", get_backend_url()),
        }
    }
}

impl SiteConfig {
    /// Reads `window.__SITE_CONFIG__`. A missing global yields the defaults.
    pub fn from_window(window: &Window) -> Result<Self, ConfigError> {
        let raw = Reflect::get(window, &JsValue::from_str(CONFIG_GLOBAL))
            .map_err(|e| ConfigError::Lookup(format!("{:?}", e)))?;
        if raw.is_undefined() || raw.is_null() {
            return Ok(Self::default());
        }
        serde_wasm_bindgen::from_value(raw).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Same as [`SiteConfig::from_window`] but never fails; problems are logged.
    pub fn load(window: &Window) -> Self {
        match Self::from_window(window) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{}, falling back to defaults", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults_for_missing_fields() {
        let config: SiteConfig =
            serde_json::from_str(r#"{"accordion_mode":"exclusive","counter_duration_ms":2000}"#)
                .expect("config");
        assert_eq!(config.accordion_mode, AccordionMode::Exclusive);
        assert_eq!(config.counter_duration_ms, 2000);
        assert_eq!(config.toast_duration_ms, 3200);
        assert_eq!(config.thousands_separator, ",");
    }

    #[test]
    fn default_mode_is_independent() {
        assert_eq!(SiteConfig::default().accordion_mode, AccordionMode::Independent);
    }

    #[test]
    fn unknown_accordion_mode_is_rejected() {
        let parsed = serde_json::from_str::<SiteConfig>(r#"{"accordion_mode":"sometimes"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn contact_endpoint_points_at_contact_route() {
        assert!(SiteConfig::default().contact_endpoint.ends_with("/api/contact"));
    }
}
