use std::cell::RefCell;
use std::collections::BTreeMap;
use std::future::Future;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Event, FormData, HtmlButtonElement, HtmlFormElement};

use crate::components::toast::{self, ToastKind};
use crate::page::Page;

pub const MSG_MISSING: &str = "Por favor completa todos los campos";
pub const MSG_INVALID_EMAIL: &str = "Ingresa un correo válido";
pub const MSG_SENT: &str = "¡Mensaje enviado! Te contactaremos pronto.";
pub const MSG_FAILED: &str = "No se pudo enviar. Intenta más tarde.";
const BUSY_LABEL: &str = "Enviando…";

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

/// Every named field of the form, as submitted.
pub type ContactFields = BTreeMap<String, String>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("missing required fields")]
    MissingFields,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("delivery failed: {0}")]
    Delivery(String),
}

impl ContactError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ContactError::MissingFields => MSG_MISSING,
            ContactError::InvalidEmail => MSG_INVALID_EMAIL,
            ContactError::Delivery(_) => MSG_FAILED,
        }
    }
}

/// Body a real contact endpoint would receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactPayload {
    pub nombre: String,
    pub correo: String,
    pub mensaje: String,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

pub fn validate(fields: &ContactFields) -> Result<ContactPayload, ContactError> {
    let field = |name: &str| {
        fields
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let (Some(nombre), Some(correo), Some(mensaje)) =
        (field("nombre"), field("correo"), field("mensaje"))
    else {
        return Err(ContactError::MissingFields);
    };
    if !is_valid_email(&correo) {
        return Err(ContactError::InvalidEmail);
    }
    Ok(ContactPayload {
        nombre,
        correo,
        mensaje,
    })
}

/// The side effects a submission drives on the page.
pub trait SubmitUi {
    fn set_busy(&self, busy: bool);
    fn reset(&self);
    fn notify(&self, message: &str, kind: ToastKind);
}

/// Re-enables the form when dropped, whichever way the submission ends.
struct BusyGuard<'a, U: SubmitUi> {
    ui: &'a U,
}

impl<'a, U: SubmitUi> BusyGuard<'a, U> {
    fn engage(ui: &'a U) -> Self {
        ui.set_busy(true);
        Self { ui }
    }
}

impl<U: SubmitUi> Drop for BusyGuard<'_, U> {
    fn drop(&mut self) {
        self.ui.set_busy(false);
    }
}

/// Validates, then delivers. Invalid input never reaches `deliver` and never
/// touches the submit control.
pub async fn submit<U, D, F>(ui: &U, fields: &ContactFields, deliver: D) -> Result<(), ContactError>
where
    U: SubmitUi,
    D: FnOnce(ContactPayload) -> F,
    F: Future<Output = Result<(), ContactError>>,
{
    let payload = match validate(fields) {
        Ok(payload) => payload,
        Err(e) => {
            ui.notify(e.user_message(), ToastKind::Error);
            return Err(e);
        }
    };

    let _busy = BusyGuard::engage(ui);
    match deliver(payload).await {
        Ok(()) => {
            ui.notify(MSG_SENT, ToastKind::Success);
            ui.reset();
            Ok(())
        }
        Err(e) => {
            log::warn!("contact form: {}", e);
            ui.notify(e.user_message(), ToastKind::Error);
            Err(e)
        }
    }
}

/// Stand-in for the backend call: waits `delay_ms` and reports success.
pub async fn simulate_delivery(
    payload: ContactPayload,
    endpoint: String,
    delay_ms: u32,
) -> Result<(), ContactError> {
    let body = serde_json::to_string(&payload).map_err(|e| ContactError::Delivery(e.to_string()))?;
    log::debug!("contact form would POST {} to {}", body, endpoint);
    TimeoutFuture::new(delay_ms).await;
    Ok(())
}

/// Holds the button's own markup while the busy label is shown, so icons and
/// nested spans come back intact.
#[derive(Debug, Default)]
pub struct LabelSwap {
    saved: Option<String>,
}

impl LabelSwap {
    /// Remembers `markup` unless a swap is already in progress.
    pub fn begin(&mut self, markup: String) {
        self.saved.get_or_insert(markup);
    }

    pub fn end(&mut self) -> Option<String> {
        self.saved.take()
    }
}

struct FormUi {
    form: HtmlFormElement,
    button: Option<HtmlButtonElement>,
    label: RefCell<LabelSwap>,
    toast_ms: u32,
}

impl SubmitUi for FormUi {
    fn set_busy(&self, busy: bool) {
        let Some(button) = &self.button else {
            return;
        };
        button.set_disabled(busy);
        if busy {
            self.label.borrow_mut().begin(button.inner_html());
            button.set_text_content(Some(BUSY_LABEL));
            crate::dom::set_attr(button, "aria-busy", "true");
        } else {
            if let Some(markup) = self.label.borrow_mut().end() {
                button.set_inner_html(&markup);
            }
            let _ = button.remove_attribute("aria-busy");
        }
    }

    fn reset(&self) {
        self.form.reset();
    }

    fn notify(&self, message: &str, kind: ToastKind) {
        toast::show(message, kind, self.toast_ms);
    }
}

pub fn collect_fields(form: &HtmlFormElement) -> ContactFields {
    let mut fields = ContactFields::new();
    let Ok(data) = FormData::new_with_form(form) else {
        return fields;
    };
    let controls = form.elements();
    for i in 0..controls.length() {
        let Some(name) = controls
            .item(i)
            .and_then(|control| control.get_attribute("name"))
            .filter(|name| !name.is_empty())
        else {
            continue;
        };
        if let Some(value) = data.get(&name).as_string() {
            fields.insert(name, value);
        }
    }
    fields
}

pub fn install(page: &Rc<Page>) {
    let Some(form) = page
        .document
        .get_element_by_id("contact-form")
        .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
    else {
        log::debug!("no #contact-form, form handler disabled");
        return;
    };
    let button = form
        .query_selector("button[type=submit]")
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok());

    let ui = Rc::new(FormUi {
        form: form.clone(),
        button,
        label: RefCell::new(LabelSwap::default()),
        toast_ms: page.config.toast_duration_ms,
    });
    let endpoint = page.config.contact_endpoint.clone();
    let delay_ms = page.config.submit_delay_ms;

    crate::dom::listen(&form, "submit", move |event: Event| {
        event.prevent_default();
        let fields = collect_fields(&ui.form);
        let ui = ui.clone();
        let endpoint = endpoint.clone();
        spawn_local(async move {
            let outcome = submit(ui.as_ref(), &fields, |payload| {
                simulate_delivery(payload, endpoint, delay_ms)
            })
            .await;
            if outcome.is_ok() {
                log::info!("contact form submitted");
            }
        });
    });
    log::info!("contact form installed");
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use futures::executor::block_on;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Step {
        Busy(bool),
        Reset,
        Toast(String, ToastKind),
    }

    #[derive(Default)]
    struct RecordingUi {
        steps: RefCell<Vec<Step>>,
    }

    impl SubmitUi for RecordingUi {
        fn set_busy(&self, busy: bool) {
            self.steps.borrow_mut().push(Step::Busy(busy));
        }

        fn reset(&self) {
            self.steps.borrow_mut().push(Step::Reset);
        }

        fn notify(&self, message: &str, kind: ToastKind) {
            self.steps
                .borrow_mut()
                .push(Step::Toast(message.to_string(), kind));
        }
    }

    fn fields(nombre: &str, correo: &str, mensaje: &str) -> ContactFields {
        [("nombre", nombre), ("correo", correo), ("mensaje", mensaje)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_field_shows_error_without_delivery() {
        for input in [
            fields("", "ana@example.com", "Hola"),
            fields("Ana", "", "Hola"),
            fields("Ana", "ana@example.com", "   "),
        ] {
            let ui = RecordingUi::default();
            let called = Cell::new(false);
            let outcome = block_on(submit(&ui, &input, |_| {
                called.set(true);
                async { Ok::<(), ContactError>(()) }
            }));
            assert_eq!(outcome, Err(ContactError::MissingFields));
            assert!(!called.get());
            assert_eq!(
                *ui.steps.borrow(),
                vec![Step::Toast(MSG_MISSING.to_string(), ToastKind::Error)]
            );
        }
    }

    #[test]
    fn missing_key_counts_as_empty() {
        let mut input = fields("Ana", "ana@example.com", "Hola");
        input.remove("mensaje");
        assert_eq!(validate(&input), Err(ContactError::MissingFields));
    }

    #[test]
    fn malformed_email_shows_error() {
        let ui = RecordingUi::default();
        let outcome = block_on(submit(&ui, &fields("Ana", "not-an-email", "Hola"), |_| async {
            Ok::<(), ContactError>(())
        }));
        assert_eq!(outcome, Err(ContactError::InvalidEmail));
        assert_eq!(
            *ui.steps.borrow(),
            vec![Step::Toast(MSG_INVALID_EMAIL.to_string(), ToastKind::Error)]
        );
    }

    #[test]
    fn valid_submission_runs_in_order() {
        let ui = RecordingUi::default();
        let delivered = RefCell::new(None);
        let outcome = block_on(submit(&ui, &fields("Ana", "ana@example.com", "Hola"), |payload| {
            *delivered.borrow_mut() = Some(payload);
            async { Ok::<(), ContactError>(()) }
        }));
        assert_eq!(outcome, Ok(()));
        assert_eq!(
            *ui.steps.borrow(),
            vec![
                Step::Busy(true),
                Step::Toast(MSG_SENT.to_string(), ToastKind::Success),
                Step::Reset,
                Step::Busy(false),
            ]
        );
        assert_eq!(
            delivered.borrow().as_ref().map(|p| p.correo.as_str()),
            Some("ana@example.com")
        );
    }

    #[test]
    fn failed_delivery_still_reenables_button() {
        let ui = RecordingUi::default();
        let outcome = block_on(submit(&ui, &fields("Ana", "ana@example.com", "Hola"), |_| async {
            Err::<(), _>(ContactError::Delivery("timeout".to_string()))
        }));
        assert!(matches!(outcome, Err(ContactError::Delivery(_))));
        assert_eq!(
            *ui.steps.borrow(),
            vec![
                Step::Busy(true),
                Step::Toast(MSG_FAILED.to_string(), ToastKind::Error),
                Step::Busy(false),
            ]
        );
    }

    #[test]
    fn busy_label_restores_original_markup() {
        let mut swap = LabelSwap::default();
        swap.begin(r#"<span class="icon"></span> Enviar"#.to_string());
        assert_eq!(swap.end().as_deref(), Some(r#"<span class="icon"></span> Enviar"#));
        assert_eq!(swap.end(), None);
    }

    #[test]
    fn repeated_busy_keeps_first_markup() {
        let mut swap = LabelSwap::default();
        swap.begin("<b>Enviar</b>".to_string());
        swap.begin(BUSY_LABEL.to_string());
        assert_eq!(swap.end().as_deref(), Some("<b>Enviar</b>"));
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.mx"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("ana @example.com"));
    }

    #[test]
    fn payload_serializes_flat() {
        let payload = validate(&fields("Ana", "ana@example.com", "Hola")).expect("payload");
        let json = serde_json::to_value(&payload).expect("json");
        assert_eq!(
            json,
            serde_json::json!({"nombre": "Ana", "correo": "ana@example.com", "mensaje": "Hola"})
        );
    }
}
