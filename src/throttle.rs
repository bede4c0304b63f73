/// Leading-edge rate limiter. A call is accepted only when at least `wait_ms`
/// has passed since the previous accepted call; there is no trailing call.
#[derive(Debug, Clone)]
pub struct Throttle {
    wait_ms: f64,
    last: Option<f64>,
}

impl Throttle {
    pub fn new(wait_ms: f64) -> Self {
        Self { wait_ms, last: None }
    }

    pub fn accept(&mut self, now_ms: f64) -> bool {
        match self.last {
            Some(last) if now_ms - last < self.wait_ms => false,
            _ => {
                self.last = Some(now_ms);
                true
            }
        }
    }
}

/// Monotonic page time from `performance.now()`, or wall-clock time where the
/// Performance API is missing.
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or_else(web_sys::js_sys::Date::now)
}

/// Wraps an event handler so bursts collapse to one call per window.
pub fn throttled<E, F>(wait_ms: f64, mut handler: F) -> impl FnMut(E)
where
    F: FnMut(E),
{
    let mut throttle = Throttle::new(wait_ms);
    move |event: E| {
        if throttle.accept(now_ms()) {
            handler(event);
        }
    }
}
