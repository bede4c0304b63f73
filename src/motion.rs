use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// Linear time progress in `[0, 1]`. A non-positive duration is already done.
pub fn progress(elapsed_ms: f64, duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    (elapsed_ms / duration_ms).clamp(0.0, 1.0)
}

/// Integer value shown at progress `p` when counting from zero up to `target`.
pub fn interpolate_units(p: f64, target: u64) -> u64 {
    let value = (p.clamp(0.0, 1.0) * target as f64).floor() as u64;
    value.min(target)
}

pub fn interpolate(p: f64, from: f64, to: f64) -> f64 {
    from + (to - from) * p.clamp(0.0, 1.0)
}

pub fn prefers_reduced_motion(window: &Window) -> bool {
    window
        .match_media(REDUCED_MOTION_QUERY)
        .ok()
        .flatten()
        .map(|query| query.matches())
        .unwrap_or(false)
}

/// Turns frame timestamps into progress, measured from the first frame seen.
#[derive(Debug, Clone)]
pub struct FrameClock {
    duration_ms: f64,
    started: Option<f64>,
}

impl FrameClock {
    pub fn new(duration_ms: f64) -> Self {
        Self { duration_ms, started: None }
    }

    pub fn tick(&mut self, now: f64) -> f64 {
        let start = *self.started.get_or_insert(now);
        progress(now - start, self.duration_ms)
    }
}

type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Calls `on_frame` with the time progress on every animation frame until it
/// reaches 1. The last call always receives exactly `1.0`. There is no way to
/// cancel a running loop.
pub fn run_frames<F>(window: &Window, duration_ms: f64, mut on_frame: F)
where
    F: FnMut(f64) + 'static,
{
    let slot: FrameSlot = Rc::new(RefCell::new(None));
    let next = slot.clone();
    let frame_window = window.clone();
    let mut clock = FrameClock::new(duration_ms);

    *slot.borrow_mut() = Some(Closure::new(move |now: f64| {
        let p = clock.tick(now);
        on_frame(p);
        if p < 1.0 {
            if let Some(callback) = next.borrow().as_ref() {
                if let Err(e) = frame_window.request_animation_frame(callback.as_ref().unchecked_ref()) {
                    log::warn!("requestAnimationFrame failed: {:?}", e);
                }
            }
        } else {
            // Drops this closure and breaks the Rc cycle.
            let _ = next.borrow_mut().take();
        }
    }));

    if let Some(callback) = slot.borrow().as_ref() {
        if let Err(e) = window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            log::warn!("requestAnimationFrame failed: {:?}", e);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_clamped() {
        assert_eq!(progress(-5.0, 1400.0), 0.0);
        assert_eq!(progress(700.0, 1400.0), 0.5);
        assert_eq!(progress(5000.0, 1400.0), 1.0);
        assert_eq!(progress(10.0, 0.0), 1.0);
    }

    #[test]
    fn interpolated_units_never_exceed_target_and_never_decrease() {
        let target = 12_345;
        let mut last = 0;
        for step in 0..=200 {
            let p = progress(f64::from(step) * 7.0, 1400.0);
            let value = interpolate_units(p, target);
            assert!(value <= target);
            assert!(value >= last);
            last = value;
        }
        assert_eq!(last, target);
    }

    #[test]
    fn clock_measures_from_first_frame() {
        let mut clock = FrameClock::new(1400.0);
        assert_eq!(clock.tick(5_000.0), 0.0);
        assert_eq!(clock.tick(5_700.0), 0.5);
        assert_eq!(clock.tick(6_400.0), 1.0);
        assert_eq!(clock.tick(9_000.0), 1.0);
    }

    #[test]
    fn interpolate_reaches_both_ends() {
        assert_eq!(interpolate(0.0, 0.0, 72.0), 0.0);
        assert_eq!(interpolate(1.0, 0.0, 72.0), 72.0);
        assert_eq!(interpolate(0.25, 0.0, 80.0), 20.0);
    }
}
