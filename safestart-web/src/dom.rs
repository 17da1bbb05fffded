use chrono::{DateTime, NaiveDate, Utc};
use num_traits::cast::cast;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Storage, Window};

/// Retrieve the global `window` object, if running in a browser.
#[must_use]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Log an error message to the browser console.
pub fn console_error(message: &str) {
    web_sys::console::error_1(&JsValue::from(message));
}

/// Access the browser `localStorage` handle.
///
/// # Errors
/// Returns an error if the browser window cannot be accessed or `localStorage` is unavailable.
pub fn local_storage() -> Result<Storage, JsValue> {
    window()
        .ok_or_else(|| JsValue::from_str("window unavailable"))?
        .local_storage()?
        .ok_or_else(|| JsValue::from_str("localStorage unavailable"))
}

/// Whole milliseconds from a JavaScript timestamp; negative or non-finite values map to 0.
#[must_use]
pub fn millis(timestamp: f64) -> u64 {
    if !timestamp.is_finite() || timestamp <= 0.0 {
        return 0;
    }
    cast::<f64, u64>(timestamp.floor()).unwrap_or(0)
}

/// Convert a JavaScript epoch timestamp into a UTC date-time.
#[must_use]
pub fn utc_from_millis(timestamp: f64) -> Option<DateTime<Utc>> {
    cast::<u64, i64>(millis(timestamp)).and_then(DateTime::from_timestamp_millis)
}

/// The current wall-clock time as reported by the browser.
#[must_use]
pub fn now_utc() -> Option<DateTime<Utc>> {
    utc_from_millis(js_sys::Date::now())
}

/// Today's date in UTC according to the browser clock.
#[must_use]
pub fn today_utc() -> Option<NaiveDate> {
    now_utc().map(|now| now.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_truncates_and_guards() {
        assert_eq!(millis(1_500.9), 1_500);
        assert_eq!(millis(-4.0), 0);
        assert_eq!(millis(f64::NAN), 0);
        assert_eq!(millis(f64::INFINITY), 0);
    }

    #[test]
    fn timestamps_convert_to_utc() {
        let ts = utc_from_millis(1_767_225_600_000.0).unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-01-01T00:00:00+00:00");
        assert_eq!(utc_from_millis(0.0).unwrap().timestamp(), 0);
    }
}
