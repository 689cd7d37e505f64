//! Browser console logging.
//!
//! Messages carry a bracketed component prefix, e.g. `[Loader] ...`.

macro_rules! console_log {
    ($($arg:tt)*) => {
        web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(&format!($($arg)*)))
    };
}

macro_rules! console_warn {
    ($($arg:tt)*) => {
        web_sys::console::warn_1(&wasm_bindgen::JsValue::from_str(&format!($($arg)*)))
    };
}

macro_rules! console_error {
    ($($arg:tt)*) => {
        web_sys::console::error_1(&wasm_bindgen::JsValue::from_str(&format!($($arg)*)))
    };
}
