//! WebAssembly bindings for the bootstrap harness.
//!
//! This module provides the browser implementations of the two seams the
//! core is written against, plus the JavaScript-callable entry point:
//!
//! - [`JsModuleProvider`]: dynamic `import()` of the emulator module
//! - [`JsComponentFactory`]: `new Component({ target, props })`
//! - [`api::boot`]: load, then mount, from JavaScript

pub mod api;
pub mod component;
pub mod provider;

pub use api::{BootedApp, HarnessError};
pub use component::JsComponentFactory;
pub use provider::JsModuleProvider;

use wasm_bindgen::{JsCast, JsValue};

/// Best-effort human readable rendering of a thrown JavaScript value.
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{:?}", value)
}
