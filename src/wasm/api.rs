//! WASM API for the bootstrap harness.
//!
//! Provides the JavaScript-callable entry point that loads the emulator
//! module, mounts the root component and hands the module's exports back to
//! the page.
//!
//! ```js
//! import App from './App.svelte';
//! import { boot } from 'chip8_boot';
//!
//! const app = await boot(App, JSON.stringify({ props: { name: 'world' } }));
//! app.draw();
//! ```

use std::cell::Cell;

use js_sys::{Function, Promise};
use log::Level;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use super::{JsComponentFactory, JsModuleProvider};
use crate::bootstrap::{App, AppBootstrap, BootState};
use crate::config::BootConfig;
use crate::error::{BootError, ConfigError, ExportError, MountError};
use crate::exports::Surface;

thread_local! {
    // One bootstrap per page session.
    static PAGE_BOOT: Cell<BootState> = const { Cell::new(BootState::Idle) };
}

/// Install the panic hook and route `log` records to the browser console.
#[wasm_bindgen(start)]
pub fn install_hooks() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed.
    let _ = console_log::init_with_level(Level::Debug);
}

/// JavaScript-compatible error wrapper
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct HarnessError {
    message: String,
    kind: String,
}

#[wasm_bindgen]
impl HarnessError {
    #[wasm_bindgen(constructor)]
    pub fn new(message: &str, kind: &str) -> HarnessError {
        HarnessError {
            message: message.to_string(),
            kind: kind.to_string(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }

    /// Failure class: `config`, `module-load`, `initialization`, `mount`,
    /// `already-started` or `export`.
    #[wasm_bindgen(getter)]
    pub fn kind(&self) -> String {
        self.kind.clone()
    }
}

impl From<BootError> for HarnessError {
    fn from(err: BootError) -> Self {
        HarnessError::new(&err.to_string(), err.kind())
    }
}

impl From<ConfigError> for HarnessError {
    fn from(err: ConfigError) -> Self {
        HarnessError::new(&err.to_string(), "config")
    }
}

impl From<MountError> for HarnessError {
    fn from(err: MountError) -> Self {
        BootError::from(err).into()
    }
}

impl From<ExportError> for HarnessError {
    fn from(err: ExportError) -> Self {
        HarnessError::new(&err.to_string(), "export")
    }
}

/// A mounted application together with the module's exports.
#[wasm_bindgen]
pub struct BootedApp {
    app: App<JsValue>,
}

#[wasm_bindgen]
impl BootedApp {
    /// The root component instance created by the UI framework.
    #[wasm_bindgen(getter)]
    pub fn component(&self) -> JsValue {
        self.app.ui().component().clone()
    }

    #[wasm_bindgen(getter)]
    pub fn handle_id(&self) -> f64 {
        self.app.module().id().get() as f64 // Convert u64 to f64 for JavaScript
    }

    /// Names of the functions the module exports.
    pub fn exports(&self) -> Vec<JsValue> {
        self.app
            .module()
            .exports()
            .names()
            .map(JsValue::from_str)
            .collect()
    }

    /// Draw one frame on the configured canvas.
    pub fn draw(&self) -> Result<(), HarnessError> {
        Ok(self.app.draw()?)
    }

    /// Draw one frame on the canvas with the given element id.
    pub fn draw_on(&self, canvas_id: &str) -> Result<(), HarnessError> {
        Ok(self.app.draw_on(&Surface::new(canvas_id))?)
    }

    /// Invoke a zero-argument export of the module by name.
    ///
    /// The promise settles once the export has completed, including any
    /// promise the export itself returned, and rejects with a `HarnessError`.
    pub fn call(&self, name: &str) -> Promise {
        let pending = self.app.run(name);
        future_to_promise(async move {
            pending
                .await
                .map(|()| JsValue::UNDEFINED)
                .map_err(|e| JsValue::from(HarnessError::from(e)))
        })
    }
}

/// Load the emulator module, then mount `component` into the page.
///
/// `config_json` overrides the page constants (see `BootConfig`); `importer`
/// replaces the native `import()`, for pages whose bundler resolves the
/// module specifier. The returned promise rejects with a `HarnessError` when
/// any stage fails; nothing is mounted in that case.
#[wasm_bindgen]
pub async fn boot(
    component: Function,
    config_json: Option<String>,
    importer: Option<Function>,
) -> Result<BootedApp, HarnessError> {
    let previous = PAGE_BOOT.with(|state| state.replace(BootState::AwaitingModule));
    if previous != BootState::Idle {
        PAGE_BOOT.with(|state| state.set(previous));
        return Err(BootError::AlreadyStarted(previous).into());
    }

    let result = boot_page(component, config_json, importer).await;
    let settled = if result.is_ok() {
        BootState::Mounted
    } else {
        BootState::Failed
    };
    PAGE_BOOT.with(|state| state.set(settled));
    result
}

async fn boot_page(
    component: Function,
    config_json: Option<String>,
    importer: Option<Function>,
) -> Result<BootedApp, HarnessError> {
    let config = match config_json {
        Some(json) => BootConfig::from_json(&json)?,
        None => BootConfig::default(),
    };
    let provider = match importer {
        Some(importer) => JsModuleProvider::with_importer(importer, config.module.clone()),
        None => JsModuleProvider::new(config.module.clone()),
    };
    let factory = JsComponentFactory::new(component)?;

    let bootstrap = AppBootstrap::new(config, provider, factory);
    let app = bootstrap.start().await?;
    Ok(BootedApp { app })
}
