//! Module provider backed by the browser's dynamic `import()`.

use futures::future::{FutureExt, LocalBoxFuture};
use js_sys::{Function, Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use super::describe;
use crate::error::{ExportError, ProviderError};
use crate::exports::{Export, ExportTable};
use crate::loader::{ModuleProvider, ModuleSpec};

/// Namespace members never exposed as exports. `initSync` re-instantiates
/// the module, which only the loader may do.
const SKIPPED_EXPORTS: &[&str] = &["initSync"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Initializer,
    Draw,
    Task,
}

fn classify(name: &str, spec: &ModuleSpec) -> Option<Shape> {
    if name == spec.init_export {
        Some(Shape::Initializer)
    } else if name == spec.draw_export {
        Some(Shape::Draw)
    } else if SKIPPED_EXPORTS.contains(&name) {
        None
    } else {
        Some(Shape::Task)
    }
}

/// Instantiates the emulator module through a JavaScript import function.
///
/// Function members of the module namespace become exports: the configured
/// initializer and draw names get their dedicated shapes, everything else is
/// exposed as a zero-argument task whose returned promise, if any, is
/// awaited. Non-function members and the synchronous re-initializer
/// `initSync` are skipped.
pub struct JsModuleProvider {
    importer: Function,
    spec: ModuleSpec,
}

impl JsModuleProvider {
    /// Use the runtime's native `import()`.
    pub fn new(spec: ModuleSpec) -> Self {
        // `import` is syntax, so it needs a function wrapper to be callable.
        let importer = Function::new_with_args("specifier", "return import(specifier);");
        JsModuleProvider { importer, spec }
    }

    /// Use a page-supplied import function, e.g. one resolved by a bundler.
    pub fn with_importer(importer: Function, spec: ModuleSpec) -> Self {
        JsModuleProvider { importer, spec }
    }

    fn export_table(&self, namespace: &Object) -> Result<ExportTable, ProviderError> {
        let mut table = ExportTable::new();

        for key in Object::keys(namespace).iter() {
            let Some(name) = key.as_string() else {
                continue;
            };
            let value = Reflect::get(namespace, &key)
                .map_err(|e| ProviderError::Malformed(describe(&e)))?;
            let Ok(func) = value.dyn_into::<Function>() else {
                continue;
            };

            let export = match classify(&name, &self.spec) {
                Some(Shape::Initializer) => initializer(func),
                Some(Shape::Draw) => draw(func),
                Some(Shape::Task) => task(func),
                None => continue,
            };
            table.insert(name, export);
        }

        Ok(table)
    }
}

impl ModuleProvider for JsModuleProvider {
    fn instantiate(&self, specifier: &str) -> LocalBoxFuture<'_, Result<ExportTable, ProviderError>> {
        let specifier = specifier.to_string();

        async move {
            let pending = self
                .importer
                .call1(&JsValue::NULL, &JsValue::from_str(&specifier))
                .map_err(|e| ProviderError::Unsupported(describe(&e)))?;
            let namespace = JsFuture::from(Promise::resolve(&pending))
                .await
                .map_err(|e| ProviderError::Fetch(describe(&e)))?;

            if !namespace.is_object() {
                return Err(ProviderError::Malformed(format!(
                    "`{}` did not resolve to a module namespace",
                    specifier
                )));
            }
            self.export_table(namespace.unchecked_ref::<Object>())
        }
        .boxed_local()
    }
}

fn initializer(func: Function) -> Export {
    Export::initializer(move || {
        let func = func.clone();
        async move {
            let result = func.call0(&JsValue::NULL).map_err(failed)?;
            // Initializers may return a promise (wasm-bindgen's default `init`).
            JsFuture::from(Promise::resolve(&result))
                .await
                .map_err(failed)?;
            Ok::<(), ExportError>(())
        }
    })
}

fn draw(func: Function) -> Export {
    Export::draw(move |surface| {
        func.call1(&JsValue::NULL, &JsValue::from_str(surface.canvas_id()))
            .map(drop)
            .map_err(failed)
    })
}

fn task(func: Function) -> Export {
    Export::task(move || {
        let func = func.clone();
        async move {
            let result = func.call0(&JsValue::NULL).map_err(failed)?;
            // A plain return value resolves immediately.
            JsFuture::from(Promise::resolve(&result))
                .await
                .map_err(failed)?;
            Ok::<(), ExportError>(())
        }
    })
}

fn failed(err: JsValue) -> ExportError {
    ExportError::Failed(describe(&err))
}
