//! Component factory for class-style JavaScript UI components.

use js_sys::{Array, Function, Object, Reflect, JSON};
use wasm_bindgen::JsValue;
use web_sys::Document;

use super::describe;
use crate::error::MountError;
use crate::ui::{ComponentFactory, MountTarget, PropertyBag};

/// Mounts a component constructor invoked as `new Component({ target, props })`.
pub struct JsComponentFactory {
    constructor: Function,
    document: Document,
}

impl JsComponentFactory {
    /// Bind the constructor to the current window's document.
    pub fn new(constructor: Function) -> Result<Self, MountError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| MountError::Construct("no document available".to_string()))?;
        Ok(JsComponentFactory::with_document(constructor, document))
    }

    pub fn with_document(constructor: Function, document: Document) -> Self {
        JsComponentFactory {
            constructor,
            document,
        }
    }
}

impl ComponentFactory for JsComponentFactory {
    type Component = JsValue;

    fn construct(
        &self,
        target: &MountTarget,
        props: &PropertyBag,
    ) -> Result<JsValue, MountError> {
        let selector = target.selector();
        let element = self
            .document
            .query_selector(selector)
            .map_err(|e| MountError::TargetNotFound(format!("{} ({})", selector, describe(&e))))?
            .ok_or_else(|| MountError::TargetNotFound(selector.to_string()))?;

        let props_json =
            serde_json::to_string(props).map_err(|e| MountError::Construct(e.to_string()))?;
        let props = JSON::parse(&props_json).map_err(construct_failed)?;

        let options = Object::new();
        Reflect::set(&options, &JsValue::from_str("target"), &element).map_err(construct_failed)?;
        Reflect::set(&options, &JsValue::from_str("props"), &props).map_err(construct_failed)?;

        Reflect::construct(&self.constructor, &Array::of1(&options)).map_err(construct_failed)
    }
}

fn construct_failed(err: JsValue) -> MountError {
    MountError::Construct(describe(&err))
}
