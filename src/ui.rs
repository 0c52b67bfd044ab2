//! Boundary to the declarative UI framework.
//!
//! The harness does not render anything itself. It hands a [`MountTarget`]
//! and a [`PropertyBag`] to a [`ComponentFactory`], which constructs the root
//! component and inserts it into the page.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MountError;

/// Selector of the element the root component is mounted into by default.
pub const DEFAULT_MOUNT_SELECTOR: &str = "body";

/// Name/value configuration passed opaquely to the root component.
pub type PropertyBag = Map<String, Value>;

/// Location in the page's element tree, given as a CSS selector.
///
/// The target is passed around explicitly instead of reaching for a global
/// document, so independent bootstraps can each mount into their own page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MountTarget {
    selector: String,
}

impl MountTarget {
    pub fn new(selector: impl Into<String>) -> Self {
        MountTarget {
            selector: selector.into(),
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }
}

impl Default for MountTarget {
    fn default() -> Self {
        MountTarget::new(DEFAULT_MOUNT_SELECTOR)
    }
}

/// Constructs the root UI component.
pub trait ComponentFactory {
    /// Framework-side value representing the constructed component.
    type Component;

    /// Construct the component and append it to the page at `target`.
    ///
    /// Called at most once per bootstrap. On error nothing may be left
    /// attached to the page.
    fn construct(
        &self,
        target: &MountTarget,
        props: &PropertyBag,
    ) -> Result<Self::Component, MountError>;
}

impl<F: ComponentFactory + ?Sized> ComponentFactory for &F {
    type Component = F::Component;

    fn construct(
        &self,
        target: &MountTarget,
        props: &PropertyBag,
    ) -> Result<Self::Component, MountError> {
        (**self).construct(target, props)
    }
}

impl<F: ComponentFactory + ?Sized> ComponentFactory for std::rc::Rc<F> {
    type Component = F::Component;

    fn construct(
        &self,
        target: &MountTarget,
        props: &PropertyBag,
    ) -> Result<Self::Component, MountError> {
        (**self).construct(target, props)
    }
}

/// The mounted root component.
///
/// The page owns its lifetime; the harness never tears it down.
#[derive(Debug, Clone)]
pub struct UiInstance<C> {
    target: MountTarget,
    props: PropertyBag,
    component: C,
}

impl<C> UiInstance<C> {
    pub(crate) fn new(target: MountTarget, props: PropertyBag, component: C) -> Self {
        UiInstance {
            target,
            props,
            component,
        }
    }

    pub fn target(&self) -> &MountTarget {
        &self.target
    }

    pub fn props(&self) -> &PropertyBag {
        &self.props
    }

    pub fn component(&self) -> &C {
        &self.component
    }
}

/// Default property bag: `{ "name": "world" }`.
pub fn default_props() -> PropertyBag {
    let mut props = PropertyBag::new();
    props.insert("name".to_string(), Value::from("world"));
    props
}
