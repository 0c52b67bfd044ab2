//! Page constants for a bootstrap run.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration:
//!
//! ```rust
//! use chip8_boot::BootConfig;
//!
//! let config = BootConfig::from_json("{}").unwrap();
//! assert_eq!(config.module.specifier, "chip8_rust_wasm");
//! assert_eq!(config.mount.selector(), "body");
//! assert_eq!(config.props["name"], "world");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::exports::Surface;
use crate::loader::ModuleSpec;
use crate::ui::{default_props, MountTarget, PropertyBag};

/// Everything [`AppBootstrap`](crate::AppBootstrap) needs to know about the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    /// Module specifier and export names.
    pub module: ModuleSpec,
    /// Where the root component is mounted.
    pub mount: MountTarget,
    /// Properties handed to the root component.
    pub props: PropertyBag,
    /// Surface frames are drawn on.
    pub surface: Surface,
}

impl Default for BootConfig {
    fn default() -> Self {
        BootConfig {
            module: ModuleSpec::default(),
            mount: MountTarget::default(),
            props: default_props(),
            surface: Surface::default(),
        }
    }
}

impl BootConfig {
    /// Parse a configuration from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: BootConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the names the harness depends on are non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("module.specifier", self.module.specifier.as_str()),
            ("module.init_export", self.module.init_export.as_str()),
            ("module.draw_export", self.module.draw_export.as_str()),
            ("mount", self.mount.selector()),
            ("surface.canvas_id", self.surface.canvas_id()),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("`{}` must not be empty", field)));
            }
        }
        if self.module.init_export == self.module.draw_export {
            return Err(ConfigError::Invalid(format!(
                "initializer and draw routine share the export name `{}`",
                self.module.init_export
            )));
        }
        Ok(())
    }

    /// Replace the property bag.
    pub fn with_props(mut self, props: PropertyBag) -> Self {
        self.props = props;
        self
    }

    pub fn with_mount(mut self, mount: MountTarget) -> Self {
        self.mount = mount;
        self
    }
}
