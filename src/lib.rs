//! # CHIP-8 Browser Bootstrap
//!
//! Loads the CHIP-8 emulator's WebAssembly module, exposes its exported entry
//! points to the hosting page, and mounts the root UI component once the
//! module is ready.
//!
//! The emulator itself lives in the binary module. This crate only sequences
//! "module loaded" before "UI mounted" and hands the export table to callers.
//!
//! ## Quick Start
//!
//! ```rust
//! use chip8_boot::{
//!     AppBootstrap, BootConfig, ComponentFactory, Export, ExportTable, MountError,
//!     MountTarget, ModuleProvider, PropertyBag, ProviderError,
//! };
//! use futures::future::{FutureExt, LocalBoxFuture};
//!
//! struct Chip8Module;
//!
//! impl ModuleProvider for Chip8Module {
//!     fn instantiate(&self, _specifier: &str) -> LocalBoxFuture<'_, Result<ExportTable, ProviderError>> {
//!         async {
//!             let mut table = ExportTable::new();
//!             table.insert("default", Export::initializer(|| async { Ok(()) }));
//!             table.insert("draw_to_canvas", Export::draw(|_| Ok(())));
//!             Ok::<_, ProviderError>(table)
//!         }
//!         .boxed_local()
//!     }
//! }
//!
//! struct Greeting;
//!
//! impl ComponentFactory for Greeting {
//!     type Component = String;
//!
//!     fn construct(&self, _target: &MountTarget, props: &PropertyBag) -> Result<String, MountError> {
//!         Ok(format!("Hello {}!", props["name"].as_str().unwrap_or("?")))
//!     }
//! }
//!
//! let boot = AppBootstrap::new(BootConfig::default(), Chip8Module, Greeting);
//! let app = futures::executor::block_on(boot.start()).unwrap();
//!
//! assert_eq!(app.ui().component(), "Hello world!");
//! app.draw().unwrap();
//! ```
//!
//! ## Modules
//!
//! - `exports` - Export table and drawing surface
//! - `loader` - Module provider seam, loader and module handles
//! - `ui` - UI framework seam, mount target and property bag
//! - `bootstrap` - The load-then-mount sequence
//! - `config` - Page constants
//! - `wasm` - Browser bindings (feature `wasm`)

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod exports;
pub mod loader;
pub mod ui;

// WASM bindings (optional, enabled with "wasm" feature)
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export public API
pub use bootstrap::{App, AppBootstrap, BootState};
pub use config::BootConfig;
pub use error::{
    BootError, ConfigError, ExportError, InitializationError, LoadError, ModuleLoadError,
    MountError, ProviderError,
};
pub use exports::{Export, ExportTable, Surface, DEFAULT_CANVAS_ID};
pub use loader::{
    HandleId, LoadState, ModuleHandle, ModuleLoader, ModuleProvider, ModuleSpec,
    DEFAULT_DRAW_EXPORT, DEFAULT_INIT_EXPORT, DEFAULT_SPECIFIER,
};
pub use ui::{ComponentFactory, MountTarget, PropertyBag, UiInstance, DEFAULT_MOUNT_SELECTOR};
