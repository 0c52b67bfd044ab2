//! Asynchronous acquisition of the binary module.
//!
//! [`ModuleLoader`] asks an injected [`ModuleProvider`] for a fresh module
//! instance, checks the export contract, runs the module's initializer and
//! only then hands out a [`ModuleHandle`].
//!
//! # Initialization policy
//!
//! The loader runs the initializer itself before returning. A handle can only
//! be obtained from [`ModuleLoader::load`], so every handle a caller holds
//! belongs to an initialized module and [`ModuleHandle::draw`] can never run
//! ahead of the initializer.
//!
//! # Example
//!
//! ```rust
//! use chip8_boot::{Export, ExportTable, LoadState, ModuleLoader, ModuleProvider, ModuleSpec};
//! use chip8_boot::ProviderError;
//! use futures::future::{FutureExt, LocalBoxFuture};
//!
//! struct StaticModule;
//!
//! impl ModuleProvider for StaticModule {
//!     fn instantiate(&self, _specifier: &str) -> LocalBoxFuture<'_, Result<ExportTable, ProviderError>> {
//!         let mut table = ExportTable::new();
//!         table.insert("default", Export::initializer(|| async { Ok(()) }));
//!         table.insert("draw_to_canvas", Export::draw(|_| Ok(())));
//!         futures::future::ready(Ok::<_, ProviderError>(table)).boxed_local()
//!     }
//! }
//!
//! let loader = ModuleLoader::new(StaticModule, ModuleSpec::default());
//! assert_eq!(loader.state(), LoadState::Unloaded);
//!
//! let handle = futures::executor::block_on(loader.load()).unwrap();
//! assert_eq!(loader.state(), LoadState::Ready);
//! handle.draw(&Default::default()).unwrap();
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, InitializationError, LoadError, ModuleLoadError, ProviderError};
use crate::exports::{Export, ExportTable, Surface};

/// Specifier the module is imported by when nothing else is configured.
pub const DEFAULT_SPECIFIER: &str = "chip8_rust_wasm";

/// Name of the initializer export (the module's default export).
pub const DEFAULT_INIT_EXPORT: &str = "default";

/// Name of the frame-draw export.
pub const DEFAULT_DRAW_EXPORT: &str = "draw_to_canvas";

/// Source of fresh module instances.
///
/// Implementations resolve the specifier, fetch and compile the binary and
/// return its export table. Each call must produce a new instance; the loader
/// never caches.
pub trait ModuleProvider {
    fn instantiate(&self, specifier: &str) -> LocalBoxFuture<'_, Result<ExportTable, ProviderError>>;
}

impl<P: ModuleProvider + ?Sized> ModuleProvider for Rc<P> {
    fn instantiate(&self, specifier: &str) -> LocalBoxFuture<'_, Result<ExportTable, ProviderError>> {
        (**self).instantiate(specifier)
    }
}

impl<P: ModuleProvider + ?Sized> ModuleProvider for &P {
    fn instantiate(&self, specifier: &str) -> LocalBoxFuture<'_, Result<ExportTable, ProviderError>> {
        (**self).instantiate(specifier)
    }
}

/// Build-time contract between the harness and the module producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleSpec {
    /// Path or package specifier the module is imported by.
    pub specifier: String,
    /// Name of the zero-argument initializer export.
    pub init_export: String,
    /// Name of the frame-draw export.
    pub draw_export: String,
}

impl Default for ModuleSpec {
    fn default() -> Self {
        ModuleSpec {
            specifier: DEFAULT_SPECIFIER.to_string(),
            init_export: DEFAULT_INIT_EXPORT.to_string(),
            draw_export: DEFAULT_DRAW_EXPORT.to_string(),
        }
    }
}

/// Lifecycle of the most recent load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            LoadState::Unloaded => "unloaded",
            LoadState::Loading => "loading",
            LoadState::Ready => "ready",
            LoadState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Identity of one loaded module instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandleId(u64);

impl HandleId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A loaded and initialized module instance.
///
/// Only [`ModuleLoader::load`] creates handles. Callers reach the export
/// table by reference and never re-instantiate the module through it.
///
/// A handle cannot be assembled outside the loader, so there is no way to
/// reach the draw routine of a module whose initializer has not completed:
///
/// ```compile_fail
/// use chip8_boot::{ExportTable, ModuleHandle};
///
/// let handle = ModuleHandle {
///     id: todo!(),
///     specifier: "chip8_rust_wasm".to_string(),
///     draw_export: "draw_to_canvas".to_string(),
///     exports: ExportTable::new(),
/// };
/// ```
#[derive(Debug)]
pub struct ModuleHandle {
    id: HandleId,
    specifier: String,
    draw_export: String,
    exports: ExportTable,
}

impl ModuleHandle {
    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn specifier(&self) -> &str {
        &self.specifier
    }

    /// Read-only view of the module's export table.
    pub fn exports(&self) -> &ExportTable {
        &self.exports
    }

    /// Render one emulator frame onto `surface`.
    ///
    /// Concurrent callers are not serialized here; the module owns any
    /// locking its draw routine needs.
    pub fn draw(&self, surface: &Surface) -> Result<(), ExportError> {
        match self.exports.get(&self.draw_export) {
            Some(Export::Draw(f)) => f(surface),
            // The loader validated the draw export before building the handle.
            Some(_) => Err(ExportError::WrongKind {
                name: self.draw_export.clone(),
                expected: "a draw routine",
            }),
            None => Err(ExportError::Missing(self.draw_export.clone())),
        }
    }

    /// Invoke a zero-argument routine export by name.
    pub fn call(&self, name: &str) -> Result<(), ExportError> {
        self.exports.call(name)
    }

    /// Invoke a routine or task export and wait for it to complete.
    pub fn run(&self, name: &str) -> LocalBoxFuture<'static, Result<(), ExportError>> {
        self.exports.run(name)
    }
}

/// Obtains ready-to-use module instances from a [`ModuleProvider`].
pub struct ModuleLoader<P> {
    provider: P,
    spec: ModuleSpec,
    state: Cell<LoadState>,
    next_id: Cell<u64>,
    // Sequence number of the latest load request; older requests that
    // settle late leave `state` alone.
    requests: Cell<u64>,
}

impl<P: ModuleProvider> ModuleLoader<P> {
    pub fn new(provider: P, spec: ModuleSpec) -> Self {
        ModuleLoader {
            provider,
            spec,
            state: Cell::new(LoadState::Unloaded),
            next_id: Cell::new(1),
            requests: Cell::new(0),
        }
    }

    /// State of the most recently requested load.
    ///
    /// When loads overlap, only the latest request moves the state out of
    /// [`LoadState::Loading`]; an earlier request settling afterwards does not
    /// overwrite it.
    pub fn state(&self) -> LoadState {
        self.state.get()
    }

    /// Instantiate and initialize a fresh copy of the module.
    ///
    /// Every call requests a new instance from the provider and, on success,
    /// returns a handle with a new [`HandleId`]. There is no timeout and no
    /// cancellation: a provider that never resolves keeps the loader in
    /// [`LoadState::Loading`].
    ///
    /// # Errors
    ///
    /// - [`ModuleLoadError`] if the provider fails or a required export is
    ///   missing or has the wrong shape
    /// - [`InitializationError`] if the initializer reports a failure
    pub async fn load(&self) -> Result<ModuleHandle, LoadError> {
        let request = self.requests.get() + 1;
        self.requests.set(request);
        self.state.set(LoadState::Loading);
        info!("loading module `{}`", self.spec.specifier);

        let result = self.instantiate_and_init().await;
        let settled = match &result {
            Ok(handle) => {
                info!(
                    "module `{}` ready as handle {}",
                    self.spec.specifier, handle.id
                );
                LoadState::Ready
            }
            Err(err) => {
                // Reporting is left to the caller, which receives the error.
                debug!("module `{}` failed to load: {}", self.spec.specifier, err);
                LoadState::Failed
            }
        };
        if self.requests.get() == request {
            self.state.set(settled);
        } else {
            debug!("load request {} settled after a newer request", request);
        }
        result
    }

    async fn instantiate_and_init(&self) -> Result<ModuleHandle, LoadError> {
        let specifier = &self.spec.specifier;

        let exports = self
            .provider
            .instantiate(specifier)
            .await
            .map_err(|cause| ModuleLoadError::Instantiate {
                specifier: specifier.clone(),
                cause,
            })?;
        debug!(
            "module `{}` instantiated with {} exports",
            specifier,
            exports.len()
        );

        let init = match self.require(&exports, &self.spec.init_export)? {
            Export::Initializer(f) => Rc::clone(f),
            _ => return Err(self.wrong_kind(&self.spec.init_export, "an initializer")),
        };
        if !matches!(
            self.require(&exports, &self.spec.draw_export)?,
            Export::Draw(_)
        ) {
            return Err(self.wrong_kind(&self.spec.draw_export, "a draw routine"));
        }

        init().await.map_err(|cause| InitializationError {
            specifier: specifier.clone(),
            export: self.spec.init_export.clone(),
            cause,
        })?;
        debug!("module `{}` initialized", specifier);

        let id = HandleId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        Ok(ModuleHandle {
            id,
            specifier: specifier.clone(),
            draw_export: self.spec.draw_export.clone(),
            exports,
        })
    }

    fn require<'t>(&self, exports: &'t ExportTable, name: &str) -> Result<&'t Export, LoadError> {
        exports.get(name).ok_or_else(|| {
            ModuleLoadError::MissingExport {
                specifier: self.spec.specifier.clone(),
                name: name.to_string(),
            }
            .into()
        })
    }

    fn wrong_kind(&self, name: &str, expected: &'static str) -> LoadError {
        ModuleLoadError::ExportKind {
            specifier: self.spec.specifier.clone(),
            name: name.to_string(),
            expected,
        }
        .into()
    }
}

impl<P> fmt::Debug for ModuleLoader<P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("spec", &self.spec)
            .field("state", &self.state.get())
            .finish()
    }
}
