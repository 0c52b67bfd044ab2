//! Error types for module loading, mounting and the bootstrap sequence.
//!
//! The taxonomy mirrors the stages of a boot:
//!
//! - [`ProviderError`]: the host runtime could not hand back an instance
//! - [`ModuleLoadError`]: the module could not be fetched, parsed, instantiated,
//!   or does not honour the export contract
//! - [`InitializationError`]: the module loaded but its initializer failed
//! - [`MountError`]: the UI framework could not construct the root component
//! - [`BootError`]: everything the bootstrap reports to its caller

use thiserror::Error;

use crate::bootstrap::BootState;

/// Failure reported by a [`ModuleProvider`](crate::ModuleProvider) while
/// producing a fresh module instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The binary could not be fetched (network error, missing file).
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The binary was fetched but is not a valid module.
    #[error("malformed module: {0}")]
    Malformed(String),

    /// The runtime cannot instantiate this kind of module.
    #[error("unsupported runtime: {0}")]
    Unsupported(String),
}

/// Failure raised while invoking or resolving an export.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// The exported function ran and reported an error.
    #[error("{0}")]
    Failed(String),

    /// No export with this name exists in the table.
    #[error("no export named `{0}`")]
    Missing(String),

    /// The export exists but has a different shape than the caller expects.
    #[error("export `{name}` is not {expected}")]
    WrongKind {
        /// Export name
        name: String,
        /// Human readable description of the expected shape
        expected: &'static str,
    },
}

/// The binary module could not be obtained in a usable form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleLoadError {
    /// The provider failed to fetch or instantiate the module.
    #[error("failed to instantiate module `{specifier}`: {cause}")]
    Instantiate {
        /// Module specifier that was requested
        specifier: String,
        /// Underlying provider failure
        #[source]
        cause: ProviderError,
    },

    /// A required export is absent from the instantiated module.
    #[error("module `{specifier}` does not export `{name}`")]
    MissingExport {
        /// Module specifier that was requested
        specifier: String,
        /// Name of the missing export
        name: String,
    },

    /// A required export is present but has the wrong shape.
    #[error("export `{name}` of module `{specifier}` is not {expected}")]
    ExportKind {
        /// Module specifier that was requested
        specifier: String,
        /// Name of the offending export
        name: String,
        /// Expected shape
        expected: &'static str,
    },
}

/// The module was instantiated but its initializer failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("initializer `{export}` of module `{specifier}` failed: {cause}")]
pub struct InitializationError {
    /// Module specifier that was requested
    pub specifier: String,
    /// Name of the initializer export
    pub export: String,
    /// Underlying export failure
    #[source]
    pub cause: ExportError,
}

/// Any failure of [`ModuleLoader::load`](crate::ModuleLoader::load).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error(transparent)]
    Module(#[from] ModuleLoadError),

    #[error(transparent)]
    Initialization(#[from] InitializationError),
}

/// The UI framework could not mount the root component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    /// The mount target does not resolve to an element of the page.
    #[error("mount target `{0}` not found")]
    TargetNotFound(String),

    /// The component constructor rejected its configuration.
    #[error("component construction failed: {0}")]
    Construct(String),
}

/// Failure of [`AppBootstrap::start`](crate::AppBootstrap::start).
///
/// Load and initialization failures are reported through the same
/// [`BootError::Load`] variant; the bootstrap does not treat them differently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootError {
    #[error("bootstrap failed: {0}")]
    Load(#[from] LoadError),

    #[error("bootstrap failed: {0}")]
    Mount(#[from] MountError),

    /// `start` was called after the bootstrap left the idle state.
    #[error("bootstrap already started (state: {0})")]
    AlreadyStarted(BootState),
}

impl BootError {
    /// Short machine-readable tag for the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            BootError::Load(LoadError::Module(_)) => "module-load",
            BootError::Load(LoadError::Initialization(_)) => "initialization",
            BootError::Mount(_) => "mount",
            BootError::AlreadyStarted(_) => "already-started",
        }
    }
}

/// Configuration could not be parsed or is inconsistent.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
