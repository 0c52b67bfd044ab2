//! Sequencing of module readiness before UI construction.
//!
//! [`AppBootstrap::start`] walks a one-way state machine:
//!
//! ```text
//! Idle ──start()──> AwaitingModule ──load ok, mount ok──> Mounted
//!                         │
//!                         └──load, init or mount failed──> Failed
//! ```
//!
//! The only suspension point is the wait for the module. The component
//! factory is called strictly after the loader returned a ready handle, and
//! at most once.
//!
//! # Failure policy
//!
//! Failures propagate. `start` returns the [`BootError`] to its caller and
//! leaves the page without a mounted application; there is no retry and no
//! fallback UI. The bootstrap logs the state change at debug level only, so
//! reporting the failure is left to whoever awaits `start` (the browser entry
//! point turns it into a rejected promise).

use std::cell::Cell;
use std::fmt;

use futures::future::LocalBoxFuture;
use log::{debug, info};

use crate::config::BootConfig;
use crate::error::{BootError, ExportError};
use crate::exports::Surface;
use crate::loader::{LoadState, ModuleHandle, ModuleLoader, ModuleProvider};
use crate::ui::{ComponentFactory, MountTarget, PropertyBag, UiInstance};

/// Progress of a bootstrap run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootState {
    Idle,
    AwaitingModule,
    Mounted,
    Failed,
}

impl BootState {
    /// `Mounted` and `Failed` are never left.
    pub fn is_terminal(self) -> bool {
        matches!(self, BootState::Mounted | BootState::Failed)
    }
}

impl fmt::Display for BootState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            BootState::Idle => "idle",
            BootState::AwaitingModule => "awaiting module",
            BootState::Mounted => "mounted",
            BootState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A booted application: the mounted UI plus the module it was gated on.
#[derive(Debug)]
pub struct App<C> {
    ui: UiInstance<C>,
    module: ModuleHandle,
    surface: Surface,
}

impl<C> App<C> {
    pub fn ui(&self) -> &UiInstance<C> {
        &self.ui
    }

    pub fn module(&self) -> &ModuleHandle {
        &self.module
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Draw one frame on the configured surface.
    pub fn draw(&self) -> Result<(), ExportError> {
        self.module.draw(&self.surface)
    }

    /// Draw one frame on another surface.
    pub fn draw_on(&self, surface: &Surface) -> Result<(), ExportError> {
        self.module.draw(surface)
    }

    /// Invoke a routine export of the module.
    pub fn call(&self, name: &str) -> Result<(), ExportError> {
        self.module.call(name)
    }

    /// Invoke a routine or task export and wait for it to complete.
    pub fn run(&self, name: &str) -> LocalBoxFuture<'static, Result<(), ExportError>> {
        self.module.run(name)
    }
}

/// Loads the module, then mounts the root component.
pub struct AppBootstrap<P, F> {
    loader: ModuleLoader<P>,
    factory: F,
    mount: MountTarget,
    props: PropertyBag,
    surface: Surface,
    state: Cell<BootState>,
}

impl<P, F> AppBootstrap<P, F>
where
    P: ModuleProvider,
    F: ComponentFactory,
{
    pub fn new(config: BootConfig, provider: P, factory: F) -> Self {
        let BootConfig {
            module,
            mount,
            props,
            surface,
        } = config;

        AppBootstrap {
            loader: ModuleLoader::new(provider, module),
            factory,
            mount,
            props,
            surface,
            state: Cell::new(BootState::Idle),
        }
    }

    pub fn state(&self) -> BootState {
        self.state.get()
    }

    /// State of the underlying module load.
    pub fn load_state(&self) -> LoadState {
        self.loader.state()
    }

    /// Load the module and mount the root component once it is ready.
    ///
    /// Suspends until the module load settles; no timeout applies. May only
    /// be called once.
    ///
    /// # Errors
    ///
    /// - [`BootError::AlreadyStarted`] if the bootstrap left `Idle` before
    /// - [`BootError::Load`] if the module failed to load or initialize
    /// - [`BootError::Mount`] if the component could not be constructed
    pub async fn start(&self) -> Result<App<F::Component>, BootError> {
        let state = self.state.get();
        if state != BootState::Idle {
            return Err(BootError::AlreadyStarted(state));
        }
        self.transition(BootState::AwaitingModule);

        let module = match self.loader.load().await {
            Ok(module) => module,
            Err(err) => {
                self.transition(BootState::Failed);
                return Err(err.into());
            }
        };

        let component = match self.factory.construct(&self.mount, &self.props) {
            Ok(component) => component,
            Err(err) => {
                self.transition(BootState::Failed);
                return Err(err.into());
            }
        };

        self.transition(BootState::Mounted);
        info!(
            "mounted application at `{}` (module handle {})",
            self.mount.selector(),
            module.id()
        );

        Ok(App {
            ui: UiInstance::new(self.mount.clone(), self.props.clone(), component),
            module,
            surface: self.surface.clone(),
        })
    }

    fn transition(&self, next: BootState) {
        debug!("bootstrap: {} -> {}", self.state.get(), next);
        self.state.set(next);
    }
}

impl<P, F> fmt::Debug for AppBootstrap<P, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AppBootstrap")
            .field("mount", &self.mount)
            .field("props", &self.props)
            .field("state", &self.state.get())
            .finish()
    }
}
