//! Export table of an instantiated binary module.
//!
//! A module hands its host a set of named callables. The harness only needs
//! to know four shapes:
//!
//! - **Initializer**: zero arguments, completes asynchronously
//! - **Draw**: renders one emulator frame onto a [`Surface`]
//! - **Routine**: any other zero-argument entry point, synchronous
//! - **Task**: a zero-argument entry point whose completion is awaited
//!
//! # Example
//!
//! ```rust
//! use chip8_boot::{Export, ExportTable, Surface};
//!
//! let mut table = ExportTable::new();
//! table.insert("default", Export::initializer(|| async { Ok(()) }));
//! table.insert("draw_to_canvas", Export::draw(|_surface: &Surface| Ok(())));
//!
//! assert_eq!(table.len(), 2);
//! assert!(table.contains("draw_to_canvas"));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Element id of the canvas the emulator draws on unless configured otherwise.
pub const DEFAULT_CANVAS_ID: &str = "chip8_canvas";

/// Drawing surface identified by the host page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surface {
    canvas_id: String,
}

impl Surface {
    pub fn new(canvas_id: impl Into<String>) -> Self {
        Surface {
            canvas_id: canvas_id.into(),
        }
    }

    /// Element id of the canvas.
    pub fn canvas_id(&self) -> &str {
        &self.canvas_id
    }
}

impl Default for Surface {
    fn default() -> Self {
        Surface::new(DEFAULT_CANVAS_ID)
    }
}

pub type InitFn = Rc<dyn Fn() -> LocalBoxFuture<'static, Result<(), ExportError>>>;
pub type DrawFn = Rc<dyn Fn(&Surface) -> Result<(), ExportError>>;
pub type RoutineFn = Rc<dyn Fn() -> Result<(), ExportError>>;
pub type TaskFn = Rc<dyn Fn() -> LocalBoxFuture<'static, Result<(), ExportError>>>;

/// A single callable exported by a module.
#[derive(Clone)]
pub enum Export {
    /// One-time setup routine, possibly asynchronous.
    Initializer(InitFn),
    /// Renders one frame onto a surface.
    Draw(DrawFn),
    /// Synchronous zero-argument entry point.
    Routine(RoutineFn),
    /// Zero-argument entry point that completes asynchronously.
    Task(TaskFn),
}

impl Export {
    /// Wrap an async closure as an initializer export.
    pub fn initializer<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<(), ExportError>> + 'static,
    {
        Export::Initializer(Rc::new(move || f().boxed_local()))
    }

    pub fn draw<F>(f: F) -> Self
    where
        F: Fn(&Surface) -> Result<(), ExportError> + 'static,
    {
        Export::Draw(Rc::new(f))
    }

    pub fn routine<F>(f: F) -> Self
    where
        F: Fn() -> Result<(), ExportError> + 'static,
    {
        Export::Routine(Rc::new(f))
    }

    pub fn task<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<(), ExportError>> + 'static,
    {
        Export::Task(Rc::new(move || f().boxed_local()))
    }

    /// Shape name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Export::Initializer(_) => "an initializer",
            Export::Draw(_) => "a draw routine",
            Export::Routine(_) => "a routine",
            Export::Task(_) => "a task",
        }
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Export::Initializer(_) => "Initializer",
            Export::Draw(_) => "Draw",
            Export::Routine(_) => "Routine",
            Export::Task(_) => "Task",
        };
        f.write_str(name)
    }
}

/// Mapping from export name to callable.
#[derive(Debug, Clone, Default)]
pub struct ExportTable {
    entries: BTreeMap<String, Export>,
}

impl ExportTable {
    pub fn new() -> Self {
        ExportTable::default()
    }

    /// Register an export, replacing any previous export of the same name.
    pub fn insert(&mut self, name: impl Into<String>, export: Export) -> Option<Export> {
        self.entries.insert(name.into(), export)
    }

    pub fn get(&self, name: &str) -> Option<&Export> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Export names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invoke a synchronous routine export by name.
    pub fn call(&self, name: &str) -> Result<(), ExportError> {
        match self.get(name) {
            Some(Export::Routine(f)) => f(),
            Some(_) => Err(ExportError::WrongKind {
                name: name.to_string(),
                expected: "a routine",
            }),
            None => Err(ExportError::Missing(name.to_string())),
        }
    }

    /// Invoke a routine or task export by name and wait for it to finish.
    ///
    /// The returned future owns the callable, so it does not borrow the table.
    pub fn run(&self, name: &str) -> LocalBoxFuture<'static, Result<(), ExportError>> {
        match self.get(name) {
            Some(Export::Task(f)) => f(),
            Some(Export::Routine(f)) => futures::future::ready(f()).boxed_local(),
            Some(_) => futures::future::ready(Err(ExportError::WrongKind {
                name: name.to_string(),
                expected: "a routine or task",
            }))
            .boxed_local(),
            None => {
                futures::future::ready(Err(ExportError::Missing(name.to_string()))).boxed_local()
            }
        }
    }
}

impl<N: Into<String>> FromIterator<(N, Export)> for ExportTable {
    fn from_iter<I: IntoIterator<Item = (N, Export)>>(iter: I) -> Self {
        ExportTable {
            entries: iter.into_iter().map(|(n, e)| (n.into(), e)).collect(),
        }
    }
}
