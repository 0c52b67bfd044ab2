//! Instrumented fakes shared by the integration tests.
//!
//! Every fake appends to a shared [`Journal`], so tests can assert on the
//! order in which the harness touched the module and the page.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chip8_boot::{
    ComponentFactory, Export, ExportError, ExportTable, ModuleProvider, MountError, MountTarget,
    PropertyBag, ProviderError, Surface,
};
use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};

/// Something the harness did, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Provider asked for instance number `n`.
    Instantiate(u32),
    /// Initializer of instance `n` completed.
    Init(u32),
    /// Draw routine of instance `n` ran on a canvas.
    Draw(u32, String),
    /// Routine or task export of instance `n` completed.
    Routine(u32, String),
    /// Root component mounted at a selector with a property bag.
    Mount(String, PropertyBag),
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Event>>>);

impl Journal {
    pub fn new() -> Self {
        Journal::default()
    }

    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.0.borrow().iter().filter(|e| pred(e)).count()
    }

    pub fn position(&self, pred: impl Fn(&Event) -> bool) -> Option<usize> {
        self.0.borrow().iter().position(|e| pred(e))
    }

    pub fn mounts(&self) -> usize {
        self.count(|e| matches!(e, Event::Mount(..)))
    }
}

/// How a [`FakeProvider`] behaves.
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    /// Instantiate and initialize cleanly.
    Healthy,
    /// Instantiation fails with this error.
    Reject(ProviderError),
    /// Initializer reports a failure.
    InitFails(String),
    /// Module lacks the draw export.
    NoDraw,
    /// The draw export is a plain routine.
    DrawIsRoutine,
}

/// Provider producing `default` / `draw_to_canvas` / `greet` / `start` exports.
pub struct FakeProvider {
    journal: Journal,
    behavior: Behavior,
    instances: Cell<u32>,
    specifiers: RefCell<Vec<String>>,
}

impl FakeProvider {
    pub fn new(journal: &Journal, behavior: Behavior) -> Self {
        FakeProvider {
            journal: journal.clone(),
            behavior,
            instances: Cell::new(0),
            specifiers: RefCell::new(Vec::new()),
        }
    }

    pub fn healthy(journal: &Journal) -> Self {
        FakeProvider::new(journal, Behavior::Healthy)
    }

    pub fn instances(&self) -> u32 {
        self.instances.get()
    }

    pub fn specifiers(&self) -> Vec<String> {
        self.specifiers.borrow().clone()
    }

    fn build(&self, instance: u32) -> ExportTable {
        let mut table = ExportTable::new();

        let journal = self.journal.clone();
        let init_result = match &self.behavior {
            Behavior::InitFails(msg) => Err(ExportError::Failed(msg.clone())),
            _ => Ok(()),
        };
        table.insert(
            "default",
            Export::initializer(move || {
                let journal = journal.clone();
                let result = init_result.clone();
                async move {
                    if result.is_ok() {
                        journal.push(Event::Init(instance));
                    }
                    result
                }
            }),
        );

        let journal = self.journal.clone();
        match self.behavior {
            Behavior::NoDraw => {}
            Behavior::DrawIsRoutine => {
                table.insert("draw_to_canvas", Export::routine(|| Ok(())));
            }
            _ => {
                table.insert(
                    "draw_to_canvas",
                    Export::draw(move |surface: &Surface| {
                        journal.push(Event::Draw(instance, surface.canvas_id().to_string()));
                        Ok(())
                    }),
                );
            }
        }

        let journal = self.journal.clone();
        table.insert(
            "greet",
            Export::routine(move || {
                journal.push(Event::Routine(instance, "greet".to_string()));
                Ok(())
            }),
        );

        let journal = self.journal.clone();
        table.insert(
            "start",
            Export::task(move || {
                let journal = journal.clone();
                async move {
                    journal.push(Event::Routine(instance, "start".to_string()));
                    Ok(())
                }
            }),
        );

        table
    }
}

impl ModuleProvider for FakeProvider {
    fn instantiate(&self, specifier: &str) -> LocalBoxFuture<'_, Result<ExportTable, ProviderError>> {
        let instance = self.instances.get() + 1;
        self.instances.set(instance);
        self.specifiers.borrow_mut().push(specifier.to_string());
        self.journal.push(Event::Instantiate(instance));

        let result = match &self.behavior {
            Behavior::Reject(err) => Err(err.clone()),
            _ => Ok(self.build(instance)),
        };
        futures::future::ready(result).boxed_local()
    }
}

/// Provider whose single instantiation settles only when the test says so.
pub struct GatedProvider {
    inner: FakeProvider,
    gate: RefCell<Option<oneshot::Receiver<Result<(), ProviderError>>>>,
}

impl GatedProvider {
    pub fn new(journal: &Journal) -> (Self, oneshot::Sender<Result<(), ProviderError>>) {
        let (tx, rx) = oneshot::channel();
        let provider = GatedProvider {
            inner: FakeProvider::healthy(journal),
            gate: RefCell::new(Some(rx)),
        };
        (provider, tx)
    }
}

impl ModuleProvider for GatedProvider {
    fn instantiate(&self, specifier: &str) -> LocalBoxFuture<'_, Result<ExportTable, ProviderError>> {
        let gate = self.gate.borrow_mut().take();
        let ready = self.inner.instantiate(specifier);

        async move {
            match gate {
                Some(gate) => match gate.await {
                    Ok(Ok(())) => ready.await,
                    Ok(Err(err)) => Err(err),
                    Err(_) => Err(ProviderError::Fetch("gate dropped".to_string())),
                },
                None => ready.await,
            }
        }
        .boxed_local()
    }
}

/// Page that records mounts, optionally refusing them.
pub struct FakePage {
    journal: Journal,
    refuse: Option<MountError>,
    built: Cell<u32>,
}

impl FakePage {
    pub fn new(journal: &Journal) -> Self {
        FakePage {
            journal: journal.clone(),
            refuse: None,
            built: Cell::new(0),
        }
    }

    pub fn refusing(journal: &Journal, err: MountError) -> Self {
        FakePage {
            journal: journal.clone(),
            refuse: Some(err),
            built: Cell::new(0),
        }
    }
}

/// Component value handed back by [`FakePage`].
#[derive(Debug, Clone, PartialEq)]
pub struct FakeComponent {
    pub serial: u32,
    pub selector: String,
    pub name: Option<String>,
}

impl ComponentFactory for FakePage {
    type Component = FakeComponent;

    fn construct(
        &self,
        target: &MountTarget,
        props: &PropertyBag,
    ) -> Result<FakeComponent, MountError> {
        if let Some(err) = &self.refuse {
            return Err(err.clone());
        }
        let serial = self.built.get() + 1;
        self.built.set(serial);
        self.journal
            .push(Event::Mount(target.selector().to_string(), props.clone()));

        Ok(FakeComponent {
            serial,
            selector: target.selector().to_string(),
            name: props.get("name").and_then(|v| v.as_str()).map(String::from),
        })
    }
}

pub fn is_init(e: &Event) -> bool {
    matches!(e, Event::Init(_))
}

pub fn is_draw(e: &Event) -> bool {
    matches!(e, Event::Draw(..))
}

pub fn is_mount(e: &Event) -> bool {
    matches!(e, Event::Mount(..))
}
