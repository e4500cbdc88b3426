//! Registration of loaded components.
//!
//! Every load is issued a process-unique [`LoadTicket`]. Before the loaded bundle
//! runs, the element opens a slot for that ticket in its [`Registry`]; the bundle
//! receives a [`Registrar`] scoped to the same ticket and hands its component
//! factory back through it. Since slots are keyed by ticket, a registry may be
//! shared between elements and concurrent loads never observe each other's
//! factories.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::cell::RefCell;
use std::collections::HashMap;

use thiserror::Error;

use crate::loader::Source;
use crate::renderer::Renderer;

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Identifier of a single load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    /// Issues a new ticket, distinct from every ticket issued before in this process.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_TICKET.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value of the ticket.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors returned when handing a factory to a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The load was superseded or already completed; its slot no longer exists.
    #[error("no registration is open for load {0}")]
    Closed(LoadTicket),
    /// A factory was already registered for this load.
    #[error("a component was already registered for load {0}")]
    AlreadyRegistered(LoadTicket),
}

/// Typed registration slots keyed by [`LoadTicket`].
pub struct Registry<F> {
    slots: RefCell<HashMap<LoadTicket, Option<F>>>,
}

impl<F> Registry<F> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(HashMap::new()),
        }
    }

    /// Opens an empty slot for `ticket`, discarding anything left in it.
    pub(crate) fn open(&self, ticket: LoadTicket) {
        self.slots.borrow_mut().insert(ticket, None);
    }

    /// Stores `factory` in the slot opened for `ticket`.
    ///
    /// # Errors
    ///
    /// Fails if no slot is open for `ticket` or if it already holds a factory.
    pub fn register(&self, ticket: LoadTicket, factory: F) -> Result<(), RegistrationError> {
        let mut slots = self.slots.borrow_mut();
        let slot = slots
            .get_mut(&ticket)
            .ok_or(RegistrationError::Closed(ticket))?;
        if slot.is_some() {
            return Err(RegistrationError::AlreadyRegistered(ticket));
        }
        *slot = Some(factory);
        Ok(())
    }

    /// Closes the slot for `ticket`, returning the registered factory if any.
    pub(crate) fn close(&self, ticket: LoadTicket) -> Option<F> {
        self.slots.borrow_mut().remove(&ticket).flatten()
    }

    /// Returns `true` while a slot is open for `ticket`.
    #[must_use]
    pub fn is_open(&self, ticket: LoadTicket) -> bool {
        self.slots.borrow().contains_key(&ticket)
    }

    /// Number of open slots.
    #[must_use]
    pub fn open_slots(&self) -> usize {
        self.slots.borrow().len()
    }
}

impl<F> Default for Registry<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> fmt::Debug for Registry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tickets: Vec<_> = self.slots.borrow().keys().copied().collect();
        tickets.sort_unstable();
        f.debug_struct("Registry")
            .field("open", &tickets)
            .finish_non_exhaustive()
    }
}

/// Handle through which an executing bundle registers its component.
///
/// This is the registration entry point of the bundle contract: the bundle is
/// given the rendering primitives and must hand back exactly one factory.
pub struct Registrar<'a, R: Renderer> {
    ticket: LoadTicket,
    source: &'a Source,
    registry: &'a Registry<R::Factory>,
    primitives: &'a R,
}

impl<'a, R: Renderer> Registrar<'a, R> {
    pub(crate) const fn new(
        ticket: LoadTicket,
        source: &'a Source,
        registry: &'a Registry<R::Factory>,
        primitives: &'a R,
    ) -> Self {
        Self {
            ticket,
            source,
            registry,
            primitives,
        }
    }

    /// Ticket of the load this registrar belongs to.
    #[must_use]
    pub const fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    /// Source the bundle was loaded from.
    #[must_use]
    pub const fn source(&self) -> &Source {
        self.source
    }

    /// Rendering primitives made available to the bundle.
    #[must_use]
    pub const fn primitives(&self) -> &R {
        self.primitives
    }

    /// Registers the component factory for this load.
    ///
    /// # Errors
    ///
    /// Fails if the load is no longer awaiting a registration.
    pub fn register(self, factory: R::Factory) -> Result<(), RegistrationError> {
        self.registry.register(self.ticket, factory)
    }

    /// Builds the factory from the rendering primitives and registers it.
    ///
    /// # Errors
    ///
    /// Fails if the load is no longer awaiting a registration.
    pub fn register_with(
        self,
        build: impl FnOnce(&R) -> R::Factory,
    ) -> Result<(), RegistrationError> {
        let factory = build(self.primitives);
        self.register(factory)
    }
}

impl<R: Renderer> fmt::Debug for Registrar<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registrar")
            .field("ticket", &self.ticket)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
