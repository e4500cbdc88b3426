//! The loadable element controller.
//!
//! An [`Element`] is driven entirely by host callbacks: attachment, detachment,
//! attribute changes and [`update`](Element::update) calls. Attachment or a
//! `src` change issues a load; the load continuation runs later on the element's
//! [`Executor`]. Only the most recently issued load of an element may ever apply
//! its outcome.

use core::fmt;
use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use async_channel::{Receiver, Sender};
use futures::FutureExt;
use futures::future::{AbortHandle, Abortable};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::{DEFER_ATTRIBUTE, ElementConfig, OBSERVED_ATTRIBUTES, SRC_ATTRIBUTE};
use crate::error::LoadError;
use crate::event::ElementEvent;
use crate::executor::Executor;
use crate::loader::{Bundle, FetchError, Loader, Source};
use crate::registry::{LoadTicket, Registrar, Registry};
use crate::renderer::{self, Renderer};
use crate::state::{ReadyState, Stage};

/// Tag name under which the element is defined.
pub const TAG_NAME: &str = "x-frame";

/// Identity of an element, recorded on every log line it emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(Uuid);

impl ElementId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A component element that loads its component lazily and re-renders it on demand.
///
/// # Type Parameters
/// - `R`: rendering engine, also the primitives handed to loaded bundles
/// - `L`: loader fetching bundles from the `src` attribute
/// - `E`: executor running load continuations
pub struct Element<R: Renderer, L, E> {
    inner: Rc<Inner<R, L>>,
    executor: E,
}

struct Inner<R: Renderer, L> {
    id: ElementId,
    renderer: R,
    loader: L,
    registry: Rc<Registry<R::Factory>>,
    mount_point: R::Node,
    state: RefCell<State<R>>,
}

struct State<R: Renderer> {
    connected: bool,
    stage: Stage,
    attributes: BTreeMap<String, String>,
    factory: Option<R::Factory>,
    props: Option<R::Props>,
    pending: bool,
    rendering: bool,
    in_flight: Option<AbortHandle>,
    last_error: Option<LoadError>,
    subscribers: Vec<Sender<ElementEvent>>,
}

impl<R: Renderer> State<R> {
    const fn ready_state(&self) -> ReadyState {
        self.stage.ready_state(self.connected)
    }

    const fn renderable(&self) -> bool {
        self.connected && self.stage.has_component()
    }

    fn source(&self) -> Option<Source> {
        self.attributes.get(SRC_ATTRIBUTE).and_then(Source::new)
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    fn emit(&mut self, event: ElementEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.try_send(event.clone()).is_ok());
    }
}

impl<R: Renderer, L> Inner<R, L> {
    /// Abandons the in-flight load, if any.
    fn supersede(&self, state: &mut State<R>) {
        if let Some(handle) = state.in_flight.take() {
            handle.abort();
        }
        if let Some(ticket) = state.stage.in_flight() {
            self.registry.close(ticket);
            debug!(element = %self.id, %ticket, "Superseding in-flight load");
            state.emit(ElementEvent::Superseded { ticket });
        }
    }

    /// Renders the component with the latest props.
    ///
    /// The state is not borrowed while the renderer runs.
    fn render(&self) {
        loop {
            let (factory, props) = {
                let mut state = self.state.borrow_mut();
                let Some(factory) = state.factory.clone() else {
                    return;
                };
                state.rendering = true;
                state.pending = false;
                (factory, state.props.clone())
            };
            renderer::mount(&self.renderer, &factory, props.as_ref(), &self.mount_point);

            let mut state = self.state.borrow_mut();
            state.rendering = false;
            state.stage = state.stage.rendered();
            debug!(element = %self.id, "Rendered component");
            state.emit(ElementEvent::Rendered);
            // Updates issued by the component while it rendered.
            if !(state.pending && state.renderable()) {
                return;
            }
        }
    }

    /// Records a loaded component. Returns `true` if it should render now.
    fn loaded(
        &self,
        state: &mut State<R>,
        ticket: LoadTicket,
        source: &Source,
        factory: R::Factory,
    ) -> bool {
        state.factory = Some(factory);
        state.stage = Stage::Loaded;
        state.last_error = None;
        info!(element = %self.id, %ticket, src = %source, "Component loaded");
        state.emit(ElementEvent::Loaded {
            ticket,
            source: source.clone(),
        });

        if !state.pending && state.has_attribute(DEFER_ATTRIBUTE) {
            debug!(element = %self.id, "Render deferred until the next update");
            return false;
        }
        if !state.connected {
            state.pending = true;
        }
        state.connected
    }

    fn failed(&self, state: &mut State<R>, err: LoadError) {
        state.stage = Stage::Unloaded;
        error!(element = %self.id, src = %err.url(), "{err}");
        state.last_error = Some(err.clone());
        state.emit(ElementEvent::LoadFailed(err));
    }
}

impl<R: Renderer, L: Loader<R>> Inner<R, L> {
    /// Load continuation. Runs as its own task once the fetch settles.
    fn complete(&self, ticket: LoadTicket, source: &Source, fetched: Result<L::Bundle, FetchError>) {
        {
            let mut state = self.state.borrow_mut();
            if !state.stage.awaits(ticket) {
                warn!(element = %self.id, %ticket, "Ignoring outcome of a superseded load");
                self.registry.close(ticket);
                return;
            }
            state.in_flight = None;
        }

        // The bundle runs without the state borrowed.
        let outcome = match fetched {
            Ok(bundle) => {
                bundle.execute(Registrar::new(ticket, source, &self.registry, &self.renderer));
                self.registry
                    .close(ticket)
                    .ok_or_else(|| LoadError::MissingRegistration { url: source.clone() })
            }
            Err(err) => {
                self.registry.close(ticket);
                Err(LoadError::Fetch {
                    url: source.clone(),
                    source: err,
                })
            }
        };

        let render = {
            let mut state = self.state.borrow_mut();
            if !state.stage.awaits(ticket) {
                warn!(element = %self.id, %ticket, "Load superseded while its bundle executed");
                return;
            }
            match outcome {
                Ok(factory) => self.loaded(&mut state, ticket, source, factory),
                Err(err) => {
                    self.failed(&mut state, err);
                    false
                }
            }
        };
        if render {
            self.render();
        }
    }
}

/// Builder for [`Element`].
#[must_use = "call .build() to create the element"]
pub struct ElementBuilder<R: Renderer, L> {
    renderer: R,
    loader: L,
    mount_point: R::Node,
    config: ElementConfig,
    registry: Option<Rc<Registry<R::Factory>>>,
}

impl<R: Renderer, L> ElementBuilder<R, L> {
    /// Starts building an element that renders into `mount_point`.
    ///
    /// The mount point is owned by the element for its whole lifetime.
    pub fn new(renderer: R, loader: L, mount_point: R::Node) -> Self {
        Self {
            renderer,
            loader,
            mount_point,
            config: ElementConfig::new(),
            registry: None,
        }
    }

    /// Sets the initial attributes.
    pub fn config(mut self, config: ElementConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the initial `src` attribute.
    pub fn src(mut self, src: impl Into<String>) -> Self {
        self.config = self.config.with_src(src);
        self
    }

    /// Sets the initial `defer` attribute.
    pub fn defer(mut self, defer: bool) -> Self {
        self.config.defer = defer;
        self
    }

    /// Shares a registration registry with other elements.
    ///
    /// Every element has its own registry by default.
    pub fn registry(mut self, registry: Rc<Registry<R::Factory>>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Creates the element. It starts detached, in [`ReadyState::Created`].
    pub fn build<E: Executor>(self, executor: E) -> Element<R, L, E> {
        let attributes = self
            .config
            .attributes()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        let id = ElementId::new();
        debug!(element = %id, "Element created");

        Element {
            inner: Rc::new(Inner {
                id,
                renderer: self.renderer,
                loader: self.loader,
                registry: self.registry.unwrap_or_default(),
                mount_point: self.mount_point,
                state: RefCell::new(State {
                    connected: false,
                    stage: Stage::Unloaded,
                    attributes,
                    factory: None,
                    props: None,
                    pending: false,
                    rendering: false,
                    in_flight: None,
                    last_error: None,
                    subscribers: Vec::new(),
                }),
            }),
            executor,
        }
    }
}

impl<R: Renderer, L> fmt::Debug for ElementBuilder<R, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementBuilder")
            .field("config", &self.config)
            .field("shared_registry", &self.registry.is_some())
            .finish_non_exhaustive()
    }
}

impl<R, L, E> Element<R, L, E>
where
    R: Renderer + 'static,
    L: Loader<R> + 'static,
    E: Executor,
{
    /// Creates a detached element with no attributes.
    pub fn new(renderer: R, loader: L, executor: E, mount_point: R::Node) -> Self {
        ElementBuilder::new(renderer, loader, mount_point).build(executor)
    }

    /// Attributes whose changes trigger a reload.
    #[must_use]
    pub const fn observed_attributes() -> &'static [&'static str] {
        &OBSERVED_ATTRIBUTES
    }

    /// Identity of this element.
    #[must_use]
    pub fn id(&self) -> ElementId {
        self.inner.id
    }

    /// Current lifecycle stage.
    #[must_use]
    pub fn ready_state(&self) -> ReadyState {
        self.inner.state.borrow().ready_state()
    }

    /// Returns `true` while the element is attached to a document.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.state.borrow().connected
    }

    /// Returns `true` if an update is waiting for the component to become ready.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.state.borrow().pending
    }

    /// The loaded component, available while the element is
    /// [`Loaded`](ReadyState::Loaded) or [`Rendered`](ReadyState::Rendered).
    #[must_use]
    pub fn component(&self) -> Option<Ref<'_, R::Factory>> {
        Ref::filter_map(self.inner.state.borrow(), |state| {
            if state.renderable() {
                state.factory.as_ref()
            } else {
                None
            }
        })
        .ok()
    }

    /// The most recently supplied props.
    #[must_use]
    pub fn props(&self) -> Option<Ref<'_, R::Props>> {
        Ref::filter_map(self.inner.state.borrow(), |state| state.props.as_ref()).ok()
    }

    /// The node components are rendered into.
    #[must_use]
    pub fn mount_point(&self) -> &R::Node {
        &self.inner.mount_point
    }

    /// The failure of the latest load, cleared by the next successful one.
    #[must_use]
    pub fn last_error(&self) -> Option<LoadError> {
        self.inner.state.borrow().last_error.clone()
    }

    /// Registry this element registers loaded components through.
    #[must_use]
    pub fn registry(&self) -> &Rc<Registry<R::Factory>> {
        &self.inner.registry
    }

    /// Subscribes to the events of this element.
    ///
    /// Load failures are always delivered here in addition to being logged.
    /// Dropping the receiver unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<ElementEvent> {
        let (sender, receiver) = async_channel::unbounded();
        self.inner.state.borrow_mut().subscribers.push(sender);
        receiver
    }

    /// Value of the attribute `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner.state.borrow().attributes.get(name).cloned()
    }

    /// Returns `true` if the attribute `name` is present.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.inner.state.borrow().has_attribute(name)
    }

    /// Sets the attribute `name`, reacting as the host would on an attribute change.
    pub fn set_attribute(&self, name: &str, value: &str) {
        let old = self.attribute(name);
        self.attribute_changed_callback(name, old.as_deref(), Some(value));
    }

    /// Removes the attribute `name`, reacting as the host would on an attribute change.
    pub fn remove_attribute(&self, name: &str) {
        if let Some(old) = self.attribute(name) {
            self.attribute_changed_callback(name, Some(&old), None);
        }
    }

    /// Location of the bundle, mirroring the `src` attribute.
    #[must_use]
    pub fn src(&self) -> Option<String> {
        self.attribute(SRC_ATTRIBUTE)
    }

    /// Sets the `src` attribute, which reloads the component.
    pub fn set_src(&self, src: &str) {
        self.set_attribute(SRC_ATTRIBUTE, src);
    }

    /// Returns `true` if the `defer` attribute is present.
    #[must_use]
    pub fn defer(&self) -> bool {
        self.has_attribute(DEFER_ATTRIBUTE)
    }

    /// Adds or removes the `defer` attribute.
    pub fn set_defer(&self, defer: bool) {
        if defer {
            self.set_attribute(DEFER_ATTRIBUTE, "");
        } else {
            self.remove_attribute(DEFER_ATTRIBUTE);
        }
    }

    /// Host callback: the element was attached to a document.
    ///
    /// Loads the component unless one for the current `src` is already loaded
    /// or loading. A render requested while detached runs now.
    pub fn connected_callback(&self) {
        let (load, render) = {
            let mut state = self.inner.state.borrow_mut();
            if state.connected {
                return;
            }
            state.connected = true;
            debug!(element = %self.inner.id, "Connected");
            state.emit(ElementEvent::Connected);

            match state.stage {
                Stage::Unloaded => (true, false),
                Stage::Loading(_) => (false, false),
                Stage::Loaded | Stage::Rendered => (false, state.pending && !state.rendering),
            }
        };
        if load {
            self.load();
        } else if render {
            self.inner.render();
        }
    }

    /// Host callback: the element was detached from its document.
    ///
    /// The loaded component, props and any in-flight load are kept.
    pub fn disconnected_callback(&self) {
        let mut state = self.inner.state.borrow_mut();
        if !state.connected {
            return;
        }
        state.connected = false;
        debug!(element = %self.inner.id, "Disconnected");
        state.emit(ElementEvent::Disconnected);
    }

    /// Host callback: the attribute `name` changed from `old` to `new`.
    ///
    /// Any change of `src`, including one to the same value, reloads.
    pub fn attribute_changed_callback(&self, name: &str, old: Option<&str>, new: Option<&str>) {
        {
            let mut state = self.inner.state.borrow_mut();
            match new {
                Some(value) => {
                    state.attributes.insert(name.to_string(), value.to_string());
                }
                None => {
                    state.attributes.remove(name);
                }
            }
        }
        debug!(element = %self.inner.id, name, ?old, ?new, "Attribute changed");

        if OBSERVED_ATTRIBUTES.contains(&name) {
            self.source_changed();
        }
    }

    /// Requests a render with `props`, or with the last props if `None`.
    ///
    /// Renders immediately when the component is ready. Otherwise the render is
    /// queued; however many updates arrive before then, exactly one render with
    /// the latest props follows.
    ///
    /// An update issued by the component while it renders is applied by one
    /// more render right after the current one.
    pub fn update(&self, props: Option<R::Props>) {
        {
            let mut state = self.inner.state.borrow_mut();
            if let Some(props) = props {
                state.props = Some(props);
            }
            if !state.renderable() || state.rendering {
                state.pending = true;
                debug!(element = %self.inner.id, ready_state = %state.ready_state(), "Render queued");
                return;
            }
        }
        self.inner.render();
    }

    fn source_changed(&self) {
        if self.is_connected() {
            self.load();
            return;
        }

        // Detached: whatever is loaded or loading belongs to the previous source.
        let mut state = self.inner.state.borrow_mut();
        self.inner.supersede(&mut state);
        state.stage = Stage::Unloaded;
    }

    fn load(&self) {
        let (handle, registration) = AbortHandle::new_pair();
        let (ticket, source) = {
            let mut state = self.inner.state.borrow_mut();
            if !state.connected {
                return;
            }
            self.inner.supersede(&mut state);

            let Some(source) = state.source() else {
                state.stage = Stage::Unloaded;
                debug!(element = %self.inner.id, "No source to load");
                return;
            };
            let ticket = LoadTicket::next();
            state.stage = Stage::Loading(ticket);
            state.in_flight = Some(handle);
            state.emit(ElementEvent::LoadStarted {
                ticket,
                source: source.clone(),
            });
            (ticket, source)
        };

        self.inner.registry.open(ticket);
        debug!(element = %self.inner.id, %ticket, src = %source, "Loading component");

        let fetch = self.inner.loader.fetch(&source);
        let inner = Rc::downgrade(&self.inner);
        let task = Abortable::new(fetch, registration).map(move |outcome| {
            // Aborted loads and dropped elements have nothing left to update.
            if let (Ok(fetched), Some(inner)) = (outcome, inner.upgrade()) {
                inner.complete(ticket, &source, fetched);
            }
        });
        self.executor.spawn(task.boxed_local());
    }
}

impl<R: Renderer, L, E> Drop for Element<R, L, E> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.inner.state.try_borrow_mut() {
            if let Some(handle) = state.in_flight.take() {
                handle.abort();
            }
            if let Some(ticket) = state.stage.in_flight() {
                self.inner.registry.close(ticket);
            }
        }
    }
}

impl<R: Renderer, L, E> fmt::Debug for Element<R, L, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Element");
        debug.field("id", &self.inner.id);
        if let Ok(state) = self.inner.state.try_borrow() {
            debug
                .field("ready_state", &state.ready_state())
                .field("stage", &state.stage)
                .field("pending", &state.pending)
                .field("attributes", &state.attributes);
        }
        debug.finish_non_exhaustive()
    }
}
