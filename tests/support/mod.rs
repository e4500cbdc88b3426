#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::{FutureExt, LocalBoxFuture};
use serde_json::Value;
use xframe::{
    Bundle, Element, ElementBuilder, ElementEvent, FetchError, Loader, Registrar, Renderer, Source,
};

/// Mount point handed to every element built by [`Harness`].
pub const MOUNT: MountPoint = MountPoint(7);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountPoint(pub u32);

/// One call into the rendering engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCall {
    pub factory: &'static str,
    pub props: Option<Value>,
    pub node: MountPoint,
}

impl RenderCall {
    pub fn new(factory: &'static str, props: Option<Value>) -> Self {
        Self {
            factory,
            props,
            node: MOUNT,
        }
    }
}

#[derive(Debug)]
pub struct Descriptor {
    factory: &'static str,
    props: Option<Value>,
}

type RenderHook = Rc<dyn Fn(&RenderCall)>;

/// Renderer recording every render instead of drawing anything.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    calls: Rc<RefCell<Vec<RenderCall>>>,
    on_render: Rc<RefCell<Option<RenderHook>>>,
}

impl RecordingRenderer {
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.borrow().clone()
    }

    /// Runs `hook` inside every later render, the way a mounted component would.
    pub fn on_render(&self, hook: impl Fn(&RenderCall) + 'static) {
        *self.on_render.borrow_mut() = Some(Rc::new(hook));
    }
}

impl Renderer for RecordingRenderer {
    type Factory = &'static str;
    type Props = Value;
    type Node = MountPoint;
    type Descriptor = Descriptor;

    fn create_element(
        &self,
        factory: &Self::Factory,
        props: Option<&Self::Props>,
        children: Vec<Self::Descriptor>,
    ) -> Self::Descriptor {
        assert!(children.is_empty());
        Descriptor {
            factory,
            props: props.cloned(),
        }
    }

    fn render_into(&self, descriptor: Self::Descriptor, node: &Self::Node) {
        let call = RenderCall {
            factory: descriptor.factory,
            props: descriptor.props,
            node: *node,
        };
        self.calls.borrow_mut().push(call.clone());
        let hook = self.on_render.borrow().clone();
        if let Some(hook) = hook {
            hook(&call);
        }
    }
}

/// What a fetched bundle does when executed.
#[derive(Debug)]
pub enum TestBundle {
    /// Registers the named factory.
    Registers(&'static str),
    /// Builds the named factory from the renderer, then registers it.
    Builds(&'static str),
    /// Runs without registering anything.
    Silent,
}

impl Bundle<RecordingRenderer> for TestBundle {
    fn execute(self, registrar: Registrar<'_, RecordingRenderer>) {
        let registered = match self {
            Self::Registers(factory) => registrar.register(factory),
            Self::Builds(factory) => registrar.register_with(|_renderer| factory),
            Self::Silent => return,
        };
        registered.expect("registration slot should be open");
    }
}

pub type Outcome = Result<TestBundle, FetchError>;

struct PendingFetch {
    source: String,
    sender: Option<oneshot::Sender<Outcome>>,
}

/// Loader whose fetches complete only when a test resolves them.
#[derive(Clone, Default)]
pub struct ScriptedLoader {
    fetches: Rc<RefCell<Vec<PendingFetch>>>,
}

impl ScriptedLoader {
    /// Sources fetched so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.fetches
            .borrow()
            .iter()
            .map(|fetch| fetch.source.clone())
            .collect()
    }

    /// Completes fetch `index`. Returns `false` if nobody awaits it anymore.
    pub fn resolve(&self, index: usize, outcome: Outcome) -> bool {
        let sender = self.fetches.borrow_mut()[index]
            .sender
            .take()
            .expect("fetch resolved twice");
        sender.send(outcome).is_ok()
    }
}

impl Loader<RecordingRenderer> for ScriptedLoader {
    type Bundle = TestBundle;

    fn fetch(&self, source: &Source) -> LocalBoxFuture<'static, Outcome> {
        let (sender, receiver) = oneshot::channel();
        self.fetches.borrow_mut().push(PendingFetch {
            source: source.to_string(),
            sender: Some(sender),
        });
        receiver
            .map(|received| received.unwrap_or(Err(FetchError::Dropped)))
            .boxed_local()
    }
}

pub type TestElement = Element<RecordingRenderer, ScriptedLoader, LocalSpawner>;
pub type TestBuilder = ElementBuilder<RecordingRenderer, ScriptedLoader>;

/// An element wired to a recording renderer, a scripted loader and a local pool.
pub struct Harness {
    pub pool: LocalPool,
    pub renderer: RecordingRenderer,
    pub loader: ScriptedLoader,
    pub element: TestElement,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(|builder| builder)
    }

    pub fn with_src(src: &str) -> Self {
        Self::with(|builder| builder.src(src))
    }

    pub fn with(configure: impl FnOnce(TestBuilder) -> TestBuilder) -> Self {
        xframe::logging::init("xframe=debug");
        let pool = LocalPool::new();
        let renderer = RecordingRenderer::default();
        let loader = ScriptedLoader::default();
        let builder = ElementBuilder::new(renderer.clone(), loader.clone(), MOUNT);
        let element = configure(builder).build(pool.spawner());
        Self {
            pool,
            renderer,
            loader,
            element,
        }
    }

    /// Runs every task that can make progress.
    pub fn settle(&mut self) {
        self.pool.run_until_stalled();
    }

    /// Completes fetch `index` and runs the load continuation.
    pub fn complete(&mut self, index: usize, outcome: Outcome) -> bool {
        let delivered = self.loader.resolve(index, outcome);
        self.settle();
        delivered
    }

    pub fn renders(&self) -> Vec<RenderCall> {
        self.renderer.calls()
    }
}

/// Events received so far.
pub fn drain(events: &async_channel::Receiver<ElementEvent>) -> Vec<ElementEvent> {
    std::iter::from_fn(|| events.try_recv().ok()).collect()
}
