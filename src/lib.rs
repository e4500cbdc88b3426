#![doc = include_str!("../README.md")]
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use futures::executor::LocalPool;
//! use futures::future::{self, FutureExt, LocalBoxFuture};
//! use xframe::{
//!     Bundle, ElementBuilder, FetchError, Loader, ReadyState, Registrar, Renderer, Source,
//! };
//!
//! // Renders a line of text into a shared string.
//! struct TextRenderer;
//!
//! impl Renderer for TextRenderer {
//!     type Factory = fn(&str) -> String;
//!     type Props = String;
//!     type Node = Rc<RefCell<String>>;
//!     type Descriptor = String;
//!
//!     fn create_element(
//!         &self,
//!         factory: &Self::Factory,
//!         props: Option<&String>,
//!         _children: Vec<String>,
//!     ) -> String {
//!         factory(props.map_or("", String::as_str))
//!     }
//!
//!     fn render_into(&self, descriptor: String, node: &Self::Node) {
//!         *node.borrow_mut() = descriptor;
//!     }
//! }
//!
//! // The bundle behind `greeting.js`.
//! struct Greeting;
//!
//! impl Bundle<TextRenderer> for Greeting {
//!     fn execute(self, registrar: Registrar<'_, TextRenderer>) {
//!         let _ = registrar.register(|name| format!("Hello, {name}!"));
//!     }
//! }
//!
//! struct StaticLoader;
//!
//! impl Loader<TextRenderer> for StaticLoader {
//!     type Bundle = Greeting;
//!
//!     fn fetch(&self, _source: &Source) -> LocalBoxFuture<'static, Result<Greeting, FetchError>> {
//!         future::ready(Ok(Greeting)).boxed_local()
//!     }
//! }
//!
//! let mut pool = LocalPool::new();
//! let output = Rc::new(RefCell::new(String::new()));
//! let element = ElementBuilder::new(TextRenderer, StaticLoader, Rc::clone(&output))
//!     .src("greeting.js")
//!     .build(pool.spawner());
//!
//! // Updates before the component is ready are queued.
//! element.update(Some("world".to_string()));
//! element.connected_callback();
//! assert_eq!(element.ready_state(), ReadyState::Connected);
//!
//! pool.run_until_stalled();
//! assert_eq!(element.ready_state(), ReadyState::Rendered);
//! assert_eq!(*output.borrow(), "Hello, world!");
//! ```

mod element;
pub mod config;
mod error;
pub mod event;
pub mod executor;
pub mod loader;
pub mod logging;
pub mod registry;
pub mod renderer;
mod state;

#[doc(inline)]
pub use config::{ElementConfig, PropertyBag};
pub use element::{Element, ElementBuilder, ElementId, TAG_NAME};
pub use error::LoadError;
pub use event::ElementEvent;
pub use executor::Executor;
pub use loader::{Bundle, FetchError, Loader, Source};
pub use registry::{LoadTicket, Registrar, RegistrationError, Registry};
pub use renderer::Renderer;
pub use state::ReadyState;
