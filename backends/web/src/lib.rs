#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Browser backend for `xframe`.
//!
//! [`define`] registers the `<x-frame>` custom element. Each instance attaches
//! an open shadow root holding its mount point, loads its bundle by inserting
//! a `<script>` into that shadow root and renders the registered component
//! with the host page's Preact.
//!
//! ```js
//! import { h, render, Component } from 'preact';
//! import init, { define } from './xframe_web.js';
//!
//! await init();
//! define(h, render, Component);
//! ```
//!
//! A bundle registers its component through the global hook:
//!
//! ```js
//! window.__X_COMPONENT__ = (h, Component) => (props) => h('p', null, props.text);
//! ```

mod bundle;
mod element;
mod error;
mod executor;
mod loader;
pub mod logging;
mod renderer;

pub use bundle::{GlobalBundle, REGISTRATION_HOOK};
pub use element::{XFrame, define, report_load_failure};
pub use error::WebError;
pub use executor::WebExecutor;
pub use loader::ScriptLoader;
pub use renderer::PreactRenderer;
