//! Fetching and executing remote bundles.
//!
//! Loading is split in two. A [`Loader`] fetches whatever the `src` attribute
//! points at and yields an executable [`Bundle`] asynchronously. The element then
//! executes the bundle synchronously inside the load continuation, handing it a
//! [`Registrar`] through which it registers its component factory.

use core::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use thiserror::Error;

use crate::registry::Registrar;
use crate::renderer::Renderer;

/// Location of a remote bundle, taken verbatim from the `src` attribute.
///
/// A source is never empty: an empty attribute means there is nothing to load.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source(Rc<str>);

impl Source {
    /// Creates a source, returning `None` for an empty location.
    pub fn new(location: impl AsRef<str>) -> Option<Self> {
        let location = location.as_ref();
        if location.is_empty() {
            None
        } else {
            Some(Self(Rc::from(location)))
        }
    }

    /// The location as written in the attribute.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Source {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reasons a fetch did not produce a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The transport failed before a response was received.
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(u16),
    /// The response could not be executed.
    #[error("script error: {0}")]
    Script(String),
    /// The loader gave up waiting for a response.
    #[error("timed out")]
    TimedOut,
    /// The fetch was dropped before it reported an outcome.
    #[error("fetch was dropped before completing")]
    Dropped,
}

/// An executable module obtained from a [`Loader`].
pub trait Bundle<R: Renderer> {
    /// Runs the module. A well-formed bundle registers exactly one factory
    /// through `registrar`; a bundle that registers nothing fails the load.
    fn execute(self, registrar: Registrar<'_, R>);
}

/// Asynchronous fetch of executable bundles.
pub trait Loader<R: Renderer> {
    /// Bundle produced by this loader.
    type Bundle: Bundle<R> + 'static;

    /// Starts fetching `source`.
    ///
    /// The returned future may be dropped before completion when a newer load
    /// supersedes this one. Implementations release whatever the fetch holds on
    /// drop.
    fn fetch(&self, source: &Source) -> LocalBoxFuture<'static, Result<Self::Bundle, FetchError>>;
}

impl<R: Renderer, L: Loader<R> + ?Sized> Loader<R> for Rc<L> {
    type Bundle = L::Bundle;

    fn fetch(&self, source: &Source) -> LocalBoxFuture<'static, Result<Self::Bundle, FetchError>> {
        (**self).fetch(source)
    }
}
