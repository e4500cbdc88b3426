use thiserror::Error;

use crate::loader::{FetchError, Source};

/// Failure of a single load.
///
/// The element stays [`Connected`](crate::ReadyState::Connected) and keeps
/// queueing updates. It loads again when `src` changes or when it is attached
/// after a detach.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The bundle could not be fetched.
    #[error("The script {url} didn't load correctly.")]
    Fetch {
        /// Location that failed.
        url: Source,
        /// Why the fetch failed.
        #[source]
        source: FetchError,
    },
    /// The bundle ran but never registered a component.
    #[error("The script {url} loaded but did not register a component.")]
    MissingRegistration {
        /// Location of the offending bundle.
        url: Source,
    },
}

impl LoadError {
    /// Location of the bundle that failed to load.
    #[must_use]
    pub const fn url(&self) -> &Source {
        match self {
            Self::Fetch { url, .. } | Self::MissingRegistration { url } => url,
        }
    }
}
