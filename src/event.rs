//! Events emitted by an [`Element`](crate::Element).

use crate::error::LoadError;
use crate::loader::Source;
use crate::registry::LoadTicket;

/// Notifications delivered to [`Element::subscribe`](crate::Element::subscribe) receivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementEvent {
    /// The element was attached to a document.
    Connected,

    /// The element was detached from its document.
    Disconnected,

    /// A load was issued.
    LoadStarted {
        /// Ticket of the new load.
        ticket: LoadTicket,
        /// What is being loaded.
        source: Source,
    },

    /// An in-flight load was superseded and its outcome will be ignored.
    Superseded {
        /// Ticket of the abandoned load.
        ticket: LoadTicket,
    },

    /// A component was loaded and registered.
    Loaded {
        /// Ticket of the completed load.
        ticket: LoadTicket,
        /// Where the component came from.
        source: Source,
    },

    /// The component was rendered into the mount point.
    Rendered,

    /// A load failed.
    LoadFailed(LoadError),
}
