//! Readiness of an element and the load pipeline behind it.
//!
//! The host only ever sees a [`ReadyState`]. Internally the element tracks two
//! independent facts: whether it is part of a document, and how far the
//! component pipeline ([`Stage`]) has progressed. The observable state is derived
//! from both, so a detached element keeps its loaded component around while
//! reporting [`ReadyState::Created`].

use core::fmt;

use crate::registry::LoadTicket;

/// Lifecycle stage of an element, as observed by its host.
///
/// The variants are ordered, so `state >= ReadyState::Loaded` reads the same way
/// the numeric levels `0..=3` do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReadyState {
    /// The element exists but is not part of a document.
    #[default]
    Created,
    /// The element is in a document and its component is not usable yet.
    Connected,
    /// The component has been loaded and registered.
    Loaded,
    /// The component has been rendered at least once since it was loaded.
    Rendered,
}

impl ReadyState {
    /// Returns `true` when the component factory may be rendered.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Loaded | Self::Rendered)
    }

    /// Numeric level of this state, `0` for [`Created`](Self::Created) through
    /// `3` for [`Rendered`](Self::Rendered).
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::Created => 0,
            Self::Connected => 1,
            Self::Loaded => 2,
            Self::Rendered => 3,
        }
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Connected => "connected",
            Self::Loaded => "loaded",
            Self::Rendered => "rendered",
        };
        f.write_str(name)
    }
}

/// Progress of the component pipeline, independent of document attachment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Stage {
    /// No usable component: never loaded, failed, or stale after a `src` change.
    #[default]
    Unloaded,
    /// A load identified by the ticket is in flight.
    Loading(LoadTicket),
    /// A component is registered but has not been rendered since.
    Loaded,
    /// The registered component has been rendered.
    Rendered,
}

impl Stage {
    /// Observable state for this stage given the attachment status.
    pub(crate) const fn ready_state(self, connected: bool) -> ReadyState {
        match (connected, self) {
            (false, _) => ReadyState::Created,
            (true, Self::Unloaded | Self::Loading(_)) => ReadyState::Connected,
            (true, Self::Loaded) => ReadyState::Loaded,
            (true, Self::Rendered) => ReadyState::Rendered,
        }
    }

    /// Returns `true` if a registered component may be rendered.
    pub(crate) const fn has_component(self) -> bool {
        matches!(self, Self::Loaded | Self::Rendered)
    }

    /// Ticket of the in-flight load, if any.
    pub(crate) const fn in_flight(self) -> Option<LoadTicket> {
        match self {
            Self::Loading(ticket) => Some(ticket),
            Self::Unloaded | Self::Loaded | Self::Rendered => None,
        }
    }

    /// Returns `true` if `ticket` is the load this stage is waiting on.
    pub(crate) fn awaits(self, ticket: LoadTicket) -> bool {
        self.in_flight() == Some(ticket)
    }

    /// Stage after a successful render.
    pub(crate) const fn rendered(self) -> Self {
        match self {
            Self::Loaded | Self::Rendered => Self::Rendered,
            // Rendering without a component is refused upstream.
            other @ (Self::Unloaded | Self::Loading(_)) => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_is_always_created() {
        let ticket = LoadTicket::next();
        for stage in [
            Stage::Unloaded,
            Stage::Loading(ticket),
            Stage::Loaded,
            Stage::Rendered,
        ] {
            assert_eq!(stage.ready_state(false), ReadyState::Created);
        }
    }

    #[test]
    fn connected_states_follow_the_pipeline() {
        let ticket = LoadTicket::next();
        assert_eq!(Stage::Unloaded.ready_state(true), ReadyState::Connected);
        assert_eq!(Stage::Loading(ticket).ready_state(true), ReadyState::Connected);
        assert_eq!(Stage::Loaded.ready_state(true), ReadyState::Loaded);
        assert_eq!(Stage::Rendered.ready_state(true), ReadyState::Rendered);
    }

    #[test]
    fn levels_are_ordered() {
        assert!(ReadyState::Created < ReadyState::Connected);
        assert!(ReadyState::Connected < ReadyState::Loaded);
        assert!(ReadyState::Loaded < ReadyState::Rendered);
        assert_eq!(ReadyState::Rendered.level(), 3);
        assert!(!ReadyState::Connected.is_ready());
        assert!(ReadyState::Loaded.is_ready());
    }

    #[test]
    fn only_the_current_ticket_is_awaited() {
        let first = LoadTicket::next();
        let second = LoadTicket::next();
        let stage = Stage::Loading(second);
        assert!(stage.awaits(second));
        assert!(!stage.awaits(first));
        assert!(!Stage::Loaded.awaits(second));
    }

    #[test]
    fn render_requires_a_component() {
        assert_eq!(Stage::Loaded.rendered(), Stage::Rendered);
        assert_eq!(Stage::Rendered.rendered(), Stage::Rendered);
        assert_eq!(Stage::Unloaded.rendered(), Stage::Unloaded);
        assert!(!Stage::Unloaded.has_component());
    }
}
