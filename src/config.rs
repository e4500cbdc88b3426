//! Element configuration.
//!
//! The element is configured entirely through attributes. [`ElementConfig`]
//! captures the initial values, either from attribute pairs or from JSON.

use serde::Deserialize;

/// Attribute holding the bundle location. Changing it reloads the component.
pub const SRC_ATTRIBUTE: &str = "src";

/// Boolean attribute suppressing the automatic render after a load.
pub const DEFER_ATTRIBUTE: &str = "defer";

/// Attributes whose changes the element reacts to.
pub const OBSERVED_ATTRIBUTES: [&str; 1] = [SRC_ATTRIBUTE];

/// Property bag for hosts that do not bring their own props type.
pub type PropertyBag = serde_json::Map<String, serde_json::Value>;

/// Initial configuration of an element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ElementConfig {
    /// Location of the bundle to load.
    pub src: Option<String>,
    /// Skip the automatic render after a load unless one is pending.
    pub defer: bool,
}

impl ElementConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            src: None,
            defer: false,
        }
    }

    /// Sets the bundle location.
    #[must_use]
    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    /// Sets the `defer` flag.
    #[must_use]
    pub const fn with_defer(mut self, defer: bool) -> Self {
        self.defer = defer;
        self
    }

    /// Reads the configuration from attribute pairs.
    ///
    /// `defer` follows boolean attribute rules: it is set whenever present,
    /// whatever its value. Unknown attributes are ignored.
    pub fn from_attributes<'a>(attributes: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        attributes
            .into_iter()
            .fold(Self::new(), |config, (name, value)| match name {
                SRC_ATTRIBUTE => config.with_src(value),
                DEFER_ATTRIBUTE => config.with_defer(true),
                _ => config,
            })
    }

    /// Parses the configuration from JSON such as `{"src": "bundle.js", "defer": true}`.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not an object of the expected shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The configuration as attribute pairs, in the order they would be written.
    pub(crate) fn attributes(&self) -> impl Iterator<Item = (&'static str, String)> + '_ {
        self.src
            .iter()
            .map(|src| (SRC_ATTRIBUTE, src.clone()))
            .chain(self.defer.then(|| (DEFER_ATTRIBUTE, String::new())))
    }
}
