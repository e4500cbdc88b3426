//! The global registration hook.
//!
//! A bundle registers its component by defining `window.__X_COMPONENT__` as a
//! function of `(h, Component)` returning the component. The hook is taken
//! from the global object as soon as the script has run.

use js_sys::{Function, Reflect};
use tracing::{error, warn};
use wasm_bindgen::{JsCast, JsValue};
use xframe::{Bundle, Registrar};

use crate::renderer::PreactRenderer;

/// Name of the global registration hook.
pub const REGISTRATION_HOOK: &str = "__X_COMPONENT__";

/// An executed script, holding the registration hook it defined, if any.
#[derive(Debug)]
pub struct GlobalBundle {
    hook: Option<Function>,
}

impl GlobalBundle {
    /// Takes the hook off the global object, leaving the slot empty.
    ///
    /// Loaders must call this in the same task that executed the script, before
    /// any other script can run.
    #[must_use]
    pub fn take() -> Self {
        let global = js_sys::global();
        let key = JsValue::from_str(REGISTRATION_HOOK);
        let hook = Reflect::get(&global, &key)
            .ok()
            .and_then(|hook| hook.dyn_into::<Function>().ok());
        if let Err(err) = Reflect::delete_property(&global, &key) {
            warn!("Failed to clear {REGISTRATION_HOOK}: {err:?}");
        }
        Self { hook }
    }
}

impl Bundle<PreactRenderer> for GlobalBundle {
    fn execute(self, registrar: Registrar<'_, PreactRenderer>) {
        let Some(hook) = self.hook else {
            warn!(src = %registrar.source(), "Script did not define {REGISTRATION_HOOK}");
            return;
        };

        let primitives = registrar.primitives();
        let returned = hook.call2(&js_sys::global(), primitives.h(), primitives.component());
        match returned {
            Ok(component) if component.is_null() || component.is_undefined() => {
                warn!(src = %registrar.source(), "{REGISTRATION_HOOK} returned no component");
            }
            Ok(component) => {
                if let Err(err) = registrar.register(component) {
                    error!("{err}");
                }
            }
            Err(err) => {
                error!(src = %registrar.source(), "{REGISTRATION_HOOK} threw: {err:?}");
            }
        }
    }
}
