use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{self, FutureExt, LocalBoxFuture};
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{HtmlScriptElement, Node};
use xframe::{FetchError, Loader, Source};

use crate::bundle::GlobalBundle;
use crate::error::WebError;
use crate::renderer::PreactRenderer;

type Fetched = Result<GlobalBundle, FetchError>;

/// Loads bundles by appending a `<script>` to the element's shadow root.
#[derive(Debug, Clone)]
pub struct ScriptLoader {
    root: Node,
}

impl ScriptLoader {
    /// Creates a loader inserting its scripts under `root`.
    #[must_use]
    pub const fn new(root: Node) -> Self {
        Self { root }
    }

    fn insert(&self, source: &Source) -> Result<(ScriptGuard, oneshot::Receiver<Fetched>), WebError> {
        let document = self.root.owner_document().ok_or(WebError::DomUnavailable)?;
        let script = document
            .create_element("script")?
            .dyn_into::<HtmlScriptElement>()
            .map_err(|_| WebError::UnexpectedNode("script"))?;
        script.set_src(source.as_str());

        // Only one of the two handlers ever fires.
        let (sender, receiver) = oneshot::channel();
        let sender = Rc::new(RefCell::new(Some(sender)));
        let onload: Closure<dyn FnMut()> = Closure::once({
            let sender = Rc::clone(&sender);
            move || {
                let bundle = GlobalBundle::take();
                if let Some(sender) = sender.borrow_mut().take() {
                    let _ = sender.send(Ok(bundle));
                }
            }
        });
        let onerror: Closure<dyn FnMut()> = Closure::once(move || {
            if let Some(sender) = sender.borrow_mut().take() {
                let _ = sender.send(Err(FetchError::Network(
                    "the script element reported an error".to_string(),
                )));
            }
        });
        script.set_onload(Some(onload.as_ref().unchecked_ref()));
        script.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        let guard = ScriptGuard {
            script,
            _onload: onload,
            _onerror: onerror,
        };

        self.root.append_child(&guard.script)?;
        debug!(src = %source, "Script inserted");
        Ok((guard, receiver))
    }
}

impl Loader<PreactRenderer> for ScriptLoader {
    type Bundle = GlobalBundle;

    fn fetch(&self, source: &Source) -> LocalBoxFuture<'static, Fetched> {
        match self.insert(source) {
            Ok((guard, receiver)) => async move {
                let fetched = receiver.await.unwrap_or(Err(FetchError::Dropped));
                drop(guard);
                fetched
            }
            .boxed_local(),
            Err(err) => future::ready(Err(FetchError::Script(err.to_string()))).boxed_local(),
        }
    }
}

/// Removes the script once its load settles or is abandoned, releasing both
/// handlers with it.
struct ScriptGuard {
    script: HtmlScriptElement,
    _onload: Closure<dyn FnMut()>,
    _onerror: Closure<dyn FnMut()>,
}

impl Drop for ScriptGuard {
    fn drop(&mut self) {
        // Detach the handlers before their closures are freed.
        self.script.set_onload(None);
        self.script.set_onerror(None);
        self.script.remove();
    }
}
