use futures::FutureExt;
use js_sys::{Array, Function};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, ShadowRootInit, ShadowRootMode};
use xframe::config::{DEFER_ATTRIBUTE, OBSERVED_ATTRIBUTES};
use xframe::{Element, ElementBuilder, ElementEvent, Executor, LoadError, TAG_NAME};

use crate::error::WebError;
use crate::executor::WebExecutor;
use crate::loader::ScriptLoader;
use crate::logging;
use crate::renderer::PreactRenderer;

type Frame = Element<PreactRenderer, ScriptLoader, WebExecutor>;

#[wasm_bindgen(inline_js = r#"
export function defineXFrame(tag, observed, create) {
    if (customElements.get(tag)) {
        return;
    }
    customElements.define(tag, class extends HTMLElement {
        static get observedAttributes() {
            return observed;
        }

        #frame;

        constructor() {
            super();
            this.#frame = create(this);
        }

        connectedCallback() {
            this.#frame.connected();
        }

        disconnectedCallback() {
            this.#frame.disconnected();
        }

        attributeChangedCallback(name, oldValue, newValue) {
            this.#frame.attributeChanged(name, oldValue, newValue);
        }

        get src() {
            return this.getAttribute('src');
        }

        set src(value) {
            this.setAttribute('src', value);
        }

        get readyState() {
            return this.#frame.readyState;
        }

        update(props) {
            this.#frame.update(props);
        }
    });
}

export function reportUriError(message) {
    const error = new URIError(message);
    if (typeof reportError === 'function') {
        reportError(error);
    } else {
        setTimeout(() => { throw error; });
    }
}
"#)]
extern "C" {
    #[wasm_bindgen(js_name = defineXFrame)]
    fn define_element(tag: &str, observed: &Array, create: &Function);

    #[wasm_bindgen(js_name = reportUriError)]
    fn report_uri_error(message: &str);
}

/// Defines the `<x-frame>` custom element.
///
/// `h`, `render` and `component` are the host page's Preact `h`, `render` and
/// `Component` exports. Loaded bundles receive `h` and `component` through
/// `window.__X_COMPONENT__(h, Component)`. Defining twice is a no-op.
#[wasm_bindgen]
pub fn define(h: Function, render: Function, component: JsValue) {
    console_error_panic_hook::set_once();
    logging::init("xframe=info,xframe_web=info");

    let renderer = PreactRenderer::new(h, render, component);
    let create = Closure::<dyn Fn(HtmlElement) -> JsValue>::new(move |host: HtmlElement| {
        match XFrame::attach(&host, renderer.clone()) {
            Ok(frame) => frame.into(),
            Err(err) => wasm_bindgen::throw_val(err.into()),
        }
    });

    // `defer` is mirrored into the element as well; only `src` reloads.
    let observed: Array = OBSERVED_ATTRIBUTES
        .into_iter()
        .chain([DEFER_ATTRIBUTE])
        .map(JsValue::from_str)
        .collect();
    define_element(TAG_NAME, &observed, create.as_ref().unchecked_ref());
    // The element class calls `create` for as long as the page lives.
    create.forget();
}

/// Controller behind one `<x-frame>` node.
#[wasm_bindgen]
#[derive(Debug)]
pub struct XFrame {
    element: Frame,
}

impl XFrame {
    /// Attaches an open shadow root holding the mount point to `host`.
    fn attach(host: &HtmlElement, renderer: PreactRenderer) -> Result<Self, WebError> {
        let document = host.owner_document().ok_or(WebError::DomUnavailable)?;
        let root = host.attach_shadow(&ShadowRootInit::new(ShadowRootMode::Open))?;
        let mount_point = document.create_element("div")?;
        root.append_child(&mount_point)?;

        let element = ElementBuilder::new(renderer, ScriptLoader::new(root.into()), mount_point)
            .build(WebExecutor);
        report_failures(&element);
        Ok(Self { element })
    }
}

fn report_failures(element: &Frame) {
    let events = element.subscribe();
    WebExecutor.spawn(
        async move {
            while let Ok(event) = events.recv().await {
                if let ElementEvent::LoadFailed(err) = event {
                    report_load_failure(&err);
                }
            }
        }
        .boxed_local(),
    );
}

/// Raises `err` as an uncaught `URIError` on the page.
///
/// `window.onerror` and `error` listeners on `window` receive it, and the
/// browser prints it unless a listener cancels the event. Browsers without
/// `reportError` get the error thrown from a timer instead.
pub fn report_load_failure(err: &LoadError) {
    report_uri_error(&err.to_string());
}

/// Props given to `update`, or `None` to keep the last ones.
///
/// Any falsy value keeps the last props, so `false`, `0` and `""` behave like
/// `null` and `undefined`.
fn props_or_last(props: JsValue) -> Option<JsValue> {
    props.is_truthy().then_some(props)
}

#[wasm_bindgen]
impl XFrame {
    /// Host callback for `connectedCallback`.
    pub fn connected(&self) {
        self.element.connected_callback();
    }

    /// Host callback for `disconnectedCallback`.
    pub fn disconnected(&self) {
        self.element.disconnected_callback();
    }

    /// Host callback for `attributeChangedCallback`.
    #[wasm_bindgen(js_name = attributeChanged)]
    pub fn attribute_changed(&self, name: &str, old: Option<String>, new: Option<String>) {
        self.element
            .attribute_changed_callback(name, old.as_deref(), new.as_deref());
    }

    /// Re-renders with `props`, or with the previous props if `props` is falsy.
    pub fn update(&self, props: JsValue) {
        self.element.update(props_or_last(props));
    }

    /// Ready state as the levels 0 to 3.
    #[wasm_bindgen(getter, js_name = readyState)]
    #[must_use]
    pub fn ready_state(&self) -> u8 {
        self.element.ready_state().level()
    }

    /// The loaded component, or `null`.
    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn component(&self) -> JsValue {
        self.element
            .component()
            .map_or(JsValue::NULL, |component| component.clone())
    }

    /// Identity of the element, as recorded in its log lines.
    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn id(&self) -> String {
        self.element.id().to_string()
    }
}
