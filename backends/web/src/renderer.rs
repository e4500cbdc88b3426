use js_sys::{Array, Function};
use tracing::error;
use wasm_bindgen::JsValue;
use xframe::Renderer;

/// Renderer over a Preact-compatible `h`/`render` pair.
///
/// The same `h` and `Component` references are handed to every loaded bundle,
/// so components render with the host page's copy of the library.
#[derive(Debug, Clone)]
pub struct PreactRenderer {
    h: Function,
    render: Function,
    component: JsValue,
}

impl PreactRenderer {
    /// Creates a renderer from the library's `h`, `render` and `Component` exports.
    #[must_use]
    pub const fn new(h: Function, render: Function, component: JsValue) -> Self {
        Self {
            h,
            render,
            component,
        }
    }

    /// The element-descriptor factory.
    #[must_use]
    pub const fn h(&self) -> &Function {
        &self.h
    }

    /// The component base class.
    #[must_use]
    pub const fn component(&self) -> &JsValue {
        &self.component
    }
}

impl Renderer for PreactRenderer {
    type Factory = JsValue;
    type Props = JsValue;
    type Node = web_sys::Element;
    type Descriptor = JsValue;

    fn create_element(
        &self,
        factory: &JsValue,
        props: Option<&JsValue>,
        children: Vec<JsValue>,
    ) -> JsValue {
        let props = props.cloned().unwrap_or(JsValue::NULL);
        let descriptor = if children.is_empty() {
            self.h.call3(&JsValue::NULL, factory, &props, &JsValue::NULL)
        } else {
            let args = Array::of2(factory, &props);
            for child in &children {
                args.push(child);
            }
            self.h.apply(&JsValue::NULL, &args)
        };
        descriptor.unwrap_or_else(|err| {
            error!("Failed to create element descriptor: {err:?}");
            JsValue::NULL
        })
    }

    fn render_into(&self, descriptor: JsValue, node: &web_sys::Element) {
        if let Err(err) = self.render.call2(&JsValue::NULL, &descriptor, node) {
            error!("Failed to render component: {err:?}");
        }
    }
}
