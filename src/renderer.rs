//! The rendering engine seen from the element.
//!
//! The element never renders anything itself. It decides *when* to render and
//! hands the loaded factory, the current props and its mount point to a
//! [`Renderer`].

use std::rc::Rc;

/// Rendering engine capability.
///
/// A renderer is also the set of rendering primitives given to a bundle while it
/// registers its component, see [`Registrar::primitives`](crate::Registrar::primitives).
pub trait Renderer {
    /// Component definition produced by a loaded bundle.
    type Factory: Clone;
    /// Input properties of a component.
    type Props: Clone;
    /// Node the rendered output is mounted into.
    type Node;
    /// Declarative element tree ready to be rendered.
    type Descriptor;

    /// Describes an instance of `factory` with the given props and children.
    fn create_element(
        &self,
        factory: &Self::Factory,
        props: Option<&Self::Props>,
        children: Vec<Self::Descriptor>,
    ) -> Self::Descriptor;

    /// Renders `descriptor` into `node`, replacing what was rendered there before.
    ///
    /// The rendered component may call back into its element. An update issued
    /// during the render is applied by one more render once this one returns.
    fn render_into(&self, descriptor: Self::Descriptor, node: &Self::Node);
}

impl<R: Renderer + ?Sized> Renderer for Rc<R> {
    type Factory = R::Factory;
    type Props = R::Props;
    type Node = R::Node;
    type Descriptor = R::Descriptor;

    fn create_element(
        &self,
        factory: &Self::Factory,
        props: Option<&Self::Props>,
        children: Vec<Self::Descriptor>,
    ) -> Self::Descriptor {
        (**self).create_element(factory, props, children)
    }

    fn render_into(&self, descriptor: Self::Descriptor, node: &Self::Node) {
        (**self).render_into(descriptor, node);
    }
}

/// Renders a childless instance of `factory` into `node`.
pub fn mount<R: Renderer + ?Sized>(
    renderer: &R,
    factory: &R::Factory,
    props: Option<&R::Props>,
    node: &R::Node,
) {
    let descriptor = renderer.create_element(factory, props, Vec::new());
    renderer.render_into(descriptor, node);
}
