//! Element model - Immutable descriptions of a UI subtree.
//!
//! An [`Element`] names either a host tag or a component type and carries a
//! [`Props`] bag. Elements are cheap values: build a fresh tree on every
//! update and hand it to the runtime, which diffs it against the previous one.
//!
//! Once mounted, an element also remembers where it landed: the host node it
//! produced (for tags) or the component instance behind it. These links are
//! exclusive. Cloning an element yields an unmounted description, so two
//! elements can never claim the same node.
//!
//! # Example
//!
//! ```ignore
//! use spark_vdom::{create_element, Props};
//!
//! let list = create_element(
//!     "list",
//!     Props::new().with("class", "items"),
//!     Some(vec![
//!         create_element("item", Props::new().with("key", 1), Some("one".into())),
//!         create_element("item", Props::new().with("key", 2), Some("two".into())),
//!     ].into()),
//! );
//! ```

mod props;

use std::any::TypeId;
use std::fmt;
use std::rc::Rc;

pub use props::{validate_keys, ChildMode, Children, Props, KEY};

use crate::component::{erase, AnyComponent, Component};
use crate::engine::InstanceId;
use crate::host::NodeId;
use crate::types::Key;

// =============================================================================
// Component Type
// =============================================================================

/// Runtime identity of a component type, plus a factory for fresh instances.
#[derive(Clone, Copy)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
    factory: fn() -> Box<dyn AnyComponent>,
}

impl ComponentType {
    pub fn of<C: Component>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
            factory: erase::<C>,
        }
    }

    /// Fully qualified type name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn instantiate(&self) -> Box<dyn AnyComponent> {
        (self.factory)()
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentType {}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentType({})", self.name)
    }
}

/// What an element renders to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Tag(Rc<str>),
    Component(ComponentType),
}

impl ElementKind {
    pub fn is_tag(&self) -> bool {
        matches!(self, ElementKind::Tag(_))
    }

    pub fn is_component(&self) -> bool {
        matches!(self, ElementKind::Component(_))
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            ElementKind::Tag(t) => Some(t),
            ElementKind::Component(_) => None,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Tag(t) => f.write_str(t),
            ElementKind::Component(c) => f.write_str(c.name),
        }
    }
}

impl From<&str> for ElementKind {
    fn from(value: &str) -> Self {
        ElementKind::Tag(value.into())
    }
}

impl From<String> for ElementKind {
    fn from(value: String) -> Self {
        ElementKind::Tag(value.into())
    }
}

impl From<ComponentType> for ElementKind {
    fn from(value: ComponentType) -> Self {
        ElementKind::Component(value)
    }
}

// =============================================================================
// Element
// =============================================================================

/// A node in an element tree.
pub struct Element {
    pub kind: ElementKind,
    pub props: Props,
    /// Host node produced by this element. For components, the container
    /// the rendered subtree was mounted into.
    pub(crate) host: Option<NodeId>,
    pub(crate) instance: Option<InstanceId>,
}

impl Element {
    /// Host-tag element.
    pub fn tag(tag: impl Into<Rc<str>>, props: Props) -> Self {
        Self::new(ElementKind::Tag(tag.into()), props)
    }

    /// Component element.
    pub fn component<C: Component>(props: Props) -> Self {
        Self::new(ElementKind::Component(ComponentType::of::<C>()), props)
    }

    fn new(kind: ElementKind, props: Props) -> Self {
        Self {
            kind,
            props,
            host: None,
            instance: None,
        }
    }

    /// Replace the children slot.
    pub fn with_children(mut self, children: impl Into<Children>) -> Self {
        self.props.children = children.into();
        self
    }

    pub fn key(&self) -> Option<Key> {
        self.props.key()
    }

    /// Host node linked to this element once mounted.
    pub fn host(&self) -> Option<NodeId> {
        self.host
    }

    /// Component instance linked to this element once mounted.
    pub fn instance(&self) -> Option<InstanceId> {
        self.instance
    }

    pub fn is_mounted(&self) -> bool {
        self.host.is_some()
    }

    /// Element children, empty for text or no children.
    pub fn children(&self) -> &[Element] {
        self.props.children.as_elements().unwrap_or(&[])
    }
}

impl Clone for Element {
    /// Clones the description only; the copy is unmounted.
    fn clone(&self) -> Self {
        Self::new(self.kind.clone(), self.props.clone())
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("kind", &self.kind)
            .field("props", &self.props)
            .field("host", &self.host)
            .field("instance", &self.instance)
            .finish()
    }
}

/// Build an element, placing `children` in the reserved children slot.
///
/// `None` leaves whatever `props.children` already holds.
pub fn create_element(kind: impl Into<ElementKind>, mut props: Props, children: Option<Children>) -> Element {
    if let Some(children) = children {
        props.children = children;
    }
    Element::new(kind.into(), props)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Scope;
    use crate::engine::Registry;

    #[derive(Default)]
    struct Label;

    impl Component for Label {
        type State = ();
        type Action = ();

        fn render(&self, _scope: Scope, props: &Props, _state: &()) -> Element {
            Element::tag("label", Props::new()).with_children(props.text("text").unwrap_or_default())
        }
    }

    #[derive(Default)]
    struct Other;

    impl Component for Other {
        type State = ();
        type Action = ();

        fn render(&self, _scope: Scope, _props: &Props, _state: &()) -> Element {
            Element::tag("g", Props::new())
        }
    }

    #[test]
    fn test_create_element_sets_children() {
        let el = create_element("list", Props::new().with("a", 1), Some("hi".into()));
        assert_eq!(el.kind.tag(), Some("list"));
        assert_eq!(el.props.children.as_text(), Some("hi"));
        assert_eq!(el.props.int("a"), Some(1));
    }

    #[test]
    fn test_create_element_none_keeps_props_children() {
        let props = Props::new().with_children("kept");
        let el = create_element("g", props, None);
        assert_eq!(el.props.children.as_text(), Some("kept"));
    }

    #[test]
    fn test_component_kind_identity() {
        let a = Element::component::<Label>(Props::new());
        let b = Element::component::<Label>(Props::new());
        let c = Element::component::<Other>(Props::new());

        assert_eq!(a.kind, b.kind);
        assert_ne!(a.kind, c.kind);
        assert_ne!(a.kind, ElementKind::from("label"));
        assert!(a.kind.is_component());
    }

    #[test]
    fn test_clone_drops_mount_links() {
        let mut registry = Registry::new();
        let mut el = Element::tag("g", Props::new());
        el.host = Some(NodeId(registry.insert(())));

        assert!(el.is_mounted());
        let copy = el.clone();
        assert!(!copy.is_mounted(), "clones are unmounted descriptions");
        assert_eq!(copy.kind, el.kind);
    }

    #[test]
    fn test_children_accessor() {
        let el = Element::tag("g", Props::new()).with_children(vec![
            Element::tag("a", Props::new()),
            Element::tag("b", Props::new()),
        ]);
        assert_eq!(el.children().len(), 2);
        assert!(Element::tag("g", Props::new()).children().is_empty());
    }
}
