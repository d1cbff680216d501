//! Core types for spark-vdom.
//!
//! These types define the vocabulary that element descriptions carry into the
//! reconciler: property values, child keys, events and the callback shapes
//! used for listeners and render properties.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::element::Element;
use crate::engine::InstanceId;
use crate::host::NodeId;

// =============================================================================
// Key
// =============================================================================

/// Cross-update identity of a child in a keyed list.
///
/// Keys are compared as strings, so `Key::from(1)` and `Key::from("1")` are
/// the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Rc<str>);

impl Key {
    /// Create a key from anything string-like.
    pub fn new(key: impl Into<Rc<str>>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self(value.into())
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self(value.to_string().into())
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::from(i64::from(value))
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Self::from(i64::from(value))
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Self(value.to_string().into())
    }
}

// =============================================================================
// Events and Envelopes
// =============================================================================

/// An event delivered to a listener.
///
/// Host events come from [`Runtime::dispatch_event`](crate::Runtime::dispatch_event);
/// components raise their own through [`Cx::emit`](crate::Cx::emit).
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Event name without the `on` prefix (`"click"`, `"exited"`).
    pub name: Rc<str>,
    /// Host node the event was dispatched on, if any.
    pub target: Option<NodeId>,
    /// Optional free-form payload.
    pub detail: Option<String>,
}

impl Event {
    /// Create an event with no target and no payload.
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self {
            name: name.into(),
            target: None,
            detail: None,
        }
    }

    /// Attach a payload.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Attach a target node.
    pub fn with_target(mut self, target: NodeId) -> Self {
        self.target = Some(target);
        self
    }
}

/// An action addressed to a component instance.
///
/// Listeners never touch instances directly. They return an envelope and the
/// runtime delivers it once the current update has finished.
pub struct Envelope {
    /// Instance that receives the action.
    pub target: InstanceId,
    /// The type-erased action. It must match the target's `Component::Action`.
    pub action: Box<dyn Any>,
}

impl Envelope {
    /// Wrap an action for delivery to `target`.
    pub fn new<A: 'static>(target: InstanceId, action: A) -> Self {
        Self {
            target,
            action: Box::new(action),
        }
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Callback Types
// =============================================================================

/// Event listener. Returns the action to deliver, if any.
///
/// Rc so the same listener can sit in an element description and on a host
/// node at the same time.
pub type Listener = Rc<dyn Fn(&Event) -> Option<Envelope>>;

/// Render property: receives a status string and an optional pass-through value.
pub type RenderFn = Rc<dyn Fn(&str, Option<&PropValue>) -> Element>;

/// Wrapper property: receives a finished child list and returns the container.
pub type WrapFn = Rc<dyn Fn(Vec<Element>) -> Element>;

/// A listener that always delivers the same action to the same instance.
///
/// Unlike a closure listener it compares by value: two are equal when they
/// address the same instance with equal actions, so re-rendering an
/// unchanged component leaves the host listener alone.
#[derive(Clone)]
pub struct ActionListener {
    target: InstanceId,
    action: Rc<dyn Any>,
    same: fn(&dyn Any, &dyn Any) -> bool,
    listener: Listener,
}

impl ActionListener {
    pub fn new<A: Clone + PartialEq + 'static>(target: InstanceId, action: A) -> Self {
        let action = Rc::new(action);
        let sent = action.clone();
        Self {
            target,
            action,
            same: same_action::<A>,
            listener: Rc::new(move |_: &Event| Some(Envelope::new(target, (*sent).clone()))),
        }
    }

    pub fn target(&self) -> InstanceId {
        self.target
    }

    pub fn listener(&self) -> &Listener {
        &self.listener
    }
}

impl PartialEq for ActionListener {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target && (self.same)(&*self.action, &*other.action)
    }
}

fn same_action<A: PartialEq + 'static>(a: &dyn Any, b: &dyn Any) -> bool {
    matches!((a.downcast_ref::<A>(), b.downcast_ref::<A>()), (Some(a), Some(b)) if a == b)
}

// =============================================================================
// Prop Value
// =============================================================================

/// A single property value.
///
/// Scalar variants become host attributes. `Listener` and `Action` values
/// are attached to host nodes as event listeners. `Render`, `Wrap` and `Data` values are only
/// meaningful to components and are never written to the host.
///
/// Equality is by value for scalars and actions, by pointer for the Rc variants.
#[derive(Clone)]
pub enum PropValue {
    Text(Rc<str>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Listener(Listener),
    Action(ActionListener),
    Render(RenderFn),
    Wrap(WrapFn),
    Data(Rc<dyn Any>),
}

impl PropValue {
    /// Build a listener value.
    pub fn listener(f: impl Fn(&Event) -> Option<Envelope> + 'static) -> Self {
        PropValue::Listener(Rc::new(f))
    }

    /// Build a listener that sends `action` to `target` on every event.
    pub fn action<A: Clone + PartialEq + 'static>(target: InstanceId, action: A) -> Self {
        PropValue::Action(ActionListener::new(target, action))
    }

    /// Build a render-property value.
    pub fn render(f: impl Fn(&str, Option<&PropValue>) -> Element + 'static) -> Self {
        PropValue::Render(Rc::new(f))
    }

    /// Build a wrapper-property value.
    pub fn wrap(f: impl Fn(Vec<Element>) -> Element + 'static) -> Self {
        PropValue::Wrap(Rc::new(f))
    }

    /// Wrap arbitrary application data for pass-through.
    pub fn data<T: Any>(value: T) -> Self {
        PropValue::Data(Rc::new(value))
    }

    /// The host attribute string for this value, or None if it is not an attribute.
    pub fn to_attribute(&self) -> Option<String> {
        match self {
            PropValue::Text(s) => Some(s.to_string()),
            PropValue::Int(i) => Some(i.to_string()),
            PropValue::Float(f) => Some(f.to_string()),
            PropValue::Bool(b) => Some(b.to_string()),
            PropValue::Listener(_)
            | PropValue::Action(_)
            | PropValue::Render(_)
            | PropValue::Wrap(_)
            | PropValue::Data(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view. Floats with no fractional part also convert.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(i) => Some(*i),
            PropValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_listener(&self) -> Option<&Listener> {
        match self {
            PropValue::Listener(l) => Some(l),
            PropValue::Action(a) => Some(&a.listener),
            _ => None,
        }
    }

    pub fn as_render(&self) -> Option<&RenderFn> {
        match self {
            PropValue::Render(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_wrap(&self) -> Option<&WrapFn> {
        match self {
            PropValue::Wrap(w) => Some(w),
            _ => None,
        }
    }

    /// Downcast pass-through data.
    pub fn as_data<T: Any>(&self) -> Option<&T> {
        match self {
            PropValue::Data(d) => d.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// The value as a list key. Only text and integers can be keys.
    pub fn to_key(&self) -> Option<Key> {
        match self {
            PropValue::Text(s) => Some(Key(s.clone())),
            PropValue::Int(i) => Some(Key::from(*i)),
            _ => None,
        }
    }

    pub fn is_listener(&self) -> bool {
        matches!(self, PropValue::Listener(_) | PropValue::Action(_))
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Text(a), PropValue::Text(b)) => a == b,
            (PropValue::Int(a), PropValue::Int(b)) => a == b,
            (PropValue::Float(a), PropValue::Float(b)) => a == b,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Listener(a), PropValue::Listener(b)) => Rc::ptr_eq(a, b),
            (PropValue::Action(a), PropValue::Action(b)) => a == b,
            (PropValue::Render(a), PropValue::Render(b)) => Rc::ptr_eq(a, b),
            (PropValue::Wrap(a), PropValue::Wrap(b)) => Rc::ptr_eq(a, b),
            (PropValue::Data(a), PropValue::Data(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Text(s) => write!(f, "Text({s:?})"),
            PropValue::Int(i) => write!(f, "Int({i})"),
            PropValue::Float(x) => write!(f, "Float({x})"),
            PropValue::Bool(b) => write!(f, "Bool({b})"),
            PropValue::Listener(_) => f.write_str("Listener(..)"),
            PropValue::Action(a) => write!(f, "Action({})", a.target),
            PropValue::Render(_) => f.write_str("Render(..)"),
            PropValue::Wrap(_) => f.write_str("Wrap(..)"),
            PropValue::Data(_) => f.write_str("Data(..)"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Text(value.into())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Text(value.into())
    }
}

impl From<Rc<str>> for PropValue {
    fn from(value: Rc<str>) -> Self {
        PropValue::Text(value)
    }
}

impl From<&Key> for PropValue {
    fn from(value: &Key) -> Self {
        PropValue::Text(value.0.clone())
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(i64::from(value))
    }
}

impl From<u32> for PropValue {
    fn from(value: u32) -> Self {
        PropValue::Int(i64::from(value))
    }
}

impl From<usize> for PropValue {
    fn from(value: usize) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<u64> for PropValue {
    fn from(value: u64) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_int_and_str_match() {
        assert_eq!(Key::from(1), Key::from("1"));
        assert_eq!(Key::from(7usize).as_str(), "7");
    }

    #[test]
    fn test_scalar_attributes() {
        assert_eq!(PropValue::from("a").to_attribute().as_deref(), Some("a"));
        assert_eq!(PropValue::from(42).to_attribute().as_deref(), Some("42"));
        assert_eq!(PropValue::from(1.5).to_attribute().as_deref(), Some("1.5"));
        assert_eq!(PropValue::from(2.0).to_attribute().as_deref(), Some("2"));
        assert_eq!(PropValue::from(true).to_attribute().as_deref(), Some("true"));
    }

    #[test]
    fn test_callbacks_are_not_attributes() {
        let listener = PropValue::listener(|_| None);
        assert_eq!(listener.to_attribute(), None);
        assert!(listener.is_listener());
        assert_eq!(PropValue::data(3u8).to_attribute(), None);
    }

    #[test]
    fn test_callback_equality_is_by_pointer() {
        let a = PropValue::listener(|_| None);
        let b = a.clone();
        let c = PropValue::listener(|_| None);
        assert_eq!(a, b, "clones share the same Rc");
        assert_ne!(a, c, "distinct closures never compare equal");
    }

    #[test]
    fn test_action_listener_equality_is_by_value() {
        let mut registry = crate::engine::Registry::new();
        let first = InstanceId(registry.insert(()));
        let second = InstanceId(registry.insert(()));

        assert_eq!(PropValue::action(first, 1u8), PropValue::action(first, 1u8), "rebuilt on every render");
        assert_ne!(PropValue::action(first, 1u8), PropValue::action(first, 2u8));
        assert_ne!(PropValue::action(first, 1u8), PropValue::action(second, 1u8));
        assert_ne!(PropValue::action(first, 1u8), PropValue::action(first, 1u16), "different action types");
        assert!(PropValue::action(first, ()).is_listener());
        assert_eq!(PropValue::action(first, ()).to_attribute(), None);
    }

    #[test]
    fn test_action_listener_delivers_its_action() {
        let mut registry = crate::engine::Registry::new();
        let id = InstanceId(registry.insert(()));
        let value = PropValue::action(id, "go");

        let listener = value.as_listener().expect("listener");
        let envelope = listener(&Event::new("click")).expect("always sends");
        assert_eq!(envelope.target, id);
        assert_eq!(envelope.action.downcast_ref::<&str>(), Some(&"go"));
    }

    #[test]
    fn test_to_key() {
        assert_eq!(PropValue::from(3).to_key(), Some(Key::from("3")));
        assert_eq!(PropValue::from("x").to_key(), Some(Key::from("x")));
        assert_eq!(PropValue::from(true).to_key(), None);
    }

    #[test]
    fn test_as_data_downcasts() {
        let value = PropValue::data(vec![1u8, 2]);
        assert_eq!(value.as_data::<Vec<u8>>(), Some(&vec![1u8, 2]));
        assert_eq!(value.as_data::<String>(), None);
    }
}
