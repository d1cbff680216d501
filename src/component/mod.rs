//! Components - Stateful element producers.
//!
//! A component turns props and state into an element tree. State is owned by
//! the runtime and is replaced wholesale, never mutated in place: the reducer
//! and `derive_state_from_props` return a new value or `None` for "no change".
//!
//! # Hooks
//!
//! Optional lifecycle hooks are declared up front through [`Hooks`]. The
//! runtime reads the set once when the instance is created and only calls
//! the hooks it names, so an undeclared hook is never invoked even if the
//! trait method is overridden.
//!
//! Hooks that need to reach the outside world get a [`Cx`]: it sends actions
//! to the component itself, raises events through listener props and manages
//! timers. Nothing a hook does re-enters reconciliation; sent actions are
//! queued and delivered once the current update has been committed.
//!
//! # Example
//!
//! ```ignore
//! #[derive(Default)]
//! struct Counter;
//!
//! #[derive(Clone, PartialEq)]
//! enum CounterAction { Increment }
//!
//! impl Component for Counter {
//!     type State = i64;
//!     type Action = CounterAction;
//!
//!     const HOOKS: Hooks = Hooks::REDUCER;
//!
//!     fn reducer(&self, action: CounterAction, state: &i64) -> Option<i64> {
//!         match action {
//!             CounterAction::Increment => Some(state + 1),
//!         }
//!     }
//!
//!     fn render(&self, scope: Scope, _props: &Props, state: &i64) -> Element {
//!         Element::tag(
//!             "button",
//!             Props::new().with("on_click", scope.action(CounterAction::Increment)),
//!         )
//!         .with_children(state.to_string())
//!     }
//! }
//! ```

mod instance;

use std::collections::VecDeque;

use bitflags::bitflags;

pub(crate) use instance::{erase, AnyComponent, Instance};

use crate::element::{Element, Props};
use crate::engine::{InstanceId, TimerId, Timers};
use crate::host::NodeId;
use crate::types::{Envelope, Event, PropValue};

// =============================================================================
// Hooks
// =============================================================================

bitflags! {
    /// Optional lifecycle hooks a component participates in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Hooks: u8 {
        const DERIVE_STATE  = 1 << 0;
        const SHOULD_UPDATE = 1 << 1;
        const REDUCER       = 1 << 2;
        const DID_MOUNT     = 1 << 3;
        const DID_UPDATE    = 1 << 4;
        const WILL_REMOVE   = 1 << 5;
    }
}

// =============================================================================
// Component Trait
// =============================================================================

/// The component authoring contract.
///
/// `Default` builds a fresh instance; this is the zero-argument constructor
/// the element kind carries.
pub trait Component: Default + 'static {
    type State: Default + 'static;
    type Action: 'static;

    /// Hooks the runtime will call for this type.
    const HOOKS: Hooks = Hooks::empty();

    /// Recompute state from incoming props, on mount and on every parent update.
    fn derive_state_from_props(&self, _props: &Props, _state: &Self::State) -> Option<Self::State> {
        None
    }

    /// Return false to skip re-rendering for `next_props`.
    fn should_update(&self, _next_props: &Props, _state: &Self::State) -> bool {
        true
    }

    /// Fold an action into a new state. `None` leaves everything untouched.
    fn reducer(&self, _action: Self::Action, _state: &Self::State) -> Option<Self::State> {
        None
    }

    fn render(&self, scope: Scope, props: &Props, state: &Self::State) -> Element;

    /// Runs once the rendered tree is in the host.
    fn did_mount(&mut self, _cx: &mut Cx<'_>, _state: &Self::State) {}

    /// Runs after every committed re-render.
    fn did_update(&mut self, _cx: &mut Cx<'_>, _prev_props: &Props, _prev_state: &Self::State, _state: &Self::State) {}

    /// Runs before the instance is discarded.
    fn will_remove(&mut self, _cx: &mut Cx<'_>, _state: &Self::State) {}
}

// =============================================================================
// Scope
// =============================================================================

/// Render-time handle: builds listeners that address this instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    id: InstanceId,
}

impl Scope {
    pub(crate) fn new(id: InstanceId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// A listener prop that maps an event to an optional action for this instance.
    pub fn callback<A: 'static>(&self, f: impl Fn(&Event) -> Option<A> + 'static) -> PropValue {
        let id = self.id;
        PropValue::listener(move |event| f(event).map(|action| Envelope::new(id, action)))
    }

    /// A listener prop that always sends `action`.
    ///
    /// Compared by value across renders, so it only reaches the host when the
    /// action changes. Prefer it over [`callback`](Self::callback) whenever the
    /// action does not depend on the event.
    pub fn action<A: Clone + PartialEq + 'static>(&self, action: A) -> PropValue {
        PropValue::action(self.id, action)
    }
}

// =============================================================================
// Cx
// =============================================================================

/// Hook-time handle to the runtime.
pub struct Cx<'a> {
    scope: Scope,
    props: &'a Props,
    node: Option<NodeId>,
    timers: &'a mut Timers,
    queue: &'a mut VecDeque<Envelope>,
}

impl<'a> Cx<'a> {
    pub(crate) fn new(
        scope: Scope,
        props: &'a Props,
        node: Option<NodeId>,
        timers: &'a mut Timers,
        queue: &'a mut VecDeque<Envelope>,
    ) -> Self {
        Self {
            scope,
            props,
            node,
            timers,
            queue,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.scope.id
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Current props of the instance.
    pub fn props(&self) -> &'a Props {
        self.props
    }

    /// Container node the instance rendered into.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Current virtual time.
    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    /// Queue an action for this instance. It is delivered after the current update.
    pub fn send<A: 'static>(&mut self, action: A) {
        self.queue.push_back(Envelope::new(self.scope.id, action));
    }

    /// Invoke the listener stored in prop `name`, queueing whatever it returns.
    ///
    /// Returns false when the prop is absent or not a listener.
    pub fn emit(&mut self, name: &str, event: Event) -> bool {
        let Some(listener) = self.props.get(name).and_then(PropValue::as_listener) else {
            return false;
        };
        if let Some(envelope) = listener(&event) {
            self.queue.push_back(envelope);
        }
        true
    }

    /// Deliver `action` to this instance after `delay` time units.
    pub fn set_timeout<A: 'static>(&mut self, delay: u64, action: A) -> TimerId {
        self.timers.schedule(self.scope.id, delay, Box::new(action))
    }

    /// Cancel a timer. Returns false if it already fired.
    pub fn clear_timeout(&mut self, id: TimerId) -> bool {
        self.timers.cancel(id)
    }

    pub fn is_timer_pending(&self, id: TimerId) -> bool {
        self.timers.is_pending(id)
    }
}

// =============================================================================
// Tests
// =============================================================================
