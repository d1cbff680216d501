//! Type-erased component instances.
//!
//! The runtime stores instances of many component types in one registry, so
//! each is boxed behind [`AnyComponent`]. [`Mounted`] pairs a component with
//! its current state and does the downcasting at the boundary.

use std::any::Any;

use tracing::warn;

use super::{Component, Cx, Hooks, Scope};
use crate::element::{Element, Props};
use crate::host::NodeId;

/// Object-safe view of a component plus its state.
pub(crate) trait AnyComponent {
    fn name(&self) -> &'static str;

    fn hooks(&self) -> Hooks;

    /// Run `derive_state_from_props`. Returns the replaced state if it changed.
    fn rederive(&mut self, props: &Props) -> Option<Box<dyn Any>>;

    /// Run the reducer. Returns the replaced state if it changed.
    fn reduce(&mut self, action: Box<dyn Any>) -> Option<Box<dyn Any>>;

    /// Put back a state returned by `rederive` or `reduce`.
    fn restore(&mut self, state: Box<dyn Any>);

    fn should_update(&self, next_props: &Props) -> bool;

    fn render(&self, scope: Scope, props: &Props) -> Element;

    fn did_mount(&mut self, cx: &mut Cx<'_>);

    /// `None` for either argument means "unchanged": the current value is passed.
    fn did_update(&mut self, cx: &mut Cx<'_>, prev_props: Option<&Props>, prev_state: Option<Box<dyn Any>>);

    fn will_remove(&mut self, cx: &mut Cx<'_>);

    fn state(&self) -> &dyn Any;
}

/// A component together with its current state.
pub(crate) struct Mounted<C: Component> {
    component: C,
    state: C::State,
}

/// Factory stored in [`ComponentType`](crate::element::ComponentType).
pub(crate) fn erase<C: Component>() -> Box<dyn AnyComponent> {
    Box::new(Mounted::<C> {
        component: C::default(),
        state: C::State::default(),
    })
}

impl<C: Component> AnyComponent for Mounted<C> {
    fn name(&self) -> &'static str {
        std::any::type_name::<C>()
    }

    fn hooks(&self) -> Hooks {
        C::HOOKS
    }

    fn rederive(&mut self, props: &Props) -> Option<Box<dyn Any>> {
        let next = self.component.derive_state_from_props(props, &self.state)?;
        let prev = std::mem::replace(&mut self.state, next);
        Some(Box::new(prev))
    }

    fn reduce(&mut self, action: Box<dyn Any>) -> Option<Box<dyn Any>> {
        let action = match action.downcast::<C::Action>() {
            Ok(action) => *action,
            Err(_) => {
                warn!(component = self.name(), "dropping action of the wrong type");
                return None;
            }
        };
        let next = self.component.reducer(action, &self.state)?;
        let prev = std::mem::replace(&mut self.state, next);
        Some(Box::new(prev))
    }

    fn restore(&mut self, state: Box<dyn Any>) {
        match state.downcast::<C::State>() {
            Ok(state) => self.state = *state,
            Err(_) => warn!(component = self.name(), "cannot restore state of the wrong type"),
        }
    }

    fn should_update(&self, next_props: &Props) -> bool {
        self.component.should_update(next_props, &self.state)
    }

    fn render(&self, scope: Scope, props: &Props) -> Element {
        self.component.render(scope, props, &self.state)
    }

    fn did_mount(&mut self, cx: &mut Cx<'_>) {
        self.component.did_mount(cx, &self.state);
    }

    fn did_update(&mut self, cx: &mut Cx<'_>, prev_props: Option<&Props>, prev_state: Option<Box<dyn Any>>) {
        let prev_props = prev_props.unwrap_or_else(|| cx.props());
        let prev_state = prev_state.and_then(|s| s.downcast::<C::State>().ok());
        match prev_state {
            Some(prev) => self.component.did_update(cx, prev_props, &prev, &self.state),
            None => self.component.did_update(cx, prev_props, &self.state, &self.state),
        }
    }

    fn will_remove(&mut self, cx: &mut Cx<'_>) {
        self.component.will_remove(cx, &self.state);
    }

    fn state(&self) -> &dyn Any {
        &self.state
    }
}

/// Runtime record of a live component.
pub(crate) struct Instance {
    pub component: Box<dyn AnyComponent>,
    pub hooks: Hooks,
    pub props: Props,
    /// Latest committed render output.
    pub rendered: Option<Element>,
    /// Container the rendered tree lives in.
    pub container: NodeId,
}

impl Instance {
    pub fn new(component: Box<dyn AnyComponent>, props: Props, container: NodeId) -> Self {
        Self {
            hooks: component.hooks(),
            component,
            props,
            rendered: None,
            container,
        }
    }

    pub fn has(&self, hook: Hooks) -> bool {
        self.hooks.contains(hook)
    }
}

// =============================================================================
// Tests
// =============================================================================
