//! TransitionGroup - Keyed list whose children leave through a transition.
//!
//! The group renders the union of its current children and the children
//! still on their way out. Each child is expected to be a keyed
//! [`Transition`](super::Transition); the group drives it through the `in`
//! and `status` props and removes the key once the child reports `exited`.
//!
//! # Props
//!
//! - children: keyed `Transition` elements
//! - `wrapper` (`PropValue::Wrap`, builds the container around the children;
//!   default is a bare `g` tag)
//!
//! # Example
//!
//! ```ignore
//! let items = keys.iter().map(|key| {
//!     Element::component::<Transition>(
//!         Props::new().with("key", *key).with("render", render_item.clone()),
//!     )
//! });
//!
//! Element::component::<TransitionGroup>(
//!     Props::new()
//!         .with("wrapper", PropValue::wrap(|children| {
//!             Element::tag("g", Props::new().with("class", "series")).with_children(children)
//!         }))
//!         .with_children(items.collect::<Vec<_>>()),
//! )
//! ```

use tracing::debug;

use super::child_mapping::{initial_child_mapping, is_in, next_child_mapping, ChildMapping};
use crate::component::{Component, Hooks, Scope};
use crate::element::{Element, Props};
use crate::types::{Key, PropValue};

#[derive(Debug, Clone, Default)]
pub struct TransitionGroupState {
    /// Rendered children, leaving ones included.
    pub children: ChildMapping,
    initialized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionGroupAction {
    /// The child with this key finished its exit.
    Exited(Key),
}

#[derive(Debug, Default)]
pub struct TransitionGroup;

impl Component for TransitionGroup {
    type State = TransitionGroupState;
    type Action = TransitionGroupAction;

    const HOOKS: Hooks = Hooks::DERIVE_STATE.union(Hooks::REDUCER);

    fn derive_state_from_props(&self, props: &Props, state: &TransitionGroupState) -> Option<TransitionGroupState> {
        let children = props.children.as_elements().unwrap_or_default().to_vec();
        let children = if state.initialized {
            next_child_mapping(children, &state.children)
        } else {
            initial_child_mapping(children)
        };
        Some(TransitionGroupState {
            children,
            initialized: true,
        })
    }

    fn reducer(&self, action: TransitionGroupAction, state: &TransitionGroupState) -> Option<TransitionGroupState> {
        let TransitionGroupAction::Exited(key) = action;
        if state.children.get(&key).is_none_or(is_in) {
            return None;
        }

        debug!(%key, "transition group drops exited child");
        let mut next = state.clone();
        next.children.remove(&key);
        Some(next)
    }

    fn render(&self, scope: Scope, props: &Props, state: &TransitionGroupState) -> Element {
        let children: Vec<Element> = state
            .children
            .iter()
            .map(|(key, child)| {
                let mut child = child.clone();
                child
                    .props
                    .set("on_exited", scope.action(TransitionGroupAction::Exited(key.clone())));
                child
            })
            .collect();

        match props.get("wrapper").and_then(PropValue::as_wrap) {
            Some(wrap) => wrap(children),
            None => Element::tag("g", Props::new()).with_children(children),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::KEY;
    use crate::types::Event;

    fn child(key: i32) -> Element {
        Element::tag("item", Props::new().with(KEY, key))
    }

    fn group_props(keys: &[i32]) -> Props {
        Props::new().with_children(keys.iter().map(|k| child(*k)).collect::<Vec<_>>())
    }

    fn keys(state: &TransitionGroupState) -> Vec<String> {
        state.children.keys().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_first_derive_uses_initial_mapping() {
        let group = TransitionGroup;
        let state = group
            .derive_state_from_props(&group_props(&[1, 2]), &TransitionGroupState::default())
            .expect("always derives");

        assert_eq!(keys(&state), vec!["1", "2"]);
        assert!(state.initialized);
        assert!(state.children.values().all(|c| c.props.text("status") == Some("enter")));
    }

    #[test]
    fn test_reducer_only_drops_leaving_children() {
        let group = TransitionGroup;
        let first = group
            .derive_state_from_props(&group_props(&[1, 2]), &TransitionGroupState::default())
            .expect("first");
        let second = group
            .derive_state_from_props(&group_props(&[2]), &first)
            .expect("second");

        assert!(
            group.reducer(TransitionGroupAction::Exited(Key::from(2)), &second).is_none(),
            "present child stays"
        );
        assert!(group.reducer(TransitionGroupAction::Exited(Key::from(9)), &second).is_none());

        let dropped = group
            .reducer(TransitionGroupAction::Exited(Key::from(1)), &second)
            .expect("leaving child goes");
        assert_eq!(keys(&dropped), vec!["2"]);
    }

    #[test]
    fn test_render_wires_exit_listener_and_wrapper() {
        use crate::engine::{InstanceId, Registry};

        let mut registry = Registry::new();
        let scope = Scope::new(InstanceId(registry.insert(())));
        let group = TransitionGroup;
        let state = group
            .derive_state_from_props(&group_props(&[7]), &TransitionGroupState::default())
            .expect("state");

        let plain = group.render(scope, &Props::new(), &state);
        assert_eq!(plain.kind.tag(), Some("g"));

        let props = Props::new().with("wrapper", PropValue::wrap(|children| {
            Element::tag("svg", Props::new()).with_children(children)
        }));
        let wrapped = group.render(scope, &props, &state);
        assert_eq!(wrapped.kind.tag(), Some("svg"));

        let listener = wrapped.children()[0]
            .props
            .get("on_exited")
            .and_then(PropValue::as_listener)
            .expect("exit listener");
        let envelope = listener(&Event::new("exited")).expect("maps to an action");
        assert_eq!(envelope.target, scope.id());
        assert_eq!(
            envelope.action.downcast_ref::<TransitionGroupAction>(),
            Some(&TransitionGroupAction::Exited(Key::from(7)))
        );
    }
}
