//! Diff and patch.
//!
//! Reconciles a mounted element against its next description and applies
//! only the host mutations that differ:
//!
//! - different kind: mount the new tree at the old position, then remove the old one
//! - same component: hand the new props to the live instance
//! - same tag: write changed props, remove vanished ones, then reconcile children
//!
//! Mount links move from the previous description to the next one, so after
//! a pass only `next` refers to the host. When a pass fails, `prev` keeps its
//! root link.

use tracing::debug;

use super::keyed::child_mode;
use super::Runtime;
use crate::component::Hooks;
use crate::element::{ChildMode, Children, Element, Props};
use crate::engine::InstanceId;
use crate::error::{HostError, ReconcileError, Result};
use crate::host::{Host, NodeId};
use crate::types::PropValue;

/// Whether a prop value switching from `old` to `new` needs the old one
/// cleared first (listener to attribute, attribute to pass-through data).
fn changes_channel(old: &PropValue, new: &PropValue) -> bool {
    old.is_listener() != new.is_listener() || old.to_attribute().is_some() != new.to_attribute().is_some()
}

impl<H: Host> Runtime<H> {
    pub(super) fn reconcile_element(&mut self, prev: &mut Element, next: &mut Element) -> Result<()> {
        if prev.kind != next.kind {
            return self.replace(prev, next);
        }
        if next.kind.is_component() {
            return self.reconcile_component(prev, next);
        }

        let node = prev
            .host
            .ok_or_else(|| ReconcileError::Unmounted(prev.kind.to_string()))?;

        self.patch_props(node, &prev.props, &next.props)?;
        let prev_children = std::mem::take(&mut prev.props.children);
        self.reconcile_children(node, prev_children, &mut next.props.children)?;
        prev.host = None;
        next.host = Some(node);
        Ok(())
    }

    /// Mount `next` where `prev` sits, then remove `prev`.
    fn replace(&mut self, prev: &mut Element, next: &mut Element) -> Result<()> {
        let old = self
            .node_of(prev)
            .ok_or_else(|| ReconcileError::Unmounted(prev.kind.to_string()))?;
        let parent = self.host.parent(old).ok_or(HostError::Detached(old))?;
        debug!(from = %prev.kind, to = %next.kind, %old, "replace element");

        self.mount_into(next, parent, Some(old))?;
        self.remove_element(prev)?;
        prev.host = None;
        prev.instance = None;
        Ok(())
    }

    fn reconcile_component(&mut self, prev: &mut Element, next: &mut Element) -> Result<()> {
        let id = prev
            .instance
            .ok_or_else(|| ReconcileError::Unmounted(prev.kind.to_string()))?;
        self.update_from_parent(id, next.props.clone())?;
        next.instance = prev.instance.take();
        next.host = prev.host.take();
        Ok(())
    }

    /// Deliver new props to a live instance.
    pub(super) fn update_from_parent(&mut self, id: InstanceId, props: Props) -> Result<()> {
        let instance = self.instance_mut(id)?;
        if instance.has(Hooks::SHOULD_UPDATE) && !instance.component.should_update(&props) {
            instance.props = props;
            return Ok(());
        }

        let prev_props = std::mem::replace(&mut instance.props, props);
        let prev_state = if instance.has(Hooks::DERIVE_STATE) {
            instance.component.rederive(&instance.props)
        } else {
            None
        };

        if let Err(error) = self.rerender(id) {
            if let Ok(instance) = self.instance_mut(id) {
                instance.props = prev_props;
                if let Some(state) = prev_state {
                    instance.component.restore(state);
                }
            }
            return Err(error);
        }
        self.run_did_update(id, Some(prev_props), prev_state);
        Ok(())
    }

    /// Write new or changed props, remove props that disappeared.
    fn patch_props(&mut self, node: NodeId, prev: &Props, next: &Props) -> Result<()> {
        for (name, value) in next.iter() {
            match prev.get(name) {
                Some(old) if old == value => continue,
                Some(old) if changes_channel(old, value) => self.clear_prop(node, name, old)?,
                _ => {}
            }
            self.write_prop(node, name, value)?;
        }

        for (name, old) in prev.iter() {
            if !next.contains(name) {
                self.clear_prop(node, name, old)?;
            }
        }
        Ok(())
    }

    fn reconcile_children(&mut self, node: NodeId, prev: Children, next: &mut Children) -> Result<()> {
        match next {
            Children::None => match prev {
                Children::Elements(old) => self.remove_all(&old),
                Children::Text(_) => Ok(self.host.set_text(node, "")?),
                Children::None => Ok(()),
            },
            Children::Text(text) => {
                if let Children::Elements(old) = &prev {
                    self.remove_all(old)?;
                }
                if prev.as_text() != Some(&**text) {
                    self.host.set_text(node, text)?;
                }
                Ok(())
            }
            Children::Elements(next_children) => match prev {
                Children::Elements(old) if !old.is_empty() => match child_mode(&old, next_children) {
                    ChildMode::Keyed => self.reconcile_keyed(node, old, next_children),
                    ChildMode::Indexed => self.reconcile_indexed(node, old, next_children),
                },
                other => {
                    if other.as_text().is_some() {
                        self.host.set_text(node, "")?;
                    }
                    for child in next_children.iter_mut() {
                        self.mount_into(child, node, None)?;
                    }
                    Ok(())
                }
            },
        }
    }

    /// Pair children by position.
    fn reconcile_indexed(&mut self, node: NodeId, prev: Vec<Element>, next: &mut [Element]) -> Result<()> {
        let mut prev = prev.into_iter();
        for child in next.iter_mut() {
            match prev.next() {
                Some(mut old) => self.reconcile_element(&mut old, child)?,
                None => self.mount_into(child, node, None)?,
            }
        }
        for leftover in prev {
            self.remove_element(&leftover)?;
        }
        Ok(())
    }

    pub(super) fn remove_all(&mut self, children: &[Element]) -> Result<()> {
        for child in children {
            self.remove_element(child)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
