//! Mount and teardown.
//!
//! Mounting always creates fresh host nodes. A tag element becomes one node
//! with its attributes, listeners and children applied before it is inserted
//! into the container. A component element becomes an instance whose render
//! output is mounted in its place.
//!
//! Teardown is the inverse for instances: `will_remove` runs, every timer the
//! instance owns is cancelled, queued actions for it are dropped and the
//! instance leaves the registry. Host removal is one call on the subtree root.

use tracing::{debug, trace};

use super::Runtime;
use crate::component::{Hooks, Instance, Scope};
use crate::element::{Children, ComponentType, Element, ElementKind};
use crate::engine::InstanceId;
use crate::error::Result;
use crate::host::{Host, NodeId};
use crate::types::PropValue;

/// Event name a listener prop attaches under: `on_click` and `onclick` both
/// map to `click`.
pub(super) fn event_name(prop: &str) -> &str {
    prop.strip_prefix("on_")
        .or_else(|| prop.strip_prefix("on"))
        .unwrap_or(prop)
}

impl<H: Host> Runtime<H> {
    /// Mount `el` under `container`, before `before` or at the end.
    pub(super) fn mount_into(&mut self, el: &mut Element, container: NodeId, before: Option<NodeId>) -> Result<()> {
        match el.kind.clone() {
            ElementKind::Tag(tag) => self.mount_tag(el, &tag, container, before),
            ElementKind::Component(ty) => self.mount_component(el, ty, container, before),
        }
    }

    fn mount_tag(&mut self, el: &mut Element, tag: &str, container: NodeId, before: Option<NodeId>) -> Result<()> {
        let node = self.host.create_node(tag);
        el.host = Some(node);

        let result = self
            .fill_node(el, node)
            .and_then(|()| Ok(self.host.insert(container, node, before)?));
        if result.is_err() {
            debug!(%node, tag, "discard partially mounted node");
            self.teardown(el);
            self.host.discard(node);
            el.host = None;
        }
        result
    }

    /// Props and children of a freshly created node.
    fn fill_node(&mut self, el: &mut Element, node: NodeId) -> Result<()> {
        for (name, value) in el.props.iter() {
            self.write_prop(node, name, value)?;
        }

        match &mut el.props.children {
            Children::None => {}
            Children::Text(text) => self.host.set_text(node, text)?,
            Children::Elements(children) => {
                for child in children.iter_mut() {
                    self.mount_into(child, node, None)?;
                }
            }
        }
        Ok(())
    }

    fn mount_component(
        &mut self,
        el: &mut Element,
        ty: ComponentType,
        container: NodeId,
        before: Option<NodeId>,
    ) -> Result<()> {
        let instance = Instance::new(ty.instantiate(), el.props.clone(), container);
        let id = InstanceId(self.instances.insert(instance));
        debug!(component = ty.name(), instance = %id, "mount component");

        let instance = self.instance_mut(id)?;
        if instance.has(Hooks::DERIVE_STATE) {
            instance.component.rederive(&instance.props);
        }
        let mut rendered = instance.component.render(Scope::new(id), &instance.props);
        let did_mount = instance.has(Hooks::DID_MOUNT);

        if let Err(error) = self.mount_into(&mut rendered, container, before) {
            self.instances.remove(id.slot());
            return Err(error);
        }
        self.instance_mut(id)?.rendered = Some(rendered);
        el.host = Some(container);
        el.instance = Some(id);

        if did_mount {
            self.with_cx(id, |component, cx| component.did_mount(cx));
        }
        Ok(())
    }

    /// Write one property to a host node.
    pub(super) fn write_prop(&mut self, node: NodeId, name: &str, value: &PropValue) -> Result<()> {
        if let Some(listener) = value.as_listener() {
            self.host.add_listener(node, event_name(name), listener.clone())?;
        } else if let Some(attribute) = value.to_attribute() {
            self.host.set_attribute(node, name, &attribute)?;
        }
        Ok(())
    }

    /// Undo what [`write_prop`](Self::write_prop) did for `value`.
    pub(super) fn clear_prop(&mut self, node: NodeId, name: &str, value: &PropValue) -> Result<()> {
        if value.is_listener() {
            self.host.remove_listener(node, event_name(name))?;
        } else if value.to_attribute().is_some() {
            trace!(%node, name, "clear attribute");
            self.host.remove_attribute(node, name)?;
        }
        Ok(())
    }

    /// Release every instance under `el`. Host nodes are left in place.
    pub(super) fn teardown(&mut self, el: &Element) {
        match el.kind {
            ElementKind::Tag(_) => {
                for child in el.children() {
                    self.teardown(child);
                }
            }
            ElementKind::Component(_) => {
                if let Some(id) = el.instance {
                    self.release_instance(id);
                }
            }
        }
    }

    fn release_instance(&mut self, id: InstanceId) {
        let will_remove = self
            .instances
            .get(id.slot())
            .is_some_and(|i| i.has(Hooks::WILL_REMOVE));
        if will_remove {
            self.with_cx(id, |component, cx| component.will_remove(cx));
        }

        let cancelled = self.timers.cancel_owner(id);
        self.queue.retain(|envelope| envelope.target != id);

        let Some(instance) = self.instances.remove(id.slot()) else {
            return;
        };
        debug!(component = instance.component.name(), instance = %id, cancelled, "remove component");
        if let Some(rendered) = &instance.rendered {
            self.teardown(rendered);
        }
    }

    /// Tear down `el` and detach its node from the host.
    pub(super) fn remove_element(&mut self, el: &Element) -> Result<()> {
        let node = self.node_of(el);
        self.teardown(el);
        if let Some(node) = node {
            if let Some(parent) = self.host.parent(node) {
                self.host.remove(parent, node)?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
