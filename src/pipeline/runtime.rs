//! Runtime - Owner of the host, the instances and the clock.
//!
//! Every public entry point runs to completion: it applies its own update,
//! then drains the queue of actions that hooks and listeners produced along
//! the way. Nothing reconciles re-entrantly, so a hook that sends an action
//! to itself sees it applied only after the current commit.
//!
//! # Example
//!
//! ```ignore
//! use spark_vdom::{create_element, Props, Runtime};
//!
//! let mut runtime = Runtime::new();
//! let root = runtime.host().root();
//!
//! let tree = runtime.mount(create_element("list", Props::new(), None), root)?;
//! let tree = runtime.reconcile(tree, create_element("list", Props::new().with("a", 1), None))?;
//! runtime.advance(200)?;
//! runtime.unmount(tree)?;
//! ```

use std::any::Any;
use std::collections::VecDeque;

use tracing::debug;

use crate::component::{AnyComponent, Cx, Hooks, Instance, Scope};
use crate::config::RuntimeConfig;
use crate::element::{Element, ElementKind, Props};
use crate::engine::{InstanceId, Registry, Timers};
use crate::error::{ReconcileError, Result};
use crate::host::{Host, HostTree, NodeId};
use crate::types::{Envelope, Event};

/// The reconciler: mounts element trees into a [`Host`] and keeps them in sync.
pub struct Runtime<H: Host = HostTree> {
    pub(super) host: H,
    pub(super) instances: Registry<Instance>,
    pub(super) timers: Timers,
    pub(super) queue: VecDeque<Envelope>,
    config: RuntimeConfig,
}

impl Runtime<HostTree> {
    /// Runtime over a fresh in-memory [`HostTree`].
    pub fn new() -> Self {
        Self::with_host(HostTree::new())
    }
}

impl Default for Runtime<HostTree> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> Runtime<H> {
    pub fn with_host(host: H) -> Self {
        Self::with_config(host, RuntimeConfig::default())
    }

    pub fn with_config(host: H, config: RuntimeConfig) -> Self {
        Self {
            host,
            instances: Registry::new(),
            timers: Timers::new(),
            queue: VecDeque::new(),
            config,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Current virtual time.
    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn is_mounted(&self, id: InstanceId) -> bool {
        self.instances.contains(id.slot())
    }

    /// Number of live component instances.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Current state of an instance, if it is live and `S` is its state type.
    pub fn state<S: Any>(&self, id: InstanceId) -> Option<&S> {
        self.instances
            .get(id.slot())?
            .component
            .state()
            .downcast_ref::<S>()
    }

    /// Latest props received by an instance.
    pub fn props(&self, id: InstanceId) -> Option<&Props> {
        self.instances.get(id.slot()).map(|i| &i.props)
    }

    /// Latest committed render output of an instance.
    pub fn rendered(&self, id: InstanceId) -> Option<&Element> {
        self.instances.get(id.slot())?.rendered.as_ref()
    }

    /// The host node an element materialized as. Component elements resolve
    /// through their rendered tree.
    pub fn node_of(&self, el: &Element) -> Option<NodeId> {
        match el.kind {
            ElementKind::Tag(_) => el.host,
            ElementKind::Component(_) => {
                let instance = self.instances.get(el.instance?.slot())?;
                self.node_of(instance.rendered.as_ref()?)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Entry Points
    // -------------------------------------------------------------------------

    /// Materialize `tree` at the end of `container`. Returns the mounted tree.
    pub fn mount(&mut self, mut tree: Element, container: NodeId) -> Result<Element> {
        debug!(kind = %tree.kind, %container, "mount");
        self.mount_into(&mut tree, container, None)?;
        self.drain()?;
        Ok(tree)
    }

    /// Bring the host in line with `next`, given the mounted `prev`. Returns
    /// `next`, now owning the mount links.
    pub fn reconcile(&mut self, mut prev: Element, mut next: Element) -> Result<Element> {
        if !prev.is_mounted() {
            return Err(ReconcileError::Unmounted(prev.kind.to_string()));
        }
        self.reconcile_element(&mut prev, &mut next)?;
        self.drain()?;
        Ok(next)
    }

    /// Tear down a mounted tree and remove its nodes from the host.
    pub fn unmount(&mut self, tree: Element) -> Result<()> {
        if !tree.is_mounted() {
            return Err(ReconcileError::Unmounted(tree.kind.to_string()));
        }
        debug!(kind = %tree.kind, "unmount");
        self.remove_element(&tree)?;
        self.drain()
    }

    /// Deliver `action` to an instance's reducer, then drain follow-up actions.
    pub fn send<A: 'static>(&mut self, id: InstanceId, action: A) -> Result<()> {
        if !self.is_mounted(id) {
            return Err(ReconcileError::StaleInstance(id));
        }
        self.queue.push_back(Envelope::new(id, action));
        self.drain()
    }

    /// Fire the listener registered on `node` for `event.name`.
    ///
    /// Returns false when no listener is attached.
    pub fn dispatch_event(&mut self, node: NodeId, mut event: Event) -> Result<bool> {
        let Some(listener) = self.host.listener(node, &event.name) else {
            return Ok(false);
        };
        event.target = Some(node);
        if let Some(envelope) = listener(&event) {
            self.queue.push_back(envelope);
        }
        self.drain()?;
        Ok(true)
    }

    /// Move the clock forward by `delta`, firing due timers in deadline order.
    /// Returns how many fired.
    ///
    /// If a fired timer fails, the clock still ends at `now + delta`. Due
    /// timers that had not fired yet stay pending and fire on the next call.
    pub fn advance(&mut self, delta: u64) -> Result<usize> {
        let until = self.timers.now().saturating_add(delta);
        let mut fired = 0;
        while let Some(timer) = self.timers.pop_due(until) {
            debug!(timer = %timer.id, owner = %timer.owner, at = self.timers.now(), "timer fired");
            fired += 1;
            let result = self.apply(timer.owner, timer.action).and_then(|()| self.drain());
            if let Err(error) = result {
                self.timers.advance_to(until);
                return Err(error);
            }
        }
        self.timers.advance_to(until);
        Ok(fired)
    }

    /// Fire every timer pending right now, jumping the clock to each deadline.
    /// Timers scheduled while these run are left pending.
    pub fn run_pending_timers(&mut self) -> Result<usize> {
        let mut fired = 0;
        for id in self.timers.pending_ids() {
            let Some(timer) = self.timers.take(id) else {
                continue;
            };
            fired += 1;
            self.apply(timer.owner, timer.action)?;
            self.drain()?;
        }
        Ok(fired)
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    fn drain(&mut self) -> Result<()> {
        let limit = self.config.max_queued_dispatches;
        let mut processed = 0;
        while let Some(envelope) = self.queue.pop_front() {
            if processed == limit {
                self.queue.clear();
                return Err(ReconcileError::DispatchOverflow { limit });
            }
            processed += 1;
            self.apply(envelope.target, envelope.action)?;
        }
        Ok(())
    }

    /// Reduce one action and commit the result.
    fn apply(&mut self, id: InstanceId, action: Box<dyn Any>) -> Result<()> {
        let Some(instance) = self.instances.get_mut(id.slot()) else {
            debug!(instance = %id, "dropping action for removed instance");
            return Ok(());
        };
        if !instance.has(Hooks::REDUCER) {
            debug!(instance = %id, component = instance.component.name(), "no reducer; action ignored");
            return Ok(());
        }
        let Some(prev_state) = instance.component.reduce(action) else {
            return Ok(());
        };

        if let Err(error) = self.rerender(id) {
            if let Ok(instance) = self.instance_mut(id) {
                instance.component.restore(prev_state);
            }
            return Err(error);
        }
        self.run_did_update(id, None, Some(prev_state));
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Instance Helpers
    // -------------------------------------------------------------------------

    pub(super) fn instance_mut(&mut self, id: InstanceId) -> Result<&mut Instance> {
        self.instances
            .get_mut(id.slot())
            .ok_or(ReconcileError::StaleInstance(id))
    }

    /// Render an instance with its current props and state, and reconcile the
    /// output against the committed tree.
    ///
    /// On failure the previous tree stays committed, so the next update diffs
    /// against the nodes the host still has.
    pub(super) fn rerender(&mut self, id: InstanceId) -> Result<()> {
        let instance = self.instance_mut(id)?;
        let mut next = instance.component.render(Scope::new(id), &instance.props);
        let Some(mut prev) = instance.rendered.take() else {
            return Err(ReconcileError::Unmounted(instance.component.name().to_string()));
        };

        let result = self.reconcile_element(&mut prev, &mut next);
        let committed = if result.is_ok() { next } else { prev };
        self.instance_mut(id)?.rendered = Some(committed);
        result
    }

    pub(super) fn run_did_update(&mut self, id: InstanceId, prev_props: Option<Props>, prev_state: Option<Box<dyn Any>>) {
        let declared = self
            .instances
            .get(id.slot())
            .is_some_and(|i| i.has(Hooks::DID_UPDATE));
        if declared {
            self.with_cx(id, |component, cx| {
                component.did_update(cx, prev_props.as_ref(), prev_state);
            });
        }
    }

    /// Run `f` with the instance's component and a [`Cx`] for it.
    /// Returns false if the instance is gone.
    pub(super) fn with_cx(&mut self, id: InstanceId, f: impl FnOnce(&mut Box<dyn AnyComponent>, &mut Cx<'_>)) -> bool {
        let Self {
            instances,
            timers,
            queue,
            ..
        } = self;
        let Some(instance) = instances.get_mut(id.slot()) else {
            return false;
        };
        let Instance {
            component,
            props,
            container,
            ..
        } = instance;

        let mut cx = Cx::new(Scope::new(id), props, Some(*container), timers, queue);
        f(component, &mut cx);
        true
    }
}
