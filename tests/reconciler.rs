//! End-to-end reconciliation scenarios against the in-memory host.

use std::cell::Cell;
use std::rc::Rc;

use spark_vdom::{
    create_element, Component, Cx, Element, Event, Hooks, Host, HostError, HostTree, NodeId, Props,
    PropValue, ReconcileError, Runtime, RuntimeConfig, Scope, KEY,
};

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CounterAction {
    Increment,
    Noop,
}

#[derive(Default)]
struct Counter;

impl Component for Counter {
    type State = i64;
    type Action = CounterAction;

    const HOOKS: Hooks = Hooks::REDUCER;

    fn reducer(&self, action: CounterAction, state: &i64) -> Option<i64> {
        match action {
            CounterAction::Increment => Some(state + 1),
            CounterAction::Noop => None,
        }
    }

    fn render(&self, scope: Scope, props: &Props, state: &i64) -> Element {
        create_element(
            "counter",
            Props::new()
                .with("label", props.text("label").unwrap_or("count"))
                .with("on_click", scope.action(CounterAction::Increment)),
            Some(state.to_string().into()),
        )
    }
}

/// Sends itself an action from `did_mount`.
#[derive(Default)]
struct Loader;

impl Component for Loader {
    type State = bool;
    type Action = ();

    const HOOKS: Hooks = Hooks::REDUCER.union(Hooks::DID_MOUNT);

    fn reducer(&self, _action: (), state: &bool) -> Option<bool> {
        (!state).then_some(true)
    }

    fn render(&self, _scope: Scope, _props: &Props, state: &bool) -> Element {
        create_element("loader", Props::new(), Some((if *state { "ready" } else { "loading" }).into()))
    }

    fn did_mount(&mut self, cx: &mut Cx<'_>, _state: &bool) {
        cx.send(());
    }
}

/// Re-sends forever from `did_update`.
#[derive(Default)]
struct Echo;

impl Component for Echo {
    type State = u64;
    type Action = ();

    const HOOKS: Hooks = Hooks::REDUCER.union(Hooks::DID_UPDATE);

    fn reducer(&self, _action: (), state: &u64) -> Option<u64> {
        Some(state + 1)
    }

    fn render(&self, _scope: Scope, _props: &Props, _state: &u64) -> Element {
        create_element("echo", Props::new(), None)
    }

    fn did_update(&mut self, cx: &mut Cx<'_>, _prev_props: &Props, _prev: &u64, _state: &u64) {
        cx.send(());
    }
}

/// Counts `will_remove` calls through a shared cell in props.
#[derive(Default)]
struct Tracked;

impl Component for Tracked {
    type State = ();
    type Action = ();

    const HOOKS: Hooks = Hooks::WILL_REMOVE;

    fn render(&self, _scope: Scope, _props: &Props, _state: &()) -> Element {
        create_element("tracked", Props::new(), None)
    }

    fn will_remove(&mut self, cx: &mut Cx<'_>, _state: &()) {
        if let Some(removed) = cx.props().get("removed").and_then(PropValue::as_data::<Cell<u32>>) {
            removed.set(removed.get() + 1);
        }
    }
}

/// Counts up once, 5 time units after mounting.
#[derive(Default)]
struct Ticker;

impl Component for Ticker {
    type State = u32;
    type Action = ();

    const HOOKS: Hooks = Hooks::REDUCER.union(Hooks::DID_MOUNT);

    fn reducer(&self, _action: (), state: &u32) -> Option<u32> {
        Some(state + 1)
    }

    fn render(&self, _scope: Scope, _props: &Props, state: &u32) -> Element {
        create_element("tick", Props::new(), Some(state.to_string().into()))
    }

    fn did_mount(&mut self, cx: &mut Cx<'_>, _state: &u32) {
        cx.set_timeout(5, ());
    }
}

fn mounted(runtime: &mut Runtime, tree: Element) -> Element {
    let root = runtime.host().root();
    let tree = runtime.mount(tree, root).expect("mount");
    runtime.host_mut().reset_stats();
    tree
}

fn markup(runtime: &Runtime) -> String {
    runtime.host().inner_markup(runtime.host().root())
}

fn panel(label: &str) -> Element {
    create_element(
        "panel",
        Props::new().with("class", "main"),
        Some(
            vec![
                create_element("title", Props::new(), Some("Counter".into())),
                Element::component::<Counter>(Props::new().with("label", label)),
            ]
            .into(),
        ),
    )
}

fn counter_id(tree: &Element) -> spark_vdom::InstanceId {
    tree.children()[1].instance().expect("counter instance")
}

// =============================================================================
// Updates
// =============================================================================

#[test]
fn test_noop_update_touches_no_attributes_or_structure() {
    let mut runtime = Runtime::new();
    let prev = mounted(&mut runtime, panel("clicks"));
    let before = markup(&runtime);

    runtime.reconcile(prev, panel("clicks")).expect("reconcile");

    let stats = runtime.host().stats();
    assert_eq!(stats.attributes(), 0, "no attribute writes: {stats:?}");
    assert_eq!(stats.structural(), 0, "no structural mutations: {stats:?}");
    assert_eq!(stats.text_writes, 0);
    assert_eq!(stats.listener_changes, 0, "action listeners compare by value: {stats:?}");
    assert_eq!(stats.total(), 0);
    assert_eq!(markup(&runtime), before);
}

#[test]
fn test_rerender_keeps_equal_action_listener() {
    let mut runtime = Runtime::new();
    let tree = mounted(&mut runtime, panel("clicks"));
    let id = counter_id(&tree);
    let node = runtime.node_of(&tree.children()[1]).expect("counter node");

    runtime.send(id, CounterAction::Increment).expect("send");

    let stats = runtime.host().stats();
    assert_eq!(stats.text_writes, 1);
    assert_eq!(stats.total(), 1, "only the count changes: {stats:?}");
    assert!(runtime.dispatch_event(node, Event::new("click")).expect("dispatch"));
    assert_eq!(runtime.state::<i64>(id), Some(&2), "kept listener still routes");
}

#[test]
fn test_one_changed_prop_is_one_write() {
    let mut runtime = Runtime::new();
    let props = Props::new().with("a", 1).with("b", "x").with("c", true);
    let prev = mounted(&mut runtime, create_element("node", props.clone(), None));

    let next = create_element("node", props.with("b", "y"), None);
    let next = runtime.reconcile(prev, next).expect("reconcile");

    let stats = runtime.host().stats();
    assert_eq!(stats.attribute_writes, 1);
    assert_eq!(stats.total(), 1, "only the changed attribute is written");
    let node = next.host().expect("node");
    assert_eq!(runtime.host().attribute(node, "b"), Some("y"));
}

#[test]
fn test_component_is_updated_in_place() {
    let mut runtime = Runtime::new();
    let prev = mounted(&mut runtime, panel("clicks"));
    let id = counter_id(&prev);

    runtime.send(id, CounterAction::Increment).expect("send");
    runtime.host_mut().reset_stats();

    let next = runtime.reconcile(prev, panel("taps")).expect("reconcile");

    assert_eq!(counter_id(&next), id, "same instance after update");
    assert_eq!(runtime.state::<i64>(id), Some(&1), "state survives parent updates");
    assert_eq!(runtime.host().stats().created, 0, "no remount");
    assert_eq!(runtime.host().stats().attribute_writes, 1, "only the label changed");
    assert_eq!(
        markup(&runtime),
        r#"<panel class="main"><title>Counter</title><counter label="taps">1</counter></panel>"#
    );
}

#[test]
fn test_reducer_none_changes_nothing() {
    let mut runtime = Runtime::new();
    let tree = mounted(&mut runtime, panel("clicks"));
    let id = counter_id(&tree);
    let before = markup(&runtime);
    let rendered_node = runtime.node_of(&tree.children()[1]);

    runtime.send(id, CounterAction::Noop).expect("send");

    assert_eq!(runtime.host().stats().total(), 0, "no host access at all");
    assert_eq!(markup(&runtime), before);
    assert_eq!(runtime.node_of(&tree.children()[1]), rendered_node);
    assert_eq!(runtime.state::<i64>(id), Some(&0));
}

#[test]
fn test_dispatch_event_routes_to_reducer() {
    let mut runtime = Runtime::new();
    let tree = mounted(&mut runtime, panel("clicks"));
    let id = counter_id(&tree);
    let node = runtime.node_of(&tree.children()[1]).expect("counter node");

    assert!(runtime.dispatch_event(node, Event::new("click")).expect("dispatch"));
    assert!(runtime.dispatch_event(node, Event::new("click")).expect("dispatch"));
    assert!(!runtime.dispatch_event(node, Event::new("hover")).expect("no listener"));

    assert_eq!(runtime.state::<i64>(id), Some(&2));
    assert_eq!(runtime.host().text(node), Some("2"));
}

#[test]
fn test_listener_removed_with_prop() {
    let mut runtime = Runtime::new();
    let clicked = Rc::new(Cell::new(0));
    let counter = clicked.clone();
    let listener = PropValue::listener(move |_| {
        counter.set(counter.get() + 1);
        None
    });

    let prev = mounted(&mut runtime, create_element("button", Props::new().with("on_click", listener), None));
    let node = prev.host().expect("node");
    assert!(runtime.dispatch_event(node, Event::new("click")).expect("dispatch"));
    assert_eq!(clicked.get(), 1);

    runtime
        .reconcile(prev, create_element("button", Props::new(), None))
        .expect("reconcile");
    assert!(!runtime.host().has_listener(node, "click"));
    assert!(!runtime.dispatch_event(node, Event::new("click")).expect("dispatch"));
    assert_eq!(clicked.get(), 1);
}

// =============================================================================
// Replacement and Removal
// =============================================================================

#[test]
fn test_kind_mismatch_replaces_in_place() {
    let mut runtime = Runtime::new();
    let list = |middle: Element| {
        create_element(
            "list",
            Props::new(),
            Some(vec![create_element("a", Props::new(), None), middle, create_element("c", Props::new(), None)].into()),
        )
    };

    let prev = mounted(&mut runtime, list(Element::component::<Counter>(Props::new())));
    let id = counter_id(&prev);

    let next = runtime
        .reconcile(prev, list(create_element("b", Props::new(), None)))
        .expect("reconcile");

    assert_eq!(markup(&runtime), "<list><a/><b/><c/></list>");
    assert!(!runtime.is_mounted(id), "replaced component is discarded");
    assert!(matches!(
        runtime.send(id, CounterAction::Increment),
        Err(ReconcileError::StaleInstance(stale)) if stale == id
    ));

    runtime
        .reconcile(next, list(Element::component::<Counter>(Props::new())))
        .expect("back to component");
    assert_eq!(
        markup(&runtime),
        r#"<list><a/><counter label="count">0</counter><c/></list>"#
    );
}

#[test]
fn test_root_replacement() {
    let mut runtime = Runtime::new();
    let prev = mounted(&mut runtime, create_element("old", Props::new(), None));
    runtime
        .reconcile(prev, create_element("new", Props::new().with("x", 1), None))
        .expect("reconcile");
    assert_eq!(markup(&runtime), r#"<new x="1"/>"#);
}

#[test]
fn test_unmount_runs_will_remove_once_per_instance() {
    let mut runtime = Runtime::new();
    let removed = PropValue::data(Cell::new(0u32));
    let tracked = || Element::component::<Tracked>(Props::new().with("removed", removed.clone()));
    let tree = mounted(
        &mut runtime,
        create_element("g", Props::new(), Some(vec![tracked(), tracked(), tracked()].into())),
    );

    runtime.unmount(tree).expect("unmount");

    assert_eq!(removed.as_data::<Cell<u32>>().map(Cell::get), Some(3));
    assert_eq!(runtime.instance_count(), 0);
    assert_eq!(markup(&runtime), "");
}

// =============================================================================
// Queued Dispatch
// =============================================================================

#[test]
fn test_send_from_did_mount_applies_after_mount() {
    let mut runtime = Runtime::new();
    let tree = mounted(&mut runtime, Element::component::<Loader>(Props::new()));

    assert_eq!(markup(&runtime), "<loader>ready</loader>");
    assert_eq!(tree.instance().and_then(|id| runtime.state::<bool>(id)), Some(&true));
}

#[test]
fn test_runaway_dispatch_is_bounded() {
    let config = RuntimeConfig::new().with_max_queued_dispatches(50);
    let mut runtime = Runtime::with_config(HostTree::new(), config);
    let root = runtime.host().root();
    let tree = runtime.mount(Element::component::<Echo>(Props::new()), root).expect("mount");
    let id = tree.instance().expect("instance");

    let result = runtime.send(id, ());
    assert!(matches!(result, Err(ReconcileError::DispatchOverflow { limit: 50 })));
    assert_eq!(runtime.state::<u64>(id), Some(&50));
    assert_eq!(runtime.config().max_queued_dispatches, 50);
}

// =============================================================================
// Keyed Lists
// =============================================================================

fn keyed_list(keys: &[&str]) -> Element {
    let children: Vec<Element> = keys
        .iter()
        .map(|key| create_element("item", Props::new().with(KEY, *key), Some((*key).into())))
        .collect();
    create_element("list", Props::new(), Some(children.into()))
}

fn host_order(runtime: &Runtime, list: &Element) -> Vec<String> {
    let node = list.host().expect("list node");
    runtime
        .host()
        .children(node)
        .iter()
        .map(|child: &NodeId| runtime.host().text(*child).unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_keyed_reorder_keeps_nodes() {
    let mut runtime = Runtime::new();
    let prev = mounted(&mut runtime, keyed_list(&["a", "b", "c", "d"]));

    let next = runtime.reconcile(prev, keyed_list(&["d", "b", "a", "c"])).expect("reconcile");

    assert_eq!(host_order(&runtime, &next), vec!["d", "b", "a", "c"]);
    assert_eq!(runtime.host().stats().created, 0);
    assert_eq!(runtime.host().stats().removals, 0);
}

#[test]
fn test_keyed_insert_at_front_and_middle() {
    let mut runtime = Runtime::new();
    let prev = mounted(&mut runtime, keyed_list(&["b", "d"]));

    let next = runtime.reconcile(prev, keyed_list(&["a", "b", "c", "d"])).expect("reconcile");

    assert_eq!(host_order(&runtime, &next), vec!["a", "b", "c", "d"]);
    assert_eq!(runtime.host().stats().created, 2);
    assert_eq!(runtime.host().stats().inserts, 2, "stable nodes do not move");
}

#[test]
fn test_malformed_keys_reconcile_by_position() {
    let mut runtime = Runtime::new();
    let prev = mounted(&mut runtime, keyed_list(&["a", "b", "c"]));
    let first = prev.children()[0].host();

    let mut next = keyed_list(&["c", "b", "a"]);
    if let Some(children) = next.props.children.as_elements_mut() {
        children[1].props.remove(KEY);
    }
    let next = runtime.reconcile(prev, next).expect("falls back");

    assert_eq!(host_order(&runtime, &next), vec!["c", "b", "a"]);
    assert_eq!(next.children()[0].host(), first, "first position reuses the first node");
    assert_eq!(runtime.host().stats().inserts, 0, "positional pass never moves nodes");
}

#[test]
fn test_host_error_surfaces() {
    let mut runtime = Runtime::new();
    let tree = mounted(&mut runtime, keyed_list(&["a"]));
    let node = tree.host().expect("node");
    let root = runtime.host().root();

    runtime.host_mut().remove(root, node).expect("detach behind the runtime's back");

    let result = runtime.reconcile(tree, keyed_list(&["b"]));
    assert!(matches!(result, Err(ReconcileError::Host(_))));
}

#[test]
fn test_failed_update_keeps_committed_tree() {
    let mut runtime = Runtime::new();
    let tree = mounted(
        &mut runtime,
        create_element("g", Props::new(), Some(vec![Element::component::<Counter>(Props::new())].into())),
    );
    let g = tree.host().expect("g node");
    let id = tree.children()[0].instance().expect("counter instance");
    let node = runtime.node_of(&tree.children()[0]).expect("counter node");
    runtime.host_mut().remove(g, node).expect("detach behind the runtime's back");

    for attempt in 0..2 {
        let result = runtime.send(id, CounterAction::Increment);
        assert!(
            matches!(result, Err(ReconcileError::Host(HostError::NodeNotFound(n))) if n == node),
            "attempt {attempt}: {result:?}"
        );
        assert_eq!(runtime.state::<i64>(id), Some(&0), "reducer state rolled back");
        assert_eq!(
            runtime.rendered(id).and_then(Element::host),
            Some(node),
            "still committed to the original node"
        );
    }
    assert_eq!(markup(&runtime), "<g/>", "nothing remounted");
    assert_eq!(runtime.host().stats().created, 0);
}

#[test]
fn test_failed_timer_still_moves_the_clock() {
    let mut runtime = Runtime::new();
    let tree = mounted(
        &mut runtime,
        create_element("g", Props::new(), Some(vec![Element::component::<Ticker>(Props::new())].into())),
    );
    let g = tree.host().expect("g node");
    let id = tree.children()[0].instance().expect("ticker instance");
    let node = runtime.node_of(&tree.children()[0]).expect("tick node");
    runtime.host_mut().remove(g, node).expect("detach behind the runtime's back");

    let result = runtime.advance(10);
    assert!(matches!(result, Err(ReconcileError::Host(_))), "{result:?}");
    assert_eq!(runtime.now(), 10, "clock reaches the requested time");
    assert_eq!(runtime.timers().pending(), 0);
    assert_eq!(runtime.state::<u32>(id), Some(&0));
}

#[test]
fn test_failed_mount_releases_nodes_and_instances() {
    let mut runtime = Runtime::new();
    let root = runtime.host().root();
    let stale = runtime.host_mut().create_node("gone");
    runtime.host_mut().insert(root, stale, None).expect("insert");
    runtime.host_mut().remove(root, stale).expect("remove");
    let nodes = runtime.host().len();

    let removed = PropValue::data(Cell::new(0u32));
    let tree = create_element(
        "list",
        Props::new(),
        Some(
            vec![
                create_element("item", Props::new().with("class", "a"), Some("one".into())),
                Element::component::<Tracked>(Props::new().with("removed", removed.clone())),
            ]
            .into(),
        ),
    );

    let result = runtime.mount(tree, stale);
    assert!(
        matches!(result, Err(ReconcileError::Host(HostError::NodeNotFound(n))) if n == stale),
        "{result:?}"
    );
    assert_eq!(runtime.host().len(), nodes, "no orphaned host nodes");
    assert_eq!(runtime.instance_count(), 0);
    assert_eq!(removed.as_data::<Cell<u32>>().map(Cell::get), Some(1), "mounted child was torn down");
}
