//! Tests for collection-changed and property-changed notifications
//!
//! Bubbling rules:
//! - collection-changed stays on the container whose sequence changed
//! - property-changed fires on the node, then on each ancestor, nearest first
//! - detached subtrees stop notifying former ancestors

use std::cell::RefCell;
use std::rc::Rc;

use rstest::{fixture, rstest};

use conntree::domain::{
    CollectionChange, ConnectionTree, NodeId, Property, Protocol, SubscriptionId, TreeEvent,
};
use conntree::util::testing;

type Log = Rc<RefCell<Vec<TreeEvent>>>;

/// root
/// ├── group
/// │   ├── sub
/// │   │   └── deep
/// │   └── web
/// └── db
struct Fixture {
    tree: ConnectionTree,
    root: NodeId,
    group: NodeId,
    sub: NodeId,
    deep: NodeId,
    web: NodeId,
    db: NodeId,
}

#[fixture]
fn fx() -> Fixture {
    testing::init_test_setup();
    let mut tree = ConnectionTree::new("root");
    let root = tree.root();
    let group = tree.create_container("group");
    let sub = tree.create_container("sub");
    let deep = tree.create_connection("deep");
    let web = tree.create_connection("web");
    let db = tree.create_connection("db");
    tree.add_child_range(root, &[group, db]).unwrap();
    tree.add_child_range(group, &[sub, web]).unwrap();
    tree.add_child(sub, deep).unwrap();
    Fixture {
        tree,
        root,
        group,
        sub,
        deep,
        web,
        db,
    }
}

fn record_properties(tree: &mut ConnectionTree, node: NodeId) -> (Log, SubscriptionId) {
    let log: Log = Rc::default();
    let sink = Rc::clone(&log);
    let id = tree
        .on_property_changed(node, move |_, event| sink.borrow_mut().push(*event))
        .unwrap();
    (log, id)
}

fn record_collection(tree: &mut ConnectionTree, container: NodeId) -> Log {
    let log: Log = Rc::default();
    let sink = Rc::clone(&log);
    tree.on_collection_changed(container, move |_, event| sink.borrow_mut().push(*event))
        .unwrap();
    log
}

// ============================================================
// Collection-changed
// ============================================================

#[rstest]
fn given_listener_when_child_added_then_collection_changed_fires(mut fx: Fixture) {
    let log = record_collection(&mut fx.tree, fx.root);
    let extra = fx.tree.create_connection("extra");

    fx.tree.add_child(fx.root, extra).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![TreeEvent::CollectionChanged {
            container: fx.root,
            change: CollectionChange::Added { node: extra, index: 2 },
        }]
    );
}

#[rstest]
fn given_listener_when_child_removed_then_collection_changed_fires(mut fx: Fixture) {
    let log = record_collection(&mut fx.tree, fx.root);

    fx.tree.remove_child(fx.root, fx.db).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![TreeEvent::CollectionChanged {
            container: fx.root,
            change: CollectionChange::Removed { node: fx.db, index: 1 },
        }]
    );
}

#[rstest]
fn given_nested_change_when_grandchild_added_then_ancestor_collection_silent(mut fx: Fixture) {
    let root_log = record_collection(&mut fx.tree, fx.root);
    let sub_log = record_collection(&mut fx.tree, fx.sub);
    let extra = fx.tree.create_connection("extra");

    fx.tree.add_child(fx.sub, extra).unwrap();

    assert!(root_log.borrow().is_empty());
    assert_eq!(sub_log.borrow().len(), 1);
}

#[rstest]
fn given_non_child_when_removed_then_no_event(mut fx: Fixture) {
    let log = record_collection(&mut fx.tree, fx.root);

    fx.tree.remove_child(fx.root, fx.deep).unwrap();

    assert!(log.borrow().is_empty());
}

#[rstest]
fn given_range_when_added_then_one_event_per_node(mut fx: Fixture) {
    let log = record_collection(&mut fx.tree, fx.root);
    let x = fx.tree.create_connection("x");
    let y = fx.tree.create_connection("y");

    fx.tree.add_child_range(fx.root, &[x, y]).unwrap();

    assert_eq!(log.borrow().len(), 2);
}

#[rstest]
fn given_listener_when_collection_changed_then_tree_already_consistent(mut fx: Fixture) {
    let seen: Rc<RefCell<Option<(Option<NodeId>, bool)>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let web = fx.web;
    let group = fx.group;
    fx.tree
        .on_collection_changed(fx.group, move |tree, _| {
            let parent = tree.parent(web).unwrap();
            let listed = tree.children(group).unwrap().contains(&web);
            *sink.borrow_mut() = Some((parent, listed));
        })
        .unwrap();

    fx.tree.remove_child(fx.group, fx.web).unwrap();

    assert_eq!(*seen.borrow(), Some((None, false)));
}

// ============================================================
// Property-changed bubbling
// ============================================================

#[rstest]
fn given_direct_child_when_renamed_then_parent_notified(mut fx: Fixture) {
    let (log, _) = record_properties(&mut fx.tree, fx.root);

    fx.tree.set_name(fx.db, "somethinghere").unwrap();

    assert_eq!(
        *log.borrow(),
        vec![TreeEvent::PropertyChanged {
            sender: fx.root,
            source: fx.db,
            property: Property::Name,
        }]
    );
}

#[rstest]
fn given_grandchild_when_renamed_then_top_ancestor_notified(mut fx: Fixture) {
    let (log, _) = record_properties(&mut fx.tree, fx.root);

    fx.tree.set_name(fx.deep, "somethinghere").unwrap();

    assert_eq!(log.borrow().len(), 1);
    assert!(log.borrow()[0].is_bubbled());
}

#[rstest]
fn given_listeners_on_chain_when_changed_then_nearest_first_order(mut fx: Fixture) {
    let order: Rc<RefCell<Vec<NodeId>>> = Rc::default();
    for node in [fx.root, fx.sub, fx.deep, fx.group] {
        let sink = Rc::clone(&order);
        fx.tree
            .on_property_changed(node, move |_, event| {
                if let TreeEvent::PropertyChanged { sender, .. } = event {
                    sink.borrow_mut().push(*sender);
                }
            })
            .unwrap();
    }

    fx.tree.set_hostname(fx.deep, "10.0.0.7").unwrap();

    assert_eq!(*order.borrow(), vec![fx.deep, fx.sub, fx.group, fx.root]);
}

#[rstest]
fn given_sibling_branch_when_changed_then_unrelated_container_silent(mut fx: Fixture) {
    let (sub_log, _) = record_properties(&mut fx.tree, fx.sub);

    fx.tree.set_port(fx.db, 2222).unwrap();
    fx.tree.set_port(fx.web, 8080).unwrap();

    assert!(sub_log.borrow().is_empty());
}

#[rstest]
fn given_same_value_when_set_then_event_still_raised(mut fx: Fixture) {
    let (log, _) = record_properties(&mut fx.tree, fx.root);

    fx.tree.set_name(fx.web, "web").unwrap();
    fx.tree.set_protocol(fx.web, Protocol::default()).unwrap();

    let properties: Vec<Property> = log
        .borrow()
        .iter()
        .filter_map(|e| match e {
            TreeEvent::PropertyChanged { source, property, .. } if *source == fx.web => Some(*property),
            _ => None,
        })
        .collect();
    assert_eq!(properties, vec![Property::Name, Property::Protocol]);
}

#[rstest]
fn given_every_setter_when_changed_then_property_named(mut fx: Fixture) {
    let (log, _) = record_properties(&mut fx.tree, fx.root);

    fx.tree.set_description(fx.web, "frontend").unwrap();
    fx.tree.set_hostname(fx.web, "web.local").unwrap();
    fx.tree.set_port(fx.web, 22).unwrap();
    fx.tree.set_protocol(fx.web, Protocol::Ssh).unwrap();
    fx.tree.set_username(fx.web, "deploy").unwrap();
    fx.tree.set_expanded(fx.group, true).unwrap();

    let properties: Vec<Property> = log
        .borrow()
        .iter()
        .filter_map(|e| match e {
            TreeEvent::PropertyChanged { property, .. } => Some(*property),
            _ => None,
        })
        .collect();
    assert_eq!(
        properties,
        vec![
            Property::Description,
            Property::Hostname,
            Property::Port,
            Property::Protocol,
            Property::Username,
            Property::Expanded,
        ]
    );
    let web = fx.tree.node(fx.web).unwrap().properties();
    assert_eq!(web.username, "deploy");
    assert_eq!(web.protocol, Protocol::Ssh);
}

// ============================================================
// Subscription rewiring
// ============================================================

#[rstest]
fn given_removed_subtree_when_changed_then_former_ancestors_silent(mut fx: Fixture) {
    let (root_log, _) = record_properties(&mut fx.tree, fx.root);
    let (group_log, _) = record_properties(&mut fx.tree, fx.group);
    let (sub_log, _) = record_properties(&mut fx.tree, fx.sub);

    fx.tree.remove_child(fx.group, fx.sub).unwrap();
    fx.tree.set_name(fx.deep, "renamed").unwrap();

    assert!(root_log.borrow().is_empty());
    assert!(group_log.borrow().is_empty());
    // forwarding inside the detached subtree still works
    assert_eq!(sub_log.borrow().len(), 1);
    fx.tree.verify().unwrap();
}

#[rstest]
fn given_subtree_moved_when_changed_then_new_ancestors_notified_once(mut fx: Fixture) {
    let (root_log, _) = record_properties(&mut fx.tree, fx.root);
    let (group_log, _) = record_properties(&mut fx.tree, fx.group);

    fx.tree.remove_child(fx.group, fx.sub).unwrap();
    fx.tree.add_child(fx.root, fx.sub).unwrap();
    fx.tree.remove_child(fx.root, fx.sub).unwrap();
    fx.tree.add_child(fx.root, fx.sub).unwrap();
    fx.tree.set_name(fx.deep, "renamed").unwrap();

    assert_eq!(root_log.borrow().len(), 1);
    assert!(group_log.borrow().is_empty());
    fx.tree.verify().unwrap();
}

#[rstest]
fn given_child_added_to_attached_container_when_changed_then_root_notified(mut fx: Fixture) {
    let (root_log, _) = record_properties(&mut fx.tree, fx.root);
    let late = fx.tree.create_connection("late");

    fx.tree.add_child(fx.sub, late).unwrap();
    fx.tree.set_name(late, "later").unwrap();

    assert_eq!(root_log.borrow().len(), 1);
}

#[rstest]
fn given_subtree_built_offline_when_attached_then_whole_subtree_forwards(mut fx: Fixture) {
    let (root_log, _) = record_properties(&mut fx.tree, fx.root);
    let branch = fx.tree.create_container("branch");
    let twig = fx.tree.create_container("twig");
    let leaf = fx.tree.create_connection("leaf");
    fx.tree.add_child(branch, twig).unwrap();
    fx.tree.add_child(twig, leaf).unwrap();

    fx.tree.add_child(fx.root, branch).unwrap();
    fx.tree.set_name(leaf, "leaf2").unwrap();

    assert_eq!(root_log.borrow().len(), 1);
    fx.tree.verify().unwrap();
}

#[rstest]
fn given_unsubscribed_listener_when_changed_then_not_called(mut fx: Fixture) {
    let (log, id) = record_properties(&mut fx.tree, fx.root);

    assert!(fx.tree.unsubscribe(id));
    fx.tree.set_name(fx.db, "x").unwrap();

    assert!(log.borrow().is_empty());
    assert!(!fx.tree.unsubscribe(id));
}

#[rstest]
fn given_discarded_subtree_when_verified_then_no_leftover_links(mut fx: Fixture) {
    record_properties(&mut fx.tree, fx.deep);
    fx.tree.remove_child(fx.root, fx.group).unwrap();

    fx.tree.discard(fx.group).unwrap();

    fx.tree.verify().unwrap();
    assert_eq!(fx.tree.len(), 2);
}
