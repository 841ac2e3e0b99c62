//! End-to-end tests for building component trees

use comptree::config::{Settings, TreeSettings};
use comptree::util::testing;
use comptree::{
    ComponentTree, Counter, CounterBehavior, Direction, Group, NodeClass, NodeSpec, Port, PortSet,
    PortVec, StatKind, StatisticSet, TreeError, TreeRender,
};

// ============================================================
// Scenarios
// ============================================================

#[test]
fn given_port_set_and_inbound_vec_when_attaching_ports_then_only_outbound_is_kept() {
    testing::init_test_setup();
    let mut tree = ComponentTree::new("top").unwrap();
    let root = tree.root();
    let ports = PortSet::create(&mut tree, root, "ports", "").unwrap();
    let in_vec = PortVec::create(&mut tree, ports, "in_vec", Direction::In, "").unwrap();

    let err = Port::create(&mut tree, in_vec, "a", Direction::In, "").unwrap_err();
    assert!(matches!(err, TreeError::DirectionMismatch { .. }));

    let b = Port::create(&mut tree, in_vec, "b", Direction::Out, "").unwrap();
    let view = tree.port_vec(in_vec).unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view.get(0).unwrap(), b);
}

#[test]
fn given_statistic_set_with_counter_when_looking_up_then_kind_filter_applies() {
    testing::init_test_setup();
    let mut tree = ComponentTree::new("top").unwrap();
    let root = tree.root();
    let stats = StatisticSet::create(&mut tree, root).unwrap();
    let ctr0 = Counter::create(&mut tree, stats, "ctr0", "", CounterBehavior::Accumulating).unwrap();

    let view = tree.statistic_set(stats).unwrap();
    assert_eq!(view.lookup("ctr0", StatKind::Counter).unwrap(), ctr0);
    assert!(matches!(
        view.lookup("ctr0", StatKind::StatisticDef),
        Err(TreeError::NotFound { .. })
    ));
}

// ============================================================
// Naming Tests
// ============================================================

#[test]
fn given_existing_sibling_when_adding_same_name_then_duplicate_child() {
    let mut tree = ComponentTree::new("top").unwrap();
    let root = tree.root();
    let ports = PortSet::create(&mut tree, root, "ports", "").unwrap();
    Port::create(&mut tree, ports, "clk", Direction::In, "").unwrap();

    let err = Port::create(&mut tree, ports, "clk", Direction::Out, "").unwrap_err();
    assert_eq!(
        err,
        TreeError::DuplicateChild {
            location: "top.ports".to_string(),
            name: "clk".to_string(),
        }
    );
    // Same name under a different parent is fine
    let vec = PortVec::create(&mut tree, ports, "vec", Direction::In, "").unwrap();
    assert!(Port::create(&mut tree, vec, "clk", Direction::Out, "").is_ok());
}

#[test]
fn given_invalid_names_when_creating_nodes_then_invalid_name() {
    assert!(matches!(
        ComponentTree::new(""),
        Err(TreeError::InvalidName { .. })
    ));

    let mut tree = ComponentTree::new("top").unwrap();
    let root = tree.root();
    assert!(matches!(
        PortSet::create(&mut tree, root, "a.b", ""),
        Err(TreeError::InvalidName { .. })
    ));
    assert!(matches!(
        tree.add_child(root, NodeSpec::component("")),
        Err(TreeError::InvalidName { .. })
    ));
    assert_eq!(tree.node_count(), 1);
}

#[test]
fn given_group_and_description_when_adding_node_then_both_are_kept() {
    let mut tree = ComponentTree::new("top").unwrap();
    let root = tree.root();
    let core = tree
        .add_child(
            root,
            NodeSpec::component("core1")
                .with_group(Group::new("core", 1))
                .with_description("Second core"),
        )
        .unwrap();

    let node = tree.node(core).unwrap();
    assert_eq!(node.name(), "core1");
    assert_eq!(node.group(), Some(&Group::new("core", 1)));
    assert_eq!(node.description(), "Second core");
    assert_eq!(node.class(), NodeClass::Component);
    assert_eq!(tree.get_child(root, "core1").unwrap(), core);
}

// ============================================================
// Handle Tests
// ============================================================

#[test]
fn given_handle_from_other_tree_when_resolving_then_unknown_node() {
    let mut big = ComponentTree::new("big").unwrap();
    let mut last = big.root();
    for i in 0..4 {
        last = big
            .add_child(last, NodeSpec::component(format!("n{i}")))
            .unwrap();
    }

    let mut small = ComponentTree::new("small").unwrap();
    assert!(!small.contains(last));
    assert_eq!(small.node(last).unwrap_err(), TreeError::UnknownNode(last));

    // Same arena slot as small's own root, still foreign
    let foreign_root = big.root();
    assert!(!small.contains(foreign_root));
    assert_eq!(
        small.location(foreign_root).unwrap_err(),
        TreeError::UnknownNode(foreign_root)
    );
    assert_eq!(
        small
            .add_child(foreign_root, NodeSpec::component("intruder"))
            .unwrap_err(),
        TreeError::UnknownNode(foreign_root)
    );
    assert!(small.finalize(foreign_root).is_err());
    assert!(!small.is_finalized(small.root()).unwrap());
    assert_eq!(small.node_count(), 1);
}

// ============================================================
// Depth Tests
// ============================================================

#[test]
fn given_max_depth_when_nesting_deeper_then_depth_exceeded() {
    let settings = Settings {
        tree: TreeSettings { max_depth: 3 },
        ..Settings::default()
    };
    let mut tree = ComponentTree::with_settings("top", settings).unwrap();
    let root = tree.root();
    let a = tree.add_child(root, NodeSpec::component("a")).unwrap();
    let b = tree.add_child(a, NodeSpec::component("b")).unwrap();

    let err = tree.add_child(b, NodeSpec::component("c")).unwrap_err();
    assert_eq!(
        err,
        TreeError::DepthExceeded {
            location: "top.a.b".to_string(),
            max: 3,
        }
    );
    assert_eq!(tree.depth(), 3);
}

// ============================================================
// Rendering Tests
// ============================================================

#[test]
fn given_mixed_tree_when_rendering_then_shows_every_node_once() {
    let mut tree = ComponentTree::new("top").unwrap();
    let root = tree.root();
    let ports = PortSet::create(&mut tree, root, "ports", "").unwrap();
    let vec = PortVec::create(&mut tree, ports, "out_vec", Direction::Out, "").unwrap();
    Port::create(&mut tree, vec, "p0", Direction::In, "").unwrap();
    let stats = StatisticSet::create(&mut tree, root).unwrap();
    Counter::create(&mut tree, stats, "ctr0", "", CounterBehavior::ReadOnly).unwrap();
    tree.finalize_subtree(root).unwrap();

    let rendered = tree.to_tree_string().to_string();
    assert_eq!(rendered.lines().count(), tree.node_count());
    for label in [
        "top [component]*",
        "ports [port set]*",
        "out_vec [port vec]*",
        "p0 [port]*",
        "stats [statistic set]*",
        "ctr0 [counter]*",
    ] {
        assert!(rendered.contains(label), "missing {label} in\n{rendered}");
    }
}
