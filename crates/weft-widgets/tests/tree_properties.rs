//! Structural properties of the element tree under random edits.

mod common;

use proptest::prelude::*;
use weft_core::{ElementId, Orientation, Rect, Size};
use weft_layout::{AxisParams, LayoutParams};
use weft_widgets::{ElementKind, Ui};

use common::Session;

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    InsertBefore(usize, usize),
    Remove(usize),
    MoveBefore(usize, Option<usize>),
    SetZ(usize, i32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..8usize).prop_map(Op::Add),
        (0..8usize, 0..8usize).prop_map(|(a, b)| Op::InsertBefore(a, b)),
        (0..8usize).prop_map(Op::Remove),
        (0..8usize, proptest::option::of(0..8usize)).prop_map(|(a, b)| Op::MoveBefore(a, b)),
        (0..8usize, -3..3i32).prop_map(|(a, z)| Op::SetZ(a, z)),
    ]
}

fn assert_consistent(ui: &Ui, panel: ElementId) {
    let mut children = ui.children(panel).to_vec();
    let mut z = ui.z_order(panel).to_vec();
    children.sort();
    z.sort();
    assert_eq!(children, z, "child order and z order hold different elements");
    for &child in ui.children(panel) {
        assert_eq!(ui.parent(child), Some(panel));
    }
    let zs: Vec<i32> = ui.z_order(panel).iter().map(|&e| ui.zindex(e).unwrap_or_default()).collect();
    assert!(zs.windows(2).all(|w| w[0] <= w[1]), "z order is not sorted: {zs:?}");
}

proptest! {
    #[test]
    fn collections_stay_consistent(ops in proptest::collection::vec(op(), 1..60)) {
        let mut session = Session::new();
        let ui = &mut session.ui;
        let panel = ui.create_panel();
        let pool: Vec<ElementId> = (0..8).map(|_| ui.create_leaf(Size::ZERO)).collect();
        for op in ops {
            // Failures are rejected preconditions; the collection must still
            // be consistent afterwards.
            let _ = match op {
                Op::Add(a) => ui.add_child(panel, pool[a]),
                Op::InsertBefore(a, b) => ui.insert_child_before(panel, pool[a], Some(pool[b])),
                Op::Remove(a) => ui.remove_child(panel, pool[a]),
                Op::MoveBefore(a, b) => ui.move_child_before(panel, pool[a], b.map(|b| pool[b])),
                Op::SetZ(a, z) => ui.set_zindex(pool[a], z),
            };
            assert_consistent(ui, panel);
            for &leaf in &pool {
                let listed = ui.children(panel).contains(&leaf);
                prop_assert_eq!(ui.parent(leaf).is_some(), listed);
            }
        }
        prop_assert!(ui.validate().is_clean());
    }

    #[test]
    fn desired_size_is_idempotent(
        sizes in proptest::collection::vec((0.0..200.0f64, 0.0..200.0f64), 1..8),
        available in (0.0..500.0f64, 0.0..500.0f64),
        horizontal in any::<bool>(),
    ) {
        let mut session = Session::new();
        let ui = &mut session.ui;
        let orientation = if horizontal { Orientation::Horizontal } else { Orientation::Vertical };
        let stack = ui.create_stack(orientation);
        for (i, (w, h)) in sizes.iter().enumerate() {
            let leaf = ui.create_leaf(Size::new(*w, *h));
            let params = match i % 3 {
                0 => LayoutParams::automatic(),
                1 => LayoutParams::fixed(20.0, 20.0),
                _ => LayoutParams {
                    horizontal: AxisParams::fill().with_margins(2.0, 2.0),
                    vertical: AxisParams::automatic(),
                },
            };
            ui.set_params(leaf, params).unwrap();
            ui.add_child(stack, leaf).unwrap();
        }
        let available = Size::new(available.0, available.1);
        let first = ui.compute_desired_size(stack, available);
        let second = ui.compute_desired_size(stack, available);
        prop_assert_eq!(first, second);
        ui.invalidate_desired_size(stack);
        prop_assert_eq!(ui.compute_desired_size(stack, available), first);
    }
}

#[test]
fn disposed_subtree_is_gone_after_one_frame() {
    let mut session = Session::new();
    let window = session.ui.create_window(Rect::new(0.0, 0.0, 200.0, 200.0));
    let panel = session.ui.create_panel();
    let inner = session.ui.create_stack(Orientation::Vertical);
    let leaf = session.ui.create_leaf(Size::new(10.0, 10.0));
    let outside = session.ui.create_leaf(Size::ZERO);
    session.ui.add_child(window, panel).unwrap();
    session.ui.add_child(panel, inner).unwrap();
    session.ui.add_child(inner, leaf).unwrap();
    session.ui.set_logical_parent(outside, Some(leaf)).unwrap();
    session.ui.set_focusable(leaf, true).unwrap();
    session.ui.set_focus(leaf).unwrap();
    session.frame();

    session.ui.invalidate_visual(leaf);
    session.ui.invalidate_layout(leaf);
    assert!(session.ui.dispose(panel));
    assert!(!session.ui.dispose(panel));
    session.frame();

    for element in [panel, inner, leaf] {
        assert!(!session.ui.exists(element), "{element} survived disposal");
    }
    assert!(session.ui.children(window).is_empty());
    assert_eq!(session.ui.logical_parent(outside), None);
    assert_eq!(session.ui.focused(), None);
    assert!(session.ui.validate().is_clean());
    // Later frames do not trip over the freed ids.
    session.frame();
    assert_eq!(session.ui.kind(window), Some(ElementKind::Window));
}
