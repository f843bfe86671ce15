//! Host pairing and activation under random tab operations.

mod common;

use proptest::prelude::*;
use weft_core::{ElementId, Rect, Visibility};
use weft_widgets::{InvariantCode, Ui, UiEvent};

use common::{Session, strip_tabs};

fn assert_host_invariant(ui: &Ui, host: ElementId) {
    let tabs = ui.tabs(host);
    assert_eq!(strip_tabs(ui, host), tabs, "buttons out of step with tabs");
    match ui.active_tab(host) {
        None => assert!(tabs.is_empty()),
        Some(active) => {
            assert!(tabs.contains(&active));
            for &tab in &tabs {
                let expected = if tab == active { Visibility::FULL } else { Visibility::NONE };
                assert_eq!(ui.visibility(tab), Some(expected));
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    InsertBefore(usize, usize),
    Remove(usize),
    Move(usize, Option<usize>),
    Activate(usize),
    Close(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..6usize).prop_map(Op::Add),
        1 => (0..6usize, 0..6usize).prop_map(|(a, b)| Op::InsertBefore(a, b)),
        2 => (0..6usize).prop_map(Op::Remove),
        2 => (0..6usize, proptest::option::of(0..6usize)).prop_map(|(a, b)| Op::Move(a, b)),
        2 => (0..6usize).prop_map(Op::Activate),
        1 => (0..6usize).prop_map(Op::Close),
    ]
}

proptest! {
    #[test]
    fn host_pairs_tabs_and_buttons(ops in proptest::collection::vec(op(), 1..50)) {
        let mut session = Session::new();
        let (_, host) = session.ui.create_window_with_host(Rect::new(0.0, 0.0, 400.0, 300.0));
        let pool: Vec<ElementId> = (0..6).map(|i| session.ui.create_tab(format!("t{i}"))).collect();
        for op in ops {
            let ui = &mut session.ui;
            let _ = match op {
                Op::Add(a) => ui.add_tab(host, pool[a]),
                Op::InsertBefore(a, b) => ui.insert_tab_before(host, pool[a], Some(pool[b])),
                Op::Remove(a) => ui.remove_tab(pool[a]),
                Op::Move(a, b) => ui.move_tab_before(pool[a], b.map(|b| pool[b])),
                Op::Activate(a) => ui.activate_tab(pool[a]),
                Op::Close(a) => {
                    if ui.tab_host(pool[a]).is_some() && ui.tabs(host).len() > 1 {
                        ui.close_tab(pool[a])
                    } else {
                        Ok(())
                    }
                }
            };
            assert_host_invariant(&session.ui, host);
            let report = session.ui.validate();
            prop_assert!(
                !report.codes().iter().any(|c| matches!(
                    c,
                    InvariantCode::HostCardinality | InvariantCode::HostOrder | InvariantCode::ActiveTab
                )),
                "{report:?}"
            );
        }
    }
}

#[test]
fn removing_the_active_middle_tab_activates_its_successor() {
    let mut session = Session::new();
    let (_, host, tabs) = session.window_with_tabs(Rect::new(0.0, 0.0, 400.0, 300.0), &["t1", "t2", "t3"]);
    session.ui.activate_tab(tabs[1]).unwrap();

    let events = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = events.clone();
    let _handle = session.ui.subscribe(move |e| {
        if let UiEvent::ActiveTabChanged { current, .. } = e {
            sink.borrow_mut().push(*current);
        }
    });

    session.ui.remove_tab(tabs[1]).unwrap();
    assert_eq!(session.ui.active_tab(host), Some(tabs[2]));
    assert_eq!(strip_tabs(&session.ui, host), vec![tabs[0], tabs[2]]);
    assert_eq!(*events.borrow(), vec![Some(tabs[2])]);
    assert_host_invariant(&session.ui, host);
}

#[test]
fn active_tab_restores_its_focus() {
    let mut session = Session::new();
    let (_, host, tabs) = session.window_with_tabs(Rect::new(0.0, 0.0, 400.0, 300.0), &["a", "b"]);
    let editor = session.ui.create_leaf(weft_core::Size::ZERO);
    session.ui.add_child(tabs[0], editor).unwrap();
    session.ui.set_focusable(editor, true).unwrap();
    session.ui.set_focus(editor).unwrap();

    session.ui.activate_tab(tabs[1]).unwrap();
    session.ui.clear_focus();
    session.ui.activate_tab(tabs[0]).unwrap();
    assert_eq!(session.ui.focused(), Some(editor));
    assert_eq!(session.ui.active_tab(host), Some(tabs[0]));
}

#[test]
fn clicking_a_button_activates_without_dragging() {
    let mut session = Session::new();
    let (window, host, tabs) = session.window_with_tabs(Rect::new(0.0, 0.0, 400.0, 300.0), &["a", "b"]);
    let button = session.ui.tab_button(tabs[1]).unwrap();
    let at = session.client_centre(button);
    session.press(window, at);
    assert_eq!(session.ui.active_tab(host), Some(tabs[1]));
    // Jitter below the drag threshold.
    session.move_to(window, at.offset(1.0, 1.0));
    session.release(window, at.offset(1.0, 1.0));
    assert!(!session.ui.drag_state().is_active());
    assert_eq!(session.ui.mouse_capture(), None);
    assert_eq!(session.ui.tabs(host), tabs);
}
