//! Tab drag and drop driven through window events.

mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use tracing_subscriber::layer::SubscriberExt;
use weft_core::{ElementId, KeyCode, KeyEvent, Modifiers, Point, Rect, WindowEvent};
use weft_widgets::{DragPhase, DragState, DropDestination, ElementKind, UiEvent, WindowStyle};

use common::{Session, strip_tabs};

fn record_events(session: &mut Session) -> Rc<RefCell<Vec<UiEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    let _handle = session.ui.subscribe(move |e| sink.borrow_mut().push(e.clone()));
    events
}

fn phases(events: &[UiEvent]) -> Vec<DragPhase> {
    events
        .iter()
        .filter_map(|e| match e {
            UiEvent::DragStateChanged { phase } => Some(*phase),
            _ => None,
        })
        .collect()
}

fn ghost(session: &Session) -> ElementId {
    match *session.ui.drag_state() {
        DragState::Free { ghost, .. } => ghost,
        other => panic!("expected a free drag, got {other:?}"),
    }
}

#[test]
fn dropping_the_only_tab_in_free_space_moves_it_to_a_new_window() {
    let mut session = Session::new();
    let (window, host, tabs) = session.window_with_tabs(Rect::new(100.0, 100.0, 400.0, 300.0), &["only"]);
    let events = record_events(&mut session);
    let button = session.ui.tab_button(tabs[0]).unwrap();
    let at = session.client_centre(button);

    let button_origin = session.ui.screen_rect(button).unwrap().origin();
    let grab = (at + Point::new(100.0, 100.0)) - button_origin;

    session.press(window, at);
    session.move_to(window, Point::new(800.0, 800.0));
    let ghost = ghost(&session);
    assert_eq!(session.ui.window_style(ghost), Some(WindowStyle::Ghost));
    assert_eq!(session.ui.screen_bounds(ghost).unwrap().origin(), Point::new(900.0, 900.0) - grab);
    session.release(window, Point::new(800.0, 800.0));

    assert_eq!(session.ui.drag_state(), &DragState::Idle);
    assert_eq!(session.ui.mouse_capture(), None);
    assert!(!session.ui.is_window_open(ghost));
    let fresh = session.ui.windows()[0];
    assert_ne!(fresh, window);
    assert_eq!(session.ui.window_of(tabs[0]), Some(fresh));
    let new_host = session.ui.tab_host(tabs[0]).unwrap();
    assert_ne!(new_host, host);
    assert_eq!(session.ui.kind(new_host), Some(ElementKind::Host));

    // The emptied host is collected by the next frame and takes its window
    // with it.
    session.frame();
    assert!(!session.ui.is_window_open(window));
    assert_eq!(session.ui.windows(), &[fresh]);
    assert!(events.borrow().contains(&UiEvent::WindowClosed { window }));
    session.frame();
    assert!(!session.ui.exists(window));
    assert!(!session.ui.exists(host));
    assert_eq!(phases(&events.borrow()), vec![DragPhase::InHost, DragPhase::Free, DragPhase::Idle]);
    assert!(session.ui.validate().is_clean());
}

#[test]
fn dropping_on_another_hosts_contents_combines() {
    let mut session = Session::new();
    let (left, left_host, left_tabs) = session.window_with_tabs(Rect::new(0.0, 0.0, 400.0, 300.0), &["a1", "a2"]);
    let (_, right_host, right_tabs) = session.window_with_tabs(Rect::new(500.0, 0.0, 400.0, 300.0), &["b1"]);
    let button = session.ui.tab_button(left_tabs[1]).unwrap();
    let at = session.client_centre(button);

    session.press(left, at);
    // Client coordinates of the left window; the point lies over the
    // middle of the right window's contents.
    session.move_to(left, Point::new(700.0, 160.0));
    assert_eq!(session.ui.drag_destination(), Some((right_host, DropDestination::Combine)));
    assert!(session.ui.destination_selector().is_some());
    session.release(left, Point::new(700.0, 160.0));

    assert_eq!(session.ui.tabs(right_host), vec![right_tabs[0], left_tabs[1]]);
    assert_eq!(session.ui.active_tab(right_host), Some(left_tabs[1]));
    assert_eq!(strip_tabs(&session.ui, right_host), session.ui.tabs(right_host));
    assert_eq!(session.ui.tabs(left_host), vec![left_tabs[0]]);
    assert_eq!(session.ui.destination_selector(), None);
    session.frame();
    assert!(session.ui.is_window_open(left));
    assert!(session.ui.validate().is_clean());
}

#[test]
fn dropping_on_an_edge_splits_the_host() {
    let mut session = Session::new();
    let (window, host, tabs) = session.window_with_tabs(Rect::new(0.0, 0.0, 400.0, 300.0), &["a", "b"]);
    let at = session.client_centre(session.ui.tab_button(tabs[1]).unwrap());

    session.press(window, at);
    session.move_to(window, Point::new(200.0, 290.0));
    assert_eq!(session.ui.drag_destination(), Some((host, DropDestination::SplitBottom)));
    session.release(window, Point::new(200.0, 290.0));
    session.frame();

    let split = session.ui.parent(host).unwrap();
    assert_eq!(session.ui.kind(split), Some(ElementKind::Split));
    assert_eq!(session.ui.parent(split), Some(window));
    let [first, second] = session.ui.children(split) else {
        panic!("split should hold two hosts");
    };
    assert_eq!(*first, host);
    assert_eq!(session.ui.tabs(*second), vec![tabs[1]]);
    assert!(session.ui.layout_rect(*second).unwrap().top() > session.ui.layout_rect(host).unwrap().top());
}

#[test]
fn losing_capture_mid_drag_parks_the_tab_in_a_window() {
    let mut session = Session::new();
    let (window, _, tabs) = session.window_with_tabs(Rect::new(0.0, 0.0, 400.0, 300.0), &["a", "b"]);
    let at = session.client_centre(session.ui.tab_button(tabs[1]).unwrap());
    session.press(window, at);
    session.move_to(window, Point::new(1000.0, 40.0));
    let ghost = ghost(&session);

    session.ui.dispatch_event(ghost, WindowEvent::CaptureLost).unwrap();
    assert_eq!(session.ui.drag_state(), &DragState::Idle);
    assert_eq!(session.ui.mouse_capture(), None);
    assert!(!session.ui.is_window_open(ghost));
    let parked = session.ui.window_of(tabs[1]).unwrap();
    assert_ne!(parked, window);
    assert!(session.ui.windows().contains(&parked));
    session.frame();
    assert!(session.ui.validate().is_clean());
}

#[test]
fn escape_ends_a_reorder_in_place() {
    let mut session = Session::new();
    let (window, host, tabs) = session.window_with_tabs(Rect::new(0.0, 0.0, 400.0, 300.0), &["a", "b"]);
    let at = session.client_centre(session.ui.tab_button(tabs[0]).unwrap());
    session.press(window, at);
    session.move_to(window, at.offset(10.0, 0.0));
    assert_eq!(session.ui.drag_state().phase(), DragPhase::InHost);

    let escape = KeyEvent {
        code: KeyCode::Escape,
        modifiers: Modifiers::NONE,
    };
    session.ui.dispatch_event(window, WindowEvent::KeyDown(escape)).unwrap();
    assert_eq!(session.ui.drag_state(), &DragState::Idle);
    assert_eq!(session.ui.mouse_capture(), None);
    assert_eq!(session.ui.tabs(host).len(), 2);
}

#[test]
fn disposing_the_dragged_tab_ends_the_drag() {
    let mut session = Session::new();
    let (window, _, tabs) = session.window_with_tabs(Rect::new(0.0, 0.0, 400.0, 300.0), &["a", "b"]);
    let at = session.client_centre(session.ui.tab_button(tabs[1]).unwrap());
    session.press(window, at);
    session.move_to(window, Point::new(1000.0, 40.0));
    let ghost = ghost(&session);

    session.ui.dispose(tabs[1]);
    session.frame();
    assert_eq!(session.ui.drag_state(), &DragState::Idle);
    assert!(!session.ui.is_window_open(ghost));
    session.frame();
    assert!(!session.ui.exists(tabs[1]));
    assert!(!session.ui.exists(ghost));
    assert!(session.ui.validate().is_clean());
}

#[derive(Default)]
struct MessageVisitor(Option<String>);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

struct TabLog(Arc<Mutex<Vec<String>>>);

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for TabLog {
    fn on_event(&self, event: &tracing::Event<'_>, _: tracing_subscriber::layer::Context<'_, S>) {
        if event.metadata().target() != "weft.tabs" {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if let Some(message) = visitor.0 {
            self.0.lock().unwrap().push(message);
        }
    }
}

#[test]
fn drag_transitions_are_logged() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(TabLog(log.clone()));
    tracing::subscriber::with_default(subscriber, || {
        let mut session = Session::new();
        let (window, _, tabs) = session.window_with_tabs(Rect::new(0.0, 0.0, 400.0, 300.0), &["a", "b"]);
        let at = session.client_centre(session.ui.tab_button(tabs[1]).unwrap());
        session.press(window, at);
        session.move_to(window, Point::new(1000.0, 40.0));
        session.release(window, Point::new(1000.0, 40.0));
    });
    let log = log.lock().unwrap();
    let transitions = log.iter().filter(|m| m.as_str() == "drag state changed").count();
    assert_eq!(transitions, 3, "{log:?}");
    assert!(log.iter().any(|m| m == "tab floating"));
    assert!(log.iter().any(|m| m == "tab dropped"));
}
