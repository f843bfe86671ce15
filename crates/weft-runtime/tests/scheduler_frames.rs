//! Frame-level behaviour of the scheduler against a miniature tree host.

use std::collections::BTreeMap;

use proptest::prelude::*;
use weft_core::ElementId;
use weft_runtime::{Duration, FrameHost, Instant, Scheduler, TaskOutcome};

fn id(n: u64) -> ElementId {
    ElementId::new(n).expect("non-zero")
}

/// A tree of plain nodes: every node can hold children; node 1 is the root.
#[derive(Default)]
struct MiniTree {
    scheduler: Scheduler<MiniTree>,
    parent: BTreeMap<ElementId, Option<ElementId>>,
    children: BTreeMap<ElementId, Vec<ElementId>>,
    laid_out: Vec<ElementId>,
    notified: Vec<ElementId>,
    rendered: Vec<ElementId>,
    fired: Vec<&'static str>,
    reenter_on_notify: Option<ElementId>,
}

impl MiniTree {
    fn with_nodes(edges: &[(u64, u64)]) -> Self {
        let mut tree = MiniTree::default();
        tree.parent.insert(id(1), None);
        tree.children.insert(id(1), Vec::new());
        for &(parent, child) in edges {
            tree.parent.insert(id(child), Some(id(parent)));
            tree.children.entry(id(child)).or_default();
            tree.children.entry(id(parent)).or_default().push(id(child));
        }
        tree
    }

    fn update(&mut self, now: Instant) -> weft_runtime::FrameReport {
        Scheduler::run_frame(self, now)
    }
}

impl FrameHost for MiniTree {
    fn scheduler(&mut self) -> &mut Scheduler<Self> {
        &mut self.scheduler
    }

    fn dispose_element(&mut self, element: ElementId) {
        if let Some(Some(parent)) = self.parent.get(&element).copied()
            && let Some(siblings) = self.children.get_mut(&parent)
        {
            siblings.retain(|&c| c != element);
        }
        for child in self.children.get(&element).cloned().unwrap_or_default() {
            self.parent.insert(child, None);
            self.scheduler.mark_for_disposal(child);
        }
    }

    fn free_element(&mut self, element: ElementId) {
        self.parent.remove(&element);
        self.children.remove(&element);
    }

    fn update_children_layout(&mut self, panel: ElementId) {
        assert!(self.parent.contains_key(&panel), "layout of freed {panel}");
        self.laid_out.push(panel);
        for child in self.children.get(&panel).cloned().unwrap_or_default() {
            self.scheduler.notify_layout_changed(child);
        }
    }

    fn layout_changed(&mut self, element: ElementId) {
        assert!(self.parent.contains_key(&element), "notify of freed {element}");
        self.notified.push(element);
        if self.reenter_on_notify == Some(element) {
            Scheduler::run_layout_pass(self);
        }
        for child in self.children.get(&element).cloned().unwrap_or_default() {
            self.scheduler.notify_layout_changed(child);
        }
    }

    fn render_root(&self, element: ElementId) -> Option<ElementId> {
        let mut current = element;
        loop {
            match self.parent.get(&current)? {
                Some(parent) => current = *parent,
                None => return Some(current),
            }
        }
    }

    fn render_window(&mut self, window: ElementId) {
        self.rendered.push(window);
    }
}

#[test]
fn cancelled_task_never_fires() {
    let mut tree = MiniTree::with_nodes(&[]);
    let t0 = Instant::now();
    let token = tree
        .scheduler
        .schedule_task(t0 + Duration::from_millis(100), |host: &mut MiniTree, _| {
            host.fired.push("late");
            TaskOutcome::Done
        });
    tree.update(t0 + Duration::from_millis(50));
    assert!(tree.scheduler.is_scheduled(token));

    assert!(tree.scheduler.cancel_task(token));
    assert!(!tree.scheduler.is_scheduled(token));
    assert_eq!(tree.scheduler.pending_tasks(), 0);

    tree.update(t0 + Duration::from_millis(200));
    assert!(tree.fired.is_empty());
    assert!(!tree.scheduler.cancel_task(token));
}

#[test]
fn due_tasks_run_in_time_order() {
    let mut tree = MiniTree::with_nodes(&[]);
    let t0 = Instant::now();
    tree.scheduler
        .schedule_task(t0 + Duration::from_millis(20), |h: &mut MiniTree, _| {
            h.fired.push("second");
            TaskOutcome::Done
        });
    tree.scheduler
        .schedule_task(t0 + Duration::from_millis(10), |h: &mut MiniTree, _| {
            h.fired.push("first");
            TaskOutcome::Done
        });
    tree.scheduler
        .schedule_task(t0 + Duration::from_millis(90), |h: &mut MiniTree, _| {
            h.fired.push("not yet");
            TaskOutcome::Done
        });
    let report = tree.update(t0 + Duration::from_millis(30));
    assert_eq!(report.tasks_run, 2);
    assert_eq!(tree.fired, vec!["first", "second"]);
    assert_eq!(
        tree.scheduler.next_wakeup(t0 + Duration::from_millis(30)),
        Some(t0 + Duration::from_millis(90))
    );
}

#[test]
fn posted_callbacks_run_once_next_frame() {
    let mut tree = MiniTree::with_nodes(&[]);
    tree.scheduler.post(|h: &mut MiniTree| h.fired.push("posted"));
    let now = Instant::now();
    assert_eq!(tree.update(now).posted_run, 1);
    assert_eq!(tree.update(now).posted_run, 0);
    assert_eq!(tree.fired, vec!["posted"]);
}

#[test]
fn layout_notifications_propagate_breadth_first() {
    // 1 -> {2, 3}, 2 -> {4}, 3 -> {5}
    let mut tree = MiniTree::with_nodes(&[(1, 2), (1, 3), (2, 4), (3, 5)]);
    tree.scheduler.invalidate_children_layout(id(1));
    let report = tree.update(Instant::now());
    assert_eq!(tree.laid_out, vec![id(1)]);
    assert_eq!(tree.notified, vec![id(2), id(3), id(4), id(5)]);
    assert_eq!(report.notifications, 4);
    assert!(!tree.scheduler.is_layouting());
}

#[test]
#[should_panic(expected = "layout pass re-entered")]
fn reentrant_layout_pass_is_rejected() {
    let mut tree = MiniTree::with_nodes(&[(1, 2)]);
    tree.reenter_on_notify = Some(id(2));
    tree.scheduler.invalidate_children_layout(id(1));
    tree.update(Instant::now());
}

#[test]
fn wave_limit_defers_remaining_layout() {
    struct Chain {
        scheduler: Scheduler<Chain>,
        depth: u64,
    }
    impl FrameHost for Chain {
        fn scheduler(&mut self) -> &mut Scheduler<Self> {
            &mut self.scheduler
        }
        fn dispose_element(&mut self, _: ElementId) {}
        fn free_element(&mut self, _: ElementId) {}
        fn update_children_layout(&mut self, panel: ElementId) {
            if panel.get() < self.depth {
                let next = id(panel.get() + 1);
                self.scheduler.invalidate_children_layout(next);
            }
        }
        fn layout_changed(&mut self, _: ElementId) {}
        fn render_root(&self, element: ElementId) -> Option<ElementId> {
            Some(element)
        }
        fn render_window(&mut self, _: ElementId) {}
    }

    let mut chain = Chain {
        scheduler: Scheduler::new(Duration::from_millis(16), 3),
        depth: 10,
    };
    chain.scheduler.invalidate_children_layout(id(1));
    let first = Scheduler::run_frame(&mut chain, Instant::now());
    assert_eq!(first.panels_laid_out, 3);
    assert!(first.layout_deferred);
    assert!(chain.scheduler.is_children_layout_pending(id(4)));
    assert!(!chain.scheduler.is_layouting());

    let second = Scheduler::run_frame(&mut chain, Instant::now());
    assert_eq!(second.panels_laid_out, 3);
}

#[test]
fn dirty_descendants_render_their_root_once() {
    let mut tree = MiniTree::with_nodes(&[(1, 2), (2, 3), (1, 4)]);
    for n in [2, 3, 4, 1] {
        tree.scheduler.invalidate_visual(id(n));
    }
    let report = tree.update(Instant::now());
    assert_eq!(report.windows_rendered, 1);
    assert_eq!(tree.rendered, vec![id(1)]);
}

#[test]
fn disposed_subtree_leaves_no_queue_entries() {
    let mut tree = MiniTree::with_nodes(&[(1, 2), (2, 3), (3, 4)]);
    let now = Instant::now();
    tree.scheduler.invalidate_children_layout(id(3));
    tree.scheduler.notify_layout_changed(id(4));
    tree.scheduler.invalidate_visual(id(4));
    tree.scheduler
        .schedule_element_task(id(4), now, |h: &mut MiniTree, _| {
            h.fired.push("orphan");
            TaskOutcome::Done
        });
    tree.scheduler.mark_for_disposal(id(2));

    let report = tree.update(now);
    assert_eq!(report.disposed, 3);
    for n in 2..=4 {
        assert!(!tree.scheduler.references(id(n)), "E{n} still queued");
        assert!(!tree.parent.contains_key(&id(n)));
    }
    assert!(tree.fired.is_empty());
    assert!(tree.laid_out.is_empty());
    assert_eq!(tree.children[&id(1)], Vec::<ElementId>::new());

    // Subsequent frames never touch the freed elements.
    tree.update(now + Duration::from_millis(100));
    assert!(tree.notified.is_empty());
}

#[test]
fn element_marked_by_task_is_skipped_until_freed() {
    let mut tree = MiniTree::with_nodes(&[(1, 2)]);
    let now = Instant::now();
    tree.scheduler.invalidate_children_layout(id(2));
    tree.scheduler.schedule_task(now, |h: &mut MiniTree, _| {
        h.scheduler.mark_for_disposal(id(2));
        TaskOutcome::Done
    });
    let first = tree.update(now);
    assert_eq!(first.panels_laid_out, 0);
    assert!(tree.scheduler.is_marked_for_disposal(id(2)));

    let second = tree.update(now);
    assert_eq!(second.disposed, 1);
    assert!(!tree.scheduler.references(id(2)));
}

proptest! {
    #[test]
    fn disposal_purges_every_queue(
        marks in proptest::collection::vec((2u64..12, 0u8..4), 1..40),
        doomed in proptest::collection::btree_set(2u64..12, 1..5),
    ) {
        let edges: Vec<(u64, u64)> = (2..12).map(|n| (n / 2, n)).collect();
        let mut tree = MiniTree::with_nodes(&edges);
        let now = Instant::now();
        for &(n, queue) in &marks {
            match queue {
                0 => tree.scheduler.invalidate_children_layout(id(n)),
                1 => tree.scheduler.notify_layout_changed(id(n)),
                2 => tree.scheduler.invalidate_visual(id(n)),
                _ => {
                    tree.scheduler
                        .schedule_element_task(id(n), now + Duration::from_secs(1), |_, _| {
                            TaskOutcome::Done
                        });
                }
            }
        }
        for &n in &doomed {
            tree.scheduler.mark_for_disposal(id(n));
        }
        tree.update(now);
        for n in 2u64..12 {
            if !tree.parent.contains_key(&id(n)) {
                prop_assert!(!tree.scheduler.references(id(n)));
            }
        }
        for &n in &doomed {
            prop_assert!(!tree.parent.contains_key(&id(n)));
        }
    }
}
