#![forbid(unsafe_code)]

//! Per-frame work queues for the element tree.
//!
//! The [`Scheduler`] owns every piece of deferred work the UI tree produces:
//! elements waiting to be disposed, timed tasks, panels whose children need a
//! new layout, elements waiting for their post-layout notification and
//! elements whose visuals are stale. It holds only [`ElementId`]s; the tree
//! itself lives in the host that embeds the scheduler and implements
//! [`FrameHost`].
//!
//! # Frame order
//!
//! [`Scheduler::run_frame`] processes one frame in a fixed order:
//!
//! 1. **Dispose** in waves. Each wave is torn down first (teardown may mark
//!    more elements), then every element of the wave is purged from all other
//!    queues and freed.
//! 2. **Tasks**: one-shot posted callbacks, then every timed task that was due
//!    when the pass started.
//! 3. **Layout**: waves of children-layout requests, each followed by a
//!    breadth-first drain of post-layout notifications. The pass is
//!    non-reentrant.
//! 4. **Render**, rate-limited by the minimum render interval. Dirty elements
//!    are coalesced to their render roots so every window renders once.
//!
//! Elements marked for disposal after the dispose pass (by a task, say) are
//! skipped by layout and render until the next frame frees them.
//!
//! # Invariants
//!
//! 1. At most one layout pass runs at a time; re-entry panics.
//! 2. A freed element is absent from every queue.
//! 3. Cancelling a task never runs its callback, and cancelling an empty or
//!    already finished token is a no-op.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::num::NonZeroU64;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, debug_span, trace, warn};
use web_time::{Duration, Instant};

use weft_core::ElementId;

use crate::config::{DEFAULT_MAX_LAYOUT_WAVES, DEFAULT_MIN_RENDER_INTERVAL_MS, UiConfig};

/// Handle to a scheduled task.
///
/// The default token is empty; cancelling it does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TaskToken(Option<NonZeroU64>);

impl TaskToken {
    /// The empty token.
    pub const EMPTY: Self = Self(None);

    /// Whether this token never referred to a task.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0.is_none()
    }
}

/// What a timed task wants after it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Drop the task.
    Done,
    /// Run again at the given instant, keeping the same token.
    RescheduleAt(Instant),
}

type TaskFn<H> = Box<dyn FnMut(&mut H, Instant) -> TaskOutcome>;
type PostedFn<H> = Box<dyn FnOnce(&mut H)>;

struct TaskEntry<H> {
    token: NonZeroU64,
    element: Option<ElementId>,
    callback: TaskFn<H>,
}

/// Callbacks the scheduler drives while running a frame.
///
/// Implemented by the structure that owns both the element tree and the
/// scheduler.
pub trait FrameHost: Sized {
    /// The embedded scheduler.
    fn scheduler(&mut self) -> &mut Scheduler<Self>;

    /// Teardown hook of an element leaving the tree. May mark further
    /// elements (usually children) for disposal.
    fn dispose_element(&mut self, element: ElementId);

    /// Release an element's storage. Runs after it was purged from all
    /// scheduler queues.
    fn free_element(&mut self, element: ElementId);

    /// Lay out the children of `panel`, calling
    /// [`Scheduler::notify_layout_changed`] for every child whose rectangle
    /// changed.
    fn update_children_layout(&mut self, panel: ElementId);

    /// Post-layout hook of an element whose rectangle changed.
    fn layout_changed(&mut self, element: ElementId);

    /// Top-level element that renders `element`, if it is attached.
    fn render_root(&self, element: ElementId) -> Option<ElementId>;

    /// Render one top-level element.
    fn render_window(&mut self, window: ElementId);
}

/// Statistics of one [`Scheduler::run_frame`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Elements freed by the dispose pass.
    pub disposed: usize,
    /// Timed task callbacks invoked.
    pub tasks_run: usize,
    /// Posted one-shot callbacks invoked.
    pub posted_run: usize,
    /// Panels whose children were laid out.
    pub panels_laid_out: usize,
    /// Post-layout notifications delivered.
    pub notifications: usize,
    /// Render roots rendered.
    pub windows_rendered: usize,
    /// Whether dirty visuals were held back by the render interval.
    pub render_skipped: bool,
    /// Whether the layout wave limit deferred work to the next frame.
    pub layout_deferred: bool,
}

/// Deferred-work queues of one UI session.
pub struct Scheduler<H> {
    min_render_interval: Duration,
    max_layout_waves: usize,

    dispose_queue: Vec<ElementId>,
    dispose_set: FxHashSet<ElementId>,

    children_layout: Vec<ElementId>,
    children_layout_set: FxHashSet<ElementId>,
    layout_notify: Vec<ElementId>,
    layout_notify_set: FxHashSet<ElementId>,
    visual_dirty: BTreeSet<ElementId>,

    tasks: BTreeMap<(Instant, NonZeroU64), TaskEntry<H>>,
    task_due: FxHashMap<NonZeroU64, Instant>,
    next_token: u64,
    running_task: Option<(NonZeroU64, Option<ElementId>)>,
    running_cancelled: bool,

    posted: Vec<PostedFn<H>>,

    layouting: bool,
    last_render: Option<Instant>,
}

impl<H> fmt::Debug for Scheduler<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("min_render_interval", &self.min_render_interval)
            .field("max_layout_waves", &self.max_layout_waves)
            .field("dispose_queue", &self.dispose_queue)
            .field("children_layout", &self.children_layout)
            .field("layout_notify", &self.layout_notify)
            .field("visual_dirty", &self.visual_dirty)
            .field("tasks", &self.tasks.len())
            .field("posted", &self.posted.len())
            .field("layouting", &self.layouting)
            .finish()
    }
}

impl<H> Default for Scheduler<H> {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_MIN_RENDER_INTERVAL_MS),
            DEFAULT_MAX_LAYOUT_WAVES,
        )
    }
}

impl<H> Scheduler<H> {
    /// Create a scheduler with explicit limits.
    ///
    /// A `max_layout_waves` of zero is treated as one.
    #[must_use]
    pub fn new(min_render_interval: Duration, max_layout_waves: usize) -> Self {
        Self {
            min_render_interval,
            max_layout_waves: max_layout_waves.max(1),
            dispose_queue: Vec::new(),
            dispose_set: FxHashSet::default(),
            children_layout: Vec::new(),
            children_layout_set: FxHashSet::default(),
            layout_notify: Vec::new(),
            layout_notify_set: FxHashSet::default(),
            visual_dirty: BTreeSet::new(),
            tasks: BTreeMap::new(),
            task_due: FxHashMap::default(),
            next_token: 1,
            running_task: None,
            running_cancelled: false,
            posted: Vec::new(),
            layouting: false,
            last_render: None,
        }
    }

    /// Create a scheduler from a [`UiConfig`].
    #[must_use]
    pub fn from_config(config: &UiConfig) -> Self {
        Self::new(config.min_render_interval(), config.max_layout_waves)
    }

    /// Minimum time between two renders.
    #[must_use]
    pub fn min_render_interval(&self) -> Duration {
        self.min_render_interval
    }

    // ---------------------------------------------------------------------
    // Disposal
    // ---------------------------------------------------------------------

    /// Queue `element` for disposal at the start of the next frame.
    ///
    /// Returns `false` if it was already queued.
    pub fn mark_for_disposal(&mut self, element: ElementId) -> bool {
        if !self.dispose_set.insert(element) {
            return false;
        }
        trace!(target: "weft.scheduler", %element, "marked for disposal");
        self.dispose_queue.push(element);
        true
    }

    /// Whether `element` is waiting to be disposed.
    #[must_use]
    pub fn is_marked_for_disposal(&self, element: ElementId) -> bool {
        self.dispose_set.contains(&element)
    }

    // ---------------------------------------------------------------------
    // Layout and visuals
    // ---------------------------------------------------------------------

    /// Request a children layout of `panel` in the next layout pass.
    pub fn invalidate_children_layout(&mut self, panel: ElementId) {
        if self.children_layout_set.insert(panel) {
            self.children_layout.push(panel);
        }
    }

    /// Whether `panel` waits for a children layout.
    #[must_use]
    pub fn is_children_layout_pending(&self, panel: ElementId) -> bool {
        self.children_layout_set.contains(&panel)
    }

    /// Queue the post-layout hook of `element`.
    pub fn notify_layout_changed(&mut self, element: ElementId) {
        if self.layout_notify_set.insert(element) {
            self.layout_notify.push(element);
        }
    }

    /// Mark the visuals of `element` stale.
    pub fn invalidate_visual(&mut self, element: ElementId) {
        self.visual_dirty.insert(element);
    }

    /// Whether `element` waits for a render.
    #[must_use]
    pub fn is_visual_dirty(&self, element: ElementId) -> bool {
        self.visual_dirty.contains(&element)
    }

    /// Whether a layout pass is running.
    #[must_use]
    pub fn is_layouting(&self) -> bool {
        self.layouting
    }

    // ---------------------------------------------------------------------
    // Tasks
    // ---------------------------------------------------------------------

    fn allocate_token(&mut self) -> NonZeroU64 {
        let raw = self.next_token;
        self.next_token = self.next_token.saturating_add(1);
        NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN)
    }

    fn insert_task(&mut self, due: Instant, entry: TaskEntry<H>) {
        self.task_due.insert(entry.token, due);
        self.tasks.insert((due, entry.token), entry);
    }

    /// Schedule `callback` to run at `due`.
    pub fn schedule_task(
        &mut self,
        due: Instant,
        callback: impl FnMut(&mut H, Instant) -> TaskOutcome + 'static,
    ) -> TaskToken {
        self.schedule(None, due, Box::new(callback))
    }

    /// Schedule `callback` on behalf of `element`. The task is cancelled
    /// when the element is disposed.
    pub fn schedule_element_task(
        &mut self,
        element: ElementId,
        due: Instant,
        callback: impl FnMut(&mut H, Instant) -> TaskOutcome + 'static,
    ) -> TaskToken {
        self.schedule(Some(element), due, Box::new(callback))
    }

    fn schedule(&mut self, element: Option<ElementId>, due: Instant, callback: TaskFn<H>) -> TaskToken {
        let token = self.allocate_token();
        trace!(target: "weft.scheduler", token = token.get(), ?element, "task scheduled");
        self.insert_task(
            due,
            TaskEntry {
                token,
                element,
                callback,
            },
        );
        TaskToken(Some(token))
    }

    /// Cancel a task. Returns whether a pending or running task was
    /// cancelled.
    pub fn cancel_task(&mut self, token: TaskToken) -> bool {
        let Some(raw) = token.0 else {
            return false;
        };
        if let Some(due) = self.task_due.remove(&raw) {
            self.tasks.remove(&(due, raw));
            trace!(target: "weft.scheduler", token = raw.get(), "task cancelled");
            return true;
        }
        if matches!(self.running_task, Some((running, _)) if running == raw) {
            self.running_cancelled = true;
            return true;
        }
        false
    }

    /// Whether `token` refers to a task that has not fired for the last
    /// time yet.
    #[must_use]
    pub fn is_scheduled(&self, token: TaskToken) -> bool {
        token.0.is_some_and(|raw| self.task_due.contains_key(&raw))
    }

    /// Number of pending timed tasks.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Number of callbacks posted for the next tasks pass.
    #[must_use]
    pub fn posted_callbacks(&self) -> usize {
        self.posted.len()
    }

    /// Run `callback` once during the tasks pass of the next frame.
    pub fn post(&mut self, callback: impl FnOnce(&mut H) + 'static) {
        self.posted.push(Box::new(callback));
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Remove `element` from every queue except the disposal set, cancelling
    /// its tasks.
    pub fn purge(&mut self, element: ElementId) {
        if self.children_layout_set.remove(&element) {
            self.children_layout.retain(|&id| id != element);
        }
        if self.layout_notify_set.remove(&element) {
            self.layout_notify.retain(|&id| id != element);
        }
        self.visual_dirty.remove(&element);

        let owned: Vec<(Instant, NonZeroU64)> = self
            .tasks
            .iter()
            .filter(|(_, entry)| entry.element == Some(element))
            .map(|(key, _)| *key)
            .collect();
        for key in owned {
            self.tasks.remove(&key);
            self.task_due.remove(&key.1);
        }
        if matches!(self.running_task, Some((_, Some(owner))) if owner == element) {
            self.running_cancelled = true;
        }
    }

    /// Whether `element` appears in any work queue.
    #[must_use]
    pub fn references(&self, element: ElementId) -> bool {
        self.dispose_set.contains(&element)
            || self.children_layout_set.contains(&element)
            || self.layout_notify_set.contains(&element)
            || self.visual_dirty.contains(&element)
            || self.tasks.values().any(|entry| entry.element == Some(element))
    }

    /// Earliest instant at which [`Scheduler::run_frame`] has work, or
    /// `None` when idle.
    #[must_use]
    pub fn next_wakeup(&self, now: Instant) -> Option<Instant> {
        if !self.dispose_queue.is_empty()
            || !self.posted.is_empty()
            || !self.children_layout.is_empty()
            || !self.layout_notify.is_empty()
        {
            return Some(now);
        }
        let render = (!self.visual_dirty.is_empty()).then(|| match self.last_render {
            Some(last) => (last + self.min_render_interval).max(now),
            None => now,
        });
        let task = self.tasks.keys().next().map(|(due, _)| (*due).max(now));
        match (render, task) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

impl<H: FrameHost> Scheduler<H> {
    /// Run one frame: dispose, tasks, layout, render.
    pub fn run_frame(host: &mut H, now: Instant) -> FrameReport {
        let _span = debug_span!("weft.frame").entered();
        let mut report = FrameReport {
            disposed: Self::run_dispose_pass(host),
            ..FrameReport::default()
        };
        (report.posted_run, report.tasks_run) = Self::run_tasks_pass(host, now);
        let layout = Self::run_layout_pass(host);
        report.panels_laid_out = layout.panels_laid_out;
        report.notifications = layout.notifications;
        report.layout_deferred = layout.deferred;
        (report.windows_rendered, report.render_skipped) = Self::run_render_pass(host, now);
        debug!(
            target: "weft.scheduler",
            disposed = report.disposed,
            tasks_run = report.tasks_run,
            posted_run = report.posted_run,
            panels_laid_out = report.panels_laid_out,
            notifications = report.notifications,
            windows_rendered = report.windows_rendered,
            render_skipped = report.render_skipped,
            "frame complete"
        );
        report
    }

    /// Drain the disposal queue. Returns the number of freed elements.
    pub fn run_dispose_pass(host: &mut H) -> usize {
        let _span = debug_span!("weft.dispose").entered();
        let mut freed = 0;
        loop {
            let wave = std::mem::take(&mut host.scheduler().dispose_queue);
            if wave.is_empty() {
                break;
            }
            for &element in &wave {
                host.dispose_element(element);
            }
            for &element in &wave {
                let scheduler = host.scheduler();
                scheduler.purge(element);
                host.free_element(element);
                host.scheduler().dispose_set.remove(&element);
                freed += 1;
            }
        }
        freed
    }

    /// Run posted callbacks and due tasks. Returns `(posted, tasks)` counts.
    pub fn run_tasks_pass(host: &mut H, now: Instant) -> (usize, usize) {
        let _span = debug_span!("weft.tasks").entered();
        let posted = std::mem::take(&mut host.scheduler().posted);
        let posted_run = posted.len();
        for callback in posted {
            callback(host);
        }

        let due: Vec<(Instant, NonZeroU64)> = host
            .scheduler()
            .tasks
            .range(..)
            .take_while(|((at, _), _)| *at <= now)
            .map(|(key, _)| *key)
            .collect();
        let mut tasks_run = 0;
        for key in due {
            let scheduler = host.scheduler();
            let Some(mut entry) = scheduler.tasks.remove(&key) else {
                continue;
            };
            scheduler.task_due.remove(&entry.token);
            scheduler.running_task = Some((entry.token, entry.element));
            scheduler.running_cancelled = false;

            let outcome = (entry.callback)(host, now);
            tasks_run += 1;

            let scheduler = host.scheduler();
            let cancelled = std::mem::take(&mut scheduler.running_cancelled);
            scheduler.running_task = None;
            if let (TaskOutcome::RescheduleAt(next), false) = (outcome, cancelled) {
                scheduler.insert_task(next, entry);
            }
        }
        (posted_run, tasks_run)
    }

    /// Run the layout pass.
    ///
    /// # Panics
    ///
    /// Panics if called while a layout pass is already running.
    pub fn run_layout_pass(host: &mut H) -> LayoutPassReport {
        let scheduler = host.scheduler();
        assert!(!scheduler.layouting, "layout pass re-entered");
        scheduler.layouting = true;
        let _span = debug_span!("weft.layout").entered();
        let mut guard = LayoutFlag { host };
        Self::layout_waves(&mut *guard.host)
    }

    fn layout_waves(host: &mut H) -> LayoutPassReport {
        let mut report = LayoutPassReport::default();
        let max_waves = host.scheduler().max_layout_waves;
        let mut waves = 0;
        loop {
            let scheduler = host.scheduler();
            if scheduler.children_layout.is_empty() && scheduler.layout_notify.is_empty() {
                break;
            }
            if waves >= max_waves {
                warn!(
                    target: "weft.scheduler",
                    waves,
                    pending = scheduler.children_layout.len() + scheduler.layout_notify.len(),
                    "layout wave limit reached, deferring to next frame"
                );
                report.deferred = true;
                break;
            }
            waves += 1;

            let wave = std::mem::take(&mut scheduler.children_layout);
            scheduler.children_layout_set.clear();
            for panel in wave {
                if host.scheduler().is_marked_for_disposal(panel) {
                    continue;
                }
                host.update_children_layout(panel);
                report.panels_laid_out += 1;
                report.notifications += Self::drain_notifications(host);
            }
            // Notifications queued outside any children layout.
            report.notifications += Self::drain_notifications(host);
        }
        report
    }

    fn drain_notifications(host: &mut H) -> usize {
        let mut delivered = 0;
        loop {
            let scheduler = host.scheduler();
            let wave = std::mem::take(&mut scheduler.layout_notify);
            if wave.is_empty() {
                break;
            }
            scheduler.layout_notify_set.clear();
            for element in wave {
                if host.scheduler().is_marked_for_disposal(element) {
                    continue;
                }
                host.layout_changed(element);
                delivered += 1;
            }
        }
        delivered
    }

    /// Render every root with dirty visuals, unless the previous render was
    /// less than the minimum interval ago. Returns `(rendered, skipped)`.
    pub fn run_render_pass(host: &mut H, now: Instant) -> (usize, bool) {
        let scheduler = host.scheduler();
        if scheduler.visual_dirty.is_empty() {
            return (0, false);
        }
        if let Some(last) = scheduler.last_render
            && now.saturating_duration_since(last) < scheduler.min_render_interval
        {
            trace!(target: "weft.scheduler", "render held back by interval");
            return (0, true);
        }
        let _span = debug_span!("weft.render").entered();
        let dirty = std::mem::take(&mut scheduler.visual_dirty);
        let mut roots = BTreeSet::new();
        for element in dirty {
            if host.scheduler().is_marked_for_disposal(element) {
                continue;
            }
            if let Some(root) = host.render_root(element)
                && !host.scheduler().is_marked_for_disposal(root)
            {
                roots.insert(root);
            }
        }
        for &root in &roots {
            host.render_window(root);
        }
        host.scheduler().last_render = Some(now);
        (roots.len(), false)
    }
}

/// Clears the layout flag when the pass ends, including by unwinding.
struct LayoutFlag<'a, H: FrameHost> {
    host: &'a mut H,
}

impl<H: FrameHost> Drop for LayoutFlag<'_, H> {
    fn drop(&mut self) {
        self.host.scheduler().layouting = false;
    }
}

/// Statistics of one layout pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutPassReport {
    /// Panels whose children were laid out.
    pub panels_laid_out: usize,
    /// Post-layout notifications delivered.
    pub notifications: usize,
    /// Whether the wave limit deferred work.
    pub deferred: bool,
}
