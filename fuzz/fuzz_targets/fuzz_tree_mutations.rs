#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use weft_core::{ElementId, Orientation, Rect, Size};
use weft_runtime::{Duration, Instant, UiConfig};
use weft_widgets::Ui;

#[derive(Debug, Arbitrary)]
enum Op {
    Leaf(u8, u8),
    Panel,
    Stack(bool),
    Split(bool),
    Tab,
    Host,
    Add(u8, u8),
    InsertBefore(u8, u8, u8),
    Remove(u8),
    Move(u8, Option<u8>),
    ZIndex(u8, i8),
    Dispose(u8),
    AddTab(u8, u8),
    RemoveTab(u8),
    ActivateTab(u8),
    CloseTab(u8),
    SplitPosition(u8, u8),
    Frame,
}

fn pick(pool: &[ElementId], i: u8) -> Option<ElementId> {
    (!pool.is_empty()).then(|| pool[i as usize % pool.len()])
}

fuzz_target!(|ops: Vec<Op>| {
    // Cap length to keep fuzzing fast.
    if ops.len() > 256 {
        return;
    }
    let (mut ui, _, _) = Ui::headless(UiConfig::default());
    let mut now = Instant::now();
    let (window, host) = ui.create_window_with_host(Rect::new(0.0, 0.0, 640.0, 480.0));
    // Tabs and hosts only move through the tab API; raw collection edits
    // would break the strip/contents pairing on purpose.
    let mut panels = vec![window];
    let mut plain = Vec::new();
    let mut tabs = Vec::new();
    let mut hosts = vec![host];

    for op in ops {
        let ui: &mut Ui = &mut ui;
        match op {
            Op::Leaf(w, h) => plain.push(ui.create_leaf(Size::new(f64::from(w), f64::from(h)))),
            Op::Panel => {
                let panel = ui.create_panel();
                panels.push(panel);
                plain.push(panel);
            }
            Op::Stack(v) => {
                let stack = ui.create_stack(orientation(v));
                panels.push(stack);
                plain.push(stack);
            }
            Op::Split(v) => {
                let split = ui.create_split(orientation(v));
                panels.push(split);
                plain.push(split);
            }
            Op::Tab => {
                let tab = ui.create_tab("t");
                panels.push(tab);
                tabs.push(tab);
            }
            Op::Host => {
                // Empty-host cleanup expects hosts to sit in windows or splits
                // of hosts, so new hosts get their own window.
                let (window, host) = ui.create_window_with_host(Rect::new(40.0, 40.0, 320.0, 240.0));
                panels.push(window);
                hosts.push(host);
            }
            Op::Add(p, c) => {
                if let (Some(p), Some(c)) = (pick(&panels, p), pick(&plain, c)) {
                    let _ = ui.add_child(p, c);
                }
            }
            Op::InsertBefore(p, c, b) => {
                if let (Some(p), Some(c)) = (pick(&panels, p), pick(&plain, c)) {
                    let _ = ui.insert_child_before(p, c, pick(&plain, b));
                }
            }
            Op::Remove(c) => {
                if let Some(c) = pick(&plain, c)
                    && let Some(p) = ui.parent(c)
                {
                    let _ = ui.remove_child(p, c);
                }
            }
            Op::Move(c, b) => {
                if let Some(c) = pick(&plain, c)
                    && let Some(p) = ui.parent(c)
                {
                    let _ = ui.move_child_before(p, c, b.and_then(|b| pick(&plain, b)));
                }
            }
            Op::ZIndex(c, z) => {
                if let Some(c) = pick(&plain, c) {
                    let _ = ui.set_zindex(c, i32::from(z));
                }
            }
            Op::Dispose(c) => {
                if let Some(c) = pick(&plain, c).or_else(|| pick(&tabs, c)) {
                    ui.dispose(c);
                }
            }
            Op::AddTab(h, t) => {
                if let (Some(h), Some(t)) = (pick(&hosts, h), pick(&tabs, t)) {
                    let _ = ui.add_tab(h, t);
                }
            }
            Op::RemoveTab(t) => {
                if let Some(t) = pick(&tabs, t) {
                    let _ = ui.remove_tab(t);
                }
            }
            Op::ActivateTab(t) => {
                if let Some(t) = pick(&tabs, t) {
                    let _ = ui.activate_tab(t);
                }
            }
            Op::CloseTab(t) => {
                if let Some(t) = pick(&tabs, t) {
                    let _ = ui.close_tab(t);
                }
            }
            Op::SplitPosition(s, p) => {
                if let Some(s) = pick(&panels, s) {
                    let _ = ui.set_separator_position(s, f64::from(p) / 255.0);
                }
            }
            Op::Frame => {
                now += Duration::from_millis(17);
                ui.update(now);
            }
        }
        let report = ui.validate();
        assert!(!report.has_errors(), "{report}");
    }
    now += Duration::from_millis(17);
    ui.update(now);
    for &element in plain.iter().chain(&tabs).filter(|&&e| ui.exists(e)) {
        if let Some(parent) = ui.parent(element) {
            assert!(ui.children(parent).contains(&element));
        }
    }
});

fn orientation(vertical: bool) -> Orientation {
    if vertical {
        Orientation::Vertical
    } else {
        Orientation::Horizontal
    }
}
