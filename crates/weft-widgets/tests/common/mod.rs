//! Shared fixtures for the widget integration tests.

#![allow(dead_code)]

use weft_core::{ElementId, MouseEvent, Point, Rect, WindowEvent};
use weft_runtime::{Duration, Instant, UiConfig};
use weft_widgets::{HeadlessPlatform, RecordingRenderer, Ui};

pub struct Session {
    pub ui: Ui,
    pub platform: HeadlessPlatform,
    pub renderer: RecordingRenderer,
    pub now: Instant,
}

impl Session {
    pub fn new() -> Self {
        let (ui, platform, renderer) = Ui::headless(UiConfig::default());
        Self {
            ui,
            platform,
            renderer,
            now: Instant::now(),
        }
    }

    /// Run one frame, a second after the previous one.
    pub fn frame(&mut self) {
        self.now += Duration::from_secs(1);
        self.ui.update(self.now);
    }

    /// A window at `bounds` with one host holding tabs labelled `labels`,
    /// laid out.
    pub fn window_with_tabs(&mut self, bounds: Rect, labels: &[&str]) -> (ElementId, ElementId, Vec<ElementId>) {
        let (window, host) = self.ui.create_window_with_host(bounds);
        let tabs = labels
            .iter()
            .map(|label| {
                let tab = self.ui.create_tab(*label);
                self.ui.add_tab(host, tab).expect("fresh tab");
                tab
            })
            .collect();
        self.frame();
        (window, host, tabs)
    }

    /// Centre of `element` in the client coordinates of its window.
    pub fn client_centre(&self, element: ElementId) -> Point {
        self.ui.layout_rect(element).expect("laid out").center()
    }

    pub fn press(&mut self, window: ElementId, at: Point) {
        self.ui
            .dispatch_event(window, WindowEvent::MouseDown(MouseEvent::at(at)))
            .expect("press");
    }

    pub fn move_to(&mut self, window: ElementId, at: Point) {
        self.ui
            .dispatch_event(window, WindowEvent::MouseMove(MouseEvent::at(at)))
            .expect("move");
    }

    pub fn release(&mut self, window: ElementId, at: Point) {
        self.ui
            .dispatch_event(window, WindowEvent::MouseUp(MouseEvent::at(at)))
            .expect("release");
    }
}

/// Buttons of `host`'s strip, mapped back to their tabs.
pub fn strip_tabs(ui: &Ui, host: ElementId) -> Vec<ElementId> {
    let strip = ui.tab_strip(host).expect("host");
    ui.children(strip)
        .iter()
        .map(|&b| ui.button_tab(b).expect("tab button"))
        .collect()
}
