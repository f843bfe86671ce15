#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use weft_core::{KeyCode, KeyEvent, MouseButton, MouseEvent, Point, Rect, ScrollEvent, Size, WindowEvent};
use weft_runtime::{Duration, Instant, UiConfig};
use weft_widgets::Ui;

#[derive(Debug, Arbitrary)]
enum Input {
    Move(i16, i16),
    Down(i16, i16, bool),
    Up(i16, i16),
    Scroll(i16, i16, i8),
    Leave,
    Escape,
    Resize(u8, u8),
    CaptureLost,
    FocusLost,
    Close,
    Frame,
}

fuzz_target!(|script: (u8, Vec<Input>)| {
    let (target_seed, inputs) = script;
    // Cap length to keep fuzzing fast.
    if inputs.len() > 512 {
        return;
    }
    let (mut ui, _, _) = Ui::headless(UiConfig::default());
    let mut now = Instant::now();
    for (i, bounds) in [Rect::new(0.0, 0.0, 400.0, 300.0), Rect::new(420.0, 0.0, 400.0, 300.0)]
        .into_iter()
        .enumerate()
    {
        let (_, host) = ui.create_window_with_host(bounds);
        for j in 0..3 {
            let tab = ui.create_tab(format!("{i}.{j}"));
            let _ = ui.add_tab(host, tab);
        }
    }
    ui.update(now);

    let mut seed = usize::from(target_seed);
    for input in inputs {
        let windows = ui.windows().to_vec();
        if windows.is_empty() {
            break;
        }
        let window = windows[seed % windows.len()];
        seed = seed.wrapping_mul(31).wrapping_add(7);
        let at = |x: i16, y: i16| Point::new(f64::from(x) / 32.0, f64::from(y) / 32.0);
        let event = match input {
            Input::Move(x, y) => WindowEvent::MouseMove(MouseEvent::at(at(x, y))),
            Input::Down(x, y, primary) => {
                let button = if primary { MouseButton::Primary } else { MouseButton::Secondary };
                WindowEvent::MouseDown(MouseEvent::at(at(x, y)).with_button(button))
            }
            Input::Up(x, y) => WindowEvent::MouseUp(MouseEvent::at(at(x, y))),
            Input::Scroll(x, y, d) => WindowEvent::MouseScroll(ScrollEvent {
                position: at(x, y),
                delta_x: 0.0,
                delta_y: f64::from(d),
            }),
            Input::Leave => WindowEvent::MouseLeave,
            Input::Escape => WindowEvent::KeyDown(KeyEvent::new(KeyCode::Escape)),
            Input::Resize(w, h) => {
                WindowEvent::Resized(Size::new(f64::from(w) * 4.0, f64::from(h) * 4.0))
            }
            Input::CaptureLost => WindowEvent::CaptureLost,
            Input::FocusLost => WindowEvent::FocusLost,
            Input::Close => WindowEvent::CloseRequested,
            Input::Frame => {
                now += Duration::from_millis(17);
                ui.update(now);
                continue;
            }
        };
        let _ = ui.dispatch_event(window, event);
        let report = ui.validate();
        assert!(!report.has_errors(), "{report}");
    }
    now += Duration::from_millis(17);
    ui.update(now);
    assert!(!ui.validate().has_errors());
    if let Some(held) = ui.mouse_capture() {
        assert!(ui.exists(held), "capture held by freed element {held}");
    }
});
