//! The prelude is enough to run a session end to end.

use weft::prelude::*;
use weft::{ConfigError, DrawCommand};

#[test]
fn prelude_session_lays_out_and_renders() -> Result<()> {
    let (mut ui, platform, renderer) = weft::headless(UiConfig::default())?;
    let (window, host) = ui.create_window_with_host(Rect::new(0.0, 0.0, 640.0, 480.0));
    let tab = ui.create_tab("main.rs");
    ui.add_tab(host, tab)?;
    ui.update(Instant::now());

    assert_eq!(platform.open_windows(), 1);
    assert_eq!(ui.active_tab(host), Some(tab));
    assert_eq!(ui.layout_rect(host), Some(Rect::new(0.0, 0.0, 640.0, 480.0)));
    assert!(renderer.commands().iter().any(|c| matches!(c, DrawCommand::Begin { window: w, .. } if *w == window)));
    assert!(ui.validate().is_clean());
    Ok(())
}

#[test]
fn invalid_config_is_rejected_before_a_session_exists() {
    let config = UiConfig {
        selector_edge_fraction: 0.9,
        ..UiConfig::default()
    };
    match weft::headless(config) {
        Err(Error::Config(ConfigError::Validation(problems))) => {
            assert_eq!(problems.len(), 1);
            assert!(problems[0].contains("selector_edge_fraction"));
        }
        other => panic!("expected a validation error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn tree_errors_convert_into_the_facade_error() {
    let (mut ui, _, _) = Ui::headless(UiConfig::default());
    let leaf = ui.create_leaf(Size::ZERO);
    let err: Error = ui.add_child(leaf, leaf).unwrap_err().into();
    assert!(matches!(err, Error::Tree(_)));
    assert!(!err.to_string().is_empty());
}
