#![forbid(unsafe_code)]

//! Weft public facade crate.
//!
//! Re-exports the types an application needs to build a weft session and
//! offers a prelude for day-to-day use. The internal crates stay reachable
//! under [`core`], [`layout`], [`runtime`] and [`widgets`].
//!
//! ```ignore
//! use weft::prelude::*;
//!
//! let (mut ui, _platform, _renderer) = Ui::headless(UiConfig::default());
//! let (_window, host) = ui.create_window_with_host(Rect::new(0.0, 0.0, 800.0, 600.0));
//! let tab = ui.create_tab("main.rs");
//! ui.add_tab(host, tab)?;
//! ui.update(Instant::now());
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use weft_core::{
    ElementId, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, Orientation, Point, Rect,
    ScrollEvent, Sides, Size, Visibility, WindowEvent,
};

// --- Layout re-exports -----------------------------------------------------

pub use weft_layout::{AxisParams, LayoutParams, SizeLimits, SizeSpec, SplitGeometry};

// --- Runtime re-exports ----------------------------------------------------

pub use weft_runtime::{ConfigError, Duration, FrameReport, Instant, TaskOutcome, TaskToken, UiConfig};

// --- Widget re-exports -----------------------------------------------------

pub use weft_widgets::{
    CollectionError, DragPhase, DragState, DrawCommand, DropDestination, ElementKind,
    HeadlessPlatform, InvariantReport, ObserverHandle, Platform, RecordingRenderer, Renderer,
    TreeError, Ui, UiEvent, WindowBackend, WindowStyle,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for weft applications.
#[derive(Debug)]
pub enum Error {
    /// A structural tree operation was rejected.
    Tree(TreeError),
    /// The configuration could not be loaded or failed validation.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tree(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tree(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<TreeError> for Error {
    fn from(err: TreeError) -> Self {
        Self::Tree(err)
    }
}

impl From<CollectionError> for Error {
    fn from(err: CollectionError) -> Self {
        Self::Tree(err.into())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for weft APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Validate `config` and open a headless session with it.
///
/// Useful for tests and tools that drive the tree without a real platform.
pub fn headless(config: UiConfig) -> Result<(Ui, HeadlessPlatform, RecordingRenderer)> {
    let problems = config.validate();
    if !problems.is_empty() {
        return Err(ConfigError::Validation(problems).into());
    }
    Ok(Ui::headless(config))
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AxisParams, DragState, DropDestination, ElementId, ElementKind, Error, Instant,
        LayoutParams, MouseEvent, Orientation, Point, Rect, Result, Size, SizeSpec, Ui, UiConfig,
        UiEvent, Visibility, WindowEvent,
    };

    pub use crate::{core, layout, runtime, widgets};
}

pub use weft_core as core;
pub use weft_layout as layout;
pub use weft_runtime as runtime;
pub use weft_widgets as widgets;
