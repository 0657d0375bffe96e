// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # STEP Viewer Scene
//!
//! Rendering-engine independent viewer state: which piece is shown, how the
//! slide transition between pieces progresses, and which entity a pick lands
//! on.
//!
//! Everything here is synchronous. A driver feeds [`ViewerEvent`]s into a
//! [`ViewerShell`] and carries out the returned [`Effect`]s (timers, camera
//! control toggles, selection notifications); [`ViewerShell::view`] describes
//! what should be on screen.
//!
//! ```
//! use step_viewer_scene::{Direction, ViewerConfig, ViewerEvent, ViewerShell};
//!
//! let mut shell = ViewerShell::new(ViewerConfig::default());
//! let effects = shell.handle(ViewerEvent::Navigate(Direction::Right));
//! assert!(effects.is_empty()); // nothing loaded yet
//! ```

pub mod config;
pub mod selection;
pub mod shell;
pub mod transition;

pub use config::{Color, ColorParseError, DisplayConfig, SelectionConfig, TransitionConfig, ViewerConfig};
pub use selection::{resolve_pick, PickIndicator, Selection};
pub use shell::{
    Effect, PickEvent, PieceView, SelectionPanel, ShellView, ViewerEvent, ViewerShell,
};
pub use transition::{
    Direction, FrameOutcome, ParseDirectionError, PieceRole, PieceSprite, SafetyTicket,
    TransitionMachine, TransitionPhase, TransitionState,
};
