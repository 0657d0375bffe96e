// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Slide transition between pieces
//!
//! ```text
//! Idle --navigate--> TransitioningOut --outgoing arrives--> TransitioningIn
//!   ^                       |                                     |
//!   +---- incoming arrives or safety timeout <--------------------+
//! ```
//!
//! Both pieces move every frame. The outgoing piece slides away and fades
//! while the incoming piece slides in from the opposite side.

use crate::config::TransitionConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Navigation direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Index step: `Right` advances, `Left` goes back
    fn step(self) -> isize {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Left => "left",
            Direction::Right => "right",
        })
    }
}

/// Direction string other than `left` / `right`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown direction '{0}', expected 'left' or 'right'")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("left") {
            Ok(Direction::Left)
        } else if s.eq_ignore_ascii_case("right") {
            Ok(Direction::Right)
        } else {
            Err(ParseDirectionError(s.to_string()))
        }
    }
}

/// Phase of the transition machine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionPhase {
    #[default]
    Idle,
    TransitioningOut,
    TransitioningIn,
}

/// Snapshot of the navigation state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionState {
    pub is_transitioning: bool,
    pub direction: Option<Direction>,
    pub current_index: usize,
    pub next_index: usize,
}

/// Identifies the safety timer of one transition
///
/// Tickets from earlier transitions are stale and ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SafetyTicket(pub u64);

/// Role of a displayed piece
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceRole {
    Current,
    Outgoing,
    Incoming,
}

/// A piece on screen with its horizontal offset and opacity
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieceSprite {
    pub index: usize,
    pub role: PieceRole,
    pub x: f32,
    pub target_x: f32,
    pub opacity: f32,
}

impl PieceSprite {
    fn at_rest(index: usize) -> Self {
        Self {
            index,
            role: PieceRole::Current,
            x: 0.0,
            target_x: 0.0,
            opacity: 1.0,
        }
    }

    fn has_arrived(&self, epsilon: f32) -> bool {
        (self.x - self.target_x).abs() < epsilon
    }
}

/// What a frame changed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Nothing to animate
    Idle,
    /// Pieces moved, no phase change
    Animating,
    /// The outgoing piece left; the next piece is now current
    OutgoingArrived,
    /// The incoming piece arrived; the machine is idle again
    Finished,
}

/// Piece navigation and slide animation
#[derive(Clone, Debug)]
pub struct TransitionMachine {
    config: TransitionConfig,
    piece_count: usize,
    phase: TransitionPhase,
    direction: Option<Direction>,
    current_index: usize,
    next_index: usize,
    outgoing: Option<PieceSprite>,
    incoming: Option<PieceSprite>,
    ticket_seq: u64,
    active_ticket: Option<SafetyTicket>,
}

impl TransitionMachine {
    pub fn new(piece_count: usize, config: TransitionConfig) -> Self {
        Self {
            config,
            piece_count,
            phase: TransitionPhase::Idle,
            direction: None,
            current_index: 0,
            next_index: 0,
            outgoing: None,
            incoming: None,
            ticket_seq: 0,
            active_ticket: None,
        }
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    pub fn piece_count(&self) -> usize {
        self.piece_count
    }

    /// Replace the piece set, stopping any transition
    ///
    /// The current index is kept when still in range.
    pub fn set_piece_count(&mut self, piece_count: usize) {
        self.piece_count = piece_count;
        if self.current_index >= piece_count {
            self.current_index = 0;
        }
        self.stop();
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        self.phase != TransitionPhase::Idle
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn state(&self) -> TransitionState {
        TransitionState {
            is_transitioning: self.is_transitioning(),
            direction: self.direction,
            current_index: self.current_index,
            next_index: self.next_index,
        }
    }

    /// Delay after which [`safety_timeout`](Self::safety_timeout) should fire
    pub fn safety_delay(&self) -> Duration {
        Duration::from_millis(self.config.safety_timeout_ms)
    }

    /// Index reached by moving one step in `direction`, wrapping around
    pub fn neighbor(&self, direction: Direction) -> Option<usize> {
        if self.piece_count == 0 {
            return None;
        }
        let count = self.piece_count as isize;
        Some((self.current_index as isize + direction.step()).rem_euclid(count) as usize)
    }

    /// Start sliding to the neighboring piece
    ///
    /// Returns the ticket of the safety timer the caller must schedule, or
    /// `None` when a transition is already running or there is nothing to
    /// navigate to.
    pub fn navigate(&mut self, direction: Direction) -> Option<SafetyTicket> {
        if self.is_transitioning() || self.piece_count < 2 {
            return None;
        }
        let next_index = self.neighbor(direction)?;

        // Right slides the current piece out to the left and the next one in
        // from the right
        let side = direction.step() as f32 * self.config.slide_distance;
        self.outgoing = Some(PieceSprite {
            index: self.current_index,
            role: PieceRole::Outgoing,
            x: 0.0,
            target_x: -side,
            opacity: 1.0,
        });
        self.incoming = Some(PieceSprite {
            index: next_index,
            role: PieceRole::Incoming,
            x: side,
            target_x: 0.0,
            opacity: 1.0,
        });

        self.phase = TransitionPhase::TransitioningOut;
        self.direction = Some(direction);
        self.next_index = next_index;
        self.ticket_seq += 1;
        let ticket = SafetyTicket(self.ticket_seq);
        self.active_ticket = Some(ticket);

        log::debug!(
            "[Transition] {} from piece {} to {}",
            direction,
            self.current_index,
            next_index
        );
        Some(ticket)
    }

    /// Advance the animation by one frame
    pub fn advance_frame(&mut self) -> FrameOutcome {
        if !self.is_transitioning() {
            return FrameOutcome::Idle;
        }
        let epsilon = self.config.arrival_epsilon;
        let mut outcome = FrameOutcome::Animating;

        if let Some(sprite) = self.outgoing.as_mut() {
            step_outgoing(sprite, &self.config);
            if sprite.has_arrived(epsilon) {
                self.outgoing = None;
                self.current_index = self.next_index;
                self.phase = TransitionPhase::TransitioningIn;
                outcome = FrameOutcome::OutgoingArrived;
            }
        }

        if let Some(sprite) = self.incoming.as_mut() {
            sprite.x = lerp(sprite.x, sprite.target_x, self.config.incoming_lerp);
            if sprite.has_arrived(epsilon) {
                self.finish();
                outcome = FrameOutcome::Finished;
            }
        }

        outcome
    }

    /// Force the transition identified by `ticket` to end
    ///
    /// Returns `false` for stale tickets and when already idle.
    pub fn safety_timeout(&mut self, ticket: SafetyTicket) -> bool {
        if self.active_ticket != Some(ticket) || !self.is_transitioning() {
            return false;
        }
        log::debug!(
            "[Transition] Safety timeout, forcing piece {}",
            self.next_index
        );
        self.finish();
        true
    }

    /// Pieces to draw, outgoing before incoming
    pub fn sprites(&self) -> Vec<PieceSprite> {
        match self.phase {
            TransitionPhase::Idle if self.piece_count > 0 => {
                vec![PieceSprite::at_rest(self.current_index)]
            }
            TransitionPhase::Idle => Vec::new(),
            _ => self.outgoing.iter().chain(&self.incoming).copied().collect(),
        }
    }

    /// Commit the pending index and return to idle
    fn finish(&mut self) {
        self.current_index = self.next_index;
        self.stop();
    }

    fn stop(&mut self) {
        self.phase = TransitionPhase::Idle;
        self.direction = None;
        self.next_index = self.current_index;
        self.outgoing = None;
        self.incoming = None;
        self.active_ticket = None;
    }
}

fn lerp(from: f32, to: f32, factor: f32) -> f32 {
    from + (to - from) * factor
}

/// Move and fade the outgoing piece
///
/// It accelerates once far from center and only starts fading after it has
/// moved a little.
fn step_outgoing(sprite: &mut PieceSprite, config: &TransitionConfig) {
    let distance = sprite.x.abs();
    let factor = if distance > config.acceleration_start {
        config.outgoing_lerp + distance * config.acceleration_per_unit
    } else {
        config.outgoing_lerp
    };
    sprite.x = lerp(sprite.x, sprite.target_x, factor.min(1.0));

    let distance = sprite.x.abs();
    let target_opacity = if distance > config.fade_start {
        // A zero fade distance means an instant cut
        let fade_distance = config.fade_distance.max(f32::EPSILON);
        (1.0 - (distance - config.fade_start) / fade_distance).max(0.0)
    } else {
        1.0
    };
    sprite.opacity = lerp(sprite.opacity, target_opacity, config.opacity_smoothing);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn machine(count: usize) -> TransitionMachine {
        TransitionMachine::new(count, TransitionConfig::default())
    }

    fn run_to_idle(machine: &mut TransitionMachine) -> usize {
        let mut frames = 0;
        while machine.is_transitioning() {
            machine.advance_frame();
            frames += 1;
            assert!(frames < 1_000, "transition never converged");
        }
        frames
    }

    #[test]
    fn test_left_from_first_wraps_to_last() {
        let mut m = machine(5);
        assert!(m.navigate(Direction::Left).is_some());
        assert_eq!(m.state().next_index, 4);
        assert_eq!(m.state().direction, Some(Direction::Left));
        run_to_idle(&mut m);
        assert_eq!(m.current_index(), 4);
    }

    #[test]
    fn test_right_from_last_wraps_to_first() {
        let mut m = machine(5);
        for _ in 0..4 {
            m.navigate(Direction::Right).unwrap();
            run_to_idle(&mut m);
        }
        assert_eq!(m.current_index(), 4);

        m.navigate(Direction::Right).unwrap();
        assert_eq!(m.state().next_index, 0);
        run_to_idle(&mut m);
        assert_eq!(m.current_index(), 0);
    }

    #[test]
    fn test_navigate_while_transitioning_is_noop() {
        let mut m = machine(5);
        m.navigate(Direction::Right).unwrap();
        m.advance_frame();
        let state = m.state();
        let sprites = m.sprites();

        assert!(m.navigate(Direction::Left).is_none());
        assert!(m.navigate(Direction::Right).is_none());
        assert_eq!(m.state(), state);
        assert_eq!(m.sprites(), sprites);
    }

    #[test]
    fn test_navigate_needs_two_pieces() {
        let mut empty = machine(0);
        assert!(empty.navigate(Direction::Right).is_none());
        assert!(empty.sprites().is_empty());

        let mut single = machine(1);
        assert!(single.navigate(Direction::Left).is_none());
        assert!(!single.is_transitioning());
        assert_eq!(single.sprites().len(), 1);
    }

    #[test]
    fn test_initial_sprites_for_right() {
        let mut m = machine(3);
        m.navigate(Direction::Right).unwrap();
        let sprites = m.sprites();
        assert_eq!(sprites.len(), 2);
        assert_eq!(sprites[0].role, PieceRole::Outgoing);
        assert_eq!(sprites[0].index, 0);
        assert_eq!(sprites[0].target_x, -30.0);
        assert_eq!(sprites[1].role, PieceRole::Incoming);
        assert_eq!(sprites[1].index, 1);
        assert_eq!(sprites[1].x, 30.0);
        assert_eq!(sprites[1].target_x, 0.0);
    }

    #[test]
    fn test_first_frame_motion() {
        let mut m = machine(3);
        m.navigate(Direction::Left).unwrap();
        assert_eq!(m.advance_frame(), FrameOutcome::Animating);

        let sprites = m.sprites();
        // Outgoing: 0 -> +30 at 0.15, still opaque below the fade start
        assert_relative_eq!(sprites[0].x, 4.5, epsilon = 1e-5);
        let expected_opacity = 1.0 + ((1.0 - 2.5 / 30.0) - 1.0) * 0.1;
        assert_relative_eq!(sprites[0].opacity, expected_opacity, epsilon = 1e-5);
        // Incoming: -30 -> 0 at 0.1
        assert_relative_eq!(sprites[1].x, -27.0, epsilon = 1e-5);
        assert_relative_eq!(sprites[1].opacity, 1.0);
    }

    #[test]
    fn test_phases_in_order() {
        let mut m = machine(5);
        m.navigate(Direction::Right).unwrap();
        assert_eq!(m.phase(), TransitionPhase::TransitioningOut);

        let mut outcomes = Vec::new();
        while m.is_transitioning() {
            let outcome = m.advance_frame();
            if outcome != FrameOutcome::Animating {
                outcomes.push((outcome, m.phase(), m.current_index()));
            }
        }
        assert_eq!(
            outcomes,
            vec![
                (FrameOutcome::OutgoingArrived, TransitionPhase::TransitioningIn, 1),
                (FrameOutcome::Finished, TransitionPhase::Idle, 1),
            ]
        );
        assert_eq!(m.state().direction, None);
        assert_eq!(m.sprites(), vec![PieceSprite::at_rest(1)]);
        assert_eq!(m.advance_frame(), FrameOutcome::Idle);
    }

    #[test]
    fn test_outgoing_fades_out() {
        let mut m = machine(2);
        m.navigate(Direction::Right).unwrap();
        let mut last_opacity = 1.0;
        while m.phase() == TransitionPhase::TransitioningOut {
            m.advance_frame();
            if let Some(out) = m.sprites().iter().find(|s| s.role == PieceRole::Outgoing) {
                assert!(out.opacity <= last_opacity);
                assert!(out.opacity >= 0.0);
                last_opacity = out.opacity;
            }
        }
        assert!(last_opacity < 1.0);
    }

    #[test]
    fn test_zero_fade_distance_cuts_out() {
        let config = TransitionConfig {
            fade_distance: 0.0,
            ..Default::default()
        };
        let mut m = TransitionMachine::new(2, config);
        m.navigate(Direction::Right).unwrap();

        let mut last_opacity = 1.0;
        while m.is_transitioning() {
            m.advance_frame();
            if let Some(outgoing) = m.sprites().iter().find(|s| s.role == PieceRole::Outgoing) {
                assert!(outgoing.opacity.is_finite());
                assert!((0.0..=1.0).contains(&outgoing.opacity));
                last_opacity = outgoing.opacity;
            }
        }
        assert!(last_opacity < 1.0);
        assert_eq!(m.current_index(), 1);
    }

    #[test]
    fn test_safety_timeout_without_frames() {
        let mut m = machine(5);
        let ticket = m.navigate(Direction::Left).unwrap();
        assert_eq!(m.safety_delay(), Duration::from_secs(2));

        assert!(m.safety_timeout(ticket));
        assert_eq!(m.phase(), TransitionPhase::Idle);
        assert_eq!(m.current_index(), 4);
        assert!(!m.state().is_transitioning);
        assert!(!m.safety_timeout(ticket));
    }

    #[test]
    fn test_safety_timeout_mid_transition() {
        let mut m = machine(5);
        let ticket = m.navigate(Direction::Right).unwrap();
        while m.phase() == TransitionPhase::TransitioningOut {
            m.advance_frame();
        }
        assert!(m.safety_timeout(ticket));
        assert_eq!(m.current_index(), 1);
        assert_eq!(m.sprites().len(), 1);
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let mut m = machine(5);
        let first = m.navigate(Direction::Right).unwrap();
        run_to_idle(&mut m);
        let second = m.navigate(Direction::Right).unwrap();
        assert_ne!(first, second);

        assert!(!m.safety_timeout(first));
        assert!(m.is_transitioning());
        assert!(m.safety_timeout(second));
        assert_eq!(m.current_index(), 2);
    }

    #[test]
    fn test_set_piece_count_resets() {
        let mut m = machine(5);
        m.navigate(Direction::Left).unwrap();
        run_to_idle(&mut m);
        assert_eq!(m.current_index(), 4);

        m.navigate(Direction::Right).unwrap();
        m.set_piece_count(3);
        assert!(!m.is_transitioning());
        assert_eq!(m.current_index(), 0);
    }

    #[test]
    fn test_parse_direction() {
        assert_eq!("left".parse::<Direction>().unwrap(), Direction::Left);
        assert_eq!("Right".parse::<Direction>().unwrap(), Direction::Right);
        assert!("up".parse::<Direction>().is_err());
    }
}
