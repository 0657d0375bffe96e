//! Event loop feeding the viewer shell
//!
//! Plays the role a render loop plays in a windowed viewer: delivers frame
//! ticks at a fixed rate and fires the safety timers the shell asks for.

use anyhow::{bail, Result};
use std::time::Duration;
use step_viewer_loader::{Liveness, ModelLoader};
use step_viewer_scene::{
    Direction, Effect, PickEvent, SafetyTicket, ShellView, ViewerEvent, ViewerShell,
};
use tokio::time::{Instant, MissedTickBehavior};

/// Frame period of a 60 fps render loop
pub const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// How a navigation request played out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Rejected by the shell (too few pieces)
    Ignored,
    /// Frames carried the transition to its end
    Converged { frames: u32 },
    /// The safety timer ended the transition
    TimedOut { frames: u32 },
}

pub struct Driver {
    shell: ViewerShell,
    liveness: Liveness,
    orbit_controls: bool,
}

impl Driver {
    pub fn new(shell: ViewerShell) -> Self {
        Self {
            shell,
            liveness: Liveness::new(),
            orbit_controls: true,
        }
    }

    pub fn shell(&self) -> &ViewerShell {
        &self.shell
    }

    pub fn view(&self) -> ShellView {
        self.shell.view()
    }

    pub fn orbit_controls(&self) -> bool {
        self.orbit_controls
    }

    /// Load the pieces and hand them to the shell
    pub async fn load(&mut self, loader: &ModelLoader, paths: &[String]) -> Result<()> {
        // An empty request never leaves Idle
        if !paths.is_empty() {
            self.dispatch(ViewerEvent::LoadStarted);
        }
        let Some(batch) = loader.load(paths, &self.liveness).await else {
            bail!("viewer was torn down while loading");
        };

        for model in &batch.models {
            match &model.failure {
                Some(failure) => log::warn!(
                    "{}: placeholder with {} vertices ({})",
                    model.source_path,
                    model.geometry.vertex_count(),
                    failure
                ),
                None => log::info!(
                    "{}: {} vertices, {} triangles, {} entities, extent {:.1}",
                    model.source_path,
                    model.geometry.vertex_count(),
                    model.geometry.triangle_count(),
                    model.entities.len(),
                    model.geometry.bounds().map_or(0.0, |b| b.diagonal())
                ),
            }
        }

        self.dispatch(ViewerEvent::ModelsLoaded(batch));
        Ok(())
    }

    /// Run one navigation to completion
    pub async fn navigate(&mut self, direction: Direction) -> NavigationOutcome {
        let Some((ticket, after)) = self.dispatch(ViewerEvent::Navigate(direction)) else {
            log::warn!("Navigation {} ignored", direction);
            return NavigationOutcome::Ignored;
        };

        let safety = tokio::time::sleep_until(Instant::now() + after);
        tokio::pin!(safety);
        let mut frames = tokio::time::interval(FRAME_INTERVAL);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut count = 0u32;

        while self.shell.transition().is_transitioning() {
            tokio::select! {
                _ = &mut safety => {
                    self.dispatch(ViewerEvent::SafetyTimeout(ticket));
                    return NavigationOutcome::TimedOut { frames: count };
                }
                _ = frames.tick() => {
                    count += 1;
                    self.dispatch(ViewerEvent::Frame);
                }
            }
        }
        NavigationOutcome::Converged { frames: count }
    }

    pub fn pick(&mut self, triangle_index: u32) {
        self.dispatch(ViewerEvent::Pick(PickEvent {
            triangle_index,
            world_point: [0.0; 3],
        }));
    }

    pub fn unmount(&mut self) {
        self.liveness.tear_down();
        self.dispatch(ViewerEvent::Unmount);
    }

    /// Feed an event to the shell and perform its effects
    ///
    /// Returns the safety timer the shell asked for, if any.
    fn dispatch(&mut self, event: ViewerEvent) -> Option<(SafetyTicket, Duration)> {
        let mut timer = None;
        for effect in self.shell.handle(event) {
            match effect {
                Effect::ScheduleSafetyTimeout { ticket, after } => timer = Some((ticket, after)),
                Effect::SetOrbitControls(enabled) => {
                    log::debug!("Orbit controls {}", if enabled { "on" } else { "off" });
                    self.orbit_controls = enabled;
                }
                Effect::SelectionChanged(Some(id)) => log::info!("Selected {}", id),
                Effect::SelectionChanged(None) => log::debug!("Selection cleared"),
            }
        }
        timer
    }
}

/// Human-readable rendering of a view
pub fn render_view(view: &ShellView) -> String {
    let mut out = String::new();
    if let Some(label) = &view.piece_label {
        out.push_str(label);
    }
    out.push_str(&format!(" [{:?}]", view.status));
    for piece in &view.pieces {
        out.push_str(&format!(
            "\n  {:?} {} x={:.2} opacity={:.2}{}",
            piece.role,
            piece.source_path,
            piece.x,
            piece.opacity,
            if piece.is_fallback { " (placeholder)" } else { "" }
        ));
    }
    if let Some(panel) = &view.selection {
        out.push_str(&format!("\n  {}", panel.title));
        for line in &panel.lines {
            out.push_str(&format!("\n    {}", line));
        }
    }
    out
}
