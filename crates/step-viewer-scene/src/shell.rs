// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer shell: event reducer and view description
//!
//! The shell never touches timers, the renderer or the network. Each event
//! updates state and returns [`Effect`]s for the driver to perform.

use crate::config::{Color, ViewerConfig};
use crate::selection::{resolve_pick, PickIndicator, Selection};
use crate::transition::{
    Direction, FrameOutcome, PieceRole, SafetyTicket, TransitionMachine,
};
use serde::Serialize;
use std::time::Duration;
use step_viewer_model::{Entity, LoadBatch, LoadStatus, Model};

/// Footer of the selection panel
pub const DESELECT_HINT: &str = "Click elsewhere to deselect";

/// A pick resolved by the rendering engine
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickEvent {
    /// Index of the hit triangle in the current piece's mesh
    pub triangle_index: u32,
    /// Hit point in world space
    pub world_point: [f32; 3],
}

/// Input to [`ViewerShell::handle`]
#[derive(Clone, Debug)]
pub enum ViewerEvent {
    /// A load request was issued
    LoadStarted,
    ModelsLoaded(LoadBatch),
    Navigate(Direction),
    /// Animation frame tick
    Frame,
    Pick(PickEvent),
    /// Click that hit no mesh
    PickMissed,
    SafetyTimeout(SafetyTicket),
    Unmount,
}

/// Side effect requested by the shell
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Deliver `ViewerEvent::SafetyTimeout(ticket)` after `after`
    ScheduleSafetyTimeout { ticket: SafetyTicket, after: Duration },
    /// Enable or disable user camera control
    SetOrbitControls(bool),
    /// Selected entity id changed
    SelectionChanged(Option<String>),
}

/// A piece to draw
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PieceView {
    pub index: usize,
    pub role: PieceRole,
    pub source_path: String,
    pub is_fallback: bool,
    pub x: f32,
    pub opacity: f32,
    pub scale: f32,
    pub rotation_y: f32,
    pub color: Color,
}

/// Details of the selected entity
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SelectionPanel {
    pub title: String,
    pub lines: Vec<String>,
    pub footer: &'static str,
}

impl SelectionPanel {
    fn for_entity(entity: &Entity) -> Self {
        let mut lines = vec![format!("ID: {}", entity.id)];
        let metadata = &entity.metadata;
        if let Some(area) = metadata.area {
            lines.push(format!("Area: {:.2} mm²", area));
        }
        if let Some(length) = metadata.length {
            lines.push(format!("Length: {:.2} mm", length));
        }
        if let Some(error) = &metadata.error {
            lines.push(format!("Error: {}", error));
        }
        Self {
            title: format!("Selected {}", entity.kind.label()),
            lines,
            footer: DESELECT_HINT,
        }
    }
}

/// Everything the UI shows
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShellView {
    pub can_navigate_left: bool,
    pub can_navigate_right: bool,
    /// `Piece i of n`, absent until pieces exist
    pub piece_label: Option<String>,
    pub pieces: Vec<PieceView>,
    pub status: LoadStatus,
    pub selection: Option<SelectionPanel>,
    pub marker_color: Option<Color>,
    #[serde(skip)]
    pub indicator: Option<PickIndicator>,
}

/// Viewer state driven by [`ViewerEvent`]s
pub struct ViewerShell {
    config: ViewerConfig,
    models: Vec<Model>,
    status: LoadStatus,
    transition: TransitionMachine,
    selection: Selection,
    mounted: bool,
}

impl ViewerShell {
    pub fn new(config: ViewerConfig) -> Self {
        let transition = TransitionMachine::new(0, config.transition.clone());
        let selection = Selection::new(config.selection.clone());
        Self {
            config,
            models: Vec::new(),
            status: LoadStatus::Idle,
            transition,
            selection,
            mounted: true,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn current_model(&self) -> Option<&Model> {
        self.models.get(self.transition.current_index())
    }

    pub fn transition(&self) -> &TransitionMachine {
        &self.transition
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Apply one event, returning the effects to perform
    ///
    /// After [`ViewerEvent::Unmount`] every event is ignored.
    pub fn handle(&mut self, event: ViewerEvent) -> Vec<Effect> {
        if !self.mounted {
            return Vec::new();
        }
        let mut effects = Vec::new();

        match event {
            ViewerEvent::LoadStarted => {
                self.status = LoadStatus::Loading;
            }
            ViewerEvent::ModelsLoaded(batch) => {
                let was_transitioning = self.transition.is_transitioning();
                self.status = batch.status;
                self.models = batch.models;
                self.transition.set_piece_count(self.models.len());
                self.clear_selection(&mut effects);
                if was_transitioning {
                    effects.push(Effect::SetOrbitControls(true));
                }
                log::info!(
                    "[Shell] {} pieces loaded ({:?})",
                    self.models.len(),
                    self.status
                );
            }
            ViewerEvent::Navigate(direction) => {
                if let Some(ticket) = self.transition.navigate(direction) {
                    self.clear_selection(&mut effects);
                    effects.push(Effect::SetOrbitControls(false));
                    effects.push(Effect::ScheduleSafetyTimeout {
                        ticket,
                        after: self.transition.safety_delay(),
                    });
                }
            }
            ViewerEvent::Frame => {
                if self.transition.advance_frame() == FrameOutcome::Finished {
                    effects.push(Effect::SetOrbitControls(true));
                }
            }
            ViewerEvent::Pick(pick) => self.pick(pick, &mut effects),
            ViewerEvent::PickMissed => self.clear_selection(&mut effects),
            ViewerEvent::SafetyTimeout(ticket) => {
                if self.transition.safety_timeout(ticket) {
                    effects.push(Effect::SetOrbitControls(true));
                }
            }
            ViewerEvent::Unmount => {
                self.clear_selection(&mut effects);
                self.mounted = false;
            }
        }

        effects
    }

    fn pick(&mut self, pick: PickEvent, effects: &mut Vec<Effect>) {
        if self.transition.is_transitioning() {
            return;
        }
        let Some(model) = self.models.get(self.transition.current_index()) else {
            return;
        };
        let Some(entity) = resolve_pick(pick.triangle_index, &model.entities) else {
            log::debug!("[Shell] Pick on {} with empty catalog", model.source_path);
            return;
        };

        log::debug!(
            "[Shell] Triangle {} resolved to {}",
            pick.triangle_index,
            entity.id
        );
        if self.selection.select(entity, pick.world_point) {
            effects.push(Effect::SelectionChanged(Some(entity.id.clone())));
        }
    }

    fn clear_selection(&mut self, effects: &mut Vec<Effect>) {
        if self.selection.clear() {
            effects.push(Effect::SelectionChanged(None));
        }
    }

    /// Describe what should be on screen
    pub fn view(&self) -> ShellView {
        let count = self.models.len();
        let can_navigate = !self.transition.is_transitioning() && count >= 2;
        let display = &self.config.display;
        let color = self.selection.highlight_color();

        let pieces = self
            .transition
            .sprites()
            .into_iter()
            .filter_map(|sprite| {
                let model = self.models.get(sprite.index)?;
                Some(PieceView {
                    index: sprite.index,
                    role: sprite.role,
                    source_path: model.source_path.clone(),
                    is_fallback: model.is_fallback,
                    x: sprite.x,
                    opacity: sprite.opacity,
                    scale: display.model_scale,
                    rotation_y: display.model_rotation_y,
                    color,
                })
            })
            .collect();

        let indicator = Some(*self.selection.indicator()).filter(|i| i.visible);

        ShellView {
            can_navigate_left: can_navigate,
            can_navigate_right: can_navigate,
            piece_label: (count > 0).then(|| {
                format!("Piece {} of {}", self.transition.current_index() + 1, count)
            }),
            pieces,
            status: self.status,
            selection: self.selection.selected().map(SelectionPanel::for_entity),
            marker_color: self.selection.marker_color(),
            indicator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::TransitionPhase;
    use step_viewer_model::{EntityKind, EntityMetadata, MeshData};

    fn model(index: usize, entities: Vec<Entity>) -> Model {
        let mut geometry = MeshData::new();
        let a = geometry.push_vertex([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        let b = geometry.push_vertex([1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        let c = geometry.push_vertex([0.0, 1.0, 0.0], [0.0, 0.0, 1.0]);
        geometry.push_triangle(a, b, c);
        Model::new(geometry, entities, format!("/assets/Part{}.stp", index + 1))
    }

    fn catalog() -> Vec<Entity> {
        vec![
            Entity::new("face_0", EntityKind::Face, EntityMetadata::face(12.3456, 2)),
            Entity::new("face_1", EntityKind::Face, EntityMetadata::face(4.0, 2)),
            Entity::new("edge_0", EntityKind::Edge, EntityMetadata::edge(5.0)),
        ]
    }

    fn loaded_shell(count: usize) -> ViewerShell {
        let mut shell = ViewerShell::new(ViewerConfig::default());
        shell.handle(ViewerEvent::LoadStarted);
        let models = (0..count).map(|i| model(i, catalog())).collect();
        shell.handle(ViewerEvent::ModelsLoaded(LoadBatch::from_models(models)));
        shell
    }

    fn pick(triangle_index: u32) -> ViewerEvent {
        ViewerEvent::Pick(PickEvent {
            triangle_index,
            world_point: [0.1, 0.2, 0.3],
        })
    }

    fn ticket_of(effects: &[Effect]) -> SafetyTicket {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::ScheduleSafetyTimeout { ticket, .. } => Some(*ticket),
                _ => None,
            })
            .expect("no safety timeout scheduled")
    }

    #[test]
    fn test_load_status_flow() {
        let mut shell = ViewerShell::new(ViewerConfig::default());
        assert_eq!(shell.status(), LoadStatus::Idle);
        assert!(shell.view().piece_label.is_none());

        shell.handle(ViewerEvent::LoadStarted);
        assert_eq!(shell.status(), LoadStatus::Loading);

        let models = (0..5).map(|i| model(i, catalog())).collect();
        shell.handle(ViewerEvent::ModelsLoaded(LoadBatch::from_models(models)));
        let view = shell.view();
        assert_eq!(view.status, LoadStatus::Success);
        assert_eq!(view.piece_label.as_deref(), Some("Piece 1 of 5"));
        assert!(view.can_navigate_left && view.can_navigate_right);
        assert_eq!(view.pieces.len(), 1);
        assert_eq!(view.pieces[0].role, PieceRole::Current);
        assert_eq!(view.pieces[0].source_path, "/assets/Part1.stp");
        assert_eq!(view.pieces[0].scale, 0.4);
    }

    #[test]
    fn test_navigate_effects_and_disabled_controls() {
        let mut shell = loaded_shell(5);
        let effects = shell.handle(ViewerEvent::Navigate(Direction::Left));

        assert!(effects.contains(&Effect::SetOrbitControls(false)));
        assert!(effects.contains(&Effect::ScheduleSafetyTimeout {
            ticket: ticket_of(&effects),
            after: Duration::from_secs(2),
        }));
        let view = shell.view();
        assert!(!view.can_navigate_left && !view.can_navigate_right);
        assert_eq!(view.pieces.len(), 2);
        assert_eq!(view.pieces[1].index, 4);

        // Ignored while the slide runs
        let state = shell.transition().state();
        assert!(shell.handle(ViewerEvent::Navigate(Direction::Right)).is_empty());
        assert_eq!(shell.transition().state(), state);
    }

    #[test]
    fn test_frames_finish_transition() {
        let mut shell = loaded_shell(5);
        shell.handle(ViewerEvent::Navigate(Direction::Right));

        let mut effects = Vec::new();
        for _ in 0..200 {
            effects.extend(shell.handle(ViewerEvent::Frame));
        }
        assert_eq!(effects, vec![Effect::SetOrbitControls(true)]);
        assert_eq!(shell.transition().phase(), TransitionPhase::Idle);
        assert_eq!(shell.view().piece_label.as_deref(), Some("Piece 2 of 5"));
    }

    #[test]
    fn test_safety_timeout_without_frames() {
        let mut shell = loaded_shell(5);
        let ticket = ticket_of(&shell.handle(ViewerEvent::Navigate(Direction::Left)));

        let effects = shell.handle(ViewerEvent::SafetyTimeout(ticket));
        assert_eq!(effects, vec![Effect::SetOrbitControls(true)]);
        assert!(!shell.transition().is_transitioning());
        assert_eq!(shell.view().piece_label.as_deref(), Some("Piece 5 of 5"));

        // A late timer for a finished transition does nothing
        assert!(shell.handle(ViewerEvent::SafetyTimeout(ticket)).is_empty());
    }

    #[test]
    fn test_select_and_deselect() {
        let mut shell = loaded_shell(2);
        let default_color = shell.view().pieces[0].color;

        let effects = shell.handle(pick(0));
        assert_eq!(effects, vec![Effect::SelectionChanged(Some("face_0".into()))]);
        let view = shell.view();
        assert_ne!(view.pieces[0].color, default_color);
        assert_eq!(view.marker_color, Some(Color::rgb(0x4d, 0x9a, 0xff)));
        assert_eq!(view.indicator.map(|i| i.position), Some([0.1, 0.2, 0.3]));
        let panel = view.selection.unwrap();
        assert_eq!(panel.title, "Selected Face");
        assert_eq!(panel.lines, vec!["ID: face_0", "Area: 12.35 mm²"]);
        assert_eq!(panel.footer, DESELECT_HINT);

        // Same triangle again: no change
        assert!(shell.handle(pick(1)).is_empty());
        assert_eq!(shell.selection().selected_id(), Some("face_0"));

        let effects = shell.handle(ViewerEvent::PickMissed);
        assert_eq!(effects, vec![Effect::SelectionChanged(None)]);
        let view = shell.view();
        assert!(view.selection.is_none());
        assert!(view.indicator.is_none());
        assert_eq!(view.pieces[0].color, default_color);
    }

    #[test]
    fn test_edge_panel() {
        let mut shell = ViewerShell::new(ViewerConfig::default());
        let edges = vec![Entity::new("edge_3", EntityKind::Edge, EntityMetadata::edge(5.0))];
        shell.handle(ViewerEvent::ModelsLoaded(LoadBatch::from_models(vec![model(0, edges)])));

        shell.handle(pick(7));
        let view = shell.view();
        let panel = view.selection.unwrap();
        assert_eq!(panel.title, "Selected Edge");
        assert_eq!(panel.lines, vec!["ID: edge_3", "Length: 5.00 mm"]);
        assert_eq!(view.marker_color, Some(Color::rgb(0xff, 0x4d, 0x9a)));
        assert!(!view.can_navigate_left);
    }

    #[test]
    fn test_pick_ignored_while_transitioning() {
        let mut shell = loaded_shell(3);
        shell.handle(pick(0));

        let effects = shell.handle(ViewerEvent::Navigate(Direction::Right));
        assert!(effects.contains(&Effect::SelectionChanged(None)));
        assert!(shell.handle(pick(3)).is_empty());
        assert!(shell.selection().is_empty());
    }

    #[test]
    fn test_pick_with_empty_catalog() {
        let mut shell = ViewerShell::new(ViewerConfig::default());
        shell.handle(ViewerEvent::ModelsLoaded(LoadBatch::from_models(vec![model(0, Vec::new())])));
        assert!(shell.handle(pick(0)).is_empty());
        assert!(shell.selection().is_empty());
    }

    #[test]
    fn test_pick_before_load() {
        let mut shell = ViewerShell::new(ViewerConfig::default());
        assert!(shell.handle(pick(0)).is_empty());
        assert!(shell.view().pieces.is_empty());
    }

    #[test]
    fn test_unmount_clears_and_ignores() {
        let mut shell = loaded_shell(3);
        shell.handle(pick(0));

        let effects = shell.handle(ViewerEvent::Unmount);
        assert_eq!(effects, vec![Effect::SelectionChanged(None)]);
        assert!(!shell.is_mounted());
        assert!(shell.handle(ViewerEvent::Navigate(Direction::Right)).is_empty());
        assert!(shell.handle(ViewerEvent::LoadStarted).is_empty());
        assert_eq!(shell.status(), LoadStatus::Success);
    }

    #[test]
    fn test_reload_mid_transition_restores_controls() {
        let mut shell = loaded_shell(5);
        shell.handle(ViewerEvent::Navigate(Direction::Right));

        let models = (0..2).map(|i| model(i, catalog())).collect();
        let effects = shell.handle(ViewerEvent::ModelsLoaded(LoadBatch::from_models(models)));
        assert_eq!(effects, vec![Effect::SetOrbitControls(true)]);
        assert_eq!(shell.view().piece_label.as_deref(), Some("Piece 1 of 2"));
    }
}
