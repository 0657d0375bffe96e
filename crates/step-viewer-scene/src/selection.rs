// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pick resolution and selection state

use crate::config::{Color, SelectionConfig};
use step_viewer_model::{Entity, EntityKind};

/// Map a picked triangle to a catalog entity
///
/// This is an approximation: no triangle-to-face table exists, so the
/// ordinal `triangle_index / 3` is wrapped onto the face entities (or onto
/// all entities when the catalog has no faces). Returns `None` only for an
/// empty catalog.
pub fn resolve_pick(triangle_index: u32, entities: &[Entity]) -> Option<&Entity> {
    if entities.is_empty() {
        return None;
    }
    let ordinal = (triangle_index / 3) as usize;

    let face_count = entities.iter().filter(|e| e.is_face()).count();
    if face_count > 0 {
        entities
            .iter()
            .filter(|e| e.is_face())
            .nth(ordinal % face_count)
    } else {
        entities.get(ordinal % entities.len())
    }
}

/// Small marker shown where the last pick hit
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PickIndicator {
    pub position: [f32; 3],
    pub visible: bool,
}

/// Currently selected entity and the highlight state derived from it
#[derive(Clone, Debug)]
pub struct Selection {
    config: SelectionConfig,
    selected: Option<Entity>,
    indicator: PickIndicator,
}

impl Selection {
    pub fn new(config: SelectionConfig) -> Self {
        Self {
            config,
            selected: None,
            indicator: PickIndicator::default(),
        }
    }

    pub fn selected(&self) -> Option<&Entity> {
        self.selected.as_ref()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_ref().map(|e| e.id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_none()
    }

    /// Material color of the current piece
    pub fn highlight_color(&self) -> Color {
        if self.selected.is_some() {
            self.config.selected_color
        } else {
            self.config.default_color
        }
    }

    /// Marker color for the selected entity's kind
    pub fn marker_color(&self) -> Option<Color> {
        self.selected.as_ref().map(|e| match e.kind {
            EntityKind::Face => self.config.face_marker_color,
            EntityKind::Edge | EntityKind::Error => self.config.edge_marker_color,
        })
    }

    pub fn indicator(&self) -> &PickIndicator {
        &self.indicator
    }

    pub fn indicator_color(&self) -> Color {
        self.config.indicator_color
    }

    /// Select an entity hit at `world_point`
    ///
    /// Returns whether the selected id changed.
    pub fn select(&mut self, entity: &Entity, world_point: [f32; 3]) -> bool {
        let changed = self.selected_id() != Some(entity.id.as_str());
        self.selected = Some(entity.clone());
        self.indicator = PickIndicator {
            position: world_point,
            visible: true,
        };
        changed
    }

    /// Drop the selection and hide the indicator
    ///
    /// Returns whether anything was selected.
    pub fn clear(&mut self) -> bool {
        self.indicator.visible = false;
        self.selected.take().is_some()
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new(SelectionConfig::default())
    }
}
