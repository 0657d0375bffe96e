// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placeholder models shown in place of pieces that could not be loaded

use crate::primitives::{box_mesh, PlaceholderShape};
use step_viewer_model::{Entity, EntityKind, EntityMetadata, LoadError, Model};

/// Face records in a synthetic catalog
pub const PLACEHOLDER_FACE_COUNT: usize = 6;
/// Edge records in a synthetic catalog
pub const PLACEHOLDER_EDGE_COUNT: usize = 12;

const PLACEHOLDER_FACE_AREA: f64 = 4.0;
const PLACEHOLDER_FACE_TRIANGLES: u32 = 2;
const PLACEHOLDER_EDGE_LENGTH: f64 = 2.0;

/// Entity catalog of a placeholder piece: 6 faces followed by 12 edges
pub fn synthetic_catalog(piece_index: u32) -> Vec<Entity> {
    let faces = (0..PLACEHOLDER_FACE_COUNT).map(|i| {
        Entity::new(
            format!("face_{}_piece_{}", i, piece_index),
            EntityKind::Face,
            EntityMetadata::face(PLACEHOLDER_FACE_AREA, PLACEHOLDER_FACE_TRIANGLES)
                .with_piece_index(piece_index),
        )
    });
    let edges = (0..PLACEHOLDER_EDGE_COUNT).map(|i| {
        Entity::new(
            format!("edge_{}_piece_{}", i, piece_index),
            EntityKind::Edge,
            EntityMetadata::edge(PLACEHOLDER_EDGE_LENGTH).with_piece_index(piece_index),
        )
    });
    faces.chain(edges).collect()
}

/// Placeholder for a piece whose real geometry is unavailable
///
/// The form is chosen by `piece_index mod 5`, so the same path always maps to
/// the same shape.
pub fn placeholder_model(
    source_path: impl Into<String>,
    piece_index: u32,
    failure: Option<LoadError>,
) -> Model {
    Model {
        geometry: PlaceholderShape::for_piece(piece_index).mesh(),
        entities: synthetic_catalog(piece_index),
        source_path: source_path.into(),
        is_fallback: true,
        piece_index: Some(piece_index),
        failure,
    }
}

/// Placeholder for a path without a recognized CAD extension
///
/// A unit cube carrying a single error entity.
pub fn unsupported_model(source_path: impl Into<String>) -> Model {
    let source_path = source_path.into();
    let failure = LoadError::unsupported(&source_path);
    Model {
        geometry: box_mesh(1.0, 1.0, 1.0),
        entities: vec![Entity::new(
            "error_face",
            EntityKind::Error,
            EntityMetadata::error(failure.to_string()),
        )],
        source_path,
        is_fallback: true,
        piece_index: None,
        failure: Some(failure),
    }
}
