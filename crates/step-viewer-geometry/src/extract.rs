// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh extraction from kernel shapes
//!
//! Faces are flattened into an unindexed triangle soup: every triangle corner
//! becomes its own vertex, so per-face normals never bleed across edges.

use nalgebra::{Point3, Vector3};
use step_viewer_model::{
    Entity, EntityKind, EntityMetadata, KernelShape, LoadError, MeshData, Model, Result,
};

/// Convert a parsed kernel shape into a model
///
/// Faces are visited in kernel order; face `n` becomes entity `face_<n>`.
/// Faces without a usable triangulation are skipped but still consume their
/// ordinal. Edges become `edge_<n>` records and contribute no geometry.
///
/// Areas and lengths are passed through in kernel units.
pub fn extract_model(shape: &dyn KernelShape, source_path: &str) -> Result<Model> {
    if shape.is_null() {
        return Err(LoadError::parse(source_path, "kernel returned a null shape"));
    }

    let mut mesh = MeshData::new();
    let mut entities = Vec::new();
    let mut skipped = 0usize;

    for (face_index, face) in shape.faces().enumerate() {
        let triangulation = match face.triangulation() {
            Some(t) if !t.triangles.is_empty() => t,
            _ => {
                skipped += 1;
                continue;
            }
        };

        let placement = triangulation.effective_placement();
        let node_count = triangulation.nodes.len();

        for triangle in &triangulation.triangles {
            let mut corners = [0u32; 3];
            for (corner, &node_index) in corners.iter_mut().zip(triangle) {
                let node = triangulation.nodes.get(node_index as usize).ok_or_else(|| {
                    LoadError::parse(
                        source_path,
                        format!(
                            "face {} references node {} of {}",
                            face_index, node_index, node_count
                        ),
                    )
                })?;

                let normal = face.normal_at(node);
                let (position, normal) = match placement {
                    Some(m) => (m.transform_point(node), m.transform_vector(&normal)),
                    None => (*node, normal),
                };
                *corner = mesh.push_vertex(to_f32_point(&position), to_f32_unit(&normal));
            }
            mesh.push_triangle(corners[0], corners[1], corners[2]);
        }

        entities.push(Entity::new(
            format!("face_{}", face_index),
            EntityKind::Face,
            EntityMetadata::face(face.surface_area(), triangulation.triangle_count() as u32),
        ));
    }

    for (edge_index, edge) in shape.edges().enumerate() {
        entities.push(Entity::new(
            format!("edge_{}", edge_index),
            EntityKind::Edge,
            EntityMetadata::edge(edge.length()),
        ));
    }

    if skipped > 0 {
        log::debug!(
            "[Extract] {}: skipped {} faces without triangulation",
            source_path,
            skipped
        );
    }
    log::debug!(
        "[Extract] {}: {} vertices, {} triangles, {} entities",
        source_path,
        mesh.vertex_count(),
        mesh.triangle_count(),
        entities.len()
    );

    Ok(Model::new(mesh, entities, source_path))
}

fn to_f32_point(p: &Point3<f64>) -> [f32; 3] {
    [p.x as f32, p.y as f32, p.z as f32]
}

fn to_f32_unit(v: &Vector3<f64>) -> [f32; 3] {
    let n = v.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::z);
    [n.x as f32, n.y as f32, n.z as f32]
}
