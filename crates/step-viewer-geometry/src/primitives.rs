// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placeholder primitive meshes
//!
//! Each generator returns indexed mesh buffers with outward-facing,
//! unit-length normals and counter-clockwise winding.

use nalgebra::{Point3, Vector3};
use std::f64::consts::{PI, TAU};
use step_viewer_model::MeshData;

/// The five canonical placeholder forms
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceholderShape {
    Box,
    Sphere,
    Cylinder,
    Torus,
    Cone,
}

impl PlaceholderShape {
    /// Pick a form from a piece index (`index mod 5`)
    pub fn for_piece(piece_index: u32) -> Self {
        match piece_index % 5 {
            0 => PlaceholderShape::Box,
            1 => PlaceholderShape::Sphere,
            2 => PlaceholderShape::Cylinder,
            3 => PlaceholderShape::Torus,
            _ => PlaceholderShape::Cone,
        }
    }

    /// Build the mesh at its canonical size
    pub fn mesh(&self) -> MeshData {
        match self {
            PlaceholderShape::Box => box_mesh(2.0, 2.0, 2.0),
            PlaceholderShape::Sphere => sphere_mesh(1.2, 16, 16),
            PlaceholderShape::Cylinder => cylinder_mesh(1.0, 1.0, 2.0, 16),
            PlaceholderShape::Torus => torus_mesh(1.0, 0.4, 16, 32),
            PlaceholderShape::Cone => cone_mesh(1.2, 2.0, 16),
        }
    }
}

fn push(mesh: &mut MeshData, position: Point3<f64>, normal: Vector3<f64>) -> u32 {
    let n = normal.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::y);
    mesh.push_vertex(
        [position.x as f32, position.y as f32, position.z as f32],
        [n.x as f32, n.y as f32, n.z as f32],
    )
}

/// Axis-aligned box centered at the origin
pub fn box_mesh(width: f64, height: f64, depth: f64) -> MeshData {
    let half = Vector3::new(width / 2.0, height / 2.0, depth / 2.0);
    // (normal, u, v) with u x v == normal
    let sides = [
        (Vector3::x(), Vector3::y(), Vector3::z()),
        (-Vector3::x(), Vector3::z(), Vector3::y()),
        (Vector3::y(), Vector3::z(), Vector3::x()),
        (-Vector3::y(), Vector3::x(), Vector3::z()),
        (Vector3::z(), Vector3::x(), Vector3::y()),
        (-Vector3::z(), Vector3::y(), Vector3::x()),
    ];

    let mut mesh = MeshData::with_capacity(24, 36);
    for (normal, u, v) in sides {
        let center = Point3::from(normal.component_mul(&half));
        let u = u.component_mul(&half);
        let v = v.component_mul(&half);

        let a = push(&mut mesh, center - u - v, normal);
        let b = push(&mut mesh, center + u - v, normal);
        let c = push(&mut mesh, center + u + v, normal);
        let d = push(&mut mesh, center - u + v, normal);
        mesh.push_triangle(a, b, c);
        mesh.push_triangle(a, c, d);
    }
    mesh
}

/// UV sphere centered at the origin
pub fn sphere_mesh(radius: f64, width_segments: u32, height_segments: u32) -> MeshData {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let row = width_segments + 1;

    let mut mesh = MeshData::with_capacity(
        (row * (height_segments + 1)) as usize,
        (width_segments * height_segments * 6) as usize,
    );

    for iy in 0..=height_segments {
        let v = iy as f64 / height_segments as f64;
        for ix in 0..=width_segments {
            let u = ix as f64 / width_segments as f64;
            let direction = Vector3::new(
                -(u * TAU).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * TAU).sin() * (v * PI).sin(),
            );
            push(&mut mesh, Point3::from(direction * radius), direction);
        }
    }

    // Pole rows collapse to a point, so only one triangle per quad is kept there
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                mesh.push_triangle(a, b, d);
            }
            if iy != height_segments - 1 {
                mesh.push_triangle(b, c, d);
            }
        }
    }
    mesh
}

/// Capped cylinder (or frustum) along the Y axis, centered at the origin
///
/// A zero radius drops the corresponding cap.
pub fn cylinder_mesh(
    radius_top: f64,
    radius_bottom: f64,
    height: f64,
    radial_segments: u32,
) -> MeshData {
    let radial_segments = radial_segments.max(3);
    let half_height = height / 2.0;
    let slope = (radius_bottom - radius_top) / height;
    let row = radial_segments + 1;

    let mut mesh = MeshData::new();

    // Side wall: top ring then bottom ring
    for (radius, y) in [(radius_top, half_height), (radius_bottom, -half_height)] {
        for x in 0..=radial_segments {
            let theta = x as f64 / radial_segments as f64 * TAU;
            let (sin, cos) = theta.sin_cos();
            push(
                &mut mesh,
                Point3::new(radius * sin, y, radius * cos),
                Vector3::new(sin, slope, cos),
            );
        }
    }
    for x in 0..radial_segments {
        let a = x;
        let b = row + x;
        let c = row + x + 1;
        let d = x + 1;
        mesh.push_triangle(a, b, d);
        mesh.push_triangle(b, c, d);
    }

    for (radius, y, top) in [
        (radius_top, half_height, true),
        (radius_bottom, -half_height, false),
    ] {
        if radius <= 0.0 {
            continue;
        }
        let normal = if top { Vector3::y() } else { -Vector3::y() };
        let center = push(&mut mesh, Point3::new(0.0, y, 0.0), normal);
        for x in 0..=radial_segments {
            let theta = x as f64 / radial_segments as f64 * TAU;
            let (sin, cos) = theta.sin_cos();
            push(&mut mesh, Point3::new(radius * sin, y, radius * cos), normal);
        }
        for x in 0..radial_segments {
            let current = center + 1 + x;
            let next = current + 1;
            if top {
                mesh.push_triangle(center, current, next);
            } else {
                mesh.push_triangle(center, next, current);
            }
        }
    }
    mesh
}

/// Cone along the Y axis with its apex at +height/2
pub fn cone_mesh(radius: f64, height: f64, radial_segments: u32) -> MeshData {
    cylinder_mesh(0.0, radius, height, radial_segments)
}

/// Torus in the XY plane around the Z axis
pub fn torus_mesh(radius: f64, tube: f64, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let radial_segments = radial_segments.max(3);
    let tubular_segments = tubular_segments.max(3);
    let row = tubular_segments + 1;

    let mut mesh = MeshData::with_capacity(
        (row * (radial_segments + 1)) as usize,
        (radial_segments * tubular_segments * 6) as usize,
    );

    for j in 0..=radial_segments {
        let v = j as f64 / radial_segments as f64 * TAU;
        for i in 0..=tubular_segments {
            let u = i as f64 / tubular_segments as f64 * TAU;
            let position = Point3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let ring_center = Point3::new(radius * u.cos(), radius * u.sin(), 0.0);
            push(&mut mesh, position, position - ring_center);
        }
    }

    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            mesh.push_triangle(a, b, d);
            mesh.push_triangle(b, c, d);
        }
    }
    mesh
}
