// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tessellated shape views over truck output
//!
//! truck meshes every face of a shell into a `PolygonMesh` and every edge into
//! a polyline. These are copied into owned nalgebra buffers so the shape can
//! outlive the parsed table.

use nalgebra as na;
use rustc_hash::FxHashMap;
use step_viewer_model::{FaceTriangulation, KernelEdge, KernelFace, KernelShape};
use truck_meshalgo::prelude::*;

/// All faces and edges read from one file, shells in entity id order
#[derive(Debug, Default)]
pub struct TruckShape {
    pub(crate) faces: Vec<TruckFace>,
    pub(crate) edges: Vec<TruckEdge>,
}

impl KernelShape for TruckShape {
    fn is_null(&self) -> bool {
        self.faces.is_empty()
    }

    fn faces(&self) -> Box<dyn Iterator<Item = &dyn KernelFace> + '_> {
        Box::new(self.faces.iter().map(|f| f as &dyn KernelFace))
    }

    fn edges(&self) -> Box<dyn Iterator<Item = &dyn KernelEdge> + '_> {
        Box::new(self.edges.iter().map(|e| e as &dyn KernelEdge))
    }
}

/// Bit pattern of a node, exact lookup key for normals
type NodeKey = [u64; 3];

fn node_key(p: &na::Point3<f64>) -> NodeKey {
    [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]
}

/// One tessellated face
#[derive(Debug, Default)]
pub struct TruckFace {
    nodes: Vec<na::Point3<f64>>,
    triangles: Vec<[u32; 3]>,
    normals: FxHashMap<NodeKey, na::Vector3<f64>>,
    area: f64,
}

impl TruckFace {
    /// Copy an oriented face mesh, splitting quads and polygons into fans
    pub fn from_mesh(mesh: &PolygonMesh) -> Self {
        let nodes: Vec<na::Point3<f64>> = mesh
            .positions()
            .iter()
            .map(|p| na::Point3::new(p.x, p.y, p.z))
            .collect();
        let mesh_normals: Vec<na::Vector3<f64>> = mesh
            .normals()
            .iter()
            .map(|n| na::Vector3::new(n.x, n.y, n.z))
            .collect();

        let mut polygons: Vec<Vec<StandardVertex>> = Vec::new();
        polygons.extend(mesh.tri_faces().iter().map(|t| t.to_vec()));
        polygons.extend(mesh.quad_faces().iter().map(|q| q.to_vec()));
        polygons.extend(mesh.other_faces().iter().cloned());

        let mut face = TruckFace {
            nodes,
            ..Default::default()
        };
        for polygon in &polygons {
            for i in 1..polygon.len().saturating_sub(1) {
                face.push_triangle([polygon[0], polygon[i], polygon[i + 1]], &mesh_normals);
            }
        }
        face
    }

    fn push_triangle(&mut self, corners: [StandardVertex; 3], mesh_normals: &[na::Vector3<f64>]) {
        let (Some(a), Some(b), Some(c)) = (
            self.nodes.as_slice().get(corners[0].pos).copied(),
            self.nodes.as_slice().get(corners[1].pos).copied(),
            self.nodes.as_slice().get(corners[2].pos).copied(),
        ) else {
            return;
        };
        let cross = (b - a).cross(&(c - a));
        self.area += cross.norm() * 0.5;

        // Flat normal for corners the mesher left without one
        let flat = cross.try_normalize(f64::EPSILON).unwrap_or_else(na::Vector3::z);
        let keys = [node_key(&a), node_key(&b), node_key(&c)];
        for (corner, key) in corners.iter().zip(keys) {
            let normal = corner
                .nor
                .and_then(|i| mesh_normals.get(i))
                .copied()
                .unwrap_or(flat);
            self.normals.entry(key).or_insert(normal);
        }

        self.triangles.push(corners.map(|corner| corner.pos as u32));
    }
}

impl KernelFace for TruckFace {
    fn triangulation(&self) -> Option<FaceTriangulation> {
        (!self.triangles.is_empty()).then(|| FaceTriangulation {
            nodes: self.nodes.clone(),
            triangles: self.triangles.clone(),
            placement: None,
        })
    }

    fn surface_area(&self) -> f64 {
        self.area
    }

    fn normal_at(&self, point: &na::Point3<f64>) -> na::Vector3<f64> {
        if let Some(normal) = self.normals.get(&node_key(point)) {
            return *normal;
        }
        // Off-node query: use the closest node
        self.nodes
            .iter()
            .filter_map(|node| {
                let normal = self.normals.get(&node_key(node))?;
                Some(((node - point).norm_squared(), normal))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map_or_else(na::Vector3::z, |(_, normal)| *normal)
    }
}

/// One edge, kept as its tessellated polyline length
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TruckEdge {
    length: f64,
}

impl TruckEdge {
    pub fn from_polyline(points: &[Point3]) -> Self {
        let length = points
            .windows(2)
            .map(|w| {
                let (a, b) = (w[0], w[1]);
                na::Vector3::new(b.x - a.x, b.y - a.y, b.z - a.z).norm()
            })
            .sum();
        Self { length }
    }
}

impl KernelEdge for TruckEdge {
    fn length(&self) -> f64 {
        self.length
    }
}
