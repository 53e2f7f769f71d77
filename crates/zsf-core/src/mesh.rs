//! Mesh geometry snapshots and render-time triangulation

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scene::Vec3;

/// One polygon corner: a vertex index plus optional uv and normal indices.
///
/// Indices are 0-based into the owning mesh's arrays. In description files a
/// corner is either a bare vertex index or a `{ vertex, uv, normal }` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CornerRepr")]
pub struct Corner {
    pub vertex: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal: Option<usize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CornerRepr {
    Index(usize),
    Full {
        vertex: usize,
        #[serde(default)]
        uv: Option<usize>,
        #[serde(default)]
        normal: Option<usize>,
    },
}

impl From<CornerRepr> for Corner {
    fn from(repr: CornerRepr) -> Self {
        match repr {
            CornerRepr::Index(vertex) => Corner::new(vertex),
            CornerRepr::Full { vertex, uv, normal } => Corner { vertex, uv, normal },
        }
    }
}

impl Corner {
    pub fn new(vertex: usize) -> Self {
        Self {
            vertex,
            uv: None,
            normal: None,
        }
    }

    pub fn with_attributes(vertex: usize, uv: usize, normal: usize) -> Self {
        Self {
            vertex,
            uv: Some(uv),
            normal: Some(normal),
        }
    }
}

/// A polygon with three or more corners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon(pub Vec<Corner>);

impl Polygon {
    /// Polygon over plain vertex indices
    pub fn from_indices(indices: &[usize]) -> Self {
        Self(indices.iter().copied().map(Corner::new).collect())
    }

    pub fn corners(&self) -> &[Corner] {
        &self.0
    }
}

/// Polygonal mesh as stored in the scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    #[serde(default)]
    pub vertices: Vec<Vec3>,
    #[serde(default)]
    pub normals: Vec<Vec3>,
    #[serde(default)]
    pub uvs: Vec<[f64; 2]>,
    #[serde(default)]
    pub polygons: Vec<Polygon>,
    /// Smooth shading flag
    #[serde(default)]
    pub smooth: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle(pub [Corner; 3]);

/// Triangulated mesh, ready to be written to a sidecar file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<[f64; 2]>,
    pub triangles: Vec<Triangle>,
    pub smooth: bool,
}

impl MeshData {
    /// Evaluate the mesh for rendering: fan-triangulate every polygon.
    ///
    /// Polygons with fewer than three corners cannot be rendered and are dropped.
    pub fn triangulate(&self) -> TriangleMesh {
        let mut triangles = Vec::with_capacity(self.polygons.len());
        let mut dropped = 0usize;

        for polygon in &self.polygons {
            let corners = polygon.corners();
            if corners.len() < 3 {
                dropped += 1;
                continue;
            }
            for i in 1..corners.len() - 1 {
                triangles.push(Triangle([corners[0], corners[i], corners[i + 1]]));
            }
        }

        if dropped > 0 {
            debug!(dropped, "Dropped degenerate polygons during triangulation");
        }

        TriangleMesh {
            vertices: self.vertices.clone(),
            normals: self.normals.clone(),
            uvs: self.uvs.clone(),
            triangles,
            smooth: self.smooth,
        }
    }
}
