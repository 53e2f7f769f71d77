//! Geometry writers for mesh sidecar files
//!
//! The manifest only references sidecar files by name; their body is produced by
//! a [`GeometryWriter`]. The default writer leaves the sidecar empty, matching the
//! legacy exporter. [`ObjGeometryWriter`] emits Wavefront OBJ text.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};

use crate::manifest::Fixed;
use crate::mesh::TriangleMesh;

/// Serializes a triangulated mesh into a sidecar file
pub trait GeometryWriter {
    fn write_mesh(&self, out: &mut dyn Write, mesh: &TriangleMesh) -> io::Result<()>;
}

/// Creates the sidecar but writes no geometry
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyGeometryWriter;

impl GeometryWriter for EmptyGeometryWriter {
    fn write_mesh(&self, _out: &mut dyn Write, _mesh: &TriangleMesh) -> io::Result<()> {
        Ok(())
    }
}

/// Wavefront OBJ writer.
///
/// Emits `v`, `vt`, `vn`, an `s` smoothing line and 1-based triangle faces. A
/// face uses the `v/vt/vn` form only when all three corners carry both a uv and
/// a normal index, since readers of this format expect either all or none.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjGeometryWriter;

impl GeometryWriter for ObjGeometryWriter {
    fn write_mesh(&self, out: &mut dyn Write, mesh: &TriangleMesh) -> io::Result<()> {
        for v in &mesh.vertices {
            writeln!(out, "v {} {} {}", Fixed(v.x), Fixed(v.y), Fixed(v.z))?;
        }
        for uv in &mesh.uvs {
            writeln!(out, "vt {} {}", Fixed(uv[0]), Fixed(uv[1]))?;
        }
        for n in &mesh.normals {
            writeln!(out, "vn {} {} {}", Fixed(n.x), Fixed(n.y), Fixed(n.z))?;
        }
        writeln!(out, "s {}", if mesh.smooth { "1" } else { "off" })?;

        for tri in &mesh.triangles {
            let corners = &tri.0;
            let full: Option<Vec<(usize, usize, usize)>> = corners
                .iter()
                .map(|c| Some((c.vertex, c.uv?, c.normal?)))
                .collect();

            match full {
                Some(full) => {
                    write!(out, "f")?;
                    for (v, t, n) in full {
                        write!(out, " {}/{}/{}", v + 1, t + 1, n + 1)?;
                    }
                    writeln!(out)?;
                }
                None => writeln!(
                    out,
                    "f {} {} {}",
                    corners[0].vertex + 1,
                    corners[1].vertex + 1,
                    corners[2].vertex + 1
                )?,
            }
        }
        Ok(())
    }
}

/// Selectable sidecar body format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeometryFormat {
    /// Empty sidecar files
    #[default]
    Empty,
    /// Wavefront OBJ
    Obj,
}

impl GeometryFormat {
    pub fn writer(self) -> Box<dyn GeometryWriter> {
        match self {
            Self::Empty => Box::new(EmptyGeometryWriter),
            Self::Obj => Box::new(ObjGeometryWriter),
        }
    }
}
