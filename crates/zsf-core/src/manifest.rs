//! ZSF manifest text format
//!
//! The manifest is a sequence of blocks. Each block starts with a header line
//! `<Kind> <name> ` followed by indented lines and ends with a blank line:
//!
//! ```text
//! Material Red
//!   SHADER
//!   Diffuse
//!
//! Object Cube
//!   file: Cube.obj
//!   material: Red
//!   position: 1.000000 2.000000 3.000000
//!   rotation: 0.000000 0.000000 0.000000
//!   scale: 1.000000 1.000000 1.000000
//! ```
//!
//! Header and key/value lines end with a single space before the newline;
//! material node-tree lines do not. Floats use `%f` notation (6 decimals).

use std::fmt;
use std::io::{self, Write};

use crate::scene::{CameraData, Material, Transform, Vec3};

/// Float formatted like C `printf("%f")`: fixed, 6 decimals, `nan`/`inf` spelled out
#[derive(Debug, Clone, Copy)]
pub struct Fixed(pub f64);

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v.is_nan() {
            f.write_str("nan")
        } else if v.is_infinite() {
            f.write_str(if v > 0.0 { "inf" } else { "-inf" })
        } else {
            write!(f, "{:.6}", v)
        }
    }
}

struct Triple(Vec3);

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", Fixed(self.0.x), Fixed(self.0.y), Fixed(self.0.z))
    }
}

/// Writes manifest blocks to an underlying writer
pub struct ManifestWriter<W: Write> {
    inner: W,
}

impl<W: Write> ManifestWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Material block, including its terminating blank line
    pub fn write_material(&mut self, material: &Material) -> io::Result<()> {
        writeln!(self.inner, "Material {} ", material.name)?;
        writeln!(self.inner, "  {}", material.node_tree.tree_type)?;
        for node in &material.node_tree.nodes {
            writeln!(self.inner, "  {}", node)?;
        }
        writeln!(self.inner)
    }

    /// Header lines of a mesh object; the transform follows separately
    pub fn write_mesh_header(
        &mut self,
        name: &str,
        file_name: &str,
        material: Option<&str>,
    ) -> io::Result<()> {
        writeln!(self.inner, "Object {} ", name)?;
        writeln!(self.inner, "  file: {} ", file_name)?;
        if let Some(material) = material {
            writeln!(self.inner, "  material: {} ", material)?;
        }
        Ok(())
    }

    /// Header lines of a camera object; the transform follows separately
    pub fn write_camera(&mut self, name: &str, camera: &CameraData, lens_radius: f64) -> io::Result<()> {
        writeln!(self.inner, "Camera {} ", name)?;
        writeln!(self.inner, "  fov: {} ", Fixed(camera.angle))?;
        writeln!(self.inner, "  dof_distance: {} ", Fixed(camera.dof_distance))?;
        writeln!(self.inner, "  lense_radius: {} ", Fixed(lens_radius))
    }

    /// Shared transform lines closing every object block
    pub fn write_transform(&mut self, transform: &Transform) -> io::Result<()> {
        writeln!(self.inner, "  position: {} ", Triple(transform.location))?;
        writeln!(self.inner, "  rotation: {} ", Triple(transform.rotation_euler))?;
        writeln!(self.inner, "  scale: {} ", Triple(transform.scale))?;
        writeln!(self.inner)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
