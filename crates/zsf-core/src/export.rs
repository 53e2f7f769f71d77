//! Scene export: one manifest plus one sidecar file per mesh object
//!
//! Export is a single linear pass over the scene:
//! 1. Every material, in scene order, becomes a `Material` block
//! 2. Every object, in scene order, becomes an `Object` (mesh), `Camera` or
//!    header-less block, always closed by its transform lines
//!
//! Sidecar files are written next to the manifest while the objects pass runs.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::geometry::{GeometryFormat, GeometryWriter};
use crate::manifest::ManifestWriter;
use crate::mesh::MeshData;
use crate::naming::{FilenamePolicy, UnsafeName};
use crate::scene::{CameraData, ObjectKind, Scene};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    UnsafeName(#[from] UnsafeName),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ExportError + '_ {
    move |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Where the `lense_radius` of a camera block comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LensRadiusSource {
    /// Every camera gets the aperture of the scene's active camera.
    /// Byte-compatible with manifests written by the legacy exporter.
    #[default]
    ActiveCamera,
    /// Each camera gets its own aperture
    PerObject,
}

/// User-facing export options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Sidecar body format
    #[serde(default)]
    pub geometry: GeometryFormat,
    #[serde(default)]
    pub lens_radius: LensRadiusSource,
    /// Sidecar file naming
    #[serde(default)]
    pub filenames: FilenamePolicy,
}

/// What an export produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub manifest: PathBuf,
    pub materials: usize,
    pub meshes: usize,
    pub cameras: usize,
    pub others: usize,
    /// Sidecar files in the order they were written
    pub sidecars: Vec<PathBuf>,
}

impl ExportSummary {
    pub fn objects(&self) -> usize {
        self.meshes + self.cameras + self.others
    }
}

/// Scene exporter configured with options and a geometry writer
pub struct Exporter {
    options: ExportOptions,
    geometry: Box<dyn GeometryWriter>,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(ExportOptions::default())
    }
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            geometry: options.geometry.writer(),
        }
    }

    /// Replace the sidecar writer selected by the options
    pub fn with_geometry_writer(mut self, writer: Box<dyn GeometryWriter>) -> Self {
        self.geometry = writer;
        self
    }

    /// Export `scene` to the manifest at `output_path`.
    ///
    /// Sidecar files go into the manifest's directory. Any I/O failure aborts the
    /// export; files already written are left in place.
    pub fn export(&self, scene: &Scene, output_path: &Path) -> Result<ExportSummary, ExportError> {
        let sidecar_dir = sidecar_dir(output_path);

        // Name policy failures must happen before the manifest is created
        for object in &scene.objects {
            if let ObjectKind::Mesh(_) = object.kind {
                self.options.filenames.file_name(&object.name)?;
            }
        }

        let file = File::create(output_path).map_err(io_error(output_path))?;
        let mut manifest = ManifestWriter::new(BufWriter::new(file));
        let mut summary = ExportSummary {
            manifest: output_path.to_path_buf(),
            ..ExportSummary::default()
        };

        for material in &scene.materials {
            manifest
                .write_material(material)
                .map_err(io_error(output_path))?;
            summary.materials += 1;
            debug!(material = %material.name, nodes = material.node_tree.nodes.len(), "Wrote material");
        }

        let active_camera = scene.active_camera_data();

        for object in &scene.objects {
            match &object.kind {
                ObjectKind::Mesh(mesh) => {
                    let file_name = self.options.filenames.file_name(&object.name)?;
                    manifest
                        .write_mesh_header(&object.name, &file_name, object.material.as_deref())
                        .map_err(io_error(output_path))?;

                    let sidecar = sidecar_dir.join(&file_name);
                    self.write_sidecar(&sidecar, mesh)?;
                    debug!(object = %object.name, path = %sidecar.display(), "Wrote mesh");
                    summary.sidecars.push(sidecar);
                    summary.meshes += 1;
                }
                ObjectKind::Camera(camera) => {
                    let lens_radius = self.lens_radius(&object.name, camera, active_camera);
                    manifest
                        .write_camera(&object.name, camera, lens_radius)
                        .map_err(io_error(output_path))?;
                    debug!(object = %object.name, lens_radius, "Wrote camera");
                    summary.cameras += 1;
                }
                ObjectKind::Other => {
                    debug!(object = %object.name, kind = object.kind.label(), "Writing transform only");
                    summary.others += 1;
                }
            }

            manifest
                .write_transform(&object.transform)
                .map_err(io_error(output_path))?;
        }

        manifest.flush().map_err(io_error(output_path))?;

        info!(
            path = %output_path.display(),
            materials = summary.materials,
            meshes = summary.meshes,
            cameras = summary.cameras,
            others = summary.others,
            "Exported scene"
        );

        Ok(summary)
    }

    fn lens_radius(&self, name: &str, camera: &CameraData, active: Option<&CameraData>) -> f64 {
        match self.options.lens_radius {
            LensRadiusSource::PerObject => camera.aperture_size,
            LensRadiusSource::ActiveCamera => match active {
                Some(active) => active.aperture_size,
                None => {
                    warn!(
                        camera = %name,
                        "Scene has no active camera, using the camera's own lens radius"
                    );
                    camera.aperture_size
                }
            },
        }
    }

    fn write_sidecar(&self, path: &Path, mesh: &MeshData) -> Result<(), ExportError> {
        let file = File::create(path).map_err(io_error(path))?;
        let mut out = BufWriter::new(file);
        let evaluated = mesh.triangulate();
        self.geometry
            .write_mesh(&mut out, &evaluated)
            .map_err(io_error(path))?;
        out.flush().map_err(io_error(path))
    }
}

/// Export with default options: legacy lens radius, empty sidecars, verbatim names
pub fn export(scene: &Scene, output_path: &Path) -> Result<ExportSummary, ExportError> {
    Exporter::default().export(scene, output_path)
}

/// Directory containing the manifest; sidecars are written here
fn sidecar_dir(output_path: &Path) -> PathBuf {
    match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Polygon;
    use crate::scene::{Material, SceneObject, Transform, Vec3};
    use tempfile::TempDir;

    fn triangle() -> MeshData {
        MeshData {
            vertices: vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)],
            polygons: vec![Polygon::from_indices(&[0, 1, 2])],
            ..MeshData::default()
        }
    }

    fn camera(aperture_size: f64) -> CameraData {
        CameraData {
            angle: 0.5,
            dof_distance: 4.0,
            aperture_size,
        }
    }

    fn sample_scene() -> Scene {
        let mut scene = Scene::new();
        scene.materials.push(Material::new("Red", "SHADER", &["Diffuse", "Output"]));
        scene.materials.push(Material::new("Glass", "SHADER", &["Glass BSDF"]));
        scene.objects.push(
            SceneObject::mesh("Cube", triangle())
                .with_material("Red")
                .with_transform(Transform::from_location(Vec3::new(1.0, 2.0, 3.0))),
        );
        scene.objects.push(SceneObject::camera("Main", camera(0.1)));
        scene.objects.push(SceneObject::other("Lamp"));
        scene.objects.push(SceneObject::camera("Side", camera(0.7)));
        scene.active_camera = Some("Main".to_string());
        scene
    }

    fn export_to_string(exporter: &Exporter, scene: &Scene) -> (TempDir, String) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.zsf");
        exporter.export(scene, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        (dir, content)
    }

    fn block_headers(manifest: &str) -> Vec<&str> {
        manifest
            .lines()
            .filter(|l| !l.is_empty() && !l.starts_with(' '))
            .collect()
    }

    #[test]
    fn test_empty_scene() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.zsf");

        let summary = export(&Scene::new(), &path).unwrap();

        assert_eq!(std::fs::read(&path).unwrap().len(), 0);
        assert_eq!(summary.objects(), 0);
        assert!(summary.sidecars.is_empty());
    }

    #[test]
    fn test_single_material() {
        let mut scene = Scene::new();
        scene.materials.push(Material::new("Red", "SHADER", &["Diffuse", "Output"]));

        let (_dir, content) = export_to_string(&Exporter::default(), &scene);
        assert_eq!(content, "Material Red \n  SHADER\n  Diffuse\n  Output\n\n");
    }

    #[test]
    fn test_single_mesh_without_material() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.zsf");
        let mut scene = Scene::new();
        scene.objects.push(
            SceneObject::mesh("Cube", triangle())
                .with_transform(Transform::from_location(Vec3::new(1.0, 2.0, 3.0))),
        );

        let summary = export(&scene, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Object Cube \n  file: Cube.obj \n  position: 1.000000 2.000000 3.000000 \n  \
             rotation: 0.000000 0.000000 0.000000 \n  scale: 1.000000 1.000000 1.000000 \n\n"
        );
        assert!(!content.contains("material:"));

        let sidecar = dir.path().join("Cube.obj");
        assert_eq!(summary.sidecars, vec![sidecar.clone()]);
        assert_eq!(std::fs::read(&sidecar).unwrap().len(), 0);
    }

    #[test]
    fn test_block_order_follows_scene_order() {
        let scene = sample_scene();
        let (_dir, content) = export_to_string(&Exporter::default(), &scene);

        assert_eq!(
            block_headers(&content),
            vec![
                "Material Red ",
                "Material Glass ",
                "Object Cube ",
                "Camera Main ",
                "Camera Side ",
            ]
        );
        // Header-less block for the lamp still carries its transform
        assert_eq!(content.matches("  position: ").count(), 4);
    }

    #[test]
    fn test_material_line_only_when_assigned() {
        let mut scene = sample_scene();
        scene.objects.push(SceneObject::mesh("Plain", triangle()));

        let (_dir, content) = export_to_string(&Exporter::default(), &scene);
        assert!(content.contains("Object Cube \n  file: Cube.obj \n  material: Red \n"));
        assert!(content.contains("Object Plain \n  file: Plain.obj \n  position: "));
        assert_eq!(content.matches("material:").count(), 1);
    }

    #[test]
    fn test_trailing_space_on_key_lines() {
        let (_dir, content) = export_to_string(&Exporter::default(), &sample_scene());

        for line in content.lines() {
            let is_node_tree_line = line.starts_with("  ") && !line.contains(": ");
            if line.is_empty() || is_node_tree_line {
                continue;
            }
            assert!(line.ends_with(' '), "missing trailing space: {:?}", line);
            assert!(!line.ends_with("  "), "extra trailing space: {:?}", line);
        }
    }

    #[test]
    fn test_export_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.zsf");
        let scene = sample_scene();

        export(&scene, &path).unwrap();
        let first = std::fs::read(&path).unwrap();
        export(&scene, &path).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_lens_radius_from_active_camera() {
        let (_dir, content) = export_to_string(&Exporter::default(), &sample_scene());
        assert_eq!(content.matches("  lense_radius: 0.100000 \n").count(), 2);
        assert!(!content.contains("0.700000"));
    }

    #[test]
    fn test_lens_radius_per_object() {
        let exporter = Exporter::new(ExportOptions {
            lens_radius: LensRadiusSource::PerObject,
            ..ExportOptions::default()
        });
        let (_dir, content) = export_to_string(&exporter, &sample_scene());
        assert!(content.contains("Camera Main \n  fov: 0.500000 \n  dof_distance: 4.000000 \n  lense_radius: 0.100000 \n"));
        assert!(content.contains("Camera Side \n  fov: 0.500000 \n  dof_distance: 4.000000 \n  lense_radius: 0.700000 \n"));
    }

    #[test]
    fn test_missing_active_camera_uses_own_lens_radius() {
        let mut scene = sample_scene();
        scene.active_camera = None;

        let (_dir, content) = export_to_string(&Exporter::default(), &scene);
        assert!(content.contains("lense_radius: 0.100000"));
        assert!(content.contains("lense_radius: 0.700000"));
    }

    #[test]
    fn test_obj_geometry_sidecar() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.zsf");
        let exporter = Exporter::new(ExportOptions {
            geometry: GeometryFormat::Obj,
            ..ExportOptions::default()
        });

        exporter.export(&sample_scene(), &path).unwrap();

        let obj = std::fs::read_to_string(dir.path().join("Cube.obj")).unwrap();
        assert!(obj.starts_with("v 0.000000 0.000000 0.000000\n"));
        assert!(obj.ends_with("f 1 2 3\n"));
    }

    #[test]
    fn test_custom_geometry_writer() {
        struct Marker;
        impl GeometryWriter for Marker {
            fn write_mesh(&self, out: &mut dyn Write, mesh: &crate::mesh::TriangleMesh) -> io::Result<()> {
                write!(out, "{} triangles", mesh.triangles.len())
            }
        }

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.zsf");
        let exporter = Exporter::default().with_geometry_writer(Box::new(Marker));

        exporter.export(&sample_scene(), &path).unwrap();

        let body = std::fs::read_to_string(dir.path().join("Cube.obj")).unwrap();
        assert_eq!(body, "1 triangles");
    }

    #[test]
    fn test_reject_policy_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.zsf");
        let mut scene = sample_scene();
        scene.objects.push(SceneObject::mesh("../escape", triangle()));
        let exporter = Exporter::new(ExportOptions {
            filenames: FilenamePolicy::Reject,
            ..ExportOptions::default()
        });

        let err = exporter.export(&scene, &path).unwrap_err();

        assert!(matches!(err, ExportError::UnsafeName(UnsafeName(ref n)) if n == "../escape"));
        assert!(!path.exists());
    }

    #[test]
    fn test_percent_encoded_sidecar_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.zsf");
        let mut scene = Scene::new();
        scene.objects.push(SceneObject::mesh("a/b", triangle()));
        let exporter = Exporter::new(ExportOptions {
            filenames: FilenamePolicy::PercentEncode,
            ..ExportOptions::default()
        });

        exporter.export(&scene, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Object a/b \n  file: a%2Fb.obj \n"));
        assert!(dir.path().join("a%2Fb.obj").exists());
    }

    #[test]
    fn test_unwritable_manifest_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("scene.zsf");

        let err = export(&sample_scene(), &path).unwrap_err();

        match err {
            ExportError::Io { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_unwritable_sidecar_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.zsf");
        let mut scene = Scene::new();
        scene.objects.push(SceneObject::mesh("nested/Cube", triangle()));

        let err = export(&scene, &path).unwrap_err();

        match err {
            ExportError::Io { path: failed, .. } => {
                assert_eq!(failed, dir.path().join("nested/Cube.obj"))
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_sidecar_dir_of_bare_file_name() {
        assert_eq!(sidecar_dir(Path::new("scene.zsf")), PathBuf::from("."));
        assert_eq!(sidecar_dir(Path::new("out/scene.zsf")), PathBuf::from("out"));
    }
}
