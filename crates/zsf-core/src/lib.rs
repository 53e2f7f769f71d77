//! ZSF Core - Scene model and Zaphod Scene File export
//!
//! This crate provides everything needed to write a scene to disk in the
//! Zaphod Scene File (ZSF) layout:
//! - Scene model (materials, mesh/camera objects, transforms) loadable from TOML or JSON
//! - Manifest writer producing the line-oriented `.zsf` text format
//! - Pluggable geometry writers for the per-mesh `.obj` sidecar files
//! - Filename policies for deriving sidecar names from object names

pub mod export;
pub mod geometry;
pub mod manifest;
pub mod mesh;
pub mod naming;
pub mod scene;

pub use export::{export, ExportError, ExportOptions, ExportSummary, Exporter, LensRadiusSource};
pub use geometry::{EmptyGeometryWriter, GeometryFormat, GeometryWriter, ObjGeometryWriter};
pub use manifest::ManifestWriter;
pub use mesh::{Corner, MeshData, Polygon, Triangle, TriangleMesh};
pub use naming::{FilenamePolicy, UnsafeName};
pub use scene::{CameraData, Material, NodeTree, ObjectKind, Scene, SceneError, SceneObject, Transform, Vec3};
