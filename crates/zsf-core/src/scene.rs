//! Scene model consumed by the exporter
//!
//! A [`Scene`] is an ordered list of materials and an ordered list of objects.
//! Order is insertion order and is preserved verbatim in the exported manifest.
//! Scenes can be built in code or loaded from a TOML/JSON scene description.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::mesh::MeshData;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML scene: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Failed to parse JSON scene: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Unsupported scene description format: {0}")]
    UnsupportedFormat(String),
}

/// Three-component float vector, stored as `[x, y, z]` in description files
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

/// Object transform: location, Euler rotation (radians) and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(default)]
    pub location: Vec3,
    #[serde(default)]
    pub rotation_euler: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            location: Vec3::ZERO,
            rotation_euler: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Transform at `location` with no rotation and unit scale
    pub fn from_location(location: Vec3) -> Self {
        Self {
            location,
            ..Self::default()
        }
    }
}

/// Shader graph of a material, reduced to its type tag and node names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeTree {
    /// Node tree type tag (e.g., "SHADER")
    #[serde(rename = "type")]
    pub tree_type: String,
    /// Node names in graph order
    #[serde(default)]
    pub nodes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    #[serde(default)]
    pub node_tree: NodeTree,
}

impl Material {
    pub fn new(name: impl Into<String>, tree_type: impl Into<String>, nodes: &[&str]) -> Self {
        Self {
            name: name.into(),
            node_tree: NodeTree {
                tree_type: tree_type.into(),
                nodes: nodes.iter().map(|n| n.to_string()).collect(),
            },
        }
    }
}

/// Camera parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraData {
    /// Field of view in radians
    pub angle: f64,
    /// Depth-of-field focus distance
    #[serde(default)]
    pub dof_distance: f64,
    /// Render-engine aperture size (lens radius)
    #[serde(default)]
    pub aperture_size: f64,
}

/// Type-specific payload of a scene object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectKind {
    Mesh(MeshData),
    Camera(CameraData),
    /// Lights, empties, curves and anything else without an exported payload
    #[default]
    Other,
}

impl ObjectKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mesh(_) => "mesh",
            Self::Camera(_) => "camera",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(default)]
    pub transform: Transform,
    /// Name of the assigned material, if any
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub kind: ObjectKind,
}

impl SceneObject {
    pub fn mesh(name: impl Into<String>, mesh: MeshData) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            material: None,
            kind: ObjectKind::Mesh(mesh),
        }
    }

    pub fn camera(name: impl Into<String>, camera: CameraData) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            material: None,
            kind: ObjectKind::Camera(camera),
        }
    }

    pub fn other(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            material: None,
            kind: ObjectKind::Other,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    pub fn camera_data(&self) -> Option<&CameraData> {
        match &self.kind {
            ObjectKind::Camera(cam) => Some(cam),
            _ => None,
        }
    }
}

/// Root scene document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default, rename = "material")]
    pub materials: Vec<Material>,
    #[serde(default, rename = "object")]
    pub objects: Vec<SceneObject>,
    /// Name of the scene's active camera object
    #[serde(default)]
    pub active_camera: Option<String>,
}

impl Scene {
    /// Create a new empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a scene description from TOML
    pub fn from_toml(content: &str) -> Result<Self, SceneError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse a scene description from JSON
    pub fn from_json(content: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a scene description, picking the parser from the file extension
    pub fn from_file(path: &Path) -> Result<Self, SceneError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("toml") => Self::from_toml(&std::fs::read_to_string(path)?),
            Some("json") => Self::from_json(&std::fs::read_to_string(path)?),
            _ => Err(SceneError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn find_object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// Camera parameters of the active camera, if it names a camera object
    pub fn active_camera_data(&self) -> Option<&CameraData> {
        self.active_camera
            .as_deref()
            .and_then(|name| self.find_object(name))
            .and_then(SceneObject::camera_data)
    }
}
