use std::{fs, path::Path};

use alphasort::{
    types::{Aabb, SortSettings},
    validate_settings, TransparencySorter, TriangleMesh,
};
use anyhow::Context;
use glam::{Mat4, Vec3};
use serde::Deserialize;

/// A scene file: sort settings, the objects and meshes to sort, and the
/// camera locations to sort them for.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    #[serde(default)]
    pub settings: SortSettings,
    #[serde(default)]
    pub objects: Vec<SceneObject>,
    #[serde(default)]
    pub meshes: Vec<SceneMesh>,
    pub cameras: Vec<SceneCamera>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneObject {
    pub name: String,
    pub min: Vec3,
    pub max: Vec3,
    #[serde(default)]
    pub translation: Vec3,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    #[serde(default)]
    pub translation: Vec3,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneCamera {
    pub location: Vec3,
    /// If set the camera is built from a view matrix looking at this point.
    pub target: Option<Vec3>,
}

impl SceneCamera {
    /// World -> view matrix looking at `target`, or `None` if the camera only
    /// has a location.
    pub fn view(&self) -> anyhow::Result<Option<Mat4>> {
        anyhow::ensure!(self.location.is_finite(), "Camera location {} is not finite", self.location);
        let Some(target) = self.target else {
            return Ok(None);
        };
        anyhow::ensure!(target.is_finite(), "Camera target {target} is not finite");

        let forward = target - self.location;
        anyhow::ensure!(
            forward.length_squared() > f32::EPSILON,
            "Camera at {} looks at its own location",
            self.location
        );
        // Looking straight up or down leaves Y with no sideways component.
        let up = if forward.normalize().cross(Vec3::Y).length_squared() > 1e-6 {
            Vec3::Y
        } else {
            Vec3::Z
        };

        Ok(Some(Mat4::look_at_rh(self.location, target, up)))
    }
}

impl Scene {
    pub fn parse(source: &str) -> anyhow::Result<Self> {
        toml::from_str(source).context("Failed to parse scene")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let source = fs::read_to_string(path).with_context(|| format!("Failed to read scene {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("Invalid scene {}", path.display()))
    }
}

/// Names of the scene's objects and meshes, indexed by handle.
#[derive(Debug, Default)]
pub struct SceneNames {
    pub objects: Vec<String>,
    pub meshes: Vec<String>,
}

/// Builds a sorter holding every object and mesh of the scene.
pub fn populate(scene: &Scene, settings: SortSettings) -> anyhow::Result<(TransparencySorter, SceneNames)> {
    profiling::scope!("populate");

    validate_settings(&settings).context("Invalid sort settings")?;
    let mut sorter = TransparencySorter::new(settings);
    let mut names = SceneNames::default();

    for object in &scene.objects {
        let bounds = Aabb::new(object.min, object.max).transform(Mat4::from_translation(object.translation));
        anyhow::ensure!(bounds.is_finite(), "Object {} has non-finite bounds", object.name);
        let handle = sorter.add_object(bounds);
        debug_assert_eq!(handle.idx, names.objects.len());
        names.objects.push(object.name.clone());
    }

    for mesh in &scene.meshes {
        anyhow::ensure!(
            mesh.translation.is_finite() && mesh.positions.iter().all(|p| p.is_finite()),
            "Mesh {} has non-finite positions",
            mesh.name
        );
        let triangle_mesh = TriangleMesh::new(mesh.positions.clone(), mesh.indices.clone())
            .with_context(|| format!("Mesh {} is invalid", mesh.name))?
            .with_transform(Mat4::from_translation(mesh.translation));
        let handle = sorter.add_mesh(triangle_mesh);
        debug_assert_eq!(handle.idx, names.meshes.len());
        names.meshes.push(mesh.name.clone());
    }

    log::info!(
        "Loaded {} objects and {} meshes",
        names.objects.len(),
        names.meshes.len()
    );

    Ok((sorter, names))
}
