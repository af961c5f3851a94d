use std::path::Path;

use glam::DVec3;

use crate::error::ConvertError;
use crate::math::{Pose, quat_from_z_to};
use crate::mjcf::{Geom, GeomKind, MeshAsset};
use crate::sdf::Geometry;

use super::{Converter, ns};

/// Mesh formats MuJoCo can load
const MESH_EXTENSIONS: &[&str] = &["stl", "obj", "msh"];

/// Convert a visual or collision shape into a geom at `pose` (link frame).
///
/// Empty geometry produces no geom.
pub(crate) fn add_geometry(
    cx: &mut Converter,
    name: &str,
    pose: &Pose,
    geometry: &Geometry,
) -> Result<Option<Geom>, ConvertError> {
    let mut rotation = pose.rotation;
    let mut geom = match geometry {
        Geometry::Empty => return Ok(None),
        Geometry::Box { size } => Geom::new(GeomKind::Box, (*size / 2.0).to_array().to_vec()),
        Geometry::Capsule { radius, length } => Geom::new(GeomKind::Capsule, vec![*radius, length / 2.0]),
        Geometry::Cylinder { radius, length } => Geom::new(GeomKind::Cylinder, vec![*radius, length / 2.0]),
        Geometry::Ellipsoid { radii } => Geom::new(GeomKind::Ellipsoid, radii.to_array().to_vec()),
        Geometry::Sphere { radius } => Geom::new(GeomKind::Sphere, vec![*radius]),
        Geometry::Plane { normal, size } => {
            // MuJoCo planes face +Z
            rotation = pose.rotation * quat_from_z_to(*normal);
            Geom::new(
                GeomKind::Plane,
                vec![size[0] / 2.0, size[1] / 2.0, cx.config.plane_grid_spacing],
            )
        }
        Geometry::Mesh { uri, scale } => {
            let mut geom = Geom::new(GeomKind::Mesh, Vec::new());
            geom.mesh = Some(add_mesh_asset(cx, uri, *scale)?);
            geom
        }
    };

    geom.name = Some(cx.names.claim(ns::GEOM, name));
    geom.pos = pose.position;
    geom.quat = rotation;
    Ok(Some(geom))
}

/// Register a mesh asset for `uri`, reusing one with the same file and scale
fn add_mesh_asset(cx: &mut Converter, uri: &str, scale: DVec3) -> Result<String, ConvertError> {
    let file = mesh_file(uri)?;

    if let Some(existing) = cx
        .assets
        .meshes
        .iter()
        .find(|mesh| mesh.file == file && mesh.scale == scale)
    {
        return Ok(existing.name.clone());
    }

    let stem = Path::new(&file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mesh");
    let name = cx.names.claim(ns::MESH, stem);
    cx.assets.meshes.push(MeshAsset {
        name: name.clone(),
        file,
        scale,
    });
    Ok(name)
}

/// Local file path of a mesh URI
fn mesh_file(uri: &str) -> Result<String, ConvertError> {
    let path = match uri.strip_prefix("file://") {
        Some(path) => path,
        None if uri.contains("://") => {
            return Err(ConvertError::Unsupported(format!(
                "mesh URI '{}'; only local files can be referenced",
                uri
            )));
        }
        None => uri,
    };

    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !MESH_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ConvertError::Unsupported(format!(
            "mesh '{}'; MuJoCo loads {} files",
            path,
            MESH_EXTENSIONS.join(", ")
        )));
    }
    Ok(path.to_string())
}
