use glam::DVec3;

use crate::error::ConvertError;
use crate::mjcf::{Geom, GeomKind, MjcfError};
use crate::sdf::{Collision, Geometry, SemanticPose, Visual};

use super::{Exporter, material, ns};

/// Shape of a geom. Capsules and cylinders given by `fromto` take the
/// segment length; their pose comes from [`Geom::frame`].
pub(crate) fn geom_to_sdf(cx: &Exporter, geom: &Geom) -> Result<Geometry, ConvertError> {
    let geometry = match geom.kind {
        GeomKind::Box => Geometry::Box {
            size: DVec3::from(geom.half_extents()) * 2.0,
        },
        GeomKind::Capsule => Geometry::Capsule {
            radius: geom.size_at(0),
            length: 2.0 * geom.half_length(),
        },
        GeomKind::Cylinder => Geometry::Cylinder {
            radius: geom.size_at(0),
            length: 2.0 * geom.half_length(),
        },
        GeomKind::Ellipsoid => Geometry::Ellipsoid {
            radii: DVec3::from(geom.half_extents()),
        },
        GeomKind::Sphere => Geometry::Sphere {
            radius: geom.size_at(0),
        },
        GeomKind::Plane => Geometry::Plane {
            normal: DVec3::Z,
            size: [geom.size_at(0) * 2.0, geom.size_at(1) * 2.0],
        },
        GeomKind::Mesh => {
            let name = geom.mesh.as_deref().unwrap_or_default();
            let mesh = cx.mujoco.assets.mesh(name).ok_or_else(|| MjcfError::BadValue {
                element: "geom".to_string(),
                attribute: "mesh".to_string(),
                reason: format!("no mesh asset named '{}'", name),
            })?;
            Geometry::Mesh {
                uri: mesh.file.clone(),
                scale: mesh.scale,
            }
        }
        GeomKind::Hfield | GeomKind::Sdf => {
            return Err(ConvertError::Unsupported(format!(
                "geom of type {}",
                geom.kind.as_str()
            )));
        }
    };
    Ok(geometry)
}

pub(crate) fn collision_to_sdf(cx: &mut Exporter, geom: &Geom) -> Result<Collision, ConvertError> {
    let name = match &geom.name {
        Some(name) => cx.names.claim(ns::COLLISION, &format!("collision_{}", name)),
        None => cx.names.next_unnamed(ns::COLLISION, "unnamed_collision"),
    };
    let mut collision = Collision::new(name, geom_to_sdf(cx, geom)?);
    collision.pose = SemanticPose::new(geom.frame());
    Ok(collision)
}

pub(crate) fn visual_to_sdf(cx: &mut Exporter, geom: &Geom) -> Result<Visual, ConvertError> {
    let name = match &geom.name {
        Some(name) => cx.names.claim(ns::VISUAL, &format!("visual_{}", name)),
        None => cx.names.next_unnamed(ns::VISUAL, "unnamed_visual"),
    };
    let mut visual = Visual::new(name, geom_to_sdf(cx, geom)?);
    visual.pose = SemanticPose::new(geom.frame());
    visual.material = Some(material::geom_material(cx, geom));
    Ok(visual)
}
