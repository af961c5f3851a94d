use crate::error::ConvertError;
use crate::math::{Pose, inertia_from_components, rotate_inertia};
use crate::mjcf::{self, Body};
use crate::sdf::{FrameError, FrameGraph, Link, SemanticPose};

use super::{COLLISION_GEOM_GROUP, Converter, VISUAL_GEOM_GROUP, geometry, light, material, ns, sensor};

/// Resolves poses written inside a link into the link frame
pub(crate) struct LinkFrame<'a> {
    graph: &'a FrameGraph,
    link: &'a str,
    /// Link pose in the model frame
    pose: Pose,
}

impl<'a> LinkFrame<'a> {
    pub fn new(graph: &'a FrameGraph, link: &'a str, pose: Pose) -> Self {
        Self { graph, link, pose }
    }

    /// Pose of an element of this link, expressed in the link frame
    pub fn local(&self, pose: &SemanticPose) -> Result<Pose, FrameError> {
        match pose.relative_to.as_deref() {
            None => Ok(pose.pose),
            Some(frame) if frame == self.link => Ok(pose.pose),
            Some(_) => Ok(self.graph.resolve_in(pose, self.link)?.relative_to(&self.pose)),
        }
    }
}

/// Convert a link into a body placed at `body_pose` in its parent body.
///
/// Collisions come first (group 3), then visuals (group 0, non-colliding,
/// with a material), then sensors and lights.
pub(crate) fn add_link(
    cx: &mut Converter,
    link: &Link,
    body_pose: Pose,
    frame: &LinkFrame,
) -> Result<Body, ConvertError> {
    let mut body = Body::new(cx.names.claim(ns::BODY, &link.name));
    body.set_pose(body_pose);

    match &link.inertial {
        Some(inertial) if inertial.mass <= 0.0 => {
            tracing::warn!("Link '{}' has no mass, MuJoCo will infer it from the geoms", link.name);
        }
        Some(inertial) => {
            // MJCF gets the full tensor in the body frame, no orientation
            let moment = inertia_from_components(inertial.inertia);
            body.inertial = Some(mjcf::Inertial {
                pos: inertial.pose.position,
                mass: inertial.mass,
                inertia: rotate_inertia(inertial.pose.rotation, moment),
            });
        }
        None => {}
    }

    for collision in &link.collisions {
        let pose = frame.local(&collision.pose)?;
        if let Some(mut geom) = geometry::add_geometry(cx, &collision.name, &pose, &collision.geometry)? {
            geom.group = COLLISION_GEOM_GROUP;
            body.geoms.push(geom);
        }
    }

    for visual in &link.visuals {
        let pose = frame.local(&visual.pose)?;
        if let Some(mut geom) = geometry::add_geometry(cx, &visual.name, &pose, &visual.geometry)? {
            geom.group = VISUAL_GEOM_GROUP;
            geom.contype = 0;
            geom.conaffinity = 0;
            if let Some(sdf_material) = &visual.material {
                geom.material = Some(material::add_material(cx, &visual.name, sdf_material));
            }
            body.geoms.push(geom);
        }
    }

    for sdf_sensor in &link.sensors {
        let pose = frame.local(&sdf_sensor.pose)?;
        sensor::add_sensor(cx, &mut body, sdf_sensor, &pose);
    }

    for sdf_light in &link.lights {
        let pose = frame.local(&sdf_light.pose)?;
        body.lights.push(light::add_light(cx, sdf_light, pose));
    }

    tracing::debug!("Converted link '{}'", link.name);
    Ok(body)
}
