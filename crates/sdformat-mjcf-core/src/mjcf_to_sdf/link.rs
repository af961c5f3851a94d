use crate::error::ConvertError;
use crate::math::{Pose, inertia_components};
use crate::mjcf::{self, Body, body_inertial};
use crate::sdf::{Frame, Inertial, Link, Model, SemanticPose};

use super::{Exporter, geometry, light, ns, sensor};

/// A converted body: its link plus the frames made from its free sites
pub(crate) struct LinkOutput {
    pub link: Link,
    pub frames: Vec<Frame>,
}

impl LinkOutput {
    pub fn add_to(self, model: &mut Model) {
        model.links.push(self.link);
        model.frames.extend(self.frames);
    }
}

/// Convert a body into a link posed at `pose` in the model frame.
///
/// Every geom yields a collision, a visual or both. Sites read by sensors
/// become SDFormat sensors, the remaining sites become frames attached to
/// the link.
pub(crate) fn body_to_link(
    cx: &mut Exporter,
    body: &Body,
    link_name: &str,
    pose: Pose,
    with_inertial: bool,
) -> Result<LinkOutput, ConvertError> {
    let mujoco = cx.mujoco;
    let mut link = Link::new(link_name);
    link.pose = SemanticPose::new(pose);

    if with_inertial
        && let Some(inertial) =
            body_inertial(body, cx.config.default_density, mujoco.compiler.inertiafromgeom)
    {
        link.inertial = Some(Inertial {
            pose: Pose::from_position(inertial.pos),
            mass: inertial.mass,
            inertia: inertia_components(&inertial.inertia),
        });
    }

    for geom in &body.geoms {
        if !geom.is_visual_only() {
            link.collisions.push(geometry::collision_to_sdf(cx, geom)?);
        }
        if !geom.is_collision_only() {
            link.visuals.push(geometry::visual_to_sdf(cx, geom)?);
        }
    }

    let mut frames = Vec::new();
    for site in &body.sites {
        let readers: Vec<&mjcf::Sensor> = match &site.name {
            Some(name) => mujoco.sensors.iter().filter(|s| &s.site == name).collect(),
            None => Vec::new(),
        };
        if readers.is_empty() {
            let name = match &site.name {
                Some(name) => cx.names.claim(ns::FRAME, name),
                None => cx.names.next_unnamed(ns::FRAME, "unnamed_site"),
            };
            frames.push(Frame {
                name,
                attached_to: Some(link_name.to_string()),
                pose: SemanticPose::relative_to(site.pose(), link_name),
            });
        } else {
            link.sensors.extend(sensor::site_sensors_to_sdf(cx, site, &readers));
        }
    }

    for camera in &body.cameras {
        link.sensors.push(sensor::camera_to_sdf(cx, camera));
    }
    for mj_light in &body.lights {
        link.lights.push(light::light_to_sdf(cx, mj_light));
    }

    Ok(LinkOutput { link, frames })
}
