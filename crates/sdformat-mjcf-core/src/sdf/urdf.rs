//! URDF import
//!
//! Reads a URDF robot into an SDFormat model, the same way libsdformat
//! accepts URDF files: link frames sit at their parent joint origin and
//! joint frames coincide with their child link.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use glam::DVec3;

use crate::math::Pose;

use super::{
    Collision, Geometry, Inertial, Joint, JointAxis, JointKind, Link, Material, Model,
    SemanticPose, Visual,
};

/// Errors that can occur during URDF import
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrdfError {
    #[error("Failed to parse URDF: {0}")]
    Parse(String),

    #[error("Link not found: {0}")]
    LinkNotFound(String),

    #[error("Empty URDF: no links defined")]
    Empty,

    #[error("Unsupported URDF joint '{name}' of type {kind}")]
    UnsupportedJoint { name: String, kind: String },
}

/// Import a URDF file as a model
pub fn model_from_urdf(path: &Path) -> Result<Model, UrdfError> {
    let robot = urdf_rs::read_file(path).map_err(|e| UrdfError::Parse(e.to_string()))?;
    convert_robot(&robot)
}

/// Import URDF text as a model
pub fn model_from_urdf_str(xml: &str) -> Result<Model, UrdfError> {
    let robot = urdf_rs::read_from_string(xml).map_err(|e| UrdfError::Parse(e.to_string()))?;
    convert_robot(&robot)
}

fn convert_robot(robot: &urdf_rs::Robot) -> Result<Model, UrdfError> {
    if robot.links.is_empty() {
        return Err(UrdfError::Empty);
    }

    // Collect materials
    let material_colors: HashMap<&str, [f64; 4]> = robot
        .materials
        .iter()
        .filter_map(|m| m.color.as_ref().map(|c| (m.name.as_str(), c.rgba.0)))
        .collect();

    let link_names: HashSet<&str> = robot.links.iter().map(|l| l.name.as_str()).collect();
    for joint in &robot.joints {
        for name in [&joint.parent.link, &joint.child.link] {
            if !link_names.contains(name.as_str()) {
                return Err(UrdfError::LinkNotFound(name.clone()));
            }
        }
    }

    let link_poses = resolve_link_poses(robot);

    let mut model = Model::new(robot.name.as_str());
    for urdf_link in &robot.links {
        let mut link = Link::new(urdf_link.name.as_str());
        link.pose = SemanticPose::new(
            link_poses
                .get(urdf_link.name.as_str())
                .copied()
                .unwrap_or(Pose::IDENTITY),
        );
        // urdf-rs reports a missing <inertial> as mass 0
        if urdf_link.inertial.mass.value > 0.0 {
            link.inertial = Some(convert_inertial(&urdf_link.inertial));
        }

        for (index, visual) in urdf_link.visual.iter().enumerate() {
            let name = visual
                .name
                .clone()
                .unwrap_or_else(|| format!("visual_{}", index));
            let mut sdf_visual = Visual::new(name, convert_geometry(&visual.geometry));
            sdf_visual.pose = SemanticPose::new(convert_pose(&visual.origin));
            sdf_visual.material = visual.material.as_ref().and_then(|m| {
                m.color
                    .as_ref()
                    .map(|c| c.rgba.0)
                    .or_else(|| material_colors.get(m.name.as_str()).copied())
                    .map(|rgba| Material {
                        ambient: rgba,
                        diffuse: rgba,
                        ..Default::default()
                    })
            });
            link.visuals.push(sdf_visual);
        }

        for (index, collision) in urdf_link.collision.iter().enumerate() {
            let name = collision
                .name
                .clone()
                .unwrap_or_else(|| format!("collision_{}", index));
            let mut sdf_collision = Collision::new(name, convert_geometry(&collision.geometry));
            sdf_collision.pose = SemanticPose::new(convert_pose(&collision.origin));
            link.collisions.push(sdf_collision);
        }

        model.links.push(link);
    }

    for urdf_joint in &robot.joints {
        if let Some(joint) = convert_joint(urdf_joint)? {
            model.joints.push(joint);
        }
    }

    tracing::debug!(
        "Imported URDF '{}' with {} links and {} joints",
        model.name,
        model.links.len(),
        model.joints.len()
    );
    Ok(model)
}

/// Link poses in the model frame; roots sit at the origin
fn resolve_link_poses(robot: &urdf_rs::Robot) -> HashMap<&str, Pose> {
    let mut parent_joint: HashMap<&str, &urdf_rs::Joint> = HashMap::new();
    for joint in &robot.joints {
        parent_joint.insert(joint.child.link.as_str(), joint);
    }

    let mut poses: HashMap<&str, Pose> = HashMap::new();
    for link in &robot.links {
        // Walk up to the root, then compose origins back down
        let mut chain = Vec::new();
        let mut current = link.name.as_str();
        while let Some(joint) = parent_joint.get(current) {
            if chain.len() > robot.joints.len() {
                break;
            }
            chain.push(*joint);
            current = joint.parent.link.as_str();
        }
        let pose = chain
            .iter()
            .rev()
            .fold(Pose::IDENTITY, |acc, joint| acc.compose(&convert_pose(&joint.origin)));
        poses.insert(link.name.as_str(), pose);
    }
    poses
}

fn convert_joint(urdf_joint: &urdf_rs::Joint) -> Result<Option<Joint>, UrdfError> {
    let kind = match urdf_joint.joint_type {
        urdf_rs::JointType::Fixed => JointKind::Fixed,
        urdf_rs::JointType::Revolute => JointKind::Revolute,
        urdf_rs::JointType::Continuous => JointKind::Continuous,
        urdf_rs::JointType::Prismatic => JointKind::Prismatic,
        urdf_rs::JointType::Spherical => JointKind::Ball,
        urdf_rs::JointType::Floating => {
            tracing::warn!(
                "Dropping floating joint '{}'; link '{}' becomes free",
                urdf_joint.name,
                urdf_joint.child.link
            );
            return Ok(None);
        }
        urdf_rs::JointType::Planar => {
            return Err(UrdfError::UnsupportedJoint {
                name: urdf_joint.name.clone(),
                kind: "planar".to_string(),
            });
        }
    };

    let mut joint = Joint::new(
        urdf_joint.name.as_str(),
        kind,
        urdf_joint.parent.link.as_str(),
        urdf_joint.child.link.as_str(),
    );

    if kind.has_axis() {
        let mut axis = JointAxis::new(DVec3::from(urdf_joint.axis.xyz.0));
        if kind != JointKind::Continuous {
            axis.lower = urdf_joint.limit.lower;
            axis.upper = urdf_joint.limit.upper;
        }
        axis.effort = urdf_joint.limit.effort;
        axis.velocity = urdf_joint.limit.velocity;
        if let Some(dynamics) = &urdf_joint.dynamics {
            axis.damping = dynamics.damping;
            axis.friction = dynamics.friction;
        }
        joint.axis = Some(axis);
    }

    Ok(Some(joint))
}

fn convert_geometry(geometry: &urdf_rs::Geometry) -> Geometry {
    match geometry {
        urdf_rs::Geometry::Box { size } => Geometry::Box {
            size: DVec3::from(size.0),
        },
        urdf_rs::Geometry::Cylinder { radius, length } => Geometry::Cylinder {
            radius: *radius,
            length: *length,
        },
        urdf_rs::Geometry::Capsule { radius, length } => Geometry::Capsule {
            radius: *radius,
            length: *length,
        },
        urdf_rs::Geometry::Sphere { radius } => Geometry::Sphere { radius: *radius },
        urdf_rs::Geometry::Mesh { filename, scale } => Geometry::Mesh {
            uri: filename.clone(),
            scale: scale.as_ref().map(|s| DVec3::from(s.0)).unwrap_or(DVec3::ONE),
        },
    }
}

fn convert_inertial(inertial: &urdf_rs::Inertial) -> Inertial {
    let i = &inertial.inertia;
    Inertial {
        pose: convert_pose(&inertial.origin),
        mass: inertial.mass.value,
        inertia: [i.ixx, i.iyy, i.izz, i.ixy, i.ixz, i.iyz],
    }
}

/// Convert urdf_rs::Pose (xyz + fixed-axis rpy) to a Pose
fn convert_pose(urdf_pose: &urdf_rs::Pose) -> Pose {
    Pose::from_xyz_rpy(urdf_pose.xyz.0, urdf_pose.rpy.0)
}
