use glam::DVec3;

use crate::math::Pose;
use crate::mjcf::{self, JointKind as MjcfJointKind};
use crate::sdf::{Joint, JointAxis, JointKind, SemanticPose};

use super::{Exporter, ns};

/// Convert a body joint connecting `parent` to `child`.
///
/// Hinges without limits become continuous joints. Free joints are not
/// joints in SDFormat; the child link simply floats.
pub(crate) fn joint_to_sdf(cx: &mut Exporter, joint: &mjcf::Joint, parent: &str, child: &str) -> Option<Joint> {
    let limits = joint.limits();
    let kind = match joint.kind {
        MjcfJointKind::Hinge if limits.is_some() => JointKind::Revolute,
        MjcfJointKind::Hinge => JointKind::Continuous,
        MjcfJointKind::Slide => JointKind::Prismatic,
        MjcfJointKind::Ball => JointKind::Ball,
        MjcfJointKind::Free => return None,
    };

    let name = match &joint.name {
        Some(name) => cx.names.claim(ns::FRAME, name),
        None => cx.names.next_unnamed(ns::FRAME, "unnamed_joint"),
    };
    let mut converted = Joint::new(name, kind, parent, child);
    // joint frame: at `pos`, aligned with the child body
    converted.pose = SemanticPose::new(Pose::from_position(joint.pos));

    if kind != JointKind::Ball {
        let mut axis = JointAxis::new(joint.axis.try_normalize().unwrap_or(DVec3::Z));
        if let Some([lower, upper]) = limits {
            axis.lower = lower;
            axis.upper = upper;
        }
        axis.damping = joint.damping;
        axis.friction = joint.frictionloss;
        axis.spring_stiffness = joint.stiffness;
        axis.spring_reference = joint.springref;
        converted.axis = Some(axis);
    }
    Some(converted)
}

/// Weld `child` to `parent`
pub(crate) fn fixed_joint(cx: &mut Exporter, parent: &str, child: &str) -> Joint {
    let name = cx.names.claim(ns::FRAME, &format!("{}_{}_fixed", parent, child));
    Joint::new(name, JointKind::Fixed, parent, child)
}
