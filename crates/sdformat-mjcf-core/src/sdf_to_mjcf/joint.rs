use glam::DVec3;

use crate::error::ConvertError;
use crate::math::Pose;
use crate::mjcf::{self, JointKind as MjcfJointKind};
use crate::sdf::{FrameGraph, Joint, JointKind};

use super::{Converter, ns};

/// Convert a joint into a joint of its child body.
///
/// `child_pose` is the child link pose in the model frame. Fixed joints
/// produce no MJCF joint; the child body is welded to its parent.
pub(crate) fn add_joint(
    cx: &mut Converter,
    joint: &Joint,
    graph: &FrameGraph,
    child_pose: &Pose,
) -> Result<Option<mjcf::Joint>, ConvertError> {
    let kind = match joint.kind {
        JointKind::Fixed => return Ok(None),
        JointKind::Revolute | JointKind::Continuous => MjcfJointKind::Hinge,
        JointKind::Prismatic => MjcfJointKind::Slide,
        JointKind::Ball => MjcfJointKind::Ball,
        other => {
            return Err(ConvertError::Unsupported(format!(
                "joint '{}' of type {}",
                joint.name,
                other.as_str()
            )));
        }
    };

    let joint_pose = graph.resolve(&joint.name)?;
    let in_body = joint_pose.relative_to(child_pose);

    let mut converted = mjcf::Joint::new(kind);
    converted.name = Some(cx.names.claim(ns::JOINT, &joint.name));
    converted.pos = in_body.position;

    if let Some(axis) = &joint.axis
        && kind != MjcfJointKind::Ball
    {
        let axis_in_body = match axis.expressed_in.as_deref() {
            None => in_body.rotation * axis.xyz,
            Some(frame) => {
                let frame_pose = graph.resolve(frame)?;
                child_pose.rotation.inverse() * (frame_pose.rotation * axis.xyz)
            }
        };
        converted.axis = axis_in_body.try_normalize().unwrap_or(DVec3::Z);

        if joint.kind != JointKind::Continuous && axis.is_limited() {
            converted.range = Some([axis.lower, axis.upper]);
            converted.limited = Some(true);
        }
        converted.damping = axis.damping;
        converted.frictionloss = axis.friction;
        converted.stiffness = axis.spring_stiffness;
        converted.springref = axis.spring_reference;
    }

    tracing::debug!("Converted joint '{}' ({})", joint.name, joint.kind.as_str());
    Ok(Some(converted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionConfig;
    use crate::sdf::{JointAxis, Link, Model, SemanticPose};

    fn two_links(joint: Joint) -> Model {
        let mut model = Model::new("m");
        model.links.push(Link::new("a"));
        let mut b = Link::new("b");
        b.pose = SemanticPose::new(Pose::from_xyz_rpy([0.0, 0.0, 1.0], [0.0, 0.0, std::f64::consts::FRAC_PI_2]));
        model.links.push(b);
        model.joints.push(joint);
        model
    }

    fn convert_joint(model: &Model) -> Result<Option<mjcf::Joint>, ConvertError> {
        let config = ConversionConfig::default();
        let mut cx = Converter::new(&config);
        let graph = FrameGraph::new(model).unwrap();
        let child_pose = graph.resolve("b").unwrap();
        add_joint(&mut cx, &model.joints[0], &graph, &child_pose)
    }

    #[test]
    fn test_revolute_with_dynamics() {
        let mut joint = Joint::new("j", JointKind::Revolute, "a", "b");
        let mut axis = JointAxis::new(DVec3::X);
        axis.lower = -0.5;
        axis.upper = 0.5;
        axis.damping = 0.1;
        axis.friction = 0.2;
        axis.spring_stiffness = 3.0;
        axis.spring_reference = 0.25;
        joint.axis = Some(axis);

        let converted = convert_joint(&two_links(joint)).unwrap().unwrap();
        assert_eq!(converted.kind, MjcfJointKind::Hinge);
        assert_eq!(converted.limits(), Some([-0.5, 0.5]));
        assert_eq!(converted.damping, 0.1);
        assert_eq!(converted.frictionloss, 0.2);
        assert_eq!(converted.stiffness, 3.0);
        assert_eq!(converted.springref, 0.25);
        // axis stays in the joint frame, which coincides with the child body
        assert!(converted.axis.abs_diff_eq(DVec3::X, 1e-12));
    }

    #[test]
    fn test_axis_expressed_in_model_frame() {
        let mut joint = Joint::new("j", JointKind::Prismatic, "a", "b");
        let mut axis = JointAxis::new(DVec3::X);
        axis.expressed_in = Some("__model__".to_string());
        joint.axis = Some(axis);

        let converted = convert_joint(&two_links(joint)).unwrap().unwrap();
        assert_eq!(converted.kind, MjcfJointKind::Slide);
        // child is yawed by 90 degrees, so model X is body -Y
        assert!(converted.axis.abs_diff_eq(-DVec3::Y, 1e-12));
        assert!(converted.limits().is_none());
    }

    #[test]
    fn test_fixed_and_unsupported() {
        let fixed = Joint::new("j", JointKind::Fixed, "a", "b");
        assert!(convert_joint(&two_links(fixed)).unwrap().is_none());

        let screw = Joint::new("j", JointKind::Screw, "a", "b");
        assert!(matches!(
            convert_joint(&two_links(screw)),
            Err(ConvertError::Unsupported(_))
        ));
    }
}
