//! Pose resolution over the frames of a model
//!
//! Every link, joint and explicit frame of a model is a frame whose pose is
//! given relative to another frame. Resolving walks that chain down to the
//! implicit `__model__` frame.

use std::collections::HashMap;

use crate::math::Pose;

use super::{Model, SemanticPose};

/// Name of the implicit model frame
pub const MODEL_FRAME: &str = "__model__";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("Unknown frame '{0}'")]
    UnknownFrame(String),

    #[error("Cycle in pose graph while resolving '{0}'")]
    Cycle(String),

    #[error("Duplicate frame name '{0}'")]
    DuplicateFrame(String),
}

/// Pose graph of a single model
#[derive(Debug, Clone)]
pub struct FrameGraph {
    /// frame -> (pose, frame the pose is relative to)
    edges: HashMap<String, (Pose, String)>,
}

impl FrameGraph {
    pub fn new(model: &Model) -> Result<Self, FrameError> {
        let mut edges: HashMap<String, (Pose, String)> = HashMap::new();
        let mut insert = |name: &str, pose: &SemanticPose, default_base: &str| {
            let base = pose
                .relative_to
                .clone()
                .unwrap_or_else(|| default_base.to_string());
            if name == MODEL_FRAME || edges.insert(name.to_string(), (pose.pose, base)).is_some() {
                return Err(FrameError::DuplicateFrame(name.to_string()));
            }
            Ok(())
        };

        for link in &model.links {
            insert(&link.name, &link.pose, MODEL_FRAME)?;
        }
        for joint in &model.joints {
            insert(&joint.name, &joint.pose, &joint.child)?;
        }
        for frame in &model.frames {
            let default_base = frame.attached_to.as_deref().unwrap_or(MODEL_FRAME);
            insert(&frame.name, &frame.pose, default_base)?;
        }

        Ok(Self { edges })
    }

    pub fn contains(&self, frame: &str) -> bool {
        frame == MODEL_FRAME || self.edges.contains_key(frame)
    }

    /// Pose of `frame` expressed in the model frame
    pub fn resolve(&self, frame: &str) -> Result<Pose, FrameError> {
        let mut chain: Vec<&str> = Vec::new();
        let mut current = frame;
        let mut result = Pose::IDENTITY;

        while current != MODEL_FRAME {
            if chain.contains(&current) {
                return Err(FrameError::Cycle(frame.to_string()));
            }
            chain.push(current);
            let (pose, base) = self
                .edges
                .get(current)
                .ok_or_else(|| FrameError::UnknownFrame(current.to_string()))?;
            result = pose.compose(&result);
            current = base.as_str();
        }

        Ok(result)
    }

    /// Resolve a pose written inside an element (visual, sensor, …) whose
    /// default frame is `default_base`
    pub fn resolve_in(&self, pose: &SemanticPose, default_base: &str) -> Result<Pose, FrameError> {
        let base = pose.relative_to.as_deref().unwrap_or(default_base);
        Ok(self.resolve(base)?.compose(&pose.pose))
    }

    /// Pose of `frame` expressed in `base`
    pub fn resolve_relative(&self, frame: &str, base: &str) -> Result<Pose, FrameError> {
        let frame_pose = self.resolve(frame)?;
        let base_pose = self.resolve(base)?;
        Ok(frame_pose.relative_to(&base_pose))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdf::{Frame, Joint, JointKind, Link};
    use glam::DVec3;

    fn link_at(name: &str, x: f64) -> Link {
        let mut link = Link::new(name);
        link.pose = SemanticPose::new(Pose::from_position(DVec3::new(x, 0.0, 0.0)));
        link
    }

    #[test]
    fn test_link_defaults_to_model_frame() {
        let mut model = Model::new("m");
        model.links.push(link_at("a", 1.0));
        let graph = FrameGraph::new(&model).unwrap();
        assert!(graph.resolve("a").unwrap().position.abs_diff_eq(DVec3::X, 1e-12));
        assert!(graph.resolve(MODEL_FRAME).unwrap().is_identity());
    }

    #[test]
    fn test_relative_to_chain() {
        let mut model = Model::new("m");
        model.links.push(link_at("a", 1.0));
        let mut b = link_at("b", 2.0);
        b.pose.relative_to = Some("a".to_string());
        model.links.push(b);

        let mut joint = Joint::new("j", JointKind::Revolute, "a", "b");
        joint.pose = SemanticPose::new(Pose::from_position(DVec3::new(0.0, 1.0, 0.0)));
        model.joints.push(joint);

        model.frames.push(Frame {
            name: "f".to_string(),
            attached_to: Some("j".to_string()),
            pose: SemanticPose::new(Pose::from_position(DVec3::new(0.0, 0.0, 1.0))),
        });

        let graph = FrameGraph::new(&model).unwrap();
        assert!(graph.resolve("b").unwrap().position.abs_diff_eq(DVec3::new(3.0, 0.0, 0.0), 1e-12));
        // joint defaults to its child link frame
        assert!(graph.resolve("j").unwrap().position.abs_diff_eq(DVec3::new(3.0, 1.0, 0.0), 1e-12));
        assert!(graph.resolve("f").unwrap().position.abs_diff_eq(DVec3::new(3.0, 1.0, 1.0), 1e-12));
        assert!(
            graph
                .resolve_relative("b", "a")
                .unwrap()
                .position
                .abs_diff_eq(DVec3::new(2.0, 0.0, 0.0), 1e-12)
        );
    }

    #[test]
    fn test_cycle_detected() {
        let mut model = Model::new("m");
        let mut a = link_at("a", 1.0);
        a.pose.relative_to = Some("b".to_string());
        let mut b = link_at("b", 1.0);
        b.pose.relative_to = Some("a".to_string());
        model.links.push(a);
        model.links.push(b);
        let graph = FrameGraph::new(&model).unwrap();
        assert_eq!(graph.resolve("a"), Err(FrameError::Cycle("a".to_string())));
    }

    #[test]
    fn test_unknown_and_duplicate_frames() {
        let mut model = Model::new("m");
        let mut a = link_at("a", 1.0);
        a.pose.relative_to = Some("nowhere".to_string());
        model.links.push(a);
        let graph = FrameGraph::new(&model).unwrap();
        assert_eq!(graph.resolve("a"), Err(FrameError::UnknownFrame("nowhere".to_string())));

        model.links.push(link_at("a", 0.0));
        assert!(matches!(FrameGraph::new(&model), Err(FrameError::DuplicateFrame(_))));
    }
}
