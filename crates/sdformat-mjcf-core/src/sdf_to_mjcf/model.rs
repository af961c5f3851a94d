use std::collections::HashMap;

use crate::error::ConvertError;
use crate::math::Pose;
use crate::mjcf::{Body, FreeJoint};
use crate::sdf::{FrameGraph, Model};
use crate::tree::{KinematicTree, TreeError};

use super::link::{LinkFrame, add_link};
use super::{Converter, joint};

/// Convert a model into bodies under `worldbody`.
///
/// Root links are placed at `model pose * link pose`. Links of non-static
/// models that are not attached to the world get a free joint.
pub(crate) fn add_model(cx: &mut Converter, worldbody: &mut Body, model: &Model) -> Result<(), ConvertError> {
    if let Some(frame) = &model.pose.relative_to {
        tracing::warn!(
            "Model '{}' is placed relative to '{}'; using its pose in the world frame",
            model.name,
            frame
        );
    }
    let model_pose = model.pose.pose;

    let graph = FrameGraph::new(model)?;
    let mut tree = KinematicTree::new();
    for link in &model.links {
        tree.add_link(link.name.as_str());
    }
    for (index, joint) in model.joints.iter().enumerate() {
        tree.connect(&joint.parent, &joint.child, index)?;
    }

    let mut link_poses: HashMap<&str, Pose> = HashMap::new();
    for link in &model.links {
        link_poses.insert(link.name.as_str(), graph.resolve(&link.name)?);
    }

    let walk = TreeWalk {
        model,
        graph: &graph,
        tree: &tree,
        link_poses: &link_poses,
    };

    for root in tree.roots() {
        let link_pose = walk.pose_of(root)?;
        let mut body = walk.add_subtree(cx, root, model_pose.compose(&link_pose))?;

        match tree.world_joint(root) {
            Some(index) => {
                if let Some(converted) = joint::add_joint(cx, &model.joints[index], &graph, &link_pose)? {
                    body.joints.insert(0, converted);
                }
            }
            None if !model.is_static => body.freejoint = Some(FreeJoint::default()),
            None => {}
        }
        worldbody.bodies.push(body);
    }

    tracing::debug!("Converted model '{}' ({} links)", model.name, model.links.len());
    Ok(())
}

struct TreeWalk<'a> {
    model: &'a Model,
    graph: &'a FrameGraph,
    tree: &'a KinematicTree,
    link_poses: &'a HashMap<&'a str, Pose>,
}

impl TreeWalk<'_> {
    fn pose_of(&self, link_name: &str) -> Result<Pose, TreeError> {
        self.link_poses
            .get(link_name)
            .copied()
            .ok_or_else(|| TreeError::LinkNotFound(link_name.to_string()))
    }

    /// Body for `link_name` placed at `body_pose` in its parent body, with
    /// all descendant links nested below it
    fn add_subtree(&self, cx: &mut Converter, link_name: &str, body_pose: Pose) -> Result<Body, ConvertError> {
        let link = self
            .model
            .link(link_name)
            .ok_or_else(|| TreeError::LinkNotFound(link_name.to_string()))?;
        let link_pose = self.pose_of(link_name)?;

        let frame = LinkFrame::new(self.graph, &link.name, link_pose);
        let mut body = add_link(cx, link, body_pose, &frame)?;

        for (joint_index, child_name) in self.tree.children(link_name) {
            let child_pose = self.pose_of(child_name)?;
            let relative = child_pose.relative_to(&link_pose);
            let mut child = self.add_subtree(cx, child_name, relative)?;

            let joint = &self.model.joints[*joint_index];
            if let Some(converted) = joint::add_joint(cx, joint, self.graph, &child_pose)? {
                child.joints.insert(0, converted);
            }
            body.bodies.push(child);
        }

        Ok(body)
    }
}
