//! Kinematic tree built from SDFormat joints (connect, roots, traversal)

use std::collections::HashMap;

/// Name of the implicit world frame a joint parent may refer to
pub const WORLD: &str = "world";

/// Errors raised while building a kinematic tree
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    #[error("Link not found: {0}")]
    LinkNotFound(String),

    #[error("Link '{0}' is the child of more than one joint")]
    AlreadyHasParent(String),

    #[error("Kinematic loops are not supported (joint to '{0}' closes a loop)")]
    WouldCreateCycle(String),
}

/// Tree of links connected by joints
///
/// Links are identified by name; joints by their index in the source model.
#[derive(Debug, Clone, Default)]
pub struct KinematicTree {
    /// Links in insertion order
    links: Vec<String>,
    /// Parent link -> (joint index, child link)
    children: HashMap<String, Vec<(usize, String)>>,
    /// Child link -> (joint index, parent link)
    parent: HashMap<String, (usize, String)>,
    /// Links attached to the world frame through a joint
    world_joints: HashMap<String, usize>,
}

impl KinematicTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a link (no-op if it already exists)
    pub fn add_link(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.contains(&name) {
            self.links.push(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.links.iter().any(|l| l == name)
    }

    /// Connect two links with a joint
    pub fn connect(&mut self, parent: &str, child: &str, joint_index: usize) -> Result<(), TreeError> {
        if !self.contains(child) {
            return Err(TreeError::LinkNotFound(child.to_string()));
        }
        if self.parent.contains_key(child) || self.world_joints.contains_key(child) {
            return Err(TreeError::AlreadyHasParent(child.to_string()));
        }

        if parent == WORLD {
            self.world_joints.insert(child.to_string(), joint_index);
            return Ok(());
        }

        if !self.contains(parent) {
            return Err(TreeError::LinkNotFound(parent.to_string()));
        }
        if self.would_create_cycle(parent, child) {
            return Err(TreeError::WouldCreateCycle(child.to_string()));
        }

        self.children
            .entry(parent.to_string())
            .or_default()
            .push((joint_index, child.to_string()));
        self.parent
            .insert(child.to_string(), (joint_index, parent.to_string()));
        Ok(())
    }

    /// Check if connecting parent to child would create a cycle
    fn would_create_cycle(&self, parent: &str, child: &str) -> bool {
        // Check if child is an ancestor of parent
        let mut current = Some(parent);
        while let Some(name) = current {
            if name == child {
                return true;
            }
            current = self.parent.get(name).map(|(_, p)| p.as_str());
        }
        false
    }

    /// Links without a parent link, in insertion order
    pub fn roots(&self) -> Vec<&str> {
        self.links
            .iter()
            .filter(|l| !self.parent.contains_key(l.as_str()))
            .map(|l| l.as_str())
            .collect()
    }

    /// Joint attaching a root link to the world, if any
    pub fn world_joint(&self, link: &str) -> Option<usize> {
        self.world_joints.get(link).copied()
    }

    /// (joint index, child link) pairs of a link
    pub fn children(&self, link: &str) -> &[(usize, String)] {
        self.children.get(link).map(|c| c.as_slice()).unwrap_or(&[])
    }

    /// (joint index, parent link) of a link
    pub fn parent(&self, link: &str) -> Option<(usize, &str)> {
        self.parent.get(link).map(|(j, p)| (*j, p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(links: &[&str]) -> KinematicTree {
        let mut tree = KinematicTree::new();
        for link in links {
            tree.add_link(*link);
        }
        tree
    }

    #[test]
    fn test_connect_and_roots() {
        let mut tree = tree(&["base", "arm", "hand", "other"]);
        tree.connect("base", "arm", 0).unwrap();
        tree.connect("arm", "hand", 1).unwrap();

        assert_eq!(tree.roots(), vec!["base", "other"]);
        assert_eq!(tree.children("base"), &[(0, "arm".to_string())]);
        assert_eq!(tree.parent("hand"), Some((1, "arm")));
        assert!(tree.children("hand").is_empty());
    }

    #[test]
    fn test_cycle_rejected() {
        let mut tree = tree(&["a", "b", "c"]);
        tree.connect("a", "b", 0).unwrap();
        tree.connect("b", "c", 1).unwrap();
        assert_eq!(
            tree.connect("c", "a", 2),
            Err(TreeError::WouldCreateCycle("a".to_string()))
        );
    }

    #[test]
    fn test_second_parent_rejected() {
        let mut tree = tree(&["a", "b", "c"]);
        tree.connect("a", "c", 0).unwrap();
        assert_eq!(
            tree.connect("b", "c", 1),
            Err(TreeError::AlreadyHasParent("c".to_string()))
        );
    }

    #[test]
    fn test_world_joint() {
        let mut tree = tree(&["a"]);
        tree.connect(WORLD, "a", 3).unwrap();
        assert_eq!(tree.roots(), vec!["a"]);
        assert_eq!(tree.world_joint("a"), Some(3));
        assert_eq!(
            tree.connect(WORLD, "a", 4),
            Err(TreeError::AlreadyHasParent("a".to_string()))
        );
    }

    #[test]
    fn test_unknown_link() {
        let mut tree = tree(&["a"]);
        assert_eq!(
            tree.connect("a", "missing", 0),
            Err(TreeError::LinkNotFound("missing".to_string()))
        );
        assert_eq!(
            tree.connect("missing", "a", 0),
            Err(TreeError::LinkNotFound("missing".to_string()))
        );
    }
}
