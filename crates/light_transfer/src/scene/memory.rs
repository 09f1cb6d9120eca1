//! In-memory scene backing tests and headless pipelines.

use std::collections::BTreeMap;

use crate::record::ParamValue;

use super::{NodeId, SceneError, SourceLight, SourceScene, TargetScene};

/// Which network a node lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Network {
    /// Object network: lights and transforms.
    Obj,
    /// Material network: texture nodes.
    Mat,
}

/// One node: a named, typed bag of parameters plus input connections.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryNode {
    /// Node name, unique within its network while alive.
    pub name: String,
    /// Native node type string.
    pub node_type: String,
    /// Parameter store.
    pub parms: BTreeMap<String, ParamValue>,
    /// Input name → source node name.
    pub connections: BTreeMap<String, String>,
    network: Network,
    world_position: [f64; 3],
}

/// A self-contained scene implementing both host interfaces.
#[derive(Debug, Default, Clone)]
pub struct MemoryScene {
    nodes: Vec<Option<MemoryNode>>,
    selection: Vec<SourceLight>,
}

impl MemoryScene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, node: MemoryNode) -> NodeId {
        self.nodes.push(Some(node));
        NodeId(self.nodes.len() - 1)
    }

    /// Add a node to the object network.
    pub fn add_node(&mut self, name: &str, node_type: &str) -> NodeId {
        self.insert(MemoryNode {
            name: name.to_owned(),
            node_type: node_type.to_owned(),
            parms: BTreeMap::new(),
            connections: BTreeMap::new(),
            network: Network::Obj,
            world_position: [0.0; 3],
        })
    }

    /// Set an attribute on a node by name.
    ///
    /// # Panics
    ///
    /// Panics if the node does not exist; scenes are built up-front.
    pub fn set_attr(&mut self, node: &str, attr: &str, value: impl Into<ParamValue>) {
        let node = self
            .lookup_mut(node)
            .unwrap_or_else(|| panic!("no node '{node}'"));
        node.parms.insert(attr.to_owned(), value.into());
    }

    /// Remove an attribute from a node by name, if present.
    ///
    /// # Panics
    ///
    /// Panics if the node does not exist.
    pub fn clear_attr(&mut self, node: &str, attr: &str) {
        let node = self
            .lookup_mut(node)
            .unwrap_or_else(|| panic!("no node '{node}'"));
        node.parms.remove(attr);
    }

    /// Record the world-space position of a transform.
    ///
    /// # Panics
    ///
    /// Panics if the node does not exist.
    pub fn set_world_position(&mut self, node: &str, position: [f64; 3]) {
        let node = self
            .lookup_mut(node)
            .unwrap_or_else(|| panic!("no node '{node}'"));
        node.world_position = position;
    }

    /// Connect `source` into `input` on `node`.
    ///
    /// # Panics
    ///
    /// Panics if the node does not exist.
    pub fn connect(&mut self, node: &str, input: &str, source: &str) {
        let node = self
            .lookup_mut(node)
            .unwrap_or_else(|| panic!("no node '{node}'"));
        node.connections.insert(input.to_owned(), source.to_owned());
    }

    /// Add a light to the selection.
    pub fn select_light(&mut self, transform: &str, shape: &str) {
        self.selection.push(SourceLight {
            transform: transform.to_owned(),
            shape: shape.to_owned(),
        });
    }

    /// Borrow a live node by handle.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&MemoryNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Numeric parameter of a node found by name, for assertions.
    #[must_use]
    pub fn node_parm_f64(&self, name: &str, parm: &str) -> Option<f64> {
        self.lookup(name)
            .and_then(|node| node.parms.get(parm))
            .and_then(ParamValue::as_f64)
    }

    /// Parameter of a node found by name.
    #[must_use]
    pub fn node_parm(&self, name: &str, parm: &str) -> Option<&ParamValue> {
        self.lookup(name).and_then(|node| node.parms.get(parm))
    }

    /// Full state of all live nodes, keyed by name: node type plus
    /// parameters. Two passes over the same records must produce equal
    /// snapshots.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, (String, BTreeMap<String, ParamValue>)> {
        self.nodes
            .iter()
            .flatten()
            .map(|node| {
                (
                    node.name.clone(),
                    (node.node_type.clone(), node.parms.clone()),
                )
            })
            .collect()
    }

    fn lookup(&self, name: &str) -> Option<&MemoryNode> {
        self.nodes
            .iter()
            .flatten()
            .find(|node| node.name == name)
    }

    fn lookup_mut(&mut self, name: &str) -> Option<&mut MemoryNode> {
        self.nodes
            .iter_mut()
            .flatten()
            .find(|node| node.name == name)
    }

    fn live(&self, id: NodeId) -> Result<&MemoryNode, SceneError> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| SceneError::MissingNode(format!("#{}", id.0)))
    }

    fn live_mut(&mut self, id: NodeId) -> Result<&mut MemoryNode, SceneError> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| SceneError::MissingNode(format!("#{}", id.0)))
    }

    fn find_in(&self, network: Network, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|slot| {
            slot.as_ref()
                .is_some_and(|node| node.network == network && node.name == name)
        })
        .map(NodeId)
    }
}

impl SourceScene for MemoryScene {
    fn selected_lights(&self) -> Result<Vec<SourceLight>, SceneError> {
        Ok(self.selection.clone())
    }

    fn node_type(&self, node: &str) -> Result<String, SceneError> {
        self.lookup(node)
            .map(|n| n.node_type.clone())
            .ok_or_else(|| SceneError::MissingNode(node.to_owned()))
    }

    fn attr(&self, node: &str, name: &str) -> Result<ParamValue, SceneError> {
        let found = self
            .lookup(node)
            .ok_or_else(|| SceneError::MissingNode(node.to_owned()))?;
        found
            .parms
            .get(name)
            .cloned()
            .ok_or_else(|| SceneError::MissingAttribute {
                node: node.to_owned(),
                attr: name.to_owned(),
            })
    }

    fn world_translation(&self, node: &str) -> Result<[f64; 3], SceneError> {
        self.lookup(node)
            .map(|n| n.world_position)
            .ok_or_else(|| SceneError::MissingNode(node.to_owned()))
    }

    fn connected_source(&self, node: &str, input: &str) -> Result<Option<String>, SceneError> {
        self.lookup(node)
            .map(|n| n.connections.get(input).cloned())
            .ok_or_else(|| SceneError::MissingNode(node.to_owned()))
    }
}

impl TargetScene for MemoryScene {
    fn find_node(&self, name: &str) -> Option<NodeId> {
        self.find_in(Network::Obj, name)
    }

    fn destroy(&mut self, node: NodeId) -> Result<(), SceneError> {
        self.live(node)?;
        self.nodes[node.0] = None;
        Ok(())
    }

    fn create_node(&mut self, node_type: &str, name: &str) -> Result<NodeId, SceneError> {
        if self.find_in(Network::Obj, name).is_some() {
            return Err(SceneError::CreateRejected {
                name: name.to_owned(),
                reason: "name already in use".to_owned(),
            });
        }
        Ok(self.insert(MemoryNode {
            name: name.to_owned(),
            node_type: node_type.to_owned(),
            parms: BTreeMap::new(),
            connections: BTreeMap::new(),
            network: Network::Obj,
            world_position: [0.0; 3],
        }))
    }

    fn set_parm(&mut self, node: NodeId, parm: &str, value: ParamValue) -> Result<(), SceneError> {
        self.live_mut(node)?.parms.insert(parm.to_owned(), value);
        Ok(())
    }

    fn parm(&self, node: NodeId, parm: &str) -> Result<ParamValue, SceneError> {
        let found = self.live(node)?;
        found
            .parms
            .get(parm)
            .cloned()
            .ok_or_else(|| SceneError::MissingAttribute {
                node: found.name.clone(),
                attr: parm.to_owned(),
            })
    }

    fn find_material(&self, name: &str) -> Option<NodeId> {
        self.find_in(Network::Mat, name)
    }

    fn create_material(&mut self, node_type: &str, name: &str) -> Result<NodeId, SceneError> {
        if self.find_in(Network::Mat, name).is_some() {
            return Err(SceneError::CreateRejected {
                name: name.to_owned(),
                reason: "name already in use".to_owned(),
            });
        }
        Ok(self.insert(MemoryNode {
            name: name.to_owned(),
            node_type: node_type.to_owned(),
            parms: BTreeMap::new(),
            connections: BTreeMap::new(),
            network: Network::Mat,
            world_position: [0.0; 3],
        }))
    }

    fn node_path(&self, node: NodeId) -> Result<String, SceneError> {
        let found = self.live(node)?;
        let prefix = match found.network {
            Network::Obj => "/obj",
            Network::Mat => "/mat",
        };
        Ok(format!("{prefix}/{}", found.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destroy_then_recreate_frees_the_name() {
        let mut scene = MemoryScene::new();
        let first = scene.create_node("hlight::2.0", "mantra_key").unwrap();
        assert!(scene.create_node("hlight::2.0", "mantra_key").is_err());
        scene.destroy(first).unwrap();
        assert!(scene.find_node("mantra_key").is_none());
        scene.create_node("hlight::2.0", "mantra_key").unwrap();
        assert!(scene.find_node("mantra_key").is_some());
    }

    #[test]
    fn materials_live_in_their_own_namespace() {
        let mut scene = MemoryScene::new();
        scene.create_node("hlight::2.0", "shared_name").unwrap();
        let mat = scene.create_material("texture::2.0", "shared_name").unwrap();
        assert_eq!(scene.node_path(mat).unwrap(), "/mat/shared_name");
        assert!(scene.find_material("shared_name").is_some());
    }

    #[test]
    fn stale_handles_are_rejected() {
        let mut scene = MemoryScene::new();
        let node = scene.create_node("hlight::2.0", "gone").unwrap();
        scene.destroy(node).unwrap();
        assert!(scene.parm(node, "tx").is_err());
        assert!(scene.destroy(node).is_err());
    }
}
