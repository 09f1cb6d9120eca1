//! Host scene interfaces.
//!
//! The core never talks to a host application directly; it sees the
//! source scene as a read-only attribute store and the target scene as
//! a node factory. [`memory::MemoryScene`] implements both for tests
//! and headless pipelines.

pub mod memory;

use crate::record::ParamValue;

/// Errors surfaced by a host scene.
///
/// These are deterministic local failures; retrying has no value, so
/// callers propagate them and abort the affected light.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// A node path did not resolve.
    #[error("node '{0}' not found")]
    MissingNode(String),

    /// An attribute the mapping tables expect was absent.
    #[error("node '{node}' has no attribute '{attr}'")]
    MissingAttribute {
        /// Node that was queried.
        node: String,
        /// Attribute that was missing.
        attr: String,
    },

    /// The scene refused to create a node.
    #[error("cannot create node '{name}': {reason}")]
    CreateRejected {
        /// Requested node name.
        name: String,
        /// Host-provided reason.
        reason: String,
    },
}

/// Opaque handle to a node in the target scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// One selected light on the source side: its transform and shape
/// node paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLight {
    /// Transform node path (carries world position and most attributes).
    pub transform: String,
    /// Shape node path (carries the classification attributes).
    pub shape: String,
}

/// Read access to the source application's scene.
pub trait SourceScene {
    /// Lights currently selected, light-kinds pre-filtered by the host.
    ///
    /// # Errors
    ///
    /// [`SceneError`] if the selection cannot be resolved.
    fn selected_lights(&self) -> Result<Vec<SourceLight>, SceneError>;

    /// Native node type of a node.
    ///
    /// # Errors
    ///
    /// [`SceneError::MissingNode`] if the path does not resolve.
    fn node_type(&self, node: &str) -> Result<String, SceneError>;

    /// Read one attribute by name.
    ///
    /// # Errors
    ///
    /// [`SceneError`] if the node or attribute is missing.
    fn attr(&self, node: &str, name: &str) -> Result<ParamValue, SceneError>;

    /// World-space translation of a transform, as one query (not three
    /// per-component attribute reads).
    ///
    /// # Errors
    ///
    /// [`SceneError::MissingNode`] if the path does not resolve.
    fn world_translation(&self, node: &str) -> Result<[f64; 3], SceneError>;

    /// Node feeding `input` on `node`, if the input is connected.
    ///
    /// # Errors
    ///
    /// [`SceneError::MissingNode`] if the path does not resolve.
    fn connected_source(&self, node: &str, input: &str) -> Result<Option<String>, SceneError>;
}

/// Write access to the destination application's scene.
pub trait TargetScene {
    /// Look up a light node by name.
    fn find_node(&self, name: &str) -> Option<NodeId>;

    /// Remove a node and everything it owned.
    ///
    /// # Errors
    ///
    /// [`SceneError`] if the handle is stale.
    fn destroy(&mut self, node: NodeId) -> Result<(), SceneError>;

    /// Create a light node of the given type.
    ///
    /// # Errors
    ///
    /// [`SceneError::CreateRejected`] if the host refuses.
    fn create_node(&mut self, node_type: &str, name: &str) -> Result<NodeId, SceneError>;

    /// Set one parameter on a node.
    ///
    /// # Errors
    ///
    /// [`SceneError`] if the handle is stale.
    fn set_parm(&mut self, node: NodeId, parm: &str, value: ParamValue) -> Result<(), SceneError>;

    /// Read one parameter back. The spread and soft-edge handlers need
    /// this to merge exposure corrections into a partially written node.
    ///
    /// # Errors
    ///
    /// [`SceneError`] if the handle is stale or the parameter unset.
    fn parm(&self, node: NodeId, parm: &str) -> Result<ParamValue, SceneError>;

    /// Look up a material node by name.
    fn find_material(&self, name: &str) -> Option<NodeId>;

    /// Create a material node of the given type.
    ///
    /// # Errors
    ///
    /// [`SceneError::CreateRejected`] if the host refuses.
    fn create_material(&mut self, node_type: &str, name: &str) -> Result<NodeId, SceneError>;

    /// Full scene path of a node, for cross-references between nodes.
    ///
    /// # Errors
    ///
    /// [`SceneError`] if the handle is stale.
    fn node_path(&self, node: NodeId) -> Result<String, SceneError>;

    /// Arrange nodes in the scene view. Cosmetic; no contract.
    fn layout(&mut self, _nodes: &[NodeId]) {}
}
