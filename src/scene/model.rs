use std::fmt;

use super::node::SceneNode;
use crate::resources::{Material, Mesh};

/// A placed, drawable object: one node, its meshes and their materials.
///
/// Mesh `i` is drawn with material `i`; when there are fewer materials than
/// meshes the last material is reused.
pub struct Model {
    node: Box<dyn SceneNode + Send + Sync>,
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
}

impl Model {
    pub fn new(node: impl SceneNode + Send + Sync + 'static) -> Self {
        Self {
            node: Box::new(node),
            meshes: Vec::new(),
            materials: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.meshes.push(mesh);
        self
    }

    #[must_use]
    pub fn with_material(mut self, material: Material) -> Self {
        self.materials.push(material);
        self
    }

    pub fn add_mesh(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    pub fn add_material(&mut self, material: Material) {
        self.materials.push(material);
    }

    pub fn set_node(&mut self, node: impl SceneNode + Send + Sync + 'static) {
        self.node = Box::new(node);
    }

    #[inline]
    #[must_use]
    pub fn node(&self) -> &dyn SceneNode {
        self.node.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    #[inline]
    #[must_use]
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    #[inline]
    #[must_use]
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn material_mut(&mut self, index: usize) -> Option<&mut Material> {
        self.materials.get_mut(index)
    }

    /// Material index used for mesh `mesh`, or `None` when the mesh does not
    /// exist or the model has no material.
    #[must_use]
    pub fn material_index(&self, mesh: usize) -> Option<usize> {
        if mesh >= self.meshes.len() || self.materials.is_empty() {
            return None;
        }
        Some(mesh.min(self.materials.len() - 1))
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("world_position", &self.node.world_position())
            .field("meshes", &self.meshes)
            .field("materials", &self.materials.len())
            .finish()
    }
}
