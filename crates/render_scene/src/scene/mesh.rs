//! Geometry container referenced by objects
//!
//! Meshes are shared between objects for instancing through [`SharedMesh`].
//! Only the pieces the scene core needs are modeled here: a name, raw
//! positions and indices, the owning scene, and the finalize state.

use std::cell::RefCell;
use std::io::{Read, Write};
use std::rc::Rc;

use super::base_object::{Finalize, FinalizeState};
use super::scene_object::{SceneHandle, SceneObject};
use super::SceneError;
use crate::io::{BinaryReader, BinaryWriter, FormatError};

/// Shared ownership of a mesh; every instancing object holds one
pub type SharedMesh = Rc<RefCell<Mesh>>;

/// Triangle mesh
#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,
    positions: Vec<[f32; 3]>,
    indices: Vec<u32>,
    owner: SceneObject,
    state: FinalizeState,
}

impl Mesh {
    /// Create an empty mesh owned by `scene`
    pub fn new(scene: SceneHandle, name: impl Into<String>) -> Self {
        Self::with_geometry(scene, name, Vec::new(), Vec::new())
    }

    /// Create a mesh owned by `scene` from positions and triangle indices
    pub fn with_geometry(
        scene: SceneHandle,
        name: impl Into<String>,
        positions: Vec<[f32; 3]>,
        indices: Vec<u32>,
    ) -> Self {
        Self {
            name: name.into(),
            positions,
            indices,
            owner: SceneObject::new(scene),
            state: FinalizeState::new(),
        }
    }

    /// Wrap for shared ownership
    pub fn into_shared(self) -> SharedMesh {
        Rc::new(RefCell::new(self))
    }

    /// Mesh name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Vertex positions
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Triangle indices
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Replace the geometry
    pub fn set_geometry(&mut self, positions: Vec<[f32; 3]>, indices: Vec<u32>) {
        self.positions = positions;
        self.indices = indices;
    }

    /// Back-reference to the owning scene
    pub fn owner(&self) -> SceneObject {
        self.owner
    }

    /// Write `[name][positions][indices]`
    pub fn serialize<W: Write>(&self, writer: &mut BinaryWriter<W>) -> Result<(), FormatError> {
        writer.write_string(&self.name)?;
        writer.write_pod_slice(&self.positions)?;
        writer.write_pod_slice(&self.indices)
    }

    /// Read a mesh record into `scene`
    pub fn deserialize<R: Read>(
        _version: u32,
        reader: &mut BinaryReader<R>,
        scene: SceneHandle,
    ) -> Result<Self, FormatError> {
        let name = reader.read_string()?;
        let positions = reader.read_pod_vec()?;
        let indices = reader.read_pod_vec()?;
        Ok(Self::with_geometry(scene, name, positions, indices))
    }
}

impl Finalize for Mesh {
    fn finalize_state(&self) -> &FinalizeState {
        &self.state
    }

    fn finalize_state_mut(&mut self) -> &mut FinalizeState {
        &mut self.state
    }

    fn do_finalize(&mut self, scene: SceneHandle) -> Result<(), SceneError> {
        self.owner.resolve(scene)?;
        log::trace!(
            "Finalized mesh '{}' ({} vertices, {} indices) in {}",
            self.name,
            self.positions.len(),
            self.indices.len(),
            scene
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::CURRENT_FORMAT_VERSION;

    fn triangle(scene: SceneHandle) -> Mesh {
        Mesh::with_geometry(
            scene,
            "tri",
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn test_round_trip_geometry() {
        let scene = SceneHandle::allocate();
        let mesh = triangle(scene);

        let mut writer = BinaryWriter::new(Vec::new());
        mesh.serialize(&mut writer).unwrap();
        let bytes = writer.into_inner();

        let other = SceneHandle::allocate();
        let read = Mesh::deserialize(CURRENT_FORMAT_VERSION, &mut BinaryReader::new(bytes.as_slice()), other).unwrap();

        assert_eq!(read.name(), "tri");
        assert_eq!(read.positions(), mesh.positions());
        assert_eq!(read.indices(), &[0, 1, 2]);
        assert_eq!(read.owner().scene(), other);
    }

    #[test]
    fn test_finalize_against_foreign_scene_fails() {
        let mut mesh = triangle(SceneHandle::allocate());

        let err = mesh.finalize(SceneHandle::allocate(), false).unwrap_err();

        assert!(matches!(err, SceneError::UnresolvedSceneReference { .. }));
        assert!(!mesh.is_finalized());
    }

    #[test]
    fn test_finalize_against_owner_succeeds_once() {
        let scene = SceneHandle::allocate();
        let mut mesh = triangle(scene);

        assert!(mesh.finalize(scene, false).unwrap());
        assert!(!mesh.finalize(scene, false).unwrap());
        assert_eq!(mesh.finalize_state().passes(), 1);
    }
}
