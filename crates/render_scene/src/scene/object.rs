//! Placed mesh instances
//!
//! Record layout: `[WorldObject header][u32 mesh index][name]`. The mesh index
//! comes from a resolver supplied by the scene, so the record never embeds
//! geometry and instanced meshes are written once.

use std::io::{Read, Write};
use std::rc::Rc;

use super::base_object::{Finalize, FinalizeState};
use super::mesh::SharedMesh;
use super::scene_object::SceneHandle;
use super::world_object::{WorldEntity, WorldObject};
use super::SceneError;
use crate::foundation::math::ScaledTransform;
use crate::io::{self, BinaryReader, BinaryWriter};

/// An instance of a mesh placed in the scene
#[derive(Debug)]
pub struct Object {
    world: WorldObject,
    state: FinalizeState,
    mesh: SharedMesh,
    motion_transform: ScaledTransform,
    name: String,
}

impl Object {
    /// Create an object instancing `mesh`
    pub fn new(mesh: SharedMesh, name: impl Into<String>) -> Self {
        Self::with_world_object(WorldObject::new(), mesh, name.into())
    }

    fn with_world_object(world: WorldObject, mesh: SharedMesh, name: String) -> Self {
        Self {
            world,
            state: FinalizeState::new(),
            mesh,
            motion_transform: ScaledTransform::identity(),
            name,
        }
    }

    /// Instanced mesh
    pub fn mesh(&self) -> &SharedMesh {
        &self.mesh
    }

    /// Whether this object instances exactly `mesh`
    pub fn shares_mesh(&self, mesh: &SharedMesh) -> bool {
        Rc::ptr_eq(&self.mesh, mesh)
    }

    /// End-of-shutter transform used for motion blur
    pub fn motion_transform(&self) -> &ScaledTransform {
        &self.motion_transform
    }

    /// Set the end-of-shutter transform
    pub fn set_motion_transform(&mut self, transform: ScaledTransform) {
        self.motion_transform = transform;
    }

    /// Display name; not required to be unique
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set display name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Write the object record, mapping the mesh through `mesh_index`
    ///
    /// Every mesh referenced by a serialized object must be resolvable;
    /// otherwise [`SceneError::UnresolvedMesh`] is returned before anything is
    /// written.
    pub fn serialize<W, F>(&self, writer: &mut BinaryWriter<W>, mesh_index: F) -> Result<(), SceneError>
    where
        W: Write,
        F: Fn(&SharedMesh) -> Option<u32>,
    {
        let index = mesh_index(&self.mesh).ok_or_else(|| SceneError::UnresolvedMesh {
            object: self.name.clone(),
            mesh: self
                .mesh
                .try_borrow()
                .map(|mesh| mesh.name().to_string())
                .unwrap_or_default(),
        })?;

        self.world.serialize(writer)?;
        writer.write_u32(index)?;
        writer.write_string(&self.name)?;
        Ok(())
    }

    /// Read an object record, resolving its mesh index through `resolve_mesh`
    pub fn deserialize<R, F>(version: u32, reader: &mut BinaryReader<R>, resolve_mesh: F) -> Result<Self, SceneError>
    where
        R: Read,
        F: FnOnce(u32) -> Option<SharedMesh>,
    {
        let version = io::check_version(version)?;
        let world = WorldObject::deserialize(version, reader)?;
        let index = reader.read_u32()?;
        let mesh = resolve_mesh(index).ok_or(SceneError::MissingMesh(index))?;
        let name = reader.read_string()?;
        Ok(Self::with_world_object(world, mesh, name))
    }
}

impl WorldEntity for Object {
    fn world_object(&self) -> &WorldObject {
        &self.world
    }

    fn world_object_mut(&mut self) -> &mut WorldObject {
        &mut self.world
    }
}

impl Finalize for Object {
    fn finalize_state(&self) -> &FinalizeState {
        &self.state
    }

    fn finalize_state_mut(&mut self) -> &mut FinalizeState {
        &mut self.state
    }

    fn do_finalize(&mut self, scene: SceneHandle) -> Result<(), SceneError> {
        let mut mesh = self
            .mesh
            .try_borrow_mut()
            .map_err(|_| SceneError::MeshBorrowed(self.name.clone()))?;
        mesh.finalize(scene, false)?;
        log::trace!("Finalized object '{}' ({})", self.name, self.world.identity());
        Ok(())
    }
}
