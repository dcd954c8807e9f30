//! Scene object model
//!
//! A [`Scene`] owns every light, object and mesh it creates or loads. Objects
//! share ownership of meshes for instancing and point back to nothing; meshes
//! carry a non-owning [`SceneObject`] back-reference to their scene.
//!
//! # Lifecycle
//!
//! 1. Build or load the graph (`create_*`, [`Scene::read_from`]).
//! 2. Run [`Scene::finalize`] once the graph is complete. Entities finalize
//!    their dependents; repeated passes are no-ops unless forced.
//! 3. Write the graph with [`Scene::write_to`] for the render back end.
//!
//! # Stream layout
//!
//! `[magic "RSCN"][u32 version][name][u32 mesh count][meshes]`
//! `[u32 light count][lights][u32 object count][objects]`

pub mod base_object;
pub mod light;
pub mod mesh;
pub mod object;
pub mod scene_object;
pub mod world_object;

#[cfg(test)]
mod tests;

pub use base_object::{Finalize, FinalizeState};
pub use light::{Light, LightShape, LightType};
pub use mesh::{Mesh, SharedMesh};
pub use object::Object;
pub use scene_object::{SceneHandle, SceneObject};
pub use world_object::{IdentityToken, WorldEntity, WorldObject};

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use std::rc::Rc;

use thiserror::Error;

use crate::config::SceneConfig;
use crate::foundation::collections::{HandleMap, TypedHandle};
use crate::io::{
    self, BinaryReader, BinaryWriter, FormatError, CURRENT_FORMAT_VERSION, SCENE_MAGIC,
};

/// Stable handle to a light registered in a scene
pub type LightHandle = TypedHandle<Light>;

/// Stable handle to an object registered in a scene
pub type ObjectHandle = TypedHandle<Object>;

/// Errors raised while building, finalizing or (de)serializing a scene
#[derive(Error, Debug)]
pub enum SceneError {
    /// Stream encoding or decoding failed
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// An object's mesh has no registered index
    #[error("Object '{object}' references mesh '{mesh}' which is not registered in the scene")]
    UnresolvedMesh {
        /// Object name
        object: String,
        /// Mesh name
        mesh: String,
    },

    /// A mesh index does not name a registered mesh
    #[error("No mesh registered at index {0}")]
    MissingMesh(u32),

    /// No mesh registered under this name
    #[error("No mesh named '{0}'")]
    UnknownMeshName(String),

    /// A back-reference was resolved against a scene that does not own it
    #[error("Back-reference to {expected} resolved against {found}")]
    UnresolvedSceneReference {
        /// Owning scene recorded in the back-reference
        expected: SceneHandle,
        /// Scene it was resolved against
        found: SceneHandle,
    },

    /// A shared mesh was already borrowed elsewhere; names the object or scene that needed it
    #[error("Mesh needed by '{0}' is already borrowed")]
    MeshBorrowed(String),

    /// An entity with this identity is already registered
    #[error("Identity {0} is already registered in the scene")]
    DuplicateIdentity(IdentityToken),

    /// Light handle not present in this scene
    #[error("Unknown light handle: {0:?}")]
    UnknownLight(LightHandle),

    /// Object handle not present in this scene
    #[error("Unknown object handle: {0:?}")]
    UnknownObject(ObjectHandle),
}

/// Registry of meshes, lights and objects
#[derive(Debug)]
pub struct Scene {
    handle: SceneHandle,
    name: String,
    meshes: Vec<SharedMesh>,
    lights: HandleMap<Light>,
    objects: HandleMap<Object>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::from_config(&SceneConfig::default())
    }
}

impl Scene {
    /// Create an empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            handle: SceneHandle::allocate(),
            name: name.into(),
            meshes: Vec::new(),
            lights: HandleMap::new(),
            objects: HandleMap::new(),
        }
    }

    /// Create an empty scene named by `config`
    pub fn from_config(config: &SceneConfig) -> Self {
        Self::new(config.name.clone())
    }

    /// Handle used by back-references into this scene
    pub fn handle(&self) -> SceneHandle {
        self.handle
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // ---- meshes ----

    /// Create and register a mesh owned by this scene
    pub fn create_mesh(
        &mut self,
        name: impl Into<String>,
        positions: Vec<[f32; 3]>,
        indices: Vec<u32>,
    ) -> SharedMesh {
        let mesh = Mesh::with_geometry(self.handle, name, positions, indices);
        self.register_mesh(mesh.into_shared())
    }

    /// Register a mesh built against this scene's handle
    ///
    /// The mesh's index is its registration order.
    pub fn add_mesh(&mut self, mesh: Mesh) -> Result<SharedMesh, SceneError> {
        mesh.owner().resolve(self.handle)?;
        Ok(self.register_mesh(mesh.into_shared()))
    }

    fn register_mesh(&mut self, mesh: SharedMesh) -> SharedMesh {
        {
            let new_mesh = mesh.borrow();
            if self.mesh_by_name(new_mesh.name()).is_some() {
                log::warn!("Mesh name '{}' registered more than once in '{}'", new_mesh.name(), self.name);
            }
        }
        self.meshes.push(Rc::clone(&mesh));
        mesh
    }

    /// Mesh registered at `index`
    pub fn mesh(&self, index: u32) -> Option<&SharedMesh> {
        self.meshes.get(index as usize)
    }

    /// First mesh registered under `name`
    pub fn mesh_by_name(&self, name: &str) -> Option<&SharedMesh> {
        self.meshes.iter().find(|mesh| mesh.try_borrow().is_ok_and(|mesh| mesh.name() == name))
    }

    /// Registration index of `mesh`
    pub fn mesh_index(&self, mesh: &SharedMesh) -> Option<u32> {
        self.meshes
            .iter()
            .position(|registered| Rc::ptr_eq(registered, mesh))
            .and_then(|index| u32::try_from(index).ok())
    }

    /// All meshes in registration order
    pub fn meshes(&self) -> &[SharedMesh] {
        &self.meshes
    }

    /// Number of registered meshes
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    // ---- lights ----

    /// Create a light with default parameters
    pub fn create_light(&mut self, light_type: LightType) -> LightHandle {
        self.lights.insert(Light::new(light_type))
    }

    /// Add an already configured light
    ///
    /// Fails if a light or object with the same identity is already registered.
    pub fn add_light(&mut self, light: Light) -> Result<LightHandle, SceneError> {
        let identity = light.identity();
        if self.contains_identity(identity) {
            return Err(SceneError::DuplicateIdentity(identity));
        }
        Ok(self.lights.insert(light))
    }

    /// Whether a light or object with `identity` is registered
    pub fn contains_identity(&self, identity: IdentityToken) -> bool {
        self.lights.values().any(|light| light.identity() == identity)
            || self.objects.values().any(|object| object.identity() == identity)
    }

    /// Light by handle
    pub fn light(&self, handle: LightHandle) -> Option<&Light> {
        self.lights.get(handle)
    }

    /// Mutable light by handle
    pub fn light_mut(&mut self, handle: LightHandle) -> Option<&mut Light> {
        self.lights.get_mut(handle)
    }

    /// Remove a light
    pub fn remove_light(&mut self, handle: LightHandle) -> Option<Light> {
        self.lights.remove(handle)
    }

    /// All lights
    pub fn lights(&self) -> impl Iterator<Item = (LightHandle, &Light)> {
        self.lights.iter()
    }

    /// Number of lights
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    // ---- objects ----

    /// Create an object instancing a mesh registered in this scene
    pub fn create_object(&mut self, mesh: &SharedMesh, name: impl Into<String>) -> Result<ObjectHandle, SceneError> {
        let name = name.into();
        if self.mesh_index(mesh).is_none() {
            return Err(SceneError::UnresolvedMesh {
                object: name,
                mesh: mesh.try_borrow().map(|mesh| mesh.name().to_string()).unwrap_or_default(),
            });
        }
        Ok(self.objects.insert(Object::new(Rc::clone(mesh), name)))
    }

    /// Create an object instancing the mesh registered at `index`
    pub fn create_object_by_mesh_index(&mut self, index: u32, name: impl Into<String>) -> Result<ObjectHandle, SceneError> {
        let mesh = Rc::clone(self.mesh(index).ok_or(SceneError::MissingMesh(index))?);
        Ok(self.objects.insert(Object::new(mesh, name)))
    }

    /// Create an object instancing the first mesh registered under `mesh_name`
    pub fn create_object_by_mesh_name(&mut self, mesh_name: &str, name: impl Into<String>) -> Result<ObjectHandle, SceneError> {
        let mesh = Rc::clone(
            self.mesh_by_name(mesh_name)
                .ok_or_else(|| SceneError::UnknownMeshName(mesh_name.to_string()))?,
        );
        Ok(self.objects.insert(Object::new(mesh, name)))
    }

    /// Object by handle
    pub fn object(&self, handle: ObjectHandle) -> Option<&Object> {
        self.objects.get(handle)
    }

    /// Mutable object by handle
    pub fn object_mut(&mut self, handle: ObjectHandle) -> Option<&mut Object> {
        self.objects.get_mut(handle)
    }

    /// Remove an object, releasing its share of the mesh
    pub fn remove_object(&mut self, handle: ObjectHandle) -> Option<Object> {
        self.objects.remove(handle)
    }

    /// All objects
    pub fn objects(&self) -> impl Iterator<Item = (ObjectHandle, &Object)> {
        self.objects.iter()
    }

    /// Number of objects
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    // ---- finalize ----

    /// Finalize every entity
    ///
    /// Lights first, then objects (each finalizing its mesh), then any mesh no
    /// object reached. Returns how many per-kind hooks ran.
    pub fn finalize(&mut self, force: bool) -> Result<usize, SceneError> {
        let scene = self.handle;
        let before = self.hook_invocations();

        for light in self.lights.values_mut() {
            light.finalize(scene, force)?;
        }

        for object in self.objects.values_mut() {
            object.finalize(scene, force)?;
        }

        for mesh in &self.meshes {
            mesh.try_borrow_mut()
                .map_err(|_| SceneError::MeshBorrowed(self.name.clone()))?
                .finalize(scene, force)?;
        }

        let ran = self.hook_invocations() - before;
        log::debug!(
            "Finalize pass over '{}' ran {} hook(s) (force: {})",
            self.name,
            ran,
            force
        );
        Ok(ran)
    }

    fn hook_invocations(&self) -> usize {
        let lights = self.lights.values().map(|light| light.finalize_state().passes());
        let objects = self.objects.values().map(|object| object.finalize_state().passes());
        let meshes = self
            .meshes
            .iter()
            .filter_map(|mesh| mesh.try_borrow().ok().map(|mesh| mesh.finalize_state().passes()));
        lights.chain(objects).chain(meshes).map(|passes| passes as usize).sum()
    }

    /// Finalize a single light
    pub fn finalize_light(&mut self, handle: LightHandle, force: bool) -> Result<bool, SceneError> {
        let scene = self.handle;
        self.lights
            .get_mut(handle)
            .ok_or(SceneError::UnknownLight(handle))?
            .finalize(scene, force)
    }

    /// Finalize a single object and its mesh
    pub fn finalize_object(&mut self, handle: ObjectHandle, force: bool) -> Result<bool, SceneError> {
        let scene = self.handle;
        self.objects
            .get_mut(handle)
            .ok_or(SceneError::UnknownObject(handle))?
            .finalize(scene, force)
    }

    // ---- serialization ----

    /// Write the scene with the current format version
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), SceneError> {
        let mut writer = BinaryWriter::new(writer);

        writer.write_bytes(&SCENE_MAGIC)?;
        writer.write_u32(CURRENT_FORMAT_VERSION)?;
        writer.write_string(&self.name)?;

        writer.write_len(self.meshes.len())?;
        let mut mesh_indices: HashMap<*const RefCell<Mesh>, u32> = HashMap::with_capacity(self.meshes.len());
        for (index, mesh) in (0u32..).zip(&self.meshes) {
            mesh.try_borrow()
                .map_err(|_| SceneError::MeshBorrowed(self.name.clone()))?
                .serialize(&mut writer)?;
            mesh_indices.insert(Rc::as_ptr(mesh), index);
        }

        writer.write_len(self.lights.len())?;
        for light in self.lights.values() {
            light.serialize(&mut writer)?;
        }

        writer.write_len(self.objects.len())?;
        for object in self.objects.values() {
            object.serialize(&mut writer, |mesh| mesh_indices.get(&Rc::as_ptr(mesh)).copied())?;
        }

        log::debug!(
            "Wrote scene '{}': {} meshes, {} lights, {} objects, {} bytes",
            self.name,
            self.meshes.len(),
            self.lights.len(),
            self.objects.len(),
            writer.bytes_written()
        );
        Ok(())
    }

    /// Read a scene with default settings
    pub fn read_from<R: Read>(reader: R) -> Result<Self, SceneError> {
        Self::read_from_with(reader, &SceneConfig::default())
    }

    /// Read a scene, applying the string limit and post-load finalize from `config`
    ///
    /// The loaded scene gets a fresh handle; identity tokens are preserved.
    pub fn read_from_with<R: Read>(reader: R, config: &SceneConfig) -> Result<Self, SceneError> {
        let mut reader = BinaryReader::with_string_limit(reader, config.max_string_length);

        let mut magic = [0u8; 4];
        reader.read_bytes(&mut magic)?;
        if magic != SCENE_MAGIC {
            return Err(FormatError::InvalidMagic.into());
        }

        let version = io::check_version(reader.read_u32()?)?;
        if version < CURRENT_FORMAT_VERSION {
            log::warn!("Reading scene written with format version {version} (current is {CURRENT_FORMAT_VERSION})");
        }

        let mut scene = Self::new(reader.read_string()?);
        let mut identities = HashSet::new();

        let mesh_count = reader.read_u32()?;
        for _ in 0..mesh_count {
            let mesh = Mesh::deserialize(version, &mut reader, scene.handle)?;
            scene.register_mesh(mesh.into_shared());
        }

        let light_count = reader.read_u32()?;
        for _ in 0..light_count {
            let light = Light::deserialize(version, &mut reader)?;
            if !identities.insert(light.identity()) {
                return Err(SceneError::DuplicateIdentity(light.identity()));
            }
            scene.lights.insert(light);
        }

        let object_count = reader.read_u32()?;
        for _ in 0..object_count {
            let object = Object::deserialize(version, &mut reader, |index| scene.mesh(index).cloned())?;
            if !identities.insert(object.identity()) {
                return Err(SceneError::DuplicateIdentity(object.identity()));
            }
            scene.objects.insert(object);
        }

        log::debug!(
            "Read scene '{}' (version {}): {} meshes, {} lights, {} objects",
            scene.name,
            version,
            scene.meshes.len(),
            scene.lights.len(),
            scene.objects.len()
        );

        if config.finalize_after_load {
            scene.finalize(false)?;
        }
        Ok(scene)
    }
}
