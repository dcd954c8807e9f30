//! Non-owning back-reference from an entity to the scene that created it

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::SceneError;

static NEXT_SCENE_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Process-unique handle naming a [`Scene`](super::Scene)
///
/// Handles are never reused, so a stale back-reference cannot silently
/// resolve to a different scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneHandle(u64);

impl SceneHandle {
    pub(crate) fn allocate() -> Self {
        Self(NEXT_SCENE_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw handle value
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SceneHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scene#{}", self.0)
    }
}

/// Back-reference held by entities that need scene context
///
/// Stores only the owning scene's handle. The scene owns the entity, never
/// the other way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneObject {
    scene: SceneHandle,
}

impl SceneObject {
    /// Reference `scene`
    pub fn new(scene: SceneHandle) -> Self {
        Self { scene }
    }

    /// Handle of the owning scene
    pub fn scene(&self) -> SceneHandle {
        self.scene
    }

    /// Check that `scene` is the owning scene
    pub fn resolve(&self, scene: SceneHandle) -> Result<SceneHandle, SceneError> {
        if self.scene == scene {
            Ok(scene)
        } else {
            Err(SceneError::UnresolvedSceneReference {
                expected: self.scene,
                found: scene,
            })
        }
    }
}
