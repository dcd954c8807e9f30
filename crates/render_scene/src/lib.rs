//! # Render Scene
//!
//! Renderer-agnostic scene description handed to an offline render back end.
//!
//! ## Features
//!
//! - **Object Model**: Lights and mesh instances built on a shared placeable base
//! - **Instancing**: Objects share meshes through reference-counted ownership
//! - **Versioned Binary Format**: Records stay readable across format revisions
//! - **Two-Phase Finalize**: Idempotent linking pass with per-kind hooks
//! - **Color Management**: Pluggable display transforms for rendered output
//!
//! ## Quick Start
//!
//! ```rust
//! use render_scene::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     let mut scene = Scene::new("studio");
//!     let cube = scene.create_mesh("cube", vec![[0.0, 0.0, 0.0]; 8], vec![0, 1, 2]);
//!     let left = scene.create_object(&cube, "left")?;
//!     let right = scene.create_object(&cube, "right")?;
//!     scene.create_light(LightType::Spot);
//!
//!     scene.finalize(false)?;
//!
//!     let mut bytes = Vec::new();
//!     scene.write_to(&mut bytes)?;
//!     let loaded = Scene::read_from(bytes.as_slice())?;
//!
//!     assert_eq!(loaded.object_count(), 2);
//!     # let _ = (left, right);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod io;
pub mod scene;
pub mod color;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        foundation::math::{Quat, Rgb, Rgba, ScaledTransform, Vec3},
        scene::{
            Finalize, IdentityToken, Light, LightHandle, LightShape, LightType, Mesh, Object,
            ObjectHandle, Scene, SceneError, SceneHandle, SharedMesh, WorldEntity, WorldObject,
        },
        io::{FormatError, CURRENT_FORMAT_VERSION},
        config::{Config, ConfigError, SceneConfig},
        color::{
            BitDepth, BuiltinColorPipeline, ColorConfig, ColorError, ColorProcessor,
            ColorProcessorFactory,
        },
    };
}
