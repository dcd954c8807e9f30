//! Scene-level scenario tests

mod finalize_pass;
mod serialization;

use crate::scene::{Scene, SharedMesh};

/// Unit quad registered under `name`
fn quad(scene: &mut Scene, name: &str) -> SharedMesh {
    scene.create_mesh(
        name,
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        vec![0, 1, 2, 0, 2, 3],
    )
}
