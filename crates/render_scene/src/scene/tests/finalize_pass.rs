//! Integration tests for the scene finalize pass

use std::rc::Rc;

use super::quad;
use crate::scene::{Finalize, LightType, Mesh, Object, Scene, SceneError};

#[test]
fn test_pass_finalizes_every_entity_once() {
    let mut scene = Scene::new("pass");
    let shared = quad(&mut scene, "shared");
    let unused = quad(&mut scene, "unused");
    scene.create_object(&shared, "a").unwrap();
    scene.create_object(&shared, "b").unwrap();
    scene.create_light(LightType::Point);

    // 1 light + 2 objects + 2 meshes
    assert_eq!(scene.finalize(false).unwrap(), 5);

    assert!(scene.objects().all(|(_, o)| o.is_finalized()));
    assert!(scene.lights().all(|(_, l)| l.is_finalized()));
    assert_eq!(shared.borrow().finalize_state().passes(), 1);
    assert_eq!(unused.borrow().finalize_state().passes(), 1);
}

#[test]
fn test_second_pass_is_noop() {
    let mut scene = Scene::new("idempotent");
    let mesh = quad(&mut scene, "quad");
    let handle = scene.create_object(&mesh, "o").unwrap();
    scene.finalize(false).unwrap();
    let object_state = *scene.object(handle).unwrap().finalize_state();
    let mesh_state = *mesh.borrow().finalize_state();

    assert_eq!(scene.finalize(false).unwrap(), 0);

    assert_eq!(*scene.object(handle).unwrap().finalize_state(), object_state);
    assert_eq!(*mesh.borrow().finalize_state(), mesh_state);
}

#[test]
fn test_forced_pass_reruns_every_hook() {
    let mut scene = Scene::new("forced");
    let mesh = quad(&mut scene, "quad");
    let handle = scene.create_object(&mesh, "o").unwrap();
    scene.create_light(LightType::Sun);
    scene.finalize(false).unwrap();

    assert_eq!(scene.finalize(true).unwrap(), 3);
    assert_eq!(scene.finalize(true).unwrap(), 3);

    assert_eq!(scene.object(handle).unwrap().finalize_state().passes(), 3);
    assert_eq!(mesh.borrow().finalize_state().passes(), 3);
}

#[test]
fn test_single_entity_finalize() {
    let mut scene = Scene::new("single");
    let mesh = quad(&mut scene, "quad");
    let object = scene.create_object(&mesh, "o").unwrap();
    let light = scene.create_light(LightType::Spot);

    assert!(scene.finalize_object(object, false).unwrap());
    assert!(!scene.finalize_object(object, false).unwrap());
    assert!(mesh.borrow().is_finalized());
    assert!(scene.finalize_light(light, false).unwrap());

    scene.remove_light(light);
    assert!(matches!(scene.finalize_light(light, false), Err(SceneError::UnknownLight(_))));
    scene.remove_object(object);
    assert!(matches!(scene.finalize_object(object, false), Err(SceneError::UnknownObject(_))));
}

#[test]
fn test_failed_cascade_can_be_retried() {
    let mut scene = Scene::new("order");
    let mesh = quad(&mut scene, "quad");
    let mut object = Object::new(Rc::clone(&mesh), "o");

    // Holding the mesh makes the cascade fail after the flag was set;
    // the object is restored to unfinalized.
    let guard = mesh.borrow_mut();
    assert!(matches!(object.finalize(scene.handle(), false), Err(SceneError::MeshBorrowed(_))));
    drop(guard);
    assert!(!object.is_finalized());

    assert!(object.finalize(scene.handle(), false).unwrap());
    assert!(object.is_finalized());
    assert!(mesh.borrow().is_finalized());
}

#[test]
fn test_mesh_from_another_scene_fails_finalize() {
    let mut home = Scene::new("home");
    let mut away = Scene::new("away");
    let foreign = quad(&mut away, "foreign");
    let mut object = Object::new(Rc::clone(&foreign), "visitor");

    let err = object.finalize(home.handle(), false).unwrap_err();

    assert!(matches!(err, SceneError::UnresolvedSceneReference { expected, found }
        if expected == away.handle() && found == home.handle()));
    assert!(matches!(
        home.add_mesh(Mesh::new(away.handle(), "wrong owner")),
        Err(SceneError::UnresolvedSceneReference { .. })
    ));
    assert!(home.add_mesh(Mesh::new(home.handle(), "right owner")).is_ok());
}
