//! Integration tests for scene serialization
//!
//! Covers index resolution totality, instancing, version compatibility and the
//! bit-exact round trip of every placeable entity.

use std::rc::Rc;

use super::quad;
use crate::config::SceneConfig;
use crate::foundation::math::{Quat, Rgba, ScaledTransform, Vec3};
use crate::io::{FormatError, CURRENT_FORMAT_VERSION, FORMAT_VERSION_INITIAL, SCENE_MAGIC};
use crate::scene::{Finalize, LightType, Scene, SceneError, WorldEntity};
use crate::foundation::logging;

fn write(scene: &Scene) -> Vec<u8> {
    let mut bytes = Vec::new();
    scene.write_to(&mut bytes).unwrap();
    bytes
}

#[test]
fn test_example_scenario_shares_one_mesh() {
    logging::try_init();
    let mut scene = Scene::new("example");
    let m0 = quad(&mut scene, "m0");
    let o1 = scene.create_object(&m0, "o1").unwrap();
    let o2 = scene.create_object(&m0, "o2").unwrap();
    assert_eq!(scene.mesh_index(&m0), Some(0));

    let loaded = Scene::read_from(write(&scene).as_slice()).unwrap();
    let m0_loaded = loaded.mesh(0).unwrap();

    let o1_loaded = loaded.objects().find(|(_, o)| o.name() == "o1").unwrap().1;
    let o2_loaded = loaded.objects().find(|(_, o)| o.name() == "o2").unwrap().1;
    assert!(Rc::ptr_eq(o1_loaded.mesh(), m0_loaded));
    assert!(Rc::ptr_eq(o2_loaded.mesh(), m0_loaded));
    assert!(!Rc::ptr_eq(m0_loaded, &m0));

    assert_eq!(o1_loaded.identity(), scene.object(o1).unwrap().identity());
    assert_eq!(o2_loaded.identity(), scene.object(o2).unwrap().identity());
}

#[test]
fn test_index_resolution_reconstructs_every_link() {
    let mut scene = Scene::new("many");
    let meshes: Vec<_> = (0..3).map(|i| quad(&mut scene, &format!("mesh{i}"))).collect();
    for n in 0..7 {
        let mesh = &meshes[n % meshes.len()];
        scene.create_object(mesh, format!("object{n}")).unwrap();
    }

    let loaded = Scene::read_from(write(&scene).as_slice()).unwrap();

    assert_eq!(loaded.mesh_count(), 3);
    assert_eq!(loaded.object_count(), 7);
    for (_, original) in scene.objects() {
        let (_, copy) = loaded
            .objects()
            .find(|(_, o)| o.identity() == original.identity())
            .unwrap();
        let original_index = scene.mesh_index(original.mesh()).unwrap();
        assert_eq!(loaded.mesh_index(copy.mesh()), Some(original_index));
        assert_eq!(copy.name(), original.name());
    }
}

#[test]
fn test_round_trip_preserves_transforms_bit_for_bit() {
    let mut scene = Scene::new("transforms");
    let mesh = quad(&mut scene, "quad");
    let object = scene.create_object(&mesh, "odd").unwrap();
    scene.object_mut(object).unwrap().world_object_mut().set_transform(ScaledTransform::new(
        Vec3::new(f32::NAN, -0.0, 1e-30),
        Quat::from_axis_angle(&Vec3::x_axis(), 1.0),
        Vec3::new(-1.0, 0.0, 3.5),
    ));
    let light = scene.create_light(LightType::Area);
    scene.light_mut(light).unwrap().set_position(Vec3::new(0.0, 5.0, 0.0));

    let loaded = Scene::read_from(write(&scene).as_slice()).unwrap();

    let original = scene.object(object).unwrap();
    let (_, copy) = loaded.objects().next().unwrap();
    assert_eq!(copy.identity(), original.identity());
    assert!(copy.transform().bits_eq(original.transform()));

    let original = scene.light(light).unwrap();
    let (_, copy) = loaded.lights().next().unwrap();
    assert_eq!(copy.identity(), original.identity());
    assert!(copy.transform().bits_eq(original.transform()));
    assert_eq!(copy.light_type(), LightType::Area);
}

#[test]
fn test_light_parameters_survive_round_trip() {
    let mut scene = Scene::new("lights");
    let handle = scene.create_light(LightType::Spot);
    {
        let light = scene.light_mut(handle).unwrap();
        light.set_color(Rgba::new(0.2, 0.4, 0.6, 0.0));
        light.set_cone_angle(0.7, 0.3);
        light.set_intensity(1200.0);
    }

    let loaded = Scene::read_from(write(&scene).as_slice()).unwrap();
    let (_, light) = loaded.lights().next().unwrap();

    assert_eq!(light.color(), Vec3::new(0.2, 0.4, 0.6));
    assert_eq!(light.cone_angle(), 0.7);
    assert_eq!(light.cone_blend(), 0.3);
    assert_eq!(light.intensity(), 1200.0);
}

#[test]
fn test_unregistered_mesh_cannot_be_instanced() {
    let mut scene = Scene::new("a");
    let mut other = Scene::new("b");
    let foreign = quad(&mut other, "foreign");

    let err = scene.create_object(&foreign, "stray").unwrap_err();

    assert!(matches!(err, SceneError::UnresolvedMesh { .. }));
    assert!(matches!(
        scene.create_object_by_mesh_index(4, "stray"),
        Err(SceneError::MissingMesh(4))
    ));
    assert!(matches!(
        scene.create_object_by_mesh_name("nope", "stray"),
        Err(SceneError::UnknownMeshName(_))
    ));
}

#[test]
fn test_lookup_by_name_and_index() {
    let mut scene = Scene::new("lookup");
    let a = quad(&mut scene, "a");
    let b = quad(&mut scene, "b");

    let by_name = scene.create_object_by_mesh_name("b", "x").unwrap();
    let by_index = scene.create_object_by_mesh_index(0, "y").unwrap();

    assert!(scene.object(by_name).unwrap().shares_mesh(&b));
    assert!(scene.object(by_index).unwrap().shares_mesh(&a));
}

#[test]
fn test_removing_objects_releases_mesh_shares() {
    let mut scene = Scene::new("release");
    let mesh = quad(&mut scene, "quad");
    let a = scene.create_object(&mesh, "a").unwrap();
    let b = scene.create_object(&mesh, "b").unwrap();
    assert_eq!(Rc::strong_count(&mesh), 4);

    scene.remove_object(a);
    scene.remove_object(b);

    assert_eq!(Rc::strong_count(&mesh), 2);
}

#[test]
fn test_bad_magic_is_rejected() {
    let mut bytes = write(&Scene::new("magic"));
    bytes[0] = b'X';

    let err = Scene::read_from(bytes.as_slice()).unwrap_err();

    assert!(matches!(err, SceneError::Format(FormatError::InvalidMagic)));
}

#[test]
fn test_future_version_is_rejected() {
    let mut bytes = write(&Scene::new("future"));
    bytes[4..8].copy_from_slice(&(CURRENT_FORMAT_VERSION + 1).to_le_bytes());

    let err = Scene::read_from(bytes.as_slice()).unwrap_err();

    assert!(matches!(err, SceneError::Format(FormatError::UnsupportedVersion(_))));
}

#[test]
fn test_initial_version_stream_still_loads() {
    let mut scene = Scene::new("legacy");
    let mesh = quad(&mut scene, "quad");
    scene.create_object(&mesh, "o").unwrap();
    let light = scene.create_light(LightType::Area);
    scene.light_mut(light).unwrap().set_intensity(42.0);

    // Rewrite as a version 1 stream: same bytes minus the trailing light block fields.
    let current = write(&scene);
    let header_len = SCENE_MAGIC.len() + 4 + 4 + "legacy".len();
    let mesh_len = 4 + (4 + "quad".len()) + (4 + 4 * 12) + (4 + 6 * 4);
    let light_start = header_len + mesh_len + 4;
    let light_v1_end = light_start + 56 + 8 + 28;
    let light_v2_end = light_v1_end + 32;

    let mut legacy = current[..light_start].to_vec();
    legacy[4..8].copy_from_slice(&FORMAT_VERSION_INITIAL.to_le_bytes());
    legacy.extend_from_slice(&current[light_start..light_v1_end]);
    legacy.extend_from_slice(&current[light_v2_end..]);

    let loaded = Scene::read_from(legacy.as_slice()).unwrap();

    let (_, light) = loaded.lights().next().unwrap();
    assert_eq!(light.intensity(), 42.0);
    assert_eq!(light.axis_u(), Vec3::x());
    assert_eq!(loaded.object_count(), 1);
}

#[test]
fn test_string_limit_from_config() {
    let scene = Scene::new("a scene with a rather long name");
    let config = SceneConfig { max_string_length: 8, ..SceneConfig::default() };

    let err = Scene::read_from_with(write(&scene).as_slice(), &config).unwrap_err();

    assert!(matches!(err, SceneError::Format(FormatError::StringTooLong { .. })));
}

#[test]
fn test_finalize_after_load_from_config() {
    let mut scene = Scene::new("autolink");
    let mesh = quad(&mut scene, "quad");
    scene.create_object(&mesh, "o").unwrap();
    let config = SceneConfig { finalize_after_load: true, ..SceneConfig::default() };

    let loaded = Scene::read_from_with(write(&scene).as_slice(), &config).unwrap();

    let (_, object) = loaded.objects().next().unwrap();
    assert!(object.is_finalized());
    assert!(loaded.mesh(0).unwrap().borrow().is_finalized());
}

#[test]
fn test_loaded_scene_gets_fresh_handle() {
    let mut scene = Scene::new("handles");
    quad(&mut scene, "quad");

    let loaded = Scene::read_from(write(&scene).as_slice()).unwrap();

    assert_ne!(loaded.handle(), scene.handle());
    assert_eq!(loaded.mesh(0).unwrap().borrow().owner().scene(), loaded.handle());
    assert_eq!(loaded.name(), "handles");
}
