mod common;

use common::{Call, RecordingBackend, test_config};
use tidewater::{HeldKeys, Phase, Resource, Scene, SceneError, WaterScene, run_frame};

#[test]
fn init_creates_every_resource() {
    let mut backend = RecordingBackend::new();
    let mut scene = WaterScene::new(test_config());

    scene.init(&mut backend).unwrap();

    assert_eq!(scene.phase(), Phase::Ready);
    // 4 meshes, 7 textures, 4 materials, 1 target
    assert_eq!(backend.created(), 16);
    assert_eq!(backend.live.len(), 16);
    assert!(scene.target().is_some());
    assert_eq!(scene.graph().map(|g| g.len()), Some(3));
}

#[test]
fn init_applies_raster_state_and_aspect() {
    let mut backend = RecordingBackend::new();
    backend.viewport = (1000, 500);
    let mut scene = WaterScene::new(test_config().wireframe(true));

    scene.init(&mut backend).unwrap();

    let raster = backend.raster.unwrap();
    assert!(raster.depth_test);
    assert!(raster.cull_back_faces);
    assert!(raster.wireframe);
    assert_eq!(scene.camera().aspect, 2.0);
}

#[test]
fn deinit_releases_everything_once() {
    let mut backend = RecordingBackend::new();
    let mut scene = WaterScene::new(test_config());
    scene.init(&mut backend).unwrap();
    run_frame(&mut scene, &mut backend, 0.016, &HeldKeys::new()).unwrap();

    scene.deinit(&mut backend).unwrap();

    assert!(backend.live.is_empty());
    assert_eq!(backend.released.len(), 16);
    assert_eq!(scene.phase(), Phase::Deinitialized);
    assert_eq!(scene.target(), None);

    // a second deinit is a no-op
    let released = backend.released.len();
    scene.deinit(&mut backend).unwrap();
    assert_eq!(backend.released.len(), released);
}

#[test]
fn materials_are_released_before_what_they_sample() {
    let mut backend = RecordingBackend::new();
    let mut scene = WaterScene::new(test_config());
    scene.init(&mut backend).unwrap();
    let target = scene.target().unwrap();
    let (_, post_fx) = scene.compositor().unwrap();

    scene.deinit(&mut backend).unwrap();

    let position = |resource: Resource| {
        backend
            .released
            .iter()
            .position(|r| *r == resource)
            .unwrap()
    };
    assert!(position(Resource::Material(post_fx)) < position(Resource::Target(target)));
    assert!(matches!(backend.released.last(), Some(Resource::Mesh(_))));
}

#[test]
fn deinit_before_init_does_nothing() {
    let mut backend = RecordingBackend::new();
    let mut scene = WaterScene::new(test_config());

    scene.deinit(&mut backend).unwrap();

    assert!(backend.calls.is_empty());
    assert_eq!(scene.phase(), Phase::Uninitialized);
}

#[test]
fn failed_init_rolls_back() {
    let mut backend = RecordingBackend::failing_on("scene target");
    let mut scene = WaterScene::new(test_config());

    let err = scene.init(&mut backend).unwrap_err();

    assert!(matches!(err, SceneError::Geometry(_)));
    assert_eq!(scene.phase(), Phase::Uninitialized);
    assert!(backend.live.is_empty());
    // everything created before the target
    assert_eq!(backend.released.len(), 14);
}

#[test]
fn missing_asset_directory_fails_before_touching_the_backend() {
    let mut backend = RecordingBackend::new();
    let config = test_config().assets(tidewater::AssetSource::Directory(
        "/nonexistent/tidewater/resources".into(),
    ));
    let mut scene = WaterScene::new(config);

    let err = scene.init(&mut backend).unwrap_err();

    assert!(matches!(err, SceneError::Asset { .. }));
    assert!(backend.calls.is_empty());
}

#[test]
fn frame_is_ended_even_when_presenting_fails() {
    let mut backend = RecordingBackend::new();
    let mut scene = WaterScene::new(test_config());
    scene.init(&mut backend).unwrap();
    backend.fail_present = true;

    let err = run_frame(&mut scene, &mut backend, 0.016, &HeldKeys::new()).unwrap_err();

    assert!(matches!(err, SceneError::Surface(_)));
    assert_eq!(backend.calls.last(), Some(&Call::EndFrame));
    // the next frame still runs
    backend.fail_present = false;
    run_frame(&mut scene, &mut backend, 0.016, &HeldKeys::new()).unwrap();
}

#[test]
#[cfg_attr(debug_assertions, should_panic)]
fn drawing_before_init_is_misuse() {
    let mut backend = RecordingBackend::new();
    let mut scene = WaterScene::new(test_config());

    let result = scene.draw(&mut backend);

    assert!(matches!(result, Err(SceneError::Lifecycle { op: "draw", .. })));
}

#[test]
#[cfg_attr(debug_assertions, should_panic)]
fn initializing_twice_is_misuse() {
    let mut backend = RecordingBackend::new();
    let mut scene = WaterScene::new(test_config());
    scene.init(&mut backend).unwrap();

    let result = scene.init(&mut backend);

    assert!(matches!(result, Err(SceneError::Lifecycle { op: "init", .. })));
}
