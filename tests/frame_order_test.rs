mod common;

use common::{Call, RecordingBackend, test_config};
use tidewater::{HeldKeys, MaterialKind, Scene, WaterScene, material, run_frame};

fn ready_scene() -> (WaterScene, RecordingBackend) {
    let mut backend = RecordingBackend::new();
    let mut scene = WaterScene::new(test_config());
    scene.init(&mut backend).unwrap();
    backend.clear_calls();
    (scene, backend)
}

/// Calls between `begin_frame` and `end_frame`, draws reduced to their material kind.
fn frame_shape(backend: &RecordingBackend) -> Vec<String> {
    let begin = backend
        .calls
        .iter()
        .position(|c| *c == Call::BeginFrame)
        .unwrap();
    backend.calls[begin..]
        .iter()
        .map(|call| match call {
            Call::Draw(d) => format!(
                "draw {:?}",
                backend.material_kind(d.material).unwrap()
            ),
            Call::Bind(_) => "bind".into(),
            Call::Unbind(_) => "unbind".into(),
            Call::Clear => "clear".into(),
            Call::DepthTest(on) => format!("depth {on}"),
            Call::BeginFrame => "begin".into(),
            Call::EndFrame => "end".into(),
            other => format!("{other:?}"),
        })
        .collect()
}

#[test]
fn one_frame_renders_offscreen_then_composites() {
    let (mut scene, mut backend) = ready_scene();

    run_frame(&mut scene, &mut backend, 0.016, &HeldKeys::new()).unwrap();

    assert_eq!(
        frame_shape(&backend),
        vec![
            "begin",
            "bind",
            "clear",
            "depth false",
            "draw Sky",
            "depth true",
            "draw Phong",
            "draw Water",
            "unbind",
            "clear",
            "depth false",
            "draw PostFx",
            "depth true",
            "end",
        ]
    );
}

#[test]
fn scene_draws_go_to_the_target_and_the_canvas_to_the_screen() {
    let (mut scene, mut backend) = ready_scene();
    let target = scene.target().unwrap();
    let (canvas, post_fx) = scene.compositor().unwrap();

    run_frame(&mut scene, &mut backend, 0.016, &HeldKeys::new()).unwrap();

    let draws = backend.draws();
    assert_eq!(draws.len(), 4);
    for draw in &draws[..3] {
        assert_eq!(draw.target, Some(target));
    }
    let composite = draws[3];
    assert_eq!(composite.target, None);
    assert_eq!((composite.mesh, composite.material), (canvas, post_fx));
    assert!(!composite.depth_test);
}

#[test]
fn only_the_terrain_is_lit() {
    let (mut scene, mut backend) = ready_scene();

    run_frame(&mut scene, &mut backend, 0.016, &HeldKeys::new()).unwrap();

    let lit: Vec<_> = backend
        .draws()
        .iter()
        .filter(|d| d.lit)
        .map(|d| backend.material_kind(d.material).unwrap())
        .collect();
    assert_eq!(lit, vec![MaterialKind::Phong]);
}

#[test]
fn each_draw_records_one_pass() {
    let (mut scene, mut backend) = ready_scene();

    for _ in 0..3 {
        run_frame(&mut scene, &mut backend, 0.016, &HeldKeys::new()).unwrap();
    }

    let binds = backend
        .calls
        .iter()
        .filter(|c| matches!(c, Call::Bind(_)))
        .count();
    let unbinds = backend
        .calls
        .iter()
        .filter(|c| matches!(c, Call::Unbind(_)))
        .count();
    assert_eq!((binds, unbinds), (3, 3));
    assert_eq!(backend.draws().len(), 12);
}

#[test]
fn update_pushes_animation_uniforms() {
    let (mut scene, mut backend) = ready_scene();
    let (_, post_fx) = scene.compositor().unwrap();

    scene
        .update(&mut backend, 0.25, &HeldKeys::new())
        .unwrap();

    let names: Vec<_> = backend
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::SetUniform(_, name) => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        names,
        vec![
            material::U_TEX_OFFSET1,
            material::U_TEX_OFFSET2,
            material::U_TIME,
            material::U_PERCENT,
        ]
    );
    assert_eq!(
        backend.uniform(post_fx, material::U_PERCENT),
        Some(tidewater::UniformValue::Float(0.25))
    );
    // nothing is drawn during update
    assert!(backend.draws().is_empty());
}

#[test]
fn resize_updates_texel_size_and_aspect() {
    let (mut scene, mut backend) = ready_scene();
    let (_, post_fx) = scene.compositor().unwrap();

    scene.resize(&mut backend, 400, 200).unwrap();

    assert_eq!(scene.camera().aspect, 2.0);
    assert_eq!(
        backend.uniform(post_fx, material::U_TEXEL),
        Some(tidewater::UniformValue::Vec2(tidewater::Vec2::new(
            1.0 / 400.0,
            1.0 / 200.0
        )))
    );
}

#[test]
fn drawing_straight_after_init_uses_the_initial_state() {
    let (mut scene, mut backend) = ready_scene();

    tidewater::RenderBackend::begin_frame(&mut backend);
    scene.draw(&mut backend).unwrap();
    tidewater::RenderBackend::end_frame(&mut backend).unwrap();

    assert_eq!(backend.draws().len(), 4);
    assert!(
        backend
            .draws()
            .iter()
            .all(|d| d.camera_position == scene.camera().position || d.target.is_none())
    );
    assert_eq!(scene.effect_percent(), 0.0);
}

#[test]
fn failed_scene_draw_still_unbinds_the_target() {
    let (mut scene, mut backend) = ready_scene();
    let target = scene.target().unwrap();
    backend.fail_draw = Some(MaterialKind::Phong);

    let err = run_frame(&mut scene, &mut backend, 0.016, &HeldKeys::new()).unwrap_err();

    assert!(matches!(
        err,
        tidewater::SceneError::Surface(wgpu::SurfaceError::Outdated)
    ));
    assert_eq!(
        frame_shape(&backend),
        vec![
            "begin",
            "bind",
            "clear",
            "depth false",
            "draw Sky",
            "depth true",
            "unbind",
            "end",
        ]
    );
    assert!(backend.calls.contains(&Call::Unbind(target)));

    // nesting is intact, so the next frame renders normally
    backend.fail_draw = None;
    backend.clear_calls();
    run_frame(&mut scene, &mut backend, 0.016, &HeldKeys::new()).unwrap();
    assert_eq!(backend.draws().len(), 4);
}

#[test]
fn failed_update_does_not_advance_the_scene() {
    let (mut scene, mut backend) = ready_scene();
    let camera = *scene.camera();
    let clouds = scene.clouds();
    let forward: HeldKeys = [tidewater::SceneKey::Forward].into_iter().collect();
    backend.fail_uniforms = true;

    assert!(scene.update(&mut backend, 0.5, &forward).is_err());

    assert_eq!(*scene.camera(), camera);
    assert_eq!(scene.clouds(), clouds);
    assert_eq!(scene.water_time(), 0.0);
    assert_eq!(scene.effect_percent(), 0.0);
    assert_eq!(scene.phase(), tidewater::Phase::Ready);

    // a retry advances exactly once
    backend.fail_uniforms = false;
    scene.update(&mut backend, 0.5, &forward).unwrap();
    assert_eq!(scene.water_time(), 0.5);
    assert_eq!(scene.effect_percent(), 0.5);
    assert!(((scene.camera().position - camera.position).length() - 10.0).abs() < 1e-4);
}
