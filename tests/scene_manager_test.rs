use approx::assert_relative_eq;
use pcb_pivot::{
    Control, Mode, SceneConfig, SceneManager, data_structures::instance::Instance,
    render::Renderer,
};

use crate::common::test_utils::{Call, Probe, RecordingRenderer};

mod common;

fn mounted(config: SceneConfig) -> (SceneManager<RecordingRenderer>, Probe) {
    let (renderer, probe) = RecordingRenderer::new(Some((800, 600)));
    let mut manager = SceneManager::new(config);
    manager.mount(renderer).unwrap();
    assert!(manager.is_mounted());
    (manager, probe)
}

fn object_position(manager: &SceneManager<RecordingRenderer>) -> [f32; 3] {
    manager.scene().unwrap().object_world().position.into()
}

#[test]
fn mount_builds_the_scene_for_the_initial_mode() {
    let (manager, probe) = mounted(SceneConfig::default());

    let scene = manager.scene().unwrap();
    assert_eq!(scene.mode(), Mode::Broken);
    assert!(manager.renderer().unwrap().is_attached());
    assert_relative_eq!(manager.projection().unwrap().aspect(), 800.0 / 600.0);

    let calls = probe.calls();
    assert_eq!(calls[0], Call::Attach);
    assert_eq!(calls[1], Call::Resize(800, 600));
    assert!(matches!(calls[2], Call::Upload(n) if n > 0));
    assert_eq!(
        probe.last_status().unwrap(),
        manager.state().status(),
    );
    assert_eq!(probe.frame_requests(), 1);
}

#[test]
fn mount_honours_initial_mode_and_rotation() {
    let config = SceneConfig::default()
        .with_mode(Mode::Fixed)
        .with_rotating(true);
    let (mut manager, _probe) = mounted(config);

    assert_eq!(manager.scene().unwrap().mode(), Mode::Fixed);
    assert!(manager.state().rotating);

    let before = manager.scene().unwrap().object_world();
    manager.frame();
    let after = manager.scene().unwrap().object_world();
    assert_ne!(before.rotation, after.rotation);
}

#[test]
fn mount_waits_for_a_surface() {
    let (renderer, probe) = RecordingRenderer::new(None);
    let mut manager = SceneManager::new(SceneConfig::default());
    manager.mount(renderer).unwrap();

    assert!(!manager.is_mounted());
    assert!(!manager.frame());
    assert_eq!(probe.uploads(), 0);
    assert_eq!(probe.renders(), 0);

    probe.surface.set(Some((0, 400)));
    assert!(!manager.frame());
    assert_eq!(probe.uploads(), 0);

    probe.surface.set(Some((640, 480)));
    manager.resize(640, 480);
    assert!(manager.is_mounted());
    assert_eq!(probe.uploads(), 1);
    assert_relative_eq!(manager.projection().unwrap().aspect(), 640.0 / 480.0);
}

#[test]
fn frame_rotates_only_while_rotating() {
    let (mut manager, probe) = mounted(SceneConfig::default());
    assert!(!manager.state().rotating);

    for _ in 0..5 {
        assert!(manager.frame());
    }
    assert_eq!(object_position(&manager), [3.0, 1.0, 0.0]);
    assert_eq!(probe.renders(), 5);
    assert_eq!(probe.frame_requests(), 6);

    manager.handle(Control::ToggleRotation).unwrap();
    manager.frame();
    let [x, y, z] = object_position(&manager);
    assert!(x < 3.0);
    assert_relative_eq!(y, 1.0, epsilon = 1e-5);
    assert!(z.abs() > 0.0);
}

#[test]
fn toggling_rotation_keeps_the_scene() {
    let config = SceneConfig::default().with_rotating(true);
    let (mut manager, probe) = mounted(config);
    for _ in 0..10 {
        manager.frame();
    }
    let turned = manager.scene().unwrap().object_world();
    probe.clear();

    manager.handle(Control::ToggleRotation).unwrap();
    assert!(!manager.state().rotating);
    manager.frame();

    assert_eq!(probe.uploads(), 0);
    assert_eq!(probe.count(&Call::Release), 0);
    assert_eq!(manager.scene().unwrap().object_world(), turned);
    assert!(probe.last_status().unwrap().contains("Start Rotation"));

    manager.handle(Control::ToggleRotation).unwrap();
    manager.frame();
    assert_ne!(manager.scene().unwrap().object_world(), turned);
}

#[test]
fn switching_mode_rebuilds_from_scratch() {
    let config = SceneConfig::default().with_rotating(true);
    let (mut manager, probe) = mounted(config);
    for _ in 0..20 {
        manager.frame();
    }
    probe.clear();

    manager.handle(Control::ToggleMode).unwrap();

    let calls = probe.calls();
    assert_eq!(calls[0], Call::Release);
    assert!(matches!(calls[1], Call::Upload(_)));
    assert!(probe.last_status().unwrap().contains("Fixed (Local-space rotation)"));

    let state = manager.state();
    assert_eq!(state.mode, Mode::Fixed);
    assert!(state.rotating);

    let scene = manager.scene().unwrap();
    assert_eq!(scene.mode(), Mode::Fixed);
    let pivot = scene.graph.get_local_transform(scene.handles.pivot).unwrap();
    assert_eq!(pivot.rotation, Instance::new().rotation);
    assert_eq!(object_position(&manager), [3.0, 1.0, 0.0]);
    assert_eq!(manager.renderer().unwrap().live_models(), scene.graph.all_models().count());

    manager.handle(Control::ToggleMode).unwrap();
    let scene = manager.scene().unwrap();
    assert_eq!(scene.mode(), Mode::Broken);
    let object = scene.graph.get_local_transform(scene.handles.object).unwrap();
    assert_eq!(object.rotation, Instance::new().rotation);
}

#[test]
fn controls_before_mount_shape_the_first_scene() {
    let mut manager = SceneManager::new(SceneConfig::default());
    manager.handle(Control::ToggleMode).unwrap();
    manager.handle(Control::ToggleRotation).unwrap();

    let (renderer, _probe) = RecordingRenderer::new(Some((300, 300)));
    manager.mount(renderer).unwrap();

    assert_eq!(manager.scene().unwrap().mode(), Mode::Fixed);
    assert!(manager.state().rotating);
}

#[test]
fn resize_updates_the_aspect_ratio() {
    let (mut manager, probe) = mounted(SceneConfig::default());

    manager.resize(1000, 500);
    assert_relative_eq!(manager.projection().unwrap().aspect(), 2.0);
    assert_eq!(probe.calls().last(), Some(&Call::Resize(1000, 500)));

    manager.frame();
    assert_eq!(manager.renderer().unwrap().last_aspect(), Some(2.0));
}

#[test]
fn zero_sized_resizes_are_ignored() {
    let (mut manager, probe) = mounted(SceneConfig::default());
    probe.clear();

    manager.resize(0, 720);
    manager.resize(1280, 0);

    assert!(probe.calls().is_empty());
    assert_relative_eq!(manager.projection().unwrap().aspect(), 800.0 / 600.0);
}

#[test]
fn lost_surface_is_reconfigured() {
    let (mut manager, probe) = mounted(SceneConfig::default());
    probe.clear();
    probe.fail_next_render(wgpu::SurfaceError::Lost);

    assert!(manager.frame());
    assert_eq!(probe.calls(), vec![Call::Render, Call::Resize(800, 600)]);

    assert!(manager.frame());
    assert_eq!(probe.renders(), 2);
}

#[test]
fn unmount_tears_down_in_order() {
    let (mut manager, probe) = mounted(SceneConfig::default().with_rotating(true));
    manager.frame();
    probe.clear();

    let renderer = manager.unmount().unwrap();

    assert_eq!(
        probe.calls(),
        vec![Call::Release, Call::Dispose, Call::Detach]
    );
    assert!(!renderer.is_attached());
    assert!(renderer.is_disposed());
    assert_eq!(renderer.live_models(), 0);
    assert!(!manager.is_mounted());
    assert!(manager.scene().is_none());
}

#[test]
fn nothing_happens_after_unmount() {
    let (mut manager, probe) = mounted(SceneConfig::default().with_rotating(true));
    manager.unmount();
    probe.clear();
    let requests = probe.frame_requests();

    assert!(!manager.frame());
    manager.resize(1024, 768);
    manager.handle(Control::ToggleMode).unwrap();

    assert!(probe.calls().is_empty());
    assert_eq!(probe.frame_requests(), requests);
    assert!(manager.unmount().is_none());
}

#[test]
fn unmounting_a_waiting_renderer_disposes_it() {
    let (renderer, probe) = RecordingRenderer::new(None);
    let mut manager = SceneManager::new(SceneConfig::default());
    manager.mount(renderer).unwrap();

    let renderer = manager.unmount().unwrap();

    assert!(renderer.is_disposed());
    assert_eq!(probe.calls(), vec![Call::Dispose, Call::Detach]);
}

#[test]
fn failed_mount_tears_the_renderer_down() {
    let (renderer, probe) = RecordingRenderer::new(Some((800, 600)));
    probe.fail_next_upload();
    let mut manager = SceneManager::new(SceneConfig::default());

    assert!(manager.mount(renderer).is_err());

    assert_eq!(
        probe.calls(),
        vec![
            Call::Attach,
            Call::Resize(800, 600),
            Call::Release,
            Call::Dispose,
            Call::Detach,
        ]
    );
    assert!(!manager.is_mounted());
    assert!(manager.renderer().is_none());
    assert_eq!(probe.frame_requests(), 0);
}

#[test]
fn failed_deferred_mount_tears_the_renderer_down() {
    let (renderer, probe) = RecordingRenderer::new(None);
    let mut manager = SceneManager::new(SceneConfig::default());
    manager.mount(renderer).unwrap();

    probe.fail_next_upload();
    probe.surface.set(Some((640, 480)));
    manager.resize(640, 480);

    assert!(!manager.is_mounted());
    assert!(manager.renderer().is_none());
    assert!(probe.calls().ends_with(&[Call::Release, Call::Dispose, Call::Detach]));
    assert!(!manager.frame());
}

#[test]
fn failed_rebuild_unmounts() {
    let (mut manager, probe) = mounted(SceneConfig::default().with_rotating(true));
    probe.clear();
    probe.fail_next_upload();

    assert!(manager.handle(Control::ToggleMode).is_err());

    assert_eq!(
        probe.calls(),
        vec![Call::Release, Call::Release, Call::Dispose, Call::Detach]
    );
    assert!(!manager.is_mounted());
    assert!(manager.scene().is_none());
    assert_eq!(manager.state().mode, Mode::Fixed);
    assert!(!manager.frame());
}

#[test]
fn mounting_twice_replaces_the_first_mount() {
    let (mut manager, first) = mounted(SceneConfig::default());
    let (renderer, second) = RecordingRenderer::new(Some((200, 100)));

    manager.mount(renderer).unwrap();

    assert_eq!(first.count(&Call::Dispose), 1);
    assert_eq!(second.count(&Call::Attach), 1);
    assert_relative_eq!(manager.projection().unwrap().aspect(), 2.0);
}

#[test]
fn frame_loop_counts_frames_and_stops_when_cancelled() {
    let (mut manager, _probe) = mounted(SceneConfig::default());
    for _ in 0..3 {
        manager.frame();
    }
    assert_eq!(manager.frame_loop().unwrap().frames(), 3);

    let mut frame_loop = pcb_pivot::scene_manager::FrameLoop::new();
    assert!(frame_loop.begin_frame());
    assert!(frame_loop.cancel());
    assert!(!frame_loop.cancel());
    assert!(frame_loop.is_cancelled());
    assert!(!frame_loop.begin_frame());
    assert_eq!(frame_loop.frames(), 1);
}
