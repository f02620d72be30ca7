use approx::assert_relative_eq;
use cgmath::Vector3;
use pcb_pivot::{
    Control, Mode, RotationState, SceneConfig,
    config::{clear_colour, rgb},
    data_structures::scene_graph::Light,
    flow::control_for_key,
    pipelines::{MSAA_SAMPLES, light::LightUniform, sample_count},
    rotation::Transition,
};
use wgpu::TextureFormatFeatureFlags as Flags;
use winit::keyboard::KeyCode;

#[test]
fn toggles_flip_one_field_each() {
    let mut state = RotationState::default();
    assert_eq!(state, RotationState::new(Mode::Broken, false));

    assert_eq!(state.apply(Control::ToggleRotation), Transition::Flag);
    assert_eq!(state, RotationState::new(Mode::Broken, true));

    assert_eq!(state.apply(Control::ToggleMode), Transition::Rebuild);
    assert_eq!(state, RotationState::new(Mode::Fixed, true));

    assert_eq!(state.apply(Control::ToggleRotation), Transition::Flag);
    assert_eq!(state.apply(Control::ToggleMode), Transition::Rebuild);
    assert_eq!(state, RotationState::default());
}

#[test]
fn labels_describe_the_next_action() {
    let idle = RotationState::new(Mode::Broken, false);
    assert_eq!(idle.rotation_label(), "Start Rotation");
    assert_eq!(idle.mode_label(), "Switch to Fixed Mode");
    assert_eq!(idle.to_string(), "broken-idle");

    let spinning = RotationState::new(Mode::Fixed, true);
    assert_eq!(spinning.rotation_label(), "Stop Rotation");
    assert_eq!(spinning.mode_label(), "Switch to Broken Mode");
    assert_eq!(spinning.to_string(), "fixed-spinning");
    assert!(spinning.status().starts_with("Current Mode: Fixed (Local-space rotation)"));
}

#[test]
fn keys_map_to_controls() {
    assert_eq!(control_for_key(KeyCode::KeyR), Some(Control::ToggleRotation));
    assert_eq!(control_for_key(KeyCode::Space), Some(Control::ToggleRotation));
    assert_eq!(control_for_key(KeyCode::KeyM), Some(Control::ToggleMode));
    assert_eq!(control_for_key(KeyCode::Tab), Some(Control::ToggleMode));
    assert_eq!(control_for_key(KeyCode::KeyQ), None);
}

#[test]
fn default_config_matches_the_reference_scene() {
    let config = SceneConfig::default();
    assert_eq!(config.initial_mode, Mode::Broken);
    assert!(!config.start_rotating);
    assert_relative_eq!(config.rotation_step, 0.02);
    assert_eq!(config.object_offset, [3.0, 1.0, 0.0]);
    assert_eq!(config.camera_eye, [0.0, 3.0, 8.0]);
    assert_eq!(config.object_colour, [0.0, 1.0, 0.0]);
    assert_eq!(config.origin_marker_colour, [1.0, 0.0, 0.0]);

    let tweaked = config.clone().with_mode(Mode::Fixed).with_rotation_step(0.1);
    assert_eq!(tweaked.initial_mode, Mode::Fixed);
    assert_relative_eq!(tweaked.rotation_step, 0.1);
    assert_eq!(tweaked.object_offset, config.object_offset);
}

#[test]
fn hex_colours_convert_per_channel() {
    let [r, g, b] = rgb(0x1f2937);
    assert_relative_eq!(r, 31.0 / 255.0);
    assert_relative_eq!(g, 41.0 / 255.0);
    assert_relative_eq!(b, 55.0 / 255.0);

    let colour = clear_colour(0xffffff);
    assert_eq!((colour.r, colour.g, colour.b, colour.a), (1.0, 1.0, 1.0, 1.0));
}

#[test]
fn lights_fold_into_one_uniform() {
    let uniform = LightUniform::from_lights([
        (
            Light::Ambient {
                colour: [0.25, 0.25, 0.25],
            },
            Vector3::new(0.0, 0.0, 0.0),
        ),
        (
            Light::Directional {
                colour: [1.0, 1.0, 1.0],
                intensity: 0.8,
            },
            Vector3::new(5.0, 5.0, 5.0),
        ),
        (
            Light::Directional {
                colour: [1.0, 0.0, 0.0],
                intensity: 1.0,
            },
            Vector3::new(0.0, 1.0, 0.0),
        ),
        (
            Light::Ambient {
                colour: [0.25, 0.0, 0.0],
            },
            Vector3::new(0.0, 0.0, 0.0),
        ),
    ]);

    assert_eq!(uniform.ambient, [0.5, 0.25, 0.25]);
    let d = 1.0 / 3.0_f32.sqrt();
    for axis in uniform.direction {
        assert_relative_eq!(axis, d, epsilon = 1e-6);
    }
    for channel in uniform.colour {
        assert_relative_eq!(channel, 0.8);
    }
}

#[test]
fn antialiasing_needs_resolvable_colour_and_multisampled_depth() {
    let colour = Flags::MULTISAMPLE_X4 | Flags::MULTISAMPLE_RESOLVE;
    let depth = Flags::MULTISAMPLE_X4;

    assert_eq!(sample_count(colour, depth), MSAA_SAMPLES);
    assert_eq!(sample_count(Flags::MULTISAMPLE_X4, depth), 1);
    assert_eq!(sample_count(colour, Flags::empty()), 1);
    assert_eq!(sample_count(Flags::MULTISAMPLE_RESOLVE, depth), 1);
}
