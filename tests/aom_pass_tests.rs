//! Ambient Occlusion Master Frame Tests
//!
//! Tests for:
//! - Pass activation and lazy shader lookup
//! - Buffer planning per blur quality (counts, aliasing, formats, downsampling)
//! - Recorded blit chains and load actions
//! - Global outputs when the occlusion texture is published
//! - Cross-frame parameter dirty checks and mode switches
//! - Debug pass, injection stages, overrides and blue noise

use glam::{Vec3, Vec4};

use myth_aom::renderer::graph::passes::aom::constants::{
    AOM_SHADER_NAME, ShaderPass, keywords, properties,
};
use myth_aom::renderer::graph::passes::aom::{AomDebugPass, AomPass, TextureSlot};
use myth_aom::renderer::graph::{
    AssetTextureId, CameraData, Command, DeviceCaps, ExecutedPass, FrameOutput, FrameTargets,
    LoadAction, MaterialTexture, RenderStage, StoreAction,
};
use myth_aom::resources::aom::{
    AmbientOcclusionMode, AomOverrides, AomSettings, BlurQuality, DepthSource, NoiseMethod,
    RenderingPath,
};
use myth_aom::resources::blue_noise::{BlueNoiseSequence, BlueNoiseTexture};
use myth_aom::{AmbientOcclusionMaster, Renderer, Shader};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn camera() -> CameraData {
    CameraData::perspective(60.0, 1920, 1080, 0.1, 100.0, Vec3::new(0.0, 1.0, 5.0), Vec3::ZERO)
}

fn settings(mode: AmbientOcclusionMode) -> AomSettings {
    AomSettings {
        mode,
        ..AomSettings::default()
    }
}

fn renderer_with(feature: AmbientOcclusionMaster, caps: DeviceCaps) -> Renderer {
    init_logger();
    let mut renderer = Renderer::new(caps);
    renderer
        .shaders_mut()
        .register(Shader::new(AOM_SHADER_NAME, 14));
    renderer.add_feature(Box::new(feature));
    renderer
}

fn renderer(settings: AomSettings) -> Renderer {
    renderer_with(AmbientOcclusionMaster::new(settings), DeviceCaps::default())
}

fn render(renderer: &mut Renderer, targets: FrameTargets) -> FrameOutput {
    renderer
        .begin_frame(camera(), targets)
        .render()
        .expect("frame should execute")
}

fn render_default(renderer: &mut Renderer) -> FrameOutput {
    render(renderer, FrameTargets::new(1920, 1080))
}

fn feature(renderer: &mut Renderer) -> &mut AmbientOcclusionMaster {
    renderer
        .feature_mut::<AmbientOcclusionMaster>()
        .expect("feature registered")
}

fn main_pass(output: &FrameOutput) -> &ExecutedPass {
    output.executed.pass(AomPass::NAME).expect("AOM pass executed")
}

fn draws(pass: &ExecutedPass) -> Vec<&Command> {
    pass.commands
        .commands()
        .iter()
        .filter(|c| matches!(c, Command::Blit { .. } | Command::DrawFullscreen { .. }))
        .collect()
}

// ============================================================================
// Activation
// ============================================================================

#[test]
fn disabled_mode_enqueues_nothing() {
    let mut renderer = renderer(AomSettings::default());
    let output = render_default(&mut renderer);

    assert!(output.executed.passes.is_empty());
    assert_eq!(output.recorded_nodes, 0);
    assert!(feature(&mut renderer).pass().material().is_some());
}

#[test]
fn non_positive_parameters_enqueue_nothing() {
    let tweaks: [fn(&mut AomSettings); 3] = [
        |s| s.gtao.intensity = 0.0,
        |s| s.gtao.radius = 0.0,
        |s| s.gtao.falloff = -1.0,
    ];
    for tweak in tweaks {
        let mut s = settings(AmbientOcclusionMode::Gtao);
        tweak(&mut s);
        let mut renderer = renderer(s);
        let output = render_default(&mut renderer);
        assert!(output.executed.pass(AomPass::NAME).is_none());
    }
}

#[test]
fn every_algorithm_draws_its_own_shader_pass() {
    let expected = [
        (AmbientOcclusionMode::Ssao, ShaderPass::Ssao),
        (AmbientOcclusionMode::Hdao, ShaderPass::Hdao),
        (AmbientOcclusionMode::Hbao, ShaderPass::Hbao),
        (AmbientOcclusionMode::Gtao, ShaderPass::Gtao),
    ];
    for (mode, shader_pass) in expected {
        let mut renderer = renderer(settings(mode));
        let output = render_default(&mut renderer);
        let first = draws(main_pass(&output))[0];
        match first {
            Command::DrawFullscreen { pass, load, .. } => {
                assert_eq!(*pass, shader_pass.index(), "{mode:?}");
                assert_eq!(*load, LoadAction::DontCare);
            }
            other => panic!("expected a full-screen draw, got {other:?}"),
        }
    }
}

#[test]
fn missing_shader_skips_frame_and_recovers() {
    init_logger();
    let mut renderer = Renderer::new(DeviceCaps::default());
    renderer.add_feature(Box::new(AmbientOcclusionMaster::new(settings(
        AmbientOcclusionMode::Ssao,
    ))));

    let output = render_default(&mut renderer);
    assert!(output.executed.passes.is_empty());
    assert!(feature(&mut renderer).pass().material().is_none());

    renderer
        .shaders_mut()
        .register(Shader::new(AOM_SHADER_NAME, 14));
    let output = render_default(&mut renderer);
    assert!(output.executed.pass(AomPass::NAME).is_some());
}

#[test]
fn dispose_releases_material() {
    let mut renderer = renderer(settings(AmbientOcclusionMode::Ssao));
    render_default(&mut renderer);
    assert!(feature(&mut renderer).pass().material().is_some());

    renderer.dispose();
    assert!(feature(&mut renderer).pass().material().is_none());
}

// ============================================================================
// Buffer planning
// ============================================================================

#[test]
fn buffer_count_follows_blur_quality() {
    let expected = [
        (BlurQuality::High, 4, 3),
        (BlurQuality::Medium, 3, 2),
        (BlurQuality::Low, 2, 1),
    ];
    for (quality, buffers, allocations) in expected {
        let mut renderer = renderer(AomSettings {
            blur_quality: quality,
            ..settings(AmbientOcclusionMode::Hbao)
        });
        let output = render_default(&mut renderer);

        let layout = feature(&mut renderer)
            .pass()
            .last_layout()
            .expect("layout planned");
        assert_eq!(layout.buffer_count(), buffers, "{quality:?}");
        assert_eq!(layout.allocation_count(), allocations, "{quality:?}");
        assert_eq!(layout.slot(3), Some(TextureSlot::AliasActiveColor));
        assert_eq!(output.executed.allocated_textures, allocations);
    }
}

#[test]
fn published_final_buffer_is_allocated() {
    let mut renderer = renderer(AomSettings {
        blur_quality: BlurQuality::Low,
        after_opaque: false,
        ..settings(AmbientOcclusionMode::Ssao)
    });
    let output = render_default(&mut renderer);

    let layout = feature(&mut renderer).pass().last_layout().unwrap();
    assert_eq!(layout.buffer_count(), 2);
    assert_eq!(layout.allocation_count(), 2);
    assert_eq!(output.executed.allocated_textures, 2);
}

#[test]
fn downsampling_halves_intermediates_only() {
    let mut renderer = renderer(AomSettings {
        downsample: true,
        after_opaque: false,
        ..settings(AmbientOcclusionMode::Gtao)
    });
    render_default(&mut renderer);

    let layout = feature(&mut renderer).pass().last_layout().unwrap();
    let Some(TextureSlot::Allocate(ao)) = layout.slot(0) else {
        panic!("slot 0 must be allocated");
    };
    let Some(TextureSlot::Allocate(fin)) = layout.slot(3) else {
        panic!("slot 3 must be allocated when published");
    };
    assert_eq!((ao.width, ao.height), (960, 540));
    assert_eq!((fin.width, fin.height), (1920, 1080));
    assert_eq!(fin.format, wgpu::TextureFormat::R8Unorm);
}

#[test]
fn formats_depend_on_quality_and_device() {
    let high = AomSettings {
        after_opaque: false,
        ..settings(AmbientOcclusionMode::Ssao)
    };
    let medium = AomSettings {
        blur_quality: BlurQuality::Medium,
        ..high.clone()
    };

    let format_of = |settings: AomSettings, caps: DeviceCaps| {
        let mut renderer = renderer_with(AmbientOcclusionMaster::new(settings), caps);
        render_default(&mut renderer);
        let layout = feature(&mut renderer).pass().last_layout().unwrap();
        match (layout.slot(0), layout.slot(3)) {
            (Some(TextureSlot::Allocate(ao)), Some(TextureSlot::Allocate(fin))) => {
                (ao.format, fin.format)
            }
            other => panic!("unexpected slots {other:?}"),
        }
    };

    let r8 = DeviceCaps { supports_r8: true };
    let no_r8 = DeviceCaps { supports_r8: false };
    assert_eq!(
        format_of(high.clone(), r8),
        (wgpu::TextureFormat::Rgba8Unorm, wgpu::TextureFormat::R8Unorm)
    );
    assert_eq!(
        format_of(medium.clone(), r8),
        (wgpu::TextureFormat::R8Unorm, wgpu::TextureFormat::R8Unorm)
    );
    assert_eq!(
        format_of(medium, no_r8),
        (wgpu::TextureFormat::Rgba8Unorm, wgpu::TextureFormat::Rgba8Unorm)
    );
}

// ============================================================================
// Blit chain
// ============================================================================

#[test]
fn after_opaque_chain_composites_onto_color() {
    let mut renderer = renderer(AomSettings {
        blur_quality: BlurQuality::Medium,
        ..settings(AmbientOcclusionMode::Ssao)
    });
    let output = render_default(&mut renderer);
    let pass = main_pass(&output);
    let draws = draws(pass);

    assert_eq!(draws.len(), 3);
    match draws[2] {
        Command::Blit {
            target,
            load,
            store,
            pass,
            ..
        } => {
            assert_eq!(*target, output.resources.active_color);
            assert_eq!(*load, LoadAction::Load);
            assert_eq!(*store, StoreAction::Store);
            assert_eq!(*pass, ShaderPass::GaussianAfterOpaque.index());
        }
        other => panic!("expected a blit, got {other:?}"),
    }

    assert_eq!(output.resources.ssao_texture, None);
    assert!(
        !pass
            .commands
            .commands()
            .iter()
            .any(|c| matches!(c, Command::SetGlobalKeyword { .. }))
    );
}

#[test]
fn kawase_after_opaque_is_a_single_blit() {
    let mut renderer = renderer(AomSettings {
        blur_quality: BlurQuality::Low,
        ..settings(AmbientOcclusionMode::Hdao)
    });
    let output = render_default(&mut renderer);
    let draws = draws(main_pass(&output));

    assert_eq!(draws.len(), 2);
    assert!(matches!(
        draws[1],
        Command::Blit { pass, load: LoadAction::Load, .. }
            if *pass == ShaderPass::KawaseAfterOpaque.index()
    ));
}

#[test]
fn published_chain_sets_global_outputs() {
    let mut renderer = renderer(AomSettings {
        after_opaque: false,
        direct_lighting_strength: 0.5,
        ..settings(AmbientOcclusionMode::Gtao)
    });
    let output = render_default(&mut renderer);
    let pass = main_pass(&output);
    let commands = pass.commands.commands();

    let ao = output.resources.ssao_texture.expect("occlusion texture published");
    assert_ne!(ao, output.resources.active_color);

    let draws = draws(pass);
    assert_eq!(draws.len(), 4);
    for draw in &draws {
        match draw {
            Command::Blit { load, .. } | Command::DrawFullscreen { load, .. } => {
                assert_eq!(*load, LoadAction::DontCare);
            }
            _ => unreachable!(),
        }
    }
    assert!(matches!(
        draws[3],
        Command::Blit { target, pass, .. }
            if *target == ao && *pass == ShaderPass::BilateralBlurFinal.index()
    ));

    assert!(commands.contains(&Command::SetGlobalKeyword {
        name: keywords::SCREEN_SPACE_OCCLUSION,
        enabled: true,
    }));
    assert!(commands.contains(&Command::SetGlobalVector {
        name: properties::AMBIENT_OCCLUSION_PARAM,
        value: Vec4::new(1.0, 0.0, 0.0, 0.5),
    }));
    assert_eq!(
        commands.last(),
        Some(&Command::SetGlobalTexture {
            name: properties::AO_TEXTURE,
            texture: ao,
        })
    );
    assert!(output.executed.rejected_global_state.is_empty());
}

#[test]
fn source_size_comes_from_camera_color() {
    let mut renderer = renderer(settings(AmbientOcclusionMode::Ssao));
    let output = render(&mut renderer, FrameTargets::new(1280, 720));
    let commands = main_pass(&output).commands.commands();

    let size = commands
        .iter()
        .find_map(|c| match c {
            Command::SetGlobalVector { name, value } if *name == properties::SOURCE_SIZE => {
                Some(*value)
            }
            _ => None,
        })
        .expect("_SourceSize set");
    assert!(approx(size.x, 1280.0));
    assert!(approx(size.y, 720.0));
    assert!(approx(size.z, 1.0 / 1280.0));
    assert!(approx(size.w, 1.0 / 720.0));
}

// ============================================================================
// Stages and inputs
// ============================================================================

#[test]
fn injection_stage_follows_path_and_compositing() {
    let expected = [
        (RenderingPath::Forward, true, RenderStage::BeforeTransparents),
        (RenderingPath::Forward, false, RenderStage::AfterPrePasses),
        (RenderingPath::Deferred, true, RenderStage::AfterOpaques),
        (RenderingPath::Deferred, false, RenderStage::AfterGbuffer),
    ];
    for (path, after_opaque, stage) in expected {
        let mut renderer = renderer(AomSettings {
            rendering_path: path,
            after_opaque,
            ..settings(AmbientOcclusionMode::Ssao)
        });
        render_default(&mut renderer);
        let setup = feature(&mut renderer).pass().pass_setup().unwrap();
        assert_eq!(setup.stage, stage, "{path:?} after_opaque={after_opaque}");
    }
}

#[test]
fn depth_normals_bind_the_normal_buffer() {
    let mut renderer = renderer(AomSettings {
        depth_source: DepthSource::DepthNormals,
        ..settings(AmbientOcclusionMode::Ssao)
    });
    let output = render(&mut renderer, FrameTargets::new(1920, 1080).with_normals(true));

    let normals = output.resources.camera_normals.unwrap();
    let material = feature(&mut renderer).pass().material_id().unwrap();
    assert!(main_pass(&output).commands.commands().contains(
        &Command::SetMaterialTexture {
            material,
            name: properties::CAMERA_NORMALS_TEXTURE,
            texture: normals,
        }
    ));

    let material = feature(&mut renderer).pass().material().unwrap();
    assert!(material.is_keyword_enabled(keywords::SOURCE_DEPTH_NORMALS));
    assert!(!material.is_keyword_enabled(keywords::SOURCE_DEPTH_MEDIUM));
}

#[test]
fn depth_only_reconstructs_normals() {
    let mut renderer = renderer(settings(AmbientOcclusionMode::Gtao));
    let output = render(&mut renderer, FrameTargets::new(1920, 1080).with_normals(true));

    assert!(
        !main_pass(&output)
            .commands
            .commands()
            .iter()
            .any(|c| matches!(c, Command::SetMaterialTexture { .. }))
    );
    let material = feature(&mut renderer).pass().material().unwrap();
    assert!(material.is_keyword_enabled(keywords::SOURCE_DEPTH_MEDIUM));
    assert!(!material.is_keyword_enabled(keywords::SOURCE_DEPTH_NORMALS));
}

#[test]
fn hdao_always_uses_depth_normals() {
    let mut renderer = renderer(settings(AmbientOcclusionMode::Hdao));
    render(&mut renderer, FrameTargets::new(1920, 1080).with_normals(true));

    let pass = feature(&mut renderer).pass();
    assert_eq!(pass.pass_setup().unwrap().depth_source, DepthSource::DepthNormals);
    let material = pass.material().unwrap();
    assert!(material.is_keyword_enabled(keywords::HDAO_USE_NORMALS));
}

// ============================================================================
// Debug pass
// ============================================================================

#[test]
fn debug_mode_publishes_and_visualises() {
    let mut renderer = renderer(AomSettings {
        debug_mode: true,
        ..settings(AmbientOcclusionMode::Hbao)
    });
    let output = render_default(&mut renderer);

    assert_eq!(
        output.executed.pass_names(),
        vec![AomPass::NAME, AomDebugPass::NAME]
    );
    // after_opaque is ignored in debug mode
    assert!(output.resources.ssao_texture.is_some());

    let color = output.resources.active_color;
    let debug = output.executed.pass(AomDebugPass::NAME).unwrap();
    assert_eq!(debug.commands.len(), 1);
    assert!(matches!(
        debug.commands.commands()[0],
        Command::Blit {
            source,
            target,
            load: LoadAction::Load,
            store: StoreAction::Store,
            pass,
            ..
        } if source == color && target == color && pass == ShaderPass::Debug.index()
    ));
}

#[test]
fn debug_pass_needs_an_active_effect() {
    let mut renderer = renderer(AomSettings {
        debug_mode: true,
        ..AomSettings::default()
    });
    let output = render_default(&mut renderer);
    assert!(output.executed.pass(AomDebugPass::NAME).is_none());
}

// ============================================================================
// Parameter upload
// ============================================================================

#[test]
fn unchanged_settings_skip_second_upload() {
    let mut renderer = renderer(settings(AmbientOcclusionMode::Hbao));

    render_default(&mut renderer);
    let first = feature(&mut renderer).pass().last_upload();
    assert!(first.general_dirty);
    assert!(first.effect_dirty);

    render_default(&mut renderer);
    let pass = feature(&mut renderer).pass();
    let second = pass.last_upload();
    assert!(!second.general_dirty);
    assert!(!second.effect_dirty);

    let material = pass.material().unwrap();
    assert_eq!(material.upload_count(properties::HBAO_PARAMETERS), 1);
    assert_eq!(material.upload_count(properties::DOWNSAMPLE), 1);
    // Camera reconstruction is refreshed every frame.
    assert_eq!(material.upload_count(properties::CAMERA_VIEW_PROJECTIONS), 2);
}

#[test]
fn changed_parameter_is_uploaded() {
    let mut renderer = renderer(settings(AmbientOcclusionMode::Gtao));
    render_default(&mut renderer);

    let mut changed = settings(AmbientOcclusionMode::Gtao);
    changed.gtao.radius = 0.6;
    feature(&mut renderer).set_defaults(changed);
    render_default(&mut renderer);

    let pass = feature(&mut renderer).pass();
    assert!(pass.last_upload().effect_dirty);
    let params = pass
        .material()
        .unwrap()
        .vector(properties::GTAO_PARAMETERS)
        .unwrap();
    assert!(approx(params.y, 0.6));
}

#[test]
fn mode_switch_reuploads_and_resets_keywords() {
    let mut renderer = renderer(settings(AmbientOcclusionMode::Ssao));
    render_default(&mut renderer);
    {
        let material = feature(&mut renderer).pass().material().unwrap();
        assert!(material.is_keyword_enabled(keywords::SAMPLE_COUNT_MEDIUM));
    }

    feature(&mut renderer).set_defaults(settings(AmbientOcclusionMode::Hbao));
    render_default(&mut renderer);
    {
        let pass = feature(&mut renderer).pass();
        assert!(pass.last_upload().effect_dirty);
        let material = pass.material().unwrap();
        assert!(!material.is_keyword_enabled(keywords::SAMPLE_COUNT_MEDIUM));
        assert!(material.is_keyword_enabled(keywords::DIRECTIONS_2));
        assert!(material.is_keyword_enabled(keywords::SAMPLES_4));
    }

    // Returning to an earlier mode with identical settings still uploads.
    feature(&mut renderer).set_defaults(settings(AmbientOcclusionMode::Ssao));
    render_default(&mut renderer);
    let pass = feature(&mut renderer).pass();
    assert!(pass.last_upload().effect_dirty);
    assert!(!pass.material().unwrap().is_keyword_enabled(keywords::DIRECTIONS_2));
}

#[test]
fn general_keywords_follow_noise_method() {
    let mut renderer = renderer(AomSettings {
        noise_method: NoiseMethod::PseudoRandom,
        ..settings(AmbientOcclusionMode::Ssao)
    });
    render_default(&mut renderer);
    {
        let material = feature(&mut renderer).pass().material().unwrap();
        assert!(material.is_keyword_enabled(keywords::PSEUDO_RANDOM_NOISE));
        assert!(!material.is_keyword_enabled(keywords::BLUE_NOISE));
        assert!(!material.is_keyword_enabled(keywords::ORTHOGRAPHIC_CAMERA));
    }

    feature(&mut renderer).set_defaults(settings(AmbientOcclusionMode::Ssao));
    render_default(&mut renderer);
    let pass = feature(&mut renderer).pass();
    assert!(pass.last_upload().general_dirty);
    assert!(!pass.material().unwrap().is_keyword_enabled(keywords::PSEUDO_RANDOM_NOISE));
}

#[test]
fn blue_noise_cycles_registered_tiles() {
    let tiles = vec![
        BlueNoiseTexture {
            texture: AssetTextureId(10),
            width: 64,
            height: 64,
        },
        BlueNoiseTexture {
            texture: AssetTextureId(11),
            width: 64,
            height: 64,
        },
    ];
    let feature_impl = AmbientOcclusionMaster::with_blue_noise(
        AomSettings {
            noise_method: NoiseMethod::BlueNoise,
            ..settings(AmbientOcclusionMode::Ssao)
        },
        BlueNoiseSequence::with_seed(tiles, 7),
    );
    let mut renderer = renderer_with(feature_impl, DeviceCaps::default());

    render_default(&mut renderer);
    let first = {
        let pass = feature(&mut renderer).pass();
        assert!(pass.last_upload().blue_noise);
        let material = pass.material().unwrap();
        let params = material.vector(properties::BLUE_NOISE_PARAMETERS).unwrap();
        assert!(approx(params.x, 30.0));
        assert!(approx(params.y, 1080.0 / 64.0));
        assert!((0.0..1.0).contains(&params.z));
        material.texture(properties::BLUE_NOISE_TEXTURE).unwrap()
    };

    render_default(&mut renderer);
    let second = feature(&mut renderer)
        .pass()
        .material()
        .unwrap()
        .texture(properties::BLUE_NOISE_TEXTURE)
        .unwrap();

    assert_ne!(first, second);
    assert!(matches!(first, MaterialTexture::Asset(_)));
}

#[test]
fn ssao_blue_noise_widens_radius() {
    let mut renderer = renderer(AomSettings {
        noise_method: NoiseMethod::BlueNoise,
        ..settings(AmbientOcclusionMode::Ssao)
    });
    render_default(&mut renderer);

    let pass = feature(&mut renderer).pass();
    // No tiles registered: the frame still renders without a noise texture.
    assert!(!pass.last_upload().blue_noise);
    let params = pass
        .material()
        .unwrap()
        .vector(properties::SSAO_PARAMETERS)
        .unwrap();
    assert!(approx(params.y, 0.15));
}

// ============================================================================
// Overrides
// ============================================================================

#[test]
fn overrides_apply_on_next_frame() {
    let mut renderer = renderer(settings(AmbientOcclusionMode::Ssao));
    render_default(&mut renderer);

    feature(&mut renderer).set_overrides(Some(AomOverrides {
        mode: Some(AmbientOcclusionMode::None),
        ..AomOverrides::default()
    }));
    let output = render_default(&mut renderer);
    assert!(output.executed.passes.is_empty());
    assert_eq!(
        feature(&mut renderer).resolved_settings().mode,
        AmbientOcclusionMode::None
    );

    feature(&mut renderer).set_overrides(None);
    let output = render_default(&mut renderer);
    assert!(output.executed.pass(AomPass::NAME).is_some());
}
