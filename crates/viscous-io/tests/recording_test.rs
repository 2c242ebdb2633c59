//! Records a short run to disk and reads it back.

use std::path::PathBuf;

use glam::Vec2;
use viscous_fluids::{
    bounds::Bounds2D,
    emitter::{EmitterParams, EmitterSet},
    scene::Scene,
    viscoelastic::ViscoelasticParams,
};
use viscous_io::{
    decode::{DecodingError, FluidDataDecoder},
    encode::{EncodingError, FluidDataEncoder},
};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("viscous-io-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_recorded_frames_match_render() {
    let dir = scratch_dir("frames");
    let bounds = Bounds2D::new(Vec2::ZERO, Vec2::new(3.0, 2.0));
    let mut scene = Scene::viscoelastic(bounds, ViscoelasticParams::default(), EmitterSet::seeded(1)).unwrap();
    scene.add_emitter(EmitterParams::default()).unwrap();

    let frames = 12;
    let mut encoder = FluidDataEncoder::new(dir.clone(), frames, 50).unwrap();
    encoder.encode_metadata(&scene, bounds).unwrap();

    let mut rendered = vec![];
    for _ in 0..frames {
        scene.step(0.02);
        encoder.encode_frame(&scene).unwrap();
        rendered.push(scene.render().to_vec());
    }

    assert!(matches!(encoder.encode_frame(&scene), Err(EncodingError::TooManyFrames(12))));

    let mut decoder = FluidDataDecoder::new(dir.clone());
    let meta = decoder.decode_metadata().unwrap();
    assert_eq!(meta.fps, 50);
    assert_eq!(meta.num_frames, frames);
    assert_eq!(meta.particle_radius, 0.07);
    assert_eq!(meta.bounds, bounds);

    for expected in &rendered {
        let frame = decoder.decode_frame().unwrap().unwrap();
        assert_eq!(&frame.particles, expected);
    }
    assert!(decoder.decode_frame().unwrap().is_none());
    assert!(!rendered.last().unwrap().is_empty());

    decoder.reset();
    assert_eq!(decoder.decode_frame().unwrap().unwrap().particles, rendered[0]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_truncated_frame_is_reported() {
    let dir = scratch_dir("truncated");
    let bounds = Bounds2D::new(Vec2::ZERO, Vec2::ONE);
    let mut scene = Scene::viscoelastic(bounds, ViscoelasticParams::default(), EmitterSet::seeded(2)).unwrap();
    scene.add_emitter(EmitterParams { frequency: 50.0, ..Default::default() }).unwrap();

    let mut encoder = FluidDataEncoder::new(dir.clone(), 1, 50).unwrap();
    encoder.encode_metadata(&scene, bounds).unwrap();
    scene.step(0.02);
    encoder.encode_frame(&scene).unwrap();

    let frame = dir.join("0.dat");
    let bytes = std::fs::read(&frame).unwrap();
    std::fs::write(&frame, &bytes[..bytes.len() - 3]).unwrap();

    let mut decoder = FluidDataDecoder::new(dir.clone());
    decoder.decode_metadata().unwrap();
    assert!(matches!(decoder.decode_frame(), Err(DecodingError::Truncated { frame: 0, .. })));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_oversized_particle_count_is_rejected() {
    let dir = scratch_dir("oversized");
    let bounds = Bounds2D::new(Vec2::ZERO, Vec2::ONE);
    let scene = Scene::viscoelastic(bounds, ViscoelasticParams::default(), EmitterSet::seeded(3)).unwrap();

    let mut encoder = FluidDataEncoder::new(dir.clone(), 1, 50).unwrap();
    encoder.encode_metadata(&scene, bounds).unwrap();
    encoder.encode_frame(&scene).unwrap();

    // A header count whose byte length wraps usize.
    std::fs::write(dir.join("0.dat"), u64::MAX.to_ne_bytes()).unwrap();

    let mut decoder = FluidDataDecoder::new(dir.clone());
    decoder.decode_metadata().unwrap();
    assert!(matches!(
        decoder.decode_frame(),
        Err(DecodingError::Malformed { frame: 0, count: u64::MAX })
    ));

    std::fs::remove_dir_all(&dir).unwrap();
}
