use std::path::PathBuf;

use glam::Vec2;
use viscous_io::decode::FluidDataDecoder;

pub fn inspect(dir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mut decoder = FluidDataDecoder::new(dir);
    let meta = decoder.decode_metadata()?;

    println!("frames:          {} at {} fps", meta.num_frames, meta.fps);
    println!("bounds:          {} .. {}", meta.bounds.min, meta.bounds.max);
    println!("particle radius: {}", meta.particle_radius);

    let mut peak = 0;
    let mut last = None;

    while let Some(frame) = decoder.decode_frame()? {
        peak = peak.max(frame.particles.len());
        last = Some(frame);
    }

    println!("peak particles:  {peak}");

    if let Some(frame) = last.filter(|f| !f.particles.is_empty()) {
        let n = frame.particles.len() as f32;
        let centroid = frame.particles.iter().map(|p| p.position).sum::<Vec2>() / n;
        println!("final particles: {} centered at {centroid}", frame.particles.len());
    }

    Ok(())
}
