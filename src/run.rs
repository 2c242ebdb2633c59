use glam::Vec2;
use indicatif::{ProgressBar, ProgressIterator, ProgressStyle};
use log::info;
use viscous_fluids::{
    bounds::Bounds2D,
    emitter::{EmitterParams, EmitterSet},
    scene::Scene,
    viscoelastic::ViscoelasticParams,
};
use viscous_io::encode::FluidDataEncoder;

use crate::SimulateArgs;

impl SimulateArgs {
    fn fluid_params(&self) -> ViscoelasticParams {
        ViscoelasticParams {
            max_particles: self.max_particles,
            particle_radius: self.particle_radius,
            gravity: self.gravity,
            time_scale: self.time_scale,
            sigma: self.sigma,
            beta: self.beta,
            enable_density_relaxation: self.relax,
            rest_density: self.rest_density,
            stiffness: self.stiffness,
            near_stiffness: self.near_stiffness,
        }
    }

    fn emitter_params(&self, position: Vec2) -> EmitterParams {
        EmitterParams {
            position,
            frequency: self.frequency,
            angular_velocity: self.angular_velocity,
            emit_angle: self.emit_angle,
            strength: self.strength,
            velocity_randomness: self.velocity_randomness,
            particle_size: self.particle_size,
            ..Default::default()
        }
    }
}

pub fn simulate(args: &SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.fps == 0 || !(args.duration > 0.0) {
        return Err("fps and duration must be positive".into());
    }

    let bounds = Bounds2D::from_viewport(Vec2::ZERO, args.half_height, args.aspect);
    let emitters = match args.seed {
        Some(seed) => EmitterSet::seeded(seed),
        None => EmitterSet::default(),
    };

    let mut scene = Scene::viscoelastic(bounds, args.fluid_params(), emitters)?;
    for &position in &args.emitters {
        scene.add_emitter(args.emitter_params(position))?;
    }

    let frames = (args.duration * args.fps as f32) as u64;
    let dt = 1.0 / args.fps as f32;

    let mut encoder = FluidDataEncoder::new(args.out.clone(), frames, args.fps)?;
    encoder.encode_metadata(&scene, bounds)?;

    let bar_template = "Running Simulation {spinner:.green} [{elapsed}] [{bar:50.white/white}] {pos}/{len} ({eta})";
    let style = ProgressStyle::with_template(bar_template)?
        .progress_chars("=> ").tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let progress = ProgressBar::new(frames).with_style(style);

    for _frame in (0..frames).progress_with(progress) {
        scene.step(dt);
        encoder.encode_frame(&scene)?;
    }

    info!("recorded {frames} frames to {}, {} live particles at the end", args.out.display(), scene.fluid.len());

    Ok(())
}
