use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use glam::Vec2;

mod inspect;
mod run;

#[derive(Parser)]
#[command(name = "viscous")]
#[command(about = "Particle-based viscoelastic fluid simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation and record every frame to a directory
    Simulate(SimulateArgs),
    /// Summarise a recorded run
    Inspect {
        /// Directory written by `simulate`
        dir: PathBuf,
    },
}

#[derive(Args)]
pub struct SimulateArgs {
    /// Output directory for recorded frames
    #[arg(short, long, default_value = "output/fluid")]
    pub out: PathBuf,
    /// Simulated duration in seconds
    #[arg(short, long, default_value_t = 10.0)]
    pub duration: f32,
    /// Fixed ticks (and recorded frames) per second
    #[arg(long, default_value_t = 50)]
    pub fps: u32,
    /// Seed for emission jitter. Random if omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Half the height of the simulated area
    #[arg(long, default_value_t = 5.0)]
    pub half_height: f32,
    /// Width / height of the simulated area
    #[arg(long, default_value_t = 16.0 / 9.0)]
    pub aspect: f32,

    #[arg(long, default_value_t = 1500)]
    pub max_particles: usize,
    /// Interaction radius, also the neighbor grid cell size
    #[arg(long, default_value_t = 0.07)]
    pub particle_radius: f32,
    #[arg(long, default_value_t = 3.0)]
    pub gravity: f32,
    #[arg(long, default_value_t = 3.0)]
    pub time_scale: f32,
    /// Linear viscosity
    #[arg(long, default_value_t = 0.9)]
    pub sigma: f32,
    /// Quadratic viscosity
    #[arg(long, default_value_t = 0.3)]
    pub beta: f32,
    /// Enable double density relaxation
    #[arg(long)]
    pub relax: bool,
    #[arg(long, default_value_t = 6.4)]
    pub rest_density: f32,
    #[arg(long, default_value_t = 0.0061)]
    pub stiffness: f32,
    #[arg(long, default_value_t = 0.625)]
    pub near_stiffness: f32,

    /// Emitter position as `x,y`. May be repeated
    #[arg(long = "emitter", value_parser = parse_vec2, allow_hyphen_values = true, default_value = "-6,3")]
    pub emitters: Vec<Vec2>,
    /// Emission events per second
    #[arg(long, default_value_t = 20.0)]
    pub frequency: f32,
    /// Degrees the emission angle turns per event. 0 keeps `emit_angle`
    #[arg(long, default_value_t = 0.0)]
    pub angular_velocity: f32,
    /// Emission direction in degrees
    #[arg(long, default_value_t = 70.0)]
    pub emit_angle: f32,
    /// Ejection speed
    #[arg(long, default_value_t = 0.6)]
    pub strength: f32,
    #[arg(long, default_value_t = 2.0)]
    pub velocity_randomness: f32,
    /// Visual radius of emitted particles
    #[arg(long, default_value_t = 0.35)]
    pub particle_size: f32,
}

fn parse_vec2(s: &str) -> Result<Vec2, String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected `x,y`, got `{s}`"))?;
    let x = x.trim().parse::<f32>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f32>().map_err(|e| e.to_string())?;
    Ok(Vec2::new(x, y))
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate(args) => run::simulate(&args),
        Commands::Inspect { dir } => inspect::inspect(dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
