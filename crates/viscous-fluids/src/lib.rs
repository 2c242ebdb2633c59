use emitter::EmitterSet;
use particle::ParticleInstance;

pub mod bounds;
pub mod emitter;
pub mod error;
pub mod particle;
pub mod pool;
pub mod scene;
pub mod spatial;
pub mod viscoelastic;

pub use error::ConfigError;

pub trait Fluid {
    type Params;

    /// Advances the fluid by one fixed tick of `dt` seconds, then lets every registered emitter
    /// spawn into it.
    fn step(&mut self, dt: f32, params: &Self::Params, emitters: &mut EmitterSet);

    fn particle_radius(&self) -> f32;

    /// Writes one renderable instance per live particle into `out`, replacing its contents.
    fn write_instances(&self, out: &mut Vec<ParticleInstance>);
}
