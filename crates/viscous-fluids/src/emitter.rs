use std::collections::BTreeMap;

use glam::{Vec2, Vec4};
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{error::{finite, positive}, pool::{ParticleId, ParticlePool}, ConfigError};

/// Lateral distance between the particles of one emission fan.
pub const FAN_SPACING: f32 = 0.04;
/// Scales `velocity_randomness` into the per-axis jitter bound.
pub const JITTER_SCALE: f32 = 0.01;
/// Fraction of a period by which the accumulated timer may fall short and still count as a full
/// period, absorbing f32 rounding when many small ticks add up to one period.
pub const PERIOD_TOLERANCE: f32 = 1e-4;

/// Returns a vector of length `magnitude` pointing `angle_deg` degrees counter-clockwise from +x.
#[inline]
pub fn vector_from_angle(magnitude: f32, angle_deg: f32) -> Vec2 {
    magnitude * Vec2::from_angle(angle_deg.to_radians())
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmitterParams {
    pub position: Vec2,
    /// Emission events per second.
    pub frequency: f32,
    /// Degrees added to the emission angle on every event. `0` emits along `emit_angle`.
    pub angular_velocity: f32,
    /// Emission direction in degrees, used while `angular_velocity` is `0`.
    pub emit_angle: f32,
    /// Ejection speed.
    pub strength: f32,
    pub velocity_randomness: f32,
    /// Visual radius of emitted particles.
    pub particle_size: f32,
    pub color: Vec4,
}

impl Default for EmitterParams {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            frequency: 20.0,
            angular_velocity: 0.0,
            emit_angle: 70.0,
            strength: 0.6,
            velocity_randomness: 2.0,
            particle_size: 0.35,
            color: Vec4::new(0.0, 0.0, 1.0, 1.0),
        }
    }
}

impl EmitterParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("emitter frequency", self.frequency)?;
        finite("emitter angular velocity", self.angular_velocity)?;
        finite("emitter angle", self.emit_angle)?;
        finite("emitter strength", self.strength)?;
        finite("emitter velocity randomness", self.velocity_randomness)?;
        finite("emitter particle size", self.particle_size)?;

        if !self.position.is_finite() {
            return Err(ConfigError::NotFinite { name: "emitter position", value: f32::NAN });
        }

        Ok(())
    }
}

/// A source that spawns a fan of three particles once per period.
#[derive(Debug, Clone)]
pub struct Emitter {
    params: EmitterParams,
    timer: f32,
    current_angle: f32,
}

impl Emitter {
    pub fn new(params: EmitterParams) -> Result<Self, ConfigError> {
        params.validate()?;

        Ok(Self {
            current_angle: 0.0,
            params,
            timer: 0.0,
        })
    }

    #[inline(always)]
    pub fn params(&self) -> &EmitterParams {
        &self.params
    }

    /// Moves the emitter. Should be called between ticks if the emitter is attached to something
    /// moving.
    pub fn set_position(&mut self, position: Vec2) {
        self.params.position = position;
    }

    #[inline(always)]
    pub fn period(&self) -> f32 {
        1.0 / self.params.frequency
    }

    /// Accumulates `dt` and emits once per elapsed period, appending new particles to `particles`
    /// until `capacity` live particles exist. Returns the number spawned.
    ///
    /// Every elapsed period is subtracted from the timer, so leftover time carries into the next
    /// call. Events that find the simulation at capacity are dropped without spawning.
    pub fn tick<R: Rng>(
        &mut self,
        dt: f32,
        particles: &mut Vec<ParticleId>,
        pool: &mut ParticlePool,
        capacity: usize,
        rng: &mut R,
    ) -> usize {
        let period = self.period();
        let mut spawned = 0;

        self.timer += dt;

        // Counted up front so the loop is bounded even when `dt` dwarfs the period.
        let events = ((self.timer + period * PERIOD_TOLERANCE) / period).floor();
        if events < 1.0 {
            return 0;
        }
        self.timer = (self.timer - events * period).clamp(0.0, period);

        for _ in 0..events as u64 {
            if particles.len() >= capacity {
                break;
            }

            if self.params.angular_velocity == 0.0 {
                self.current_angle = self.params.emit_angle;
            } else {
                self.current_angle = (self.current_angle + self.params.angular_velocity) % 360.0;
            }

            let velocity = vector_from_angle(self.params.strength, self.current_angle);
            let lateral = velocity.perp().normalize_or_zero();
            let a = self.params.velocity_randomness.abs() * JITTER_SCALE;

            for j in -1..=1 {
                if particles.len() >= capacity {
                    break;
                }

                let position = self.params.position + FAN_SPACING * j as f32 * lateral;
                let jitter = Vec2::new(rng.gen_range(-a..=a), rng.gen_range(-a..=a));

                let id = pool.acquire();
                pool[id].reset(position, velocity + jitter, self.params.particle_size, self.params.color);
                particles.push(id);
                spawned += 1;
            }
        }

        spawned
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EmitterId(pub usize);

/// The emitters registered with a simulation, together with the random source that jitters their
/// output. Emitters run in registration order.
#[derive(Debug, Clone)]
pub struct EmitterSet {
    emitters: BTreeMap<usize, Emitter>,
    n_emitters: usize,
    rng: StdRng,
}

impl Default for EmitterSet {
    fn default() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }
}

impl EmitterSet {
    pub fn from_rng(rng: StdRng) -> Self {
        Self {
            emitters: BTreeMap::new(),
            n_emitters: 0,
            rng,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    /// Adds an emitter to the set, returning its ID.
    pub fn add(&mut self, params: EmitterParams) -> Result<EmitterId, ConfigError> {
        let emitter = Emitter::new(params)?;

        let i = self.n_emitters;
        self.n_emitters += 1;

        info!("registered emitter {i} at {:?}", emitter.params.position);
        self.emitters.insert(i, emitter);
        Ok(EmitterId(i))
    }

    /// Removes an emitter from the set, given its ID.
    pub fn remove(&mut self, id: EmitterId) -> Option<Emitter> {
        self.emitters.remove(&id.0)
    }

    pub fn get(&self, id: EmitterId) -> Option<&Emitter> {
        self.emitters.get(&id.0)
    }

    pub fn get_mut(&mut self, id: EmitterId) -> Option<&mut Emitter> {
        self.emitters.get_mut(&id.0)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    /// Ticks every emitter in turn. An emitter is skipped entirely, timer included, while the
    /// simulation is at capacity.
    pub fn emit(
        &mut self,
        dt: f32,
        particles: &mut Vec<ParticleId>,
        pool: &mut ParticlePool,
        capacity: usize,
    ) -> usize {
        let mut spawned = 0;

        for emitter in self.emitters.values_mut() {
            if particles.len() < capacity {
                spawned += emitter.tick(dt, particles, pool, capacity, &mut self.rng);
            }
        }

        spawned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn horizontal(frequency: f32) -> EmitterParams {
        EmitterParams {
            frequency,
            strength: 1.0,
            emit_angle: 0.0,
            angular_velocity: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn one_period_emits_a_fan_of_three() {
        let mut emitter = Emitter::new(horizontal(10.0)).unwrap();
        let mut pool = ParticlePool::new(8);
        let mut particles = vec![];

        let spawned = emitter.tick(0.1, &mut particles, &mut pool, 100, &mut rng());
        assert_eq!(spawned, 3);
        assert_eq!(particles.len(), 3);

        let bound = 2.0 * JITTER_SCALE;
        for (j, &id) in (-1..=1).zip(particles.iter()) {
            let p = &pool[id];
            assert!((p.velocity.x - 1.0).abs() <= bound);
            assert!(p.velocity.y.abs() <= bound);
            assert!(p.is_new);

            // Heading +x, so the fan is spread along y.
            assert!(p.position.x.abs() < 1e-6);
            assert!((p.position.y - FAN_SPACING * j as f32).abs() < 1e-6);
        }
    }

    #[test]
    fn timer_carries_remainder() {
        let mut pool = ParticlePool::new(0);
        let mut rng = rng();

        for chunk in [1.0, 0.5, 0.25, 0.125, 0.0625] {
            let mut emitter = Emitter::new(horizontal(4.0)).unwrap();
            let mut particles = vec![];

            let steps = (2.0 / chunk) as usize;
            for _ in 0..steps {
                emitter.tick(chunk, &mut particles, &mut pool, usize::MAX, &mut rng);
            }

            assert_eq!(particles.len(), 8 * 3, "chunk {chunk}");
        }
    }

    #[test]
    fn inexact_chunks_still_carry() {
        let mut pool = ParticlePool::new(0);
        let mut rng = rng();

        let runs: [(f32, &[f32], usize); 4] = [
            (10.0, &[0.01], 100),
            (10.0, &[0.03, 0.05, 0.02, 0.07, 0.03], 5),
            (3.0, &[1.0 / 30.0], 30),
            (20.0, &[0.013, 0.007, 0.021, 0.009], 10),
        ];

        for (frequency, chunks, repeats) in runs {
            let mut emitter = Emitter::new(horizontal(frequency)).unwrap();
            let mut particles = vec![];

            for _ in 0..repeats {
                for &chunk in chunks {
                    emitter.tick(chunk, &mut particles, &mut pool, usize::MAX, &mut rng);
                }
            }

            let total: f32 = chunks.iter().sum::<f32>() * repeats as f32;
            let events = (total * frequency).round() as usize;
            assert_eq!(particles.len(), events * 3, "{frequency} Hz fed {chunks:?} x{repeats}");
        }
    }

    #[test]
    fn huge_step_is_bounded() {
        let mut emitter = Emitter::new(horizontal(10.0)).unwrap();
        let mut pool = ParticlePool::new(0);
        let mut particles = vec![];

        assert_eq!(emitter.tick(1.0e8, &mut particles, &mut pool, 10, &mut rng()), 10);
        assert!(emitter.timer >= 0.0 && emitter.timer <= emitter.period());

        // Backlogged events were dropped, not queued up.
        particles.clear();
        assert!(emitter.tick(0.1, &mut particles, &mut pool, 100, &mut rng()) <= 2 * 3);
    }

    #[test]
    fn rotation_ignores_emit_angle() {
        let params = EmitterParams {
            angular_velocity: 10.0,
            emit_angle: 70.0,
            velocity_randomness: 0.0,
            strength: 1.0,
            frequency: 1.0,
            ..Default::default()
        };
        let mut emitter = Emitter::new(params).unwrap();
        let mut pool = ParticlePool::new(0);
        let mut particles = vec![];

        emitter.tick(1.0, &mut particles, &mut pool, 100, &mut rng());

        let v = pool[particles[0]].velocity;
        assert!((v.to_angle().to_degrees() - 10.0).abs() < 1e-4, "{}", v.to_angle().to_degrees());
    }

    #[test]
    fn partial_period_does_not_emit() {
        let mut emitter = Emitter::new(horizontal(4.0)).unwrap();
        let mut pool = ParticlePool::new(0);
        let mut particles = vec![];

        assert_eq!(emitter.tick(0.125, &mut particles, &mut pool, 100, &mut rng()), 0);
        assert_eq!(emitter.tick(0.125, &mut particles, &mut pool, 100, &mut rng()), 3);
    }

    #[test]
    fn fan_is_cut_short_at_capacity() {
        let mut emitter = Emitter::new(horizontal(10.0)).unwrap();
        let mut pool = ParticlePool::new(0);
        let mut particles = vec![];

        assert_eq!(emitter.tick(0.1, &mut particles, &mut pool, 2, &mut rng()), 2);
        assert_eq!(emitter.tick(0.5, &mut particles, &mut pool, 2, &mut rng()), 0);
        assert_eq!(particles.len(), 2);
    }

    #[test]
    fn angular_velocity_rotates_each_event() {
        let params = EmitterParams {
            angular_velocity: 90.0,
            emit_angle: 0.0,
            velocity_randomness: 0.0,
            strength: 1.0,
            frequency: 1.0,
            ..Default::default()
        };
        let mut emitter = Emitter::new(params).unwrap();
        let mut pool = ParticlePool::new(0);
        let mut particles = vec![];

        emitter.tick(1.0, &mut particles, &mut pool, 100, &mut rng());
        let v = pool[particles[0]].velocity;
        assert!(v.x.abs() < 1e-6 && (v.y - 1.0).abs() < 1e-6);

        emitter.tick(1.0, &mut particles, &mut pool, 100, &mut rng());
        let v = pool[particles[3]].velocity;
        assert!((v.x + 1.0).abs() < 1e-6 && v.y.abs() < 1e-6);
    }

    #[test]
    fn set_respects_capacity_across_emitters() {
        let mut set = EmitterSet::seeded(1);
        for i in 0..4 {
            set.add(EmitterParams { position: Vec2::new(i as f32, 0.0), ..Default::default() }).unwrap();
        }

        let mut pool = ParticlePool::new(0);
        let mut particles = vec![];

        for _ in 0..200 {
            set.emit(0.02, &mut particles, &mut pool, 50);
            assert!(particles.len() <= 50);
        }

        assert_eq!(particles.len(), 50);
    }

    #[test]
    fn removed_emitters_stop_emitting() {
        let mut set = EmitterSet::seeded(1);
        let id = set.add(horizontal(10.0)).unwrap();
        let mut pool = ParticlePool::new(0);
        let mut particles = vec![];

        assert!(set.remove(id).is_some());
        assert!(set.remove(id).is_none());
        assert_eq!(set.emit(1.0, &mut particles, &mut pool, 100), 0);
    }

    #[test]
    fn rejects_zero_frequency() {
        let params = EmitterParams { frequency: 0.0, ..Default::default() };
        assert!(matches!(Emitter::new(params), Err(ConfigError::NotPositive { .. })));
    }

    #[test]
    fn degrees_to_vector() {
        let v = vector_from_angle(2.0, 90.0);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 2.0).abs() < 1e-6);
    }
}
