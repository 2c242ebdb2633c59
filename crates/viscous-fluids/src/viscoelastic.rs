//! Particle-based viscoelastic fluid after Clavet, Beaudoin and Poulin, "Particle-based
//! Viscoelastic Fluid Simulation" (2005).
//!
//! Velocities are re-derived from the previous tick's displacement (the prediction-relaxation
//! scheme of section 3), pairwise viscosity impulses follow section 5.3 and positions are
//! corrected with double density relaxation from section 4.

use glam::Vec2;
use log::{debug, info, trace};

use crate::{
    bounds::Bounds2D,
    emitter::EmitterSet,
    error::{finite, positive},
    particle::{Particle, ParticleInstance},
    pool::{ParticleId, ParticlePool},
    spatial::{NeighborList, SpatialHash},
    ConfigError,
    Fluid,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ViscoelasticParams {
    /// Maximum number of live particles.
    pub max_particles: usize,
    /// Support radius of every pairwise interaction. Also the spatial hash cell size.
    pub particle_radius: f32,
    /// Downward acceleration.
    pub gravity: f32,
    /// Multiplier applied to the tick duration, for faster or slower than real time.
    pub time_scale: f32,
    /// Linear viscosity. High values give a thick fluid.
    pub sigma: f32,
    /// Quadratic viscosity. Non-zero values give a thinner fluid.
    pub beta: f32,
    pub enable_density_relaxation: bool,
    pub rest_density: f32,
    pub stiffness: f32,
    pub near_stiffness: f32,
}

impl Default for ViscoelasticParams {
    fn default() -> Self {
        Self {
            max_particles: 1500,
            particle_radius: 0.07,
            gravity: 3.0,
            time_scale: 3.0,
            sigma: 0.9,
            beta: 0.3,
            enable_density_relaxation: false,
            rest_density: 6.4,
            stiffness: 0.0061,
            near_stiffness: 0.625,
        }
    }
}

impl ViscoelasticParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_particles == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        positive("particle radius", self.particle_radius)?;
        positive("time scale", self.time_scale)?;
        finite("gravity", self.gravity)?;
        finite("sigma", self.sigma)?;
        finite("beta", self.beta)?;
        finite("rest density", self.rest_density)?;
        finite("stiffness", self.stiffness)?;
        finite("near stiffness", self.near_stiffness)?;

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ViscoelasticFluid {
    bounds: Bounds2D,
    /// Support radius the grid was built for.
    particle_radius: f32,
    capacity: usize,

    pool: ParticlePool,
    /// Live particles. Order carries no meaning but is stable within a tick, since the neighbor
    /// cache is indexed by position in this list.
    particles: Vec<ParticleId>,
    spatial: SpatialHash,
    /// Neighbors of `particles[i]`, valid for the current tick only.
    neighbors: Vec<NeighborList>,
}

impl ViscoelasticFluid {
    pub fn new(bounds: Bounds2D, params: &ViscoelasticParams) -> Result<Self, ConfigError> {
        params.validate()?;
        let spatial = SpatialHash::new(bounds, params.particle_radius)?;

        info!(
            "viscoelastic fluid over {:?}..{:?}, {} x {} cells, capacity {}",
            bounds.min, bounds.max, spatial.cells().x, spatial.cells().y, params.max_particles,
        );

        Ok(Self {
            bounds,
            particle_radius: params.particle_radius,
            capacity: params.max_particles,
            pool: ParticlePool::new(params.max_particles),
            particles: Vec::with_capacity(params.max_particles),
            spatial,
            neighbors: vec![NeighborList::new(); params.max_particles],
        })
    }

    /// Spawns a particle directly, bypassing emitters. Returns `None` at capacity.
    pub fn insert_particle(&mut self, particle: Particle) -> Option<ParticleId> {
        if self.particles.len() >= self.capacity {
            return None;
        }

        let id = self.pool.acquire();
        self.pool[id] = particle;
        self.particles.push(id);
        Some(id)
    }

    #[inline(always)]
    pub fn bounds(&self) -> Bounds2D {
        self.bounds
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[inline(always)]
    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn particle(&self, id: ParticleId) -> &Particle {
        &self.pool[id]
    }

    pub fn iter_particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().map(|&id| &self.pool[id])
    }

    /// Recycles every particle outside the bounds, keeping the rest in order.
    fn cull(&mut self) -> usize {
        let before = self.particles.len();

        let bounds = self.bounds;
        let pool = &mut self.pool;
        self.particles.retain(|&id| {
            if bounds.is_outside(pool[id].position) {
                pool.recycle(id);
                false
            } else {
                true
            }
        });

        before - self.particles.len()
    }

    fn ensure_neighbor_cache(&mut self) {
        let n = self.particles.len();
        if n > self.neighbors.len() {
            debug!("growing neighbor cache to {n} particles");
            self.neighbors.resize(n, NeighborList::new());
        }
    }

    /// Re-derives velocity, applies gravity, gathers neighbors and exchanges viscosity impulses,
    /// one particle at a time. Impulses given to a later particle are overwritten when its own
    /// velocity is re-derived; this matches the reference algorithm.
    fn predict_velocities(&mut self, dt: f32, params: &ViscoelasticParams) {
        for i in 0..self.particles.len() {
            let id = self.particles[i];
            let p = &mut self.pool[id];

            if !p.is_new {
                p.velocity = (p.position - p.original_position) / dt;
            }
            p.is_new = false;

            p.velocity.y -= params.gravity * dt;

            let position = p.position;
            self.spatial.neighbors_of(position, &self.pool, &mut self.neighbors[i]);

            self.apply_viscosity(i, dt, params);
        }
    }

    fn apply_viscosity(&mut self, i: usize, dt: f32, params: &ViscoelasticParams) {
        let id = self.particles[i];
        let h = self.particle_radius;

        for &jd in &self.neighbors[i] {
            let dp = self.pool[id].position - self.pool[jd].position;
            let r = dp.length();
            if r <= 0.0 || r > h {
                continue;
            }

            let n = dp / r;
            let u = (self.pool[id].velocity - self.pool[jd].velocity).dot(n);
            let impulse = viscosity_impulse(u, 1.0 - r / h, dt, params.sigma, params.beta);

            self.pool[id].velocity -= impulse * n;
            self.pool[jd].velocity += impulse * n;
        }
    }

    fn integrate(&mut self, dt: f32) {
        for &id in &self.particles {
            let p = &mut self.pool[id];
            p.original_position = p.position;
            p.position += p.velocity * dt;
        }
    }

    /// Double density relaxation over the neighbor lists gathered during prediction. Neighbors
    /// are pushed immediately; each particle's own displacement is summed and applied once.
    fn relax_density(&mut self, dt: f32, params: &ViscoelasticParams) {
        let h = self.particle_radius;
        let dt2 = dt * dt;

        for i in 0..self.particles.len() {
            let id = self.particles[i];
            let neighbors = &self.neighbors[i];
            let pos = self.pool[id].position;

            let mut density = 0.0;
            let mut near_density = 0.0;

            for &jd in neighbors {
                let r = (pos - self.pool[jd].position).length();
                if r <= 0.0 || r > h {
                    continue;
                }

                let q = 1.0 - r / h;
                density += q * q;
                near_density += q * q * q;
            }

            let pressure = params.stiffness * (density - params.rest_density);
            let near_pressure = params.near_stiffness * near_density;
            let mut displacement = Vec2::ZERO;

            for &jd in neighbors {
                // Same separation as the viscosity pass, from the neighbor to this particle.
                let dp = pos - self.pool[jd].position;
                let r = dp.length();
                if r <= 0.0 || r > h {
                    continue;
                }

                let q = 1.0 - r / h;
                let d = dt2 * (pressure * q + near_pressure * q * q) * 0.5;
                let d = dp * (d / r);

                self.pool[jd].position += d;
                displacement -= d;
            }

            self.pool[id].position += displacement;
        }
    }
}

/// Half of the viscosity impulse exchanged by a pair, given the relative velocity `u` along their
/// separation and the kernel weight `q = 1 - r / h`. Clamped so a pair never overshoots the
/// relative velocity it is damping.
#[inline]
pub fn viscosity_impulse(u: f32, q: f32, dt: f32, sigma: f32, beta: f32) -> f32 {
    if u > 0.0 {
        (dt * q * (sigma * u + beta * u * u) * 0.5).min(u)
    } else {
        (dt * q * (sigma * u - beta * u * u) * 0.5).max(u)
    }
}

impl Fluid for ViscoelasticFluid {
    type Params = ViscoelasticParams;

    fn step(&mut self, dt: f32, params: &Self::Params, emitters: &mut EmitterSet) {
        let culled = self.cull();
        self.spatial.rebuild(&self.particles, &self.pool);

        let sdt = dt * params.time_scale;

        self.ensure_neighbor_cache();
        self.predict_velocities(sdt, params);
        self.integrate(sdt);

        if params.enable_density_relaxation {
            self.relax_density(sdt, params);
        }

        let spawned = emitters.emit(dt, &mut self.particles, &mut self.pool, self.capacity);

        trace!("step: {} live, {culled} culled, {spawned} spawned", self.particles.len());
    }

    fn particle_radius(&self) -> f32 {
        self.particle_radius
    }

    fn write_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.clear();
        out.extend(self.iter_particles().map(Particle::instance));
    }
}
