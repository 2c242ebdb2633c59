use glam::{Vec2, Vec4};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Visual radius. Interaction range is set by the simulation, not per particle.
    pub radius: f32,
    pub color: Vec4,
    /// Position at the start of the previous integration, used to re-derive velocity.
    pub original_position: Vec2,
    /// Set on spawn. The first tick keeps the spawn velocity instead of re-deriving it.
    pub is_new: bool,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            radius: 0.0,
            color: Vec4::ONE,
            original_position: Vec2::ZERO,
            is_new: false,
        }
    }
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, radius: f32, color: Vec4) -> Self {
        let mut particle = Self::default();
        particle.reset(position, velocity, radius, color);
        particle
    }

    /// Overwrites every field so a recycled record carries nothing over from its previous life.
    pub fn reset(&mut self, position: Vec2, velocity: Vec2, radius: f32, color: Vec4) {
        self.position = position;
        self.velocity = velocity;
        self.radius = radius;
        self.color = color;
        self.original_position = position;
        self.is_new = true;
    }

    #[inline]
    pub fn instance(&self) -> ParticleInstance {
        ParticleInstance {
            position: self.position,
            radius: self.radius,
            color: self.color,
        }
    }
}

/// What a renderer needs to draw one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleInstance {
    pub position: Vec2,
    pub radius: f32,
    pub color: Vec4,
}
