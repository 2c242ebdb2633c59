use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};
use viscous_fluids::particle::ParticleInstance;

/// On-disk layout of one rendered particle.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleRecord {
    pub position: [f32; 2],
    pub radius: f32,
    pub color: [f32; 4],
}

impl From<ParticleInstance> for ParticleRecord {
    fn from(instance: ParticleInstance) -> Self {
        Self {
            position: instance.position.into(),
            radius: instance.radius,
            color: instance.color.into(),
        }
    }
}

impl From<ParticleRecord> for ParticleInstance {
    fn from(record: ParticleRecord) -> Self {
        Self {
            position: Vec2::from(record.position),
            radius: record.radius,
            color: Vec4::from(record.color),
        }
    }
}
