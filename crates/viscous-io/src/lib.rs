use std::io::Write;

use encode::{EncodingError, FluidFrameEncoder};
use viscous_fluids::viscoelastic::ViscoelasticFluid;

use record::ParticleRecord;

pub mod encode;
pub mod decode;
pub mod record;

pub trait EncodeFluid {
    fn encode_state<W: Write>(&self, encoder: &mut FluidFrameEncoder<W>) -> Result<(), EncodingError>;
}

impl EncodeFluid for ViscoelasticFluid {
    fn encode_state<W: Write>(&self, encoder: &mut FluidFrameEncoder<W>) -> Result<(), EncodingError> {
        encoder.encode_section(self.len(), self.iter_particles().map(|p| ParticleRecord::from(p.instance())))
    }
}
