use std::{fs::File, io::{BufWriter, Write}, path::PathBuf};

use log::debug;
use thiserror::Error;

use viscous_fluids::{bounds::Bounds2D, scene::Scene, Fluid};

use crate::{record::ParticleRecord, EncodeFluid};

/// Dimension tag written at the start of the metadata file.
pub const DIMENSION: u8 = 2;

pub struct FluidDataEncoder {
    /// The path to the directory into which the fluid data will be placed.
    path: PathBuf,
    num_frames: u64,
    fps: u32,
    current_frame: u64,
}

impl FluidDataEncoder {
    pub fn new(path: PathBuf, num_frames: u64, fps: u32) -> Result<FluidDataEncoder, EncodingError> {
        std::fs::create_dir_all(&path)?;

        Ok(Self {
            path,
            num_frames,
            fps,
            current_frame: 0,
        })
    }

    fn frame_path(&self, frame: u64) -> PathBuf {
        crate::decode::frame_path(&self.path, self.num_frames, frame)
    }

    pub fn encode_metadata<F, P>(&mut self, scene: &Scene<F, P>, bounds: Bounds2D) -> Result<(), EncodingError>
    where 
        F: Fluid<Params = P>,
    {
        let path = self.path.join("_meta");
        let mut writer = BufWriter::new(File::create(path)?);

        writer.write_all(&[DIMENSION])?;
        writer.write_all(&self.fps.to_ne_bytes())?;
        writer.write_all(&self.num_frames.to_ne_bytes())?;

        writer.write_all(&scene.fluid.particle_radius().to_ne_bytes())?;

        for v in [bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y] {
            writer.write_all(&v.to_ne_bytes())?;
        }

        writer.flush()?;

        Ok(())
    }

    pub fn encode_frame<F, P>(&mut self, scene: &Scene<F, P>) -> Result<(), EncodingError>
    where 
        F: EncodeFluid,
    {
        if self.current_frame >= self.num_frames {
            return Err(EncodingError::TooManyFrames(self.num_frames));
        }

        let path = self.frame_path(self.current_frame);
        let writer = BufWriter::new(File::create(&path)?);

        let mut frame = FluidFrameEncoder { writer };
        scene.fluid.encode_state(&mut frame)?;
        frame.writer.flush()?;

        debug!("wrote frame {} to {}", self.current_frame, path.display());
        self.current_frame += 1;

        Ok(())
    }
}

pub struct FluidFrameEncoder<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> FluidFrameEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: BufWriter::new(writer) }
    }

    pub fn encode_section<I>(&mut self, len: usize, values: I) -> Result<(), EncodingError>
    where
        I: Iterator<Item = ParticleRecord>,
    {
        self.writer.write_all(&(len as u64).to_ne_bytes())?;

        let records: Vec<_> = values.collect();
        if records.len() != len {
            return Err(EncodingError::LengthMismatch { expected: len, actual: records.len() });
        }

        self.writer.write_all(bytemuck::cast_slice(&records))?;

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("section declared {expected} records but produced {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("all {0} frames have already been written")]
    TooManyFrames(u64),
}
