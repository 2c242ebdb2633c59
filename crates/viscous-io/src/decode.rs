use std::{fs::File, io::{BufReader, Read}, mem, path::{Path, PathBuf}};

use glam::Vec2;
use thiserror::Error;
use viscous_fluids::{bounds::Bounds2D, particle::ParticleInstance};

use crate::{encode::DIMENSION, record::ParticleRecord};

/// Zero-padded frame file name, wide enough for the last frame of the run.
pub(crate) fn frame_path(dir: &Path, num_frames: u64, frame: u64) -> PathBuf {
    let max_digits = num_frames.saturating_sub(1).checked_ilog10().unwrap_or(0) + 1;
    let digits = frame.checked_ilog10().unwrap_or(0) + 1;
    let zeros = max_digits.saturating_sub(digits);

    dir.join(format!("{}{frame}.dat", "0".repeat(zeros as usize)))
}

pub struct FluidDataDecoder {
    /// The path to the directory in which the fluid data resides.
    path: PathBuf,
    num_frames: u64,
    current_frame: u64,
}

impl FluidDataDecoder {
    pub fn new(path: PathBuf) -> FluidDataDecoder {
        Self {
            path,
            num_frames: 0,
            current_frame: 0,
        }
    }

    fn read_array<const N: usize, R: Read>(reader: &mut R) -> Result<[u8; N], DecodingError> {
        let mut bytes = [0; N];
        reader.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    fn read_f32<R: Read>(reader: &mut R) -> Result<f32, DecodingError> {
        Ok(f32::from_ne_bytes(Self::read_array(reader)?))
    }

    pub fn decode_metadata(&mut self) -> Result<FluidMetadata, DecodingError> {
        let path = self.path.join("_meta");
        let mut reader = BufReader::new(File::open(path)?);

        let [dim] = Self::read_array::<1, _>(&mut reader)?;
        if dim != DIMENSION {
            return Err(DecodingError::UnsupportedDimension(dim));
        }

        let fps = u32::from_ne_bytes(Self::read_array(&mut reader)?);
        let num_frames = u64::from_ne_bytes(Self::read_array(&mut reader)?);
        let particle_radius = Self::read_f32(&mut reader)?;

        let mut corners = [0.0; 4];
        for v in corners.iter_mut() {
            *v = Self::read_f32(&mut reader)?;
        }

        self.num_frames = num_frames;

        Ok(FluidMetadata {
            fps,
            num_frames,
            particle_radius,
            bounds: Bounds2D {
                min: Vec2::new(corners[0], corners[1]),
                max: Vec2::new(corners[2], corners[3]),
            },
        })
    }

    /// Reads the next frame, or `None` once every frame named in the metadata has been read.
    pub fn decode_frame(&mut self) -> Result<Option<FluidFrameData>, DecodingError> {
        if self.current_frame >= self.num_frames {
            return Ok(None)
        }

        let path = frame_path(&self.path, self.num_frames, self.current_frame);
        let mut reader = BufReader::new(File::open(path)?);

        let count = u64::from_ne_bytes(Self::read_array(&mut reader)?);
        let size = mem::size_of::<ParticleRecord>();
        let expected = usize::try_from(count)
            .ok()
            .and_then(|n| n.checked_mul(size))
            .ok_or(DecodingError::Malformed { frame: self.current_frame, count })?;

        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        if bytes.len() != expected {
            return Err(DecodingError::Truncated {
                frame: self.current_frame,
                expected,
                actual: bytes.len(),
            });
        }

        let particles = bytes
            .chunks_exact(size)
            .map(bytemuck::pod_read_unaligned::<ParticleRecord>)
            .map(ParticleInstance::from)
            .collect();

        self.current_frame += 1;

        Ok(Some(FluidFrameData { particles }))
    }

    pub fn reset(&mut self) {
        self.current_frame = 0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FluidMetadata {
    pub fps: u32,
    pub num_frames: u64,
    pub particle_radius: f32,
    pub bounds: Bounds2D,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FluidFrameData {
    pub particles: Vec<ParticleInstance>,
}

#[derive(Debug, Error)]
pub enum DecodingError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("unsupported dimension {0}, expected 2")]
    UnsupportedDimension(u8),
    #[error("frame {frame} holds {actual} bytes of particles, expected {expected}")]
    Truncated { frame: u64, expected: usize, actual: usize },
    #[error("frame {frame} claims {count} particles, more than can be addressed")]
    Malformed { frame: u64, count: u64 },
}
