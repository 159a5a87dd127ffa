#![doc = include_str!("../README.md")]

// private mods (will be partly re-exported)
mod alignment;
mod buffer;
mod envelope;
mod error;
mod grain;
mod interpolation;
mod panning;
mod pool;
mod renderer;
mod sequence;
mod stack;

// public, flat re-exports
pub use error::Error;

pub use buffer::{AudioView, BufferMut, BufferRef, OwnedBuffer};

pub use alignment::Alignment;
pub use envelope::EnvelopeShape;
pub use interpolation::InterpolationMode;
pub use panning::PanCoefficients;
pub use sequence::Sequence;

pub use grain::{Grain, GrainParameters, GrainScratch, GrainState};

pub use pool::{Pool, PoolHandle};
pub use stack::{grain_queue, GrainConsumer, GrainProducer};

pub use renderer::{GrainRenderer, RenderConfig};

// public mods
pub mod utils;

pub mod dsp {
    //! Low level envelope and interpolation kernels, which grains are built from.

    pub use super::envelope::{halfcos_fill, halfcos_increment, hann_fill, hann_increment};
    pub use super::interpolation::{
        avoid_out_of_bounds_reads, crop_to_available, cubic_fill, linear_fill, samples_available,
    };
}
