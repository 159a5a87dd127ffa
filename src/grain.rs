//! A single scheduled sound fragment: the unit the renderers operate on.

use crate::{
    alignment::Alignment,
    buffer::{AudioView, BufferMut, BufferRef, OwnedBuffer},
    envelope::EnvelopeShape,
    interpolation::{self, InterpolationMode},
    panning::PanCoefficients,
    sequence::Sequence,
    Error,
};

// -------------------------------------------------------------------------------------------------

/// Parameters a new [`Grain`] is created from.
///
/// Values usually get picked by some control side scheduler, possibly randomized. The grain
/// itself places no constraints on how they are distributed.
#[derive(Clone, Debug, PartialEq)]
pub struct GrainParameters {
    /// Sample offset at which the grain starts, relative to the start of the next rendered block.
    pub offset: usize,
    /// Lifetime of the grain in output samples.
    pub duration: usize,
    /// Read start position in the source material, in source samples.
    pub position: f64,
    /// Playback rate: 1.0 plays at unison, < 1.0 pitches down, > 1.0 pitches up.
    pub rate: f64,
    /// Stereo panning position (-1.0 = full left, 0.0 = center, 1.0 = full right).
    pub pan: f32,
    /// Amplitude envelope shape.
    pub envelope: EnvelopeShape,
    /// Interpolation kernel used to read the source material.
    pub interpolation: InterpolationMode,
}

impl Default for GrainParameters {
    fn default() -> Self {
        Self {
            offset: 0,
            duration: 4410,
            position: 0.0,
            rate: 1.0,
            pan: 0.0,
            envelope: EnvelopeShape::HalfCosine,
            interpolation: InterpolationMode::Cubic,
        }
    }
}

impl GrainParameters {
    /// Maximum supported playback rate.
    pub const MAX_RATE: f64 = 64.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Validate all parameters.
    pub fn validate(&self) -> Result<(), Error> {
        if self.duration == 0 {
            return Err(Error::ParameterError(
                "Grain duration must be at least one sample".to_string(),
            ));
        }
        if !self.position.is_finite() || self.position < 0.0 {
            return Err(Error::ParameterError(
                "Grain position must be a positive, finite number".to_string(),
            ));
        }
        if !self.rate.is_finite() || self.rate <= 0.0 || self.rate > Self::MAX_RATE {
            return Err(Error::ParameterError(format!(
                "Grain rate must be > 0.0 and <= {}",
                Self::MAX_RATE
            )));
        }
        if !(-1.0..=1.0).contains(&self.pan) {
            return Err(Error::ParameterError(
                "Grain pan must be between -1.0 and 1.0".to_string(),
            ));
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------

/// Processing state of a [`Grain`] after rendering a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrainState {
    /// The grain did not start yet.
    Pending,
    /// The grain rendered into the block and continues in the next one.
    Playing,
    /// The grain finished: it must be removed and never rendered again.
    Depleted,
}

impl GrainState {
    #[inline]
    pub fn is_depleted(self) -> bool {
        self == Self::Depleted
    }
}

// -------------------------------------------------------------------------------------------------

/// Pre-allocated temporary memory for rendering grains which read `M` channel source material.
///
/// Grains render at most `capacity` samples at once: larger blocks are split up.
pub struct GrainScratch<const M: usize> {
    audio: OwnedBuffer<M>,
    envelope: OwnedBuffer<1>,
}

impl<const M: usize> GrainScratch<M> {
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "Scratch capacity must be > 0");
        let capacity = capacity.max(1);
        Self {
            audio: OwnedBuffer::new(capacity),
            envelope: OwnedBuffer::new(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.audio.len()
    }

    fn split(&mut self, len: usize) -> (BufferMut<'_, M>, BufferMut<'_, 1>) {
        (
            self.audio.view_mut().trimmed_length(len),
            self.envelope.view_mut().trimmed_length(len),
        )
    }
}

// -------------------------------------------------------------------------------------------------

/// A grain which renders into `N` channel output blocks.
///
/// Composes an [`Alignment`], a read position [`Sequence`] (its increment is the playback rate),
/// an envelope phase [`Sequence`] and [`PanCoefficients`]. Grains never own the source material
/// they read: it gets passed in with each render call.
#[derive(Debug, Clone)]
pub struct Grain<const N: usize> {
    alignment: Alignment,
    read_position: Sequence,
    envelope_phase: Sequence,
    envelope: EnvelopeShape,
    interpolation: InterpolationMode,
    pan: PanCoefficients<N>,
}

impl<const N: usize> Grain<N> {
    /// Create a new grain which reads from source material with `source_len` samples.
    ///
    /// The grain's duration gets shortened when the source material can't deliver enough
    /// samples at the given position and rate.
    pub fn new(parameters: &GrainParameters, source_len: usize) -> Self {
        debug_assert!(
            parameters.validate().is_ok(),
            "Invalid grain parameters: {parameters:?}"
        );
        let (alignment, position) = interpolation::avoid_out_of_bounds_reads(
            Alignment::new(parameters.offset, parameters.duration),
            parameters.position,
            parameters.rate,
            source_len,
            parameters.interpolation,
        );
        Self {
            alignment,
            read_position: Sequence::new(position, parameters.rate),
            envelope_phase: parameters.envelope.sequence(alignment.remaining),
            envelope: parameters.envelope,
            interpolation: parameters.interpolation,
            pan: PanCoefficients::from_pan(parameters.pan),
        }
    }

    /// Replace the pan coefficients, e.g. to use custom multichannel layouts.
    pub fn with_pan_coefficients(mut self, pan: PanCoefficients<N>) -> Self {
        self.pan = pan;
        self
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Current read position in the source material.
    pub fn read_position(&self) -> f64 {
        self.read_position.value
    }

    pub fn is_depleted(&self) -> bool {
        self.alignment.is_depleted()
    }

    /// Mix the grain's contribution to the given block into `output` and advance the grain to
    /// the next block.
    ///
    /// `source` must be the material the grain was created for. When the material runs out
    /// before the grain's lifetime ends, the grain renders what is available and terminates.
    pub fn render<const M: usize>(
        &mut self,
        output: BufferMut<'_, N>,
        source: BufferRef<'_, M>,
        scratch: &mut GrainScratch<M>,
    ) -> GrainState {
        if self.alignment.is_depleted() {
            return GrainState::Depleted;
        }
        let mut state = GrainState::Pending;
        let mut output = output;
        while !output.is_empty() {
            let chunk_len = output.len().min(scratch.capacity());
            let (chunk, rest) = output.split_at(chunk_len);
            state = self.render_chunk(chunk, source, scratch);
            if state.is_depleted() {
                break;
            }
            output = rest;
        }
        state
    }

    fn render_chunk<const M: usize>(
        &mut self,
        output: BufferMut<'_, N>,
        source: BufferRef<'_, M>,
        scratch: &mut GrainScratch<M>,
    ) -> GrainState {
        let output = self.alignment.advance_and_crop(output);
        if output.is_empty() {
            return GrainState::Pending;
        }

        let requested = output.len();
        let output = interpolation::crop_to_available(
            output,
            source.len(),
            &self.read_position,
            self.interpolation,
        );

        let (mut audio, mut envelope) = scratch.split(output.len());
        let produced = self
            .interpolation
            .fill(audio.reborrow(), source, &mut self.read_position);

        let mut audio = audio.trimmed_length(produced);
        self.envelope
            .fill(envelope.reborrow().trimmed_length(produced), &mut self.envelope_phase);
        audio.multiply(&envelope.channel(0)[..produced]);

        self.pan
            .apply_and_add(output.trimmed_length(produced), audio.view());

        // source material exhausted
        if produced < requested {
            self.alignment.terminate();
        }

        if self.alignment.is_depleted() {
            GrainState::Depleted
        } else {
            GrainState::Playing
        }
    }
}

// -------------------------------------------------------------------------------------------------
