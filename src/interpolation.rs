//! Fractional rate resampling of grain source material.
//!
//! Grains read their source material at an arbitrary, fixed playback rate: `1.0` plays at
//! unison, values below `1.0` pitch down and above `1.0` pitch up. Reads are interpolated with
//! either a 2-tap linear or a 4-tap cubic kernel. Callers must bound the output length so that
//! all taps stay within the source via [`crop_to_available`] before filling.

use crate::{
    alignment::Alignment,
    buffer::{AudioView, BufferMut, BufferRef},
    sequence::Sequence,
};

// -------------------------------------------------------------------------------------------------

/// Interpolation kernel used to read grain source material.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    strum::EnumString,
    strum::Display,
    strum::VariantNames,
)]
pub enum InterpolationMode {
    /// 2-point linear interpolation. Cheap, but dull and aliasing.
    Linear,
    /// 4-point cubic interpolation.
    #[default]
    Cubic,
}

impl InterpolationMode {
    /// Number of source samples needed before the read position.
    pub const fn prepad(self) -> usize {
        match self {
            Self::Linear => 0,
            Self::Cubic => 1,
        }
    }

    /// Number of source samples needed after the read position.
    pub const fn postpad(self) -> usize {
        match self {
            Self::Linear => 1,
            Self::Cubic => 2,
        }
    }

    /// Fill `output` with resampled `source` material, using this mode's kernel.
    /// See [`cubic_fill`] and [`linear_fill`].
    #[inline]
    pub fn fill<const M: usize>(
        self,
        output: BufferMut<'_, M>,
        source: BufferRef<'_, M>,
        position: &mut Sequence,
    ) -> usize {
        match self {
            Self::Linear => linear_fill(output, source, position),
            Self::Cubic => cubic_fill(output, source, position),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Number of output samples which can be produced from a source of `source_len` samples,
/// starting at read `position` and advancing by `increment` per sample, without reading more
/// than `postpad` samples past the truncated read index.
pub fn samples_available(
    source_len: usize,
    position: f64,
    increment: f64,
    postpad: usize,
) -> usize {
    debug_assert!(position >= 0.0, "Negative read positions are not supported");
    debug_assert!(increment > 0.0, "Read increments must be positive");

    let limit = source_len as f64 - postpad as f64;
    if position >= limit {
        return 0;
    }
    let mut count = ((limit - position) / increment).ceil() as usize;
    // rounding errors may push the very last read index out of bounds
    while count > 0 && (position + (count - 1) as f64 * increment) as usize + postpad >= source_len
    {
        count -= 1;
    }
    count
}

/// Adjust a new grain's alignment and start read position so that the grain never reads out of
/// bounds: the read position is clamped up to the mode's prepad and `remaining` gets shortened
/// to the number of samples the source material can deliver.
pub fn avoid_out_of_bounds_reads(
    mut alignment: Alignment,
    position: f64,
    increment: f64,
    source_len: usize,
    mode: InterpolationMode,
) -> (Alignment, f64) {
    let position = position.max(mode.prepad() as f64);
    let available = samples_available(source_len, position, increment, mode.postpad());
    if alignment.remaining > available {
        alignment.remaining = available;
    }
    (alignment, position)
}

/// Shrink the given output view to the number of samples which can be read from a source of
/// `source_len` samples, starting at the given read sequence.
pub fn crop_to_available<V: AudioView>(
    buffer: V,
    source_len: usize,
    position: &Sequence,
    mode: InterpolationMode,
) -> V {
    let available = samples_available(
        source_len,
        position.value,
        position.increment,
        mode.postpad(),
    );
    if available < buffer.len() {
        buffer.trimmed_length(available)
    } else {
        buffer
    }
}

// -------------------------------------------------------------------------------------------------

/// Fill `output` with 4-point cubic interpolated `source` material.
///
/// Reads start at `position.value` and advance by `position.increment` per output sample. The
/// sequence is advanced by the number of produced samples, which is returned. Output should be
/// bounded via [`crop_to_available`] first: filling stops early instead of reading out of bounds.
pub fn cubic_fill<const M: usize>(
    output: BufferMut<'_, M>,
    source: BufferRef<'_, M>,
    position: &mut Sequence,
) -> usize {
    interpolate::<M, 4>(output, source, position, 1, cubic)
}

/// Fill `output` with 2-point linear interpolated `source` material.
///
/// Same contract as [`cubic_fill`].
pub fn linear_fill<const M: usize>(
    output: BufferMut<'_, M>,
    source: BufferRef<'_, M>,
    position: &mut Sequence,
) -> usize {
    interpolate::<M, 2>(output, source, position, 0, linear)
}

#[inline(always)]
fn cubic(x: &[f32; 4], fract: f32) -> f32 {
    let [a, b, c, d] = *x;
    b + fract
        * ((c - b)
            - (1.0 / 6.0)
                * (1.0 - fract)
                * ((d - a - 3.0 * (c - b)) * fract + (d + 2.0 * a - 3.0 * b)))
}

#[inline(always)]
fn linear(x: &[f32; 2], fract: f32) -> f32 {
    let [a, b] = *x;
    a + (b - a) * fract
}

#[inline(always)]
fn interpolate<const M: usize, const TAPS: usize>(
    mut output: BufferMut<'_, M>,
    source: BufferRef<'_, M>,
    position: &mut Sequence,
    prepad: usize,
    kernel: impl Fn(&[f32; TAPS], f32) -> f32,
) -> usize {
    let increment = position.increment;
    let mut produced = output.len();
    let mut end_position = position.value;

    for channel_index in 0..M {
        let input = source.channel(channel_index);
        let channel = &mut output.channel_mut(channel_index)[..produced];
        let mut read_position = position.value;
        for (frame_index, sample) in channel.iter_mut().enumerate() {
            let index = read_position as usize;
            let taps = index
                .checked_sub(prepad)
                .and_then(|start| input.get(start..start + TAPS))
                .and_then(|taps| <&[f32; TAPS]>::try_from(taps).ok());
            let Some(taps) = taps else {
                // material exhausted: stop here, the grain gets terminated by the caller
                produced = frame_index;
                break;
            };
            let fract = (read_position - index as f64) as f32;
            *sample = kernel(taps, fract);
            read_position += increment;
        }
        end_position = read_position;
    }

    position.value = end_position;
    produced
}

// -------------------------------------------------------------------------------------------------
