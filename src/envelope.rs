//! Grain envelopes.
//!
//! Envelopes are driven by a [`Sequence`] phase accumulator which persists in the grain, so a
//! grain's envelope continues seamlessly in the next block. Sequences start at one increment,
//! so an envelope of length `L` evaluates the phases `increment..=L * increment` and never hits
//! exact zeros at its edges.

use std::f64::consts::PI;

use crate::{
    buffer::{AudioView, BufferMut},
    sequence::Sequence,
};

// -------------------------------------------------------------------------------------------------

/// Available grain envelope shapes.
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
pub enum EnvelopeShape {
    /// Half a cosine period (a sine window): `sin(phase)` with phase running from 0 to pi.
    #[default]
    HalfCosine,
    /// Symmetric raised cosine: `(1 - cos(phase)) / 2` with phase running from 0 to 2 pi.
    Hann,
}

impl EnvelopeShape {
    /// Create a new phase sequence for an envelope of the given length in samples.
    pub fn sequence(self, length: usize) -> Sequence {
        let increment = match self {
            Self::HalfCosine => halfcos_increment(length),
            Self::Hann => hann_increment(length, true),
        };
        Sequence::new(increment, increment)
    }

    /// Fill the first channel of `output` with envelope values, copy it to all other channels,
    /// and advance the phase sequence by the number of written samples.
    #[inline]
    pub fn fill<const N: usize>(self, output: BufferMut<'_, N>, phase: &mut Sequence) {
        match self {
            Self::HalfCosine => halfcos_fill(output, phase),
            Self::Hann => hann_fill(output, phase),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Phase increment of a half-cosine envelope with the given length.
pub fn halfcos_increment(length: usize) -> f64 {
    PI / (length + 1) as f64
}

/// Fill `output` with a half-cosine envelope segment.
///
/// Writes the raw phases first, then applies `sin` in a single pass over the whole channel.
pub fn halfcos_fill<const N: usize>(mut output: BufferMut<'_, N>, phase: &mut Sequence) {
    let envelope = output.channel_mut(0);
    for sample in envelope.iter_mut() {
        *sample = phase.next_value() as f32;
    }
    for sample in envelope.iter_mut() {
        *sample = sample.sin();
    }
    if N > 1 {
        output.duplicate_first_channel();
    }
}

/// Phase increment of a Hann envelope with the given length. Symmetric envelopes peak exactly
/// in the middle, periodic ones tile seamlessly when repeated.
pub fn hann_increment(length: usize, symmetric: bool) -> f64 {
    let div = length as f64 + if symmetric { 1.0 } else { 0.0 };
    2.0 * PI / div
}

/// Fill `output` with a Hann envelope segment.
pub fn hann_fill<const N: usize>(mut output: BufferMut<'_, N>, phase: &mut Sequence) {
    if output.is_empty() {
        return;
    }
    for sample in output.channel_mut(0).iter_mut() {
        *sample = ((1.0 - phase.next_value().cos()) / 2.0) as f32;
    }
    if N > 1 {
        output.duplicate_first_channel();
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::OwnedBuffer;

    const LENGTH: usize = 31;

    fn render(shape: EnvelopeShape) -> Vec<f32> {
        let mut buffer = OwnedBuffer::<1>::new(LENGTH);
        let mut phase = shape.sequence(LENGTH);
        shape.fill(buffer.view_mut(), &mut phase);
        buffer.channel(0).to_vec()
    }

    #[test]
    fn half_cosine_fades_in_and_out() {
        let envelope = render(EnvelopeShape::HalfCosine);
        let center = LENGTH / 2;

        // fade-in: starts near zero, rises monotonically up to one
        assert!(envelope[0] > 0.0 && envelope[0] < 0.11);
        for pair in envelope[..=center].windows(2) {
            assert!(pair[1] > pair[0]);
        }
        assert!((envelope[center] - 1.0).abs() < 1e-6);

        // fade-out mirrors the fade-in
        for i in 0..LENGTH {
            assert!((envelope[i] - envelope[LENGTH - 1 - i]).abs() < 1e-5);
        }
    }

    #[test]
    fn hann_is_symmetric() {
        let envelope = render(EnvelopeShape::Hann);
        let center = LENGTH / 2;
        assert!(envelope[0] < 0.01);
        assert!(envelope[LENGTH - 1] < 0.01);
        assert!((envelope[center] - 1.0).abs() < 1e-6);
        for i in 0..LENGTH {
            assert!((envelope[i] - envelope[LENGTH - 1 - i]).abs() < 1e-5);
        }
    }

    #[test]
    fn periodic_hann_increment() {
        assert!((hann_increment(32, false) - 2.0 * PI / 32.0).abs() < 1e-12);
        assert!((hann_increment(31, true) - 2.0 * PI / 32.0).abs() < 1e-12);
        assert!((halfcos_increment(31) - PI / 32.0).abs() < 1e-12);
    }

    #[test]
    fn resumes_across_blocks() {
        for shape in [EnvelopeShape::HalfCosine, EnvelopeShape::Hann] {
            let whole = render(shape);

            let mut buffer = OwnedBuffer::<1>::new(LENGTH);
            let mut phase = shape.sequence(LENGTH);
            let (head, tail) = buffer.view_mut().split_at(10);
            shape.fill(head, &mut phase);
            shape.fill(tail, &mut phase);

            assert_eq!(buffer.channel(0), whole.as_slice());
        }
    }

    #[test]
    fn copies_to_all_channels() {
        let mut buffer = OwnedBuffer::<3>::new(8);
        let mut phase = EnvelopeShape::Hann.sequence(8);
        EnvelopeShape::Hann.fill(buffer.view_mut(), &mut phase);
        assert_eq!(buffer.channel(0), buffer.channel(1));
        assert_eq!(buffer.channel(0), buffer.channel(2));
        assert!(buffer.channel(0).iter().any(|s| *s > 0.5));
    }

    #[test]
    fn parses_shape_names() {
        assert_eq!("Hann".parse::<EnvelopeShape>(), Ok(EnvelopeShape::Hann));
        assert_eq!(EnvelopeShape::HalfCosine.to_string(), "HalfCosine");
    }
}
