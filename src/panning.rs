//! Channel mixing matrices for placing grains in the stereo (or multichannel) field.

use crate::buffer::{AudioView, BufferMut, BufferRef};

// -------------------------------------------------------------------------------------------------

/// `N x N` channel mixing matrix.
///
/// `get(from, to)` is the contribution of source channel `from` into destination channel `to`.
/// Rows and columns are not normalized, so e.g. hard panned stereo sources sum both source
/// channels into a single destination channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanCoefficients<const N: usize> {
    coeffs: [[f32; N]; N],
}

impl<const N: usize> Default for PanCoefficients<N> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<const N: usize> PanCoefficients<N> {
    /// Matrix which passes each channel through unchanged.
    pub fn identity() -> Self {
        let mut coeffs = [[0.0; N]; N];
        for (index, row) in coeffs.iter_mut().enumerate() {
            row[index] = 1.0;
        }
        Self { coeffs }
    }

    /// Create coefficients from a raw `[from][to]` matrix.
    pub fn from_matrix(coeffs: [[f32; N]; N]) -> Self {
        Self { coeffs }
    }

    /// Create coefficients for the given pan value in range `[-1, 1]`.
    ///
    /// Only stereo layouts have a panning law: all other layouts pass channels through as they
    /// are.
    pub fn from_pan(pan: f32) -> Self {
        let mut coefficients = Self::identity();
        if N == 2 {
            let stereo = PanCoefficients::<2>::stereo(pan);
            for from in 0..2 {
                for to in 0..2 {
                    coefficients.coeffs[from][to] = stereo.get(from, to);
                }
            }
        }
        coefficients
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f32 {
        debug_assert!(from < N && to < N, "Channel index out of range");
        self.coeffs[from][to]
    }

    /// Overwrite `output` with the panned `input`.
    pub fn apply<const M: usize>(&self, mut output: BufferMut<'_, N>, input: BufferRef<'_, M>) {
        output.clear();
        self.apply_and_add(output, input);
    }

    /// Mix the panned `input` into `output`. Does not clear `output` first.
    ///
    /// With identical channel layouts every `(from, to)` pair is mixed. A mono input is mixed
    /// into every destination channel with the average of that channel's column as gain. Other
    /// layout combinations are not supported.
    pub fn apply_and_add<const M: usize>(
        &self,
        mut output: BufferMut<'_, N>,
        input: BufferRef<'_, M>,
    ) {
        debug_assert_eq!(output.len(), input.len(), "Buffer length mismatch");
        if M == N {
            for from in 0..N {
                let source = input.channel(from);
                for to in 0..N {
                    let coeff = self.coeffs[from][to];
                    if coeff != 0.0 {
                        multiply_add(output.channel_mut(to), source, coeff);
                    }
                }
            }
        } else if M == 1 {
            let source = input.channel(0);
            for to in 0..N {
                let coeff = self.coeffs.iter().map(|row| row[to]).sum::<f32>() / N as f32;
                if coeff != 0.0 {
                    multiply_add(output.channel_mut(to), source, coeff);
                }
            }
        } else {
            debug_assert!(false, "Can't pan {M} into {N} channels");
        }
    }
}

impl PanCoefficients<2> {
    /// Stereo panning law: pan `-1` is hard left, `0` center and `1` hard right.
    ///
    /// Panning moves the opposite channel's content into the panned channel, so the panned
    /// channel itself always stays at full gain.
    pub fn stereo(pan: f32) -> Self {
        debug_assert!((-1.0..=1.0).contains(&pan), "Pan value out of range");
        // [[left_to_left, left_to_right], [right_to_left, right_to_right]]
        if pan <= 0.0 {
            Self::from_matrix([[1.0, 0.0], [-pan, 1.0 + pan]])
        } else {
            Self::from_matrix([[1.0 - pan, pan], [0.0, 1.0]])
        }
    }
}

#[inline]
fn multiply_add(output: &mut [f32], input: &[f32], gain: f32) {
    for (o, i) in output.iter_mut().zip(input) {
        *o += *i * gain;
    }
}

// -------------------------------------------------------------------------------------------------
