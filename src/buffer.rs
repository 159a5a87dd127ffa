//! Non-owning, multi-channel views over externally owned planar sample storage.
//!
//! Views borrow the caller's storage for their lifetime `'a` only: they never allocate, never
//! free and can't outlive the storage they point into. Slicing a view never mutates it, but
//! returns a new, narrower view instead. A zero-length view is the "empty" sentinel which is
//! used to signal that nothing has to be rendered.

use std::{array, mem};

// -------------------------------------------------------------------------------------------------

/// Common slicing interface of [`BufferRef`] and [`BufferMut`].
pub trait AudioView: Sized {
    /// Number of sample frames in the view.
    fn len(&self) -> usize;

    /// True for the zero-length "empty" sentinel view.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create a new zero-length view.
    fn empty() -> Self;

    /// Narrow the view to `len` frames, starting at frame `offset`.
    fn sub(self, offset: usize, len: usize) -> Self;

    /// Drop the leading `offset` frames.
    fn trimmed_begin(self, offset: usize) -> Self {
        let len = self.len();
        debug_assert!(offset <= len, "Trim offset exceeds the view's length");
        let offset = offset.min(len);
        self.sub(offset, len - offset)
    }

    /// Shrink the view to the first `len` frames.
    fn trimmed_length(self, len: usize) -> Self {
        debug_assert!(len <= self.len(), "Trim length exceeds the view's length");
        let len = len.min(self.len());
        self.sub(0, len)
    }
}

// -------------------------------------------------------------------------------------------------

/// Read-only view into `N` planar channels of equal length.
#[derive(Debug, Clone, Copy)]
pub struct BufferRef<'a, const N: usize> {
    channels: [&'a [f32]; N],
}

impl<'a, const N: usize> BufferRef<'a, N> {
    const _VERIFY_N: () = assert!(N > 0, "Buffer views need at least one channel");

    /// Create a view from the given channel slices. All slices must have the same length.
    pub fn new(channels: [&'a [f32]; N]) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::_VERIFY_N;
        debug_assert!(
            channels.iter().all(|c| c.len() == channels[0].len()),
            "All channels of a buffer view must have the same length"
        );
        Self { channels }
    }

    /// Number of channels in the view.
    pub const fn channel_count(&self) -> usize {
        N
    }

    /// Access a single channel's samples.
    #[inline]
    pub fn channel(&self, index: usize) -> &'a [f32] {
        debug_assert!(index < N, "Channel index out of range");
        self.channels[index]
    }

    /// Split the view into two views at frame `mid`.
    pub fn split_at(self, mid: usize) -> (Self, Self) {
        debug_assert!(mid <= self.len(), "Split position exceeds the view's length");
        let heads = self.channels.map(|c| &c[..mid]);
        let tails = self.channels.map(|c| &c[mid..]);
        (Self { channels: heads }, Self { channels: tails })
    }

    /// Copy the planar view into the given interleaved buffer, which must be large enough to
    /// hold `len() * N` samples.
    pub fn write_interleaved(&self, interleaved: &mut [f32]) {
        debug_assert!(
            interleaved.len() >= self.len() * N,
            "Interleaved buffer is too small"
        );
        match N {
            1 => {
                for (i, p) in interleaved.iter_mut().zip(self.channels[0]) {
                    *i = *p;
                }
            }
            2 => {
                let frames = interleaved.chunks_exact_mut(2);
                for (frame, (l, r)) in frames.zip(self.channels[0].iter().zip(self.channels[1])) {
                    frame[0] = *l;
                    frame[1] = *r;
                }
            }
            _ => {
                for (channel_index, channel_values) in self.channels.iter().enumerate() {
                    for (frame_index, value) in channel_values.iter().enumerate() {
                        interleaved[frame_index * N + channel_index] = *value;
                    }
                }
            }
        }
    }
}

impl<const N: usize> AudioView for BufferRef<'_, N> {
    #[inline]
    fn len(&self) -> usize {
        self.channels[0].len()
    }

    fn empty() -> Self {
        Self {
            channels: [&[] as &[f32]; N],
        }
    }

    fn sub(self, offset: usize, len: usize) -> Self {
        debug_assert!(
            offset + len <= self.len(),
            "Sub view exceeds the number of samples available"
        );
        Self {
            channels: self.channels.map(|c| &c[offset..offset + len]),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Writable view into `N` planar channels of equal length.
#[derive(Debug)]
pub struct BufferMut<'a, const N: usize> {
    channels: [&'a mut [f32]; N],
}

impl<'a, const N: usize> BufferMut<'a, N> {
    const _VERIFY_N: () = assert!(N > 0, "Buffer views need at least one channel");

    /// Create a view from the given channel slices. All slices must have the same length.
    pub fn new(channels: [&'a mut [f32]; N]) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::_VERIFY_N;
        debug_assert!(
            channels.iter().all(|c| c.len() == channels[0].len()),
            "All channels of a buffer view must have the same length"
        );
        Self { channels }
    }

    /// Number of channels in the view.
    pub const fn channel_count(&self) -> usize {
        N
    }

    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        debug_assert!(index < N, "Channel index out of range");
        &*self.channels[index]
    }

    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        debug_assert!(index < N, "Channel index out of range");
        &mut *self.channels[index]
    }

    /// Read-only view of the same frames.
    pub fn view(&self) -> BufferRef<'_, N> {
        BufferRef {
            channels: array::from_fn(|index| &*self.channels[index]),
        }
    }

    /// Short-lived writable view of the same frames, which leaves `self` usable afterwards.
    pub fn reborrow(&mut self) -> BufferMut<'_, N> {
        BufferMut {
            channels: self.channels.each_mut().map(|c| &mut **c),
        }
    }

    /// Split the view into two non-overlapping views at frame `mid`.
    pub fn split_at(self, mid: usize) -> (Self, Self) {
        debug_assert!(mid <= self.len(), "Split position exceeds the view's length");
        let mut pairs = self.channels.map(|c| c.split_at_mut(mid));
        let heads = array::from_fn(|index| mem::take(&mut pairs[index].0));
        let tails = array::from_fn(|index| mem::take(&mut pairs[index].1));
        (Self { channels: heads }, Self { channels: tails })
    }

    /// Set all samples to zero.
    pub fn clear(&mut self) {
        self.fill(0.0);
    }

    /// Set all samples to the given value.
    pub fn fill(&mut self, value: f32) {
        for channel in &mut self.channels {
            channel.fill(value);
        }
    }

    /// Copy the first channel's samples into all other channels.
    pub fn duplicate_first_channel(&mut self) {
        if let Some((first, rest)) = self.channels.split_first_mut() {
            for channel in rest {
                channel.copy_from_slice(first);
            }
        }
    }

    /// Multiply every channel with the given mono gain curve, which must have the view's length.
    pub fn multiply(&mut self, gains: &[f32]) {
        debug_assert_eq!(gains.len(), self.len(), "Gain curve length mismatch");
        for channel in &mut self.channels {
            for (sample, gain) in channel.iter_mut().zip(gains) {
                *sample *= *gain;
            }
        }
    }
}

impl<const N: usize> AudioView for BufferMut<'_, N> {
    #[inline]
    fn len(&self) -> usize {
        self.channels[0].len()
    }

    fn empty() -> Self {
        Self {
            channels: array::from_fn(|_| <&mut [f32]>::default()),
        }
    }

    fn sub(self, offset: usize, len: usize) -> Self {
        debug_assert!(
            offset + len <= self.len(),
            "Sub view exceeds the number of samples available"
        );
        Self {
            channels: self.channels.map(|c| &mut c[offset..offset + len]),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Owned planar storage with `N` channels, to create [`BufferRef`] and [`BufferMut`] views from.
///
/// Allocates on construction only: use it for pre-allocated scratch memory, source material and
/// output blocks which are created before real-time processing starts.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedBuffer<const N: usize> {
    channels: [Vec<f32>; N],
}

impl<const N: usize> OwnedBuffer<N> {
    /// Create a new zeroed buffer with the given frame count.
    pub fn new(len: usize) -> Self {
        Self {
            channels: array::from_fn(|_| vec![0.0; len]),
        }
    }

    /// Wrap existing planar channel data. All channels must have the same length.
    pub fn from_channels(channels: [Vec<f32>; N]) -> Self {
        debug_assert!(
            channels.iter().all(|c| c.len() == channels[0].len()),
            "All channels of a buffer must have the same length"
        );
        Self { channels }
    }

    /// Number of sample frames.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.channels[index]
    }

    /// Read-only view of the whole buffer.
    pub fn view(&self) -> BufferRef<'_, N> {
        BufferRef::new(array::from_fn(|index| self.channels[index].as_slice()))
    }

    /// Writable view of the whole buffer.
    pub fn view_mut(&mut self) -> BufferMut<'_, N> {
        BufferMut::new(self.channels.each_mut().map(|c| c.as_mut_slice()))
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_views() {
        let buffer = OwnedBuffer::from_channels([
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            vec![5.0, 6.0, 7.0, 8.0, 9.0],
        ]);
        let view = buffer.view();
        assert_eq!(view.len(), 5);
        assert_eq!(view.channel_count(), 2);

        let sub = view.sub(1, 3);
        assert_eq!(sub.channel(0), &[1.0, 2.0, 3.0]);
        assert_eq!(sub.channel(1), &[6.0, 7.0, 8.0]);

        let trimmed = view.trimmed_begin(2);
        assert_eq!(trimmed.channel(0), &[2.0, 3.0, 4.0]);
        let trimmed = trimmed.trimmed_length(1);
        assert_eq!(trimmed.channel(1), &[7.0]);

        // original view is untouched
        assert_eq!(view.len(), 5);
    }

    #[test]
    fn empty_views() {
        let view = BufferRef::<2>::empty();
        assert!(view.is_empty());
        let view = BufferMut::<3>::empty();
        assert!(view.is_empty());

        let mut buffer = OwnedBuffer::<1>::new(4);
        let view = buffer.view_mut().trimmed_begin(4);
        assert!(view.is_empty());
    }

    #[test]
    fn mutable_views() {
        let mut buffer = OwnedBuffer::<2>::new(6);
        {
            let view = buffer.view_mut();
            let (mut head, mut tail) = view.split_at(2);
            head.fill(1.0);
            tail.reborrow().sub(1, 2).fill(2.0);
            tail.channel_mut(1)[3] = 3.0;
            tail.multiply(&[1.0, 0.5, 0.5, 1.0]);
        }
        assert_eq!(buffer.channel(0), &[1.0, 1.0, 0.0, 1.0, 1.0, 0.0]);
        assert_eq!(buffer.channel(1), &[1.0, 1.0, 0.0, 1.0, 1.0, 3.0]);

        buffer.view_mut().clear();
        assert!(buffer.channel(0).iter().all(|s| *s == 0.0));
    }

    #[test]
    fn interleaving() {
        // mono
        let mono = OwnedBuffer::from_channels([vec![1.0, 2.0, 3.0]]);
        let mut interleaved = vec![0.0; 3];
        mono.view().write_interleaved(&mut interleaved);
        assert_eq!(interleaved, vec![1.0, 2.0, 3.0]);

        // stereo
        let stereo = OwnedBuffer::from_channels([vec![1.0, 2.0], vec![3.0, 4.0]]);
        let mut interleaved = vec![0.0; 4];
        stereo.view().write_interleaved(&mut interleaved);
        assert_eq!(interleaved, vec![1.0, 3.0, 2.0, 4.0]);

        // general
        let general =
            OwnedBuffer::from_channels([vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);
        let mut interleaved = vec![0.0; 6];
        general.view().write_interleaved(&mut interleaved);
        assert_eq!(interleaved, vec![1.0, 3.0, 5.0, 2.0, 4.0, 6.0]);
    }
}
