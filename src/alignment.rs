//! Places a grain's lifetime onto arbitrary block boundaries.

use crate::buffer::AudioView;

// -------------------------------------------------------------------------------------------------

/// Locates a grain relative to the block boundaries of the render stream.
///
/// `offset` is the number of samples until the grain starts, relative to the start of the next
/// block that gets processed. `remaining` is the number of samples of the grain's lifetime that
/// still need to be rendered. Once `remaining` reached zero the grain is depleted and must not be
/// advanced any further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Alignment {
    pub offset: usize,
    pub remaining: usize,
}

impl Alignment {
    pub const fn new(offset: usize, remaining: usize) -> Self {
        Self { offset, remaining }
    }

    /// True when the grain rendered its whole lifetime.
    #[inline]
    pub const fn is_depleted(&self) -> bool {
        self.remaining == 0
    }

    /// Terminate the grain, so that the next [`Self::is_depleted`] call returns true.
    #[inline]
    pub fn terminate(&mut self) {
        self.remaining = 0;
    }

    /// Crop the given block sized view to the range the grain covers in this block and advance
    /// the alignment to the next block.
    ///
    /// Returns an empty view when the grain does not start in this block. `remaining` is
    /// decremented by the length of the *cropped* view, so a grain which finishes in this block
    /// is depleted right after this call.
    pub fn advance_and_crop<V: AudioView>(&mut self, buffer: V) -> V {
        debug_assert!(!self.is_depleted(), "Depleted grains must not be advanced");

        // no operations needed for this block
        if self.offset >= buffer.len() {
            self.offset -= buffer.len();
            return V::empty();
        }

        // grain begins in this block
        let mut buffer = buffer;
        if self.offset > 0 {
            buffer = buffer.trimmed_begin(self.offset);
            self.offset = 0;
        }

        // grain terminates in this block
        if self.remaining < buffer.len() {
            buffer = buffer.trimmed_length(self.remaining);
        }

        self.remaining -= buffer.len();
        buffer
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::OwnedBuffer;

    #[test]
    fn crop_over_two_blocks() {
        let mut block = OwnedBuffer::<2>::new(32);
        let mut alignment = Alignment::new(10, 30);

        // block 1: starts at offset 10
        let view = alignment.advance_and_crop(block.view_mut());
        assert_eq!(view.len(), 22);
        assert_eq!(alignment, Alignment::new(0, 8));
        assert!(!alignment.is_depleted());

        // block 2: terminates after 8 samples
        let view = alignment.advance_and_crop(block.view_mut());
        assert_eq!(view.len(), 8);
        assert_eq!(alignment.remaining, 0);
        assert!(alignment.is_depleted());
    }

    #[test]
    fn cropped_view_addresses_grain_range() {
        let block = OwnedBuffer::from_channels([(0..8).map(|v| v as f32).collect::<Vec<_>>()]);
        let mut alignment = Alignment::new(5, 10);
        let view = alignment.advance_and_crop(block.view());
        assert_eq!(view.channel(0), &[5.0, 6.0, 7.0]);
        assert_eq!(alignment, Alignment::new(0, 7));
    }

    #[test]
    fn offset_beyond_block() {
        let block = OwnedBuffer::<1>::new(16);
        let mut alignment = Alignment::new(40, 5);

        let view = alignment.advance_and_crop(block.view());
        assert!(view.is_empty());
        assert_eq!(alignment, Alignment::new(24, 5));

        let view = alignment.advance_and_crop(block.view());
        assert!(view.is_empty());
        assert_eq!(alignment, Alignment::new(8, 5));

        let view = alignment.advance_and_crop(block.view());
        assert_eq!(view.len(), 5);
        assert!(alignment.is_depleted());
    }

    #[test]
    fn offset_equal_to_block_length() {
        let block = OwnedBuffer::<1>::new(16);
        let mut alignment = Alignment::new(16, 4);
        let view = alignment.advance_and_crop(block.view());
        assert!(view.is_empty());
        assert_eq!(alignment, Alignment::new(0, 4));

        let view = alignment.advance_and_crop(block.view());
        assert_eq!(view.len(), 4);
        assert!(alignment.is_depleted());
    }

    #[test]
    fn grain_within_single_block() {
        let block = OwnedBuffer::<1>::new(64);
        let mut alignment = Alignment::new(3, 20);
        let view = alignment.advance_and_crop(block.view());
        assert_eq!(view.len(), 20);
        assert!(alignment.is_depleted());
    }
}
