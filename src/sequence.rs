//! Phase accumulators.

// -------------------------------------------------------------------------------------------------

/// A value plus a fixed per-sample increment.
///
/// Used for envelope phases and for fractional read positions. The value gets advanced exactly
/// once per produced sample and is never recomputed from scratch, so it resumes without drift
/// across block boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sequence {
    pub value: f64,
    pub increment: f64,
}

impl Sequence {
    pub const fn new(value: f64, increment: f64) -> Self {
        Self { value, increment }
    }

    /// Return the current value and advance to the next one.
    #[inline]
    pub fn next_value(&mut self) -> f64 {
        let value = self.value;
        self.value += self.increment;
        value
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates() {
        let mut seq = Sequence::new(1.0, 0.5);
        assert_eq!(seq.next_value(), 1.0);
        assert_eq!(seq.next_value(), 1.5);
        assert_eq!(seq.value, 2.0);
        assert_eq!(seq.increment, 0.5);
    }
}
