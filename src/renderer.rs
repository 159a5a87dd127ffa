//! Block rendering drivers for grain collections.

use crate::{
    buffer::{BufferMut, BufferRef},
    grain::{Grain, GrainScratch},
    pool::Pool,
    stack::GrainConsumer,
    Error,
};

// -------------------------------------------------------------------------------------------------

/// Upfront sizing of a grain renderer and the grain containers it drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Largest number of samples a grain renders at once. Larger output blocks get split up.
    pub max_block_size: usize,
    /// Maximum number of simultaneously alive grains.
    pub capacity: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_block_size: 1024,
            capacity: 256,
        }
    }
}

impl RenderConfig {
    /// Largest supported `max_block_size`.
    pub const MAX_BLOCK_SIZE: usize = 1 << 16;

    /// Validate all config values.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_block_size == 0 || self.max_block_size > Self::MAX_BLOCK_SIZE {
            return Err(Error::ConfigError(format!(
                "max_block_size must be > 0 and <= {}",
                Self::MAX_BLOCK_SIZE
            )));
        }
        if self.capacity == 0 || self.capacity >= u32::MAX as usize {
            return Err(Error::ConfigError(format!(
                "capacity must be > 0 and < {}",
                u32::MAX
            )));
        }
        Ok(())
    }

    /// Create a grain pool with the configured capacity.
    pub fn create_pool<const N: usize>(&self) -> Pool<Grain<N>> {
        Pool::with_capacity(self.capacity)
    }
}

// -------------------------------------------------------------------------------------------------

/// Renders grains, which read from `M` channel source material, into output blocks.
///
/// Owns all temporary memory that rendering needs, so rendering itself never allocates. When
/// the `assert-allocs` feature is enabled, allocations in render calls get reported.
pub struct GrainRenderer<const M: usize> {
    scratch: GrainScratch<M>,
}

impl<const M: usize> GrainRenderer<M> {
    pub fn new(config: &RenderConfig) -> Result<Self, Error> {
        config.validate()?;
        log::debug!(
            "Creating grain renderer with max block size {} for {} grains",
            config.max_block_size,
            config.capacity
        );
        Ok(Self {
            scratch: GrainScratch::new(config.max_block_size),
        })
    }

    /// Largest number of samples a grain renders at once.
    pub fn max_block_size(&self) -> usize {
        self.scratch.capacity()
    }

    /// Mix all grains of the pool into `output` and remove depleted grains.
    ///
    /// `output` is not cleared: grains get added to its existing content. Returns the number
    /// of grains which are still alive.
    pub fn render_pool<const N: usize>(
        &mut self,
        mut output: BufferMut<'_, N>,
        source: BufferRef<'_, M>,
        pool: &mut Pool<Grain<N>>,
    ) -> usize {
        let scratch = &mut self.scratch;
        Self::assert_no_alloc(|| {
            pool.retain_rev(|grain| {
                !grain
                    .render(output.reborrow(), source, scratch)
                    .is_depleted()
            });
            pool.len()
        })
    }

    /// Adopt newly pushed grains, mix all grains of the consumer into `output` and remove
    /// depleted grains.
    ///
    /// `output` is not cleared: grains get added to its existing content. Returns the number
    /// of grains which are still alive.
    pub fn render_queue<const N: usize>(
        &mut self,
        mut output: BufferMut<'_, N>,
        source: BufferRef<'_, M>,
        consumer: &mut GrainConsumer<Grain<N>>,
    ) -> usize {
        let scratch = &mut self.scratch;
        Self::assert_no_alloc(|| {
            consumer.process(|grain| {
                !grain
                    .render(output.reborrow(), source, scratch)
                    .is_depleted()
            })
        })
    }

    fn assert_no_alloc<T, F: FnOnce() -> T>(func: F) -> T {
        #[cfg(feature = "assert-allocs")]
        return assert_no_alloc::assert_no_alloc::<T, F>(func);

        #[cfg(not(feature = "assert-allocs"))]
        return func();
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        buffer::{AudioView, OwnedBuffer},
        grain::GrainParameters,
        stack::grain_queue,
    };

    fn source() -> OwnedBuffer<1> {
        OwnedBuffer::from_channels([vec![1.0; 1000]])
    }

    fn parameters(offset: usize, duration: usize) -> GrainParameters {
        GrainParameters {
            offset,
            duration,
            position: 10.0,
            ..GrainParameters::default()
        }
    }

    #[test]
    fn config_validation() {
        assert!(RenderConfig::default().validate().is_ok());
        let config = RenderConfig {
            max_block_size: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
        assert!(GrainRenderer::<1>::new(&config).is_err());
        let config = RenderConfig {
            capacity: 0,
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn renders_pool() {
        let source = source();
        let config = RenderConfig {
            max_block_size: 8,
            capacity: 4,
        };
        let mut renderer = GrainRenderer::<1>::new(&config).unwrap();
        let mut pool = config.create_pool::<2>();

        pool.push(Grain::new(&parameters(5, 10), source.len()))
            .unwrap();
        pool.push(Grain::new(&parameters(0, 4), source.len()))
            .unwrap();

        let mut block = OwnedBuffer::<2>::new(8);
        let alive = renderer.render_pool(block.view_mut(), source.view(), &mut pool);
        assert_eq!(alive, 1);
        // both grains overlap nowhere: first 4 and last 3 samples are non zero
        let active = block
            .channel(0)
            .iter()
            .map(|s| *s != 0.0)
            .collect::<Vec<_>>();
        assert_eq!(
            active,
            vec![true, true, true, true, false, true, true, true]
        );

        block.view_mut().clear();
        let alive = renderer.render_pool(block.view_mut(), source.view(), &mut pool);
        assert_eq!(alive, 0);
        assert_eq!(block.channel(0).iter().filter(|s| **s != 0.0).count(), 7);
        assert!(pool.is_empty());
    }

    #[test]
    fn renders_queue_like_pool() {
        let source = source();
        let config = RenderConfig {
            max_block_size: 16,
            capacity: 8,
        };
        let grains = [(0, 40), (7, 20), (30, 5), (100, 3)]
            .map(|(offset, duration)| Grain::<2>::new(&parameters(offset, duration), 1000));

        let mut pool_renderer = GrainRenderer::<1>::new(&config).unwrap();
        let mut pool = config.create_pool::<2>();
        for grain in grains.iter().cloned() {
            pool.push(grain).unwrap();
        }

        let mut queue_renderer = GrainRenderer::<1>::new(&config).unwrap();
        let (mut producer, mut consumer) = grain_queue(config.capacity).unwrap();
        assert_eq!(producer.push_batch(grains.iter().cloned()), grains.len());

        // blocks larger than the max block size get split up
        let block_size = 24;
        for _ in 0..6 {
            let mut pool_block = OwnedBuffer::<2>::new(block_size);
            let mut queue_block = OwnedBuffer::<2>::new(block_size);
            let pool_alive =
                pool_renderer.render_pool(pool_block.view_mut(), source.view(), &mut pool);
            let queue_alive = queue_renderer.render_queue(
                queue_block.view_mut(),
                source.view(),
                &mut consumer,
            );
            assert_eq!(pool_alive, queue_alive);
            for channel in 0..2 {
                for (a, b) in pool_block
                    .channel(channel)
                    .iter()
                    .zip(queue_block.channel(channel))
                {
                    assert!((a - b).abs() < 1e-6);
                }
            }
        }
        assert!(pool.is_empty());
        assert!(consumer.is_empty());
    }
}
