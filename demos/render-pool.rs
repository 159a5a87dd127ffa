//! Renders a grain cloud on a single thread, using a grain pool, and writes it into a wav file.

use grainflow::{
    utils::{
        parameter::{GaussianParameter, RandomParameter, UniformParameter},
        timer::IntervalTimer,
    },
    EnvelopeShape, Grain, GrainParameters, GrainRenderer, InterpolationMode,
    OwnedBuffer, RenderConfig,
};

// -------------------------------------------------------------------------------------------------

// Common demo code
#[path = "./common/arguments.rs"]
mod arguments;

// -------------------------------------------------------------------------------------------------

#[cfg(all(debug_assertions, feature = "assert-allocs"))]
#[global_allocator]
static A: assert_no_alloc::AllocDisabler = assert_no_alloc::AllocDisabler;

// -------------------------------------------------------------------------------------------------

// Grain cloud parameters (tweak as needed!)

const SAMPLE_RATE: u32 = 44100;
const BLOCK_SIZE: usize = 512;
const MAX_GRAINS: usize = 256;

const GRAIN_INTERVAL_MS: f64 = 12.0;
const GRAIN_INTERVAL_SPREAD_MS: f64 = 4.0;
const GRAIN_DURATION_MS: f64 = 90.0;
const GRAIN_DURATION_SPREAD_MS: f64 = 30.0;
const GRAIN_RATE_SPREAD: f64 = 0.02; // 0.0 = unison
const GRAIN_PAN_SPREAD: f64 = 0.8; // 0.0 = center, 1.0 = full left/right
const OUTPUT_GAIN: f32 = 0.15;

// -------------------------------------------------------------------------------------------------

fn ms_to_samples(ms: f64) -> f64 {
    ms * SAMPLE_RATE as f64 / 1000.0
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse optional arguments
    let args = arguments::parse();

    let source = arguments::source_material(SAMPLE_RATE);

    let config = RenderConfig {
        max_block_size: BLOCK_SIZE,
        capacity: MAX_GRAINS,
    };
    let mut renderer = GrainRenderer::<1>::new(&config)?;
    let mut pool = config.create_pool::<2>();

    // Randomized grain parameters
    let mut intervals = GaussianParameter::new(
        ms_to_samples(GRAIN_INTERVAL_MS),
        ms_to_samples(GRAIN_INTERVAL_SPREAD_MS),
    )?;
    let mut durations = GaussianParameter::new(
        ms_to_samples(GRAIN_DURATION_MS),
        ms_to_samples(GRAIN_DURATION_SPREAD_MS),
    )?;
    let mut positions = UniformParameter::new(0.0, source.len() as f64)?;
    let mut rates = GaussianParameter::new(1.0, GRAIN_RATE_SPREAD)?;
    let mut pans = UniformParameter::new(-GRAIN_PAN_SPREAD, GRAIN_PAN_SPREAD)?;

    let mut timer = IntervalTimer::new(intervals.sample_count(1));

    let block_count = args.frame_count(SAMPLE_RATE) / BLOCK_SIZE;
    let mut output = OwnedBuffer::<2>::new(BLOCK_SIZE);
    let mut interleaved = vec![0.0; block_count * BLOCK_SIZE * 2];
    let mut dropped_grains = 0;
    let mut max_alive = 0;

    log::info!("Rendering {block_count} blocks...");
    for block in interleaved.chunks_exact_mut(BLOCK_SIZE * 2) {
        output.view_mut().clear();

        // Spawn new grains at their exact sample offsets in this block
        timer.tick_block(BLOCK_SIZE, |timer, offset| {
            let parameters = GrainParameters {
                offset,
                duration: durations.sample_count(16),
                position: positions.sample(),
                rate: rates.sample_clamped(0.25, 4.0),
                pan: pans.sample() as f32,
                envelope: EnvelopeShape::HalfCosine,
                interpolation: InterpolationMode::Cubic,
            };
            if pool.push(Grain::new(&parameters, source.len())).is_err() {
                dropped_grains += 1;
            }
            timer.set_interval(intervals.sample_count(1));
        });

        let alive = renderer.render_pool(output.view_mut(), source.view(), &mut pool);
        max_alive = max_alive.max(alive);

        let mut view = output.view_mut();
        view.multiply(&[OUTPUT_GAIN; BLOCK_SIZE]);
        view.view().write_interleaved(block);
    }

    if dropped_grains > 0 {
        log::warn!("Grain pool was exhausted: dropped {dropped_grains} grains");
    }
    log::info!("Rendered at most {max_alive} simultaneous grains");

    arguments::write_wav(&args.output_path(), SAMPLE_RATE, 2, &interleaved)?;
    Ok(())
}
