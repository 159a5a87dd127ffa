//! Schedules grains on a control thread and renders them on a simulated real-time audio thread,
//! passing grains via a lock-free grain queue. Writes the result into a wav file.

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use grainflow::{
    grain_queue,
    utils::{
        parameter::{GaussianParameter, RandomParameter, UniformParameter},
        timer::IntervalTimer,
    },
    EnvelopeShape, Error, Grain, GrainParameters, GrainProducer, GrainRenderer, InterpolationMode,
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
const BLOCK_SIZE: usize = 256;
const MAX_GRAINS: usize = 512;

const GRAIN_INTERVAL_MS: f64 = 4.0;
const GRAIN_INTERVAL_SPREAD_MS: f64 = 2.0;
const GRAIN_DURATION_MS: f64 = 150.0;
const GRAIN_DURATION_SPREAD_MS: f64 = 50.0;
const GRAIN_POSITION_SPREAD_MS: f64 = 40.0;
const GRAIN_PAN_SPREAD: f64 = 1.0; // 0.0 = center, 1.0 = full left/right
const OUTPUT_GAIN: f32 = 0.05;

// -------------------------------------------------------------------------------------------------

fn ms_to_samples(ms: f64) -> f64 {
    ms * SAMPLE_RATE as f64 / 1000.0
}

/// Control side: schedules grains for the block which gets rendered next, until `running` is
/// cleared. Returns the number of grains which got dropped because the queue was full.
fn schedule_grains(
    mut producer: GrainProducer<Grain<2>>,
    source_len: usize,
    rendered_blocks: &AtomicUsize,
    running: &AtomicBool,
) -> Result<usize, Error> {
    let mut intervals = GaussianParameter::new(
        ms_to_samples(GRAIN_INTERVAL_MS),
        ms_to_samples(GRAIN_INTERVAL_SPREAD_MS),
    )?;
    let mut durations = GaussianParameter::new(
        ms_to_samples(GRAIN_DURATION_MS),
        ms_to_samples(GRAIN_DURATION_SPREAD_MS),
    )?;
    let mut position_spread = GaussianParameter::new(0.0, ms_to_samples(GRAIN_POSITION_SPREAD_MS))?;
    let mut pans = UniformParameter::new(-GRAIN_PAN_SPREAD, GRAIN_PAN_SPREAD)?;
    let mut rates = UniformParameter::new(0.0, 2.0)?;

    let mut timer = IntervalTimer::new(intervals.sample_count(1));
    let mut grains = Vec::with_capacity(MAX_GRAINS);
    let mut scheduled_blocks = 0;
    let mut dropped_grains = 0;

    while running.load(Ordering::Acquire) {
        if scheduled_blocks > rendered_blocks.load(Ordering::Acquire) {
            thread::sleep(Duration::from_millis(1));
            continue;
        }
        // Slowly scan through the source material, playing an octave chord
        let scan_position =
            (scheduled_blocks * BLOCK_SIZE / 4) as f64 % (source_len as f64 * 0.8);
        timer.tick_block(BLOCK_SIZE, |timer, offset| {
            let parameters = GrainParameters {
                offset,
                duration: durations.sample_count(16),
                position: (scan_position + position_spread.sample()).max(0.0),
                rate: if rates.sample() > 1.0 { 2.0 } else { 1.0 },
                pan: pans.sample() as f32,
                envelope: EnvelopeShape::Hann,
                interpolation: InterpolationMode::Cubic,
            };
            grains.push(Grain::new(&parameters, source_len));
            timer.set_interval(intervals.sample_count(1));
        });
        // Publish all grains of a block at once
        let count = grains.len();
        dropped_grains += count - producer.push_batch(grains.drain(..));
        scheduled_blocks += 1;
    }
    Ok(dropped_grains)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse optional arguments
    let args = arguments::parse();

    let source = arguments::source_material(SAMPLE_RATE);
    let source_len = source.len();

    let config = RenderConfig {
        max_block_size: BLOCK_SIZE,
        capacity: MAX_GRAINS,
    };
    let mut renderer = GrainRenderer::<1>::new(&config)?;
    let (producer, mut consumer) = grain_queue::<Grain<2>>(config.capacity)?;

    let block_count = args.frame_count(SAMPLE_RATE) / BLOCK_SIZE;
    let rendered_blocks = Arc::new(AtomicUsize::new(0));
    let running = Arc::new(AtomicBool::new(true));

    let control_thread = thread::Builder::new()
        .name("grain-control".to_string())
        .spawn({
            let rendered_blocks = Arc::clone(&rendered_blocks);
            let running = Arc::clone(&running);
            move || schedule_grains(producer, source_len, &rendered_blocks, &running)
        })?;

    let audio_thread = thread::Builder::new()
        .name("grain-audio".to_string())
        .spawn({
            let rendered_blocks = Arc::clone(&rendered_blocks);
            move || {
                if let Err(err) = audio_thread_priority::promote_current_thread_to_real_time(
                    BLOCK_SIZE as u32,
                    SAMPLE_RATE,
                ) {
                    log::warn!("Failed to promote audio thread to real-time priority: {err}");
                }

                let block_duration =
                    Duration::from_secs_f64(BLOCK_SIZE as f64 / SAMPLE_RATE as f64);
                let mut output = OwnedBuffer::<2>::new(BLOCK_SIZE);
                let mut interleaved = vec![0.0; block_count * BLOCK_SIZE * 2];
                let mut max_alive = 0;

                log::info!("Rendering {block_count} blocks in real-time...");
                for block in interleaved.chunks_exact_mut(BLOCK_SIZE * 2) {
                    let start = Instant::now();

                    output.view_mut().clear();
                    let alive =
                        renderer.render_queue(output.view_mut(), source.view(), &mut consumer);
                    max_alive = max_alive.max(alive);

                    let mut view = output.view_mut();
                    view.multiply(&[OUTPUT_GAIN; BLOCK_SIZE]);
                    view.view().write_interleaved(block);

                    rendered_blocks.fetch_add(1, Ordering::Release);

                    // Simulate a real-time audio callback
                    if let Some(remaining) = block_duration.checked_sub(start.elapsed()) {
                        thread::sleep(remaining);
                    }
                }
                log::info!("Rendered at most {max_alive} simultaneous grains");
                interleaved
            }
        })?;

    let interleaved = audio_thread.join().map_err(|payload| {
        format!(
            "Audio thread panicked: {}",
            panic_message::panic_message(&payload)
        )
    })?;

    running.store(false, Ordering::Release);
    let dropped_grains = control_thread.join().map_err(|payload| {
        format!(
            "Control thread panicked: {}",
            panic_message::panic_message(&payload)
        )
    })??;
    if dropped_grains > 0 {
        log::warn!("Grain queue was exhausted: dropped {dropped_grains} grains");
    }

    arguments::write_wav(&args.output_path(), SAMPLE_RATE, 2, &interleaved)?;
    Ok(())
}
