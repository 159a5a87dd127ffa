use std::{
    error::Error,
    f32::consts::PI,
    path::{Path, PathBuf},
};

use arg::{parse_args, Args};
use hound::{SampleFormat, WavSpec, WavWriter};

use grainflow::OwnedBuffer;

// -------------------------------------------------------------------------------------------------

const DEFAULT_LOG_LEVEL: log::Level = if cfg!(debug_assertions) {
    log::Level::Debug
} else {
    log::Level::Warn
};

const DEFAULT_OUTPUT_PATH: &str = "grains.wav";
const DEFAULT_DURATION: f64 = 10.0;

// -------------------------------------------------------------------------------------------------

/// Default program arguments for grainflow demo applications.
#[derive(Args, Debug, Default)]
#[allow(unused)]
pub struct Arguments {
    #[arg(short = "o", long = "output")]
    /// Write rendered audio into the given wav file. By default \"grains.wav\".
    pub output_path: Option<PathBuf>,
    #[arg(short = "d", long = "duration")]
    /// Length of the rendered audio in seconds. By default 10 seconds.
    pub duration: Option<f64>,
    #[arg(short = "l", long = "log-level")]
    /// Set logging level to \"debug\", \"info\", \"warn\" or \"error\".
    /// By default \"debug\" in dev builds and \"warn\" in release builds.
    pub log_level: Option<log::Level>,
}

impl Arguments {
    #[allow(unused)]
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH))
    }

    /// Number of frames to render at the given sample rate.
    #[allow(unused)]
    pub fn frame_count(&self, sample_rate: u32) -> usize {
        let duration = self.duration.unwrap_or(DEFAULT_DURATION).max(0.0);
        (duration * sample_rate as f64) as usize
    }
}

/// Parse common demo arguments and apply the log-level arg to the logger
#[allow(unused)]
pub fn parse() -> Arguments {
    // Parse args
    let args = parse_args::<Arguments>();

    create_logger(args.log_level);
    args
}

// -------------------------------------------------------------------------------------------------

/// Create default logger from arguments. Invoked from `parse`.
#[allow(unused)]
pub fn create_logger(log_level: Option<log::Level>) {
    // Init logger
    simple_logger::SimpleLogger::new()
        // use default or arg level by default
        .with_level(log_level.unwrap_or(DEFAULT_LOG_LEVEL).to_level_filter())
        // disable logging in chatty modules
        .with_module_level("audio_thread_priority", log::LevelFilter::Warn)
        .init()
        .expect("Failed to set logger");
}

// -------------------------------------------------------------------------------------------------

/// Synthesize some mono source material to granulate: a slowly detuned, decaying chord.
#[allow(unused)]
pub fn source_material(sample_rate: u32) -> OwnedBuffer<1> {
    const SECONDS: usize = 4;
    const PARTIALS: [(f32, f32); 4] = [(220.0, 0.5), (277.2, 0.3), (329.6, 0.3), (440.7, 0.2)];
    let len = SECONDS * sample_rate as usize;
    let samples = (0..len)
        .map(|frame| {
            let time = frame as f32 / sample_rate as f32;
            let decay = (-time * 0.6).exp();
            PARTIALS
                .iter()
                .map(|(freq, gain)| gain * (2.0 * PI * freq * time).sin())
                .sum::<f32>()
                * decay
        })
        .collect();
    OwnedBuffer::from_channels([samples])
}

/// Write interleaved samples as 32bit float wav file.
#[allow(unused)]
pub fn write_wav(
    path: &Path,
    sample_rate: u32,
    channel_count: usize,
    interleaved: &[f32],
) -> Result<(), Box<dyn Error>> {
    let spec = WavSpec {
        channels: channel_count as u16,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for sample in interleaved {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;
    log::info!(
        "Wrote {} frames to '{}'",
        interleaved.len() / channel_count,
        path.display()
    );
    Ok(())
}
