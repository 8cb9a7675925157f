use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use morsesrc_cw::format::{FormatConstraints, SampleFormat};
use morsesrc_cw::settings::{DEFAULT_FREQUENCY_HZ, DEFAULT_VOLUME, DEFAULT_WPM};
use morsesrc_cw::{MorseSettings, MorseSource, Spacing, DEFAULT_FRAMES_PER_BUFFER};
use morsesrc_device::OutputDevice;

#[derive(Parser, Debug)]
#[command(name = "morsesrc", about = "Render text as Morse code audio")]
struct Args {
    /// Text to send. Multiple words are joined with spaces.
    #[arg(required = true)]
    text: Vec<String>,

    /// Tone frequency in Hz.
    #[arg(long, default_value_t = DEFAULT_FREQUENCY_HZ)]
    frequency: f64,

    /// Tone level from 0.0 to 1.0.
    #[arg(long, default_value_t = DEFAULT_VOLUME)]
    volume: f64,

    /// Keying speed in words per minute.
    #[arg(long, default_value_t = DEFAULT_WPM)]
    wpm: u32,

    /// Gap lengths between characters and words.
    #[arg(long, value_enum, default_value_t = SpacingArg::Compact)]
    spacing: SpacingArg,

    /// Sample format for raw output, e.g. S16LE, U8, F32BE.
    #[arg(long)]
    format: Option<SampleFormat>,

    /// Sample rate for raw output.
    #[arg(long)]
    rate: Option<u32>,

    /// Channel count for raw output.
    #[arg(long)]
    channels: Option<u16>,

    /// Frames requested per buffer.
    #[arg(long, default_value_t = DEFAULT_FRAMES_PER_BUFFER)]
    frames: usize,

    /// Write raw PCM to this file, or `-` for stdout.
    #[arg(long, short, default_value = "-", conflicts_with = "play")]
    output: PathBuf,

    /// Play through an audio device instead of writing raw PCM.
    #[arg(long)]
    play: bool,

    /// Regex selecting the output device by name.
    #[arg(long, requires = "play")]
    device: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SpacingArg {
    /// One unit for every gap.
    Compact,
    /// One, three and seven units.
    Standard,
}

impl From<SpacingArg> for Spacing {
    fn from(arg: SpacingArg) -> Self {
        match arg {
            SpacingArg::Compact => Spacing::Compact,
            SpacingArg::Standard => Spacing::Standard,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let settings = MorseSettings::builder()
        .frequency_hz(args.frequency)?
        .volume(args.volume)?
        .wpm(args.wpm)?
        .text(args.text.join(" "))
        .spacing(args.spacing.into())
        .build();
    let mut source = MorseSource::new(settings);

    if args.play {
        play(&mut source, &args)
    } else {
        write_raw(&mut source, &args)
    }
}

fn write_raw(source: &mut MorseSource, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut constraints = FormatConstraints::any();
    if let Some(format) = args.format {
        constraints = constraints.formats([format]);
    }
    if let Some(rate) = args.rate {
        constraints = constraints.rates(rate..=rate);
    }
    if let Some(channels) = args.channels {
        constraints = constraints.channels(channels..=channels);
    }
    let format = constraints.fixate()?;
    source.negotiate(&format)?;

    let out: Box<dyn Write> = if args.output.as_os_str() == "-" {
        Box::new(std::io::stdout().lock())
    } else {
        Box::new(File::create(&args.output)?)
    };
    let mut writer = BufWriter::new(out);

    source.start()?;
    let mut frames = 0usize;
    while let Some(buffer) = source.produce_buffer(args.frames)? {
        writer.write_all(&buffer.data)?;
        frames += buffer.frames;
    }
    writer.flush()?;
    source.stop();

    log::info!("wrote {} frames of {}", frames, format);
    Ok(())
}

fn play(source: &mut MorseSource, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let device = OutputDevice::open(args.device.as_deref())?;
    let format = FormatConstraints::any()
        .formats([SampleFormat::f32_native()])
        .rates(device.sample_rate_hz()..=device.sample_rate_hz())
        .channels(device.channels()..=device.channels())
        .fixate()?;
    source.negotiate(&format)?;

    let (output_tx, output_rx) = std::sync::mpsc::channel();
    let playback = device.play(output_rx)?;

    source.start()?;
    while let Some(buffer) = source.produce_buffer(args.frames)? {
        let samples: Vec<f32> = buffer
            .data
            .chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        output_tx.send(samples)?;
    }
    source.stop();
    drop(output_tx);

    playback.wait()
}
