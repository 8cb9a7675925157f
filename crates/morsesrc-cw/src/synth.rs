use std::ops::Range;

use crate::format::{AudioFormatDescriptor, SampleFormat};

/// A native sample type the synthesizer can render into directly.
pub trait Sample: Copy + Default {
    /// Value of a full-scale positive peak.
    const FULL_SCALE: f64;

    /// Convert a value already scaled to `FULL_SCALE`. Integers truncate and saturate.
    fn from_f64(value: f64) -> Self;

    fn write_ne(self, out: &mut Vec<u8>);
}

impl Sample for i16 {
    const FULL_SCALE: f64 = i16::MAX as f64;

    fn from_f64(value: f64) -> Self {
        value as i16
    }

    fn write_ne(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_ne_bytes());
    }
}

impl Sample for i32 {
    const FULL_SCALE: f64 = i32::MAX as f64;

    fn from_f64(value: f64) -> Self {
        value as i32
    }

    fn write_ne(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_ne_bytes());
    }
}

impl Sample for f32 {
    const FULL_SCALE: f64 = 1.0;

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn write_ne(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_ne_bytes());
    }
}

impl Sample for f64 {
    const FULL_SCALE: f64 = 1.0;

    fn from_f64(value: f64) -> Self {
        value
    }

    fn write_ne(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_ne_bytes());
    }
}

/// Pitch and level of the keyed carrier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f64,
    pub volume: f64,
    pub sample_rate_hz: u32,
}

impl Tone {
    /// Unit-amplitude carrier value `index` samples into a tone.
    pub fn carrier(&self, index: usize) -> f64 {
        let omega = std::f64::consts::TAU * self.frequency_hz / f64::from(self.sample_rate_hz);
        (omega * index as f64).sin()
    }
}

/// Render a tone into interleaved `region`, the same value on every channel.
///
/// `offset` is the number of samples of this tone rendered before, so a tone
/// split across buffers continues where it stopped.
pub fn render_tone<S: Sample>(region: &mut [S], channels: usize, offset: usize, tone: &Tone) {
    let scale = tone.volume * S::FULL_SCALE;
    for (i, frame) in region.chunks_exact_mut(channels.max(1)).enumerate() {
        frame.fill(S::from_f64(scale * tone.carrier(offset + i)));
    }
}

pub fn render_silence<S: Sample>(region: &mut [S]) {
    region.fill(S::default());
}

/// Native type the synthesizer renders into for a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    I16,
    I32,
    F32,
    F64,
}

/// Synthesis path chosen once per negotiated format.
///
/// Native-endian S16, S32, F32 and F64 are rendered directly. Every other
/// integer format is rendered as i32 and every other float format as f64,
/// then packed into the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Synthesizer {
    strategy: Strategy,
    pack: Option<SampleFormat>,
    channels: usize,
}

impl Synthesizer {
    pub fn for_format(descriptor: &AudioFormatDescriptor) -> Self {
        let format = descriptor.format;
        let (strategy, pack) = if format == SampleFormat::s16_native() {
            (Strategy::I16, None)
        } else if format == SampleFormat::s32_native() {
            (Strategy::I32, None)
        } else if format == SampleFormat::f32_native() {
            (Strategy::F32, None)
        } else if format == SampleFormat::f64_native() {
            (Strategy::F64, None)
        } else if format.is_float() {
            (Strategy::F64, Some(format))
        } else {
            (Strategy::I32, Some(format))
        };

        Self {
            strategy,
            pack,
            channels: usize::from(descriptor.channels).max(1),
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Target format when the rendered samples need packing.
    pub fn pack_format(&self) -> Option<SampleFormat> {
        self.pack
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// A silent block with room for `frames` frames.
    pub fn block(&self, frames: usize) -> Block {
        let len = frames * self.channels;
        let samples = match self.strategy {
            Strategy::I16 => Samples::I16(vec![0; len]),
            Strategy::I32 => Samples::I32(vec![0; len]),
            Strategy::F32 => Samples::F32(vec![0.0; len]),
            Strategy::F64 => Samples::F64(vec![0.0; len]),
        };
        Block {
            samples,
            channels: self.channels,
            pack: self.pack,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Samples {
    I16(Vec<i16>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

/// Interleaved samples for one output buffer, in the synthesizer's native type.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    samples: Samples,
    channels: usize,
    pack: Option<SampleFormat>,
}

impl Block {
    pub fn frames(&self) -> usize {
        let len = match &self.samples {
            Samples::I16(s) => s.len(),
            Samples::I32(s) => s.len(),
            Samples::F32(s) => s.len(),
            Samples::F64(s) => s.len(),
        };
        len / self.channels
    }

    fn span(&self, frames: Range<usize>) -> Range<usize> {
        frames.start * self.channels..frames.end * self.channels
    }

    /// Render `frames` of a tone that has already played `offset` samples.
    pub fn tone(&mut self, frames: Range<usize>, offset: usize, tone: &Tone) {
        let span = self.span(frames);
        let channels = self.channels;
        match &mut self.samples {
            Samples::I16(s) => render_tone(&mut s[span], channels, offset, tone),
            Samples::I32(s) => render_tone(&mut s[span], channels, offset, tone),
            Samples::F32(s) => render_tone(&mut s[span], channels, offset, tone),
            Samples::F64(s) => render_tone(&mut s[span], channels, offset, tone),
        }
    }

    pub fn silence(&mut self, frames: Range<usize>) {
        let span = self.span(frames);
        match &mut self.samples {
            Samples::I16(s) => render_silence(&mut s[span]),
            Samples::I32(s) => render_silence(&mut s[span]),
            Samples::F32(s) => render_silence(&mut s[span]),
            Samples::F64(s) => render_silence(&mut s[span]),
        }
    }

    /// Serialize the first `frames` frames in the negotiated format.
    pub fn into_bytes(self, frames: usize) -> Vec<u8> {
        let len = frames.min(self.frames()) * self.channels;
        let mut out = Vec::new();
        match (&self.samples, self.pack) {
            (Samples::I32(s), Some(format)) => format.pack_i32(&s[..len], &mut out),
            (Samples::F64(s), Some(format)) => format.pack_f64(&s[..len], &mut out),
            (Samples::I16(s), _) => native_bytes(&s[..len], &mut out),
            (Samples::I32(s), None) => native_bytes(&s[..len], &mut out),
            (Samples::F32(s), _) => native_bytes(&s[..len], &mut out),
            (Samples::F64(s), None) => native_bytes(&s[..len], &mut out),
        }
        out
    }
}

fn native_bytes<S: Sample>(samples: &[S], out: &mut Vec<u8>) {
    out.reserve(std::mem::size_of_val(samples));
    for &sample in samples {
        sample.write_ne(out);
    }
}
