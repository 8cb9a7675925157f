//! Negotiated audio formats and sample packing.

use std::ops::RangeInclusive;
use std::str::FromStr;

use phf::phf_map;

use crate::error::{Result, SourceError};

/// Rate picked by [`FormatConstraints::fixate`] when the range allows it.
pub const DEFAULT_RATE: u32 = 44_100;

/// Byte order of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    #[cfg(target_endian = "little")]
    pub const NATIVE: Endianness = Endianness::Little;
    #[cfg(target_endian = "big")]
    pub const NATIVE: Endianness = Endianness::Big;
}

/// Numeric representation of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    Signed,
    Unsigned,
    Float,
}

/// Static description of a sample format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    pub name: &'static str,
    pub kind: SampleKind,
    /// Bits occupied by one sample in memory.
    pub width: u32,
    /// Significant bits of an integer sample.
    pub depth: u32,
    pub endianness: Endianness,
}

impl FormatInfo {
    const fn new(
        name: &'static str,
        kind: SampleKind,
        width: u32,
        depth: u32,
        endianness: Endianness,
    ) -> Self {
        Self {
            name,
            kind,
            width,
            depth,
            endianness,
        }
    }
}

/// Interleaved PCM sample formats the source can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    S8,
    U8,
    S16le,
    S16be,
    U16le,
    U16be,
    S2432le,
    S2432be,
    U2432le,
    U2432be,
    S32le,
    S32be,
    U32le,
    U32be,
    S24le,
    S24be,
    U24le,
    U24be,
    S20le,
    S20be,
    U20le,
    U20be,
    S18le,
    S18be,
    U18le,
    U18be,
    F32le,
    F32be,
    F64le,
    F64be,
}

static FORMAT_NAMES: phf::Map<&'static str, SampleFormat> = phf_map! {
    "S8" => SampleFormat::S8,
    "U8" => SampleFormat::U8,
    "S16LE" => SampleFormat::S16le,
    "S16BE" => SampleFormat::S16be,
    "U16LE" => SampleFormat::U16le,
    "U16BE" => SampleFormat::U16be,
    "S24_32LE" => SampleFormat::S2432le,
    "S24_32BE" => SampleFormat::S2432be,
    "U24_32LE" => SampleFormat::U2432le,
    "U24_32BE" => SampleFormat::U2432be,
    "S32LE" => SampleFormat::S32le,
    "S32BE" => SampleFormat::S32be,
    "U32LE" => SampleFormat::U32le,
    "U32BE" => SampleFormat::U32be,
    "S24LE" => SampleFormat::S24le,
    "S24BE" => SampleFormat::S24be,
    "U24LE" => SampleFormat::U24le,
    "U24BE" => SampleFormat::U24be,
    "S20LE" => SampleFormat::S20le,
    "S20BE" => SampleFormat::S20be,
    "U20LE" => SampleFormat::U20le,
    "U20BE" => SampleFormat::U20be,
    "S18LE" => SampleFormat::S18le,
    "S18BE" => SampleFormat::S18be,
    "U18LE" => SampleFormat::U18le,
    "U18BE" => SampleFormat::U18be,
    "F32LE" => SampleFormat::F32le,
    "F32BE" => SampleFormat::F32be,
    "F64LE" => SampleFormat::F64le,
    "F64BE" => SampleFormat::F64be,
};

impl SampleFormat {
    pub const ALL: [SampleFormat; 30] = [
        SampleFormat::S16le,
        SampleFormat::S16be,
        SampleFormat::U16le,
        SampleFormat::U16be,
        SampleFormat::S2432le,
        SampleFormat::S2432be,
        SampleFormat::U2432le,
        SampleFormat::U2432be,
        SampleFormat::S32le,
        SampleFormat::S32be,
        SampleFormat::U32le,
        SampleFormat::U32be,
        SampleFormat::S24le,
        SampleFormat::S24be,
        SampleFormat::U24le,
        SampleFormat::U24be,
        SampleFormat::S20le,
        SampleFormat::S20be,
        SampleFormat::U20le,
        SampleFormat::U20be,
        SampleFormat::S18le,
        SampleFormat::S18be,
        SampleFormat::U18le,
        SampleFormat::U18be,
        SampleFormat::F32le,
        SampleFormat::F32be,
        SampleFormat::F64le,
        SampleFormat::F64be,
        SampleFormat::S8,
        SampleFormat::U8,
    ];

    /// Signed 16-bit in host byte order.
    pub const fn s16_native() -> Self {
        match Endianness::NATIVE {
            Endianness::Little => SampleFormat::S16le,
            Endianness::Big => SampleFormat::S16be,
        }
    }

    pub const fn s32_native() -> Self {
        match Endianness::NATIVE {
            Endianness::Little => SampleFormat::S32le,
            Endianness::Big => SampleFormat::S32be,
        }
    }

    pub const fn f32_native() -> Self {
        match Endianness::NATIVE {
            Endianness::Little => SampleFormat::F32le,
            Endianness::Big => SampleFormat::F32be,
        }
    }

    pub const fn f64_native() -> Self {
        match Endianness::NATIVE {
            Endianness::Little => SampleFormat::F64le,
            Endianness::Big => SampleFormat::F64be,
        }
    }

    pub const fn info(self) -> FormatInfo {
        use Endianness::{Big, Little};
        use SampleKind::{Float, Signed, Unsigned};

        match self {
            SampleFormat::S8 => FormatInfo::new("S8", Signed, 8, 8, Little),
            SampleFormat::U8 => FormatInfo::new("U8", Unsigned, 8, 8, Little),
            SampleFormat::S16le => FormatInfo::new("S16LE", Signed, 16, 16, Little),
            SampleFormat::S16be => FormatInfo::new("S16BE", Signed, 16, 16, Big),
            SampleFormat::U16le => FormatInfo::new("U16LE", Unsigned, 16, 16, Little),
            SampleFormat::U16be => FormatInfo::new("U16BE", Unsigned, 16, 16, Big),
            SampleFormat::S2432le => FormatInfo::new("S24_32LE", Signed, 32, 24, Little),
            SampleFormat::S2432be => FormatInfo::new("S24_32BE", Signed, 32, 24, Big),
            SampleFormat::U2432le => FormatInfo::new("U24_32LE", Unsigned, 32, 24, Little),
            SampleFormat::U2432be => FormatInfo::new("U24_32BE", Unsigned, 32, 24, Big),
            SampleFormat::S32le => FormatInfo::new("S32LE", Signed, 32, 32, Little),
            SampleFormat::S32be => FormatInfo::new("S32BE", Signed, 32, 32, Big),
            SampleFormat::U32le => FormatInfo::new("U32LE", Unsigned, 32, 32, Little),
            SampleFormat::U32be => FormatInfo::new("U32BE", Unsigned, 32, 32, Big),
            SampleFormat::S24le => FormatInfo::new("S24LE", Signed, 24, 24, Little),
            SampleFormat::S24be => FormatInfo::new("S24BE", Signed, 24, 24, Big),
            SampleFormat::U24le => FormatInfo::new("U24LE", Unsigned, 24, 24, Little),
            SampleFormat::U24be => FormatInfo::new("U24BE", Unsigned, 24, 24, Big),
            SampleFormat::S20le => FormatInfo::new("S20LE", Signed, 24, 20, Little),
            SampleFormat::S20be => FormatInfo::new("S20BE", Signed, 24, 20, Big),
            SampleFormat::U20le => FormatInfo::new("U20LE", Unsigned, 24, 20, Little),
            SampleFormat::U20be => FormatInfo::new("U20BE", Unsigned, 24, 20, Big),
            SampleFormat::S18le => FormatInfo::new("S18LE", Signed, 24, 18, Little),
            SampleFormat::S18be => FormatInfo::new("S18BE", Signed, 24, 18, Big),
            SampleFormat::U18le => FormatInfo::new("U18LE", Unsigned, 24, 18, Little),
            SampleFormat::U18be => FormatInfo::new("U18BE", Unsigned, 24, 18, Big),
            SampleFormat::F32le => FormatInfo::new("F32LE", Float, 32, 32, Little),
            SampleFormat::F32be => FormatInfo::new("F32BE", Float, 32, 32, Big),
            SampleFormat::F64le => FormatInfo::new("F64LE", Float, 64, 64, Little),
            SampleFormat::F64be => FormatInfo::new("F64BE", Float, 64, 64, Big),
        }
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn bytes_per_sample(self) -> usize {
        (self.info().width / 8) as usize
    }

    pub fn is_float(self) -> bool {
        self.info().kind == SampleKind::Float
    }

    /// Append `samples` to `out` in this format.
    ///
    /// Integer targets keep the top `depth` bits of each sample; unsigned
    /// targets are biased to mid-scale. Float targets map full scale to 1.0.
    pub fn pack_i32(self, samples: &[i32], out: &mut Vec<u8>) {
        let info = self.info();
        out.reserve(samples.len() * self.bytes_per_sample());

        if info.kind == SampleKind::Float {
            for &sample in samples {
                write_float(info, f64::from(sample) / f64::from(i32::MAX), out);
            }
            return;
        }

        let shift = 32 - info.depth;
        for &sample in samples {
            let bits = match info.kind {
                SampleKind::Unsigned => ((sample as u32) ^ 0x8000_0000) >> shift,
                _ => (sample >> shift) as u32,
            };
            write_int(info, bits, out);
        }
    }

    /// Append `samples` to `out` in this format. Integer targets scale 1.0 to full scale.
    pub fn pack_f64(self, samples: &[f64], out: &mut Vec<u8>) {
        let info = self.info();
        if info.kind != SampleKind::Float {
            let wide: Vec<i32> = samples
                .iter()
                .map(|&sample| (sample * f64::from(i32::MAX)) as i32)
                .collect();
            self.pack_i32(&wide, out);
            return;
        }

        out.reserve(samples.len() * self.bytes_per_sample());
        for &sample in samples {
            write_float(info, sample, out);
        }
    }
}

fn write_int(info: FormatInfo, bits: u32, out: &mut Vec<u8>) {
    let len = (info.width / 8) as usize;
    match info.endianness {
        Endianness::Little => out.extend_from_slice(&bits.to_le_bytes()[..len]),
        Endianness::Big => out.extend_from_slice(&bits.to_be_bytes()[4 - len..]),
    }
}

fn write_float(info: FormatInfo, value: f64, out: &mut Vec<u8>) {
    match (info.width, info.endianness) {
        (32, Endianness::Little) => out.extend_from_slice(&(value as f32).to_le_bytes()),
        (32, Endianness::Big) => out.extend_from_slice(&(value as f32).to_be_bytes()),
        (_, Endianness::Little) => out.extend_from_slice(&value.to_le_bytes()),
        (_, Endianness::Big) => out.extend_from_slice(&value.to_be_bytes()),
    }
}

impl std::fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleFormat {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self> {
        FORMAT_NAMES
            .get(s.to_ascii_uppercase().as_str())
            .copied()
            .ok_or_else(|| SourceError::UnsupportedFormat(s.to_string()))
    }
}

/// A fully negotiated stream format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormatDescriptor {
    pub format: SampleFormat,
    pub channels: u16,
    pub rate: u32,
}

impl AudioFormatDescriptor {
    pub fn new(format: SampleFormat, channels: u16, rate: u32) -> Self {
        Self {
            format,
            channels,
            rate,
        }
    }

    /// Check that the rate and channel count are usable.
    pub fn validate(&self) -> Result<()> {
        if self.rate == 0 {
            return Err(SourceError::InvalidSampleRate(self.rate));
        }
        if self.channels == 0 {
            return Err(SourceError::InvalidChannels(self.channels));
        }
        Ok(())
    }

    pub fn bytes_per_frame(&self) -> usize {
        self.format.bytes_per_sample() * usize::from(self.channels)
    }
}

impl Default for AudioFormatDescriptor {
    fn default() -> Self {
        Self::new(SampleFormat::s16_native(), 1, DEFAULT_RATE)
    }
}

impl std::fmt::Display for AudioFormatDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {} Hz, {} channel(s)",
            self.format, self.rate, self.channels
        )
    }
}

/// What a downstream consumer accepts, before a format is fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatConstraints {
    pub formats: Vec<SampleFormat>,
    pub rates: RangeInclusive<u32>,
    pub channels: RangeInclusive<u16>,
}

impl FormatConstraints {
    /// Accept every format, rate and channel count.
    pub fn any() -> Self {
        Self {
            formats: SampleFormat::ALL.to_vec(),
            rates: 1..=i32::MAX as u32,
            channels: 1..=u16::MAX,
        }
    }

    /// Restrict to the given formats.
    pub fn formats(mut self, formats: impl IntoIterator<Item = SampleFormat>) -> Self {
        self.formats = formats.into_iter().collect();
        self
    }

    /// Restrict the sample rate range.
    pub fn rates(mut self, rates: RangeInclusive<u32>) -> Self {
        self.rates = rates;
        self
    }

    /// Restrict the channel count range.
    pub fn channels(mut self, channels: RangeInclusive<u16>) -> Self {
        self.channels = channels;
        self
    }

    /// Pick one concrete format: 44.1 kHz, native S16 and mono where allowed,
    /// otherwise the nearest rate, the first listed format and the fewest channels.
    pub fn fixate(&self) -> Result<AudioFormatDescriptor> {
        let preferred = SampleFormat::s16_native();
        let format = if self.formats.contains(&preferred) {
            preferred
        } else {
            *self
                .formats
                .first()
                .ok_or_else(|| SourceError::UnsupportedFormat("(none)".to_string()))?
        };

        let min_rate = (*self.rates.start()).max(1);
        let max_rate = *self.rates.end();
        if min_rate > max_rate {
            return Err(SourceError::InvalidSampleRate(max_rate));
        }

        let min_channels = (*self.channels.start()).max(1);
        let max_channels = *self.channels.end();
        if min_channels > max_channels {
            return Err(SourceError::InvalidChannels(max_channels));
        }

        Ok(AudioFormatDescriptor::new(
            format,
            1.clamp(min_channels, max_channels),
            DEFAULT_RATE.clamp(min_rate, max_rate),
        ))
    }
}

impl Default for FormatConstraints {
    fn default() -> Self {
        Self::any()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packed_i32(format: SampleFormat, samples: &[i32]) -> Vec<u8> {
        let mut out = Vec::new();
        format.pack_i32(samples, &mut out);
        out
    }

    #[test]
    fn names_round_trip() {
        for format in SampleFormat::ALL {
            assert_eq!(format.name().parse::<SampleFormat>(), Ok(format));
        }
        assert_eq!("s24_32be".parse::<SampleFormat>(), Ok(SampleFormat::S2432be));
    }

    #[test]
    fn unknown_name_is_unsupported() {
        assert_eq!(
            "S12LE".parse::<SampleFormat>(),
            Err(SourceError::UnsupportedFormat("S12LE".to_string()))
        );
    }

    #[test]
    fn container_sizes() {
        assert_eq!(SampleFormat::S8.bytes_per_sample(), 1);
        assert_eq!(SampleFormat::U16be.bytes_per_sample(), 2);
        assert_eq!(SampleFormat::S20le.bytes_per_sample(), 3);
        assert_eq!(SampleFormat::S2432le.bytes_per_sample(), 4);
        assert_eq!(SampleFormat::F64be.bytes_per_sample(), 8);
    }

    #[test]
    fn pack_narrows_to_depth() {
        let full = i32::MAX;
        assert_eq!(packed_i32(SampleFormat::S16le, &[full]), 32767i16.to_le_bytes());
        assert_eq!(packed_i32(SampleFormat::S16be, &[full]), 32767i16.to_be_bytes());
        assert_eq!(packed_i32(SampleFormat::S8, &[full]), [0x7f]);
        assert_eq!(packed_i32(SampleFormat::S24le, &[full]), [0xff, 0xff, 0x7f]);
        assert_eq!(packed_i32(SampleFormat::S24be, &[full]), [0x7f, 0xff, 0xff]);
        assert_eq!(packed_i32(SampleFormat::S20le, &[full]), [0xff, 0xff, 0x07]);
        assert_eq!(packed_i32(SampleFormat::S18be, &[full]), [0x01, 0xff, 0xff]);
    }

    #[test]
    fn pack_sign_extends_in_wide_containers() {
        let bytes = packed_i32(SampleFormat::S2432le, &[-256]);
        assert_eq!(i32::from_le_bytes(bytes.try_into().unwrap()), -1);
    }

    #[test]
    fn unsigned_silence_is_mid_scale() {
        assert_eq!(packed_i32(SampleFormat::U8, &[0]), [0x80]);
        assert_eq!(packed_i32(SampleFormat::U16le, &[0]), 0x8000u16.to_le_bytes());
        assert_eq!(packed_i32(SampleFormat::U16be, &[0]), 0x8000u16.to_be_bytes());
        assert_eq!(packed_i32(SampleFormat::U24le, &[0]), [0x00, 0x00, 0x80]);
        assert_eq!(packed_i32(SampleFormat::U20be, &[0]), [0x08, 0x00, 0x00]);
        assert_eq!(
            packed_i32(SampleFormat::U2432le, &[0]),
            0x0080_0000u32.to_le_bytes()
        );
        assert_eq!(packed_i32(SampleFormat::U32be, &[0]), 0x8000_0000u32.to_be_bytes());
    }

    #[test]
    fn unsigned_extremes() {
        assert_eq!(packed_i32(SampleFormat::U8, &[i32::MIN, i32::MAX]), [0x00, 0xff]);
    }

    #[test]
    fn pack_f64_to_floats() {
        let mut out = Vec::new();
        SampleFormat::F32be.pack_f64(&[0.5], &mut out);
        assert_eq!(out, 0.5f32.to_be_bytes());

        out.clear();
        SampleFormat::F64le.pack_f64(&[-0.25], &mut out);
        assert_eq!(out, (-0.25f64).to_le_bytes());
    }

    #[test]
    fn pack_f64_to_integers_scales_full_range() {
        let mut out = Vec::new();
        SampleFormat::S16le.pack_f64(&[1.0, 0.0], &mut out);
        assert_eq!(out, [0xff, 0x7f, 0x00, 0x00]);
    }

    #[test]
    fn descriptor_validation() {
        let good = AudioFormatDescriptor::default();
        assert_eq!(good.validate(), Ok(()));
        assert_eq!(good.bytes_per_frame(), 2);

        let no_rate = AudioFormatDescriptor::new(SampleFormat::F32le, 2, 0);
        assert_eq!(no_rate.validate(), Err(SourceError::InvalidSampleRate(0)));

        let no_channels = AudioFormatDescriptor::new(SampleFormat::F32le, 0, 8_000);
        assert_eq!(no_channels.validate(), Err(SourceError::InvalidChannels(0)));
    }

    #[test]
    fn fixate_prefers_defaults() {
        let fixed = FormatConstraints::any().fixate().unwrap();
        assert_eq!(fixed, AudioFormatDescriptor::default());
    }

    #[test]
    fn fixate_takes_nearest_values() {
        let fixed = FormatConstraints::any()
            .formats([SampleFormat::F32be, SampleFormat::U8])
            .rates(48_000..=96_000)
            .channels(2..=8)
            .fixate()
            .unwrap();
        assert_eq!(
            fixed,
            AudioFormatDescriptor::new(SampleFormat::F32be, 2, 48_000)
        );

        let low = FormatConstraints::any().rates(8_000..=22_050).fixate().unwrap();
        assert_eq!(low.rate, 22_050);
    }

    #[test]
    fn fixate_rejects_empty_constraints() {
        let none = FormatConstraints::any().formats([]);
        assert!(matches!(
            none.fixate(),
            Err(SourceError::UnsupportedFormat(_))
        ));

        #[allow(clippy::reversed_empty_ranges)]
        let empty_rates = FormatConstraints::any().rates(48_000..=44_100);
        assert_eq!(
            empty_rates.fixate(),
            Err(SourceError::InvalidSampleRate(44_100))
        );
    }
}
