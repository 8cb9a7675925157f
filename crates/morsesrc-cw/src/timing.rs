use crate::encode::{Gap, Token};
use crate::error::{Result, SourceError};
use crate::table::Element;

/// PARIS timing: one average word is 50 units long.
const UNITS_PER_WORD: u64 = 50;

/// Length of the gaps between characters and words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Spacing {
    /// Every gap is one unit long.
    #[default]
    Compact,
    /// One unit between elements, three between characters and seven between words.
    Standard,
}

impl Spacing {
    fn units(self, gap: Gap) -> usize {
        match (self, gap) {
            (Spacing::Compact, _) => 1,
            (Spacing::Standard, Gap::IntraChar) => 1,
            (Spacing::Standard, Gap::InterChar) => 3,
            (Spacing::Standard, Gap::InterWord) => 7,
        }
    }
}

/// Per-token durations in samples for a sample rate and keying speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingProfile {
    pub samples_per_dot: usize,
    pub samples_per_dash: usize,
    pub samples_per_intra_gap: usize,
    pub samples_per_char_gap: usize,
    pub samples_per_word_gap: usize,
}

impl TimingProfile {
    /// Derive the profile with one-unit gaps.
    pub fn derive(sample_rate_hz: u32, wpm: u32) -> Result<Self> {
        Self::with_spacing(sample_rate_hz, wpm, Spacing::Compact)
    }

    /// Derive the profile, sizing gaps by `spacing`.
    pub fn with_spacing(sample_rate_hz: u32, wpm: u32, spacing: Spacing) -> Result<Self> {
        if sample_rate_hz == 0 {
            return Err(SourceError::InvalidSampleRate(sample_rate_hz));
        }
        if wpm == 0 {
            return Err(SourceError::InvalidWpm(wpm));
        }

        // One word lasts 60 / wpm seconds, so one unit is 60 / (wpm * 50) seconds.
        let dot = u64::from(sample_rate_hz) * 60 / (u64::from(wpm) * UNITS_PER_WORD);
        let dot = usize::try_from(dot).unwrap_or(usize::MAX).max(1);

        Ok(Self {
            samples_per_dot: dot,
            samples_per_dash: dot.saturating_mul(3),
            samples_per_intra_gap: dot.saturating_mul(spacing.units(Gap::IntraChar)),
            samples_per_char_gap: dot.saturating_mul(spacing.units(Gap::InterChar)),
            samples_per_word_gap: dot.saturating_mul(spacing.units(Gap::InterWord)),
        })
    }

    /// Duration of a token in samples.
    pub fn samples_for(&self, token: Token) -> usize {
        match token {
            Token::Tone(Element::Dot) => self.samples_per_dot,
            Token::Tone(Element::Dash) => self.samples_per_dash,
            Token::Gap(Gap::IntraChar) => self.samples_per_intra_gap,
            Token::Gap(Gap::InterChar) => self.samples_per_char_gap,
            Token::Gap(Gap::InterWord) => self.samples_per_word_gap,
        }
    }

    /// Total duration of a timeline in samples.
    pub fn total_samples(&self, timeline: &[Token]) -> usize {
        timeline.iter().map(|&token| self.samples_for(token)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode;

    #[test]
    fn paris_at_20_wpm() {
        let timing = TimingProfile::derive(44_100, 20).unwrap();
        assert_eq!(timing.samples_per_dot, 2646);
        assert_eq!(timing.samples_per_dash, 7938);
        assert_eq!(timing.samples_per_intra_gap, 2646);
        assert_eq!(timing.samples_per_char_gap, 2646);
        assert_eq!(timing.samples_per_word_gap, 2646);
    }

    #[test]
    fn dot_truncates() {
        // 48000 * 60 / (13 * 50) = 4430.769...
        let timing = TimingProfile::derive(48_000, 13).unwrap();
        assert_eq!(timing.samples_per_dot, 4430);
    }

    #[test]
    fn standard_spacing_stretches_gaps() {
        let timing = TimingProfile::with_spacing(8_000, 12, Spacing::Standard).unwrap();
        assert_eq!(timing.samples_per_dot, 800);
        assert_eq!(timing.samples_per_intra_gap, 800);
        assert_eq!(timing.samples_per_char_gap, 2400);
        assert_eq!(timing.samples_per_word_gap, 5600);
    }

    #[test]
    fn rejects_zero_rate_and_wpm() {
        assert_eq!(
            TimingProfile::derive(0, 20),
            Err(SourceError::InvalidSampleRate(0))
        );
        assert_eq!(
            TimingProfile::derive(44_100, 0),
            Err(SourceError::InvalidWpm(0))
        );
    }

    #[test]
    fn very_fast_keying_keeps_one_sample() {
        let timing = TimingProfile::derive(1, u32::MAX).unwrap();
        assert_eq!(timing.samples_per_dot, 1);
    }

    #[test]
    fn paris_keeps_trailing_char_gap() {
        let timing = TimingProfile::with_spacing(1_000, 1, Spacing::Standard).unwrap();
        let total = timing.total_samples(&encode("PARIS"));
        // 43 units of characters and gaps plus the word gap, with the last
        // character gap kept in front of it: 50 + 3.
        assert_eq!(total, 53 * timing.samples_per_dot);
    }
}
