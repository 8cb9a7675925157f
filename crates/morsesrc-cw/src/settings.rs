use crate::error::{Result, SourceError};
use crate::timing::Spacing;

pub const DEFAULT_FREQUENCY_HZ: f64 = 440.0;
pub const DEFAULT_VOLUME: f64 = 0.5;
pub const DEFAULT_WPM: u32 = 20;

/// User-facing settings of a Morse source.
///
/// Every setter validates its value and leaves the setting unchanged on error.
#[derive(Debug, Clone, PartialEq)]
pub struct MorseSettings {
    frequency_hz: f64,
    volume: f64,
    wpm: u32,
    text: Option<String>,
    spacing: Spacing,
}

impl Default for MorseSettings {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            volume: DEFAULT_VOLUME,
            wpm: DEFAULT_WPM,
            text: None,
            spacing: Spacing::default(),
        }
    }
}

impl MorseSettings {
    /// Create a builder with default settings.
    pub fn builder() -> MorseSettingsBuilder {
        MorseSettingsBuilder::new()
    }

    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn wpm(&self) -> u32 {
        self.wpm
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    /// Set the tone frequency. Must be finite and not negative.
    pub fn set_frequency_hz(&mut self, frequency_hz: f64) -> Result<()> {
        if !frequency_hz.is_finite() || frequency_hz < 0.0 {
            return Err(SourceError::InvalidFrequency(frequency_hz));
        }
        self.frequency_hz = frequency_hz;
        Ok(())
    }

    /// Set the tone level, from 0.0 (silent) to 1.0 (full scale).
    pub fn set_volume(&mut self, volume: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(SourceError::InvalidVolume(volume));
        }
        self.volume = volume;
        Ok(())
    }

    /// Set the keying speed in words per minute.
    pub fn set_wpm(&mut self, wpm: u32) -> Result<()> {
        if wpm == 0 {
            return Err(SourceError::InvalidWpm(wpm));
        }
        self.wpm = wpm;
        Ok(())
    }

    /// Set the text sent by the next run. `None` clears it.
    pub fn set_text<S: Into<String>>(&mut self, text: Option<S>) {
        self.text = text.map(Into::into);
    }

    pub fn set_spacing(&mut self, spacing: Spacing) {
        self.spacing = spacing;
    }
}

/// Builder for [`MorseSettings`].
#[derive(Debug, Clone, Default)]
pub struct MorseSettingsBuilder {
    settings: MorseSettings,
}

impl MorseSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tone frequency in Hz.
    pub fn frequency_hz(mut self, frequency_hz: f64) -> Result<Self> {
        self.settings.set_frequency_hz(frequency_hz)?;
        Ok(self)
    }

    /// Set the tone level.
    pub fn volume(mut self, volume: f64) -> Result<Self> {
        self.settings.set_volume(volume)?;
        Ok(self)
    }

    /// Set the keying speed.
    pub fn wpm(mut self, wpm: u32) -> Result<Self> {
        self.settings.set_wpm(wpm)?;
        Ok(self)
    }

    /// Set the text to send.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.settings.set_text(Some(text));
        self
    }

    /// Set the gap spacing.
    pub fn spacing(mut self, spacing: Spacing) -> Self {
        self.settings.set_spacing(spacing);
        self
    }

    pub fn build(self) -> MorseSettings {
        self.settings
    }
}
