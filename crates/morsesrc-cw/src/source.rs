use std::time::Duration;

use crate::encode::{encode, Timeline, Token};
use crate::error::{Result, SourceError};
use crate::format::AudioFormatDescriptor;
use crate::settings::MorseSettings;
use crate::synth::{Synthesizer, Tone};
use crate::timing::TimingProfile;

/// Frames a host asks for per buffer by default: 0.12 s at 44.1 kHz.
pub const DEFAULT_FRAMES_PER_BUFFER: usize = 5292;

/// Upper bound on the frames rendered by one [`MorseSource::produce_buffer`] call.
pub const MAX_FRAMES_PER_BUFFER: usize = 52_920;

/// One buffer of interleaved PCM in the negotiated format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    pub data: Vec<u8>,
    pub frames: usize,
    /// Presentation timestamp from the start of the run.
    pub pts: Duration,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Streaming,
    Finished,
}

/// Position of the driver inside its timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackCursor {
    /// Index of the token being played.
    pub position: usize,
    /// Samples of that token already emitted.
    pub offset: usize,
    /// Running time at the last rate change.
    base: Duration,
    /// Frames emitted since `base`.
    frames: u64,
}

impl PlaybackCursor {
    /// Running timestamp at `rate`.
    pub fn timestamp(&self, rate: u32) -> Duration {
        self.base + frames_to_duration(self.frames, rate)
    }
}

#[derive(Debug, Clone, Copy)]
struct Negotiated {
    format: AudioFormatDescriptor,
    timing: TimingProfile,
    synth: Synthesizer,
}

/// Push-style audio source that keys text as Morse code.
///
/// The host negotiates a format, starts the source and then pulls buffers until
/// [`produce_buffer`](Self::produce_buffer) reports the end of the stream.
/// Text is captured at [`start`](Self::start); frequency and volume are read
/// again for every buffer; wpm and spacing apply from the next negotiation or start.
#[derive(Debug, Clone)]
pub struct MorseSource {
    settings: MorseSettings,
    negotiated: Option<Negotiated>,
    timeline: Option<Timeline>,
    cursor: PlaybackCursor,
    state: State,
}

impl Default for MorseSource {
    fn default() -> Self {
        Self::new(MorseSettings::default())
    }
}

impl MorseSource {
    pub fn new(settings: MorseSettings) -> Self {
        Self {
            settings,
            negotiated: None,
            timeline: None,
            cursor: PlaybackCursor::default(),
            state: State::Idle,
        }
    }

    pub fn settings(&self) -> &MorseSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut MorseSettings {
        &mut self.settings
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    /// Timeline of the current run, if one is active.
    pub fn timeline(&self) -> Option<&[Token]> {
        self.timeline.as_deref()
    }

    pub fn format(&self) -> Option<AudioFormatDescriptor> {
        self.negotiated.map(|n| n.format)
    }

    pub fn timing(&self) -> Option<TimingProfile> {
        self.negotiated.map(|n| n.timing)
    }

    /// Accept a negotiated format and derive timing and the synthesis path for it.
    ///
    /// On error the previous format, if any, stays in effect.
    pub fn negotiate(&mut self, format: &AudioFormatDescriptor) -> Result<()> {
        format.validate()?;
        let timing = TimingProfile::with_spacing(
            format.rate,
            self.settings.wpm(),
            self.settings.spacing(),
        )?;
        let synth = Synthesizer::for_format(format);

        if let Some(previous) = self.negotiated {
            let rate = previous.format.rate;
            self.cursor.base = self.cursor.timestamp(rate);
            self.cursor.frames = 0;
        }

        log::debug!(
            "negotiated {}: {} samples per dot, {:?} synthesis",
            format,
            timing.samples_per_dot,
            synth.strategy()
        );

        self.negotiated = Some(Negotiated {
            format: *format,
            timing,
            synth,
        });
        Ok(())
    }

    /// Begin a new run from the current text, discarding any previous run.
    pub fn start(&mut self) -> Result<()> {
        if let Some(negotiated) = &mut self.negotiated {
            negotiated.timing = TimingProfile::with_spacing(
                negotiated.format.rate,
                self.settings.wpm(),
                self.settings.spacing(),
            )?;
        }

        let timeline = match self.settings.text() {
            Some(text) if !text.is_empty() => encode(text),
            _ => Timeline::new(),
        };
        log::debug!("start: {} timeline tokens", timeline.len());

        self.timeline = Some(timeline);
        self.cursor = PlaybackCursor::default();
        self.state = State::Streaming;
        Ok(())
    }

    /// End the run and release its timeline.
    pub fn stop(&mut self) {
        log::debug!("stop");
        self.timeline = None;
        self.cursor = PlaybackCursor::default();
        self.state = State::Idle;
    }

    /// Render the next buffer of at most `max_frames` frames.
    ///
    /// Returns `Ok(None)` once the timeline is exhausted, and on every call
    /// after that. A token that does not fit is cut at the buffer edge and
    /// resumed by the next call.
    pub fn produce_buffer(&mut self, max_frames: usize) -> Result<Option<AudioBuffer>> {
        match self.state {
            State::Idle => return Err(SourceError::NotStarted),
            State::Finished => return Ok(None),
            State::Streaming => {}
        }
        let negotiated = self.negotiated.ok_or(SourceError::NotNegotiated)?;
        let timeline = self.timeline.as_deref().unwrap_or(&[]);

        let room = max_frames.clamp(1, MAX_FRAMES_PER_BUFFER);
        let tone = Tone {
            frequency_hz: self.settings.frequency_hz(),
            volume: self.settings.volume(),
            sample_rate_hz: negotiated.format.rate,
        };

        let mut block = negotiated.synth.block(room);
        let mut filled = 0;
        while filled < room && self.cursor.position < timeline.len() {
            let token = timeline[self.cursor.position];
            let total = negotiated.timing.samples_for(token);
            let take = total.saturating_sub(self.cursor.offset).min(room - filled);
            let frames = filled..filled + take;

            match token {
                Token::Tone(_) => block.tone(frames, self.cursor.offset, &tone),
                Token::Gap(_) => block.silence(frames),
            }

            filled += take;
            self.cursor.offset += take;
            if self.cursor.offset >= total {
                self.cursor.position += 1;
                self.cursor.offset = 0;
            }
        }

        if filled == 0 {
            log::debug!("end of stream");
            self.timeline = None;
            self.state = State::Finished;
            return Ok(None);
        }

        let rate = negotiated.format.rate;
        let pts = self.cursor.timestamp(rate);
        self.cursor.frames += filled as u64;
        let duration = self.cursor.timestamp(rate) - pts;

        log::trace!(
            "buffer: {} frames at {:?}, token {}",
            filled,
            pts,
            self.cursor.position
        );

        Ok(Some(AudioBuffer {
            data: block.into_bytes(filled),
            frames: filled,
            pts,
            duration,
        }))
    }
}

/// Convert a frame count to stream time, truncating to whole nanoseconds.
pub fn frames_to_duration(frames: u64, rate: u32) -> Duration {
    if rate == 0 {
        return Duration::ZERO;
    }
    let nanos = u128::from(frames) * 1_000_000_000 / u128::from(rate);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}
