pub mod encode;
pub mod error;
pub mod format;
pub mod settings;
pub mod source;
pub mod synth;
pub mod table;
pub mod timing;

pub use encode::{encode, Gap, Timeline, Token};
pub use error::{Result, SourceError};
pub use format::{AudioFormatDescriptor, FormatConstraints, SampleFormat};
pub use settings::MorseSettings;
pub use source::{
    AudioBuffer, MorseSource, State, DEFAULT_FRAMES_PER_BUFFER, MAX_FRAMES_PER_BUFFER,
};
pub use table::{lookup, Element, MorseSymbol};
pub use timing::{Spacing, TimingProfile};
