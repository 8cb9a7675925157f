pub mod device;

pub use device::{OutputDevice, Playback};
