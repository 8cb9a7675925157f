use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use regex::Regex;
use ringbuf::HeapRb;
use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};

const OUTPUT_RING_SECS: usize = 4;

/// An output device opened with its default f32 configuration.
pub struct OutputDevice {
    device: cpal::Device,
    config: cpal::StreamConfig,
}

impl OutputDevice {
    /// Open the first output device whose name matches `device_regex`, or the default device.
    pub fn open(device_regex: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let host = cpal::default_host();
        let device = select_output_device(&host, device_regex)?;
        let config = device.default_output_config()?;
        if config.sample_format() != cpal::SampleFormat::F32 {
            return Err(format!(
                "unsupported sample format {:?} (expected f32)",
                config.sample_format()
            )
            .into());
        }
        let config: cpal::StreamConfig = config.into();
        log::info!(
            "output device `{}`: {} Hz, {} channel(s)",
            device.name().unwrap_or_else(|_| "<unknown>".to_string()),
            config.sample_rate.0,
            config.channels
        );
        Ok(Self { device, config })
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Start playing interleaved chunks received on `chunks`.
    ///
    /// Each chunk must already be laid out for [`channels`](Self::channels).
    /// Dropping the sender marks the end of the audio.
    pub fn play(self, chunks: Receiver<Vec<f32>>) -> Result<Playback, Box<dyn std::error::Error>> {
        let ring_cap = self.config.sample_rate.0 as usize
            * usize::from(self.config.channels)
            * OUTPUT_RING_SECS;
        let ring = HeapRb::<f32>::new(ring_cap.max(1));
        let (mut producer, mut consumer) = ring.split();
        let (drained_tx, drained_rx) = std::sync::mpsc::channel();

        let err_fn = |err| log::error!("audio stream error: {}", err);

        let mut pending: VecDeque<f32> = VecDeque::new();
        let mut disconnected = false;
        let mut drained_tx: Option<Sender<()>> = Some(drained_tx);

        let stream = self.device.build_output_stream(
            &self.config,
            move |data: &mut [f32], _| {
                loop {
                    match chunks.try_recv() {
                        Ok(chunk) => {
                            log::trace!("audio output: received {} samples", chunk.len());
                            pending.extend(chunk);
                        }
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            disconnected = true;
                            break;
                        }
                    }
                }

                while let Some(sample) = pending.front().copied() {
                    if producer.push(sample).is_ok() {
                        pending.pop_front();
                    } else {
                        break;
                    }
                }

                let underrun = fill_output(data, || consumer.pop());

                if disconnected && underrun && pending.is_empty() {
                    if let Some(tx) = drained_tx.take() {
                        log::debug!("audio output: drained");
                        let _ = tx.send(());
                    }
                }
            },
            err_fn,
            None,
        )?;

        stream.play()?;
        Ok(Playback {
            _stream: stream,
            drained: drained_rx,
        })
    }
}

/// A running output stream.
pub struct Playback {
    _stream: cpal::Stream,
    drained: Receiver<()>,
}

impl Playback {
    /// Block until every queued sample has been handed to the device.
    pub fn wait(self) -> Result<(), Box<dyn std::error::Error>> {
        self.drained.recv()?;
        Ok(())
    }
}

/// Fill `data` from `next`, padding with silence. Returns true if `next` ran dry.
fn fill_output(data: &mut [f32], mut next: impl FnMut() -> Option<f32>) -> bool {
    let mut underrun = false;
    for sample in data.iter_mut() {
        *sample = match next() {
            Some(value) => value,
            None => {
                underrun = true;
                0.0
            }
        };
    }
    underrun
}

fn select_output_device(
    host: &cpal::Host,
    device_regex: Option<&str>,
) -> Result<cpal::Device, Box<dyn std::error::Error>> {
    if let Some(pattern) = device_regex {
        let re = Regex::new(pattern)?;
        for dev in host.output_devices()? {
            let name = dev.name().unwrap_or_else(|_| "<unknown>".to_string());
            if re.is_match(&name) {
                return Ok(dev);
            }
        }
        return Err("no output device matched regex".into());
    }

    host.default_output_device()
        .ok_or_else(|| "no default output device available".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_copies_available_samples() {
        let mut source = vec![0.25, -0.5, 1.0].into_iter();
        let mut data = [9.0f32; 3];
        assert!(!fill_output(&mut data, || source.next()));
        assert_eq!(data, [0.25, -0.5, 1.0]);
    }

    #[test]
    fn fill_pads_with_silence() {
        let mut source = vec![0.5].into_iter();
        let mut data = [9.0f32; 4];
        assert!(fill_output(&mut data, || source.next()));
        assert_eq!(data, [0.5, 0.0, 0.0, 0.0]);
    }
}
