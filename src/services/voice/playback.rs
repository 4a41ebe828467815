use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::HeapRb;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use crate::audio::wav::{decode_wav, resample};

/// Plays a WAV file on the default output device. Blocks until the clip
/// drains or `stop` is raised.
pub fn play_wav_file(path: &Path, stop: &AtomicBool) -> Result<()> {
    let (mono, wav_rate) = decode_wav(BufReader::new(File::open(path)?))?;

    let host = cpal::default_host();
    let device = host.default_output_device()
        .ok_or_else(|| anyhow!("No output device available"))?;
    let supported = device.default_output_config()?;
    let device_rate = supported.sample_rate().0;
    let channels = supported.channels() as usize;

    let samples = resample(&mono, wav_rate, device_rate)?;
    debug!("Playing {} frames at {}Hz", samples.len(), device_rate);

    let rb = HeapRb::<f32>::new(samples.len().max(1));
    let (mut producer, consumer) = rb.split();
    producer.push_slice(&samples);

    let drained = Arc::new(AtomicBool::new(false));
    let config: cpal::StreamConfig = supported.config();

    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, channels, consumer, drained.clone())?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, channels, consumer, drained.clone())?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, channels, consumer, drained.clone())?,
        other => return Err(anyhow!("Unsupported output format {:?}", other)),
    };
    stream.play()?;

    while !drained.load(Ordering::Acquire) && !stop.load(Ordering::Acquire) {
        std::thread::sleep(Duration::from_millis(20));
    }
    Ok(())
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    mut consumer: impl Consumer<Item = f32> + Send + 'static,
    drained: Arc<AtomicBool>,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                let value = match consumer.try_pop() {
                    Some(v) => v,
                    None => {
                        drained.store(true, Ordering::Release);
                        0.0
                    }
                };
                for sample in frame.iter_mut() {
                    *sample = T::from_sample(value);
                }
            }
        },
        |err| error!("playback stream error: {}", err),
        None,
    )?;
    Ok(stream)
}
