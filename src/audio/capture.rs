use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::traits::Producer;
use tracing::{error, info};

/// Rates webrtc-vad accepts, cheapest first.
const VAD_RATES: [u32; 4] = [16000, 32000, 48000, 8000];

/// Default microphone feeding a lock-free ring buffer.
/// The stream stops when this value is dropped.
pub struct MicCapture {
    _stream: cpal::Stream,
    pub sample_rate: u32,
}

impl MicCapture {
    pub fn new<P>(mut producer: P) -> Result<Self, anyhow::Error>
    where
        P: Producer<Item = f32> + Send + 'static,
    {
        let host = cpal::default_host();
        let device = host.default_input_device()
            .ok_or_else(|| anyhow::anyhow!("No input device available"))?;

        info!("Microphone: {}", device.name().unwrap_or_default());

        let mut selected = None;
        'rates: for &rate in &VAD_RATES {
            for range in device.supported_input_configs()? {
                if range.min_sample_rate().0 <= rate && range.max_sample_rate().0 >= rate {
                    selected = Some((range.with_sample_rate(cpal::SampleRate(rate)), rate));
                    break 'rates;
                }
            }
        }

        let (config, sample_rate) = match selected {
            Some(found) => found,
            None => {
                let def = device.default_input_config()?;
                let rate = def.sample_rate().0;
                if !VAD_RATES.contains(&rate) {
                    return Err(anyhow::anyhow!("Unsupported sample rate: {}. VAD requires 8k, 16k, 32k, or 48k.", rate));
                }
                (def, rate)
            }
        };

        let channels = config.channels() as usize;
        info!("Microphone config: Rate={}Hz, Channels={}", sample_rate, channels);

        let err_fn = |err| error!("microphone stream error: {}", err);

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config.into(),
                move |data: &[f32], _: &_| push_frames(data.iter().copied(), channels, &mut producer),
                err_fn,
                None,
            )?,
            cpal::SampleFormat::I16 => device.build_input_stream(
                &config.into(),
                move |data: &[i16], _: &_| {
                    push_frames(data.iter().map(|&s| s as f32 / i16::MAX as f32), channels, &mut producer)
                },
                err_fn,
                None,
            )?,
            other => return Err(anyhow::anyhow!("Unsupported sample format {:?}", other)),
        };

        stream.play()?;

        Ok(Self {
            _stream: stream,
            sample_rate,
        })
    }
}

/// Keeps the first channel of each frame. Lossy when the buffer is full.
fn push_frames<I, P>(samples: I, channels: usize, producer: &mut P)
where
    I: Iterator<Item = f32>,
    P: Producer<Item = f32>,
{
    for sample in samples.step_by(channels.max(1)) {
        let _ = producer.try_push(sample);
    }
}
