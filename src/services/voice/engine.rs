use ringbuf::traits::{Consumer, Observer, Split};
use ringbuf::HeapRb;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use webrtc_vad::{SampleRate, Vad, VadMode};

use super::cache::VoiceCache;
use super::playback::play_wav_file;
use super::stt::HttpTranscriber;
use super::tts::HttpSynthesizer;
use super::wake::{WakeAction, WakeGate};
use super::VoiceError;
use crate::audio::capture::MicCapture;
use crate::audio::processing::{frame_size, to_i16, UtteranceSegmenter};
use crate::audio::wav::{encode_wav, resample, STT_SAMPLE_RATE};
use crate::config::VoiceConfig;
use crate::kernel::event::{AudioStatus, Event, InputContent, InputEvent, SOURCE_VOICE};
use crate::kernel::time::Clock;

/// Busy flags shared between the render loop, speech output and the listener.
#[derive(Debug, Default)]
pub struct VoiceFlags {
    pub thinking: AtomicBool,
    pub speaking: AtomicBool,
}

impl VoiceFlags {
    /// Listening pauses while Luma is thinking or speaking.
    pub fn busy(&self) -> bool {
        self.thinking.load(Ordering::Acquire) || self.speaking.load(Ordering::Acquire)
    }
}

/// Speech output: cached or freshly synthesized WAV, played one utterance
/// at a time.
#[derive(Clone)]
pub struct VoiceOutput {
    cache: VoiceCache,
    tts: HttpSynthesizer,
    flags: Arc<VoiceFlags>,
    stop: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    lane: Arc<Mutex<()>>,
    events: mpsc::Sender<Event>,
    runtime: Handle,
}

impl VoiceOutput {
    pub fn new(cfg: &VoiceConfig, flags: Arc<VoiceFlags>, events: mpsc::Sender<Event>, runtime: Handle) -> Self {
        Self {
            cache: VoiceCache::new(cfg.cache_dir.clone()),
            tts: HttpSynthesizer::new(&cfg.tts_url, &cfg.speaker_wav.to_string_lossy(), &cfg.language),
            flags,
            stop: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            lane: Arc::new(Mutex::new(())),
            events,
            runtime,
        }
    }

    pub fn speak(&self, text: String) {
        let this = self.clone();
        let generation = self.generation.load(Ordering::Acquire);
        self.runtime.spawn(async move {
            let _lane = this.lane.lock().await;
            if this.generation.load(Ordering::Acquire) != generation {
                debug!("Dropping queued utterance after stop");
                return;
            }
            this.stop.store(false, Ordering::Release);
            this.flags.speaking.store(true, Ordering::Release);

            match this.resolve_audio(&text).await {
                Ok((path, cached)) => {
                    let _ = this.events.send(InputEvent::audio(AudioStatus::PlaybackStarted { cached }).into()).await;
                    let stop = this.stop.clone();
                    let played = tokio::task::spawn_blocking(move || play_wav_file(&path, &stop)).await;
                    match played {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => warn!("Vocal playback error: {}", e),
                        Err(e) => warn!("Playback task failed: {}", e),
                    }
                }
                Err(e) => warn!("Speech synthesis failed: {}", e),
            }

            this.flags.speaking.store(false, Ordering::Release);
            let _ = this.events.send(InputEvent::audio(AudioStatus::PlaybackEnded).into()).await;
        });
    }

    async fn resolve_audio(&self, text: &str) -> Result<(PathBuf, bool), VoiceError> {
        if let Some(path) = self.cache.lookup(text) {
            return Ok((path, true));
        }
        let preview: String = text.chars().take(30).collect();
        info!("Synthesizing: '{}...'", preview);
        let wav = self.tts.synthesize(text).await?;
        Ok((self.cache.store(text, &wav)?, false))
    }

    /// Halts playback and drops anything queued behind it.
    pub fn stop(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.stop.store(true, Ordering::Release);
        self.flags.speaking.store(false, Ordering::Release);
        info!("Vocal output terminated.");
    }
}

fn vad_rate(rate: u32) -> Option<SampleRate> {
    match rate {
        8000 => Some(SampleRate::Rate8kHz),
        16000 => Some(SampleRate::Rate16kHz),
        32000 => Some(SampleRate::Rate32kHz),
        48000 => Some(SampleRate::Rate48kHz),
        _ => None,
    }
}

/// Background listening loop: microphone → VAD → transcription → wake gate.
pub struct VoiceListener {
    cfg: VoiceConfig,
    flags: Arc<VoiceFlags>,
    events: mpsc::Sender<Event>,
    runtime: Handle,
    token: CancellationToken,
}

impl VoiceListener {
    pub fn new(
        cfg: &VoiceConfig,
        flags: Arc<VoiceFlags>,
        events: mpsc::Sender<Event>,
        runtime: Handle,
        token: CancellationToken,
    ) -> Self {
        Self {
            cfg: cfg.clone(),
            flags,
            events,
            runtime,
            token,
        }
    }

    /// The microphone stream lives on the listener thread.
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("luma-listener".to_string())
            .spawn(move || {
                if let Err(e) = self.run() {
                    error!("Sensory array offline: {}", e);
                }
            })
    }

    fn run(self) -> anyhow::Result<()> {
        // 0.5s of headroom at 16kHz
        let rb = HeapRb::<f32>::new(8192);
        let (producer, mut consumer) = rb.split();
        let capture = MicCapture::new(producer)?;
        let rate = capture.sample_rate;

        let vad_rate = vad_rate(rate).ok_or_else(|| anyhow::anyhow!("Unsupported VAD rate {}", rate))?;
        let mut vad = Vad::new_with_rate_and_mode(vad_rate, VadMode::Aggressive);

        let stt = HttpTranscriber::new(&self.cfg.stt_url);
        let mut gate = WakeGate::new(&self.cfg.wake_word, self.cfg.wake_window_secs);
        let mut segmenter = UtteranceSegmenter::new(self.cfg.phrase_time_limit_secs);
        let clock = Clock::start();

        let size = frame_size(rate);
        let mut frame = vec![0.0f32; size];
        let mut frame_i16: Vec<i16> = Vec::with_capacity(size);

        info!("Sensory array active and listening at {}Hz.", rate);

        while !self.token.is_cancelled() {
            if consumer.occupied_len() < size {
                std::thread::sleep(Duration::from_millis(10));
                continue;
            }
            consumer.pop_slice(&mut frame);

            if self.flags.busy() {
                segmenter.reset();
                continue;
            }

            to_i16(&frame, &mut frame_i16);
            let is_speech = vad.is_voice_segment(&frame_i16).unwrap_or(false);

            let Some(utterance) = segmenter.push_frame(&frame, is_speech) else {
                continue;
            };

            match self.transcribe(&stt, &utterance, rate) {
                Ok(text) if !text.is_empty() => {
                    debug!("Heard: '{}'", text);
                    self.dispatch(gate.feed(&text, clock.now()));
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Sensory error: {}", e);
                    std::thread::sleep(Duration::from_millis(200));
                }
            }
        }

        info!("Sensory array standing down.");
        Ok(())
    }

    fn transcribe(&self, stt: &HttpTranscriber, utterance: &[f32], rate: u32) -> anyhow::Result<String> {
        let samples = resample(utterance, rate, STT_SAMPLE_RATE)?;
        let wav = encode_wav(&samples, STT_SAMPLE_RATE)?;
        Ok(self.runtime.block_on(stt.transcribe(wav))?)
    }

    fn dispatch(&self, action: WakeAction) {
        let input = match action {
            WakeAction::Ignore => return,
            WakeAction::Acknowledge => InputEvent {
                source: SOURCE_VOICE.to_string(),
                content: InputContent::WakeWord,
            },
            WakeAction::Command(cmd) => InputEvent::text(SOURCE_VOICE, &cmd),
        };
        if let Err(e) = self.events.blocking_send(Event::Input(input)) {
            error!("Failed to deliver voice input: {}", e);
        }
    }
}
