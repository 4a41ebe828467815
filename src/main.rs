use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use luma::app::{orb_frame, LumaApp};
use luma::config::{LumaConfig, OrbStyleKind};
use luma::driver::Driver;
use luma::ingress::TcpIngress;
use luma::kernel::reactor::Reactor;
use luma::kernel::time::Clock;
use luma::render::{compose, orb_for};
use luma::services::voice::{VoiceFlags, VoiceListener};

#[derive(Parser, Debug)]
#[command(name = "luma", about = "Luma, a breathing desktop companion orb")]
struct Args {
    /// JSON config file; defaults apply when it is missing
    #[arg(long, default_value = "luma.json")]
    config: PathBuf,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// energy, holo or smooth
    #[arg(long)]
    style: Option<OrbStyleKind>,

    /// Disable the TCP listener
    #[arg(long)]
    no_tcp: bool,

    #[arg(long)]
    port: Option<u16>,

    /// Enable microphone listening and spoken replies
    #[arg(long)]
    voice: bool,

    #[arg(long)]
    knowledge_dir: Option<PathBuf>,

    /// Render a single frame to this PNG and exit
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

impl Args {
    fn apply(&self, cfg: &mut LumaConfig) {
        if let Some(w) = self.width {
            cfg.width = w;
        }
        if let Some(h) = self.height {
            cfg.height = h;
        }
        if let Some(style) = self.style {
            cfg.orb_style = style;
        }
        if self.no_tcp {
            cfg.tcp.enabled = false;
        }
        if let Some(port) = self.port {
            cfg.tcp.port = port;
        }
        if self.voice {
            cfg.voice.enabled = true;
        }
        if let Some(dir) = &self.knowledge_dir {
            cfg.knowledge_dir = dir.clone();
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("tracing already initialized: {}", e);
    }
}

fn snapshot(cfg: &LumaConfig, path: &Path) -> Result<()> {
    let (_tx, rx) = mpsc::channel(1);
    let reactor = Reactor::new(rx, cfg, 0.0);
    let mut orb = orb_for(cfg.orb_style);
    let frame = orb_frame(cfg, &reactor, 0.0);
    let canvas = compose(cfg.width, cfg.height, cfg.palette.background, orb.as_mut(), &frame);

    let image = image::RgbaImage::from_raw(canvas.width(), canvas.height(), canvas.into_raw())
        .ok_or_else(|| anyhow!("frame buffer size mismatch"))?;
    image
        .save(path)
        .with_context(|| format!("writing snapshot {}", path.display()))?;
    tracing::info!("Snapshot written to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut cfg = LumaConfig::load(&args.config)?;
    args.apply(&mut cfg);

    if let Some(path) = &args.snapshot {
        return snapshot(&cfg, path);
    }

    tracing::info!("Luma waking up ({:?} orb, {}x{})", cfg.orb_style, cfg.width, cfg.height);

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    let handle = runtime.handle().clone();
    let token = CancellationToken::new();
    let (tx, rx) = mpsc::channel(100);
    let flags = Arc::new(VoiceFlags::default());

    if cfg.tcp.enabled {
        let addr = cfg.tcp.addr();
        let tx = tx.clone();
        let token = token.clone();
        runtime.spawn(async move {
            match TcpIngress::bind(&addr, tx, token).await {
                Ok(ingress) => ingress.run().await,
                Err(e) => tracing::warn!("TCP listener unavailable on {}: {}", addr, e),
            }
        });
    }

    if cfg.voice.enabled {
        let listener = VoiceListener::new(&cfg.voice, flags.clone(), tx.clone(), handle.clone(), token.clone());
        if let Err(e) = listener.spawn() {
            tracing::error!("Failed to start voice listener: {}", e);
        }
    }

    let clock = Clock::start();
    let reactor = Reactor::new(rx, &cfg, clock.now());
    let driver = Driver::from_config(&cfg, handle, tx, flags);
    let orb = orb_for(cfg.orb_style);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([cfg.width as f32, cfg.height as f32])
            .with_title("Luma"),
        ..Default::default()
    };
    let app = LumaApp::new(cfg, reactor, driver, orb, clock, token.clone());

    eframe::run_native("Luma", options, Box::new(|_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow!("window error: {}", e))?;

    token.cancel();
    runtime.shutdown_timeout(std::time::Duration::from_secs(2));
    tracing::info!("Luma asleep.");
    Ok(())
}
