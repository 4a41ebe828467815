use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use luma::config::LumaConfig;
use luma::driver::Driver;
use luma::ingress::TcpIngress;
use luma::kernel::event::{Event, InputEvent, SOURCE_CONSOLE};
use luma::kernel::reactor::Reactor;
use luma::kernel::time::Clock;
use luma::services::voice::VoiceFlags;

/// Headless Luma: stdin lines and TCP messages drive the same reactor.
#[derive(Parser, Debug)]
#[command(name = "luma_console")]
struct Args {
    #[arg(long, default_value = "luma.json")]
    config: PathBuf,

    #[arg(long)]
    no_tcp: bool,

    #[arg(long)]
    knowledge_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let mut cfg = LumaConfig::load(&args.config)?;
    if args.no_tcp {
        cfg.tcp.enabled = false;
    }
    if let Some(dir) = args.knowledge_dir {
        cfg.knowledge_dir = dir;
    }
    // Console mode never opens the microphone or speakers
    cfg.voice.enabled = false;

    tracing::info!("Starting Luma console...");

    let (tx, rx) = mpsc::channel(100);
    let token = CancellationToken::new();

    if cfg.tcp.enabled {
        let ingress = TcpIngress::bind(&cfg.tcp.addr(), tx.clone(), token.clone()).await?;
        tokio::spawn(ingress.run());
    }

    // Set at EOF; the loop keeps ticking until pending work has been reported
    let input_closed = CancellationToken::new();
    let stdin_tx = tx.clone();
    let stdin_closed = input_closed.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("Talk to Luma. Type 'stop' to interrupt, Ctrl+D to quit.");

        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            let event = Event::Input(InputEvent::text(SOURCE_CONSOLE, line.trim()));
            if let Err(e) = stdin_tx.send(event).await {
                tracing::error!("Failed to send input: {}", e);
                break;
            }
        }
        stdin_closed.cancel();
    });

    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let clock = Clock::start();
    let mut reactor = Reactor::new(rx, &cfg, clock.now());
    let mut driver = Driver::from_config(&cfg, tokio::runtime::Handle::current(), tx, Arc::new(VoiceFlags::default()));

    let mut last_state = reactor.presence_state(clock.now());
    let mut idle_ticks = 0u32;
    let stop = token.clone();
    reactor
        .run(clock, token, |effects, reactor| {
            for effect in effects {
                driver.execute(effect);
            }
            driver.sync(&reactor.state);

            // Two idle ticks: results sent by a task that just finished are drained on the next one
            if input_closed.is_cancelled() && driver.in_flight() == 0 && reactor.state.pending_request().is_none() {
                idle_ticks += 1;
                if idle_ticks >= 2 {
                    stop.cancel();
                }
            } else {
                idle_ticks = 0;
            }

            let state = reactor.presence_state(clock.now());
            if state != last_state {
                println!("[{}]", state.label());
                last_state = state;
            }
        })
        .await;

    let reply = driver.skills().save_session_summary(&reactor.state.history_lines());
    tracing::info!("{}", reply);
    tracing::info!("Session telemetry: {:?}", reactor.telemetry.aggregate_session(reactor.tick.frame));
    Ok(())
}
