use eframe::egui;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::LumaConfig;
use crate::driver::Driver;
use crate::kernel::event::{Event, InputEvent, SOURCE_CHAT, SOURCE_KEYBOARD};
use crate::kernel::reactor::Reactor;
use crate::kernel::time::Clock;
use crate::memory::OpsStatus;
use crate::render::{compose, OrbFrame, OrbRenderer};

const HINT: &str = "SPACE = simulate input | ESC = quit";

/// Orb geometry and color for the reactor's current state.
/// The fixed radius breathes with the presence scale.
pub fn orb_frame(cfg: &LumaConfig, reactor: &Reactor, now: f64) -> OrbFrame {
    let presence = &reactor.presence;
    let radius = (f64::from(cfg.radius) * presence.scale_at(now)).round() as u32;
    OrbFrame {
        center: (presence.x as i32, presence.y as i32),
        radius: radius.max(4),
        t: now,
        base_rgb: reactor.presence_state(now).color(cfg),
        attentive: presence.is_attentive(now),
    }
}

pub struct LumaApp {
    cfg: LumaConfig,
    reactor: Reactor,
    driver: Driver,
    orb: Box<dyn OrbRenderer>,
    clock: Clock,
    ops: Arc<Mutex<OpsStatus>>,
    token: CancellationToken,
    texture: Option<egui::TextureHandle>,
    chat: String,
    shut_down: bool,
}

impl LumaApp {
    pub fn new(
        cfg: LumaConfig,
        reactor: Reactor,
        driver: Driver,
        orb: Box<dyn OrbRenderer>,
        clock: Clock,
        token: CancellationToken,
    ) -> Self {
        let ops = driver.skills().store().status_handle();
        Self {
            cfg,
            reactor,
            driver,
            orb,
            clock,
            ops,
            token,
            texture: None,
            chat: String::new(),
            shut_down: false,
        }
    }

    fn step(&mut self, extra: Vec<Event>) {
        let mut events = self.reactor.drain();
        events.extend(extra);
        let effects = self.reactor.tick_step(events, self.clock.now());
        for effect in effects {
            self.driver.execute(effect);
        }
        self.driver.sync(&self.reactor.state);
    }

    fn upload(&mut self, ctx: &egui::Context) {
        let now = self.clock.now();
        let frame = orb_frame(&self.cfg, &self.reactor, now);
        let canvas = compose(
            self.cfg.width,
            self.cfg.height,
            self.cfg.palette.background,
            self.orb.as_mut(),
            &frame,
        );
        let size = [canvas.width() as usize, canvas.height() as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, canvas.pixels());

        if let Some(texture) = &mut self.texture {
            texture.set(image, Default::default());
        } else {
            self.texture = Some(ctx.load_texture("luma_orb", image, Default::default()));
        }
    }

    fn hud_lines(&self) -> Vec<(String, egui::Color32)> {
        let state = self.reactor.presence_state(self.clock.now());
        let mut lines = vec![
            (format!("Luma: {}", state.label()), egui::Color32::from_gray(235)),
            (HINT.to_string(), egui::Color32::from_gray(165)),
        ];
        if let Ok(ops) = self.ops.lock() {
            if ops.active {
                lines.push((
                    format!("{} {:>3.0}%", ops.current_op, ops.progress * 100.0),
                    egui::Color32::from_rgb(0, 255, 180),
                ));
            }
        }
        lines
    }

    /// Saves the session focus and logs the telemetry roll-up. Runs once.
    fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.token.cancel();

        let reply = self.driver.skills().save_session_summary(&self.reactor.state.history_lines());
        info!("{}", reply);
        let summary = self.reactor.telemetry.aggregate_session(self.reactor.tick.frame);
        info!("Session telemetry: {:?}", summary);
    }
}

impl eframe::App for LumaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut extra = Vec::new();

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
        if !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            extra.push(InputEvent::signal(SOURCE_KEYBOARD, "SPACE (simulated input)").into());
        }

        egui::TopBottomPanel::bottom("chat").show(ctx, |ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.chat)
                    .hint_text("Talk to Luma…")
                    .desired_width(f32::INFINITY),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                let text = std::mem::take(&mut self.chat);
                if !text.trim().is_empty() {
                    extra.push(InputEvent::text(SOURCE_CHAT, text.trim()).into());
                }
                response.request_focus();
            }
        });

        self.step(extra);
        self.upload(ctx);

        let lines = self.hud_lines();
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let painter = ui.painter();
                if let Some(texture) = &self.texture {
                    painter.image(
                        texture.id(),
                        rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                }
                for (i, (text, color)) in lines.iter().enumerate() {
                    painter.text(
                        rect.min + egui::vec2(12.0, 12.0 + 28.0 * i as f32),
                        egui::Align2::LEFT_TOP,
                        text,
                        egui::FontId::proportional(18.0),
                        *color,
                    );
                }
            });

        if ctx.input(|i| i.viewport().close_requested()) {
            self.shutdown();
        }
        ctx.request_repaint_after(self.cfg.frame_interval());
    }
}

impl Drop for LumaApp {
    fn drop(&mut self) {
        self.shutdown();
    }
}
