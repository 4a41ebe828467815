use luma::config::{LumaConfig, OrbStyleKind};
use luma::kernel::reactor::Reactor;
use luma::render::math::{fibonacci_sphere, rotate_xyz, smoothstep};
use luma::render::{compose, orb_for, Canvas, EnergyOrb, HoloOrb, OrbFrame, OrbRenderer, SmoothOrb};
use tokio::sync::mpsc;

const STYLES: [OrbStyleKind; 3] = [OrbStyleKind::Energy, OrbStyleKind::Holo, OrbStyleKind::Smooth];

fn frame(t: f64) -> OrbFrame {
    OrbFrame {
        center: (200, 200),
        radius: 90,
        t,
        base_rgb: (60, 140, 255),
        attentive: false,
    }
}

#[tokio::test]
async fn test_smoothstep_and_rotation() {
    assert_eq!(smoothstep(-1.0), 0.0);
    assert_eq!(smoothstep(2.0), 1.0);
    assert!((smoothstep(0.5) - 0.5).abs() < 1e-12);

    let (x, y, z) = rotate_xyz((0.3, -0.4, 0.5), (0.7, 1.3, -2.1));
    let len = (x * x + y * y + z * z).sqrt();
    assert!((len - 0.5f64.sqrt()).abs() < 1e-9);

    for (x, y, z) in fibonacci_sphere(50) {
        assert!(((x * x + y * y + z * z).sqrt() - 1.0).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_canvas_blend_and_clip() {
    let mut canvas = Canvas::filled(4, 4, [0, 0, 0, 255]);
    canvas.blend(1, 1, [255, 255, 255, 128]);
    let px = canvas.get(1, 1).unwrap();
    assert!(px[0] > 120 && px[0] < 136);
    assert_eq!(px[3], 255);

    // Off-canvas drawing is ignored
    canvas.blend(-1, 7, [255, 0, 0, 255]);
    canvas.fill_circle(100.0, 100.0, 5.0, [255, 0, 0, 255]);

    let mut disc = Canvas::filled(10, 10, [255, 255, 255, 255]);
    disc.clip_circle(5.0, 5.0, 3.0);
    assert_eq!(disc.get(0, 0).unwrap()[3], 0);
    assert_eq!(disc.get(5, 5).unwrap()[3], 255);

    let scaled = disc.resized(20, 30);
    assert_eq!((scaled.width(), scaled.height()), (20, 30));
    assert_eq!(scaled.pixels().len(), 20 * 30 * 4);
}

#[tokio::test]
async fn test_nothing_drawn_outside_the_circle() {
    for style in STYLES {
        let mut orb = orb_for(style);
        let f = frame(3.7);
        let extent = orb.extent(f.radius) as f32;
        let mut canvas = Canvas::new(400, 400);
        orb.render(&f, &mut canvas);

        let mut inside = 0;
        for y in 0..400 {
            for x in 0..400 {
                let a = canvas.get(x, y).unwrap()[3];
                let dx = x as f32 + 0.5 - f.center.0 as f32;
                let dy = y as f32 + 0.5 - f.center.1 as f32;
                if (dx * dx + dy * dy).sqrt() > extent + 0.01 {
                    assert_eq!(a, 0, "{:?} leaked at ({}, {})", style, x, y);
                } else if a > 0 {
                    inside += 1;
                }
            }
        }
        assert!(inside > 0, "{:?} drew nothing", style);
    }
}

#[tokio::test]
async fn test_rendering_is_deterministic() {
    let f = frame(12.25);
    let renderers: [(Box<dyn OrbRenderer>, Box<dyn OrbRenderer>); 3] = [
        (Box::new(EnergyOrb::default()), Box::new(EnergyOrb::default())),
        (Box::new(HoloOrb::default()), Box::new(HoloOrb::default())),
        (Box::new(SmoothOrb::default()), Box::new(SmoothOrb::default())),
    ];
    for (mut a, mut b) in renderers {
        let mut ca = Canvas::new(400, 400);
        let mut cb = Canvas::new(400, 400);
        a.render(&f, &mut ca);
        b.render(&f, &mut cb);
        assert_eq!(ca, cb);
    }
}

#[tokio::test]
async fn test_animation_moves_with_time() {
    let mut orb = EnergyOrb::default();
    let mut early = Canvas::new(400, 400);
    let mut late = Canvas::new(400, 400);
    orb.render(&frame(1.0), &mut early);
    orb.render(&frame(2.0), &mut late);
    assert_ne!(early, late);
}

#[tokio::test]
async fn test_smooth_palette_follows_attention() {
    let mut orb = SmoothOrb::default();
    let mut idle = Canvas::new(400, 400);
    let mut attentive = Canvas::new(400, 400);
    orb.render(&frame(5.0), &mut idle);
    orb.render(&OrbFrame { attentive: true, base_rgb: (40, 220, 120), ..frame(5.0) }, &mut attentive);

    let a = idle.get(200, 200).unwrap();
    let b = attentive.get(200, 200).unwrap();
    // Blue family vs green family at the center
    assert!(a[2] > a[1]);
    assert!(b[1] > b[2]);
}

#[tokio::test]
async fn test_compose_fills_background() {
    let cfg = LumaConfig::default();
    let (_tx, rx) = mpsc::channel(1);
    let reactor = Reactor::new(rx, &cfg, 0.0);
    let f = luma::app::orb_frame(&cfg, &reactor, 0.0);
    let mut orb = orb_for(cfg.orb_style);

    let canvas = compose(cfg.width, cfg.height, cfg.palette.background, orb.as_mut(), &f);

    assert_eq!(canvas.get(0, 0), Some([12, 12, 16, 255]));
    assert_eq!(f.center, (400, 240));
    assert_ne!(canvas.get(400, 240), Some([12, 12, 16, 255]));
}
