use luma::config::LumaConfig;
use luma::kernel::presence::{Presence, PresenceState};

#[tokio::test]
async fn test_never_attentive_before_input() {
    let cfg = LumaConfig::default();
    let presence = Presence::new(&cfg, 0.0);

    assert!(!presence.is_attentive(0.0));
    assert!(!presence.is_attentive(100.0));
}

#[tokio::test]
async fn test_attentive_window() {
    let cfg = LumaConfig::default();
    let mut presence = Presence::new(&cfg, 0.0);

    presence.receive_input("  hello  ", 10.0);

    assert_eq!(presence.last_input_text(), "hello");
    assert!(presence.is_attentive(10.0));
    assert!(presence.is_attentive(10.69));
    assert!(!presence.is_attentive(10.71));
}

#[tokio::test]
async fn test_radius_stays_within_clamp() {
    let cfg = LumaConfig::default();
    let presence = Presence::new(&cfg, 0.0);
    let lo = (56.0 * 0.82) as u32;
    let hi = (56.0 * 1.22) as u32;

    for step in 0..2000 {
        let r = presence.radius_at(step as f64 * 0.05);
        assert!(r >= lo && r <= hi, "radius {} out of [{}, {}]", r, lo, hi);
    }
}

#[tokio::test]
async fn test_input_bumps_radius() {
    let cfg = LumaConfig::default();
    let calm = Presence::new(&cfg, 0.0);
    let mut poked = Presence::new(&cfg, 0.0);
    poked.receive_input("SPACE (simulated input)", 3.0);

    for dt in [0.0, 0.1, 0.3, 0.6] {
        assert!(poked.scale_at(3.0 + dt) >= calm.scale_at(3.0 + dt));
    }
    // Bump is gone once the window closes
    assert_eq!(poked.scale_at(4.0), calm.scale_at(4.0));
}

#[tokio::test]
async fn test_smooth_noise_is_bounded() {
    for step in 0..5000 {
        let v = Presence::smooth_noise(step as f64 * 0.013);
        assert!(v.abs() <= 1.0 + 1e-9);
    }
}

#[tokio::test]
async fn test_presence_priority_and_labels() {
    assert_eq!(PresenceState::resolve(true, true, true), PresenceState::Speaking);
    assert_eq!(PresenceState::resolve(true, true, false), PresenceState::Thinking);
    assert_eq!(PresenceState::resolve(true, false, false), PresenceState::Attentive);
    assert_eq!(PresenceState::resolve(false, false, false), PresenceState::Idle);

    assert_eq!(PresenceState::Idle.label(), "BLUE (idle)");
    assert_eq!(PresenceState::Attentive.label(), "GREEN (attentive)");

    let cfg = LumaConfig::default();
    assert_eq!(PresenceState::Idle.color(&cfg), (60, 140, 255));
    assert_eq!(PresenceState::Attentive.color(&cfg), (40, 220, 120));
}

#[tokio::test]
async fn test_orb_is_centered() {
    let cfg = LumaConfig::default();
    let presence = Presence::new(&cfg, 0.0);
    assert_eq!((presence.x, presence.y), (400, 240));
}
