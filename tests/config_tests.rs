use luma::config::{ConfigError, LumaConfig, OrbStyleKind};
use std::fs;
use tempfile::tempdir;

#[tokio::test]
async fn test_missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let cfg = LumaConfig::load(&dir.path().join("luma.json")).unwrap();

    assert_eq!((cfg.width, cfg.height), (800, 480));
    assert_eq!(cfg.radius, 110);
    assert_eq!(cfg.orb_style, OrbStyleKind::Smooth);
    assert_eq!(cfg.tcp.port, 5050);
    assert_eq!(cfg.llm.model, "phi3");
    assert!(!cfg.voice.enabled);
}

#[tokio::test]
async fn test_partial_file_keeps_other_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("luma.json");
    fs::write(
        &path,
        r#"{ "orb_style": "holo", "user_name": "Ada", "tcp": { "port": 6060 }, "palette": { "idle": [1, 2, 3] } }"#,
    )
    .unwrap();

    let cfg = LumaConfig::load(&path).unwrap();

    assert_eq!(cfg.orb_style, OrbStyleKind::Holo);
    assert_eq!(cfg.user_name, "Ada");
    assert_eq!(cfg.tcp.port, 6060);
    assert!(cfg.tcp.enabled);
    assert_eq!(cfg.palette.idle, (1, 2, 3));
    assert_eq!(cfg.palette.attentive, (40, 220, 120));
    assert_eq!(cfg.max_history, 6);
}

#[tokio::test]
async fn test_malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("luma.json");
    fs::write(&path, "{ width: ").unwrap();

    assert!(matches!(LumaConfig::load(&path), Err(ConfigError::Parse { .. })));
}

#[tokio::test]
async fn test_style_parsing() {
    assert_eq!("Energy".parse::<OrbStyleKind>(), Ok(OrbStyleKind::Energy));
    assert_eq!(" smooth ".parse::<OrbStyleKind>(), Ok(OrbStyleKind::Smooth));
    assert!("plasma".parse::<OrbStyleKind>().is_err());
}

#[tokio::test]
async fn test_frame_interval_follows_fps() {
    let cfg = LumaConfig { fps: 50, ..LumaConfig::default() };
    assert_eq!(cfg.frame_interval().as_millis(), 20);
}
