use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use std::path::Path;
use std::process::Command;
use sysinfo::System;

/// OS-level actions the skills reach for. Swapped out in tests.
pub trait SystemProbe: Send + Sync {
    fn cpu_percent(&self) -> f32;
    fn open_url(&self, url: &str) -> Result<()>;

    fn modified_at(&self, path: &Path) -> Option<DateTime<Local>> {
        let modified = std::fs::metadata(path).ok()?.modified().ok()?;
        Some(DateTime::<Local>::from(modified))
    }
}

pub struct HostSystem;

impl SystemProbe for HostSystem {
    fn cpu_percent(&self) -> f32 {
        // Usage is a delta between two refreshes
        let mut sys = System::new();
        sys.refresh_cpu();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        sys.refresh_cpu();
        sys.global_cpu_info().cpu_usage()
    }

    fn open_url(&self, url: &str) -> Result<()> {
        opener(url)
            .spawn()
            .map(|_| ())
            .map_err(|e| anyhow!("failed opening {}: {}", url, e))
    }
}

#[cfg(target_os = "windows")]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "", url]);
    cmd
}

#[cfg(target_os = "macos")]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    cmd
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    cmd
}
