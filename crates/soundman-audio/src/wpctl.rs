//! PipeWire backend driving the `wpctl` command-line tool.

use std::process::Command;

use soundman_types::error::{Result, SoundError};

use crate::sound::{Sound, check_level};

/// A [`Sound`] backed by a PipeWire sink, controlled through `wpctl`.
#[derive(Debug, Clone)]
pub struct WpctlSound {
    sink: String,
    step: u8,
}

/// Level and mute flag as reported by `wpctl get-volume`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VolumeReading {
    volume: u8,
    muted: bool,
}

impl WpctlSound {
    /// Control `sink` (e.g. `@DEFAULT_AUDIO_SINK@` or a node id).
    pub fn new(sink: &str, step: u8) -> Self {
        Self {
            sink: sink.to_string(),
            step,
        }
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        log::debug!("wpctl {}", args.join(" "));
        let output = Command::new("wpctl")
            .args(args)
            .output()
            .map_err(|e| SoundError::Backend(format!("failed to execute wpctl: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SoundError::Backend(format!(
                "wpctl {} failed with {}: {}",
                args.first().copied().unwrap_or_default(),
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn read(&self) -> Result<VolumeReading> {
        let out = self.run(&["get-volume", &self.sink])?;
        parse_volume_output(&out).ok_or_else(|| {
            SoundError::Backend(format!("unexpected wpctl output: {}", out.trim()))
        })
    }

    fn set_volume_arg(&self, arg: &str) -> Result<()> {
        // `-l 1.0` keeps relative raises from overdriving past 100%.
        self.run(&["set-volume", "-l", "1.0", &self.sink, arg])
            .map(|_| ())
    }
}

impl Sound for WpctlSound {
    fn mute(&mut self) -> Result<()> {
        self.run(&["set-mute", &self.sink, "toggle"]).map(|_| ())
    }

    fn volume_up(&mut self) -> Result<()> {
        self.set_volume_arg(&format!("{}%+", self.step))
    }

    fn volume_down(&mut self) -> Result<()> {
        self.set_volume_arg(&format!("{}%-", self.step))
    }

    fn volume_set(&mut self, level: u8) -> Result<()> {
        let level = check_level(i64::from(level))?;
        self.set_volume_arg(&level_to_fraction(level))
    }

    fn current_volume(&self) -> Result<u8> {
        Ok(self.read()?.volume)
    }

    fn is_muted(&self) -> Result<bool> {
        Ok(self.read()?.muted)
    }
}

/// Format a 0-100 level as the fractional gain `wpctl` expects.
fn level_to_fraction(level: u8) -> String {
    format!("{:.2}", f32::from(level) / 100.0)
}

/// Parse `Volume: 0.45` or `Volume: 0.45 [MUTED]`.
fn parse_volume_output(output: &str) -> Option<VolumeReading> {
    let mut parts = output.split_whitespace();
    if parts.next()? != "Volume:" {
        return None;
    }
    let gain: f32 = parts.next()?.parse().ok()?;
    if !gain.is_finite() || gain < 0.0 {
        return None;
    }
    let volume = (gain * 100.0).round().min(100.0) as u8;
    let muted = output.contains("[MUTED]");
    Some(VolumeReading { volume, muted })
}
