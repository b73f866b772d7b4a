//! Volume commands: mute, volume_up/down/min/max/set, status, quit.
//!
//! Each command relays to exactly one [`Sound`](soundman_audio::Sound) call;
//! only `status` produces output.

use soundman_audio::{MAX_VOLUME, MIN_VOLUME, check_level};
use soundman_types::error::{Result, SoundError};

use crate::interpreter::{ArgSchema, ArgValue, Command, CommandRegistry, Context, Flow};

const CATEGORY: &str = "Sound Commands";

/// Register the volume command set into a registry.
pub fn register_sound_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(MuteCmd));
    reg.register(Box::new(VolumeUpCmd));
    reg.register(Box::new(VolumeDownCmd));
    reg.register(Box::new(VolumeMinCmd));
    reg.register(Box::new(VolumeMaxCmd));
    reg.register(Box::new(VolumeSetCmd));
    reg.register(Box::new(StatusCmd));
    reg.register(Box::new(QuitCmd));
}

// ---------------------------------------------------------------------------
// mute
// ---------------------------------------------------------------------------

struct MuteCmd;
impl Command for MuteCmd {
    fn name(&self) -> &str {
        "mute"
    }
    fn description(&self) -> &str {
        "Mute or unmute the volume"
    }
    fn usage(&self) -> &str {
        "mute"
    }
    fn category(&self) -> &str {
        CATEGORY
    }
    fn execute(&self, _args: &[ArgValue], ctx: &mut Context<'_>) -> Result<Flow> {
        ctx.sound.mute()?;
        Ok(Flow::Continue)
    }
}

// ---------------------------------------------------------------------------
// volume_up / volume_down
// ---------------------------------------------------------------------------

struct VolumeUpCmd;
impl Command for VolumeUpCmd {
    fn name(&self) -> &str {
        "volume_up"
    }
    fn description(&self) -> &str {
        "Increase the volume"
    }
    fn usage(&self) -> &str {
        "volume_up"
    }
    fn category(&self) -> &str {
        CATEGORY
    }
    fn execute(&self, _args: &[ArgValue], ctx: &mut Context<'_>) -> Result<Flow> {
        ctx.sound.volume_up()?;
        Ok(Flow::Continue)
    }
}

struct VolumeDownCmd;
impl Command for VolumeDownCmd {
    fn name(&self) -> &str {
        "volume_down"
    }
    fn description(&self) -> &str {
        "Decrease the volume"
    }
    fn usage(&self) -> &str {
        "volume_down"
    }
    fn category(&self) -> &str {
        CATEGORY
    }
    fn execute(&self, _args: &[ArgValue], ctx: &mut Context<'_>) -> Result<Flow> {
        ctx.sound.volume_down()?;
        Ok(Flow::Continue)
    }
}

// ---------------------------------------------------------------------------
// volume_min / volume_max
// ---------------------------------------------------------------------------

struct VolumeMinCmd;
impl Command for VolumeMinCmd {
    fn name(&self) -> &str {
        "volume_min"
    }
    fn description(&self) -> &str {
        "Set the volume to 0"
    }
    fn usage(&self) -> &str {
        "volume_min"
    }
    fn category(&self) -> &str {
        CATEGORY
    }
    fn execute(&self, _args: &[ArgValue], ctx: &mut Context<'_>) -> Result<Flow> {
        ctx.sound.volume_min()?;
        Ok(Flow::Continue)
    }
}

struct VolumeMaxCmd;
impl Command for VolumeMaxCmd {
    fn name(&self) -> &str {
        "volume_max"
    }
    fn description(&self) -> &str {
        "Set the volume to 100"
    }
    fn usage(&self) -> &str {
        "volume_max"
    }
    fn category(&self) -> &str {
        CATEGORY
    }
    fn execute(&self, _args: &[ArgValue], ctx: &mut Context<'_>) -> Result<Flow> {
        ctx.sound.volume_max()?;
        Ok(Flow::Continue)
    }
}

// ---------------------------------------------------------------------------
// volume_set
// ---------------------------------------------------------------------------

struct VolumeSetCmd;
impl Command for VolumeSetCmd {
    fn name(&self) -> &str {
        "volume_set"
    }
    fn description(&self) -> &str {
        "Set the volume to a specific level (0-100)"
    }
    fn usage(&self) -> &str {
        "volume_set <value>"
    }
    fn category(&self) -> &str {
        CATEGORY
    }
    fn args(&self) -> ArgSchema {
        ArgSchema::Integer {
            name: "value",
            min: MIN_VOLUME,
            max: MAX_VOLUME,
        }
    }
    fn execute(&self, args: &[ArgValue], ctx: &mut Context<'_>) -> Result<Flow> {
        let value = args
            .first()
            .and_then(ArgValue::as_integer)
            .ok_or_else(|| SoundError::InvalidArgument("volume_set: missing value".to_string()))?;
        ctx.sound.volume_set(check_level(value)?)?;
        Ok(Flow::Continue)
    }
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

struct StatusCmd;
impl Command for StatusCmd {
    fn name(&self) -> &str {
        "status"
    }
    fn description(&self) -> &str {
        "Print the current sound settings"
    }
    fn usage(&self) -> &str {
        "status"
    }
    fn category(&self) -> &str {
        CATEGORY
    }
    fn execute(&self, _args: &[ArgValue], ctx: &mut Context<'_>) -> Result<Flow> {
        let volume = ctx.sound.current_volume()?;
        let muted = ctx.sound.is_muted()?;
        ctx.out.output(format!("Current volume | {volume}"));
        ctx.out.output(format!("Sound muted    | {muted}"));
        ctx.out.output("----------------------");
        ctx.set_result(serde_json::json!({ "volume": volume, "muted": muted }));
        Ok(Flow::Continue)
    }
}

// ---------------------------------------------------------------------------
// quit
// ---------------------------------------------------------------------------

struct QuitCmd;
impl Command for QuitCmd {
    fn name(&self) -> &str {
        "quit"
    }
    fn description(&self) -> &str {
        "Quit the Sound Manager"
    }
    fn usage(&self) -> &str {
        "quit"
    }
    fn category(&self) -> &str {
        CATEGORY
    }
    fn execute(&self, _args: &[ArgValue], _ctx: &mut Context<'_>) -> Result<Flow> {
        Ok(Flow::Quit)
    }
}
