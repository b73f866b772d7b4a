//! Sound backends.
//!
//! The shell never holds volume state itself. Every volume command is relayed
//! to a [`Sound`] implementation, which owns the level and mute flag.

mod memory;
mod sound;
mod wpctl;

pub use memory::MemorySound;
pub use sound::{MAX_VOLUME, MIN_VOLUME, Sound, check_level};
pub use wpctl::WpctlSound;

use soundman_types::config::{BackendKind, ShellConfig};

/// Build the backend selected by the configuration.
pub fn backend_from_config(config: &ShellConfig) -> Box<dyn Sound> {
    match config.backend {
        BackendKind::Memory => Box::new(MemorySound::with_step(config.volume_step)),
        BackendKind::Wpctl => Box::new(WpctlSound::new(&config.wpctl_sink, config.volume_step)),
    }
}
