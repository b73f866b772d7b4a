//! The sound collaborator contract.

use soundman_types::error::{Result, SoundError};

/// Lowest accepted volume level.
pub const MIN_VOLUME: i64 = 0;
/// Highest accepted volume level.
pub const MAX_VOLUME: i64 = 100;

/// Abstraction over the platform's master volume control.
///
/// All calls are synchronous and act on real output state. Failures are
/// reported as [`SoundError::Backend`].
pub trait Sound {
    /// Toggle the mute flag.
    fn mute(&mut self) -> Result<()>;

    /// Raise the volume by the backend's step, saturating at 100.
    fn volume_up(&mut self) -> Result<()>;

    /// Lower the volume by the backend's step, saturating at 0.
    fn volume_down(&mut self) -> Result<()>;

    /// Set the volume to 0.
    fn volume_min(&mut self) -> Result<()> {
        self.volume_set(MIN_VOLUME as u8)
    }

    /// Set the volume to 100.
    fn volume_max(&mut self) -> Result<()> {
        self.volume_set(MAX_VOLUME as u8)
    }

    /// Set the volume to an exact level in 0-100.
    fn volume_set(&mut self, level: u8) -> Result<()>;

    /// Current volume level (0-100).
    fn current_volume(&self) -> Result<u8>;

    /// Whether output is muted.
    fn is_muted(&self) -> Result<bool>;
}

/// Validate a requested level and narrow it to `u8`.
pub fn check_level(level: i64) -> Result<u8> {
    if (MIN_VOLUME..=MAX_VOLUME).contains(&level) {
        Ok(level as u8)
    } else {
        Err(SoundError::InvalidArgument(format!(
            "volume must be between {MIN_VOLUME} and {MAX_VOLUME}, got {level}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_accepted() {
        assert_eq!(check_level(0).unwrap(), 0);
        assert_eq!(check_level(100).unwrap(), 100);
        assert_eq!(check_level(37).unwrap(), 37);
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(matches!(
            check_level(-1),
            Err(SoundError::InvalidArgument(_))
        ));
        assert!(matches!(
            check_level(101),
            Err(SoundError::InvalidArgument(_))
        ));
    }
}
