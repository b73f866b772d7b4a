//! In-process mixer state.

use soundman_types::error::Result;

use crate::sound::{MAX_VOLUME, Sound, check_level};

/// Volume a fresh [`MemorySound`] starts at.
const INITIAL_VOLUME: u8 = 50;

/// A [`Sound`] that keeps level and mute flag in memory.
///
/// Used when no system mixer should be touched, and in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySound {
    volume: u8,
    muted: bool,
    step: u8,
}

impl MemorySound {
    /// Unmuted, volume 50, step 2.
    pub fn new() -> Self {
        Self::with_step(2)
    }

    /// Unmuted, volume 50, with a custom step.
    pub fn with_step(step: u8) -> Self {
        Self {
            volume: INITIAL_VOLUME,
            muted: false,
            step,
        }
    }

    /// Step applied by `volume_up` / `volume_down`.
    pub fn step(&self) -> u8 {
        self.step
    }
}

impl Default for MemorySound {
    fn default() -> Self {
        Self::new()
    }
}

impl Sound for MemorySound {
    fn mute(&mut self) -> Result<()> {
        self.muted = !self.muted;
        log::debug!("memory sound: muted={}", self.muted);
        Ok(())
    }

    fn volume_up(&mut self) -> Result<()> {
        self.volume = self.volume.saturating_add(self.step).min(MAX_VOLUME as u8);
        Ok(())
    }

    fn volume_down(&mut self) -> Result<()> {
        self.volume = self.volume.saturating_sub(self.step);
        Ok(())
    }

    fn volume_set(&mut self, level: u8) -> Result<()> {
        self.volume = check_level(i64::from(level))?;
        log::debug!("memory sound: volume={}", self.volume);
        Ok(())
    }

    fn current_volume(&self) -> Result<u8> {
        Ok(self.volume)
    }

    fn is_muted(&self) -> Result<bool> {
        Ok(self.muted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soundman_types::error::SoundError;

    #[test]
    fn starts_unmuted_at_fifty() {
        let s = MemorySound::new();
        assert_eq!(s.current_volume().unwrap(), 50);
        assert!(!s.is_muted().unwrap());
        assert_eq!(s.step(), 2);
    }

    #[test]
    fn mute_toggles() {
        let mut s = MemorySound::new();
        s.mute().unwrap();
        assert!(s.is_muted().unwrap());
        s.mute().unwrap();
        assert!(!s.is_muted().unwrap());
    }

    #[test]
    fn mute_keeps_volume() {
        let mut s = MemorySound::new();
        s.volume_set(30).unwrap();
        s.mute().unwrap();
        assert_eq!(s.current_volume().unwrap(), 30);
    }

    #[test]
    fn up_and_down_use_step() {
        let mut s = MemorySound::with_step(5);
        s.volume_up().unwrap();
        assert_eq!(s.current_volume().unwrap(), 55);
        s.volume_down().unwrap();
        s.volume_down().unwrap();
        assert_eq!(s.current_volume().unwrap(), 45);
    }

    #[test]
    fn up_saturates_at_max() {
        let mut s = MemorySound::with_step(7);
        s.volume_set(98).unwrap();
        s.volume_up().unwrap();
        assert_eq!(s.current_volume().unwrap(), 100);
    }

    #[test]
    fn down_saturates_at_min() {
        let mut s = MemorySound::with_step(7);
        s.volume_set(3).unwrap();
        s.volume_down().unwrap();
        assert_eq!(s.current_volume().unwrap(), 0);
    }

    #[test]
    fn min_and_max() {
        let mut s = MemorySound::new();
        s.volume_max().unwrap();
        assert_eq!(s.current_volume().unwrap(), 100);
        s.volume_min().unwrap();
        assert_eq!(s.current_volume().unwrap(), 0);
    }

    #[test]
    fn set_above_range_rejected_and_unchanged() {
        let mut s = MemorySound::new();
        let err = s.volume_set(101).unwrap_err();
        assert!(matches!(err, SoundError::InvalidArgument(_)));
        assert_eq!(s.current_volume().unwrap(), 50);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn set_then_read_back(level in 0u8..=100) {
                let mut s = MemorySound::new();
                s.volume_set(level).unwrap();
                prop_assert_eq!(s.current_volume().unwrap(), level);
            }

            #[test]
            fn volume_stays_in_range(ups in 0usize..80, downs in 0usize..80, step in 1u8..=100) {
                let mut s = MemorySound::with_step(step);
                for _ in 0..ups {
                    s.volume_up().unwrap();
                }
                for _ in 0..downs {
                    s.volume_down().unwrap();
                }
                prop_assert!(s.current_volume().unwrap() <= 100);
            }
        }
    }
}
