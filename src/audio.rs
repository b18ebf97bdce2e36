//! This module defines the sound clips and the playback interface the simulation talks to.
use strum_macros::{AsRefStr, EnumIter};
use tracing::{debug, trace};

/// Every sound the simulation can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Clip {
    GameStart,
    Pause,
    PauseBeat,
    Siren1,
    Siren2,
    Siren3,
    PowerUp,
    Eyes,
    EatGhost,
    Death,
    Fruit,
    Dot1,
    Dot2,
    ExtraLife,
}

impl Clip {
    /// The siren that matches the number of dots left.
    pub fn siren(remaining_dots: u32) -> Clip {
        use crate::constants::dots;

        if remaining_dots > dots::SIREN_ONE_ABOVE {
            Clip::Siren1
        } else if remaining_dots > dots::SIREN_TWO_ABOVE {
            Clip::Siren2
        } else {
            Clip::Siren3
        }
    }
}

/// Playback backend.
///
/// One-shot clips overlap freely; there is at most one looping ambience at a time, and starting a new
/// one replaces the old.
pub trait SoundService: Send + Sync {
    fn play(&mut self, clip: Clip);
    fn loop_ambience(&mut self, clip: Clip);
    fn stop_ambience(&mut self);
}

/// A backend that only logs what would be played.
#[derive(Debug, Default)]
pub struct TracingSound {
    ambience: Option<Clip>,
}

impl TracingSound {
    pub fn ambience(&self) -> Option<Clip> {
        self.ambience
    }
}

impl SoundService for TracingSound {
    fn play(&mut self, clip: Clip) {
        trace!(clip = clip.as_ref(), "Playing clip");
    }

    fn loop_ambience(&mut self, clip: Clip) {
        if self.ambience != Some(clip) {
            debug!(clip = clip.as_ref(), "Ambience changed");
        }
        self.ambience = Some(clip);
    }

    fn stop_ambience(&mut self) {
        if let Some(clip) = self.ambience.take() {
            debug!(clip = clip.as_ref(), "Ambience stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_siren_by_remaining_dots() {
        assert_eq!(Clip::siren(200), Clip::Siren1);
        assert_eq!(Clip::siren(41), Clip::Siren1);
        assert_eq!(Clip::siren(40), Clip::Siren2);
        assert_eq!(Clip::siren(20), Clip::Siren3);
    }

    #[test]
    fn test_clip_names() {
        assert_eq!(Clip::PauseBeat.as_ref(), "pause_beat");
        assert_eq!(Clip::EatGhost.as_ref(), "eat_ghost");
    }
}
