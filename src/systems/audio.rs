//! Audio dispatch for the simulation.
//!
//! Gameplay systems never touch the sound backend directly. They write [`AudioEvent`]s, and
//! [`audio_system`] applies them in order at the end of the tick, keeping track of the ambience that
//! should be playing so it can be restored after a pause.

use bevy_ecs::{
    event::{Event, EventReader},
    resource::Resource,
    system::ResMut,
};
use tracing::{debug, trace};

use crate::audio::{Clip, SoundService};

/// Resource for tracking audio state
#[derive(Resource, Debug, Clone, Default)]
pub struct AudioState {
    /// While set, ambience changes are ignored.
    pub cutscene: bool,
    /// The ambience that should be playing outside of a pause.
    pub ambience: Option<Clip>,
    /// Whether the last dot sound was the first variant.
    pub last_dot_was_first: bool,
}

/// Events for triggering audio playback
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    /// Play a one-shot clip
    Play(Clip),
    /// Play the alternating dot sound
    Dot,
    /// Replace the looping ambience, unless a cutscene is running
    Ambience(Clip),
    /// Loop the pause beat, remembering the current ambience
    PauseBeat,
    /// Return to the remembered ambience
    ResumeAmbience,
    /// Silence the ambience
    StopAmbience,
    /// Enter or leave a cutscene
    Cutscene(bool),
}

/// Owns the playback backend.
#[derive(Resource)]
pub struct AudioResource(pub Box<dyn SoundService>);

impl AudioResource {
    /// Applies one audio event to the backend, updating the tracked state.
    pub fn apply(&mut self, state: &mut AudioState, event: AudioEvent) {
        match event {
            AudioEvent::Play(clip) => {
                trace!(clip = clip.as_ref(), "Playing sound");
                self.0.play(clip);
            }
            AudioEvent::Dot => {
                let clip = if state.last_dot_was_first { Clip::Dot2 } else { Clip::Dot1 };
                state.last_dot_was_first = !state.last_dot_was_first;
                self.0.play(clip);
            }
            AudioEvent::Ambience(clip) => {
                if state.cutscene {
                    trace!(clip = clip.as_ref(), "Ambience change suppressed during cutscene");
                    return;
                }
                state.ambience = Some(clip);
                self.0.loop_ambience(clip);
            }
            AudioEvent::PauseBeat => self.0.loop_ambience(Clip::PauseBeat),
            AudioEvent::ResumeAmbience => match state.ambience {
                Some(clip) => self.0.loop_ambience(clip),
                None => self.0.stop_ambience(),
            },
            AudioEvent::StopAmbience => self.0.stop_ambience(),
            AudioEvent::Cutscene(cutscene) => {
                debug!(cutscene, "Cutscene flag changed");
                state.cutscene = cutscene;
            }
        }
    }
}

/// System that processes audio events and forwards them to the backend
pub fn audio_system(mut audio: ResMut<AudioResource>, mut state: ResMut<AudioState>, mut events: EventReader<AudioEvent>) {
    for event in events.read() {
        audio.apply(&mut state, *event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Clone, Default)]
    struct Recording(Arc<Mutex<Vec<String>>>);

    impl SoundService for Recording {
        fn play(&mut self, clip: Clip) {
            self.0.lock().unwrap().push(format!("play {clip:?}"));
        }
        fn loop_ambience(&mut self, clip: Clip) {
            self.0.lock().unwrap().push(format!("loop {clip:?}"));
        }
        fn stop_ambience(&mut self) {
            self.0.lock().unwrap().push("stop".to_string());
        }
    }

    #[test]
    fn test_cutscene_suppresses_ambience() {
        let log = Recording::default();
        let mut audio = AudioResource(Box::new(log.clone()));
        let mut state = AudioState::default();

        audio.apply(&mut state, AudioEvent::Ambience(Clip::Siren1));
        audio.apply(&mut state, AudioEvent::Cutscene(true));
        audio.apply(&mut state, AudioEvent::Ambience(Clip::PowerUp));
        audio.apply(&mut state, AudioEvent::PauseBeat);
        audio.apply(&mut state, AudioEvent::ResumeAmbience);

        assert_eq!(state.ambience, Some(Clip::Siren1));
        assert_eq!(
            *log.0.lock().unwrap(),
            vec!["loop Siren1", "loop PauseBeat", "loop Siren1"]
        );
    }

    #[test]
    fn test_dot_sound_alternates() {
        let log = Recording::default();
        let mut audio = AudioResource(Box::new(log.clone()));
        let mut state = AudioState::default();
        for _ in 0..3 {
            audio.apply(&mut state, AudioEvent::Dot);
        }
        assert_eq!(*log.0.lock().unwrap(), vec!["play Dot1", "play Dot2", "play Dot1"]);
    }
}
