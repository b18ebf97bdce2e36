//! Phase sequencing for a session.
//!
//! The ready countdown, the scatter/chase clock, pursuer release, frightened episodes, fruit windows,
//! and the death and level-clear cutscenes are all chains of [`PhaseAction`]s held in a
//! [`TimerRegistry`]. Each tick [`stage_system`] advances the registry, runs whatever fired, then
//! drains the gameplay events raised by collision and movement.

use std::collections::VecDeque;
use std::time::Duration;

use bevy_ecs::{
    entity::Entity,
    event::{EventReader, EventWriter},
    query::{With, Without},
    resource::Resource,
    system::{Commands, Query, Res, ResMut, SystemParam},
};
use smallvec::SmallVec;
use strum_macros::AsRefStr;
use tracing::{debug, info, warn};

use crate::{
    audio::Clip,
    constants::{dots, scoring, timing},
    error::GameError,
    events::{GameEvent, PointsKind},
    map::{builder::Maze, grid},
    persistence::HighScoreStorage,
    systems::{
        audio::AudioEvent,
        components::{
            Actor, DeltaTime, Frozen, Ghost, GhostState, GlobalState, Hidden, HighScore, Level, Phase, PlayerControlled, PlayerLives,
            PlayerMotion, ScoreResource,
        },
        ghost::in_pen,
        item::{Pickup, PickupKind, ProximityScan},
        player::player_spawn,
        render::MazeStyle,
    },
    timer::{TimerId, TimerRegistry},
};

/// A resource to track the overall stage of the game from a high-level perspective.
#[derive(Resource, Debug, Default, PartialEq, Eq, Clone, Copy, AsRefStr)]
pub enum GameStage {
    /// The ready countdown before a round. Actors are frozen.
    #[default]
    Ready,
    /// The main gameplay loop is active.
    Playing,
    /// Short freeze after the player eats a pursuer.
    GhostEatenPause,
    /// The player was caught and the death sequence is in progress.
    PlayerDying,
    /// Every dot is gone and the maze is flashing.
    LevelComplete,
    /// The game has ended and the session is about to exit.
    GameOver,
}

impl GameStage {
    /// Whether heading commands are accepted. The player may queue a heading during the countdown.
    pub fn accepts_input(&self) -> bool {
        matches!(self, GameStage::Ready | GameStage::Playing | GameStage::GhostEatenPause)
    }

    pub fn allows_movement(&self) -> bool {
        matches!(self, GameStage::Playing)
    }

    pub fn allows_pause(&self) -> bool {
        matches!(self, GameStage::Playing)
    }
}

/// A deferred step of a phase sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseAction {
    /// Sets up the very first round of a session.
    NewGame,
    /// The ready countdown finished.
    BeginRound,
    /// Switches the scatter/chase clock to the given phase.
    SwitchPhase(Phase),
    /// Releases the next pursuer waiting in the pen.
    ReleaseNext,
    /// Toggles frightened pursuers' colour; the last step ends the episode.
    Flash(u8),
    HideFruit,
    EndEatPause,
    /// The post-death freeze ended.
    DeathAnimation,
    DeathBlackout,
    DeathRestart,
    GameOverText,
    Exit,
    /// One step of the level-clear maze flash.
    LevelFlash(u8),
    LevelCover,
    LevelBegin,
}

/// Timers that gameplay events need to find again in order to pause, resume or cancel them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Cycle,
    Release,
    Flash,
    Fruit,
}

impl Slot {
    const ALL: [Slot; 4] = [Slot::Cycle, Slot::Release, Slot::Flash, Slot::Fruit];

    fn index(self) -> usize {
        match self {
            Slot::Cycle => 0,
            Slot::Release => 1,
            Slot::Flash => 2,
            Slot::Fruit => 3,
        }
    }
}

/// Every pending phase step of the session.
#[derive(Resource, Debug, Default)]
pub struct PhaseTimers {
    pub registry: TimerRegistry<PhaseAction>,
    slots: [Option<TimerId>; 4],
}

impl PhaseTimers {
    /// Schedules a follow-up step, shortening the delay by how late the step that chained it fired.
    pub fn chain(&mut self, delay: Duration, overdue: Duration, action: PhaseAction) -> TimerId {
        self.registry.schedule(delay.saturating_sub(overdue), action)
    }

    /// Schedules a step into `slot`, replacing whatever was pending there.
    pub fn start(&mut self, slot: Slot, delay: Duration, overdue: Duration, action: PhaseAction) {
        self.cancel(slot);
        let id = self.chain(delay, overdue, action);
        self.slots[slot.index()] = Some(id);
    }

    pub fn cancel(&mut self, slot: Slot) {
        if let Some(id) = self.slots[slot.index()].take() {
            self.registry.cancel(id);
        }
    }

    pub fn pause(&mut self, slot: Slot) {
        if let Some(id) = self.slots[slot.index()] {
            self.registry.pause(id);
        }
    }

    pub fn resume(&mut self, slot: Slot) {
        if let Some(id) = self.slots[slot.index()] {
            self.registry.resume(id);
        }
    }

    /// The pending timer in `slot`, if any.
    pub fn get(&self, slot: Slot) -> Option<TimerId> {
        self.slots[slot.index()].filter(|id| self.registry.is_pending(*id))
    }
}

/// Bookkeeping for the round in progress.
#[derive(Resource, Debug, Default)]
pub struct RoundState {
    /// Pursuers still waiting in the pen, in release order.
    pub release_queue: VecDeque<Ghost>,
    /// Pursuers frightened by the current power pellet that have not been eaten.
    pub scared: SmallVec<[Ghost; 4]>,
    /// Eaten pursuers still on their way back to the pen.
    pub eye_ghosts: u32,
    /// Pursuers eaten during the current power pellet.
    pub combo: u32,
    pub remaining_dots: u32,
    pub extra_life_given: bool,
    /// The scatter/chase phase currently in effect.
    pub phase: Phase,
}

impl RoundState {
    pub fn new(remaining_dots: u32) -> Self {
        Self {
            remaining_dots,
            ..Default::default()
        }
    }
}

/// How long pursuers stay frightened before they start flashing.
pub fn frightened_duration(level: u32) -> Duration {
    Duration::from_secs(timing::FRIGHTENED_BASE_SECONDS.saturating_sub(u64::from(level)))
}

/// Delay between consecutive pen releases.
pub fn release_delay(level: u32) -> Duration {
    let step = timing::RELEASE_STEP_SECONDS * u64::from(level.saturating_sub(1));
    Duration::from_secs(timing::RELEASE_BASE_SECONDS.saturating_sub(step))
}

/// Full length of `phase` on the scatter/chase clock, and the phase that follows it.
pub fn phase_length(phase: Phase) -> (Duration, Phase) {
    match phase {
        Phase::Scatter => (timing::SCATTER, Phase::Chase),
        Phase::Chase => (timing::CHASE, Phase::Scatter),
    }
}

/// Points for the `combo`-th pursuer eaten on one power pellet.
pub fn ghost_points(combo: u32) -> u32 {
    scoring::GHOST_BASE.saturating_mul(2u32.saturating_pow(combo))
}

/// Everything the orchestrator reads or changes besides the timers' own input.
#[derive(SystemParam)]
pub struct StageContext<'w, 's> {
    commands: Commands<'w, 's>,
    stage: ResMut<'w, GameStage>,
    timers: ResMut<'w, PhaseTimers>,
    round: ResMut<'w, RoundState>,
    score: ResMut<'w, ScoreResource>,
    high_score: ResMut<'w, HighScore>,
    lives: ResMut<'w, PlayerLives>,
    level: ResMut<'w, Level>,
    global: ResMut<'w, GlobalState>,
    maze_style: ResMut<'w, MazeStyle>,
    storage: ResMut<'w, HighScoreStorage>,
    scan: ResMut<'w, ProximityScan>,
    maze: Res<'w, Maze>,
    audio: EventWriter<'w, AudioEvent>,
    errors: EventWriter<'w, GameError>,
    player: Query<'w, 's, (Entity, &'static mut Actor, &'static mut PlayerMotion), With<PlayerControlled>>,
    ghosts: Query<'w, 's, (Entity, &'static Ghost, &'static mut Actor, &'static mut GhostState), Without<PlayerControlled>>,
    pickups: Query<'w, 's, &'static mut Pickup>,
}

impl StageContext<'_, '_> {
    fn set_stage(&mut self, stage: GameStage) {
        if *self.stage != stage {
            info!(from = (*self.stage).as_ref(), to = stage.as_ref(), "Stage changed");
            *self.stage = stage;
        }
    }

    fn actor_entities(&self) -> SmallVec<[Entity; 5]> {
        self.player
            .iter()
            .map(|(entity, ..)| entity)
            .chain(self.ghosts.iter().map(|(entity, ..)| entity))
            .collect()
    }

    fn freeze_all(&mut self) {
        for entity in self.actor_entities() {
            self.commands.entity(entity).insert(Frozen);
        }
    }

    fn release_all(&mut self) {
        for entity in self.actor_entities() {
            self.commands.entity(entity).remove::<(Frozen, Hidden)>();
        }
    }

    fn hide_ghosts(&mut self) {
        let entities: SmallVec<[Entity; 4]> = self.ghosts.iter().map(|(entity, ..)| entity).collect();
        for entity in entities {
            self.commands.entity(entity).insert(Hidden);
        }
    }

    fn ambience(&mut self, clip: Clip) {
        self.audio.write(AudioEvent::Ambience(clip));
    }

    fn siren(&mut self) {
        let clip = Clip::siren(self.round.remaining_dots);
        self.ambience(clip);
    }

    fn cancel_round_timers(&mut self) {
        for slot in Slot::ALL {
            self.timers.cancel(slot);
        }
    }

    fn hide_fruit(&mut self) {
        for mut pickup in self.pickups.iter_mut().filter(|pickup| pickup.kind == PickupKind::Fruit) {
            pickup.consumed = true;
        }
    }

    fn persist_high_score(&mut self) {
        let score = self.high_score.0;
        if let Err(e) = self.storage.0.set(score) {
            warn!(score, error = %e, "Failed to save high score");
            self.errors.write(e);
        }
    }

    /// Freezes the field and starts the ready countdown.
    fn start_gameplay(&mut self, initial: bool, overdue: Duration) {
        if initial {
            self.audio.write(AudioEvent::Play(Clip::GameStart));
        }
        self.round.scared.clear();
        self.round.eye_ghosts = 0;
        self.audio.write(AudioEvent::Cutscene(true));
        self.freeze_all();
        self.set_stage(GameStage::Ready);

        let delay = if initial {
            timing::READY_INITIAL
        } else {
            timing::READY_RESTART
        };
        self.timers.chain(delay, overdue, PhaseAction::BeginRound);
        info!(level = self.level.0, lives = self.lives.0, "Ready");
    }

    /// Puts every actor back on its spawn point in its starting state.
    fn reset_actors(&mut self) {
        let tile = self.maze.tile_size();
        for (entity, mut actor, mut motion) in self.player.iter_mut() {
            *actor = player_spawn(tile);
            *motion = PlayerMotion::default();
            self.commands.entity(entity).remove::<Hidden>();
        }
        for (entity, ghost, mut actor, mut state) in self.ghosts.iter_mut() {
            actor.teleport(grid::to_pixel(ghost.spawn(), tile), ghost.starting_direction());
            *state = GhostState::new(*ghost);
            self.commands.entity(entity).remove::<Hidden>();
        }
    }

    /// Runs the current phase again from its full length.
    fn restart_cycle(&mut self, overdue: Duration) {
        let phase = self.round.phase;
        let (delay, next) = phase_length(phase);
        self.timers.start(Slot::Cycle, delay, overdue, PhaseAction::SwitchPhase(next));
        debug!(phase = phase.as_ref(), "Mode clock restarted");
    }

    /// Ends the frightened episode: calms whoever is still scared and restarts the mode clock.
    fn end_frightened(&mut self, overdue: Duration) {
        self.timers.cancel(Slot::Flash);
        for (_, ghost, _, mut state) in self.ghosts.iter_mut() {
            if self.round.scared.contains(ghost) {
                state.calm();
            }
        }
        self.round.scared.clear();
        if self.round.eye_ghosts == 0 {
            self.siren();
        }
        self.restart_cycle(overdue);
    }

    fn schedule_release(&mut self, overdue: Duration) {
        if self.round.release_queue.is_empty() {
            return;
        }
        let delay = release_delay(self.level.0);
        self.timers.start(Slot::Release, delay, overdue, PhaseAction::ReleaseNext);
    }

    /// Runs one fired step.
    fn run(&mut self, action: PhaseAction, overdue: Duration) {
        debug!(?action, overdue_ms = overdue.as_millis() as u64, "Phase step");
        match action {
            PhaseAction::NewGame => self.start_gameplay(true, overdue),
            PhaseAction::BeginRound => {
                self.audio.write(AudioEvent::Cutscene(false));
                self.siren();
                self.release_all();
                for (_, _, mut motion) in self.player.iter_mut() {
                    motion.moving = true;
                }
                self.set_stage(GameStage::Playing);

                self.round.phase = Phase::Scatter;
                self.restart_cycle(overdue);
                self.round.release_queue = VecDeque::from([Ghost::Pinky, Ghost::Inky, Ghost::Clyde]);
                self.schedule_release(overdue);
            }
            PhaseAction::SwitchPhase(phase) => {
                let tile = self.maze.tile_size();
                for (_, ghost, mut actor, mut state) in self.ghosts.iter_mut() {
                    let penned = in_pen(grid::to_grid(actor.position, tile));
                    if state.set_phase(phase, penned) {
                        actor.direction = actor.direction.opposite();
                    }
                    debug!(ghost = ghost.as_ref(), phase = phase.as_ref(), mode = state.mode.as_ref(), "Phase applied");
                }
                self.round.phase = phase;
                self.restart_cycle(overdue);
            }
            PhaseAction::ReleaseNext => {
                let Some(next) = self.round.release_queue.pop_front() else {
                    return;
                };
                match self.ghosts.iter_mut().find(|(_, ghost, ..)| **ghost == next) {
                    Some((_, _, _, mut state)) => {
                        debug!(ghost = next.as_ref(), "Releasing pursuer");
                        state.release();
                    }
                    None => {
                        self.errors.write(GameError::InvalidState(format!(
                            "No entity found for pursuer {}, could not release it",
                            next.as_ref()
                        )));
                    }
                }
            }
            PhaseAction::Flash(step) => {
                if step >= timing::FLASH_COUNT || self.round.scared.is_empty() {
                    self.end_frightened(overdue);
                } else {
                    for (_, ghost, _, mut state) in self.ghosts.iter_mut() {
                        if self.round.scared.contains(ghost) {
                            state.flash = !state.flash;
                        }
                    }
                    self.timers
                        .start(Slot::Flash, timing::FLASH_INTERVAL, overdue, PhaseAction::Flash(step + 1));
                }
            }
            PhaseAction::HideFruit => self.hide_fruit(),
            PhaseAction::EndEatPause => {
                self.ambience(Clip::Eyes);
                for slot in [Slot::Flash, Slot::Cycle, Slot::Fruit] {
                    self.timers.resume(slot);
                }
                // Every scared pursuer has been eaten, so the episode is over.
                if self.round.scared.is_empty() && self.timers.get(Slot::Flash).is_some() {
                    self.end_frightened(overdue);
                }
                self.release_all();
                for (_, _, _, mut state) in self.ghosts.iter_mut() {
                    state.paused = false;
                    state.allow_collision = true;
                }
                self.set_stage(GameStage::Playing);
            }
            PhaseAction::DeathAnimation => {
                self.hide_ghosts();
                self.audio.write(AudioEvent::Play(Clip::Death));
                if self.lives.0 > 0 {
                    self.lives.0 -= 1;
                    self.timers.chain(timing::DEATH_ANIMATION, overdue, PhaseAction::DeathBlackout);
                } else {
                    info!(score = self.score.0, "No lives left");
                    self.persist_high_score();
                    self.timers.chain(timing::GAME_OVER_TEXT, overdue, PhaseAction::GameOverText);
                }
            }
            PhaseAction::DeathBlackout => {
                *self.maze_style = MazeStyle::Covered;
                self.timers.chain(timing::DEATH_BLACKOUT, overdue, PhaseAction::DeathRestart);
            }
            PhaseAction::DeathRestart => {
                *self.maze_style = MazeStyle::Normal;
                self.reset_actors();
                self.hide_fruit();
                self.start_gameplay(false, overdue);
            }
            PhaseAction::GameOverText => {
                self.hide_fruit();
                self.set_stage(GameStage::GameOver);
                info!(score = self.score.0, high_score = self.high_score.0, level = self.level.0, "Game over");
                self.timers.chain(timing::GAME_OVER_LINGER, overdue, PhaseAction::Exit);
            }
            PhaseAction::Exit => {
                self.global.exit = true;
            }
            PhaseAction::LevelFlash(step) => {
                if step == 0 {
                    self.hide_ghosts();
                }
                *self.maze_style = if step % 2 == 0 {
                    MazeStyle::Flash
                } else {
                    MazeStyle::Normal
                };
                let next = if step + 1 < timing::LEVEL_FLASH_STEPS {
                    PhaseAction::LevelFlash(step + 1)
                } else {
                    PhaseAction::LevelCover
                };
                self.timers.chain(timing::LEVEL_FLASH_INTERVAL, overdue, next);
            }
            PhaseAction::LevelCover => {
                *self.maze_style = MazeStyle::Covered;
                self.timers.chain(timing::LEVEL_COVER, overdue, PhaseAction::LevelBegin);
            }
            PhaseAction::LevelBegin => {
                *self.maze_style = MazeStyle::Normal;
                self.level.0 += 1;
                let level = self.level.0;

                let mut remaining = 0;
                for mut pickup in self.pickups.iter_mut() {
                    pickup.near = false;
                    if pickup.kind == PickupKind::Fruit {
                        pickup.consumed = true;
                        pickup.value = scoring::fruit_points(level);
                    } else {
                        pickup.consumed = false;
                        remaining += 1;
                    }
                }
                self.round.remaining_dots = remaining;
                self.scan.invalidate();

                self.reset_actors();
                info!(level, dots = remaining, "Level started");
                self.start_gameplay(false, overdue);
            }
        }
    }

    /// Handles one gameplay event. Follow-up events go to the back of `queue`.
    fn handle(&mut self, event: GameEvent, queue: &mut VecDeque<GameEvent>) {
        match event {
            GameEvent::Command(_) => {}
            GameEvent::DotEaten => self.dot_eaten(),
            GameEvent::PowerUp => self.power_up(),
            GameEvent::EatGhost { ghost } => self.eat_ghost(ghost, queue),
            GameEvent::RestoreGhost { ghost } => {
                self.round.eye_ghosts = self.round.eye_ghosts.saturating_sub(1);
                debug!(ghost = ghost.as_ref(), eyes = self.round.eye_ghosts, "Pursuer back in the pen");
                if self.round.eye_ghosts == 0 {
                    if self.round.scared.is_empty() {
                        self.siren();
                    } else {
                        self.ambience(Clip::PowerUp);
                    }
                }
            }
            GameEvent::DeathSequence => self.death_sequence(),
            GameEvent::AwardPoints { amount, kind } => self.award_points(amount, kind),
            GameEvent::ReleaseGhost { ghost } => {
                debug!(ghost = ghost.as_ref(), waiting = self.round.release_queue.len(), "Pursuer left the pen");
                self.schedule_release(Duration::ZERO);
            }
        }
    }

    fn dot_eaten(&mut self) {
        self.round.remaining_dots = self.round.remaining_dots.saturating_sub(1);
        let remaining = self.round.remaining_dots;
        self.audio.write(AudioEvent::Dot);

        if dots::FRUIT_THRESHOLDS.contains(&remaining) {
            let value = scoring::fruit_points(self.level.0);
            for mut pickup in self.pickups.iter_mut().filter(|pickup| pickup.kind == PickupKind::Fruit) {
                pickup.consumed = false;
                pickup.near = false;
                pickup.value = value;
            }
            self.scan.invalidate();
            self.timers
                .start(Slot::Fruit, timing::FRUIT_VISIBLE, Duration::ZERO, PhaseAction::HideFruit);
            debug!(remaining, value, "Fruit appeared");
        }

        if dots::AGGRESSION_THRESHOLDS.contains(&remaining) {
            for (_, ghost, _, mut state) in self.ghosts.iter_mut() {
                if *ghost == Ghost::Blinky {
                    state.aggression = state.aggression.escalate();
                    debug!(remaining, aggression = ?state.aggression, "Lead pursuer sped up");
                }
            }
            if self.round.scared.is_empty() && self.round.eye_ghosts == 0 {
                self.siren();
            }
        }

        if remaining == 0 {
            self.advance_level();
        }
    }

    fn power_up(&mut self) {
        if *self.stage != GameStage::Playing {
            return;
        }
        if self.round.remaining_dots != 0 {
            self.ambience(Clip::PowerUp);
        }

        self.timers.cancel(Slot::Flash);
        self.round.combo = 0;
        self.round.scared.clear();

        let tile = self.maze.tile_size();
        for (_, ghost, mut actor, mut state) in self.ghosts.iter_mut() {
            if state.is_eaten() {
                continue;
            }
            self.round.scared.push(*ghost);
            if state.frighten(in_pen(grid::to_grid(actor.position, tile))) {
                actor.direction = actor.direction.opposite();
            }
        }

        let duration = frightened_duration(self.level.0);
        debug!(duration_ms = duration.as_millis() as u64, scared = self.round.scared.len(), "Power pellet");
        self.timers.start(Slot::Flash, duration, Duration::ZERO, PhaseAction::Flash(0));
    }

    fn eat_ghost(&mut self, eaten: Ghost, queue: &mut VecDeque<GameEvent>) {
        for slot in [Slot::Flash, Slot::Cycle, Slot::Fruit] {
            self.timers.pause(slot);
        }
        self.audio.write(AudioEvent::Play(Clip::EatGhost));

        self.round.scared.retain(|ghost| *ghost != eaten);
        self.round.eye_ghosts += 1;
        self.round.combo += 1;
        let points = ghost_points(self.round.combo);
        debug!(ghost = eaten.as_ref(), combo = self.round.combo, points, "Pursuer eaten");
        queue.push_back(GameEvent::AwardPoints {
            amount: points,
            kind: PointsKind::Ghost,
        });

        let mut hidden: SmallVec<[Entity; 2]> = self.player.iter().map(|(entity, ..)| entity).collect();
        for (entity, ghost, _, mut state) in self.ghosts.iter_mut() {
            state.paused = true;
            state.allow_collision = false;
            if *ghost == eaten {
                hidden.push(entity);
            }
        }
        for entity in hidden {
            self.commands.entity(entity).insert((Frozen, Hidden));
        }

        self.set_stage(GameStage::GhostEatenPause);
        self.timers
            .chain(timing::EAT_GHOST_PAUSE, Duration::ZERO, PhaseAction::EndEatPause);
    }

    fn death_sequence(&mut self) {
        if !matches!(*self.stage, GameStage::Playing | GameStage::GhostEatenPause) {
            return;
        }
        info!(lives = self.lives.0, score = self.score.0, "Player caught");
        self.set_stage(GameStage::PlayerDying);
        self.audio.write(AudioEvent::Cutscene(true));
        self.audio.write(AudioEvent::StopAmbience);
        self.cancel_round_timers();
        self.freeze_all();
        for (_, _, mut motion) in self.player.iter_mut() {
            motion.moving = false;
        }
        self.timers
            .chain(timing::DEATH_FREEZE, Duration::ZERO, PhaseAction::DeathAnimation);
    }

    fn advance_level(&mut self) {
        info!(level = self.level.0, score = self.score.0, "Level cleared");
        self.set_stage(GameStage::LevelComplete);
        self.audio.write(AudioEvent::Cutscene(true));
        self.audio.write(AudioEvent::StopAmbience);
        self.cancel_round_timers();
        self.freeze_all();
        self.timers
            .chain(timing::LEVEL_CLEAR_FREEZE, Duration::ZERO, PhaseAction::LevelFlash(0));
    }

    fn award_points(&mut self, amount: u32, kind: PointsKind) {
        self.score.0 = self.score.0.saturating_add(amount);
        if self.score.0 > self.high_score.0 {
            self.high_score.0 = self.score.0;
        }

        if !self.round.extra_life_given && self.score.0 >= scoring::EXTRA_LIFE_AT {
            self.round.extra_life_given = true;
            self.lives.0 = self.lives.0.saturating_add(1);
            self.audio.write(AudioEvent::Play(Clip::ExtraLife));
            info!(score = self.score.0, lives = self.lives.0, "Extra life");
        }

        if kind == PointsKind::Fruit {
            self.audio.write(AudioEvent::Play(Clip::Fruit));
        }
    }
}

/// Advances the phase timers, runs the steps that fired, then drains this tick's gameplay events.
pub fn stage_system(delta_time: Res<DeltaTime>, mut events: EventReader<GameEvent>, mut context: StageContext) {
    for fired in context.timers.registry.advance(delta_time.0) {
        context.run(fired.action, fired.overdue);
    }

    let mut queue: VecDeque<GameEvent> = events.read().copied().collect();
    while let Some(event) = queue.pop_front() {
        context.handle(event, &mut queue);
    }
}
