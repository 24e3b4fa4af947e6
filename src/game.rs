//! Game session and state transitions.
//!
//! `GameSession` is the one owner of the current `GameState`, the score and
//! the set of shape kinds the spawner may draw from. Requests arrive as
//! events and `apply_transitions` turns them into spawner, pool, time and
//! presentation side effects.

use std::collections::BTreeSet;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};

use crate::config::StackerConfig;
use crate::highscore::HighScore;
use crate::pool::ShapePool;
use crate::shape::ShapeKind;
use crate::spawner::{spawn_next_shape, Spawner};
use crate::{GameState, GameplaySet};

pub fn plugin(app: &mut App) {
    app.add_event::<RequestTransition>()
        .add_event::<RequestDrop>()
        .add_event::<RequestRotate>()
        .add_event::<SelectShapeKind>()
        .add_event::<ScoreChanged>()
        .add_event::<StateChanged>()
        .add_event::<GameOver>()
        .init_resource::<GameSession>()
        .init_resource::<HighScore>()
        .add_systems(
            Update,
            (apply_transitions, apply_kind_selection)
                .chain()
                .in_set(GameplaySet::Transition),
        );
}

/* Presentation -> core */

#[derive(Event, Debug, Clone, Copy)]
pub struct RequestTransition(pub GameState);

#[derive(Event, Debug, Clone, Copy)]
pub struct RequestDrop;

/// Rotation of the active shape in degrees.
#[derive(Event, Debug, Clone, Copy)]
pub struct RequestRotate(pub f32);

#[derive(Event, Debug, Clone, Copy)]
pub struct SelectShapeKind {
    pub kind: ShapeKind,
    pub change: KindChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindChange {
    Add,
    Remove,
}

/* Core -> presentation */

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChanged(pub u32);

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChanged(pub GameState);

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOver {
    pub final_score: u32,
    pub high_score: u32,
    pub new_record: bool,
}

/// Outcome of a successful `GameSession::transition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: GameState,
    pub to: GameState,
    /// Entering `Playing` from anything but a pause of a running round.
    pub new_round: bool,
}

#[derive(Resource, Debug)]
pub struct GameSession {
    state: GameState,
    score: u32,
    round_in_progress: bool,
    available: BTreeSet<ShapeKind>,
    rng: StdRng,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl GameSession {
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        GameSession {
            state: GameState::Menu,
            score: 0,
            round_in_progress: false,
            available: ShapeKind::ALL.into_iter().collect(),
            rng,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    /// Same-state requests are no-ops and return `None`.
    pub fn transition(&mut self, to: GameState) -> Option<StateChange> {
        let from = self.state;
        if from == to {
            return None;
        }
        let resuming = from == GameState::Paused && self.round_in_progress;
        let new_round = to == GameState::Playing && !resuming;
        if new_round {
            self.score = 0;
            self.round_in_progress = true;
        }
        if matches!(to, GameState::Menu | GameState::GameOver) {
            self.round_in_progress = false;
        }
        self.state = to;
        Some(StateChange {
            from,
            to,
            new_round,
        })
    }

    /// Only positive amounts count. Returns the new score.
    pub fn add_score(&mut self, points: u32) -> Option<u32> {
        if points == 0 {
            return None;
        }
        self.score = self.score.saturating_add(points);
        Some(self.score)
    }

    pub fn available(&self) -> impl Iterator<Item = ShapeKind> + '_ {
        self.available.iter().copied()
    }

    pub fn is_available(&self, kind: ShapeKind) -> bool {
        self.available.contains(&kind)
    }

    /// Returns whether the set changed. Removing the last kind leaves
    /// `ShapeKind::DEFAULT` in its place.
    pub fn set_available(
        &mut self,
        change: KindChange,
        kind: ShapeKind,
    ) -> bool {
        let changed = match change {
            KindChange::Add => self.available.insert(kind),
            KindChange::Remove => self.available.remove(&kind),
        };
        self.ensure_available();
        changed
    }

    /// Uniform over the available kinds.
    pub fn select_random_kind(&mut self) -> ShapeKind {
        self.ensure_available();
        self.available
            .iter()
            .copied()
            .choose(&mut self.rng)
            .unwrap_or(ShapeKind::DEFAULT)
    }

    /// Uniform in `[0, 360)` degrees.
    pub fn random_rotation(&mut self) -> f32 {
        self.rng.gen_range(0.0..360.0)
    }

    fn ensure_available(&mut self) {
        if self.available.is_empty() {
            warn!(
                "no shape kinds available, falling back to {}",
                ShapeKind::DEFAULT
            );
            self.available.insert(ShapeKind::DEFAULT);
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn apply_transitions(
    mut commands: Commands,
    mut requests: EventReader<RequestTransition>,
    mut session: ResMut<GameSession>,
    mut spawner: ResMut<Spawner>,
    mut pool: ResMut<ShapePool>,
    mut high_score: ResMut<HighScore>,
    mut time: ResMut<Time<Virtual>>,
    config: Res<StackerConfig>,
    mut scores: EventWriter<ScoreChanged>,
    mut states: EventWriter<StateChanged>,
    mut game_overs: EventWriter<GameOver>,
) {
    for RequestTransition(target) in requests.read() {
        let Some(change) = session.transition(*target) else {
            debug!("ignoring transition to current state {:?}", target);
            continue;
        };
        info!("{:?} -> {:?}", change.from, change.to);

        if change.from == GameState::Paused {
            time.unpause();
        }
        match change.to {
            GameState::Playing if change.new_round => {
                // also covers shapes acquired earlier in this same frame
                pool.release_all(&mut commands);
                spawner.start(config.base_speed);
                spawn_next_shape(
                    &mut commands,
                    &mut pool,
                    &mut session,
                    &mut spawner,
                    &config,
                );
                scores.send(ScoreChanged(session.score()));
            }
            GameState::Playing => {}
            GameState::Paused => time.pause(),
            GameState::GameOver => {
                spawner.stop();
                let final_score = session.score();
                let new_record = high_score.submit(final_score);
                info!("Game over, score {final_score}");
                game_overs.send(GameOver {
                    final_score,
                    high_score: high_score.best(),
                    new_record,
                });
            }
            GameState::Menu => spawner.stop(),
        }
        states.send(StateChanged(change.to));
    }
}

pub fn apply_kind_selection(
    mut selections: EventReader<SelectShapeKind>,
    mut session: ResMut<GameSession>,
) {
    for SelectShapeKind { kind, change } in selections.read() {
        if session.set_available(*change, *kind) {
            info!(
                "{:?} {kind}, available: {:?}",
                change,
                session.available().collect::<Vec<_>>()
            );
        }
    }
}
