//! Score, best score, state line and the kinds currently in rotation.

use bevy::prelude::*;
use itertools::Itertools;
use stacker_rs::game::{GameOver, GameSession, ScoreChanged, StateChanged};
use stacker_rs::highscore::HighScore;
use stacker_rs::{GameState, GameplaySet};

const FONT_SIZE: f32 = 22.0;

#[derive(Component)]
struct ScoreText;

#[derive(Component)]
struct BestText;

#[derive(Component)]
struct StatusText;

#[derive(Component)]
struct KindsText;

pub fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_hud).add_systems(
        Update,
        (update_score, update_best, update_status, update_kinds)
            .after(GameplaySet::Motion),
    );
}

fn line(value: String, top: f32) -> TextBundle {
    TextBundle::from_section(
        value,
        TextStyle {
            font_size: FONT_SIZE,
            color: Color::WHITE,
            ..default()
        },
    )
    .with_style(Style {
        position_type: PositionType::Absolute,
        top: Val::Px(top),
        left: Val::Px(10.0),
        ..default()
    })
}

fn spawn_hud(mut commands: Commands, high_score: Res<HighScore>) {
    commands.spawn((line("Score: 0".into(), 8.0), ScoreText));
    commands.spawn((
        line(format!("Best: {}", high_score.best()), 34.0),
        BestText,
    ));
    commands.spawn((line(status(GameState::Menu), 60.0), StatusText));
    commands.spawn((line(String::new(), 86.0), KindsText));
}

fn status(state: GameState) -> String {
    match state {
        GameState::Menu => "Press Enter to play".into(),
        GameState::Playing => String::new(),
        GameState::Paused => "Paused (Esc resumes, M for menu)".into(),
        GameState::GameOver => "Game over".into(),
    }
}

fn set_text(text: &mut Text, value: String) {
    if let Some(section) = text.sections.first_mut() {
        section.value = value;
    }
}

fn update_score(
    mut scores: EventReader<ScoreChanged>,
    mut texts: Query<&mut Text, With<ScoreText>>,
) {
    let Some(ScoreChanged(score)) = scores.read().last().copied() else {
        return;
    };
    for mut text in texts.iter_mut() {
        set_text(&mut text, format!("Score: {score}"));
    }
}

fn update_best(
    high_score: Res<HighScore>,
    mut texts: Query<&mut Text, With<BestText>>,
) {
    if !high_score.is_changed() {
        return;
    }
    for mut text in texts.iter_mut() {
        set_text(&mut text, format!("Best: {}", high_score.best()));
    }
}

fn update_status(
    mut states: EventReader<StateChanged>,
    mut game_overs: EventReader<GameOver>,
    mut texts: Query<&mut Text, With<StatusText>>,
) {
    let mut value = states.read().last().map(|s| status(s.0));
    if let Some(over) = game_overs.read().last() {
        let record = if over.new_record { ", new record!" } else { "" };
        value = Some(format!(
            "Game over: {} (best {}{record}). Enter to retry",
            over.final_score, over.high_score
        ));
    }
    let Some(value) = value else {
        return;
    };
    for mut text in texts.iter_mut() {
        set_text(&mut text, value.clone());
    }
}

fn update_kinds(
    session: Res<GameSession>,
    mut texts: Query<&mut Text, With<KindsText>>,
) {
    if !session.is_changed() {
        return;
    }
    let kinds = session.available().join(" ");
    for mut text in texts.iter_mut() {
        set_text(&mut text, format!("Kinds: {kinds}"));
    }
}
