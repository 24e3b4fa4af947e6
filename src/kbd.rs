use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use stacker_rs::config::StackerConfig;
use stacker_rs::game::{
    GameSession, KindChange, RequestDrop, RequestRotate, RequestTransition,
    SelectShapeKind,
};
use stacker_rs::shape::ShapeKind;
use stacker_rs::{in_game_state, GameState, GameplaySet};

/// `Digit1..Digit6` toggle the kinds in `ShapeKind::ALL` order.
const KIND_KEYS: [KeyCode; 6] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
];

pub fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (
            get_state_input,
            get_kind_input,
            (get_drop_input, get_rotate_input)
                .run_if(in_game_state(GameState::Playing)),
        )
            .in_set(GameplaySet::Input),
    );
}

/// Enter starts a round, Esc pauses and resumes, M goes back to the menu.
pub fn get_state_input(
    kbd_input: Res<ButtonInput<KeyCode>>,
    session: Res<GameSession>,
    mut requests: EventWriter<RequestTransition>,
) {
    let pressed = |key| kbd_input.just_pressed(key);
    let target = match session.state() {
        GameState::Menu | GameState::GameOver if pressed(KeyCode::Enter) => {
            Some(GameState::Playing)
        }
        GameState::Playing if pressed(KeyCode::Escape) => {
            Some(GameState::Paused)
        }
        GameState::Paused if pressed(KeyCode::Escape) => {
            Some(GameState::Playing)
        }
        GameState::Paused | GameState::GameOver if pressed(KeyCode::KeyM) => {
            Some(GameState::Menu)
        }
        _ => None,
    };
    if let Some(target) = target {
        requests.send(RequestTransition(target));
    }
}

pub fn get_drop_input(
    kbd_input: Res<ButtonInput<KeyCode>>,
    mouse_input: Res<ButtonInput<MouseButton>>,
    mut drops: EventWriter<RequestDrop>,
) {
    if kbd_input.any_just_pressed([KeyCode::Space, KeyCode::ArrowDown])
        || mouse_input.just_pressed(MouseButton::Right)
    {
        drops.send(RequestDrop);
    }
}

/// Z and X rotate at a fixed rate, a horizontal drag with the left button
/// held rotates proportionally to the drag.
pub fn get_rotate_input(
    kbd_input: Res<ButtonInput<KeyCode>>,
    mouse_input: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    time: Res<Time>,
    config: Res<StackerConfig>,
    mut rotations: EventWriter<RequestRotate>,
) {
    let step = config.key_rotation_speed * time.delta_seconds();
    let mut degrees = 0.0;
    if kbd_input.pressed(KeyCode::KeyZ) {
        degrees += step;
    }
    if kbd_input.pressed(KeyCode::KeyX) {
        degrees -= step;
    }

    let drag: f32 = motion.read().map(|m| m.delta.x).sum();
    if mouse_input.pressed(MouseButton::Left) {
        degrees -= drag * config.drag_rotation_sensitivity;
    }

    if degrees != 0.0 {
        rotations.send(RequestRotate(degrees));
    }
}

pub fn get_kind_input(
    kbd_input: Res<ButtonInput<KeyCode>>,
    session: Res<GameSession>,
    mut selections: EventWriter<SelectShapeKind>,
) {
    for (index, key) in KIND_KEYS.into_iter().enumerate() {
        if !kbd_input.just_pressed(key) {
            continue;
        }
        let Some(kind) = ShapeKind::from_index(index) else {
            continue;
        };
        let change = if session.is_available(kind) {
            KindChange::Remove
        } else {
            KindChange::Add
        };
        selections.send(SelectShapeKind { kind, change });
    }
}
