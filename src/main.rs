use bevy::prelude::*;
use stacker_rs::config::high_score_path;
use stacker_rs::gameplay_plugin;
use stacker_rs::highscore::{FileStore, HighScore};

mod arena;
mod debug;
mod hud;
mod kbd;
mod render;
mod setup;

fn main() {
    let mut app = App::new();
    app.insert_resource(HighScore::load(FileStore::new(high_score_path())))
        .add_plugins(setup::plugin)
        .add_plugins(gameplay_plugin)
        .add_plugins((
            arena::plugin,
            render::plugin,
            kbd::plugin,
            hud::plugin,
            debug::plugin,
        ));

    // `stacker-rs --dump-schedule | dot -Tsvg > update.svg`
    if std::env::args().any(|arg| arg == "--dump-schedule") {
        bevy_mod_debugdump::print_schedule_graph(&mut app, Update);
        return;
    }
    app.run();
}
