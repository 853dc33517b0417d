use engine::{resolve_app_paths, AppPaths, LoopConfig, Scene, StartupError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{load_game_config, ConfigError};
use super::gameplay;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) paths: AppPaths,
    pub(crate) scene_a: Box<dyn Scene>,
    pub(crate) scene_b: Box<dyn Scene>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Airport Run Startup ===");

    let paths = resolve_app_paths()?;
    let (game_config, config_source) = load_game_config(&paths)?;
    match &config_source {
        Some(path) => info!(path = %path.display(), "game_config_loaded"),
        None => info!("game_config_defaults"),
    }
    info!(
        starting_money = ?game_config.starting_money,
        npc_seed = ?game_config.npc_seed,
        target_tps = game_config.target_tps,
        "game_config"
    );

    let (scene_a, scene_b) = gameplay::build_scene_pair(game_config.session_settings());
    Ok(AppWiring {
        config: game_config.loop_config(),
        paths,
        scene_a,
        scene_b,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
