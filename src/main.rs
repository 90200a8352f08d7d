mod api;
mod cli;
mod config;
mod jobs;
mod media;
mod models;
mod platform;
mod prayer_times;
mod session;
mod store;
#[cfg(test)]
mod testing;
mod tui;
mod utils;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::fs::OpenOptions;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use models::{NotificationPreference, Settings};
use platform::{audio_from_config, Services, SilentAudio};
use session::{Session, SessionConfig};
use store::{keys, SqliteStore};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    AppConfig::ensure_data_dir()?;
    init_logging(&config, cli.command.is_none());

    let db_path = AppConfig::db_path()?;
    let store = SqliteStore::open(&db_path)?;
    seed_defaults(&store)?;

    let services = Services::from_config(&config)?;
    let now = Local::now().naive_local();

    match cli.command {
        // No subcommand → launch the dashboard
        None => {
            let (cue, recitation) = audio_from_config(&config);
            let session = Session::new(
                Box::new(store),
                cue,
                recitation,
                SessionConfig::from_app(&config),
                now,
            );
            tui::app::run(session, services, config.ui.tick_ms)?;
        }

        Some(cmd) => {
            let mut session = Session::new(
                Box::new(store),
                Box::new(SilentAudio::default()),
                Box::new(SilentAudio::default()),
                SessionConfig::from_app(&config),
                now,
            );
            match cmd {
                Commands::Times => handlers::handle_times(&mut session, &services)?,
                Commands::Verse { edition } => {
                    handlers::handle_verse(&mut session, &services, edition)?
                }
                Commands::Location { action } => {
                    handlers::handle_location(&mut session, &services, &action)?
                }
                Commands::Notify { action } => handlers::handle_notify(&mut session, &action)?,
                Commands::Settings { action } => {
                    handlers::handle_settings(&mut session, &action)?
                }
                Commands::Focus { action } => handlers::handle_focus(&mut session, &action)?,
                Commands::Dismiss => handlers::handle_dismiss(&mut session)?,
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over the configured level. The dashboard owns the
/// terminal, so its log goes to a file in the data directory.
fn init_logging(config: &AppConfig, dashboard: bool) {
    let env = env_logger::Env::default().default_filter_or(config.ui.log_level.as_str());
    let mut builder = env_logger::Builder::from_env(env);

    if dashboard {
        let file = AppConfig::log_path()
            .and_then(|path| Ok(OpenOptions::new().create(true).append(true).open(path)?));
        match file {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                eprintln!("Logging disabled: {:#}", e);
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }
    builder.init();
}

/// Writes default settings and notification preferences on the very first
/// run, so every dashboard starts from the same stored state.
fn seed_defaults(store: &SqliteStore) -> Result<()> {
    if store.meta("seeded")?.as_deref() == Some("1") {
        return Ok(());
    }
    if store::get::<Settings>(store, keys::SETTINGS)?.is_none() {
        store::set(store, keys::SETTINGS, &Settings::default())?;
    }
    if store::get::<NotificationPreference>(store, keys::NOTIFICATIONS)?.is_none() {
        store::set(store, keys::NOTIFICATIONS, &NotificationPreference::all(true))?;
    }
    store.set_meta("seeded", "1")?;
    log::info!("Seeded default settings");
    Ok(())
}
