// Forbid accidental stdout/stderr writes in the *library* portion of the TUI.
#![deny(clippy::print_stdout, clippy::print_stderr)]
use std::fs::OpenOptions;
use std::path::Path;

use relay_core::config::CONFIG_TOML_FILE;
use relay_core::config::Config;
use relay_core::config::RoomSettings;
use relay_core::config::find_relay_home;
use relay_core::config::log_dir;
use tracing_appender::non_blocking;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub mod app;
pub mod app_event;
pub mod app_event_sender;
mod autocomplete_popup;
mod buttons;
pub mod canned_responses_view;
mod cli;
pub mod composer_input;
pub mod hashtag;
pub mod markdown_toolbar;
pub mod message_composer;
pub mod render;
pub mod report_user_view;
pub mod room_info_view;
mod scroll_state;
pub mod services;
pub mod tui;

pub use app::App;
pub use app::AppInit;
pub use cli::Cli;
use composer_input::ComposerContext;
use services::Services;

pub async fn run_main(cli: Cli) -> std::io::Result<()> {
    let relay_home = find_relay_home().map_err(|err| std::io::Error::other(err.to_string()))?;
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| relay_home.join(CONFIG_TOML_FILE));
    let mut config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Error loading {}: {err}", config_path.display());
            }
            std::process::exit(1);
        }
    };
    apply_cli_overrides(&cli, &mut config);

    let log_dir = log_dir(&relay_home);
    std::fs::create_dir_all(&log_dir)?;
    let mut log_file_opts = OpenOptions::new();
    log_file_opts.create(true).append(true);

    // Only the current user may read or write the log.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        log_file_opts.mode(0o600);
    }

    let log_file = log_file_opts.open(log_dir.join("relay-tui.log"))?;

    // Wrap file in non‑blocking writer.
    let (non_blocking, _guard) = non_blocking(log_file);

    // use RUST_LOG env var, default to info for relay crates.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("relay_core=info,relay_tui=info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_ansi(false)
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(file_layer).try_init();

    run_ratatui_app(&cli, config, &relay_home)
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))
}

async fn run_ratatui_app(cli: &Cli, config: Config, relay_home: &Path) -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Forward panic reports through tracing so they land in the log file,
    // then chain to the previous hook for the terminal report.
    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!("panic: {info}");
        prev_hook(info);
    }));

    let services = Services::from_config(&config, relay_home);
    let context = composer_context(cli, &config);

    let terminal = tui::init()?;
    let mut tui = tui::Tui::new(terminal);
    let result = App::run(&mut tui, AppInit {
        config,
        services,
        context,
    })
    .await;

    tui::restore()?;
    result
}

/// Point the `[room]` settings at the room named on the command line.
fn apply_cli_overrides(cli: &Cli, config: &mut Config) {
    if let Some(room_id) = &cli.room_id {
        config.room = match config.directory.rooms.iter().find(|room| &room.id == room_id) {
            Some(room) => RoomSettings {
                id: room.id.clone(),
                name: room.name.clone(),
                fname: room.fname.clone(),
                room_type: room.room_type,
            },
            None => RoomSettings {
                id: room_id.clone(),
                name: room_id.clone(),
                ..RoomSettings::default()
            },
        };
    }
    if let Some(name) = &cli.room_name {
        config.room.name = name.clone();
        config.room.fname = None;
    }
    if let Some(room_type) = cli.room_type {
        config.room.room_type = room_type;
    }
}

fn composer_context(cli: &Cli, config: &Config) -> ComposerContext {
    ComposerContext {
        room_id: config.room.id.clone(),
        thread_id: cli.thread_id.clone(),
        subscription: Some(config.room.subscription()),
        editing: cli.edit.clone(),
        sharing: cli.sharing,
        master_detail: config.composer.master_detail,
    }
}
