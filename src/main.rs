use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use spotlight::app::action::Action;
use spotlight::app::features::handler::Services;
use spotlight::app::{persistence, r#loop::run_loop, state::AppState};
use spotlight::config::{Cli, Settings};
use spotlight::domain::host::HostApi;
use spotlight::infrastructure::background::BackgroundService;
use spotlight::infrastructure::bridge::{BackgroundPort, Bridge, PageChannel, TrustBoundary};
use spotlight::infrastructure::metadata_cache::EntityMetadataCache;
use spotlight::infrastructure::page_script::PageScript;
use spotlight::infrastructure::storage::{FileStore, KeyValueStore};
use spotlight::infrastructure::web_api::WebApiClient;
use spotlight::logging;

fn setup_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_panic_hook();

    // Everything that can fail on bad input happens before terminal setup,
    // so errors print to a normal terminal.
    let settings = Settings::load(Cli::parse())?;
    let config_dir = persistence::get_config_dir().unwrap_or_else(|| PathBuf::from(".spotlight"));
    let _log_guard = logging::init(&config_dir.join("logs"))?;
    tracing::info!(origin = %settings.origin, "starting spotlight");

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config_dir.join("storage")));
    let host: Arc<dyn HostApi> = Arc::new(WebApiClient::new(
        &settings.origin,
        &settings.api_version,
        settings.token.clone(),
        Arc::clone(&store),
    )?);
    let bridge = Bridge::new();
    let page = PageChannel::new(TrustBoundary::new(
        settings.origin.clone(),
        settings.org_unique_name.clone(),
    ));
    let background: Arc<dyn BackgroundPort> = Arc::new(BackgroundService::new(
        Arc::clone(&host),
        Arc::clone(&store),
        bridge.clone(),
        page.clone(),
        settings.tuning.result_limit,
    ));
    let metadata = Arc::new(EntityMetadataCache::new(Arc::clone(&host), Arc::clone(&store)));
    let page_script = PageScript::new(Arc::clone(&host), page.clone(), settings.origin.clone()).spawn();

    let favorites = persistence::load_favorites(store.as_ref());
    let mut app_state = AppState::new(settings.origin.clone(), settings.context.clone(), favorites);
    app_state.limits = settings.limits;
    app_state.set_theme(settings.theme);
    app_state.launch = settings
        .command
        .clone()
        .map(|command| Action::OpenPalette { command: Some(command) });

    let services = Services {
        host,
        background,
        bridge,
        page,
        metadata,
        store,
        tuning: settings.tuning,
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = run_loop(&mut terminal, app_state, services).await;
    page_script.abort();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "run loop failed");
        println!("{:?}", err);
    }

    Ok(())
}
