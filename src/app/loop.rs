use crate::app::{
    action::Action,
    command::Command,
    features::handler::{self, Services},
    input::map_event_to_action,
    reducer,
    session::PaletteSession,
    state::AppState,
    ui,
};

use anyhow::Result;
use crossterm::event::{self, Event};
use ratatui::{backend::Backend, Terminal};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;

const TICK_RATE: Duration = Duration::from_millis(250);

pub async fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: AppState<'_>,
    services: Services,
) -> Result<()> {
    // User input channel
    let (event_tx, event_rx) = mpsc::channel(100);
    tokio::task::spawn_blocking(move || loop {
        match event::read() {
            Ok(evt) => {
                if event_tx.blocking_send(Ok(evt)).is_err() {
                    break;
                }
            }
            Err(e) => {
                let _ = event_tx.blocking_send(Err(e));
                break;
            }
        }
    });

    run_loop_with_events(terminal, app_state, services, event_rx).await
}

pub async fn run_loop_with_events<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app_state: AppState<'_>,
    services: Services,
    mut event_rx: mpsc::Receiver<Result<Event, std::io::Error>>,
) -> Result<()> {
    let (action_tx, mut action_rx) = mpsc::channel(100);
    let mut session: Option<PaletteSession> = None;

    // Host page traffic, shown on the host screen
    let mut page_rx = services.page.subscribe();
    let traffic_tx = action_tx.clone();
    let traffic = tokio::spawn(async move {
        loop {
            match page_rx.recv().await {
                Ok(envelope) => {
                    if traffic_tx.send(Action::PageTraffic(envelope.message)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "host screen missed page messages");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Launch action (e.g. `--command`)
    if let Some(action) = app_state.launch.take() {
        if let Some(cmd) = reducer::update(&mut app_state, action) {
            handle_command(cmd, &services, &mut session, action_tx.clone())?;
        }
    }

    let result = drive(
        terminal,
        &mut app_state,
        &services,
        &mut session,
        &mut event_rx,
        action_tx,
        &mut action_rx,
    )
    .await;

    traffic.abort();
    // Closing the session deregisters the bridge listener.
    drop(session);
    tracing::info!("run loop finished");
    result
}

async fn drive<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState<'_>,
    services: &Services,
    session: &mut Option<PaletteSession>,
    event_rx: &mut mpsc::Receiver<Result<Event, std::io::Error>>,
    action_tx: mpsc::Sender<Action>,
    action_rx: &mut mpsc::Receiver<Action>,
) -> Result<()> {
    let mut interval = interval(TICK_RATE);

    loop {
        // --- 1. Render ---
        terminal.draw(|f| {
            ui::draw(f, app_state);
        })?;

        // --- 2. Event Handling (TEA Runtime) ---
        let action = tokio::select! {
            _ = interval.tick() => Some(Action::Tick),

            // User Input
            Some(res) = event_rx.recv() => {
                let event = res?;
                let size = terminal.size()?;
                map_event_to_action(event, app_state, size)
            },

            // Async Results
            Some(a) = action_rx.recv() => Some(a),
        };

        // --- 3. Update (Reducer) ---
        if let Some(action) = action {
            let command = reducer::update(app_state, action);

            if let Some(cmd) = command {
                handle_command(cmd, services, session, action_tx.clone())?;
            }

            if app_state.should_quit {
                break;
            }
        }
    }

    Ok(())
}

pub(crate) fn handle_command(
    command: Command,
    services: &Services,
    session: &mut Option<PaletteSession>,
    tx: mpsc::Sender<Action>,
) -> Result<()> {
    handler::handle_command(command, services, session, tx)
}

#[cfg(test)]
#[path = "loop_tests.rs"]
mod tests;
