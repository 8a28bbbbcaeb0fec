//! TUI Application module

mod async_ops;
mod events;
mod state;
mod ui;

pub use state::AppState;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tokio::runtime::Runtime;

use crate::api::ApiClient;
use crate::config::Config;
use crate::session::SessionStore;

use async_ops::{AsyncCommand, AsyncHandle, AsyncResult, Limits, spawn_worker};

/// Run the TUI application
pub fn run(config: Config) -> Result<()> {
    // Create tokio runtime
    let rt = Runtime::new()?;

    let store = SessionStore::open()?;
    let mut state = AppState::new(config, store)?;

    let mut client = ApiClient::new(&state.config.base_url);
    client.set_token(state.token());
    let limits = Limits {
        page_size: state.config.page_size,
        comment_limit: state.config.comment_limit,
    };

    // Spawn async worker
    let async_handle = rt.block_on(async { spawn_worker(client, limits) });

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Load whatever the first screen shows
    for cmd in state.refresh_visible() {
        let _ = async_handle.cmd_tx.blocking_send(cmd);
    }

    // Main loop
    let result = run_app(&mut terminal, &mut state, async_handle);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    mut async_handle: AsyncHandle,
) -> Result<()> {
    loop {
        // Process any async results
        while let Ok(result) = async_handle.result_rx.try_recv() {
            for cmd in handle_async_result(state, result) {
                let _ = async_handle.cmd_tx.blocking_send(cmd);
            }
        }

        // Draw UI
        terminal.draw(|frame| ui::render(frame, state))?;

        // Handle events
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
        {
            for cmd in events::handle_key(state, key) {
                let _ = async_handle.cmd_tx.blocking_send(cmd);
            }
        }

        // Tick for animations
        state.tick();

        if state.should_quit {
            // Shutdown async worker
            let _ = async_handle.cmd_tx.blocking_send(AsyncCommand::Shutdown);
            break;
        }
    }

    // Save config on exit
    state.config.save()?;

    Ok(())
}

fn handle_async_result(state: &mut AppState, result: AsyncResult) -> Vec<AsyncCommand> {
    match result {
        AsyncResult::Fetched { key, data } => state.on_fetched(key, data),
        AsyncResult::FetchFailed { key, error } => state.on_fetch_failed(&key, &error),
        AsyncResult::Mutated { key, outcome } => state.on_mutated(key, outcome),
        AsyncResult::MutationFailed { key, error } => state.on_mutation_failed(&key, &error),
    }
}
