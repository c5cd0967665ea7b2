//! Main event loop for the TUI.
//!
//! Multiplexes signals, terminal input, fetch-complete notifications and a
//! periodic tick. Every way out of the loop runs the same shutdown tail, so
//! the collection is archived before the terminal is restored.

use crate::app::App;
use crate::feed::{FetchNotification, Subscription};
use anyhow::{Context, Result};
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::input::handle_event;
use super::render::{render, SPINNER_FRAMES};

/// Result of handling a terminal event.
pub enum Action {
    /// Continue the event loop and process more events.
    Continue,
    /// Exit the application and restore the terminal.
    Quit,
}

/// Wait for the next notification, or forever while unsubscribed.
async fn next_notification(subscription: Option<&mut Subscription>) -> Option<FetchNotification> {
    match subscription {
        Some(sub) => sub.recv().await,
        None => std::future::pending().await,
    }
}

/// Runs the TUI until the user quits, a termination or hangup signal
/// arrives, or the terminal fails.
///
/// Resumes the app on entry and destroys it on exit. A panic hook restores
/// the terminal before unwinding.
pub async fn run(app: &mut App) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableFocusChange, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(250));

    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;
    #[cfg(unix)]
    let mut sighup = signal(SignalKind::hangup())?;

    if let Err(e) = app.resume().await {
        restore_terminal(terminal)?;
        return Err(e).context("Failed to resume reader");
    }

    loop {
        if app.needs_redraw {
            if let Err(e) = terminal.draw(|f| render(f, app)) {
                tracing::error!(error = %e, "Failed to draw frame");
                break;
            }
            app.needs_redraw = false;
        }

        if app.clear_expired_status() {
            app.needs_redraw = true;
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sighup_fut = sighup.recv();
        #[cfg(not(unix))]
        let sighup_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break;
            }

            // The terminal went away; archive before the process ends.
            _ = sighup_fut => {
                tracing::info!("Received SIGHUP, shutting down gracefully");
                break;
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(event)) => {
                        if let Action::Quit = handle_event(app, event).await {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "Terminal input error");
                        break;
                    }
                    None => break,
                }
            }

            Some(notification) = next_notification(app.subscription_mut()) => {
                app.handle_notification(notification);
            }

            _ = tick_interval.tick() => {
                if app.show_progress {
                    app.spinner_frame = (app.spinner_frame + 1) % SPINNER_FRAMES;
                    app.needs_redraw = true;
                }
            }
        }
    }

    let shutdown = app.destroy().await;
    restore_terminal(terminal)?;
    shutdown
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}
