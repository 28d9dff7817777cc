use std::io;
use std::panic;

use anyhow::Result;
use chrono::Utc;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::app::{Action, App, ReportSource};
use crate::cli::Context;
use crate::event;
use crate::ui;

pub async fn run(ctx: &Context) -> Result<()> {
    let config = &ctx.config;
    let offset = config.offset()?;
    let source = ReportSource {
        provider: ctx.provider.clone(),
        board_id: ctx.board_id()?,
        offset,
        fetch: config.fetch_options(),
    };

    // Set up action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let today = Utc::now().with_timezone(&offset).date_naive();
    let mut app = App::new(
        source,
        config.shift_table(None)?,
        config.report.shift_view,
        today,
        config.directory(),
        config.list_categories(),
        action_tx.clone(),
    );

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Spawn event reader
    let event_tx = action_tx.clone();
    tokio::spawn(async move {
        event::run_event_loop(event_tx).await;
    });

    // Initial fetch
    app.reload();

    // Main loop
    loop {
        terminal.draw(|f| ui::render(f, &app))?;

        match action_rx.recv().await {
            Some(action) => {
                app.update(action);
                if app.should_quit {
                    break;
                }
            }
            None => break,
        }
    }

    // Restore terminal
    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
