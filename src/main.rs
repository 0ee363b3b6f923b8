use color_eyre::Result;
use jetstats_tui::{
    app::App,
    config::Config,
    events::{Event, EventHandler},
    loader, logging, ui,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Instrumentation and safety
    let _log_guard = logging::initialize_logging();
    install_panic_hook();
    color_eyre::install()?;

    let config = Config::load();
    info!("Starting with data source {}", config.data.source);

    // Ready terminal and state
    let mut terminal = setup_terminal()?;
    let mut event_handler = EventHandler::new(config.ui.tick_rate_ms);
    let source = config.data.source.clone();
    let mut app = App::new(config);

    // One-shot background load; the dashboard shows a spinner until it lands
    let load_tx = event_handler.tx.clone();
    tokio::spawn(async move {
        let event = match loader::load(&source).await {
            Ok(flights) => Event::DataLoaded(flights),
            Err(e) => {
                error!("Loading {} failed: {}", source, e);
                Event::LoadFailed(e.to_string())
            }
        };
        let _ = load_tx.send(event);
    });

    // Main loop
    while !app.should_quit {
        terminal.draw(|f| ui::render(f, &app))?;

        match event_handler.next().await {
            Some(Event::Tick) => app.on_tick(),
            Some(Event::Input(key)) => app.handle_key(key),
            Some(Event::DataLoaded(flights)) => app.on_data_loaded(flights),
            Some(Event::LoadFailed(message)) => app.on_load_failed(message),
            None => break,
        }
    }

    restore_terminal(terminal)?;
    info!("Shut down cleanly.");
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen, crossterm::cursor::Hide)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), crossterm::terminal::LeaveAlternateScreen, crossterm::cursor::Show)?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Hand the terminal back before printing the report
        crossterm::terminal::disable_raw_mode().ok();
        crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen, crossterm::cursor::Show).ok();
        original_hook(panic_info);
    }));
}
