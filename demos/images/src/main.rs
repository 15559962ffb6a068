//! MRW.lol images - flux-dispatch example
//!
//! A terminal client for the image list of an MRW.lol server:
//! 1. The images list mounts, subscribes to the store and calls `load_images`
//! 2. `ImagesLoad` goes through the dispatcher, the fetch runs as a task
//! 3. The runtime dispatches `ImagesDidLoad` / `ImagesDidFail`
//! 4. The store replaces its list and notifies the list, which redraws
//!
//! # Usage
//!
//! ```sh
//! # Against a local server on the default port
//! cargo run -p mrw-images
//!
//! # Another server, with logs and the action footer
//! cargo run -p mrw-images -- --api-url http://mrw.example:3300 \
//!     --log-file mrw.log --debug-actions
//! ```

use std::cell::RefCell;
use std::fs::File;
use std::io;
use std::sync::Mutex;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use flux_dispatch::{ActionLogConfig, ActionLoggerMiddleware, LoggingMiddleware, Runtime};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use mrw_images::config::Args;
use mrw_images::{App, AppContext, HttpImageSource, ImageAction};

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();

    init_tracing(&args)?;

    // ===== Terminal setup =====
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &args).await;

    // ===== Cleanup =====
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Send logs to the log file, if there is one
fn init_tracing(args: &Args) -> io::Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    args: &Args,
) -> io::Result<()> {
    let mut runtime = Runtime::<ImageAction>::new();

    let source = HttpImageSource::new(&args.api_url);
    tracing::info!(url = %source.url(), "Starting");
    let mut ctx = AppContext::new(&runtime, source);

    if args.debug_actions {
        let logger = ActionLoggerMiddleware::with_log(ActionLogConfig::default());
        if let Some(log) = logger.shared_log() {
            ctx = ctx.with_action_log(log);
        }
        runtime.dispatcher().set_middleware(logger);
    } else {
        runtime.dispatcher().set_middleware(LoggingMiddleware::new());
    }

    let app = RefCell::new(App::new(ctx));
    app.borrow_mut()
        .mount()
        .map_err(|e| io::Error::other(e.to_string()))?;

    let result = runtime
        .run(
            terminal,
            |frame, area| app.borrow_mut().render(frame, area),
            |event| app.borrow_mut().handle_event(event),
            || app.borrow_mut().take_dirty(),
        )
        .await;

    app.borrow_mut().unmount();
    result
}
