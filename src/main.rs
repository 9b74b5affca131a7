mod app;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::loader::LoaderWorker;
use crate::state::messages::{LoadRequest, LoadResponse, UiEvent};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::error;
use match_discovery::tracker::wait_for_deadline;
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal();

    tui_logger::init_logger(log::LevelFilter::Trace)?;
    tui_logger::set_default_level(log::LevelFilter::Warn);

    let app = Arc::new(Mutex::new(App::new()));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (load_req_tx, load_req_rx) = mpsc::channel::<LoadRequest>(16);
    let (load_resp_tx, load_resp_rx) = mpsc::channel::<LoadResponse>(16);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Loader thread
    let matches_path = app.lock().await.settings.matches_path.clone();
    let loader = LoaderWorker::new(matches_path, load_req_rx, load_resp_tx);
    let loader_task = tokio::spawn(loader.run());

    // Trigger match load on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, load_req_tx, load_resp_rx).await;

    input_handler.abort();
    loader_task.abort();

    Ok(())
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("matchmap {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "matchmap - find the matches that overlap your trip

Usage:
  matchmap
  matchmap --help
  matchmap --version

Environment:
  MATCHMAP_MATCHES_JSON   Path to a JSON array of match records (default: built-in demo set)
  MATCHMAP_FROM           First day of the trip, YYYY-MM-DD (default: today)
  MATCHMAP_TO             Last day of the trip, YYYY-MM-DD (default: 29 days after MATCHMAP_FROM)
  MATCHMAP_SETTLE_MS      Quiet time before a moved map is re-queried (default 300)
  MATCHMAP_LOG            Log level: error, warn, info, debug, trace (default warn)"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    load_requests: mpsc::Sender<LoadRequest>,
    mut load_responses: mpsc::Receiver<LoadResponse>,
) {
    loop {
        // Re-read every turn: a key press may have replaced the pending commit.
        let deadline = app.lock().await.settle_deadline();

        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &load_requests).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard);
                }
            }

            Some(response) = load_responses.recv() => {
                handle_load_response(response, &app).await;
                let mut app_guard = app.lock().await;
                draw::draw(&mut terminal, &mut app_guard);
            }

            () = wait_for_deadline(deadline) => {
                let mut app_guard = app.lock().await;
                if app_guard.on_settle_tick(Instant::now()) {
                    draw::draw(&mut terminal, &mut app_guard);
                }
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    load_requests: &mpsc::Sender<LoadRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let _ = load_requests.send(LoadRequest::LoadMatches).await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, load_requests).await;
            true
        }
        UiEvent::Resize => true,
    }
}

async fn handle_load_response(response: LoadResponse, app: &Arc<Mutex<App>>) {
    let mut guard = app.lock().await;
    match response {
        LoadResponse::MatchesLoaded { raw, source } => guard.on_matches_loaded(&raw, source),
        LoadResponse::Error { message } => {
            error!("Load error: {message}");
            guard.on_error(message);
        }
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide).unwrap();
    execute!(stdout, terminal::EnterAlternateScreen).unwrap();
    execute!(stdout, terminal::Clear(terminal::ClearType::All)).unwrap();
    terminal::enable_raw_mode().unwrap();
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::MoveTo(0, 0)).unwrap();
    execute!(stdout, terminal::Clear(terminal::ClearType::All)).unwrap();
    execute!(stdout, terminal::LeaveAlternateScreen).unwrap();
    execute!(stdout, cursor::Show).unwrap();
    terminal::disable_raw_mode().unwrap();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
