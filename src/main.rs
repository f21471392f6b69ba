//! Tunegrab - Main entry point.
//!
//! A TUI client for searching a remote music/video catalog and keeping
//! itself up to date.
//!
//! Usage: tune [OPTIONS]
//!
//! Options:
//!   --version, -v    Show version
//!   --update         Check for an update now
//!   --no-update      Skip the startup update check

use std::env;
use std::io::{self, Write as _};
use std::panic;
use std::time::Duration;

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use tunegrab::app::App;
use tunegrab::config::Config;
use tunegrab::download::{DownloadEvent, DownloadManager, DownloadRequest};
use tunegrab::logging;
use tunegrab::prefs::PrefStore;
use tunegrab::remote::CatalogClient;
use tunegrab::update::{PromptChoice, UpdateAction, UpdateDecision, UpdateFlow, VERSION};

/// Maximum iterations for main loop (safety bound).
const MAX_MAIN_ITERATIONS: usize = 10_000_000;

/// How long the UI loop waits for input before polling background work.
const POLL_INTERVAL_MS: u64 = 50;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--version" || a == "-v") {
        println!("tunegrab v{}", VERSION);
        return Ok(());
    }

    let config = Config::load()?;
    logging::init(&config.log_config)?;

    // Handle --update flag: synchronous check, no TUI
    if args.iter().any(|a| a == "--update") {
        return run_update_check(&config);
    }

    // Set up panic hook to restore terminal on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::with_config(config);

    // Startup update check (unless --no-update)
    if !args.iter().any(|a| a == "--no-update") {
        app.maybe_check_updates();
    }

    // Main event loop
    let mut iterations = 0;
    while app.is_running() && iterations < MAX_MAIN_ITERATIONS {
        terminal.draw(|frame| {
            app.render(frame);
        })?;

        if event::poll(Duration::from_millis(POLL_INTERVAL_MS))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        app.poll_background();

        iterations += 1;
    }

    restore_terminal()?;

    // Force exit to avoid waiting for background threads
    std::process::exit(0);
}

/// Runs a synchronous update check on the command line.
fn run_update_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let client = CatalogClient::new(
        &config.search_endpoint,
        &config.update_endpoint,
        &config.api_key,
        config.max_results,
    );

    let descriptor = match client.fetch_update() {
        Ok(descriptor) => descriptor,
        Err(e) => {
            eprintln!("Update check failed: {}", e);
            std::process::exit(1);
        }
    };

    let mut prefs = PrefStore::new();
    let mut downloads = DownloadManager::new(config.download_dir());
    let mut flow = UpdateFlow::new();
    let local = downloads.local_package(&descriptor.version_name);

    match flow.evaluate(descriptor, &prefs, local) {
        Ok(UpdateDecision::UpToDate) => {
            println!("tunegrab v{} is up to date.", VERSION);
        }
        Ok(UpdateDecision::Ignored) => {
            println!("A newer version exists but is marked as ignored.");
        }
        Ok(UpdateDecision::Prompt(prompt)) => {
            println!("{}", prompt.title());
            println!("{}", prompt.descriptor.changelog);

            if !atty::is(atty::Stream::Stdin) || !confirm(prompt.confirm_label())? {
                return Ok(());
            }

            match flow.choose(PromptChoice::Confirm, &mut prefs) {
                UpdateAction::Install(package) => {
                    println!("Opening installer for {}...", package.display());
                    tunegrab::download::open_installer(&package)?;
                }
                UpdateAction::Download {
                    url,
                    version_name,
                    title,
                    description,
                } => {
                    println!("Downloading {}...", title);
                    let destination = downloads.package_path(&version_name);
                    let id = downloads.enqueue(DownloadRequest {
                        url,
                        title,
                        description,
                        destination,
                    })?;
                    wait_for_download(&downloads, id);
                }
                UpdateAction::RemoveStalePackage(_) | UpdateAction::None => {}
            }
        }
        Err(e) => {
            eprintln!("Update check failed: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Asks a yes/no question on stdin.
fn confirm(label: &str) -> io::Result<bool> {
    print!("{}? [y/N] ", label);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// Blocks until the given download finishes, printing the outcome.
fn wait_for_download(downloads: &DownloadManager, id: tunegrab::download::DownloadId) {
    loop {
        match downloads.poll_event() {
            Some(DownloadEvent::Completed { id: done, path }) if done == id => {
                println!("Saved to {}", path.display());
                return;
            }
            Some(DownloadEvent::Failed { id: done, error }) if done == id => {
                eprintln!("Download failed: {}", error);
                std::process::exit(1);
            }
            Some(_) => {}
            None => std::thread::sleep(Duration::from_millis(200)),
        }
    }
}

/// Restores the terminal to its original state.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}
