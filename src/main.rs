mod app;
mod components;
mod config;
mod controller;
mod editor;
mod error;
mod event;
mod fs;
mod handler;
mod pagination;
mod ports;
mod preview;
mod session;
#[cfg(test)]
mod testing;
mod theme;
mod tui;
mod ui;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use crate::app::App;
use crate::config::{AppConfig, CatalogConfig, GeneralConfig, ThemeConfig};
use crate::controller::{Command, NavigationController};
use crate::event::{Event, EventHandler};
use crate::fs::catalog::FileCatalog;
use crate::ports::DiskStore;
use crate::preview::{HayroDocuments, ImageCrateDecoder, PreviewDispatcher};
use crate::session::EditSession;
use crate::tui::{install_panic_hook, Tui};

/// Browse a folder, preview its files, and edit text in place.
#[derive(Parser, Debug)]
#[command(name = "memoble", version, about)]
struct Cli {
    /// Folder to open (defaults to the configured path, then the current directory)
    path: Option<PathBuf>,

    /// Explicit config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only list files with this extension (repeatable)
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// List dot-files
    #[arg(long, overrides_with = "no_hidden")]
    hidden: bool,

    /// Do not list dot-files
    #[arg(long)]
    no_hidden: bool,

    /// Disable mouse capture
    #[arg(long)]
    no_mouse: bool,

    /// Color scheme: dark, light or custom
    #[arg(long, value_name = "SCHEME")]
    theme: Option<String>,

    /// Write logs to this file (also MEMOBLE_LOG)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Flags that were actually given, as a partial config layered on top of the files.
    fn overrides(&self) -> AppConfig {
        let show_hidden = if self.hidden {
            Some(true)
        } else if self.no_hidden {
            Some(false)
        } else {
            None
        };
        AppConfig {
            general: GeneralConfig {
                default_path: None,
                mouse: self.no_mouse.then_some(false),
            },
            catalog: CatalogConfig {
                extensions: (!self.extensions.is_empty()).then(|| self.extensions.clone()),
                show_hidden,
            },
            theme: ThemeConfig {
                scheme: self.theme.clone(),
                custom: None,
            },
            ..AppConfig::default()
        }
    }
}

/// The terminal owns stdout and stderr, so logging only happens into a file.
fn init_logging(path: Option<&Path>) -> error::Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match std::env::var_os("MEMOBLE_LOG") {
            Some(p) => PathBuf::from(p),
            None => return Ok(()),
        },
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn build_controller(config: &AppConfig) -> NavigationController {
    let dispatcher = PreviewDispatcher::new(
        config.extension_table(),
        config.preview_limits(),
        Box::new(ImageCrateDecoder),
        Box::new(HayroDocuments::default()),
    );
    NavigationController::new(
        FileCatalog::new(config.catalog_filter()),
        dispatcher,
        EditSession::new(config.editor_tab_width()),
        Box::new(DiskStore),
    )
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));
    let folder = cli
        .path
        .clone()
        .or_else(|| config.general.default_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let folder = folder.canonicalize().map_err(|_| {
        error::AppError::InvalidPath(format!("{} does not exist", folder.display()))
    })?;
    log::info!(
        "starting in {} (theme: {})",
        folder.display(),
        config.theme_scheme()
    );

    let theme = theme::resolve_theme(&config.theme);
    let mut app = App::new(build_controller(&config), theme)
        .with_preview_tab_width(config.preview_tab_width());
    app.run(Command::OpenFolder(folder));

    install_panic_hook();
    let mut tui = Tui::new(config.mouse_enabled())?;
    let mut events = EventHandler::new(Duration::from_millis(100));

    loop {
        tui.terminal_mut().draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            Event::Mouse(mouse) => handler::handle_mouse_event(&mut app, mouse),
            Event::Tick => app.clear_expired_status(),
            Event::Resize(_, _) => {}
        }

        if app.should_quit {
            break;
        }
    }

    tui.restore()?;
    log::info!("exiting");
    Ok(())
}
