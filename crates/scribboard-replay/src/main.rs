//! Headless Scribboard driver.
//!
//! Replays a JSON script of pointer, keyboard and wheel events through the
//! engine, then prints the resulting scene or stores it.

mod script;

use clap::{Parser, Subcommand};
use scribboard_core::render::{DisplayListRenderer, RendererError, SceneRenderer};
use scribboard_core::storage::{FileStorage, Storage, StorageError};
use scribboard_core::{EngineConfig, EngineError, Whiteboard};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
enum ReplayError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error("event {index}: {source}")]
    Event { index: usize, source: EngineError },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Render(#[from] RendererError),
}

#[derive(Parser, Debug)]
#[command(name = "scribboard-replay", about = "Replay whiteboard input scripts headlessly")]
struct Cli {
    /// Engine configuration file (JSON).
    #[arg(long, env = "SCRIBBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for stored scenes. Defaults to the platform data directory.
    #[arg(long, env = "SCRIBBOARD_STORE_DIR")]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a script and print the resulting scene as JSON.
    Run {
        script: PathBuf,
        /// Store the scene under this id instead of printing it.
        #[arg(long)]
        save: Option<String>,
        /// Print screen-space draw commands instead of the scene.
        #[arg(long)]
        render: bool,
    },
    /// List stored scenes.
    List,
    /// Print a stored scene.
    Show { id: String },
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, ReplayError> {
    let config = match path {
        Some(path) => EngineConfig::load(path).map_err(EngineError::from)?,
        None => EngineConfig::default(),
    };
    Ok(config.with_env_overrides().map_err(EngineError::from)?)
}

fn open_storage(dir: Option<PathBuf>) -> Result<FileStorage, StorageError> {
    match dir {
        Some(dir) => FileStorage::new(dir),
        None => FileStorage::default_location(),
    }
}

fn replay(config: EngineConfig, path: &Path) -> Result<Whiteboard, ReplayError> {
    let json = std::fs::read_to_string(path).map_err(|source| ReplayError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let script = script::Script::from_json(&json)?;

    let mut board = Whiteboard::with_config(config)?;
    if let Some(name) = &script.name {
        board.set_document_name(name.clone());
    }
    script::run(&mut board, &script)
        .map_err(|(index, source)| ReplayError::Event { index, source })?;
    log::info!(
        "Replayed {} events into {} elements",
        script.events.len(),
        board.elements().len()
    );
    Ok(board)
}

fn execute(cli: Cli) -> Result<(), ReplayError> {
    match cli.command {
        Command::Run { script, save, render } => {
            let config = load_config(cli.config.as_deref())?;
            let board = replay(config, &script)?;

            if render {
                let mut renderer = DisplayListRenderer::new();
                renderer.render(&board.render_frame())?;
                println!("{}", serde_json::to_string_pretty(renderer.commands())?);
            } else if let Some(id) = save {
                let storage = open_storage(cli.store_dir)?;
                pollster::block_on(storage.save(&id, &board.to_document()))?;
                println!("{}", id);
            } else {
                println!("{}", board.to_document().to_json()?);
            }
        }
        Command::List => {
            let storage = open_storage(cli.store_dir)?;
            for id in pollster::block_on(storage.list())? {
                println!("{}", id);
            }
        }
        Command::Show { id } => {
            let storage = open_storage(cli.store_dir)?;
            let document = pollster::block_on(storage.load(&id))?;
            println!("{}", document.to_json()?);
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = execute(cli) {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
