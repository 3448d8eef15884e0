mod config;
mod paths;

use std::fs::{self, File};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use simplelog::{Config, WriteLogger};
use sortable_table::{FetchError, HttpSource, SortableTable, source::rows_from_json};

use config::{Args, TableConfig};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Could not determine the platform config directory; pass --config")]
    NoConfigDir,

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to set up logging: {0}")]
    Logger(String),

    #[error("Invalid rows file: {0}")]
    Rows(String),

    #[error(transparent)]
    Table(#[from] sortable_table::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

fn init_logging(args: &Args) -> Result<(), CliError> {
    let Some(path) = args.log_file.clone().or_else(paths::log_file) else {
        return Ok(());
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| CliError::Logger(e.to_string()))?;
    }
    let file = File::create(&path).map_err(|e| CliError::Logger(e.to_string()))?;
    WriteLogger::init(args.log_level, Config::default(), file)
        .map_err(|e| CliError::Logger(e.to_string()))
}

async fn run(args: Args) -> Result<(), CliError> {
    let config_path = args
        .config
        .clone()
        .or_else(paths::config_file)
        .ok_or(CliError::NoConfigDir)?;
    let mut config = TableConfig::load(&config_path)?;
    config.apply_args(&args);

    if let Some(path) = &args.rows {
        let value = serde_json::from_str(&config::read(path)?)
            .map_err(|e| CliError::Rows(e.to_string()))?;
        config.options.data = rows_from_json(value)?;
    }

    let mut table = SortableTable::new(config.columns(), config.options.clone())?;
    table.render()?;

    if table.is_remote() {
        let url = config.options.url.as_deref().unwrap_or_default();
        let source = HttpSource::with_backend(config.backend(), url)?.timeout(args.timeout());
        match &args.sort {
            Some(column_id) => table.sort_remote(&source, column_id, args.order).await?,
            None => table.refresh(&source).await?,
        };
    } else if let Some(column_id) = &args.sort {
        table.sort(column_id, args.order)?;
    }

    log::info!(
        "Rendered {} rows sorted by {:?}",
        table.body_row_count(),
        table.sort_state()
    );
    println!("{}", table.markup().unwrap_or_default());
    table.destroy();
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_logging(&args) {
        eprintln!("Warning: {e}");
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
