use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::column::{self, ColumnEntry};
use config::{paths, Config, Overrides, Settings, DEFAULT_CONFIG_PATH};
use data::OutputTarget;

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod expand;

#[derive(Parser)]
#[command(name = "slashsplit")]
#[command(about = "Explode slash-separated CSV cells onto their own rows")]
struct Cli {
    #[arg(help = "Input CSV file, or - to read stdin")]
    input: PathBuf,

    #[arg(
        long = "config",
        short = 'c',
        help = "Path to an alternate config file (created with defaults if missing)"
    )]
    config: Option<PathBuf>,

    #[arg(
        long = "explode",
        short = 'e',
        help = "Column(s) to explode, as 0-based numbers or letters (e.g. C or 2,AA). Repeatable. Replaces the config file's list."
    )]
    explode: Vec<String>,

    #[arg(
        long = "bring-down",
        short = 'b',
        help = "Column(s) whose value is repeated on inserted rows. Same syntax as --explode."
    )]
    bring_down: Vec<String>,

    #[arg(
        long = "preserve-original",
        short = 'p',
        overrides_with = "no_preserve_original",
        help = "Keep each source row unchanged and insert the exploded rows below it"
    )]
    preserve_original: bool,

    #[arg(
        long = "no-preserve-original",
        overrides_with = "preserve_original",
        help = "Replace each source row with its exploded rows, whatever the config file says"
    )]
    no_preserve_original: bool,

    #[arg(long = "separator", short = 's', help = "Character cells are split on (default /)")]
    separator: Option<String>,

    #[arg(long = "delimiter", short = 'd', help = "Field delimiter of input and output (default ,)")]
    delimiter: Option<String>,

    #[arg(
        long = "header",
        overrides_with = "no_header",
        help = "Copy the first row through without exploding it"
    )]
    header: bool,

    #[arg(
        long = "no-header",
        overrides_with = "header",
        help = "Explode the first row like any other, whatever the config file says"
    )]
    no_header: bool,

    #[arg(
        long = "output",
        short = 'o',
        help = "Output file. Repeatable. Replaces the directories from the config file."
    )]
    output: Vec<PathBuf>,

    #[arg(long = "stdout", conflicts_with = "output", help = "Write the result to stdout")]
    stdout: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        let columns = |lists: &[String]| -> Option<Vec<ColumnEntry>> {
            if lists.is_empty() {
                None
            } else {
                Some(lists.iter().flat_map(|list| column::parse_list(list)).collect())
            }
        };

        Overrides {
            explode_columns: columns(&self.explode),
            bring_down_columns: columns(&self.bring_down),
            preserve_original_row: flag(self.preserve_original, self.no_preserve_original),
            separator: self.separator.clone(),
            delimiter: self.delimiter.clone(),
            has_header: flag(self.header, self.no_header),
        }
    }
}

/// Turns an `--x` / `--no-x` pair into an override. Neither keeps the config value.
fn flag(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

pub fn main() {
    // Reset SIGPIPE to default so writing to a broken pipe exits cleanly
    // instead of panicking.
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "slashsplit=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(err) = try_main(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main(cli: Cli) -> anyhow::Result<()> {
    let reading_stdin = cli.input == PathBuf::from("-");
    if !reading_stdin && !cli.input.is_file() {
        return Err(anyhow!("Input file {:?} does not exist", cli.input));
    }

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => (*DEFAULT_CONFIG_PATH)
            .clone()
            .ok_or_else(|| anyhow!("Could not determine config directory; pass --config"))?,
    };
    info!("Using config : {:?}", config_path);

    let config = Config::load_or_create(&config_path)
        .with_context(|| format!("loading config {:?}", config_path))?;
    let settings = Settings::resolve(config, cli.overrides()).context("resolving settings")?;

    info!(
        "Explode columns: {}; bring down columns: {}; preserve original rows: {}",
        Settings::describe_columns(&settings.expand.explode),
        Settings::describe_columns(&settings.expand.bring_down),
        settings.expand.preserve_original_row
    );

    let (target, destinations) = if cli.stdout {
        (OutputTarget::Stdout, Vec::new())
    } else if !cli.output.is_empty() {
        (OutputTarget::Files, cli.output.clone())
    } else if reading_stdin {
        (OutputTarget::Stdout, Vec::new())
    } else {
        (
            OutputTarget::Files,
            paths::output_paths(&cli.input, &settings.output_directories),
        )
    };

    if target == OutputTarget::Files && destinations.is_empty() {
        warn!("No output directories configured; nothing will be written");
    }

    info!("Input: {:?}", cli.input);
    for path in &destinations {
        info!("Output: {:?}", path);
    }

    app::run(&settings, &cli.input, target, &destinations)
        .with_context(|| format!("processing {:?}", cli.input))?;

    info!("Finished!");
    Ok(())
}
