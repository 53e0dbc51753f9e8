// main.rs

use clap::Parser;
use std::path::PathBuf;

use toolkit_cli::config::{DataPaths, DEFAULT_DATA_DIR};
use toolkit_cli::repl::{run_module, start_menu, Module, Prompt, APP_NAME};

#[derive(Parser, Debug)]
#[command(name = "toolkit", version, about = APP_NAME)]
struct Cli {
    /// Open one utility directly instead of the main menu
    #[arg(long, value_enum)]
    auto: Option<Module>,

    /// Where tasks, notes, habits, history and contacts are stored
    #[arg(long, env = "TOOLKIT_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Debug logging on stderr
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let paths = DataPaths::new(&cli.data_dir);
    paths.ensure()?;
    log::debug!("data directory: {}", paths.root().display());

    let mut prompt = Prompt::new()?;
    match cli.auto {
        Some(module) => run_module(module, &mut prompt, &paths),
        None => start_menu(&mut prompt, &paths),
    }
}
