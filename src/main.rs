use clap::{Args as ClapArgs, Parser, Subcommand};
use rydberg_cascade::cascade::CascadeSimulator;
use rydberg_cascade::configuration::{CascadeConfig, TableConfig};
use rydberg_cascade::error::CascadeError;
use rydberg_cascade::output;
use rydberg_cascade::rate_table::persist;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "rydberg-cascade",
    about = "Simulated fluorescence spectra of Rydberg atom decay cascades"
)]
struct Cli {
    /// Log per-row and per-chunk progress.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a transition rate table and save it to disk.
    BuildTable(BuildTableArgs),
    /// Run decay cascades through a saved rate table.
    Simulate(SimulateArgs),
}

#[derive(ClapArgs, Debug)]
struct BuildTableArgs {
    /// YAML file describing the species, bounds and temperature of the table.
    #[arg(long)]
    config: PathBuf,
    /// Directory to write the table into. Overrides `output_directory` of the config.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct SimulateArgs {
    /// YAML file describing the simulation.
    #[arg(long)]
    config: PathBuf,
    /// Rate table written by `build-table`.
    #[arg(long)]
    table: PathBuf,
    /// Output directory for the spectrum and tallies.
    #[arg(long)]
    out: PathBuf,
    /// Also write the full result as JSON.
    #[arg(long)]
    json: bool,
}

fn build_table(args: BuildTableArgs) -> Result<(), CascadeError> {
    let config = TableConfig::from_file(&args.config)?;
    let oracle = config.species.oracle();
    let table = config.builder(&oracle).build()?;
    let directory = args
        .out
        .or(config.output_directory)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&directory)?;
    persist::save_to_dir(&table, &directory)?;
    Ok(())
}

fn simulate(args: SimulateArgs) -> Result<(), CascadeError> {
    let config = CascadeConfig::from_file(&args.config)?;
    let table = persist::load(&args.table)?;
    let oracle = config.species.oracle();
    let spectrum = CascadeSimulator::new(&table, &oracle)?.run(&config)?;
    output::write_all(&spectrum, &args.out, args.json)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Command::BuildTable(args) => build_table(args),
        Command::Simulate(args) => simulate(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("{}", error);
            ExitCode::FAILURE
        }
    }
}
