//! The command line interface for h2grid.
use crate::dispatch::build_linear_program;
use crate::input::load_model;
use crate::log;
use crate::optimisation::solve_linear_program;
use crate::output::metadata::write_metadata;
use crate::output::{
    DebugDataWriter, create_output_directory, get_output_dir, log_schedule, write_schedule,
    write_summary,
};
use crate::settings::Settings;
use crate::solver::HighsSolver;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for h2grid.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the run command
#[derive(Args, Default)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// Whether to write the variables and constraints of the problem to CSV files
    #[arg(long)]
    pub debug_model: bool,
    /// Maximum time the solver may take, in seconds (overrides the model file)
    #[arg(long, value_name = "SECS")]
    pub time_limit: Option<f64>,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Optimise the dispatch for a model.
    Run {
        /// Path to the model directory.
        model_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Manage example models.
    Example {
        /// The available subcommands for managing example models.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Validate a model without solving it.
    Validate {
        /// The path to the model directory.
        model_dir: PathBuf,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { model_dir, opts } => handle_run_command(&model_dir, &opts, None),
            Self::Example { subcommand } => subcommand.execute(),
            Self::Validate { model_dir } => handle_validate_command(&model_dir, None),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and run the requested command
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ h2grid --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        // Output program help
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load program settings, if not provided
fn load_settings(settings: Option<Settings>) -> Result<Settings> {
    match settings {
        Some(settings) => Ok(settings),
        None => Settings::load().context("Failed to load settings."),
    }
}

/// Handle the `run` command.
///
/// A summary of the outcome is always written. If no optimal schedule was found, the
/// [`DispatchError`](crate::optimisation::DispatchError) is returned after writing it.
pub fn handle_run_command(
    model_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let mut settings = load_settings(settings)?;

    // These settings can be overridden by command-line arguments
    if opts.debug_model {
        settings.debug_model = true;
    }
    if opts.overwrite {
        settings.overwrite = true;
    }

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(model_path)?;
        &pathbuf
    };

    let overwrite =
        create_output_directory(output_path, settings.overwrite).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    // Initialise program logger
    log::init(Some(&settings.log_level), Some(output_path))
        .context("Failed to initialise logging.")?;

    // Load the model to run
    let (model, mut solver_options) = load_model(model_path).context("Failed to load model.")?;
    info!("Loaded model from {}", model_path.display());
    info!("Output folder: {}", output_path.display());

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    if let Some(time_limit) = opts.time_limit {
        solver_options.time_limit = Some(time_limit);
        solver_options
            .validate()
            .context("Invalid --time-limit option")?;
    }

    write_metadata(output_path, model_path).context("Failed to save metadata.")?;

    let program = build_linear_program(&model);
    info!(
        "Built dispatch problem for {} hours with {} variables and {} constraints",
        program.num_hours(),
        program.num_variables(),
        program.constraints().len()
    );

    if settings.debug_model {
        let mut writer = DebugDataWriter::create(output_path)?;
        writer.write_linear_program(&program)?;
        writer.flush()?;
    }

    let result = solve_linear_program(&program, &HighsSolver::new(solver_options));
    info!("Solver finished with status: {}", result.status());
    write_summary(output_path, &result, model.horizon().num_hours())?;

    let solution = result.into_solution()?;
    write_schedule(output_path, model.horizon(), &solution)?;
    log_schedule(model.horizon(), &solution);
    info!("Dispatch complete!");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(model_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = load_settings(settings)?;

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(Some(&settings.log_level), None).context("Failed to initialise logging.")?;

    // Load/validate the model and check that it can be formulated
    let (model, _) = load_model(model_path).context("Failed to validate model.")?;
    let program = build_linear_program(&model);
    info!(
        "Model validation successful! The dispatch problem has {} variables and {} constraints.",
        program.num_variables(),
        program.constraints().len()
    );

    Ok(())
}
