//! Command-line interface for inspecting configuration files and assembling parameters.

use std::{env, ffi::OsString, io::Write, path::PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use itertools::Itertools;
use scouting_jec::prelude::*;
use serde::Serialize;
use serde_json::{json, to_writer_pretty};
use strum::IntoEnumIterator;

use crate::{BuildConfig, CfgError, JecInputs, JecMode, JecParameters};

#[derive(Parser)]
#[command(name = "scouting-cfg", version, about = "Inspect era-keyed JEC configuration files")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Dump a configuration file, or a single era block of it
    Show {
        /// Configuration file
        file: PathBuf,
        /// Era to look up, e.g. 2024G or Run2024G
        #[arg(long)]
        era: Option<String>,
    },
    /// Infer the era from dataset file names
    InferEra {
        /// Logical file names, e.g. /store/data/Run2024G/...
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Assemble the analyzer JEC parameters for data and MC
    Params {
        /// Data configuration file (or env SCOUTING_DATA_JEC_LIST)
        #[arg(long, env = "SCOUTING_DATA_JEC_LIST")]
        data: PathBuf,
        /// MC configuration file (or env SCOUTING_MC_JEC_LIST)
        #[arg(long, env = "SCOUTING_MC_JEC_LIST")]
        mc: PathBuf,
        /// Era; inferred from --input when omitted
        #[arg(long)]
        era: Option<String>,
        /// Input file names used to infer the era
        #[arg(long = "input")]
        inputs: Vec<String>,
        /// Correction source: es, txt or none
        #[arg(long, default_value = "txt", value_parser = parse_mode)]
        mode: JecMode,
        /// Do not apply jet veto maps
        #[arg(long)]
        no_veto_map: bool,
        /// In es mode, do not fall back to the uncertainty text file
        #[arg(long)]
        no_unc_fallback: bool,
        /// In es mode, do not fall back to the residual run map
        #[arg(long)]
        no_residual_fallback: bool,
    },
    /// Show the files that apply to one data run
    Resolve {
        /// Data configuration file
        file: PathBuf,
        /// Era of the run
        #[arg(long)]
        era: String,
        /// Run number
        #[arg(long)]
        run: RunNumber,
        /// Correction source: es, txt or none
        #[arg(long, default_value = "txt", value_parser = parse_mode)]
        mode: JecMode,
    },
}

fn parse_mode(s: &str) -> Result<JecMode, String> {
    s.parse::<JecMode>().map_err(|_| {
        format!(
            "JEC mode must be one of {}; got '{s}'",
            JecMode::iter().join(", ")
        )
    })
}

fn init_logging(verbosity: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    // a subscriber may already be installed when running embedded
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn emit<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<(), CfgError> {
    to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Execute the command-line interface with a custom argv iterator, writing JSON to `out`.
///
/// # Errors
///
/// Returns a [`CfgError`] if a configuration file cannot be parsed or no era can be determined.
pub fn run_with_writer<I, T, W>(args: I, out: &mut W) -> Result<(), CfgError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    let cli = Cli::parse_from(args);
    init_logging(cli.verbose);

    match cli.command {
        Command::Show { file, era } => {
            let db = ConfigDatabase::load(&file)?;
            match era {
                Some(era) => emit(out, &db.get_era_block(&era)),
                None => emit(out, &db),
            }
        }
        Command::InferEra { paths } => emit(out, &json!({ "era": infer_era_from_paths(&paths) })),
        Command::Params {
            data,
            mc,
            era,
            inputs,
            mode,
            no_veto_map,
            no_unc_fallback,
            no_residual_fallback,
        } => {
            let config = BuildConfig::default()
                .with_era(era.as_deref().unwrap_or_default())
                .with_mode(mode)
                .with_jet_veto_map(!no_veto_map)
                .with_txt_fallbacks(!no_unc_fallback, !no_residual_fallback);
            let era = config.resolve_era(&inputs);
            if era.is_empty() {
                return Err(CfgError::NoEra(inputs.len()));
            }
            let data = ConfigDatabase::load(&data)?;
            let mc = ConfigDatabase::load(&mc)?;
            let params = JecParameters::assemble(&config, &era, &data, &mc);
            tracing::info!("\n{}", params.select(true));
            emit(out, &params)
        }
        Command::Resolve {
            file,
            era,
            run,
            mode,
        } => {
            let config = BuildConfig::default().with_era(&era).with_mode(mode);
            let db = ConfigDatabase::load(&file)?;
            let inputs = JecInputs::from_block(&config, &db.get_era_block(&era), true);
            tracing::info!("\n{inputs}");
            emit(out, &inputs.resolve_for_run(run))
        }
    }
}

/// Execute the command-line interface with a custom argv iterator.
///
/// # Errors
///
/// See [`run_with_writer`].
pub fn run_with_args<I, T>(args: I) -> Result<(), CfgError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    run_with_writer(args, &mut std::io::stdout().lock())
}

/// Execute the command-line interface with the process arguments.
///
/// # Errors
///
/// See [`run_with_writer`].
pub fn cli() -> Result<(), CfgError> {
    run_with_args(env::args_os())
}
