// ABOUTME: Tri Planner CLI - validate athletes, generate plans and explore what-if scenarios
// ABOUTME: Non-interactive front end over the pipeline, methodology catalog and trace files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Validate an athlete and save a Markdown trace
//! tri-planner-cli validate --profile athlete.json --trace-format markdown
//!
//! # Generate a plan and write it to a file
//! tri-planner-cli plan --profile athlete.json --output plan.json
//!
//! # See what happens if sleep improves
//! tri-planner-cli what-if --profile athlete.json --set current_state.sleep_hours=7.5
//!
//! # Browse methodologies
//! tri-planner-cli methodology list
//! tri-planner-cli methodology show polarized_80_20_v1
//!
//! # Re-render a saved trace
//! tri-planner-cli trace show reasoning_logs/trace_athlete_001_20250301_093000.json
//! ```
//!
//! Exit status is 0 on approval, 2 when validation refuses the athlete, 1 on error.

mod commands;
mod helpers;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use commands::evaluate::TraceOutput;
use tracing::debug;
use tri_planner::config::{EngineConfig, TraceFormat};
use tri_planner::logging::LoggingConfig;

#[derive(Parser)]
#[command(
    name = "tri-planner-cli",
    about = "Triathlon methodology validation and training plan generator",
    long_about = "Validates an athlete profile against a training methodology, scores fragility, \
                  builds a periodized plan and records every decision in a reasoning trace."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Methodology file, or id of a methodology in the methodology directory
    #[arg(long, short = 'm', global = true)]
    methodology: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Validate an athlete profile against the methodology
    Validate {
        /// Athlete profile (JSON or YAML)
        #[arg(long, short = 'p')]
        profile: PathBuf,

        /// Trace encoding (json or markdown)
        #[arg(long)]
        trace_format: Option<TraceFormat>,

        /// Trace directory override
        #[arg(long)]
        trace_dir: Option<PathBuf>,

        /// Do not write a trace file
        #[arg(long)]
        no_trace: bool,
    },

    /// Validate, score and generate a training plan
    Plan {
        /// Athlete profile (JSON or YAML)
        #[arg(long, short = 'p')]
        profile: PathBuf,

        /// Write the plan as JSON to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// First day of week 1 (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Do not write a trace file
        #[arg(long)]
        no_trace: bool,
    },

    /// Re-run the engine with modified profile values
    WhatIf {
        /// Athlete profile (JSON or YAML)
        #[arg(long, short = 'p')]
        profile: PathBuf,

        /// Field change as `path=value`; repeat for independent scenarios
        #[arg(long = "set", value_name = "PATH=VALUE", required = true)]
        changes: Vec<String>,

        /// Print scenario results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Browse available methodologies
    Methodology {
        #[command(subcommand)]
        action: MethodologyCommand,
    },

    /// Inspect saved reasoning traces
    Trace {
        #[command(subcommand)]
        action: TraceCommand,
    },
}

#[derive(Subcommand)]
enum MethodologyCommand {
    /// List methodologies in the methodology directory
    List,
    /// Show one methodology by id
    Show {
        /// Methodology id
        id: String,
    },
}

#[derive(Subcommand)]
enum TraceCommand {
    /// Render a saved JSON trace
    Show {
        /// Trace file
        file: PathBuf,

        /// Output encoding (markdown by default)
        #[arg(long, default_value = "markdown")]
        format: TraceFormat,
    },
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = EngineConfig::from_env()?;
    debug!(?config, "Resolved engine configuration");
    let methodology = cli.methodology.as_deref();

    match cli.command {
        Command::Validate {
            profile,
            trace_format,
            trace_dir,
            no_trace,
        } => {
            let output = TraceOutput::new(&config, trace_format, trace_dir, no_trace);
            commands::evaluate::validate(&config, methodology, &profile, &output)
        }
        Command::Plan {
            profile,
            output,
            start_date,
            no_trace,
        } => {
            let trace_output = TraceOutput::new(&config, None, None, no_trace);
            commands::evaluate::plan(
                &config,
                methodology,
                &profile,
                output.as_deref(),
                start_date.or(config.plan_start_date),
                &trace_output,
            )
        }
        Command::WhatIf {
            profile,
            changes,
            json,
        } => commands::what_if::run(&config, methodology, &profile, &changes, json),
        Command::Methodology { action } => match action {
            MethodologyCommand::List => commands::methodology::list(&config),
            MethodologyCommand::Show { id } => commands::methodology::show(&config, &id),
        },
        Command::Trace { action } => match action {
            TraceCommand::Show { file, format } => commands::trace::show(&file, format),
        },
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging = logging.verbose();
    }
    if let Err(e) = logging.init() {
        eprintln!("warning: {e}");
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
