// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `aes5`: validate sampling frequencies against AES5-2018 from the shell.
//!
//! # Usage
//! ```text
//! aes5 validate 48000 44100 --tolerance 50
//! aes5 classify 96000 57000 --json
//! aes5 clause 48048 A
//! aes5 config set-tolerance 25
//! ```
//!
//! `validate` exits 1 when any frequency fails and `clause` exits 1 when the
//! frequency is not compliant. Errors exit 1 with a message on stderr.

// The CLI is expected to print to stdout/stderr.
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod report;

use std::process::ExitCode;

use aes5_config::{load_settings, save_settings, ConfigService, FsConfigStore};
use aes5_core::conversion::{samples_per_video_frame, ConversionRatio, VideoFrameRate};
use aes5_core::{
    ComplianceEngine, FrequencyValidator, RateCategoryManager, ValidationCore, ValidatorSettings,
    STANDARD_FREQUENCIES,
};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ConfigAction, Output};
use crate::report::FrameRow;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let Cli {
        config, command, ..
    } = cli;
    let open_store = || -> Result<FsConfigStore> {
        let store = match &config {
            Some(dir) => FsConfigStore::at(dir),
            None => FsConfigStore::new(),
        };
        store.context("failed to open the settings directory")
    };

    match command {
        Command::Validate {
            frequencies,
            tolerance,
            output,
        } => {
            let settings = load_settings(&ConfigService::new(open_store()?))
                .context("failed to load settings")?;
            let validator =
                FrequencyValidator::with_config(ComplianceEngine::new(), ValidationCore::new(), &settings)?;
            let results: Vec<_> = frequencies
                .iter()
                .map(|&f| match tolerance {
                    Some(ppm) => validator.validate_frequency(f, ppm),
                    None => validator.validate_frequency_default(f),
                })
                .collect();
            let metrics = validator.get_metrics();
            debug!(
                total = metrics.total_validations,
                max_latency_ns = metrics.max_latency_ns,
                "validation finished"
            );
            emit(output, &results, || report::validations(&results))?;
            Ok(exit_if(results.iter().all(|r| r.is_valid())))
        }
        Command::Classify {
            frequencies,
            output,
        } => {
            let manager = RateCategoryManager::create(ValidationCore::new());
            let results: Vec<_> = frequencies
                .iter()
                .map(|&f| manager.classify_rate_category(f))
                .collect();
            emit(output, &results, || report::classifications(&results))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Clause { frequency, clause } => {
            let engine = ComplianceEngine::new();
            let compliant = engine.verify_clause_reference(frequency, &clause);
            let verdict = if compliant { "complies with" } else { "does not comply with" };
            println!("{frequency} Hz {verdict} AES5-2018 clause {clause}");
            Ok(exit_if(compliant))
        }
        Command::Ratio {
            source,
            target,
            output,
        } => {
            let ratio = ConversionRatio::between(source, target)
                .context("both frequencies must be non-zero")?;
            let report = report::RatioReport::new(source, target, ratio);
            emit(output, &report, || report.table())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Frames { frequency, output } => {
            let rows: Vec<FrameRow> = VideoFrameRate::ALL
                .iter()
                .map(|&rate| FrameRow::from(&samples_per_video_frame(frequency, rate)))
                .collect();
            emit(output, &rows, || report::frames(&rows))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Table { output } => {
            emit(output, &STANDARD_FREQUENCIES, || {
                report::reference_table(&STANDARD_FREQUENCIES)
            })?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { action } => {
            let store = open_store()?;
            let location = store.path_for(aes5_config::SETTINGS_KEY);
            let service = ConfigService::new(store);
            match action {
                ConfigAction::Show { output } => {
                    let settings = load_settings(&service).context("failed to load settings")?;
                    emit(output, &settings, || {
                        report::settings(&settings, &location.display().to_string())
                    })?;
                }
                ConfigAction::SetTolerance { ppm } => {
                    let settings = load_settings(&service)
                        .context("failed to load settings")?
                        .with_tolerance_ppm(ppm);
                    save_settings(&service, &settings).context("failed to save settings")?;
                    println!("default tolerance set to {ppm} ppm");
                }
                ConfigAction::Reset => {
                    save_settings(&service, &ValidatorSettings::default())
                        .context("failed to save settings")?;
                    println!("settings reset to defaults");
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn emit<T, F>(output: Output, value: &T, render: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce() -> comfy_table::Table,
{
    if output.json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", render());
    }
    Ok(())
}

fn exit_if(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
