// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "aes5",
    version,
    about = "AES5-2018 sampling-frequency validation",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Directory holding the JSON settings (defaults to the platform config dir).
    #[arg(long, global = true, value_name = "DIR")]
    pub config: Option<PathBuf>,

    /// Log more (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct Output {
    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate frequencies against the reference table. Exits 1 if any fails.
    Validate {
        /// Frequencies in hertz.
        #[arg(required = true, value_name = "HZ")]
        frequencies: Vec<u32>,
        /// Tolerance in ppm (defaults to the configured tolerance).
        #[arg(long, value_name = "PPM")]
        tolerance: Option<u32>,
        #[command(flatten)]
        output: Output,
    },
    /// Classify frequencies into rate bands.
    Classify {
        /// Frequencies in hertz.
        #[arg(required = true, value_name = "HZ")]
        frequencies: Vec<u32>,
        #[command(flatten)]
        output: Output,
    },
    /// Check one frequency against one clause. Exits 1 if not compliant.
    Clause {
        /// Frequency in hertz.
        #[arg(value_name = "HZ")]
        frequency: u32,
        /// Clause reference: 5.1, 5.2, 5.4 or A.
        clause: String,
    },
    /// Conversion ratio between two sampling frequencies.
    Ratio {
        /// Source frequency in hertz.
        #[arg(value_name = "SOURCE_HZ")]
        source: u32,
        /// Target frequency in hertz.
        #[arg(value_name = "TARGET_HZ")]
        target: u32,
        #[command(flatten)]
        output: Output,
    },
    /// Samples per video frame at every supported frame rate.
    Frames {
        /// Sampling frequency in hertz.
        #[arg(value_name = "HZ")]
        frequency: u32,
        #[command(flatten)]
        output: Output,
    },
    /// Print the reference frequency table.
    Table {
        #[command(flatten)]
        output: Output,
    },
    /// Show or change the stored settings.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective settings.
    Show {
        #[command(flatten)]
        output: Output,
    },
    /// Store a new default tolerance.
    SetTolerance {
        /// Tolerance in ppm (must be non-zero).
        #[arg(value_name = "PPM")]
        ppm: u32,
    },
    /// Restore the default settings.
    Reset,
}
