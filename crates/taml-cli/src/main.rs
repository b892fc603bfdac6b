// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Inspection and conversion of binary Taml files.
// Run with: taml <command> --help

mod commands;
mod helpers;

use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};
use helpers::print_error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "taml")]
#[command(version, about = "Inspect, dump and convert binary Taml files")]
#[command(propagate_version = true)]
struct Cli {
    /// Raise the log level (-v info, -vv debug, -vvv trace). RUST_LOG wins when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the header and object counts of a file.
    Info {
        /// The file to inspect.
        file: PathBuf,
    },
    /// Print the decoded object tree.
    Dump {
        /// The file to dump.
        file: PathBuf,
        /// Print the decoded graph as JSON.
        #[arg(long)]
        json: bool,
        /// Print only the root object's fields.
        #[arg(long, conflicts_with = "json")]
        root_only: bool,
    },
    /// Re-encode a file, optionally changing compression or version.
    Convert {
        /// The file to read.
        input: PathBuf,
        /// The file to write. Replaced atomically.
        output: PathBuf,
        /// Compress the element payload.
        #[arg(long)]
        compress: bool,
        /// Version id to write into the header. Newer versions than this build
        /// reads are refused.
        #[arg(
            long,
            default_value_t = taml_core::TAML_FORMAT_VERSION,
            value_parser = clap::value_parser!(u32)
                .range(1..=i64::from(taml_core::TAML_FORMAT_VERSION))
        )]
        format_version: u32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    Builder::from_env(Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Info { file } => commands::info::run(&file),
        Commands::Dump {
            file,
            json,
            root_only,
        } => commands::dump::run(&file, json, root_only),
        Commands::Convert {
            input,
            output,
            compress,
            format_version,
        } => commands::convert::run(&input, &output, compress, format_version),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
