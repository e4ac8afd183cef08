// Copyright 2025 Fernando Borretti
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

use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use crate::catalog::Catalog;
use crate::cmd::check::check_catalogs;
use crate::cmd::play::play;
use crate::cmd::simulate::Simulation;
use crate::cmd::simulate::run_simulation;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_catalog_stats;
use crate::config::Config;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Validate a catalog, or every catalog in a directory.
    Check {
        /// Path to a catalog file or a directory of catalogs.
        path: PathBuf,
    },
    /// Print catalog statistics.
    Stats {
        /// Path to the catalog file.
        file: PathBuf,
        /// Which output format to use.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Play a session in the terminal.
    Play {
        /// Path to the catalog file.
        file: PathBuf,
        /// Difficulty level.
        #[arg(long, default_value_t = 2)]
        level: u8,
        /// Seed for a reproducible session.
        #[arg(long)]
        seed: Option<u64>,
        /// Path to a TOML configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Play a session automatically and print every event as JSON.
    Simulate {
        /// Path to the catalog file.
        file: PathBuf,
        /// Difficulty level.
        #[arg(long, default_value_t = 2)]
        level: u8,
        /// Seed for the session and the automatic player.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Probability of a deliberate wrong attempt on each turn.
        #[arg(long, default_value_t = 0.0)]
        mistakes: f64,
        /// Path to a TOML configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Check { path } => check_catalogs(&path),
        Command::Stats { file, format } => print_catalog_stats(&file, format),
        Command::Play {
            file,
            level,
            seed,
            config,
        } => play(file, level, seed, config).await,
        Command::Simulate {
            file,
            level,
            seed,
            mistakes,
            config,
        } => {
            let config = Config::load(config.as_deref())?;
            let catalog = Arc::new(Catalog::load(&file)?);
            let sim = Simulation {
                level,
                seed,
                mistakes,
            };
            let mut out = stdout().lock();
            run_simulation(catalog, config, &sim, &mut out).await?;
            Ok(())
        }
    }
}
