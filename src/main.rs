// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

use automodder::cli::{Config, Runner};
use clap::Parser;
use log::LevelFilter;
use std::process;

/// HTTP crates whose logs are shown only when debugging.
const HTTP_CRATES: [&str; 4] = ["reqwest", "hyper_util", "rustls", "yup_oauth2"];

fn init_logging(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level.min(LevelFilter::Warn))
        .filter_module("automodder", level);
    if level >= LevelFilter::Debug {
        for krate in HTTP_CRATES {
            builder.filter_module(krate, level);
        }
    }
    builder.parse_default_env().init();
}

#[tokio::main]
async fn main() {
    let config = Config::parse();
    init_logging(config.verbosity().log_level_filter());

    // Only fails if a provider is already installed.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let result = match Runner::new(config) {
        Ok(runner) => runner.run().await,
        Err(err) => Err(err),
    };
    if let Err(err) = result {
        eprintln!("{err}");
        process::exit(1);
    }
}
