//! # openstring - console guitar tuner
//!
//! Records a short window of microphone audio, runs the core analysis
//! pipeline on one frame of it and prints which open string was played and
//! how in tune it was.
//!
//! Usage: `openstring-cli [SECONDS]` where SECONDS is how long to sample
//! before the analysis frame is taken (default 4).

mod capture;
mod render;

use anyhow::{Context, Result, bail};
use log::info;
use openstring_core::{EstimateError, Tuner, TunerConfig};
use std::time::Duration;

/// Sampling window used when no duration is given on the command line.
const DEFAULT_SAMPLING_SECS: f64 = 4.0;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let sampling_time = parse_sampling_time()?;
    let config = TunerConfig::default();
    let tuner = Tuner::new(config.clone());

    info!("detecting audio for {:.1} s...", sampling_time.as_secs_f64());
    let samples = capture::record_buffer(&config, sampling_time)?;

    match tuner.analyze(&samples) {
        Ok(report) => {
            println!("{}", render::frequency_line(&report));
            println!("{}", render::verdict_line(&report));
        }
        Err(EstimateError::NoPeakInRange) => {
            println!("No note detected in the playable range. Please sample again.");
        }
        Err(err) => return Err(err).context("analyzing the recorded frame"),
    }

    Ok(())
}

/// Reads the optional sampling duration from the first argument.
fn parse_sampling_time() -> Result<Duration> {
    let seconds = match std::env::args().nth(1) {
        Some(raw) => raw
            .parse::<f64>()
            .with_context(|| format!("invalid sampling time {raw:?}"))?,
        None => DEFAULT_SAMPLING_SECS,
    };
    if !seconds.is_finite() || seconds <= 0.0 {
        bail!("sampling time must be a positive number of seconds");
    }
    Ok(Duration::from_secs_f64(seconds))
}
