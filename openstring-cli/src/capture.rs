//! # Audio Capture Module
//!
//! This module records one analysis buffer from the default microphone using
//! CPAL (Cross-Platform Audio Library). The stream callback accumulates
//! incoming samples and hands complete frames to the main thread over a
//! channel; the main thread lets the microphone settle for the requested
//! time and then takes the next complete frame.
//!
//! ## Features
//! - Automatic input device selection
//! - Mono capture at the configured sample rate
//! - f32 input preferred, with i16 normalized to [-1.0, 1.0] as fallback
//! - Error handling with context on every fallible step

use anyhow::{Context, Result, anyhow};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SupportedStreamConfigRange};
use crossbeam_channel::{Sender, bounded};
use log::{debug, info};
use openstring_core::TunerConfig;
use std::time::Duration;

/// How long to wait for a complete frame once the settling time is over.
const FRAME_TIMEOUT: Duration = Duration::from_secs(2);

/// Records one buffer of `config.buffer_size` samples from the default
/// input device.
///
/// The stream runs for the whole `settle` duration first, so the returned
/// frame reflects a note that has had time to speak, not the attack
/// transient of the first milliseconds.
///
/// # Arguments
/// * `config` - Analysis configuration supplying sample rate and frame size
/// * `settle` - How long to let the microphone run before taking a frame
///
/// # Returns
/// * `Ok(samples)` - One complete frame, normalized to [-1.0, 1.0]
/// * `Err(e)` - No usable device, no usable format, or the stream failed
pub fn record_buffer(config: &TunerConfig, settle: Duration) -> Result<Vec<f32>> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("no input device available"))?;
    info!("using audio input device: {}", device.name()?);

    let supported = device
        .supported_input_configs()
        .context("querying input formats")?
        .collect::<Vec<_>>();
    let rate = cpal::SampleRate(config.sample_rate as u32);
    let stream_config_range = find_supported_config(supported, rate)
        .ok_or_else(|| anyhow!("no mono input format at {} Hz", config.sample_rate))?;

    let sample_format = stream_config_range.sample_format();
    let stream_config: cpal::StreamConfig = stream_config_range.with_sample_rate(rate).into();
    info!(
        "recording {}-sample frames at {} Hz ({sample_format:?} input)",
        config.buffer_size,
        stream_config.sample_rate.0,
    );

    let (frame_tx, frame_rx) = bounded::<Vec<f32>>(8);
    let err_fn = |err| log::error!("audio stream error: {err}");
    let frame_len = config.buffer_size;

    let stream = match sample_format {
        SampleFormat::F32 => {
            let mut pending = Vec::with_capacity(frame_len * 2);
            device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    accumulate(&mut pending, data, frame_len, &frame_tx);
                },
                err_fn,
                None,
            )?
        }
        SampleFormat::I16 => {
            let mut pending = Vec::with_capacity(frame_len * 2);
            device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let normalized: Vec<f32> =
                        data.iter().map(|&s| f32::from(s) / 32_768.0).collect();
                    accumulate(&mut pending, &normalized, frame_len, &frame_tx);
                },
                err_fn,
                None,
            )?
        }
        other => return Err(anyhow!("unsupported input sample format {other:?}")),
    };
    stream.play().context("starting input stream")?;

    std::thread::sleep(settle);

    // Frames recorded while settling are stale; take the next complete one.
    while frame_rx.try_recv().is_ok() {}
    let frame = frame_rx
        .recv_timeout(FRAME_TIMEOUT)
        .context("waiting for a complete sample frame")?;

    if let Err(e) = stream.pause() {
        debug!("error pausing stream: {e}");
    }
    drop(stream);

    debug!("captured {} samples", frame.len());
    Ok(frame)
}

/// Appends new callback data and sends every complete frame downstream.
///
/// Sending never blocks the audio callback; when the channel is full the
/// frame is dropped and a fresher one takes its place later.
fn accumulate(pending: &mut Vec<f32>, data: &[f32], frame_len: usize, sender: &Sender<Vec<f32>>) {
    pending.extend_from_slice(data);
    while pending.len() >= frame_len {
        let frame = pending[..frame_len].to_vec();
        let _ = sender.try_send(frame);
        pending.drain(..frame_len);
    }
}

/// Picks a mono input configuration that covers the target sample rate,
/// preferring f32 samples and falling back to i16.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    rate: cpal::SampleRate,
) -> Option<SupportedStreamConfigRange> {
    let covers_rate = |c: &SupportedStreamConfigRange| {
        c.channels() == 1 && c.min_sample_rate() <= rate && rate <= c.max_sample_rate()
    };
    configs
        .iter()
        .find(|c| covers_rate(c) && c.sample_format() == SampleFormat::F32)
        .cloned()
        .or_else(|| {
            configs
                .into_iter()
                .find(|c| covers_rate(c) && c.sample_format() == SampleFormat::I16)
        })
}
