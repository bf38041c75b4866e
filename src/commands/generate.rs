//! Implementation of the `confgen generate` command.
//!
//! # What `confgen generate` does
//!
//! 1. Reads the spreadsheet and extracts one record per device row
//! 2. Resolves the push target (when `--push-config` is set) before rendering
//! 3. For each template, renders every record into `<template><output_suffix>`
//! 4. Optionally pushes that template's blocks to the device over a new session
//!
//! A failing template is reported and the remaining templates still run.
//! Extraction failures abort the whole run.
//!
//! Pushing a configuration template together with its undo template in one
//! run applies and immediately reverts the change; run them separately.

use super::{Failures, load_records};
use crate::cli::{GenerateArgs, PushArgs};
use crate::config::{Config, PushConfig};
use crate::error::Result;
use crate::extract::RecordSequence;
use crate::push::{CommandPusher, DeviceTarget, push_blocks};
use crate::template::{output_path, render_to_file};
use std::path::Path;
use tracing::info;

/// Execute the `confgen generate` command.
pub fn cmd_generate(args: GenerateArgs, config: &Config) -> Result<()> {
    println!(
        "Reading spreadsheet {}...",
        args.source.spreadsheet.display()
    );
    let records = load_records(&args.source, config)?;
    println!("Read {} entries from spreadsheet", records.len());

    let target = if args.push.push_config {
        let settings = push_settings(&args.push, &config.push);
        Some((
            DeviceTarget::new(args.push.ip_address.as_deref(), &settings)?,
            settings,
        ))
    } else {
        None
    };

    let mut failures = Failures::default();
    for template in &args.templates {
        let result = generate_one(template, &records, config, target.as_ref(), args.push.feedback);
        if let Err(error) = result {
            failures.record(&error);
        }
    }

    failures.into_result(args.templates.len())?;
    println!("Complete!");
    Ok(())
}

/// Render one template and, when a target is given, push its blocks.
fn generate_one(
    template: &Path,
    records: &RecordSequence,
    config: &Config,
    target: Option<&(DeviceTarget, PushConfig)>,
    feedback: bool,
) -> Result<()> {
    println!(
        "Generating configuration from template {} into {}...",
        template.display(),
        output_path(template, &config.output_suffix).display()
    );
    let outcome = render_to_file(template, records, &config.output_suffix)?;
    info!(
        template = %template.display(),
        blocks = outcome.blocks.len(),
        "template rendered"
    );

    let Some((target, settings)) = target else {
        return Ok(());
    };

    println!(
        "Pushing {} configuration elements to {}:{}...",
        outcome.blocks.len(),
        target.address,
        target.port
    );
    let mut pusher = CommandPusher::new(&settings.command, target, settings.timeout_seconds)?;
    let report = push_blocks(&mut pusher, &outcome.blocks)?;
    info!(
        chunks = report.chunks.len(),
        started_at = %report.started_at.to_rfc3339(),
        "push finished"
    );
    if feedback {
        print!("{}", report.feedback());
    }
    Ok(())
}

/// Overlay command-line push flags on the configured defaults.
pub(crate) fn push_settings(args: &PushArgs, defaults: &PushConfig) -> PushConfig {
    PushConfig {
        device_type: args.device_type.unwrap_or(defaults.device_type),
        port: args.port.unwrap_or(defaults.port),
        username: args
            .username
            .clone()
            .unwrap_or_else(|| defaults.username.clone()),
        password: args
            .password
            .clone()
            .unwrap_or_else(|| defaults.password.clone()),
        command: defaults.command.clone(),
        timeout_seconds: defaults.timeout_seconds,
    }
}
