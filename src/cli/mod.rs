//! CLI argument parsing for confgen.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use crate::config::DeviceType;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Confgen: bulk network configuration from a spreadsheet and text templates.
///
/// The spreadsheet's first row holds titles, the second row holds field
/// names and every following row describes one device. Each template's
/// `{field}` placeholders are filled once per device row.
#[derive(Parser, Debug)]
#[command(name = "confgen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v for info, -vv for debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ./confgen.yaml when present).
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for confgen.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render every template once per spreadsheet row.
    ///
    /// Writes `<template>.output` next to each template and optionally
    /// pushes the rendered blocks to a device.
    Generate(GenerateArgs),

    /// Print the records extracted from the spreadsheet.
    Records(RecordsArgs),

    /// Check templates against the spreadsheet's fields without rendering.
    ///
    /// Reports brace mismatches and placeholders that name no field.
    Check(CheckArgs),
}

/// Where records come from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Spreadsheet (.xlsx) holding the device data.
    #[arg(value_name = "SPREADSHEET")]
    pub spreadsheet: PathBuf,

    /// Sheet to read (defaults to the active sheet).
    #[arg(short, long, value_name = "SHEETNAME")]
    pub sheet: Option<String>,

    /// Fail when the field row names a field twice.
    #[arg(long)]
    pub strict_fields: bool,
}

/// Arguments for the `generate` command.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Template files; as many as you like.
    #[arg(value_name = "TEMPLATE", required = true)]
    pub templates: Vec<PathBuf>,

    #[command(flatten)]
    pub push: PushArgs,
}

/// Push options for `generate`. Unset values fall back to the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct PushArgs {
    /// Push each template's rendered configuration to the device.
    #[arg(long)]
    pub push_config: bool,

    /// Address or hostname of the device.
    #[arg(short = 'i', long = "ip-address", value_name = "IPADDR")]
    pub ip_address: Option<String>,

    /// Session port.
    #[arg(short, long, value_name = "PORTNUMBER")]
    pub port: Option<u16>,

    /// Session username.
    #[arg(short, long)]
    pub username: Option<String>,

    /// Session password.
    #[arg(long)]
    pub password: Option<String>,

    /// Kind of device.
    #[arg(short = 't', long, value_enum)]
    pub device_type: Option<DeviceType>,

    /// Print the device's responses after pushing.
    #[arg(short, long)]
    pub feedback: bool,
}

/// Arguments for the `records` command.
#[derive(Args, Debug)]
pub struct RecordsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print records as a JSON array of objects.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Template files to check.
    #[arg(value_name = "TEMPLATE", required = true)]
    pub templates: Vec<PathBuf>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
