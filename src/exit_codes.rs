//! Exit code constants for the confgen CLI.
//!
//! - 0: Success
//! - 1: User error (missing spreadsheet, malformed data or template, bad config)
//! - 2: Sheet not found inside the spreadsheet
//! - 3: Template file could not be opened
//! - 4: Template references a field the spreadsheet does not define
//! - 5: Pushing configuration to the device failed
//! - 6: Push requested without a device address
//! - 7: Push to the device timed out

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: missing spreadsheet, malformed rows or templates, invalid config.
pub const USER_ERROR: i32 = 1;

/// The requested sheet does not exist in the spreadsheet.
pub const SHEET_NOT_FOUND: i32 = 2;

/// A template file could not be opened.
pub const TEMPLATE_NOT_FOUND: i32 = 3;

/// A template placeholder names a field missing from the spreadsheet.
pub const UNRESOLVED_PLACEHOLDER: i32 = 4;

/// The push command failed or could not be started.
pub const PUSH_FAILURE: i32 = 5;

/// Pushing was requested but no device address was given.
pub const MISSING_ADDRESS: i32 = 6;

/// The push command did not finish in time.
pub const PUSH_TIMEOUT: i32 = 7;
