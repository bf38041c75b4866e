//! Subprocess-backed push session.
//!
//! Runs the configured command once per configuration block, writes the
//! block to its stdin and captures stdout as feedback. The command is killed
//! if it outlives the timeout, and output pipes still held open by its
//! descendants are abandoned rather than waited on.

use super::{DeviceTarget, Pusher};
use crate::error::{ConfgenError, Result};
use crate::template::{TemplateError, render_template};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How long to keep reading output once the command itself has exited.
const PIPE_GRACE: Duration = Duration::from_millis(200);

/// Pushes blocks by piping them into an external command.
#[derive(Debug)]
pub struct CommandPusher {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    address: String,
    port: u16,
}

impl CommandPusher {
    /// Prepare the command line for `target`.
    ///
    /// Target values are shell-quoted before substitution so that passwords or
    /// usernames containing spaces survive word splitting.
    pub fn new(command: &str, target: &DeviceTarget, timeout_seconds: u64) -> Result<Self> {
        let variables: HashMap<String, String> = target
            .variables()
            .into_iter()
            .map(|(name, value)| (name, shell_words::quote(&value).into_owned()))
            .collect();

        let command_str = render_template(command, &variables).map_err(|e| match e {
            TemplateError::UndefinedVariable { name, .. } => ConfgenError::Config(format!(
                "push command template references undefined variable '{}'\n\
                 Command: {}\n\
                 Available variables: {}",
                name,
                command,
                format_vars(&variables)
            )),
            other => ConfgenError::Config(format!(
                "push command template is malformed: {}\nCommand: {}",
                other, command
            )),
        })?;

        let mut args = shell_words::split(&command_str).map_err(|e| {
            ConfgenError::Config(format!(
                "failed to parse push command '{}': {}\n\
                 Fix: check for unmatched quotes or invalid escape sequences.",
                command, e
            ))
        })?;

        if args.is_empty() {
            return Err(ConfgenError::Config(format!(
                "push command is empty after parsing: '{}'",
                command
            )));
        }
        let program = args.remove(0);

        Ok(Self {
            program,
            args,
            timeout: Duration::from_secs(timeout_seconds),
            address: target.address.clone(),
            port: target.port,
        })
    }

    /// The program that will be executed.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the program.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn timeout_error(&self) -> ConfgenError {
        ConfgenError::PushTimeout {
            address: self.address.clone(),
            port: self.port,
            seconds: self.timeout.as_secs(),
        }
    }
}

impl Pusher for CommandPusher {
    fn send(&mut self, block: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ConfgenError::PushFailed(format!(
                    "failed to execute push command '{}': {}\n\
                     Fix: ensure the command is installed and in PATH.",
                    self.program, e
                ))
            })?;
        debug!(program = %self.program, bytes = block.len(), "started push session");

        // Feed and drain the pipes on helper threads so a chatty or slow
        // session cannot block the timeout loop. The stdin writer is never
        // joined; it finishes once the pipe is consumed or closed.
        if let Some(mut stdin) = child.stdin.take() {
            let mut input = block.to_string();
            input.push('\n');
            std::thread::spawn(move || {
                let _ = stdin.write_all(input.as_bytes());
            });
        }
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let started = Instant::now();
        let (exit_code, timed_out) = wait_with_timeout(&mut child, self.timeout)?;
        let deadline = (started + self.timeout).max(Instant::now() + PIPE_GRACE);
        let output = collect(stdout, deadline);
        let errors = collect(stderr, deadline);

        let (Some(output), Some(errors)) = (output, errors) else {
            warn!(program = %self.program, "push output still open after exit, abandoning it");
            return Err(self.timeout_error());
        };
        if timed_out {
            return Err(self.timeout_error());
        }

        match exit_code {
            Some(0) => Ok(output),
            code => Err(ConfgenError::PushFailed(format!(
                "push command '{}' exited with {}: {}",
                self.program,
                code.map(|c| c.to_string())
                    .unwrap_or_else(|| "a signal".to_string()),
                errors.trim()
            ))),
        }
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<String> {
    let (sender, receiver) = mpsc::channel();
    std::thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = pipe.read_to_end(&mut buffer);
        let _ = sender.send(String::from_utf8_lossy(&buffer).into_owned());
    });
    receiver
}

/// Wait for a drained pipe until `deadline`.
///
/// Returns `None` when the pipe is still open at the deadline, which happens
/// when a descendant of the command inherited it and is still running.
fn collect(pipe: Option<Receiver<String>>, deadline: Instant) -> Option<String> {
    let Some(pipe) = pipe else {
        return Some(String::new());
    };
    match pipe.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(text) => Some(text),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
    }
}

/// Wait for a child process with timeout.
///
/// Returns (exit_code, timed_out).
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<(Option<i32>, bool)> {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(50);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok((status.code(), false)),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    // On Unix this is SIGKILL; on Windows it is TerminateProcess.
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok((None, true));
                }
                std::thread::sleep(poll_interval);
            }
            Err(e) => {
                return Err(ConfgenError::PushFailed(format!(
                    "failed to check push command status: {}",
                    e
                )));
            }
        }
    }
}

/// Format variable names for error messages.
fn format_vars(vars: &HashMap<String, String>) -> String {
    let mut keys: Vec<_> = vars.keys().map(String::as_str).collect();
    keys.sort();
    keys.join(", ")
}
