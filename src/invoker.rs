//! Running external tools (`man`, the formatter) and capturing their output.
//!
//! Commands are always an argument vector handed straight to the OS. Page and
//! section names typed by the user never pass through a shell, so characters
//! like `'`, `;` or `$(...)` in a search reach `man` as literal text. Callers
//! put user text after a `--` so a leading `-` isn't read as an option.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, trace};

use crate::error::{Error, Result};

/// One program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    /// Bytes written to the child's standard input, if any.
    pub stdin: Option<Vec<u8>>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn stdin(mut self, input: Vec<u8>) -> Self {
        self.stdin = Some(input);
        self
    }
}

/// What a finished process wrote.
#[derive(Debug, Clone, Default)]
pub struct Captured {
    pub stdout: Vec<u8>,
    pub success: bool,
}

impl Captured {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

pub trait ToolInvoker {
    /// Run `command` to completion and return its standard output.
    ///
    /// A non-zero exit status is not an error; only failing to start the
    /// program is.
    fn capture(&self, command: &CommandLine) -> Result<Captured>;
}

/// Spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInvoker;

impl ToolInvoker for SystemInvoker {
    fn capture(&self, command: &CommandLine) -> Result<Captured> {
        debug!(program = %command.program, args = ?command.args, "running");

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(if command.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Spawn {
                program: command.program.clone(),
                source,
            })?;

        // Feed stdin from its own thread so a chatty child can't fill the
        // stdout pipe while we are still writing.
        let output = thread::scope(|scope| {
            if let (Some(input), Some(mut pipe)) = (command.stdin.as_deref(), child.stdin.take()) {
                scope.spawn(move || {
                    if let Err(error) = pipe.write_all(input) {
                        debug!(%error, "child closed stdin early");
                    }
                });
            }
            child.wait_with_output()
        })
        .map_err(|source| Error::Spawn {
            program: command.program.clone(),
            source,
        })?;

        if !output.stderr.is_empty() {
            debug!(
                program = %command.program,
                stderr = %String::from_utf8_lossy(&output.stderr).trim_end(),
                "stderr"
            );
        }
        trace!(bytes = output.stdout.len(), status = %output.status, "captured");

        Ok(Captured {
            stdout: output.stdout,
            success: output.status.success(),
        })
    }
}
