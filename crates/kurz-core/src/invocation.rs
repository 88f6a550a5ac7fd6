//! Invocation assembly and the execution boundary.
//!
//! An [`Invocation`] is the fully formed argv handed to the underlying
//! tool. It is built incrementally by the dispatcher and never mutated
//! after crossing the [`Executor`] boundary. The production executor
//! inherits the terminal and propagates the child's exit code unchanged.

use std::fmt;
use std::process::Command;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

/// Program invoked when none is set explicitly.
pub const DEFAULT_PROGRAM: &str = "kubectl";

/// An ordered argument sequence for one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
}

impl Default for Invocation {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl Invocation {
    /// Creates an empty invocation of the given program.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The program to execute.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The assembled argument list.
    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Boundary through which invocations leave the dispatcher.
pub trait Executor {
    /// Runs the invocation to completion and returns its exit code.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the program cannot be spawned at all; a
    /// non-zero exit of the tool itself is a code, not an error.
    fn run(&self, invocation: &Invocation) -> std::io::Result<i32>;
}

/// Executor that spawns the real program with inherited stdio.
#[derive(Debug, Clone, Default)]
pub struct ProgramExecutor {
    program_override: Option<String>,
}

impl ProgramExecutor {
    /// Creates an executor that runs invocations as assembled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an executor that substitutes `program` for the default
    /// cluster CLI. Invocations of other programs are left alone.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program_override: Some(program.into()),
        }
    }
}

impl Executor for ProgramExecutor {
    fn run(&self, invocation: &Invocation) -> std::io::Result<i32> {
        let program = match &self.program_override {
            Some(p) if invocation.program() == DEFAULT_PROGRAM => p.as_str(),
            _ => invocation.program(),
        };
        debug!(program, command = %invocation, "executing");
        let status = Command::new(program).args(invocation.argv()).status()?;
        // A signal-terminated child has no code; report the shell convention.
        Ok(status.code().unwrap_or(130))
    }
}

/// Recording executor for tests; never spawns anything.
#[derive(Debug, Default)]
pub struct SpyExecutor {
    calls: Mutex<Vec<Invocation>>,
    exit_code: i32,
}

impl SpyExecutor {
    /// Creates a spy that reports success for every invocation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a spy that reports the given exit code.
    #[must_use]
    pub fn with_exit_code(exit_code: i32) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            exit_code,
        }
    }

    /// The invocations recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Executor for SpyExecutor {
    fn run(&self, invocation: &Invocation) -> std::io::Result<i32> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(invocation.clone());
        Ok(self.exit_code)
    }
}
