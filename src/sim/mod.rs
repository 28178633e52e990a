//! Driver for the simulated processor core.
//!
//! Runs the compiled core testbench once per operation, passing operands as
//! simulator plusargs:
//!
//! ```text
//! vvp build/cpu_wrapper.vvp +opcode=1 +a=10 +b=20
//! ```
//!
//! The testbench must report its answer on a line of its own:
//!
//! ```text
//! RESULT=30
//! ```
//!
//! Any other output (banners, `$display` traces, VCD notices) is ignored.
//! Exactly one `RESULT=` line is accepted; none or several is an error
//! rather than a guess.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

/// Prefix of the line carrying the result.
pub const RESULT_PREFIX: &str = "RESULT=";

/// Default simulator runtime.
pub const DEFAULT_PROGRAM: &str = "vvp";

/// Default compiled testbench.
pub const DEFAULT_IMAGE: &str = "build/cpu_wrapper.vvp";

/// Operations understood by the simulated core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CoreOp {
    /// `a + b`.
    Add = 0x01,
    /// `a * b`.
    Mul = 0x02,
}

impl CoreOp {
    /// Opcode value passed to the testbench.
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Errors from a simulator run.
#[derive(Debug, Error)]
pub enum SimError {
    /// The simulator could not be started.
    #[error("failed to launch {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The simulator exited unsuccessfully.
    #[error("simulator exited with {code:?}: {stderr}")]
    Failed {
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// No `RESULT=` line in the output.
    #[error("simulator output has no RESULT= line")]
    MissingResult,

    /// More than one `RESULT=` line in the output.
    #[error("simulator output has {0} RESULT= lines")]
    AmbiguousResult(usize),

    /// The value after `RESULT=` is not a u32.
    #[error("invalid result value: {0:?}")]
    InvalidResult(String),
}

/// How to invoke the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorConfig {
    program: PathBuf,
    image: PathBuf,
    extra_args: Vec<OsString>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            image: PathBuf::from(DEFAULT_IMAGE),
            extra_args: Vec::new(),
        }
    }
}

impl SimulatorConfig {
    /// Create a configuration with the default program and image.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the simulator program.
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the compiled testbench.
    pub fn image(mut self, image: impl Into<PathBuf>) -> Self {
        self.image = image.into();
        self
    }

    /// Append an argument placed before the operand plusargs.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.extra_args.push(arg.into());
        self
    }
}

/// Runs single operations on the simulated core.
#[derive(Debug, Clone, Default)]
pub struct CoreSimulator {
    config: SimulatorConfig,
}

impl CoreSimulator {
    /// Create a driver for the given configuration.
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    /// Run one operation and return the core's result.
    pub fn run(&self, op: CoreOp, a: u32, b: u32) -> Result<u32, SimError> {
        let program = self.config.program.display().to_string();
        tracing::debug!(?op, a, b, %program, "running core simulation");

        let output = Command::new(&self.config.program)
            .arg(&self.config.image)
            .args(&self.config.extra_args)
            .arg(format!("+opcode={}", op.as_byte()))
            .arg(format!("+a={a}"))
            .arg(format!("+b={b}"))
            .output()
            .map_err(|source| SimError::Spawn { program, source })?;

        if !output.status.success() {
            return Err(SimError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let result = parse_result(&String::from_utf8_lossy(&output.stdout))?;
        tracing::debug!(?op, result, "core simulation finished");
        Ok(result)
    }
}

/// Extract the single `RESULT=<u32>` line from simulator output.
pub fn parse_result(stdout: &str) -> Result<u32, SimError> {
    let values: Vec<&str> = stdout
        .lines()
        .filter_map(|line| line.trim().strip_prefix(RESULT_PREFIX))
        .collect();

    match values.as_slice() {
        [] => Err(SimError::MissingResult),
        [value] => value
            .trim()
            .parse::<u32>()
            .map_err(|_| SimError::InvalidResult((*value).to_string())),
        many => Err(SimError::AmbiguousResult(many.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_result() {
        let out = "VCD info: dumpfile cpu.vcd opened\nRESULT=30\n";
        assert_eq!(parse_result(out).unwrap(), 30);
        assert_eq!(parse_result("  RESULT=4294967295  ").unwrap(), u32::MAX);
    }

    #[test]
    fn test_parse_ignores_embedded_mentions() {
        // Only a line that starts with the token counts
        let out = "op=1 Result=30, a=10\nDEBUG last RESULT=7\n";
        assert!(matches!(parse_result(out), Err(SimError::MissingResult)));
    }

    #[test]
    fn test_parse_rejects_ambiguity() {
        assert!(matches!(
            parse_result("RESULT=1\nRESULT=2\n"),
            Err(SimError::AmbiguousResult(2))
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_result("RESULT=30,"),
            Err(SimError::InvalidResult(ref v)) if v == "30,"
        ));
        assert!(matches!(
            parse_result("RESULT=-1"),
            Err(SimError::InvalidResult(_))
        ));
    }

    #[test]
    fn test_core_ops() {
        assert_eq!(CoreOp::Add.as_byte(), 0x01);
        assert_eq!(CoreOp::Mul.as_byte(), 0x02);
    }

    #[test]
    fn test_missing_program() {
        let sim = CoreSimulator::new(SimulatorConfig::new().program("/nonexistent/vvp"));
        assert!(matches!(
            sim.run(CoreOp::Add, 1, 2),
            Err(SimError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::io::Write;

        /// Stand-in testbench: a shell script honoring the plusargs.
        fn testbench(body: &str) -> tempfile::NamedTempFile {
            let mut script = tempfile::NamedTempFile::new().unwrap();
            writeln!(script, "op=${{1#+opcode=}}; a=${{2#+a=}}; b=${{3#+b=}}").unwrap();
            writeln!(script, "{body}").unwrap();
            script
        }

        fn simulator(script: &tempfile::NamedTempFile) -> CoreSimulator {
            CoreSimulator::new(SimulatorConfig::new().program("sh").image(script.path()))
        }

        #[test]
        fn test_run_add_and_mul() {
            let script = testbench(
                r#"echo "VCD info: dumpfile opened"
if [ "$op" = 1 ]; then echo "RESULT=$((a + b))"; else echo "RESULT=$((a * b))"; fi"#,
            );
            let sim = simulator(&script);
            assert_eq!(sim.run(CoreOp::Add, 10, 20).unwrap(), 30);
            assert_eq!(sim.run(CoreOp::Mul, 5, 7).unwrap(), 35);
        }

        #[test]
        fn test_run_failure_status() {
            let script = testbench("echo boom >&2; exit 3");
            let err = simulator(&script).run(CoreOp::Add, 1, 1).unwrap_err();
            assert!(matches!(
                err,
                SimError::Failed { code: Some(3), ref stderr } if stderr.trim() == "boom"
            ));
        }

        #[test]
        fn test_run_without_result_line() {
            let script = testbench(r#"echo "Result=$((a + b)), done""#);
            assert!(matches!(
                simulator(&script).run(CoreOp::Add, 1, 1),
                Err(SimError::MissingResult)
            ));
        }
    }
}
