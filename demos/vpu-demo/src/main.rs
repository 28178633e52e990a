//! VPU walkthrough.
//!
//! Opens the accelerator's serial port and runs one of each command:
//! vector add, vector multiply, dot product, matrix add.
//!
//! Environment variables:
//! - VPU_PORT: Serial device (e.g. /dev/ttyUSB0, COM3; /dev/ttyS2 under WSL)
//! - VPU_BAUD: Baud rate (default 115200)
//! - VPU_TIMEOUT_MS: Per-word read timeout (default 2000)
//! - RUST_LOG: Log filter (default info)
//!
//! The `sim` subcommand runs the simulated processor core instead.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vpu_protocol::prelude::*;

type DemoResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "vpu-demo", version, about = "Send vectors and matrices to the VPU")]
struct Cli {
    /// Serial device path.
    #[arg(short, long, env = "VPU_PORT", default_value = vpu_protocol::core::DEFAULT_PORT)]
    port: String,

    /// Baud rate.
    #[arg(short, long, env = "VPU_BAUD", default_value_t = vpu_protocol::core::DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Per-word read timeout in milliseconds.
    #[arg(long, env = "VPU_TIMEOUT_MS", default_value_t = 2000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run add and multiply on the simulated core.
    Sim {
        /// Simulator runtime.
        #[arg(long, default_value = vpu_protocol::sim::DEFAULT_PROGRAM)]
        program: String,

        /// Compiled testbench.
        #[arg(long, default_value = vpu_protocol::sim::DEFAULT_IMAGE)]
        image: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Some(Commands::Sim {
            ref program,
            ref image,
        }) => run_sim(program, image),
        None => run_uart(&cli),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            if let Some(ProtocolError::ChannelUnavailable { path, .. }) =
                e.downcast_ref::<ProtocolError>()
            {
                eprintln!("Could not open serial port {path}. Make sure:");
                eprintln!("  1. USB-UART adapter is connected");
                eprintln!("  2. Correct port is selected");
                eprintln!("  3. Port is not in use by another program");
            }
            ExitCode::FAILURE
        }
    }
}

fn run_uart(cli: &Cli) -> DemoResult<()> {
    let config = SerialConfig::new(cli.port.as_str())
        .baud_rate(cli.baud)
        .timeout(Duration::from_millis(cli.timeout_ms));
    let mut vpu = Accelerator::open(&config)?;

    tracing::info!("=== Vector Addition ===");
    let (v1, v2) = ([1u32, 2, 3, 4], [10u32, 20, 30, 40]);
    let result = vpu.vector_add(&v1, &v2)?;
    tracing::info!("{:?} + {:?} = {:?}", v1, v2, result);

    tracing::info!("=== Vector Multiplication ===");
    let (v1, v2) = ([2u32, 3, 4, 5], [10u32, 10, 10, 10]);
    let result = vpu.vector_multiply(&v1, &v2)?;
    tracing::info!("{:?} * {:?} = {:?}", v1, v2, result);

    tracing::info!("=== Dot Product ===");
    let (v1, v2) = ([1u32, 2, 3], [4u32, 5, 6]);
    let result = vpu.vector_dot(&v1, &v2)?;
    let expected: u32 = v1.iter().zip(&v2).map(|(a, b)| a * b).sum();
    tracing::info!("{:?} . {:?} = {} (expected {})", v1, v2, result, expected);

    tracing::info!("=== Matrix Addition ===");
    let m1 = [[1u32, 2, 3], [4, 5, 6]];
    let m2 = [[10u32, 20, 30], [40, 50, 60]];
    for row in vpu.matrix_add(&m1, &m2)? {
        tracing::info!("{:?}", row);
    }

    vpu.close()?;
    Ok(())
}

fn run_sim(program: &str, image: &str) -> DemoResult<()> {
    let sim = CoreSimulator::new(SimulatorConfig::new().program(program).image(image));
    tracing::info!("10 + 20 = {}", sim.run(CoreOp::Add, 10, 20)?);
    tracing::info!("5 * 7 = {}", sim.run(CoreOp::Mul, 5, 7)?);
    Ok(())
}
