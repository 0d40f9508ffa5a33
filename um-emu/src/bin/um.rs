use std::{
    fs::File,
    io::{self, BufReader, BufWriter},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use um_emu::{MachineConfig, OutputPolicy};

#[derive(Parser)]
#[clap(name = "um", about = "Runs a Universal Machine program image")]
struct Args {
    /// Path to the program image. Every 4 bytes, read big-endian, are one instruction.
    #[clap(value_name = "PROGRAM")]
    program: PathBuf,

    /// Write the low 8 bits of an out-of-range output value instead of failing.
    #[clap(long)]
    mask_output: bool,

    /// Fail the run once this many instructions have executed.
    #[clap(long, value_name = "NUM")]
    max_steps: Option<u64>,

    /// Log how many times each instruction ran.
    #[clap(long)]
    profile: bool,
}

fn init_logging(profile: bool) {
    let default_filter = if profile {
        "um=warn,um_emu=info"
    } else {
        "um=warn,um_emu=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> ExitCode {
    let Args {
        program,
        mask_output,
        max_steps,
        profile,
    } = Args::parse();

    init_logging(profile);

    let file = match File::open(&program) {
        Ok(file) => file,
        Err(e) => {
            error!("could not open {}: {e}", program.display());
            return ExitCode::from(2);
        },
    };

    let mut config = MachineConfig::default().with_profile(profile);
    if mask_output {
        config = config.with_output_policy(OutputPolicy::Truncate);
    }
    if let Some(limit) = max_steps {
        config = config.with_step_limit(limit);
    }

    let status = um_emu::run(
        BufReader::new(file),
        io::stdin().lock(),
        BufWriter::new(io::stdout().lock()),
        config,
    );
    ExitCode::from(status.code())
}
