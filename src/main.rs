use std::fs;
use std::path::PathBuf;

use breadboard_emu::console::run_console;
use breadboard_emu::system_config::MachineConfig;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Gate-level simulator of a 74LS-series breadboard computer", long_about = None)]
struct Args {
    /// Assembly source to run. Without it the config's program (or the demo) runs.
    #[arg(value_name = "PROGRAM")]
    program: Option<PathBuf>,
    /// JSON machine config.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Open the interactive terminal console instead of running to HLT.
    #[arg(long)]
    console: bool,
    /// Instruction limit for batch runs; overrides the config.
    #[arg(long)]
    max_steps: Option<u64>,
    /// Print the final machine state as JSON.
    #[arg(long)]
    dump_state: bool,
    /// Log filter, e.g. `info` or `breadboard_emu=debug`.
    #[arg(long, default_value = "info")]
    log: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_new(&args.log).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = match &args.config {
        Some(path) => MachineConfig::from_json_file(path)?,
        None => MachineConfig::default(),
    };
    if let Some(path) = &args.program {
        let source = fs::read_to_string(path)?;
        config.program = source.lines().map(str::to_string).collect();
        config.name = path.display().to_string();
    }
    if let Some(max_steps) = args.max_steps {
        config.max_steps = max_steps;
    }

    info!(name = %config.name, "building machine");
    let mut computer = config.build()?;
    computer.boot()?;

    let computer = if args.console {
        run_console(computer, config.console.clone())?
    } else {
        if let Err(e) = computer.run(config.max_steps) {
            error!(error = %e, "simulation stopped");
            return Err(e.into());
        }
        computer
    };

    for value in computer.outputs() {
        println!("OUT: {}", value);
    }
    if !computer.is_halted() {
        println!("(no HLT within {} steps)", config.max_steps);
    }

    if args.dump_state {
        println!("{}", serde_json::to_string_pretty(&computer.state()?)?);
    }

    Ok(())
}
