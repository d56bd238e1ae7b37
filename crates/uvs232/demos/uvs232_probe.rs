//! UVS232 Probe Tool
//!
//! Talks to a UVS232 data logger and prints what it reports.
//!
//! Usage:
//!   cargo run --example uvs232_probe -- [OPTIONS] COMMAND
//!
//! Commands:
//!   version           Print the logger firmware version
//!   current           Print the current controller measurement
//!   read              Print every logged measurement
//!   clear             Delete the logged measurements
//!
//! Options:
//!   --port SPEC       Connection spec (default: "/dev/ttyUSB0 9600 n 8 1")
//!   --config FILE     Session timing as JSON
//!   --json            Print measurements as JSON lines
//!
//! Set RUST_LOG=uvs232=trace to see the raw frames.

use anyhow::{bail, Context, Result};
use uvs232::datalog::Measurement;
use uvs232::protocol::SessionConfig;
use uvs232::Uvs232;

const DEFAULT_PORT: &str = "/dev/ttyUSB0 9600 n 8 1";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("uvs232=info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut port = DEFAULT_PORT.to_string();
    let mut config = SessionConfig::default();
    let mut json = false;
    let mut command = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                i += 1;
                port = args.get(i).context("--port needs a value")?.clone();
            }
            "--config" | "-c" => {
                i += 1;
                let path = args.get(i).context("--config needs a value")?;
                config = SessionConfig::from_file(path)
                    .with_context(|| format!("failed to load config {}", path))?;
            }
            "--json" => {
                json = true;
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other if other.starts_with('-') => bail!("unknown option {}", other),
            other => command = Some(other.to_string()),
        }
        i += 1;
    }

    let Some(command) = command else {
        print_help();
        return Ok(());
    };

    let client = Uvs232::new().with_config(config);

    match command.as_str() {
        "version" => {
            let version = client.version(&port).await?;
            println!("{}", version);
        }
        "current" => {
            let measurement = client.current_data(&port).await?;
            print_measurement(&measurement, json)?;
        }
        "read" => {
            let measurements = client.read_data(&port).await?;
            for measurement in &measurements {
                print_measurement(measurement, json)?;
            }
            eprintln!("{} measurements", measurements.len());
        }
        "clear" => {
            client.clear_data(&port).await?;
            println!("log cleared");
        }
        other => bail!("unknown command {}", other),
    }

    Ok(())
}

fn print_measurement(m: &Measurement, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(m)?);
    } else {
        println!(
            "{}  T1 {:6.1}  T2 {:6.1}  T3 {:6.1}  T4 {:6.1}  out1 {}  out2 {}  speed {}",
            m.time.format("%Y-%m-%d %H:%M:%S"),
            m.temperature1,
            m.temperature2,
            m.temperature3,
            m.temperature4,
            u8::from(m.out1),
            u8::from(m.out2),
            m.rotation_speed
        );
    }
    Ok(())
}

fn print_help() {
    println!("UVS232 Probe Tool");
    println!();
    println!("Usage: uvs232_probe [OPTIONS] COMMAND");
    println!();
    println!("Commands:");
    println!("  version           Print the logger firmware version");
    println!("  current           Print the current controller measurement");
    println!("  read              Print every logged measurement");
    println!("  clear             Delete the logged measurements");
    println!();
    println!("Options:");
    println!("  --port, -p SPEC   Connection spec (default: \"{}\")", DEFAULT_PORT);
    println!("  --config, -c FILE Session timing as JSON");
    println!("  --json            Print measurements as JSON lines");
    println!("  --help, -h        Show this help");
}
