use clap::{Parser, Subcommand};
use std::time::Duration;
use teleinfo_rs::constants::{DEFAULT_DEVICE, DEFAULT_THROTTLE_SECS, TIC_BAUD_RATE};
use teleinfo_rs::teleinfo::labels::LABELS;
use teleinfo_rs::teleinfo::serial::open_blocking;
use teleinfo_rs::{
    init_logger, start_store, BlockingLineSource, Frame, SerialConfig, ThrottledReader,
};

#[derive(Parser)]
#[command(name = "teleinfo-cli")]
#[command(about = "CLI tool for the Teleinfo (TIC) meter protocol")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream frames continuously and print each new one
    Watch {
        #[arg(default_value = DEFAULT_DEVICE)]
        device: String,
        #[arg(short, long, default_value_t = TIC_BAUD_RATE)]
        baudrate: u32,
    },
    /// Perform one throttled pull-mode fetch
    Fetch {
        #[arg(default_value = DEFAULT_DEVICE)]
        device: String,
        #[arg(short, long, default_value_t = DEFAULT_THROTTLE_SECS)]
        window: u64,
    },
    /// List the known labels with their display metadata
    Labels,
}

fn print_frame(frame: &Frame) {
    let mut fields: Vec<(&str, &str)> = frame.iter().collect();
    fields.sort_unstable();
    for (label, value) in fields {
        println!("{label:<12} {value}");
    }
    println!();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let cli = Cli::parse();
    match cli.command {
        Commands::Watch { device, baudrate } => {
            let config = SerialConfig {
                device,
                baudrate,
                ..SerialConfig::default()
            };
            let store = start_store(&config)?;

            let mut last: Option<Frame> = None;
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        store.stop();
                        break;
                    }
                    _ = tokio::time::sleep(Duration::from_secs(1)) => {
                        let current = store.current_frame();
                        if current.is_some() && current != last {
                            if let Some(frame) = &current {
                                print_frame(frame);
                            }
                            last = current;
                        }
                    }
                }
            }
        }
        Commands::Fetch { device, window } => {
            let config = SerialConfig {
                device,
                ..SerialConfig::default()
            };
            let port = open_blocking(&config)?;
            let source = BlockingLineSource::new(std::io::BufReader::new(port));
            let mut reader = ThrottledReader::new(source, Duration::from_secs(window));
            if let Some(frame) = reader.fetch()? {
                print_frame(frame);
            }
        }
        Commands::Labels => {
            for info in LABELS {
                println!("{:<12} {:<32} {}", info.label, info.name, info.unit);
            }
        }
    }

    Ok(())
}
