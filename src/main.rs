//! Line terminal over the micro:bit BLE UART service.
//!
//! Reads stdin line by line and sends each line to the device; prints
//! whatever the device notifies back.

use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use log::LevelFilter;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::LocalSet;

use microbit_uart_bridge::ble::btle::BtleTransport;
use microbit_uart_bridge::ble::{ConnectionProfile, ProfileSelection};
use microbit_uart_bridge::{config, debug, BridgeConfig, InboundMode, UartBridge};

#[derive(Parser)]
#[command(name = "microbit-uart")]
#[command(about = "Line terminal over the micro:bit BLE UART service")]
struct Args {
    /// Device profile: microbit, nordic or auto (try both)
    #[arg(short, long, default_value = "auto")]
    profile: String,

    /// Advertised name prefix to connect to
    #[arg(short, long, default_value = config::ble::DEFAULT_NAME_PREFIX)]
    name: String,

    /// BLE scan timeout in seconds
    #[arg(long, default_value_t = config::ble::SCAN_TIMEOUT_MS / 1000)]
    scan_timeout: u64,

    /// Reassemble notifications into complete lines
    #[arg(long)]
    lines: bool,

    /// Print link diagnostics
    #[arg(short, long)]
    verbose: bool,
}

fn parse_selection(profile: &str) -> anyhow::Result<ProfileSelection> {
    if profile == "auto" {
        return Ok(ProfileSelection::default());
    }
    ConnectionProfile::by_name(profile)
        .map(ProfileSelection::Fixed)
        .ok_or_else(|| anyhow::anyhow!("Unknown profile '{}' (expected microbit, nordic or auto)", profile))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    debug::init(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });

    let config = BridgeConfig {
        selection: parse_selection(&args.profile)?,
        inbound_mode: if args.lines {
            InboundMode::Lines
        } else {
            InboundMode::Raw
        },
        name_prefix: Some(args.name.clone()),
    };

    println!("{}", "micro:bit UART terminal".bold());
    println!("Profile: {}", args.profile);
    println!("Scanning for \"{}\"...", args.name);

    let transport = BtleTransport::new(Duration::from_secs(args.scan_timeout)).await;
    let bridge = Rc::new(UartBridge::new(transport, config));

    bridge.on_connected(|| println!("{}", "Connected!".green()));
    bridge.on_disconnected(|| println!("{}", "Disconnected".yellow()));
    bridge.on_alert(|message| eprintln!("{}", message.red().bold()));

    let lines = args.lines;
    bridge.on_data_received(move |text| {
        if lines {
            println!("{}", text.cyan());
        } else {
            print!("{}", text.cyan());
            std::io::stdout().flush().ok();
        }
    });

    // The alert observer already printed the reason
    if bridge.connect().await.is_err() {
        std::process::exit(1);
    }

    let local = LocalSet::new();
    local
        .run_until(async move {
            let mut events = tokio::task::spawn_local({
                let bridge = bridge.clone();
                async move { bridge.run_events().await }
            });

            let mut stdin = BufReader::new(tokio::io::stdin()).lines();

            loop {
                tokio::select! {
                    line = stdin.next_line() => match line? {
                        Some(line) => bridge.send_or_log(&line).await,
                        None => break,
                    },
                    _ = &mut events => {
                        // Device went away, nothing left to write to
                        return Ok(());
                    }
                }
            }

            bridge.disconnect().await;
            Ok::<(), anyhow::Error>(())
        })
        .await
}
