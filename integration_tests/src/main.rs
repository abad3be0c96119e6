//! Hardware tests for the micro:bit UART bridge.
//!
//! Flash the device with a UART echo program, then run against it over BLE.


use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use log::LevelFilter;
use tokio::task::LocalSet;

use microbit_uart_bridge::ble::btle::BtleTransport;
use microbit_uart_bridge::ble::{ConnectionProfile, ProfileSelection};
use microbit_uart_bridge::{debug, BridgeConfig, InboundMode, UartBridge};

use tests::{print_results, run_all_tests, Harness};

#[derive(Parser)]
#[command(name = "hardware-tests")]
#[command(about = "Hardware tests for the micro:bit UART bridge")]
struct Args {
    /// Device profile: microbit, nordic or auto
    #[arg(short, long, default_value = "auto")]
    profile: String,

    /// BLE device name prefix
    #[arg(short, long, default_value = "BBC micro:bit")]
    name: String,

    /// BLE scan timeout in seconds
    #[arg(long, default_value = "10")]
    scan_timeout: u64,

    /// Print link diagnostics
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    debug::init(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });

    let selection = match args.profile.as_str() {
        "auto" => ProfileSelection::default(),
        name => ConnectionProfile::by_name(name)
            .map(ProfileSelection::Fixed)
            .ok_or_else(|| anyhow::anyhow!("Unknown profile '{}'", name))?,
    };

    println!("{}", "micro:bit UART Hardware Tests".bold());
    println!("Device: \"{}\" ({})", args.name, args.profile);
    println!();

    let transport = BtleTransport::new(Duration::from_secs(args.scan_timeout)).await;
    let bridge = Rc::new(UartBridge::new(
        transport,
        BridgeConfig {
            selection,
            inbound_mode: InboundMode::Lines,
            name_prefix: Some(args.name.clone()),
        },
    ));

    println!("Connecting...");
    bridge.connect().await?;
    let profile = bridge
        .profile()
        .map(|p| p.name)
        .unwrap_or("unknown");
    println!("{} ({} profile)", "Connected!".green(), profile);
    if !bridge.notifications_enabled() {
        anyhow::bail!("Device did not accept notifications, echo tests cannot run");
    }

    let local = LocalSet::new();
    let failed = local
        .run_until(async move {
            let events = tokio::task::spawn_local({
                let bridge = bridge.clone();
                async move { bridge.run_events().await }
            });

            // Give the echo program a moment after connection
            tokio::time::sleep(Duration::from_millis(500)).await;

            println!("\nRunning tests...\n");
            let mut harness = Harness::new(bridge);
            let results = run_all_tests(&mut harness).await;
            print_results(&results);

            events.abort();
            results.iter().filter(|r| !r.passed).count()
        })
        .await;

    // Exit with error code if any tests failed
    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
