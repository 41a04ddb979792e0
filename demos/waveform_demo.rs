//! Waveform simulator walkthrough.
//!
//! Lists the built-in catalog, prints the reference tables of a JK
//! flip-flop, edits its input tape through session commands and renders the
//! resulting waveform. Finally a short auto-advance run rotates the tape
//! twice a second and prints each new trace.
//!
//! Pass a YAML or JSON session file as the first argument to start from a
//! scripted scenario instead.

use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;

use seqwave::{
    create_default_catalog, AutoAdvance, DeviceCategory, Session, SessionCommand, SimConfig,
    SimConfigBuilder,
};

const DEMO_DEVICE: &str = "jk-flip-flop-pe";
const PLAYBACK_MS: u64 = 500;
const PLAYBACK_TICKS: u64 = 4;

fn toggle(cycle: usize, input: &str) -> SessionCommand {
    SessionCommand::Toggle {
        cycle,
        input: input.to_string(),
    }
}

fn load_config() -> Result<SimConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => Ok(SimConfig::from_file(path)?),
        None => Ok(SimConfigBuilder::new()
            .playback_period_ms(PLAYBACK_MS)
            .device(DEMO_DEVICE)
            .command(toggle(0, "J"))
            .command(toggle(1, "J"))
            .command(toggle(3, "J"))
            .command(toggle(3, "K"))
            .command(toggle(5, "K"))
            .build()?),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    seqwave::init_logging(&config.simulation.log_level);

    let catalog = create_default_catalog();
    println!("Built-in devices:");
    for category in [
        DeviceCategory::Latch,
        DeviceCategory::FlipFlop,
        DeviceCategory::Counter,
    ] {
        for device in catalog.by_category(category) {
            println!("  {:<20} {}", device.id, device);
        }
    }
    let flip_flops: Vec<&str> = catalog.search("flip").map(|d| d.id.as_str()).collect();
    println!("Search \"flip\": {:?}\n", flip_flops);

    let session = Session::from_config(&config)?;
    let device = session.device();
    println!("== {} ==", device.name);
    println!("{}\n", device.description);
    println!("Characteristic table:\n{}", device.characteristic_table);
    println!("Excitation table:\n{}", device.excitation_table);
    println!("Equation: {}\n", device.characteristic_equation);

    let wave = session.waveform();
    println!("Clock: {}", session.clock().polarity);
    print!("{}", wave.render_text());
    println!("Stats: {}\n", wave.export_stats());

    let shared = Arc::new(Mutex::new(session));
    let period = shared.lock().period();
    let mut player = AutoAdvance::start(
        Arc::clone(&shared),
        Some(Box::new(|wave: &seqwave::Waveform| {
            println!("-- tick --");
            print!("{}", wave.render_text());
        })),
    )?;
    thread::sleep(period * PLAYBACK_TICKS as u32 + period / 2);
    player.stop();

    println!("\nPlayed {} ticks", player.ticks());
    Ok(())
}
