//! # Seqwave Sequential-Logic Simulator
//!
//! A cycle-based waveform simulator for latches, flip-flops and small
//! counters. Given a device and a tape of per-cycle input vectors, the
//! engine derives a clock from cycle parity, applies the device's transition
//! rule on the configured edge (or on every cycle for level-sensitive
//! latches) and samples every signal twice per cycle for plotting.
//!
//! ## Design Principles
//!
//! - **Pure engine**: `engine::run` is a deterministic function of device,
//!   tape and clock settings; it holds no state between runs.
//! - **Devices as data**: a device is a descriptor carrying its signal names
//!   and a transition closure, tagged latch or edge-triggered.
//! - **Explicit session state**: tape edits, clock settings, playback and
//!   the view window live on a `Session` that recomputes on every change.
//!
//! ## Features
//!
//! - `parallel` - Run batches of simulations on the rayon thread pool
//!
//! ## Quick Start
//!
//! ```rust
//! use seqwave::{create_default_catalog, engine, Bit, ClockConfig, InputTape};
//!
//! let catalog = create_default_catalog();
//! let jk = catalog.get("jk-flip-flop-pe").unwrap();
//!
//! // Hold J=K=1: the output toggles on every rising edge
//! let mut tape = InputTape::for_device(jk, 4);
//! for cycle in 0..4 {
//!     tape.set(cycle, "J", Bit::High).unwrap();
//!     tape.set(cycle, "K", Bit::High).unwrap();
//! }
//!
//! let wave = engine::run(jk, tape.cycles(), ClockConfig::default()).unwrap();
//! let q: Vec<u8> = wave.states_after_cycles().map(|s| s.level("Q").into()).collect();
//! assert_eq!(q, vec![0, 1, 1, 0]);
//! println!("{}", wave.render_text());
//! ```
//!
//! ## Interactive Sessions
//!
//! ```rust
//! use std::sync::Arc;
//! use seqwave::{create_default_catalog, Session, SessionCommand};
//!
//! let mut session = Session::new(Arc::new(create_default_catalog()), "t-flip-flop-pe").unwrap();
//! session.apply(&SessionCommand::Toggle { cycle: 1, input: "T".into() }).unwrap();
//! session.apply(&SessionCommand::ZoomIn).unwrap();
//! assert!(session.visible().len() < session.waveform().len());
//! ```
//!
//! ## Configuration-Driven Setup
//!
//! ```rust,ignore
//! use seqwave::{Session, SimConfig};
//!
//! let config = SimConfig::from_file("session.yaml")?;
//! seqwave::init_logging(&config.simulation.log_level);
//! let session = Session::from_config(&config)?;
//! ```

pub mod types;
pub mod signal;
pub mod device;
pub mod catalog;
pub mod clock;
pub mod engine;
pub mod waveform;
pub mod tape;
pub mod view;
pub mod session;
pub mod player;
pub mod batch;
pub mod config;

// Re-export commonly used types
pub use types::{Bit, CycleIndex, SampleTime};
pub use signal::SignalVector;
pub use device::{DeviceCategory, DeviceDescriptor, DeviceKind, Transition};
pub use catalog::{create_default_catalog, DeviceCatalog, KMap, ReferenceTable};
pub use clock::{ClockConfig, ClockPhase, ClockPolarity};
pub use engine::{SimError, SimResult};
pub use waveform::{RunStats, SamplePoint, SignalTrace, Waveform};
pub use tape::{InputTape, TapeError};
pub use view::{PanDirection, ViewWindow};
pub use session::{Session, SessionCommand, SessionError};
pub use player::{AutoAdvance, SharedSession};
pub use batch::{run_batch, BatchJob};
pub use config::{ConfigError, SimConfig, SimConfigBuilder};

/// Initialize the tracing subscriber for logging.
///
/// Call this at the start of your program to enable logging. `RUST_LOG`
/// takes precedence over `level`.
///
/// # Example
///
/// ```rust,ignore
/// seqwave::init_logging("debug");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
