//! Interactive simulation session.
//!
//! A `Session` owns everything a front end edits: the selected device, its
//! input tape, the clock settings, the playback period and the view window.
//! It also caches the waveform of the current state. Every command that
//! changes the tape, the device or the clock recomputes that waveform, so
//! `waveform()` always matches what the engine would produce right now.
//!
//! Commands are plain data (`SessionCommand`) and can be scripted from a
//! configuration file.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::catalog::{create_default_catalog, DeviceCatalog};
use crate::clock::{ClockConfig, ClockPolarity};
use crate::config::SimConfig;
use crate::device::DeviceDescriptor;
use crate::engine::{self, SimError};
use crate::tape::{InputTape, TapeError, DEFAULT_CYCLES};
use crate::types::{Bit, CycleIndex};
use crate::view::{PanDirection, ViewWindow};
use crate::waveform::{SamplePoint, Waveform};

/// Shortest playback period.
pub const MIN_PERIOD_MS: u64 = 100;
/// Longest playback period.
pub const MAX_PERIOD_MS: u64 = 2000;
/// Playback period granularity.
pub const PERIOD_STEP_MS: u64 = 100;
pub const DEFAULT_PERIOD_MS: u64 = 1000;

/// Device used when a configuration does not name one.
pub const DEFAULT_DEVICE: &str = "d-flip-flop-pe";

/// Errors raised by session commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("unknown device: {0}")]
    UnknownDevice(String),

    #[error("tape edit failed: {0}")]
    Tape(#[from] TapeError),

    #[error("simulation failed: {0}")]
    Simulation(#[from] SimError),

    #[error("invalid playback period {0} ms (expected 100..=2000 in steps of 100)")]
    InvalidPeriod(u64),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// True when `ms` is an accepted playback period.
pub fn is_valid_period(ms: u64) -> bool {
    (MIN_PERIOD_MS..=MAX_PERIOD_MS).contains(&ms) && ms % PERIOD_STEP_MS == 0
}

/// A scripted edit to a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SessionCommand {
    /// Switch device and restore all defaults; stops auto-advance
    SelectDevice { device: String },
    Toggle { cycle: CycleIndex, input: String },
    Set {
        cycle: CycleIndex,
        input: String,
        value: Bit,
    },
    AddCycle,
    RemoveCycle { cycle: CycleIndex },
    /// Ignored by latches, which update on every cycle
    SetPolarity { polarity: ClockPolarity },
    /// Ignored by latches, which update on every cycle
    SetClockEnabled { enabled: bool },
    SetPeriod { period_ms: u64 },
    /// Restore the defaults of the current device; stops auto-advance
    Reset,
    /// Move the first cycle to the end (one playback step)
    Rotate,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    Pan { direction: PanDirection },
}

/// Application state around one device.
#[derive(Debug)]
pub struct Session {
    catalog: Arc<DeviceCatalog>,
    device: DeviceDescriptor,
    tape: InputTape,
    clock: ClockConfig,
    period_ms: u64,
    view: ViewWindow,
    initial_cycles: usize,
    /// Bumped whenever the device is (re)selected or the session reset
    generation: u64,
    waveform: Waveform,
}

impl Session {
    /// Opens a session on `device_id` with a default-length tape.
    pub fn new(catalog: Arc<DeviceCatalog>, device_id: &str) -> SessionResult<Self> {
        Self::with_cycles(catalog, device_id, DEFAULT_CYCLES)
    }

    /// Opens a session whose fresh tapes have `cycles` cycles.
    pub fn with_cycles(
        catalog: Arc<DeviceCatalog>,
        device_id: &str,
        cycles: usize,
    ) -> SessionResult<Self> {
        let device = catalog
            .get(device_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownDevice(device_id.to_string()))?;
        let initial_cycles = cycles.max(1);
        let tape = InputTape::for_device(&device, initial_cycles);
        let clock = ClockConfig::for_device(&device);
        let waveform = engine::run(&device, tape.cycles(), clock)?;

        tracing::debug!(device = %device.id, cycles = initial_cycles, "session opened");

        Ok(Self {
            catalog,
            view: ViewWindow::full(tape.len()),
            device,
            tape,
            clock,
            period_ms: DEFAULT_PERIOD_MS,
            initial_cycles,
            generation: 0,
            waveform,
        })
    }

    /// Builds a session from a configuration, using the built-in catalog.
    ///
    /// The scenario's clock settings and tape are applied on top of the
    /// device defaults, then its commands are replayed in order.
    pub fn from_config(config: &SimConfig) -> SessionResult<Self> {
        let catalog = Arc::new(create_default_catalog());
        let device_id = config
            .scenario
            .as_ref()
            .and_then(|s| s.device.as_deref())
            .unwrap_or(DEFAULT_DEVICE);

        let mut session =
            Self::with_cycles(catalog, device_id, config.simulation.initial_cycles)?;
        session.set_period(config.simulation.playback_period_ms)?;

        if let Some(scenario) = &config.scenario {
            if let Some(polarity) = scenario.polarity {
                session.clock.polarity = polarity;
            }
            if let Some(enabled) = scenario.clock_enabled {
                session.clock.enabled = enabled;
            }
            if let Some(vectors) = &scenario.tape {
                session.tape = InputTape::from_vectors(&session.device, vectors.clone());
                session.view.reset(session.tape.len());
            }
            session.recompute()?;
            session.apply_all(&scenario.commands)?;
        }

        Ok(session)
    }

    pub fn catalog(&self) -> &DeviceCatalog {
        &self.catalog
    }

    pub fn device(&self) -> &DeviceDescriptor {
        &self.device
    }

    pub fn tape(&self) -> &InputTape {
        &self.tape
    }

    pub fn clock(&self) -> ClockConfig {
        self.clock
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn view(&self) -> ViewWindow {
        self.view
    }

    /// Counter of device selections and resets since the session opened.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The waveform of the current state.
    pub fn waveform(&self) -> &Waveform {
        &self.waveform
    }

    /// The samples inside the view window.
    pub fn visible(&self) -> &[SamplePoint] {
        self.view.visible(&self.waveform)
    }

    /// Applies one command.
    pub fn apply(&mut self, command: &SessionCommand) -> SessionResult<()> {
        tracing::debug!(?command, device = %self.device.id, "applying session command");

        match command {
            SessionCommand::SelectDevice { device } => return self.select_device(device),
            SessionCommand::Toggle { cycle, input } => {
                self.tape.toggle(*cycle, input)?;
            }
            SessionCommand::Set {
                cycle,
                input,
                value,
            } => {
                self.tape.set(*cycle, input, *value)?;
            }
            SessionCommand::AddCycle => {
                self.tape.append_cycle();
                self.view.reset(self.tape.len());
            }
            SessionCommand::RemoveCycle { cycle } => {
                self.tape.remove_cycle(*cycle)?;
                self.view.reset(self.tape.len());
            }
            SessionCommand::SetPolarity { polarity } => self.clock.polarity = *polarity,
            SessionCommand::SetClockEnabled { enabled } => self.clock.enabled = *enabled,
            SessionCommand::SetPeriod { period_ms } => return self.set_period(*period_ms),
            SessionCommand::Reset => {
                self.restore_defaults();
            }
            SessionCommand::Rotate => self.tape.rotate(),
            SessionCommand::ZoomIn => {
                self.view.zoom_in();
                return Ok(());
            }
            SessionCommand::ZoomOut => {
                self.view.zoom_out(self.tape.len());
                return Ok(());
            }
            SessionCommand::ResetZoom => {
                self.view.reset(self.tape.len());
                return Ok(());
            }
            SessionCommand::Pan { direction } => {
                self.view.pan(*direction, self.tape.len());
                return Ok(());
            }
        }

        self.recompute()
    }

    /// Applies commands in order, stopping at the first failure.
    pub fn apply_all(&mut self, commands: &[SessionCommand]) -> SessionResult<()> {
        commands.iter().try_for_each(|c| self.apply(c))
    }

    /// Switches to another catalog device and restores all defaults.
    pub fn select_device(&mut self, device_id: &str) -> SessionResult<()> {
        let device = self
            .catalog
            .get(device_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownDevice(device_id.to_string()))?;
        self.device = device;
        self.restore_defaults();
        self.recompute()
    }

    /// Sets the playback period.
    pub fn set_period(&mut self, period_ms: u64) -> SessionResult<()> {
        if !is_valid_period(period_ms) {
            return Err(SessionError::InvalidPeriod(period_ms));
        }
        self.period_ms = period_ms;
        Ok(())
    }

    /// One playback step: rotate the tape and recompute.
    pub fn advance(&mut self) -> SessionResult<&Waveform> {
        self.tape.rotate();
        self.recompute()?;
        Ok(&self.waveform)
    }

    fn restore_defaults(&mut self) {
        self.generation += 1;
        self.tape.reset(&self.device, self.initial_cycles);
        self.clock = ClockConfig::for_device(&self.device);
        self.view.reset(self.tape.len());
    }

    fn recompute(&mut self) -> SessionResult<()> {
        self.waveform = engine::run(&self.device, self.tape.cycles(), self.clock)?;
        Ok(())
    }
}
