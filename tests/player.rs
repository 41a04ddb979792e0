//! Tests for the timed auto-advance driver.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use seqwave::{
    create_default_catalog, AutoAdvance, Bit, Session, SessionCommand, SharedSession, Waveform,
};

fn shared(device: &str) -> SharedSession {
    let mut session = Session::new(Arc::new(create_default_catalog()), device).unwrap();
    session.set_period(100).unwrap();
    Arc::new(Mutex::new(session))
}

#[test]
fn test_ticks_rotate_the_tape() {
    let session = shared("d-flip-flop-pe");
    session
        .lock()
        .apply(&SessionCommand::Toggle {
            cycle: 0,
            input: "D".to_string(),
        })
        .unwrap();

    let mut player = AutoAdvance::start(Arc::clone(&session), None).unwrap();
    assert!(player.is_running());
    thread::sleep(Duration::from_millis(350));
    player.stop();

    let ticks = player.ticks() as usize;
    assert!(ticks >= 1);
    assert!(!player.is_running());

    // the single high cycle moved `ticks` places towards the front (mod 8)
    let guard = session.lock();
    let position = (8 - ticks % 8) % 8;
    assert_eq!(guard.tape().get(position).unwrap().level("D"), Bit::High);
    assert_eq!(
        guard
            .tape()
            .cycles()
            .iter()
            .filter(|v| v.level("D") == Bit::High)
            .count(),
        1
    );
}

#[test]
fn test_observer_sees_every_tick() {
    let session = shared("t-flip-flop-pe");
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);

    let mut player = AutoAdvance::start(
        session,
        Some(Box::new(move |wave: &Waveform| {
            assert_eq!(wave.len(), 16);
            counter.fetch_add(1, Ordering::SeqCst);
        })),
    )
    .unwrap();

    thread::sleep(Duration::from_millis(350));
    player.stop();
    assert_eq!(seen.load(Ordering::SeqCst) as u64, player.ticks());
}

#[test]
fn test_stop_halts_ticking() {
    let session = shared("jk-flip-flop-pe");
    let mut player = AutoAdvance::start(Arc::clone(&session), None).unwrap();
    player.stop();

    let ticks = player.ticks();
    thread::sleep(Duration::from_millis(250));
    assert_eq!(player.ticks(), ticks);

    // stopping twice is harmless
    player.stop();
}

#[test]
fn test_drop_stops_player() {
    let session = shared("d-flip-flop-pe");
    {
        let _player = AutoAdvance::start(Arc::clone(&session), None).unwrap();
    }
    // the worker has exited and released its handle on the session
    assert_eq!(Arc::strong_count(&session), 1);
}

#[test]
fn test_edits_interleave_with_ticks() {
    let session = shared("d-flip-flop-pe");
    let _player = AutoAdvance::start(Arc::clone(&session), None).unwrap();

    for cycle in 0..8 {
        session
            .lock()
            .apply(&SessionCommand::Toggle {
                cycle,
                input: "D".to_string(),
            })
            .unwrap();
        thread::sleep(Duration::from_millis(30));
    }

    let guard = session.lock();
    assert_eq!(guard.waveform().len(), 16);
}

// ============================================================================
// Device change and reset
// ============================================================================

fn toggle(cycle: usize, input: &str) -> SessionCommand {
    SessionCommand::Toggle {
        cycle,
        input: input.to_string(),
    }
}

#[test]
fn test_select_device_stops_player() {
    let session = shared("d-flip-flop-pe");
    let player = AutoAdvance::start(Arc::clone(&session), None).unwrap();
    thread::sleep(Duration::from_millis(150));

    let ticks = {
        let mut guard = session.lock();
        guard
            .apply(&SessionCommand::SelectDevice {
                device: "t-flip-flop-pe".to_string(),
            })
            .unwrap();
        guard.apply(&toggle(0, "T")).unwrap();
        player.ticks()
    };
    thread::sleep(Duration::from_millis(350));

    assert_eq!(player.ticks(), ticks);
    assert!(!player.is_running());
    let guard = session.lock();
    assert_eq!(guard.tape().get(0).unwrap().level("T"), Bit::High);
}

#[test]
fn test_reset_stops_player() {
    let session = shared("jk-flip-flop-pe");
    let player = AutoAdvance::start(Arc::clone(&session), None).unwrap();
    thread::sleep(Duration::from_millis(150));

    let ticks = {
        let mut guard = session.lock();
        guard.apply(&SessionCommand::Reset).unwrap();
        guard.apply(&toggle(2, "J")).unwrap();
        player.ticks()
    };
    thread::sleep(Duration::from_millis(350));

    assert_eq!(player.ticks(), ticks);
    assert!(!player.is_running());
    let guard = session.lock();
    assert_eq!(guard.tape().get(2).unwrap().level("J"), Bit::High);
    assert_eq!(guard.tape().len(), 8);
}

#[test]
fn test_restart_after_reset() {
    let session = shared("d-flip-flop-pe");
    session.lock().apply(&SessionCommand::Reset).unwrap();

    let mut player = AutoAdvance::start(Arc::clone(&session), None).unwrap();
    thread::sleep(Duration::from_millis(250));
    assert!(player.is_running());
    player.stop();
    assert!(player.ticks() >= 1);
}
