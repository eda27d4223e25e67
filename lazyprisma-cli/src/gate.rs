//! Single-command gate and spinner ticker
//!
//! At most one long-running external command is admitted process-wide. The
//! gate is a compare-and-swap flag with a published name for display and a
//! frame counter the frontend turns into a spinner glyph.

use crate::events::UiEvent;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Spinner glyphs, one per frame index
pub const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

/// Default tick interval
pub const SPINNER_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Process-wide one-command-at-a-time admission control
#[derive(Debug, Default)]
pub struct CommandGate {
    running: AtomicBool,
    name: Mutex<String>,
    frame: AtomicU8,
}

impl CommandGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to admit a command. Returns false when one is already running.
    pub fn try_start(&self, name: &str) -> bool {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            *self.name.lock().unwrap() = name.to_string();
            self.frame.store(0, Ordering::SeqCst);
            true
        } else {
            false
        }
    }

    /// Release the gate
    pub fn finish(&self) {
        self.name.lock().unwrap().clear();
        self.running.store(false, Ordering::SeqCst);
        self.frame.store(0, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Name of the currently running command (empty when idle)
    pub fn running_name(&self) -> String {
        self.name.lock().unwrap().clone()
    }

    pub fn frame_index(&self) -> u8 {
        self.frame.load(Ordering::SeqCst)
    }

    /// The spinner glyph for the current frame
    pub fn frame_char(&self) -> char {
        SPINNER_FRAMES[self.frame_index() as usize % SPINNER_FRAMES.len()]
    }

    /// Advance the frame counter (wraps at the frame count)
    pub fn advance_frame(&self) {
        let next = (self.frame_index() + 1) % SPINNER_FRAMES.len() as u8;
        self.frame.store(next, Ordering::SeqCst);
    }

    /// `(running, name, frame)` in one call
    pub fn status(&self) -> (bool, String, u8) {
        (self.is_running(), self.running_name(), self.frame_index())
    }
}

/// Background task advancing the spinner frame while a command runs
pub struct SpinnerTicker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SpinnerTicker {
    /// Start ticking. Each tick advances the frame and emits [`UiEvent::Tick`]
    /// only while the gate reports a running command.
    pub fn start(
        gate: Arc<CommandGate>,
        interval: Duration,
        events: UnboundedSender<UiEvent>,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if stop_flag.load(Ordering::SeqCst) {
                    return;
                }
                if gate.is_running() {
                    gate.advance_frame();
                    if events.send(UiEvent::Tick).is_err() {
                        return;
                    }
                }
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Signal the ticker to stop and wait for it
    pub async fn stop(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_start_admits_exactly_one() {
        let gate = CommandGate::new();
        assert!(gate.try_start("Refresh"));
        assert!(!gate.try_start("Deploy"));
        assert!(!gate.try_start("Refresh"));
        assert_eq!(gate.running_name(), "Refresh");
    }

    #[test]
    fn finish_releases_and_resets() {
        let gate = CommandGate::new();
        assert!(gate.try_start("Deploy"));
        gate.advance_frame();
        gate.finish();

        let (running, name, frame) = gate.status();
        assert!(!running);
        assert!(name.is_empty());
        assert_eq!(frame, 0);
        assert!(gate.try_start("Next"));
    }

    #[test]
    fn frames_wrap_around() {
        let gate = CommandGate::new();
        for _ in 0..SPINNER_FRAMES.len() {
            gate.advance_frame();
        }
        assert_eq!(gate.frame_index(), 0);
        assert_eq!(gate.frame_char(), '|');
    }

    #[test]
    fn concurrent_try_start_admits_only_one() {
        let gate = Arc::new(CommandGate::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let gate = gate.clone();
                std::thread::spawn(move || gate.try_start(&format!("worker-{i}")))
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|&won| won)
            .count();
        assert_eq!(admitted, 1);
    }

    #[test]
    fn overlapping_windows_never_double_admit() {
        // Two threads race try_start while one holds the gate; after finish,
        // exactly one subsequent call wins
        let gate = Arc::new(CommandGate::new());
        assert!(gate.try_start("A"));

        let g1 = gate.clone();
        let g2 = gate.clone();
        let t1 = std::thread::spawn(move || g1.try_start("B"));
        let t2 = std::thread::spawn(move || g2.try_start("C"));
        assert!(!t1.join().unwrap());
        assert!(!t2.join().unwrap());

        gate.finish();

        let g1 = gate.clone();
        let g2 = gate.clone();
        let t1 = std::thread::spawn(move || g1.try_start("B"));
        let t2 = std::thread::spawn(move || g2.try_start("C"));
        let wins = [t1.join().unwrap(), t2.join().unwrap()];
        assert_eq!(wins.iter().filter(|&&w| w).count(), 1);
    }

    #[tokio::test]
    async fn ticker_advances_only_while_running() {
        let gate = Arc::new(CommandGate::new());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let ticker = SpinnerTicker::start(gate.clone(), Duration::from_millis(5), tx);

        // Idle: no ticks
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(gate.frame_index(), 0);

        // Running: frames advance and ticks arrive
        gate.try_start("Deploy");
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_ok());

        gate.finish();
        ticker.stop().await;
    }
}
