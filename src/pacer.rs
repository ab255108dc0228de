//! Pacing between emitted records.
//!
//! Typing-paced streams pause after every word and line break. The pause goes
//! through [`Pacer`] so tests can observe the requested delays without
//! sleeping; see [`RecordingPacer`](crate::testing::RecordingPacer).

use std::time::Duration;

pub trait Pacer: Send {
    /// Block until `delay` has elapsed. Called once per emitted record; never
    /// batched or skipped.
    fn pause(&mut self, delay: Duration);
}

/// Sleeps the current thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct SleepPacer;

impl Pacer for SleepPacer {
    fn pause(&mut self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

impl<P: Pacer + ?Sized> Pacer for Box<P> {
    fn pause(&mut self, delay: Duration) {
        (**self).pause(delay);
    }
}
