// Pauses between motion steps
//
// The controller is deliberately blocking: while a move is pausing between
// steps, nothing else runs and the command link is not read.

use std::time::Duration;

pub trait StepScheduler {
    /// Suspend the caller for `duration` before the next step
    fn pause(&mut self, duration: Duration);
}

/// Sleeps the current thread
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockingScheduler;

impl StepScheduler for BlockingScheduler {
    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

impl<S: StepScheduler + ?Sized> StepScheduler for &mut S {
    fn pause(&mut self, duration: Duration) {
        (**self).pause(duration)
    }
}

/// Records requested pauses instead of sleeping
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingScheduler {
    pub pauses: Vec<Duration>,
}

#[cfg(test)]
impl RecordingScheduler {
    pub fn total(&self) -> Duration {
        self.pauses.iter().sum()
    }
}

#[cfg(test)]
impl StepScheduler for RecordingScheduler {
    fn pause(&mut self, duration: Duration) {
        self.pauses.push(duration);
    }
}
