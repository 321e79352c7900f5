use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// To predict the duration of the next iteration based on the previous one.
// Assumes next iteration takes ~2x longer than the previous.
const NEXT_ITERATION_DURATION_FACTOR: f64 = 2.0;

/// Deadline and depth gate for one iterative-deepening run.
pub struct SearchController {
    start_time: Instant,
    time_limit: Option<Duration>,
    max_depth: u8,
    timer_handle: Option<thread::JoinHandle<()>>,
    cancel_timer: Option<Sender<()>>,
    on_stop_callback: Option<Arc<dyn Fn() + Send + Sync>>,
    last_iteration_duration: Option<Duration>,
    current_iteration_start: Option<Duration>,
}

impl SearchController {
    pub fn new(time_limit: Option<Duration>, max_depth: u8) -> Self {
        Self {
            start_time: Instant::now(),
            time_limit,
            max_depth,
            timer_handle: None,
            cancel_timer: None,
            on_stop_callback: None,
            last_iteration_duration: None,
            current_iteration_start: None,
        }
    }

    pub fn on_stop<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_stop_callback = Some(Arc::new(callback));
    }

    pub fn start_timer(&mut self) {
        let Some(limit) = self.time_limit else {
            return;
        };
        let Some(callback) = &self.on_stop_callback else {
            return;
        };

        let callback = Arc::clone(callback);
        let (sender, receiver) = mpsc::channel::<()>();

        // Dropping the sender wakes the thread without firing the callback
        let handle = thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = receiver.recv_timeout(limit) {
                callback();
            }
        });

        self.cancel_timer = Some(sender);
        self.timer_handle = Some(handle);
    }

    pub fn should_continue_to_next_depth(&self, next_depth: u8) -> bool {
        if next_depth > self.max_depth {
            return false;
        }

        // Always allow the first iteration so there is a move to report
        if self.last_iteration_duration.is_none() {
            return true;
        }

        if let Some(limit) = self.time_limit {
            let elapsed = self.elapsed();
            if elapsed >= limit {
                return false;
            }
            if let Some(estimate) = self.estimate_next_iteration_duration() {
                if elapsed.saturating_add(estimate) > limit {
                    return false;
                }
            }
        }

        true
    }

    fn estimate_next_iteration_duration(&self) -> Option<Duration> {
        let last = self.last_iteration_duration?;
        if last.is_zero() {
            return None;
        }
        Some(last.mul_f64(NEXT_ITERATION_DURATION_FACTOR))
    }

    /// Returns the total elapsed time since search started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn on_iteration_start(&mut self) {
        self.current_iteration_start = Some(self.elapsed());
    }

    pub fn on_iteration_complete(&mut self) {
        if let Some(start) = self.current_iteration_start {
            self.last_iteration_duration = Some(self.elapsed().saturating_sub(start));
        }
    }

    pub fn stop_timer(&mut self) {
        self.cancel_timer.take();
        if let Some(handle) = self.timer_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.stop_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_depth_gate() {
        let controller = SearchController::new(None, 4);
        assert!(controller.should_continue_to_next_depth(4));
        assert!(!controller.should_continue_to_next_depth(5));
    }

    #[test]
    fn test_timer_fires() {
        let stop = Arc::new(AtomicBool::new(false));
        let mut controller = SearchController::new(Some(Duration::from_millis(10)), 10);
        let flag = Arc::clone(&stop);
        controller.on_stop(move || flag.store(true, Ordering::Relaxed));
        controller.start_timer();

        thread::sleep(Duration::from_millis(200));
        assert!(stop.load(Ordering::Relaxed));
    }

    #[test]
    fn test_dropped_controller_cancels_timer() {
        let stop = Arc::new(AtomicBool::new(false));
        {
            let mut controller = SearchController::new(Some(Duration::from_secs(30)), 10);
            let flag = Arc::clone(&stop);
            controller.on_stop(move || flag.store(true, Ordering::Relaxed));
            controller.start_timer();
        }
        assert!(!stop.load(Ordering::Relaxed));
    }

    #[test]
    fn test_refuses_iteration_past_deadline() {
        let mut controller = SearchController::new(Some(Duration::from_millis(50)), 10);
        controller.on_iteration_start();
        thread::sleep(Duration::from_millis(30));
        controller.on_iteration_complete();

        // 30ms so far plus an estimated 60ms overruns the 50ms limit
        assert!(!controller.should_continue_to_next_depth(2));
    }
}
