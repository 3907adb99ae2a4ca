use std::time::{Duration, Instant};

/// Wall-clock timer started on creation. Nothing happens when it is dropped.
#[derive(Debug, Clone, Copy)]
pub struct DurationTimer {
    started_at: Instant,
}

impl DurationTimer {
    pub fn start() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_grows_monotonically() {
        let timer = DurationTimer::start();
        let first = timer.elapsed_secs();
        std::thread::sleep(Duration::from_millis(5));
        let second = timer.elapsed_secs();

        assert!(first >= 0.0);
        assert!(second >= first + 0.004);
    }
}
