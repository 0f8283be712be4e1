use std::collections::VecDeque;

/// Rolling frame-time average over the last `window` frames.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    samples: VecDeque<f32>,
    window: usize,
    total: f32,
    elapsed: f64,
    frames: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(120)
    }
}

impl FrameTimer {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            samples: VecDeque::with_capacity(window),
            window,
            total: 0.0,
            elapsed: 0.0,
            frames: 0,
        }
    }

    /// Record one frame's duration in seconds.
    pub fn record(&mut self, dt: f32) {
        if self.samples.len() == self.window {
            if let Some(old) = self.samples.pop_front() {
                self.total -= old;
            }
        }
        self.samples.push_back(dt);
        self.total += dt;
        self.elapsed += f64::from(dt);
        self.frames += 1;
    }

    pub fn average_ms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.total / self.samples.len() as f32 * 1000.0
    }

    pub fn fps(&self) -> f32 {
        let ms = self.average_ms();
        if ms > 0.0 { 1000.0 / ms } else { 0.0 }
    }

    /// Seconds recorded since creation.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
