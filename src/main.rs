//! Headless demo driver: microphone in, frame stats out.

use nebula_viz::{DrawOp, FrameScheduler, Visualizer};
use std::time::{Duration, Instant};

/// Minimal host scheduler: a pending flag drained by the run loop.
#[derive(Default)]
struct LoopScheduler {
    pending: bool,
}

impl FrameScheduler for LoopScheduler {
    fn request_frame(&mut self) {
        self.pending = true;
    }

    fn cancel_frame(&mut self) {
        self.pending = false;
    }
}

fn main() {
    env_logger::init();

    let mut viz = Visualizer::new(LoopScheduler::default());
    if let Err(e) = viz.start_microphone() {
        log::error!("{}", e);
        std::process::exit(1);
    }

    log::info!(
        "Visualizing {} - ctrl-c to quit",
        viz.title().unwrap_or("microphone")
    );

    let frame_budget = Duration::from_millis(16);
    let mut last_report = Instant::now();

    loop {
        let started = Instant::now();

        let frame = viz.tick();
        if frame.ops.is_empty() {
            log::warn!("Frame skipped");
        }

        if last_report.elapsed() >= Duration::from_secs(1) {
            let kicks = frame
                .ops
                .iter()
                .filter(|op| matches!(op, DrawOp::BarSegment { glow: true, .. }))
                .count();
            log::info!(
                "{} ops this frame{}",
                frame.ops.len(),
                if kicks > 0 { " (kick)" } else { "" }
            );
            last_report = Instant::now();
        }

        if let Some(remaining) = frame_budget.checked_sub(started.elapsed()) {
            std::thread::sleep(remaining);
        }
    }
}
