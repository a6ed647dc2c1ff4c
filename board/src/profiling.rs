use std::time::Duration;

use crate::widget::PaintStats;

/// Wall-clock time spent in each phase of one paint.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaintTimings {
    pub hud: Duration,
    pub squares: Duration,
    pub border: Duration,
    pub overlay: Duration,
    pub total: Duration,
}

/// Optional hook interface for capturing paint timings, e.g. from a window host or a benchmark.
pub trait Profiler {
    fn on_paint(&mut self, _frame: u64, _stats: &PaintStats, _timings: PaintTimings) {}
}
