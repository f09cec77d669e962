//! The online monitor: sliding frame buffers plus the per-frame driver.
//!
//! A [`Monitor`] owns a compiled formula and one buffer of frames sized by
//! the [requirements analysis](crate::analysis): `history` past frames, the
//! current frame, and `horizon` future frames. Each call to
//! [`Monitor::evaluate`] appends the newest frame, rotates the buffer, and —
//! once enough context has been collected — evaluates the formula at the
//! frame sitting `horizon` positions before the tail.
//!
//! Only a finite *horizon* is required for online monitoring: with an
//! unbounded horizon no verdict could ever be emitted, so construction
//! rejects such formulas. An unbounded *history* is served by retaining
//! every frame seen so far (memory then grows with the stream).
//!
//! Until the required context has been collected once, the monitor is
//! *warming up* and reports a conservative verdict chosen by
//! [`MonitorConfig`].
//!
//! A monitor is single-threaded; run one monitor per thread. The formula
//! handle itself is immutable and can be shared across monitors.

use std::collections::VecDeque;

use crate::analysis::{is_past_time, requirements, Bound, Requirements};
use crate::ast::Expr;
use crate::datastream::Frame;
use crate::eval::evaluate;
use crate::Error;

/// Tri-state outcome of one monitoring step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    SatisfiedForSure,
    ViolatedForSure,
    /// Not enough frames buffered yet to decide.
    Unknown,
}

/// What to report while the buffers are still filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmUpPolicy {
    /// Conservatively report `ViolatedForSure` (the default).
    Violated,
    /// Report `Unknown` and let the host decide.
    Unknown,
}

#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    /// Frames per second of the stream; used to translate time bounds into
    /// frame counts.
    pub fps: f64,
    pub warm_up: WarmUpPolicy,
}

impl Default for MonitorConfig {
    fn default() -> MonitorConfig {
        MonitorConfig { fps: 1.0, warm_up: WarmUpPolicy::Violated }
    }
}

/// Online monitor for one STQL formula over one stream.
#[derive(Debug)]
pub struct Monitor {
    formula: Expr,
    requirements: Requirements,
    history: Bound,
    horizon_frames: usize,
    warm_up: WarmUpPolicy,
    buffer: VecDeque<Frame>,
}

impl Monitor {
    /// Creates a monitor for `formula` over a stream running at `fps`.
    ///
    /// Fails with [`Error::Unmonitorable`] when the formula has an
    /// unbounded future horizon.
    pub fn new(formula: Expr, fps: f64) -> Result<Monitor, Error> {
        Monitor::with_config(formula, MonitorConfig { fps, ..MonitorConfig::default() })
    }

    pub fn with_config(formula: Expr, config: MonitorConfig) -> Result<Monitor, Error> {
        let requirements = requirements(&formula, config.fps);
        let horizon_frames = match requirements.horizon.as_finite() {
            Some(horizon) => horizon,
            None => {
                return Err(Error::Unmonitorable {
                    history: requirements.history,
                    horizon: requirements.horizon,
                })
            }
        };
        // A past-time formula never looks ahead; the symmetric window a
        // metric bound reports for the future direction is vacuous, and
        // dropping it keeps the verdict aligned with the newest frame.
        let horizon_frames = if is_past_time(&formula) { 0 } else { horizon_frames };
        let history = requirements.history;

        log::debug!(
            "monitor for {}: {} history frame(s), {} horizon frame(s)",
            formula,
            history,
            horizon_frames
        );
        let buffer = match history {
            Bound::Bounded(frames) => VecDeque::with_capacity(frames + 1 + horizon_frames),
            Bound::Unbounded => VecDeque::new(),
        };
        Ok(Monitor {
            formula,
            requirements,
            history,
            horizon_frames,
            warm_up: config.warm_up,
            buffer,
        })
    }

    /// The buffer requirements computed for the formula.
    pub fn requirements(&self) -> &Requirements {
        &self.requirements
    }

    /// Past frames kept around the evaluation point. `Unbounded` means the
    /// whole stream prefix is retained.
    pub fn history_frames(&self) -> Bound {
        self.history
    }

    /// Future frames buffered ahead of the evaluation point; always finite
    /// once construction has succeeded.
    pub fn horizon_frames(&self) -> usize {
        self.horizon_frames
    }

    /// Enough context to evaluate: a full bounded window, or at least the
    /// current frame when the history side is unbounded.
    fn ready(&self) -> bool {
        match self.history {
            Bound::Bounded(frames) => self.buffer.len() == frames + 1 + self.horizon_frames,
            Bound::Unbounded => self.buffer.len() > self.horizon_frames,
        }
    }

    /// Feeds the next frame and reports whether the formula is satisfied at
    /// the current evaluation point. Warm-up maps to `false`.
    ///
    /// Frames must arrive with non-decreasing frame numbers; a frame whose
    /// number equals the buffered tail replaces it.
    pub fn evaluate(&mut self, frame: Frame) -> Result<bool, Error> {
        Ok(self.evaluate_verdict(frame)? == Verdict::SatisfiedForSure)
    }

    /// Like [`Monitor::evaluate`], with the tri-state verdict surfaced.
    pub fn evaluate_verdict(&mut self, frame: Frame) -> Result<Verdict, Error> {
        if let Some(tail_num) = self.buffer.back().map(|tail| tail.frame_num) {
            if frame.frame_num < tail_num {
                return Err(Error::OutOfOrderFrame { last: tail_num, got: frame.frame_num });
            }
            if frame.frame_num == tail_num {
                self.buffer.pop_back();
            }
        }
        self.buffer.push_back(frame);
        if let Bound::Bounded(frames) = self.history {
            let capacity = frames + 1 + self.horizon_frames;
            while self.buffer.len() > capacity {
                self.buffer.pop_front();
            }
        }

        if !self.ready() {
            log::debug!("warm-up: {} frame(s) buffered", self.buffer.len());
            return Ok(match self.warm_up {
                WarmUpPolicy::Violated => Verdict::ViolatedForSure,
                WarmUpPolicy::Unknown => Verdict::Unknown,
            });
        }

        let current = self.buffer.len() - 1 - self.horizon_frames;
        let frames = self.buffer.make_contiguous();
        if evaluate(&self.formula, frames, current) {
            Ok(Verdict::SatisfiedForSure)
        } else {
            Ok(Verdict::ViolatedForSure)
        }
    }
}
