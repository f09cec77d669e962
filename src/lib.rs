//! Online monitoring of Spatio-Temporal Quality Logic (STQL) formulas over
//! streams of perception data.
//!
//! STQL is a temporal first-order logic over frames of detections: each
//! frame carries objects with a class, a detection confidence, and a
//! bounding box. Formulas quantify over the objects of a frame, freeze the
//! current timestamp or frame number for metric bounds, reason about the
//! past and the future with temporal operators, and about screen-space
//! layout through a spatial region algebra with open/closed boundaries.
//!
//! The crate is organized along the monitoring pipeline:
//!
//! - [`datastream`] — the perception stream model fed by the host,
//! - [`ast`] — formula construction (factories, builder DSL, printing),
//! - [`analysis`] — frame-buffer requirements and monitorability,
//! - [`spatial`] — the region algebra backing spatial expressions,
//! - [`eval`] — boolean evaluation of a formula against a frame window,
//! - [`monitor`] — the online driver maintaining the sliding buffers.
//!
//! ```
//! use stql_monitor::ast::{class_of, Expr, Pin, TimeVar, C_TIME};
//! use stql_monitor::datastream::{BoundingBox, Frame, Object};
//! use stql_monitor::Monitor;
//!
//! // Within the last 2 seconds, some object of class 1 was seen.
//! let seen = Expr::exists(vec!["x"], class_of("x").eq(1)).unwrap();
//! let phi = Pin::time("t")
//!     .dot(Expr::sometimes((TimeVar::new("t") - C_TIME).le(2.0) & seen));
//!
//! let mut monitor = Monitor::new(phi, 1.0).unwrap();
//! let frame = Frame::new(0.0, 0, 1920.0, 1080.0).with_object(
//!     "obj_1",
//!     Object {
//!         class: 1,
//!         probability: 0.97,
//!         bbox: BoundingBox::new(100.0, 200.0, 50.0, 150.0),
//!     },
//! );
//! monitor.evaluate(frame).unwrap();
//! ```

#![deny(unsafe_code)] // disallow unsafe code by default
#![forbid(unused_must_use)] // disallow discarding errors

pub mod analysis;
pub mod ast;
pub mod datastream;
mod error;
pub mod eval;
pub mod iter;
pub mod monitor;
pub mod spatial;

pub use crate::analysis::{is_past_time, requirements, Bound, Requirements};
pub use crate::error::Error;
pub use crate::monitor::{Monitor, MonitorConfig, Verdict, WarmUpPolicy};
