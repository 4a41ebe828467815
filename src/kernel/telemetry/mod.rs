//! Session telemetry.
//!
//! # PRIVACY INVARIANT
//! Telemetry events must **NEVER** contain user content (text, audio).
//! Only kinds, counts and durations are recorded.
//!
//! Telemetry is read-only with respect to decisions: the reactor writes it,
//! nothing in the kernel reads it back.

pub mod event;
pub mod metrics;
pub mod recorder;
