//! Canonical event names for structured logging
//!
//! Every operation emits `start` then exactly one of `end` / `end_error`.

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
