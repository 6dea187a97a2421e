//! Small helpers with no pipeline state.

pub mod diff;
