//! rasterm-parser - escape-sequence framing and classification
//!
//! The interpreter feeds runes through three small layers:
//! 1. [`sequence_end`] delimits the escape sequence starting at `ESC`,
//!    or reports that more input is needed (the tail gets buffered).
//! 2. [`classify`] names the complete sequence (CSI, OSC, charset
//!    designation, the private graphics protocol, ...).
//! 3. [`Args`] parses semicolon-separated numeric parameters with
//!    per-operation defaults.
//!
//! The framer is chunk-boundary safe: feeding a sequence one rune at a
//! time produces the same single dispatch as feeding it whole.

mod args;
mod framer;
mod sequence;

pub use args::{split_params, Args};
pub use framer::{sequence_end, trim_st, BEL, ESC};
pub use sequence::{classify, Sequence};
