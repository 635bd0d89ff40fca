//! OSC dispatch
//!
//! Operating system commands: window title, default-color queries, and
//! the two-byte `ESC ] R` palette reset. Everything else is logged and
//! dropped.

use std::io::Write;

use log::debug;

use rasterm_core::Property;
use rasterm_parser::{trim_st, Args};

use crate::term::Term;

impl Term {
    pub(crate) fn handle_osc(&mut self, body: &[char]) {
        let body = trim_st(body);
        if body.is_empty() {
            return;
        }

        if body == ['R'] {
            self.colors.reset_palette();
            return;
        }

        let args = Args::parse(body, 0);
        match args.first_or(0) {
            0 => {
                let payload = payload_after_command(body);
                self.config
                    .properties
                    .insert(Property::WindowTitle, payload);
                self.config_changed();
            }
            n @ (10 | 11) => {
                let c = if n == 10 {
                    self.attr_default.fg
                } else {
                    self.attr_default.bg
                };
                let _ = write!(
                    self.output,
                    "\x1b]{};rgb:{:02x}/{:02x}/{:02x}\x1b\\",
                    n, c.r, c.g, c.b
                );
            }
            other => {
                let body: String = body.iter().collect();
                debug!("unhandled OSC {}: {:?}", other, body);
            }
        }
    }
}

/// Everything after the first `;`, or empty when there is none.
fn payload_after_command(body: &[char]) -> String {
    match body.iter().position(|&c| c == ';') {
        Some(i) => body[i + 1..].iter().collect(),
        None => String::new(),
    }
}
