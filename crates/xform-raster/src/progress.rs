//! Progress line protocol.
//!
//! The invoking server reads single lines from the error channel:
//! `ATTR: name=value` updates a job attribute, `STATE: [+|-]keyword,...`
//! adjusts printer-state-reasons. Anything else is free-form logging.

use std::fmt::Display;
use std::io::{self, Write};

pub struct Reporter {
    out: Box<dyn Write + Send>,
}

impl Default for Reporter {
    fn default() -> Self {
        Reporter::stderr()
    }
}

impl Reporter {
    pub fn stderr() -> Reporter {
        Reporter {
            out: Box::new(io::stderr()),
        }
    }

    pub fn from_writer(out: Box<dyn Write + Send>) -> Reporter {
        Reporter { out }
    }

    /// `ATTR: name=value`
    pub fn attr(&mut self, name: &str, value: impl Display) {
        let _ = writeln!(self.out, "ATTR: {name}={value}");
    }

    /// `STATE: +keyword` — add a printer-state-reason.
    pub fn state_add(&mut self, keyword: &str) {
        let _ = writeln!(self.out, "STATE: +{keyword}");
    }

    /// `STATE: -keyword` — remove a printer-state-reason.
    pub fn state_remove(&mut self, keyword: &str) {
        let _ = writeln!(self.out, "STATE: -{keyword}");
    }
}
