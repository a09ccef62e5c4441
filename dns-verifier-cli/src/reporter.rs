//! Rendering of check outcomes and the final summary.

use std::io::{self, Write};

use dns_verifier_core::{CheckOutcome, RunReport};
use serde::Serialize;

/// Receives outcomes as they complete and the summary at the end.
pub trait Reporter {
    fn outcome(&mut self, outcome: &CheckOutcome) -> io::Result<()>;

    fn finish(&mut self, report: &RunReport) -> io::Result<()>;
}

/// Progress dots on `out`, failure lines and the failure summary on `err`.
pub struct TextReporter<O, E> {
    out: O,
    err: E,
}

impl<O: Write, E: Write> TextReporter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }
}

impl<O: Write, E: Write> Reporter for TextReporter<O, E> {
    fn outcome(&mut self, outcome: &CheckOutcome) -> io::Result<()> {
        match outcome.reason() {
            None => {
                self.out.write_all(b".")?;
                self.out.flush()
            }
            Some(reason) => writeln!(
                self.err,
                "\n{} {} (at {}): {reason}",
                outcome.record_type(),
                outcome.name(),
                outcome.nameserver()
            ),
        }
    }

    fn finish(&mut self, report: &RunReport) -> io::Result<()> {
        if report.all_passed() {
            writeln!(self.out, "\nAll checks passed")?;
            self.out.flush()
        } else {
            self.out.flush()?;
            writeln!(
                self.err,
                "\n{} of {} checks failed",
                report.failed(),
                report.total()
            )
        }
    }
}

/// One JSON object per line on `out`.
pub struct JsonReporter<O> {
    out: O,
}

impl<O: Write> JsonReporter<O> {
    pub fn new(out: O) -> Self {
        Self { out }
    }

    fn line<T: Serialize>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, value)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeLine<'a> {
    #[serde(flatten)]
    outcome: &'a CheckOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    total: usize,
    failed: usize,
    passed: bool,
    elapsed_ms: u128,
}

impl<O: Write> Reporter for JsonReporter<O> {
    fn outcome(&mut self, outcome: &CheckOutcome) -> io::Result<()> {
        self.line(&OutcomeLine {
            outcome,
            message: outcome.reason().map(ToString::to_string),
        })
    }

    fn finish(&mut self, report: &RunReport) -> io::Result<()> {
        self.line(&Summary {
            total: report.total(),
            failed: report.failed(),
            passed: report.all_passed(),
            elapsed_ms: report.elapsed.as_millis(),
        })
    }
}
