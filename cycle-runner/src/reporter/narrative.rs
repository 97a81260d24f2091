// Copyright (c) The cycle-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The accumulating narrative summary: free-form lines plus an HTML table
//! with one row per iteration.

use crate::{classify::TestOutcome, helpers::plural};
use itertools::Itertools;
use std::time::Duration;
use swrite::{SWrite, swrite, swriteln};

#[derive(Debug)]
pub(super) struct NarrativeSummary {
    lines: Vec<String>,
    rows: Vec<HtmlRow>,
}

#[derive(Debug)]
struct HtmlRow {
    sequence: usize,
    name: String,
    duration: Duration,
    outcome: TestOutcome,
}

impl NarrativeSummary {
    pub(super) fn new() -> Self {
        Self {
            lines: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub(super) fn append_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub(super) fn push_row(
        &mut self,
        sequence: usize,
        name: &str,
        duration: Duration,
        outcome: TestOutcome,
    ) {
        self.rows.push(HtmlRow {
            sequence,
            name: name.to_owned(),
            duration,
            outcome,
        });
    }

    pub(super) fn render_html(&self, suite_name: &str) -> String {
        let case_count = self.rows.iter().map(|row| row.name.as_str()).unique().count();
        let iteration_count = self.rows.len();

        let mut out = String::new();
        swriteln!(out, "<html><body>");
        swriteln!(
            out,
            "<h2>{}: {} {}, {} {}</h2>",
            escape(suite_name),
            case_count,
            plural::test_cases_str(case_count),
            iteration_count,
            plural::iterations_str(iteration_count),
        );

        swriteln!(out, "<pre>");
        for line in &self.lines {
            swriteln!(out, "{}", escape(line));
        }
        swriteln!(out, "</pre>");

        swriteln!(out, "<table border=\"1\" cellpadding=\"4\">");
        swriteln!(
            out,
            "<tr><th>#</th><th>Test case</th><th>Duration</th><th>Result</th></tr>"
        );
        for row in &self.rows {
            swrite!(out, "<tr><td>{}</td>", row.sequence);
            swrite!(out, "<td>{}</td>", escape(&row.name));
            swrite!(out, "<td>{:.2}s</td>", row.duration.as_secs_f64());
            swriteln!(
                out,
                "<td><span style=\"color:#fff;background:{};padding:2px 6px\">{}</span></td></tr>",
                badge_color(row.outcome),
                row.outcome,
            );
        }
        swriteln!(out, "</table>");
        swriteln!(out, "</body></html>");
        out
    }
}

fn badge_color(outcome: TestOutcome) -> &'static str {
    match outcome {
        TestOutcome::Passed => "#2e7d32",
        TestOutcome::Failed => "#c62828",
        TestOutcome::Aborted => "#ef6c00",
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
