// Copyright (c) James Kassemi, SC, US. All rights reserved.
use core_types::types::format_percentage;
use core_types::{ActionKey, Poll};
use poll_engine::{ActionReport, EngineView};
use std::fmt::Write;

pub fn poll_line(poll: &Poll, view: &EngineView) -> String {
    let busy = if view.poll_busy(poll.index) {
        " (pending)"
    } else {
        ""
    };
    format!(
        "#{} {} [{}] {} votes across {} candidates{busy}",
        poll.index,
        poll.title,
        poll.status_label(),
        poll.total_votes(),
        poll.candidates.len()
    )
}

/// Candidates ranked by votes; the bracketed number is the index to pass to `vote`.
pub fn poll_detail(poll: &Poll, view: &EngineView) -> String {
    let total = poll.total_votes();
    let mut out = poll_line(poll, view);
    for candidate in poll.ranked() {
        let marker = if view.is_pending(&ActionKey::vote(poll.index, candidate.index)) {
            "  voting..."
        } else {
            ""
        };
        let _ = write!(
            out,
            "\n  [{}] {:<20} {:>6} {:>7}{marker}",
            candidate.index,
            candidate.name,
            candidate.votes,
            format_percentage(candidate.percentage_of(total))
        );
    }
    out
}

pub fn report_line(report: &ActionReport) -> String {
    let mut line = format!(
        "{} confirmed: tx {} in block {}",
        report.key, report.tx_hash, report.block_number
    );
    match report.snapshot_generation {
        Some(generation) => {
            let _ = write!(line, " (snapshot generation {generation})");
        }
        None => line.push_str(" (reload failed)"),
    }
    line
}

pub fn header(view: &EngineView) -> String {
    let account = view
        .account
        .map(|account| account.short())
        .unwrap_or_else(|| "not connected".to_string());
    let mut out = format!("wallet: {account}; {} polls", view.polls().len());
    if let Some(error) = &view.error {
        let _ = write!(out, "\nerror: {error}");
    }
    out
}
