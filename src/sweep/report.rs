//! Ordered results of one sweep operation and their text rendering.

use alloy::primitives::utils::format_units;
use alloy::primitives::U256;

use crate::sweep::outcome::{SweepKind, SweepOutcome};

/// Append-only, ordered outcomes of one operation over the account list.
#[derive(Debug)]
pub struct SweepReport {
    kind: SweepKind,
    outcomes: Vec<SweepOutcome>,
}

/// Counts over a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportSummary {
    pub submitted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total_swept: U256,
}

impl SweepReport {
    pub fn new(kind: SweepKind) -> Self {
        Self {
            kind,
            outcomes: Vec::new(),
        }
    }

    pub fn kind(&self) -> SweepKind {
        self.kind
    }

    /// Append the next account's outcome.
    pub fn push(&mut self, outcome: SweepOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[SweepOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn summary(&self) -> ReportSummary {
        self.outcomes
            .iter()
            .fold(ReportSummary::default(), |mut acc, outcome| {
                if outcome.is_success() {
                    acc.submitted += 1;
                    acc.total_swept = acc
                        .total_swept
                        .saturating_add(outcome.amount.unwrap_or_default());
                } else if outcome.is_skipped() {
                    acc.skipped += 1;
                } else {
                    acc.failed += 1;
                }
                acc
            })
    }

    /// One line per outcome plus a summary line.
    ///
    /// `decimals` adds a human-scaled amount next to the raw integer.
    pub fn render(&self, decimals: Option<u8>) -> Vec<String> {
        let mut lines: Vec<String> = self
            .outcomes
            .iter()
            .map(|outcome| render_outcome(self.kind, outcome, decimals))
            .collect();

        let summary = self.summary();
        lines.push(format!(
            "{} sweep: {} submitted, {} skipped, {} failed, total {}",
            self.kind.as_str(),
            summary.submitted,
            summary.skipped,
            summary.failed,
            format_amount(summary.total_swept, decimals)
        ));
        lines
    }
}

fn format_amount(amount: U256, decimals: Option<u8>) -> String {
    match decimals.and_then(|d| format_units(amount, d).ok()) {
        Some(scaled) => format!("{} ({})", amount, scaled),
        None => amount.to_string(),
    }
}

fn render_outcome(kind: SweepKind, outcome: &SweepOutcome, decimals: Option<u8>) -> String {
    let source = outcome
        .source
        .map(|a| a.to_string())
        .unwrap_or_else(|| format!("<key #{}>", outcome.account_index));

    match (&outcome.tx_hash, outcome.is_success()) {
        (Some(hash), true) => format!(
            "[{}] OK     {} -> {}, amount: {}",
            kind.as_str(),
            source,
            hash,
            format_amount(outcome.amount.unwrap_or_default(), decimals)
        ),
        _ => format!(
            "[{}] {:<6} {}, error: {}",
            kind.as_str(),
            if outcome.is_skipped() { "SKIP" } else { "FAILED" },
            source,
            outcome.error_detail().unwrap_or_default()
        ),
    }
}
