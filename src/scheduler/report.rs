//! Delivery history reporting.
//!
//! Projects the scheduler's processed history into tabular rows —
//! optionally filtered by class, sorted by priority score (default) or
//! wait time, both descending — and renders them as CSV with columns
//! `ID,Type,Priority,WaitTime(min),ServiceTime(min)`.
//!
//! Pure over its input: building a report never mutates scheduler state,
//! and rendering writes into an in-memory buffer the caller disposes of.

use std::cmp::Ordering;

use serde::Serialize;
use thiserror::Error;

use crate::models::{Delivery, DeliveryClass};

/// Errors from report rendering.
#[derive(Debug, Error)]
pub enum ReportError {
    /// CSV serialization failure.
    #[error("failed to render csv: {0}")]
    Csv(#[from] csv::Error),
    /// Buffer flush failure.
    #[error("failed to render csv: {0}")]
    Io(#[from] std::io::Error),
    /// Rendered bytes were not valid UTF-8.
    #[error("report rendering produced invalid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Sort criterion for report rows. Both orders are descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportSort {
    /// Highest priority score first (default).
    #[default]
    PriorityScore,
    /// Longest wait first.
    WaitTime,
}

/// Report shaping options.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Restrict rows to one class. `None` includes every class.
    pub class_filter: Option<DeliveryClass>,
    /// Row ordering.
    pub sort: ReportSort,
}

impl ReportOptions {
    /// Default options: every class, priority-score order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the report to one class.
    pub fn with_class(mut self, class: DeliveryClass) -> Self {
        self.class_filter = Some(class);
        self
    }

    /// Sets the row ordering.
    pub fn sorted_by(mut self, sort: ReportSort) -> Self {
        self.sort = sort;
        self
    }
}

/// One row of the delivery report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    /// Delivery identifier.
    pub id: String,
    /// Delivery class.
    pub class: DeliveryClass,
    /// Score at completion time.
    pub priority_score: f64,
    /// Minutes between entry and service start.
    pub wait_min: i64,
    /// Minutes spent in service.
    pub service_min: i64,
}

/// A shaped view over the processed history.
#[derive(Debug, Clone)]
pub struct DeliveryReport {
    rows: Vec<ReportRow>,
}

impl DeliveryReport {
    /// Builds a report from the processed history.
    ///
    /// Records without both service timestamps are skipped; the scheduler
    /// stamps both before appending, so none are expected.
    pub fn from_history(history: &[Delivery], options: &ReportOptions) -> Self {
        let mut rows: Vec<ReportRow> = history
            .iter()
            .filter(|d| options.class_filter.map_or(true, |class| d.class == class))
            .filter_map(|d| {
                let wait_min = d.service_wait_minutes()?;
                let service_min = d.service_minutes()?;
                Some(ReportRow {
                    id: d.id.clone(),
                    class: d.class,
                    priority_score: d.priority_score,
                    wait_min,
                    service_min,
                })
            })
            .collect();

        match options.sort {
            ReportSort::WaitTime => rows.sort_by(|a, b| b.wait_min.cmp(&a.wait_min)),
            ReportSort::PriorityScore => rows.sort_by(|a, b| {
                b.priority_score
                    .partial_cmp(&a.priority_score)
                    .unwrap_or(Ordering::Equal)
            }),
        }

        Self { rows }
    }

    /// The shaped rows.
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Renders the report as a CSV table.
    ///
    /// Header: `ID,Type,Priority,WaitTime(min),ServiceTime(min)`.
    /// Priority scores are formatted to two decimals.
    pub fn to_csv(&self) -> Result<String, ReportError> {
        let mut buf = Vec::new();
        {
            let mut writer = csv::Writer::from_writer(&mut buf);
            writer.write_record(["ID", "Type", "Priority", "WaitTime(min)", "ServiceTime(min)"])?;
            for row in &self.rows {
                let priority = format!("{:.2}", row.priority_score);
                let wait = row.wait_min.to_string();
                let service = row.service_min.to_string();
                writer.write_record([
                    row.id.as_str(),
                    row.class.label(),
                    priority.as_str(),
                    wait.as_str(),
                    service.as_str(),
                ])?;
            }
            writer.flush()?;
        }
        Ok(String::from_utf8(buf)?)
    }
}
