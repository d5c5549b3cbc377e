//! Output formatting module for oaistat
//!
//! This module provides formatters for displaying usage reports in different formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! Rows whose cost fell back to zero are always labeled, so an unrecognized
//! model never looks like free usage.
//!
//! # Examples
//!
//! ```no_run
//! use oaistat_terminal::output::get_formatter;
//! # fn example(report: &oaistat_core::aggregation_types::UsageReport) {
//! let formatter = get_formatter(false, true);
//! println!("{}", formatter.format_report(report));
//! # }
//! ```

use colored::Colorize;
use oaistat_core::aggregation_types::{ModelUsage, UsageReport};
use oaistat_core::types::PricingStatus;
use oaistat_pricing::snapshot::PricingSnapshot;
use prettytable::{Cell, Row, Table, format, row};
use serde_json::json;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a usage report: summary followed by per-model rows
    fn format_report(&self, report: &UsageReport) -> String;

    /// Format the active pricing snapshot
    fn format_pricing(&self, snapshot: &PricingSnapshot) -> String;
}

/// Table formatter for human-readable output
pub struct TableFormatter {
    /// Whether to color status labels
    pub color: bool,
}

impl TableFormatter {
    /// Create a new TableFormatter
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Format a number with thousands separators
    fn format_number(n: u64) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, ch) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(ch);
        }

        result.chars().rev().collect()
    }

    /// Format currency with dollar sign
    fn format_currency(amount: f64) -> String {
        format!("${amount:.2}")
    }

    /// Per-model costs are often fractions of a cent
    fn format_precise_currency(amount: f64) -> String {
        format!("${amount:.4}")
    }

    fn status_label(&self, status: PricingStatus) -> String {
        let label = match status {
            PricingStatus::Priced => return String::new(),
            PricingStatus::Unrecognized => "unrecognized",
            PricingStatus::NoRate => "no rate",
        };

        if !self.color {
            return label.to_string();
        }
        match status {
            PricingStatus::Unrecognized => label.yellow().to_string(),
            _ => label.red().to_string(),
        }
    }

    fn model_row(&self, usage: &ModelUsage) -> Row {
        row![
            usage.model.as_str(),
            r -> Self::format_number(usage.counters.requests),
            r -> Self::format_number(usage.counters.context_tokens),
            r -> Self::format_number(usage.counters.generated_tokens),
            r -> Self::format_precise_currency(usage.total_cost),
            r -> format!("{:.2}", usage.daily_average_calls),
            r -> Self::format_precise_currency(usage.daily_average_cost),
            r -> usage.active_days,
            self.status_label(usage.pricing_status)
        ]
    }
}

impl OutputFormatter for TableFormatter {
    fn format_report(&self, report: &UsageReport) -> String {
        let summary = &report.summary;
        let mut output = String::new();

        output.push_str(&format!("Total calls: {}\n", summary.total_calls));
        output.push_str(&format!(
            "Total cost: {}\n",
            Self::format_currency(summary.total_cost)
        ));
        output.push_str(&format!(
            "Daily average calls: {:.2}\n",
            summary.daily_average_calls
        ));
        output.push_str(&format!(
            "Daily average cost: {}\n",
            Self::format_currency(summary.daily_average_cost)
        ));
        output.push_str(&format!(
            "Period: {} to {} ({} days), prices as of {}\n",
            summary.span.start, summary.span.end, summary.active_days, report.pricing_version
        ));

        output.push_str("\nUsage by model:\n");

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

        table.set_titles(row![
            b -> "Model",
            b -> "Requests",
            b -> "Context",
            b -> "Generated",
            b -> "Cost",
            b -> "Calls/Day",
            b -> "Cost/Day",
            b -> "Days",
            b -> "Note"
        ]);

        for usage in &report.models {
            table.add_row(self.model_row(usage));
        }

        // Add separator
        table.add_row(Row::new(vec![Cell::new(""); 9]));

        table.add_row(row![
            b -> "TOTAL",
            b -> Self::format_number(summary.total_calls),
            "",
            "",
            b -> Self::format_precise_currency(summary.total_cost),
            b -> format!("{:.2}", summary.daily_average_calls),
            b -> Self::format_precise_currency(summary.daily_average_cost),
            b -> summary.active_days,
            ""
        ]);

        output.push_str(&table.to_string());

        let unpriced: Vec<_> = report
            .unpriced_models()
            .map(|m| m.model.as_str())
            .collect();
        if !unpriced.is_empty() {
            output.push_str(&format!(
                "\nNot priced by snapshot {} (counted at $0.00): {}\n",
                report.pricing_version,
                unpriced.join(", ")
            ));
        }

        output
    }

    fn format_pricing(&self, snapshot: &PricingSnapshot) -> String {
        let mut output = format!(
            "Pricing snapshot {} ({})\n\n",
            snapshot.version, snapshot.currency
        );

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "#",
            b -> "Matches",
            b -> "Model",
            b -> "Scheme",
            b -> "Input",
            b -> "Output"
        ]);

        let rate = |r: Option<f64>| r.map(|v| v.to_string()).unwrap_or_else(|| "-".into());

        for (index, rule) in snapshot.rules.iter().enumerate() {
            let mut matches = rule.all_of.join(" + ");
            if rule.case_insensitive {
                matches.push_str(" (any case)");
            }

            let (scheme, input, output) = match snapshot.models.get(&rule.model) {
                Some(rates) => (rates.scheme.to_string(), rate(rates.input), rate(rates.output)),
                None => (self.status_label(PricingStatus::NoRate), "-".into(), "-".into()),
            };

            table.add_row(row![
                r -> index + 1,
                matches,
                rule.model.as_str(),
                scheme,
                r -> input,
                r -> output
            ]);
        }

        table.add_row(row![
            "",
            "(anything else)",
            oaistat_core::types::NormalizedModel::OTHER,
            self.status_label(PricingStatus::Unrecognized),
            r -> "-",
            r -> "-"
        ]);

        output.push_str(&table.to_string());
        output
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &UsageReport) -> String {
        let summary = &report.summary;
        let output = json!({
            "pricing_version": report.pricing_version,
            "period": {
                "start": summary.span.start.to_string(),
                "end": summary.span.end.to_string(),
                "active_days": summary.active_days,
            },
            "summary": {
                "total_calls": summary.total_calls,
                "total_cost": summary.total_cost,
                "daily_average_calls": summary.daily_average_calls,
                "daily_average_cost": summary.daily_average_cost,
            },
            "models": report.models.iter().map(|m| json!({
                "model": m.model.as_str(),
                "requests": m.counters.requests,
                "context_tokens": m.counters.context_tokens,
                "generated_tokens": m.counters.generated_tokens,
                "characters": m.counters.characters,
                "seconds": m.counters.seconds,
                "total_cost": m.total_cost,
                "pricing_status": m.pricing_status,
                "first_date": m.span.start.to_string(),
                "last_date": m.span.end.to_string(),
                "active_days": m.active_days,
                "daily_average_calls": m.daily_average_calls,
                "daily_average_cost": m.daily_average_cost,
            })).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&output).unwrap_or_default()
    }

    fn format_pricing(&self, snapshot: &PricingSnapshot) -> String {
        serde_json::to_string_pretty(snapshot).unwrap_or_default()
    }
}

/// Get the appropriate formatter based on output format
pub fn get_formatter(json: bool, color: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter::new(color))
    }
}
