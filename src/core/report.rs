use serde::Serialize;

use super::engine::{compute, ranked_impacts};
use super::format::{format_currency, format_number, format_percent};
use super::types::{Assumptions, DerivedResult, ImpactEntry, SubModel};

const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    pub label: &'static str,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
    pub highlight: bool,
}

impl ResultRow {
    fn plain(label: &'static str, value: String) -> Self {
        Self {
            label,
            value,
            note: None,
            highlight: false,
        }
    }

    fn noted(label: &'static str, value: String, note: &'static str) -> Self {
        Self {
            note: Some(note),
            ..Self::plain(label, value)
        }
    }

    fn highlighted(label: &'static str, value: String) -> Self {
        Self {
            highlight: true,
            ..Self::plain(label, value)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubModelReport {
    pub sub_model: SubModel,
    pub title: &'static str,
    pub agent: &'static str,
    pub headline_label: &'static str,
    pub headline: String,
    pub rows: Vec<ResultRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub total_annual_impact: String,
    pub conversion_rate: ResultRow,
    pub sub_models: Vec<SubModelReport>,
    pub ranked: Vec<ImpactEntry>,
}

/// Everything an estimate produces, in one serializable bundle.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateOutput {
    pub assumptions: Assumptions,
    pub results: DerivedResult,
    pub ranked: Vec<ImpactEntry>,
    pub formatted: Report,
}

impl EstimateOutput {
    pub fn new(assumptions: Assumptions) -> Self {
        let results = compute(&assumptions);
        let formatted = build_report(&assumptions, &results);
        Self {
            assumptions,
            results,
            ranked: formatted.ranked.clone(),
            formatted,
        }
    }
}

pub fn build_report(assumptions: &Assumptions, result: &DerivedResult) -> Report {
    Report {
        total_annual_impact: format_currency(result.total_annual_impact),
        conversion_rate: ResultRow {
            label: "Current Conversion Rate",
            value: format_percent(result.conversion_rate, 1),
            note: Some("Admissions / Inbound Calls"),
            highlight: true,
        },
        sub_models: SubModel::ALL
            .iter()
            .map(|&sub_model| sub_model_report(sub_model, assumptions, result))
            .collect(),
        ranked: ranked_impacts(result),
    }
}

fn sub_model_report(
    sub_model: SubModel,
    assumptions: &Assumptions,
    result: &DerivedResult,
) -> SubModelReport {
    let rows = match sub_model {
        SubModel::MissedCalls => vec![
            ResultRow::plain("Missed/Abandoned Calls", format_number(result.missed_calls, 0)),
            ResultRow::plain(
                "Recoverable Admissions",
                format_number(result.ella_add_admissions, 1),
            ),
            ResultRow::highlighted("Monthly Revenue", format_currency(result.ella_monthly_revenue)),
        ],
        SubModel::OutboundLostOpportunity => vec![
            ResultRow::noted(
                "Total Calls",
                format_number(result.juliana_total_calls, 0),
                "From Global Assumptions",
            ),
            ResultRow::plain(
                "# of Qualified Opportunities",
                format_number(result.qualified_opportunities, 0),
            ),
            ResultRow::noted(
                "Admissions",
                format_number(assumptions.monthly_admissions, 0),
                "From Global Assumptions",
            ),
            ResultRow::plain(
                "# of Lost Opportunities",
                format_number(result.lost_opportunities, 0),
            ),
            ResultRow::noted(
                "Outbound Calls by Juliana",
                format_number(result.juliana_calls_handled, 0),
                "Lost Opps × 4",
            ),
            ResultRow::plain(
                "# of Additional Admits",
                format_number(result.juliana_add_admissions, 1),
            ),
            ResultRow::highlighted(
                "Additional Monthly Revenue",
                format_currency(result.juliana_monthly_revenue),
            ),
        ],
        SubModel::AlumniReadmission => vec![
            ResultRow::plain("Total Alumni", format_number(assumptions.alumni_database_size, 0)),
            ResultRow::noted(
                "Outbound Calls",
                format_number(result.sophy_outbound_calls, 0),
                "Alumni × 4",
            ),
            ResultRow::plain(
                "Contacts per Month",
                format_number(assumptions.alumni_contacts_per_month, 0),
            ),
            ResultRow::plain(
                "Additional Admissions",
                format_number(result.sophy_add_admissions, 1),
            ),
            ResultRow::highlighted(
                "Monthly Cash Flow",
                format_currency(result.sophy_monthly_revenue),
            ),
        ],
        SubModel::Assessments => vec![
            ResultRow::plain(
                "Assessments Handled",
                format_number(result.connie_assessments_handled, 0),
            ),
            ResultRow::plain("FTE Hours Saved", format_number(result.fte_hours_saved, 1)),
            ResultRow::plain("Hourly Rate", format_currency(assumptions.hourly_rate)),
        ],
    };

    SubModelReport {
        sub_model,
        title: sub_model.title(),
        agent: sub_model.agent(),
        headline_label: if sub_model.is_savings() {
            "Annual Savings"
        } else {
            "Annual Impact"
        },
        headline: format_currency(sub_model.annual_value(result)),
        rows,
    }
}

pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Total Annual Impact: {}\n",
        report.total_annual_impact
    ));
    push_row(&mut out, &report.conversion_rate);

    out.push_str("\nProjected Annual Impact\n");
    let max_value = report
        .ranked
        .iter()
        .map(|entry| entry.value)
        .fold(0.0_f64, f64::max);
    let name_width = report
        .ranked
        .iter()
        .map(|entry| entry.name.chars().count())
        .max()
        .unwrap_or(0);
    let bar_width = BAR_WIDTH;
    for entry in &report.ranked {
        let filled = if max_value > 0.0 && entry.value > 0.0 {
            ((entry.value / max_value) * bar_width as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "  {:<name_width$}  {:<bar_width$}  {}\n",
            entry.name,
            "#".repeat(filled.min(bar_width)),
            format_currency(entry.value),
        ));
    }

    for sub in &report.sub_models {
        out.push_str(&format!(
            "\n{} ({}): {} {}\n",
            sub.title, sub.agent, sub.headline_label, sub.headline
        ));
        for row in &sub.rows {
            push_row(&mut out, row);
        }
    }
    out
}

fn push_row(out: &mut String, row: &ResultRow) {
    let marker = if row.highlight { '*' } else { ' ' };
    match row.note {
        Some(note) => out.push_str(&format!(
            " {marker} {:<30} {:>14}  ({note})\n",
            row.label, row.value
        )),
        None => out.push_str(&format!(" {marker} {:<30} {:>14}\n", row.label, row.value)),
    }
}
