//! Input boundary: field catalogue, percent scaling and lenient parsing.
//!
//! Percentage fields are edited as whole percents ("10") and stored as
//! fractions (`0.1`). All scaling happens here so the formulas in
//! [`super::engine`] only ever see fractions.

use serde::Serialize;

use super::types::{Assumptions, SubModel};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AssumptionField {
    MonthlyInboundCalls,
    MonthlyAdmissions,
    AvgNetPatientRevenue,
    MissedCallRate,
    QualifiedOpportunitiesPercent,
    LostOpportunityConversionRate,
    AlumniDatabaseSize,
    AlumniContactsPerMonth,
    AlumniConversionRate,
    AnnualAssessments,
    MinutesPerAssessment,
    AssessmentsHandledRate,
    HourlyRate,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub field: AssumptionField,
    pub key: &'static str,
    pub label: &'static str,
    pub note: Option<&'static str>,
    /// `None` for the shared global assumptions.
    pub group: Option<SubModel>,
    pub percentage: bool,
    pub step: f64,
}

const fn spec(
    field: AssumptionField,
    key: &'static str,
    label: &'static str,
    note: Option<&'static str>,
    group: Option<SubModel>,
    percentage: bool,
    step: f64,
) -> FieldSpec {
    FieldSpec {
        field,
        key,
        label,
        note,
        group,
        percentage,
        step,
    }
}

/// Every editable field, in page order.
pub static FIELDS: [FieldSpec; 13] = [
    spec(
        AssumptionField::MonthlyInboundCalls,
        "monthlyInboundCalls",
        "Monthly Inbound Calls",
        None,
        None,
        false,
        1.0,
    ),
    spec(
        AssumptionField::MonthlyAdmissions,
        "monthlyAdmissions",
        "Monthly Admissions",
        None,
        None,
        false,
        1.0,
    ),
    spec(
        AssumptionField::AvgNetPatientRevenue,
        "avgNetPatientRevenue",
        "Avg. Net Patient Revenue",
        None,
        None,
        false,
        1.0,
    ),
    spec(
        AssumptionField::MissedCallRate,
        "missedCallRate",
        "Missed/Abandoned Rate",
        Some("Industry avg: 10-30%"),
        Some(SubModel::MissedCalls),
        true,
        0.01,
    ),
    spec(
        AssumptionField::QualifiedOpportunitiesPercent,
        "qualifiedOpportunitiesPercent",
        "Qualified Opportunities %",
        None,
        Some(SubModel::OutboundLostOpportunity),
        true,
        0.01,
    ),
    spec(
        AssumptionField::LostOpportunityConversionRate,
        "lostOpportunityConversionRate",
        "Conversion Rate",
        Some("0.6% of lost opps"),
        Some(SubModel::OutboundLostOpportunity),
        true,
        0.001,
    ),
    spec(
        AssumptionField::AlumniDatabaseSize,
        "alumniDatabaseSize",
        "Total Alumni",
        None,
        Some(SubModel::AlumniReadmission),
        false,
        1.0,
    ),
    spec(
        AssumptionField::AlumniContactsPerMonth,
        "alumniContactsPerMonth",
        "Contacts per Month",
        None,
        Some(SubModel::AlumniReadmission),
        false,
        1.0,
    ),
    spec(
        AssumptionField::AlumniConversionRate,
        "alumniConversionRate",
        "Conversion Rate",
        Some("5 admits per 1000 alumni = 0.5%"),
        Some(SubModel::AlumniReadmission),
        true,
        0.001,
    ),
    spec(
        AssumptionField::AnnualAssessments,
        "annualAssessments",
        "Annual Assessments",
        None,
        Some(SubModel::Assessments),
        false,
        1.0,
    ),
    spec(
        AssumptionField::MinutesPerAssessment,
        "minutesPerAssessment",
        "Time per Assess (Min)",
        None,
        Some(SubModel::Assessments),
        false,
        1.0,
    ),
    spec(
        AssumptionField::AssessmentsHandledRate,
        "assessmentsHandledRate",
        "% Handled by Connie",
        None,
        Some(SubModel::Assessments),
        true,
        0.1,
    ),
    spec(
        AssumptionField::HourlyRate,
        "hourlyRate",
        "FTE Hourly Cost ($)",
        None,
        Some(SubModel::Assessments),
        false,
        1.0,
    ),
];

impl AssumptionField {
    pub fn spec(self) -> &'static FieldSpec {
        // FIELDS is declared in variant order.
        &FIELDS[self as usize]
    }

    pub fn key(self) -> &'static str {
        self.spec().key
    }

    pub fn is_percentage(self) -> bool {
        self.spec().percentage
    }

    pub fn from_key(key: &str) -> Option<Self> {
        FIELDS.iter().find(|spec| spec.key == key).map(|spec| spec.field)
    }
}

impl Assumptions {
    pub fn get(&self, field: AssumptionField) -> f64 {
        match field {
            AssumptionField::MonthlyInboundCalls => self.monthly_inbound_calls,
            AssumptionField::MonthlyAdmissions => self.monthly_admissions,
            AssumptionField::AvgNetPatientRevenue => self.avg_net_patient_revenue,
            AssumptionField::MissedCallRate => self.missed_call_rate,
            AssumptionField::QualifiedOpportunitiesPercent => self.qualified_opportunities_percent,
            AssumptionField::LostOpportunityConversionRate => {
                self.lost_opportunity_conversion_rate
            }
            AssumptionField::AlumniDatabaseSize => self.alumni_database_size,
            AssumptionField::AlumniContactsPerMonth => self.alumni_contacts_per_month,
            AssumptionField::AlumniConversionRate => self.alumni_conversion_rate,
            AssumptionField::AnnualAssessments => self.annual_assessments,
            AssumptionField::MinutesPerAssessment => self.minutes_per_assessment,
            AssumptionField::AssessmentsHandledRate => self.assessments_handled_rate,
            AssumptionField::HourlyRate => self.hourly_rate,
        }
    }

    /// Returns a copy with one stored (fraction-form) value replaced.
    #[must_use]
    pub fn with_field(&self, field: AssumptionField, value: f64) -> Self {
        let mut next = *self;
        let slot = match field {
            AssumptionField::MonthlyInboundCalls => &mut next.monthly_inbound_calls,
            AssumptionField::MonthlyAdmissions => &mut next.monthly_admissions,
            AssumptionField::AvgNetPatientRevenue => &mut next.avg_net_patient_revenue,
            AssumptionField::MissedCallRate => &mut next.missed_call_rate,
            AssumptionField::QualifiedOpportunitiesPercent => {
                &mut next.qualified_opportunities_percent
            }
            AssumptionField::LostOpportunityConversionRate => {
                &mut next.lost_opportunity_conversion_rate
            }
            AssumptionField::AlumniDatabaseSize => &mut next.alumni_database_size,
            AssumptionField::AlumniContactsPerMonth => &mut next.alumni_contacts_per_month,
            AssumptionField::AlumniConversionRate => &mut next.alumni_conversion_rate,
            AssumptionField::AnnualAssessments => &mut next.annual_assessments,
            AssumptionField::MinutesPerAssessment => &mut next.minutes_per_assessment,
            AssumptionField::AssessmentsHandledRate => &mut next.assessments_handled_rate,
            AssumptionField::HourlyRate => &mut next.hourly_rate,
        };
        *slot = value;
        next
    }

    /// Applies an edit typed in display form (whole percents for
    /// percentage fields). Unparsable text stores `0`.
    #[must_use]
    pub fn with_display_text(&self, field: AssumptionField, text: &str) -> Self {
        self.with_field(field, from_display(field, parse_lenient(text)))
    }
}

/// Parses the leading numeric prefix of `text`, yielding `0` when there is
/// none or when the result is not finite.
pub fn parse_lenient(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let end = numeric_prefix_len(trimmed.as_bytes());
    trimmed[..end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn numeric_prefix_len(bytes: &[u8]) -> usize {
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }

    if digits == 0 {
        return 0;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    i
}

pub fn to_display(field: AssumptionField, stored: f64) -> f64 {
    if field.is_percentage() {
        stored * 100.0
    } else {
        stored
    }
}

pub fn from_display(field: AssumptionField, display: f64) -> f64 {
    if field.is_percentage() {
        display / 100.0
    } else {
        display
    }
}

/// Text shown in an input box for a stored value. Percentages keep at most
/// two decimals with trailing zeros dropped (`0.006` shows as `0.6`).
pub fn display_text(field: AssumptionField, stored: f64) -> String {
    if !field.is_percentage() {
        return stored.to_string();
    }
    let fixed = format!("{:.2}", to_display(field, stored));
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert_eq, proptest};

    const EPS: f64 = 1e-12;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn field_catalogue_matches_variant_order() {
        for (index, spec) in FIELDS.iter().enumerate() {
            assert_eq!(spec.field as usize, index, "field {}", spec.key);
            assert_eq!(AssumptionField::from_key(spec.key), Some(spec.field));
            assert_eq!(spec.field.key(), spec.key);
        }
        assert_eq!(AssumptionField::from_key("callsPerLead"), None);
    }

    #[test]
    fn percentage_flags_cover_rate_fields() {
        let percentages: Vec<&str> = FIELDS
            .iter()
            .filter(|spec| spec.percentage)
            .map(|spec| spec.key)
            .collect();
        assert_eq!(
            percentages,
            vec![
                "missedCallRate",
                "qualifiedOpportunitiesPercent",
                "lostOpportunityConversionRate",
                "alumniConversionRate",
                "assessmentsHandledRate",
            ]
        );
    }

    #[test]
    fn parse_lenient_takes_numeric_prefix() {
        assert_approx(parse_lenient("12"), 12.0);
        assert_approx(parse_lenient("  3.5"), 3.5);
        assert_approx(parse_lenient("12abc"), 12.0);
        assert_approx(parse_lenient("-4.25e2x"), -425.0);
        assert_approx(parse_lenient(".5"), 0.5);
        assert_approx(parse_lenient("7."), 7.0);
        assert_approx(parse_lenient("1e"), 1.0);
    }

    #[test]
    fn parse_lenient_substitutes_zero_for_garbage() {
        for text in ["", "abc", "-", ".", "e5", "NaN", "inf", "Infinity", "1e999"] {
            assert_eq!(parse_lenient(text), 0.0, "input {text:?}");
        }
    }

    #[test]
    fn display_text_trims_percentages() {
        assert_eq!(display_text(AssumptionField::MissedCallRate, 0.1), "10");
        assert_eq!(
            display_text(AssumptionField::LostOpportunityConversionRate, 0.006),
            "0.6"
        );
        assert_eq!(
            display_text(AssumptionField::AssessmentsHandledRate, 1.0),
            "100"
        );
        assert_eq!(display_text(AssumptionField::AlumniConversionRate, 0.0), "0");
        assert_eq!(
            display_text(AssumptionField::MonthlyInboundCalls, 3_300.0),
            "3300"
        );
    }

    #[test]
    fn with_display_text_scales_percentages_and_leaves_original() {
        let base = Assumptions::default();
        let edited = base.with_display_text(AssumptionField::MissedCallRate, "25");
        assert_approx(edited.missed_call_rate, 0.25);
        assert_approx(base.missed_call_rate, 0.1);

        let edited = base.with_display_text(AssumptionField::MonthlyAdmissions, "150");
        assert_approx(edited.monthly_admissions, 150.0);

        let edited = base.with_display_text(AssumptionField::HourlyRate, "n/a");
        assert_eq!(edited.hourly_rate, 0.0);
    }

    #[test]
    fn with_field_touches_only_the_named_field() {
        let base = Assumptions::default();
        for spec in FIELDS {
            let edited = base.with_field(spec.field, -1.0);
            for other in FIELDS {
                if other.field == spec.field {
                    assert_eq!(edited.get(other.field), -1.0);
                } else {
                    assert_eq!(edited.get(other.field), base.get(other.field));
                }
            }
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_percent_display_round_trips_hundredths(hundredths in 0u32..100_000) {
            let field = AssumptionField::MissedCallRate;
            let shown = hundredths as f64 / 100.0;
            let stored = from_display(field, shown);
            let text = display_text(field, stored);
            prop_assert_eq!(parse_lenient(&text), parse_lenient(&format!("{shown:.2}")));
        }
    }
}
