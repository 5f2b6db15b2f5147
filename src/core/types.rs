use serde::Serialize;

/// Operator-editable inputs. Percentage fields are stored as fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assumptions {
    pub monthly_inbound_calls: f64,
    pub monthly_admissions: f64,
    pub avg_net_patient_revenue: f64,

    pub missed_call_rate: f64,

    pub qualified_opportunities_percent: f64,
    pub lost_opportunity_conversion_rate: f64,

    pub alumni_database_size: f64,
    /// Shown alongside the alumni figures; no formula reads it.
    pub alumni_contacts_per_month: f64,
    pub alumni_conversion_rate: f64,

    pub annual_assessments: f64,
    pub minutes_per_assessment: f64,
    pub assessments_handled_rate: f64,
    pub hourly_rate: f64,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            monthly_inbound_calls: 3_300.0,
            monthly_admissions: 100.0,
            avg_net_patient_revenue: 13_000.0,
            missed_call_rate: 0.1,
            qualified_opportunities_percent: 0.25,
            lost_opportunity_conversion_rate: 0.006,
            alumni_database_size: 1_000.0,
            alumni_contacts_per_month: 200.0,
            alumni_conversion_rate: 0.005,
            annual_assessments: 3_000.0,
            minutes_per_assessment: 20.0,
            assessments_handled_rate: 1.0,
            hourly_rate: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedResult {
    pub conversion_rate: f64,

    pub missed_calls: f64,
    pub ella_add_admissions: f64,
    pub ella_monthly_revenue: f64,
    pub ella_annual_revenue: f64,

    pub juliana_total_calls: f64,
    pub qualified_opportunities: f64,
    pub lost_opportunities: f64,
    pub juliana_calls_handled: f64,
    pub juliana_add_admissions: f64,
    pub juliana_monthly_revenue: f64,
    pub juliana_annual_revenue: f64,

    pub sophy_outbound_calls: f64,
    pub sophy_add_admissions: f64,
    pub sophy_monthly_revenue: f64,
    pub sophy_annual_revenue: f64,

    pub hours_per_assessment: f64,
    pub connie_assessments_handled: f64,
    pub fte_hours_saved: f64,
    pub connie_annual_savings: f64,

    pub total_annual_impact: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubModel {
    MissedCalls,
    OutboundLostOpportunity,
    AlumniReadmission,
    Assessments,
}

impl SubModel {
    pub const ALL: [SubModel; 4] = [
        SubModel::MissedCalls,
        SubModel::OutboundLostOpportunity,
        SubModel::AlumniReadmission,
        SubModel::Assessments,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SubModel::MissedCalls => "ella",
            SubModel::OutboundLostOpportunity => "juliana",
            SubModel::AlumniReadmission => "sophy",
            SubModel::Assessments => "connie",
        }
    }

    pub fn agent(self) -> &'static str {
        match self {
            SubModel::MissedCalls => "Ella",
            SubModel::OutboundLostOpportunity => "Juliana",
            SubModel::AlumniReadmission => "Sophy",
            SubModel::Assessments => "Connie",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SubModel::MissedCalls => "Missed Calls",
            SubModel::OutboundLostOpportunity => "Outbound Lost Opp.",
            SubModel::AlumniReadmission => "Alumni Re-Admission",
            SubModel::Assessments => "Assessments",
        }
    }

    /// Label used on the impact chart.
    pub fn chart_name(self) -> &'static str {
        match self {
            SubModel::MissedCalls => "Missed Calls (Ella)",
            SubModel::OutboundLostOpportunity => "Outbound Opp (Juliana)",
            SubModel::AlumniReadmission => "Alumni (Sophy)",
            SubModel::Assessments => "Assessments (Connie)",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            SubModel::MissedCalls => "#3b82f6",
            SubModel::OutboundLostOpportunity => "#8b5cf6",
            SubModel::AlumniReadmission => "#f59e0b",
            SubModel::Assessments => "#10b981",
        }
    }

    /// Assessments produce cost avoided rather than new revenue.
    pub fn is_savings(self) -> bool {
        matches!(self, SubModel::Assessments)
    }

    pub fn annual_value(self, result: &DerivedResult) -> f64 {
        match self {
            SubModel::MissedCalls => result.ella_annual_revenue,
            SubModel::OutboundLostOpportunity => result.juliana_annual_revenue,
            SubModel::AlumniReadmission => result.sophy_annual_revenue,
            SubModel::Assessments => result.connie_annual_savings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactEntry {
    pub sub_model: SubModel,
    pub name: &'static str,
    pub value: f64,
    pub color: &'static str,
}
