use super::types::{Assumptions, DerivedResult, ImpactEntry, SubModel};

const MONTHS_PER_YEAR: f64 = 12.0;
const MINUTES_PER_HOUR: f64 = 60.0;
/// Outreach attempts placed for every lost opportunity.
const CALLS_PER_LOST_OPPORTUNITY: f64 = 4.0;
/// Contact attempts placed for every alumnus on file.
const CALLS_PER_ALUMNUS: f64 = 4.0;

#[derive(Debug, Clone, Copy)]
struct MissedCallsOutcome {
    missed_calls: f64,
    add_admissions: f64,
    monthly_revenue: f64,
    annual_revenue: f64,
}

#[derive(Debug, Clone, Copy)]
struct OutboundOutcome {
    total_calls: f64,
    qualified_opportunities: f64,
    lost_opportunities: f64,
    calls_handled: f64,
    add_admissions: f64,
    monthly_revenue: f64,
    annual_revenue: f64,
}

#[derive(Debug, Clone, Copy)]
struct AlumniOutcome {
    outbound_calls: f64,
    add_admissions: f64,
    monthly_revenue: f64,
    annual_revenue: f64,
}

#[derive(Debug, Clone, Copy)]
struct AssessmentsOutcome {
    hours_per_assessment: f64,
    assessments_handled: f64,
    fte_hours_saved: f64,
    annual_savings: f64,
}

pub fn compute(assumptions: &Assumptions) -> DerivedResult {
    let conversion_rate = conversion_rate(assumptions);
    let ella = missed_calls(assumptions, conversion_rate);
    let juliana = outbound_lost_opportunity(assumptions);
    let sophy = alumni_readmission(assumptions);
    let connie = assessments(assumptions);

    let total_annual_impact =
        ella.annual_revenue + juliana.annual_revenue + sophy.annual_revenue + connie.annual_savings;

    DerivedResult {
        conversion_rate,
        missed_calls: ella.missed_calls,
        ella_add_admissions: ella.add_admissions,
        ella_monthly_revenue: ella.monthly_revenue,
        ella_annual_revenue: ella.annual_revenue,
        juliana_total_calls: juliana.total_calls,
        qualified_opportunities: juliana.qualified_opportunities,
        lost_opportunities: juliana.lost_opportunities,
        juliana_calls_handled: juliana.calls_handled,
        juliana_add_admissions: juliana.add_admissions,
        juliana_monthly_revenue: juliana.monthly_revenue,
        juliana_annual_revenue: juliana.annual_revenue,
        sophy_outbound_calls: sophy.outbound_calls,
        sophy_add_admissions: sophy.add_admissions,
        sophy_monthly_revenue: sophy.monthly_revenue,
        sophy_annual_revenue: sophy.annual_revenue,
        hours_per_assessment: connie.hours_per_assessment,
        connie_assessments_handled: connie.assessments_handled,
        fte_hours_saved: connie.fte_hours_saved,
        connie_annual_savings: connie.annual_savings,
        total_annual_impact,
    }
}

/// Sub-model annual figures, largest first.
pub fn ranked_impacts(result: &DerivedResult) -> Vec<ImpactEntry> {
    let mut entries: Vec<ImpactEntry> = SubModel::ALL
        .iter()
        .map(|&sub_model| ImpactEntry {
            sub_model,
            name: sub_model.chart_name(),
            value: sub_model.annual_value(result),
            color: sub_model.color(),
        })
        .collect();
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
    entries
}

fn conversion_rate(assumptions: &Assumptions) -> f64 {
    if assumptions.monthly_inbound_calls > 0.0 {
        assumptions.monthly_admissions / assumptions.monthly_inbound_calls
    } else {
        0.0
    }
}

fn missed_calls(assumptions: &Assumptions, conversion_rate: f64) -> MissedCallsOutcome {
    let missed_calls = assumptions.monthly_inbound_calls * assumptions.missed_call_rate;
    let add_admissions = missed_calls * conversion_rate;
    let monthly_revenue = add_admissions * assumptions.avg_net_patient_revenue;
    MissedCallsOutcome {
        missed_calls,
        add_admissions,
        monthly_revenue,
        annual_revenue: monthly_revenue * MONTHS_PER_YEAR,
    }
}

fn outbound_lost_opportunity(assumptions: &Assumptions) -> OutboundOutcome {
    let total_calls = assumptions.monthly_inbound_calls;
    let qualified_opportunities = total_calls * assumptions.qualified_opportunities_percent;
    // Admissions already covering the qualified pool leave nothing to chase.
    let lost_opportunities = (qualified_opportunities - assumptions.monthly_admissions).max(0.0);
    let add_admissions = lost_opportunities * assumptions.lost_opportunity_conversion_rate;
    let monthly_revenue = add_admissions * assumptions.avg_net_patient_revenue;
    OutboundOutcome {
        total_calls,
        qualified_opportunities,
        lost_opportunities,
        calls_handled: lost_opportunities * CALLS_PER_LOST_OPPORTUNITY,
        add_admissions,
        monthly_revenue,
        annual_revenue: monthly_revenue * MONTHS_PER_YEAR,
    }
}

fn alumni_readmission(assumptions: &Assumptions) -> AlumniOutcome {
    let add_admissions = assumptions.alumni_database_size * assumptions.alumni_conversion_rate;
    let monthly_revenue = add_admissions * assumptions.avg_net_patient_revenue;
    AlumniOutcome {
        outbound_calls: assumptions.alumni_database_size * CALLS_PER_ALUMNUS,
        add_admissions,
        monthly_revenue,
        annual_revenue: monthly_revenue * MONTHS_PER_YEAR,
    }
}

fn assessments(assumptions: &Assumptions) -> AssessmentsOutcome {
    let hours_per_assessment = assumptions.minutes_per_assessment / MINUTES_PER_HOUR;
    let assessments_handled = assumptions.annual_assessments * assumptions.assessments_handled_rate;
    let fte_hours_saved = assessments_handled * hours_per_assessment;
    AssessmentsOutcome {
        hours_per_assessment,
        assessments_handled,
        fte_hours_saved,
        annual_savings: fte_hours_saved * assumptions.hourly_rate,
    }
}
