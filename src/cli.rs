use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::api::run_http_server;
use crate::core::{
    AssumptionField, Assumptions, EstimateOutput, from_display, parse_lenient, render_text,
};
use crate::error::RoiError;

#[derive(Parser, Debug)]
#[command(
    name = "roi",
    about = "ROI estimator for admissions call-center automation",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print an estimate for the given assumptions
    Estimate {
        #[command(flatten)]
        assumptions: AssumptionArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Serve the calculator page and JSON API
    Serve(ServeArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "ROI_HOST", default_value = "0.0.0.0")]
    pub host: String,
    #[arg(long, env = "ROI_PORT", default_value_t = 8080)]
    pub port: u16,
}

impl ServeArgs {
    pub fn socket_addr(&self) -> Result<SocketAddr, RoiError> {
        let ip = self
            .host
            .parse::<IpAddr>()
            .map_err(|e| RoiError::Address {
                value: self.host.clone(),
                reason: e.to_string(),
            })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Assumptions as typed by an operator: percentage flags take whole
/// percents. Unparsable values become `0`.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct AssumptionArgs {
    #[arg(long, default_value_t = 3300.0, value_parser = lenient_value, allow_negative_numbers = true)]
    pub monthly_inbound_calls: f64,
    #[arg(long, default_value_t = 100.0, value_parser = lenient_value, allow_negative_numbers = true)]
    pub monthly_admissions: f64,
    #[arg(long, default_value_t = 13000.0, value_parser = lenient_value, allow_negative_numbers = true)]
    pub avg_net_patient_revenue: f64,
    #[arg(
        long,
        default_value_t = 10.0,
        value_parser = lenient_value,
        allow_negative_numbers = true,
        help = "Share of inbound calls missed or abandoned, in percent"
    )]
    pub missed_call_rate: f64,
    #[arg(
        long,
        default_value_t = 25.0,
        value_parser = lenient_value,
        allow_negative_numbers = true,
        help = "Share of inbound calls that are qualified opportunities, in percent"
    )]
    pub qualified_opportunities_percent: f64,
    #[arg(
        long,
        default_value_t = 0.6,
        value_parser = lenient_value,
        allow_negative_numbers = true,
        help = "Admissions recovered per lost opportunity, in percent"
    )]
    pub lost_opportunity_conversion_rate: f64,
    #[arg(long, default_value_t = 1000.0, value_parser = lenient_value, allow_negative_numbers = true)]
    pub alumni_database_size: f64,
    #[arg(
        long,
        default_value_t = 200.0,
        value_parser = lenient_value,
        allow_negative_numbers = true,
        help = "Alumni contacted per month (reported only)"
    )]
    pub alumni_contacts_per_month: f64,
    #[arg(
        long,
        default_value_t = 0.5,
        value_parser = lenient_value,
        allow_negative_numbers = true,
        help = "Monthly re-admissions per alumnus on file, in percent"
    )]
    pub alumni_conversion_rate: f64,
    #[arg(long, default_value_t = 3000.0, value_parser = lenient_value, allow_negative_numbers = true)]
    pub annual_assessments: f64,
    #[arg(long, default_value_t = 20.0, value_parser = lenient_value, allow_negative_numbers = true)]
    pub minutes_per_assessment: f64,
    #[arg(
        long,
        default_value_t = 100.0,
        value_parser = lenient_value,
        allow_negative_numbers = true,
        help = "Share of assessments handled by the agent, in percent"
    )]
    pub assessments_handled_rate: f64,
    #[arg(
        long,
        default_value_t = 30.0,
        value_parser = lenient_value,
        allow_negative_numbers = true,
        help = "Fully loaded FTE cost per hour"
    )]
    pub hourly_rate: f64,
}

fn lenient_value(text: &str) -> Result<f64, Infallible> {
    Ok(parse_lenient(text))
}

impl AssumptionArgs {
    pub fn to_assumptions(&self) -> Assumptions {
        Assumptions {
            monthly_inbound_calls: from_display(
                AssumptionField::MonthlyInboundCalls,
                self.monthly_inbound_calls,
            ),
            monthly_admissions: from_display(AssumptionField::MonthlyAdmissions, self.monthly_admissions),
            avg_net_patient_revenue: from_display(
                AssumptionField::AvgNetPatientRevenue,
                self.avg_net_patient_revenue,
            ),
            missed_call_rate: from_display(AssumptionField::MissedCallRate, self.missed_call_rate),
            qualified_opportunities_percent: from_display(
                AssumptionField::QualifiedOpportunitiesPercent,
                self.qualified_opportunities_percent,
            ),
            lost_opportunity_conversion_rate: from_display(
                AssumptionField::LostOpportunityConversionRate,
                self.lost_opportunity_conversion_rate,
            ),
            alumni_database_size: from_display(
                AssumptionField::AlumniDatabaseSize,
                self.alumni_database_size,
            ),
            alumni_contacts_per_month: from_display(
                AssumptionField::AlumniContactsPerMonth,
                self.alumni_contacts_per_month,
            ),
            alumni_conversion_rate: from_display(
                AssumptionField::AlumniConversionRate,
                self.alumni_conversion_rate,
            ),
            annual_assessments: from_display(AssumptionField::AnnualAssessments, self.annual_assessments),
            minutes_per_assessment: from_display(
                AssumptionField::MinutesPerAssessment,
                self.minutes_per_assessment,
            ),
            assessments_handled_rate: from_display(
                AssumptionField::AssessmentsHandledRate,
                self.assessments_handled_rate,
            ),
            hourly_rate: from_display(AssumptionField::HourlyRate, self.hourly_rate),
        }
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("ROI_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub async fn run(cli: Cli) -> Result<(), RoiError> {
    match cli.command {
        Command::Estimate {
            assumptions,
            format,
        } => {
            let rendered = render_estimate(&assumptions, format)?;
            print!("{rendered}");
            Ok(())
        }
        Command::Serve(args) => {
            let addr = args.socket_addr()?;
            info!(%addr, "starting estimator service");
            run_http_server(addr).await
        }
    }
}

pub fn render_estimate(args: &AssumptionArgs, format: OutputFormat) -> Result<String, RoiError> {
    let output = EstimateOutput::new(args.to_assumptions());
    debug!(
        total_annual_impact = output.results.total_annual_impact,
        "computed estimate"
    );
    match format {
        OutputFormat::Text => Ok(render_text(&output.formatted)),
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(&output)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FIELDS;

    const EPS: f64 = 1e-12;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn parse_estimate(args: &[&str]) -> AssumptionArgs {
        let argv = std::iter::once("roi")
            .chain(std::iter::once("estimate"))
            .chain(args.iter().copied());
        match Cli::try_parse_from(argv).expect("cli should parse").command {
            Command::Estimate { assumptions, .. } => assumptions,
            Command::Serve(_) => panic!("expected estimate command"),
        }
    }

    #[test]
    fn flag_defaults_match_model_defaults() {
        let parsed = parse_estimate(&[]).to_assumptions();
        let defaults = Assumptions::default();
        for spec in FIELDS {
            assert_approx(parsed.get(spec.field), defaults.get(spec.field));
        }
    }

    #[test]
    fn percentage_flags_are_scaled_to_fractions() {
        let assumptions = parse_estimate(&[
            "--missed-call-rate",
            "20",
            "--assessments-handled-rate",
            "50",
            "--monthly-admissions",
            "150",
        ])
        .to_assumptions();
        assert_approx(assumptions.missed_call_rate, 0.2);
        assert_approx(assumptions.assessments_handled_rate, 0.5);
        assert_approx(assumptions.monthly_admissions, 150.0);
    }

    #[test]
    fn unparsable_and_negative_flags_are_accepted() {
        let assumptions = parse_estimate(&["--hourly-rate", "lots", "--monthly-admissions", "-5"])
            .to_assumptions();
        assert_eq!(assumptions.hourly_rate, 0.0);
        assert_approx(assumptions.monthly_admissions, -5.0);
    }

    #[test]
    fn serve_args_build_socket_addr() {
        let args = ServeArgs {
            host: "127.0.0.1".to_string(),
            port: 9000,
        };
        assert_eq!(
            args.socket_addr().expect("valid addr"),
            SocketAddr::from(([127, 0, 0, 1], 9000))
        );

        let bad = ServeArgs {
            host: "not-a-host".to_string(),
            port: 9000,
        };
        assert!(matches!(bad.socket_addr(), Err(RoiError::Address { .. })));
    }

    #[test]
    fn render_estimate_json_contains_expected_fields() {
        let json = render_estimate(&parse_estimate(&[]), OutputFormat::Json)
            .expect("json should render");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert!(value["results"]["totalAnnualImpact"].is_number());
        assert!(value["assumptions"]["alumniContactsPerMonth"].is_number());
        assert_eq!(value["ranked"].as_array().map(Vec::len), Some(4));
        assert_eq!(value["ranked"][0]["subModel"], "missed-calls");
        assert_eq!(value["formatted"]["totalAnnualImpact"], "$3,048,600");
    }

    #[test]
    fn render_estimate_text_starts_with_total() {
        let text = render_estimate(&parse_estimate(&[]), OutputFormat::Text)
            .expect("text should render");
        assert!(text.starts_with("Total Annual Impact: $3,048,600"));
    }
}
