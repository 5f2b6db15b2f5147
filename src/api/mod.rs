use std::fmt;
use std::net::SocketAddr;

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    AssumptionField, Assumptions, EstimateOutput, FIELDS, FieldSpec, display_text, from_display,
    parse_lenient, to_display,
};
use crate::error::RoiError;

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

/// A numeric field that tolerates text. Strings are parsed leniently and
/// anything non-numeric, arrays and objects included, becomes `0`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LenientNumber(f64);

impl<'de> Deserialize<'de> for LenientNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LenientVisitor;

        impl<'de> Visitor<'de> for LenientVisitor {
            type Value = LenientNumber;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number or numeric text")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(LenientNumber(if v.is_finite() { v } else { 0.0 }))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(LenientNumber(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(LenientNumber(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(LenientNumber(parse_lenient(v)))
            }

            fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Self::Value, E> {
                Ok(LenientNumber(0.0))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(LenientNumber(0.0))
            }

            fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                while seq.next_element::<de::IgnoredAny>()?.is_some() {}
                Ok(LenientNumber(0.0))
            }

            fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                while map
                    .next_entry::<de::IgnoredAny, de::IgnoredAny>()?
                    .is_some()
                {}
                Ok(LenientNumber(0.0))
            }
        }

        deserializer.deserialize_any(LenientVisitor)
    }
}

/// Percentage fields arrive in whole-percent form.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EstimatePayload {
    monthly_inbound_calls: Option<LenientNumber>,
    monthly_admissions: Option<LenientNumber>,
    avg_net_patient_revenue: Option<LenientNumber>,

    missed_call_rate: Option<LenientNumber>,

    qualified_opportunities_percent: Option<LenientNumber>,
    lost_opportunity_conversion_rate: Option<LenientNumber>,

    alumni_database_size: Option<LenientNumber>,
    alumni_contacts_per_month: Option<LenientNumber>,
    alumni_conversion_rate: Option<LenientNumber>,

    annual_assessments: Option<LenientNumber>,
    minutes_per_assessment: Option<LenientNumber>,
    assessments_handled_rate: Option<LenientNumber>,
    hourly_rate: Option<LenientNumber>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldView {
    #[serde(flatten)]
    spec: FieldSpec,
    default_value: f64,
    default_text: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/estimate",
            get(estimate_get_handler).post(estimate_post_handler),
        )
        .route("/api/fields", get(fields_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(addr: SocketAddr) -> Result<(), RoiError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| RoiError::Bind { addr, source })?;
    info!("ROI estimator listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{}/", addr.port());

    axum::serve(listener, router())
        .await
        .map_err(RoiError::Serve)
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn fields_handler() -> Response {
    let defaults = Assumptions::default();
    let fields: Vec<FieldView> = FIELDS
        .iter()
        .map(|spec| FieldView {
            spec: *spec,
            default_value: to_display(spec.field, defaults.get(spec.field)),
            default_text: display_text(spec.field, defaults.get(spec.field)),
        })
        .collect();
    json_response(StatusCode::OK, fields)
}

async fn estimate_get_handler(
    payload: Result<Query<EstimatePayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => estimate_handler_impl(payload),
        Err(rejection) => {
            warn!(error = %rejection, "rejected estimate query");
            error_response(StatusCode::BAD_REQUEST, &rejection.body_text())
        }
    }
}

async fn estimate_post_handler(payload: Result<Json<EstimatePayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => estimate_handler_impl(payload),
        Err(rejection) => {
            warn!(error = %rejection, "rejected estimate body");
            error_response(StatusCode::BAD_REQUEST, &rejection.body_text())
        }
    }
}

fn estimate_handler_impl(payload: EstimatePayload) -> Response {
    let output = EstimateOutput::new(assumptions_from_payload(payload));
    debug!(
        total_annual_impact = output.results.total_annual_impact,
        "served estimate"
    );
    json_response(StatusCode::OK, output)
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn assumptions_from_json(json: &str) -> Result<Assumptions, String> {
    let payload = serde_json::from_str::<EstimatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(assumptions_from_payload(payload))
}

fn assumptions_from_payload(payload: EstimatePayload) -> Assumptions {
    let overrides = [
        (AssumptionField::MonthlyInboundCalls, payload.monthly_inbound_calls),
        (AssumptionField::MonthlyAdmissions, payload.monthly_admissions),
        (AssumptionField::AvgNetPatientRevenue, payload.avg_net_patient_revenue),
        (AssumptionField::MissedCallRate, payload.missed_call_rate),
        (
            AssumptionField::QualifiedOpportunitiesPercent,
            payload.qualified_opportunities_percent,
        ),
        (
            AssumptionField::LostOpportunityConversionRate,
            payload.lost_opportunity_conversion_rate,
        ),
        (AssumptionField::AlumniDatabaseSize, payload.alumni_database_size),
        (AssumptionField::AlumniContactsPerMonth, payload.alumni_contacts_per_month),
        (AssumptionField::AlumniConversionRate, payload.alumni_conversion_rate),
        (AssumptionField::AnnualAssessments, payload.annual_assessments),
        (AssumptionField::MinutesPerAssessment, payload.minutes_per_assessment),
        (AssumptionField::AssessmentsHandledRate, payload.assessments_handled_rate),
        (AssumptionField::HourlyRate, payload.hourly_rate),
    ];

    overrides
        .into_iter()
        .fold(Assumptions::default(), |assumptions, (field, value)| match value {
            Some(LenientNumber(v)) => assumptions.with_field(field, from_display(field, v)),
            None => assumptions,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn assumptions_from_json_parses_web_keys() {
        let json = r#"{
          "monthlyInboundCalls": 5000,
          "monthlyAdmissions": 150,
          "avgNetPatientRevenue": 12000,
          "missedCallRate": 20,
          "qualifiedOpportunitiesPercent": 30,
          "lostOpportunityConversionRate": 0.8,
          "alumniDatabaseSize": 2000,
          "alumniContactsPerMonth": 400,
          "alumniConversionRate": 0.25,
          "annualAssessments": 4000,
          "minutesPerAssessment": 30,
          "assessmentsHandledRate": 75,
          "hourlyRate": 35
        }"#;
        let assumptions = assumptions_from_json(json).expect("json should parse");

        assert_approx(assumptions.monthly_inbound_calls, 5_000.0);
        assert_approx(assumptions.monthly_admissions, 150.0);
        assert_approx(assumptions.avg_net_patient_revenue, 12_000.0);
        assert_approx(assumptions.missed_call_rate, 0.2);
        assert_approx(assumptions.qualified_opportunities_percent, 0.3);
        assert_approx(assumptions.lost_opportunity_conversion_rate, 0.008);
        assert_approx(assumptions.alumni_database_size, 2_000.0);
        assert_approx(assumptions.alumni_contacts_per_month, 400.0);
        assert_approx(assumptions.alumni_conversion_rate, 0.0025);
        assert_approx(assumptions.annual_assessments, 4_000.0);
        assert_approx(assumptions.minutes_per_assessment, 30.0);
        assert_approx(assumptions.assessments_handled_rate, 0.75);
        assert_approx(assumptions.hourly_rate, 35.0);
    }

    #[test]
    fn assumptions_from_json_uses_defaults_for_absent_fields() {
        let assumptions = assumptions_from_json("{}").expect("json should parse");
        assert_eq!(assumptions, Assumptions::default());
    }

    #[test]
    fn assumptions_from_json_keeps_untouched_percent_defaults_exact() {
        let assumptions =
            assumptions_from_json(r#"{"hourlyRate": 45}"#).expect("json should parse");
        let defaults = Assumptions::default();
        assert_eq!(
            assumptions.lost_opportunity_conversion_rate,
            defaults.lost_opportunity_conversion_rate
        );
        assert_eq!(assumptions.missed_call_rate, defaults.missed_call_rate);
        assert_approx(assumptions.hourly_rate, 45.0);
    }

    #[test]
    fn assumptions_from_json_zeroes_arrays_and_objects() {
        let json = r#"{
          "hourlyRate": [30, {"nested": [1]}],
          "monthlyAdmissions": {"value": 150},
          "missedCallRate": [],
          "avgNetPatientRevenue": 20000
        }"#;
        let assumptions = assumptions_from_json(json).expect("json should parse");
        assert_eq!(assumptions.hourly_rate, 0.0);
        assert_eq!(assumptions.monthly_admissions, 0.0);
        assert_eq!(assumptions.missed_call_rate, 0.0);
        assert_approx(assumptions.avg_net_patient_revenue, 20_000.0);
    }

    #[test]
    fn assumptions_from_json_coerces_text_and_null() {
        let json = r#"{
          "monthlyInboundCalls": "4000",
          "monthlyAdmissions": "lots",
          "missedCallRate": "15%",
          "hourlyRate": null,
          "annualAssessments": true
        }"#;
        let assumptions = assumptions_from_json(json).expect("json should parse");
        assert_approx(assumptions.monthly_inbound_calls, 4_000.0);
        assert_eq!(assumptions.monthly_admissions, 0.0);
        assert_approx(assumptions.missed_call_rate, 0.15);
        assert_approx(assumptions.hourly_rate, Assumptions::default().hourly_rate);
        assert_eq!(assumptions.annual_assessments, 0.0);
    }

    #[test]
    fn estimate_output_serialization_contains_expected_fields() {
        let output = EstimateOutput::new(Assumptions::default());
        let json = serde_json::to_string(&output).expect("response should serialize");
        assert!(json.contains("\"assumptions\""));
        assert!(json.contains("\"results\""));
        assert!(json.contains("\"ranked\""));
        assert!(json.contains("\"formatted\""));
        assert!(json.contains("\"ellaAnnualRevenue\""));
        assert!(json.contains("\"julianaCallsHandled\""));
        assert!(json.contains("\"connieAnnualSavings\""));
        assert!(json.contains("\"totalAnnualImpact\""));
        assert!(json.contains("\"subModels\""));
    }

    #[test]
    fn field_view_flattens_spec_with_display_defaults() {
        let defaults = Assumptions::default();
        let spec = FIELDS[3];
        let view = FieldView {
            spec,
            default_value: to_display(spec.field, defaults.get(spec.field)),
            default_text: display_text(spec.field, defaults.get(spec.field)),
        };
        let value = serde_json::to_value(&view).expect("field should serialize");
        assert_eq!(value["key"], "missedCallRate");
        assert_eq!(value["percentage"], true);
        assert_eq!(value["group"], "missed-calls");
        assert_eq!(value["defaultText"], "10");
    }
}
