mod engine;
mod format;
mod input;
mod report;
mod types;

pub use engine::{compute, ranked_impacts};
pub use format::{format_currency, format_number, format_percent};
pub use input::{
    AssumptionField, FIELDS, FieldSpec, display_text, from_display, parse_lenient, to_display,
};
pub use report::{EstimateOutput, Report, ResultRow, SubModelReport, build_report, render_text};
pub use types::{Assumptions, DerivedResult, ImpactEntry, SubModel};
