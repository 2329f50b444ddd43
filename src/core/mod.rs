mod engine;
mod input;
mod types;
mod views;

pub use engine::project;
pub use input::{HouseholdForm, LenientNumber};
pub use types::{HouseholdParams, MAX_AGE, Person, ProjectionRecord, START_YEARS};
pub use views::{
    Chart, ChartKind, DANGER_WITHDRAWAL_RATE, Metric, NamedSeries, ReferenceLine,
    SAFE_WITHDRAWAL_RATE, SeriesPoint, TableView, build_chart, chart_series,
};
