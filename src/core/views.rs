use std::str::FromStr;

use serde::Serialize;

use super::types::ProjectionRecord;
use crate::error::PlannerError;

/// Numeric record fields that can be plotted against age.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    BeginningBalance,
    Contribution,
    Withdrawal,
    GrowthRate,
    InvestmentReturn,
    EndingBalance,
    CostOfLiving,
    PassiveIncome,
    WithdrawalRate,
    TotalPrincipal,
    TotalGrowth,
}

impl Metric {
    pub fn value(self, record: &ProjectionRecord) -> f64 {
        match self {
            Metric::BeginningBalance => record.beginning_balance,
            Metric::Contribution => record.contribution,
            Metric::Withdrawal => record.withdrawal,
            Metric::GrowthRate => record.growth_rate,
            Metric::InvestmentReturn => record.investment_return,
            Metric::EndingBalance => record.ending_balance,
            Metric::CostOfLiving => record.cost_of_living,
            Metric::PassiveIncome => record.passive_income,
            Metric::WithdrawalRate => record.withdrawal_rate,
            Metric::TotalPrincipal => record.total_principal,
            Metric::TotalGrowth => record.total_growth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub age: u32,
    pub value: f64,
}

pub fn chart_series(records: &[ProjectionRecord], metric: Metric) -> Vec<SeriesPoint> {
    records
        .iter()
        .map(|record| SeriesPoint {
            age: record.age1,
            value: metric.value(record),
        })
        .collect()
}

/// The chart presets offered alongside a projection.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    NetWorth,
    Compounding,
    CashFlow,
    Withdrawal,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::NetWorth,
        ChartKind::Compounding,
        ChartKind::CashFlow,
        ChartKind::Withdrawal,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::NetWorth => "Net Worth Projection",
            ChartKind::Compounding => "Principal vs Growth",
            ChartKind::CashFlow => "Income vs Expenses",
            ChartKind::Withdrawal => "Withdrawal Rate Risk",
        }
    }

    fn series(self) -> &'static [(Metric, &'static str)] {
        match self {
            ChartKind::NetWorth => &[(Metric::EndingBalance, "Portfolio Value")],
            ChartKind::Compounding => &[
                (Metric::TotalPrincipal, "Total Contributions"),
                (Metric::TotalGrowth, "Investment Growth"),
            ],
            ChartKind::CashFlow => &[
                (Metric::PassiveIncome, "Passive Income"),
                (Metric::CostOfLiving, "Expenses"),
            ],
            ChartKind::Withdrawal => &[(Metric::WithdrawalRate, "Withdrawal Rate %")],
        }
    }
}

impl FromStr for ChartKind {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "net-worth" | "netWorth" | "net_worth" => Ok(ChartKind::NetWorth),
            "compounding" => Ok(ChartKind::Compounding),
            "cash-flow" | "cashFlow" | "cash_flow" => Ok(ChartKind::CashFlow),
            "withdrawal" | "withdrawal-rate" | "withdrawalRate" => Ok(ChartKind::Withdrawal),
            other => Err(PlannerError::UnknownChart(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedSeries {
    pub name: &'static str,
    pub metric: Metric,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub value: f64,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub kind: ChartKind,
    pub title: &'static str,
    pub stacked: bool,
    /// Age at which a vertical retirement marker is drawn.
    pub retirement_marker: Option<u32>,
    pub reference_lines: Vec<ReferenceLine>,
    pub series: Vec<NamedSeries>,
}

pub const SAFE_WITHDRAWAL_RATE: f64 = 0.04;
pub const DANGER_WITHDRAWAL_RATE: f64 = 0.08;

pub fn build_chart(kind: ChartKind, records: &[ProjectionRecord], retirement_age: u32) -> Chart {
    // The withdrawal chart only makes sense over retired years.
    let retired: Vec<ProjectionRecord>;
    let source = if kind == ChartKind::Withdrawal {
        retired = records.iter().filter(|r| r.is_retired).cloned().collect();
        retired.as_slice()
    } else {
        records
    };

    let (retirement_marker, reference_lines) = match kind {
        ChartKind::Withdrawal => (
            None,
            vec![
                ReferenceLine {
                    value: SAFE_WITHDRAWAL_RATE,
                    label: "4% Safe Rule",
                },
                ReferenceLine {
                    value: DANGER_WITHDRAWAL_RATE,
                    label: "Danger Zone",
                },
            ],
        ),
        _ => (Some(retirement_age), Vec::new()),
    };

    Chart {
        kind,
        title: kind.title(),
        stacked: kind == ChartKind::Compounding,
        retirement_marker,
        reference_lines,
        series: kind
            .series()
            .iter()
            .map(|&(metric, name)| NamedSeries {
                name,
                metric,
                points: chart_series(source, metric),
            })
            .collect(),
    }
}

/// Full record list with the first retired year singled out for highlighting.
#[derive(Debug, Clone, Copy)]
pub struct TableView<'a> {
    pub records: &'a [ProjectionRecord],
    pub retirement_index: Option<usize>,
}

impl<'a> TableView<'a> {
    pub fn new(records: &'a [ProjectionRecord]) -> Self {
        Self {
            records,
            retirement_index: records.iter().position(|r| r.is_retired),
        }
    }

    pub fn retirement_record(&self) -> Option<&'a ProjectionRecord> {
        self.retirement_index.map(|idx| &self.records[idx])
    }
}
