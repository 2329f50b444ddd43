//! Presentation of a projection: household naming, the styled report table
//! shared by every export, and a fixed-width text rendering for terminals.

pub mod export;
pub mod format;
pub mod workbook;

use serde::Serialize;

use crate::core::{HouseholdParams, Person, ProjectionRecord, TableView, project};

pub const UNTITLED_REPORT: &str = "Retirement Projection";

/// A projection together with the context every consumer needs: the
/// normalised inputs, the household title and the highlighted retirement year.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub household_name: String,
    pub retirement_age: u32,
    pub retirement_index: Option<usize>,
    pub params: HouseholdParams,
    pub records: Vec<ProjectionRecord>,
}

impl ProjectionSummary {
    pub fn run(params: HouseholdParams) -> Self {
        let records = project(&params);
        let retirement_index = TableView::new(&records).retirement_index;
        Self {
            household_name: household_name(&params.primary, params.partner.as_ref()),
            retirement_age: params.retirement_age,
            retirement_index,
            params,
            records,
        }
    }

    pub fn report(&self) -> Report {
        Report::build(&self.params, &self.records)
    }
}

/// Title shown on reports, e.g. "John and Jane Smith".
pub fn household_name(primary: &Person, partner: Option<&Person>) -> String {
    let (f1, l1) = (primary.first_name.trim(), primary.last_name.trim());
    if f1.is_empty() {
        return UNTITLED_REPORT.to_string();
    }

    let (f2, l2) = partner
        .map(|p| (p.first_name.trim(), p.last_name.trim()))
        .unwrap_or(("", ""));
    if f2.is_empty() {
        return join_words(&[f1, l1]);
    }
    if l1.to_lowercase() == l2.to_lowercase() {
        return join_words(&[f1, "and", f2, l1]);
    }
    join_words(&[f1, l1, "and", f2, l2])
}

fn join_words(words: &[&str]) -> String {
    words
        .iter()
        .filter(|w| !w.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Download name for a report: whitespace runs become underscores.
pub fn report_file_name(household: &str, suffix: &str) -> String {
    let stem = household.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{stem}_{suffix}")
}

/// How a renderer should colour a cell.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Plain,
    Positive,
    Negative,
    Emphasis,
    Muted,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub header: String,
    pub align: Align,
}

/// How a spreadsheet should store a cell's number.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellFormat {
    Text,
    Integer,
    Currency,
    Cost,
    Percent,
}

/// One report cell: its display text plus the raw number behind it, when
/// there is one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub text: String,
    pub tone: Tone,
    pub value: Option<f64>,
    pub format: CellFormat,
}

impl Cell {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Plain,
            value: None,
            format: CellFormat::Text,
        }
    }

    fn integer(value: i64) -> Self {
        Self {
            text: value.to_string(),
            tone: Tone::Plain,
            value: Some(value as f64),
            format: CellFormat::Integer,
        }
    }

    fn currency(amount: f64, tone: Tone) -> Self {
        Self {
            text: format::currency(amount),
            tone,
            value: Some(amount),
            format: CellFormat::Currency,
        }
    }

    fn cost(amount: f64) -> Self {
        Self {
            text: format!("({})", format::currency(amount)),
            tone: Tone::Negative,
            value: Some(amount),
            format: CellFormat::Cost,
        }
    }

    fn percent(fraction: f64) -> Self {
        Self {
            text: format::percent(fraction),
            tone: Tone::Plain,
            value: Some(fraction),
            format: CellFormat::Percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub highlighted: bool,
}

/// The formatted projection table with its title and assumptions line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub title: String,
    pub assumptions: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl Report {
    pub fn build(params: &HouseholdParams, records: &[ProjectionRecord]) -> Self {
        let partner_header = params
            .partner
            .as_ref()
            .map(|p| p.first_name.as_str())
            .filter(|name| !name.is_empty());

        let mut columns = vec![
            left("Year"),
            left(if params.primary.first_name.is_empty() {
                "Age 1"
            } else {
                params.primary.first_name.as_str()
            }),
        ];
        if let Some(name) = partner_header {
            columns.push(left(name));
        }
        columns.extend(
            [
                "Beg. Value",
                "Savings",
                "Growth",
                "Ret. Cost",
                "End Value",
                "Expenses",
            ]
            .map(right),
        );

        let retirement_index = TableView::new(records).retirement_index;
        let rows = records
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                let mut cells = vec![
                    Cell::integer(record.year.into()),
                    Cell::integer(record.age1.into()),
                ];
                if partner_header.is_some() {
                    cells.push(
                        record
                            .age2
                            .map_or_else(|| Cell::text(""), |age| Cell::integer(age.into())),
                    );
                }
                cells.push(Cell::currency(record.beginning_balance, Tone::Plain));
                cells.push(if record.contribution > 0.0 {
                    Cell::currency(record.contribution, Tone::Positive)
                } else {
                    Cell::text("-")
                });
                cells.push(Cell::percent(record.growth_rate));
                cells.push(if record.withdrawal > 0.0 {
                    Cell::cost(record.withdrawal)
                } else {
                    Cell::text("-")
                });
                cells.push(Cell::currency(record.ending_balance, Tone::Emphasis));
                cells.push(Cell::currency(record.cost_of_living, Tone::Muted));

                Row {
                    cells,
                    highlighted: Some(idx) == retirement_index,
                }
            })
            .collect();

        Self {
            title: household_name(&params.primary, params.partner.as_ref()),
            assumptions: format!(
                "Assumptions: Savings Increase {}% | Inflation {}%",
                format::plain_number(params.annual_savings_increase),
                format::plain_number(params.inflation_rate)
            ),
            columns,
            rows,
        }
    }

    /// Fixed-width rendering. The highlighted row is marked with `>`.
    pub fn to_text_table(&self) -> String {
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.cells.get(idx))
                    .map(|cell| cell.text.chars().count())
                    .chain(std::iter::once(column.header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let render_line = |marker: char, texts: Vec<&str>| -> String {
            let padded: Vec<String> = texts
                .iter()
                .zip(self.columns.iter().zip(widths.iter()))
                .map(|(text, (column, &width))| match column.align {
                    Align::Left => format!("{text:<width$}"),
                    Align::Right => format!("{text:>width$}"),
                })
                .collect();
            format!("{marker} {}", padded.join("  ")).trim_end().to_string()
        };

        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&self.assumptions);
        out.push_str("\n\n");
        out.push_str(&render_line(
            ' ',
            self.columns.iter().map(|c| c.header.as_str()).collect(),
        ));
        out.push('\n');
        let rule_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        out.push_str(&format!("  {}\n", "-".repeat(rule_width)));
        for row in &self.rows {
            let marker = if row.highlighted { '>' } else { ' ' };
            out.push_str(&render_line(
                marker,
                row.cells.iter().map(|c| c.text.as_str()).collect(),
            ));
            out.push('\n');
        }
        out
    }
}

fn left(header: &str) -> Column {
    Column {
        header: header.to_string(),
        align: Align::Left,
    }
}

fn right(header: &str) -> Column {
    Column {
        header: header.to_string(),
        align: Align::Right,
    }
}
