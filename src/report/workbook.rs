use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet};

use super::{Align, Cell, CellFormat, Report, Tone};
use crate::error::Result;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const BRAND_BLUE: u32 = 0x0A437B;
const POSITIVE_GREEN: u32 = 0x16A34A;
const NEGATIVE_RED: u32 = 0xDC2626;
const MUTED_GRAY: u32 = 0x6B7280;
const HIGHLIGHT_FILL: u32 = 0xFFF9C4;
const HIGHLIGHT_BORDER: u32 = 0xEAB308;

const TITLE_ROW: u32 = 0;
const ASSUMPTIONS_ROW: u32 = 1;
const HEADER_ROW: u32 = 2;
const FIRST_BODY_ROW: u32 = 3;

/// Excel number format for a cell kind. Costs keep their parentheses as
/// literal text around a positive amount.
pub fn number_format(format: CellFormat) -> &'static str {
    match format {
        CellFormat::Text => "@",
        CellFormat::Integer => "0",
        CellFormat::Currency => "\"$\"#,##0",
        CellFormat::Cost => "\"($\"#,##0\")\"",
        CellFormat::Percent => "0.00%",
    }
}

/// Font colour a renderer uses for a tone. Plain cells keep the default.
pub fn tone_color(tone: Tone) -> Option<u32> {
    match tone {
        Tone::Plain => None,
        Tone::Positive => Some(POSITIVE_GREEN),
        Tone::Negative => Some(NEGATIVE_RED),
        Tone::Emphasis => Some(BRAND_BLUE),
        Tone::Muted => Some(MUTED_GRAY),
    }
}

fn cell_format(cell: &Cell, highlighted: bool) -> Format {
    let mut format = Format::new().set_num_format(number_format(cell.format));
    if let Some(rgb) = tone_color(cell.tone) {
        format = format.set_font_color(Color::RGB(rgb));
    }
    if cell.tone == Tone::Emphasis {
        format = format.set_bold();
    }
    if highlighted {
        format = format
            .set_background_color(Color::RGB(HIGHLIGHT_FILL))
            .set_border_top(FormatBorder::Medium)
            .set_border_top_color(Color::RGB(HIGHLIGHT_BORDER))
            .set_border_bottom(FormatBorder::Medium)
            .set_border_bottom_color(Color::RGB(HIGHLIGHT_BORDER));
    }
    format
}

fn column_width(header: &str, align: Align) -> f64 {
    match align {
        Align::Left => (header.chars().count() as f64 + 2.0).max(8.0),
        Align::Right => 18.0,
    }
}

fn fill_sheet(sheet: &mut Worksheet, report: &Report) -> Result<()> {
    sheet.set_name("Projection")?;

    let last_col = report.columns.len().saturating_sub(1) as u16;
    let title = Format::new()
        .set_bold()
        .set_font_size(16)
        .set_font_color(Color::RGB(BRAND_BLUE));
    if last_col > 0 {
        sheet.merge_range(TITLE_ROW, 0, TITLE_ROW, last_col, &report.title, &title)?;
    } else {
        sheet.write_string_with_format(TITLE_ROW, 0, &report.title, &title)?;
    }
    sheet.write_string_with_format(
        ASSUMPTIONS_ROW,
        0,
        &report.assumptions,
        &Format::new().set_italic().set_font_color(Color::RGB(MUTED_GRAY)),
    )?;

    let header = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(BRAND_BLUE));
    for (col, column) in report.columns.iter().enumerate() {
        let col = col as u16;
        sheet.set_column_width(col, column_width(&column.header, column.align))?;
        sheet.write_string_with_format(HEADER_ROW, col, &column.header, &header)?;
    }

    for (offset, row) in report.rows.iter().enumerate() {
        let row_num = FIRST_BODY_ROW + offset as u32;
        for (col, cell) in row.cells.iter().enumerate() {
            let col = col as u16;
            let format = cell_format(cell, row.highlighted);
            match cell.value {
                Some(number) => {
                    sheet.write_number_with_format(row_num, col, number, &format)?;
                }
                None => {
                    sheet.write_string_with_format(row_num, col, &cell.text, &format)?;
                }
            }
        }
    }
    Ok(())
}

/// Styled spreadsheet of the report: a merged title, the assumptions line, a
/// brand-coloured header, numeric cells with currency and percent formats,
/// tone colours, and the retirement year filled and bordered.
pub fn report_xlsx(report: &Report) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    fill_sheet(workbook.add_worksheet(), report)?;
    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{HouseholdParams, Person, project};

    fn sample_report() -> Report {
        let params = HouseholdParams {
            primary: Person::new("José", "García", 64),
            partner: None,
            retirement_age: 65,
            current_savings: 100_000.0,
            annual_savings: 10_000.0,
            annual_savings_increase: 0.0,
            pre_retirement_return: 5.0,
            post_retirement_return: 4.0,
            current_expenses: 20_000.0,
            inflation_rate: 0.0,
            life_expectancy: 66,
            start_year: 2025,
        };
        Report::build(&params, &project(&params))
    }

    #[test]
    fn number_formats_match_spreadsheet_conventions() {
        assert_eq!(number_format(CellFormat::Currency), "\"$\"#,##0");
        assert_eq!(number_format(CellFormat::Percent), "0.00%");
        assert_eq!(number_format(CellFormat::Cost), "\"($\"#,##0\")\"");
        assert_eq!(number_format(CellFormat::Integer), "0");
    }

    #[test]
    fn tones_map_to_font_colours() {
        assert_eq!(tone_color(Tone::Plain), None);
        assert_eq!(tone_color(Tone::Positive), Some(POSITIVE_GREEN));
        assert_eq!(tone_color(Tone::Negative), Some(NEGATIVE_RED));
        assert_eq!(tone_color(Tone::Emphasis), Some(BRAND_BLUE));
        assert_eq!(tone_color(Tone::Muted), Some(MUTED_GRAY));
    }

    #[test]
    fn highlighted_cells_get_fill_and_borders() {
        let report = sample_report();
        let retired = &report.rows[1];
        assert!(retired.highlighted);

        let cost = &retired.cells[5];
        assert_eq!(cost.format, CellFormat::Cost);
        let highlighted = cell_format(cost, true);
        let expected = Format::new()
            .set_num_format(number_format(CellFormat::Cost))
            .set_font_color(Color::RGB(NEGATIVE_RED))
            .set_background_color(Color::RGB(HIGHLIGHT_FILL))
            .set_border_top(FormatBorder::Medium)
            .set_border_top_color(Color::RGB(HIGHLIGHT_BORDER))
            .set_border_bottom(FormatBorder::Medium)
            .set_border_bottom_color(Color::RGB(HIGHLIGHT_BORDER));
        assert_eq!(highlighted, expected);
        assert_ne!(cell_format(cost, false), expected);
    }

    #[test]
    fn workbook_is_a_zip_package() {
        let bytes = report_xlsx(&sample_report()).expect("workbook should build");
        assert!(bytes.starts_with(b"PK"));
        assert!(bytes.len() > 1_000);
    }
}
