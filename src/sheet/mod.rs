use chrono::{DateTime, NaiveDate, Utc};
use rust_xlsxwriter::{Format, FormatAlign, Workbook, XlsxError};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::backlog::Comment;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Failed to write Excel workbook: {0}")]
    Xlsx(#[from] XlsxError),
}

const SHEET_NAME: &str = "Comments";
const HEADERS: [&str; 4] = ["Location", "Author", "Date", "Comment"];
/// Comment bodies and locations are long multi-line values; the comment
/// column gets most of the width, the date column the least.
const COLUMN_WIDTHS: [f64; 4] = [30.0, 20.0, 15.0, 100.0];

/// Render a timestamp the way it appears in the date column.
pub fn format_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y/%m/%d").to_string()
}

/// Deterministic workbook filename:
/// `{project}_{repository}_{pull request summary}_{yyyyMMdd}.xlsx`.
///
/// Components are used verbatim; nothing is escaped or sanitized, and an
/// existing file at the resulting path is overwritten on save.
pub fn report_filename(
    project: &str,
    repository: &str,
    summary: &str,
    date: NaiveDate,
) -> String {
    format!(
        "{}_{}_{}_{}.xlsx",
        project,
        repository,
        summary,
        date.format("%Y%m%d")
    )
}

/// One sheet row per comment, in header-column order.
fn build_rows(comments: &[Comment]) -> Vec<[String; 4]> {
    comments
        .iter()
        .map(|comment| {
            [
                comment.location_label(),
                comment.created_user.name.clone(),
                format_date(&comment.created),
                comment.content.clone(),
            ]
        })
        .collect()
}

/// Write the comment sheet to `path`: header row, one row per comment,
/// fixed column widths, every cell top-aligned with text wrapping.
pub fn write_comment_sheet(path: &Path, comments: &[Comment]) -> Result<(), SheetError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let cell_style = Format::new().set_align(FormatAlign::Top).set_text_wrap();

    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }
    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &cell_style)?;
    }
    for (i, row) in build_rows(comments).iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            sheet.write_string_with_format((i + 1) as u32, col as u16, value.as_str(), &cell_style)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// Build and save the report in the current working directory, named after
/// the selected hierarchy and today's date. Returns the filename.
#[instrument(skip(comments), fields(comments = comments.len()))]
pub fn generate(
    project: &str,
    repository: &str,
    summary: &str,
    comments: &[Comment],
) -> Result<String, SheetError> {
    let filename = report_filename(project, repository, summary, Utc::now().date_naive());
    debug!(%filename, "saving workbook");
    write_comment_sheet(Path::new(&filename), comments)?;
    Ok(filename)
}
