//! CSV and Excel export

use std::path::Path;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::Error;
use crate::model::ColumnDescriptor;
use crate::model::Row;
use crate::model::Value;

/// An export ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub filename: String,
    pub mime_type: &'static str,
    pub contents: String,
}

impl Export {
    /// Writes the export into `dir` under its own filename.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, Error> {
        let path = dir.as_ref().join(&self.filename);
        std::fs::write(&path, &self.contents)?;
        Ok(path)
    }
}

/// Lowercases a title and joins its words with `-`.
pub fn slug(title: &str) -> String {
    title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// `<slug>-export-<YYYY-MM-DD>.<extension>`
pub fn export_filename(title: &str, date: NaiveDate, extension: &str) -> String {
    format!("{}-export-{}.{}", slug(title), date.format("%Y-%m-%d"), extension)
}

fn quote_csv(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Renders rows as CSV: quoted column titles, then one quoted line per row.
pub fn to_csv(columns: &[&ColumnDescriptor], rows: &[&Row]) -> String {
    let header = columns
        .iter()
        .map(|column| quote_csv(&column.title))
        .collect::<Vec<_>>()
        .join(",");

    let lines = rows.iter().map(|row| {
        columns
            .iter()
            .map(|column| quote_csv(&row.value(&column.accessor).to_string()))
            .collect::<Vec<_>>()
            .join(",")
    });

    std::iter::once(header)
        .chain(lines)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape special XML characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn excel_cell(row: &Row, accessor: &str) -> String {
    match row.value(accessor) {
        Value::Int(n) => format!("<Cell><Data ss:Type=\"Number\">{}</Data></Cell>", n),
        Value::Float(n) => format!("<Cell><Data ss:Type=\"Number\">{}</Data></Cell>", n),
        other => format!(
            "<Cell><Data ss:Type=\"String\">{}</Data></Cell>",
            escape_xml(&other.to_string())
        ),
    }
}

/// Renders rows as an Excel 2003 XML spreadsheet.
pub fn to_spreadsheet_xml(sheet: &str, columns: &[&ColumnDescriptor], rows: &[&Row]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <?mso-application progid=\"Excel.Sheet\"?>\n\
         <Workbook xmlns=\"urn:schemas-microsoft-com:office:spreadsheet\" \
         xmlns:ss=\"urn:schemas-microsoft-com:office:spreadsheet\">\n",
    );
    xml.push_str(&format!(" <Worksheet ss:Name=\"{}\">\n  <Table>\n", escape_xml(sheet)));

    xml.push_str("   <Row>");
    for column in columns {
        xml.push_str(&format!(
            "<Cell><Data ss:Type=\"String\">{}</Data></Cell>",
            escape_xml(&column.title)
        ));
    }
    xml.push_str("</Row>\n");

    for row in rows {
        xml.push_str("   <Row>");
        for column in columns {
            xml.push_str(&excel_cell(row, &column.accessor));
        }
        xml.push_str("</Row>\n");
    }

    xml.push_str("  </Table>\n </Worksheet>\n</Workbook>\n");
    xml
}
