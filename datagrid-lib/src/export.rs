//! Delimited-text export of the derived rows.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Deserialize;
use serde::Serialize;

use crate::error::ExportError;
use crate::model::{Column, GridRow};

/// File format label of an export. Both produce delimited text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    /// CSV content under an `.xlsx` name, for hosts that open it in a spreadsheet.
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(format!("unknown export format '{}'", s)),
        }
    }
}

/// Which derived rows an export writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportOrder {
    /// Filtered and searched rows in source order.
    #[default]
    Filtered,
    /// Filtered and searched rows in the current sort order.
    Sorted,
}

/// A finished export, ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content: String,
    pub row_count: usize,
}

/// Builds the artifact name from a caller-supplied base name.
///
/// A blank base falls back to `export`; an extension already matching the
/// format is not repeated.
pub fn export_file_name(base: &str, format: ExportFormat) -> String {
    let base = base.trim();
    let base = if base.is_empty() { "export" } else { base };
    let suffix = format!(".{}", format.extension());
    if base.to_ascii_lowercase().ends_with(&suffix) {
        base.to_string()
    } else {
        format!("{}{}", base, suffix)
    }
}

/// Writes rows as delimited text.
///
/// The header row carries the column headers as-is (quoted only when they
/// need it); every data value is quoted with internal quotes doubled.
#[derive(Debug, Clone, Copy)]
pub struct Exporter {
    delimiter: u8,
}

impl Exporter {
    pub fn new(delimiter: char) -> Result<Self, ExportError> {
        let delimiter = u8::try_from(delimiter)
            .ok()
            .filter(|b| b.is_ascii() && *b != b'"' && *b != b'\n' && *b != b'\r')
            .ok_or(ExportError::InvalidDelimiter(delimiter))?;
        Ok(Self { delimiter })
    }

    pub fn delimiter(&self) -> char {
        char::from(self.delimiter)
    }

    fn writer(&self, quote_style: QuoteStyle) -> WriterBuilder {
        let mut builder = WriterBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote_style(quote_style)
            .double_quote(true)
            .terminator(Terminator::Any(b'\n'));
        builder
    }

    /// Renders `rows` restricted to `columns`, in column order.
    pub fn render<'a, R, I>(&self, columns: &[&Column], rows: I) -> Result<String, ExportError>
    where
        R: GridRow + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let mut header = self
            .writer(QuoteStyle::Necessary)
            .from_writer(Vec::new());
        header.write_record(columns.iter().map(|c| c.header.as_str()))?;
        let buffer = header.into_inner().map_err(|e| e.into_error())?;

        let mut body = self.writer(QuoteStyle::Always).from_writer(buffer);
        for row in rows {
            body.write_record(columns.iter().map(|c| row.value(&c.field).to_text()))?;
        }
        let bytes = body.into_inner().map_err(|e| e.into_error())?;

        Ok(String::from_utf8(bytes)?)
    }

    /// Renders rows and names the result.
    pub fn export<'a, R, I>(
        &self,
        base_name: &str,
        format: ExportFormat,
        columns: &[&Column],
        rows: I,
    ) -> Result<ExportArtifact, ExportError>
    where
        R: GridRow + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let rows: Vec<&R> = rows.into_iter().collect();
        let content = self.render(columns, rows.iter().copied())?;
        let artifact = ExportArtifact {
            file_name: export_file_name(base_name, format),
            content,
            row_count: rows.len(),
        };
        log::debug!(
            "Exported {} rows x {} columns to {}",
            artifact.row_count,
            columns.len(),
            artifact.file_name
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;

    #[test]
    fn test_values_are_quoted_and_escaped() {
        let columns = [Column::new("name", "Name"), Column::new("note", "Note")];
        let columns: Vec<&Column> = columns.iter().collect();
        let rows = vec![Record::new("1").set("name", "Ann").set("note", r#"say "hi""#)];

        let csv = Exporter::new(',').unwrap().render(&columns, &rows).unwrap();
        assert_eq!(csv, "Name,Note\n\"Ann\",\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn test_missing_values_export_empty() {
        let columns = [Column::new("a", "A"), Column::new("b", "B")];
        let columns: Vec<&Column> = columns.iter().collect();
        let rows = vec![Record::new("1").set("a", 5)];

        let csv = Exporter::new(';').unwrap().render(&columns, &rows).unwrap();
        assert_eq!(csv, "A;B\n\"5\";\"\"\n");
    }

    #[test]
    fn test_rejects_multibyte_delimiter() {
        assert!(matches!(
            Exporter::new('§'),
            Err(ExportError::InvalidDelimiter('§'))
        ));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(export_file_name("report", ExportFormat::Csv), "report.csv");
        assert_eq!(export_file_name("report.xlsx", ExportFormat::Xlsx), "report.xlsx");
        assert_eq!(export_file_name("  ", ExportFormat::Xlsx), "export.xlsx");
    }
}
