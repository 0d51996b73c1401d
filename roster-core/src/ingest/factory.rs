//! Build dynamic records from tabular input.

use super::table::{SheetContent, Table, TabularSource};
use crate::record::DynamicRecord;
use crate::store::Document;
use crate::{Error, Result};

/// One record per row, rows in order. Sheets are concatenated in iteration
/// order; a sheet that is not a table fails the whole build.
pub fn build(source: &TabularSource) -> Result<Vec<DynamicRecord>> {
    match source {
        TabularSource::Single(table) => Ok(build_from_table(table)),
        TabularSource::Sheeted(sheets) => {
            let mut records = Vec::new();
            for (name, content) in sheets {
                match content {
                    SheetContent::Table(table) => records.extend(build_from_table(table)),
                    SheetContent::Other(found) => {
                        return Err(Error::InputShape(format!(
                            "Sheet '{}' does not contain a table: {}",
                            name, found
                        )));
                    }
                }
            }
            Ok(records)
        }
    }
}

pub fn build_from_table(table: &Table) -> Vec<DynamicRecord> {
    table
        .rows()
        .iter()
        .map(|row| {
            DynamicRecord::from_fields(table.headers().iter().cloned().zip(row.iter().cloned()))
        })
        .collect()
}

/// One record per field map, bypassing table decoding.
pub fn build_from_rows<I>(rows: I) -> Vec<DynamicRecord>
where
    I: IntoIterator<Item = Document>,
{
    rows.into_iter().map(DynamicRecord::from_fields).collect()
}

/// Check that the first record carries every mandatory column.
///
/// Only the first record is inspected: all rows of one upload share a header.
pub fn validate_mandatory<M: AsRef<str>>(records: &[DynamicRecord], mandatory: &[M]) -> Result<()> {
    let first = records
        .first()
        .ok_or_else(|| Error::invalid("Uploaded file contains no data rows"))?;

    let missing: Vec<String> = mandatory
        .iter()
        .map(AsRef::as_ref)
        .filter(|column| !first.has_column(column))
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::missing_columns(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Cell;
    use indexmap::IndexMap;
    use serde_json::json;

    fn table(headers: &[&str], rows: Vec<Vec<Cell>>) -> Table {
        Table::new(headers.iter().map(|h| h.to_string()).collect(), rows)
    }

    #[test]
    fn test_build_single_table_preserves_order() {
        let rows = vec![vec!["Ada".into(), Cell::Int(36)], vec!["Bob".into(), Cell::Empty]];
        let t = table(&["Name", "Age"], rows);
        let records = build(&TabularSource::Single(t)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], json!("Ada"));
        assert_eq!(records[1]["age"], serde_json::Value::Null);
    }

    #[test]
    fn test_build_concatenates_sheets() {
        let mut sheets = IndexMap::new();
        let paris = table(&["Name"], vec![vec!["Ada".into()]]);
        let lyon = table(&["Name"], vec![vec!["Bob".into()], vec!["Cy".into()]]);
        sheets.insert("Paris".to_string(), SheetContent::Table(paris));
        sheets.insert("Lyon".to_string(), SheetContent::Table(lyon));
        let records = build(&TabularSource::Sheeted(sheets)).unwrap();
        let names: Vec<_> = records.iter().map(|r| r["name"].clone()).collect();
        assert_eq!(names, vec![json!("Ada"), json!("Bob"), json!("Cy")]);
    }

    #[test]
    fn test_non_table_sheet_fails_whole_build() {
        let mut sheets = IndexMap::new();
        let data = table(&["Name"], vec![vec!["Ada".into()]]);
        sheets.insert("Data".to_string(), SheetContent::Table(data));
        sheets.insert("Chart".to_string(), SheetContent::Other("chart sheet".into()));
        let err = build(&TabularSource::Sheeted(sheets)).unwrap_err();
        assert!(matches!(err, Error::InputShape(_)));
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_build_from_rows() {
        let first = json!({"Email Address": "a@x.com"}).as_object().cloned().unwrap();
        let rows = vec![first, Document::new()];
        let records = build_from_rows(rows);
        assert_eq!(records.len(), 2);
        assert!(records[0].has_column("EMAIL_ADDRESS"));
        assert!(records[1].is_empty());
    }

    #[test]
    fn test_validate_mandatory_checks_first_record() {
        let records = build_from_rows(vec![
            json!({"Name": "Ada", "Email Address": "a@x.com"}).as_object().cloned().unwrap(),
            Document::new(),
        ]);
        assert!(validate_mandatory(&records, &["NAME", "EMAIL_ADDRESS"]).is_ok());

        let required = ["NAME", "ROLE", "EMAIL_ADDRESS", "DEPARTMENT"];
        let err = validate_mandatory(&records, &required).unwrap_err();
        assert_eq!(err.errors(), vec!["ROLE".to_string(), "DEPARTMENT".to_string()]);
    }

    #[test]
    fn test_validate_mandatory_on_empty_batch() {
        let err = validate_mandatory::<&str>(&[], &["NAME"]).unwrap_err();
        assert_eq!(err.status(), 400);
    }
}
