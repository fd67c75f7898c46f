//! CSV → rows.
//!
//! No type inference: every cell stays the exact text it was in the file.

use tabula_core::Fields;
use tabula_core::error::IngestError;
use tracing::debug;

use crate::malformed;

pub(crate) fn parse(filename: &str, content: &[u8]) -> Result<Vec<Fields>, IngestError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content);

    let headers = reader
        .headers()
        .map_err(|e| malformed(filename, e))?
        .clone();
    let columns = column_names(headers.iter());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| malformed(filename, e))?;

        if record.len() > columns.len() {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(malformed(
                filename,
                format!(
                    "line {line}: expected {} fields, found {}",
                    columns.len(),
                    record.len()
                ),
            ));
        }

        let fields: Fields = columns
            .iter()
            .enumerate()
            .map(|(i, column)| (column.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(fields);
    }

    debug!(file = %filename, rows = rows.len(), columns = columns.len(), "CSV parsed");
    Ok(rows)
}

/// Header cells as unique keys.
///
/// Empty names become `Unnamed: {i}`; repeats get `.1`, `.2`, ... so no
/// column silently overwrites another.
fn column_names<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (i, raw) in headers.enumerate() {
        let base = if raw.is_empty() {
            format!("Unnamed: {i}")
        } else {
            raw.to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while names.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        names.push(candidate);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(content: &str) -> Result<Vec<Fields>, IngestError> {
        parse("test.csv", content.as_bytes())
    }

    #[test]
    fn rows_follow_file_order() {
        let rows = parse_str("name,dept\nAlice,HR\nBob,Eng\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), Some("Alice"));
        assert_eq!(rows[1].get("dept"), Some("Eng"));
        assert_eq!(rows[0].keys().collect::<Vec<_>>(), vec!["name", "dept"]);
    }

    #[test]
    fn values_are_not_coerced() {
        let rows = parse_str("id,salary,active\n007,1e3,TRUE\n").unwrap();
        assert_eq!(rows[0].get("id"), Some("007"));
        assert_eq!(rows[0].get("salary"), Some("1e3"));
        assert_eq!(rows[0].get("active"), Some("TRUE"));
    }

    #[test]
    fn missing_cells_become_empty() {
        let rows = parse_str("a,b,c\n1\n1,,3\n").unwrap();
        assert_eq!(rows[0].to_json(), r#"{"a":"1","b":"","c":""}"#);
        assert_eq!(rows[1].get("b"), Some(""));
    }

    #[test]
    fn quoted_cells_keep_commas_and_newlines() {
        let rows = parse_str("name,note\n\"Smith, J\",\"line one\nline two\"\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some("Smith, J"));
        assert_eq!(rows[0].get("note"), Some("line one\nline two"));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let rows = parse_str("a,b\n1,2\n\n3,4\n").unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn quoted_empty_line_is_a_row() {
        let rows = parse_str("name\nAlice\n\"\"\nBob\n").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].get("name"), Some(""));
        assert_eq!(rows[2].get("name"), Some("Bob"));
    }

    #[test]
    fn too_many_cells_is_malformed() {
        let err = parse_str("a,b\n1,2,3\n").unwrap_err();
        match err {
            IngestError::Malformed { filename, reason } => {
                assert_eq!(filename, "test.csv");
                assert!(reason.contains("line 2"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let err = parse("bad.csv", b"name\n\xff\xfe\n").unwrap_err();
        assert!(matches!(err, IngestError::Malformed { .. }));
    }

    #[test]
    fn duplicate_and_empty_headers_are_renamed() {
        let names = column_names(["a", "a", "", "a"].into_iter());
        assert_eq!(names, vec!["a", "a.1", "Unnamed: 2", "a.2"]);
    }
}
