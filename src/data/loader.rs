use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::{LoadError, ParseError};
use super::model::{Field, Record};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the salary dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – delimited text, delimiter detected from the header
/// * `.tsv`          – tab-separated text
/// * `.json`         – `[{ "salary": 139750, "sex": "Male", ... }, ...]`
/// * `.parquet`      – one column per field
///
/// Loading is fail-fast: the first malformed row aborts the load and no
/// partial dataset is returned.
pub fn load_file(path: &Path) -> Result<Vec<Record>, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" | "txt" => {
            let text = std::fs::read_to_string(path)?;
            let delimiter = detect_delimiter(&text);
            parse_delimited(&text, delimiter)?
        }
        "tsv" => parse_delimited(&std::fs::read_to_string(path)?, b'\t')?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };
    log::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

/// Pick whichever of `,` `;` `\t` occurs most often in the header line.
/// Ties and headers without any of them fall back to a comma.
pub fn detect_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    [b',', b';', b'\t']
        .into_iter()
        .rev()
        .max_by_key(|&d| header.bytes().filter(|&b| b == d).count())
        .filter(|&d| header.as_bytes().contains(&d))
        .unwrap_or(b',')
}

/// Parse delimited text with a header row.
///
/// The header must name every [`Field`] column (`salary`, `yrs.service`,
/// `yrs.since.phd`, `sex`, `rank`, `discipline`) in any order; other columns,
/// such as an unnamed row-number column, are ignored.
pub fn parse_delimited(text: &str, delimiter: u8) -> Result<Vec<Record>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let columns = ColumnIndex::locate(|name| headers.iter().position(|h| h == name))?;

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row?;
        let cell = |field: Field| row.get(columns.position(field)).unwrap_or("");
        records.push(build_record(i + 1, cell)?);
    }
    Ok(records)
}

/// Header position of every field.
struct ColumnIndex([usize; 6]);

impl ColumnIndex {
    fn locate(mut position: impl FnMut(&str) -> Option<usize>) -> Result<Self, LoadError> {
        let mut positions = [0; 6];
        for (slot, field) in positions.iter_mut().zip(Field::ALL) {
            *slot = position(field.column())
                .ok_or_else(|| LoadError::MissingColumn(field.column().to_string()))?;
        }
        Ok(ColumnIndex(positions))
    }

    fn position(&self, field: Field) -> usize {
        let slot = Field::ALL.iter().position(|&f| f == field).unwrap_or(0);
        self.0[slot]
    }
}

/// Assemble a record from per-field text cells.
fn build_record<'a>(row: usize, cell: impl Fn(Field) -> &'a str) -> Result<Record, ParseError> {
    let int = |field: Field| parse_int(row, field, cell(field));
    Ok(Record {
        discipline: cell(Field::Discipline).to_string(),
        sex: cell(Field::Sex).to_string(),
        rank: cell(Field::Rank).to_string(),
        salary: int(Field::Salary)?,
        yrs_service: int(Field::YrsService)?,
        yrs_since_phd: int(Field::YrsSincePhd)?,
    })
}

fn parse_int(row: usize, field: Field, value: &str) -> Result<i64, ParseError> {
    value.trim().parse::<i64>().map_err(|_| ParseError {
        row,
        column: field.column().to_string(),
        value: value.to_string(),
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "rank": "Prof", "discipline": "B", "yrs.since.phd": 19,
///     "yrs.service": 18, "sex": "Male", "salary": 139750 },
///   ...
/// ]
/// ```
///
/// Numeric fields may also be strings holding integers.
fn load_json(path: &Path) -> Result<Vec<Record>, LoadError> {
    let text = std::fs::read_to_string(path)?;
    parse_json(&text)
}

pub fn parse_json(text: &str) -> Result<Vec<Record>, LoadError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::InvalidData("expected top-level JSON array".into()))?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| LoadError::InvalidData(format!("row {} is not a JSON object", i + 1)))?;
        for field in Field::ALL {
            if !obj.contains_key(field.column()) {
                return Err(LoadError::MissingColumn(field.column().to_string()));
            }
        }
        let cells: Vec<String> = Field::ALL
            .iter()
            .map(|f| json_cell(&obj[f.column()]))
            .collect();
        let cell = |field: Field| {
            let slot = Field::ALL.iter().position(|&f| f == field).unwrap_or(0);
            cells[slot].as_str()
        };
        records.push(build_record(i + 1, cell)?);
    }
    Ok(records)
}

fn json_cell(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per field.
///
/// Numeric columns may be Int32, Int64 or Utf8; text columns may be Utf8,
/// LargeUtf8 or dictionary-encoded strings. Any other column type fails the
/// load.
fn load_parquet(path: &Path) -> Result<Vec<Record>, LoadError> {
    let file = std::fs::File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch?;
        let schema = batch.schema();
        let columns = ColumnIndex::locate(|name| schema.index_of(name).ok())?;
        let arrays = Field::ALL
            .iter()
            .map(|&f| decode_column(batch.column(columns.position(f)), f.column()))
            .collect::<Result<Vec<_>, _>>()?;

        for row in 0..batch.num_rows() {
            let cells: Vec<String> = arrays.iter().map(|col| arrow_cell(col, row)).collect();
            let cell = |field: Field| {
                let slot = Field::ALL.iter().position(|&f| f == field).unwrap_or(0);
                cells[slot].as_str()
            };
            records.push(build_record(records.len() + 1, cell)?);
        }
    }
    Ok(records)
}

/// Bring a column into one of the types [`arrow_cell`] reads.
/// Dictionary-encoded strings are unpacked to Utf8.
fn decode_column(col: &ArrayRef, name: &str) -> Result<ArrayRef, LoadError> {
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Int32 | DataType::Int64 => {
            Ok(Arc::clone(col))
        }
        DataType::Dictionary(_, values)
            if matches!(values.as_ref(), DataType::Utf8 | DataType::LargeUtf8) =>
        {
            Ok(cast(col, &DataType::Utf8)?)
        }
        other => Err(LoadError::InvalidData(format!(
            "column `{name}` has unsupported type {other}"
        ))),
    }
}

/// Render one decoded Arrow cell as text so every format shares the same
/// parsing.
fn arrow_cell(col: &ArrayRef, row: usize) -> String {
    if col.is_null(row) {
        return String::new();
    }
    match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row).to_string(),
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row).to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALARIES: &str = "\
\"\",\"rank\",\"discipline\",\"yrs.since.phd\",\"yrs.service\",\"sex\",\"salary\"
\"1\",\"Prof\",\"B\",19,18,\"Male\",139750
\"2\",\"Prof\",\"B\",20,16,\"Male\",173200
\"3\",\"AsstProf\",\"B\",4,3,\"Male\",79750
";

    #[test]
    fn parses_r_style_csv_with_row_number_column() {
        let records = parse_delimited(SALARIES, b',').unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            Record {
                discipline: "B".into(),
                sex: "Male".into(),
                rank: "Prof".into(),
                salary: 139750,
                yrs_service: 18,
                yrs_since_phd: 19,
            }
        );
        assert_eq!(records[2].rank, "AsstProf");
    }

    #[test]
    fn malformed_number_fails_the_whole_load() {
        let text = "rank,discipline,yrs.since.phd,yrs.service,sex,salary\n\
                    Prof,A,10,9,Male,100\n\
                    Prof,A,12,eleven,Female,110\n";
        match parse_delimited(text, b',') {
            Err(LoadError::Parse(e)) => {
                assert_eq!(e.row, 2);
                assert_eq!(e.column, "yrs.service");
                assert_eq!(e.value, "eleven");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn fractional_values_are_rejected() {
        let text = "rank,discipline,yrs.since.phd,yrs.service,sex,salary\nProf,A,10,9,Male,100.5\n";
        assert!(matches!(parse_delimited(text, b','), Err(LoadError::Parse(_))));
    }

    #[test]
    fn missing_column_is_reported() {
        let text = "rank,discipline,yrs.service,sex,salary\nProf,A,9,Male,100\n";
        match parse_delimited(text, b',') {
            Err(LoadError::MissingColumn(c)) => assert_eq!(c, "yrs.since.phd"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn header_only_yields_no_records() {
        let text = "rank,discipline,yrs.since.phd,yrs.service,sex,salary\n";
        assert!(parse_delimited(text, b',').unwrap().is_empty());
    }

    #[test]
    fn detects_semicolons_and_tabs() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
        assert_eq!(detect_delimiter("a,b,c"), b',');
        assert_eq!(detect_delimiter("single"), b',');
    }

    #[test]
    fn json_accepts_numbers_and_numeric_strings() {
        let text = r#"[
            {"rank": "Prof", "discipline": "A", "yrs.since.phd": 10, "yrs.service": "9",
             "sex": "Female", "salary": 101000}
        ]"#;
        let records = parse_json(text).unwrap();
        assert_eq!(records[0].yrs_service, 9);
        assert_eq!(records[0].salary, 101000);
    }

    #[test]
    fn json_rejects_non_integer_salary() {
        let text = r#"[{"rank": "Prof", "discipline": "A", "yrs.since.phd": 10,
                        "yrs.service": 9, "sex": "Female", "salary": 1.5}]"#;
        assert!(matches!(parse_json(text), Err(LoadError::Parse(_))));
    }

    // ---- file round trips ----

    use std::io::Write;

    use arrow::array::{DictionaryArray, Float64Array, Int32Array, Int64Array, StringArray};
    use arrow::datatypes::{Field as ArrowField, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    fn write_parquet(columns: Vec<(&str, ArrayRef)>) -> tempfile::NamedTempFile {
        let schema = Arc::new(Schema::new(
            columns
                .iter()
                .map(|(name, col)| ArrowField::new(*name, col.data_type().clone(), true))
                .collect::<Vec<_>>(),
        ));
        let batch =
            RecordBatch::try_new(schema.clone(), columns.into_iter().map(|(_, c)| c).collect()).unwrap();
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        file
    }

    fn text(values: &[&str]) -> ArrayRef {
        Arc::new(StringArray::from(values.to_vec()))
    }

    fn faculty_columns() -> Vec<(&'static str, ArrayRef)> {
        vec![
            ("rank", text(&["Prof", "AsstProf"])),
            ("discipline", text(&["B", "A"])),
            ("yrs.since.phd", Arc::new(Int32Array::from(vec![19, 4]))),
            ("yrs.service", text(&["18", "3"])),
            ("sex", text(&["Male", "Female"])),
            ("salary", Arc::new(Int64Array::from(vec![139750, 79750]))),
        ]
    }

    fn replace(columns: &mut [(&str, ArrayRef)], name: &str, col: ArrayRef) {
        if let Some(slot) = columns.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = col;
        }
    }

    #[test]
    fn parquet_reads_int32_int64_and_numeric_text() {
        let file = write_parquet(faculty_columns());
        let records = load_file(file.path()).unwrap();
        assert_eq!(
            records,
            vec![
                Record {
                    discipline: "B".into(),
                    sex: "Male".into(),
                    rank: "Prof".into(),
                    salary: 139750,
                    yrs_service: 18,
                    yrs_since_phd: 19,
                },
                Record {
                    discipline: "A".into(),
                    sex: "Female".into(),
                    rank: "AsstProf".into(),
                    salary: 79750,
                    yrs_service: 3,
                    yrs_since_phd: 4,
                },
            ]
        );
    }

    #[test]
    fn parquet_decodes_dictionary_strings() {
        let mut columns = faculty_columns();
        let sex: DictionaryArray<Int32Type> = vec!["Male", "Female"].into_iter().collect();
        replace(&mut columns, "sex", Arc::new(sex));
        let file = write_parquet(columns);

        let sexes: Vec<String> = load_file(file.path()).unwrap().into_iter().map(|r| r.sex).collect();
        assert_eq!(sexes, vec!["Male", "Female"]);
    }

    #[test]
    fn parquet_rejects_unsupported_column_types() {
        let mut columns = faculty_columns();
        replace(&mut columns, "salary", Arc::new(Float64Array::from(vec![1.0, 2.0])));
        let file = write_parquet(columns);

        match load_file(file.path()) {
            Err(LoadError::InvalidData(msg)) => assert!(msg.contains("salary"), "{msg}"),
            other => panic!("expected invalid data, got {other:?}"),
        }
    }

    #[test]
    fn parquet_missing_column_is_reported() {
        let columns = faculty_columns().into_iter().filter(|(n, _)| *n != "rank").collect();
        let file = write_parquet(columns);
        match load_file(file.path()) {
            Err(LoadError::MissingColumn(c)) => assert_eq!(c, "rank"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn parquet_malformed_numeric_text_fails() {
        let mut columns = faculty_columns();
        replace(&mut columns, "yrs.service", text(&["18", "three"]));
        let file = write_parquet(columns);
        match load_file(file.path()) {
            Err(LoadError::Parse(e)) => {
                assert_eq!(e.row, 2);
                assert_eq!(e.column, "yrs.service");
                assert_eq!(e.value, "three");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn json_and_tsv_files_load_by_extension() {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            json,
            r#"[{{"rank": "AssocProf", "discipline": "A", "yrs.since.phd": 12,
                 "yrs.service": 8, "sex": "Female", "salary": 95000}}]"#
        )
        .unwrap();
        let records = load_file(json.path()).unwrap();
        assert_eq!(records[0].rank, "AssocProf");
        assert_eq!(records[0].salary, 95000);

        let mut tsv = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
        writeln!(tsv, "rank\tdiscipline\tyrs.since.phd\tyrs.service\tsex\tsalary").unwrap();
        writeln!(tsv, "Prof\tB\t30\t25\tMale\t150000").unwrap();
        let records = load_file(tsv.path()).unwrap();
        assert_eq!(records[0].yrs_service, 25);
        assert_eq!(records[0].discipline, "B");
    }
}
