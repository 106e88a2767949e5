use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::error::DataFormatError;
use super::model::{
    Dataset, PublicationRecord, Strategy, TopicId, TopicNames, YEAR_MAX, YEAR_MIN,
};

type Result<T> = std::result::Result<T, DataFormatError>;

// ---------------------------------------------------------------------------
// Column naming
// ---------------------------------------------------------------------------

const TOPIC: &str = "Search_Topic_ID";
const STRATEGY: &str = "Search_Level";
const YEAR: &str = "Year";
const COUNT: &str = "Record_Count";

/// Accepted header spellings per column, compared case-insensitively.
const TOPIC_ALIASES: &[&str] = &[TOPIC, "topic", "topic_id"];
const STRATEGY_ALIASES: &[&str] = &[STRATEGY, "strategy", "search_strategy"];
const YEAR_ALIASES: &[&str] = &[YEAR, "year"];
const COUNT_ALIASES: &[&str] = &[COUNT, "count", "record_count"];
const NAME_ALIASES: &[&str] = &["Search_Topic", "topic_name"];

fn find_column<'a, I>(names: I, aliases: &[&str]) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .position(|n| aliases.iter().any(|a| a.eq_ignore_ascii_case(n.trim())))
}

/// Positions of the recognised columns in a header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    topic: usize,
    strategy: usize,
    year: usize,
    count: usize,
    topic_name: Option<usize>,
}

impl Columns {
    fn resolve(headers: &[&str]) -> Result<Self> {
        let required = |aliases: &[&str], column: &'static str| {
            find_column(headers.iter().copied(), aliases)
                .ok_or(DataFormatError::MissingColumn(column))
        };
        Ok(Columns {
            topic: required(TOPIC_ALIASES, TOPIC)?,
            strategy: required(STRATEGY_ALIASES, STRATEGY)?,
            year: required(YEAR_ALIASES, YEAR)?,
            count: required(COUNT_ALIASES, COUNT)?,
            topic_name: find_column(headers.iter().copied(), NAME_ALIASES),
        })
    }
}

// ---------------------------------------------------------------------------
// Cell – one raw value before validation
// ---------------------------------------------------------------------------

/// Untyped cell as it comes out of CSV text, JSON or an Arrow column.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

impl Cell {
    fn as_integer(&self, row: usize, column: &'static str) -> Result<i64> {
        let not_numeric = |value: String| DataFormatError::NotNumeric { row, column, value };
        match self {
            Cell::Integer(i) => Ok(*i),
            // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
            Cell::Float(f)
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                Ok(*f as i64)
            }
            Cell::Float(f) => Err(not_numeric(f.to_string())),
            Cell::Text(s) => match guess_cell(s) {
                Cell::Text(_) | Cell::Null => Err(not_numeric(s.clone())),
                parsed => parsed
                    .as_integer(row, column)
                    .map_err(|_| not_numeric(s.clone())),
            },
            Cell::Null => Err(not_numeric("<null>".to_string())),
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            Cell::Text(s) => Some(s.clone()),
            Cell::Integer(i) => Some(i.to_string()),
            Cell::Float(f) => Some(f.to_string()),
            Cell::Null => None,
        }
    }
}

fn guess_cell(s: &str) -> Cell {
    let s = s.trim();
    if s.is_empty() {
        return Cell::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Cell::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Cell::Float(f);
    }
    Cell::Text(s.to_string())
}

fn checked_range(row: usize, column: &'static str, value: i64, min: i64, max: i64) -> Result<i64> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(DataFormatError::OutOfRange {
            row,
            column,
            value,
            min,
            max,
        })
    }
}

/// Validate the four required cells of one row.
fn build_record(
    row: usize,
    topic: &Cell,
    strategy: &Cell,
    year: &Cell,
    count: &Cell,
) -> Result<PublicationRecord> {
    let topic_raw = topic.as_integer(row, TOPIC)?;
    let topic = u8::try_from(topic_raw)
        .ok()
        .and_then(TopicId::new)
        .ok_or(DataFormatError::OutOfRange {
            row,
            column: TOPIC,
            value: topic_raw,
            min: 0,
            max: i64::from(TopicId::COUNT) - 1,
        })?;

    let strategy_text = strategy.as_text().unwrap_or_default();
    let strategy: Strategy =
        strategy_text
            .parse()
            .map_err(|_| DataFormatError::UnknownStrategy {
                row,
                value: strategy_text.clone(),
            })?;

    let year = year.as_integer(row, YEAR)?;
    let year = checked_range(row, YEAR, year, i64::from(YEAR_MIN), i64::from(YEAR_MAX))? as u16;

    let count = count.as_integer(row, COUNT)?;
    let count = checked_range(row, COUNT, count, 0, i64::MAX)? as u64;

    Ok(PublicationRecord {
        topic,
        strategy,
        year,
        count,
    })
}

/// Accumulates validated rows and topic names.
#[derive(Default)]
struct DatasetBuilder {
    records: Vec<PublicationRecord>,
    topic_names: TopicNames,
}

impl DatasetBuilder {
    fn push(&mut self, record: PublicationRecord, topic_name: Option<&Cell>) {
        if let Some(name) = topic_name.and_then(Cell::as_text) {
            self.topic_names.insert_first(record.topic, &name);
        }
        self.records.push(record);
    }

    fn finish(self) -> Dataset {
        Dataset::new(self.records, self.topic_names)
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a publication table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line
/// * `.json`    – `[{ "Year": 2000, "Search_Topic_ID": 0, ... }, ...]`
/// * `.parquet` – flat table with integer and string columns
pub fn load(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(open(path)?),
        "json" => load_json(open(path)?),
        "parquet" | "pq" => load_parquet(open(path)?),
        other => return Err(DataFormatError::UnsupportedExtension(other.to_string())),
    }?;

    log::info!(
        "Loaded {} publication records from {}",
        dataset.len(),
        path.display()
    );
    Ok(dataset)
}

fn open(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|source| DataFormatError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row naming the columns, then one record per line.
/// Unrecognised columns (e.g. `Search_Level_Description`) are ignored.
pub fn load_csv<R: Read>(source: R) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(source);
    let headers = reader.headers()?.clone();
    let columns = Columns::resolve(&headers.iter().collect::<Vec<_>>())?;

    let mut builder = DatasetBuilder::default();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let cell = |idx: usize| guess_cell(record.get(idx).unwrap_or(""));

        let publication = build_record(
            row_no,
            &cell(columns.topic),
            &cell(columns.strategy),
            &cell(columns.year),
            &cell(columns.count),
        )?;
        let name = columns.topic_name.map(cell);
        builder.push(publication, name.as_ref());
    }

    Ok(builder.finish())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Year": 2000, "Search_Topic_ID": 1, "Search_Level": "TS", "Record_Count": 5 },
///   ...
/// ]
/// ```
pub fn load_json<R: Read>(source: R) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_reader(source)?;
    let rows = root
        .as_array()
        .ok_or_else(|| DataFormatError::Malformed("expected top-level JSON array".into()))?;

    let mut builder = DatasetBuilder::default();
    for (row_no, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| DataFormatError::Malformed(format!("row {row_no} is not a JSON object")))?;

        let field = |aliases: &[&str], column: &'static str| {
            json_lookup(obj, aliases)
                .map(json_to_cell)
                .ok_or(DataFormatError::MissingColumn(column))
        };
        let publication = build_record(
            row_no,
            &field(TOPIC_ALIASES, TOPIC)?,
            &field(STRATEGY_ALIASES, STRATEGY)?,
            &field(YEAR_ALIASES, YEAR)?,
            &field(COUNT_ALIASES, COUNT)?,
        )?;
        let name = json_lookup(obj, NAME_ALIASES).map(json_to_cell);
        builder.push(publication, name.as_ref());
    }

    Ok(builder.finish())
}

fn json_lookup<'a>(obj: &'a Map<String, JsonValue>, aliases: &[&str]) -> Option<&'a JsonValue> {
    obj.iter()
        .find(|(key, _)| aliases.iter().any(|a| a.eq_ignore_ascii_case(key.trim())))
        .map(|(_, value)| value)
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        // Strings stay text so codes such as "TS" are never coerced.
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the publication table.
///
/// Integer columns may use any signed/unsigned width; float columns are
/// accepted when every value is integral. Works with files written by both
/// **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
pub fn load_parquet(file: std::fs::File) -> Result<Dataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let mut dataset = DatasetBuilder::default();
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        let columns = Columns::resolve(&names)?;

        for row in 0..batch.num_rows() {
            let cell = |idx: usize| arrow_cell(batch.column(idx), row);
            let publication = build_record(
                row_offset + row,
                &cell(columns.topic),
                &cell(columns.strategy),
                &cell(columns.year),
                &cell(columns.count),
            )?;
            let name = columns.topic_name.map(cell);
            dataset.push(publication, name.as_ref());
        }
        row_offset += batch.num_rows();
    }

    Ok(dataset.finish())
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> Cell {
    if col.is_null(row) {
        return Cell::Null;
    }
    match col.data_type() {
        DataType::Utf8 => Cell::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Cell::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => Cell::Integer(col.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => Cell::Integer(col.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => Cell::Integer(col.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => Cell::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => Cell::Integer(col.as_primitive::<UInt8Type>().value(row).into()),
        DataType::UInt16 => Cell::Integer(col.as_primitive::<UInt16Type>().value(row).into()),
        DataType::UInt32 => Cell::Integer(col.as_primitive::<UInt32Type>().value(row).into()),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v)
                .map(Cell::Integer)
                .unwrap_or_else(|_| Cell::Text(v.to_string()))
        }
        DataType::Float32 => Cell::Float(col.as_primitive::<Float32Type>().value(row).into()),
        DataType::Float64 => Cell::Float(col.as_primitive::<Float64Type>().value(row)),
        other => Cell::Text(format!("{other:?}")),
    }
}

// ---------------------------------------------------------------------------
// Load cache
// ---------------------------------------------------------------------------

/// Memoizes [`load`] per file so a static source is parsed once per process.
#[derive(Debug, Default)]
pub struct DatasetCache {
    loaded: HashMap<PathBuf, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Dataset>> {
        let key = path.canonicalize().map_err(|source| DataFormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(dataset) = self.loaded.get(&key) {
            log::debug!("Dataset cache hit for {}", key.display());
            return Ok(Arc::clone(dataset));
        }
        let dataset = Arc::new(load(&key)?);
        self.loaded.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Forget the dataset cached for `path` so the next request re-reads it.
    pub fn evict(&mut self, path: &Path) -> Option<Arc<Dataset>> {
        let key = path.canonicalize().ok()?;
        self.loaded.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{Int32Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use pretty_assertions::assert_eq;

    use super::*;

    const DETAILED: &str = "\
Year,Search_Topic_ID,Search_Topic,Search_Level,Search_Level_Description,Record_Count
2000,1,Ionic Liquids,TS,Title + Abstract + Keywords,5
2001,1,Ionic Liquids,TS,Title + Abstract + Keywords,10
2001,0,ILs in Batteries,KW,Title + Keywords,3
";

    fn rec(topic: u8, strategy: Strategy, year: u16, count: u64) -> PublicationRecord {
        PublicationRecord {
            topic: TopicId::new(topic).unwrap(),
            strategy,
            year,
            count,
        }
    }

    #[test]
    fn loads_detailed_csv() {
        let ds = load_csv(DETAILED.as_bytes()).unwrap();
        assert_eq!(
            ds.records,
            vec![
                rec(1, Strategy::TS, 2000, 5),
                rec(1, Strategy::TS, 2001, 10),
                rec(0, Strategy::KW, 2001, 3),
            ]
        );
        assert_eq!(ds.topic_names.name(TopicId::new(1).unwrap()), "Ionic Liquids");
        assert_eq!(ds.topic_names.name(TopicId::new(4).unwrap()), "Topic 4");
    }

    #[test]
    fn accepts_short_column_names_in_any_order() {
        let csv = "count,year,strategy,topic\n7,1999,ti,2\n";
        let ds = load_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.records, vec![rec(2, Strategy::TI, 1999, 7)]);
    }

    #[test]
    fn accepts_integral_floats() {
        let csv = "Year,Search_Topic_ID,Search_Level,Record_Count\n2000.0,1,TS,5.0\n";
        let ds = load_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.records, vec![rec(1, Strategy::TS, 2000, 5)]);
    }

    #[test]
    fn missing_column_is_reported() {
        let csv = "Year,Search_Topic_ID,Search_Level\n2000,1,TS\n";
        let err = load_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataFormatError::MissingColumn("Record_Count")));
    }

    #[test]
    fn non_numeric_value_is_reported() {
        let csv = "Year,Search_Topic_ID,Search_Level,Record_Count\n2000,1,TS,many\n";
        let err = load_csv(csv.as_bytes()).unwrap_err();
        match err {
            DataFormatError::NotNumeric { row, column, value } => {
                assert_eq!((row, column, value.as_str()), (0, COUNT, "many"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let csv = "Year,Search_Topic_ID,Search_Level,Record_Count\n2000,1,TS,2.5\n";
        assert!(matches!(
            load_csv(csv.as_bytes()),
            Err(DataFormatError::NotNumeric { .. })
        ));
    }

    #[test]
    fn counts_beyond_i64_are_not_saturated() {
        let header = "Year,Search_Topic_ID,Search_Level,Record_Count\n";
        for count in ["1e30", "99999999999999999999", "9223372036854775808.0"] {
            let csv = format!("{header}2000,1,TS,{count}\n");
            match load_csv(csv.as_bytes()) {
                Err(DataFormatError::NotNumeric { column, value, .. }) => {
                    assert_eq!((column, value.as_str()), (COUNT, count));
                }
                other => panic!("{count}: unexpected result {other:?}"),
            }
        }

        let json = r#"[{"Year": 2000, "Search_Topic_ID": 1, "Search_Level": "TS", "Record_Count": 1e30}]"#;
        assert!(matches!(
            load_json(json.as_bytes()),
            Err(DataFormatError::NotNumeric { column: COUNT, .. })
        ));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let header = "Year,Search_Topic_ID,Search_Level,Record_Count\n";
        for row in ["1974,1,TS,5", "2025,1,TS,5", "2000,6,TS,5", "2000,1,TS,-1"] {
            let csv = format!("{header}{row}\n");
            let err = load_csv(csv.as_bytes()).unwrap_err();
            assert!(
                matches!(err, DataFormatError::OutOfRange { .. }),
                "{row}: {err}"
            );
        }
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let csv = "Year,Search_Topic_ID,Search_Level,Record_Count\n2000,1,AB,5\n";
        assert!(matches!(
            load_csv(csv.as_bytes()),
            Err(DataFormatError::UnknownStrategy { row: 0, .. })
        ));
    }

    #[test]
    fn loads_json_records() {
        let json = r#"[
            {"Year": 2000, "Search_Topic_ID": 3, "Search_Topic": "Electrodeposition",
             "Search_Level": "KW", "Record_Count": 12},
            {"year": 2001, "topic": 3, "strategy": "TS", "count": 40.0}
        ]"#;
        let ds = load_json(json.as_bytes()).unwrap();
        assert_eq!(
            ds.records,
            vec![rec(3, Strategy::KW, 2000, 12), rec(3, Strategy::TS, 2001, 40)]
        );
        assert_eq!(ds.topic_names.name(TopicId::new(3).unwrap()), "Electrodeposition");

        let err = load_json(r#"{"Year": 2000}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, DataFormatError::Malformed(_)));
    }

    #[test]
    fn loads_parquet_file() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Year", DataType::Int64, false),
            Field::new("Search_Topic_ID", DataType::Int32, false),
            Field::new("Search_Level", DataType::Utf8, false),
            Field::new("Record_Count", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![2010, 2011])),
                Arc::new(Int32Array::from(vec![5, 5])),
                Arc::new(StringArray::from(vec!["TI", "TI"])),
                Arc::new(Int64Array::from(vec![0, 8])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load(file.path()).unwrap();
        assert_eq!(
            ds.records,
            vec![rec(5, Strategy::TI, 2010, 0), rec(5, Strategy::TI, 2011, 8)]
        );
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = load(Path::new("publications.xlsx")).unwrap_err();
        assert!(matches!(err, DataFormatError::UnsupportedExtension(ext) if ext == "xlsx"));
    }

    #[test]
    fn cache_loads_each_path_once() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(DETAILED.as_bytes()).unwrap();
        file.flush().unwrap();

        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(file.path()).unwrap();
        let second = cache.get_or_load(file.path()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(first.len(), 3);

        assert!(cache.evict(file.path()).is_some());
        assert!(cache.is_empty());
        let third = cache.get_or_load(file.path()).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert!(cache.evict(Path::new("no/such/file.csv")).is_none());
    }
}
