use std::io::Write;

use serde::Serialize;

use super::error::ExportError;
use super::model::{PublicationRecord, TopicNames, YearRange};

/// One exported line. Field order is the CSV column order.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Year")]
    year: u16,
    #[serde(rename = "Search_Topic_ID")]
    topic_id: u8,
    #[serde(rename = "Search_Topic")]
    topic: &'a str,
    #[serde(rename = "Search_Level")]
    strategy: &'static str,
    #[serde(rename = "Record_Count")]
    count: u64,
}

/// Write `records` as CSV to `writer`.
///
/// Columns: `Year, Search_Topic_ID, Search_Topic, Search_Level, Record_Count`.
/// Rows are sorted by year, then topic id, then strategy code, so the output
/// does not depend on input order. The header is written even when there are
/// no rows.
pub fn write_csv<W: Write>(
    writer: W,
    records: &[PublicationRecord],
    topic_names: &TopicNames,
) -> Result<(), ExportError> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        (a.year, a.topic, a.strategy.code()).cmp(&(b.year, b.topic, b.strategy.code()))
    });

    let names: Vec<String> = sorted.iter().map(|r| topic_names.name(r.topic)).collect();

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record([
        "Year",
        "Search_Topic_ID",
        "Search_Topic",
        "Search_Level",
        "Record_Count",
    ])?;
    for (r, name) in sorted.iter().zip(&names) {
        csv_writer.serialize(ExportRow {
            year: r.year,
            topic_id: r.topic.get(),
            topic: name,
            strategy: r.strategy.code(),
            count: r.count,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Serialize the visible records to CSV bytes for download.
pub fn export_csv(
    records: &[PublicationRecord],
    topic_names: &TopicNames,
) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    write_csv(&mut bytes, records, topic_names)?;
    Ok(bytes)
}

/// Suggested download name for an export over `year_range`.
pub fn export_file_name(year_range: YearRange) -> String {
    format!(
        "publication_trends_{}_{}.csv",
        year_range.start(),
        year_range.end()
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::loader::load_csv;
    use crate::data::model::{Strategy, TopicId};

    fn rec(topic: u8, strategy: Strategy, year: u16, count: u64) -> PublicationRecord {
        PublicationRecord {
            topic: TopicId::new(topic).unwrap(),
            strategy,
            year,
            count,
        }
    }

    fn names() -> TopicNames {
        let mut names = TopicNames::default();
        names.insert_first(TopicId::new(1).unwrap(), "ILs in Electrochemistry");
        names
    }

    #[test]
    fn writes_header_and_sorted_rows() {
        let records = vec![
            rec(1, Strategy::TS, 2001, 10),
            rec(1, Strategy::TS, 2000, 5),
            rec(1, Strategy::KW, 2000, 2),
            rec(0, Strategy::TI, 2000, 1),
        ];
        let csv = String::from_utf8(export_csv(&records, &names()).unwrap()).unwrap();
        assert_eq!(
            csv,
            "Year,Search_Topic_ID,Search_Topic,Search_Level,Record_Count\n\
             2000,0,Topic 0,TI,1\n\
             2000,1,ILs in Electrochemistry,KW,2\n\
             2000,1,ILs in Electrochemistry,TS,5\n\
             2001,1,ILs in Electrochemistry,TS,10\n"
        );
    }

    #[test]
    fn empty_export_is_header_only() {
        let csv = String::from_utf8(export_csv(&[], &names()).unwrap()).unwrap();
        assert_eq!(
            csv,
            "Year,Search_Topic_ID,Search_Topic,Search_Level,Record_Count\n"
        );
    }

    #[test]
    fn export_is_deterministic() {
        let records = vec![rec(2, Strategy::KW, 1990, 3), rec(2, Strategy::TS, 1990, 9)];
        let mut reversed = records.clone();
        reversed.reverse();
        let first = export_csv(&records, &names()).unwrap();
        assert_eq!(first, export_csv(&records, &names()).unwrap());
        assert_eq!(first, export_csv(&reversed, &names()).unwrap());
    }

    #[test]
    fn exported_csv_loads_back() {
        let records = vec![rec(1, Strategy::TS, 2000, 5), rec(3, Strategy::TI, 2024, 0)];
        let bytes = export_csv(&records, &names()).unwrap();
        let ds = load_csv(bytes.as_slice()).unwrap();
        assert_eq!(ds.records, records);
        assert_eq!(ds.topic_names.name(TopicId::new(1).unwrap()), "ILs in Electrochemistry");
    }

    #[test]
    fn file_name_uses_year_range() {
        let range = YearRange::new(1990, 2015).unwrap();
        assert_eq!(export_file_name(range), "publication_trends_1990_2015.csv");
    }
}
