use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use super::error::DuplicateKeyError;
use super::model::{PublicationRecord, SeriesKey, SeriesPoint, SeriesTable};

/// Group records into one year-ordered series per (topic, strategy).
///
/// Years without a record are left out of the series rather than filled
/// with zero. A repeated (topic, strategy, year) key is rejected.
pub fn reshape(records: &[PublicationRecord]) -> Result<SeriesTable, DuplicateKeyError> {
    let mut grouped: BTreeMap<SeriesKey, BTreeMap<u16, u64>> = BTreeMap::new();

    for r in records {
        let key = SeriesKey {
            topic: r.topic,
            strategy: r.strategy,
        };
        match grouped.entry(key).or_default().entry(r.year) {
            Entry::Vacant(slot) => {
                slot.insert(r.count);
            }
            Entry::Occupied(_) => {
                return Err(DuplicateKeyError {
                    topic: r.topic,
                    strategy: r.strategy,
                    year: r.year,
                });
            }
        }
    }

    let series = grouped
        .into_iter()
        .map(|(key, years)| {
            let points = years
                .into_iter()
                .map(|(year, count)| SeriesPoint {
                    year,
                    value: count as f64,
                })
                .collect();
            (key, points)
        })
        .collect();

    Ok(SeriesTable::from_map(series))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::model::{Strategy, TopicId};

    fn rec(topic: u8, strategy: Strategy, year: u16, count: u64) -> PublicationRecord {
        PublicationRecord {
            topic: TopicId::new(topic).unwrap(),
            strategy,
            year,
            count,
        }
    }

    fn key(topic: u8, strategy: Strategy) -> SeriesKey {
        SeriesKey {
            topic: TopicId::new(topic).unwrap(),
            strategy,
        }
    }

    fn years_and_values(points: &[SeriesPoint]) -> Vec<(u16, f64)> {
        points.iter().map(|p| (p.year, p.value)).collect()
    }

    #[test]
    fn scenario_single_series() {
        let records = vec![rec(1, Strategy::TS, 2000, 5), rec(1, Strategy::TS, 2001, 10)];
        let table = reshape(&records).unwrap();

        assert_eq!(table.len(), 1);
        let points = table.get(&key(1, Strategy::TS)).unwrap();
        assert_eq!(years_and_values(points), vec![(2000, 5.0), (2001, 10.0)]);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = reshape(&[]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.get(&key(1, Strategy::TS)), None);
    }

    #[test]
    fn orders_years_and_omits_gaps() {
        let records = vec![
            rec(2, Strategy::KW, 2010, 4),
            rec(0, Strategy::TS, 1999, 1),
            rec(2, Strategy::KW, 2003, 2),
            rec(2, Strategy::TI, 2003, 7),
        ];
        let table = reshape(&records).unwrap();

        assert_eq!(
            table.keys().copied().collect::<Vec<_>>(),
            vec![key(0, Strategy::TS), key(2, Strategy::TI), key(2, Strategy::KW)]
        );
        assert_eq!(
            years_and_values(table.get(&key(2, Strategy::KW)).unwrap()),
            vec![(2003, 2.0), (2010, 4.0)]
        );
        assert_eq!(table.point_count(), 4);
    }

    #[test]
    fn zero_counts_are_kept() {
        let table = reshape(&[rec(4, Strategy::TI, 1980, 0)]).unwrap();
        assert_eq!(
            years_and_values(table.get(&key(4, Strategy::TI)).unwrap()),
            vec![(1980, 0.0)]
        );
    }

    #[test]
    fn duplicate_key_fails() {
        let records = vec![
            rec(1, Strategy::TS, 2000, 5),
            rec(1, Strategy::KW, 2000, 6),
            rec(1, Strategy::TS, 2000, 9),
        ];
        let err = reshape(&records).unwrap_err();
        assert_eq!(
            err,
            DuplicateKeyError {
                topic: TopicId::new(1).unwrap(),
                strategy: Strategy::TS,
                year: 2000,
            }
        );
    }

    #[test]
    fn reshaping_twice_is_identical() {
        let records = vec![
            rec(3, Strategy::TS, 2001, 8),
            rec(3, Strategy::TS, 2000, 3),
            rec(5, Strategy::KW, 2000, 1),
        ];
        assert_eq!(reshape(&records).unwrap(), reshape(&records).unwrap());
    }
}
