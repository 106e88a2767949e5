use super::model::{FilterCriteria, PublicationRecord};

// ---------------------------------------------------------------------------
// Filter predicate: topic ∈ topics, strategy ∈ strategies, year ∈ range
// ---------------------------------------------------------------------------

/// Return the records passing all three predicates, in source order.
///
/// An empty topic or strategy selection matches nothing; that is a valid
/// "no data" state rather than an error.
pub fn filter(records: &[PublicationRecord], criteria: &FilterCriteria) -> Vec<PublicationRecord> {
    if criteria.topics.is_empty() || criteria.strategies.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|r| criteria.matches(r))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::model::{Strategy, TopicId, YearRange};

    fn rec(topic: u8, strategy: Strategy, year: u16, count: u64) -> PublicationRecord {
        PublicationRecord {
            topic: TopicId::new(topic).unwrap(),
            strategy,
            year,
            count,
        }
    }

    fn topic(id: u8) -> TopicId {
        TopicId::new(id).unwrap()
    }

    /// Every (topic, strategy) combination for 1990..=1999.
    fn grid() -> Vec<PublicationRecord> {
        let mut records = Vec::new();
        for t in 0..6 {
            for s in Strategy::ALL {
                for year in 1990..2000 {
                    records.push(rec(t, s, year, u64::from(year) - 1989 + u64::from(t)));
                }
            }
        }
        records
    }

    #[test]
    fn scenario_both_years_selected() {
        let records = vec![rec(1, Strategy::TS, 2000, 5), rec(1, Strategy::TS, 2001, 10)];
        let criteria = FilterCriteria::new(
            [topic(1)],
            [Strategy::TS],
            YearRange::new(2000, 2001).unwrap(),
        );
        assert_eq!(filter(&records, &criteria), records);
    }

    #[test]
    fn scenario_disjoint_years_is_empty() {
        let records = vec![rec(1, Strategy::TS, 2000, 5), rec(1, Strategy::TS, 2001, 10)];
        let criteria = FilterCriteria::new(
            [topic(1)],
            [Strategy::TS],
            YearRange::new(2002, 2010).unwrap(),
        );
        assert!(filter(&records, &criteria).is_empty());
    }

    #[test]
    fn every_result_satisfies_every_predicate() {
        let records = grid();
        let criteria = FilterCriteria::new(
            [topic(0), topic(4)],
            [Strategy::KW, Strategy::TI],
            YearRange::new(1993, 1996).unwrap(),
        );
        let out = filter(&records, &criteria);

        assert!(out.iter().all(|r| criteria.topics.contains(&r.topic)
            && criteria.strategies.contains(&r.strategy)
            && (1993..=1996).contains(&r.year)));

        let expected = records.iter().filter(|r| criteria.matches(r)).count();
        assert_eq!(out.len(), expected);
        assert_eq!(out.len(), 2 * 2 * 4);
    }

    #[test]
    fn inclusive_on_both_ends() {
        let records = grid();
        let criteria = FilterCriteria::new(
            [topic(2)],
            [Strategy::TS],
            YearRange::new(1990, 1990).unwrap(),
        );
        assert_eq!(filter(&records, &criteria), vec![rec(2, Strategy::TS, 1990, 3)]);
    }

    #[test]
    fn empty_selection_yields_nothing() {
        let records = grid();
        let no_topics = FilterCriteria::new(Vec::<TopicId>::new(), Strategy::ALL, YearRange::FULL);
        let no_strategies = FilterCriteria::new(TopicId::all(), Vec::<Strategy>::new(), YearRange::FULL);
        assert!(filter(&records, &no_topics).is_empty());
        assert!(filter(&records, &no_strategies).is_empty());
    }

    #[test]
    fn preserves_source_order() {
        let records = vec![
            rec(3, Strategy::KW, 2005, 1),
            rec(1, Strategy::TS, 2001, 2),
            rec(3, Strategy::KW, 2003, 3),
        ];
        let criteria = FilterCriteria::new(TopicId::all(), Strategy::ALL, YearRange::FULL);
        assert_eq!(filter(&records, &criteria), records);

        let without_one = criteria.with_topic(topic(1), false);
        assert_eq!(
            filter(&records, &without_one),
            vec![rec(3, Strategy::KW, 2005, 1), rec(3, Strategy::KW, 2003, 3)]
        );
    }
}
