use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::InvalidYearRange;

/// First year covered by the publication database.
pub const YEAR_MIN: u16 = 1975;
/// Last year covered by the publication database.
pub const YEAR_MAX: u16 = 2024;

// ---------------------------------------------------------------------------
// TopicId – one of the six research topics
// ---------------------------------------------------------------------------

/// Research topic id, always in `0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TopicId(u8);

impl TopicId {
    pub const COUNT: u8 = 6;

    pub fn new(id: u8) -> Option<Self> {
        (id < Self::COUNT).then_some(TopicId(id))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// All topics in id order.
    pub fn all() -> impl Iterator<Item = TopicId> {
        (0..Self::COUNT).map(TopicId)
    }
}

impl TryFrom<u8> for TopicId {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        TopicId::new(id).ok_or_else(|| format!("topic id {id} is outside 0..={}", Self::COUNT - 1))
    }
}

impl From<TopicId> for u8 {
    fn from(topic: TopicId) -> u8 {
        topic.0
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Strategy – which fields a publication was matched on
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Title + abstract + keywords.
    TS,
    /// Title only.
    TI,
    /// Title + keywords.
    KW,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::TS, Strategy::TI, Strategy::KW];

    pub fn code(self) -> &'static str {
        match self {
            Strategy::TS => "TS",
            Strategy::TI => "TI",
            Strategy::KW => "KW",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Strategy::TS => "Topic Search (TS) - Title + Abstract + Keywords",
            Strategy::TI => "Title Only (TI) - Title search only",
            Strategy::KW => "Keywords & Title (KW) - Title + Keywords",
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TS" => Ok(Strategy::TS),
            "TI" => Ok(Strategy::TI),
            "KW" => Ok(Strategy::KW),
            other => Err(format!("unknown search strategy '{other}'")),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// PublicationRecord – one row of the source table
// ---------------------------------------------------------------------------

/// Publication count for one (topic, strategy, year).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicationRecord {
    pub topic: TopicId,
    pub strategy: Strategy,
    pub year: u16,
    pub count: u64,
}

// ---------------------------------------------------------------------------
// TopicNames – display labels per topic
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicNames(BTreeMap<TopicId, String>);

impl TopicNames {
    /// Record a name unless the topic already has one (first occurrence wins).
    pub fn insert_first(&mut self, topic: TopicId, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        self.0.entry(topic).or_insert_with(|| name.to_string());
    }

    pub fn name(&self, topic: TopicId) -> String {
        self.0
            .get(&topic)
            .cloned()
            .unwrap_or_else(|| format!("Topic {topic}"))
    }

    /// `"{name} ({strategy})"`, the legend label of one series.
    pub fn series_label(&self, key: SeriesKey) -> String {
        format!("{} ({})", self.name(key.topic), key.strategy)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<PublicationRecord>,
    pub topic_names: TopicNames,
}

impl Dataset {
    pub fn new(records: Vec<PublicationRecord>, topic_names: TopicNames) -> Self {
        Dataset {
            records,
            topic_names,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Observed year span, clamped to the database coverage.
    /// Falls back to the full coverage for an empty dataset.
    pub fn year_bounds(&self) -> YearRange {
        let min = self.records.iter().map(|r| r.year).min();
        let max = self.records.iter().map(|r| r.year).max();
        match (min, max) {
            (Some(min), Some(max)) => YearRange {
                start: min.max(YEAR_MIN),
                end: max.min(YEAR_MAX),
            },
            _ => YearRange::FULL,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// Inclusive year interval within `YEAR_MIN..=YEAR_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    start: u16,
    end: u16,
}

impl YearRange {
    pub const FULL: YearRange = YearRange {
        start: YEAR_MIN,
        end: YEAR_MAX,
    };

    pub fn new(start: u16, end: u16) -> Result<Self, InvalidYearRange> {
        if start > end || start < YEAR_MIN || end > YEAR_MAX {
            return Err(InvalidYearRange { start, end });
        }
        Ok(YearRange { start, end })
    }

    pub fn start(self) -> u16 {
        self.start
    }

    pub fn end(self) -> u16 {
        self.end
    }

    pub fn contains(self, year: u16) -> bool {
        (self.start..=self.end).contains(&year)
    }

    /// Overlap of two ranges, `None` when they are disjoint.
    pub fn intersect(self, other: YearRange) -> Option<YearRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(YearRange { start, end })
    }
}

impl Default for YearRange {
    fn default() -> Self {
        YearRange::FULL
    }
}

/// One user selection. Never mutated: every change builds a new value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub topics: BTreeSet<TopicId>,
    pub strategies: BTreeSet<Strategy>,
    pub year_range: YearRange,
}

impl FilterCriteria {
    pub fn new(
        topics: impl IntoIterator<Item = TopicId>,
        strategies: impl IntoIterator<Item = Strategy>,
        year_range: YearRange,
    ) -> Self {
        FilterCriteria {
            topics: topics.into_iter().collect(),
            strategies: strategies.into_iter().collect(),
            year_range,
        }
    }

    pub fn with_topic(&self, topic: TopicId, selected: bool) -> Self {
        let mut topics = self.topics.clone();
        if selected {
            topics.insert(topic);
        } else {
            topics.remove(&topic);
        }
        FilterCriteria {
            topics,
            ..self.clone()
        }
    }

    pub fn with_strategy(&self, strategy: Strategy, selected: bool) -> Self {
        let mut strategies = self.strategies.clone();
        if selected {
            strategies.insert(strategy);
        } else {
            strategies.remove(&strategy);
        }
        FilterCriteria {
            strategies,
            ..self.clone()
        }
    }

    pub fn with_year_range(&self, year_range: YearRange) -> Self {
        FilterCriteria {
            year_range,
            ..self.clone()
        }
    }

    pub fn matches(&self, record: &PublicationRecord) -> bool {
        self.topics.contains(&record.topic)
            && self.strategies.contains(&record.strategy)
            && self.year_range.contains(record.year)
    }
}

// ---------------------------------------------------------------------------
// SeriesTable – chart-ready output of reshape / transform
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesKey {
    pub topic: TopicId,
    pub strategy: Strategy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub year: u16,
    pub value: f64,
}

/// Total of one series, used to rank combinations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesTotal {
    pub key: SeriesKey,
    pub total: f64,
}

/// Series per (topic, strategy), each ordered by year ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesTable {
    series: BTreeMap<SeriesKey, Vec<SeriesPoint>>,
}

impl SeriesTable {
    /// Callers must hand over year-ordered points.
    pub(crate) fn from_map(series: BTreeMap<SeriesKey, Vec<SeriesPoint>>) -> Self {
        SeriesTable { series }
    }

    pub fn get(&self, key: &SeriesKey) -> Option<&[SeriesPoint]> {
        self.series.get(key).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SeriesKey, &[SeriesPoint])> {
        self.series.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &SeriesKey> {
        self.series.keys()
    }

    /// Number of series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Number of points across all series.
    pub fn point_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    /// Series totals, largest first; ties fall back to key order.
    pub fn ranked_totals(&self) -> Vec<SeriesTotal> {
        let mut totals: Vec<SeriesTotal> = self
            .series
            .iter()
            .map(|(key, points)| SeriesTotal {
                key: *key,
                total: points.iter().map(|p| p.value).sum(),
            })
            .collect();
        totals.sort_by(|a, b| b.total.total_cmp(&a.total).then(a.key.cmp(&b.key)));
        totals
    }
}
