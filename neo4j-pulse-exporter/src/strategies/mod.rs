//! Collector strategies: one Cypher query each, converted to exposition lines.
//!
//! A failing query never aborts a scrape. The strategy logs a diagnostic and
//! contributes no lines.

use neo4j_pulse_common::{QuerySession, RawValue, Record};
use tracing::{debug, warn};

use crate::exposition::{MetricSet, SampleValue};
use crate::mapping::MetricKind;

pub mod jvm;
pub mod meta_stats;
pub mod queries;
pub mod store;
pub mod transaction;

#[cfg(test)]
pub(crate) mod test_support;

/// The closed set of collector strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Jvm,
    Store,
    Transaction,
    Queries,
    MetaStats,
}

impl Strategy {
    /// All strategies, in scrape order.
    pub const ALL: [Strategy; 5] = [
        Strategy::Jvm,
        Strategy::Store,
        Strategy::Transaction,
        Strategy::Queries,
        Strategy::MetaStats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Jvm => "jvm",
            Strategy::Store => "store",
            Strategy::Transaction => "transaction",
            Strategy::Queries => "queries",
            Strategy::MetaStats => "meta_stats",
        }
    }

    /// The Cypher query this strategy runs.
    pub fn query(&self) -> &'static str {
        match self {
            Strategy::Jvm => jvm::QUERY,
            Strategy::Store => store::QUERY,
            Strategy::Transaction => transaction::QUERY,
            Strategy::Queries => queries::QUERY,
            Strategy::MetaStats => meta_stats::QUERY,
        }
    }

    /// Run the query and convert its records.
    pub async fn collect<S: QuerySession>(&self, session: &S) -> MetricSet {
        let records = match session.run(self.query()).await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    strategy = self.as_str(),
                    error = %e,
                    "Query unavailable, skipping collector"
                );
                return MetricSet::new();
            }
        };

        let set = self.convert(&records);
        debug!(
            strategy = self.as_str(),
            records = records.len(),
            samples = set.sample_count(),
            "Collector finished"
        );
        set
    }

    /// Convert already-fetched records.
    pub fn convert(&self, records: &[Record]) -> MetricSet {
        match self {
            Strategy::Jvm => jvm::convert(records),
            Strategy::Store => single_record(self, records)
                .map(|r| convert_fields(r, store::FIELDS, KeyMatch::IgnoreCase))
                .unwrap_or_default(),
            Strategy::Transaction => single_record(self, records)
                .map(|r| convert_fields(r, transaction::FIELDS, KeyMatch::Exact))
                .unwrap_or_default(),
            Strategy::Queries => queries::convert(records),
            Strategy::MetaStats => single_record(self, records)
                .map(|r| convert_fields(r, meta_stats::FIELDS, KeyMatch::IgnoreCase))
                .unwrap_or_default(),
        }
    }
}

/// Mapping of one result field to a fixed output metric.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub name: &'static str,
    pub kind: MetricKind,
    pub help: &'static str,
}

/// How result field names are compared against a rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMatch {
    Exact,
    IgnoreCase,
}

impl KeyMatch {
    fn matches(&self, rule: &str, key: &str) -> bool {
        match self {
            KeyMatch::Exact => rule == key,
            KeyMatch::IgnoreCase => rule.eq_ignore_ascii_case(key),
        }
    }
}

/// Pick the record of a single-row administrative query.
fn single_record<'a>(strategy: &Strategy, records: &'a [Record]) -> Option<&'a Record> {
    match records {
        [] => {
            debug!(strategy = strategy.as_str(), "Query returned no records");
            None
        }
        [first] => Some(first),
        [first, ..] => {
            warn!(
                strategy = strategy.as_str(),
                records = records.len(),
                "Expected a single record, using the first"
            );
            Some(first)
        }
    }
}

/// Convert the fields of one record through a fixed rule table, in record
/// order. Unknown and non-numeric fields are ignored.
pub fn convert_fields(record: &Record, rules: &[FieldRule], key_match: KeyMatch) -> MetricSet {
    let mut set = MetricSet::new();

    for (key, value) in record.iter() {
        let Some(rule) = rules.iter().find(|r| key_match.matches(r.field, key)) else {
            continue;
        };

        match value.as_i64() {
            Some(v) => set.push(rule.name, rule.help, rule.kind, SampleValue::Integer(v)),
            None => debug!(field = key, ?value, "Skipping non-numeric field"),
        }
    }

    set
}

/// Integral sample value, the way fixed rules read numbers.
pub(crate) fn integer_sample(value: &RawValue) -> Option<SampleValue> {
    value.as_i64().map(SampleValue::Integer)
}
