//! Number of running queries from `dbms.listQueries()`.

use neo4j_pulse_common::Record;

use crate::exposition::{MetricSet, SampleValue};
use crate::mapping::MetricKind;

pub const QUERY: &str = "CALL dbms.listQueries()";

/// One gauge with the number of records returned.
pub fn convert(records: &[Record]) -> MetricSet {
    let mut set = MetricSet::new();
    set.push(
        "neo4j_active_queries_total",
        "Number of currently active queries",
        MetricKind::Gauge,
        SampleValue::Integer(records.len() as i64),
    );
    set
}
