//! Transaction counters from `apoc.monitor.tx()`.

use super::FieldRule;
use crate::mapping::MetricKind;

pub const QUERY: &str = "CALL apoc.monitor.tx()";

/// Field names are matched exactly.
pub const FIELDS: &[FieldRule] = &[
    FieldRule {
        field: "rolledBackTx",
        name: "neo4j_transactions_rolled_back_total",
        kind: MetricKind::Counter,
        help: "Number of rolled back transactions",
    },
    FieldRule {
        field: "currentOpenedTx",
        name: "neo4j_transactions_active",
        kind: MetricKind::Gauge,
        help: "Number of currently active transactions",
    },
    FieldRule {
        field: "peakTx",
        name: "neo4j_transactions_peak_active",
        kind: MetricKind::Gauge,
        help: "Peak number of concurrent active transactions",
    },
];
