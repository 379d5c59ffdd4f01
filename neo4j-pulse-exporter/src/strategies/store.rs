//! Store file sizes from `apoc.monitor.store()`.

use super::FieldRule;
use crate::mapping::MetricKind;

pub const QUERY: &str = "CALL apoc.monitor.store()";

/// Field names are matched ignoring case. APOC reports `relStoreSize` and
/// `propStoreSize`; the long spellings are accepted too.
pub const FIELDS: &[FieldRule] = &[
    FieldRule {
        field: "nodeStoreSize",
        name: "neo4j_store_node_store_size_bytes",
        kind: MetricKind::Gauge,
        help: "Size of the node store file",
    },
    FieldRule {
        field: "relationshipStoreSize",
        name: "neo4j_store_relationship_store_size_bytes",
        kind: MetricKind::Gauge,
        help: "Size of the relationship store file",
    },
    FieldRule {
        field: "relStoreSize",
        name: "neo4j_store_relationship_store_size_bytes",
        kind: MetricKind::Gauge,
        help: "Size of the relationship store file",
    },
    FieldRule {
        field: "propertyStoreSize",
        name: "neo4j_store_property_store_size_bytes",
        kind: MetricKind::Gauge,
        help: "Size of the property store file",
    },
    FieldRule {
        field: "propStoreSize",
        name: "neo4j_store_property_store_size_bytes",
        kind: MetricKind::Gauge,
        help: "Size of the property store file",
    },
    FieldRule {
        field: "stringStoreSize",
        name: "neo4j_store_string_store_size_bytes",
        kind: MetricKind::Gauge,
        help: "Size of the string store file",
    },
    FieldRule {
        field: "arrayStoreSize",
        name: "neo4j_store_array_store_size_bytes",
        kind: MetricKind::Gauge,
        help: "Size of the array store file",
    },
    FieldRule {
        field: "totalStoreSize",
        name: "neo4j_store_total_size_bytes",
        kind: MetricKind::Gauge,
        help: "Total size of all store files",
    },
    FieldRule {
        field: "logSize",
        name: "neo4j_store_log_size_bytes",
        kind: MetricKind::Gauge,
        help: "Size of transaction log files",
    },
];
