//! Catalog counts from `apoc.meta.stats()`.

use super::FieldRule;
use crate::mapping::MetricKind;

pub const QUERY: &str = "CALL apoc.meta.stats()";

/// Field names are matched ignoring case.
pub const FIELDS: &[FieldRule] = &[
    FieldRule {
        field: "nodeCount",
        name: "neo4j_nodes_total",
        kind: MetricKind::Gauge,
        help: "Total number of nodes in the database",
    },
    FieldRule {
        field: "relCount",
        name: "neo4j_relationships_total",
        kind: MetricKind::Gauge,
        help: "Total number of relationships in the database",
    },
    FieldRule {
        field: "labelCount",
        name: "neo4j_labels_total",
        kind: MetricKind::Gauge,
        help: "Total number of distinct labels",
    },
    FieldRule {
        field: "relTypeCount",
        name: "neo4j_relationship_types_total",
        kind: MetricKind::Gauge,
        help: "Total number of distinct relationship types",
    },
    FieldRule {
        field: "propertyKeyCount",
        name: "neo4j_property_keys_total",
        kind: MetricKind::Gauge,
        help: "Total number of distinct property keys",
    },
    FieldRule {
        field: "propertyKeyNameCount",
        name: "neo4j_property_keys_total",
        kind: MetricKind::Gauge,
        help: "Total number of distinct property keys",
    },
];
