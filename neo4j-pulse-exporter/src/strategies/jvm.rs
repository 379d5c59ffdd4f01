//! JVM metrics from the `java.lang` JMX beans.
//!
//! Each record carries a bean name and its attribute tree. Every attribute is
//! an envelope `{ value, description }`; the value may itself be a composite
//! object (memory usage) whose fields sit under `properties`.

use neo4j_pulse_common::{RawValue, Record};
use thiserror::Error;
use tracing::{debug, error};

use super::integer_sample;
use crate::exposition::{MetricSet, SampleValue};
use crate::mapping::{MetricKind, classify, generic_suffix, sanitize_name};

pub const QUERY: &str =
    "CALL dbms.queryJmx(\"java.lang:*\") YIELD name, attributes RETURN name, attributes";

const DEFAULT_HELP: &str = "JVM metric";

/// Errors converting a single JMX record.
#[derive(Debug, Error, PartialEq)]
pub enum ConversionError {
    #[error("record has no text 'name' column")]
    MissingName,

    #[error("bean {bean}: 'attributes' is not an object")]
    AttributesNotObject { bean: String },

    #[error("bean {bean}: attribute {key} is not a value envelope")]
    MalformedAttribute { bean: String, key: String },
}

/// How a fixed rule reads the attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reading {
    Integer,
    Float,
}

struct AttributeRule {
    key: &'static str,
    suffix: &'static str,
    kind: MetricKind,
    reading: Reading,
}

const fn rule(
    key: &'static str,
    suffix: &'static str,
    kind: MetricKind,
    reading: Reading,
) -> AttributeRule {
    AttributeRule {
        key,
        suffix,
        kind,
        reading,
    }
}

/// Explicit attribute rules, matched case-sensitively before any heuristic.
const RULES: &[AttributeRule] = &[
    // Threading
    rule("ThreadCount", "_threads", MetricKind::Gauge, Reading::Integer),
    rule("DaemonThreadCount", "_daemon_threads", MetricKind::Gauge, Reading::Integer),
    rule(
        "TotalStartedThreadCount",
        "_threads_started_total",
        MetricKind::Counter,
        Reading::Integer,
    ),
    rule(
        "CurrentThreadAllocatedBytes",
        "_thread_allocated_bytes",
        MetricKind::Gauge,
        Reading::Integer,
    ),
    // Garbage collection
    rule("CollectionCount", "_collections_total", MetricKind::Counter, Reading::Integer),
    rule("CollectionTime", "_collection_time_ms", MetricKind::Counter, Reading::Integer),
    // Runtime
    rule("Uptime", "_uptime_ms", MetricKind::Gauge, Reading::Integer),
    rule("StartTime", "_start_time_ms", MetricKind::Gauge, Reading::Integer),
    // Operating system
    rule("ProcessCpuLoad", "_process_cpu_load", MetricKind::Gauge, Reading::Float),
    rule("SystemCpuLoad", "_system_cpu_load", MetricKind::Gauge, Reading::Float),
    rule("AvailableProcessors", "_available_processors", MetricKind::Gauge, Reading::Integer),
    rule(
        "TotalPhysicalMemorySize",
        "_physical_memory_bytes",
        MetricKind::Gauge,
        Reading::Integer,
    ),
    rule(
        "FreePhysicalMemorySize",
        "_free_physical_memory_bytes",
        MetricKind::Gauge,
        Reading::Integer,
    ),
    rule(
        "CommittedVirtualMemorySize",
        "_committed_virtual_memory_bytes",
        MetricKind::Gauge,
        Reading::Integer,
    ),
];

/// Composite memory attributes and the pool name used in their metric names.
const MEMORY_USAGE: &[(&str, &str)] = &[
    ("HeapMemoryUsage", "heap"),
    ("NonHeapMemoryUsage", "nonheap"),
];

/// Convert all JMX records. A record that fails to convert is logged and
/// dropped; the others are still exported.
pub fn convert(records: &[Record]) -> MetricSet {
    records
        .iter()
        .map(convert_record)
        .fold(MetricSet::new(), |mut acc, outcome| {
            match outcome {
                Ok(set) => acc.extend(set),
                Err(e) => error!(error = %e, "Error processing JVM metric"),
            }
            acc
        })
}

/// Convert one bean record.
pub fn convert_record(record: &Record) -> Result<MetricSet, ConversionError> {
    let bean = record
        .get("name")
        .and_then(RawValue::as_str)
        .ok_or(ConversionError::MissingName)?;

    let attributes = record
        .get("attributes")
        .and_then(RawValue::as_object)
        .ok_or_else(|| ConversionError::AttributesNotObject {
            bean: bean.to_string(),
        })?;

    let prefix = sanitize_name(bean);
    let mut set = MetricSet::new();

    for (key, envelope) in attributes {
        let value = envelope
            .get("value")
            .ok_or_else(|| ConversionError::MalformedAttribute {
                bean: bean.to_string(),
                key: key.clone(),
            })?;

        let help = match envelope.get("description").and_then(RawValue::as_str) {
            Some(d) if !d.is_empty() => d,
            _ => DEFAULT_HELP,
        };

        convert_attribute(&prefix, key, value, help, &mut set);
    }

    Ok(set)
}

fn convert_attribute(prefix: &str, key: &str, value: &RawValue, help: &str, set: &mut MetricSet) {
    if let Some(rule) = RULES.iter().find(|r| r.key == key) {
        let sample = match rule.reading {
            Reading::Integer => integer_sample(value),
            Reading::Float => value.as_f64().map(SampleValue::Float),
        };
        match sample {
            Some(sample) => set.push(format!("{}{}", prefix, rule.suffix), help, rule.kind, sample),
            None => debug!(key, "Skipping non-numeric JMX attribute"),
        }
        return;
    }

    if let Some((_, pool)) = MEMORY_USAGE.iter().find(|(k, _)| *k == key) {
        flatten_memory_usage(prefix, pool, value, set);
        return;
    }

    let sample = match value {
        RawValue::Integer(v) => SampleValue::Integer(*v),
        RawValue::Float(v) => SampleValue::Float(*v),
        _ => return,
    };

    set.push(
        format!("{}_{}", prefix, generic_suffix(key)),
        help,
        classify(key, value),
        sample,
    );
}

/// `MemoryUsage` fields and their HELP text, in output order.
const MEMORY_FIELDS: &[(&str, &str)] = &[
    ("used", "Memory used in bytes"),
    ("committed", "Memory committed in bytes"),
    ("init", "Initial memory in bytes"),
    ("max", "Maximum memory in bytes"),
];

/// Flatten a `MemoryUsage` composite into used/committed/init/max gauges.
/// Field names are matched ignoring case.
///
/// A non-positive `max` means the pool is unbounded and is not exported.
fn flatten_memory_usage(prefix: &str, pool: &str, value: &RawValue, set: &mut MetricSet) {
    let Some(properties) = value.get("properties").filter(|p| p.as_object().is_some()) else {
        debug!(pool, "Memory usage without properties");
        return;
    };

    for (field, help) in MEMORY_FIELDS {
        let Some(bytes) = properties.get_ignore_case(field).and_then(RawValue::as_i64) else {
            continue;
        };
        if *field == "max" && bytes <= 0 {
            continue;
        }

        set.push(
            format!("{}_{}_{}_bytes", prefix, pool, field),
            *help,
            MetricKind::Gauge,
            SampleValue::Integer(bytes),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{jmx_record, rendered};
    use serde_json::json;

    fn memory_record(max: i64) -> Record {
        jmx_record(
            "java.lang:type=Memory",
            json!({
                "HeapMemoryUsage": {
                    "description": "Heap usage",
                    "value": {
                        "description": "java.lang.management.MemoryUsage",
                        "properties": {
                            "committed": 536870912,
                            "init": 268435456,
                            "max": max,
                            "used": 123456789
                        }
                    }
                }
            }),
        )
    }

    #[test]
    fn test_heap_max_unbounded_is_suppressed() {
        let set = convert_record(&memory_record(-1)).unwrap();
        let lines = rendered(&set);

        assert!(lines.iter().all(|l| !l.contains("_heap_max_bytes")));
        assert!(lines.contains(&"jvm_memory_heap_used_bytes 123456789".to_string()));
        assert!(lines.contains(&"jvm_memory_heap_committed_bytes 536870912".to_string()));
        assert!(lines.contains(&"jvm_memory_heap_init_bytes 268435456".to_string()));
        assert_eq!(set.sample_count(), 3);
    }

    #[test]
    fn test_heap_max_zero_is_suppressed() {
        let set = convert_record(&memory_record(0)).unwrap();
        assert!(rendered(&set).iter().all(|l| !l.contains("_max_bytes")));
    }

    #[test]
    fn test_heap_max_bounded_is_exported_once() {
        let set = convert_record(&memory_record(2147483648)).unwrap();
        let lines = rendered(&set);

        let max_samples: Vec<&String> = lines
            .iter()
            .filter(|l| l.starts_with("jvm_memory_heap_max_bytes"))
            .collect();
        assert_eq!(max_samples, vec!["jvm_memory_heap_max_bytes 2147483648"]);
        assert!(lines.contains(&"# HELP jvm_memory_heap_max_bytes Maximum memory in bytes".to_string()));
        assert!(lines.contains(&"# TYPE jvm_memory_heap_max_bytes gauge".to_string()));
    }

    #[test]
    fn test_nonheap_properties_case_insensitive() {
        let record = jmx_record(
            "java.lang:type=Memory",
            json!({
                "NonHeapMemoryUsage": {
                    "value": { "properties": { "Used": 42, "MAX": -1 } }
                }
            }),
        );

        let lines = rendered(&convert_record(&record).unwrap());
        assert_eq!(
            lines,
            vec![
                "# HELP jvm_memory_nonheap_used_bytes Memory used in bytes",
                "# TYPE jvm_memory_nonheap_used_bytes gauge",
                "jvm_memory_nonheap_used_bytes 42",
            ]
        );
    }

    #[test]
    fn test_memory_fields_in_fixed_order() {
        let record = jmx_record(
            "java.lang:type=Memory",
            json!({
                "HeapMemoryUsage": {
                    "value": {
                        "properties": { "Max": 4096, "INIT": 1024, "Used": 512, "committed": 2048 }
                    }
                }
            }),
        );

        let samples: Vec<String> = rendered(&convert_record(&record).unwrap())
            .into_iter()
            .filter(|l| !l.starts_with('#'))
            .collect();
        assert_eq!(
            samples,
            vec![
                "jvm_memory_heap_used_bytes 512",
                "jvm_memory_heap_committed_bytes 2048",
                "jvm_memory_heap_init_bytes 1024",
                "jvm_memory_heap_max_bytes 4096",
            ]
        );
    }

    #[test]
    fn test_threading_fixed_rules() {
        let record = jmx_record(
            "java.lang:type=Threading",
            json!({
                "ThreadCount": { "value": 42, "description": "Current threads" },
                "DaemonThreadCount": { "value": 30 },
                "TotalStartedThreadCount": { "value": 1234 }
            }),
        );

        let lines = rendered(&convert_record(&record).unwrap());
        assert_eq!(
            lines,
            vec![
                "# HELP jvm_threading_threads Current threads",
                "# TYPE jvm_threading_threads gauge",
                "jvm_threading_threads 42",
                "# HELP jvm_threading_daemon_threads JVM metric",
                "# TYPE jvm_threading_daemon_threads gauge",
                "jvm_threading_daemon_threads 30",
                "# HELP jvm_threading_threads_started_total JVM metric",
                "# TYPE jvm_threading_threads_started_total counter",
                "jvm_threading_threads_started_total 1234",
            ]
        );
    }

    #[test]
    fn test_gc_bean() {
        let record = jmx_record(
            "java.lang:type=GarbageCollector,name=G1 Young Generation",
            json!({
                "CollectionCount": { "value": 17 },
                "CollectionTime": { "value": 250 },
                "Name": { "value": "G1 Young Generation" },
                "Valid": { "value": true }
            }),
        );

        let set = convert_record(&record).unwrap();
        let lines = rendered(&set);

        assert!(lines.contains(
            &"# TYPE jvm_garbagecollector_g1_young_generation_collections_total counter".to_string()
        ));
        assert!(lines.contains(&"jvm_garbagecollector_g1_young_generation_collections_total 17".to_string()));
        assert!(lines.contains(&"jvm_garbagecollector_g1_young_generation_collection_time_ms 250".to_string()));
        // Text and boolean attributes are skipped
        assert_eq!(set.sample_count(), 2);
    }

    #[test]
    fn test_cpu_load_rendered_as_float() {
        let record = jmx_record(
            "java.lang:type=OperatingSystem",
            json!({
                "ProcessCpuLoad": { "value": 0.125 },
                "SystemCpuLoad": { "value": 1 },
                "AvailableProcessors": { "value": 8 },
                "TotalPhysicalMemorySize": { "value": 17179869184_i64 }
            }),
        );

        let lines = rendered(&convert_record(&record).unwrap());
        assert!(lines.contains(&"jvm_operatingsystem_process_cpu_load 0.125".to_string()));
        assert!(lines.contains(&"jvm_operatingsystem_system_cpu_load 1.0".to_string()));
        assert!(lines.contains(&"jvm_operatingsystem_available_processors 8".to_string()));
        assert!(lines.contains(&"jvm_operatingsystem_physical_memory_bytes 17179869184".to_string()));
    }

    #[test]
    fn test_runtime_rules_take_precedence_over_heuristic() {
        let record = jmx_record(
            "java.lang:type=Runtime",
            json!({
                "Uptime": { "value": 60000 },
                "StartTime": { "value": 1700000000000_i64 }
            }),
        );

        let lines = rendered(&convert_record(&record).unwrap());
        assert!(lines.contains(&"# TYPE jvm_runtime_uptime_ms gauge".to_string()));
        assert!(lines.contains(&"# TYPE jvm_runtime_start_time_ms gauge".to_string()));
    }

    #[test]
    fn test_generic_fallback() {
        let record = jmx_record(
            "java.lang:type=OperatingSystem",
            json!({
                "OpenFileDescriptorCount": { "value": 312, "description": "Open fds" },
                "ThreadCpuTime": { "value": 98765 },
                "SystemLoadAverage": { "value": 2.5 }
            }),
        );

        let lines = rendered(&convert_record(&record).unwrap());
        assert_eq!(
            lines,
            vec![
                "# HELP jvm_operatingsystem_open_file_descriptor_count Open fds",
                "# TYPE jvm_operatingsystem_open_file_descriptor_count gauge",
                "jvm_operatingsystem_open_file_descriptor_count 312",
                "# HELP jvm_operatingsystem_thread_cpu_time JVM metric",
                "# TYPE jvm_operatingsystem_thread_cpu_time counter",
                "jvm_operatingsystem_thread_cpu_time 98765",
                "# HELP jvm_operatingsystem_system_load_average JVM metric",
                "# TYPE jvm_operatingsystem_system_load_average gauge",
                "jvm_operatingsystem_system_load_average 2.5",
            ]
        );
    }

    #[test]
    fn test_fixed_rule_truncates_float() {
        let record = jmx_record(
            "java.lang:type=Threading",
            json!({ "CurrentThreadAllocatedBytes": { "value": 1024.9 } }),
        );

        let lines = rendered(&convert_record(&record).unwrap());
        assert!(lines.contains(&"jvm_threading_thread_allocated_bytes 1024".to_string()));
    }

    #[test]
    fn test_conversion_errors() {
        let no_name = Record::default().with_field("attributes", RawValue::Object(Vec::new()));
        assert_eq!(convert_record(&no_name).unwrap_err(), ConversionError::MissingName);

        let bad_attributes = Record::default()
            .with_field("name", "java.lang:type=Memory")
            .with_field("attributes", 5_i64);
        assert!(matches!(
            convert_record(&bad_attributes).unwrap_err(),
            ConversionError::AttributesNotObject { .. }
        ));

        let bad_envelope = jmx_record("java.lang:type=Memory", json!({ "Verbose": false }));
        assert!(matches!(
            convert_record(&bad_envelope).unwrap_err(),
            ConversionError::MalformedAttribute { .. }
        ));
    }

    #[test]
    fn test_failed_record_does_not_stop_others() {
        let records = vec![
            jmx_record("java.lang:type=Threading", json!({ "ThreadCount": { "value": 5 } })),
            jmx_record("java.lang:type=Broken", json!({ "Oops": 1 })),
            jmx_record("java.lang:type=Runtime", json!({ "Uptime": { "value": 10 } })),
        ];

        let set = convert(&records);
        let lines = rendered(&set);

        assert_eq!(set.sample_count(), 2);
        assert!(lines.contains(&"jvm_threading_threads 5".to_string()));
        assert!(lines.contains(&"jvm_runtime_uptime_ms 10".to_string()));
        assert!(lines.iter().all(|l| !l.contains("broken")));
    }
}
