//! Mapping from raw JMX names and attribute keys to Prometheus names and types.

use std::collections::HashMap;

use neo4j_pulse_common::RawValue;

/// Prometheus metric type of an exported sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl MetricKind {
    /// Get the TYPE comment string for Prometheus exposition format.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

/// Domain qualifiers rewritten before character cleanup, in order.
const QUALIFIERS: &[(&str, &str)] = &[
    ("java.lang:type=", "jvm_"),
    ("java.lang:name=", "jvm_"),
    (":type=", "_"),
    (":name=", "_"),
    (",name=", "_"),
    (",type=", "_"),
];

/// Attribute keys that look cumulative by name but report a current level.
const GAUGE_KEYS: &[&str] = &[
    "OpenFileDescriptorCount",
    "MaxFileDescriptorCount",
    "PeakThreadCount",
    "LoadedClassCount",
    "ObjectPendingFinalizationCount",
    "FreeSwapSpaceSize",
    "TotalSwapSpaceSize",
    "TotalMemorySize",
];

/// Sanitize a JMX object name into a Prometheus metric name prefix.
///
/// `java.lang:type=GarbageCollector,name=G1 Young Generation` becomes
/// `jvm_garbagecollector_g1_young_generation`. The result only contains
/// `[a-z0-9_]`, so sanitizing twice changes nothing.
pub fn sanitize_name(raw: &str) -> String {
    let mut name = raw.to_lowercase();
    for (qualifier, replacement) in QUALIFIERS {
        name = name.replace(qualifier, replacement);
    }

    name.chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Convert an attribute key into a metric name suffix (without the leading
/// underscore): `OpenFileDescriptorCount` becomes `open_file_descriptor_count`.
pub fn generic_suffix(key: &str) -> String {
    let mut result = String::with_capacity(key.len() + 4);
    let mut prev_lower = false;

    for c in key.chars() {
        if c.is_ascii_uppercase() && prev_lower {
            result.push('_');
        }
        prev_lower = c.is_ascii_lowercase();

        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            result.push(c);
        } else {
            result.push('_');
        }
    }

    result
}

/// Sanitize configured label names and check them against the Prometheus
/// label grammar. The result is sorted by name.
///
/// Names that end up empty, start with a digit, use the reserved `__` prefix,
/// or collide with another name after sanitizing are rejected.
pub fn normalize_labels(
    labels: &HashMap<String, String>,
) -> Result<Vec<(String, String)>, String> {
    let mut normalized: Vec<(String, String)> = Vec::with_capacity(labels.len());

    for (raw, value) in labels {
        let name = sanitize_name(raw);

        if name.is_empty() {
            return Err(format!("label name '{}' is empty after sanitizing", raw));
        }
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(format!("label name '{}' must not start with a digit", raw));
        }
        if name.starts_with("__") {
            return Err(format!("label name '{}' uses the reserved '__' prefix", raw));
        }
        if normalized.iter().any(|(existing, _)| *existing == name) {
            return Err(format!(
                "label name '{}' collides with another label as '{}'",
                raw, name
            ));
        }

        normalized.push((name, value.clone()));
    }

    normalized.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(normalized)
}

/// Classify an attribute that has no explicit rule.
///
/// Keys whose suffix mentions `count`, `total` or `time` are treated as
/// counters unless listed in the gauge overrides. Negative values are never
/// counters. This is a naming heuristic, not a guarantee.
pub fn classify(key: &str, value: &RawValue) -> MetricKind {
    if GAUGE_KEYS.contains(&key) {
        return MetricKind::Gauge;
    }

    if value.as_f64().is_some_and(|v| v < 0.0) {
        return MetricKind::Gauge;
    }

    let suffix = generic_suffix(key);
    if ["count", "total", "time"].iter().any(|w| suffix.contains(w)) {
        MetricKind::Counter
    } else {
        MetricKind::Gauge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_java_lang_type() {
        assert_eq!(sanitize_name("java.lang:type=Threading"), "jvm_threading");
        assert_eq!(sanitize_name("java.lang:type=Memory"), "jvm_memory");
        assert_eq!(
            sanitize_name("java.lang:type=OperatingSystem"),
            "jvm_operatingsystem"
        );
    }

    #[test]
    fn test_sanitize_with_name_qualifier() {
        assert_eq!(
            sanitize_name("java.lang:type=GarbageCollector,name=G1 Young Generation"),
            "jvm_garbagecollector_g1_young_generation"
        );
        assert_eq!(
            sanitize_name("java.lang:name=Metaspace,type=MemoryPool"),
            "jvm_metaspace_memorypool"
        );
        assert_eq!(
            sanitize_name("java.lang:type=MemoryPool,name=G1 Old-Gen"),
            "jvm_memorypool_g1_old_gen"
        );
    }

    #[test]
    fn test_sanitize_other_domains() {
        assert_eq!(
            sanitize_name("com.sun.management:type=HotSpotDiagnostic"),
            "com_sun_management_hotspotdiagnostic"
        );
        assert_eq!(sanitize_name("a=b#c"), "a_b_c");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "java.lang:type=GarbageCollector,name=G1 Young Generation",
            "java.lang:name=CodeCacheManager,type=MemoryManager",
            "org.neo4j:instance=kernel#0,name=Transactions",
            "Weird::Name,,type=x y-z.w",
            "",
            "already_clean_name",
        ];

        for input in inputs {
            let once = sanitize_name(input);
            assert_eq!(sanitize_name(&once), once, "input: {input}");
        }
    }

    #[test]
    fn test_generic_suffix() {
        assert_eq!(generic_suffix("ThreadCount"), "thread_count");
        assert_eq!(
            generic_suffix("OpenFileDescriptorCount"),
            "open_file_descriptor_count"
        );
        assert_eq!(generic_suffix("ThreadCpuTime"), "thread_cpu_time");
        assert_eq!(generic_suffix("G1OldGen"), "g1old_gen");
        assert_eq!(generic_suffix("Object.Name-x"), "object_name_x");
    }

    #[test]
    fn test_classify_substring_rule() {
        assert_eq!(
            classify("ThreadCpuTime", &RawValue::Integer(10)),
            MetricKind::Counter
        );
        assert_eq!(
            classify("TotalCompilationTime", &RawValue::Integer(10)),
            MetricKind::Counter
        );
        assert_eq!(
            classify("UnloadedClassCount", &RawValue::Integer(2)),
            MetricKind::Counter
        );
        assert_eq!(
            classify("SystemLoadAverage", &RawValue::Float(1.5)),
            MetricKind::Gauge
        );
    }

    #[test]
    fn test_classify_gauge_overrides() {
        assert_eq!(
            classify("OpenFileDescriptorCount", &RawValue::Integer(120)),
            MetricKind::Gauge
        );
        assert_eq!(
            classify("PeakThreadCount", &RawValue::Integer(64)),
            MetricKind::Gauge
        );
        assert_eq!(
            classify("TotalMemorySize", &RawValue::Integer(17179869184)),
            MetricKind::Gauge
        );
    }

    #[test]
    fn test_classify_negative_is_gauge() {
        assert_eq!(
            classify("CollectionUsageThresholdCount", &RawValue::Integer(-1)),
            MetricKind::Gauge
        );
    }

    fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_labels_sanitizes_and_sorts() {
        let normalized =
            normalize_labels(&labels(&[("zone", "eu"), ("Data-Center", "dc1")])).unwrap();
        assert_eq!(
            normalized,
            vec![
                ("data_center".to_string(), "dc1".to_string()),
                ("zone".to_string(), "eu".to_string()),
            ]
        );
    }

    #[test]
    fn test_normalize_labels_rejects_invalid_names() {
        for bad in ["", "1zone", "__name__", "###"] {
            let result = normalize_labels(&labels(&[(bad, "x")]));
            assert!(result.is_err(), "accepted label name {bad:?}");
        }
    }

    #[test]
    fn test_normalize_labels_rejects_collisions() {
        let err = normalize_labels(&labels(&[("Data-Center", "a"), ("data_center", "b")]))
            .unwrap_err();
        assert!(err.contains("collides"), "unexpected error: {err}");
    }

    #[test]
    fn test_metric_kind_as_str() {
        assert_eq!(MetricKind::Gauge.as_str(), "gauge");
        assert_eq!(MetricKind::Counter.as_str(), "counter");
    }
}
