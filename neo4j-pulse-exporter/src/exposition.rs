//! Prometheus text exposition lines and document encoding.

use std::fmt;

use chrono::{DateTime, Local};

use crate::mapping::MetricKind;

/// Numeric value of a sample line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    Integer(i64),
    Float(f64),
}

impl fmt::Display for SampleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleValue::Integer(v) => write!(f, "{}", v),
            SampleValue::Float(v) => f.write_str(&format_float(*v)),
        }
    }
}

/// One line of the exposition document.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricLine {
    /// Free-form `# ...` comment.
    Comment(String),
    /// Empty separator line.
    Blank,
    /// `# HELP <name> <help>`
    Help { name: String, help: String },
    /// `# TYPE <name> <kind>`
    Type { name: String, kind: MetricKind },
    /// `<name>[{labels}] <value>`
    Sample {
        name: String,
        labels: Vec<(String, String)>,
        value: SampleValue,
    },
}

impl MetricLine {
    pub fn is_sample(&self) -> bool {
        matches!(self, MetricLine::Sample { .. })
    }
}

impl fmt::Display for MetricLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricLine::Comment(text) => write!(f, "# {}", text),
            MetricLine::Blank => Ok(()),
            MetricLine::Help { name, help } => write!(f, "# HELP {} {}", name, escape_help(help)),
            MetricLine::Type { name, kind } => write!(f, "# TYPE {} {}", name, kind.as_str()),
            MetricLine::Sample {
                name,
                labels,
                value,
            } => write!(f, "{}{} {}", name, format_labels(labels), value),
        }
    }
}

/// Ordered lines produced by one collector strategy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSet {
    lines: Vec<MetricLine>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a metric as its HELP, TYPE and sample lines.
    pub fn push(
        &mut self,
        name: impl Into<String>,
        help: impl Into<String>,
        kind: MetricKind,
        value: SampleValue,
    ) {
        let name = name.into();
        self.lines.push(MetricLine::Help {
            name: name.clone(),
            help: help.into(),
        });
        self.lines.push(MetricLine::Type {
            name: name.clone(),
            kind,
        });
        self.lines.push(MetricLine::Sample {
            name,
            labels: Vec::new(),
            value,
        });
    }

    pub fn extend(&mut self, other: MetricSet) {
        self.lines.extend(other.lines);
    }

    pub fn lines(&self) -> &[MetricLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<MetricLine> {
        self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of sample lines.
    pub fn sample_count(&self) -> usize {
        self.lines.iter().filter(|l| l.is_sample()).count()
    }
}

/// Full scrape response: a header block followed by every collector's lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpositionDocument {
    header: Vec<MetricLine>,
    lines: Vec<MetricLine>,
}

impl ExpositionDocument {
    /// Build a document stamped with the given generation time.
    pub fn new(generated_at: DateTime<Local>, lines: Vec<MetricLine>) -> Self {
        Self {
            header: header_lines(generated_at),
            lines,
        }
    }

    /// Collector lines, without the header.
    pub fn metric_lines(&self) -> &[MetricLine] {
        &self.lines
    }

    /// Render the document as UTF-8 text: lines joined by `\n`, with a
    /// trailing newline.
    pub fn encode(&self) -> String {
        let mut output = self
            .header
            .iter()
            .chain(self.lines.iter())
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        output.push('\n');
        output
    }
}

fn header_lines(generated_at: DateTime<Local>) -> Vec<MetricLine> {
    vec![
        MetricLine::Comment("JVM & Neo4j Metrics Export".to_string()),
        MetricLine::Comment(format!(
            "Generated at: {}",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        )),
        MetricLine::Comment("Source: JVM JMX + Neo4j APOC/DBMS via Cypher queries".to_string()),
        MetricLine::Blank,
    ]
}

/// Escape HELP text (backslash and newline).
fn escape_help(help: &str) -> String {
    let mut result = String::with_capacity(help.len());
    for c in help.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape special characters in label values.
fn escape_label_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

/// Format labels for Prometheus exposition format.
fn format_labels(labels: &[(String, String)]) -> String {
    if labels.is_empty() {
        return String::new();
    }

    let parts: Vec<String> = labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
        .collect();

    format!("{{{}}}", parts.join(","))
}

/// Format a floating point value. Finite integral values below 1e16 keep a
/// `.0` suffix; larger ones print as plain digits.
fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        }
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
