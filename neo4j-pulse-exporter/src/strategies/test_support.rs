//! In-memory session replaying canned query results.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use neo4j_pulse_common::{Error, QuerySession, RawValue, Record, Result};
use serde_json::Value;

#[derive(Default)]
pub(crate) struct ScriptedSession {
    responses: HashMap<String, std::result::Result<Vec<Record>, String>>,
    executed: Mutex<Vec<String>>,
}

impl ScriptedSession {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_records(mut self, query: &str, records: Vec<Record>) -> Self {
        self.responses.insert(query.to_string(), Ok(records));
        self
    }

    pub(crate) fn with_failure(mut self, query: &str, message: &str) -> Self {
        self.responses
            .insert(query.to_string(), Err(message.to_string()));
        self
    }

    pub(crate) fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl QuerySession for ScriptedSession {
    fn run(&self, query: &str) -> impl Future<Output = Result<Vec<Record>>> + Send {
        self.executed.lock().unwrap().push(query.to_string());

        let result = match self.responses.get(query) {
            Some(Ok(records)) => Ok(records.clone()),
            Some(Err(message)) => Err(Error::Query(message.clone())),
            None => Err(Error::Query(format!("no scripted response for {query}"))),
        };

        async move { result }
    }
}

/// A JMX bean record with the given attribute tree.
pub(crate) fn jmx_record(name: &str, attributes: Value) -> Record {
    Record::default()
        .with_field("name", name)
        .with_field("attributes", RawValue::from_json(attributes))
}

/// A single record built from a JSON object's fields.
pub(crate) fn record_from_json(fields: Value) -> Record {
    match RawValue::from_json(fields) {
        RawValue::Object(entries) => Record::new(entries),
        _ => Record::default(),
    }
}

/// Render a set's lines to strings.
pub(crate) fn rendered(set: &crate::exposition::MetricSet) -> Vec<String> {
    set.lines().iter().map(ToString::to_string).collect()
}
