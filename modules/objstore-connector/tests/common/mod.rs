#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use figment::Figment;
use figment::providers::{Format, Yaml};
use objstore_connector::{ConnectorConfig, ObjectStoreConnector, ObjectStoreTransport};
use objstore_http::HttpError;
use objstore_query::{ModelDefinition, Record, SchemaRegistry};
use serde_json::{Value, json};

/// In-memory transport: records every POST and replays queued responses
/// (`Ok(None)` once the queue is empty).
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<(String, Value)>>,
    responses: Mutex<VecDeque<Result<Option<Value>, HttpError>>>,
}

impl RecordingTransport {
    pub fn respond(&self, response: Result<Option<Value>, HttpError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn respond_json(&self, body: Value) {
        self.respond(Ok(Some(body)));
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStoreTransport for RecordingTransport {
    async fn post(&self, path: &str, body: &Value) -> Result<Option<Value>, HttpError> {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_owned(), body.clone()));
        self.responses.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }
}

pub fn project_model() -> ModelDefinition {
    ModelDefinition::from_json(json!({
        "name": "Project",
        "properties": {
            "id": {"id": true, "objectStore": {"primaryKey": true, "propertyName": "project_uid"}},
            "title": {"objectStore": {"unique": true, "propertyName": "project"}},
            "objectTypeId": {},
            "team": {},
            "projectId": {"objectStore": {"propertyName": "project_id"}},
            "testProp": {"objectStore": {"ignore": true, "propertyName": "test_prop"}}
        }
    }))
    .unwrap()
}

pub fn config_yaml(service_url: &str, extra: &str) -> ConnectorConfig {
    let yaml = format!(
        "service_url: {service_url}\napi_token: t0k3n\nobject_type: com.example.Project\nallow_insecure_http: true\n{extra}"
    );
    ConnectorConfig::from_figment(&Figment::from(Yaml::string(&yaml))).unwrap()
}

pub fn connector_with(extra_config: &str) -> (ObjectStoreConnector, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::default());
    let connector = ObjectStoreConnector::new(
        config_yaml("https://objects.example.com", extra_config),
        SchemaRegistry::new().register(project_model()),
        transport.clone(),
    )
    .unwrap();
    (connector, transport)
}

pub fn record(value: Value) -> Record {
    serde_json::from_value(value).unwrap()
}
