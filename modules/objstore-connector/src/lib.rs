#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! ORM data-source connector for the object store.
//!
//! Wires the `objstore-query` translation core to the service's edit, load
//! and search endpoints:
//!
//! | Operation | Endpoint |
//! |---|---|
//! | `create`, `replace_by_id`, `destroy_by_id` | `paths.object_locator` |
//! | `find_by_id` | `paths.load_by_locator` |
//! | `find`, `count` | `paths.search?pageSize=N` |
//! | `update_all`, `destroy_all` | search, then `paths.object_locators` |
//!
//! ```ignore
//! let config = ConnectorConfig::load(Some(Path::new("objstore.yaml")))?;
//! let registry = SchemaRegistry::new().register(ModelDefinition::from_json(project_json)?);
//! let connector = ObjectStoreConnector::connect(config, registry)?;
//!
//! let filter: Filter = serde_json::from_value(json!({"where": {"team": "X"}, "limit": 10}))?;
//! let projects = connector.find("Project", &filter).await?;
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod infra;

pub use config::{ConnectorConfig, KeyConfig, ServicePaths};
pub use domain::connector::ObjectStoreConnector;
pub use domain::ports::ObjectStoreTransport;
pub use error::ConnectorError;
pub use infra::http_transport::HttpTransport;
