use std::sync::Arc;

use objstore_http::HttpError;
use objstore_query::{
    CompiledFilter, Condition, Filter, KeyDerivation, ModelCompiler, ModelDefinition, QueryError,
    Record, RemoteObject, SchemaRegistry, WhereClause,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, trace};

use crate::config::ConnectorConfig;
use crate::domain::ports::ObjectStoreTransport;
use crate::domain::requests::{
    EditPayload, LocatorEdit, ObjectLocator, SearchRequest, SearchResponse,
};
use crate::error::ConnectorError;
use crate::infra::http_transport::HttpTransport;

/// ORM data-source connector backed by the object store.
///
/// Holds only immutable state; operations may run concurrently.
pub struct ObjectStoreConnector {
    config: Arc<ConnectorConfig>,
    registry: Arc<SchemaRegistry>,
    transport: Arc<dyn ObjectStoreTransport>,
    keys: KeyDerivation,
}

impl ObjectStoreConnector {
    /// # Errors
    /// Returns `ConnectorError::Config` if the configuration is invalid.
    pub fn new(
        config: ConnectorConfig,
        registry: SchemaRegistry,
        transport: Arc<dyn ObjectStoreTransport>,
    ) -> Result<Self, ConnectorError> {
        config.validate()?;
        if config.debug {
            debug!(settings = ?config, "object store connector settings");
        }
        debug!(models = registry.len(), service_url = %config.service_url, "object store connector ready");
        Ok(Self {
            keys: config.key.derivation(),
            config: Arc::new(config),
            registry: Arc::new(registry),
            transport,
        })
    }

    /// Connector over the HTTP transport described by `config`.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// Invalid configuration or HTTP client construction failure.
    pub fn connect(config: ConnectorConfig, registry: SchemaRegistry) -> Result<Self, ConnectorError> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Self::new(config, registry, Arc::new(transport))
    }

    #[must_use]
    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Create an object; returns the derived primary-key value.
    ///
    /// # Errors
    /// Schema errors (unknown model, missing primary key or unique property)
    /// and transport failures.
    #[instrument(skip_all, fields(model = %model))]
    pub async fn create(&self, model: &str, data: &Record) -> Result<String, ConnectorError> {
        let def = self.model(model)?;
        let pk = def.primary_key_physical_name()?;
        let key = self.keys.derive(&def, data)?;

        let body = LocatorEdit::new(
            ObjectLocator::single(self.type_id(&def), pk, Value::String(key.clone())),
            EditPayload::added(self.outgoing_properties(&def, data)),
        );
        self.post(&self.config.paths.object_locator, &body).await?;
        debug!(key = %key, "object created");
        Ok(key)
    }

    /// Load one object by primary-key value; `None` if it does not exist.
    ///
    /// # Errors
    /// Schema errors, transport failures and malformed objects.
    #[instrument(skip_all, fields(model = %model))]
    pub async fn find_by_id(
        &self,
        model: &str,
        id: &Value,
    ) -> Result<Option<Record>, ConnectorError> {
        let def = self.model(model)?;
        self.load(&def, id, &[]).await
    }

    /// Search with an ORM filter.
    ///
    /// A `where` that is exactly an equality on the identity property is
    /// served by a direct load instead of a search.
    ///
    /// # Errors
    /// Filter compilation errors, transport failures and malformed responses.
    #[instrument(skip_all, fields(model = %model))]
    pub async fn find(&self, model: &str, filter: &Filter) -> Result<Vec<Record>, ConnectorError> {
        let def = self.model(model)?;

        if let Some(id) = identity_lookup(&def, filter.r#where.as_ref())? {
            let whitelist = def.compile_fields(filter.fields.as_ref());
            return Ok(self.load(&def, &id, &whitelist).await?.into_iter().collect());
        }

        let query = def.compile_filter(filter)?;
        trace!(filter = %query.filter.to_json(), "compiled search filter");
        let page_size = query.limit.unwrap_or(self.config.default_page_size);
        let body = SearchRequest {
            object_types: vec![self.type_id(&def)],
            filter: query.filter,
            property_selector: query.property_selector.clone(),
            sort: query.sort,
        };
        let response = self.search(&body, page_size).await?;

        Ok(response
            .hits
            .iter()
            .filter_map(|hit| def.to_instance(Some(hit.object()), &query.property_selector))
            .collect())
    }

    /// Number of objects matching `where_clause`.
    ///
    /// # Errors
    /// Filter compilation errors, transport failures and malformed responses.
    #[instrument(skip_all, fields(model = %model))]
    pub async fn count(
        &self,
        model: &str,
        where_clause: Option<&Value>,
    ) -> Result<u64, ConnectorError> {
        let def = self.model(model)?;
        let body = SearchRequest {
            object_types: vec![self.type_id(&def)],
            filter: compile_where(&def, where_clause)?,
            property_selector: Vec::new(),
            sort: Vec::new(),
        };
        Ok(self.search(&body, 0).await?.total_hits)
    }

    /// Replace the properties of the object with primary-key value `id`.
    ///
    /// # Errors
    /// Schema errors and transport failures.
    #[instrument(skip_all, fields(model = %model))]
    pub async fn replace_by_id(
        &self,
        model: &str,
        id: &Value,
        data: &Record,
    ) -> Result<(), ConnectorError> {
        let def = self.model(model)?;
        let body = LocatorEdit::new(
            self.locator(&def, id)?,
            EditPayload::modified(self.outgoing_properties(&def, data)),
        );
        self.post(&self.config.paths.object_locator, &body).await?;
        Ok(())
    }

    /// Delete the object with primary-key value `id`.
    ///
    /// # Errors
    /// Schema errors and transport failures.
    #[instrument(skip_all, fields(model = %model))]
    pub async fn destroy_by_id(&self, model: &str, id: &Value) -> Result<(), ConnectorError> {
        let def = self.model(model)?;
        self.delete_one(&def, id).await
    }

    /// Apply `data` to every object matching `where_clause`; returns the
    /// number of matched objects.
    ///
    /// # Errors
    /// Filter compilation errors, search failures,
    /// `ConnectorError::TruncatedMatch` when more objects match than one page
    /// holds, and `ConnectorError::PartialBatchFailure` if the bulk edit fails.
    #[instrument(skip_all, fields(model = %model))]
    pub async fn update_all(
        &self,
        model: &str,
        where_clause: Option<&Value>,
        data: &Record,
    ) -> Result<usize, ConnectorError> {
        let def = self.model(model)?;
        let matched = self.matched_locators(&def, where_clause).await?;
        let payload = EditPayload::modified(self.outgoing_properties(&def, data));
        self.bulk_edit(matched, &payload).await
    }

    /// Delete every object matching `where_clause`; returns the number of
    /// matched objects.
    ///
    /// An identity equality loads the object by id instead of searching and
    /// deletes it only if it exists.
    ///
    /// # Errors
    /// Filter compilation errors, search failures,
    /// `ConnectorError::TruncatedMatch` when more objects match than one page
    /// holds, and `ConnectorError::PartialBatchFailure` if the bulk edit fails.
    #[instrument(skip_all, fields(model = %model))]
    pub async fn destroy_all(
        &self,
        model: &str,
        where_clause: Option<&Value>,
    ) -> Result<usize, ConnectorError> {
        let def = self.model(model)?;
        if let Some(id) = identity_lookup(&def, where_clause)? {
            if self.load(&def, &id, &[]).await?.is_none() {
                debug!("identity lookup found nothing; skipping delete");
                return Ok(0);
            }
            self.delete_one(&def, &id).await?;
            return Ok(1);
        }
        let matched = self.matched_locators(&def, where_clause).await?;
        self.bulk_edit(matched, &EditPayload::deleted()).await
    }

    fn model(&self, name: &str) -> Result<Arc<ModelDefinition>, ConnectorError> {
        Ok(Arc::clone(self.registry.require(name)?))
    }

    fn type_id(&self, def: &ModelDefinition) -> String {
        def.object_type_id
            .clone()
            .unwrap_or_else(|| self.config.object_type.clone())
    }

    fn locator(&self, def: &ModelDefinition, id: &Value) -> Result<ObjectLocator, ConnectorError> {
        let pk = def.primary_key_physical_name()?;
        Ok(ObjectLocator::single(self.type_id(def), pk, id.clone()))
    }

    fn outgoing_properties(&self, def: &ModelDefinition, data: &Record) -> Record {
        let mut properties = def.to_remote_properties(data);
        if let Some(policy) = &self.config.policy {
            properties.insert("policy".to_owned(), Value::String(policy.clone()));
        }
        properties
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<Value>, ConnectorError> {
        let body = serde_json::to_value(body).map_err(HttpError::from)?;
        debug!(path, "object store request");
        Ok(self.transport.post(path, &body).await?)
    }

    async fn load(
        &self,
        def: &ModelDefinition,
        id: &Value,
        whitelist: &[String],
    ) -> Result<Option<Record>, ConnectorError> {
        let locator = self.locator(def, id)?;
        let remote = match self.post(&self.config.paths.load_by_locator, &locator).await? {
            Some(value) => RemoteObject::from_json(value)?,
            None => None,
        };
        Ok(def.to_instance(remote.as_ref(), whitelist))
    }

    async fn delete_one(&self, def: &ModelDefinition, id: &Value) -> Result<(), ConnectorError> {
        let body = LocatorEdit::new(self.locator(def, id)?, EditPayload::deleted());
        self.post(&self.config.paths.object_locator, &body).await?;
        Ok(())
    }

    async fn search(
        &self,
        body: &SearchRequest,
        page_size: u32,
    ) -> Result<SearchResponse, ConnectorError> {
        let path = format!("{}?pageSize={page_size}", self.config.paths.search);
        let value = self.post(&path, body).await?.ok_or_else(|| {
            ConnectorError::InvalidResponse("search returned an empty body".to_owned())
        })?;
        serde_json::from_value(value).map_err(|e| ConnectorError::InvalidResponse(e.to_string()))
    }

    /// Locators of the objects matching `where_clause`, one search page of
    /// `default_page_size`. Fails with `TruncatedMatch` when the service
    /// reports more hits than that page holds.
    async fn matched_locators(
        &self,
        def: &ModelDefinition,
        where_clause: Option<&Value>,
    ) -> Result<Vec<ObjectLocator>, ConnectorError> {
        let type_id = self.type_id(def);
        let body = SearchRequest {
            object_types: vec![type_id.clone()],
            filter: compile_where(def, where_clause)?,
            property_selector: Vec::new(),
            sort: Vec::new(),
        };
        let response = self.search(&body, self.config.default_page_size).await?;
        let fetched = response.hits.len();
        if response.total_hits > fetched as u64 {
            return Err(ConnectorError::TruncatedMatch {
                total: response.total_hits,
                fetched,
            });
        }

        response
            .hits
            .iter()
            .map(|hit| {
                let primary_key = hit.object().primary_key.clone();
                if primary_key.is_empty() {
                    return Err(ConnectorError::InvalidResponse(
                        "search hit without primaryKey".to_owned(),
                    ));
                }
                Ok(ObjectLocator {
                    type_id: type_id.clone(),
                    primary_key,
                })
            })
            .collect()
    }

    async fn bulk_edit(
        &self,
        matched: Vec<ObjectLocator>,
        payload: &EditPayload,
    ) -> Result<usize, ConnectorError> {
        let count = matched.len();
        if count == 0 {
            debug!("no objects matched; skipping bulk edit");
            return Ok(0);
        }

        let edits: Vec<LocatorEdit> = matched
            .into_iter()
            .map(|locator| LocatorEdit::new(locator, payload.clone()))
            .collect();
        let body = serde_json::to_value(&edits).map_err(HttpError::from)?;
        let path = &self.config.paths.object_locators;
        debug!(path = %path, count, "object store bulk edit");

        self.transport
            .post(path, &body)
            .await
            .map_err(|source| ConnectorError::PartialBatchFailure {
                matched: count,
                source,
            })?;
        Ok(count)
    }
}

fn compile_where(
    def: &ModelDefinition,
    where_clause: Option<&Value>,
) -> Result<CompiledFilter, QueryError> {
    match where_clause {
        Some(raw) => def.compile_where(raw),
        None => Ok(CompiledFilter::match_all()),
    }
}

/// `Some(id)` when `where_clause` is exactly `{<identity property>: <scalar>}`.
fn identity_lookup(
    def: &ModelDefinition,
    where_clause: Option<&Value>,
) -> Result<Option<Value>, QueryError> {
    let (Some(identity), Some(raw)) = (def.identity_property(), where_clause) else {
        return Ok(None);
    };
    Ok(match WhereClause::parse(raw)? {
        Some(WhereClause::Leaf {
            property,
            condition: Condition::Eq(value),
        }) if property == identity && !value.is_null() => Some(value),
        _ => None,
    })
}
