//! Catalog API
//!
//! [`OpenMetadata`] is the public operation surface. Every call resolves its
//! REST collection through the entity registry, performs one request on the
//! [`Transport`] and decodes the result into the kind's read shape.
//!
//! Kind-specific operations live on focused helpers borrowed from the
//! client: [`OpenMetadata::lineage`] and [`OpenMetadata::tables`].
//!
//! # Example
//!
//! ```ignore
//! use ometa::{MetadataServerConfig, OpenMetadata, entity::models::Table};
//!
//! async fn example() -> ometa::Result<()> {
//!     let metadata = OpenMetadata::new(&MetadataServerConfig::load_default()?).await?;
//!     if let Some(table) = metadata.get_by_name::<Table>("mysql.shop.orders", None).await? {
//!         println!("{}", table.id);
//!     }
//!     Ok(())
//! }
//! ```

mod lineage;
mod table;

#[cfg(test)]
pub(crate) mod fake;

pub use lineage::{LineageApi, DEFAULT_LINEAGE_DEPTH};
pub use table::TableApi;

use crate::config::MetadataServerConfig;
use crate::entity::{registry, route_for, EntityKind, Shape};
use crate::error::{OmetaError, Result};
use crate::rest::{AuthProvider, RestClient, Transport};
use chrono::NaiveDate;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Page size used when callers do not pick one
pub const DEFAULT_LIST_LIMIT: usize = 1000;

/// One page of a keyset-paginated listing
#[derive(Debug, Clone, PartialEq)]
pub struct EntityList<E> {
    pub entities: Vec<E>,
    /// Total number of entities on the server, across all pages
    pub total: u64,
    /// Opaque cursor for the next page; `None` on the last page
    pub after: Option<String>,
}

impl<E> EntityList<E> {
    pub fn is_last_page(&self) -> bool {
        self.after.is_none()
    }
}

/// Listing options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub fields: Vec<String>,
    pub after: Option<String>,
    pub limit: usize,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            after: None,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl ListParams {
    pub fn fields<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.fields = fields.iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    pub fn after(mut self, after: Option<String>) -> Self {
        self.after = after;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

#[derive(Deserialize)]
struct Paging {
    total: u64,
    #[serde(default)]
    after: Option<String>,
}

#[derive(Deserialize)]
struct ListResponse<E> {
    data: Vec<E>,
    paging: Paging,
}

#[derive(Deserialize)]
struct DataResponse<E> {
    data: Vec<E>,
}

/// Typed client over the catalog REST API
#[derive(Clone)]
pub struct OpenMetadata<T: Transport = RestClient> {
    transport: T,
}

impl OpenMetadata<RestClient> {
    /// Build a client from configuration; tokens are fetched lazily on first request
    pub async fn new(config: &MetadataServerConfig) -> Result<Self> {
        config.validate()?;
        let auth = AuthProvider::from_config(config).await?;
        let client = RestClient::new(config.client_config()?, Arc::new(auth))?;
        Ok(Self::with_transport(client))
    }
}

impl<T: Transport> OpenMetadata<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Lineage operations
    pub fn lineage(&self) -> LineageApi<'_, T> {
        LineageApi::new(&self.transport)
    }

    /// Table-specific operations
    pub fn tables(&self) -> TableApi<'_, T> {
        TableApi::new(&self.transport)
    }

    /// Create or update an entity from its create shape
    ///
    /// Services are created with POST; every other kind uses PUT, which the
    /// server treats as create-or-update. Passing a read shape fails with
    /// [`OmetaError::InvalidEntity`].
    pub async fn create_or_update<C: Shape>(&self, data: &C) -> Result<C::Read> {
        let read = registry::read_shape_for(&C::descriptor())?;
        if read.name != <C::Read as Shape>::NAME {
            return Err(OmetaError::UnknownEntityKind {
                type_name: C::NAME.to_string(),
            });
        }

        let spec = registry::spec_for(C::KIND)?;
        let path = route_for(data)?;
        let method = if spec.is_service {
            Method::POST
        } else {
            Method::PUT
        };

        let body = serde_json::to_value(data)
            .map_err(|e| OmetaError::decode(format!("{} request body", C::NAME), e))?;

        tracing::info!("{} {} ({})", method, path, C::NAME);
        let response = self.transport.send(method, path, Some(body)).await?;
        decode(response, read.name)
    }

    /// Fetch an entity by fully qualified name; `None` when the server has no such entity
    pub async fn get_by_name<E: Shape>(
        &self,
        fqn: &str,
        fields: Option<&[&str]>,
    ) -> Result<Option<E::Read>> {
        let path = format!("name/{}", urlencoding::encode(fqn));
        self.get::<E>(&path, fields).await
    }

    /// Fetch an entity by id; `None` when the server has no such entity
    pub async fn get_by_id<E: Shape>(
        &self,
        id: Uuid,
        fields: Option<&[&str]>,
    ) -> Result<Option<E::Read>> {
        self.get::<E>(&id.to_string(), fields).await
    }

    async fn get<E: Shape>(
        &self,
        suffix: &str,
        fields: Option<&[&str]>,
    ) -> Result<Option<E::Read>> {
        let base = registry::resolve_path(E::KIND)?;
        let query = fields.map(fields_query).unwrap_or_default();
        let path = format!("{}/{}{}", base, suffix, query);
        get_optional(&self.transport, &path, <E::Read as Shape>::NAME).await
    }

    /// Fetch one page of entities
    pub async fn list_entities<E: Shape>(
        &self,
        params: &ListParams,
    ) -> Result<EntityList<E::Read>> {
        let response = self.list_entities_raw::<E>(params).await?;
        let page: ListResponse<E::Read> =
            decode(response, &format!("{} page", <E::Read as Shape>::NAME))?;

        tracing::debug!(
            "Listed {} of {} {} entities",
            page.data.len(),
            page.paging.total,
            E::KIND
        );

        Ok(EntityList {
            entities: page.data,
            total: page.paging.total,
            after: page.paging.after,
        })
    }

    /// Fetch one page exactly as the server sent it, fields the schemas do not model included
    pub async fn list_entities_raw<E: Shape>(&self, params: &ListParams) -> Result<Value> {
        let base = registry::resolve_path(E::KIND)?;
        let mut path = format!("{}?limit={}", base, params.limit);
        if let Some(after) = &params.after {
            path.push_str(&format!("&after={}", urlencoding::encode(after)));
        }
        if !params.fields.is_empty() {
            path.push_str(&format!("&fields={}", encode_fields(&params.fields)));
        }

        self.transport.send(Method::GET, &path, None).await
    }

    /// Fetch every entity of a kind, following `after` cursors until the last page
    ///
    /// An empty page ends the listing even if it carries a cursor. A cursor
    /// equal to the one just sent fails with [`OmetaError::StalledCursor`].
    pub async fn list_all_entities<E: Shape>(
        &self,
        params: &ListParams,
    ) -> Result<Vec<E::Read>> {
        let mut all_entities = Vec::new();
        let mut params = params.clone();

        loop {
            let page = self.list_entities::<E>(&params).await?;
            let Some(after) = page.after else {
                all_entities.extend(page.entities);
                break;
            };

            if page.entities.is_empty() {
                tracing::warn!("Empty {} page with cursor {}, stopping", E::KIND, after);
                break;
            }
            if params.after.as_deref() == Some(after.as_str()) {
                tracing::error!("Cursor {} repeated while listing {}", after, E::KIND);
                return Err(OmetaError::StalledCursor {
                    path: registry::resolve_path(E::KIND)?.to_string(),
                    cursor: after,
                });
            }

            all_entities.extend(page.entities);
            params.after = Some(after);
        }

        Ok(all_entities)
    }

    /// List a service collection; services are not paginated
    pub async fn list_services<E: Shape>(&self) -> Result<Vec<E::Read>> {
        let response = self.list_services_raw::<E>().await?;
        let services: DataResponse<E::Read> =
            decode(response, &format!("{} list", <E::Read as Shape>::NAME))?;
        Ok(services.data)
    }

    /// List a service collection without decoding the response
    pub async fn list_services_raw<E: Shape>(&self) -> Result<Value> {
        let path = registry::resolve_path(E::KIND)?;
        self.transport.send(Method::GET, path, None).await
    }

    /// Delete an entity by id
    pub async fn delete<E: Shape>(&self, id: Uuid) -> Result<()> {
        let path = format!("{}/{}", registry::resolve_path(E::KIND)?, id);
        tracing::info!("DELETE {}", path);
        self.transport.send(Method::DELETE, &path, None).await?;
        Ok(())
    }

    /// Ask the server to recompute usage percentiles for a kind on a date
    pub async fn compute_percentile(&self, kind: EntityKind, date: NaiveDate) -> Result<()> {
        let path = format!(
            "/usage/compute.percentile/{}/{}",
            kind.name(),
            date.format("%Y-%m-%d")
        );
        let response = self.transport.send(Method::POST, &path, None).await?;
        tracing::debug!("published compute percentile {}", response);
        Ok(())
    }

    /// [`Self::compute_percentile`] for a kind given by name, e.g. `"table"`
    pub async fn compute_percentile_by_name(&self, kind: &str, date: NaiveDate) -> Result<()> {
        self.compute_percentile(kind.parse()?, date).await
    }

    /// True when the server reports itself healthy
    pub async fn health_check(&self) -> Result<bool> {
        let response = self.transport.send(Method::GET, "/health-check", None).await?;
        Ok(response.get("status").and_then(Value::as_str) == Some("healthy"))
    }
}

/// Decode a response body, naming what was expected on failure
pub(crate) fn decode<E: DeserializeOwned>(value: Value, context: &str) -> Result<E> {
    serde_json::from_value(value).map_err(|e| OmetaError::decode(context, e))
}

/// GET that maps 404 to `None`; every other failure propagates
pub(crate) async fn get_optional<T: Transport, E: DeserializeOwned>(
    transport: &T,
    path: &str,
    context: &str,
) -> Result<Option<E>> {
    match transport.send(Method::GET, path, None).await {
        Ok(response) => decode(response, context).map(Some),
        Err(err) if err.is_not_found() => {
            tracing::error!("Error 404 trying to GET {} for {}", context, path);
            Ok(None)
        },
        Err(err) => Err(err),
    }
}

fn encode_fields<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| urlencoding::encode(f.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

fn fields_query(fields: &[&str]) -> String {
    if fields.is_empty() {
        String::new()
    } else {
        format!("?fields={}", encode_fields(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeTransport;
    use super::*;
    use crate::entity::models::*;
    use serde_json::json;

    fn table_json(name: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "name": name,
            "fullyQualifiedName": format!("mysql.shop.{}", name),
            "columns": [{"name": "id", "dataType": "BIGINT"}],
            "href": "http://localhost:8585/api/v1/tables/x",
            "version": 0.1,
            "updatedAt": 1650000000000i64,
            "updatedBy": "admin"
        })
    }

    fn api_error(status: u16) -> OmetaError {
        OmetaError::Api {
            method: "GET".to_string(),
            path: "/tables".to_string(),
            status,
            message: String::new(),
        }
    }

    #[tokio::test]
    async fn test_data_kind_uses_put() {
        let fake = FakeTransport::new();
        fake.push_ok(table_json("orders"));
        let metadata = OpenMetadata::with_transport(fake);

        let request = CreateTable {
            name: "orders".to_string(),
            columns: vec![Column {
                name: "id".to_string(),
                data_type: "BIGINT".to_string(),
                ..Default::default()
            }],
            database: Uuid::new_v4(),
            ..Default::default()
        };
        let table = metadata.create_or_update(&request).await.unwrap();
        assert_eq!(table.name, "orders");

        let calls = metadata.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::PUT);
        assert_eq!(calls[0].path, "/tables");
        assert_eq!(calls[0].body.as_ref().unwrap()["name"], "orders");
    }

    #[tokio::test]
    async fn test_service_kind_uses_post() {
        let fake = FakeTransport::new();
        fake.push_ok(json!({
            "id": Uuid::new_v4(),
            "name": "kafka_prod",
            "serviceType": "Kafka",
            "brokers": ["broker:9092"]
        }));
        let metadata = OpenMetadata::with_transport(fake);

        let request = CreateMessagingService {
            name: "kafka_prod".to_string(),
            service_type: "Kafka".to_string(),
            brokers: vec!["broker:9092".to_string()],
            ..Default::default()
        };
        let service = metadata.create_or_update(&request).await.unwrap();
        assert_eq!(service.brokers, vec!["broker:9092".to_string()]);

        let calls = metadata.transport().calls();
        assert_eq!(calls[0].method, Method::POST);
        assert_eq!(calls[0].path, "/services/messagingServices");
    }

    #[tokio::test]
    async fn test_read_shape_is_rejected_for_writes() {
        let metadata = OpenMetadata::with_transport(FakeTransport::new());
        let err = metadata.create_or_update(&Table::default()).await.unwrap_err();
        assert!(matches!(
            err,
            OmetaError::InvalidEntity { ref type_name, .. } if type_name == "Table"
        ));
        assert!(metadata.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_self_paired_kind_can_be_written() {
        let fake = FakeTransport::new();
        fake.push_ok(json!({"id": Uuid::nil(), "name": "weekly"}));
        let metadata = OpenMetadata::with_transport(fake);

        let report = Report {
            name: "weekly".to_string(),
            ..Default::default()
        };
        metadata.create_or_update(&report).await.unwrap();
        assert_eq!(metadata.transport().calls()[0].method, Method::PUT);
        assert_eq!(metadata.transport().calls()[0].path, "/reports");
    }

    #[tokio::test]
    async fn test_get_by_name_builds_path_with_fields() {
        let fake = FakeTransport::new();
        fake.push_ok(table_json("orders"));
        let metadata = OpenMetadata::with_transport(fake);

        let table = metadata
            .get_by_name::<Table>("mysql.shop.orders", Some(&["columns", "owner"]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(table.fully_qualified_name.as_deref(), Some("mysql.shop.orders"));
        assert_eq!(
            metadata.transport().calls()[0].path,
            "/tables/name/mysql.shop.orders?fields=columns,owner"
        );
    }

    #[tokio::test]
    async fn test_get_accepts_create_shape_type() {
        let fake = FakeTransport::new();
        fake.push_ok(table_json("orders"));
        let metadata = OpenMetadata::with_transport(fake);

        let table: Option<Table> = metadata
            .get_by_name::<CreateTable>("orders", None)
            .await
            .unwrap();
        assert!(table.is_some());
        assert_eq!(metadata.transport().calls()[0].path, "/tables/name/orders");
    }

    #[tokio::test]
    async fn test_get_not_found_is_none() {
        let fake = FakeTransport::new();
        fake.push_err(api_error(404));
        fake.push_err(api_error(404));
        let metadata = OpenMetadata::with_transport(fake);

        assert!(metadata.get_by_name::<Table>("missing", None).await.unwrap().is_none());
        assert!(metadata.get_by_id::<Table>(Uuid::new_v4(), None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_server_error_propagates() {
        let fake = FakeTransport::new();
        fake.push_err(api_error(500));
        let metadata = OpenMetadata::with_transport(fake);

        let err = metadata.get_by_id::<Dashboard>(Uuid::new_v4(), None).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_get_decode_error_propagates() {
        let fake = FakeTransport::new();
        fake.push_ok(json!({"name": 42}));
        let metadata = OpenMetadata::with_transport(fake);

        let err = metadata.get_by_name::<Table>("broken", None).await.unwrap_err();
        assert!(matches!(err, OmetaError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_list_entities_with_cursor() {
        let fake = FakeTransport::new();
        fake.push_ok(json!({
            "data": [table_json("a"), table_json("b")],
            "paging": {"total": 5, "after": "cursor-2"}
        }));
        let metadata = OpenMetadata::with_transport(fake);

        let params = ListParams::default()
            .limit(2)
            .after(Some("cursor-1".to_string()))
            .fields(&["owner"]);
        let page = metadata.list_entities::<Table>(&params).await.unwrap();

        assert_eq!(page.entities.len(), 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.after.as_deref(), Some("cursor-2"));
        assert!(!page.is_last_page());
        assert_eq!(
            metadata.transport().calls()[0].path,
            "/tables?limit=2&after=cursor-1&fields=owner"
        );
    }

    #[tokio::test]
    async fn test_list_entities_last_page() {
        let fake = FakeTransport::new();
        fake.push_ok(json!({"data": [table_json("z")], "paging": {"total": 1}}));
        let metadata = OpenMetadata::with_transport(fake);

        let page = metadata.list_entities::<Table>(&ListParams::default()).await.unwrap();
        assert!(page.is_last_page());
        assert_eq!(metadata.transport().calls()[0].path, "/tables?limit=1000");
    }

    #[tokio::test]
    async fn test_list_all_stops_on_empty_page_with_cursor() {
        let fake = FakeTransport::new();
        fake.push_ok(json!({"data": [table_json("a")], "paging": {"total": 1, "after": "c1"}}));
        fake.push_ok(json!({"data": [], "paging": {"total": 0, "after": "c2"}}));
        let metadata = OpenMetadata::with_transport(fake);

        let tables = metadata
            .list_all_entities::<Table>(&ListParams::default())
            .await
            .unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(metadata.transport().calls().len(), 2);
    }

    #[tokio::test]
    async fn test_list_all_rejects_repeated_cursor() {
        let fake = FakeTransport::new();
        fake.push_ok(json!({"data": [table_json("a")], "paging": {"total": 9, "after": "same"}}));
        fake.push_ok(json!({"data": [table_json("b")], "paging": {"total": 9, "after": "same"}}));
        let metadata = OpenMetadata::with_transport(fake);

        let err = metadata
            .list_all_entities::<Table>(&ListParams::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OmetaError::StalledCursor { ref path, ref cursor }
                if path == "/tables" && cursor == "same"
        ));

        let calls = metadata.transport().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].path, "/tables?limit=1000&after=same");
    }

    #[tokio::test]
    async fn test_list_services_is_not_paginated() {
        let fake = FakeTransport::new();
        fake.push_ok(json!({
            "data": [
                {"id": Uuid::new_v4(), "name": "mysql", "serviceType": "MySQL"},
                {"id": Uuid::new_v4(), "name": "pg", "serviceType": "Postgres"}
            ],
            "paging": {"total": 2}
        }));
        let metadata = OpenMetadata::with_transport(fake);

        let services = metadata.list_services::<DatabaseService>().await.unwrap();
        assert_eq!(services.len(), 2);
        assert_eq!(services[1].service_type, "Postgres");
        assert_eq!(metadata.transport().calls()[0].path, "/services/databaseServices");
    }

    #[tokio::test]
    async fn test_delete_and_percentile_paths() {
        let fake = FakeTransport::new();
        fake.push_ok(Value::Null);
        fake.push_ok(Value::Null);
        let metadata = OpenMetadata::with_transport(fake);

        let id = Uuid::new_v4();
        metadata.delete::<Chart>(id).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2022, 3, 7).unwrap();
        metadata.compute_percentile(EntityKind::Table, date).await.unwrap();

        let calls = metadata.transport().calls();
        assert_eq!(calls[0].method, Method::DELETE);
        assert_eq!(calls[0].path, format!("/charts/{}", id));
        assert_eq!(calls[1].method, Method::POST);
        assert_eq!(calls[1].path, "/usage/compute.percentile/table/2022-03-07");
    }

    #[tokio::test]
    async fn test_compute_percentile_by_name() {
        let fake = FakeTransport::new();
        fake.push_ok(Value::Null);
        let metadata = OpenMetadata::with_transport(fake);

        let date = NaiveDate::from_ymd_opt(2022, 3, 7).unwrap();
        metadata.compute_percentile_by_name("Dashboard", date).await.unwrap();
        assert_eq!(
            metadata.transport().calls()[0].path,
            "/usage/compute.percentile/dashboard/2022-03-07"
        );

        let err = metadata
            .compute_percentile_by_name("glossary", date)
            .await
            .unwrap_err();
        assert!(matches!(err, OmetaError::UnknownEntityKind { .. }));
        assert_eq!(metadata.transport().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_raw_listings_keep_unmodelled_fields() {
        let fake = FakeTransport::new();
        let page = json!({
            "data": [{"id": Uuid::nil(), "name": "orders", "extension": {"tier": "gold"}}],
            "paging": {"total": 1}
        });
        fake.push_ok(page.clone());
        fake.push_ok(json!({"data": [{"name": "kafka", "brokerConfig": {"acks": "all"}}]}));
        let metadata = OpenMetadata::with_transport(fake);

        let raw = metadata
            .list_entities_raw::<Table>(&ListParams::default().limit(5))
            .await
            .unwrap();
        assert_eq!(raw, page);

        let services = metadata.list_services_raw::<MessagingService>().await.unwrap();
        assert_eq!(services["data"][0]["brokerConfig"]["acks"], "all");

        let calls = metadata.transport().calls();
        assert_eq!(calls[0].path, "/tables?limit=5");
        assert_eq!(calls[1].path, "/services/messagingServices");
    }

    #[tokio::test]
    async fn test_delete_error_propagates() {
        let fake = FakeTransport::new();
        fake.push_err(api_error(404));
        let metadata = OpenMetadata::with_transport(fake);

        let err = metadata.delete::<Table>(Uuid::new_v4()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_health_check_status_values() {
        let fake = FakeTransport::new();
        fake.push_ok(json!({"status": "healthy"}));
        fake.push_ok(json!({"status": "degraded"}));
        fake.push_ok(json!({}));
        let metadata = OpenMetadata::with_transport(fake);

        assert!(metadata.health_check().await.unwrap());
        assert!(!metadata.health_check().await.unwrap());
        assert!(!metadata.health_check().await.unwrap());
        assert_eq!(metadata.transport().calls()[0].path, "/health-check");
    }
}
