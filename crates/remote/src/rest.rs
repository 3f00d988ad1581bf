//! [`CollectionStore`] over the hosted table REST API.
use async_trait::async_trait;
use dairy_cms_core::schema::EntityKind;
use dairy_cms_core::store::{
    is_identifier, CollectionStore, Filter, ListQuery, StoreError, StoreResult,
};
use dairy_cms_core::Row;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::client::{transport, RemoteClient, RemoteFailure};

/// Ask for a single object; zero matches come back as `PGRST116`.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_ROWS: &str = "return=representation";

pub const SINGLE_ACTIVE_RPC: &str = "/rest/v1/rpc/set_single_active";

#[derive(Debug, Clone)]
pub struct RestStore {
    client: RemoteClient,
}

impl RestStore {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = request.send().await.map_err(transport)?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(RemoteFailure::from_response(response).await.into())
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
    response
        .json()
        .await
        .map_err(|e| StoreError::Decode(e.to_string()))
}

fn table_path(table: &str) -> StoreResult<String> {
    EntityKind::from_table(table).ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
    Ok(format!("/rest/v1/{table}"))
}

fn checked(column: &str) -> StoreResult<&str> {
    if is_identifier(column) {
        Ok(column)
    } else {
        Err(StoreError::InvalidColumn(column.to_string()))
    }
}

/// `column=eq.value` query pair for one filter.
pub fn filter_param(filter: &Filter) -> StoreResult<(String, String)> {
    let column = checked(&filter.column)?.to_string();
    let value = match &filter.value {
        Value::Null => "is.null".to_string(),
        Value::String(text) => format!("eq.{text}"),
        other => format!("eq.{other}"),
    };
    Ok((column, value))
}

fn id_param(id: &str) -> (String, String) {
    ("id".to_string(), format!("eq.{id}"))
}

pub fn list_params(query: &ListQuery) -> StoreResult<Vec<(String, String)>> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    for filter in &query.filters {
        params.push(filter_param(filter)?);
    }
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push((
            "order".to_string(),
            format!("{}.{direction}.nullslast", checked(&order.column)?),
        ));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    Ok(params)
}

#[async_trait]
impl CollectionStore for RestStore {
    async fn list(&self, table: &str, query: &ListQuery) -> StoreResult<Vec<Row>> {
        let path = table_path(table)?;
        let params = list_params(query)?;
        tracing::debug!(table, ?params, "listing rows");
        let response = self
            .send(self.client.request(Method::GET, &path).query(&params))
            .await?;
        decode(response).await
    }

    async fn get_one(&self, table: &str, id: &str) -> StoreResult<Row> {
        let path = table_path(table)?;
        let request = self
            .client
            .request(Method::GET, &path)
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .query(&[("select".to_string(), "*".to_string()), id_param(id)]);
        decode(self.send(request).await?).await
    }

    async fn find_one(&self, table: &str, filters: &[Filter]) -> StoreResult<Row> {
        let path = table_path(table)?;
        let mut params = vec![("select".to_string(), "*".to_string())];
        for filter in filters {
            params.push(filter_param(filter)?);
        }
        params.push(("limit".to_string(), "1".to_string()));
        let request = self
            .client
            .request(Method::GET, &path)
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .query(&params);
        decode(self.send(request).await?).await
    }

    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row> {
        let path = table_path(table)?;
        let request = self
            .client
            .request(Method::POST, &path)
            .header("Prefer", RETURN_ROWS)
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .json(&row);
        let row: Row = decode(self.send(request).await?).await?;
        tracing::info!(table, id = ?row.get("id"), "row inserted");
        Ok(row)
    }

    async fn update(&self, table: &str, id: &str, mut patch: Row) -> StoreResult<Row> {
        let path = table_path(table)?;
        patch.remove("id");
        let request = self
            .client
            .request(Method::PATCH, &path)
            .header("Prefer", RETURN_ROWS)
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .query(&[id_param(id)])
            .json(&patch);
        let row = decode(self.send(request).await?).await?;
        tracing::info!(table, id, "row updated");
        Ok(row)
    }

    async fn remove(&self, table: &str, id: &str) -> StoreResult<()> {
        let path = table_path(table)?;
        let request = self
            .client
            .request(Method::DELETE, &path)
            .header("Prefer", RETURN_ROWS)
            .query(&[id_param(id)]);
        let removed: Vec<Row> = decode(self.send(request).await?).await?;
        if removed.is_empty() {
            return Err(StoreError::NoRows);
        }
        tracing::info!(table, id, "row deleted");
        Ok(())
    }

    async fn set_single_active(&self, table: &str, column: &str, id: &str) -> StoreResult<()> {
        table_path(table)?;
        checked(column)?;
        let request = self.client.request(Method::POST, SINGLE_ACTIVE_RPC).json(&json!({
            "target_table": table,
            "target_column": column,
            "target_id": id,
        }));
        let found: bool = decode(self.send(request).await?).await?;
        if !found {
            return Err(StoreError::NoRows);
        }
        tracing::info!(table, column, id, "single active row set");
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.send(self.client.request(Method::GET, "/rest/v1/"))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_follow_query() {
        let query = ListQuery::new()
            .filter(Filter::eq("published", true))
            .filter(Filter::eq("author", "Lina"))
            .order_by("created_at", false)
            .limit(3);
        let params = list_params(&query).unwrap();
        assert_eq!(
            params,
            vec![
                ("select".to_string(), "*".to_string()),
                ("published".to_string(), "eq.true".to_string()),
                ("author".to_string(), "eq.Lina".to_string()),
                ("order".to_string(), "created_at.desc.nullslast".to_string()),
                ("limit".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn null_filters_use_is() {
        let (_, value) = filter_param(&Filter::eq("code", Value::Null)).unwrap();
        assert_eq!(value, "is.null");
    }

    #[test]
    fn rejects_unsafe_names() {
        assert!(matches!(
            filter_param(&Filter::eq("name&select=secret", 1)),
            Err(StoreError::InvalidColumn(_))
        ));
        assert!(matches!(table_path("pg_shadow"), Err(StoreError::UnknownTable(_))));
    }
}
