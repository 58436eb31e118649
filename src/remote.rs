//! Remote list service client.
//!
//! [`RemoteService`] is the capability interface the sync coordinator talks
//! to: list, fetch-one, create, update, delete, and full resync against a
//! revision-versioned remote list. Every mutating call carries the caller's
//! last-known revision; every call reports failure as an error value, never
//! as a panic across the boundary.
//!
//! [`HttpRemoteService`] implements the interface over HTTP with a static
//! bearer credential.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{TodoError, TodoResult};
use crate::models::TodoItem;

/// Header carrying the caller's last-known revision on mutating calls
pub const REVISION_HEADER: &str = "X-Last-Known-Revision";

/// Authoritative list payload: the full collection plus its revision
#[derive(Debug, Clone, Deserialize)]
pub struct TodoListResponse {
    pub list: Vec<TodoItem>,
    pub revision: i64,
}

/// Single-element response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct TodoElementResponse {
    pub element: TodoItem,
}

#[derive(Serialize)]
struct ElementRequest<'a> {
    element: &'a TodoItem,
}

/// Acknowledgement body of a mutating call. Servers may omit the new
/// revision, in which case the caller keeps its own.
#[derive(Debug, Deserialize)]
struct MutationAck {
    #[serde(default)]
    revision: Option<i64>,
}

/// Capability interface for the remote list service.
///
/// Implementations never mutate the caller's local store; they only report
/// outcomes and authoritative data back.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// `GET /list` - the full authoritative list and its revision
    async fn fetch_list(&self) -> TodoResult<TodoListResponse>;

    /// `GET /list/{id}` - one element; an unknown id is `NotFound`
    async fn fetch_item(&self, id: &str) -> TodoResult<TodoItem>;

    /// `POST /list` - create an element, returning the server's new
    /// revision when the acknowledgement carries one
    async fn create_item(&self, item: &TodoItem, revision: i64) -> TodoResult<Option<i64>>;

    /// `PUT /list/{id}` - update an element
    async fn update_item(&self, item: &TodoItem, revision: i64) -> TodoResult<Option<i64>>;

    /// `DELETE /list/{id}` - delete an element
    async fn delete_item(&self, id: &str, revision: i64) -> TodoResult<Option<i64>>;

    /// `PATCH /list` - full resync, returning the authoritative list and
    /// its revision
    async fn sync_list(&self, revision: i64) -> TodoResult<TodoListResponse>;
}

/// HTTP implementation of [`RemoteService`]
pub struct HttpRemoteService {
    base_url: String,
    token: String,
    client: Client,
}

impl HttpRemoteService {
    /// Build a client from configuration.
    ///
    /// The trust policy is an explicit configuration parameter rather than
    /// a process-wide override.
    pub fn new(config: &Config) -> TodoResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs())
            .build()
            .map_err(|err| TodoError::network(err.to_string()))?;

        Ok(Self {
            base_url: config.base_url().trim_end_matches('/').to_string(),
            token: config.token().to_string(),
            client,
        })
    }

    fn list_url(&self) -> String {
        format!("{}/list", self.base_url)
    }

    fn element_url(&self, id: &str) -> String {
        format!("{}/list/{}", self.base_url, id)
    }

    async fn send(&self, request: RequestBuilder) -> TodoResult<Response> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|err| TodoError::network(err.to_string()))?;
        if !response.status().is_success() {
            return Err(TodoError::ServerRejected(response.status().as_u16()));
        }
        Ok(response)
    }

    async fn send_mutation(&self, request: RequestBuilder) -> TodoResult<Option<i64>> {
        let response = self.send(request).await?;
        // an ack body without a revision keeps the caller's
        Ok(response
            .json::<MutationAck>()
            .await
            .ok()
            .and_then(|ack| ack.revision))
    }

    async fn decode_list(&self, response: Response) -> TodoResult<TodoListResponse> {
        response
            .json::<TodoListResponse>()
            .await
            .map_err(|err| TodoError::decode(err.to_string()))
    }
}

#[async_trait]
impl RemoteService for HttpRemoteService {
    async fn fetch_list(&self) -> TodoResult<TodoListResponse> {
        let response = self.send(self.client.get(self.list_url())).await?;
        self.decode_list(response).await
    }

    async fn fetch_item(&self, id: &str) -> TodoResult<TodoItem> {
        let response = self
            .client
            .get(self.element_url(id))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|err| TodoError::network(err.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(TodoError::NotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(TodoError::ServerRejected(response.status().as_u16()));
        }
        let body = response
            .json::<TodoElementResponse>()
            .await
            .map_err(|err| TodoError::decode(err.to_string()))?;
        Ok(body.element)
    }

    async fn create_item(&self, item: &TodoItem, revision: i64) -> TodoResult<Option<i64>> {
        let request = self
            .client
            .post(self.list_url())
            .header(REVISION_HEADER, revision)
            .json(&ElementRequest { element: item });
        self.send_mutation(request).await
    }

    async fn update_item(&self, item: &TodoItem, revision: i64) -> TodoResult<Option<i64>> {
        let request = self
            .client
            .put(self.element_url(&item.id))
            .header(REVISION_HEADER, revision)
            .json(&ElementRequest { element: item });
        self.send_mutation(request).await
    }

    async fn delete_item(&self, id: &str, revision: i64) -> TodoResult<Option<i64>> {
        let request = self
            .client
            .delete(self.element_url(id))
            .header(REVISION_HEADER, revision);
        self.send_mutation(request).await
    }

    async fn sync_list(&self, revision: i64) -> TodoResult<TodoListResponse> {
        let request = self
            .client
            .patch(self.list_url())
            .header(REVISION_HEADER, revision);
        let response = self.send(request).await?;
        self.decode_list(response).await
    }
}
