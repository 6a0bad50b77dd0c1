use super::{Backend, BackendError, Collection, Query, Result};
use crate::models::{Account, DocumentList, Session};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

/// Where the hosted service lives and which collections hold our data.
#[derive(Debug, Clone)]
pub struct AppwriteConfig {
    /// API root including the version segment, e.g. `https://cloud.appwrite.io/v1`
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub user_collection_id: String,
    pub post_collection_id: String,
    pub saves_collection_id: String,
}

impl AppwriteConfig {
    fn collection_id(&self, collection: Collection) -> &str {
        match collection {
            Collection::Users => &self.user_collection_id,
            Collection::Posts => &self.post_collection_id,
            Collection::Saves => &self.saves_collection_id,
        }
    }
}

/// Error body returned by the REST API on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(rename = "type", default)]
    kind: String,
}

/// [`Backend`] over the Appwrite REST API.
///
/// The session cookie issued by `POST /account/sessions/email` is kept in the
/// client's cookie store and sent with every later request, the same way a
/// browser would.
pub struct AppwriteBackend {
    http: Client,
    config: AppwriteConfig,
}

impl AppwriteBackend {
    pub fn new(config: AppwriteConfig) -> Result<Self> {
        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(BackendError::Internal(format!(
                "Endpoint must start with http:// or https://, got {endpoint:?}"
            )));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "X-Appwrite-Project",
            header::HeaderValue::from_str(&config.project_id)
                .map_err(|e| BackendError::Internal(format!("Invalid project id: {e}")))?,
        );
        headers.insert(
            "X-Appwrite-Response-Format",
            header::HeaderValue::from_static("1.4.0"),
        );

        let http = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .user_agent(format!("Snapgram/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config: AppwriteConfig { endpoint, ..config },
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint, path)
    }

    fn documents_url(&self, collection: Collection) -> String {
        self.url(&format!(
            "/databases/{}/collections/{}/documents",
            self.config.database_id,
            self.config.collection_id(collection)
        ))
    }

    /// `base` with `id` appended as a single, percent-encoded path segment.
    fn resource_url(&self, base: &str, id: &str) -> Result<Url> {
        if id.is_empty() || id == "." || id == ".." {
            return Err(BackendError::BadRequest(format!("Invalid resource id {id:?}")));
        }
        let mut url = Url::parse(base)
            .map_err(|e| BackendError::Internal(format!("Invalid endpoint url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| BackendError::Internal(format!("Endpoint {base} cannot take a path")))?
            .push(id);
        Ok(url)
    }

    fn document_url(&self, collection: Collection, id: &str) -> Result<Url> {
        self.resource_url(&self.documents_url(collection), id)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or(ErrorBody {
            message: text,
            kind: String::new(),
        });

        Err(match status {
            StatusCode::BAD_REQUEST => BackendError::BadRequest(body.message),
            StatusCode::UNAUTHORIZED => BackendError::Unauthorized(body.message),
            StatusCode::NOT_FOUND => BackendError::NotFound(body.message),
            StatusCode::CONFLICT => BackendError::Conflict(body.message),
            StatusCode::TOO_MANY_REQUESTS => BackendError::RateLimited(body.message),
            _ => BackendError::Remote {
                code: status.as_u16(),
                kind: body.kind,
                message: body.message,
            },
        })
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Backend for AppwriteBackend {
    async fn create_account(
        &self,
        id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Account> {
        debug!(email = %email, "Creating account");
        let body = json!({ "userId": id, "email": email, "password": password, "name": name });
        self.json(self.http.post(self.url("/account")).json(&body))
            .await
    }

    async fn create_email_session(&self, email: &str, password: &str) -> Result<Session> {
        debug!(email = %email, "Creating email session");
        let body = json!({ "email": email, "password": password });
        self.json(self.http.post(self.url("/account/sessions/email")).json(&body))
            .await
    }

    async fn get_account(&self) -> Result<Account> {
        self.json(self.http.get(self.url("/account"))).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        debug!(session_id = %session_id, "Deleting session");
        let url = self.resource_url(&self.url("/account/sessions"), session_id)?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    fn avatar_initials(&self, name: &str) -> String {
        let base = self.url("/avatars/initials");
        let params = [("name", name), ("project", self.config.project_id.as_str())];
        match Url::parse_with_params(&base, &params) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{base}?name={name}&project={}", self.config.project_id),
        }
    }

    async fn create_document(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
    ) -> Result<Value> {
        debug!(collection = collection.name(), id = %id, "Creating document");
        let body = json!({ "documentId": id, "data": data });
        self.json(self.http.post(self.documents_url(collection)).json(&body))
            .await
    }

    async fn get_document(&self, collection: Collection, id: &str) -> Result<Value> {
        let url = self.document_url(collection, id)?;
        self.json(self.http.get(url)).await
    }

    async fn update_document(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
    ) -> Result<Value> {
        debug!(collection = collection.name(), id = %id, "Updating document");
        let url = self.document_url(collection, id)?;
        self.json(self.http.patch(url).json(&json!({ "data": data })))
            .await
    }

    async fn delete_document(&self, collection: Collection, id: &str) -> Result<()> {
        debug!(collection = collection.name(), id = %id, "Deleting document");
        let url = self.document_url(collection, id)?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    async fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> Result<DocumentList<Value>> {
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|query| ("queries[]", query.to_string()))
            .collect();
        debug!(collection = collection.name(), queries = ?params, "Listing documents");
        self.json(self.http.get(self.documents_url(collection)).query(&params))
            .await
    }
}
