pub mod page;
pub mod retry;

pub use page::{CreatePageBody, CreatedPage, PageDraft, Parent};
pub use retry::RetryPolicy;

use std::time::Duration;

use notion_blocks::Block;
use page::{AppendBlocksBody, BlockList};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
pub const DEFAULT_API_VERSION: &str = "2022-06-28";
/// Largest `children` array the API accepts in one request.
pub const MAX_BLOCKS_PER_REQUEST: usize = 100;

const NOTION_VERSION_HEADER: &str = "Notion-Version";

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("Notion API key is required")]
    MissingApiKey,
    #[error("unknown parent type: {0}")]
    InvalidParent(String),
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("Notion API returned {status}: {message}")]
    Status {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
    #[error("failed to decode Notion response: {0}")]
    Decode(String),
    /// The page exists but some of its children could not be appended.
    #[error("page {} was created but appending its remaining blocks failed: {source}", .page.id)]
    PartialCreate {
        page: CreatedPage,
        source: Box<ClientError>,
    },
}

impl ClientError {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http(_) => true,
            ClientError::Status { status, .. } => retry::is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Error object returned by the Notion API on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub api_version: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Honor `HTTP(S)_PROXY` from the environment.
    pub use_env_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            use_env_proxy: true,
        }
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct NotionClient {
    http: Client,
    config: ClientConfig,
}

impl NotionClient {
    /// Builds a client for the configured workspace.
    ///
    /// # Errors
    ///
    /// Fails with [`ClientError::MissingApiKey`] when no key is configured,
    /// or [`ClientError::Http`] when the HTTP client cannot be created.
    pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        if config.api_key.trim().is_empty() {
            return Err(ClientError::MissingApiKey);
        }

        let mut builder = Client::builder()
            .user_agent(concat!("notion-blocks/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .gzip(true);
        if !config.use_env_proxy {
            builder = builder.no_proxy();
        }
        let http = builder
            .build()
            .map_err(|err| ClientError::Http(err.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Creates a page and returns its id.
    ///
    /// Children beyond [`MAX_BLOCKS_PER_REQUEST`] are appended to the new
    /// page in follow-up requests.
    ///
    /// # Errors
    ///
    /// Returns the first [`ClientError`] that survives the retry policy. When
    /// the page was created but a follow-up append failed, the error is
    /// [`ClientError::PartialCreate`] and carries the new page.
    #[instrument(
        name = "notion_client.create_page",
        skip(self, draft),
        fields(title = %draft.title, blocks = draft.children.len())
    )]
    pub async fn create_page(&self, draft: &PageDraft) -> Result<CreatedPage, ClientError> {
        let split = draft.children.len().min(MAX_BLOCKS_PER_REQUEST);
        let (first, rest) = draft.children.split_at(split);

        let page: CreatedPage = self
            .send_json(Method::POST, "pages", &draft.request_body_with(first))
            .await?;
        info!(target: "notion_client", page_id = %page.id, "page created");

        if !rest.is_empty() {
            if let Err(error) = self.append_blocks(&page.id, rest).await {
                warn!(
                    target: "notion_client",
                    page_id = %page.id,
                    pending = rest.len(),
                    error = %error,
                    "page created without all of its children"
                );
                return Err(ClientError::PartialCreate {
                    page,
                    source: Box::new(error),
                });
            }
        }
        Ok(page)
    }

    /// Appends `blocks` under `block_id` (a page or a block) and returns the
    /// ids of the created blocks in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`ClientError`] that survives the retry policy;
    /// batches sent before the failure stay appended.
    #[instrument(
        name = "notion_client.append_blocks",
        skip(self, blocks),
        fields(blocks = blocks.len())
    )]
    pub async fn append_blocks(
        &self,
        block_id: &str,
        blocks: &[Block],
    ) -> Result<Vec<String>, ClientError> {
        let path = format!("blocks/{block_id}/children");
        let mut ids = Vec::with_capacity(blocks.len());
        for chunk in blocks.chunks(MAX_BLOCKS_PER_REQUEST) {
            let list: BlockList = self
                .send_json(Method::PATCH, &path, &AppendBlocksBody { children: chunk })
                .await?;
            debug!(target: "notion_client", appended = list.results.len(), "batch appended");
            ids.extend(list.results.into_iter().map(|block| block.id));
        }
        Ok(ids)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{path}", self.config.base_url.trim_end_matches('/'));
        let policy = self.config.retry;
        let mut attempt = 1;

        loop {
            let outcome = match self
                .http
                .request(method.clone(), &url)
                .bearer_auth(&self.config.api_key)
                .header(NOTION_VERSION_HEADER, &self.config.api_version)
                .json(body)
                .send()
                .await
            {
                Ok(response) => Self::read_response(response).await,
                Err(err) => Err(ClientError::Http(err.to_string())),
            };

            match outcome {
                Err(error) if error.is_retryable() && policy.should_retry(attempt) => {
                    let delay = policy.delay_for(attempt);
                    warn!(
                        target: "notion_client",
                        %url,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %error,
                        "Notion request failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    warn!(
                        target: "notion_client",
                        %url,
                        attempt,
                        error = %error,
                        "Notion request failed"
                    );
                    return Err(error);
                }
                Ok(value) => return Ok(value),
            }
        }
    }

    async fn read_response<T>(response: Response) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ClientError::Http(err.to_string()))?;

        if !status.is_success() {
            return Err(status_error(status, &bytes));
        }

        serde_json::from_slice::<T>(&bytes).map_err(|err| ClientError::Decode(err.to_string()))
    }
}

fn status_error(status: StatusCode, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<ApiErrorBody>(body) {
        Ok(parsed) => ClientError::Status {
            status,
            code: parsed.code,
            message: parsed
                .message
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
        },
        Err(_) => ClientError::Status {
            status,
            code: None,
            message: String::from_utf8_lossy(body).trim().to_string(),
        },
    }
}
