//! Browser backend
//!
//! Request handling for the web front end, independent of any HTTP stack.
//! Every API call must carry the per-server key; every call but `startup`
//! also needs a session, which exists once a configuration and a client are
//! installed. Operation failures travel back in the response's `Error`
//! field; only key, session and request-shape problems are `ApiError`s.

use crate::client::Client;
use crate::config::{UiConfig, DEFAULT_PATH};
use crate::entry::DirEntry;
use crate::error::ApiError;
use crate::path::{all_files_glob, PathName, UserName};
use crate::treeop::TreeOp;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::net::ToSocketAddrs;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Configured state the API methods run against.
#[derive(Clone)]
pub struct Session {
    pub user: UserName,
    /// Whether the user's directory endpoint is a remote server
    pub dir_endpoint_remote: bool,
    pub client: Arc<dyn Client>,
}

/// One API call, discriminated by its `method` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum ApiCall {
    Startup,
    List { path: PathName },
    Mkdir { path: PathName },
    Rm { paths: Vec<PathName> },
    Copy { dest: PathName, paths: Vec<PathName> },
    Put { dir: PathName, files: Vec<UploadFile> },
}

impl ApiCall {
    pub fn method(&self) -> &'static str {
        match self {
            ApiCall::Startup => "startup",
            ApiCall::List { .. } => "list",
            ApiCall::Mkdir { .. } => "mkdir",
            ApiCall::Rm { .. } => "rm",
            ApiCall::Copy { .. } => "copy",
            ApiCall::Put { .. } => "put",
        }
    }
}

/// A file uploaded with a `put` call.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadFile {
    pub name: String,
    pub content: Vec<u8>,
}

/// A directory entry together with the token that authorizes fetching it.
#[derive(Debug, Clone, Serialize)]
pub struct EntryWithToken {
    #[serde(flatten)]
    pub entry: DirEntry,
    #[serde(rename = "FileToken")]
    pub file_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartupResponse {
    pub user_name: Option<UserName>,
    pub left_path: Option<PathName>,
    pub right_path: Option<PathName>,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListResponse {
    pub entries: Vec<EntryWithToken>,
    pub error: String,
}

/// Response of the mutating methods: only an error string, empty on success.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ApiResponse {
    Startup(StartupResponse),
    List(ListResponse),
    Status(StatusResponse),
}

impl ApiResponse {
    /// Error text carried by the response, empty on success.
    pub fn error(&self) -> &str {
        match self {
            ApiResponse::Startup(r) => &r.error,
            ApiResponse::List(r) => &r.error,
            ApiResponse::Status(r) => &r.error,
        }
    }

    pub fn to_json(&self) -> Result<String, ApiError> {
        serde_json::to_string(self).map_err(|e| ApiError::BadRequest(e.to_string()))
    }
}

fn error_string<E: std::fmt::Display>(result: Result<(), E>) -> String {
    match result {
        Ok(()) => String::new(),
        Err(e) => e.to_string(),
    }
}

/// Backend state for one browser server process.
pub struct BrowserServer {
    key: String,
    key_bytes: [u8; 32],
    default_path: PathName,
    session: Mutex<Option<Session>>,
}

impl Default for BrowserServer {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserServer {
    /// Create a server with a fresh random key and no session.
    pub fn new() -> Self {
        let key_bytes = generate_key();
        Self {
            key: hex::encode(key_bytes),
            key_bytes,
            default_path: PathName::from(DEFAULT_PATH),
            session: Mutex::new(None),
        }
    }

    /// Server for a configuration whose HTTP address must be loopback-only.
    pub fn from_config(config: &UiConfig) -> Result<Self, ApiError> {
        is_local(&config.http_address)?;
        Ok(Self::new().with_default_path(PathName::from(config.default_path.as_str())))
    }

    pub fn with_default_path(mut self, path: PathName) -> Self {
        self.default_path = path;
        self
    }

    /// Key the front end must present with every API call.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn has_config(&self) -> bool {
        self.session.lock().is_some()
    }

    /// Install the session built from a completed configuration.
    pub fn install_session(
        &self,
        config: &UiConfig,
        client: Arc<dyn Client>,
    ) -> Result<(), ApiError> {
        let user = config
            .user()?
            .ok_or_else(|| ApiError::ConfigError("user_name is not set".to_string()))?;
        info!(user = %user, "Session installed");
        *self.session.lock() = Some(Session {
            user,
            dir_endpoint_remote: config.dir_endpoint_is_remote(),
            client,
        });
        Ok(())
    }

    fn session(&self) -> Option<Session> {
        self.session.lock().clone()
    }

    /// Handle one API call presented with `key`.
    pub fn handle(&self, key: &str, call: ApiCall) -> Result<ApiResponse, ApiError> {
        if key != self.key {
            warn!(method = call.method(), "Rejected API call with invalid key");
            return Err(ApiError::InvalidKey);
        }
        debug!(method = call.method(), "API call");

        let session = self.session();
        let configured = || session.as_ref().ok_or(ApiError::NoConfiguration);

        let response = match call {
            ApiCall::Startup => self.startup(session.as_ref()),
            ApiCall::List { path } => {
                let session = configured()?;
                let (entries, error) = match session.client.glob(&all_files_glob(&path)) {
                    Ok(entries) => (entries, String::new()),
                    Err(e) => (Vec::new(), e.to_string()),
                };
                let entries = entries
                    .into_iter()
                    .map(|entry| EntryWithToken {
                        file_token: self.file_token(&session.user, &entry.name),
                        entry,
                    })
                    .collect();
                ApiResponse::List(ListResponse { entries, error })
            }
            ApiCall::Mkdir { path } => {
                let client = configured()?.client.as_ref();
                ApiResponse::Status(StatusResponse {
                    error: error_string(client.make_directory(&path).map(|_| ())),
                })
            }
            ApiCall::Rm { paths } => {
                let client = configured()?.client.as_ref();
                ApiResponse::Status(StatusResponse {
                    error: error_string(TreeOp::new(client).delete(&paths)),
                })
            }
            ApiCall::Copy { dest, paths } => {
                let client = configured()?.client.as_ref();
                ApiResponse::Status(StatusResponse {
                    error: error_string(TreeOp::new(client).copy(&dest, &paths)),
                })
            }
            ApiCall::Put { dir, files } => {
                let client = configured()?.client.as_ref();
                if files.is_empty() {
                    return Err(ApiError::BadRequest("missing file".to_string()));
                }
                let result = files
                    .iter()
                    .try_for_each(|f| client.put(&dir.join(&f.name), &f.content).map(|_| ()));
                ApiResponse::Status(StatusResponse {
                    error: error_string(result),
                })
            }
        };

        if !response.error().is_empty() {
            warn!(error = response.error(), "API call failed");
        }
        Ok(response)
    }

    fn startup(&self, session: Option<&Session>) -> ApiResponse {
        let response = match session {
            Some(session) => {
                let right = self.default_path.clone();
                let left = if session.dir_endpoint_remote {
                    session.user.root()
                } else {
                    right.clone()
                };
                StartupResponse {
                    user_name: Some(session.user.clone()),
                    left_path: Some(left),
                    right_path: Some(right),
                    error: String::new(),
                }
            }
            None => StartupResponse {
                user_name: None,
                left_path: None,
                right_path: None,
                error: ApiError::NoConfiguration.to_string(),
            },
        };
        ApiResponse::Startup(response)
    }

    /// Token authorizing `user` to fetch the content of `name`.
    pub fn file_token(&self, user: &UserName, name: &PathName) -> String {
        let mut hasher = blake3::Hasher::new_keyed(&self.key_bytes);
        hasher.update(user.as_str().as_bytes());
        hasher.update(&[0]);
        hasher.update(name.as_str().as_bytes());
        hasher.finalize().to_hex().to_string()
    }

    /// Fetch the entry and content of `name`, which the token must authorize.
    pub fn serve_content(
        &self,
        token: &str,
        name: &PathName,
    ) -> Result<(DirEntry, Vec<u8>), ApiError> {
        let session = self.session().ok_or(ApiError::NoConfiguration)?;
        if token != self.file_token(&session.user, name) {
            warn!(name = %name, "Rejected content request with invalid token");
            return Err(ApiError::InvalidToken);
        }
        let entry = session.client.lookup(name, true)?;
        let data = session.client.get(name)?;
        debug!(name = %entry.name, size = data.len(), "Serving content");
        Ok((entry, data))
    }
}

/// Session key material. Version 4 UUIDs are drawn from the OS random source.
fn generate_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    key[..16].copy_from_slice(Uuid::new_v4().as_bytes());
    key[16..].copy_from_slice(Uuid::new_v4().as_bytes());
    key
}

/// Check that every address `addr` resolves to is a loopback address.
pub fn is_local(addr: &str) -> Result<(), ApiError> {
    let mut addrs = addr.to_socket_addrs()?.peekable();
    if addrs.peek().is_none() {
        return Err(ApiError::NonLoopback(addr.to_string()));
    }
    for resolved in addrs {
        if !resolved.ip().is_loopback() {
            return Err(ApiError::NonLoopback(addr.to_string()));
        }
    }
    Ok(())
}
