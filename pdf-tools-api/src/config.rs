//! Server configuration, read once at startup from flags and environment

use anyhow::{Context, Result};
use axum::http::{HeaderName, HeaderValue, Method};
use clap::{ArgAction, Args, Parser};
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

/// Largest accepted request body unless configured otherwise (64 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

const WILDCARD: &str = "*";

#[derive(Debug, Clone, Parser)]
#[command(
    name = "pdf-tools-api",
    version,
    about = "HTTP API for merging, splitting, rotating and converting PDFs"
)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "PDF_TOOLS_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// Directory for per-request temporary files [default: OS temp dir]
    #[arg(long, env = "PDF_TOOLS_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Maximum request body size in bytes
    #[arg(long, env = "PDF_TOOLS_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    #[command(flatten)]
    pub cors: CorsConfig,

    /// Directory holding the OCR detection and recognition models
    #[cfg(feature = "ocr")]
    #[arg(long, env = "PDF_TOOLS_OCR_MODELS")]
    pub ocr_models: Option<PathBuf>,
}

impl ServerConfig {
    /// Where request workspaces are created
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Cross-origin policy. `*` in any list means "anything".
#[derive(Debug, Clone, Args)]
pub struct CorsConfig {
    /// Allowed origins, comma separated
    #[arg(
        long = "cors-allow-origins",
        env = "PDF_TOOLS_CORS_ALLOW_ORIGINS",
        value_delimiter = ',',
        default_value = WILDCARD
    )]
    pub allow_origins: Vec<String>,

    /// Allowed methods, comma separated
    #[arg(
        long = "cors-allow-methods",
        env = "PDF_TOOLS_CORS_ALLOW_METHODS",
        value_delimiter = ',',
        default_value = WILDCARD
    )]
    pub allow_methods: Vec<String>,

    /// Allowed request headers, comma separated
    #[arg(
        long = "cors-allow-headers",
        env = "PDF_TOOLS_CORS_ALLOW_HEADERS",
        value_delimiter = ',',
        default_value = WILDCARD
    )]
    pub allow_headers: Vec<String>,

    /// Allow credentials. Only honoured when origins are listed explicitly.
    #[arg(
        long = "cors-allow-credentials",
        env = "PDF_TOOLS_CORS_ALLOW_CREDENTIALS",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: vec![WILDCARD.to_string()],
            allow_methods: vec![WILDCARD.to_string()],
            allow_headers: vec![WILDCARD.to_string()],
            allow_credentials: true,
        }
    }
}

impl CorsConfig {
    /// Whether credentialed requests will actually be allowed
    pub fn credentials_enabled(&self) -> bool {
        self.allow_credentials && !is_wildcard(&self.allow_origins)
    }

    pub fn layer(&self) -> Result<CorsLayer> {
        let credentials = self.credentials_enabled();

        let origins = if is_wildcard(&self.allow_origins) {
            AllowOrigin::from(Any)
        } else {
            let origins = self
                .allow_origins
                .iter()
                .map(|origin| {
                    HeaderValue::from_str(origin.trim())
                        .with_context(|| format!("invalid CORS origin {origin:?}"))
                })
                .collect::<Result<Vec<_>>>()?;
            AllowOrigin::list(origins)
        };

        // A literal `*` cannot be combined with credentials, so mirror the
        // request instead.
        let methods = match (is_wildcard(&self.allow_methods), credentials) {
            (true, true) => AllowMethods::mirror_request(),
            (true, false) => AllowMethods::from(Any),
            (false, _) => {
                let methods = self
                    .allow_methods
                    .iter()
                    .map(|method| {
                        Method::from_bytes(method.trim().as_bytes())
                            .with_context(|| format!("invalid CORS method {method:?}"))
                    })
                    .collect::<Result<Vec<_>>>()?;
                AllowMethods::list(methods)
            }
        };

        let headers = match (is_wildcard(&self.allow_headers), credentials) {
            (true, true) => AllowHeaders::mirror_request(),
            (true, false) => AllowHeaders::from(Any),
            (false, _) => {
                let headers = self
                    .allow_headers
                    .iter()
                    .map(|header| {
                        HeaderName::from_bytes(header.trim().as_bytes())
                            .with_context(|| format!("invalid CORS header {header:?}"))
                    })
                    .collect::<Result<Vec<_>>>()?;
                AllowHeaders::list(headers)
            }
        };

        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(credentials))
    }
}

fn is_wildcard(values: &[String]) -> bool {
    values.is_empty() || values.iter().any(|value| value.trim() == WILDCARD)
}
