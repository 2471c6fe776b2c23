//! Layout advisor client.
//!
//! The advisor is an external service that proposes placements for the
//! cataloged items and recognizes items on photos. The planner only defines
//! the request and response shapes; how suggestions are produced is up to the
//! service. Suggestions are never applied here, see
//! [`Inventory::accept_suggestions`](crate::inventory::Inventory::accept_suggestions).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use crate::config::AdvisorConfig;
use crate::model::{PhotoAnalysis, Room, Suggestion, Zone};
use crate::store::Snapshot;
use crate::types::Dimensions;

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("layout advisor is not configured")]
    NotConfigured,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Item as described to the advisor: identity and size only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ItemSummary {
    pub id: String,
    pub name: String,
    pub dimensions: Dimensions,
}

/// Everything the advisor needs to plan a layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LayoutRequest {
    pub room: Room,
    pub zones: Vec<Zone>,
    pub items: Vec<ItemSummary>,
}

impl LayoutRequest {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            room: snapshot.room.clone(),
            zones: snapshot.zones.clone(),
            items: snapshot
                .items
                .iter()
                .map(|item| ItemSummary {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    dimensions: item.dimensions,
                })
                .collect(),
        }
    }
}

/// Photo handed to the advisor for recognition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRequest {
    /// Base64-encoded image data without a data-URL prefix
    pub image: String,
    #[serde(default = "PhotoRequest::default_mime_type")]
    pub mime_type: String,
}

impl PhotoRequest {
    fn default_mime_type() -> String {
        "image/jpeg".to_string()
    }

    /// Accepts raw base64 or a `data:<mime>;base64,<data>` URL.
    pub fn from_base64(input: &str) -> Self {
        match input
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
        {
            Some((mime, data)) => Self {
                image: data.to_string(),
                mime_type: mime.to_string(),
            },
            None => Self {
                image: input.to_string(),
                mime_type: Self::default_mime_type(),
            },
        }
    }
}

#[async_trait]
pub trait LayoutAdvisor: Send + Sync {
    /// Proposes placements for the given state.
    async fn suggest_layout(&self, request: &LayoutRequest) -> Result<Vec<Suggestion>, AdvisorError>;

    /// Recognizes name, category and approximate size of an item on a photo.
    async fn analyze_photo(&self, photo: &PhotoRequest) -> Result<PhotoAnalysis, AdvisorError>;
}

/// Advisor used when no service URL is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledAdvisor;

#[async_trait]
impl LayoutAdvisor for DisabledAdvisor {
    async fn suggest_layout(&self, _request: &LayoutRequest) -> Result<Vec<Suggestion>, AdvisorError> {
        Err(AdvisorError::NotConfigured)
    }

    async fn analyze_photo(&self, _photo: &PhotoRequest) -> Result<PhotoAnalysis, AdvisorError> {
        Err(AdvisorError::NotConfigured)
    }
}

fn user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    format!("storage-planner/{version} ({os}; {arch})")
}

/// Talks to an advisor service over JSON/HTTP.
///
/// - `POST {base}/layout` with a [`LayoutRequest`], answered by a list of suggestions
/// - `POST {base}/photo` with a [`PhotoRequest`], answered by a [`PhotoAnalysis`]
pub struct HttpAdvisor {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpAdvisor {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AdvisorError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent())
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value, AdvisorError> {
        let mut request = self.http.post(self.endpoint(path)).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|body| {
                    body.get("error")
                        .and_then(|e| e.get("message").or(Some(e)))
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(AdvisorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl LayoutAdvisor for HttpAdvisor {
    #[instrument(skip_all, fields(items = request.items.len(), zones = request.zones.len()))]
    async fn suggest_layout(&self, request: &LayoutRequest) -> Result<Vec<Suggestion>, AdvisorError> {
        debug!("Requesting layout suggestions");
        let body = self.post("layout", request).await?;
        let suggestions: Vec<Suggestion> = serde_json::from_value(body)?;
        debug!(count = suggestions.len(), "Received layout suggestions");
        Ok(suggestions)
    }

    #[instrument(skip_all, fields(mime = %photo.mime_type))]
    async fn analyze_photo(&self, photo: &PhotoRequest) -> Result<PhotoAnalysis, AdvisorError> {
        let body = self.post("photo", photo).await?;
        Ok(serde_json::from_value(body)?)
    }
}

/// Builds the advisor described by the configuration.
pub fn from_config(config: &AdvisorConfig) -> Result<Box<dyn LayoutAdvisor>, AdvisorError> {
    match &config.url {
        Some(url) => Ok(Box::new(HttpAdvisor::new(
            url.clone(),
            config.token.clone(),
            config.timeout,
        )?)),
        None => Ok(Box::new(DisabledAdvisor)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;
    use axum::{Json, Router, http::StatusCode, routing::post};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base: &str) -> HttpAdvisor {
        HttpAdvisor::new(format!("{}/", base), Some("secret".into()), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn layout_request_strips_item_details() {
        let request = LayoutRequest::from_snapshot(&Snapshot::seed());
        assert_eq!(request.items.len(), 3);
        assert_eq!(request.zones.len(), 2);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json["items"][0].get("position").is_none());
        assert!(json["items"][0].get("category").is_none());
        assert_eq!(json["zones"][0]["shelfHeights"], serde_json::json!([60.0, 60.0, 60.0]));
    }

    #[test]
    fn photo_request_accepts_data_urls() {
        let photo = PhotoRequest::from_base64("data:image/png;base64,iVBORw0K");
        assert_eq!(photo.mime_type, "image/png");
        assert_eq!(photo.image, "iVBORw0K");

        let raw = PhotoRequest::from_base64("/9j/4AAQ");
        assert_eq!(raw.mime_type, "image/jpeg");
        assert_eq!(raw.image, "/9j/4AAQ");
    }

    #[tokio::test]
    async fn disabled_advisor_refuses() {
        let request = LayoutRequest::from_snapshot(&Snapshot::empty());
        assert!(matches!(
            DisabledAdvisor.suggest_layout(&request).await,
            Err(AdvisorError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn http_advisor_parses_suggestions() {
        let router = Router::new().route(
            "/layout",
            post(|headers: axum::http::HeaderMap, Json(req): Json<LayoutRequest>| async move {
                assert_eq!(
                    headers.get("authorization").and_then(|v| v.to_str().ok()),
                    Some("Bearer secret")
                );
                Json(serde_json::json!([
                    {
                        "itemId": req.items[0].id,
                        "targetZoneId": "z1",
                        "suggestedPosition": {"x": -80.0, "y": 80.0, "z": -100.0},
                        "reasoning": "seasonal items go on the middle shelf"
                    },
                    {
                        "itemId": "2",
                        "suggestedPosition": {"x": 0.0, "y": 50.0, "z": 0.0},
                        "reasoning": "bike stays on the floor"
                    }
                ]))
            }),
        );
        let base = serve(router).await;

        let request = LayoutRequest::from_snapshot(&Snapshot::seed());
        let suggestions = client(&base).suggest_layout(&request).await.unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].item_id, "1");
        assert_eq!(suggestions[0].target_zone_id.as_deref(), Some("z1"));
        assert_eq!(suggestions[0].suggested_position, Position::new(-80.0, 80.0, -100.0));
        assert_eq!(suggestions[1].target_zone_id, None);
    }

    #[tokio::test]
    async fn http_advisor_reports_api_errors() {
        let router = Router::new().route(
            "/layout",
            post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(serde_json::json!({"error": {"message": "quota exceeded"}})),
                )
            }),
        );
        let base = serve(router).await;

        let err = client(&base)
            .suggest_layout(&LayoutRequest::from_snapshot(&Snapshot::empty()))
            .await
            .unwrap_err();
        match err {
            AdvisorError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn http_advisor_rejects_malformed_body() {
        let router = Router::new().route(
            "/photo",
            post(|| async { Json(serde_json::json!({"name": "Lamp"})) }),
        );
        let base = serve(router).await;

        let err = client(&base)
            .analyze_photo(&PhotoRequest::from_base64("AAAA"))
            .await
            .unwrap_err();
        assert!(matches!(err, AdvisorError::Json(_)));
    }

    #[tokio::test]
    async fn http_advisor_rejects_suggestion_without_numeric_position() {
        let router = Router::new().route(
            "/layout",
            post(|| async {
                Json(serde_json::json!([{
                    "itemId": "1",
                    "suggestedPosition": {"x": null, "y": 80.0, "z": "NaN"},
                    "reasoning": "somewhere"
                }]))
            }),
        );
        let base = serve(router).await;

        let err = client(&base)
            .suggest_layout(&LayoutRequest::from_snapshot(&Snapshot::seed()))
            .await
            .unwrap_err();
        assert!(matches!(err, AdvisorError::Json(_)));
    }

    #[tokio::test]
    async fn http_advisor_analyzes_photo() {
        let router = Router::new().route(
            "/photo",
            post(|Json(photo): Json<PhotoRequest>| async move {
                assert_eq!(photo.mime_type, "image/jpeg");
                Json(serde_json::json!({
                    "name": "Camping chair",
                    "category": "Sports",
                    "dimensions": {"width": 50.0, "height": 80.0, "depth": 10.0}
                }))
            }),
        );
        let base = serve(router).await;

        let analysis = client(&base)
            .analyze_photo(&PhotoRequest::from_base64("AAAA"))
            .await
            .unwrap();
        assert_eq!(analysis.name, "Camping chair");
        assert_eq!(analysis.dimensions, Dimensions::new(50.0, 80.0, 10.0));
    }

    #[test]
    fn config_without_url_disables_advisor() {
        let config = AdvisorConfig {
            url: None,
            token: None,
            timeout: Duration::from_secs(30),
        };
        assert!(from_config(&config).is_ok());
    }
}
