//! REST API for the storage planner.
//!
//! Exposes the planner state and the snap engine over HTTP for the 3D
//! frontend. Uses Axum as the web framework and supports CORS.

use std::sync::{Arc, OnceLock};

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::advisor::{AdvisorError, ItemSummary, LayoutAdvisor, LayoutRequest, PhotoRequest};
use crate::config::ApiConfig;
use crate::geometry;
use crate::inventory::{Inventory, InventoryError, MovedItem, ShelfEdit};
use crate::model::{Item, ItemDraft, PhotoAnalysis, Room, Suggestion, Zone, ZoneDraft};
use crate::snap::{SnapOutcome, SnapResult, snap_with_config};
use crate::store::{ImportedSnapshot, Snapshot};
use crate::types::{Dimensions, Position};

/// Shared handler state.
#[derive(Clone)]
pub struct ApiState {
    inventory: Arc<Mutex<Inventory>>,
    advisor: Arc<dyn LayoutAdvisor>,
}

impl ApiState {
    pub fn new(inventory: Inventory, advisor: Arc<dyn LayoutAdvisor>) -> Self {
        Self {
            inventory: Arc::new(Mutex::new(inventory)),
            advisor,
        }
    }

    /// Applies a change to the inventory on the blocking pool.
    ///
    /// Every change is written through to the snapshot store before it
    /// returns, so it must not run on a runtime worker.
    async fn mutate<T, F>(&self, change: F) -> Result<T, Response>
    where
        F: FnOnce(&mut Inventory) -> Result<T, InventoryError> + Send + 'static,
        T: Send + 'static,
    {
        let inventory = Arc::clone(&self.inventory);
        match tokio::task::spawn_blocking(move || change(&mut inventory.blocking_lock())).await {
            Ok(result) => result.map_err(inventory_error),
            Err(err) => {
                error!("❌ Inventory task failed: {err}");
                Err(error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error",
                    err.to_string(),
                ))
            }
        }
    }
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>storage-planner API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-standalone-preset.js"
            integrity="sha384-2YH8WDRaj7V2OqU/trsmzSagmk/E2SutiCsGkdgoQwC9pNUJV1u/141DHB6jgs8t"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                const ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                    presets: [SwaggerUIBundle.presets.apis, SwaggerUIStandalonePreset],
                    layout: "StandaloneLayout",
                });
                window.ui = ui;
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Request for a snap preview.
///
/// Without `zones` the stored zones are used. Zones sent along must be
/// well formed, with whole-centimeter geometry.
#[derive(Deserialize, ToSchema)]
#[schema(
    example = json!({
        "position": {"x": 0.0, "y": 95.0, "z": 0.0},
        "dimensions": {"width": 30.0, "height": 20.0, "depth": 30.0}
    })
)]
pub struct SnapRequest {
    pub position: Position,
    pub dimensions: Dimensions,
    #[serde(default)]
    #[schema(nullable = true)]
    pub zones: Option<Vec<Zone>>,
}

/// Raw drop position at the end of a drag.
#[derive(Deserialize, ToSchema)]
pub struct MoveRequest {
    pub position: Position,
}

#[derive(Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct AcceptRequest {
    pub suggestions: Vec<Suggestion>,
}

#[derive(Serialize, ToSchema)]
pub struct AcceptResponse {
    pub applied: usize,
}

#[derive(Serialize, ToSchema)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
}

/// Photo to analyze, as raw base64 or a data URL.
#[derive(Deserialize, ToSchema)]
pub struct PhotoAnalysisRequest {
    pub image: String,
}

/// Item together with the zone its location resolves to.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocatedItem {
    #[serde(flatten)]
    pub item: Item,
    /// Name of the zone the item is stored in; absent when on the floor
    /// or when the referenced zone no longer exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn parse_json<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload.map(|Json(value)| value).map_err(json_deserialize_error)
}

fn inventory_error(err: InventoryError) -> Response {
    let (status, error) = match &err {
        InventoryError::ItemNotFound(_)
        | InventoryError::ZoneNotFound(_)
        | InventoryError::CategoryNotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
        InventoryError::DuplicateCategory(_)
        | InventoryError::EmptyCategory
        | InventoryError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "Invalid input data"),
        InventoryError::Store(_) => {
            warn!("❌ Could not persist planner state: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Could not save planner state")
        }
    };
    error_response(status, error, err.to_string())
}

fn advisor_error(err: AdvisorError) -> Response {
    warn!("⚠️ Layout advisor request failed: {err}");
    error_response(StatusCode::BAD_GATEWAY, "Layout advisor unavailable", err.to_string())
}

fn ok<T: Serialize>(value: T) -> Response {
    (StatusCode::OK, Json(value)).into_response()
}

fn created<T: Serialize>(value: T) -> Response {
    (StatusCode::CREATED, Json(value)).into_response()
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handle_snap,
        list_items,
        create_item,
        update_item,
        delete_item,
        move_item,
        list_zones,
        create_zone,
        update_zone,
        delete_zone,
        move_zone,
        edit_shelves,
        get_room,
        put_room,
        list_categories,
        add_category,
        delete_category,
        export_snapshot,
        import_snapshot,
        request_suggestions,
        accept_suggestions,
        analyze_photo
    ),
    components(
        schemas(
            SnapRequest,
            SnapResult,
            SnapOutcome,
            MoveRequest,
            MovedItem,
            ShelfEdit,
            CategoryRequest,
            AcceptRequest,
            AcceptResponse,
            SuggestionsResponse,
            PhotoAnalysisRequest,
            LocatedItem,
            ErrorResponse,
            Item,
            ItemDraft,
            Zone,
            ZoneDraft,
            Room,
            Snapshot,
            ImportedSnapshot,
            Suggestion,
            PhotoAnalysis,
            LayoutRequest,
            ItemSummary,
            Position,
            Dimensions
        )
    ),
    tags(
        (name = "placement", description = "Snap placement of dragged items and zones"),
        (name = "inventory", description = "Items, zones, room and categories"),
        (name = "advisor", description = "Layout suggestions and photo recognition")
    )
)]
struct ApiDoc;

/// Builds the application router.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/snap", post(handle_snap))
        .route("/items", get(list_items).post(create_item))
        .route("/items/{id}", delete(delete_item).put(update_item))
        .route("/items/{id}/move", post(move_item))
        .route("/zones", get(list_zones).post(create_zone))
        .route("/zones/{id}", delete(delete_zone).put(update_zone))
        .route("/zones/{id}/move", post(move_zone))
        .route("/zones/{id}/shelves", post(edit_shelves))
        .route("/room", get(get_room).put(put_room))
        .route("/categories", get(list_categories).post(add_category))
        .route("/categories/{name}", delete(delete_category))
        .route("/export", get(export_snapshot))
        .route("/import", post(import_snapshot))
        .route("/suggestions", post(request_suggestions))
        .route("/suggestions/accept", post(accept_suggestions))
        .route("/photo-analysis", post(analyze_photo))
        // API documentation
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Starts the API server and blocks until it terminates.
pub async fn start_api_server(config: ApiConfig, state: ApiState) -> std::io::Result<()> {
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("🚀 Server running on http://{}:{}", config.display_host(), config.port());
    if config.binds_to_all_interfaces() {
        info!("💡 Local access: http://localhost:{}", config.port());
    }
    info!("📑 Documentation: http://{}:{}/docs", config.display_host(), config.port());

    axum::serve(listener, router(state)).await
}

/// Handler for POST /snap.
///
/// Computes the resting position for a dropped item without storing anything.
#[utoipa::path(
    post,
    path = "/snap",
    request_body = SnapRequest,
    responses(
        (status = 200, description = "Corrected resting position", body = SnapResult),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "placement"
)]
async fn handle_snap(
    State(state): State<ApiState>,
    payload: Result<Json<SnapRequest>, JsonRejection>,
) -> Response {
    let request = match parse_json(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if let Some(zones) = &request.zones {
        if let Err(err) = zones.iter().try_for_each(geometry::check_zone) {
            return error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid input data",
                err.to_string(),
            );
        }
    }
    let inventory = state.inventory.lock().await;
    let result = match &request.zones {
        Some(zones) => snap_with_config(
            request.position,
            request.dimensions,
            zones,
            &inventory.snap_config(),
        ),
        None => inventory.preview_snap(request.position, request.dimensions),
    };
    ok(result)
}

#[utoipa::path(
    get,
    path = "/items",
    responses((status = 200, description = "All items with resolved location", body = [LocatedItem])),
    tag = "inventory"
)]
async fn list_items(State(state): State<ApiState>) -> Response {
    let inventory = state.inventory.lock().await;
    let items: Vec<LocatedItem> = inventory
        .items()
        .iter()
        .map(|item| LocatedItem {
            item: item.clone(),
            zone_name: inventory.location_of(item).map(|zone| zone.name.clone()),
        })
        .collect();
    ok(items)
}

#[utoipa::path(
    post,
    path = "/items",
    request_body = ItemDraft,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid item", body = ErrorResponse)
    ),
    tag = "inventory"
)]
async fn create_item(
    State(state): State<ApiState>,
    payload: Result<Json<ItemDraft>, JsonRejection>,
) -> Response {
    let draft = match parse_json(payload) {
        Ok(draft) => draft,
        Err(response) => return response,
    };
    match state.mutate(move |inventory| inventory.add_item(draft)).await {
        Ok(item) => created(item),
        Err(response) => response,
    }
}

#[utoipa::path(
    put,
    path = "/items/{id}",
    params(("id" = String, Path, description = "Item id")),
    request_body = ItemDraft,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = NOT_FOUND, description = "Unknown item", body = ErrorResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid item", body = ErrorResponse)
    ),
    tag = "inventory"
)]
async fn update_item(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    payload: Result<Json<ItemDraft>, JsonRejection>,
) -> Response {
    let draft = match parse_json(payload) {
        Ok(draft) => draft,
        Err(response) => return response,
    };
    match state.mutate(move |inventory| inventory.update_item(&id, draft)).await {
        Ok(item) => ok(item),
        Err(response) => response,
    }
}

#[utoipa::path(
    delete,
    path = "/items/{id}",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "Deleted item", body = Item),
        (status = NOT_FOUND, description = "Unknown item", body = ErrorResponse)
    ),
    tag = "inventory"
)]
async fn delete_item(State(state): State<ApiState>, Path(id): Path<String>) -> Response {
    match state.mutate(move |inventory| inventory.delete_item(&id)).await {
        Ok(item) => ok(item),
        Err(response) => response,
    }
}

/// Handler for POST /items/{id}/move.
///
/// Drag end for an item: snaps the drop position and stores the result.
#[utoipa::path(
    post,
    path = "/items/{id}/move",
    params(("id" = String, Path, description = "Item id")),
    request_body = MoveRequest,
    responses(
        (status = 200, description = "Item placed", body = MovedItem),
        (status = NOT_FOUND, description = "Unknown item", body = ErrorResponse)
    ),
    tag = "placement"
)]
async fn move_item(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> Response {
    let request = match parse_json(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match state
        .mutate(move |inventory| inventory.move_item(&id, request.position))
        .await
    {
        Ok(moved) => ok(moved),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/zones",
    responses((status = 200, description = "All zones in list order", body = [Zone])),
    tag = "inventory"
)]
async fn list_zones(State(state): State<ApiState>) -> Response {
    ok(state.inventory.lock().await.zones())
}

#[utoipa::path(
    post,
    path = "/zones",
    request_body = ZoneDraft,
    responses(
        (status = 201, description = "Zone created", body = Zone),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid zone", body = ErrorResponse)
    ),
    tag = "inventory"
)]
async fn create_zone(
    State(state): State<ApiState>,
    payload: Result<Json<ZoneDraft>, JsonRejection>,
) -> Response {
    let draft = match parse_json(payload) {
        Ok(draft) => draft,
        Err(response) => return response,
    };
    match state.mutate(move |inventory| inventory.add_zone(draft)).await {
        Ok(zone) => created(zone),
        Err(response) => response,
    }
}

#[utoipa::path(
    put,
    path = "/zones/{id}",
    params(("id" = String, Path, description = "Zone id")),
    request_body = ZoneDraft,
    responses(
        (status = 200, description = "Zone updated", body = Zone),
        (status = NOT_FOUND, description = "Unknown zone", body = ErrorResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid zone", body = ErrorResponse)
    ),
    tag = "inventory"
)]
async fn update_zone(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    payload: Result<Json<ZoneDraft>, JsonRejection>,
) -> Response {
    let draft = match parse_json(payload) {
        Ok(draft) => draft,
        Err(response) => return response,
    };
    match state.mutate(move |inventory| inventory.update_zone(&id, draft)).await {
        Ok(zone) => ok(zone),
        Err(response) => response,
    }
}

/// Handler for DELETE /zones/{id}.
///
/// Items stored in the zone are kept and resolve to the floor afterwards.
#[utoipa::path(
    delete,
    path = "/zones/{id}",
    params(("id" = String, Path, description = "Zone id")),
    responses(
        (status = 200, description = "Deleted zone", body = Zone),
        (status = NOT_FOUND, description = "Unknown zone", body = ErrorResponse)
    ),
    tag = "inventory"
)]
async fn delete_zone(State(state): State<ApiState>, Path(id): Path<String>) -> Response {
    match state.mutate(move |inventory| inventory.delete_zone(&id)).await {
        Ok(zone) => ok(zone),
        Err(response) => response,
    }
}

#[utoipa::path(
    post,
    path = "/zones/{id}/move",
    params(("id" = String, Path, description = "Zone id")),
    request_body = MoveRequest,
    responses(
        (status = 200, description = "Zone placed on the floor", body = Zone),
        (status = NOT_FOUND, description = "Unknown zone", body = ErrorResponse)
    ),
    tag = "placement"
)]
async fn move_zone(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> Response {
    let request = match parse_json(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match state
        .mutate(move |inventory| inventory.move_zone(&id, request.position))
        .await
    {
        Ok(zone) => ok(zone),
        Err(response) => response,
    }
}

#[utoipa::path(
    post,
    path = "/zones/{id}/shelves",
    params(("id" = String, Path, description = "Zone id")),
    request_body = ShelfEdit,
    responses(
        (status = 200, description = "Zone with the edited shelf stack", body = Zone),
        (status = NOT_FOUND, description = "Unknown zone", body = ErrorResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid shelf edit", body = ErrorResponse)
    ),
    tag = "inventory"
)]
async fn edit_shelves(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    payload: Result<Json<ShelfEdit>, JsonRejection>,
) -> Response {
    let edit = match parse_json(payload) {
        Ok(edit) => edit,
        Err(response) => return response,
    };
    match state.mutate(move |inventory| inventory.edit_shelves(&id, edit)).await {
        Ok(zone) => ok(zone),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/room",
    responses((status = 200, description = "Room", body = Room)),
    tag = "inventory"
)]
async fn get_room(State(state): State<ApiState>) -> Response {
    ok(state.inventory.lock().await.room())
}

#[utoipa::path(
    put,
    path = "/room",
    request_body = Room,
    responses(
        (status = 200, description = "Room updated", body = Room),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid room", body = ErrorResponse)
    ),
    tag = "inventory"
)]
async fn put_room(
    State(state): State<ApiState>,
    payload: Result<Json<Room>, JsonRejection>,
) -> Response {
    let room = match parse_json(payload) {
        Ok(room) => room,
        Err(response) => return response,
    };
    match state.mutate(move |inventory| inventory.set_room(room)).await {
        Ok(room) => ok(room),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "Category names", body = [String])),
    tag = "inventory"
)]
async fn list_categories(State(state): State<ApiState>) -> Response {
    ok(state.inventory.lock().await.categories())
}

#[utoipa::path(
    post,
    path = "/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category list after adding", body = [String]),
        (status = UNPROCESSABLE_ENTITY, description = "Empty or duplicate name", body = ErrorResponse)
    ),
    tag = "inventory"
)]
async fn add_category(
    State(state): State<ApiState>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Response {
    let request = match parse_json(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let added = state.mutate(move |inventory| {
        inventory.add_category(&request.name)?;
        Ok(inventory.categories().to_vec())
    });
    match added.await {
        Ok(categories) => created(categories),
        Err(response) => response,
    }
}

#[utoipa::path(
    delete,
    path = "/categories/{name}",
    params(("name" = String, Path, description = "Category name")),
    responses(
        (status = 200, description = "Category list after removal", body = [String]),
        (status = NOT_FOUND, description = "Unknown category", body = ErrorResponse)
    ),
    tag = "inventory"
)]
async fn delete_category(State(state): State<ApiState>, Path(name): Path<String>) -> Response {
    let removed = state.mutate(move |inventory| {
        inventory.remove_category(&name)?;
        Ok(inventory.categories().to_vec())
    });
    match removed.await {
        Ok(categories) => ok(categories),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/export",
    responses((status = 200, description = "Complete planner state", body = Snapshot)),
    tag = "inventory"
)]
async fn export_snapshot(State(state): State<ApiState>) -> Response {
    ok(state.inventory.lock().await.snapshot())
}

/// Handler for POST /import.
///
/// Replaces the whole state. `room` and `categories` default when absent;
/// a snapshot with an invalid zone is rejected without touching the state.
#[utoipa::path(
    post,
    path = "/import",
    request_body = ImportedSnapshot,
    responses(
        (status = 200, description = "Imported state", body = Snapshot),
        (status = UNPROCESSABLE_ENTITY, description = "Malformed snapshot", body = ErrorResponse)
    ),
    tag = "inventory"
)]
async fn import_snapshot(
    State(state): State<ApiState>,
    payload: Result<Json<ImportedSnapshot>, JsonRejection>,
) -> Response {
    let imported = match parse_json(payload) {
        Ok(imported) => imported,
        Err(response) => return response,
    };
    let snapshot = match imported.into_snapshot() {
        Ok(snapshot) => snapshot,
        Err(err) => {
            return error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid snapshot",
                err.to_string(),
            );
        }
    };
    let imported = state.mutate(move |inventory| {
        inventory.import(snapshot)?;
        Ok(inventory.snapshot().clone())
    });
    match imported.await {
        Ok(snapshot) => ok(snapshot),
        Err(response) => response,
    }
}

/// Handler for POST /suggestions.
///
/// Asks the advisor for placements. Nothing is applied; accepted suggestions
/// go through POST /suggestions/accept.
#[utoipa::path(
    post,
    path = "/suggestions",
    responses(
        (status = 200, description = "Proposed placements", body = SuggestionsResponse),
        (status = BAD_GATEWAY, description = "Advisor failed or is not configured", body = ErrorResponse)
    ),
    tag = "advisor"
)]
async fn request_suggestions(State(state): State<ApiState>) -> Response {
    let request = LayoutRequest::from_snapshot(state.inventory.lock().await.snapshot());
    match state.advisor.suggest_layout(&request).await {
        Ok(suggestions) => {
            info!("💡 Advisor proposed {} placements", suggestions.len());
            ok(SuggestionsResponse { suggestions })
        }
        Err(err) => advisor_error(err),
    }
}

#[utoipa::path(
    post,
    path = "/suggestions/accept",
    request_body = AcceptRequest,
    responses(
        (status = 200, description = "Number of updated items", body = AcceptResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "advisor"
)]
async fn accept_suggestions(
    State(state): State<ApiState>,
    payload: Result<Json<AcceptRequest>, JsonRejection>,
) -> Response {
    let request = match parse_json(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match state
        .mutate(move |inventory| inventory.accept_suggestions(&request.suggestions))
        .await
    {
        Ok(applied) => ok(AcceptResponse { applied }),
        Err(response) => response,
    }
}

#[utoipa::path(
    post,
    path = "/photo-analysis",
    request_body = PhotoAnalysisRequest,
    responses(
        (status = 200, description = "Recognized item", body = PhotoAnalysis),
        (status = BAD_GATEWAY, description = "Advisor failed or is not configured", body = ErrorResponse)
    ),
    tag = "advisor"
)]
async fn analyze_photo(
    State(state): State<ApiState>,
    payload: Result<Json<PhotoAnalysisRequest>, JsonRejection>,
) -> Response {
    let request = match parse_json(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match state
        .advisor
        .analyze_photo(&PhotoRequest::from_base64(&request.image))
        .await
    {
        Ok(analysis) => ok(analysis),
        Err(err) => advisor_error(err),
    }
}

async fn serve_openapi_json() -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}
