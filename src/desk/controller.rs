use std::sync::Arc;
use std::time::{Duration, Instant};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use lambda_http::{run, Body, Error};
use serde_json::Value;
use crate::core::command::Command;
use crate::core::controller::{AppState, json_to_server_error, ServerError};
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::desk::command::add_info_cmd::{AddInfoCommand, AddInfoCommandRequest};
use crate::desk::command::close_session_cmd::{CloseSessionCommand, CloseSessionCommandRequest};
use crate::desk::command::end_session_cmd::{EndSessionCommand, EndSessionCommandRequest};
use crate::desk::command::get_session_cmd::{GetSessionCommand, GetSessionCommandRequest};
use crate::desk::command::open_session_cmd::{OpenSessionCommand, OpenSessionCommandRequest};
use crate::desk::command::refresh_settings_cmd::{RefreshSettingsCommand, RefreshSettingsCommandRequest};
use crate::desk::command::resolve_modal_cmd::{ResolveModalCommand, ResolveModalCommandRequest};
use crate::desk::command::resolve_patron_cmd::{ResolvePatronCommand, ResolvePatronCommandRequest};
use crate::desk::command::scan_item_cmd::{ScanItemCommand, ScanItemCommandRequest};
use crate::desk::command::select_item_cmd::{SelectItemCommand, SelectItemCommandRequest};
use crate::desk::command::select_patron_cmd::{SelectPatronCommand, SelectPatronCommandRequest};
use crate::desk::command::submit_override_cmd::{SubmitOverrideCommand, SubmitOverrideCommandRequest};
use crate::desk::domain::DeskOutcome;
use crate::items::dto::{CirculationNote, ItemDto};
use crate::patrons::dto::{ManualBlockDto, PatronDto, ProxyForDto};
use crate::utils::memory::MemoryCirculation;

pub(crate) async fn open_session(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<DeskOutcome>, ServerError> {
    let req: OpenSessionCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let res = OpenSessionCommand::new(state.config, state.store, state.desks).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn get_session(
    State(state): State<AppState>,
    Path(desk_id): Path<String>) -> Result<Json<DeskOutcome>, ServerError> {
    let req = GetSessionCommandRequest { desk_id };
    let res = GetSessionCommand::new(state.desks).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn resolve_patron(
    State(state): State<AppState>,
    Path(desk_id): Path<String>,
    json: Json<Value>) -> Result<Json<DeskOutcome>, ServerError> {
    let mut req: ResolvePatronCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    req.desk_id = desk_id;
    let res = ResolvePatronCommand::new(state.desks).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn select_patron(
    State(state): State<AppState>,
    Path(desk_id): Path<String>,
    json: Json<Value>) -> Result<Json<DeskOutcome>, ServerError> {
    let mut req: SelectPatronCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    req.desk_id = desk_id;
    let res = SelectPatronCommand::new(state.desks).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn scan_item(
    State(state): State<AppState>,
    Path(desk_id): Path<String>,
    json: Json<Value>) -> Result<Json<DeskOutcome>, ServerError> {
    let mut req: ScanItemCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    req.desk_id = desk_id;
    let res = ScanItemCommand::new(state.desks).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn select_item(
    State(state): State<AppState>,
    Path(desk_id): Path<String>,
    json: Json<Value>) -> Result<Json<DeskOutcome>, ServerError> {
    let mut req: SelectItemCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    req.desk_id = desk_id;
    let res = SelectItemCommand::new(state.desks).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn resolve_modal(
    State(state): State<AppState>,
    Path(desk_id): Path<String>,
    json: Json<Value>) -> Result<Json<DeskOutcome>, ServerError> {
    let mut req: ResolveModalCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    req.desk_id = desk_id;
    let res = ResolveModalCommand::new(state.desks).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn submit_override(
    State(state): State<AppState>,
    Path(desk_id): Path<String>,
    json: Json<Value>) -> Result<Json<DeskOutcome>, ServerError> {
    let mut req: SubmitOverrideCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    req.desk_id = desk_id;
    let res = SubmitOverrideCommand::new(state.desks).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn add_info(
    State(state): State<AppState>,
    Path(desk_id): Path<String>,
    json: Json<Value>) -> Result<Json<DeskOutcome>, ServerError> {
    let mut req: AddInfoCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    req.desk_id = desk_id;
    let res = AddInfoCommand::new(state.desks).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn refresh_settings(
    State(state): State<AppState>,
    Path(desk_id): Path<String>) -> Result<Json<DeskOutcome>, ServerError> {
    let req = RefreshSettingsCommandRequest { desk_id };
    let res = RefreshSettingsCommand::new(state.desks).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn end_session(
    State(state): State<AppState>,
    Path(desk_id): Path<String>) -> Result<Json<DeskOutcome>, ServerError> {
    let req = EndSessionCommandRequest { desk_id };
    let res = EndSessionCommand::new(state.desks).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn close_session(
    State(state): State<AppState>,
    Path(desk_id): Path<String>) -> Result<Json<DeskOutcome>, ServerError> {
    let req = CloseSessionCommandRequest { desk_id };
    let res = CloseSessionCommand::new(state.desks).execute(req).await?;
    Ok(Json(res))
}

pub(crate) fn router(state: AppState) -> Router<(), Body> {
    Router::new()
        .route("/desk", post(open_session))
        .route("/desk/:id", get(get_session).delete(close_session))
        .route("/desk/:id/patron", post(resolve_patron))
        .route("/desk/:id/patron/select", post(select_patron))
        .route("/desk/:id/item", post(scan_item))
        .route("/desk/:id/item/select", post(select_item))
        .route("/desk/:id/modal", post(resolve_modal))
        .route("/desk/:id/override", post(submit_override))
        .route("/desk/:id/add-info", post(add_info))
        .route("/desk/:id/settings/refresh", post(refresh_settings))
        .route("/desk/:id/end", post(end_session))
        .with_state(state)
}

fn config_from_env() -> Configuration {
    let env = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.to_string());
    Configuration::new(env("CHECKOUT_SERVICE_POINT", "").as_str())
        .with_okapi(env("CHECKOUT_OKAPI_URL", "http://localhost:9130").as_str(),
                    env("CHECKOUT_TENANT", "diku").as_str(),
                    std::env::var("CHECKOUT_TOKEN").ok())
}

// a handful of patrons and items to click through in development
fn demo_backend() -> Arc<MemoryCirculation> {
    let backend = Arc::new(MemoryCirculation::new());
    let alice = PatronDto::new("1001").with_name("Alice", "Reader").with_username("alice");
    let bob = PatronDto::new("1002").with_name("Bob", "Proxy").with_username("bob");
    let carol = PatronDto::new("1003").with_name("Carol", "Blocked").with_username("carol");
    backend.add_proxy(ProxyForDto::new(alice.id.as_str(), bob.id.as_str()));
    backend.add_manual_block(ManualBlockDto::borrowing(carol.id.as_str(), "Overdue fines"));
    backend.set_awaiting_pickup(alice.id.as_str(), 1);
    backend.add_user(alice);
    backend.add_user(bob);
    backend.add_user(carol);
    backend.add_item(ItemDto::new("2001", "The Rust Programming Language"));
    backend.add_item(ItemDto::new("2002", "Atlas of Remote Islands").with_pieces("2"));
    backend.add_item(ItemDto::new("2003", "Audio course").with_note(CirculationNote::checkout("Check that all 6 CDs are in the case")));
    backend
}

pub async fn serve(dev_mode: bool) -> Result<(), Error> {
    let state = if dev_mode {
        std::env::set_var("AWS_LAMBDA_FUNCTION_NAME", "_");
        std::env::set_var("AWS_LAMBDA_FUNCTION_MEMORY_SIZE", "4096");
        std::env::set_var("AWS_LAMBDA_FUNCTION_VERSION", "1");
        std::env::set_var("AWS_LAMBDA_RUNTIME_API", "http://[::]:9000/.rt");
        AppState::new(Configuration::new("dev"), RepositoryStore::InMemory(demo_backend()))
    } else {
        AppState::new(config_from_env(), RepositoryStore::Okapi)
    };

    let desks = state.desks.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        loop {
            interval.tick().await;
            desks.tick_all(Instant::now()).await;
        }
    });

    run(router(state)).await
}
