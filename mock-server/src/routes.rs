use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::Failure;
use crate::model::{
    BusinessInfo, Category, CategoryInput, Event, EventInput, Item, ItemInput, LoginInput,
    RefreshInput,
};
use crate::Db;

// --- auth ---

pub async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginInput>,
) -> Result<Json<Value>, Failure> {
    let (access, refresh) = db
        .write()
        .await
        .login(&input.email, &input.password)
        .inspect_err(|_| warn!(email = %input.email, "login rejected"))?;
    info!(email = %input.email, "admin logged in");
    Ok(Json(json!({
        "access_token": access,
        "refresh_token": refresh,
        "user": { "id": "admin", "email": input.email, "role": "ADMIN" },
    })))
}

pub async fn refresh(
    State(db): State<Db>,
    Json(input): Json<RefreshInput>,
) -> Result<Json<Value>, Failure> {
    let (access, refresh) = db
        .write()
        .await
        .refresh(&input.refresh_token)
        .inspect_err(|_| warn!("refresh rejected"))?;
    info!("access token refreshed");
    Ok(Json(json!({ "access_token": access, "refresh_token": refresh })))
}

pub async fn csrf_token(State(db): State<Db>) -> Json<Value> {
    let token = db.write().await.issue_csrf();
    Json(json!({ "csrfToken": token }))
}

// --- test hooks ---

pub async fn expire_tokens(State(db): State<Db>) -> StatusCode {
    db.write().await.expire_access_tokens();
    info!("access tokens expired");
    StatusCode::NO_CONTENT
}

pub async fn expire_csrf(State(db): State<Db>) -> StatusCode {
    db.write().await.expire_csrf_tokens();
    info!("csrf tokens expired");
    StatusCode::NO_CONTENT
}

pub async fn stats(State(db): State<Db>) -> Json<Value> {
    Json(json!({ "refreshes": db.read().await.refresh_count() }))
}

// --- items ---

pub async fn list_items(State(db): State<Db>) -> Json<Vec<Item>> {
    Json(db.read().await.list_items())
}

pub async fn pizza_moment(State(db): State<Db>) -> Json<Vec<Item>> {
    Json(db.read().await.pizza_moment())
}

pub async fn get_item(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Item>, Failure> {
    db.read().await.get_item(&id).map(Json)
}

pub async fn create_item(
    State(db): State<Db>,
    Json(input): Json<ItemInput>,
) -> Result<(StatusCode, Json<Item>), Failure> {
    let item = db.write().await.create_item(input)?;
    info!(id = %item.id, "item created");
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_item(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<ItemInput>,
) -> Result<Json<Item>, Failure> {
    db.write().await.update_item(&id, input).map(Json)
}

pub async fn delete_item(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<StatusCode, Failure> {
    db.write().await.delete_item(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// --- categories ---

pub async fn list_categories(State(db): State<Db>) -> Json<Vec<Category>> {
    Json(db.read().await.list_categories())
}

pub async fn get_category(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Category>, Failure> {
    db.read().await.get_category(&id).map(Json)
}

pub async fn create_category(
    State(db): State<Db>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), Failure> {
    let category = db.write().await.create_category(input)?;
    info!(id = %category.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>, Failure> {
    db.write().await.update_category(&id, input).map(Json)
}

pub async fn delete_category(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<StatusCode, Failure> {
    db.write().await.delete_category(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// --- events ---

pub async fn list_events(State(db): State<Db>) -> Json<Vec<Event>> {
    Json(db.read().await.events.clone())
}

pub async fn promo_events(State(db): State<Db>) -> Json<Vec<Event>> {
    Json(db.read().await.promo_events())
}

pub async fn header_events(State(db): State<Db>) -> Json<Value> {
    let lines = db.read().await.header_announcements();
    Json(Value::Array(
        lines
            .into_iter()
            .map(|description| json!({ "description": description }))
            .collect(),
    ))
}

pub async fn get_event(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Event>, Failure> {
    db.read().await.get_event(&id).map(Json)
}

pub async fn create_event(
    State(db): State<Db>,
    Json(input): Json<EventInput>,
) -> Result<(StatusCode, Json<Event>), Failure> {
    let event = db.write().await.create_event(input)?;
    info!(id = %event.id, "event created");
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<EventInput>,
) -> Result<Json<Event>, Failure> {
    db.write().await.update_event(&id, input).map(Json)
}

pub async fn delete_event(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<StatusCode, Failure> {
    db.write().await.delete_event(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// --- business ---

pub async fn business_info(State(db): State<Db>) -> Json<Vec<BusinessInfo>> {
    Json(db.read().await.business.clone())
}
