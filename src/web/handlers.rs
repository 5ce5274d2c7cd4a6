use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;

use super::AppState;
use super::error::{AppError, AppResult};
use crate::model::{Car, CarFields, CarPatch};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub results: Vec<Car>,
}

pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn create_car(
    State(state): State<AppState>,
    Json(payload): Json<CarFields>,
) -> AppResult<(StatusCode, Json<Car>)> {
    let car = state.store.create(payload).await?;
    Ok((StatusCode::CREATED, Json(car)))
}

pub async fn list_cars(State(state): State<AppState>) -> Json<ListResponse> {
    Json(ListResponse {
        results: state.store.list().await,
    })
}

pub async fn get_car(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<Car>> {
    let id = parse_id(&raw_id)?;
    Ok(Json(state.store.get(id).await?))
}

pub async fn replace_car(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(payload): Json<CarFields>,
) -> AppResult<Json<Car>> {
    let id = parse_id(&raw_id)?;
    Ok(Json(state.store.update(id, payload).await?))
}

pub async fn patch_car(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(payload): Json<CarPatch>,
) -> AppResult<StatusCode> {
    let id = parse_id(&raw_id)?;
    state.store.partial_update(id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_car(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&raw_id)?;
    state.store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(raw: &str) -> AppResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::validation(format!("invalid car id '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::parse_id;

    #[test]
    fn parse_id_accepts_signed_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("-1").unwrap(), -1);
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert!(parse_id("abc").is_err());
        assert!(parse_id("1.5").is_err());
        assert!(parse_id("").is_err());
    }
}
