use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::{error, instrument};

use super::dto::{ConvertQuery, ConvertResponse};
use crate::{error::json_error, state::AppState};

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("{0}")]
    BadInput(String),
    #[error("upstream geocoder failed: {0}")]
    Upstream(#[source] anyhow::Error),
}

impl IntoResponse for ConvertError {
    fn into_response(self) -> Response {
        match self {
            ConvertError::BadInput(msg) => json_error(StatusCode::BAD_REQUEST, msg),
            ConvertError::Upstream(e) => {
                error!(error = %e, "reverse geocoding error");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to geocode coordinates")
            }
        }
    }
}

pub fn geo_routes() -> Router<AppState> {
    Router::new().route("/api/v1/convert", get(convert))
}

/// GET /api/v1/convert?lat=..&lng=..
#[instrument(skip(state, query))]
pub async fn convert(
    State(state): State<AppState>,
    query: Result<Query<ConvertQuery>, QueryRejection>,
) -> Result<Json<ConvertResponse>, ConvertError> {
    let (lat_raw, lng_raw) = match query {
        Ok(Query(ConvertQuery {
            lat: Some(lat),
            lng: Some(lng),
        })) if !lat.is_empty() && !lng.is_empty() => (lat, lng),
        _ => {
            return Err(ConvertError::BadInput(
                "Missing required parameters: lat and lng".into(),
            ))
        }
    };

    let lat = parse_coordinate(&lat_raw, "latitude", 90.0)?;
    let lng = parse_coordinate(&lng_raw, "longitude", 180.0)?;

    let geo = state
        .geocoder
        .reverse(lat, lng)
        .await
        .map_err(ConvertError::Upstream)?;

    Ok(Json(ConvertResponse::new(lat_raw, lng_raw, geo)))
}

fn parse_coordinate(raw: &str, name: &str, limit: f64) -> Result<f64, ConvertError> {
    let value = raw
        .parse::<f64>()
        .map_err(|_| ConvertError::BadInput(format!("Invalid {name}: {raw}")))?;
    if !(-limit..=limit).contains(&value) {
        let mut label = name.to_owned();
        label[..1].make_ascii_uppercase();
        return Err(ConvertError::BadInput(format!(
            "{label} must be between -{limit} and {limit}"
        )));
    }
    Ok(value)
}
