use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Form, Json, Router,
};
use base64ct::{Base64, Encoding};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
pub const DEFAULT_FEE: i64 = 799;
pub const QUOTE_TTL_MINUTES: i64 = 5;

const REQUIRED_DELIVERY_FIELDS: [&str; 7] = [
    "manifest",
    "pickup_name",
    "pickup_address",
    "pickup_phone_number",
    "dropoff_name",
    "dropoff_address",
    "dropoff_phone_number",
];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quote {
    pub kind: String,
    pub id: String,
    pub created: String,
    pub expires: String,
    pub dropoff_eta: String,
    pub duration: i64,
    pub fee: i64,
    pub currency: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Delivery {
    pub kind: String,
    pub id: String,
    pub created: String,
    pub status: String,
    pub complete: bool,
    pub manifest: String,
    pub quote_id: Option<String>,
    pub pickup_eta: Option<String>,
    pub dropoff_eta: Option<String>,
    pub dropoff_deadline: Option<String>,
    pub fee: i64,
    pub currency: String,
    pub courier: Option<Value>,
}

#[derive(Deserialize)]
pub struct QuoteForm {
    #[serde(default)]
    pub pickup_address: String,
    #[serde(default)]
    pub dropoff_address: String,
}

#[derive(Default)]
pub struct Store {
    pub quotes: HashMap<String, Quote>,
    pub deliveries: HashMap<String, Delivery>,
}

pub type Db = Arc<RwLock<Store>>;

type Failure = (StatusCode, Json<Value>);

pub fn app() -> Router {
    app_with_state(Db::default())
}

/// Router over caller-owned state, so tests can inspect or move deliveries.
pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route(
            "/{version}/customers/{customer_id}/delivery_quotes",
            post(create_quote),
        )
        .route(
            "/{version}/customers/{customer_id}/deliveries",
            get(list_deliveries).post(create_delivery),
        )
        .route(
            "/{version}/customers/{customer_id}/deliveries/{id}",
            get(get_delivery),
        )
        .route(
            "/{version}/customers/{customer_id}/deliveries/{id}/cancel",
            post(cancel_delivery),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, Db::default()).await
}

pub async fn run_with_state(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(db)).await
}

pub fn format_time(t: DateTime<Utc>) -> String {
    t.format(WIRE_FORMAT).to_string()
}

fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, WIRE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

fn failure(status: StatusCode, code: &str, message: &str) -> Failure {
    (
        status,
        Json(json!({ "kind": "error", "code": code, "message": message })),
    )
}

/// Basic auth with the API key as username and an empty password.
fn authorize(headers: &HeaderMap) -> Result<(), Failure> {
    let unauthorized = || {
        failure(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Authentication credentials were missing or invalid.",
        )
    };
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(unauthorized)?;
    let encoded = value.strip_prefix("Basic ").ok_or_else(unauthorized)?;
    let decoded = Base64::decode_vec(encoded).map_err(|_| unauthorized())?;
    let credentials = String::from_utf8(decoded).map_err(|_| unauthorized())?;
    match credentials.split_once(':') {
        Some((key, "")) if !key.is_empty() => Ok(()),
        _ => Err(unauthorized()),
    }
}

async fn create_quote(
    State(db): State<Db>,
    headers: HeaderMap,
    Form(input): Form<QuoteForm>,
) -> Result<Json<Quote>, Failure> {
    authorize(&headers)?;
    if input.pickup_address.trim().is_empty() || input.dropoff_address.trim().is_empty() {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "invalid_params",
            "The parameters of your request were invalid.",
        ));
    }

    let now = Utc::now();
    let quote = Quote {
        kind: "delivery_quote".to_string(),
        id: format!("dqt_{}", Uuid::new_v4().simple()),
        created: format_time(now),
        expires: format_time(now + Duration::minutes(QUOTE_TTL_MINUTES)),
        dropoff_eta: format_time(now + Duration::minutes(60)),
        duration: 60,
        fee: DEFAULT_FEE,
        currency: "usd".to_string(),
    };
    debug!("quoted {} for {}", quote.id, input.pickup_address);
    db.write().await.quotes.insert(quote.id.clone(), quote.clone());
    Ok(Json(quote))
}

async fn create_delivery(
    State(db): State<Db>,
    headers: HeaderMap,
    Form(input): Form<HashMap<String, String>>,
) -> Result<Json<Delivery>, Failure> {
    authorize(&headers)?;
    let missing = REQUIRED_DELIVERY_FIELDS
        .iter()
        .any(|field| input.get(*field).map_or(true, |v| v.trim().is_empty()));
    if missing {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "invalid_params",
            "The parameters of your request were invalid.",
        ));
    }

    let now = Utc::now();
    let mut store = db.write().await;
    let quote_id = input.get("quote_id").cloned();
    let fee = match &quote_id {
        Some(id) => {
            let quote = store.quotes.get(id).ok_or_else(|| {
                failure(
                    StatusCode::BAD_REQUEST,
                    "unknown_quote",
                    "The specified quote does not exist.",
                )
            })?;
            if parse_time(&quote.expires).map_or(true, |expires| expires < now) {
                return Err(failure(
                    StatusCode::BAD_REQUEST,
                    "expired_quote",
                    "The specified quote has expired.",
                ));
            }
            quote.fee
        }
        None => DEFAULT_FEE,
    };

    let delivery = Delivery {
        kind: "delivery".to_string(),
        id: format!("del_{}", Uuid::new_v4().simple()),
        created: format_time(now),
        status: "pending".to_string(),
        complete: false,
        manifest: input["manifest"].clone(),
        quote_id,
        pickup_eta: Some(format_time(now + Duration::minutes(15))),
        dropoff_eta: Some(format_time(now + Duration::minutes(60))),
        dropoff_deadline: Some(format_time(now + Duration::minutes(120))),
        fee,
        currency: "usd".to_string(),
        courier: None,
    };
    debug!("created delivery {}", delivery.id);
    store.deliveries.insert(delivery.id.clone(), delivery.clone());
    Ok(Json(delivery))
}

fn not_found() -> Failure {
    failure(
        StatusCode::NOT_FOUND,
        "not_found",
        "The requested delivery could not be found.",
    )
}

async fn get_delivery(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((_version, _customer_id, id)): Path<(String, String, String)>,
) -> Result<Json<Delivery>, Failure> {
    authorize(&headers)?;
    let store = db.read().await;
    store.deliveries.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn cancel_delivery(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((_version, _customer_id, id)): Path<(String, String, String)>,
) -> Result<Json<Delivery>, Failure> {
    authorize(&headers)?;
    let mut store = db.write().await;
    let delivery = store.deliveries.get_mut(&id).ok_or_else(not_found)?;
    if delivery.status != "pending" && delivery.status != "pickup" {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "noncancelable_delivery",
            "The delivery can no longer be canceled.",
        ));
    }
    delivery.status = "canceled".to_string();
    delivery.complete = true;
    debug!("canceled delivery {id}");
    Ok(Json(delivery.clone()))
}

async fn list_deliveries(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Value>, Failure> {
    authorize(&headers)?;
    let store = db.read().await;
    let mut data: Vec<Delivery> = store.deliveries.values().cloned().collect();
    data.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
    Ok(Json(json!({
        "object": "list",
        "total_count": data.len(),
        "next_href": null,
        "data": data,
    })))
}
