//! HTTP/JSON mirror of the gRPC surface. Same translations, same use-case,
//! a different wire format — per the component design's "both thin
//! translations" framing, neither surface holds state of its own.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use oms::domain::{Order, Packaging};
use oms::store::order_store::{GetOrdersOptions, GetReturnsOptions};
use oms::usecase::OrderUseCase;
use pvz_common::error::PvzErrorKind;
use pvz_common::{OrderId, PvzError, RecipientId};
use serde::{Deserialize, Serialize};

/// Build the axum router for the HTTP/JSON gateway mirror.
pub fn router(use_case: Arc<OrderUseCase>) -> Router {
    Router::new()
        .route("/v1/orders/accept", post(accept_order_delivery))
        .route("/v1/orders/return-to-courier", post(return_order_delivery))
        .route("/v1/orders/issue", post(give_order_to_client))
        .route("/v1/returns/accept", post(accept_return))
        .route("/v1/orders", get(get_orders))
        .route("/v1/returns", get(get_returns))
        .with_state(use_case)
}

/// Shared error envelope. Never leaks a raw storage error or stack trace,
/// per the error-handling design's user-visible-failure-behavior rule.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

struct ApiError(PvzError);

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.0.kind() {
            PvzErrorKind::NotFound => StatusCode::NOT_FOUND,
            PvzErrorKind::AlreadyExists => StatusCode::CONFLICT,
            PvzErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
            PvzErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}

impl From<PvzError> for ApiError {
    fn from(err: PvzError) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct OrderView {
    order_id: String,
    pvz_id: String,
    recipient_id: String,
    cost: i64,
    weight: i64,
    packaging: String,
    additional_film: bool,
    received_at: chrono::DateTime<Utc>,
    storage_time_secs: i64,
    issued_at: Option<chrono::DateTime<Utc>>,
    returned_at: Option<chrono::DateTime<Utc>>,
    deleted_at: Option<chrono::DateTime<Utc>>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id.to_string(),
            pvz_id: order.pvz_id.to_string(),
            recipient_id: order.recipient_id.to_string(),
            cost: order.cost,
            weight: order.weight,
            packaging: order.packaging.to_string(),
            additional_film: order.additional_film,
            received_at: order.received_at,
            storage_time_secs: order.storage_time.num_seconds(),
            issued_at: order.issued_at,
            returned_at: order.returned_at,
            deleted_at: order.deleted_at,
        }
    }
}

#[derive(Deserialize)]
struct AcceptOrderDeliveryBody {
    order_id: String,
    recipient_id: String,
    storage_time_secs: i64,
    cost: i64,
    weight: i64,
    packaging: String,
    #[serde(default)]
    additional_film: bool,
}

async fn accept_order_delivery(
    State(use_case): State<Arc<OrderUseCase>>,
    Json(body): Json<AcceptOrderDeliveryBody>,
) -> Result<Json<OrderView>, ApiError> {
    let packaging: Packaging = body.packaging.parse()?;
    let order = use_case
        .accept_order_delivery(
            OrderId::from(body.order_id),
            RecipientId::from(body.recipient_id),
            chrono::Duration::seconds(body.storage_time_secs),
            body.cost,
            body.weight,
            packaging,
            body.additional_film,
        )
        .await?;
    Ok(Json(OrderView::from(&order)))
}

#[derive(Deserialize)]
struct OrderIdBody {
    order_id: String,
}

async fn return_order_delivery(
    State(use_case): State<Arc<OrderUseCase>>,
    Json(body): Json<OrderIdBody>,
) -> Result<StatusCode, ApiError> {
    use_case
        .return_order_delivery(OrderId::from(body.order_id), Utc::now())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct GiveOrderToClientBody {
    order_ids: Vec<String>,
}

async fn give_order_to_client(
    State(use_case): State<Arc<OrderUseCase>>,
    Json(body): Json<GiveOrderToClientBody>,
) -> Result<StatusCode, ApiError> {
    let order_ids = body.order_ids.into_iter().map(OrderId::from).collect();
    use_case.give_order_to_client(order_ids, Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct AcceptReturnBody {
    recipient_id: String,
    order_id: String,
}

async fn accept_return(
    State(use_case): State<Arc<OrderUseCase>>,
    Json(body): Json<AcceptReturnBody>,
) -> Result<StatusCode, ApiError> {
    use_case
        .accept_return(
            RecipientId::from(body.recipient_id),
            OrderId::from(body.order_id),
            Utc::now(),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct GetOrdersQuery {
    recipient_id: String,
    #[serde(default)]
    same_pvz: bool,
    last_n: Option<u32>,
    cursor: Option<String>,
    limit: Option<u32>,
}

async fn get_orders(
    State(use_case): State<Arc<OrderUseCase>>,
    Query(query): Query<GetOrdersQuery>,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    let opts = GetOrdersOptions {
        pvz_id: None,
        last_n: query.last_n,
        cursor: query.cursor.map(OrderId::from),
        limit: query.limit,
    };
    let orders = use_case
        .get_orders(RecipientId::from(query.recipient_id), opts, query.same_pvz)
        .await?;
    Ok(Json(orders.iter().map(OrderView::from).collect()))
}

#[derive(Deserialize)]
struct GetReturnsQuery {
    #[serde(default)]
    page: u32,
    #[serde(default = "default_page_size")]
    page_size: u32,
}

const fn default_page_size() -> u32 {
    20
}

async fn get_returns(
    State(use_case): State<Arc<OrderUseCase>>,
    Query(query): Query<GetReturnsQuery>,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    let opts = GetReturnsOptions {
        page: query.page,
        page_size: query.page_size,
    };
    let orders = use_case.get_returns(opts).await?;
    Ok(Json(orders.iter().map(OrderView::from).collect()))
}
