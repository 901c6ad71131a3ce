//! `OrderManagement` tonic service: one method per use-case operation,
//! stateless beyond holding the shared use-case.

use std::sync::Arc;

use chrono::Utc;
use oms::usecase::OrderUseCase;
use pvz_common::{OrderId, RecipientId};
use tonic::{Request, Response, Status};
use tracing::instrument;

use crate::pb;
use crate::translate::order_to_pb;

/// gRPC front door onto a shared [`OrderUseCase`].
pub struct OrderManagementService {
    use_case: Arc<OrderUseCase>,
}

impl OrderManagementService {
    /// Wrap a shared use-case for serving.
    #[must_use]
    pub const fn new(use_case: Arc<OrderUseCase>) -> Self {
        Self { use_case }
    }
}

#[tonic::async_trait]
impl pb::order_management_server::OrderManagement for OrderManagementService {
    #[instrument(skip(self, request))]
    async fn accept_order_delivery(
        &self,
        request: Request<pb::AcceptOrderDeliveryRequest>,
    ) -> Result<Response<pb::Order>, Status> {
        let req = request.into_inner();
        let packaging = pb::Packaging::try_from(req.packaging)
            .map_err(|_| Status::invalid_argument("unrecognized packaging value"))?
            .try_into()
            .map_err(Status::from)?;

        let order = self
            .use_case
            .accept_order_delivery(
                OrderId::from(req.order_id),
                RecipientId::from(req.recipient_id),
                chrono::Duration::seconds(req.storage_time_secs),
                req.cost,
                req.weight,
                packaging,
                req.additional_film,
            )
            .await
            .map_err(Status::from)?;

        Ok(Response::new(order_to_pb(&order)))
    }

    #[instrument(skip(self, request))]
    async fn return_order_delivery(
        &self,
        request: Request<pb::ReturnOrderDeliveryRequest>,
    ) -> Result<Response<pb::ReturnOrderDeliveryResponse>, Status> {
        let req = request.into_inner();
        self.use_case
            .return_order_delivery(OrderId::from(req.order_id), Utc::now())
            .await
            .map_err(Status::from)?;
        Ok(Response::new(pb::ReturnOrderDeliveryResponse {}))
    }

    #[instrument(skip(self, request))]
    async fn give_order_to_client(
        &self,
        request: Request<pb::GiveOrderToClientRequest>,
    ) -> Result<Response<pb::GiveOrderToClientResponse>, Status> {
        let req = request.into_inner();
        let order_ids = req.order_ids.into_iter().map(OrderId::from).collect();
        self.use_case
            .give_order_to_client(order_ids, Utc::now())
            .await
            .map_err(Status::from)?;
        Ok(Response::new(pb::GiveOrderToClientResponse {}))
    }

    #[instrument(skip(self, request))]
    async fn accept_return(
        &self,
        request: Request<pb::AcceptReturnRequest>,
    ) -> Result<Response<pb::AcceptReturnResponse>, Status> {
        let req = request.into_inner();
        self.use_case
            .accept_return(
                RecipientId::from(req.recipient_id),
                OrderId::from(req.order_id),
                Utc::now(),
            )
            .await
            .map_err(Status::from)?;
        Ok(Response::new(pb::AcceptReturnResponse {}))
    }

    #[instrument(skip(self, request))]
    async fn get_orders(
        &self,
        request: Request<pb::GetOrdersRequest>,
    ) -> Result<Response<pb::GetOrdersResponse>, Status> {
        let req = request.into_inner();
        let opts = oms::store::order_store::GetOrdersOptions {
            pvz_id: None,
            last_n: req.last_n,
            cursor: req.cursor.map(OrderId::from),
            limit: req.limit,
        };
        let orders = self
            .use_case
            .get_orders(RecipientId::from(req.recipient_id), opts, req.same_pvz)
            .await
            .map_err(Status::from)?;
        Ok(Response::new(pb::GetOrdersResponse {
            orders: orders.iter().map(order_to_pb).collect(),
        }))
    }

    #[instrument(skip(self, request))]
    async fn get_returns(
        &self,
        request: Request<pb::GetReturnsRequest>,
    ) -> Result<Response<pb::GetReturnsResponse>, Status> {
        let req = request.into_inner();
        let opts = oms::store::order_store::GetReturnsOptions {
            page: req.page,
            page_size: req.page_size,
        };
        let orders = self
            .use_case
            .get_returns(opts)
            .await
            .map_err(Status::from)?;
        Ok(Response::new(pb::GetReturnsResponse {
            orders: orders.iter().map(order_to_pb).collect(),
        }))
    }
}
