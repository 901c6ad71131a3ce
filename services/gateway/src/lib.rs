//! Thin tonic + axum translation onto `oms::usecase::OrderUseCase`.
//!
//! Both surfaces are stateless translations: validate the request, map
//! fields into the use-case's parameter list, invoke it, translate the
//! result (or error, via a central classification point) into the
//! transport's native shape.

#![forbid(unsafe_code)]

pub mod grpc;
pub mod http;
pub mod server;
pub mod translate;

/// Generated protobuf/tonic types.
pub mod pb {
    tonic::include_proto!("pvz.v1");
}
