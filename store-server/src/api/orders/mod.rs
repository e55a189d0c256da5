//! Order API 模块

mod handler;

use axum::{Router, middleware, routing::{get, post, put}};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    // 用户路由：下单、查询自己的订单、取消
    let user_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/payments", get(handler::payments))
        .route("/{id}/history", get(handler::history));

    // 管理路由：状态流转/支付结果需要 orders:manage 权限
    let manage_routes = Router::new()
        .route("/{id}/status", put(handler::update_status))
        .route(
            "/{id}/payments/{payment_id}",
            put(handler::update_payment),
        )
        .layer(middleware::from_fn(require_permission("orders:manage")));

    user_routes.merge(manage_routes)
}
