//! Preorder API 模块

mod handler;

use axum::{Router, middleware, routing::{get, post, put}};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/preorders", routes())
}

fn routes() -> Router<ServerState> {
    // 用户路由：预购、查询、取消
    let user_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/history", get(handler::history));

    // 管理路由：状态流转需要 preorders:manage 权限
    let manage_routes = Router::new()
        .route("/{id}/status", put(handler::update_status))
        .layer(middleware::from_fn(require_permission("preorders:manage")));

    user_routes.merge(manage_routes)
}
