//! Users API 模块

mod handler;

use axum::{Router, middleware, routing::{get, put}};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    // 个人资料：登录即可
    let profile_routes = Router::new().route("/profile", put(handler::update_profile));

    // 管理路由：仅管理员
    let admin_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .layer(middleware::from_fn(require_admin));

    profile_routes.merge(admin_routes)
}
