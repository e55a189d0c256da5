//! Product API 模块

mod handler;

use axum::{Router, middleware, routing::{get, post, put}};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", routes())
}

fn routes() -> Router<ServerState> {
    // 读取路由：公开 (认证中间件放行 GET /api/products*)
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    // 商品管理路由：需要 products:manage 权限
    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/variants", post(handler::create_variant))
        .route(
            "/{id}/variants/{variant_id}",
            put(handler::update_variant).delete(handler::delete_variant),
        )
        .layer(middleware::from_fn(require_permission("products:manage")));

    // 库存路由：需要 inventory:manage 权限
    let inventory_routes = Router::new()
        .route(
            "/{id}/variants/{variant_id}/inventory",
            put(handler::set_inventory),
        )
        .layer(middleware::from_fn(require_permission("inventory:manage")));

    read_routes.merge(manage_routes).merge(inventory_routes)
}
