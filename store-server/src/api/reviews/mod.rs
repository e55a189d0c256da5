//! Review API 模块

mod handler;

use axum::{Router, routing::{get, post, put}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reviews", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // 商品评价列表：公开 (认证中间件放行 GET /api/reviews/product/*)
        .route("/product/{product_id}", get(handler::list_for_product))
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
}
