//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 注册 / 登录 / 当前用户
//! - [`users`] - 用户管理接口 (管理员) + 个人资料
//! - [`addresses`] - 地址簿接口
//! - [`products`] - 商品 / 规格 / 库存接口
//! - [`cart`] - 购物车接口
//! - [`orders`] - 订单接口 (下单、取消、状态流转)
//! - [`preorders`] - 预购接口 (下单、取消、状态流转)
//! - [`reviews`] - 商品评价接口
//! - [`wishlist`] - 心愿单接口

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod health;
pub mod orders;
pub mod preorders;
pub mod products;
pub mod reviews;
pub mod users;
pub mod wishlist;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppResult};
