//! 认证模块 - JWT 认证、密码哈希与权限
//!
//! # 组件
//!
//! - [`JwtService`] - 令牌生成与验证
//! - [`CurrentUser`] - 请求上下文中的已认证用户
//! - [`require_auth`] / [`require_permission`] / [`require_admin`] - 中间件
//! - [`password`] - argon2 哈希

mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth, require_permission};
pub use permissions::permissions_for_role;
