use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc / 连接池实现浅拷贝，所有权成本极低。
/// 仓库层函数显式接收 `&SqlitePool`，便于在测试中用内存库替换。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 (WAL) |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 方法代替
    pub fn new(config: Config, pool: SqlitePool, jwt_service: Arc<JwtService>) -> Self {
        Self {
            config,
            pool,
            jwt_service,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保目录存在)
    /// 2. 数据库 (work_dir/database/store.db, 自动迁移)
    /// 3. JWT 服务
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        // 1. Initialize DB
        let db_path = config.database_dir().join("store.db");
        let db_path_str = db_path.to_string_lossy();

        let db_service = DbService::new(&db_path_str)
            .await
            .expect("Failed to initialize database");
        let pool = db_service.pool;

        // 2. Bootstrap the admin account from env on first run
        bootstrap_admin(&pool).await;

        // 3. Initialize JWT service from config
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self::new(config.clone(), pool, jwt_service)
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}

/// 从 ADMIN_EMAIL / ADMIN_PASSWORD 创建初始管理员 (已存在则跳过)
async fn bootstrap_admin(pool: &SqlitePool) {
    let (Ok(email), Ok(admin_password)) = (
        std::env::var("ADMIN_EMAIL"),
        std::env::var("ADMIN_PASSWORD"),
    ) else {
        return;
    };
    let email = email.trim().to_lowercase();

    match crate::db::repository::user::find_by_email(pool, &email).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            let hash = match crate::auth::password::hash_password(&admin_password) {
                Ok(h) => h,
                Err(e) => {
                    tracing::error!("Failed to hash admin password: {e}");
                    return;
                }
            };
            match crate::db::repository::user::create(
                pool,
                &email,
                &hash,
                "Administrator",
                shared::models::ROLE_ADMIN,
            )
            .await
            {
                Ok(admin) => tracing::info!(user_id = admin.id, "Admin account bootstrapped"),
                Err(e) => tracing::error!("Failed to bootstrap admin account: {e}"),
            }
        }
        Err(e) => tracing::error!("Admin bootstrap lookup failed: {e}"),
    }
}
