use serde::Deserialize;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string for the rep/kit directory
    pub database_url: String,

    /// Redis connection string (work queue + dedup markers)
    pub redis_url: String,

    /// Root directory containing the yearly release-report folders
    pub report_base_dir: String,

    /// Redis list key the worker blocks on for new-file jobs
    pub queue_name: String,

    /// EmailJS delivery credentials
    pub emailjs: EmailJsConfig,

    /// When true, classify lots but suppress all outbound sends
    pub notify_dry_run: bool,

    /// Maximum number of PostgreSQL connections in the pool (default: 5)
    pub db_max_connections: u32,
}

/// Credentials for the EmailJS transactional send endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailJsConfig {
    pub service_id: String,
    pub template_id: String,
    pub access_token: String,
    pub user_id: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            report_base_dir: std::env::var("REPORT_BASE_DIR")
                .unwrap_or_else(|_| "/app/qc_db".to_string()),
            queue_name: std::env::var("QUEUE_NAME")
                .unwrap_or_else(|_| "queue:new_files".to_string()),
            emailjs: EmailJsConfig {
                service_id: std::env::var("EMAILJS_SERVICE_ID").map_err(|_| {
                    anyhow::anyhow!("EMAILJS_SERVICE_ID environment variable is required")
                })?,
                template_id: std::env::var("EMAILJS_TEMPLATE_ID").map_err(|_| {
                    anyhow::anyhow!("EMAILJS_TEMPLATE_ID environment variable is required")
                })?,
                access_token: std::env::var("EMAILJS_ACCESS_TOKEN").map_err(|_| {
                    anyhow::anyhow!("EMAILJS_ACCESS_TOKEN environment variable is required")
                })?,
                user_id: std::env::var("EMAILJS_USER_ID").map_err(|_| {
                    anyhow::anyhow!("EMAILJS_USER_ID environment variable is required")
                })?,
            },
            notify_dry_run: std::env::var("NOTIFY_DRY_RUN")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid u32"))?,
        })
    }
}
