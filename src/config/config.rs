use std::{env, sync::Arc, time::Instant};

use crate::{
    db::{self, Storage, memory::MemStorage, postgres::PgStorage},
    middleware::rate_limit::RateLimits,
    services::{
        auth::AuthService, bookings::BookingService, sessions::SessionStore,
        whatsapp::WhatsAppService,
    },
};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub session_secret: String,
    pub admin_password: String,
    pub superadmin_password: String,
    pub client_urls: Vec<String>,
    pub environment: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let session_secret = env::var("SESSION_SECRET").unwrap_or_else(|_| {
            tracing::warn!(
                "SESSION_SECRET not set, using the default secret. Set it for production!"
            );
            "dev-session-secret-change-in-production".to_string()
        });

        let default_password = if environment == "development" {
            "Marrakech@2025".to_string()
        } else {
            "ChangeMe123!".to_string()
        };

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").ok(),
            session_secret,
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| default_password.clone()),
            superadmin_password: env::var("SUPERADMIN_PASSWORD")
                .unwrap_or_else(|_| default_password.clone()),
            client_urls: env::var("CLIENT_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string())
                .split(',')
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .collect(),
            environment,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub config: AppConfig,
    pub sessions: Arc<SessionStore>,
    pub whatsapp: Arc<WhatsAppService>,
    pub auth_service: AuthService,
    pub booking_service: BookingService,
    pub rate_limits: Arc<RateLimits>,
    pub started_at: Instant,
}

impl AppState {
    /// Loads configuration, selects the storage backend and seeds it.
    /// A configured but unreachable database falls back to the in-memory
    /// store instead of refusing to start; the log carries the warning.
    pub async fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let storage: Arc<dyn Storage> = match &config.database_url {
            Some(url) => match PgStorage::connect(url).await {
                Ok(pg) => {
                    tracing::info!("database connection established");
                    Arc::new(pg)
                }
                Err(e) => {
                    tracing::warn!(
                        "database connection failed ({e}), falling back to in-memory \
                         storage. Data will be lost on restart."
                    );
                    Arc::new(MemStorage::new())
                }
            },
            None => {
                tracing::warn!(
                    "DATABASE_URL not set, using in-memory storage. Data will be lost \
                     on restart."
                );
                Arc::new(MemStorage::new())
            }
        };

        db::seed_initial_data(storage.as_ref(), &config).await?;

        Ok(Self::with_storage(config, storage))
    }

    /// Assembles the state around an already-selected storage backend.
    /// This is the seam the integration tests use.
    pub fn with_storage(config: AppConfig, storage: Arc<dyn Storage>) -> Self {
        let sessions = Arc::new(SessionStore::new(config.session_secret.clone()));
        let whatsapp = Arc::new(WhatsAppService::new());
        let auth_service = AuthService::new(storage.clone());
        let booking_service = BookingService::new(storage.clone(), whatsapp.clone());

        Self {
            storage,
            config,
            sessions,
            whatsapp,
            auth_service,
            booking_service,
            rate_limits: Arc::new(RateLimits::new()),
            started_at: Instant::now(),
        }
    }
}
