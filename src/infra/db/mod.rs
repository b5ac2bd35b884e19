//! Database connection and store handle management.

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr, Statement,
};

use crate::config::Config;
use crate::errors::{AppError, AppResult};

/// Shared connection pool for the process.
#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Open the pool described by the configuration.
    pub async fn connect(config: &Config) -> Result<Self, DbErr> {
        let connection = open_pool(config).await?;
        tracing::info!("Database connected");
        Ok(Self { connection })
    }

    /// Get a clone of the database connection.
    pub fn get_connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }

    /// Check database connectivity by executing a simple query.
    pub async fn ping(&self) -> Result<(), DbErr> {
        ping(&self.connection).await
    }
}

/// Connection owned by one repository for its whole lifetime.
///
/// Released at most once: [`StoreHandle::release`] is idempotent, and a
/// handle that is simply dropped releases its connection with it. A handle
/// opened with [`StoreHandle::connect`] owns its pool and closes it on
/// release; a [`StoreHandle::shared`] handle only gives its clone back.
pub struct StoreHandle {
    connection: Option<DatabaseConnection>,
    owns_pool: bool,
}

impl StoreHandle {
    /// Open a dedicated pool for this handle.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let connection = open_pool(config).await?;
        tracing::debug!("Store handle opened a dedicated pool");
        Ok(Self {
            connection: Some(connection),
            owns_pool: true,
        })
    }

    /// Borrow a clone of a pool owned elsewhere.
    pub fn shared(connection: DatabaseConnection) -> Self {
        Self {
            connection: Some(connection),
            owns_pool: false,
        }
    }

    /// Live connection, or [`AppError::Released`] after disposal.
    pub fn connection(&self) -> AppResult<&DatabaseConnection> {
        self.connection.as_ref().ok_or(AppError::Released)
    }

    pub fn is_released(&self) -> bool {
        self.connection.is_none()
    }

    /// Give the connection back. Calling this again does nothing.
    pub async fn release(&mut self) -> AppResult<()> {
        let Some(connection) = self.connection.take() else {
            return Ok(());
        };

        if self.owns_pool {
            connection.close().await?;
            tracing::debug!("Store handle closed its pool");
        } else {
            tracing::debug!("Store handle released shared connection");
        }

        Ok(())
    }
}

async fn open_pool(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);

    SeaDatabase::connect(options).await
}

async fn ping(connection: &DatabaseConnection) -> Result<(), DbErr> {
    connection
        .execute(Statement::from_string(
            connection.get_database_backend(),
            "SELECT 1".to_string(),
        ))
        .await?;
    Ok(())
}
