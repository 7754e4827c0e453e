use std::time::Duration;

use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

use crate::entity::{application, job};

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}

/// Ensure required database indexes exist.
///
/// Unique indexes come from the entity definitions via schema-sync; the
/// non-unique indexes backing the cascade and report query paths are
/// created here.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Applications are looked up by job on every cascade and report query:
    // SELECT ... FROM application WHERE job_id IN (...)
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_application_job")
        .table(application::Entity)
        .col(application::Column::JobId)
        .to_string(PostgresQueryBuilder);
    create_index(db, "idx_application_job", &stmt).await;

    // Jobs are looked up by their posting HR on company reads and cascades.
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_job_added_by")
        .table(job::Entity)
        .col(job::Column::AddedBy)
        .to_string(PostgresQueryBuilder);
    create_index(db, "idx_job_added_by", &stmt).await;

    Ok(())
}

async fn create_index(db: &DatabaseConnection, name: &str, stmt: &str) {
    match db.execute_unprepared(stmt).await {
        Ok(_) => info!("Ensured index {name} exists"),
        Err(e) => tracing::warn!("Failed to create index {name}: {e}"),
    }
}
