//! Postgres failure log
//!
//! Writes one `sync_errors` row per failed sync attempt. Rows are insert-only
//! and surfaced to operators through the dashboard's error views.

use async_trait::async_trait;
use native_tls::TlsConnector;
use opsdeck_core::FailureLogSink;
use opsdeck_domain::{FailureRecord, OpsError, Result};
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::Client;
use tracing::{debug, error, instrument};

const INSERT_FAILURE: &str = "INSERT INTO sync_errors \
     (error_type, source, object_type, object_id, operation, error_message, \
      error_details, request_payload, retry_count, max_retries, next_retry_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)";

/// Failure log sink backed by the dashboard's Postgres database
pub struct PostgresFailureLog {
    client: Client,
}

impl PostgresFailureLog {
    /// Connect over TLS and spawn the connection driver task
    pub async fn connect(database_url: &str) -> Result<Self> {
        let tls = TlsConnector::builder()
            .build()
            .map_err(|e| OpsError::Database(format!("TLS setup failed: {e}")))?;
        let connector = MakeTlsConnector::new(tls);

        let (client, connection) = tokio_postgres::connect(database_url, connector)
            .await
            .map_err(|e| OpsError::Database(format!("connection failed: {e}")))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "postgres connection task ended with error");
            }
        });

        Ok(Self { client })
    }

    #[cfg(test)]
    fn insert_statement() -> &'static str {
        INSERT_FAILURE
    }
}

#[async_trait]
impl FailureLogSink for PostgresFailureLog {
    #[instrument(skip(self, record), fields(error_type = %record.error_type, operation = %record.operation))]
    async fn record_failure(&self, record: &FailureRecord) -> Result<()> {
        let retry_count = i32::try_from(record.retry_count)
            .map_err(|_| OpsError::InvalidInput("retry_count out of range".into()))?;
        let max_retries = i32::try_from(record.max_retries)
            .map_err(|_| OpsError::InvalidInput("max_retries out of range".into()))?;

        self.client
            .execute(
                INSERT_FAILURE,
                &[
                    &record.error_type.as_str(),
                    &record.source,
                    // Singular form ("contact"), matching existing dashboard rows
                    &record.object_type.to_string(),
                    &record.object_id,
                    &record.operation.to_string(),
                    &record.error_message,
                    &record.error_details,
                    &record.request_payload,
                    &retry_count,
                    &max_retries,
                    &record.next_retry_at,
                ],
            )
            .await
            .map_err(|e| OpsError::Database(format!("sync_errors insert failed: {e}")))?;

        debug!("recorded sync failure");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use opsdeck_domain::{ErrorCategory, ObjectType, SyncOperation};

    use super::*;

    #[test]
    fn object_type_column_uses_singular_form() {
        let record = FailureRecord::new(
            ErrorCategory::Validation,
            ObjectType::Deal,
            SyncOperation::Create,
            "boom",
        );

        // The column value, not the REST resource segment ("deals")
        assert_eq!(record.object_type.to_string(), "deal");
    }

    #[test]
    fn insert_statement_covers_all_columns() {
        let sql = PostgresFailureLog::insert_statement();
        for column in [
            "error_type",
            "source",
            "object_type",
            "object_id",
            "operation",
            "error_message",
            "error_details",
            "request_payload",
            "retry_count",
            "max_retries",
            "next_retry_at",
        ] {
            assert!(sql.contains(column), "missing column {column}");
        }
        assert!(sql.contains("$11"));
    }
}
