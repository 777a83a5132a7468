//! PostgreSQL Document Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{DocumentId, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_claims::{Document, DocumentPort};

use crate::repositories::ClaimsRepository;

#[derive(Debug, Clone)]
pub struct PostgresDocumentAdapter {
    repository: ClaimsRepository,
    pool: PgPool,
}

impl PostgresDocumentAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ClaimsRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresDocumentAdapter {}

#[async_trait]
impl HealthCheckable for PostgresDocumentAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-document-adapter").await
    }
}

#[async_trait]
impl DocumentPort for PostgresDocumentAdapter {
    #[instrument(skip_all, fields(document_id = %id))]
    async fn get_document(&self, id: DocumentId) -> Result<Document, PortError> {
        let row = self.repository.get_document(id.into()).await?;
        Ok(row.into())
    }

    #[instrument(skip_all, fields(document_id = %document.id))]
    async fn save_document(&self, document: Document) -> Result<Document, PortError> {
        let row = self.repository.insert_document(&document).await?;
        Ok(row.into())
    }
}
