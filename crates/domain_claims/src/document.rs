//! Supporting documents
//!
//! Upload and storage happen elsewhere. Claims only reference documents
//! by id, and every referenced document must exist.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CustomerId, DocumentId, DomainPort, HealthCheckable, PortError};

/// Metadata of an uploaded document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub customer_id: CustomerId,
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Lookup of uploaded documents
#[async_trait]
pub trait DocumentPort: DomainPort + HealthCheckable {
    /// Retrieves a document by ID
    async fn get_document(&self, id: DocumentId) -> Result<Document, PortError>;

    /// Records an uploaded document
    async fn save_document(&self, document: Document) -> Result<Document, PortError>;

    /// Fails with `NotFound` on the first id that does not exist
    async fn ensure_documents_exist(&self, ids: &[DocumentId]) -> Result<(), PortError> {
        for id in ids {
            self.get_document(*id).await?;
        }
        Ok(())
    }
}

/// Mock implementation of DocumentPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    #[derive(Debug, Default, Clone)]
    pub struct MockDocumentPort {
        documents: Arc<RwLock<HashMap<DocumentId, Document>>>,
    }

    impl MockDocumentPort {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DomainPort for MockDocumentPort {}

    #[async_trait]
    impl HealthCheckable for MockDocumentPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-document-port")
        }
    }

    #[async_trait]
    impl DocumentPort for MockDocumentPort {
        async fn get_document(&self, id: DocumentId) -> Result<Document, PortError> {
            self.documents
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Document", id))
        }

        async fn save_document(&self, document: Document) -> Result<Document, PortError> {
            self.documents.write().await.insert(document.id, document.clone());
            Ok(document)
        }
    }
}
