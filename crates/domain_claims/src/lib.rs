//! Claims Domain
//!
//! A customer claims against an ACTIVE policy with supporting documents; an
//! admin approves or rejects the claim exactly once.
//!
//! # Claim Lifecycle
//!
//! ```text
//! PENDING -> APPROVED  (policy becomes CLAIMED)
//!         -> REJECTED  (policy unchanged)
//! ```

pub mod claim;
pub mod document;
pub mod error;

pub use claim::{claim_payout, Claim, ClaimStatus, NewClaim};
pub use document::{Document, DocumentPort};
#[cfg(any(test, feature = "mock"))]
pub use document::mock::MockDocumentPort;
pub use error::ClaimError;
