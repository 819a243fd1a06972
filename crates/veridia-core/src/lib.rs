//! Veridia Core Library
//!
//! Shared types and traits for the Veridia IAM platform.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (TenantId, SubjectId, ResourceId, DeviceId)
//! - [`traits`] - Multi-tenant traits (TenantAware)
//!
//! # Example
//!
//! ```
//! use veridia_core::{TenantId, SubjectId, TenantAware};
//!
//! // Create strongly typed IDs
//! let tenant_id = TenantId::new();
//! let subject_id = SubjectId::new();
//! ```

pub mod ids;
pub mod traits;

// Re-export main types for convenient access
pub use ids::{DeviceId, ParseIdError, ResourceId, SubjectId, TenantId};
pub use traits::TenantAware;
