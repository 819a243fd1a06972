//! Multi-Tenant Traits
//!
//! This module provides traits for multi-tenant entities in Veridia.
//!
//! # Example
//!
//! ```
//! use veridia_core::{TenantId, TenantAware};
//!
//! struct AccessRequest {
//!     tenant_id: TenantId,
//!     action: String,
//! }
//!
//! impl TenantAware for AccessRequest {
//!     fn tenant_id(&self) -> TenantId {
//!         self.tenant_id
//!     }
//! }
//!
//! // Generic function that works with any TenantAware entity
//! fn verify_tenant<T: TenantAware>(entity: &T, expected: TenantId) -> bool {
//!     entity.tenant_id() == expected
//! }
//!
//! let tenant = TenantId::new();
//! let request = AccessRequest {
//!     tenant_id: tenant,
//!     action: "read".to_string(),
//! };
//!
//! assert!(verify_tenant(&request, tenant));
//! ```

use crate::ids::TenantId;

/// Trait for entities that belong to a specific tenant.
///
/// Implementing this trait marks an entity as tenant-scoped, enabling
/// compile-time verification that tenant isolation is properly implemented.
///
/// # Object Safety
///
/// This trait is object-safe, meaning it can be used with trait objects:
/// `Box<dyn TenantAware>` or `&dyn TenantAware`.
pub trait TenantAware {
    /// Returns the tenant this entity belongs to.
    fn tenant_id(&self) -> TenantId;

    /// Returns true if this entity belongs to the given tenant.
    fn belongs_to(&self, tenant: TenantId) -> bool {
        self.tenant_id() == tenant
    }
}
