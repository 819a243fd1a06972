//! Strongly Typed Identifiers
//!
//! This module provides type-safe identifier types for Veridia.
//! Using the newtype pattern, these types prevent accidental misuse of
//! different ID types at compile time.
//!
//! # Example
//!
//! ```
//! use veridia_core::{TenantId, SubjectId};
//!
//! let tenant = TenantId::new();
//! let subject = SubjectId::new();
//!
//! // Type safety: cannot pass SubjectId where TenantId is expected
//! fn requires_tenant(id: TenantId) -> String {
//!     id.to_string()
//! }
//!
//! let result = requires_tenant(tenant);
//! // requires_tenant(subject); // This would not compile!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Error type for ID parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse
    pub id_type: &'static str,
    /// The underlying UUID parse error message
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to define a strongly-typed ID type
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID using UUID v4.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns a reference to the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        message: e.to_string(),
                    })
            }
        }
    };
}

define_id!(
    /// Strongly typed identifier for tenants.
    ///
    /// Every request evaluated by the platform is scoped to exactly one
    /// tenant; the risk engine carries this ID through to audit output.
    ///
    /// # Example
    ///
    /// ```
    /// use veridia_core::TenantId;
    /// use uuid::Uuid;
    ///
    /// // Create a new random TenantId
    /// let tenant_id = TenantId::new();
    /// println!("Tenant: {}", tenant_id);
    ///
    /// // Create from existing UUID
    /// let uuid = Uuid::new_v4();
    /// let tenant_id = TenantId::from_uuid(uuid);
    /// assert_eq!(tenant_id.as_uuid(), &uuid);
    ///
    /// // Parse from string
    /// let tenant_id: TenantId = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
    /// ```
    TenantId
);

define_id!(
    /// Strongly typed identifier for subjects (human users or service
    /// identities) whose access is being risk-evaluated.
    ///
    /// # Example
    ///
    /// ```
    /// use veridia_core::SubjectId;
    ///
    /// let subject_id = SubjectId::new();
    /// println!("Subject: {}", subject_id);
    /// ```
    SubjectId
);

define_id!(
    /// Strongly typed identifier for protected resources.
    ///
    /// # Example
    ///
    /// ```
    /// use veridia_core::ResourceId;
    ///
    /// let resource_id = ResourceId::new();
    /// println!("Resource: {}", resource_id);
    /// ```
    ResourceId
);

define_id!(
    /// Strongly typed identifier for client devices.
    ///
    /// Device identity feeds the device-trust signal and the
    /// recognized-device mitigating factor during risk evaluation.
    ///
    /// # Example
    ///
    /// ```
    /// use veridia_core::DeviceId;
    ///
    /// let device_id = DeviceId::new();
    /// println!("Device: {}", device_id);
    /// ```
    DeviceId
);
