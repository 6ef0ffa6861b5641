use serde::{Deserialize, Serialize};

/// Role reference data, unique per tenant. Read-only for the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Stable role identifier in tenant scope.
    pub role_id: String,
    /// Optional display name.
    pub name: Option<String>,
}

/// Permission reference data. Read-only for the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Stable permission identifier in tenant scope.
    pub permission_id: String,
    /// Owning application.
    pub app_id: String,
    /// Optional owning product grouping.
    pub product_name: Option<String>,
}

/// Application reference data grouping permissions. Read-only for the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    /// Stable application identifier in tenant scope.
    pub app_id: String,
    /// Optional owning product grouping.
    pub product_name: Option<String>,
}
