//! Staff roles and the resource kinds they may act on.

/// The closed set of staff roles recognised by the system.
///
/// This enum is deliberately *closed*: every access decision in the core is a
/// total match over these five variants, so adding a role forces every
/// scoping and permission site to be revisited.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    Receptionist,
    Pharmacist,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Receptionist => "receptionist",
            Role::Pharmacist => "pharmacist",
            Role::Assistant => "assistant",
        };
        write!(f, "{name}")
    }
}

/// Kinds of records a caller may ask to mutate.
///
/// Used as the second key of the permission table: view access is decided by
/// scoping, mutation access by `(Role, ResourceKind)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Appointment,
    Patient,
    Treatment,
    Billing,
    Prescription,
    Inventory,
}
