//! Strongly typed entity identifiers.
//!
//! Each entity gets its own UUID newtype so that an appointment id can never
//! be passed where a patient id is expected. All ids serialize transparently
//! as canonical UUID strings.

use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
            utoipa::ToSchema,
        )]
        #[serde(transparent)]
        #[schema(value_type = String, format = Uuid)]
        pub struct $name(Uuid);

        impl $name {
            /// Allocates a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

entity_id!(
    /// Identifier of a user account.
    UserId
);
entity_id!(
    /// Identifier of a patient record.
    PatientId
);
entity_id!(
    /// Identifier of a practitioner (doctor) profile.
    DoctorProfileId
);
entity_id!(
    /// Identifier of an assistant profile.
    AssistantProfileId
);
entity_id!(
    /// Identifier of an appointment.
    AppointmentId
);
entity_id!(
    /// Identifier of a treatment record linked from an appointment.
    TreatmentId
);
