//! Status enums mapping to SMALLINT lookup tables.
//!
//! Each variant's discriminant matches the seed data in the corresponding
//! `*_statuses` table, and its name matches the table's `name` column.

use restyle_core::error::CoreError;

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Return the seeded `name` of this status.
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $label ),+
                }
            }

            /// Map a database status ID back to the enum.
            pub fn from_id(id: StatusId) -> Result<Self, CoreError> {
                match id {
                    $( $val => Ok(Self::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        "Unknown {} id {other}",
                        stringify!($name)
                    ))),
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

define_status_enum! {
    /// Transformation job lifecycle: `queued → processing → completed | failed`.
    TransformationStatus {
        Queued = 1 => "queued",
        Processing = 2 => "processing",
        Completed = 3 => "completed",
        Failed = 4 => "failed",
    }
}

impl TransformationStatus {
    /// `completed` and `failed` are never left once reached.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (Self::Queued, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_seed_data() {
        assert_eq!(TransformationStatus::Queued.id(), 1);
        assert_eq!(TransformationStatus::Processing.id(), 2);
        assert_eq!(TransformationStatus::Completed.id(), 3);
        assert_eq!(TransformationStatus::Failed.id(), 4);
    }

    #[test]
    fn names_match_seed_data() {
        assert_eq!(TransformationStatus::Queued.name(), "queued");
        assert_eq!(TransformationStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn from_id_round_trips_and_rejects_unknown() {
        assert_eq!(
            TransformationStatus::from_id(3).unwrap(),
            TransformationStatus::Completed
        );
        assert!(TransformationStatus::from_id(9).is_err());
    }

    #[test]
    fn transitions_are_monotonic() {
        use TransformationStatus::*;
        assert!(Queued.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));

        assert!(!Processing.can_transition_to(Queued));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Queued));
        assert!(!Queued.can_transition_to(Completed));
    }

    #[test]
    fn terminal_states() {
        assert!(TransformationStatus::Completed.is_terminal());
        assert!(TransformationStatus::Failed.is_terminal());
        assert!(!TransformationStatus::Processing.is_terminal());
    }
}
