use core::fmt;
use serde::{Deserialize, Serialize};

/// Declares a string-backed identifier.
///
/// Identifiers in elplan come from the editor (UUIDs, user-chosen board names,
/// derived circuit keys), so they are owned strings rather than compact
/// indices. Ordering is lexicographic, which is what every deterministic
/// sort in the engine relies on.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// A placed symbol instance.
    SymbolId
);
string_id!(
    /// Key of a symbol type in the symbol catalog (e.g. `grounded_socket`).
    SymbolKey
);
string_id!(RoomId);
string_id!(
    /// A distribution board ("Verteiler").
    BoardId
);
string_id!(CircuitId);
string_id!(CableId);
string_id!(
    /// A cabinet device in the device catalog.
    DeviceId
);
string_id!(NetworkId);
string_id!(RcdGroupId);
string_id!(ArticleId);

/// Board id of the bucket collecting symbols without a board assignment.
pub const UNASSIGNED_BOARD: &str = "unassigned";

impl BoardId {
    pub fn unassigned() -> Self {
        Self::new(UNASSIGNED_BOARD)
    }

    pub fn is_unassigned(&self) -> bool {
        self.0 == UNASSIGNED_BOARD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_order_lexicographically() {
        let mut ids = vec![CircuitId::from("b"), CircuitId::from("a10"), CircuitId::from("a2")];
        ids.sort();
        assert_eq!(
            ids.iter().map(CircuitId::as_str).collect::<Vec<_>>(),
            vec!["a10", "a2", "b"]
        );
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = BoardId::from("HV-EG");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"HV-EG\"");
        let back: BoardId = serde_json::from_str("\"UV-OG\"").unwrap();
        assert_eq!(back.as_str(), "UV-OG");
    }

    #[test]
    fn unassigned_bucket() {
        assert!(BoardId::unassigned().is_unassigned());
        assert!(!BoardId::from("HV").is_unassigned());
    }
}
