//! Type-safe identifier wrappers.
//!
//! Games and connections get UUID v7 (time-ordered) identifiers so log
//! lines and analytics events sort naturally by creation time. Players
//! are identified by a client-chosen [`Username`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Name reserved for the synthetic AI participant.
pub const AI_USERNAME: &str = "Bot";

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a game session.
    GameId
}

define_id! {
    /// Unique identifier for a single client connection.
    ///
    /// Two successive connections that reuse the same [`Username`] get
    /// different connection ids, so stale timers and disconnects from an
    /// earlier socket never act on a newer one.
    ConnectionId
}

/// A player's identity, chosen by the client when it connects.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct Username(String);

impl Username {
    /// Build a username from client input.
    ///
    /// Surrounding whitespace is trimmed. Returns `None` for names that
    /// are empty after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    /// Generate a throwaway name for clients that did not pick one.
    pub fn generated() -> Self {
        Self(format!("User-{}", Uuid::now_v7().simple()))
    }

    /// The reserved identity of the synthetic AI participant.
    pub fn ai() -> Self {
        Self(AI_USERNAME.to_owned())
    }

    /// Whether this is the reserved AI identity.
    pub fn is_ai(&self) -> bool {
        self.0 == AI_USERNAME
    }

    /// Borrow the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Username {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = GameId::new();
        let b = GameId::new();
        assert_ne!(a, b);
        assert_ne!(ConnectionId::new().into_inner(), Uuid::nil());
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = GameId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }

    #[test]
    fn game_id_serializes_as_plain_string() {
        let id = GameId::new();
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn username_parse_trims_and_rejects_blank() {
        assert_eq!(
            Username::parse("  alice ").map(|u| u.as_str().to_owned()),
            Some(String::from("alice"))
        );
        assert!(Username::parse("   ").is_none());
        assert!(Username::parse("").is_none());
    }

    #[test]
    fn generated_names_are_distinct_and_not_ai() {
        let a = Username::generated();
        let b = Username::generated();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("User-"));
        assert!(!a.is_ai());
        assert!(Username::ai().is_ai());
    }
}
