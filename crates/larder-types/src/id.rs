use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Generate a new time-ordered identifier (UUID v7).
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// Create from an existing UUID.
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID.
            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }

            /// Short representation (first 8 characters of the UUID).
            pub fn short_id(&self) -> String {
                self.0.to_string()[..8].to_string()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.short_id())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| TypeError::InvalidId {
                        kind: $label,
                        input: s.to_string(),
                    })
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Category`](crate::Category).
    CategoryId,
    "category"
);

entity_id!(
    /// Identifier of an [`Ingredient`](crate::Ingredient).
    IngredientId,
    "ingredient"
);

entity_id!(
    /// Identifier of a [`Recipe`](crate::Recipe).
    RecipeId,
    "recipe"
);

entity_id!(
    /// Identifier of a [`RecipeIngredient`](crate::RecipeIngredient) line.
    RecipeIngredientId,
    "recipe ingredient"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        let a = RecipeId::new();
        let b = RecipeId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn display_parse_roundtrip() {
        let id = CategoryId::new();
        let parsed: CategoryId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_tolerates_surrounding_whitespace() {
        let id = IngredientId::new();
        let parsed: IngredientId = format!("  {id}\n").parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = "not-an-id".parse::<RecipeIngredientId>().unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidId {
                kind: "recipe ingredient",
                input: "not-an-id".into()
            }
        );
    }

    #[test]
    fn short_id_is_eight_chars() {
        let id = RecipeId::new();
        assert_eq!(id.short_id().len(), 8);
        assert!(id.to_string().starts_with(&id.short_id()));
    }

    #[test]
    fn debug_names_the_kind() {
        let id = CategoryId::new();
        assert!(format!("{id:?}").starts_with("CategoryId("));
    }

    #[test]
    fn serde_roundtrip() {
        let id = RecipeId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: RecipeId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
