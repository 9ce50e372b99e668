//! Shared domain enumerations aligned with persisted database enums.

/// Direction of a follower row relative to the owning page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "follower_relation", rename_all = "snake_case")]
pub enum Relation {
    Follower,
    Following,
}

impl Relation {
    /// Tag used in the database enum and in serialized rows.
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Follower => "follower",
            Relation::Following => "following",
        }
    }
}
