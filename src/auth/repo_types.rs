use time::OffsetDateTime;

/// Registered user. Immutable once created by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,                    // sequential, starts at 1
    pub email: String,              // case-sensitive, unique
    pub password_hash: String,      // Argon2 PHC string, never sent to clients
    pub created_at: OffsetDateTime,
}
