/// Database row types that carry more than the API exposes.
/// Everything else maps straight onto `arcade_types::models`.
use arcade_types::models::User;
use rusqlite::Row;
use rusqlite::types::Type;
use uuid::Uuid;

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub coins: i64,
    pub is_admin: bool,
    pub is_banned: bool,
    pub role: String,
    pub created_at: String,
}

pub(crate) const USER_COLUMNS: &str =
    "id, username, password, coins, is_admin, is_banned, role, created_at";

impl UserRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            password: row.get(2)?,
            coins: row.get(3)?,
            is_admin: row.get(4)?,
            is_banned: row.get(5)?,
            role: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    pub fn to_public(&self) -> rusqlite::Result<User> {
        Ok(User {
            id: parse_uuid(0, &self.id)?,
            username: self.username.clone(),
            coins: self.coins,
            is_admin: self.is_admin,
            is_banned: self.is_banned,
            role: self.role.clone(),
        })
    }
}

/// Parse a TEXT uuid column, reporting failures as a column conversion error.
pub(crate) fn parse_uuid(idx: usize, raw: &str) -> rusqlite::Result<Uuid> {
    raw.parse::<Uuid>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Parse a TEXT column through `FromStr` for enums stored by name.
pub(crate) fn parse_enum<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}
