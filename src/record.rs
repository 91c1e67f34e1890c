use crate::error::ImportError;
use uuid::Uuid;

/// Column layout of the input file, by position.
pub const COLUMNS: [&str; 11] = [
    "source_member_id",
    "access_code",
    "group_name",
    "first_name",
    "last_name",
    "email",
    "gender",
    "birth_date",
    "profile",
    "password",
    "avatar",
];

/// Number of leading columns every row must carry. The trailing `avatar`
/// column only exists in newer exports.
pub const REQUIRED_COLUMNS: usize = 10;

/// One data row of the input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    pub user_id: String,
    pub group_token: String,
    pub group_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: String,
    pub birth_date: String,
    pub profile: String,
    pub password: String,
    pub avatar: Option<String>,
}

impl CsvRecord {
    /// The avatar reference, if the row has a non-empty one.
    #[inline]
    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref().filter(|avatar| !avatar.is_empty())
    }
}

/// A provisioned user, as written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    user_id: Uuid,
    group_token: String,
    group_name: String,
    auth_token: String,
}

impl UserEntry {
    /// Combine a row with the token obtained for it.
    /// Fails when the row's user id is not a UUID.
    pub fn new(record: &CsvRecord, auth_token: String) -> Result<Self, ImportError> {
        let user_id = Uuid::parse_str(&record.user_id)
            .map_err(|err| ImportError::invalid_id(&record.user_id, err))?;

        Ok(UserEntry {
            user_id,
            group_token: record.group_token.clone(),
            group_name: record.group_name.clone(),
            auth_token,
        })
    }

    #[inline]
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    #[inline]
    pub fn group_token(&self) -> &str {
        &self.group_token
    }

    #[inline]
    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    #[inline]
    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }
}
