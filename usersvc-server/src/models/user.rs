//! User record, submitted form shapes, and the partial-update diff

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Store-assigned user identifier (always positive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier, rejecting zero and negatives.
    pub fn new(raw: i64) -> Result<Self, ValidationError> {
        if raw <= 0 {
            return Err(ValidationError::InvalidFormat {
                field: "user id",
                reason: "must be a positive integer",
            });
        }
        Ok(Self(raw))
    }

    /// Parse an identifier taken from a request path.
    ///
    /// # Example
    /// ```
    /// use usersvc_server::models::UserId;
    ///
    /// assert_eq!(UserId::parse("42").unwrap().get(), 42);
    /// assert!(UserId::parse("abc").is_err());
    /// assert!(UserId::parse("0").is_err());
    /// assert!(UserId::parse(" 42").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "user id" });
        }

        let raw = s.parse::<i64>().map_err(|_| ValidationError::InvalidFormat {
            field: "user id",
            reason: "must be numeric",
        })?;

        Self::new(raw)
    }

    /// Identifier handed out by a store sequence; callers guarantee `raw > 0`.
    pub(crate) fn assigned(raw: i64) -> Self {
        debug_assert!(raw > 0);
        Self(raw)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A row of the `users` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub message: String,
}

impl User {
    /// Stored value of a single text field.
    pub fn field(&self, field: UserField) -> &str {
        match field {
            UserField::Username => &self.username,
            UserField::Email => &self.email,
            UserField::Fullname => &self.fullname,
            UserField::Message => &self.message,
        }
    }

    fn field_mut(&mut self, field: UserField) -> &mut String {
        match field {
            UserField::Username => &mut self.username,
            UserField::Email => &mut self.email,
            UserField::Fullname => &mut self.fullname,
            UserField::Message => &mut self.message,
        }
    }

    /// Apply a set of changes produced by [`UserPatch::changes`].
    pub fn apply(&mut self, changes: &[FieldChange<'_>]) {
        for change in changes {
            *self.field_mut(change.field) = change.value.to_owned();
        }
    }
}

/// The editable text columns of a user, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Username,
    Email,
    Fullname,
    Message,
}

impl UserField {
    pub const ALL: [Self; 4] = [Self::Username, Self::Email, Self::Fullname, Self::Message];

    /// Column name in the `users` table.
    pub fn column(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Fullname => "fullname",
            Self::Message => "message",
        }
    }
}

/// Form fields submitted on create. Missing fields arrive as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub message: String,
}

/// Form fields submitted on update. An empty value means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub message: String,
}

/// One column that an update will overwrite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldChange<'a> {
    pub field: UserField,
    pub value: &'a str,
}

impl UserPatch {
    fn value(&self, field: UserField) -> &str {
        match field {
            UserField::Username => &self.username,
            UserField::Email => &self.email,
            UserField::Fullname => &self.fullname,
            UserField::Message => &self.message,
        }
    }

    /// Diff the submitted values against the stored row.
    ///
    /// A field is included only when the submitted value is non-empty and
    /// differs from what is stored. Order follows [`UserField::ALL`].
    pub fn changes(&self, current: &User) -> Vec<FieldChange<'_>> {
        UserField::ALL
            .into_iter()
            .filter_map(|field| {
                let value = self.value(field);
                (!value.is_empty() && value != current.field(field))
                    .then_some(FieldChange { field, value })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> User {
        User {
            id: UserId(7),
            username: "ada".into(),
            email: "ada@example.com".into(),
            fullname: "Ada Lovelace".into(),
            message: "hello".into(),
        }
    }

    #[test]
    fn parses_positive_ids() {
        assert_eq!(UserId::parse("1").unwrap().get(), 1);
        assert_eq!(UserId::parse("+12").unwrap().get(), 12);
    }

    #[test]
    fn rejects_bad_ids() {
        assert!(matches!(
            UserId::parse("").unwrap_err(),
            ValidationError::Empty { .. }
        ));
        assert!(matches!(
            UserId::parse("abc").unwrap_err(),
            ValidationError::InvalidFormat { reason: "must be numeric", .. }
        ));
        assert!(UserId::parse("0").is_err());
        assert!(UserId::parse("-3").is_err());
        assert!(UserId::parse("1.5").is_err());
        for padded in [" 12 ", "12 ", "\t12", " "] {
            assert!(matches!(
                UserId::parse(padded).unwrap_err(),
                ValidationError::InvalidFormat { .. }
            ), "{padded:?}");
        }
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let patch = UserPatch::default();
        assert!(patch.changes(&stored()).is_empty());
    }

    #[test]
    fn identical_values_change_nothing() {
        let patch = UserPatch {
            username: "ada".into(),
            email: "ada@example.com".into(),
            ..Default::default()
        };
        assert!(patch.changes(&stored()).is_empty());
    }

    #[test]
    fn only_differing_non_empty_fields_change() {
        let patch = UserPatch {
            username: "ada".into(),
            email: String::new(),
            fullname: "Augusta Ada King".into(),
            message: "updated".into(),
        };
        let changes = patch.changes(&stored());
        assert_eq!(
            changes,
            vec![
                FieldChange { field: UserField::Fullname, value: "Augusta Ada King" },
                FieldChange { field: UserField::Message, value: "updated" },
            ]
        );
    }

    #[test]
    fn apply_overwrites_only_changed_fields() {
        let mut user = stored();
        let patch = UserPatch {
            email: "countess@example.com".into(),
            ..Default::default()
        };
        let changes = patch.changes(&user);
        user.apply(&changes);

        assert_eq!(user.email, "countess@example.com");
        assert_eq!(user.username, "ada");
        assert_eq!(user.message, "hello");
    }

    #[test]
    fn serializes_id_as_number() {
        let json = serde_json::to_value(stored()).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["fullname"], "Ada Lovelace");
    }
}
