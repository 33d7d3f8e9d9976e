//! User accounts: login identities with a role.
//!
//! The stored password digest never leaves the domain in serialised form.
//! Updates rewrite every profile column but keep the existing credential
//! unless a new `password` is submitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::resource::{Intent, Resource};
use crate::domain::{FieldErrors, PasswordDigest, Role, Submission, UserId};

/// `VARCHAR` widths of the `users` columns.
const COLUMN_LIMITS: [(&str, usize); 3] =
    [("username", 255), ("first_name", 255), ("last_name", 255)];

/// Editable account columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDraft {
    /// Display handle; not unique.
    pub username: String,
    /// Sign-in address, unique across accounts.
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    /// Inactive accounts cannot sign in and lose existing sessions.
    pub is_active: bool,
    pub is_email_confirmed: bool,
    /// New credential; `None` on update keeps the stored digest.
    pub password: Option<PasswordDigest>,
}

impl AccountDraft {
    /// Validate an untyped account submission and hash any new password.
    ///
    /// # Errors
    /// Returns every failing field. A password is mandatory on create.
    pub fn validate(input: &Value, intent: Intent) -> Result<Self, FieldErrors> {
        let mut form = Submission::new(input)?;
        let username = form.required_string("username", "Username cannot be empty.");
        let email = form.email("email", "Invalid email address.");
        let first_name = form.required_string("first_name", "First name cannot be empty.");
        let last_name = form.required_string("last_name", "Last name cannot be empty.");
        let role = form.one_of::<Role>("role", "Role must be one of student, teacher, admin.");
        let is_active = form.boolean_or("is_active", true, "Active flag must be a boolean.");
        let is_email_confirmed = form.boolean_or(
            "is_email_confirmed",
            false,
            "Email confirmation flag must be a boolean.",
        );
        let plain = match intent {
            Intent::Create => form.required_string("password", "Password cannot be empty."),
            Intent::Update => form.optional_string("password"),
        };
        form.max_chars_each(&COLUMN_LIMITS);

        let (
            Some(username),
            Some(email),
            Some(first_name),
            Some(last_name),
            Some(role),
            Some(is_active),
            Some(is_email_confirmed),
        ) = (
            username,
            email,
            first_name,
            last_name,
            role,
            is_active,
            is_email_confirmed,
        )
        else {
            return Err(form.into_errors());
        };
        if !form.is_clean() {
            return Err(form.into_errors());
        }

        let password = match plain {
            Some(plain) => match PasswordDigest::hash(&plain) {
                Ok(digest) => Some(digest),
                Err(_) => {
                    let mut errors = form.into_errors();
                    errors.push("password", "Password could not be processed.");
                    return Err(errors);
                }
            },
            None => None,
        };

        Ok(Self {
            username,
            email,
            first_name,
            last_name,
            role,
            is_active,
            is_email_confirmed,
            password,
        })
    }
}

/// Stored account as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Account {
    #[schema(value_type = String, format = Uuid)]
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(value_type = String, example = "teacher")]
    pub role: Role,
    pub is_active: bool,
    pub is_email_confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account together with its credential, as needed by login.
#[derive(Debug, Clone)]
pub struct StoredCredential {
    /// Public account fields.
    pub account: Account,
    /// Argon2 digest.
    pub password: PasswordDigest,
}

/// Equality filters for account lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    /// Accounts with this role.
    pub role: Option<Role>,
}

impl Resource for Account {
    type Id = UserId;
    type Draft = AccountDraft;
    type Filter = AccountFilter;

    const NOUN: &'static str = "User";
    const KEY: &'static str = "user";

    fn id(&self) -> UserId {
        self.user_id
    }

    fn validate(input: &Value, intent: Intent) -> Result<AccountDraft, FieldErrors> {
        AccountDraft::validate(input, intent)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn base() -> Value {
        json!({
            "username": "rpark",
            "email": "rosa@school.test",
            "first_name": "Rosa",
            "last_name": "Park",
            "role": "teacher",
        })
    }

    #[rstest]
    fn create_requires_password() {
        let errors = AccountDraft::validate(&base(), Intent::Create).expect_err("no password");
        assert_eq!(errors.messages("password"), ["Password cannot be empty."]);
    }

    #[rstest]
    fn update_without_password_keeps_credential() {
        let draft = AccountDraft::validate(&base(), Intent::Update).expect("valid");
        assert!(draft.password.is_none());
        assert!(draft.is_active);
        assert!(!draft.is_email_confirmed);
    }

    #[rstest]
    fn password_is_hashed() {
        let mut input = base();
        input["password"] = json!("s3cret!");
        let draft = AccountDraft::validate(&input, Intent::Create).expect("valid");
        let digest = draft.password.expect("digest");
        assert_ne!(digest.as_str(), "s3cret!");
        assert!(digest.verify("s3cret!"));
    }

    #[rstest]
    #[case(json!("principal"))]
    #[case(json!("Admin"))]
    #[case(json!(3))]
    fn role_outside_set_is_rejected(#[case] role: Value) {
        let mut input = base();
        input["role"] = role;
        let errors = AccountDraft::validate(&input, Intent::Update).expect_err("bad role");
        assert!(errors.contains("role"));
    }

    #[rstest]
    fn serialised_account_has_no_password_field() {
        let now = Utc::now();
        let account = Account {
            user_id: UserId::random(),
            username: "rpark".into(),
            email: "rosa@school.test".into(),
            first_name: "Rosa".into(),
            last_name: "Park".into(),
            role: Role::Teacher,
            is_active: true,
            is_email_confirmed: false,
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&account).expect("serialise");
        assert!(value.get("password").is_none());
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["role"], "teacher");
    }
}
