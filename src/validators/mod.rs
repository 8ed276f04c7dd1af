pub mod email;
pub mod name;
pub mod password;

pub use email::{normalize_email, validate_email};
pub use name::validate_name;
pub use password::validate_password;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationError {
    EmailEmpty,
    EmailTooLong,
    EmailInvalidFormat,
    PasswordEmpty,
    PasswordTooShort,
    PasswordTooLong,
    FirstNameEmpty,
    FirstNameTooLong,
    LastNameEmpty,
    LastNameTooLong,
    RoleUnknown,
    TokenEmpty,
    TitleEmpty,
    MessageEmpty,
    NotificationTypeInvalid,
}

impl ValidationError {
    /// The request field this error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmailEmpty | Self::EmailTooLong | Self::EmailInvalidFormat => "email",
            Self::PasswordEmpty | Self::PasswordTooShort | Self::PasswordTooLong => "password",
            Self::FirstNameEmpty | Self::FirstNameTooLong => "first_name",
            Self::LastNameEmpty | Self::LastNameTooLong => "last_name",
            Self::RoleUnknown => "role",
            Self::TokenEmpty => "token",
            Self::TitleEmpty => "title",
            Self::MessageEmpty => "message",
            Self::NotificationTypeInvalid => "type",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmailEmpty => write!(f, "email cannot be empty"),
            Self::EmailTooLong => write!(f, "email is too long (max 254 characters)"),
            Self::EmailInvalidFormat => write!(f, "invalid email format"),
            Self::PasswordEmpty => write!(f, "password cannot be empty"),
            Self::PasswordTooShort => write!(f, "password must be at least 8 characters"),
            Self::PasswordTooLong => write!(f, "password is too long (max 128 characters)"),
            Self::FirstNameEmpty => write!(f, "first name cannot be empty"),
            Self::FirstNameTooLong => write!(f, "first name is too long (max 100 characters)"),
            Self::LastNameEmpty => write!(f, "last name cannot be empty"),
            Self::LastNameTooLong => write!(f, "last name is too long (max 100 characters)"),
            Self::RoleUnknown => write!(f, "unknown role"),
            Self::TokenEmpty => write!(f, "token cannot be empty"),
            Self::TitleEmpty => write!(f, "title cannot be empty"),
            Self::MessageEmpty => write!(f, "message cannot be empty"),
            Self::NotificationTypeInvalid => {
                write!(f, "type must be one of success, warning, error, info")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
