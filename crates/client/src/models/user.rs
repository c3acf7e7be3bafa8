//! User and authentication types.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use jacaranda_core::{Email, UserId};

/// A shop customer or administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Backend-issued opaque ID.
    pub id: UserId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    /// Grants access to the admin surface.
    pub is_admin: bool,
    /// Saved shipping address, if the user has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
}

impl User {
    /// Display name as shown in the account menu.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A shipping address.
///
/// Order history payloads sometimes carry a trimmed-down address, so every
/// field tolerates being absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
}

/// Login credentials.
///
/// The password is wrapped in [`SecretString`] so it never appears in debug
/// output; it is exposed only at the moment the login body is built.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: Email,
    pub password: SecretString,
}

impl Credentials {
    /// Build credentials from an already-parsed email and a raw password.
    #[must_use]
    pub fn new(email: Email, password: impl Into<String>) -> Self {
        Self {
            email,
            password: SecretString::from(password.into()),
        }
    }
}

/// Registration data for `POST /users`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub password: SecretString,
}

/// Backend acknowledgement of a registration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterReply {
    pub message: String,
}
