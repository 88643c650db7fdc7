use std::collections::BTreeSet;

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::{AppError, RegistrationError, validate_registration};

#[derive(Clone, Debug)]
pub struct User {
    pub id: u64,
    pub username: String,
    /// Argon2 PHC string.
    pub password: String,
    pub is_admin: bool,
    pub full_name: String,
    pub date_of_birth: String,
    pub nationality: String,
    pub languages: BTreeSet<String>,
}

/// A validated user awaiting an id from the store.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub is_admin: bool,
    pub full_name: String,
    pub date_of_birth: String,
    pub nationality: String,
    pub languages: BTreeSet<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InboundUser {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub date_of_birth: String,
    pub nationality: String,
    pub languages: Vec<String>,
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::ArgonError(e.to_string()))
}

impl TryFrom<InboundUser> for NewUser {
    type Error = RegistrationError;

    fn try_from(inbound: InboundUser) -> Result<Self, RegistrationError> {
        let fields = validate_registration(&inbound);
        if !fields.is_empty() {
            return Err(RegistrationError::Invalid(fields));
        }

        let password = hash_password(&inbound.password)?;

        Ok(Self {
            username: inbound.username.trim().to_string(),
            password,
            is_admin: false,
            full_name: inbound.full_name.trim().to_string(),
            date_of_birth: inbound.date_of_birth.trim().to_string(),
            nationality: inbound.nationality.trim().to_string(),
            languages: inbound
                .languages
                .iter()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
        })
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundUser {
    pub id: u64,
    pub username: String,
    pub is_admin: bool,
    pub full_name: String,
    pub date_of_birth: String,
    pub nationality: String,
    pub languages: BTreeSet<String>,
}

impl From<User> for OutboundUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_admin: user.is_admin,
            full_name: user.full_name,
            date_of_birth: user.date_of_birth,
            nationality: user.nationality,
            languages: user.languages,
        }
    }
}
