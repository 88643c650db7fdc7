use crate::{FieldError, InboundUser};

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn is_valid_username(name: &str) -> bool {
    let name = name.trim();
    if name.is_empty() || name.len() > 64 {
        return false;
    }

    name.chars().all(|c| !c.is_control() && !c.is_whitespace())
}

/// Field-level checks for a registration form. An empty result means the form is valid.
pub fn validate_registration(inbound: &InboundUser) -> Vec<FieldError> {
    let mut fields = Vec::new();

    if !is_valid_username(&inbound.username) {
        fields.push(FieldError::new("username", "Username is required"));
    }
    if inbound.password.chars().count() < MIN_PASSWORD_LEN {
        fields.push(FieldError::new(
            "password",
            "Password must be at least 8 characters",
        ));
    }
    if inbound.full_name.trim().chars().count() < 2 {
        fields.push(FieldError::new("fullName", "Full name is required"));
    }
    if inbound.date_of_birth.trim().is_empty() {
        fields.push(FieldError::new("dateOfBirth", "Date of birth is required"));
    }
    if inbound.nationality.trim().is_empty() {
        fields.push(FieldError::new("nationality", "Nationality is required"));
    }
    if inbound.languages.iter().all(|l| l.trim().is_empty()) {
        fields.push(FieldError::new(
            "languages",
            "At least one language is required",
        ));
    }

    fields
}

/// Escape text for interpolation into HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
