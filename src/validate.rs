//! Client-side input checks.
//!
//! Everything here runs before a request is built; a failure is a
//! `Validation` error and nothing reaches the wire.

use crate::api::ApiError;

/// Minimum accepted password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Check the shape of an XRP Ledger classic address: a leading `r`
/// followed by 24-34 alphanumeric characters. Existence on the ledger is
/// the backend's problem.
pub fn wallet_address(address: &str) -> Result<(), ApiError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(ApiError::Validation("Address is required".to_string()));
    }
    let mut chars = address.chars();
    let shape_ok = chars.next() == Some('r')
        && (25..=35).contains(&address.len())
        && chars.all(|c| c.is_ascii_alphanumeric());
    if !shape_ok {
        return Err(ApiError::Validation(
            "Invalid XRP Ledger address format".to_string(),
        ));
    }
    Ok(())
}

pub fn wallet_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation("Wallet name is required".to_string()));
    }
    Ok(())
}

/// Plausibility check only: one `@`, non-empty local part, a dot in the
/// domain. The backend does the real verification.
pub fn email(email: &str) -> Result<(), ApiError> {
    let email = email.trim();
    let plausible = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !plausible {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }
    Ok(())
}

pub fn password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

pub fn password_confirmation(password: &str, confirmation: &str) -> Result<(), ApiError> {
    if password != confirmation {
        return Err(ApiError::Validation("Passwords do not match".to_string()));
    }
    Ok(())
}
