//! Binary-level configuration not covered by `ts_shared::AppConfig`

use ts_core::domain::entities::user::User;
use ts_shared::ConfigError;

/// Variables describing the account seeded into the in-memory directory
pub const SEED_EMAIL_VAR: &str = "SEED_USER_EMAIL";
pub const SEED_PASSWORD_VAR: &str = "SEED_USER_PASSWORD";
pub const SEED_NAME_VAR: &str = "SEED_USER_NAME";

/// Accounts to seed the in-memory user directory with.
///
/// Empty when `SEED_USER_EMAIL` is unset. An email without a password is a
/// configuration error.
pub fn seed_users_from_env() -> Result<Vec<User>, ConfigError> {
    let email = match std::env::var(SEED_EMAIL_VAR) {
        Ok(email) if !email.trim().is_empty() => email.trim().to_lowercase(),
        _ => return Ok(Vec::new()),
    };

    let password = std::env::var(SEED_PASSWORD_VAR)
        .ok()
        .filter(|password| !password.is_empty())
        .ok_or_else(|| ConfigError::invalid(SEED_PASSWORD_VAR, "required when SEED_USER_EMAIL is set"))?;

    let display_name = std::env::var(SEED_NAME_VAR).unwrap_or_else(|_| email.clone());

    let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| ConfigError::invalid(SEED_PASSWORD_VAR, e.to_string()))?;

    Ok(vec![User::new(email, display_name, hash)])
}
