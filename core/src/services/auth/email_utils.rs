//! Email helpers for lookups and log output

/// Trim and lowercase an email for lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Mask an email for logs: keeps the first character of the local part and the domain.
///
/// # Examples
///
/// ```
/// use ts_core::services::auth::mask_email;
/// assert_eq!(mask_email("alice@example.com"), "a****@example.com");
/// ```
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{}{}@{}", first, "*".repeat(local.chars().count().saturating_sub(1)), domain)
        }
        _ => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("bob@example.com"), "b**@example.com");
        assert_eq!(mask_email("x@y.z"), "x@y.z");
        assert_eq!(mask_email("not-an-email"), "***");
        assert_eq!(mask_email("@example.com"), "***");
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }
}
