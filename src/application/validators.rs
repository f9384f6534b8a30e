use validator::ValidateEmail;

/// Validates that the input looks like a `local-part@domain.tld` address.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email() && has_alphabetic_tld(email)
}

// The validator crate accepts dotless hosts such as `user@localhost`, which
// can never receive a waitlist welcome email.
fn has_alphabetic_tld(email: &str) -> bool {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}
