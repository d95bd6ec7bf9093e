/// Characters that count towards the "special character" class.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*()-_=+[]{}|;:',.<>?/~`";

/// Report whether a password mixes all four character classes.
///
/// A strong password has at least one ASCII uppercase letter, one ASCII
/// lowercase letter, one ASCII digit and one character from
/// [`SPECIAL_CHARACTERS`]. The scan stops as soon as all four are seen.
pub fn is_strong(password: &str) -> bool {
    let mut has_upper = false;
    let mut has_lower = false;
    let mut has_digit = false;
    let mut has_special = false;

    for c in password.chars() {
        has_upper |= c.is_ascii_uppercase();
        has_lower |= c.is_ascii_lowercase();
        has_digit |= c.is_ascii_digit();
        has_special |= SPECIAL_CHARACTERS.contains(c);

        if has_upper && has_lower && has_digit && has_special {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_password() {
        assert!(is_strong("Password1!"));
        assert!(is_strong("a`B9"));
        assert!(is_strong("Zz0~ trailing ignored"));
    }

    #[test]
    fn test_missing_class_is_weak() {
        assert!(!is_strong("password1!")); // no uppercase
        assert!(!is_strong("PASSWORD1!")); // no lowercase
        assert!(!is_strong("Password!!")); // no digit
        assert!(!is_strong("Password11")); // no special
        assert!(!is_strong(""));
    }

    #[test]
    fn test_unlisted_symbols_are_not_special() {
        assert!(!is_strong("Password1 "));
        assert!(!is_strong("Password1\""));
        assert!(!is_strong("Password1é"));
    }
}
