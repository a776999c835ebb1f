//! Small text helpers for display names.

/// Two-letter initials for an avatar badge.
///
/// Multi-word names take the first letter of the first two words; a single
/// word takes its first two letters.
///
/// ```
/// use luxe_jewel_core::initials;
///
/// assert_eq!(initials("John Doe"), "JD");
/// assert_eq!(initials("Jane"), "JA");
/// ```
#[must_use]
pub fn initials(name: &str) -> String {
    let mut words = name.split_whitespace();
    match (words.next(), words.next()) {
        (Some(first), Some(second)) => first
            .chars()
            .take(1)
            .chain(second.chars().take(1))
            .flat_map(char::to_uppercase)
            .collect(),
        (Some(only), None) => only.chars().take(2).flat_map(char::to_uppercase).collect(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initials() {
        assert_eq!(initials("John Doe"), "JD");
        assert_eq!(initials("Jane"), "JA");
        assert_eq!(initials("Alice Bob Charlie"), "AB");
        assert_eq!(initials(""), "");
        assert_eq!(initials("   "), "");
        assert_eq!(initials("élodie martin"), "ÉM");
    }
}
