//! Contact field types used on orders: email address and phone number.
//!
//! Both are validated at construction so that a value of either type is
//! always structurally sound. Validation is deliberately shallow - enough
//! to catch obviously broken input without rejecting unusual but real
//! addresses or numbers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string exceeds the RFC 5321 length limit.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input is missing an @ symbol, or has an empty local part
    /// or domain around it.
    #[error("email must look like local@domain")]
    Malformed,
}

/// A structurally valid email address.
///
/// ## Examples
///
/// ```
/// use paperbark_core::Email;
///
/// assert!(Email::parse("user@example.com").is_ok());
/// assert!(Email::parse("user.name+tag@domain.co.uk").is_ok());
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("@domain.com").is_err());
/// assert!(Email::parse("user@").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 254 characters,
    /// or not of the form `local@domain` with both parts non-empty.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        match s.find('@') {
            Some(at) if at > 0 && at < s.len() - 1 => Ok(Self(s.to_owned())),
            _ => Err(EmailError::Malformed),
        }
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input string is outside the accepted length range.
    #[error("phone number must be between {min} and {max} characters")]
    BadLength {
        /// Minimum allowed length.
        min: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside the accepted set.
    #[error("phone number may only contain digits, spaces, and + - ( )")]
    InvalidCharacter,
    /// The input does not contain enough digits to be dialable.
    #[error("phone number must contain at least {min} digits")]
    TooFewDigits {
        /// Minimum number of digits.
        min: usize,
    },
}

/// A phone number for order contact purposes.
///
/// Accepts international formats like `+7 (912) 345-67-89`; the only
/// requirements are a sane length, a restricted character set, and at
/// least seven digits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    /// Minimum total length.
    pub const MIN_LENGTH: usize = 7;
    /// Maximum total length.
    pub const MAX_LENGTH: usize = 20;
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 7;

    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, outside the 7-20 character
    /// range, contains characters other than digits, spaces, and `+ - ( )`,
    /// or has fewer than seven digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }
        if s.len() < Self::MIN_LENGTH || s.len() > Self::MAX_LENGTH {
            return Err(PhoneError::BadLength {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
            });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
        {
            return Err(PhoneError::InvalidCharacter);
        }
        if s.chars().filter(char::is_ascii_digit).count() < Self::MIN_DIGITS {
            return Err(PhoneError::TooFewDigits {
                min: Self::MIN_DIGITS,
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_emails() {
        for input in ["user@example.com", "a@b", "first.last+tag@shop.co.uk"] {
            assert!(Email::parse(input).is_ok(), "{input} should parse");
        }
    }

    #[test]
    fn rejects_malformed_emails() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
        assert_eq!(Email::parse("no-at"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("@domain"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("local@"), Err(EmailError::Malformed));

        let long = format!("{}@x.com", "a".repeat(260));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn accepts_common_phone_formats() {
        for input in ["+7 (912) 345-67-89", "79123456789", "555-867-5309"] {
            assert!(Phone::parse(input).is_ok(), "{input} should parse");
        }
    }

    #[test]
    fn rejects_bad_phones() {
        assert_eq!(Phone::parse(""), Err(PhoneError::Empty));
        assert!(matches!(
            Phone::parse("12345"),
            Err(PhoneError::BadLength { .. })
        ));
        assert_eq!(
            Phone::parse("555-CALL-NOW"),
            Err(PhoneError::InvalidCharacter)
        );
        assert!(matches!(
            Phone::parse("+1 (23) 4-5"),
            Err(PhoneError::TooFewDigits { .. })
        ));
    }
}
