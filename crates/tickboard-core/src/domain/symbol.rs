use std::fmt::{Display, Formatter};

use crate::ValidationError;

/// Key of a list payload entry, kept byte-for-byte.
///
/// The backend only recognises the key it listed, so no trimming or case
/// folding happens here. Request paths percent-encode it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_key_verbatim() {
        for key in ["aapl", "^GSPC", "7203.T", "BTC_USD", " spaced "] {
            let symbol = Symbol::new(key).expect("non-empty key");
            assert_eq!(symbol.as_str(), key);
            assert_eq!(symbol.to_string(), key);
        }
    }

    #[test]
    fn rejects_only_the_empty_key() {
        assert_eq!(Symbol::new(""), Err(ValidationError::EmptySymbol));
        assert!(Symbol::new(" ").is_ok());
    }
}
