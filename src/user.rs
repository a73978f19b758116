use crate::error::ParseError;

/// A Steam profile identifier as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserId {
    /// 64-bit SteamID, e.g. `76561197960435530`.
    Numeric(String),
    /// Custom profile URL name, e.g. `gabelogicalfan`.
    Vanity(String),
}

impl UserId {
    /// Digits only selects a SteamID. Anything else must be a valid custom
    /// URL name, since it is pasted into the profile path as is.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ParseError::InvalidUserId(raw.to_string()));
        }
        if raw.chars().all(|c| c.is_ascii_digit()) {
            return Ok(Self::Numeric(raw.to_string()));
        }
        if raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            Ok(Self::Vanity(raw.to_string()))
        } else {
            Err(ParseError::InvalidUserId(raw.to_string()))
        }
    }

    /// Path segment used by steamcommunity.com for this kind of id.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Numeric(_) => "profiles",
            Self::Vanity(_) => "id",
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Numeric(id) | Self::Vanity(id) => id,
        }
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_select_numeric_profile() {
        let id = UserId::parse("76561197960435530").unwrap();
        assert_eq!(id, UserId::Numeric("76561197960435530".to_string()));
        assert_eq!(id.kind(), "profiles");
    }

    #[test]
    fn names_select_vanity_profile() {
        for raw in ["gabelogicalfan", "gaben2004", "7656x", "the_real-gabe"] {
            let id = UserId::parse(raw).unwrap();
            assert_eq!(id.kind(), "id", "{raw:?}");
        }
    }

    #[test]
    fn rejects_names_that_would_break_the_path() {
        for raw in ["", "a b", "x/y?tab=", "../profiles/1", "caf\u{e9}"] {
            assert!(
                matches!(UserId::parse(raw), Err(ParseError::InvalidUserId(_))),
                "{raw:?}"
            );
        }
    }
}
