//! Defines the token struct used in the auth cookies and how to serialize/deserialize a token.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::user::UserID;

mod datetime_format {
    //! Specifies how to serialize a [time::OffsetDateTime] in a custom format that
    //! avoids serialisations with datetimes containing midnight.
    //!
    //! The default serializer for [time::OffsetDateTime] will serialize
    //! "00:00:00.000000" as "0:00:00.0" and the deserializer would error out
    //! because it expects the hours to be two digits, not one.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// Date time format for the token expiry, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
    const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = dt.format(DATE_TIME_FORMAT).map_err(serde::ser::Error::custom)?;

        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let string = String::deserialize(deserializer)?;

        OffsetDateTime::parse(&string, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// A token that identifies a logged in user and when their session ends.
///
/// Tokens are stored in a private (encrypted and signed) cookie, so the
/// client cannot read or forge them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The ID of the logged in user.
    pub user_id: UserID,
    /// When the session expires.
    #[serde(with = "datetime_format")]
    pub expires_at: OffsetDateTime,
}

#[cfg(test)]
mod token_tests {
    use time::{OffsetDateTime, UtcOffset, macros::datetime};

    use crate::user::UserID;

    use super::Token;

    #[test]
    fn token_roundtrips_through_json() {
        let token = Token {
            user_id: UserID::new(42),
            expires_at: OffsetDateTime::now_utc(),
        };

        let json = serde_json::to_string(&token).unwrap();
        let parsed: Token = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, token);
    }

    #[test]
    fn token_roundtrips_at_midnight() {
        let token = Token {
            user_id: UserID::new(1),
            expires_at: datetime!(2021-01-01 00:00:00).assume_offset(UtcOffset::UTC),
        };

        let json = serde_json::to_string(&token).unwrap();
        let parsed: Token = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, token);
    }
}
