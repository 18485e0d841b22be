//! Request payloads of the `web` module and the parsing that turns them into validated values.

use derive_more::Display;
use lazy_regex::regex_is_match;
use serde::Deserialize;

// ###################################
// ->   STRUCTS
// ###################################
/// Body of a subscription request. Every field is optional here,
/// presence is checked while parsing so a missing email is a validation error
/// instead of a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: Option<String>,
}

impl SubscribeRequest {
    /// Parses a raw request body into a validated email.
    pub fn parse_body(body: &[u8]) -> Result<SubscriberEmail, DataParsingError> {
        let request: SubscribeRequest = serde_json::from_slice(body)
            .map_err(|er| DataParsingError::MalformedBody(er.to_string()))?;
        let email = request.email.ok_or(DataParsingError::EmailMissing)?;

        SubscriberEmail::parse(email)
    }
}

/// Query string of a lookup request.
#[derive(Debug, Default, Deserialize)]
pub struct LookupQuery {
    pub email: Option<String>,
}

impl LookupQuery {
    /// The email to look up, as-is. No format validation, only presence.
    pub fn email(&self) -> Result<&str, DataParsingError> {
        match self.email.as_deref() {
            Some(email) if !email.is_empty() => Ok(email),
            _ => Err(DataParsingError::EmailParamMissing),
        }
    }
}

/// Validated Subscriber Email
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub struct SubscriberEmail(String);

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SubscriberEmail {
    /// A syntactic sanity check: `local@domain.tld` with exactly one `@`,
    /// no whitespace and at least one `.` in the part after the `@`.
    /// The byte order mark (U+FEFF) counts as whitespace.
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();

        if value.is_empty() {
            return Err(DataParsingError::EmailMissing);
        }

        if regex_is_match!(
            r"^[^\s\x{FEFF}@]+@[^\s\x{FEFF}@]+\.[^\s\x{FEFF}@]+$",
            value
        ) {
            Ok(SubscriberEmail(value.to_owned()))
        } else {
            Err(DataParsingError::EmailInvalid)
        }
    }
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("request body could not be read: {0}")]
    UnreadableBody(String),
    #[error("request body is not valid json: {0}")]
    MalformedBody(String),
    #[error("email missing")]
    EmailMissing,
    #[error("email invalid")]
    EmailInvalid,

    #[error("email query parameter missing")]
    EmailParamMissing,
}
