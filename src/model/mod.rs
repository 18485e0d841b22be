//! The subscription `Record`, the only entity this service stores.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::web::types::SubscriberEmail;

/// A single subscription. Records are never updated or deleted,
/// the same email may own any number of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Record {
    /// Partition key.
    pub email: String,
    #[serde(rename = "subscriptionDate", with = "iso_millis")]
    pub subscription_date: DateTime<Utc>,
    /// `{email}_{subscriptionDate}`
    pub id: String,
}

impl Record {
    /// Creates a record stamped with the current UTC time.
    pub fn new(email: &SubscriberEmail) -> Self {
        Self::with_timestamp(email, Utc::now())
    }

    /// Creates a record for `subscription_date` truncated to millisecond precision,
    /// the precision of the serialized timestamp and therefore of the id.
    pub fn with_timestamp(email: &SubscriberEmail, subscription_date: DateTime<Utc>) -> Self {
        let email = email.as_ref().to_string();
        let subscription_date = subscription_date.trunc_subsecs(3);
        let id = format!("{email}_{}", format_timestamp(&subscription_date));

        Record {
            email,
            subscription_date,
            id,
        }
    }
}

/// ISO-8601 in UTC with milliseconds, e.g. `2024-03-01T09:15:02.317Z`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_timestamp(timestamp))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}
