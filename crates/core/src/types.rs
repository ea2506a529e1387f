use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// How the signed-in user takes part in a drop-in, as encoded on the wire (`0`/`1`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "u8", into = "u8")]
pub enum RegistrationType {
    Student,
    Advisor,
}

impl From<RegistrationType> for u8 {
    fn from(value: RegistrationType) -> Self {
        match value {
            RegistrationType::Student => 0,
            RegistrationType::Advisor => 1,
        }
    }
}

impl TryFrom<u8> for RegistrationType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Student),
            1 => Ok(Self::Advisor),
            other => Err(format!("unknown registration type {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicProfile {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub pronouns: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub github_avatar: Option<String>,
}

/// A drop-in advising session as shown in the feed and on the detail view.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DropIn {
    pub id: Option<i64>,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: String,
    pub description: String,
    pub public: bool,
    pub number_registered: i32,
    pub registration_limit: i32,
    pub advisor_id: Option<i64>,
    pub advisor_slug: String,
    pub advisor_name: String,
    pub organizers: Vec<PublicProfile>,
    pub user_registration_type: Option<RegistrationType>,
    pub image_url: Option<String>,
    pub override_registration_url: Option<String>,
}

impl DropIn {
    pub fn is_registered(&self) -> bool {
        self.user_registration_type.is_some()
    }

    /// A limit of zero means the session takes walk-ins without a cap.
    pub fn seats_remaining(&self) -> Option<i32> {
        if self.registration_limit <= 0 {
            return None;
        }
        Some((self.registration_limit - self.number_registered).max(0))
    }

    pub fn is_full(&self) -> bool {
        self.seats_remaining() == Some(0)
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.end <= now
    }

    pub fn is_ongoing(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now < self.end
    }
}

/// Wire shape of a drop-in. Timestamps stay strings until `parse_drop_in`
/// converts them; the calendar-synced backend names some fields differently.
#[derive(Debug, Deserialize)]
struct DropInJson {
    #[serde(default)]
    id: Option<i64>,
    #[serde(alias = "title")]
    name: String,
    start: String,
    end: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_public")]
    public: bool,
    #[serde(default)]
    number_registered: i32,
    #[serde(default)]
    registration_limit: i32,
    #[serde(default)]
    advisor_id: Option<i64>,
    #[serde(default)]
    advisor_slug: String,
    #[serde(default)]
    advisor_name: String,
    #[serde(default)]
    organizers: Vec<PublicProfile>,
    #[serde(default)]
    user_registration_type: Option<RegistrationType>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default, alias = "link")]
    override_registration_url: Option<String>,
}

fn default_public() -> bool {
    true
}

/// Accepts RFC 3339 timestamps and offset-less ISO-8601, which is read as UTC.
pub fn parse_instant(field: &'static str, value: &str) -> Result<DateTime<Utc>, ParseError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| ParseError::Timestamp {
            field,
            value: value.to_string(),
        })
}

/// Default item parser for the drop-in feed and the single-event endpoint.
pub fn parse_drop_in(raw: serde_json::Value) -> Result<DropIn, ParseError> {
    let json: DropInJson = serde_json::from_value(raw)?;
    let start = parse_instant("start", &json.start)?;
    let end = parse_instant("end", &json.end)?;
    if end < start {
        return Err(ParseError::InvertedSchedule {
            start: json.start,
            end: json.end,
        });
    }

    Ok(DropIn {
        id: json.id,
        name: json.name,
        start,
        end,
        location: json.location,
        description: json.description,
        public: json.public,
        number_registered: json.number_registered,
        registration_limit: json.registration_limit,
        advisor_id: json.advisor_id,
        advisor_slug: json.advisor_slug,
        advisor_name: json.advisor_name,
        organizers: json.organizers,
        user_registration_type: json.user_registration_type,
        image_url: json.image_url,
        override_registration_url: json.override_registration_url,
    })
}

/// The signed-in user's featured drop-in and the ones they are registered for.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct DropInStatusOverview {
    pub featured: Option<DropIn>,
    pub registered: Vec<DropIn>,
}

impl DropInStatusOverview {
    pub fn is_registered_for(&self, event_id: i64) -> bool {
        self.registered.iter().any(|d| d.id == Some(event_id))
    }
}

#[derive(Debug, Deserialize)]
struct DropInStatusOverviewJson {
    #[serde(default)]
    featured: Option<serde_json::Value>,
    #[serde(default)]
    registered: Vec<serde_json::Value>,
}

/// Parses a status overview, running every drop-in through `parse_drop_in`.
pub fn parse_drop_in_status(raw: serde_json::Value) -> Result<DropInStatusOverview, ParseError> {
    let json: DropInStatusOverviewJson = serde_json::from_value(raw)?;
    let featured = json.featured.map(parse_drop_in).transpose()?;
    let registered = json
        .registered
        .into_iter()
        .map(parse_drop_in)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DropInStatusOverview {
        featured,
        registered,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub link: String,
}

/// One searchable section of an advising document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentSection {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub document_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentDetails {
    pub id: i64,
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub sections: Vec<DocumentSection>,
}

impl DocumentDetails {
    pub fn document(&self) -> Document {
        Document {
            id: self.id,
            title: self.title.clone(),
            link: self.link.clone(),
        }
    }
}
