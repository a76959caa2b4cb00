//! Campus events, as the rest of the crate consumes them
//!
//! Raw feed records are turned into [`Event`]s at the boundary (see [`crate::record`]);
//! nothing downstream of that boundary ever sees an unvalidated shape.

use std::fmt::{Display, Formatter};

use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

/// The identity of an event, unique within a feed.
///
/// This is the upstream document id, kept as opaque text. Two fetches returning the
/// same id describe the same event, the later one winning.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId {
    content: String,
}

impl EventId {
    /// Generate a random EventId. Mostly useful to feed mocked sources
    pub fn random() -> Self {
        let random = uuid::Uuid::new_v4().to_hyphenated().to_string();
        Self { content: random }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }
}
impl From<String> for EventId {
    fn from(content: String) -> Self {
        Self { content }
    }
}
impl From<&str> for EventId {
    fn from(content: &str) -> Self {
        Self { content: content.to_string() }
    }
}
impl Display for EventId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}

/// Used to support serde
impl Serialize for EventId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.content)
    }
}
/// Used to support serde
impl<'de> Deserialize<'de> for EventId {
    fn deserialize<D>(deserializer: D) -> Result<EventId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let content = String::deserialize(deserializer)?;
        Ok(EventId { content })
    }
}


/// The category an event is filed under
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Academic,
    Arts,
    Career,
    Social,
    Sports,
    StudentOrgs,
    Wellness,
    Service,
    /// The upstream record carried no category, or one we do not know about
    Uncategorized,
}

impl Category {
    /// Parse one of the known category labels. Unknown labels yield `None`;
    /// see [`Category::from_raw`] for the lenient variant used at the fetch boundary
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "academic" => Some(Category::Academic),
            "arts" => Some(Category::Arts),
            "career" => Some(Category::Career),
            "social" => Some(Category::Social),
            "sports" => Some(Category::Sports),
            "student-orgs" => Some(Category::StudentOrgs),
            "wellness" => Some(Category::Wellness),
            "service" => Some(Category::Service),
            "uncategorized" => Some(Category::Uncategorized),
            _ => None,
        }
    }

    /// Coerce a raw upstream value. Absent or unrecognized values are filed as
    /// [`Category::Uncategorized`] rather than rejecting the record
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            None => Category::Uncategorized,
            Some(label) => match Self::from_label(label) {
                Some(category) => category,
                None => {
                    log::debug!("Unknown event category {:?}, filing as uncategorized", label);
                    Category::Uncategorized
                },
            },
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            Category::Academic => "academic",
            Category::Arts => "arts",
            Category::Career => "career",
            Category::Social => "social",
            Category::Sports => "sports",
            Category::StudentOrgs => "student-orgs",
            Category::Wellness => "wellness",
            Category::Service => "service",
            Category::Uncategorized => "uncategorized",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.as_label())
    }
}


bitflags! {
    /// Freebies an event advertises
    #[derive(Serialize, Deserialize)]
    pub struct Perks: u8 {
        /// Free food is advertised
        const FREE_FOOD = 1;
        /// Free boba is advertised
        const FREE_BOBA = 2;
    }
}

impl Default for Perks {
    fn default() -> Self {
        Perks::empty()
    }
}


/// A campus event.
///
/// Events are never mutated in place: a re-fetch that changes one (e.g. it got
/// rescheduled) replaces the cached value wholesale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The upstream document id
    id: EventId,
    /// The display title
    title: String,
    /// When the event takes place
    occurs_at: DateTime<Utc>,
    location: String,
    description: String,
    category: Category,
    perks: Perks,
    /// Where to register. Only present when the upstream value is an absolute http(s) URL
    rsvp: Option<Url>,
}

impl Event {
    /// Create an event with empty optional fields
    pub fn new<I: Into<EventId>, T: ToString>(id: I, title: T, occurs_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.to_string(),
            occurs_at,
            location: String::new(),
            description: String::new(),
            category: Category::Uncategorized,
            perks: Perks::empty(),
            rsvp: None,
        }
    }

    pub fn with_location<T: ToString>(mut self, location: T) -> Self {
        self.location = location.to_string();
        self
    }
    pub fn with_description<T: ToString>(mut self, description: T) -> Self {
        self.description = description.to_string();
        self
    }
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }
    pub fn with_perks(mut self, perks: Perks) -> Self {
        self.perks = perks;
        self
    }
    pub fn with_rsvp(mut self, rsvp: Url) -> Self {
        self.rsvp = Some(rsvp);
        self
    }

    pub fn id(&self) -> &EventId             { &self.id          }
    pub fn title(&self) -> &str              { &self.title       }
    pub fn occurs_at(&self) -> DateTime<Utc> { self.occurs_at    }
    pub fn location(&self) -> &str           { &self.location    }
    pub fn description(&self) -> &str        { &self.description }
    pub fn category(&self) -> Category       { self.category     }
    pub fn perks(&self) -> Perks             { self.perks        }
    pub fn rsvp(&self) -> Option<&Url>       { self.rsvp.as_ref() }

    pub fn has_free_food(&self) -> bool {
        self.perks.contains(Perks::FREE_FOOD)
    }
    pub fn has_free_boba(&self) -> bool {
        self.perks.contains(Perks::FREE_BOBA)
    }

    /// The sort key that defines the display order: chronological, ties broken by id
    /// so the order stays deterministic across re-derivations
    pub fn sort_key(&self) -> (DateTime<Utc>, &EventId) {
        (self.occurs_at, &self.id)
    }
}
