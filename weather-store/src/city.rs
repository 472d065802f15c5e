use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A city as typed by the user, compared case-insensitively.
///
/// Keeps the trimmed display form for the UI; equality, hashing and
/// ordering use the lowercased key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CityName {
    display: String,
    key: String,
}

impl CityName {
    pub fn new(name: impl AsRef<str>) -> Self {
        let display = name.as_ref().trim().to_string();
        let key = display.to_lowercase();
        Self { display, key }
    }

    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Lowercased form used for storage keys
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl PartialEq for CityName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CityName {}

impl Hash for CityName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for CityName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CityName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for CityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl From<&str> for CityName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CityName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<CityName> for String {
    fn from(city: CityName) -> Self {
        city.display
    }
}
