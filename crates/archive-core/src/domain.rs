//! Domain resources backed by graph nodes.

use serde::{Deserialize, Serialize};

// ── Users ────────────────────────────────────────────────────────

/// Authorization role stored on a user node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Contributor,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Contributor => "contributor",
        }
    }
}

/// Name parts shared by users and persons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonName {
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub second_name: String,
}

impl PersonName {
    pub fn new(
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        second_name: impl Into<String>,
    ) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: first_name.into(),
            second_name: second_name.into(),
        }
    }
}

/// A registered account. The password hash never appears here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub second_name: String,
    pub auth: Role,
}

/// Input for creating a user. The hash is computed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: PersonName,
    pub auth: Role,
    pub pwd_hash: String,
}

/// A user together with its stored password hash, for the external
/// password checker.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: User,
    pub pwd_hash: String,
}

// ── Archive Resources ────────────────────────────────────────────

/// A historical person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub second_name: String,
}

/// Level of a location in the `COUNTRY > STATE > CITY` hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LocationKind {
    Country,
    State,
    City,
}

impl LocationKind {
    /// Node label for this level.
    pub fn label(self) -> &'static str {
        match self {
            Self::Country => "COUNTRY",
            Self::State => "STATE",
            Self::City => "CITY",
        }
    }

    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Option<Self> {
        labels.iter().find_map(|l| match l.as_ref() {
            "COUNTRY" => Some(Self::Country),
            "STATE" => Some(Self::State),
            "CITY" => Some(Self::City),
            _ => None,
        })
    }

    /// The level directly above this one.
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::Country => None,
            Self::State => Some(Self::Country),
            Self::City => Some(Self::State),
        }
    }
}

/// A named place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub kind: LocationKind,
    pub id: String,
    pub name: String,
}
