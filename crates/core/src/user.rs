//! Directory member record and the identity contract the client core needs.

use serde::{Deserialize, Serialize};

/// Anything the pagination core can accumulate.
///
/// The core only ever asks for a stable identifier (used as a list key);
/// every other field is opaque to it.
pub trait Record {
    fn record_id(&self) -> &str;
}

/// A single member of the directory.
///
/// Field names on the wire stay snake_case to match the listing API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier, e.g. `user-17`.
    pub id: String,
    /// Avatar image URL.
    pub avatar: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub nationality: String,
    /// Distinct hobbies, possibly empty.
    #[serde(default)]
    pub hobbies: Vec<String>,
}

impl User {
    /// `"{first_name} {last_name}"`, the text the name search runs against.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn has_hobby(&self, hobby: &str) -> bool {
        self.hobbies.iter().any(|h| h == hobby)
    }
}

impl Record for User {
    fn record_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User {
            id: "user-1".into(),
            avatar: "https://picsum.photos/seed/1/200".into(),
            first_name: "Mary".into(),
            last_name: "Johnson".into(),
            age: 31,
            nationality: "Swedish".into(),
            hobbies: vec!["Chess".into(), "Yoga".into()],
        }
    }

    #[test]
    fn full_name_joins_with_single_space() {
        assert_eq!(sample().full_name(), "Mary Johnson");
    }

    #[test]
    fn record_id_is_the_user_id() {
        assert_eq!(sample().record_id(), "user-1");
    }

    #[test]
    fn hobbies_default_to_empty_when_missing() {
        let json = r#"{"id":"user-9","avatar":"a","first_name":"A","last_name":"B","age":20,"nationality":"Dutch"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.hobbies.is_empty());
        assert!(!user.has_hobby("Chess"));
    }
}
