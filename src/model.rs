// Movie data model
// Wire types shared by the store and the HTTP handlers

use serde::{Deserialize, Serialize};

/// A movie record as stored and returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    pub isbn: String,
    pub title: String,
    /// Serialized as `null` when absent
    pub director: Option<Director>,
}

/// Director embedded in a movie; has no identity of its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Director {
    pub firstname: String,
    pub lastname: String,
}

/// Request body accepted by create and update
///
/// Every field is optional on the wire. An `id` in the body is not part of
/// this type and is therefore ignored, as are unknown fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MovieInput {
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub director: Option<Director>,
}

impl MovieInput {
    /// Build a stored record from this input under the given id
    pub fn into_movie(self, id: String) -> Movie {
        Movie {
            id,
            isbn: self.isbn,
            title: self.title,
            director: self.director,
        }
    }
}

impl Director {
    pub fn new(firstname: &str, lastname: &str) -> Self {
        Self {
            firstname: firstname.to_string(),
            lastname: lastname.to_string(),
        }
    }
}

/// The two records every freshly seeded store starts with
pub fn seed_movies() -> Vec<Movie> {
    vec![
        Movie {
            id: "1".to_string(),
            isbn: "438227".to_string(),
            title: "Movie One".to_string(),
            director: Some(Director::new("John", "Doe")),
        },
        Movie {
            id: "2".to_string(),
            isbn: "45455".to_string(),
            title: "Movie Two".to_string(),
            director: Some(Director::new("Steve", "Smith")),
        },
    ]
}
