//! In-memory movie store
//!
//! One ordered `Vec<Movie>` behind a single `RwLock`. Reads share the lock,
//! mutations take it exclusively, so every operation is atomic with respect
//! to every other. Lookups are a linear scan by id (O(n)); the first match
//! wins. Insertion order is the order `list` and `delete` report.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use tokio::sync::RwLock;

use crate::config::IdStrategy;
use crate::error::{RegistryError, Result};
use crate::model::{Movie, MovieInput};

/// Upper bound (exclusive) of randomly assigned ids
pub const RANDOM_ID_BOUND: u64 = 100_000_000;

pub struct MovieStore {
    movies: RwLock<Vec<Movie>>,
    id_strategy: IdStrategy,
    /// Next candidate for `IdStrategy::Sequential`
    next_id: AtomicU64,
}

impl MovieStore {
    pub fn new(initial: Vec<Movie>, id_strategy: IdStrategy) -> Self {
        let next_id = initial
            .iter()
            .filter_map(|m| m.id.parse::<u64>().ok())
            .max()
            .map_or(1, |max| max + 1);

        Self {
            movies: RwLock::new(initial),
            id_strategy,
            next_id: AtomicU64::new(next_id),
        }
    }

    /// Snapshot of every movie in insertion order
    pub async fn list(&self) -> Vec<Movie> {
        self.movies.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.movies.read().await.len()
    }

    pub async fn get(&self, id: &str) -> Result<Movie> {
        self.movies
            .read()
            .await
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Assign a fresh id and append the movie to the tail
    pub async fn create(&self, input: MovieInput) -> Movie {
        let mut movies = self.movies.write().await;
        let id = self.assign_id(&movies);
        let movie = input.into_movie(id);
        movies.push(movie.clone());
        movie
    }

    /// Replace the first movie with `id`, moving it to the tail
    ///
    /// The store is left untouched when no movie matches.
    pub async fn update(&self, id: &str, input: MovieInput) -> Result<Movie> {
        let mut movies = self.movies.write().await;
        let index = movies
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;

        movies.remove(index);
        let movie = input.into_movie(id.to_string());
        movies.push(movie.clone());
        Ok(movie)
    }

    /// Remove the first movie with `id` and return what remains
    ///
    /// A missing id is not an error; the unchanged list is returned.
    pub async fn delete(&self, id: &str) -> Vec<Movie> {
        let mut movies = self.movies.write().await;
        if let Some(index) = movies.iter().position(|m| m.id == id) {
            movies.remove(index);
        }
        movies.clone()
    }

    /// Draw ids until one is not already in use. Caller holds the write lock.
    fn assign_id(&self, movies: &[Movie]) -> String {
        loop {
            let candidate = match self.id_strategy {
                IdStrategy::Random => rand::rng().random_range(0..RANDOM_ID_BOUND),
                IdStrategy::Sequential => self.next_id.fetch_add(1, Ordering::Relaxed),
            }
            .to_string();

            if !movies.iter().any(|m| m.id == candidate) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{seed_movies, Director};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn input(isbn: &str, title: &str) -> MovieInput {
        MovieInput {
            isbn: isbn.to_string(),
            title: title.to_string(),
            director: Some(Director::new("Ada", "Lovelace")),
        }
    }

    fn ids(movies: &[Movie]) -> Vec<&str> {
        movies.iter().map(|m| m.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_returns_seed_in_order() {
        let store = MovieStore::new(seed_movies(), IdStrategy::Random);
        assert_eq!(store.list().await, seed_movies());
    }

    #[tokio::test]
    async fn test_random_id_in_range() {
        let store = MovieStore::new(seed_movies(), IdStrategy::Random);
        for _ in 0..50 {
            let movie = store.create(input("1", "t")).await;
            let value: u64 = movie.id.parse().unwrap();
            assert!(value < RANDOM_ID_BOUND);
            assert_eq!(movie.id, value.to_string());
        }
    }

    #[tokio::test]
    async fn test_sequential_ids_start_above_seed() {
        let store = MovieStore::new(seed_movies(), IdStrategy::Sequential);
        assert_eq!(store.create(input("1", "a")).await.id, "3");
        assert_eq!(store.create(input("2", "b")).await.id, "4");
    }

    #[tokio::test]
    async fn test_sequential_ignores_non_numeric_ids() {
        let mut seeds = seed_movies();
        seeds[0].id = "abc".to_string();
        seeds.push(input("x", "x").into_movie("7".to_string()));
        let store = MovieStore::new(seeds, IdStrategy::Sequential);
        assert_eq!(store.create(input("1", "a")).await.id, "8");

        let store = MovieStore::new(Vec::new(), IdStrategy::Sequential);
        assert_eq!(store.create(input("1", "a")).await.id, "1");
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let store = MovieStore::new(seed_movies(), IdStrategy::Random);
        let created = store.create(input("9780", "Heat")).await;
        assert_eq!(store.get(&created.id).await.unwrap(), created);
        assert_eq!(store.list().await.last(), Some(&created));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = MovieStore::new(seed_movies(), IdStrategy::Random);
        assert!(matches!(
            store.get("nope").await,
            Err(RegistryError::NotFound(id)) if id == "nope"
        ));
    }

    #[tokio::test]
    async fn test_update_moves_to_tail() {
        let store = MovieStore::new(seed_movies(), IdStrategy::Random);
        let updated = store.update("1", input("111", "Renamed")).await.unwrap();
        assert_eq!(updated.id, "1");
        assert_eq!(updated.title, "Renamed");

        let movies = store.list().await;
        assert_eq!(ids(&movies), vec!["2", "1"]);
        assert_eq!(movies[1], updated);
    }

    #[tokio::test]
    async fn test_update_missing_leaves_store() {
        let store = MovieStore::new(seed_movies(), IdStrategy::Random);
        assert!(store.update("77", input("1", "t")).await.is_err());
        assert_eq!(store.list().await, seed_movies());
    }

    #[tokio::test]
    async fn test_delete_existing_preserves_order() {
        let store = MovieStore::new(seed_movies(), IdStrategy::Sequential);
        let third = store.create(input("3", "Three")).await;
        let remaining = store.delete("2").await;
        assert_eq!(ids(&remaining), vec!["1", third.id.as_str()]);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let store = MovieStore::new(seed_movies(), IdStrategy::Random);
        assert_eq!(store.delete("404").await, seed_movies());
    }

    #[tokio::test]
    async fn test_delete_first_match_only() {
        let mut seeds = seed_movies();
        seeds[1].id = "1".to_string();
        let store = MovieStore::new(seeds, IdStrategy::Random);
        let remaining = store.delete("1").await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "Movie Two");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_keep_length() {
        let store = Arc::new(MovieStore::new(seed_movies(), IdStrategy::Random));
        let initial = store.len().await;

        let tasks: Vec<_> = (0..200)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.create(input(&i.to_string(), "c")).await })
            })
            .collect();

        let mut created = Vec::new();
        for task in tasks {
            created.push(task.await.unwrap());
        }

        assert_eq!(store.len().await, initial + created.len());
        let unique: HashSet<String> = store.list().await.into_iter().map(|m| m.id).collect();
        assert_eq!(unique.len(), initial + created.len());
    }
}
