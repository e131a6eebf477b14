//! In-memory `PostsApi` used by the unit tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::api::PostsApi;
use crate::models::{Field, NewPost, PostRecord};
use crate::query::Query;

pub fn post(id: i64, company: &str, position: &str) -> PostRecord {
    PostRecord {
        id,
        company: Some(company.to_string()),
        position: Some(position.to_string()),
        create_date: Some("2024-03-01T10:00:00Z".to_string()),
        interview_date: None,
        views: Some(id * 3),
        status: Some("applied".to_string()),
        notes: None,
        extra: serde_json::Map::new(),
    }
}

#[derive(Default)]
pub struct FakeApi {
    candidates: HashMap<Field, Vec<String>>,
    posts: Vec<PostRecord>,
    candidate_failures: Mutex<u32>,
    post_failures: Mutex<u32>,
    pub candidate_calls: Mutex<Vec<Field>>,
    pub queries: Mutex<Vec<Query>>,
    pub created: Mutex<Vec<(NewPost, String)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidates(mut self, field: Field, values: &[&str]) -> Self {
        self.candidates
            .insert(field, values.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_posts(mut self, posts: Vec<PostRecord>) -> Self {
        self.posts = posts;
        self
    }

    /// The next `n` candidate fetches fail.
    pub fn failing_candidates(self, n: u32) -> Self {
        *self.candidate_failures.lock().unwrap() = n;
        self
    }

    /// The next `n` post listings fail.
    pub fn failing_posts(self, n: u32) -> Self {
        *self.post_failures.lock().unwrap() = n;
        self
    }

    pub fn candidate_call_count(&self) -> usize {
        self.candidate_calls.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<Query> {
        self.queries.lock().unwrap().clone()
    }

    fn take_failure(counter: &Mutex<u32>) -> bool {
        let mut left = counter.lock().unwrap();
        if *left > 0 {
            *left -= 1;
            true
        } else {
            false
        }
    }
}

#[async_trait]
impl PostsApi for FakeApi {
    async fn candidates(&self, field: Field) -> Result<Vec<String>> {
        self.candidate_calls.lock().unwrap().push(field);
        if Self::take_failure(&self.candidate_failures) {
            return Err(anyhow!("network down"));
        }
        Ok(self.candidates.get(&field).cloned().unwrap_or_default())
    }

    async fn list_posts(&self, query: &Query) -> Result<Vec<PostRecord>> {
        self.queries.lock().unwrap().push(query.clone());
        if Self::take_failure(&self.post_failures) {
            return Err(anyhow!("network down"));
        }
        Ok(self.posts.clone())
    }

    async fn create_post(&self, new_post: &NewPost, token: &str) -> Result<PostRecord> {
        self.created
            .lock()
            .unwrap()
            .push((new_post.clone(), token.to_string()));
        Ok(post(99, &new_post.company, &new_post.position))
    }
}
