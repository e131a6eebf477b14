use anyhow::Result;

use crate::alert::{describe, Alerter, Severity};
use crate::api::PostsApi;
use crate::models::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Empty,
    Loading,
    Loaded,
}

/// Every known value for one filter field, fetched once and matched locally.
#[derive(Debug, Clone)]
pub struct SuggestionIndex {
    field: Field,
    candidates: Vec<String>,
    state: LoadState,
    generation: u64,
}

impl SuggestionIndex {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            candidates: Vec::new(),
            state: LoadState::Empty,
            generation: 0,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Marks a load as in flight and returns its generation, or `None` when
    /// nothing needs fetching.
    pub fn begin_load(&mut self) -> Option<u64> {
        if self.state != LoadState::Empty {
            return None;
        }
        self.generation += 1;
        self.state = LoadState::Loading;
        Some(self.generation)
    }

    /// Stores the result of load `generation`. Returns false when that load
    /// was superseded by `invalidate` and the result was ignored.
    pub fn finish_load(
        &mut self,
        generation: u64,
        result: Result<Vec<String>>,
        alerter: &dyn Alerter,
    ) -> bool {
        let current = self.state == LoadState::Loading && generation == self.generation;
        match result {
            Ok(candidates) if current => {
                tracing::debug!(field = %self.field, count = candidates.len(), "suggestions loaded");
                self.candidates = candidates;
                self.state = LoadState::Loaded;
            }
            Ok(_) => {
                tracing::debug!(
                    field = %self.field,
                    generation,
                    latest = self.generation,
                    "ignoring superseded suggestions"
                );
            }
            Err(err) => {
                if current {
                    self.state = LoadState::Empty;
                }
                alerter.alert(
                    Severity::Error,
                    &format!("could not get {}", self.field.plural()),
                    &describe(&err),
                    Some(&err),
                );
            }
        }
        current
    }

    /// Fetches the candidates unless they are already loaded.
    pub async fn ensure_loaded(&mut self, api: &dyn PostsApi, alerter: &dyn Alerter) {
        let Some(generation) = self.begin_load() else {
            return;
        };
        let result = api.candidates(self.field).await;
        self.finish_load(generation, result, alerter);
    }

    /// Drops the loaded list so the next `ensure_loaded` fetches again.
    /// A load still in flight is superseded.
    pub fn invalidate(&mut self) {
        self.candidates.clear();
        self.state = LoadState::Empty;
        self.generation += 1;
    }

    /// Case-insensitive substring match, in candidate order. A blank query matches nothing.
    pub fn matches(&self, query: &str) -> Vec<String> {
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.candidates
            .iter()
            .filter(|c| c.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMethod {
    Pointer,
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub value: String,
    /// Set for confirm-key picks so the key does not also submit the search.
    pub suppress_submit: bool,
}

/// A text input that offers matches from its field's `SuggestionIndex`.
#[derive(Debug, Clone)]
pub struct AutosuggestField {
    field: Field,
    value: String,
    suggestions: Vec<String>,
    highlighted: Option<usize>,
    focused: bool,
}

impl AutosuggestField {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            value: String::new(),
            suggestions: Vec::new(),
            highlighted: None,
            focused: false,
        }
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn placeholder(&self) -> String {
        format!("Search for {}", self.field)
    }

    /// Returns true on the first focus, when the caller should load the index.
    pub fn focus(&mut self) -> bool {
        let first = !self.focused;
        self.focused = true;
        first
    }

    pub fn set_text(&mut self, text: &str, index: &SuggestionIndex) {
        self.value = text.to_string();
        self.refresh(index);
    }

    pub fn push_char(&mut self, c: char, index: &SuggestionIndex) {
        self.value.push(c);
        self.refresh(index);
    }

    pub fn pop_char(&mut self, index: &SuggestionIndex) {
        self.value.pop();
        self.refresh(index);
    }

    /// Re-runs the match, e.g. after the index finished loading.
    pub fn refresh(&mut self, index: &SuggestionIndex) {
        self.suggestions = index.matches(&self.value);
        self.highlighted = None;
    }

    pub fn clear_suggestions(&mut self) {
        self.suggestions.clear();
        self.highlighted = None;
    }

    pub fn highlight_next(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        self.highlighted = Some(match self.highlighted {
            Some(i) if i + 1 < self.suggestions.len() => i + 1,
            Some(i) => i,
            None => 0,
        });
    }

    pub fn highlight_prev(&mut self) {
        self.highlighted = match self.highlighted {
            Some(0) | None => None,
            Some(i) => Some(i - 1),
        };
    }

    /// Picks the suggestion at `idx` as the field value.
    pub fn select(&mut self, idx: usize, method: SelectMethod) -> Option<Selection> {
        let value = self.suggestions.get(idx)?.clone();
        self.value = value.clone();
        self.clear_suggestions();
        Some(Selection {
            value,
            suppress_submit: method == SelectMethod::Confirm,
        })
    }

    /// Confirm-key pick of the highlighted suggestion, if any.
    pub fn confirm(&mut self) -> Option<Selection> {
        let idx = self.highlighted?;
        self.select(idx, SelectMethod::Confirm)
    }
}
