use anyhow::Result;

use crate::alert::{describe, Alerter, Severity};
use crate::api::PostsApi;
use crate::auth::AuthProvider;
use crate::models::{PostRecord, SortKey};
use crate::query::{FilterState, Query, QueryComposer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Mount,
    SortChange,
    Search,
}

impl Trigger {
    fn failure_title(&self) -> &'static str {
        match self {
            Trigger::Mount | Trigger::SortChange => "could not get posts",
            Trigger::Search => "Could not search for posts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// What happened to a settled request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Applied,
    /// A newer request was issued after this one.
    Stale,
    /// The view was torn down before the response arrived.
    Unmounted,
}

/// One issued post request. Its result is applied only if it is still the latest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    pub trigger: Trigger,
    pub query: Query,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn fetch(&self, api: &dyn PostsApi) -> Result<Vec<PostRecord>> {
        api.list_posts(&self.query).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewPostAction {
    RedirectToLogin,
    OpenEditor,
}

/// Owns the post list shown by the view, the active sort key and the request lifecycle.
#[derive(Debug)]
pub struct ResultController {
    posts: Vec<PostRecord>,
    sort_key: SortKey,
    loading: bool,
    phase: Phase,
    mounted: bool,
    latest: u64,
}

impl Default for ResultController {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultController {
    pub fn new() -> Self {
        Self {
            posts: Vec::new(),
            sort_key: SortKey::default(),
            loading: false,
            phase: Phase::Idle,
            mounted: false,
            latest: 0,
        }
    }

    pub fn with_sort_key(sort_key: SortKey) -> Self {
        Self {
            sort_key,
            ..Self::new()
        }
    }

    pub fn posts(&self) -> &[PostRecord] {
        &self.posts
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The list is only shown once loading finished with at least one post.
    pub fn has_posts(&self) -> bool {
        !self.loading && !self.posts.is_empty()
    }

    /// Activates the view and issues the unfiltered listing.
    pub fn mount(&mut self) -> Ticket {
        self.activate();
        self.issue(Trigger::Mount, QueryComposer::unfiltered(self.sort_key))
    }

    /// Activates the view without the initial listing, for callers that
    /// search straight away.
    pub fn activate(&mut self) {
        self.mounted = true;
    }

    /// Changes the sort key and re-runs the unfiltered listing.
    /// Active filters are not reapplied.
    pub fn set_sort_key(&mut self, sort_key: SortKey) -> Option<Ticket> {
        if !self.mounted {
            return None;
        }
        self.sort_key = sort_key;
        Some(self.issue(Trigger::SortChange, QueryComposer::unfiltered(sort_key)))
    }

    /// Explicit search with the current filters and sort key.
    pub fn search(&mut self, filter: &FilterState) -> Option<Ticket> {
        if !self.mounted {
            return None;
        }
        tracing::debug!(unfiltered = filter.is_empty(), "search requested");
        let query = QueryComposer::build(filter, self.sort_key);
        Some(self.issue(Trigger::Search, query))
    }

    /// Deactivates the view. Responses still in flight will be dropped.
    pub fn teardown(&mut self) {
        tracing::debug!(latest = self.latest, "result view torn down");
        self.mounted = false;
    }

    fn issue(&mut self, trigger: Trigger, query: Query) -> Ticket {
        self.latest += 1;
        self.loading = true;
        self.phase = Phase::Loading;
        tracing::info!(
            generation = self.latest,
            ?trigger,
            operation = query.operation(),
            sort_key = ?query.sort_key(),
            "requesting posts"
        );
        Ticket {
            generation: self.latest,
            trigger,
            query,
        }
    }

    /// Applies a response for `ticket`, unless it is stale or the view is gone.
    pub fn settle(
        &mut self,
        ticket: &Ticket,
        result: Result<Vec<PostRecord>>,
        alerter: &dyn Alerter,
    ) -> Settled {
        let outcome = if !self.mounted {
            Settled::Unmounted
        } else if ticket.generation != self.latest {
            Settled::Stale
        } else {
            Settled::Applied
        };

        if outcome != Settled::Applied {
            tracing::debug!(
                generation = ticket.generation,
                latest = self.latest,
                ?outcome,
                "dropping response"
            );
            // State is left alone, but a failure is still reported.
            if let Err(err) = result {
                Self::report(ticket, &err, alerter);
            }
            return outcome;
        }

        self.loading = false;
        match result {
            Ok(posts) => {
                tracing::info!(generation = ticket.generation, count = posts.len(), "posts loaded");
                self.posts = posts;
                self.phase = Phase::Succeeded;
            }
            Err(err) => {
                self.posts.clear();
                self.phase = Phase::Failed;
                Self::report(ticket, &err, alerter);
            }
        }
        Settled::Applied
    }

    fn report(ticket: &Ticket, err: &anyhow::Error, alerter: &dyn Alerter) {
        alerter.alert(
            Severity::Error,
            ticket.trigger.failure_title(),
            &describe(err),
            Some(err),
        );
    }

    /// Fetches and settles `ticket` in one step.
    pub async fn run(
        &mut self,
        ticket: Ticket,
        api: &dyn PostsApi,
        alerter: &dyn Alerter,
    ) -> Settled {
        let result = ticket.fetch(api).await;
        self.settle(&ticket, result, alerter)
    }

    pub fn new_post_action(&self, auth: &dyn AuthProvider) -> NewPostAction {
        if auth.is_signed_in() {
            NewPostAction::OpenEditor
        } else {
            NewPostAction::RedirectToLogin
        }
    }
}
