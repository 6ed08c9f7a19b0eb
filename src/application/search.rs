//! Debounced search input synchronised with the location's `search` param.
//!
//! [`SearchController`] is the state machine: it owns the raw input, the
//! committed term and the single debounce deadline. [`run_search`] drives it
//! on a tokio clock from a stream of [`SearchEvent`]s.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use crate::application::location::{Location, Navigator};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct SearchController {
    base_path: String,
    debounce: Duration,
    search_term: String,
    committed_term: String,
    deadline: Option<Instant>,
}

impl SearchController {
    pub fn new(
        base_path: impl Into<String>,
        initial_term: impl Into<String>,
        debounce: Duration,
    ) -> Self {
        let initial_term = initial_term.into();
        Self {
            base_path: base_path.into(),
            debounce,
            committed_term: initial_term.clone(),
            search_term: initial_term,
            deadline: None,
        }
    }

    /// Raw input as typed so far.
    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Last term that survived the debounce or was submitted.
    #[must_use]
    pub fn committed_term(&self) -> &str {
        &self.committed_term
    }

    /// Pending debounce deadline, if a keystroke is waiting to settle.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// A keystroke: replace the raw term and restart the timer.
    pub fn input(&mut self, term: impl Into<String>, now: Instant) {
        self.search_term = term.into();
        self.deadline = Some(now + self.debounce);
    }

    /// Commit once the deadline has passed, returning the URL to navigate to.
    pub fn tick(&mut self, now: Instant, location: &Location) -> Option<String> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.commit(location),
            _ => None,
        }
    }

    /// Form submission: commit immediately, skipping the debounce.
    pub fn submit(&mut self, location: &Location) -> Option<String> {
        self.commit(location)
    }

    /// Drop the pending timer without committing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    fn commit(&mut self, location: &Location) -> Option<String> {
        self.deadline = None;
        self.committed_term.clone_from(&self.search_term);
        self.sync(location)
    }

    /// URL for the committed term, or `None` when the location already
    /// reflects it. An absent `search` param counts as the empty term.
    #[must_use]
    pub fn sync(&self, location: &Location) -> Option<String> {
        let current = location.get("search").unwrap_or_default();
        if current == self.committed_term {
            return None;
        }

        let mut next = location.clone();
        if self.committed_term.is_empty() {
            next.remove("search");
        } else {
            next.set("search", self.committed_term.clone());
        }
        next.remove("page");

        let query = next.query_string();
        if query.is_empty() {
            Some(self.base_path.clone())
        } else {
            Some(format!("{}?{query}", self.base_path))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    Input(String),
    Submit,
}

/// Drive `controller` until the event channel closes.
///
/// A closed channel is teardown: any pending deadline is dropped, never
/// fired. The navigator is handed back so callers can inspect history.
pub async fn run_search<N: Navigator>(
    mut controller: SearchController,
    mut events: mpsc::Receiver<SearchEvent>,
    mut navigator: N,
) -> N {
    loop {
        let deadline = controller.deadline();
        tokio::select! {
            event = events.recv() => match event {
                Some(SearchEvent::Input(term)) => controller.input(term, Instant::now()),
                Some(SearchEvent::Submit) => {
                    if let Some(target) = controller.submit(&navigator.location()) {
                        debug!(%target, "search submitted");
                        navigator.push(&target);
                    }
                }
                None => {
                    controller.cancel();
                    break;
                }
            },
            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(target) = controller.tick(Instant::now(), &navigator.location()) {
                    debug!(%target, "search settled");
                    navigator.push(&target);
                }
            }
        }
    }
    navigator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::location::MemoryHistory;

    fn controller() -> SearchController {
        SearchController::new("/posts", "", DEFAULT_DEBOUNCE)
    }

    #[test]
    fn keystrokes_restart_the_deadline() {
        let start = Instant::now();
        let location = Location::parse("/posts?page=3");
        let mut search = controller();

        search.input("a", start);
        search.input("ab", start + Duration::from_millis(300));
        assert!(search.tick(start + Duration::from_millis(600), &location).is_none());
        assert_eq!(search.committed_term(), "");

        let target = search.tick(start + Duration::from_millis(800), &location);
        assert_eq!(target.as_deref(), Some("/posts?search=ab"));
        assert_eq!(search.committed_term(), "ab");
        assert!(search.deadline().is_none());
    }

    #[test]
    fn empty_term_removes_search_param() {
        let mut search = SearchController::new("/posts", "rust", DEFAULT_DEBOUNCE);
        let location = Location::parse("/posts?search=rust&page=2");
        search.input("", Instant::now());
        assert_eq!(search.submit(&location).as_deref(), Some("/posts"));
    }

    #[test]
    fn identical_term_does_not_navigate() {
        let mut search = controller();
        search.input("rust", Instant::now());
        assert!(search.submit(&Location::parse("/posts?search=rust&page=4")).is_none());

        let mut blank = controller();
        assert!(blank.submit(&Location::parse("/posts?page=2")).is_none());
    }

    #[test]
    fn other_params_survive_the_update() {
        let mut search = controller();
        search.input("abc", Instant::now());
        let target = search.submit(&Location::parse("/posts?sort=new&page=5"));
        assert_eq!(target.as_deref(), Some("/posts?sort=new&search=abc"));
    }

    #[test]
    fn cancel_drops_pending_commit() {
        let start = Instant::now();
        let mut search = controller();
        search.input("abc", start);
        search.cancel();
        assert!(search.tick(start + Duration::from_secs(5), &Location::parse("/posts")).is_none());
        assert_eq!(search.committed_term(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_typing_navigates_once() {
        let (tx, rx) = mpsc::channel(8);
        let driver = tokio::spawn(run_search(
            controller(),
            rx,
            MemoryHistory::new("/posts?page=4"),
        ));

        for term in ["a", "ab", "abc"] {
            tx.send(SearchEvent::Input(term.into())).await.expect("send");
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        tokio::time::sleep(Duration::from_millis(600)).await;
        drop(tx);

        let history = driver.await.expect("driver");
        assert_eq!(history.pushed(), vec!["/posts?search=abc".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_skips_the_wait_and_teardown_cancels() {
        let (tx, rx) = mpsc::channel(8);
        let driver = tokio::spawn(run_search(controller(), rx, MemoryHistory::new("/posts")));

        tx.send(SearchEvent::Input("rust".into())).await.expect("send");
        tx.send(SearchEvent::Submit).await.expect("send");
        tx.send(SearchEvent::Input("rusty".into())).await.expect("send");
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(tx);

        let history = driver.await.expect("driver");
        assert_eq!(history.pushed(), vec!["/posts?search=rust".to_string()]);
    }
}
