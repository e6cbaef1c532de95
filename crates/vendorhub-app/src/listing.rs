// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub search_term: String,
    pub total_pages: u32,
}

impl ListQuery {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            search_term: String::new(),
            total_pages: 1,
        }
    }
}

/// A fetch the controller wants issued. `seq` identifies it when the
/// response comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub seq: u64,
    pub page: u32,
    pub page_size: u32,
    pub search: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: Option<u64>,
    pub total_pages: Option<u32>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Failed,
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    Char(char),
    Backspace,
    Enter,
}

/// Search, pagination and load state for one list view.
///
/// Every operation that needs data returns a [`FetchRequest`] carrying a new
/// sequence number. Only the response for the most recent request is applied,
/// so a slow early response can never overwrite a newer one.
#[derive(Debug, Clone, PartialEq)]
pub struct ListController<T> {
    query: ListQuery,
    input: String,
    rows: Vec<T>,
    total_items: Option<u64>,
    state: LoadState,
    latest_seq: u64,
}

impl<T> ListController<T> {
    pub fn new(page_size: u32) -> Self {
        Self {
            query: ListQuery::new(page_size),
            input: String::new(),
            rows: Vec::new(),
            total_items: None,
            state: LoadState::Idle,
            latest_seq: 0,
        }
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn total_items(&self) -> Option<u64> {
        self.total_items
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn last_error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn mount(&mut self) -> FetchRequest {
        self.issue()
    }

    pub fn refresh(&mut self) -> FetchRequest {
        self.issue()
    }

    /// Commits the typed input as the search term and restarts at page 1.
    pub fn search(&mut self) -> FetchRequest {
        self.query.search_term = self.input.trim().to_owned();
        self.query.page = 1;
        self.issue()
    }

    /// Clears both the committed term and the visible input.
    pub fn reset(&mut self) -> FetchRequest {
        self.input.clear();
        self.query.search_term.clear();
        self.query.page = 1;
        self.issue()
    }

    pub fn go_to_page(&mut self, page: u32) -> Option<FetchRequest> {
        if page < 1 || page > self.query.total_pages {
            return None;
        }
        self.query.page = page;
        Some(self.issue())
    }

    pub fn next_page(&mut self) -> Option<FetchRequest> {
        self.go_to_page(self.query.page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> Option<FetchRequest> {
        self.go_to_page(self.query.page.saturating_sub(1))
    }

    pub fn handle_search_key(&mut self, key: SearchKey) -> Option<FetchRequest> {
        match key {
            SearchKey::Char(ch) => {
                self.input.push(ch);
                None
            }
            SearchKey::Backspace => {
                self.input.pop();
                None
            }
            SearchKey::Enter => Some(self.search()),
        }
    }

    pub fn apply(&mut self, seq: u64, result: Result<Page<T>>) -> ApplyOutcome {
        if seq != self.latest_seq {
            tracing::debug!(seq, latest = self.latest_seq, "dropping stale list response");
            return ApplyOutcome::Stale;
        }

        match result {
            Ok(page) => {
                self.rows = page.items;
                self.total_items = page.total_items;
                self.query.total_pages = page.total_pages.unwrap_or(1).max(1);
                self.state = LoadState::Loaded;
                ApplyOutcome::Applied
            }
            Err(error) => {
                let message = format!("{error:#}");
                tracing::warn!(seq, error = %message, "list fetch failed; keeping previous rows");
                self.state = LoadState::Failed(message);
                ApplyOutcome::Failed
            }
        }
    }

    fn issue(&mut self) -> FetchRequest {
        self.latest_seq = self.latest_seq.wrapping_add(1);
        self.state = LoadState::Loading;
        let request = FetchRequest {
            seq: self.latest_seq,
            page: self.query.page,
            page_size: self.query.page_size,
            search: self.query.search_term.clone(),
        };
        tracing::debug!(
            seq = request.seq,
            page = request.page,
            search = %request.search,
            "list fetch issued"
        );
        request
    }
}

#[cfg(test)]
mod tests {
    use super::{ApplyOutcome, ListController, LoadState, Page, SearchKey};
    use anyhow::anyhow;

    fn page(items: Vec<u32>, total_pages: u32) -> Page<u32> {
        Page {
            total_items: Some(items.len() as u64),
            items,
            total_pages: Some(total_pages),
        }
    }

    fn loaded(total_pages: u32) -> ListController<u32> {
        let mut list = ListController::new(10);
        let request = list.mount();
        list.apply(request.seq, Ok(page((0..10).collect(), total_pages)));
        list
    }

    #[test]
    fn mount_issues_first_page_and_enters_loading() {
        let mut list = ListController::<u32>::new(10);
        assert_eq!(list.state(), &LoadState::Idle);
        let request = list.mount();
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, 10);
        assert_eq!(request.search, "");
        assert!(list.is_loading());
    }

    #[test]
    fn search_submits_term_and_applies_response() {
        let mut list = loaded(3);
        list.go_to_page(2).expect("page 2 in range");
        list.set_input("conference");

        let request = list.search();
        assert_eq!(request.page, 1);
        assert_eq!(request.search, "conference");

        let outcome = list.apply(request.seq, Ok(page((0..7).collect(), 1)));
        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(list.rows().len(), 7);
        assert_eq!(list.query().page, 1);
        assert_eq!(list.query().total_pages, 1);
        assert!(!list.is_loading());
    }

    #[test]
    fn enter_key_is_search() {
        let mut list = loaded(3);
        for ch in "expo".chars() {
            assert!(list.handle_search_key(SearchKey::Char(ch)).is_none());
        }
        list.handle_search_key(SearchKey::Backspace);
        let request = list
            .handle_search_key(SearchKey::Enter)
            .expect("enter submits");
        assert_eq!(request.search, "exp");
        assert_eq!(request.page, 1);
    }

    #[test]
    fn reset_clears_term_and_input() {
        let mut list = loaded(3);
        list.set_input("venue");
        list.search();
        list.set_input("venue typed again");
        list.go_to_page(3);

        let request = list.reset();
        assert_eq!(request.page, 1);
        assert_eq!(request.search, "");
        assert_eq!(list.query().page, 1);
        assert_eq!(list.query().search_term, "");
        assert_eq!(list.input(), "");
    }

    #[test]
    fn go_to_page_outside_range_is_noop() {
        let mut list = loaded(3);
        let before = list.clone();
        assert!(list.go_to_page(0).is_none());
        assert!(list.go_to_page(4).is_none());
        assert_eq!(list, before);

        let request = list.go_to_page(3).expect("last page in range");
        assert_eq!(request.page, 3);
        assert!(list.next_page().is_none());
        assert_eq!(list.prev_page().map(|request| request.page), Some(2));
    }

    #[test]
    fn stale_response_is_dropped() {
        let mut list = loaded(5);
        let slow = list.go_to_page(2).expect("page 2");
        let fast = list.go_to_page(3).expect("page 3");

        assert_eq!(
            list.apply(fast.seq, Ok(page(vec![30, 31], 5))),
            ApplyOutcome::Applied
        );
        assert_eq!(
            list.apply(slow.seq, Ok(page(vec![20, 21], 5))),
            ApplyOutcome::Stale
        );
        assert_eq!(list.rows(), &[30, 31]);
    }

    #[test]
    fn stale_response_does_not_clear_loading() {
        let mut list = loaded(5);
        let first = list.go_to_page(2).expect("page 2");
        let _second = list.go_to_page(3).expect("page 3");
        list.apply(first.seq, Ok(page(vec![1], 5)));
        assert!(list.is_loading());
    }

    #[test]
    fn failure_keeps_previous_rows() {
        let mut list = loaded(2);
        let request = list.next_page().expect("page 2");
        let outcome = list.apply(request.seq, Err(anyhow!("connection reset")));
        assert_eq!(outcome, ApplyOutcome::Failed);
        assert_eq!(list.rows().len(), 10);
        assert!(!list.is_loading());
        assert_eq!(list.last_error(), Some("connection reset"));
    }

    #[test]
    fn missing_or_zero_total_pages_clamps_to_one() {
        let mut list = ListController::<u32>::new(10);
        let request = list.mount();
        list.apply(
            request.seq,
            Ok(Page {
                items: Vec::new(),
                total_items: None,
                total_pages: Some(0),
            }),
        );
        assert_eq!(list.query().total_pages, 1);
    }
}
