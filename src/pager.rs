use std::collections::VecDeque;

use crate::data_models::SearchResult;

/// Number of results presented to the user at once.
pub const PAGE_SIZE: usize = 3;

/// FIFO buffer of results that arrived but haven't been shown yet.
#[derive(Debug, Default, Clone)]
pub struct ResultQueue {
    items: VecDeque<SearchResult>,
}

impl ResultQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch at the tail, keeping arrival order.
    pub fn append(&mut self, batch: Vec<SearchResult>) {
        self.items.extend(batch);
    }

    /// Remove up to `size` results from the head.
    /// Returns a short (or empty) page once the queue runs dry.
    pub fn next_page(&mut self, size: usize) -> Vec<SearchResult> {
        let take = size.min(self.items.len());
        self.items.drain(..take).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchResult> {
        self.items.iter()
    }
}

#[test]
fn test_next_page_partial() {
    let mut queue = ResultQueue::new();
    queue.append(vec![
        SearchResult::new("a", "A", "", "https://a.example"),
        SearchResult::new("b", "B", "", "https://b.example"),
    ]);

    let page = queue.next_page(PAGE_SIZE);
    assert_eq!(page.len(), 2);
    assert!(queue.is_empty());
    assert!(queue.next_page(PAGE_SIZE).is_empty());
}
