//! The in-memory request list behind the review table.

use modguard_core::request::ModerationRequest;
use modguard_core::search::filter_requests;

/// Loaded records in store order plus the current search term.
#[derive(Debug, Clone, Default)]
pub struct RequestList {
    records: Vec<ModerationRequest>,
    search_term: String,
}

impl RequestList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every record with a freshly listed set.
    pub fn replace_all(&mut self, records: Vec<ModerationRequest>) {
        self.records = records;
    }

    pub fn records(&self) -> &[ModerationRequest] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Records matching the current search term, in store order.
    pub fn visible(&self) -> Vec<&ModerationRequest> {
        filter_requests(&self.records, &self.search_term)
    }

    pub fn get(&self, id: &str) -> Option<&ModerationRequest> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Swap in a newer copy of a record. Returns false if the id is unknown,
    /// in which case the list is unchanged.
    pub fn replace(&mut self, record: ModerationRequest) -> bool {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    /// Append a newly created record.
    pub fn push(&mut self, record: ModerationRequest) {
        self.records.push(record);
    }

    /// Drop every record with this id.
    pub fn remove(&mut self, id: &str) -> Option<ModerationRequest> {
        let index = self.records.iter().position(|r| r.id == id)?;
        let removed = self.records.remove(index);
        self.records.retain(|r| r.id != id);
        Some(removed)
    }
}
