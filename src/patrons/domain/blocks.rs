use std::collections::HashSet;
use chrono::{DateTime, Utc};
use crate::patrons::dto::PatronBlock;

// Active borrowing blocks that belong to `patron_id`.
pub(crate) fn borrowing_blocks(blocks: &[PatronBlock], patron_id: &str, now: DateTime<Utc>) -> Vec<PatronBlock> {
    blocks.iter()
        .filter(|b| b.user_id == patron_id && b.borrowing && !b.is_expired(now))
        .cloned()
        .collect()
}

pub(crate) fn block_reasons(blocks: &[PatronBlock]) -> Vec<String> {
    blocks.iter()
        .map(|b| b.reason.to_string())
        .filter(|r| !r.is_empty())
        .collect()
}

// BlockSweep decides which expired manual blocks to delete. It fires once per expiry
// episode and stays quiet until a refresh shows no expired blocks again or another patron
// is loaded; ids it already handed out are never returned twice.
#[derive(Debug, Clone)]
pub(crate) struct BlockSweep {
    armed: bool,
    deleted: HashSet<String>,
}

impl Default for BlockSweep {
    fn default() -> Self {
        Self {
            armed: true,
            deleted: HashSet::new(),
        }
    }
}

impl BlockSweep {
    pub(crate) fn expired_to_delete(&mut self, blocks: &[PatronBlock], now: DateTime<Utc>) -> Vec<String> {
        let expired: Vec<String> = blocks.iter()
            .filter(|b| b.is_expired(now))
            .filter_map(|b| b.id.clone())
            .filter(|id| !self.deleted.contains(id))
            .collect();
        if expired.is_empty() {
            self.armed = true;
            return vec![];
        }
        if !self.armed {
            return vec![];
        }
        self.armed = false;
        self.deleted.extend(expired.iter().cloned());
        expired
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.armed
    }

    // a new patron starts a new episode
    pub(crate) fn rearm(&mut self) {
        self.armed = true;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
