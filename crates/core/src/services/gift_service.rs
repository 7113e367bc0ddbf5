use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::models::gift::{Gift, GiftUpdate, NewGift};

/// Mutations over the in-memory gift collection.
///
/// Pure business logic, no I/O. The store loads the collection, calls one
/// of these, and persists the result in a single write, so the history cap
/// and id immutability are enforced in exactly one place.
pub struct GiftService;

impl GiftService {
    pub fn new() -> Self {
        Self
    }

    /// Millisecond timestamp id, bumped until it is unused in `gifts`.
    pub fn next_id(&self, gifts: &[Gift], now: DateTime<Utc>) -> String {
        let taken: HashSet<&str> = gifts.iter().map(|g| g.id.as_str()).collect();
        let mut candidate = now.timestamp_millis();
        while taken.contains(candidate.to_string().as_str()) {
            candidate += 1;
        }
        candidate.to_string()
    }

    /// Assign a fresh id, drop incomplete store links and append.
    pub fn add_gift(&self, gifts: &mut Vec<Gift>, new_gift: NewGift, now: DateTime<Utc>) -> Gift {
        let id = self.next_id(gifts, now);
        let mut gift = new_gift.into_gift(id);
        gift.retain_complete_stores();
        gifts.push(gift.clone());
        gift
    }

    #[must_use]
    pub fn find<'a>(&self, gifts: &'a [Gift], id: &str) -> Option<&'a Gift> {
        gifts.iter().find(|g| g.id == id)
    }

    /// Shallow-merge `update` over the gift with `id`.
    ///
    /// The stored id always survives, whatever the payload carries.
    /// Returns `None` when no gift has that id.
    pub fn update_gift(&self, gifts: &mut [Gift], id: &str, update: GiftUpdate) -> Option<Gift> {
        let gift = gifts.iter_mut().find(|g| g.id == id)?;
        update.apply_to(gift);
        gift.id = id.to_string();
        gift.retain_complete_stores();
        gift.enforce_history_limit();
        Some(gift.clone())
    }

    /// Record a price observation on the gift with `id` and make it current.
    pub fn track_price(
        &self,
        gifts: &mut [Gift],
        id: &str,
        price: &str,
        source: &str,
        at: DateTime<Utc>,
    ) -> Option<Gift> {
        let gift = gifts.iter_mut().find(|g| g.id == id)?;
        gift.record_price(price, source, at);
        Some(gift.clone())
    }

    /// Remove the gift with `id`. Returns whether anything was removed.
    pub fn delete_gift(&self, gifts: &mut Vec<Gift>, id: &str) -> bool {
        let before = gifts.len();
        gifts.retain(|g| g.id != id);
        gifts.len() != before
    }
}

impl Default for GiftService {
    fn default() -> Self {
        Self::new()
    }
}
