//! Process-wide counters for the land economy and the grave mod.
//! Exposed through [`snapshot`]; the CLI prints them in `status`.
use std::sync::atomic::{AtomicU64, Ordering};

static CHUNKS_PURCHASED: AtomicU64 = AtomicU64::new(0);
static CHUNKS_RESOLD: AtomicU64 = AtomicU64::new(0);
static CHUNKS_ABANDONED: AtomicU64 = AtomicU64::new(0);
static ACTIONS_DENIED: AtomicU64 = AtomicU64::new(0);
static CURRENCY_VACUUMED: AtomicU64 = AtomicU64::new(0);
static GRAVES_PLACED: AtomicU64 = AtomicU64::new(0);
static GRAVES_CLEARED: AtomicU64 = AtomicU64::new(0);
static LOOSE_DROPS: AtomicU64 = AtomicU64::new(0);

pub fn inc_chunks_purchased() {
    CHUNKS_PURCHASED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_chunks_resold() {
    CHUNKS_RESOLD.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_chunks_abandoned() {
    CHUNKS_ABANDONED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_actions_denied() {
    ACTIONS_DENIED.fetch_add(1, Ordering::Relaxed);
}
pub fn add_currency_vacuumed(amount: u64) {
    CURRENCY_VACUUMED.fetch_add(amount, Ordering::Relaxed);
}
pub fn inc_graves_placed() {
    GRAVES_PLACED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_graves_cleared() {
    GRAVES_CLEARED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_loose_drops() {
    LOOSE_DROPS.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub chunks_purchased: u64,
    pub chunks_resold: u64,
    pub chunks_abandoned: u64,
    pub actions_denied: u64,
    pub currency_vacuumed: u64,
    pub graves_placed: u64,
    pub graves_cleared: u64,
    pub loose_drops: u64,
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        chunks_purchased: CHUNKS_PURCHASED.load(Ordering::Relaxed),
        chunks_resold: CHUNKS_RESOLD.load(Ordering::Relaxed),
        chunks_abandoned: CHUNKS_ABANDONED.load(Ordering::Relaxed),
        actions_denied: ACTIONS_DENIED.load(Ordering::Relaxed),
        currency_vacuumed: CURRENCY_VACUUMED.load(Ordering::Relaxed),
        graves_placed: GRAVES_PLACED.load(Ordering::Relaxed),
        graves_cleared: GRAVES_CLEARED.load(Ordering::Relaxed),
        loose_drops: LOOSE_DROPS.load(Ordering::Relaxed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Counters are global and tests run in parallel, so only assert monotonic growth.
    #[test]
    fn counters_only_grow() {
        let before = snapshot();
        inc_chunks_purchased();
        add_currency_vacuumed(5);
        inc_loose_drops();
        let after = snapshot();
        assert!(after.chunks_purchased > before.chunks_purchased);
        assert!(after.currency_vacuumed >= before.currency_vacuumed + 5);
        assert!(after.loose_drops > before.loose_drops);
    }
}
