use crate::matcher::normalize::{normalize_all, Token};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{hash_map, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Identifier of a recipe in the external recipe store.
pub type RecipeId = i64;

/// Minimal recipe shape accepted at the index boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub recipe_id: RecipeId,
    pub ingredient_names: Vec<String>,
}

impl RecipeRecord {
    pub fn new<I, S>(recipe_id: RecipeId, ingredient_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            recipe_id,
            ingredient_names: ingredient_names.into_iter().map(Into::into).collect(),
        }
    }
}

/// Per-recipe record of its normalized ingredient set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeEntry {
    pub recipe_id: RecipeId,
    pub ingredient_tokens: BTreeSet<Token>,
    pub ingredient_count: usize,
}

impl RecipeEntry {
    /// Build an entry from raw names; empties and duplicates collapse.
    pub fn new<I, S>(recipe_id: RecipeId, ingredient_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ingredient_tokens = normalize_all(ingredient_names);
        let ingredient_count = ingredient_tokens.len();

        Self {
            recipe_id,
            ingredient_tokens,
            ingredient_count,
        }
    }
}

impl From<&RecipeRecord> for RecipeEntry {
    fn from(record: &RecipeRecord) -> Self {
        RecipeEntry::new(record.recipe_id, &record.ingredient_names)
    }
}

/// Immutable view of the index at one point in time.
///
/// Entries and token buckets are reference counted so that publishing a new
/// snapshot only copies the buckets a write actually touches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSnapshot {
    entries: HashMap<RecipeId, Arc<RecipeEntry>>,
    postings: HashMap<Token, Arc<BTreeSet<RecipeId>>>,
}

impl IndexSnapshot {
    /// Recipe ids registered under an already normalized token.
    pub fn bucket(&self, token: &str) -> Option<&BTreeSet<RecipeId>> {
        self.postings.get(token).map(Arc::as_ref)
    }

    pub fn entry(&self, recipe_id: RecipeId) -> Option<&RecipeEntry> {
        self.entries.get(&recipe_id).map(Arc::as_ref)
    }

    pub fn contains(&self, recipe_id: RecipeId) -> bool {
        self.entries.contains_key(&recipe_id)
    }

    pub fn recipe_count(&self) -> usize {
        self.entries.len()
    }

    pub fn token_count(&self) -> usize {
        self.postings.len()
    }

    pub fn entries(&self) -> impl Iterator<Item = &RecipeEntry> {
        self.entries.values().map(Arc::as_ref)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.postings.keys()
    }

    /// Replace the entry for `entry.recipe_id`, relinking only the tokens that changed.
    fn insert_entry(&mut self, entry: RecipeEntry) {
        let recipe_id = entry.recipe_id;
        let previous = self.entries.remove(&recipe_id);

        if let Some(previous) = &previous {
            for token in previous.ingredient_tokens.difference(&entry.ingredient_tokens) {
                self.unlink(token, recipe_id);
            }
        }

        for token in &entry.ingredient_tokens {
            let already_linked = previous
                .as_ref()
                .is_some_and(|p| p.ingredient_tokens.contains(token));
            if !already_linked {
                self.link(token, recipe_id);
            }
        }

        self.entries.insert(recipe_id, Arc::new(entry));
    }

    fn remove_entry(&mut self, recipe_id: RecipeId) -> bool {
        let Some(previous) = self.entries.remove(&recipe_id) else {
            return false;
        };

        for token in &previous.ingredient_tokens {
            self.unlink(token, recipe_id);
        }

        true
    }

    fn link(&mut self, token: &Token, recipe_id: RecipeId) {
        let bucket = self.postings.entry(token.clone()).or_default();
        Arc::make_mut(bucket).insert(recipe_id);
    }

    fn unlink(&mut self, token: &Token, recipe_id: RecipeId) {
        if let hash_map::Entry::Occupied(mut slot) = self.postings.entry(token.clone()) {
            let bucket = Arc::make_mut(slot.get_mut());
            bucket.remove(&recipe_id);
            if bucket.is_empty() {
                slot.remove();
            }
        }
    }
}

/// Shared recipe ingredient index.
///
/// Readers load the current [`IndexSnapshot`] without locking. Writers are
/// serialized by a mutex, build the next snapshot off to the side and publish
/// it with a single pointer swap, so a reader observes either the state
/// before a write or the state after it.
pub struct IngredientIndex {
    current: ArcSwap<IndexSnapshot>,
    writer: Mutex<()>,
}

impl Default for IngredientIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl IngredientIndex {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(IndexSnapshot::default()),
            writer: Mutex::new(()),
        }
    }

    /// Current snapshot; stays valid and unchanged while held.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.current.load_full()
    }

    /// Insert or wholesale replace the ingredient list of a recipe.
    pub fn upsert<I, S>(&self, recipe_id: RecipeId, ingredient_names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entry = RecipeEntry::new(recipe_id, ingredient_names);
        debug!(
            "Upserting recipe {} with {} ingredient tokens",
            recipe_id, entry.ingredient_count
        );

        self.write(|next| next.insert_entry(entry));
    }

    /// Upsert many recipes as one transition.
    ///
    /// Later records win when the same id appears more than once.
    pub fn upsert_many<I>(&self, records: I) -> usize
    where
        I: IntoIterator<Item = RecipeRecord>,
    {
        let entries: Vec<RecipeEntry> = records.into_iter().map(|r| RecipeEntry::from(&r)).collect();
        let count = entries.len();

        self.write(|next| {
            for entry in entries {
                next.insert_entry(entry);
            }
        });

        count
    }

    /// Remove a recipe; returns whether it was present. Absent ids are a no-op.
    pub fn remove(&self, recipe_id: RecipeId) -> bool {
        let _guard = self.writer.lock();

        if !self.current.load().contains(recipe_id) {
            return false;
        }

        let mut next = IndexSnapshot::clone(&self.current.load());
        let removed = next.remove_entry(recipe_id);
        self.current.store(Arc::new(next));

        debug!("Removed recipe {} from ingredient index", recipe_id);
        removed
    }

    /// Recipe ids registered under an already normalized token.
    pub fn lookup(&self, token: &str) -> BTreeSet<RecipeId> {
        self.current
            .load()
            .bucket(token)
            .cloned()
            .unwrap_or_default()
    }

    pub fn entry(&self, recipe_id: RecipeId) -> Option<Arc<RecipeEntry>> {
        self.current.load().entries.get(&recipe_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.current.load().recipe_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write<F, R>(&self, apply: F) -> R
    where
        F: FnOnce(&mut IndexSnapshot) -> R,
    {
        let _guard = self.writer.lock();

        let mut next = IndexSnapshot::clone(&self.current.load());
        let output = apply(&mut next);
        self.current.store(Arc::new(next));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(set: BTreeSet<RecipeId>) -> Vec<RecipeId> {
        set.into_iter().collect()
    }

    #[test]
    fn test_upsert_registers_tokens() {
        let index = IngredientIndex::new();
        index.upsert(1, ["Tomate", "Oeuf", "tomate "]);

        let entry = index.entry(1).expect("entry should exist");
        assert_eq!(entry.ingredient_count, 2);
        assert_eq!(ids(index.lookup("tomate")), vec![1]);
        assert_eq!(ids(index.lookup("oeuf")), vec![1]);
        assert!(index.lookup("fromage").is_empty());
    }

    #[test]
    fn test_upsert_replaces_and_prunes_old_tokens() {
        let index = IngredientIndex::new();
        index.upsert(1, ["tomate", "oeuf"]);
        index.upsert(1, ["oeuf", "lait"]);

        assert!(index.lookup("tomate").is_empty());
        assert_eq!(ids(index.lookup("oeuf")), vec![1]);
        assert_eq!(ids(index.lookup("lait")), vec![1]);

        let snapshot = index.snapshot();
        assert!(snapshot.bucket("tomate").is_none(), "empty bucket must be pruned");
        assert_eq!(snapshot.token_count(), 2);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let once = IngredientIndex::new();
        once.upsert(7, ["poulet", "riz"]);

        let twice = IngredientIndex::new();
        twice.upsert(7, ["poulet", "riz"]);
        twice.upsert(7, ["poulet", "riz"]);

        assert_eq!(*once.snapshot(), *twice.snapshot());
    }

    #[test]
    fn test_upsert_empty_ingredient_list() {
        let index = IngredientIndex::new();
        index.upsert(3, Vec::<String>::new());

        let entry = index.entry(3).expect("entry should exist");
        assert_eq!(entry.ingredient_count, 0);
        assert_eq!(index.snapshot().token_count(), 0);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_remove_prunes_buckets() {
        let index = IngredientIndex::new();
        index.upsert(1, ["tomate", "oeuf"]);
        index.upsert(2, ["tomate"]);

        assert!(index.remove(1));
        assert!(index.entry(1).is_none());
        assert_eq!(ids(index.lookup("tomate")), vec![2]);
        assert!(index.snapshot().bucket("oeuf").is_none());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let index = IngredientIndex::new();
        index.upsert(1, ["tomate"]);
        let before = index.snapshot();

        assert!(!index.remove(42));
        assert!(!index.remove(42));
        assert_eq!(*before, *index.snapshot());
    }

    #[test]
    fn test_held_snapshot_is_not_affected_by_writes() {
        let index = IngredientIndex::new();
        index.upsert(1, ["tomate"]);
        let held = index.snapshot();

        index.upsert(1, ["poivron"]);
        index.upsert(2, ["tomate"]);

        assert_eq!(held.bucket("tomate").map(|b| b.len()), Some(1));
        assert!(held.bucket("poivron").is_none());
        assert_eq!(ids(index.lookup("tomate")), vec![2]);
    }

    #[test]
    fn test_upsert_many_last_record_wins() {
        let index = IngredientIndex::new();
        let count = index.upsert_many(vec![
            RecipeRecord::new(1, ["tomate"]),
            RecipeRecord::new(2, ["oeuf"]),
            RecipeRecord::new(1, ["fromage"]),
        ]);

        assert_eq!(count, 3);
        assert_eq!(index.len(), 2);
        assert!(index.lookup("tomate").is_empty());
        assert_eq!(ids(index.lookup("fromage")), vec![1]);
    }
}
