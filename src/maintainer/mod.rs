// Index maintenance: applies recipe store changes to the ingredient index
// and replays the whole corpus at startup

use crate::matcher::{IngredientIndex, RecipeId, RecipeRecord};
use crate::store::RecipeSource;
use crate::{Error, Result};
use arc_swap::ArcSwapOption;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Change notification from the recipe store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum RecipeEvent {
    Created(RecipeRecord),
    Updated(RecipeRecord),
    Deleted { recipe_id: RecipeId },
}

impl RecipeEvent {
    pub fn recipe_id(&self) -> RecipeId {
        match self {
            RecipeEvent::Created(record) | RecipeEvent::Updated(record) => record.recipe_id,
            RecipeEvent::Deleted { recipe_id } => *recipe_id,
        }
    }
}

/// A recipe left out of the index during bootstrap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapFailure {
    pub recipe_id: RecipeId,
    pub reason: String,
}

/// Outcome of replaying the recipe corpus into the index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    pub indexed: usize,
    pub failed: Vec<BootstrapFailure>,
}

impl BootstrapReport {
    /// Some recipes could not be fetched and are missing from the index
    pub fn is_degraded(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn log_summary(&self) {
        info!(
            "Bootstrap completed: {} recipes indexed, {} omitted",
            self.indexed,
            self.failed.len()
        );

        if self.is_degraded() {
            warn!("Degraded availability, recipes missing from fridge search:");
            for failure in &self.failed {
                warn!("  - recipe {}: {}", failure.recipe_id, failure.reason);
            }
        }
    }
}

/// Bootstrap completion, shared with request handlers.
///
/// Empty until the bootstrap snapshot has been published.
#[derive(Default)]
pub struct Readiness {
    report: ArcSwapOption<BootstrapReport>,
}

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, report: BootstrapReport) {
        self.report.store(Some(Arc::new(report)));
    }

    pub fn report(&self) -> Option<Arc<BootstrapReport>> {
        self.report.load_full()
    }

    pub fn is_ready(&self) -> bool {
        self.report.load().is_some()
    }
}

/// Translates recipe store events into index writes
#[derive(Clone)]
pub struct IndexMaintainer {
    index: Arc<IngredientIndex>,
}

impl IndexMaintainer {
    pub fn new(index: Arc<IngredientIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &Arc<IngredientIndex> {
        &self.index
    }

    /// Apply one event directly
    pub fn apply(&self, event: RecipeEvent) {
        debug!("Applying recipe event: {:?}", event);

        match event {
            RecipeEvent::Created(record) | RecipeEvent::Updated(record) => {
                self.index.upsert(record.recipe_id, &record.ingredient_names);
            }
            RecipeEvent::Deleted { recipe_id } => {
                self.index.remove(recipe_id);
            }
        }
    }

    /// Create a bounded event queue for [`IndexMaintainer::run`]
    pub fn channel(capacity: usize) -> (mpsc::Sender<RecipeEvent>, mpsc::Receiver<RecipeEvent>) {
        mpsc::channel(capacity.max(1))
    }

    /// Apply queued events in arrival order until every sender is dropped.
    /// Returns the number of events applied.
    pub async fn run(&self, mut receiver: mpsc::Receiver<RecipeEvent>) -> usize {
        let mut applied = 0;

        while let Some(event) = receiver.recv().await {
            self.apply(event);
            applied += 1;
        }

        info!("Recipe event queue closed after {} events", applied);
        applied
    }

    /// Start the queue consumer in the background
    pub fn start(self, receiver: mpsc::Receiver<RecipeEvent>) -> tokio::task::JoinHandle<usize> {
        tokio::spawn(async move { self.run(receiver).await })
    }

    /// Replay every recipe from `source` into the index.
    ///
    /// Ingredient fetches run `concurrency` at a time. A recipe whose fetch
    /// fails is omitted and reported; failing to enumerate the corpus is an
    /// error. Fetched recipes are published in one index transition, so
    /// readers never see a partial corpus. When `cancel` resolves first the
    /// index is left untouched and [`Error::Cancelled`] is returned.
    pub async fn bootstrap<S, C>(
        &self,
        source: &S,
        concurrency: usize,
        cancel: C,
    ) -> Result<BootstrapReport>
    where
        S: RecipeSource,
        C: Future<Output = ()>,
    {
        let start = Instant::now();

        let fetch_all = async {
            let recipe_ids = source.recipe_ids().await?;
            info!("Bootstrapping ingredient index from {} recipes", recipe_ids.len());

            let fetched: Vec<(RecipeId, Result<Vec<String>>)> = stream::iter(recipe_ids)
                .map(|recipe_id| async move {
                    (recipe_id, source.recipe_ingredients(recipe_id).await)
                })
                .buffer_unordered(concurrency.max(1))
                .collect()
                .await;

            Ok::<_, Error>(fetched)
        };

        let fetched = tokio::select! {
            biased;
            () = cancel => {
                warn!("Bootstrap cancelled, ingredient index left unchanged");
                return Err(Error::Cancelled);
            }
            fetched = fetch_all => fetched?,
        };

        let mut records = Vec::with_capacity(fetched.len());
        let mut failed = Vec::new();

        for (recipe_id, result) in fetched {
            match result {
                Ok(ingredient_names) => records.push(RecipeRecord {
                    recipe_id,
                    ingredient_names,
                }),
                Err(e) => {
                    warn!("Omitting recipe {} from index: {}", recipe_id, e.log_safe());
                    failed.push(BootstrapFailure {
                        recipe_id,
                        reason: e.log_safe(),
                    });
                }
            }
        }

        failed.sort_by_key(|failure| failure.recipe_id);
        let indexed = self.index.upsert_many(records);

        debug!("Bootstrap took {:?}", start.elapsed());

        Ok(BootstrapReport { indexed, failed })
    }

    /// Bootstrap, mark the service ready, then start consuming `receiver`.
    ///
    /// Events sent while bootstrap runs stay queued and are applied after
    /// the bootstrap snapshot, so a change made in the store during the
    /// replay overrides the possibly stale copy fetched for it.
    pub async fn bootstrap_and_start<S, C>(
        self,
        source: &S,
        concurrency: usize,
        cancel: C,
        receiver: mpsc::Receiver<RecipeEvent>,
        readiness: &Readiness,
    ) -> Result<tokio::task::JoinHandle<usize>>
    where
        S: RecipeSource,
        C: Future<Output = ()>,
    {
        let report = self.bootstrap(source, concurrency, cancel).await?;
        report.log_summary();
        readiness.publish(report);

        info!("Recipe event consumer started");
        Ok(self.start(receiver))
    }
}
