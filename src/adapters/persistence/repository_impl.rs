//! Repository Implementation — Concrete Adapter for the Repository Port
//!
//! Maps the two durable entries (`portfolio`, `history`) onto the atomic
//! `KvStore`. The usecases layer only knows the `LedgerRepository` trait,
//! never files or JSON.
//!
//! The two keys are two physical files written portfolio-first inside the
//! actor's exclusive section. A crash between the writes can leave the
//! history one entry behind the portfolio; the history is audit-only and
//! never replayed, so the portfolio remains correct.

use anyhow::Result;
use async_trait::async_trait;

use super::store::KvStore;
use crate::domain::history::History;
use crate::domain::portfolio::Portfolio;
use crate::ports::repository::{LedgerRepository, HISTORY_KEY, PORTFOLIO_KEY};

/// File-backed ledger repository.
pub struct FileLedgerRepository {
    store: KvStore,
}

impl FileLedgerRepository {
    pub fn new(store: KvStore) -> Self {
        Self { store }
    }

    /// Open (or create) a repository in `data_dir`.
    pub async fn from_data_dir(data_dir: &str) -> Result<Self> {
        Ok(Self::new(KvStore::new(data_dir).await?))
    }
}

#[async_trait]
impl LedgerRepository for FileLedgerRepository {
    async fn load(&self) -> Result<(Portfolio, History)> {
        let portfolio = self
            .store
            .get::<Portfolio>(PORTFOLIO_KEY)
            .await?
            .unwrap_or_default();
        let history = self
            .store
            .get::<History>(HISTORY_KEY)
            .await?
            .unwrap_or_default();
        Ok((portfolio, history))
    }

    async fn save(&self, portfolio: &Portfolio, history: &History) -> Result<()> {
        self.store.put(PORTFOLIO_KEY, portfolio).await?;
        self.store.put(HISTORY_KEY, history).await?;
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        self.store.is_healthy().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    async fn temp_repo() -> (FileLedgerRepository, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("repo-test-{}", uuid::Uuid::new_v4()));
        let repo = FileLedgerRepository::from_data_dir(dir.to_str().unwrap())
            .await
            .unwrap();
        (repo, dir)
    }

    #[tokio::test]
    async fn test_load_fresh_returns_defaults() {
        let (repo, dir) = temp_repo().await;
        let (portfolio, history) = repo.load().await.unwrap();
        assert_eq!(portfolio.cash, dec!(100000));
        assert!(portfolio.holdings.is_empty());
        assert!(history.is_empty());
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let (repo, dir) = temp_repo().await;

        let mut portfolio = Portfolio::default();
        portfolio.cash = dec!(98765.43);
        portfolio.holdings.insert("AAPL".to_string(), 12);
        let history = History::default();

        repo.save(&portfolio, &history).await.unwrap();
        let (loaded, _) = repo.load().await.unwrap();
        assert_eq!(loaded, portfolio);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
