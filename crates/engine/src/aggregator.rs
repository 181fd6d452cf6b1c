//! Folds finished sessions into per-user statistics and the leaderboard

use std::sync::Arc;

use chrono::Utc;
use common::models::{GameResult, RankingEntry, UserStats};
use common::{GameConfig, Result};
use db::Store;
use tracing::{debug, info, warn};

use crate::scoring::level_for_points;

/// Running average that weighs every sample equally
fn running_average(previous: f64, previous_count: u32, sample: f64) -> f64 {
    (previous * previous_count as f64 + sample) / (previous_count + 1) as f64
}

/// Whether a session counts as a win
pub fn is_win(result: &GameResult, config: &GameConfig) -> bool {
    result.accuracy >= config.win_accuracy
}

/// Apply one finished session to `stats`.
///
/// This is a delta, not a projection: folding the same result twice counts
/// it twice. `max_streak` holds the best streak of any kind, so both the
/// session's answer streak and the resulting win streak feed it.
pub fn fold_result(mut stats: UserStats, result: &GameResult, config: &GameConfig) -> UserStats {
    let win = is_win(result, config);

    stats.accuracy = running_average(stats.accuracy, stats.total_games, result.accuracy);
    stats.total_games += 1;
    if win {
        stats.total_wins += 1;
        stats.current_streak += 1;
    } else {
        stats.current_streak = 0;
    }
    stats.max_streak = stats
        .max_streak
        .max(result.max_streak)
        .max(stats.current_streak);

    // Sessions without a category only count towards the totals
    if let Some(category) = result.category {
        let played = stats.games_per_category.get(&category).copied().unwrap_or(0);
        let previous = stats
            .accuracy_per_category
            .get(&category)
            .copied()
            .unwrap_or(0.0);
        stats
            .accuracy_per_category
            .insert(category, running_average(previous, played, result.accuracy));
        stats.games_per_category.insert(category, played + 1);
    }

    stats.total_points += result.score as u64;
    stats.level = level_for_points(stats.total_points, config.points_per_level);
    stats.updated_at = Utc::now();
    stats
}

/// Owns stats persistence and the leaderboard projection
pub struct StatsAggregator {
    store: Arc<dyn Store>,
    config: GameConfig,
}

impl StatsAggregator {
    pub fn new(store: Arc<dyn Store>, config: GameConfig) -> Self {
        Self { store, config }
    }

    /// Fold `result` into the player's stats and republish their ranking.
    ///
    /// Call exactly once per finished session. Fails only when the stats
    /// cannot be loaded or saved.
    pub async fn apply_result(&self, result: &GameResult) -> Result<UserStats> {
        let current = self
            .store
            .get_stats(&result.user_id)
            .await?
            .unwrap_or_else(|| UserStats::new(result.user_id.clone()));

        let stats = fold_result(current, result, &self.config);
        self.store.put_stats(&stats).await?;
        debug!(
            "Stats for {}: {} games, {} points, level {}",
            stats.user_id, stats.total_games, stats.total_points, stats.level
        );

        // Stats are already saved; a stale leaderboard row is not fatal
        if let Err(e) = self
            .store
            .upsert_ranking(&RankingEntry::from_stats(&stats, &result.username))
            .await
        {
            warn!("Failed to publish ranking for {}: {}", result.user_id, e);
        }
        info!(
            "Applied result {} for {} ({} points)",
            result.id, result.user_id, result.score
        );

        Ok(stats)
    }

    /// Count one more authored question for `user_id`. Failures are logged.
    pub async fn record_question_created(&self, user_id: &str) {
        let current = match self.store.get_stats(user_id).await {
            Ok(stats) => stats.unwrap_or_else(|| UserStats::new(user_id)),
            Err(e) => {
                warn!("Failed to load stats for {}: {}", user_id, e);
                return;
            }
        };
        let stats = UserStats {
            questions_created: current.questions_created + 1,
            updated_at: Utc::now(),
            ..current
        };
        if let Err(e) = self.store.put_stats(&stats).await {
            warn!("Failed to count question for {}: {}", user_id, e);
        }
    }

    /// Stored stats, or zero-value stats for a player with no games
    pub async fn stats(&self, user_id: &str) -> Result<UserStats> {
        Ok(self
            .store
            .get_stats(user_id)
            .await?
            .unwrap_or_else(|| UserStats::new(user_id)))
    }

    /// Highest ranked players, best first
    pub async fn top_n(&self, n: usize) -> Result<Vec<RankingEntry>> {
        self.store.top_rankings(n).await
    }

    /// 1-based leaderboard position
    pub async fn position(&self, user_id: &str) -> Result<Option<usize>> {
        self.store.ranking_position(user_id).await
    }

    pub async fn entry(&self, user_id: &str) -> Result<Option<RankingEntry>> {
        self.store.get_ranking(user_id).await
    }
}
