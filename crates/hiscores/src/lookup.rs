//! Account-type resolution across hiscores variants.

use futures::future::join_all;
use runetrack_core::stats::{AccountType, PlayerStats};

use crate::{HiscoresError, HiscoresSource};

/// Look `username` up on every hiscores variant concurrently and return the
/// most restrictive matching result.
///
/// Every account is listed on the normal hiscores, so a miss there means the
/// player does not exist and a failure there is returned as-is. An ironman
/// variant only counts when its total XP equals the normal entry: a lower
/// total means the account de-ironed (or lost hardcore status) and that
/// table is stale. Failures on ironman variants are logged and ignored.
pub async fn lookup_player(
    source: &dyn HiscoresSource,
    username: &str,
) -> Result<Option<PlayerStats>, HiscoresError> {
    let lookups = AccountType::ALL
        .iter()
        .map(|&account_type| async move { (account_type, source.fetch(username, account_type).await) });
    let results = join_all(lookups).await;

    let mut normal = None;
    let mut variants = Vec::new();
    for (account_type, result) in results {
        match (account_type, result) {
            (AccountType::Normal, result) => normal = Some(result?),
            (_, Ok(Some(stats))) => variants.push((account_type, stats)),
            (_, Ok(None)) => {}
            (_, Err(e)) => {
                tracing::warn!(username, %account_type, error = %e, "Hiscores variant lookup failed");
            }
        }
    }

    let Some(Some(normal)) = normal else {
        return Ok(None);
    };

    let best = variants
        .into_iter()
        .filter(|(_, stats)| stats.total_xp == normal.total_xp)
        .max_by_key(|(account_type, _)| *account_type);

    Ok(Some(match best {
        Some((account_type, mut stats)) => {
            stats.account_type = account_type;
            stats
        }
        None => normal,
    }))
}
