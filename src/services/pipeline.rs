use std::collections::HashMap;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};

use crate::error::FetchError;
use crate::models::policy::PolicyCatalog;
use crate::models::report::ReportDocument;
use crate::models::settings::{AppSettings, FetchConfig};
use crate::models::stock::{BoardConstituency, MarketSnapshot};
use crate::services::fallback::fallback;
use crate::services::provider::{BoardConstituentProvider, MarketSnapshotProvider};
use crate::services::report::assemble;
use crate::services::screening::{board_slots, screen};
use crate::utils::retry::retry_with_backoff;

/// 一次完整的选股运行：快照 → 并发取板块成分股 → 筛选 → （兜底）→ 汇总
///
/// 外部调用失败不会中断运行，最差情况下返回 stocks 为空的报告。
pub async fn run_pipeline<S, B>(
    settings: &AppSettings,
    catalog: &PolicyCatalog,
    snapshot_provider: &S,
    board_provider: &B,
    run_date: NaiveDate,
) -> ReportDocument
where
    S: MarketSnapshotProvider + ?Sized,
    B: BoardConstituentProvider + ?Sized,
{
    let snapshot = load_snapshot(snapshot_provider, &settings.fetch).await;

    let mut candidates = if snapshot.is_empty() {
        // 快照为空时任何板块都不可能有命中，不再请求成分股
        Vec::new()
    } else {
        let mut prefetched = prefetch_constituents(catalog, board_provider, &settings.fetch).await;
        screen(
            &catalog.policies,
            &snapshot,
            |slot| {
                prefetched
                    .remove(&(slot.policy_index, slot.board_index))
                    .unwrap_or(Err(FetchError::Empty))
                    .map(|b| b.codes)
            },
            &settings.screening,
        )
    };

    if candidates.is_empty() {
        log::info!("各政策板块均无符合条件的标的，启用兜底展示（前 {} 名）", settings.fallback_size);
        candidates = fallback(&snapshot, settings.fallback_size);
    }

    if candidates.is_empty() {
        log::error!("行情快照为空，本次报告不含任何股票");
    } else {
        log::info!("本次共输出 {} 只股票", candidates.len());
    }

    assemble(run_date, catalog, candidates)
}

/// 拉取全市场快照，失败时返回空快照并记录错误
pub async fn load_snapshot<S>(provider: &S, fetch: &FetchConfig) -> MarketSnapshot
where
    S: MarketSnapshotProvider + ?Sized,
{
    let result = retry_with_backoff("行情快照", fetch.max_retries, fetch.timeout_secs, || {
        provider.fetch_snapshot()
    })
    .await;

    match result {
        Ok(rows) => MarketSnapshot::from_rows(rows),
        Err(e) => {
            log::error!("行情快照获取失败，将输出空报告: {}", e);
            MarketSnapshot::default()
        }
    }
}

/// 预取结果，键为 (政策序号, 板块序号)
pub type PrefetchedBoards = HashMap<(usize, usize), Result<BoardConstituency, FetchError>>;

/// 并发拉取全部 (政策, 板块) 的成分股
///
/// 结果按 [`board_slots`] 的位置索引，与完成先后无关；单个板块失败只影响自身。
pub async fn prefetch_constituents<B>(
    catalog: &PolicyCatalog,
    provider: &B,
    fetch: &FetchConfig,
) -> PrefetchedBoards
where
    B: BoardConstituentProvider + ?Sized,
{
    let slots = board_slots(&catalog.policies);
    let concurrency = fetch.concurrency.max(1);

    stream::iter(slots)
        .map(|slot| async move {
            let label = format!("板块 {}", slot.board);
            let result = retry_with_backoff(&label, fetch.max_retries, fetch.timeout_secs, || {
                provider.fetch_constituents(slot.board)
            })
            .await;
            (
                (slot.policy_index, slot.board_index),
                result.map(|codes| BoardConstituency::new(slot.board, codes)),
            )
        })
        .buffer_unordered(concurrency)
        .collect()
        .await
}
