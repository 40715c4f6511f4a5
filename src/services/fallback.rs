use std::cmp::Ordering;

use crate::models::report::ScreenedCandidate;
use crate::models::stock::{MarketSnapshot, QuoteRow};

pub const FALLBACK_BOARD: &str = "核心资产";
pub const FALLBACK_POLICY_TITLE: &str = "核心资产（兜底展示）";
const FALLBACK_POLICY_DESC: &str = "各政策板块暂无满足估值条件的标的，展示全市场总市值靠前的核心资产。";
const FALLBACK_ANALYSIS: &str = "【兜底展示】今日政策板块未筛出符合市值与市盈率条件的标的，以下为全市场总市值排名靠前的核心资产，仅供参考。";

/// 筛选结果为空时的兜底：全市场总市值前 n 名
///
/// 无市值的股票排在所有有市值股票之后，因此返回数量恒为 min(n, 快照规模)。
pub fn fallback(snapshot: &MarketSnapshot, n: usize) -> Vec<ScreenedCandidate> {
    let mut rows: Vec<&QuoteRow> = snapshot.rows().collect();
    rows.sort_by(|a, b| compare_by_cap_desc(a, b));
    rows.truncate(n);

    rows.into_iter().map(build_fallback_candidate).collect()
}

fn compare_by_cap_desc(a: &QuoteRow, b: &QuoteRow) -> Ordering {
    match (a.total_market_cap, b.total_market_cap) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.code.cmp(&b.code))
}

fn build_fallback_candidate(row: &QuoteRow) -> ScreenedCandidate {
    ScreenedCandidate {
        code: row.code.clone(),
        name: row.name.clone(),
        board: FALLBACK_BOARD.to_string(),
        price: row.price,
        change_pct: row.change_pct,
        pe: row.pe,
        pb: row.pb,
        market_cap: row.total_market_cap,
        policy_title: FALLBACK_POLICY_TITLE.to_string(),
        policy_desc: FALLBACK_POLICY_DESC.to_string(),
        policy_url: String::new(),
        policy_tag: None,
        analysis: FALLBACK_ANALYSIS.to_string(),
    }
}
