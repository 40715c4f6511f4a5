use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::FetchError;
use crate::models::policy::PolicyRecord;
use crate::models::report::ScreenedCandidate;
use crate::models::settings::ScreeningConfig;
use crate::models::stock::{MarketSnapshot, QuoteRow};

/// 政策目录中的一个 (政策, 板块) 位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSlot<'a> {
    pub policy_index: usize,
    pub board_index: usize,
    pub board: &'a str,
}

/// 按目录顺序列出全部 (政策, 板块) 位置
pub fn board_slots(policies: &[PolicyRecord]) -> Vec<BoardSlot<'_>> {
    policies
        .iter()
        .enumerate()
        .flat_map(|(pi, p)| {
            p.target_boards.iter().enumerate().map(move |(bi, b)| BoardSlot {
                policy_index: pi,
                board_index: bi,
                board: b.as_str(),
            })
        })
        .collect()
}

/// 政策板块估值筛选
///
/// 按政策顺序、板块顺序依次：取成分股 → 关联快照 → 市值/PE 过滤 → PE 升序排名 → 截断。
/// 单个板块取数失败或为空只跳过该板块。
pub fn screen<F>(
    policies: &[PolicyRecord],
    snapshot: &MarketSnapshot,
    mut constituent_lookup: F,
    config: &ScreeningConfig,
) -> Vec<ScreenedCandidate>
where
    F: FnMut(BoardSlot<'_>) -> Result<HashSet<String>, FetchError>,
{
    let mut results = Vec::new();

    for slot in board_slots(policies) {
        let policy = &policies[slot.policy_index];
        let codes = match constituent_lookup(slot) {
            Ok(codes) if codes.is_empty() => {
                log::warn!("板块 {} 成分股为空，跳过（政策: {}）", slot.board, policy.title);
                continue;
            }
            Ok(codes) => codes,
            Err(e) => {
                log::warn!("板块 {} 成分股获取失败，跳过（政策: {}）: {}", slot.board, policy.title, e);
                continue;
            }
        };

        let picked = rank_board(&codes, snapshot, config);
        log::info!(
            "政策「{}」板块 {}: 成分股 {} 只，入选 {} 只",
            policy.title,
            slot.board,
            codes.len(),
            picked.len()
        );

        results.extend(picked.into_iter().map(|row| build_candidate(row, policy, slot.board)));
    }

    results
}

/// 单个板块：关联、过滤、排序、截断
pub fn rank_board<'s>(
    codes: &HashSet<String>,
    snapshot: &'s MarketSnapshot,
    config: &ScreeningConfig,
) -> Vec<&'s QuoteRow> {
    let mut missing = 0usize;
    let mut eligible: Vec<&QuoteRow> = codes
        .iter()
        .filter_map(|code| {
            let row = snapshot.get(code);
            if row.is_none() {
                missing += 1;
            }
            row
        })
        .filter(|row| is_eligible(row, config))
        .collect();

    if missing > 0 {
        log::debug!("{} 只成分股不在行情快照中，已忽略", missing);
    }

    eligible.sort_by(|a, b| compare_by_pe(a, b));
    eligible.truncate(config.max_candidates_per_board);
    eligible
}

/// 市值 > 下限 且 PE 落在开区间内；缺失值一律不入选
pub fn is_eligible(row: &QuoteRow, config: &ScreeningConfig) -> bool {
    let (Some(pe), Some(cap)) = (row.pe, row.total_market_cap) else {
        return false;
    };
    cap > config.min_market_cap && pe > config.pe_lower_bound && pe < config.pe_upper_bound
}

/// PE 升序，相同时按代码升序
fn compare_by_pe(a: &QuoteRow, b: &QuoteRow) -> Ordering {
    let pe_a = a.pe.unwrap_or(f64::INFINITY);
    let pe_b = b.pe.unwrap_or(f64::INFINITY);
    pe_a.total_cmp(&pe_b).then_with(|| a.code.cmp(&b.code))
}

fn build_candidate(row: &QuoteRow, policy: &PolicyRecord, board: &str) -> ScreenedCandidate {
    ScreenedCandidate {
        code: row.code.clone(),
        name: row.name.clone(),
        board: board.to_string(),
        price: row.price,
        change_pct: row.change_pct,
        pe: row.pe,
        pb: row.pb,
        market_cap: row.total_market_cap,
        policy_title: policy.title.clone(),
        policy_desc: policy.desc.clone(),
        policy_url: policy.url.clone(),
        policy_tag: policy.tag.clone(),
        analysis: narrative(row, policy, board),
    }
}

/// 自动生成的基本面点评，只依赖行数据、政策与板块
pub fn narrative(row: &QuoteRow, policy: &PolicyRecord, board: &str) -> String {
    let pe_text = row.pe.map(|v| format!("{:.2}倍", v)).unwrap_or_else(|| "-".to_string());
    let pb_text = match row.pb {
        Some(v) => format!("，市净率(PB)为 {:.2}倍", v),
        None => String::new(),
    };
    let cap_text = row
        .total_market_cap
        .map(|v| format!("{:.0} 亿元", v / 1e8))
        .unwrap_or_else(|| "-".to_string());

    format!(
        "【财务透视】当前市盈率(PE)为 {}{}。总市值 {}。作为 {} 行业的优质标的，在“{}”政策背景下，具备估值修复空间。",
        pe_text, pb_text, cap_text, board, policy.title
    )
}
