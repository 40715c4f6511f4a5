use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::stock::QuoteRow;
use crate::services::provider::MarketSnapshotProvider;
use crate::utils::format::{lenient_f64, normalize_code};
use crate::utils::http::build_stock_client;

pub(crate) const CLIST_URL: &str = "https://push2.eastmoney.com/api/qt/clist/get";
pub(crate) const CLIST_UT: &str = "bd1d9ddb04089700cf9c27f6f7426281";

/// 沪深京A股：沪主板、科创板、深主板、创业板、北交所
const A_SHARE_FS: &str = "m:1+t:2,m:1+t:23,m:0+t:6,m:0+t:80,m:0+t:81+s:2048";
/// f2=最新价, f3=涨跌幅, f8=换手率, f9=市盈率(动态), f12=代码, f14=名称, f20=总市值, f23=市净率
const SNAPSHOT_FIELDS: &str = "f2,f3,f8,f9,f12,f14,f20,f23";
const PAGE_SIZE: usize = 500;
/// 页数上限，防止接口 total 字段异常时无限翻页
const MAX_PAGES: u32 = 40;

/// 全市场扫描器：通过东方财富 API 获取A股全量快照
pub struct MarketScanner {
    client: reqwest::Client,
}

impl MarketScanner {
    pub fn new(timeout_secs: u64) -> anyhow::Result<Self> {
        let client = build_stock_client(timeout_secs)?;
        Ok(Self { client })
    }

    /// 分页拉取，直到累计条数达到 total 或遇到空页
    pub async fn scan_full_market(&self) -> Result<Vec<QuoteRow>, FetchError> {
        let mut all_rows = Vec::new();
        let mut page = 1;

        loop {
            let (rows, total) = self.fetch_page(page).await?;
            if rows.is_empty() {
                break;
            }
            let count = rows.len();
            all_rows.extend(rows);
            if !has_more_pages(all_rows.len(), count, PAGE_SIZE, total) || page >= MAX_PAGES {
                break;
            }
            page += 1;
        }

        if all_rows.is_empty() {
            return Err(FetchError::Empty);
        }
        log::info!("全市场快照拉取完成，共 {} 只股票", all_rows.len());
        Ok(all_rows)
    }

    async fn fetch_page(&self, page: u32) -> Result<(Vec<QuoteRow>, usize), FetchError> {
        let url = format!(
            "{}?pn={}&pz={}&po=1&np=1&ut={}&fltt=2&invt=2&fid=f12&fs={}&fields={}",
            CLIST_URL, page, PAGE_SIZE, CLIST_UT, A_SHARE_FS, SNAPSHOT_FIELDS
        );

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let text = resp.text().await?;
        parse_clist_page(&text)
    }
}

#[async_trait]
impl MarketSnapshotProvider for MarketScanner {
    async fn fetch_snapshot(&self) -> Result<Vec<QuoteRow>, FetchError> {
        self.scan_full_market().await
    }
}

/// 解析 clist 一页数据，返回 (行, 接口声明的总条数)
pub fn parse_clist_page(text: &str) -> Result<(Vec<QuoteRow>, usize), FetchError> {
    let json: serde_json::Value = serde_json::from_str(text)?;

    // 无数据时 data 为 null
    let data = match json.get("data") {
        Some(d) if !d.is_null() => d,
        _ => return Ok((vec![], 0)),
    };
    let total = data.get("total").and_then(|v| v.as_u64()).unwrap_or(0) as usize;

    let items = match data.get("diff").and_then(|d| d.as_array()) {
        Some(arr) => arr,
        None => return Ok((vec![], total)),
    };

    let rows = items.iter().filter_map(parse_quote_item).collect();
    Ok((rows, total))
}

pub fn parse_quote_item(item: &serde_json::Value) -> Option<QuoteRow> {
    let code = normalize_code(item.get("f12")?.as_str()?)?;
    let name = item.get("f14")?.as_str()?.trim().to_string();

    Some(QuoteRow {
        code,
        name,
        price: get_f64(item, "f2"),
        change_pct: get_f64(item, "f3"),
        pe: get_f64(item, "f9"),
        pb: get_f64(item, "f23"),
        total_market_cap: get_f64(item, "f20"),
        turnover_rate: get_f64(item, "f8"),
    })
}

fn get_f64(item: &serde_json::Value, key: &str) -> Option<f64> {
    item.get(key).and_then(lenient_f64)
}

/// 是否还需要翻下一页
///
/// 以接口声明的 total 为准，不因某页条数少于请求的 pz 就停止（服务端可能下调单页上限）。
/// total 缺失时才退回到“短页即末页”的判断。
pub(crate) fn has_more_pages(fetched: usize, page_len: usize, page_size: usize, total: usize) -> bool {
    if page_len == 0 {
        return false;
    }
    if total > 0 {
        fetched < total
    } else {
        page_len >= page_size
    }
}
