use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::error::FetchError;
use crate::services::market_scanner::{has_more_pages, CLIST_UT, CLIST_URL};
use crate::services::provider::BoardConstituentProvider;
use crate::utils::format::normalize_code;
use crate::utils::http::build_stock_client;

/// 行业板块列表
const INDUSTRY_BOARD_FS: &str = "m:90+t:2+f:!50";
const MEMBER_PAGE_SIZE: usize = 500;
const MAX_MEMBER_PAGES: u32 = 10;

/// 东方财富行业板块成分股
///
/// 板块名先经板块目录解析为 BK 代码，再按代码拉取成分股。
/// 目录在一次运行内只成功加载一次，成分股每次请求都重新拉取。
pub struct EastmoneyBoards {
    client: reqwest::Client,
    directory: OnceCell<HashMap<String, String>>,
}

impl EastmoneyBoards {
    pub fn new(timeout_secs: u64) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_stock_client(timeout_secs)?,
            directory: OnceCell::new(),
        })
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn board_directory(&self) -> Result<&HashMap<String, String>, FetchError> {
        self.directory
            .get_or_try_init(|| async {
                let url = format!(
                    "{}?pn=1&pz=1000&po=1&np=1&ut={}&fltt=2&invt=2&fid=f12&fs={}&fields=f12,f14",
                    CLIST_URL, CLIST_UT, INDUSTRY_BOARD_FS
                );
                let json = self.get_json(&url).await?;
                let directory = parse_board_directory(&json);
                if directory.is_empty() {
                    return Err(FetchError::Empty);
                }
                log::debug!("行业板块目录加载完成，共 {} 个板块", directory.len());
                Ok(directory)
            })
            .await
    }

    async fn fetch_members(&self, board_code: &str) -> Result<HashSet<String>, FetchError> {
        let mut members = HashSet::new();
        let mut page = 1;

        loop {
            let url = format!(
                "{}?pn={}&pz={}&po=1&np=1&ut={}&fltt=2&invt=2&fid=f12&fs=b:{}&fields=f12",
                CLIST_URL, page, MEMBER_PAGE_SIZE, CLIST_UT, board_code
            );
            let json = self.get_json(&url).await?;
            let (codes, total) = parse_member_page(&json);
            if codes.is_empty() {
                break;
            }
            let count = codes.len();
            members.extend(codes);
            if !has_more_pages(members.len(), count, MEMBER_PAGE_SIZE, total)
                || page >= MAX_MEMBER_PAGES
            {
                break;
            }
            page += 1;
        }

        Ok(members)
    }
}

#[async_trait]
impl BoardConstituentProvider for EastmoneyBoards {
    async fn fetch_constituents(&self, board: &str) -> Result<HashSet<String>, FetchError> {
        let directory = self.board_directory().await?;
        let board_code = directory
            .get(board.trim())
            .ok_or_else(|| FetchError::UnknownBoard(board.to_string()))?
            .clone();
        self.fetch_members(&board_code).await
    }
}

/// 板块名 -> BK 代码
pub fn parse_board_directory(json: &serde_json::Value) -> HashMap<String, String> {
    let mut directory = HashMap::new();
    if let Some(items) = json.get("data").and_then(|d| d.get("diff")).and_then(|v| v.as_array()) {
        for it in items {
            let code = it.get("f12").and_then(|v| v.as_str()).unwrap_or("");
            let name = it.get("f14").and_then(|v| v.as_str()).unwrap_or("").trim();
            if code.is_empty() || name.is_empty() {
                continue;
            }
            directory.insert(name.to_string(), code.to_string());
        }
    }
    directory
}

fn parse_member_page(json: &serde_json::Value) -> (Vec<String>, usize) {
    let data = match json.get("data") {
        Some(d) if !d.is_null() => d,
        _ => return (vec![], 0),
    };
    let total = data.get("total").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
    let codes: Vec<String> = data
        .get("diff")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|it| it.get("f12").and_then(|v| v.as_str()))
                .filter_map(normalize_code)
                .collect()
        })
        .unwrap_or_default();
    (codes, total)
}
