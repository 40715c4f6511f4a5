use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::models::policy::PolicyCatalog;
use crate::models::report::{ReportDocument, ScreenedCandidate};

pub const REPORT_FILE_NAME: &str = "data.json";

/// 汇总为最终报告：只做聚合，不过滤、不读写文件
pub fn assemble(
    run_date: NaiveDate,
    catalog: &PolicyCatalog,
    candidates: Vec<ScreenedCandidate>,
) -> ReportDocument {
    let mut seen = HashSet::new();
    let industries = candidates
        .iter()
        .filter(|c| seen.insert(c.board.clone()))
        .map(|c| c.board.clone())
        .collect();

    ReportDocument {
        date: run_date,
        policies: catalog.policies.clone(),
        industries,
        stocks: candidates,
    }
}

/// 报告落盘：覆盖写入 `<output_dir>/data.json`
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE_NAME)
    }

    pub fn write(&self, doc: &ReportDocument) -> Result<PathBuf> {
        ensure_dir(&self.output_dir)?;
        let path = self.output_path();
        let json = serde_json::to_string_pretty(doc).context("报告序列化失败")?;
        std::fs::write(&path, json)
            .with_context(|| format!("写入报告失败: {}", path.display()))?;
        Ok(path)
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("创建输出目录失败: {}", dir.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(code: &str, board: &str) -> ScreenedCandidate {
        ScreenedCandidate {
            code: code.to_string(),
            name: format!("股票{}", code),
            board: board.to_string(),
            price: Some(12.5),
            change_pct: Some(-0.8),
            pe: Some(12.345),
            pb: None,
            market_cap: Some(6e9),
            policy_title: "支持创新药全链条发展".to_string(),
            policy_desc: "描述".to_string(),
            policy_url: "https://www.gov.cn/x.htm".to_string(),
            policy_tag: Some("医药".to_string()),
            analysis: "点评".to_string(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()
    }

    #[test]
    fn test_distinct_boards_in_first_seen_order() {
        let catalog = PolicyCatalog::builtin().unwrap();
        let doc = assemble(
            date(),
            &catalog,
            vec![
                candidate("600001", "家电"),
                candidate("600002", "汽车"),
                candidate("600003", "家电"),
                candidate("000004", "通信"),
            ],
        );
        assert_eq!(doc.industries, vec!["家电", "汽车", "通信"]);
        let codes: Vec<&str> = doc.stocks.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["600001", "600002", "600003", "000004"]);
        assert_eq!(doc.policies, catalog.policies);
    }

    #[test]
    fn test_document_json_shape() {
        let catalog = PolicyCatalog::builtin().unwrap();
        let doc = assemble(date(), &catalog, vec![candidate("600276", "医药生物")]);
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["date"], "2024-07-15");
        assert_eq!(json["industries"][0], "医药生物");
        assert_eq!(json["policies"][0]["id"], "p1");

        let stock = &json["stocks"][0];
        assert_eq!(stock["code"], "600276");
        assert_eq!(stock["industry"], "医药生物");
        assert_eq!(stock["pe"], 12.3);
        assert_eq!(stock["market_cap"], "60.00亿");
        assert_eq!(stock["change_percent"], -0.8);
        assert_eq!(stock["policy_tag"], "医药");
        assert_eq!(stock["f10_url"], "https://quote.eastmoney.com/sh600276.html");
        assert!(stock.get("pb").is_none());
    }

    #[test]
    fn test_empty_stocks_still_serialized() {
        let catalog = PolicyCatalog::builtin().unwrap();
        let doc = assemble(date(), &catalog, vec![]);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["stocks"], serde_json::json!([]));
        assert_eq!(json["industries"], serde_json::json!([]));
    }

    #[test]
    fn test_writer_creates_dir_and_overwrites() {
        let dir = std::env::temp_dir().join(format!("policy-miner-writer-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let catalog = PolicyCatalog::builtin().unwrap();
        let writer = ReportWriter::new(dir.join("docs"));

        let first = assemble(date(), &catalog, vec![candidate("600001", "家电")]);
        let path = writer.write(&first).unwrap();
        assert!(path.ends_with("docs/data.json"));

        let second = assemble(date(), &catalog, vec![]);
        writer.write(&second).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["stocks"], serde_json::json!([]));
        assert!(text.contains("推动大规模设备更新和消费品以旧换新"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
