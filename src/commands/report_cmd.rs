use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;

use crate::commands::policy_cmd::load_catalog;
use crate::models::policy::PolicyCatalog;
use crate::models::report::ReportDocument;
use crate::models::settings::{AppSettings, Profile};
use crate::services::board_members::EastmoneyBoards;
use crate::services::fixture_source::FixtureSource;
use crate::services::market_scanner::MarketScanner;
use crate::services::pipeline::run_pipeline;
use crate::services::report::ReportWriter;

/// `run` 子命令的参数，未指定的项取配置文件或默认值
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub profile: Option<Profile>,
    pub output: Option<PathBuf>,
    pub fixture: Option<PathBuf>,
    pub date: Option<NaiveDate>,
}

pub fn resolve_settings(opts: &RunOptions) -> Result<AppSettings> {
    let mut settings = match &opts.config {
        Some(path) => AppSettings::load(path)?,
        None => AppSettings::default(),
    };
    if let Some(profile) = opts.profile {
        settings = settings.with_profile(profile);
    }
    if let Some(dir) = &opts.output {
        settings.output_dir = dir.clone();
    }
    settings.validate()?;
    Ok(settings)
}

/// 生成政策选股报告并写入 `<output_dir>/data.json`
pub async fn generate_report(opts: RunOptions) -> Result<PathBuf> {
    let settings = resolve_settings(&opts)?;
    let catalog = load_catalog(opts.catalog.as_deref())?;
    let run_date = opts.date.unwrap_or_else(|| chrono::Local::now().date_naive());

    log::info!(
        "开始执行政策选股：档位 {:?}，市值下限 {:.0}亿，PE 区间 ({}, {})，每板块最多 {} 只",
        settings.profile,
        settings.screening.min_market_cap / 1e8,
        settings.screening.pe_lower_bound,
        settings.screening.pe_upper_bound,
        settings.screening.max_candidates_per_board
    );

    let doc = build_document(&opts, &settings, &catalog, run_date).await?;

    let path = ReportWriter::new(&settings.output_dir).write(&doc)?;
    log::info!("报告已生成: {}", path.display());
    Ok(path)
}

async fn build_document(
    opts: &RunOptions,
    settings: &AppSettings,
    catalog: &PolicyCatalog,
    run_date: NaiveDate,
) -> Result<ReportDocument> {
    let doc = match &opts.fixture {
        Some(path) => {
            log::info!("使用离线数据: {}", path.display());
            // 离线数据不可用等同于行情源失败：记录错误后以空快照继续
            let source = FixtureSource::load(path).unwrap_or_else(|e| {
                log::error!("离线数据加载失败，按空快照继续: {:#}", e);
                FixtureSource::default()
            });
            run_pipeline(settings, catalog, &source, &source, run_date).await
        }
        None => {
            let scanner = MarketScanner::new(settings.fetch.timeout_secs)?;
            let boards = EastmoneyBoards::new(settings.fetch.timeout_secs)?;
            run_pipeline(settings, catalog, &scanner, &boards, run_date).await
        }
    };
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_flag_overrides_config_thresholds() {
        let opts = RunOptions {
            profile: Some(Profile::Broad),
            output: Some(PathBuf::from("out")),
            ..Default::default()
        };
        let s = resolve_settings(&opts).unwrap();
        assert_eq!(s.screening.max_candidates_per_board, 6);
        assert_eq!(s.output_dir, PathBuf::from("out"));
    }

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("policy-miner-cmd-{}-{}", tag, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn read_report(path: &std::path::Path) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_fixture_with_dash_values_still_reports() {
        let dir = scratch_dir("dash");
        let fixture = dir.join("fixture.json");
        std::fs::write(
            &fixture,
            r#"{"quotes":[
                {"code":"600000","name":"浦发银行","price":10.5,"pe":"-","pb":"-","total_market_cap":3.0e11},
                {"code":"600001","name":"测试药业","price":"8.2","pe":"12.5","pb":1.1,"total_market_cap":1.0e10}
            ],
            "boards":{"医药生物":["600000","600001"]}}"#,
        )
        .unwrap();

        let opts = RunOptions {
            fixture: Some(fixture),
            output: Some(dir.join("out")),
            date: NaiveDate::from_ymd_opt(2024, 7, 15),
            ..Default::default()
        };
        let path = generate_report(opts).await.unwrap();

        let json = read_report(&path);
        let stocks = json["stocks"].as_array().unwrap();
        assert_eq!(stocks.len(), 1, "PE 缺失的 600000 应被排除");
        assert_eq!(stocks[0]["code"], "600001");
        assert_eq!(stocks[0]["industry"], "医药生物");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_unreadable_fixture_writes_empty_report() {
        let dir = scratch_dir("broken");
        let fixture = dir.join("fixture.json");
        std::fs::write(&fixture, "{ not json").unwrap();

        let opts = RunOptions {
            fixture: Some(fixture),
            output: Some(dir.join("out")),
            date: NaiveDate::from_ymd_opt(2024, 7, 15),
            ..Default::default()
        };
        let path = generate_report(opts).await.unwrap();

        let json = read_report(&path);
        assert_eq!(json["date"], "2024-07-15");
        assert_eq!(json["stocks"], serde_json::json!([]));
        assert_eq!(json["policies"].as_array().unwrap().len(), 3);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_invalid_config_file_is_fatal() {
        let dir = scratch_dir("config");
        let config = dir.join("settings.json");
        std::fs::write(&config, r#"{"fallback_size":0}"#).unwrap();
        let opts = RunOptions { config: Some(config), ..Default::default() };
        assert!(resolve_settings(&opts).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
