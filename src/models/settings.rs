use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// 部署档位：决定筛选阈值的默认值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Profile {
    /// 市值 > 50亿，0 < PE < 50，每板块 3 只
    #[default]
    #[serde(rename = "standard")]
    Standard,
    /// 市值 > 50亿，0 < PE < 30，每板块 3 只
    #[serde(rename = "strict")]
    Strict,
    /// 市值 > 30亿，0 < PE < 50，每板块 6 只
    #[serde(rename = "broad")]
    Broad,
}

impl std::str::FromStr for Profile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Profile::Standard),
            "strict" => Ok(Profile::Strict),
            "broad" => Ok(Profile::Broad),
            other => Err(anyhow::anyhow!("未知的筛选档位: {}", other)),
        }
    }
}

/// 估值筛选阈值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningConfig {
    pub min_market_cap: f64,  // 最低总市值（元），严格大于
    pub pe_lower_bound: f64,  // PE 下限（不含）
    pub pe_upper_bound: f64,  // PE 上限（不含）
    pub max_candidates_per_board: usize,
}

impl ScreeningConfig {
    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Standard => Self {
                min_market_cap: 5e9,
                pe_lower_bound: 0.0,
                pe_upper_bound: 50.0,
                max_candidates_per_board: 3,
            },
            Profile::Strict => Self {
                min_market_cap: 5e9,
                pe_lower_bound: 0.0,
                pe_upper_bound: 30.0,
                max_candidates_per_board: 3,
            },
            Profile::Broad => Self {
                min_market_cap: 3e9,
                pe_lower_bound: 0.0,
                pe_upper_bound: 50.0,
                max_candidates_per_board: 6,
            },
        }
    }
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self::for_profile(Profile::default())
    }
}

/// 外部接口请求参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// 板块成分股并发请求数
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_timeout_secs() -> u64 { 15 }
fn default_max_retries() -> u32 { 2 }
fn default_concurrency() -> usize { 4 }

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            concurrency: default_concurrency(),
        }
    }
}

/// 配置文件（JSON），所有字段均可省略
#[derive(Debug, Clone, Default, Deserialize)]
struct RawSettings {
    #[serde(default)]
    profile: Profile,
    #[serde(default)]
    min_market_cap: Option<f64>,
    #[serde(default)]
    pe_lower_bound: Option<f64>,
    #[serde(default)]
    pe_upper_bound: Option<f64>,
    #[serde(default)]
    max_candidates_per_board: Option<usize>,
    #[serde(default)]
    fallback_size: Option<usize>,
    #[serde(default)]
    fetch: FetchConfig,
    #[serde(default)]
    output_dir: Option<PathBuf>,
}

/// 一次运行的全部设置
#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub profile: Profile,
    pub screening: ScreeningConfig,
    pub fallback_size: usize,
    pub fetch: FetchConfig,
    pub output_dir: PathBuf,
}

fn default_fallback_size() -> usize { 10 }
fn default_output_dir() -> PathBuf { PathBuf::from("docs") }

impl Default for AppSettings {
    fn default() -> Self {
        Self::for_profile(Profile::default())
    }
}

impl AppSettings {
    pub fn for_profile(profile: Profile) -> Self {
        Self {
            profile,
            screening: ScreeningConfig::for_profile(profile),
            fallback_size: default_fallback_size(),
            fetch: FetchConfig::default(),
            output_dir: default_output_dir(),
        }
    }

    /// 解析 JSON 配置：先取档位默认值，再用显式配置的阈值覆盖
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawSettings = serde_json::from_str(text).context("配置文件格式错误")?;
        let settings = Self::from_raw(raw);
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        Self::from_json(&text)
    }

    fn from_raw(raw: RawSettings) -> Self {
        let mut settings = Self::for_profile(raw.profile);
        let s = &mut settings.screening;
        if let Some(v) = raw.min_market_cap { s.min_market_cap = v; }
        if let Some(v) = raw.pe_lower_bound { s.pe_lower_bound = v; }
        if let Some(v) = raw.pe_upper_bound { s.pe_upper_bound = v; }
        if let Some(v) = raw.max_candidates_per_board { s.max_candidates_per_board = v; }
        if let Some(v) = raw.fallback_size { settings.fallback_size = v; }
        if let Some(dir) = raw.output_dir { settings.output_dir = dir; }
        settings.fetch = raw.fetch;
        settings
    }

    /// 拒绝会让报告必然为空的配置
    pub fn validate(&self) -> Result<()> {
        let s = &self.screening;
        if self.fallback_size == 0 {
            anyhow::bail!("fallback_size 必须大于 0");
        }
        if s.max_candidates_per_board == 0 {
            anyhow::bail!("max_candidates_per_board 必须大于 0");
        }
        if !s.min_market_cap.is_finite() || !s.pe_lower_bound.is_finite() || !s.pe_upper_bound.is_finite() {
            anyhow::bail!("筛选阈值必须为有限数值");
        }
        if s.pe_lower_bound >= s.pe_upper_bound {
            anyhow::bail!(
                "PE 下限 {} 必须小于上限 {}",
                s.pe_lower_bound,
                s.pe_upper_bound
            );
        }
        Ok(())
    }

    /// 切换档位时重置阈值为该档位默认值
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self.screening = ScreeningConfig::for_profile(profile);
        self
    }
}
