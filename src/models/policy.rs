use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// 内置政策目录（config/policies.json）
const BUILTIN_CATALOG: &str = include_str!("../../config/policies.json");

/// 单条政策记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub source: String,
    pub url: String,
    #[serde(default)]
    pub desc: String,
    /// 受益板块，按顺序依次筛选
    #[serde(rename = "keywords")]
    pub target_boards: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// 带版本号的政策目录，加载时完成校验
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyCatalog {
    #[serde(default)]
    pub version: String,
    pub policies: Vec<PolicyRecord>,
}

impl PolicyCatalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let catalog: PolicyCatalog = serde_json::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// 目录非空、编号唯一、每条政策至少一个板块且板块名不为空白
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.policies.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for p in &self.policies {
            if !seen.insert(p.id.as_str()) {
                return Err(CatalogError::DuplicateId(p.id.clone()));
            }
            if p.target_boards.is_empty() {
                return Err(CatalogError::NoTargetBoards(p.id.clone()));
            }
            if p.target_boards.iter().any(|b| b.trim().is_empty()) {
                return Err(CatalogError::BlankBoard(p.id.clone()));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
