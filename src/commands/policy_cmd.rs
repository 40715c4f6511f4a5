use std::path::Path;

use anyhow::{Context, Result};

use crate::models::policy::PolicyCatalog;

/// 读取政策目录；未指定文件时使用内置目录
pub fn load_catalog(path: Option<&Path>) -> Result<PolicyCatalog> {
    let catalog = match path {
        Some(p) => PolicyCatalog::load(p)
            .with_context(|| format!("加载政策目录失败: {}", p.display()))?,
        None => PolicyCatalog::builtin().context("内置政策目录无效")?,
    };
    log::info!("政策目录 v{}，共 {} 条政策", catalog.version, catalog.len());
    Ok(catalog)
}

/// 校验并输出政策目录（JSON）
pub fn list_policies(path: Option<&Path>) -> Result<String> {
    let catalog = load_catalog(path)?;
    serde_json::to_string_pretty(&catalog).context("政策目录序列化失败")
}
