use thiserror::Error;

/// 外部数据源调用失败的分类
///
/// 行情快照与板块成分股的每一次请求都返回这个类型，筛选流程据此统一决定跳过或降级，
/// 重试工具只对 [`FetchError::is_transient`] 为真的错误重试。
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("请求超时（{0}s）")]
    Timeout(u64),
    #[error("网络请求失败: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("接口返回异常状态码 {0}")]
    Status(u16),
    #[error("响应解析失败: {0}")]
    Decode(String),
    #[error("未找到板块: {0}")]
    UnknownBoard(String),
    #[error("接口返回数据为空")]
    Empty,
}

impl FetchError {
    /// 超时、连接错误、5xx 视为可重试
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout(_) => true,
            FetchError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FetchError::Status(code) => *code >= 500,
            FetchError::Decode(_) | FetchError::UnknownBoard(_) | FetchError::Empty => false,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e.to_string())
    }
}

/// 政策目录加载/校验错误
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("读取政策目录失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("政策目录格式错误: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("政策目录为空")]
    Empty,
    #[error("政策编号重复: {0}")]
    DuplicateId(String),
    #[error("政策 {0} 未配置目标板块")]
    NoTargetBoards(String),
    #[error("政策 {0} 含空白板块名")]
    BlankBoard(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::Timeout(10).is_transient());
        assert!(FetchError::Status(502).is_transient());
        assert!(!FetchError::Status(404).is_transient());
        assert!(!FetchError::UnknownBoard("家电".to_string()).is_transient());
        assert!(!FetchError::Empty.is_transient());
        assert!(!FetchError::Decode("bad".to_string()).is_transient());
    }
}
