use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout};

use crate::error::FetchError;

/// 带单次超时的指数退避重试。
/// 仅对可重试错误（超时、5xx、连接错误）进行重试，其余错误直接返回。
///
/// # Arguments
/// * `label` - 日志中标识本次请求
/// * `max_retries` - 最大重试次数（不含首次请求，总共最多执行 max_retries + 1 次）
/// * `timeout_secs` - 每次尝试的超时时间
/// * `operation` - 异步操作闭包
pub async fn retry_with_backoff<F, Fut, T>(
    label: &str,
    max_retries: u32,
    timeout_secs: u64,
    operation: F,
) -> Result<T, FetchError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0;
    loop {
        let result = match timeout(Duration::from_secs(timeout_secs), operation()).await {
            Ok(r) => r,
            Err(_) => Err(FetchError::Timeout(timeout_secs)),
        };

        match result {
            Ok(val) => return Ok(val),
            Err(e) if e.is_transient() && attempt < max_retries => {
                // 指数退避: 1s, 2s, 4s
                let delay = Duration::from_secs(1 << attempt);
                log::warn!(
                    "{} 请求失败（第 {} 次），{}s 后重试: {}",
                    label,
                    attempt + 1,
                    delay.as_secs(),
                    e
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff("test", 2, 5, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 { Err(FetchError::Status(503)) } else { Ok(n) }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_fails_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff("test", 3, 5, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(FetchError::UnknownBoard("家电".to_string()))
        })
        .await;
        assert!(matches!(result, Err(FetchError::UnknownBoard(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_attempt_times_out_and_exhausts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff("test", 1, 3, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending::<Result<(), FetchError>>().await
        })
        .await;
        assert!(matches!(result, Err(FetchError::Timeout(3))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
