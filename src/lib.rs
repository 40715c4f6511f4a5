pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

/// 初始化日志：默认 info 级别，可通过 RUST_LOG 覆盖
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_secs()
        .format_target(false)
        .try_init();
}
