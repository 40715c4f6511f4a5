pub mod board_members;
pub mod fallback;
pub mod fixture_source;
pub mod market_scanner;
pub mod pipeline;
pub mod provider;
pub mod report;
pub mod screening;
