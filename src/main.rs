//! policy-miner - A股政策受益股挖掘
//!
//! 读取政策目录，按政策覆盖的行业板块拉取成分股，结合全市场行情快照做市值/市盈率筛选，
//! 每个板块取估值最低的若干只，生成前端使用的 `docs/data.json`。

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use policy_miner::commands::policy_cmd::list_policies;
use policy_miner::commands::report_cmd::{generate_report, RunOptions};
use policy_miner::models::settings::Profile;

#[derive(Parser, Debug)]
#[command(name = "policy-miner")]
#[command(about = "A股政策受益股筛选，生成前端展示用的 JSON 报告")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 执行一次完整选股并写出报告（默认子命令）
    Run(RunArgs),
    /// 校验并打印政策目录
    Policies {
        /// 政策目录文件（JSON），缺省使用内置目录
        #[arg(long, env = "POLICY_MINER_CATALOG")]
        catalog: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug, Default)]
struct RunArgs {
    /// 配置文件（JSON）
    #[arg(long, env = "POLICY_MINER_CONFIG")]
    config: Option<PathBuf>,

    /// 政策目录文件（JSON），缺省使用内置目录
    #[arg(long, env = "POLICY_MINER_CATALOG")]
    catalog: Option<PathBuf>,

    /// 筛选档位：standard / strict / broad
    #[arg(long, env = "POLICY_MINER_PROFILE")]
    profile: Option<Profile>,

    /// 报告输出目录
    #[arg(long, env = "POLICY_MINER_OUTPUT")]
    output: Option<PathBuf>,

    /// 离线数据文件，替代东方财富接口
    #[arg(long, env = "POLICY_MINER_FIXTURE")]
    fixture: Option<PathBuf>,

    /// 报告日期 YYYY-MM-DD，缺省为今天
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl From<RunArgs> for RunOptions {
    fn from(a: RunArgs) -> Self {
        RunOptions {
            config: a.config,
            catalog: a.catalog,
            profile: a.profile,
            output: a.output,
            fixture: a.fixture,
            date: a.date,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    policy_miner::init_logging();
    let args = Args::parse();

    match args.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(run) => {
            let path = generate_report(run.into()).await?;
            println!("✅ 数据生成完毕: {}", path.display());
        }
        Command::Policies { catalog } => {
            println!("{}", list_policies(catalog.as_deref())?);
        }
    }
    Ok(())
}
