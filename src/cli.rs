use std::path::PathBuf;

use clap::Parser;

/// 命令行参数
#[derive(Debug, Clone, Parser)]
#[command(name = "discord-batch-uploader")]
#[command(about = "把超出 Discord 限制的文件拆成多条消息自动上传", long_about = None)]
#[command(version)]
pub struct Cli {
    /// 要上传的文件或目录（目录只读取一层）
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// 档位 id：0 Free, 1 Nitro Classic, 2 Nitro, 3 Nitro Basic
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub tier: Option<u8>,

    /// 跳过确认直接上传
    #[arg(short, long)]
    pub yes: bool,

    /// 只输出计划，不连接浏览器
    #[arg(long)]
    pub dry_run: bool,

    /// 把本次的档位写回设置文件
    #[arg(long)]
    pub save_settings: bool,
}
