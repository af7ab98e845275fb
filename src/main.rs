use anyhow::Result;
use clap::Parser;
use discord_batch_uploader::cli::Cli;
use discord_batch_uploader::utils::logging;
use discord_batch_uploader::{App, Config, Outcome};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let outcome = App::initialize(config, cli).await?.run().await?;

    if let Some(Outcome::Failed(stage)) = outcome {
        anyhow::bail!("上传失败: {}", stage);
    }

    Ok(())
}
