use anyhow::Result;
use meeting_insights::utils::logging;
use meeting_insights::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let mut config = Config::from_env()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 命令行第一个参数优先于 TRANSCRIPT_PATH
    if let Some(path) = std::env::args().nth(1) {
        config.transcript_path = path;
    }

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
