use clap::Parser;

use biolinks::cli::{Cli, Commands};
use std::sync::Arc;

use biolinks::config::StaticConfig;
use biolinks::system::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let command = cli.command_or_default();

    // 加载配置（config.toml + ENV）
    let config = match StaticConfig::load(Some(&cli.config)).and_then(|config| {
        config.validate()?;
        Ok(Arc::new(config))
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    match command {
        Commands::Serve => {
            let _guard = init_logging(&config.logging)
                .map_err(|e| anyhow::anyhow!(e.format_simple()))?;
            biolinks::runtime::modes::run_server(config).await
        }
        cmd => {
            // 管理命令只输出警告以上的日志，避免干扰命令输出
            let mut logging = config.logging.clone();
            if std::env::var("RUST_LOG").is_err() {
                logging.level = "warn".to_string();
            }
            let _guard =
                init_logging(&logging).map_err(|e| anyhow::anyhow!(e.format_simple()))?;

            if let Err(e) = biolinks::runtime::modes::run_cli(cmd, &config).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
