//! 物流ラベル発行ツール - メインエントリポイント

use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // ロギング初期化（RUST_LOG で調整）
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // 環境変数の読み込み
    dotenvy::dotenv().ok();

    logistics_label::cli::run()
}
