//! コマンドライン - 解析・生成・PDFを開く

mod app;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub use app::run_command;

/// 物流标签生成器
#[derive(Debug, Parser)]
#[command(name = "logistics_label", version, about = "TEMU物流标签生成器")]
pub struct Cli {
    /// 設定ファイル (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 解析物流信息 (读取文件或标准输入，输出 JSON)
    Parse {
        /// 文本文件 (省略时读取标准输入)
        file: Option<PathBuf>,
    },
    /// 生成标签 PDF
    Generate(GenerateArgs),
    /// 打开已生成的 PDF
    Open {
        path: PathBuf,
    },
    /// 显示店铺列表
    Warehouses,
}

/// ラベル生成の入力
///
/// 適用順: --json → --from-text の解析結果 → 個別の項目指定
#[derive(Debug, Default, Args)]
pub struct GenerateArgs {
    /// LabelData の JSON ファイル
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// 物流信息テキスト ("-" で標準入力)
    #[arg(long)]
    pub from_text: Option<PathBuf>,

    /// 物流名称
    #[arg(long)]
    pub service_type: Option<String>,

    /// 物流单号
    #[arg(long, alias = "phone-number")]
    pub tracking: Option<String>,

    /// 货号
    #[arg(long)]
    pub item: Option<String>,

    /// 商品数量
    #[arg(long, allow_negative_numbers = true)]
    pub quantity: Option<i64>,

    /// 总件数
    #[arg(long, allow_negative_numbers = true)]
    pub total_items: Option<i64>,

    /// 店铺名称
    #[arg(long)]
    pub warehouse: Option<String>,

    /// 收货仓
    #[arg(long = "crate", alias = "shipping-crate")]
    pub shipping_crate: Option<String>,

    /// 生成后自动打印
    #[arg(long)]
    pub print: bool,

    /// 生成后打开 PDF
    #[arg(long)]
    pub open: bool,
}

/// コマンドラインを解析して実行
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_command(cli)
}
