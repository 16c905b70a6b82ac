//! コマンドの実行

use anyhow::{Context, Result, bail};
use std::io::Read;
use std::path::Path;
use tracing::debug;

use super::{Cli, Command, GenerateArgs};
use crate::config::Config;
use crate::dispatch::{Printer, extract_artifact_path};
use crate::opener::Launcher;
use crate::record::LabelData;
use crate::service::LabelService;

/// 解析済みのコマンドを実行
pub fn run_command(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("設定の読み込みに失敗")?;
    debug!(?config, "設定");
    let service = LabelService::new(config);

    match cli.command {
        Command::Parse { file } => {
            let text = read_input(file.as_deref())?;
            let parsed = service.parse_logistics_info(&text);
            if parsed.is_empty() {
                eprintln!("未能识别任何字段，请手动填写。");
            } else {
                eprintln!("解析成功！请确认信息并调整需要修改的部分。");
            }
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Command::Generate(args) => {
            let record = build_record(&service, &args)?;
            let message = service
                .generate_and_print_label(record, args.print)
                .map_err(|e| anyhow::anyhow!("生成失败: {}", e))?;
            println!("{}", message);

            if args.open {
                let path = extract_artifact_path(&message).context("无法从结果中取得 PDF 路径")?;
                service
                    .open_pdf(&path)
                    .map_err(|e| anyhow::anyhow!("打开PDF失败: {}", e))?;
            }
        }
        Command::Open { path } => {
            service
                .open_pdf(&path)
                .map_err(|e| anyhow::anyhow!("打开PDF失败: {}", e))?;
        }
        Command::Warehouses => {
            for (i, name) in service.config().warehouses.iter().enumerate() {
                let marker = if i == 0 { " (默认)" } else { "" };
                println!("{}{}", name, marker);
            }
        }
    }

    Ok(())
}

/// コマンドライン引数からレコードを組み立てる
///
/// JSON → テキスト解析 → 個別指定 の順に重ねる。
pub(crate) fn build_record<P: Printer, L: Launcher>(
    service: &LabelService<P, L>,
    args: &GenerateArgs,
) -> Result<LabelData> {
    let mut record = match &args.json {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("JSONファイルの読み込みに失敗: {}", path.display()))?;
            let mut record: LabelData = serde_json::from_str(&text)
                .with_context(|| format!("JSONの解析に失敗: {}", path.display()))?;
            if record.warehouse.trim().is_empty() {
                record.warehouse = service.config().default_warehouse().to_string();
            }
            record
        }
        None => service.new_record(),
    };

    if let Some(source) = &args.from_text {
        let text = read_input(Some(source.as_path()))?;
        let parsed = service.parse_logistics_info(&text);
        debug!(fields = ?parsed.resolved_fields(), "テキストから抽出");
        record.merge(&parsed);
    }

    // 手入力は常に優先
    if let Some(v) = &args.service_type {
        record.service_type = v.clone();
    }
    if let Some(v) = &args.tracking {
        record.phone_number = v.clone();
    }
    if let Some(v) = &args.item {
        record.item_number = v.clone();
    }
    if let Some(v) = args.quantity {
        record.quantity = v;
    }
    if let Some(v) = args.total_items {
        record.total_items = v;
    }
    if let Some(v) = &args.warehouse {
        record.warehouse = v.clone();
    }
    if let Some(v) = &args.shipping_crate {
        record.shipping_crate = v.clone();
    }

    Ok(record)
}

/// ファイルまたは標準入力 ("-" / 省略) を読む
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("ファイルの読み込みに失敗: {}", p.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("標準入力の読み込みに失敗")?;
            if text.trim().is_empty() {
                bail!("输入为空");
            }
            Ok(text)
        }
    }
}
