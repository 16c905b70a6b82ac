//! 物流ラベル発行ツール - 貼り付けた物流通知から100mm角のラベルPDFを生成
//!
//! # 機能
//! - 物流通知テキストから物流名称・追跡番号・货号・数量・收货仓を抽出
//! - 固定レイアウトのラベルPDFを生成
//! - OSの印刷機構への送信（失敗してもPDFは残る）
//! - 生成済みPDFを既定のビューアーで開く

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod opener;
pub mod parser;
pub mod pdf;
pub mod record;
pub mod service;

pub use config::Config;
pub use dispatch::{DispatchController, DispatchOutcome, extract_artifact_path};
pub use error::{LabelError, OpenError, PrintError};
pub use parser::{Extractor, extract};
pub use pdf::LabelRenderer;
pub use record::{LabelData, LabelField, PartialLabelData};
pub use service::LabelService;
