//! 画面層との境界 - 解析・生成/印刷・PDFを開く の3操作
//!
//! 状態は設定のみ。フォームの内容は呼び出しごとに [`LabelData`] で受け取る。

use std::path::Path;

use crate::config::Config;
use crate::dispatch::{DispatchController, DispatchOutcome, Printer, SystemPrinter};
use crate::error::{LabelResult, OpenError};
use crate::opener::{ArtifactOpener, Launcher, SystemLauncher};
use crate::parser::Extractor;
use crate::record::{LabelData, PartialLabelData};

/// ラベル発行サービス
#[derive(Debug, Clone)]
pub struct LabelService<P = SystemPrinter, L = SystemLauncher> {
    config: Config,
    extractor: Extractor,
    dispatcher: DispatchController<P>,
    opener: ArtifactOpener<L>,
}

impl LabelService {
    /// OSのプリンター・ビューアーを使うサービス
    pub fn new(config: Config) -> Self {
        let dispatcher = DispatchController::from_config(&config);
        Self::with_parts(config, dispatcher, ArtifactOpener::default())
    }
}

impl<P: Printer, L: Launcher> LabelService<P, L> {
    pub fn with_parts(config: Config, dispatcher: DispatchController<P>, opener: ArtifactOpener<L>) -> Self {
        Self {
            extractor: Extractor::from_config(&config),
            config,
            dispatcher,
            opener,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 既定の店舗を設定した空のレコード
    pub fn new_record(&self) -> LabelData {
        LabelData::with_warehouse(self.config.default_warehouse())
    }

    /// ParseLogisticsInfo: 貼り付けテキストを解析（失敗しない）
    pub fn parse_logistics_info(&self, raw_text: &str) -> PartialLabelData {
        self.extractor.extract(raw_text)
    }

    /// 構造化された発行結果を返す
    pub fn dispatch(&self, record: LabelData, auto_print: bool) -> LabelResult<DispatchOutcome> {
        self.dispatcher.generate_and_dispatch(record, auto_print)
    }

    /// GenerateAndPrintLabel: 生成して必要なら印刷し、パスを含むステータス文字列を返す
    pub fn generate_and_print_label(&self, record: LabelData, auto_print: bool) -> LabelResult<String> {
        self.dispatch(record, auto_print)
            .map(|outcome| outcome.status_message())
    }

    /// OpenPDF: 生成済みPDFを開く
    pub fn open_pdf(&self, path: impl AsRef<Path>) -> Result<(), OpenError> {
        self.opener.open(path.as_ref())
    }
}
