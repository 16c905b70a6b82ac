//! 発行モジュール - PDF生成と印刷依頼をまとめる
//!
//! 内部では [`DispatchOutcome`] を返し、画面向けの文字列は境界でのみ組み立てる。

pub mod print;

use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::{Config, is_known_warehouse};
use crate::error::{LabelError, LabelResult, PrintError};
use crate::pdf::{FontSource, LabelRenderer};
use crate::record::{LabelData, LabelField};

pub use print::{PrintCommand, Printer, SystemPrinter};

/// ステータス文字列の中でパスの直前に置く定型句
pub const ARTIFACT_SENTINEL: &str = "标签已生成: ";

/// 発行結果
#[derive(Debug)]
pub struct DispatchOutcome {
    /// 生成したPDFの絶対パス
    pub path: PathBuf,
    /// 生成時刻を設定したレコード
    pub record: LabelData,
    /// 印刷キューに送ったか
    pub printed: bool,
    /// 印刷の失敗内容（PDFは残る）
    pub print_error: Option<PrintError>,
}

impl DispatchOutcome {
    /// 画面表示用のステータス文字列
    ///
    /// パスは常に末尾に置く: `...标签已生成: /abs/path.pdf`
    pub fn status_message(&self) -> String {
        let artifact = format!("{}{}", ARTIFACT_SENTINEL, self.path.display());
        match (&self.print_error, self.printed) {
            (Some(e), _) => format!("打印失败: {}。{}", e, artifact),
            (None, true) => format!("已发送到打印机。{}", artifact),
            (None, false) => artifact,
        }
    }
}

/// ステータス文字列からPDFのパスを取り出す
pub fn extract_artifact_path(message: &str) -> Option<PathBuf> {
    let start = message.rfind(ARTIFACT_SENTINEL)? + ARTIFACT_SENTINEL.len();
    let token = message[start..].lines().next()?.trim();
    if !token.to_ascii_lowercase().ends_with(".pdf") {
        return None;
    }
    let path = PathBuf::from(token);
    path.is_absolute().then_some(path)
}

/// 発行コントローラー
#[derive(Debug, Clone)]
pub struct DispatchController<P = SystemPrinter> {
    renderer: LabelRenderer,
    printer: P,
    /// 受け付ける店舗名（空ならチェックしない）
    warehouses: Vec<String>,
}

impl DispatchController<SystemPrinter> {
    /// 設定から組み立てる
    pub fn from_config(config: &Config) -> Self {
        let renderer = LabelRenderer::new(&config.output_dir, FontSource::discover(&config.font_dir));
        Self::new(
            renderer,
            SystemPrinter::new(config.printer.clone()),
            config.warehouses.clone(),
        )
    }
}

impl<P: Printer> DispatchController<P> {
    pub fn new(renderer: LabelRenderer, printer: P, warehouses: Vec<String>) -> Self {
        Self {
            renderer,
            printer,
            warehouses,
        }
    }

    /// 生成前の検証（レンダラーの検証 + 店舗名）
    pub fn validate(&self, record: &LabelData) -> LabelResult<()> {
        record.validate()?;

        if self.warehouses.is_empty() {
            return Ok(());
        }
        let warehouse = record.warehouse.trim();
        if warehouse.is_empty() {
            return Err(LabelError::missing(LabelField::Warehouse));
        }
        if !is_known_warehouse(&self.warehouses, warehouse) {
            return Err(LabelError::invalid(LabelField::Warehouse, warehouse));
        }
        Ok(())
    }

    /// ラベルを生成し、必要なら印刷する
    ///
    /// 印刷の失敗は結果に含めるだけで、生成済みのPDFは削除しない。
    pub fn generate_and_dispatch(&self, mut record: LabelData, auto_print: bool) -> LabelResult<DispatchOutcome> {
        self.validate(&record)?;
        record.warehouse = record.warehouse.trim().to_string();

        let rendered = self.renderer.render(record)?;

        let mut outcome = DispatchOutcome {
            path: rendered.path,
            record: rendered.record,
            printed: false,
            print_error: None,
        };

        if auto_print {
            match self.printer.submit(&outcome.path) {
                Ok(()) => outcome.printed = true,
                Err(e) => {
                    warn!(path = %outcome.path.display(), error = %e, "印刷に失敗（PDFは保存済み）");
                    outcome.print_error = Some(e);
                }
            }
        }

        info!(
            path = %outcome.path.display(),
            printed = outcome.printed,
            "ラベルを発行"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(printed: bool, print_error: Option<PrintError>) -> DispatchOutcome {
        DispatchOutcome {
            path: PathBuf::from("/labels/logistics_label_SF1_20250305-150709-000.pdf"),
            record: LabelData::default(),
            printed,
            print_error,
        }
    }

    struct NoPrinter;

    impl Printer for NoPrinter {
        fn submit(&self, _: &std::path::Path) -> Result<(), PrintError> {
            Ok(())
        }
    }

    fn controller(warehouses: &[&str]) -> DispatchController<NoPrinter> {
        DispatchController::new(
            LabelRenderer::new("unused", FontSource::Builtin),
            NoPrinter,
            warehouses.iter().map(|w| w.to_string()).collect(),
        )
    }

    fn record(warehouse: &str) -> LabelData {
        LabelData {
            service_type: "顺丰速运".into(),
            phone_number: "SF1234567890CN".into(),
            item_number: "ABC-001".into(),
            quantity: 5,
            shipping_crate: "Z-01".into(),
            ..LabelData::with_warehouse(warehouse)
        }
    }

    #[test]
    fn test_validate_warehouse_membership() {
        let dispatcher = controller(&["建闽店", "通洲店"]);
        assert!(dispatcher.validate(&record(" 通洲店 ")).is_ok());

        let err = dispatcher.validate(&record("别的店")).unwrap_err();
        assert_eq!(err.field(), Some(LabelField::Warehouse));
        assert!(err.to_string().contains("别的店"));

        let err = dispatcher.validate(&record("  ")).unwrap_err();
        assert_eq!(err.field(), Some(LabelField::Warehouse));

        // 店舗一覧が空なら確認しない
        assert!(controller(&[]).validate(&record("别的店")).is_ok());
    }

    #[test]
    fn test_status_message_formats() {
        assert_eq!(
            outcome(false, None).status_message(),
            "标签已生成: /labels/logistics_label_SF1_20250305-150709-000.pdf"
        );
        assert_eq!(
            outcome(true, None).status_message(),
            "已发送到打印机。标签已生成: /labels/logistics_label_SF1_20250305-150709-000.pdf"
        );
        let failed = outcome(
            false,
            Some(PrintError::CommandFailed {
                program: "lpr".into(),
                detail: "lpr: Error - no default destination available.".into(),
            }),
        )
        .status_message();
        assert!(failed.starts_with("打印失败: "));
        assert!(failed.ends_with("标签已生成: /labels/logistics_label_SF1_20250305-150709-000.pdf"));
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_artifact_path_round_trip() {
        for printed in [false, true] {
            let o = outcome(printed, None);
            assert_eq!(extract_artifact_path(&o.status_message()), Some(o.path.clone()));
        }
        let o = outcome(
            false,
            Some(PrintError::UnsupportedPlatform("标签已生成: x.pdf".into())),
        );
        assert_eq!(extract_artifact_path(&o.status_message()), Some(o.path.clone()));
    }

    #[test]
    fn test_extract_artifact_path_rejects_non_paths() {
        assert_eq!(extract_artifact_path("生成失败"), None);
        assert_eq!(extract_artifact_path("标签已生成: relative/label.pdf"), None);
        assert_eq!(extract_artifact_path("标签已生成: /labels/label.txt"), None);
    }
}
