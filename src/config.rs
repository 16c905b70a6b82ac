//! 設定モジュール - 店舗一覧・出力先・プリンター・抽出ポリシー
//!
//! 優先順位: 既定値 < 設定ファイル (TOML) < 環境変数

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ConfigError;
use crate::parser::ExtractorSettings;

/// 設定ファイルの場所を指定する環境変数
pub const CONFIG_ENV: &str = "LABEL_CONFIG";
/// 出力フォルダを上書きする環境変数
pub const OUTPUT_DIR_ENV: &str = "LABEL_OUTPUT_DIR";
/// プリンター名を上書きする環境変数
pub const PRINTER_ENV: &str = "LABEL_PRINTER";
/// フォントフォルダを上書きする環境変数
pub const FONT_DIR_ENV: &str = "LABEL_FONT_DIR";

const APP_DIR_NAME: &str = "logistics-label";
const OUTPUT_FOLDER_NAME: &str = "TEMU-Labels";
const DEFAULT_WAREHOUSES: &[&str] = &["建闽店", "通洲店"];

/// アプリケーション設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// PDFの出力フォルダ
    pub output_dir: PathBuf,
    /// 店舗一覧（先頭が既定値）
    pub warehouses: Vec<String>,
    /// プリンター名（未指定ならOSの既定プリンター）
    pub printer: Option<String>,
    /// NotoSansSC フォントのあるフォルダ
    pub font_dir: PathBuf,
    /// 抽出ポリシー
    pub extractor: ExtractorSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            warehouses: DEFAULT_WAREHOUSES.iter().map(|s| s.to_string()).collect(),
            printer: None,
            font_dir: PathBuf::from("fonts"),
            extractor: ExtractorSettings::default(),
        }
    }
}

impl Config {
    /// 設定を読み込む
    ///
    /// `explicit` か `LABEL_CONFIG` で指定されたファイルは存在必須。
    /// 既定の場所のファイルは存在する場合のみ読む。
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// TOMLファイルから読み込む
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "設定ファイルを読み込み");
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// 環境変数などによる上書き
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = lookup(OUTPUT_DIR_ENV) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(printer) = lookup(PRINTER_ENV) {
            self.printer = Some(printer);
        }
        if let Some(dir) = lookup(FONT_DIR_ENV) {
            self.font_dir = PathBuf::from(dir);
        }
    }

    /// 設定値の整合性チェック
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.warehouses.iter().all(|w| w.trim().is_empty()) {
            return Err(ConfigError::Invalid("店舗一覧 (warehouses) が空です".into()));
        }
        let ex = &self.extractor;
        if ex.tracking_min_len == 0 || ex.tracking_min_len > ex.tracking_max_len {
            return Err(ConfigError::Invalid(format!(
                "追跡番号の長さ範囲が不正: {}..={}",
                ex.tracking_min_len, ex.tracking_max_len
            )));
        }
        Ok(())
    }

    /// 既定の店舗
    pub fn default_warehouse(&self) -> &str {
        self.warehouses
            .iter()
            .map(String::as_str)
            .find(|w| !w.trim().is_empty())
            .unwrap_or_default()
    }
}

/// 設定済みの店舗か（前後の空白は無視）
pub fn is_known_warehouse(warehouses: &[String], name: &str) -> bool {
    let name = name.trim();
    warehouses.iter().any(|w| w == name)
}

/// 既定の設定ファイルパス
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}

/// 既定の出力フォルダ (ドキュメント/TEMU-Labels)
fn default_output_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Documents")))
        .unwrap_or_else(std::env::temp_dir)
        .join(OUTPUT_FOLDER_NAME)
}
