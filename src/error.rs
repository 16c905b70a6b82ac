//! エラー型定義

use std::path::PathBuf;
use thiserror::Error;

use crate::record::LabelField;

/// ラベル生成のエラー
#[derive(Debug, Error)]
pub enum LabelError {
    /// 必須項目の未入力・不正値
    #[error("{}", validation_message(.field, .value.as_deref()))]
    Validation {
        field: LabelField,
        value: Option<String>,
    },

    /// PDF組版の失敗
    #[error("PDF生成失败: {0}")]
    Render(String),

    /// ファイル入出力の失敗
    #[error("文件写入失败 {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LabelError {
    pub(crate) fn missing(field: LabelField) -> Self {
        Self::Validation { field, value: None }
    }

    pub(crate) fn invalid(field: LabelField, value: impl Into<String>) -> Self {
        Self::Validation {
            field,
            value: Some(value.into()),
        }
    }

    /// 検証エラーの対象項目
    pub fn field(&self) -> Option<LabelField> {
        match self {
            Self::Validation { field, .. } => Some(*field),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

fn validation_message(field: &LabelField, value: Option<&str>) -> String {
    match (field, value) {
        (LabelField::Quantity, Some(v)) => format!("商品数量必须大于 0 (quantity = {})", v),
        (LabelField::Warehouse, Some(v)) => format!("店铺名称无效: {} (warehouse)", v),
        (field, Some(v)) => format!("{}无效: {} ({})", field.label(), v, field.key()),
        (field, None) => format!("必填字段未填写: {} ({})", field.label(), field.key()),
    }
}

/// 印刷依頼のエラー（致命的ではない）
#[derive(Debug, Error)]
pub enum PrintError {
    /// 印刷コマンドを起動できなかった
    #[error("无法启动打印命令 {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// 印刷コマンドが異常終了した
    #[error("打印命令 {program} 执行失败: {detail}")]
    CommandFailed { program: String, detail: String },

    /// 未対応OS
    #[error("不支持的操作系统: {0}")]
    UnsupportedPlatform(String),
}

/// 成果物オープンのエラー
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("文件不存在: {}", .0.display())]
    NotFound(PathBuf),

    #[error("无法打开文件 {}: {source}", .path.display())]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 設定読み込みのエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("設定ファイルの読み込みに失敗 {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("設定ファイルの解析に失敗 {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("設定値が不正: {0}")]
    Invalid(String),
}

pub type LabelResult<T> = Result<T, LabelError>;
