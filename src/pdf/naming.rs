//! 出力ファイル名の生成

use chrono::NaiveDateTime;
use regex::Regex;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").unwrap());

const FILE_PREFIX: &str = "logistics_label";
const MAX_COMPONENT_CHARS: usize = 40;

/// ラベルファイルの拡張子なしの名前
///
/// フォーマット: logistics_label_[追跡番号]_[YYYYMMDD-HHMMSS-mmm]
pub fn label_file_stem(tracking: &str, at: &NaiveDateTime) -> String {
    let tracking = sanitize_for_filename(tracking);
    let stamp = at.format("%Y%m%d-%H%M%S-%3f");
    if tracking.is_empty() {
        format!("{}_{}", FILE_PREFIX, stamp)
    } else {
        format!("{}_{}_{}", FILE_PREFIX, tracking, stamp)
    }
}

/// ファイル名に使用できない文字を置換
pub fn sanitize_for_filename(text: &str) -> String {
    let result = text.replace(['\r', '\n'], " ");

    let invalid_chars = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];
    let result: String = result
        .chars()
        .map(|c| if invalid_chars.contains(&c) { '_' } else { c })
        .collect();

    let result = WHITESPACE.replace_all(&result, "_");
    let result = UNDERSCORES.replace_all(&result, "_");
    let result = result.trim_matches(['_', '.']);

    result.chars().take(MAX_COMPONENT_CHARS).collect()
}

/// 同名ファイルがある場合は連番を付けて新規作成する
///
/// 既存ファイルを上書きしない (create_new)。
pub fn create_unique_file(directory: &Path, stem: &str, ext: &str) -> io::Result<(PathBuf, File)> {
    let mut counter = 0u32;
    loop {
        let name = if counter == 0 {
            format!("{}.{}", stem, ext)
        } else {
            format!("{}_{}.{}", stem, counter, ext)
        };
        let path = directory.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => counter += 1,
            Err(e) => return Err(e),
        }
    }
}
