//! フォント読み込み (NotoSansSC, なければ組み込みフォント)

use printpdf::{BuiltinFont, IndirectFontRef, PdfDocumentReference};
use std::io::Cursor;
use std::path::Path;
use tracing::{info, warn};

use super::layout::Weight;
use crate::error::{LabelError, LabelResult};

pub const REGULAR_FONT_FILE: &str = "NotoSansSC-Regular.ttf";
pub const BOLD_FONT_FILE: &str = "NotoSansSC-Bold.ttf";

/// フォントの入手元
#[derive(Clone)]
pub enum FontSource {
    /// TTFファイルから読み込んだデータ
    Embedded {
        regular: Vec<u8>,
        bold: Option<Vec<u8>>,
    },
    /// PDF組み込みフォント（中国語は表示できない）
    Builtin,
}

impl std::fmt::Debug for FontSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Embedded { regular, bold } => f
                .debug_struct("Embedded")
                .field("regular_bytes", &regular.len())
                .field("bold_bytes", &bold.as_ref().map(Vec::len))
                .finish(),
            Self::Builtin => f.write_str("Builtin"),
        }
    }
}

impl FontSource {
    /// フォントフォルダを探す
    pub fn discover(font_dir: &Path) -> Self {
        let regular_path = font_dir.join(REGULAR_FONT_FILE);
        let regular = match std::fs::read(&regular_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    path = %regular_path.display(),
                    error = %e,
                    "フォントファイルが見つかりません。組み込みフォントを使用します（中国語が表示されない可能性があります）"
                );
                return Self::Builtin;
            }
        };

        let bold_path = font_dir.join(BOLD_FONT_FILE);
        let bold = match std::fs::read(&bold_path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(path = %bold_path.display(), error = %e, "太字フォントがないため通常フォントで代用");
                None
            }
        };

        info!(dir = %font_dir.display(), "フォントを読み込み");
        Self::Embedded { regular, bold }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded { .. })
    }

    /// ドキュメントにフォントを登録
    pub(crate) fn install(&self, doc: &PdfDocumentReference) -> LabelResult<FontSet> {
        match self {
            Self::Embedded { regular, bold } => {
                let regular_ref = doc
                    .add_external_font(Cursor::new(regular.as_slice()))
                    .map_err(render_err)?;
                let bold_ref = match bold {
                    Some(bytes) => doc
                        .add_external_font(Cursor::new(bytes.as_slice()))
                        .map_err(render_err)?,
                    None => regular_ref.clone(),
                };
                Ok(FontSet {
                    regular: regular_ref,
                    bold: bold_ref,
                })
            }
            Self::Builtin => Ok(FontSet {
                regular: doc
                    .add_builtin_font(BuiltinFont::Helvetica)
                    .map_err(render_err)?,
                bold: doc
                    .add_builtin_font(BuiltinFont::HelveticaBold)
                    .map_err(render_err)?,
            }),
        }
    }
}

fn render_err(e: impl std::fmt::Display) -> LabelError {
    LabelError::Render(e.to_string())
}

/// 登録済みフォント
pub(crate) struct FontSet {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl FontSet {
    pub fn get(&self, weight: Weight) -> &IndirectFontRef {
        match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
        }
    }
}
