//! PDF処理モジュール - ラベルレコードから印刷用PDFを生成

mod fonts;
mod layout;
mod naming;
mod timestamp;

use chrono::{DateTime, Local, NaiveDateTime};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{Color, Line, Mm, PdfDocument, PdfLayerReference, Point, Polygon, Rgb};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{LabelError, LabelResult};
use crate::record::LabelData;

pub use fonts::{BOLD_FONT_FILE, FontSource, REGULAR_FONT_FILE};
pub use layout::{DrawOp, LabelLayout, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, Tone, Weight, compose};
pub use naming::{create_unique_file, label_file_stem, sanitize_for_filename};
pub use timestamp::format_chinese_datetime;

const DOCUMENT_TITLE: &str = "物流标签";
const FALLBACK_FOLDER_NAME: &str = "TEMU-Labels";

/// 生成済みのラベル
#[derive(Debug, Clone)]
pub struct RenderedLabel {
    /// PDFの絶対パス
    pub path: PathBuf,
    /// 生成時刻を設定したレコード
    pub record: LabelData,
    pub generated_at: NaiveDateTime,
}

/// ラベルレンダラー
#[derive(Debug, Clone)]
pub struct LabelRenderer {
    output_dir: PathBuf,
    fonts: FontSource,
}

impl LabelRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, fonts: FontSource) -> Self {
        Self {
            output_dir: output_dir.into(),
            fonts,
        }
    }

    /// 現在時刻でPDFファイルを生成
    pub fn render(&self, record: LabelData) -> LabelResult<RenderedLabel> {
        let now: DateTime<Local> = Local::now();
        self.render_at(record, now.naive_local())
    }

    /// 指定時刻でPDFファイルを生成
    ///
    /// 検証に失敗した場合はファイルを作らない。
    pub fn render_at(&self, mut record: LabelData, now: NaiveDateTime) -> LabelResult<RenderedLabel> {
        record.validate()?;
        stamp(&mut record, &now);

        let bytes = self.paint(&compose(&record))?;

        let stem = label_file_stem(&record.phone_number, &now);
        let path = self.write_artifact(&stem, &bytes)?;
        info!(path = %path.display(), "ラベルPDFを生成");

        Ok(RenderedLabel {
            path,
            record,
            generated_at: now,
        })
    }

    /// PDFのバイト列を生成（ファイルは作らない）
    pub fn render_bytes(&self, record: &LabelData, now: NaiveDateTime) -> LabelResult<Vec<u8>> {
        record.validate()?;
        let mut record = record.clone();
        stamp(&mut record, &now);
        self.paint(&compose(&record))
    }

    /// レイアウトをPDFに描画
    fn paint(&self, layout: &LabelLayout) -> LabelResult<Vec<u8>> {
        let (doc, page, layer) = PdfDocument::new(
            DOCUMENT_TITLE,
            Mm(layout.width),
            Mm(layout.height),
            "Layer 1",
        );
        let fonts = self.fonts.install(&doc)?;
        let canvas = doc.get_page(page).get_layer(layer);

        for op in &layout.ops {
            draw(&canvas, &fonts, layout.height, op);
        }

        doc.save_to_bytes()
            .map_err(|e| LabelError::Render(e.to_string()))
    }

    /// 出力フォルダに書き込む。フォルダを作れない場合は一時フォルダを使う
    fn write_artifact(&self, stem: &str, bytes: &[u8]) -> LabelResult<PathBuf> {
        let dir = match prepare_dir(&self.output_dir) {
            Ok(dir) => dir,
            Err(e) => {
                warn!(
                    dir = %self.output_dir.display(),
                    error = %e,
                    "出力フォルダの作成に失敗。一時フォルダに保存します"
                );
                prepare_dir(&std::env::temp_dir().join(FALLBACK_FOLDER_NAME)).map_err(|source| {
                    LabelError::Io {
                        path: self.output_dir.clone(),
                        source,
                    }
                })?
            }
        };

        let (path, mut file) = create_unique_file(&dir, stem, "pdf").map_err(|source| LabelError::Io {
            path: dir.join(stem),
            source,
        })?;
        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|source| LabelError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}

/// 生成時刻を設定（呼び出し側の値は破棄）
fn stamp(record: &mut LabelData, now: &NaiveDateTime) {
    record.current_time = format_chinese_datetime(now);
}

/// フォルダを作成して絶対パスを返す
fn prepare_dir(dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    std::path::absolute(dir)
}

fn rgb(tone: Tone) -> Color {
    let v = match tone {
        Tone::Black => 0.0,
        Tone::White => 1.0,
    };
    Color::Rgb(Rgb::new(v, v, v, None))
}

/// mm → pt
fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

/// 左上原点の座標をPDFの左下原点に変換
fn point(x: f32, y: f32, page_height: f32) -> Point {
    Point::new(Mm(x), Mm(page_height - y))
}

fn draw(canvas: &PdfLayerReference, fonts: &fonts::FontSet, page_height: f32, op: &DrawOp) {
    match op {
        DrawOp::Border {
            x,
            y,
            width,
            height,
            thickness,
        } => {
            canvas.set_outline_color(rgb(Tone::Black));
            canvas.set_outline_thickness(mm_to_pt(*thickness));
            canvas.add_line(Line {
                points: vec![
                    (point(*x, *y, page_height), false),
                    (point(x + width, *y, page_height), false),
                    (point(x + width, y + height, page_height), false),
                    (point(*x, y + height, page_height), false),
                ],
                is_closed: true,
            });
        }
        DrawOp::Fill {
            x,
            y,
            width,
            height,
            tone,
        } => {
            canvas.set_fill_color(rgb(*tone));
            canvas.add_polygon(Polygon {
                rings: vec![vec![
                    (point(*x, *y, page_height), false),
                    (point(x + width, *y, page_height), false),
                    (point(x + width, y + height, page_height), false),
                    (point(*x, y + height, page_height), false),
                ]],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            });
        }
        DrawOp::Line { x1, y1, x2, y2 } => {
            canvas.add_line(Line {
                points: vec![
                    (point(*x1, *y1, page_height), false),
                    (point(*x2, *y2, page_height), false),
                ],
                is_closed: false,
            });
        }
        DrawOp::Text {
            x,
            y,
            size,
            weight,
            tone,
            text,
        } => {
            if text.is_empty() {
                return;
            }
            canvas.set_fill_color(rgb(*tone));
            canvas.use_text(
                text.as_str(),
                *size,
                Mm(*x),
                Mm(page_height - y),
                fonts.get(*weight),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LabelField;
    use chrono::NaiveDate;

    fn record() -> LabelData {
        LabelData {
            service_type: "顺丰速运".into(),
            phone_number: "SF1234567890CN".into(),
            item_number: "ABC-001".into(),
            quantity: 5,
            total_items: 1,
            warehouse: "建闽店".into(),
            shipping_crate: "Z-01".into(),
            current_time: "caller supplied".into(),
        }
    }

    fn at(sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(15, 7, sec)
            .unwrap()
    }

    #[test]
    fn test_render_stamps_current_time() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = LabelRenderer::new(dir.path(), FontSource::Builtin);
        let rendered = renderer.render_at(record(), at(0)).unwrap();

        assert_eq!(rendered.record.current_time, "2025年3月5日, 星期三 下午 3:07");
        assert!(rendered.path.is_absolute());
        assert_eq!(rendered.path.extension().unwrap(), "pdf");

        let bytes = std::fs::read(&rendered.path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_rejects_invalid_record_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = LabelRenderer::new(dir.path().join("out"), FontSource::Builtin);

        let mut r = record();
        r.quantity = 0;
        let err = renderer.render_at(r, at(0)).unwrap_err();
        assert_eq!(err.field(), Some(LabelField::Quantity));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_repeated_renders_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = LabelRenderer::new(dir.path(), FontSource::Builtin);

        let a = renderer.render_at(record(), at(1)).unwrap();
        let b = renderer.render_at(record(), at(2)).unwrap();
        let c = renderer.render_at(record(), at(2)).unwrap();

        assert_ne!(a.path, b.path);
        assert_ne!(b.path, c.path);
        assert!(a.path.exists() && b.path.exists() && c.path.exists());
    }

    #[test]
    fn test_file_name_contains_tracking_number() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = LabelRenderer::new(dir.path(), FontSource::Builtin);
        let rendered = renderer.render_at(record(), at(9)).unwrap();
        let name = rendered.path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(name, "logistics_label_SF1234567890CN_20250305-150709-000.pdf");
    }

    #[test]
    fn test_render_bytes() {
        let renderer = LabelRenderer::new("unused", FontSource::Builtin);
        let bytes = renderer.render_bytes(&record(), at(0)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let mut r = record();
        r.item_number.clear();
        assert!(renderer.render_bytes(&r, at(0)).unwrap_err().is_validation());
    }
}
