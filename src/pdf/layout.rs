//! ラベルの固定レイアウト (100mm x 100mm)
//!
//! 座標は左上原点・ミリ単位。フォントサイズはポイント。
//! 同じレコードからは常に同じ描画命令列が得られる。

use crate::record::LabelData;

/// ページ幅 (mm)
pub const PAGE_WIDTH_MM: f32 = 100.0;
/// ページ高さ (mm)
pub const PAGE_HEIGHT_MM: f32 = 100.0;

/// 見出しの文言
pub const TITLE: &str = "TEMU物流单";

const BORDER_THICKNESS_MM: f32 = 0.5;

/// 文字の太さ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

/// 描画色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Black,
    White,
}

/// 描画命令
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// 枠線
    Border {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        thickness: f32,
    },
    /// 塗りつぶし矩形
    Fill {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        tone: Tone,
    },
    /// 罫線
    Line { x1: f32, y1: f32, x2: f32, y2: f32 },
    /// 文字列 (y はベースライン)
    Text {
        x: f32,
        y: f32,
        size: f32,
        weight: Weight,
        tone: Tone,
        text: String,
    },
}

/// 1ページ分のレイアウト
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub width: f32,
    pub height: f32,
    pub ops: Vec<DrawOp>,
}

impl LabelLayout {
    /// 描画される文字列の一覧
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

fn text(x: f32, y: f32, size: f32, weight: Weight, value: impl Into<String>) -> DrawOp {
    DrawOp::Text {
        x,
        y,
        size,
        weight,
        tone: Tone::Black,
        text: value.into(),
    }
}

fn hline(y: f32) -> DrawOp {
    DrawOp::Line {
        x1: 5.0,
        y1: y,
        x2: 95.0,
        y2: y,
    }
}

/// レコードからレイアウトを組み立てる
///
/// `current_time` は呼び出し前に設定済みであること。
pub fn compose(record: &LabelData) -> LabelLayout {
    use Weight::{Bold, Regular};

    let mut ops = Vec::with_capacity(24);

    // 外枠
    ops.push(DrawOp::Border {
        x: 5.0,
        y: 5.0,
        width: 90.0,
        height: 90.0,
        thickness: BORDER_THICKNESS_MM,
    });

    // ヘッダー: 黒地に白文字の見出し、物流名称、追跡番号
    ops.push(DrawOp::Fill {
        x: 30.0,
        y: 8.0,
        width: 40.0,
        height: 10.0,
        tone: Tone::Black,
    });
    ops.push(DrawOp::Text {
        x: 32.0,
        y: 15.0,
        size: 16.0,
        weight: Bold,
        tone: Tone::White,
        text: TITLE.to_string(),
    });
    ops.push(text(15.0, 25.0, 16.0, Bold, record.service_type.trim()));
    ops.push(text(25.0, 35.0, 22.0, Regular, record.phone_number.trim()));

    // 本体: 表
    ops.push(hline(40.0));
    ops.push(DrawOp::Line {
        x1: 50.0,
        y1: 40.0,
        x2: 50.0,
        y2: 80.0,
    });
    for y in [50.0, 60.0, 70.0, 80.0] {
        ops.push(hline(y));
    }

    ops.push(text(20.0, 46.0, 16.0, Regular, "货号"));
    ops.push(text(70.0, 46.0, 16.0, Regular, "数量/双"));
    ops.push(text(20.0, 57.0, 18.0, Bold, record.item_number.trim()));
    ops.push(text(70.0, 57.0, 18.0, Bold, record.quantity.to_string()));

    ops.push(text(
        8.0,
        76.0,
        16.0,
        Bold,
        format!("共{}件", record.effective_total_items()),
    ));
    ops.push(text(74.0, 76.0, 16.0, Regular, record.warehouse.trim()));

    // フッター: 收货仓と生成時刻
    ops.push(text(
        12.0,
        86.0,
        14.0,
        Regular,
        format!("收货仓: {}", record.shipping_crate.trim()),
    ));
    ops.push(text(10.0, 93.0, 14.0, Regular, record.current_time.as_str()));

    LabelLayout {
        width: PAGE_WIDTH_MM,
        height: PAGE_HEIGHT_MM,
        ops,
    }
}
