//! マーカールール - 行ごとに上から順に評価する (マッチャー, 項目) の一覧

use regex::{Captures, Regex};
use std::ops::Range;
use std::sync::LazyLock;

use crate::config::is_known_warehouse;
use crate::record::LabelField;

/// マーカーと値の区切り (コロン or 空白の連続)
const SEP: &str = r"(?:\s*[:：]\s*|\s+)";

/// 文字列値: 区切り記号の手前まで
const TEXT_VALUE: &str = r"(?P<value>[^\s,，;；][^,，;；]*)";

/// コード値: 空白・区切り記号の手前まで
const CODE_VALUE: &str = r"(?P<value>[^\s,，;；、]+)";

/// 整数値: 小数・桁区切りの場合はマッチさせない
const INTEGER_VALUE: &str = r"(?P<value>[+-]?\d+)(?:$|[^\d.,]|[.,](?:$|\D))";

/// 文字列値の終わりとみなす後続のマーカー (空白の後ろ、コロン付き)
static NEXT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s(?:物流单号|快递单号|运单号|订单号|备货单号|单号|追踪号|跟踪号|tracking|物流公司|快递公司|物流名称|快递名称|承运公司|承运商|carrier|物流|快递|总件数|总箱数|发货数量|商品数量|总数量|数量|qty|quantity|商品货号|货号|商品编码|款号|sku|item\s*no|收货仓库|收货仓|目的仓|仓位|店铺名称|店铺|门店)\s*[:：]",
    )
    .unwrap()
});

/// 値の取り出し方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueKind {
    Text,
    Code,
    Integer,
    /// 設定済みの店舗名のみ受け付ける
    Warehouse,
    /// 「物流单号：承运商，单号」形式
    CarrierAndTracking,
}

impl ValueKind {
    /// 行末まで続きうる文字列値か
    fn is_free_text(self) -> bool {
        matches!(self, Self::Text | Self::Warehouse)
    }
}

/// 抽出された値
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FieldValue {
    Text(String),
    Integer(i64),
}

/// ルールのマッチ結果
#[derive(Debug)]
pub(crate) struct RuleMatch {
    pub span: Range<usize>,
    pub values: Vec<(LabelField, FieldValue)>,
}

/// 1つのマーカールール
pub(crate) struct MarkerRule {
    pub name: &'static str,
    pub field: LabelField,
    pub kind: ValueKind,
    pattern: Regex,
}

impl MarkerRule {
    fn new(name: &'static str, field: LabelField, kind: ValueKind, pattern: &str) -> Self {
        Self {
            name,
            field,
            kind,
            pattern: Regex::new(&format!("(?i){}", pattern)).unwrap(),
        }
    }

    fn keyed(name: &'static str, field: LabelField, kind: ValueKind, markers: &[&str]) -> Self {
        let value = match kind {
            ValueKind::Code => CODE_VALUE,
            ValueKind::Integer => INTEGER_VALUE,
            _ => TEXT_VALUE,
        };
        let pattern = format!("(?:{}){}{}", markers.join("|"), SEP, value);
        Self::new(name, field, kind, &pattern)
    }

    /// このルールが設定する項目
    pub fn fields(&self) -> &[LabelField] {
        match self.kind {
            ValueKind::CarrierAndTracking => &[LabelField::ServiceType, LabelField::PhoneNumber],
            _ => std::slice::from_ref(&self.field),
        }
    }

    /// 行の中で、既に使われた範囲と重ならない最初のマッチを探す
    ///
    /// 文字列値は次のマーカーか使用済みの範囲の手前で切る。
    pub fn find(&self, line: &str, consumed: &[Range<usize>], warehouses: &[String]) -> Option<RuleMatch> {
        for caps in self.pattern.captures_iter(line) {
            let Some(whole) = caps.get(0) else { continue };
            let mut span = whole.range();
            let mut value = caps.name("value").map(|m| m.range());

            if let Some(v) = value.as_mut().filter(|_| self.kind.is_free_text()) {
                if let Some(next) = NEXT_MARKER.find(&line[v.clone()]) {
                    v.end = v.start + next.start();
                }
                if let Some(cut) = consumed
                    .iter()
                    .filter(|c| c.start > v.start && c.start < v.end)
                    .map(|c| c.start)
                    .min()
                {
                    v.end = cut;
                }
                span.end = v.end;
            }

            if consumed.iter().any(|c| overlaps(c, &span)) {
                continue;
            }
            let value = value.map(|v| &line[v]);
            if let Some(values) = self.values(&caps, value, warehouses) {
                return Some(RuleMatch { span, values });
            }
        }
        None
    }

    fn values(
        &self,
        caps: &Captures<'_>,
        value: Option<&str>,
        warehouses: &[String],
    ) -> Option<Vec<(LabelField, FieldValue)>> {
        match self.kind {
            ValueKind::Text | ValueKind::Code => {
                let text = clean_value(value?)?;
                Some(vec![(self.field, FieldValue::Text(text))])
            }
            ValueKind::Integer => {
                let number = value?.trim_start_matches('+').parse::<i64>().ok()?;
                Some(vec![(self.field, FieldValue::Integer(number))])
            }
            ValueKind::Warehouse => {
                let text = clean_value(value?)?;
                is_known_warehouse(warehouses, &text).then(|| vec![(self.field, FieldValue::Text(text))])
            }
            ValueKind::CarrierAndTracking => {
                let carrier = clean_value(caps.name("carrier")?.as_str())?;
                let tracking = clean_value(caps.name("tracking")?.as_str())?;
                // 番号には数字が必要
                if !tracking.chars().any(|c| c.is_ascii_digit()) {
                    return None;
                }
                Some(vec![
                    (LabelField::ServiceType, FieldValue::Text(carrier)),
                    (LabelField::PhoneNumber, FieldValue::Text(tracking)),
                ])
            }
        }
    }
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// 値の前後の空白と末尾の句読点を除去
fn clean_value(raw: &str) -> Option<String> {
    let value = raw
        .trim()
        .trim_end_matches(['。', '.', '、'])
        .trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// ルール一覧 (評価順)
///
/// 緩いマーカー (物流/快递) は最後に置く。
pub(crate) static MARKER_RULES: LazyLock<Vec<MarkerRule>> = LazyLock::new(|| {
    vec![
        MarkerRule::new(
            "carrier_and_tracking",
            LabelField::PhoneNumber,
            ValueKind::CarrierAndTracking,
            r"(?:物流单号|快递单号|运单号|物流|快递)\s*[:：]\s*(?P<carrier>[^\s\d,，:：;；][^\s,，:：;；]*)\s*[,，]\s*(?P<tracking>[A-Za-z0-9][A-Za-z0-9-]*)",
        ),
        // 「邮政特快专递，13616578186」のようにマーカーなしで社名から始まる行
        MarkerRule::new(
            "named_carrier_and_tracking",
            LabelField::PhoneNumber,
            ValueKind::CarrierAndTracking,
            r"(?:^|[\s,，;；])(?P<carrier>[^\s\d,，:：;；]*?(?:邮政|快递|物流)[^\s,，:：;；]*)\s*[,，]\s*(?P<tracking>[A-Za-z0-9][A-Za-z0-9-]{4,})",
        ),
        MarkerRule::keyed(
            "tracking",
            LabelField::PhoneNumber,
            ValueKind::Code,
            &[
                "物流单号",
                "快递单号",
                "运单号",
                "追踪号",
                "跟踪号",
                r"tracking\s*(?:number|no\.?)?",
                // 订单号・备货单号は除外
                "(?:^|[^订货])单号",
            ],
        ),
        MarkerRule::keyed(
            "total_items",
            LabelField::TotalItems,
            ValueKind::Integer,
            &["总件数", "总箱数"],
        ),
        MarkerRule::new(
            "total_items_count",
            LabelField::TotalItems,
            ValueKind::Integer,
            r"共\s*(?P<value>\d+)\s*(?:件|箱)",
        ),
        MarkerRule::new(
            "quantity",
            LabelField::Quantity,
            ValueKind::Integer,
            &format!(
                r"(?:发货数量|商品数量|(?:^|[^总])数量|qty|quantity)\s*[:：]?\s*{}",
                INTEGER_VALUE
            ),
        ),
        MarkerRule::keyed(
            "item",
            LabelField::ItemNumber,
            ValueKind::Code,
            &["商品货号", "货号", "商品编码", "款号", "sku", r"item\s*no\.?"],
        ),
        MarkerRule::keyed(
            "shipping_crate",
            LabelField::ShippingCrate,
            ValueKind::Text,
            &["收货仓库", "收货仓", "目的仓", "仓位"],
        ),
        MarkerRule::keyed(
            "warehouse",
            LabelField::Warehouse,
            ValueKind::Warehouse,
            &["店铺名称", "店铺", "门店"],
        ),
        // 単独の「物流」「快递」は社名の末尾にも付くため、コロン区切りのみ
        MarkerRule::new(
            "carrier",
            LabelField::ServiceType,
            ValueKind::Text,
            &format!(
                r"(?:(?:物流公司|快递公司|物流名称|快递名称|承运公司|承运商|carrier){}|(?:物流|快递)\s*[:：]\s*){}",
                SEP, TEXT_VALUE
            ),
        ),
    ]
});
