//! テキスト解析モジュール - 貼り付けられた物流通知からラベル情報を抽出
//!
//! 1行ずつ [`rules::MARKER_RULES`] を上から順に評価し、マーカーの後ろの値を拾う。
//! 追跡番号がマーカーで見つからない場合は形状マッチで補う。
//! 根拠のない項目は推測せず空のままにする。

mod rules;
mod tracking;

use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

use crate::config::Config;
use crate::record::{LabelField, PartialLabelData};

use rules::{FieldValue, MARKER_RULES};
pub use tracking::TrackingShape;

/// マーカーと形状マッチのどちらの追跡番号を優先するか
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingPolicy {
    /// マーカーで見つからない場合のみ形状マッチを使う
    #[default]
    MarkerFirst,
    /// 形状マッチの候補があればマーカーの値より優先する
    ShapeFirst,
}

/// 抽出の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    pub tracking_policy: TrackingPolicy,
    pub tracking_min_len: usize,
    pub tracking_max_len: usize,
    pub tracking_require_mixed: bool,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            tracking_policy: TrackingPolicy::MarkerFirst,
            tracking_min_len: 10,
            tracking_max_len: 20,
            tracking_require_mixed: true,
        }
    }
}

impl ExtractorSettings {
    pub fn tracking_shape(&self) -> TrackingShape {
        TrackingShape {
            min_len: self.tracking_min_len,
            max_len: self.tracking_max_len,
            require_mixed: self.tracking_require_mixed,
        }
    }
}

/// 既定の設定でテキストを解析
pub fn extract(raw: &str) -> PartialLabelData {
    Extractor::default().extract(raw)
}

/// フィールド抽出器
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    settings: ExtractorSettings,
    /// 店舗名として受け付ける値
    warehouses: Vec<String>,
}

/// 行内で値として使われた範囲
struct Claim {
    field: LabelField,
    span: Range<usize>,
}

impl Extractor {
    pub fn new(settings: ExtractorSettings, warehouses: Vec<String>) -> Self {
        Self {
            settings,
            warehouses,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.extractor.clone(), config.warehouses.clone())
    }

    /// テキストから部分的なラベル情報を抽出（失敗しない）
    pub fn extract(&self, raw: &str) -> PartialLabelData {
        let mut result = PartialLabelData::default();
        let lines: Vec<&str> = raw.lines().collect();
        let mut claims: Vec<Vec<Claim>> = Vec::with_capacity(lines.len());

        for line in &lines {
            claims.push(self.apply_rules(line, &mut result));
        }

        self.resolve_tracking_by_shape(&lines, &claims, &mut result);

        debug!(fields = ?result.resolved_fields(), "物流情報を解析");
        result
    }

    /// 1行にルールを順番に適用し、使われた範囲を返す
    fn apply_rules(&self, line: &str, result: &mut PartialLabelData) -> Vec<Claim> {
        let mut claims: Vec<Claim> = Vec::new();
        if line.trim().is_empty() {
            return claims;
        }

        for rule in MARKER_RULES.iter() {
            // 先に見つかった値を優先
            if rule.fields().iter().all(|f| result.has(*f)) {
                continue;
            }

            let consumed: Vec<Range<usize>> = claims.iter().map(|c| c.span.clone()).collect();
            let Some(found) = rule.find(line, &consumed, &self.warehouses) else {
                continue;
            };

            for (field, value) in found.values {
                assign(result, field, value);
            }
            debug!(rule = rule.name, "マーカーに一致");
            claims.push(Claim {
                field: rule.field,
                span: found.span,
            });
        }

        claims
    }

    /// 形状マッチによる追跡番号の補完
    fn resolve_tracking_by_shape(&self, lines: &[&str], claims: &[Vec<Claim>], result: &mut PartialLabelData) {
        let run = match self.settings.tracking_policy {
            TrackingPolicy::MarkerFirst => result.phone_number.is_none(),
            TrackingPolicy::ShapeFirst => true,
        };
        if !run {
            return;
        }

        let shape = self.settings.tracking_shape();
        let candidate = lines.iter().zip(claims).find_map(|(line, line_claims)| {
            // 他の項目の値として使われた部分は対象外
            let excluded: Vec<Range<usize>> = line_claims
                .iter()
                .filter(|c| c.field != LabelField::PhoneNumber)
                .map(|c| c.span.clone())
                .collect();
            shape.find_in_line(line, &excluded)
        });

        if let Some(token) = candidate {
            debug!(token, "形状マッチで追跡番号を検出");
            result.phone_number = Some(token.to_string());
        }
    }
}

fn assign(result: &mut PartialLabelData, field: LabelField, value: FieldValue) {
    match (field, value) {
        (LabelField::ServiceType, FieldValue::Text(v)) => {
            result.service_type.get_or_insert(v);
        }
        (LabelField::PhoneNumber, FieldValue::Text(v)) => {
            result.phone_number.get_or_insert(v);
        }
        (LabelField::ItemNumber, FieldValue::Text(v)) => {
            result.item_number.get_or_insert(v);
        }
        (LabelField::Warehouse, FieldValue::Text(v)) => {
            result.warehouse.get_or_insert(v);
        }
        (LabelField::ShippingCrate, FieldValue::Text(v)) => {
            result.shipping_crate.get_or_insert(v);
        }
        (LabelField::Quantity, FieldValue::Integer(n)) => {
            result.quantity.get_or_insert(n);
        }
        (LabelField::TotalItems, FieldValue::Integer(n)) => {
            result.total_items.get_or_insert(n);
        }
        (field, value) => {
            debug!(?field, ?value, "型の合わない値を無視");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> Extractor {
        Extractor::new(
            ExtractorSettings::default(),
            vec!["建闽店".to_string(), "通洲店".to_string()],
        )
    }

    #[test]
    fn test_reference_example() {
        let raw = "物流公司: 顺丰速运\n单号: SF1234567890CN\n货号: ABC-001\n数量: 5";
        let parsed = extract(raw);
        assert_eq!(
            parsed,
            PartialLabelData {
                service_type: Some("顺丰速运".into()),
                phone_number: Some("SF1234567890CN".into()),
                item_number: Some("ABC-001".into()),
                quantity: Some(5),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_empty_and_noise_inputs() {
        assert!(extract("").is_empty());
        assert!(extract("\n\n   \n").is_empty());
        assert!(extract("您好，您的包裹已经发出，请注意查收。\n谢谢！").is_empty());
        assert!(extract(":::：：：\n，，，").is_empty());
    }

    #[test]
    fn test_carrier_and_tracking_notice_format() {
        let raw = "物流单号：邮政特快专递，13616578186\n货号：8559\n发货数量：8\n收货仓库：三水一产25号子仓\n";
        let parsed = extractor().extract(raw);
        assert_eq!(parsed.service_type.as_deref(), Some("邮政特快专递"));
        assert_eq!(parsed.phone_number.as_deref(), Some("13616578186"));
        assert_eq!(parsed.item_number.as_deref(), Some("8559"));
        assert_eq!(parsed.quantity, Some(8));
        assert_eq!(parsed.shipping_crate.as_deref(), Some("三水一产25号子仓"));
    }

    #[test]
    fn test_single_line_paste() {
        let raw = "快递公司：中通快递，运单号：ZT7891234567，货号：K-2201，数量：12，收货仓：佛山3号仓";
        let parsed = extractor().extract(raw);
        assert_eq!(parsed.service_type.as_deref(), Some("中通快递"));
        assert_eq!(parsed.phone_number.as_deref(), Some("ZT7891234567"));
        assert_eq!(parsed.item_number.as_deref(), Some("K-2201"));
        assert_eq!(parsed.quantity, Some(12));
        assert_eq!(parsed.shipping_crate.as_deref(), Some("佛山3号仓"));
    }

    #[test]
    fn test_space_separated_single_line() {
        let parsed = extract("物流公司: 顺丰速运 单号: SF1234567890CN 货号: ABC-001 数量: 5");
        assert_eq!(parsed.service_type.as_deref(), Some("顺丰速运"));
        assert_eq!(parsed.phone_number.as_deref(), Some("SF1234567890CN"));
        assert_eq!(parsed.item_number.as_deref(), Some("ABC-001"));
        assert_eq!(parsed.quantity, Some(5));

        let parsed = extract("收货仓: 佛山3号仓 数量: 5");
        assert_eq!(parsed.shipping_crate.as_deref(), Some("佛山3号仓"));
        assert_eq!(parsed.quantity, Some(5));
    }

    #[test]
    fn test_carrier_suffix_is_not_a_marker() {
        let parsed = extract("顺丰快递 SF1234567890CN");
        assert_eq!(parsed.service_type, None);
        assert_eq!(parsed.phone_number.as_deref(), Some("SF1234567890CN"));

        let parsed = extract("中通快递 ZT7891234567\n货号: A1");
        assert_eq!(parsed.service_type, None);
        assert_eq!(parsed.phone_number.as_deref(), Some("ZT7891234567"));
        assert_eq!(parsed.item_number.as_deref(), Some("A1"));
    }

    #[test]
    fn test_carrier_line_with_digit_only_tracking() {
        let parsed = extract("物流：邮政特快专递，13616578186");
        assert_eq!(parsed.service_type.as_deref(), Some("邮政特快专递"));
        assert_eq!(parsed.phone_number.as_deref(), Some("13616578186"));

        let parsed = extract("邮政特快专递，13616578186\n货号：8559");
        assert_eq!(parsed.service_type.as_deref(), Some("邮政特快专递"));
        assert_eq!(parsed.phone_number.as_deref(), Some("13616578186"));
    }

    #[test]
    fn test_total_quantity_is_not_parcel_quantity() {
        assert_eq!(extract("总数量: 10\n数量: 3").quantity, Some(3));
        assert_eq!(extract("总数量: 10").quantity, None);
    }

    #[test]
    fn test_reordered_lines() {
        let raw = "数量: 3\n收货仓: A-01\n货号: X9\n物流公司: 圆通速递\n单号: YT9876543210";
        let parsed = extract(raw);
        assert_eq!(parsed.quantity, Some(3));
        assert_eq!(parsed.shipping_crate.as_deref(), Some("A-01"));
        assert_eq!(parsed.item_number.as_deref(), Some("X9"));
        assert_eq!(parsed.service_type.as_deref(), Some("圆通速递"));
        assert_eq!(parsed.phone_number.as_deref(), Some("YT9876543210"));
    }

    #[test]
    fn test_first_positional_match_wins() {
        let raw = "数量: 4\n数量: 9\n单号: AA1111111111\n单号: BB2222222222";
        let parsed = extract(raw);
        assert_eq!(parsed.quantity, Some(4));
        assert_eq!(parsed.phone_number.as_deref(), Some("AA1111111111"));
    }

    #[test]
    fn test_invalid_quantity_left_unset() {
        assert_eq!(extract("数量: 很多").quantity, None);
        assert_eq!(extract("数量: 2.5").quantity, None);
        // 0 は有効な整数として抽出される（検証は生成時）
        assert_eq!(extract("数量: 0").quantity, Some(0));
    }

    #[test]
    fn test_quantity_round_trips_exactly() {
        for n in [1_i64, 7, 42, 1000, 65535, 2_147_483_648] {
            let raw = format!("备注: 无\n数量: {}\n", n);
            assert_eq!(extract(&raw).quantity, Some(n));
        }
    }

    #[test]
    fn test_shape_fallback() {
        let raw = "顺丰速运\n包裹 SF1234567890CN 已揽收\n货号: ABC1234567XY";
        let parsed = extract(raw);
        assert_eq!(parsed.phone_number.as_deref(), Some("SF1234567890CN"));
        assert_eq!(parsed.item_number.as_deref(), Some("ABC1234567XY"));
        // 根拠のない物流名称は推測しない
        assert_eq!(parsed.service_type, None);
    }

    #[test]
    fn test_shape_fallback_ignores_other_field_values() {
        let parsed = extract("货号: ABC1234567XY\n数量: 2");
        assert_eq!(parsed.phone_number, None);
    }

    #[test]
    fn test_tracking_policy_shape_first() {
        let raw = "单号: 13616578186\n备注 YT9876543210";
        let marker_first = extract(raw);
        assert_eq!(marker_first.phone_number.as_deref(), Some("13616578186"));

        let settings = ExtractorSettings {
            tracking_policy: TrackingPolicy::ShapeFirst,
            ..Default::default()
        };
        let shape_first = Extractor::new(settings, Vec::new()).extract(raw);
        assert_eq!(shape_first.phone_number.as_deref(), Some("YT9876543210"));
    }

    #[test]
    fn test_digit_only_tracking_when_configured() {
        let settings = ExtractorSettings {
            tracking_require_mixed: false,
            ..Default::default()
        };
        let parsed = Extractor::new(settings, Vec::new()).extract("邮政 13616578186");
        assert_eq!(parsed.phone_number.as_deref(), Some("13616578186"));
    }

    #[test]
    fn test_warehouse_and_total_items() {
        let raw = "店铺：通洲店\n共 3 件\n数量: 6";
        let parsed = extractor().extract(raw);
        assert_eq!(parsed.warehouse.as_deref(), Some("通洲店"));
        assert_eq!(parsed.total_items, Some(3));
        assert_eq!(parsed.quantity, Some(6));

        // 未設定の店舗名は拾わない
        assert_eq!(extractor().extract("店铺：别的店").warehouse, None);
    }

    #[test]
    fn test_windows_line_endings() {
        let parsed = extract("货号: ABC-001\r\n数量: 5\r\n");
        assert_eq!(parsed.item_number.as_deref(), Some("ABC-001"));
        assert_eq!(parsed.quantity, Some(5));
    }
}
