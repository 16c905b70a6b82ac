//! ラベルレコード - 抽出結果と手入力をまとめた正規データ

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LabelError, LabelResult};

/// ラベルの項目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelField {
    ServiceType,
    PhoneNumber,
    ItemNumber,
    Quantity,
    TotalItems,
    Warehouse,
    ShippingCrate,
}

impl LabelField {
    /// フロントエンドと共通のJSONキー
    pub fn key(self) -> &'static str {
        match self {
            Self::ServiceType => "serviceType",
            Self::PhoneNumber => "phoneNumber",
            Self::ItemNumber => "itemNumber",
            Self::Quantity => "quantity",
            Self::TotalItems => "totalItems",
            Self::Warehouse => "warehouse",
            Self::ShippingCrate => "shippingCrate",
        }
    }

    /// 画面表示名
    pub fn label(self) -> &'static str {
        match self {
            Self::ServiceType => "物流名称",
            Self::PhoneNumber => "物流单号",
            Self::ItemNumber => "货号",
            Self::Quantity => "商品数量",
            Self::TotalItems => "总件数",
            Self::Warehouse => "店铺名称",
            Self::ShippingCrate => "收货仓",
        }
    }
}

impl fmt::Display for LabelField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// ラベルデータ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelData {
    /// 物流名称
    pub service_type: String,
    /// 物流单号（項目名は歴史的経緯による）
    pub phone_number: String,
    /// 货号
    pub item_number: String,
    /// 商品数量 (0 = 未入力)
    pub quantity: i64,
    /// 总件数
    pub total_items: i64,
    /// 店铺名称
    pub warehouse: String,
    /// 收货仓
    pub shipping_crate: String,
    /// 生成時刻（レンダラーが設定する）
    pub current_time: String,
}

impl Default for LabelData {
    fn default() -> Self {
        Self {
            service_type: String::new(),
            phone_number: String::new(),
            item_number: String::new(),
            quantity: 0,
            total_items: 1,
            warehouse: String::new(),
            shipping_crate: String::new(),
            current_time: String::new(),
        }
    }
}

impl LabelData {
    /// 店舗を指定した空のレコード
    pub fn with_warehouse(warehouse: impl Into<String>) -> Self {
        Self {
            warehouse: warehouse.into(),
            ..Self::default()
        }
    }

    /// 抽出結果をマージ
    ///
    /// 値のある項目だけを上書きし、空の抽出結果で入力済みの項目を消さない。
    pub fn merge(&mut self, partial: &PartialLabelData) {
        merge_text(&mut self.service_type, partial.service_type.as_deref());
        merge_text(&mut self.phone_number, partial.phone_number.as_deref());
        merge_text(&mut self.item_number, partial.item_number.as_deref());
        merge_text(&mut self.warehouse, partial.warehouse.as_deref());
        merge_text(&mut self.shipping_crate, partial.shipping_crate.as_deref());

        // 0 は「未入力」と同じ扱い
        if let Some(quantity) = partial.quantity.filter(|q| *q != 0) {
            self.quantity = quantity;
        }
        if let Some(total) = partial.total_items.filter(|t| *t != 0) {
            self.total_items = total;
        }
    }

    /// 生成前の必須項目チェック
    ///
    /// 最初に見つかった不備を返す。
    pub fn validate(&self) -> LabelResult<()> {
        require(&self.service_type, LabelField::ServiceType)?;
        require(&self.phone_number, LabelField::PhoneNumber)?;
        require(&self.item_number, LabelField::ItemNumber)?;
        if self.quantity <= 0 {
            return Err(LabelError::invalid(
                LabelField::Quantity,
                self.quantity.to_string(),
            ));
        }
        require(&self.shipping_crate, LabelField::ShippingCrate)?;
        Ok(())
    }

    /// 印字用の总件数 (未設定・不正値は1件扱い)
    pub fn effective_total_items(&self) -> i64 {
        self.total_items.max(1)
    }
}

fn merge_text(target: &mut String, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        *target = value.to_string();
    }
}

fn require(value: &str, field: LabelField) -> LabelResult<()> {
    if value.trim().is_empty() {
        Err(LabelError::missing(field))
    } else {
        Ok(())
    }
}

/// テキストから抽出された部分的なラベル情報
///
/// `None` は「根拠となるマーカーや形状が見つからなかった」ことを表す。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialLabelData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_items: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_crate: Option<String>,
}

impl PartialLabelData {
    /// 何も抽出できなかったか
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// 項目が設定済みか
    pub fn has(&self, field: LabelField) -> bool {
        match field {
            LabelField::ServiceType => self.service_type.is_some(),
            LabelField::PhoneNumber => self.phone_number.is_some(),
            LabelField::ItemNumber => self.item_number.is_some(),
            LabelField::Quantity => self.quantity.is_some(),
            LabelField::TotalItems => self.total_items.is_some(),
            LabelField::Warehouse => self.warehouse.is_some(),
            LabelField::ShippingCrate => self.shipping_crate.is_some(),
        }
    }

    /// 抽出できた項目の一覧
    pub fn resolved_fields(&self) -> Vec<LabelField> {
        [
            LabelField::ServiceType,
            LabelField::PhoneNumber,
            LabelField::ItemNumber,
            LabelField::Quantity,
            LabelField::TotalItems,
            LabelField::Warehouse,
            LabelField::ShippingCrate,
        ]
        .into_iter()
        .filter(|f| self.has(*f))
        .collect()
    }
}
