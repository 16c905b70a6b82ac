//! 追跡番号の形状マッチ (マーカーなしのフォールバック)

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// ASCII英数字の連続
static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9]+").unwrap());

/// 追跡番号らしいトークンの条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingShape {
    pub min_len: usize,
    pub max_len: usize,
    /// 英字と数字の両方を含むこと
    pub require_mixed: bool,
}

impl TrackingShape {
    /// 条件を満たすか
    pub fn matches(&self, token: &str) -> bool {
        let len = token.len();
        if len < self.min_len || len > self.max_len {
            return false;
        }
        if !token.chars().all(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
        if self.require_mixed {
            let has_alpha = token.chars().any(|c| c.is_ascii_alphabetic());
            let has_digit = token.chars().any(|c| c.is_ascii_digit());
            return has_alpha && has_digit;
        }
        true
    }

    /// 行の中で最初に見つかった候補
    ///
    /// `excluded` に含まれる範囲 (他の項目の値) と重なるトークンは対象外。
    pub fn find_in_line<'a>(&self, line: &'a str, excluded: &[Range<usize>]) -> Option<&'a str> {
        TOKEN
            .find_iter(line)
            .filter(|m| {
                let r = m.range();
                !excluded.iter().any(|e| e.start < r.end && r.start < e.end)
            })
            .map(|m| m.as_str())
            .find(|token| self.matches(token))
    }
}
