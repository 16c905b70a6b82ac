//! 生成時刻の表示形式

use chrono::{Datelike, NaiveDateTime, Timelike};

const WEEKDAYS: [&str; 7] = ["日", "一", "二", "三", "四", "五", "六"];

/// 中国語の日時表記
///
/// 例: `2025年3月5日, 星期三 下午 3:07`
pub fn format_chinese_datetime(t: &NaiveDateTime) -> String {
    let weekday = WEEKDAYS[t.weekday().num_days_from_sunday() as usize];
    let (pm, hour) = t.hour12();
    let ampm = if pm { "下午" } else { "上午" };

    format!(
        "{}年{}月{}日, 星期{} {} {}:{:02}",
        t.year(),
        t.month(),
        t.day(),
        weekday,
        ampm,
        hour,
        t.minute()
    )
}
