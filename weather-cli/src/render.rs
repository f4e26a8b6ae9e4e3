//! Terminal rendering of a snapshot as an RPG dialog box.

use chrono::{Datelike, NaiveDateTime, TimeDelta, Timelike, Utc};
use pixel_weather_core::{WeatherSnapshot, city, classify};

const WEEKDAYS: [&str; 7] = ["日", "一", "二", "三", "四", "五", "六"];

/// Current wall-clock time in Taiwan (UTC+8, no DST).
pub fn taipei_now() -> NaiveDateTime {
    Utc::now().naive_utc() + TimeDelta::hours(8)
}

pub fn dialog(snapshot: &WeatherSnapshot, now: NaiveDateTime, test_mode: bool) -> String {
    let weekday = WEEKDAYS[now.weekday().num_days_from_sunday() as usize];
    let character = classify::character_state(&snapshot.weather_code, snapshot.temperature);

    let mut out = String::new();
    if test_mode {
        out.push_str("[TEST MODE]\n");
    }
    out.push_str(&format!(
        "▶ 當前位置：{}    🕒 {:02}/{:02} ({}) {:02}:{:02}\n",
        snapshot.city,
        now.month(),
        now.day(),
        weekday,
        now.hour(),
        now.minute()
    ));

    if classify::is_day(now.hour()) {
        let hours_left = classify::hours_until_night(now.hour());
        out.push_str(&format!("🌅 距離夜幕降臨還有 {hours_left} 小時\n"));
    } else {
        out.push_str("🌃 夜晚時刻，小心行動\n");
    }

    out.push_str(&format!(
        "天氣狀況：{}\n氣溫：{}°C ({}°C ~ {}°C)\n降雨機率：{}%\n濕度：{}%\n風速：{} m/s {}\n角色狀態：{}\n",
        snapshot.weather,
        snapshot.temperature,
        snapshot.min_temp,
        snapshot.max_temp,
        snapshot.pop,
        snapshot.humidity,
        snapshot.wind_speed,
        snapshot.wind_direction,
        character.as_str()
    ));

    if let Some(error) = &snapshot.error {
        out.push_str(&format!("⚠ {error}\n"));
    }
    out.push('▼');
    out
}

/// Supported cities grouped by region, one region per line.
pub fn city_list() -> String {
    city::by_region()
        .into_iter()
        .map(|(region, cities)| {
            let names: Vec<&str> = cities.iter().map(|c| c.canonical).collect();
            format!("{}：{}", region.label(), names.join("、"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
