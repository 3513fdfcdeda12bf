//! Rendering of a weather snapshot for the terminal.
//!
//! Percentage fields are clamped to [0,100] here; the snapshot carries the
//! source values untouched.

use chrono::{DateTime, Utc};
use nimbus_core::WeatherSnapshot;

const TIME_24: &str = "%H:%M";
const UPDATED: &str = "%-d %B | %H:%M";

pub fn render(snapshot: &WeatherSnapshot) -> String {
    let mut out = String::new();

    out.push_str(&format!("{} - {}\n", snapshot.city, snapshot.description));
    out.push_str(&format!(
        "  temperature  {:.1}°C (feels like {:.1}°C)\n",
        snapshot.temperature, snapshot.feels_like
    ));
    out.push_str(&format!(
        "  min/max      {:.1}°C / {:.1}°C\n",
        snapshot.temp_min, snapshot.temp_max
    ));
    out.push_str(&format!("  pressure     {} hPa\n", snapshot.pressure));
    out.push_str(&format!("  humidity     {}%\n", clamp_pct(snapshot.humidity)));
    out.push_str(&format!("  clouds       {}%\n", clamp_pct(snapshot.clouds)));

    match snapshot.wind_gust {
        Some(gust) => out.push_str(&format!(
            "  wind         {:.1} m/s at {}° (gust {:.1})\n",
            snapshot.wind_speed, snapshot.wind_deg, gust
        )),
        None => out.push_str(&format!(
            "  wind         {:.1} m/s at {}°\n",
            snapshot.wind_speed, snapshot.wind_deg
        )),
    }

    if let Some(rain) = snapshot.rain_one_hour {
        out.push_str(&format!("  rain (1h)    {rain:.1} mm\n"));
    }

    out.push_str(&format!(
        "  sunrise      {}  sunset {}\n",
        format_time(snapshot.sunrise_utc(), TIME_24),
        format_time(snapshot.sunset_utc(), TIME_24)
    ));
    out.push_str(&format!(
        "  updated      {}\n",
        format_time(snapshot.last_updated_utc(), UPDATED)
    ));

    out
}

fn clamp_pct(value: i32) -> i32 {
    value.clamp(0, 100)
}

fn format_time(ts: Option<DateTime<Utc>>, pattern: &str) -> String {
    ts.map_or_else(|| "--".to_string(), |t| t.format(pattern).to_string())
}
