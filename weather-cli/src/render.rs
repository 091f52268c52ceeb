//! Plain-text rendering of derived weather data.

use weather_core::{
    ComparisonRow, DailySummary, NotificationEvent, OutfitSuggestion, Units, WeatherSample,
};

pub fn current(w: &WeatherSample) {
    let t = w.units.temperature_symbol();

    println!("{}", w.display_location());
    println!("  {} ({})", capitalize(&w.description), w.condition);
    println!(
        "  {:.0}{t}, feels like {:.0}{t}  H: {:.0}°  L: {:.0}°",
        w.temperature, w.feels_like, w.temp_max, w.temp_min
    );
    println!(
        "  Humidity {}%  Wind {:.1} {}",
        w.humidity_pct,
        w.wind_speed,
        w.units.speed_symbol()
    );
    if let (Some(rise), Some(set)) = (w.sunrise_local(), w.sunset_local()) {
        println!(
            "  Sunrise {}  Sunset {}",
            rise.format("%H:%M"),
            set.format("%H:%M")
        );
    }
}

pub fn outfit(s: &OutfitSuggestion) {
    println!();
    println!("What to wear: {}", s.outfit);
    if !s.accessories.is_empty() {
        println!("  Bring: {}", s.accessories.join(", "));
    }
    let advice = s.advice.split_whitespace().collect::<Vec<_>>().join(" ");
    if !advice.is_empty() {
        println!("  Tip: {advice}");
    }
}

pub fn notifications(events: &[NotificationEvent]) {
    for e in events {
        println!("{} [{}] {}", e.icon, e.severity, e.message);
    }
    if !events.is_empty() {
        println!();
    }
}

pub fn forecast(location: &str, units: Units, days: &[DailySummary]) {
    if days.is_empty() {
        println!("No forecast data for {location}.");
        return;
    }

    let t = units.temperature_symbol();
    println!("5-day forecast for {location}");
    for d in days {
        let rain = if d.max_pop > 0 {
            format!("  rain {:>3}%", d.max_pop)
        } else {
            String::new()
        };
        println!(
            "  {:<12} {:>4}{t}  H: {:>3}°  L: {:>3}°  {}{rain}",
            d.date, d.avg_temp, d.max_temp, d.min_temp, d.description
        );
    }
}

/// One line per compared city, in the order given.
pub fn comparison(rows: &[ComparisonRow]) {
    for row in rows {
        match (&row.current, &row.error) {
            (Some(w), _) => println!(
                "  {:<20} {:>4.0}{}  {:<18} humidity {:>3}%  wind {:.1} {}",
                w.display_location(),
                w.temperature,
                w.units.temperature_symbol(),
                capitalize(&w.description),
                w.humidity_pct,
                w.wind_speed,
                w.units.speed_symbol()
            ),
            (None, err) => println!(
                "  {:<20} unavailable: {}",
                row.query,
                err.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

pub fn list<'a>(title: &str, items: impl Iterator<Item = &'a str>) {
    let items: Vec<_> = items.collect();
    if items.is_empty() {
        println!("{title}: none");
        return;
    }
    println!("{title}:");
    for item in items {
        println!("  {item}");
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
