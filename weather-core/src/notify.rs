//! Advisory events derived from current conditions and the near-term forecast.

use tracing::{debug, warn};

use crate::forecast::round_half_up;
use crate::model::{
    ForecastSample, ForecastSet, NotificationEvent, NotificationId, Severity, WeatherSample,
};

/// Number of leading forecast samples inspected (3-hour steps).
pub const LOOKAHEAD: usize = 3;
pub const RAIN_POP_THRESHOLD: f64 = 0.3;
/// Degrees, in the sample's own unit system.
pub const TEMP_SHIFT_THRESHOLD: f64 = 10.0;

struct Rule {
    id: NotificationId,
    needs_forecast: bool,
    check: fn(&WeatherSample, &[ForecastSample]) -> Option<NotificationEvent>,
}

const RULES: &[Rule] = &[
    Rule {
        id: NotificationId::RainAlert,
        needs_forecast: true,
        check: rain_alert,
    },
    Rule {
        id: NotificationId::TempShift,
        needs_forecast: true,
        check: temp_shift,
    },
    Rule {
        id: NotificationId::SevereWeather,
        needs_forecast: false,
        check: severe_weather,
    },
];

/// Evaluate every notification rule against the given data.
///
/// Nothing is produced without a current sample. A missing or empty forecast,
/// or one fetched in a different unit system than the current sample, only
/// suppresses the forecast-based rules. At most one event per
/// [`NotificationId`], in rule order.
pub fn evaluate(
    current: Option<&WeatherSample>,
    forecast: Option<&ForecastSet>,
) -> Vec<NotificationEvent> {
    let Some(current) = current else {
        return Vec::new();
    };
    let upcoming = match forecast {
        Some(f) if f.units != current.units => {
            warn!(
                current = %current.units,
                forecast = %f.units,
                "forecast units differ from current sample, skipping forecast alerts"
            );
            &[][..]
        }
        Some(f) => f.leading(LOOKAHEAD),
        None => &[][..],
    };

    RULES
        .iter()
        .filter(|rule| !rule.needs_forecast || !upcoming.is_empty())
        .filter_map(|rule| {
            let event = (rule.check)(current, upcoming)?;
            debug!(id = %rule.id, severity = %event.severity, "notification raised");
            Some(event)
        })
        .collect()
}

fn rain_alert(_: &WeatherSample, upcoming: &[ForecastSample]) -> Option<NotificationEvent> {
    upcoming
        .iter()
        .any(|s| s.pop > RAIN_POP_THRESHOLD && s.condition.as_str().contains("Rain"))
        .then(|| NotificationEvent {
            id: NotificationId::RainAlert,
            severity: Severity::Warning,
            message: "🌧️ Rain starting in the next few hours!".to_string(),
            icon: "☔".to_string(),
        })
}

// Reports the first sample over the threshold, not the largest shift.
fn temp_shift(current: &WeatherSample, upcoming: &[ForecastSample]) -> Option<NotificationEvent> {
    let shift = upcoming
        .iter()
        .map(|s| (s.temperature - current.temperature).abs())
        .find(|change| *change > TEMP_SHIFT_THRESHOLD)?;

    Some(NotificationEvent {
        id: NotificationId::TempShift,
        severity: Severity::Info,
        message: format!(
            "🌡️ Temperature will change by {}{} in the next few hours",
            round_half_up(shift),
            current.units.temperature_symbol()
        ),
        icon: "⚠️".to_string(),
    })
}

fn severe_weather(current: &WeatherSample, _: &[ForecastSample]) -> Option<NotificationEvent> {
    current.condition.is_severe().then(|| NotificationEvent {
        id: NotificationId::SevereWeather,
        severity: Severity::Danger,
        message: format!("⚠️ Severe weather alert: {}", current.description),
        icon: "🚨".to_string(),
    })
}
