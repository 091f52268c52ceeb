//! Clothing suggestions derived from current conditions.
//!
//! The base outfit comes from a table of temperature bands; add-on rules then
//! contribute accessories and advice. Both tables are evaluated top to bottom.

use crate::model::{OutfitSuggestion, WeatherSample};

/// A temperature band, half-open on its upper bound.
struct Band {
    below: f64,
    outfit: &'static str,
    accessories: &'static [&'static str],
}

const BANDS: &[Band] = &[
    Band {
        below: 0.0,
        outfit: "Heavy winter coat, thermal layers, gloves, and a warm hat",
        accessories: &["scarf", "winter boots"],
    },
    Band {
        below: 10.0,
        outfit: "Winter jacket or thick sweater",
        accessories: &["scarf", "light gloves"],
    },
    Band {
        below: 15.0,
        outfit: "Light jacket or hoodie",
        accessories: &["light scarf"],
    },
    Band {
        below: 20.0,
        outfit: "Long sleeves or light sweater",
        accessories: &[],
    },
    Band {
        below: 25.0,
        outfit: "T-shirt and trousers",
        accessories: &[],
    },
    Band {
        below: f64::INFINITY,
        outfit: "Shorts, t-shirt, and light fabrics",
        accessories: &["sunglasses", "hat"],
    },
];

struct AddOn {
    applies: fn(&WeatherSample) -> bool,
    accessories: &'static [&'static str],
    advice: Option<&'static str>,
}

const ADD_ONS: &[AddOn] = &[
    AddOn {
        applies: is_windy,
        accessories: &[],
        advice: Some(" Windy conditions - bring a windbreaker or secure your layers. "),
    },
    AddOn {
        applies: is_rainy,
        accessories: &["umbrella", "waterproof jacket"],
        advice: Some(" Rain expected - don't forget rain protection. "),
    },
    AddOn {
        applies: is_snowy,
        accessories: &["waterproof boots", "umbrella"],
        advice: None,
    },
    AddOn {
        applies: is_muggy,
        accessories: &[],
        advice: Some(" High humidity - choose breathable fabrics. "),
    },
];

fn is_windy(w: &WeatherSample) -> bool {
    w.wind_speed > 10.0
}

fn is_rainy(w: &WeatherSample) -> bool {
    w.condition.as_str().contains("Rain") || w.description.contains("rain")
}

// Rain and snow form a chain: snow gear only when rain did not match.
fn is_snowy(w: &WeatherSample) -> bool {
    !is_rainy(w) && w.condition.as_str().contains("Snow")
}

fn is_muggy(w: &WeatherSample) -> bool {
    w.humidity_pct > 80 && w.temperature > 20.0
}

/// Suggest an outfit for a sample whose values are already in Celsius and
/// m/s. No unit conversion happens here.
pub fn suggest_outfit(weather: &WeatherSample) -> OutfitSuggestion {
    let t = weather.temperature;
    let mut suggestion = OutfitSuggestion::default();

    // NaN falls through every band; treat it as the warmest.
    let band = BANDS
        .iter()
        .find(|b| t < b.below)
        .unwrap_or(&BANDS[BANDS.len() - 1]);
    suggestion.outfit = band.outfit.to_string();
    extend(&mut suggestion.accessories, band.accessories);

    for rule in ADD_ONS.iter().filter(|r| (r.applies)(weather)) {
        extend(&mut suggestion.accessories, rule.accessories);
        if let Some(advice) = rule.advice {
            suggestion.advice.push_str(advice);
        }
    }

    suggestion
}

/// Like [`suggest_outfit`], converting imperial samples to metric first.
pub fn suggest_outfit_for(weather: &WeatherSample) -> OutfitSuggestion {
    suggest_outfit(&weather.to_metric())
}

fn extend(accessories: &mut Vec<String>, items: &[&str]) {
    accessories.extend(items.iter().map(|s| s.to_string()));
}
