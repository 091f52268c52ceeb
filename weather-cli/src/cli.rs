use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, Select, Text};
use tracing::{info, warn};
use weather_core::{
    Config, LocationQuery, Units, WeatherError, aggregate_daily,
    compare::{self, MAX_CITIES},
    evaluate_notifications,
    provider::provider_from_config,
    suggest_outfit_for,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather dashboard CLI")]
pub struct Cli {
    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, unit system and default city.
    Configure,

    /// Current conditions with outfit advice and alerts.
    Now {
        /// City name or "lat,lon"; defaults to the configured city.
        city: Option<String>,

        /// "metric" or "imperial"; defaults to the configured units.
        #[arg(long, value_parser = parse_units)]
        units: Option<Units>,
    },

    /// Five-day forecast, one line per day.
    Forecast {
        /// City name or "lat,lon"; defaults to the configured city.
        city: Option<String>,

        #[arg(long, value_parser = parse_units)]
        units: Option<Units>,
    },

    /// Current conditions for up to four cities side by side.
    ///
    /// Without cities the saved comparison list is used. `--add` and
    /// `--remove` edit that list before comparing.
    Compare {
        #[arg(num_args = 1..=MAX_CITIES)]
        cities: Vec<String>,

        /// Save the given cities to the comparison list.
        #[arg(long, requires = "cities", conflicts_with_all = ["remove", "clear"])]
        add: bool,

        /// Drop the given cities from the comparison list.
        #[arg(long, requires = "cities", conflicts_with = "clear")]
        remove: bool,

        /// Forget the saved comparison list.
        #[arg(long, conflicts_with = "cities")]
        clear: bool,

        #[arg(long, value_parser = parse_units)]
        units: Option<Units>,
    },

    /// Show recently searched locations.
    Recent {
        /// Forget all recent searches.
        #[arg(long)]
        clear: bool,
    },

    /// Manage favorite locations.
    Favorites {
        #[command(subcommand)]
        action: Option<FavoriteAction>,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavoriteAction {
    List,
    Add { city: String },
    Remove { city: String },
}

fn parse_units(s: &str) -> Result<Units, String> {
    Units::try_from(s).map_err(|e| e.to_string())
}

/// Attach the user-facing message to a provider error.
fn describe(err: WeatherError) -> anyhow::Error {
    let msg = err.user_message();
    anyhow::Error::new(err).context(msg)
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure => configure(&mut config)?,
            Command::Now { city, units } => {
                let units = units.unwrap_or(config.units);
                let location = resolve_location(&config, city.as_deref())?;
                let provider = provider_from_config(&config)?;

                let (current, forecast) = tokio::join!(
                    provider.current(&location, units),
                    provider.forecast(&location, units)
                );
                let current = current.map_err(describe)?;
                let forecast = forecast
                    .inspect_err(|e| warn!(error = %e, "forecast unavailable, skipping forecast alerts"))
                    .ok();

                let outfit = suggest_outfit_for(&current);
                let notifications = evaluate_notifications(Some(&current), forecast.as_ref());

                if self.json {
                    let view = serde_json::json!({
                        "current": current,
                        "outfit": outfit,
                        "notifications": notifications,
                    });
                    println!("{}", serde_json::to_string_pretty(&view)?);
                } else {
                    render::notifications(&notifications);
                    render::current(&current);
                    render::outfit(&outfit);
                }

                config.recent.record(&current.location_name);
                config.save()?;
            }
            Command::Forecast { city, units } => {
                let units = units.unwrap_or(config.units);
                let location = resolve_location(&config, city.as_deref())?;
                let provider = provider_from_config(&config)?;

                let forecast = provider.forecast(&location, units).await.map_err(describe)?;
                let days = aggregate_daily(&forecast);
                let place = forecast.display_location();
                info!(location = %place, days = days.len(), "forecast aggregated");

                if self.json {
                    println!("{}", serde_json::to_string_pretty(&days)?);
                } else {
                    render::forecast(&place, units, &days);
                }

                config.recent.record(&forecast.location_name);
                config.save()?;
            }
            Command::Compare {
                cities,
                add,
                remove,
                clear,
                units,
            } => {
                if clear {
                    config.compare.clear();
                    config.save()?;
                    println!("Comparison cleared.");
                    return Ok(());
                }

                if add {
                    for city in &cities {
                        config.compare.add(city)?;
                    }
                } else if remove {
                    for city in cities.iter().filter(|c| !config.compare.remove(c)) {
                        println!("{city} is not in the comparison.");
                    }
                }
                let edited = add || remove;
                if edited {
                    config.save()?;
                }

                let locations = if cities.is_empty() || edited {
                    if config.compare.is_empty() {
                        anyhow::bail!(
                            "No cities to compare.\n\
                             Hint: pass up to {MAX_CITIES} cities or save some with `weather compare --add <CITY>...`."
                        );
                    }
                    compare::parse_locations(config.compare.iter())?
                } else {
                    compare::parse_locations(cities.iter().map(String::as_str))?
                };

                let units = units.unwrap_or(config.units);
                let provider = provider_from_config(&config)?;
                let rows = compare::fetch_all(provider.as_ref(), &locations, units).await;
                info!(cities = rows.len(), "comparison fetched");

                if self.json {
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                } else {
                    render::comparison(&rows);
                }
            }
            Command::Recent { clear } => {
                if clear {
                    config.recent.clear();
                    config.save()?;
                    println!("Recent searches cleared.");
                } else if self.json {
                    println!("{}", serde_json::to_string_pretty(&config.recent)?);
                } else {
                    render::list("Recent searches", config.recent.iter());
                }
            }
            Command::Favorites { action } => match action.unwrap_or(FavoriteAction::List) {
                FavoriteAction::List => {
                    if self.json {
                        println!("{}", serde_json::to_string_pretty(&config.favorites)?);
                    } else {
                        render::list("Favorites", config.favorites.iter());
                    }
                }
                FavoriteAction::Add { city } => {
                    if config.favorites.add(&city) {
                        config.save()?;
                        println!("Added {city} to favorites.");
                    } else {
                        println!("{city} is already a favorite.");
                    }
                }
                FavoriteAction::Remove { city } => {
                    if config.favorites.remove(&city) {
                        config.save()?;
                        println!("Removed {city} from favorites.");
                    } else {
                        println!("{city} is not a favorite.");
                    }
                }
            },
        }

        Ok(())
    }
}

fn resolve_location(config: &Config, city: Option<&str>) -> anyhow::Result<LocationQuery> {
    let input = match city {
        Some(city) => city,
        None => config.fallback_city()?,
    };
    LocationQuery::parse(input).with_context(|| format!("Invalid location '{input}'"))
}

fn configure(config: &mut Config) -> anyhow::Result<()> {
    let key = Password::new("OpenWeather API key (leave empty to keep current):")
        .without_confirmation()
        .prompt()?;
    if !key.trim().is_empty() {
        config.api_key = Some(key.trim().to_string());
    }

    let options = vec![Units::Metric, Units::Imperial];
    let cursor = options.iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Units:", options)
        .with_starting_cursor(cursor)
        .prompt()?;

    let current_city = config.default_city.clone().unwrap_or_default();
    let city = Text::new("Default city (optional):")
        .with_default(&current_city)
        .prompt()?;
    config.default_city = Some(city.trim().to_string()).filter(|c| !c.is_empty());

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_now_with_units() {
        let cli = Cli::try_parse_from(["weather", "now", "Oslo", "--units", "imperial", "--json"])
            .expect("valid args");
        assert!(cli.json);
        match cli.command {
            Command::Now { city, units } => {
                assert_eq!(city.as_deref(), Some("Oslo"));
                assert_eq!(units, Some(Units::Imperial));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_units() {
        assert!(Cli::try_parse_from(["weather", "forecast", "--units", "kelvin"]).is_err());
    }

    #[test]
    fn compare_accepts_at_most_four_cities() {
        let cli = Cli::try_parse_from(["weather", "compare", "Oslo", "Rome", "Lima", "Pune"])
            .expect("four cities");
        match cli.command {
            Command::Compare { cities, add, .. } => {
                assert_eq!(cities, ["Oslo", "Rome", "Lima", "Pune"]);
                assert!(!add);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(
            Cli::try_parse_from(["weather", "compare", "Oslo", "Rome", "Lima", "Pune", "Kyiv"])
                .is_err()
        );
    }

    #[test]
    fn compare_list_edits_need_cities() {
        assert!(Cli::try_parse_from(["weather", "compare", "--add"]).is_err());
        assert!(Cli::try_parse_from(["weather", "compare", "--clear", "Oslo"]).is_err());
        assert!(Cli::try_parse_from(["weather", "compare", "--add", "--remove", "Oslo"]).is_err());

        let cli = Cli::try_parse_from(["weather", "compare", "--clear"]).expect("clear alone");
        assert!(matches!(cli.command, Command::Compare { clear: true, .. }));
    }

    #[test]
    fn favorites_defaults_to_list() {
        let cli = Cli::try_parse_from(["weather", "favorites"]).expect("valid args");
        assert!(matches!(cli.command, Command::Favorites { action: None }));
    }

    #[test]
    fn resolve_location_falls_back_to_default_city() {
        let mut config = Config::default();
        config.default_city = Some("Quebec".into());
        let loc = resolve_location(&config, None).expect("fallback");
        assert_eq!(loc, LocationQuery::City("Quebec".into()));

        let loc = resolve_location(&config, Some("45.5,-73.6")).expect("coords");
        assert_eq!(loc, LocationQuery::Coords { lat: 45.5, lon: -73.6 });
    }
}
