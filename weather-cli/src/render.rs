//! Plain-text rendering of dashboard state.

use std::fmt::Write;

use weather_dashboard_core::{WeatherPayload, WeatherState};

pub fn welcome() -> String {
    "Welcome! Search for a city to see its current weather.".to_string()
}

pub fn loading(city: &str) -> String {
    format!("Loading weather for {city}...")
}

/// Error banner, current conditions, then history.
pub fn dashboard(state: &WeatherState) -> String {
    let mut out = String::new();

    if let Some(error) = state.error() {
        let _ = writeln!(out, "! {error}");
    }
    if let Some(data) = state.data() {
        out.push_str(&conditions(data));
    }
    out.push_str(&history(state.history()));
    out
}

pub fn conditions(data: &WeatherPayload) -> String {
    let mut out = String::new();

    match data.country() {
        Some(country) => {
            let _ = writeln!(out, "{}, {country}", data.name);
        }
        None => {
            let _ = writeln!(out, "{}", data.name);
        }
    }

    if let Some(cond) = data.condition() {
        if cond.description.is_empty() || cond.description.eq_ignore_ascii_case(&cond.main) {
            let _ = writeln!(out, "  Weather:     {}", cond.main);
        } else {
            let _ = writeln!(out, "  Weather:     {} ({})", cond.main, cond.description);
        }
    }

    if let Some(main) = &data.main {
        if let Some(temp) = main.temp {
            let _ = write!(out, "  Temperature: {temp:.1}°C");
            if let Some(feels) = main.feels_like {
                let _ = write!(out, " (feels like {feels:.1}°C)");
            }
            out.push('\n');
        }
        if let Some(humidity) = main.humidity {
            let _ = writeln!(out, "  Humidity:    {humidity}%");
        }
        if let Some(pressure) = main.pressure {
            let _ = writeln!(out, "  Pressure:    {pressure:.0} hPa");
        }
    }

    if let Some(speed) = data.wind.as_ref().and_then(|w| w.speed) {
        match data.wind.as_ref().and_then(|w| w.deg) {
            Some(deg) => {
                let _ = writeln!(out, "  Wind:        {speed:.1} m/s from {deg:.0}°");
            }
            None => {
                let _ = writeln!(out, "  Wind:        {speed:.1} m/s");
            }
        }
    }

    if let Some(visibility) = data.visibility {
        let km = f64::from(visibility) / 1000.0;
        let _ = writeln!(out, "  Visibility:  {km:.1} km");
    }
    if let Some(cover) = data.clouds.as_ref().and_then(|c| c.all) {
        let _ = writeln!(out, "  Clouds:      {cover}%");
    }
    if let Some(at) = data.observed_at() {
        let _ = writeln!(out, "  Observed:    {}", at.format("%Y-%m-%d %H:%M UTC"));
    }

    out
}

pub fn history(history: &[String]) -> String {
    if history.is_empty() {
        return String::new();
    }
    format!("History: {}\n", history.join(" | "))
}
