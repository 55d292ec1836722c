//! Terminal rendering of the widget state. Pure: state in, text out.

use chrono::Local;
use crossterm::style::{Color, Stylize, style};
use weather_widget_core::{RequestState, WeatherObservation};

const WIDTH: usize = 34;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub color: bool,
}

/// Icon glyph and three-stop gradient for a weather condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionStyle {
    pub icon: &'static str,
    pub gradient: [Color; 3],
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb {
        r: (hex >> 16) as u8,
        g: (hex >> 8) as u8,
        b: hex as u8,
    }
}

const CLEAR: ConditionStyle = ConditionStyle {
    icon: "☀",
    gradient: [rgb(0xfb923c), rgb(0xeab308), rgb(0xec4899)],
};
const CLOUDS: ConditionStyle = ConditionStyle {
    icon: "☁",
    gradient: [rgb(0x94a3b8), rgb(0x6b7280), rgb(0x2563eb)],
};
const RAIN: ConditionStyle = ConditionStyle {
    icon: "🌧",
    gradient: [rgb(0x3b82f6), rgb(0x4f46e5), rgb(0x7e22ce)],
};
const SNOW: ConditionStyle = ConditionStyle {
    icon: "🌨",
    gradient: [rgb(0x67e8f9), rgb(0x60a5fa), rgb(0x6366f1)],
};
const THUNDERSTORM: ConditionStyle = ConditionStyle {
    icon: "🌩",
    gradient: [rgb(0x9333ea), rgb(0xdb2777), rgb(0xdc2626)],
};
const FALLBACK: ConditionStyle = ConditionStyle {
    icon: "☁",
    gradient: [rgb(0x2dd4bf), rgb(0x06b6d4), rgb(0x2563eb)],
};

pub fn style_for(condition: &str) -> ConditionStyle {
    match condition.to_lowercase().as_str() {
        "clear" | "sunny" => CLEAR,
        "clouds" | "cloudy" | "overcast" => CLOUDS,
        "rain" | "drizzle" => RAIN,
        "snow" => SNOW,
        "thunderstorm" => THUNDERSTORM,
        _ => FALLBACK,
    }
}

pub fn render(state: &RequestState, opts: &RenderOptions) -> String {
    match state {
        RequestState::Idle => render_prompt_hint(opts),
        RequestState::Loading => render_skeleton(opts),
        RequestState::Failed(message) => render_error(message, opts),
        RequestState::Success(obs) => render_card(obs, opts),
    }
}

fn paint(text: &str, color: Color, opts: &RenderOptions) -> String {
    if opts.color {
        style(text).with(color).to_string()
    } else {
        text.to_string()
    }
}

fn render_prompt_hint(opts: &RenderOptions) -> String {
    let hint = "Enter city name... or @here to use current location";
    paint(hint, Color::DarkGrey, opts)
}

fn render_skeleton(opts: &RenderOptions) -> String {
    let grey = Color::Grey;
    let bar = |len: usize| paint(&"░".repeat(len), grey, opts);

    let mut lines = vec![border('╭', '╮')];
    lines.push(format!("  {}", bar(4)));
    lines.push(format!("  {}", bar(20)));
    lines.push(format!("  {}", bar(10)));
    lines.push(String::new());
    lines.push(format!("  {}", bar(12)));
    lines.push(String::new());
    for _ in 0..2 {
        lines.push(format!("  {}  {}", bar(13), bar(13)));
    }
    lines.push(border('╰', '╯'));
    lines.join("\n")
}

fn render_error(message: &str, opts: &RenderOptions) -> String {
    let banner = format!("⚠  {message}");
    if opts.color {
        style(&banner).with(Color::Red).bold().to_string()
    } else {
        banner
    }
}

fn render_card(obs: &WeatherObservation, opts: &RenderOptions) -> String {
    let look = style_for(&obs.condition);
    let [top, middle, bottom] = look.gradient;

    let band = |color: Color| paint(&"█".repeat(WIDTH), color, opts);
    let heading = if opts.color {
        style(&obs.location).bold().to_string()
    } else {
        obs.location.clone()
    };

    let mut lines = vec![band(top)];
    lines.push(format!("  {}  {}", look.icon, heading));
    lines.push(format!("     {}", obs.country));
    lines.push(String::new());
    lines.push(format!("  {}°C", round_half_up(obs.temperature_c)));
    lines.push(format!("  {}", capitalize_words(&obs.description)));
    lines.push(format!("  Feels like {}°C", round_half_up(obs.feels_like_c)));
    lines.push(band(middle));
    lines.push(format!("  {:<12}{}%", "Humidity", obs.humidity_pct));
    lines.push(format!("  {:<12}{:.1} m/s", "Wind Speed", obs.wind_speed_ms));
    lines.push(format!("  {:<12}{} km", "Visibility", obs.visibility_km));
    lines.push(format!("  {:<12}{} hPa", "Pressure", obs.pressure_hpa));
    if let Some(at) = obs.observed_at {
        let stamp = at
            .with_timezone(&Local)
            .format("Updated %Y-%m-%d %H:%M")
            .to_string();
        lines.push(format!("  {}", paint(&stamp, Color::DarkGrey, opts)));
    }
    lines.push(band(bottom));
    lines.join("\n")
}

fn border(left: char, right: char) -> String {
    format!("{left}{}{right}", "─".repeat(WIDTH - 2))
}

/// Halves round toward positive infinity, so -2.5 shows as -2.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: RenderOptions = RenderOptions { color: false };

    fn observation(condition: &str) -> WeatherObservation {
        WeatherObservation {
            location: "London".into(),
            country: "Demo".into(),
            temperature_c: 17.6,
            feels_like_c: -2.5,
            condition: condition.into(),
            description: "scattered clouds".into(),
            icon: "03d".into(),
            humidity_pct: 62,
            wind_speed_ms: 3.456,
            visibility_km: 7.321,
            pressure_hpa: 1021,
            observed_at: None,
        }
    }

    #[test]
    fn known_conditions_map_to_their_style() {
        assert_eq!(style_for("Clear").icon, "☀");
        assert_eq!(style_for("SUNNY"), CLEAR);
        assert_eq!(style_for("overcast"), CLOUDS);
        assert_eq!(style_for("Drizzle"), RAIN);
        assert_eq!(style_for("Snow"), SNOW);
        assert_eq!(style_for("Thunderstorm"), THUNDERSTORM);
    }

    #[test]
    fn unknown_condition_falls_back() {
        assert_eq!(style_for("Mist"), FALLBACK);
        assert_eq!(style_for(""), FALLBACK);
        assert_ne!(FALLBACK.gradient, CLOUDS.gradient);
    }

    #[test]
    fn card_lists_every_metric() {
        let out = render(&RequestState::Success(observation("Clouds")), &PLAIN);

        assert!(out.contains("☁  London"));
        assert!(out.contains("Demo"));
        assert!(out.contains("18°C"));
        assert!(out.contains("Scattered Clouds"));
        assert!(out.contains("Feels like -2°C"));
        assert!(out.contains("62%"));
        assert!(out.contains("3.5 m/s"));
        assert!(out.contains("7.321 km"));
        assert!(out.contains("1021 hPa"));
        assert!(!out.contains('\u{1b}'), "plain output must not carry escapes");
    }

    #[test]
    fn colored_card_uses_gradient() {
        // crossterm honours NO_COLOR on its own.
        if std::env::var_os("NO_COLOR").is_some() {
            return;
        }
        let out = render(
            &RequestState::Success(observation("Clear")),
            &RenderOptions { color: true },
        );
        assert!(out.contains('\u{1b}'));
        assert!(out.contains("251;146;60"), "first gradient stop missing: {out:?}");
    }

    #[test]
    fn card_shows_update_time_when_known() {
        let mut obs = observation("Clear");
        assert!(!render(&RequestState::Success(obs.clone()), &PLAIN).contains("Updated"));

        obs.observed_at = chrono::DateTime::from_timestamp(1_700_000_000, 0);
        assert!(render(&RequestState::Success(obs), &PLAIN).contains("Updated 2023-11-"));
    }

    #[test]
    fn failed_state_shows_banner() {
        let out = render(&RequestState::Failed("City not found".into()), &PLAIN);
        assert_eq!(out, "⚠  City not found");
    }

    #[test]
    fn loading_and_idle_render_placeholders() {
        let loading = render(&RequestState::Loading, &PLAIN);
        assert!(loading.contains('░'));
        assert!(!loading.contains("London"));

        let idle = render(&RequestState::Idle, &PLAIN);
        assert!(idle.contains("Enter city name"));
    }

    #[test]
    fn rounding_matches_half_up() {
        assert_eq!(round_half_up(24.5), 25);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
    }
}
