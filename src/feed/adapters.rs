//! Pure normalizers turning provider records into carousel elements.
//!
//! Nothing here touches the network; callers fetch records however they like and publish the
//! resulting lists through a [`crate::feed::FeedHandle`].

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

use crate::foundation::color::Color;
use crate::model::carousel::CarouselElement;

const WEATHER_COLOR: Color = Color::rgb(0x00, 0xBF, 0xFF);
const CLEAN_COLOR: Color = Color::rgb(0x32, 0xCD, 0x32);
const HYDRATION_COLOR: Color = Color::rgb(0x1E, 0x90, 0xFF);
const MATCH_COLOR: Color = Color::rgb(0xFF, 0x6B, 0x35);
const BIRTHDAY_TODAY_COLOR: Color = Color::rgb(0xFF, 0x69, 0xB4);
const BIRTHDAY_UPCOMING_COLOR: Color = Color::rgb(0xFF, 0xB6, 0xC1);

/// Upcoming birthdays listed after the header.
pub const UPCOMING_BIRTHDAYS: usize = 3;

const MONTHS: [&str; 12] = [
    "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
    "octobre", "novembre", "décembre",
];
const MONTHS_SHORT: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];

fn weekday_fr(day: Weekday) -> (&'static str, &'static str) {
    match day {
        Weekday::Mon => ("lundi", "lun."),
        Weekday::Tue => ("mardi", "mar."),
        Weekday::Wed => ("mercredi", "mer."),
        Weekday::Thu => ("jeudi", "jeu."),
        Weekday::Fri => ("vendredi", "ven."),
        Weekday::Sat => ("samedi", "sam."),
        Weekday::Sun => ("dimanche", "dim."),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Open-Meteo WMO weather code to a display glyph. Unknown codes show "mainly clear".
pub fn weather_glyph(code: u32) -> &'static str {
    match code {
        0 => "☀️",
        1 => "🌤️",
        2 => "⛅",
        3 => "☁️",
        45 | 48 => "🌫️",
        51 | 80 => "🌦️",
        53 | 55 | 56 | 57 | 61 | 63 | 65 | 66 | 67 | 81 | 82 => "🌧️",
        71 | 73 | 75 | 77 | 85 | 86 => "❄️",
        95 | 96 | 99 => "⛈️",
        _ => "🌤️",
    }
}

/// One day of a weather forecast.
#[derive(Clone, Debug, PartialEq)]
pub struct DailyForecast {
    /// Local date.
    pub date: NaiveDate,
    /// WMO weather code.
    pub weather_code: u32,
    /// Daily minimum, Celsius.
    pub temp_min_c: f64,
    /// Daily maximum, Celsius.
    pub temp_max_c: f64,
}

/// `Aujourd'hui :`, `Demain :`, else e.g. `sam. 24 oct. :`.
pub fn forecast_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Aujourd'hui :".to_owned(),
        1 => "Demain :".to_owned(),
        _ => format!(
            "{} {} {} :",
            weekday_fr(date.weekday()).1,
            date.day(),
            MONTHS_SHORT[date.month0() as usize]
        ),
    }
}

/// One element per forecast day, labelled relative to `today`.
pub fn weather_elements(forecasts: &[DailyForecast], today: NaiveDate) -> Vec<CarouselElement> {
    forecasts
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let text = format!(
                "Paris - {} {} {}°/{}°C",
                forecast_label(f.date, today),
                weather_glyph(f.weather_code),
                f.temp_min_c.round() as i64,
                f.temp_max_c.round() as i64
            );
            CarouselElement::text(format!("weather-day-{i}"), text)
                .with_color(WEATHER_COLOR)
                .with_duration_ms(4000)
        })
        .collect()
}

/// Housekeeping reminders, French then English.
pub fn reminder_elements() -> Vec<CarouselElement> {
    [
        ("clean-fr", "🧹 Merci de garder la Gaming House propre !", CLEAN_COLOR),
        ("lights-fr", "💡 Éteignez les lumières quand vous partez !", CLEAN_COLOR),
        ("clean-en", "🧹 Please keep the Gaming House clean!", CLEAN_COLOR),
        ("lights-en", "💡 Switch off lights when leaving!", CLEAN_COLOR),
        ("hydration-fr", "💧 Restez hydratés ! Buvez de l'eau régulièrement", HYDRATION_COLOR),
        ("hydration-en", "💧 Stay hydrated! Drink water regularly", HYDRATION_COLOR),
    ]
    .into_iter()
    .map(|(id, text, color)| {
        CarouselElement::text(id, text)
            .with_color(color)
            .with_duration_ms(4000)
    })
    .collect()
}

/// Initial informational snapshot, shown until a provider publishes.
pub fn fallback_elements() -> Vec<CarouselElement> {
    reminder_elements()
        .into_iter()
        .enumerate()
        .map(|(i, mut e)| {
            e.id = format!("fallback-{}", i + 1);
            if e.color == Some(HYDRATION_COLOR) {
                e.text.push_str(" 🚰");
            }
            e
        })
        .collect()
}

/// A scheduled match.
#[derive(Clone, Debug, PartialEq)]
pub struct UpcomingMatch {
    /// Provider id.
    pub id: i64,
    /// Match or event name.
    pub name: String,
    /// Local start time.
    pub starts_at: NaiveDateTime,
    /// Home side.
    pub team_a: Option<String>,
    /// Away side.
    pub team_b: Option<String>,
    /// Color of the game the match belongs to.
    pub game_color: Option<Color>,
    /// Logo of the game.
    pub game_logo_url: Option<String>,
}

/// `Aujourd'hui 20H00`, `Demain 20H00` or `Samedi 24 Octobre 20H00`.
pub fn match_date_label(starts_at: NaiveDateTime, today: NaiveDate) -> String {
    let date = starts_at.date();
    let day = match (date - today).num_days() {
        0 => "Aujourd'hui".to_owned(),
        1 => "Demain".to_owned(),
        _ => format!(
            "{} {} {}",
            capitalize(weekday_fr(date.weekday()).0),
            date.day(),
            capitalize(MONTHS[date.month0() as usize])
        ),
    };
    format!("{day} {:02}H{:02}", starts_at.hour(), starts_at.minute())
}

/// Header plus one two-line element per match; nothing when there are no matches.
pub fn match_elements(matches: &[UpcomingMatch], today: NaiveDate) -> Vec<CarouselElement> {
    if matches.is_empty() {
        return Vec::new();
    }
    let mut out = vec![
        CarouselElement::text("matches-header", "Prochains matchs / Next matches :")
            .with_color(Color::BLACK)
            .with_duration_ms(4000),
    ];
    for m in matches {
        let title = match (&m.team_a, &m.team_b) {
            (Some(a), Some(b)) => format!("{a} vs {b}"),
            _ => m.name.clone(),
        };
        let mut e = CarouselElement::two_line(
            format!("match-{}", m.id),
            title,
            match_date_label(m.starts_at, today),
        )
        .with_color(m.game_color.unwrap_or(MATCH_COLOR))
        .with_duration_ms(5000);
        if let Some(url) = m.game_logo_url.as_deref().filter(|u| !u.is_empty()) {
            e = e.with_image(url);
        }
        out.push(e);
    }
    out
}

/// A player and their birth date.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerBirthday {
    /// Provider id.
    pub id: i64,
    /// Given name.
    pub first_name: String,
    /// Handle shown on stream.
    pub pseudo: String,
    /// Date of birth.
    pub birth_date: NaiveDate,
}

/// Days from `today` to the next anniversary of `birth`. Feb 29 falls on Mar 1 in common years.
pub fn days_until_birthday(birth: NaiveDate, today: NaiveDate) -> Option<i64> {
    let on = |year: i32| {
        NaiveDate::from_ymd_opt(year, birth.month(), birth.day())
            .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
    };
    let mut next = on(today.year())?;
    if next < today {
        next = on(today.year() + 1)?;
    }
    Some((next - today).num_days())
}

/// Today's birthdays, then the next few upcoming ones.
pub fn birthday_elements(players: &[PlayerBirthday], today: NaiveDate) -> Vec<CarouselElement> {
    let mut todays = Vec::new();
    let mut upcoming = Vec::new();
    for p in players {
        match days_until_birthday(p.birth_date, today) {
            Some(0) => todays.push(p),
            Some(days) => upcoming.push((days, p)),
            None => {}
        }
    }
    upcoming.sort_by_key(|(days, _)| *days);
    upcoming.truncate(UPCOMING_BIRTHDAYS);

    let mut out: Vec<CarouselElement> = todays
        .into_iter()
        .map(|p| {
            CarouselElement::text(
                format!("birthday-today-{}", p.id),
                format!("🎂 HAPPY BIRTHDAY {} ({}) !!", p.first_name, p.pseudo),
            )
            .with_color(BIRTHDAY_TODAY_COLOR)
            .with_duration_ms(6000)
        })
        .collect();

    if !upcoming.is_empty() {
        out.push(
            CarouselElement::text(
                "birthday-header",
                "🎂 Prochains anniversaires / Upcoming birthdays :",
            )
            .with_color(BIRTHDAY_UPCOMING_COLOR)
            .with_duration_ms(4000),
        );
        for (_, p) in upcoming {
            let d = p.birth_date;
            out.push(
                CarouselElement::text(
                    format!("birthday-upcoming-{}", p.id),
                    format!(
                        "{} ({}) • {} {}",
                        p.first_name,
                        p.pseudo,
                        d.day(),
                        MONTHS[d.month0() as usize]
                    ),
                )
                .with_color(BIRTHDAY_UPCOMING_COLOR)
                .with_duration_ms(3000),
            );
        }
    }
    out
}

/// Full informational feed in display order: weather, reminders, matches, birthdays.
pub fn informational_elements(
    forecasts: &[DailyForecast],
    matches: &[UpcomingMatch],
    players: &[PlayerBirthday],
    today: NaiveDate,
) -> Vec<CarouselElement> {
    let mut out = weather_elements(forecasts, today);
    out.extend(reminder_elements());
    out.extend(match_elements(matches, today));
    out.extend(birthday_elements(players, today));
    out
}

/// One player's stat line for the per-game stat carousels.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerStat {
    /// Provider id.
    pub player_id: i64,
    /// Handle shown on stream.
    pub pseudo: String,
    /// Stat name, e.g. `K/D`.
    pub label: String,
    /// Formatted stat value.
    pub value: String,
    /// Player portrait.
    pub image_url: Option<String>,
    /// Text color override.
    pub color: Option<Color>,
}

/// Two-line elements: pseudo on top, `label value` below.
pub fn stat_elements(stats: &[PlayerStat]) -> Vec<CarouselElement> {
    stats
        .iter()
        .map(|s| {
            let mut e = CarouselElement::two_line(
                format!("stat-{}-{}", s.player_id, s.label.to_lowercase().replace(' ', "-")),
                s.pseudo.clone(),
                format!("{} : {}", s.label, s.value),
            );
            if let Some(c) = s.color {
                e = e.with_color(c);
            }
            if let Some(url) = s.image_url.as_deref().filter(|u| !u.is_empty()) {
                e = e.with_image(url);
            }
            e
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/feed/adapters.rs"]
mod tests;
