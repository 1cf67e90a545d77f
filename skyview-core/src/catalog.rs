//! Static table of weather conditions with their icons and advice.

/// One row of the condition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionEntry {
    pub main: &'static str,
    /// Icon identifier (lucide icon set).
    pub icon: &'static str,
    pub advice: &'static str,
}

const fn row(main: &'static str, icon: &'static str, advice: &'static str) -> ConditionEntry {
    ConditionEntry { main, icon, advice }
}

/// Rows are matched in order; the first key contained in the text wins.
pub const CATALOG: &[ConditionEntry] = &[
    row("Clear", "sun", "☀ Stay hydrated or take a walk!"),
    row("Rain", "cloud-rain", "🌧 Don't forget your umbrella!"),
    row("Drizzle", "cloud-drizzle", "🌧 Light rain—an umbrella is handy."),
    row("Snow", "cloud-snow", "❄ Layer up and stay warm!"),
    row("Thunderstorm", "zap", "⛈ Best to stay inside and wait it out."),
    row("Clouds", "cloud", "☁ Enjoy the calm clouds."),
    row("Mist", "cloud-fog", "🌁 Drive carefully, visibility may be low."),
    row("Smoke", "cloud-fog", "⚠️ Air quality might be affected."),
    row("Haze", "sun-dim", "⚠️ Air quality might be affected."),
    row("Dust", "cloud-fog", "🌪 Close your windows!"),
    row("Fog", "cloud-fog", "🌁 Drive carefully, visibility may be low."),
    row("Sand", "cloud-fog", "🌪 Close your windows!"),
    row("Ash", "cloud-fog", "⚠️ Air quality alert."),
    row("Squall", "wind", "💨 High winds, secure loose items."),
    row("Tornado", "tornado", "🚨 Take shelter immediately!"),
];

pub const UNKNOWN: ConditionEntry = row("Unknown", "cloud", "🌍 Have a great day!");

/// Resolve a condition string from the API to a catalog row.
///
/// Matching is a plain substring test against each key in table order, so a
/// key that is a substring of another key would shadow it. None of the current
/// keys overlap.
pub fn lookup(condition: &str) -> &'static ConditionEntry {
    lookup_in(CATALOG, condition)
}

pub(crate) fn lookup_in<'a>(table: &'a [ConditionEntry], condition: &str) -> &'a ConditionEntry {
    table
        .iter()
        .find(|entry| condition.contains(entry.main))
        .unwrap_or(&UNKNOWN)
}

pub fn icon_for(condition: &str) -> &'static str {
    lookup(condition).icon
}

/// Short mood line for the hourly timeline.
pub fn mood_message(condition: &str) -> &'static str {
    match lookup(condition).main {
        "Rain" => "☔ Stay dry!",
        "Snow" => "❄ Enjoy the snow!",
        "Clear" => "☀ Bright and sunny!",
        "Clouds" => "☁ Cloudy skies ahead",
        "Thunderstorm" => "⛈ Stay safe indoors!",
        _ => "🌍 Have a pleasant hour!",
    }
}
