//! Terminal painting of the dashboard view model.

use std::fmt;

use skyview_core::{
    HistoryPanel, Page, Theme, Units, View,
    controller::unit_toggle_label,
    render::{CurrentPanel, Dashboard},
};

const RULE: &str = "────────────────────────────────────────";

/// Everything the painter needs besides the view itself.
pub struct Chrome<'a> {
    pub theme: Theme,
    pub units: Units,
    pub history: &'a HistoryPanel,
}

pub fn paint(view: &View, chrome: &Chrome<'_>) -> String {
    Screen { view, chrome }.to_string()
}

struct Screen<'a> {
    view: &'a View,
    chrome: &'a Chrome<'a>,
}

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Screen { view, chrome } = self;

        writeln!(f, "{}", title("SkyView", chrome.theme))?;
        writeln!(
            f,
            "[{}]  [{}]",
            unit_toggle_label(chrome.units),
            chrome.theme.toggle_label()
        )?;
        if let Some(notice) = &view.notice {
            writeln!(f, "{notice}")?;
        }
        writeln!(f, "{RULE}")?;

        match view.page {
            Page::Home => write!(f, "{}", HistoryList(chrome.history)),
            Page::Results => {
                if let Some(loading) = view.loading {
                    writeln!(f, "{loading}")?;
                }
                match &view.dashboard {
                    Some(dashboard) => paint_dashboard(f, dashboard, chrome.theme),
                    None => Ok(()),
                }
            }
        }
    }
}

fn title(text: &str, theme: Theme) -> String {
    match theme {
        // reverse video
        Theme::Dark => format!("\x1b[7m {text} \x1b[0m"),
        Theme::Light => format!("\x1b[1m{text}\x1b[0m"),
    }
}

/// The recent-searches block of the home page.
pub struct HistoryList<'a>(pub &'a HistoryPanel);

impl fmt::Display for HistoryList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Recent searches")?;
        match self.0 {
            HistoryPanel::Placeholder(text) => writeln!(f, "  {text}"),
            HistoryPanel::Entries(entries) => {
                for city in entries {
                    writeln!(f, "  • {city}")?;
                }
                Ok(())
            }
        }
    }
}

fn paint_current(f: &mut fmt::Formatter<'_>, current: &CurrentPanel) -> fmt::Result {
    writeln!(f, "{}", current.heading)?;
    writeln!(f, "  {}   ({})", current.temperature, current.icon_alt)?;
    writeln!(f, "  {}", current.feels_like)?;
    writeln!(f, "  {}", current.condition)?;
    writeln!(f, "  {}", current.wind)?;
    writeln!(f, "  {}", current.humidity)?;
    writeln!(f, "  {}", current.advice)
}

fn paint_dashboard(f: &mut fmt::Formatter<'_>, dashboard: &Dashboard, theme: Theme) -> fmt::Result {
    paint_current(f, &dashboard.current)?;

    if !dashboard.daily.is_empty() {
        writeln!(f, "{RULE}")?;
        writeln!(f, "{}", title("Forecast", theme))?;
        for card in &dashboard.daily {
            writeln!(
                f,
                "  {:<12} {:>6}  {}",
                card.date, card.temperature, card.icon_alt
            )?;
        }
    }

    if !dashboard.hourly.is_empty() {
        writeln!(f, "{RULE}")?;
        writeln!(f, "{}", title("Today", theme))?;
        for card in &dashboard.hourly {
            writeln!(
                f,
                "  {:<5} {:>6}  [{}] {}",
                card.time, card.temperature, card.icon, card.mood
            )?;
        }
    }

    Ok(())
}
