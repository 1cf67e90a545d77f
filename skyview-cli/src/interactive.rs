use std::fmt;

use inquire::{InquireError, Select, Text};
use tracing::debug;

use skyview_core::{
    Event, HistoryPanel,
    controller::{Action, BINDINGS, LOCATING, unit_toggle_label},
    orchestrator::CITY_LOADING,
};

use crate::cli::{DashboardController, print_view};

/// One line of the main menu.
#[derive(Debug, Clone)]
struct MenuItem {
    action: Option<Action>,
    label: String,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

fn menu(ctl: &DashboardController) -> Vec<MenuItem> {
    let mut items: Vec<MenuItem> = BINDINGS
        .iter()
        .map(|binding| {
            let label = match binding.action {
                Action::ToggleUnits => unit_toggle_label(ctl.units()).to_string(),
                Action::ToggleTheme => ctl.theme().toggle_label().to_string(),
                _ => binding.description.to_string(),
            };
            MenuItem {
                action: Some(binding.action),
                label: format!("({}) {}", binding.key, label),
            }
        })
        .collect();

    items.push(MenuItem {
        action: None,
        label: "(q) Quit".to_string(),
    });
    items
}

/// Ask for whatever the action needs. `None` means nothing to dispatch.
fn prompt_event(ctl: &DashboardController, action: Action) -> Result<Option<Event>, InquireError> {
    let event = match action {
        Action::Search => {
            let city = Text::new("City:")
                .with_initial_value(ctl.search_field())
                .prompt()?;
            Some(Event::Search(city))
        }
        Action::SelectHistory => match ctl.history_panel() {
            HistoryPanel::Placeholder(text) => {
                println!("{text}");
                None
            }
            HistoryPanel::Entries(entries) => {
                let city = Select::new("Recent searches:", entries).prompt()?;
                Some(Event::SelectHistory(city))
            }
        },
        Action::UseLocation => Some(Event::UseLocation),
        Action::ToggleUnits => Some(Event::ToggleUnits),
        Action::ToggleTheme => Some(Event::ToggleTheme),
    };
    Ok(event)
}

fn is_cancel(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

pub async fn run(mut ctl: DashboardController) -> anyhow::Result<()> {
    loop {
        print_view(&ctl);

        let choice = match Select::new("What next?", menu(&ctl)).prompt() {
            Ok(choice) => choice,
            Err(err) if is_cancel(&err) => return Ok(()),
            Err(err) => return Err(err.into()),
        };

        let Some(action) = choice.action else {
            return Ok(());
        };

        let event = match prompt_event(&ctl, action) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            // Esc inside a sub-prompt goes back to the menu
            Err(err) if is_cancel(&err) => continue,
            Err(err) => return Err(err.into()),
        };

        match &event {
            Event::Search(_) | Event::SelectHistory(_) => println!("{CITY_LOADING}"),
            Event::UseLocation => println!("{LOCATING}"),
            _ => {}
        }

        // failures are already reflected in the view's notice
        if let Err(err) = ctl.dispatch(event).await {
            debug!("Dispatch failed: {}", err);
        }
    }
}
