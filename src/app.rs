use anyhow::{Context, Result};
use std::sync::Arc;

use skydeck_core::Config;
use skydeck_services::{
    open_store, Confirmation, Dashboard, KeyValueStore, NavKey, Suggester, TrackedCityStore,
};
use skydeck_weather::WeatherProvider;

use crate::command::{Command, HELP};
use crate::render;

/// What the input loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit,
}

/// Console dashboard: one search box plus the tracked-city cards.
pub struct App {
    dashboard: Dashboard<Box<dyn KeyValueStore>, WeatherProvider>,
    suggester: Suggester<WeatherProvider>,
}

impl App {
    /// Wire the dashboard from configuration. Must be called inside a tokio runtime.
    pub fn new(config: &Config) -> Result<Self> {
        let provider = Arc::new(
            WeatherProvider::from_config(&config.weather)
                .context("Failed to create weather provider")?,
        );

        let store = TrackedCityStore::open(open_store(config));
        let dashboard = Dashboard::from_config(store, Arc::clone(&provider), &config.weather);
        let suggester = Suggester::from_config(provider, &config.suggest);

        tracing::info!(
            "Dashboard ready with {} tracked cities ({:?} storage)",
            dashboard.cities().len(),
            config.storage.backend
        );

        Ok(Self {
            dashboard,
            suggester,
        })
    }

    pub fn handle(&mut self, command: Command) -> Flow {
        let output = match command {
            Command::Add(city) => {
                let confirmation = self.suggester.confirm(&city, self.dashboard.cities());
                self.apply(confirmation)
            }
            Command::Type(text) => {
                self.suggester.input(&text);
                String::new()
            }
            Command::Down => self.navigate(NavKey::Down),
            Command::Up => self.navigate(NavKey::Up),
            Command::Enter => self.navigate(NavKey::Enter),
            Command::Pick(row) => {
                match self.suggester.select(row - 1, self.dashboard.cities()) {
                    Some(confirmation) => self.apply(confirmation),
                    None => format!("No suggestion numbered {}", row),
                }
            }
            Command::Submit => {
                let confirmation = self.suggester.submit(self.dashboard.cities());
                self.apply(confirmation)
            }
            Command::Remove(city) => match self.dashboard.remove(&city) {
                Ok(true) => format!("Removed {}", city),
                Ok(false) => format!("{} is not tracked", city),
                Err(e) => e.user_message().to_string(),
            },
            Command::Clear => match self.dashboard.clear() {
                Ok(()) => "Cleared all cities".to_string(),
                Err(e) => e.user_message().to_string(),
            },
            Command::Units => {
                let units = self.dashboard.toggle_units();
                format!(
                    "Showing {} ({})",
                    units.temperature_label(),
                    render::units_prompt(units)
                )
            }
            Command::Show => self.show(),
            Command::Help => HELP.to_string(),
            Command::Quit => return Flow::Quit,
        };
        Flow::Continue(output)
    }

    fn navigate(&mut self, key: NavKey) -> String {
        match self.suggester.key(key, self.dashboard.cities()) {
            Some(confirmation) => self.apply(confirmation),
            None => render::suggestions(&self.suggester.state()),
        }
    }

    fn apply(&mut self, confirmation: Confirmation) -> String {
        match confirmation {
            Confirmation::Accepted(city) => match self.dashboard.add(&city) {
                Ok(_) => format!("Tracking {}", city),
                Err(e) => e.user_message().to_string(),
            },
            Confirmation::Duplicate(city) => format!("{} is already tracked", city),
            Confirmation::Empty => "Nothing to add".to_string(),
        }
    }

    fn show(&self) -> String {
        let mut out = render::suggestions(&self.suggester.state());
        out.push_str(&render::units_prompt(self.dashboard.units()));
        out.push('\n');

        if self.dashboard.cards().is_empty() {
            out.push_str("No cities tracked. Try 'type <name>' or 'add <city>'.\n");
        }
        for card in self.dashboard.cards() {
            out.push('\n');
            out.push_str(&render::card(card.city(), &card.view()));
        }
        out
    }

    pub fn shutdown(self) {
        tracing::info!(
            "Shutting down; stopping {} weather cards",
            self.dashboard.cards().len()
        );
    }
}
