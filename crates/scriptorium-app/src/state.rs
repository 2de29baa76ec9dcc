// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    Search,
    RoutePrompt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub route: Route,
    pub history: Vec<Route>,
    pub theme: Theme,
    pub input: InputMode,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            route: Route::Home,
            history: Vec::new(),
            theme: Theme::default(),
            input: InputMode::Browse,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Navigate(Route),
    Back,
    ToggleTheme,
    FocusSearch,
    OpenRoutePrompt,
    ExitInput,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    RouteChanged(Route),
    ThemeChanged(Theme),
    InputModeChanged(InputMode),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn with_theme(theme: Theme) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::Navigate(route) => self.navigate(route),
            AppCommand::Back => self.back(),
            AppCommand::ToggleTheme => {
                self.theme = self.theme.toggled();
                let label = format!("{} theme", self.theme.as_str());
                vec![AppEvent::ThemeChanged(self.theme), self.set_status(&label)]
            }
            AppCommand::FocusSearch => {
                if !matches!(self.route, Route::List(_)) {
                    return vec![self.set_status("search is available on list screens")];
                }
                self.set_input(InputMode::Search)
            }
            AppCommand::OpenRoutePrompt => self.set_input(InputMode::RoutePrompt),
            AppCommand::ExitInput => self.set_input(InputMode::Browse),
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn navigate(&mut self, route: Route) -> Vec<AppEvent> {
        let mut events = self.set_input(InputMode::Browse);
        if route == self.route {
            return events;
        }
        let previous = std::mem::replace(&mut self.route, route);
        self.history.push(previous);
        events.push(AppEvent::RouteChanged(self.route.clone()));
        events
    }

    fn back(&mut self) -> Vec<AppEvent> {
        let mut events = self.set_input(InputMode::Browse);
        match self.history.pop() {
            Some(previous) => {
                self.route = previous;
                events.push(AppEvent::RouteChanged(self.route.clone()));
            }
            None => events.push(self.set_status("no previous view")),
        }
        events
    }

    fn set_input(&mut self, mode: InputMode) -> Vec<AppEvent> {
        if self.input == mode {
            return Vec::new();
        }
        self.input = mode;
        vec![AppEvent::InputModeChanged(mode)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState, InputMode, Theme};
    use crate::{EntityKind, Route};

    #[test]
    fn navigate_pushes_history_and_back_pops_it() {
        let mut state = AppState::default();

        state.dispatch(AppCommand::Navigate(Route::List(EntityKind::Work)));
        let events = state.dispatch(AppCommand::Navigate(Route::detail(EntityKind::Work, "A")));
        assert_eq!(
            events,
            vec![AppEvent::RouteChanged(Route::detail(EntityKind::Work, "A"))]
        );
        assert_eq!(state.history.len(), 2);

        let events = state.dispatch(AppCommand::Back);
        assert_eq!(
            events,
            vec![AppEvent::RouteChanged(Route::List(EntityKind::Work))]
        );
        assert_eq!(state.route, Route::List(EntityKind::Work));
    }

    #[test]
    fn back_returns_to_previous_view_not_parent() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::Navigate(Route::detail(EntityKind::Work, "A")));
        state.dispatch(AppCommand::Navigate(Route::detail(EntityKind::Author, "a1")));

        state.dispatch(AppCommand::Back);
        assert_eq!(state.route, Route::detail(EntityKind::Work, "A"));
        state.dispatch(AppCommand::Back);
        assert_eq!(state.route, Route::Home);
    }

    #[test]
    fn back_with_empty_history_stays_put() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::Back);
        assert_eq!(state.route, Route::Home);
        assert_eq!(
            events,
            vec![AppEvent::StatusUpdated("no previous view".to_owned())]
        );
    }

    #[test]
    fn navigating_to_current_route_is_not_recorded() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::Navigate(Route::List(EntityKind::Article)));
        let events = state.dispatch(AppCommand::Navigate(Route::List(EntityKind::Article)));
        assert!(events.is_empty());
        assert_eq!(state.history, vec![Route::Home]);
    }

    #[test]
    fn theme_toggle_is_a_pure_transition() {
        let mut state = AppState::with_theme(Theme::Light);
        let events = state.dispatch(AppCommand::ToggleTheme);
        assert_eq!(state.theme, Theme::Dark);
        assert_eq!(
            events,
            vec![
                AppEvent::ThemeChanged(Theme::Dark),
                AppEvent::StatusUpdated("dark theme".to_owned()),
            ]
        );
        state.dispatch(AppCommand::ToggleTheme);
        assert_eq!(state.theme, Theme::Light);
    }

    #[test]
    fn search_focus_only_on_list_screens() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::FocusSearch);
        assert_eq!(state.input, InputMode::Browse);

        state.dispatch(AppCommand::Navigate(Route::List(EntityKind::Author)));
        let events = state.dispatch(AppCommand::FocusSearch);
        assert_eq!(state.input, InputMode::Search);
        assert_eq!(events, vec![AppEvent::InputModeChanged(InputMode::Search)]);

        state.dispatch(AppCommand::Navigate(Route::detail(EntityKind::Author, "a1")));
        assert_eq!(state.input, InputMode::Browse);
    }

    #[test]
    fn theme_parse_accepts_case_variants() {
        assert_eq!(Theme::parse("Dark"), Some(Theme::Dark));
        assert_eq!(Theme::parse(" light "), Some(Theme::Light));
        assert_eq!(Theme::parse("sepia"), None);
    }
}
