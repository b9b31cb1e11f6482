// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Menu rendering and numbered-choice dispatch.
//!
//! The menu layout is driven entirely by configuration: the main menu lists
//! the products entry first, then every canned reply; the product listing
//! shows one choice per bundle plus a final "back" entry. Dispatch is a pure
//! function from (state, input) to an action, so the tables are testable
//! without an engine.

use herald_config::model::ResponderConfig;

use crate::session::SessionState;

/// What the engine should do with a menu choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Show the product listing and move to [`SessionState::Products`].
    ShowProducts,
    /// Send a canned reply and close the menu.
    Reply(String),
    /// Send bundle `index` (into `responder.bundles`) and close the menu.
    SendBundle(usize),
    /// Re-show the main menu and move back to [`SessionState::MainMenu`].
    BackToMain,
    /// Input was not a valid choice for the current state; close the menu.
    Deactivate,
}

/// Resolves a normalized input line against the menu for `state`.
pub fn dispatch(state: SessionState, input: &str, config: &ResponderConfig) -> MenuAction {
    let Ok(choice) = input.parse::<usize>() else {
        return MenuAction::Deactivate;
    };

    match state {
        SessionState::MainMenu => {
            if choice == 1 {
                return MenuAction::ShowProducts;
            }
            match choice.checked_sub(2).and_then(|i| config.replies.get(i)) {
                Some(reply) => MenuAction::Reply(reply.text.clone()),
                None => MenuAction::Deactivate,
            }
        }
        SessionState::Products => {
            if (1..=config.bundles.len()).contains(&choice) {
                MenuAction::SendBundle(choice - 1)
            } else if choice == config.bundles.len() + 1 {
                MenuAction::BackToMain
            } else {
                MenuAction::Deactivate
            }
        }
        SessionState::Idle => MenuAction::Deactivate,
    }
}

/// The top-level menu text.
pub fn render_main_menu(config: &ResponderConfig) -> String {
    let mut lines = Vec::with_capacity(config.replies.len() + 2);
    lines.push(config.menu_header.clone());
    lines.push(format!("1. {}", config.products_label));
    for (index, reply) in config.replies.iter().enumerate() {
        lines.push(format!("{}. {}", index + 2, reply.label));
    }
    lines.join("\n")
}

/// The product listing text, one choice per configured bundle.
pub fn render_products_menu(config: &ResponderConfig) -> String {
    let mut lines = Vec::with_capacity(config.bundles.len() + 2);
    lines.push(config.products_header.clone());
    for (index, bundle) in config.bundles.iter().enumerate() {
        lines.push(format!("{}. {}", index + 1, bundle.name));
    }
    lines.push(format!("{}. {}", config.bundles.len() + 1, config.back_label));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_config::model::BundleConfig;

    fn config_with_bundles() -> ResponderConfig {
        ResponderConfig {
            bundles: vec![
                BundleConfig {
                    name: "Starter pack".to_string(),
                    announcement: "Here comes the starter pack.".to_string(),
                    files: vec!["starter.pdf".to_string()],
                },
                BundleConfig {
                    name: "Full catalog".to_string(),
                    announcement: String::new(),
                    files: vec!["catalog-1.pdf".to_string(), "catalog-2.pdf".to_string()],
                },
            ],
            ..ResponderConfig::default()
        }
    }

    #[test]
    fn main_menu_lists_products_then_replies() {
        let config = ResponderConfig::default();
        let menu = render_main_menu(&config);
        let lines: Vec<&str> = menu.lines().collect();

        assert_eq!(lines[0], config.menu_header);
        assert_eq!(lines[1], format!("1. {}", config.products_label));
        assert_eq!(lines.len(), 2 + config.replies.len());
        for (index, reply) in config.replies.iter().enumerate() {
            assert_eq!(lines[2 + index], format!("{}. {}", index + 2, reply.label));
        }
    }

    #[test]
    fn products_menu_lists_bundles_then_back() {
        let config = config_with_bundles();
        let menu = render_products_menu(&config);
        let lines: Vec<&str> = menu.lines().collect();

        assert_eq!(lines[0], config.products_header);
        assert_eq!(lines[1], "1. Starter pack");
        assert_eq!(lines[2], "2. Full catalog");
        assert_eq!(lines[3], format!("3. {}", config.back_label));
    }

    #[test]
    fn main_menu_choice_one_opens_products() {
        let config = config_with_bundles();
        assert_eq!(
            dispatch(SessionState::MainMenu, "1", &config),
            MenuAction::ShowProducts
        );
    }

    #[test]
    fn main_menu_reply_choices_map_in_order() {
        let config = ResponderConfig::default();
        for (index, reply) in config.replies.iter().enumerate() {
            let input = (index + 2).to_string();
            assert_eq!(
                dispatch(SessionState::MainMenu, &input, &config),
                MenuAction::Reply(reply.text.clone())
            );
        }
    }

    #[test]
    fn main_menu_out_of_range_deactivates() {
        let config = ResponderConfig::default();
        let past_end = (config.replies.len() + 2).to_string();
        assert_eq!(
            dispatch(SessionState::MainMenu, &past_end, &config),
            MenuAction::Deactivate
        );
        assert_eq!(
            dispatch(SessionState::MainMenu, "0", &config),
            MenuAction::Deactivate
        );
    }

    #[test]
    fn non_numeric_input_deactivates() {
        let config = ResponderConfig::default();
        assert_eq!(
            dispatch(SessionState::MainMenu, "first", &config),
            MenuAction::Deactivate
        );
        assert_eq!(
            dispatch(SessionState::Products, "", &config),
            MenuAction::Deactivate
        );
    }

    #[test]
    fn products_choices_map_to_bundles_and_back() {
        let config = config_with_bundles();
        assert_eq!(
            dispatch(SessionState::Products, "1", &config),
            MenuAction::SendBundle(0)
        );
        assert_eq!(
            dispatch(SessionState::Products, "2", &config),
            MenuAction::SendBundle(1)
        );
        assert_eq!(
            dispatch(SessionState::Products, "3", &config),
            MenuAction::BackToMain
        );
        assert_eq!(
            dispatch(SessionState::Products, "4", &config),
            MenuAction::Deactivate
        );
    }

    #[test]
    fn products_with_no_bundles_only_offers_back() {
        let config = ResponderConfig::default();
        assert!(config.bundles.is_empty());
        assert_eq!(
            dispatch(SessionState::Products, "1", &config),
            MenuAction::BackToMain
        );
        assert_eq!(
            dispatch(SessionState::Products, "2", &config),
            MenuAction::Deactivate
        );
    }

    #[test]
    fn idle_state_never_dispatches() {
        let config = config_with_bundles();
        assert_eq!(
            dispatch(SessionState::Idle, "1", &config),
            MenuAction::Deactivate
        );
    }
}
