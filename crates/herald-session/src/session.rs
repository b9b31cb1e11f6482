// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-recipient conversational state for the menu flow.

use strum::Display;

/// Where a recipient currently is in the menu state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    /// No menu outstanding.
    Idle,
    /// Top-level menu shown, awaiting a numbered choice.
    MainMenu,
    /// Product listing shown, awaiting a numbered choice.
    Products,
}

/// Conversational progress of one recipient.
///
/// `menu_active` gates dispatch: a deactivated session ignores input until a
/// menu-starter keyword arrives again. `busy` is set for the duration of a
/// bundle send so a second bundle request cannot interleave with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuSession {
    pub state: SessionState,
    pub menu_active: bool,
    pub busy: bool,
}

impl MenuSession {
    pub fn idle() -> Self {
        Self {
            state: SessionState::Idle,
            menu_active: false,
            busy: false,
        }
    }

    /// (Re)enter the top-level menu.
    pub fn activate(&mut self) {
        self.state = SessionState::MainMenu;
        self.menu_active = true;
    }

    /// Leave the menu flow. Any further input is ignored until reactivation.
    pub fn deactivate(&mut self) {
        self.state = SessionState::Idle;
        self.menu_active = false;
    }
}

impl Default for MenuSession {
    fn default() -> Self {
        Self::idle()
    }
}
