//! Screen modules for the admin console

pub mod help;
pub mod main_menu;
pub mod resource;
pub mod sms_balance;

pub use help::HelpScreen;
pub use main_menu::{MainMenuScreen, MenuTarget};
pub use resource::ResourceScreen;
pub use sms_balance::SmsBalanceScreen;

/// What a screen asks of the shell after handling a key.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenAction {
    None,
    /// Leave this screen; the shell drops it and returns to the menu.
    Back,
}
