//! User-facing texts.

use crate::utils::html::{bold_link, escape_html};

pub const WELCOME: &str = "Hello :)\n\
Please Enter the restaurant name you want to check.\n\
It can be in English/Hebrew.\n\
To show current notification registrations please write: /show";

pub const GOODBYE: &str = "Thank you for using Wolt Checker Bot :)\n\nTo re-run the bot, please write /start";

pub const NOT_REGISTERED: &str = "You are not registered for any notification right now.";

pub const SELECT_RESTAURANT: &str = "Please Select the wanted restaurant";

pub const NO_RESULTS: &str = "I'm Sorry! No restaurants were found.\nYou can search for another one if you like.";

pub const REMOVED: &str = "No Problem, you are removed from being notified.";

pub const NOT_FOUND_FOR_REMOVAL: &str = "You were not registered for this restaurant anymore.";

pub const SEARCH_FAILED: &str = "An error occurred while searching for restaurants. Please try again.";

pub const CHECK_FAILED: &str = "An error occurred while checking the restaurant. Please try again.";

pub const SHOW_FAILED: &str = "An error occurred while fetching your registrations. Please try again.";

pub const REGISTER_FAILED: &str = "An error occurred while registering for notifications. Please try again.";

pub const REMOVE_FAILED: &str = "An error occurred while removing the notification. Please try again.";

pub const YES: &str = "Yes";
pub const NO: &str = "No";
pub const REMOVE: &str = "Remove";

pub fn invalid_search(reason: &str) -> String {
    format!("{reason}. Please send a restaurant name.")
}

/// HTML message for an open restaurant found during a conversation.
pub fn restaurant_open(name: &str, link: &str) -> String {
    format!(
        "{} is OPEN :)\n\n{}\n\n{}",
        escape_html(name),
        bold_link(link, &format!("Click here to order from {name}")),
        escape_html(GOODBYE)
    )
}

pub fn restaurant_closed(name: &str) -> String {
    format!(
        "{name} is CLOSED :(\n\nDo you want to register for an update when the restaurant will be open again ?"
    )
}

pub fn registered(name: &str) -> String {
    format!("No Problem, you will be notified once {name} is open.\n\n{GOODBYE}")
}

pub fn already_registered(name: &str) -> String {
    format!("You are already registered for {name}, you will be notified once it is open.\n\n{GOODBYE}")
}

/// HTML message sent by the notifier.
pub fn now_online(name: &str, link: &str) -> String {
    format!(
        "Hey there,\n{} is now ONLINE!!! Enjoy :)\n\n{}",
        escape_html(name),
        bold_link(link, &format!("Click here to order from {name}"))
    )
}
