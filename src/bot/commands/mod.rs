use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Wolt Checker Bot commands:")]
pub enum Command {
    #[command(description = "Start searching for a restaurant")]
    Start,
    #[command(description = "Show your notification registrations")]
    Show,
    #[command(description = "End the current conversation")]
    Cancel,
    #[command(description = "Display this help message")]
    Help,
}
