//! Operator commands and their replies.
//!
//! Both commands need the elevated `@css/root` privilege. Chat aliases
//! (`!k4toplist`, `/k4toprem`) resolve to the same commands as the console
//! names.

use toplist_core::lifecycle::CommandReply;
use toplist_core::types::Actor;

/// Console name of the "place a display" command.
pub const PLACE_COMMAND: &str = "css_k4toplist";
/// Console name of the "remove nearest display" command.
pub const REMOVE_COMMAND: &str = "css_k4toprem";
/// Privilege both commands require.
pub const REQUIRED_PERMISSION: &str = "@css/root";
/// Prefix of every reply sent to an operator.
pub const REPLY_PREFIX: &str = "[ K4-TopList ]";
/// Reply for actors without [`REQUIRED_PERMISSION`].
pub const PERMISSION_DENIED: &str = "You do not have permission to use this command.";

/// An operator command understood by the toplist system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorCommand {
    /// Place a new display in front of the operator.
    Place,
    /// Remove the display nearest to the operator.
    Remove,
}

impl OperatorCommand {
    /// Resolve a console command name or chat alias.
    ///
    /// Returns `None` for commands that belong to someone else.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let lowered = input.trim().to_ascii_lowercase();
        let name = lowered.strip_prefix(['!', '/']).unwrap_or(lowered.as_str());

        match name.strip_prefix("css_").unwrap_or(name) {
            "k4toplist" => Some(Self::Place),
            "k4toprem" => Some(Self::Remove),
            _ => None,
        }
    }

    /// Console name of this command.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Place => PLACE_COMMAND,
            Self::Remove => REMOVE_COMMAND,
        }
    }
}

/// Check that `actor` may run operator commands.
///
/// # Errors
/// Returns the permission-denied reply when the actor is not privileged.
pub fn authorize(actor: &Actor) -> Result<(), CommandReply> {
    if actor.privileged {
        Ok(())
    } else {
        Err(CommandReply::fail(PERMISSION_DENIED))
    }
}

/// Render a reply as the text shown to the operator.
#[must_use]
pub fn format_reply(reply: &CommandReply) -> String {
    format!("{REPLY_PREFIX} {}", reply.message)
}
