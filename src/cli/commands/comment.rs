//! Comment command implementation.

use crate::cli::commands::{print_json, require_identity};
use crate::cli::{CommentAddArgs, CommentCommands};
use crate::config::{self, CliOverrides};
use crate::error::Result;
use crate::validation::CommentForm;

/// Execute a `comment` subcommand.
///
/// # Errors
///
/// Returns an error if the workspace cannot be opened or the comment is rejected.
pub fn execute(command: &CommentCommands, json: bool, cli: &CliOverrides) -> Result<()> {
    let (mut tracker, settings) = config::open_tracker(cli)?;

    match command {
        CommentCommands::Add(args) => {
            let identity = require_identity(&tracker, &settings)?;
            let form = CommentForm {
                content: comment_text(args),
            };
            let outcome = tracker.add_comment(identity, args.issue_id, &form)?;

            if json {
                return print_json(&outcome);
            }
            println!("Comment added to issue {}", args.issue_id);
            Ok(())
        }
    }
}

/// `--message` wins over positional words; empty text is left to validation.
fn comment_text(args: &CommentAddArgs) -> String {
    args.message
        .clone()
        .unwrap_or_else(|| args.text.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_flag_wins() {
        let args = CommentAddArgs {
            issue_id: 1,
            text: vec!["ignored".to_string()],
            message: Some("from flag".to_string()),
        };
        assert_eq!(comment_text(&args), "from flag");
    }

    #[test]
    fn positional_words_are_joined() {
        let args = CommentAddArgs {
            issue_id: 1,
            text: vec!["looks".to_string(), "fixed".to_string()],
            message: None,
        };
        assert_eq!(comment_text(&args), "looks fixed");
    }
}
