use crate::action::Action;
use crate::registry::{ToolId, TOOLS};

pub struct CommandParser;

impl CommandParser {
    pub fn parse(input: &str) -> Result<Action, String> {
        let input = input.trim();
        if !input.starts_with('/') {
            return Err("Not a command".to_string());
        }

        let (cmd, args) = input.split_once(' ').unwrap_or((input, ""));
        let args = args.trim();

        match cmd {
            "/help" => Ok(Action::Help),
            "/home" => Ok(Action::Home),
            "/open" => {
                if args.is_empty() {
                    return Err(format!("Usage: /open <tool>\n  Tools: {}", tool_keys()));
                }
                ToolId::from_key(args)
                    .map(Action::Open)
                    .ok_or_else(|| format!("Unknown tool: {}. Tools: {}", args, tool_keys()))
            }
            "/quit" => Ok(Action::Quit),
            _ => Err(format!("Unknown command: {}. Type /help for available commands.", cmd)),
        }
    }
}

fn tool_keys() -> String {
    TOOLS.iter().map(|t| t.id.key()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_by_key() {
        assert_eq!(CommandParser::parse("/open notepad"), Ok(Action::Open(ToolId::Notepad)));
        assert_eq!(CommandParser::parse("  /open   text-ai "), Ok(Action::Open(ToolId::TextAi)));
    }

    #[test]
    fn test_open_requires_known_tool() {
        assert!(CommandParser::parse("/open").unwrap_err().starts_with("Usage"));
        assert!(CommandParser::parse("/open spreadsheet").unwrap_err().contains("Unknown tool"));
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(CommandParser::parse("/home"), Ok(Action::Home));
        assert_eq!(CommandParser::parse("/help"), Ok(Action::Help));
        assert_eq!(CommandParser::parse("/quit"), Ok(Action::Quit));
    }

    #[test]
    fn test_rejects_non_commands() {
        assert!(CommandParser::parse("open notepad").is_err());
        assert!(CommandParser::parse("/frobnicate").unwrap_err().contains("Unknown command"));
    }
}
