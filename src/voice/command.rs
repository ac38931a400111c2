//! Command recognition.

/// A parsed `/<command> <text>` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceCommand {
    /// Text to synthesize, trimmed. May be empty.
    pub text: String,
}

impl VoiceCommand {
    /// Parse a chat message against the configured command word.
    ///
    /// Returns `None` when the message is not this command. The command must
    /// be followed by whitespace or the end of the message, so `/曼波波` does
    /// not match `曼波`.
    pub fn parse(message: &str, command: &str) -> Option<Self> {
        let rest = message.trim().strip_prefix('/')?.strip_prefix(command)?;

        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return None;
        }

        Some(Self {
            text: rest.trim().to_string(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_with_text() {
        let cmd = VoiceCommand::parse("/曼波 你好世界", "曼波").unwrap();
        assert_eq!(cmd.text, "你好世界");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let cmd = VoiceCommand::parse("  /曼波   hello  there  ", "曼波").unwrap();
        assert_eq!(cmd.text, "hello  there");
    }

    #[test]
    fn test_parse_bare_command() {
        let cmd = VoiceCommand::parse("/曼波", "曼波").unwrap();
        assert!(cmd.is_empty());
    }

    #[test]
    fn test_parse_rejects_other_messages() {
        assert_eq!(VoiceCommand::parse("曼波 hi", "曼波"), None);
        assert_eq!(VoiceCommand::parse("/help", "曼波"), None);
        assert_eq!(VoiceCommand::parse("/曼波波 hi", "曼波"), None);
        assert_eq!(VoiceCommand::parse("", "曼波"), None);
    }

    #[test]
    fn test_parse_custom_command() {
        let cmd = VoiceCommand::parse("/say hi", "say").unwrap();
        assert_eq!(cmd.text, "hi");
    }
}
