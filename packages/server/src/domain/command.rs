//! In-band command protocol.

/// Command classified from one inbound payload of an active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `@usuarios`: list connected users
    List,
    /// `@conexion`: report the number of connected users
    ConnectionInfo,
    /// `@salir`: leave the chat
    Quit,
    /// `@h`: show the help text
    Help,
    /// Anything else, relayed byte for byte
    Chat(Vec<u8>),
}

const LIST_PREFIX: &[u8] = b"@usuarios";
const CONNECTION_INFO_PREFIX: &[u8] = b"@conexion";
const QUIT_PREFIX: &[u8] = b"@salir";
const HELP_PREFIX: &[u8] = b"@h";

impl Command {
    /// Classify a payload by case-sensitive prefix.
    ///
    /// Prefixes are checked in the order list, connection info, quit, help.
    /// Text after a prefix is ignored, so `@hola` is a help request.
    pub fn parse(payload: &[u8]) -> Self {
        if payload.starts_with(LIST_PREFIX) {
            Command::List
        } else if payload.starts_with(CONNECTION_INFO_PREFIX) {
            Command::ConnectionInfo
        } else if payload.starts_with(QUIT_PREFIX) {
            Command::Quit
        } else if payload.starts_with(HELP_PREFIX) {
            Command::Help
        } else {
            Command::Chat(payload.to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands_with_line_terminator() {
        assert_eq!(Command::parse(b"@usuarios\n"), Command::List);
        assert_eq!(Command::parse(b"@conexion\r\n"), Command::ConnectionInfo);
        assert_eq!(Command::parse(b"@salir\n"), Command::Quit);
        assert_eq!(Command::parse(b"@h\n"), Command::Help);
    }

    #[test]
    fn test_parse_is_prefix_based() {
        // given: trailing text after a known prefix
        let payload = b"@usuarios please";

        // when:
        let command = Command::parse(payload);

        // then:
        assert_eq!(command, Command::List);
        assert_eq!(Command::parse(b"@hola"), Command::Help);
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(Command::parse(b"@SALIR"), Command::Chat(b"@SALIR".to_vec()));
    }

    #[test]
    fn test_parse_prefix_must_start_payload() {
        // given: command text preceded by whitespace
        let payload = b" @salir";

        // when:
        let command = Command::parse(payload);

        // then: treated as a normal chat message
        assert_eq!(command, Command::Chat(b" @salir".to_vec()));
    }

    #[test]
    fn test_parse_unknown_at_command_is_chat() {
        assert_eq!(
            Command::parse(b"@nadie\n"),
            Command::Chat(b"@nadie\n".to_vec())
        );
    }

    #[test]
    fn test_parse_keeps_non_utf8_chat_bytes() {
        // given: Latin-1 "café"
        let payload = b"caf\xe9";

        // when:
        let command = Command::parse(payload);

        // then:
        assert_eq!(command, Command::Chat(vec![b'c', b'a', b'f', 0xe9]));
    }
}
