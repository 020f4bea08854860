//! Stdin line parsing
//!
//! Each line is either an action string (optionally followed by the hold
//! duration in seconds) or a `:`-prefixed host command.

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum InputLine {
    /// Action-string update, duration if given
    Action { raw: String, duration_secs: Option<f64> },
    /// `:default`, install the default button map
    LoadDefaultProfile,
    /// `:do <command> [param]`
    Request { command: String, param: serde_yaml::Value },
    /// `:state`, dump the simulated variables
    State,
    /// `:quit`
    Quit,
    /// Blank line or `#` comment
    Empty,
}

/// Parse one input line
pub fn parse_line(line: &str) -> Result<InputLine, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(InputLine::Empty);
    }

    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(InputLine::Empty);
    };

    let parsed = match head {
        ":default" => InputLine::LoadDefaultProfile,
        ":state" => InputLine::State,
        ":quit" | ":q" => InputLine::Quit,
        ":do" => {
            let command = parts
                .next()
                .ok_or_else(|| "usage: :do <command> [param]".to_string())?
                .to_string();
            let param = match parts.next() {
                Some(p) => serde_yaml::from_str(p).map_err(|e| format!("invalid param '{}': {}", p, e))?,
                None => serde_yaml::Value::Null,
            };
            InputLine::Request { command, param }
        }
        other if other.starts_with(':') => return Err(format!("unknown command '{}'", other)),
        raw => {
            let duration_secs = match parts.next() {
                Some(d) => Some(
                    d.parse::<f64>()
                        .map_err(|_| format!("invalid duration '{}'", d))?,
                ),
                None => None,
            };
            InputLine::Action {
                raw: raw.to_string(),
                duration_secs,
            }
        }
    };

    if let Some(extra) = parts.next() {
        return Err(format!("unexpected '{}'", extra));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_lines() {
        assert_eq!(
            parse_line("on_press_release"),
            Ok(InputLine::Action {
                raw: "on_press_release".to_string(),
                duration_secs: None
            })
        );
        assert_eq!(
            parse_line("  on_press_hold_release 2.4 "),
            Ok(InputLine::Action {
                raw: "on_press_hold_release".to_string(),
                duration_secs: Some(2.4)
            })
        );
        assert!(parse_line("on_press_hold_release long").is_err());
    }

    #[test]
    fn test_host_commands() {
        assert_eq!(parse_line(":default"), Ok(InputLine::LoadDefaultProfile));
        assert_eq!(parse_line(":state"), Ok(InputLine::State));
        assert_eq!(parse_line(":q"), Ok(InputLine::Quit));
        assert_eq!(parse_line(""), Ok(InputLine::Empty));
        assert_eq!(parse_line("# comment"), Ok(InputLine::Empty));
        assert!(parse_line(":reboot").is_err());
        assert!(parse_line(":state now").is_err());
    }

    #[test]
    fn test_request_lines() {
        assert_eq!(
            parse_line(":do DIM_STEP -10"),
            Ok(InputLine::Request {
                command: "DIM_STEP".to_string(),
                param: serde_yaml::Value::from(-10)
            })
        );
        assert_eq!(
            parse_line(":do dim_hold_start up"),
            Ok(InputLine::Request {
                command: "dim_hold_start".to_string(),
                param: serde_yaml::Value::from("up")
            })
        );
        assert_eq!(
            parse_line(":do TARGETS_OFF"),
            Ok(InputLine::Request {
                command: "TARGETS_OFF".to_string(),
                param: serde_yaml::Value::Null
            })
        );
        assert!(parse_line(":do").is_err());
    }
}
