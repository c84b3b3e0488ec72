//! Helpers for asserting on transaction logs.

const EXIT_STATUS: &str = "exit_status=0x";

/// Logs of one top-level program invocation, nested invocations included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub logs: Vec<String>,
    pub success: bool,
}

pub fn contains(logs: &[String], text: &str) -> bool {
    logs.iter().any(|line| line.contains(text))
}

/// Value of the first `exit_status=0x..` marker.
pub fn exit_status(logs: &[String]) -> Option<u8> {
    logs.iter().find_map(|line| {
        let start = line.find(EXIT_STATUS)? + EXIT_STATUS.len();
        let digits: String = line[start..]
            .chars()
            .take_while(char::is_ascii_hexdigit)
            .collect();
        u8::from_str_radix(&digits, 16).ok()
    })
}

/// # Invocations
///
/// Groups log lines per top-level invocation, from `Program <id> invoke [1]`
/// to the matching `Program <id> success` or `Program <id> failed: ..` line.
/// Lines outside any invocation are dropped.
pub fn invocations(logs: &[String]) -> Vec<Invocation> {
    let mut result = Vec::new();
    let mut current: Option<Invocation> = None;
    let mut depth = 0usize;

    for line in logs {
        if let Some((program, level)) = parse_invoke(line) {
            depth = level;
            if level == 1 {
                current = Some(Invocation {
                    program: program.to_owned(),
                    logs: Vec::new(),
                    success: false,
                });
            }
        }
        let Some(invocation) = current.as_mut() else {
            continue;
        };
        invocation.logs.push(line.clone());

        let finished = parse_outcome(line);
        if let Some(success) = finished {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                if let Some(mut done) = current.take() {
                    done.success = success;
                    result.push(done);
                }
            }
        }
    }
    result
}

/// `Program <id> invoke [<level>]`
fn parse_invoke(line: &str) -> Option<(&str, usize)> {
    let rest = line.strip_prefix("Program ")?;
    let (program, rest) = rest.split_once(' ')?;
    let level = rest.strip_prefix("invoke [")?.strip_suffix(']')?;
    Some((program, level.parse().ok()?))
}

/// `Some(true)` for `Program <id> success`, `Some(false)` for `Program <id> failed..`.
fn parse_outcome(line: &str) -> Option<bool> {
    let rest = line.strip_prefix("Program ")?;
    let (_, outcome) = rest.split_once(' ')?;
    if outcome == "success" {
        Some(true)
    } else if outcome.starts_with("failed") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn exit_status_is_read_as_hex() {
        let logs = lines(&["Program log: start", "Program log: exit_status=0x11", "Program log: exit_status=0x12"]);
        assert_eq!(exit_status(&logs), Some(0x11));
        assert_eq!(exit_status(&lines(&["Program log: nothing"])), None);
        assert!(contains(&logs, "exit_status"));
        assert!(!contains(&logs, "panicked"));
    }

    #[test]
    fn invocations_group_top_level_calls() {
        let logs = lines(&[
            "Program KeccakSecp256k11111111111111111111111111111 invoke [1]",
            "Program KeccakSecp256k11111111111111111111111111111 success",
            "Program Loader111 invoke [1]",
            "Program log: call",
            "Program Token111 invoke [2]",
            "Program Token111 success",
            "Program log: exit_status=0x11",
            "Program Loader111 consumed 5000 of 200000 compute units",
            "Program Loader111 success",
            "Program Loader111 invoke [1]",
            "Program Loader111 failed: custom program error: 0x1",
        ]);
        let calls = invocations(&logs);
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].program, "KeccakSecp256k11111111111111111111111111111");
        assert!(calls[0].success);
        assert_eq!(calls[1].program, "Loader111");
        assert_eq!(calls[1].logs.len(), 7);
        assert!(calls[1].success);
        assert_eq!(exit_status(&calls[1].logs), Some(0x11));
        assert!(!calls[2].success);
    }
}
