use crate::host::{self, HostInfo};
use std::sync::Arc;

/// Engine state a built-in may read or change.
pub struct Session {
    pub working_directory: String,
    pub root_dir: String,
    pub user: String,
    pub host: Arc<dyn HostInfo>,
}

/// Result of running a built-in.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// Wipe the output log, including the echo of this command.
    ClearLog,
}

/// How a trimmed command line selects a built-in.
pub enum Matcher {
    /// The whole line equals one of these spellings.
    Exact(&'static [&'static str]),
    /// The line starts with this prefix; the rest is the argument.
    Prefix(&'static str),
}

impl Matcher {
    /// Returns the argument text when `line` matches.
    pub fn matches<'l>(&self, line: &'l str) -> Option<&'l str> {
        match self {
            Matcher::Exact(names) => names.iter().any(|n| *n == line).then_some(""),
            Matcher::Prefix(prefix) => line.strip_prefix(prefix),
        }
    }
}

pub type Handler = fn(&str, &mut Session) -> Reply;

pub struct Builtin {
    pub name: &'static str,
    pub matcher: Matcher,
    pub summary: &'static str,
    pub handler: Handler,
}

pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "help",
        matcher: Matcher::Exact(&["help"]),
        summary: "Show this help message",
        handler: help,
    },
    Builtin {
        name: "clear",
        matcher: Matcher::Exact(&["clear"]),
        summary: "Clear terminal output",
        handler: clear,
    },
    Builtin {
        name: "echo",
        matcher: Matcher::Prefix("echo "),
        summary: "Display a line of text",
        handler: echo,
    },
    Builtin {
        name: "date",
        matcher: Matcher::Exact(&["date"]),
        summary: "Display current date/time",
        handler: date,
    },
    Builtin {
        name: "whoami",
        matcher: Matcher::Exact(&["whoami"]),
        summary: "Display current user",
        handler: whoami,
    },
    Builtin {
        name: "pwd",
        matcher: Matcher::Exact(&["pwd"]),
        summary: "Print working directory",
        handler: pwd,
    },
    Builtin {
        name: "uname",
        matcher: Matcher::Exact(&["uname", "uname -a"]),
        summary: "Display system information",
        handler: uname,
    },
    Builtin {
        name: "cd",
        matcher: Matcher::Prefix("cd "),
        summary: "Change directory (limited)",
        handler: cd,
    },
    Builtin {
        name: "ls",
        matcher: Matcher::Exact(&["ls", "ls -la"]),
        summary: "List files (use File Navigator)",
        handler: ls,
    },
];

/// Commands listed in `help` that run as host processes.
pub const SYSTEM_COMMANDS: &[(&str, &str)] = &[
    ("getprop", "Get system properties"),
    ("ps", "Show running processes"),
    ("top", "Display system resources"),
    ("df", "Display disk usage"),
    ("free", "Display memory usage"),
    ("uptime", "Show system uptime"),
];

/// First built-in whose matcher accepts `line`, with its argument text.
pub fn lookup(line: &str) -> Option<(&'static Builtin, &str)> {
    BUILTINS
        .iter()
        .find_map(|b| b.matcher.matches(line).map(|arg| (b, arg)))
}

const RULE: &str = "═══════════════════════════════════════";

fn help(_arg: &str, session: &mut Session) -> Reply {
    let mut text = String::new();
    text.push_str(RULE);
    text.push_str("\n  EDEX-UI TERMINAL - AVAILABLE COMMANDS\n");
    text.push_str(RULE);
    text.push_str("\n\nBuilt-in Commands:\n");
    for b in BUILTINS {
        text.push_str(&format!("  {:<10}- {}\n", b.name, b.summary));
    }
    text.push_str("\nSystem Commands:\n");
    for (name, summary) in SYSTEM_COMMANDS {
        text.push_str(&format!("  {:<10}- {}\n", name, summary));
    }
    text.push_str("\nNote: Some commands may require root access\n");
    text.push_str(&format!(
        "Host: {} {}\n",
        session.host.os_name(),
        session.host.os_version()
    ));
    text.push_str(RULE);
    text.push('\n');
    Reply::Text(text)
}

fn clear(_arg: &str, _session: &mut Session) -> Reply {
    Reply::ClearLog
}

fn echo(arg: &str, _session: &mut Session) -> Reply {
    Reply::Text(arg.to_string())
}

fn date(_arg: &str, _session: &mut Session) -> Reply {
    Reply::Text(chrono::Local::now().format("%a %b %d %H:%M:%S %Z %Y").to_string())
}

fn whoami(_arg: &str, session: &mut Session) -> Reply {
    Reply::Text(session.user.clone())
}

fn pwd(_arg: &str, session: &mut Session) -> Reply {
    Reply::Text(session.working_directory.clone())
}

fn uname(_arg: &str, session: &mut Session) -> Reply {
    Reply::Text(host::describe(session.host.as_ref()))
}

/// Only an empty target or `~` is honored, resetting to the root marker.
/// Any other target leaves the working directory untouched and reports it
/// as unsupported: there is no real directory model behind `pwd`.
fn cd(arg: &str, session: &mut Session) -> Reply {
    let path = arg.trim();
    if path.is_empty() || path == "~" {
        session.working_directory = session.root_dir.clone();
        Reply::Text(format!("Changed to {}", session.working_directory))
    } else {
        Reply::Text(format!(
            "cd: changing to '{}' is unsupported (only 'cd ~' is available)",
            path
        ))
    }
}

fn ls(_arg: &str, _session: &mut Session) -> Reply {
    Reply::Text("Use the File Navigator module for file listing".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StaticHostInfo;

    fn session() -> Session {
        Session {
            working_directory: "/".to_string(),
            root_dir: "/".to_string(),
            user: "android-user".to_string(),
            host: Arc::new(StaticHostInfo {
                os_name: "Android".to_string(),
                os_version: "14".to_string(),
                device: "emu64".to_string(),
                arch: "x86_64".to_string(),
            }),
        }
    }

    fn run(line: &str, session: &mut Session) -> Option<Reply> {
        lookup(line).map(|(b, arg)| (b.handler)(arg, session))
    }

    #[test]
    fn test_exact_matchers() {
        assert_eq!(lookup("uname").map(|(b, _)| b.name), Some("uname"));
        assert_eq!(lookup("uname -a").map(|(b, _)| b.name), Some("uname"));
        assert_eq!(lookup("ls -la").map(|(b, _)| b.name), Some("ls"));
        assert!(lookup("ls -l").is_none());
        assert!(lookup("helpme").is_none());
    }

    #[test]
    fn test_prefix_matchers_need_the_space() {
        assert_eq!(lookup("echo hi").map(|(_, arg)| arg), Some("hi"));
        assert!(lookup("echo").is_none());
        assert!(lookup("cd").is_none());
        assert!(lookup("cdrom").is_none());
    }

    #[test]
    fn test_unknown_line_falls_through() {
        assert!(lookup("getprop ro.build.version.release").is_none());
    }

    #[test]
    fn test_echo_keeps_argument_verbatim() {
        let mut s = session();
        assert_eq!(
            run("echo  two  spaces ", &mut s),
            Some(Reply::Text(" two  spaces ".to_string()))
        );
    }

    #[test]
    fn test_help_lists_every_command() {
        let mut s = session();
        let Some(Reply::Text(text)) = run("help", &mut s) else {
            panic!("expected help text");
        };
        for b in BUILTINS {
            assert!(text.contains(&format!("  {:<10}- ", b.name)), "missing {}", b.name);
        }
        for (name, _) in SYSTEM_COMMANDS {
            assert!(text.contains(name), "missing {}", name);
        }
        assert!(text.contains("Host: Android 14"));
    }

    #[test]
    fn test_clear_requests_log_wipe() {
        let mut s = session();
        assert_eq!(run("clear", &mut s), Some(Reply::ClearLog));
    }

    #[test]
    fn test_cd_home_resets_to_root() {
        let mut s = session();
        s.working_directory = "/elsewhere".to_string();
        assert_eq!(run("cd ~", &mut s), Some(Reply::Text("Changed to /".to_string())));
        assert_eq!(s.working_directory, "/");
    }

    #[test]
    fn test_cd_other_path_is_unsupported_and_keeps_directory() {
        let mut s = session();
        let Some(Reply::Text(text)) = run("cd /tmp", &mut s) else {
            panic!("expected text");
        };
        assert!(text.contains("unsupported"));
        assert_eq!(s.working_directory, "/");
    }

    #[test]
    fn test_whoami_and_uname_use_session() {
        let mut s = session();
        assert_eq!(run("whoami", &mut s), Some(Reply::Text("android-user".to_string())));
        assert_eq!(
            run("uname -a", &mut s),
            Some(Reply::Text("Android 14 emu64 x86_64".to_string()))
        );
    }

    #[test]
    fn test_date_has_current_year() {
        let mut s = session();
        let Some(Reply::Text(text)) = run("date", &mut s) else {
            panic!("expected text");
        };
        let year = chrono::Local::now().format("%Y").to_string();
        assert!(text.ends_with(&year), "got {}", text);
    }

    #[test]
    fn test_ls_redirects_to_file_navigator() {
        let mut s = session();
        let Some(Reply::Text(text)) = run("ls", &mut s) else {
            panic!("expected text");
        };
        assert!(text.contains("File Navigator"));
    }
}
