use crate::infra::{AppConfig, BrowseError, MuxBackend, MuxError, run_browse, switch_or_create_session};
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliInvocation {
    PrintHelp,
    PrintVersion,
    Tui,
    Command(CliCommand),
}

/// One-shot subcommands that run a single tmux operation and exit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CliCommand {
    Last,
    Browse,
}

#[derive(Debug, Error)]
pub enum CliParseError {
    #[error("unknown subcommand: {0}")]
    UnknownSubcommand(String),

    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
}

pub fn parse_invocation(args: &[String]) -> Result<CliInvocation, CliParseError> {
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        return Ok(CliInvocation::PrintHelp);
    }
    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        return Ok(CliInvocation::PrintVersion);
    }

    let mut iter = args.iter().skip(1);
    let Some(subcommand) = iter.next() else {
        return Ok(CliInvocation::Tui);
    };

    let command = match subcommand.as_str() {
        "last" => CliCommand::Last,
        "browse" => CliCommand::Browse,
        flag if flag.starts_with('-') => return Err(CliParseError::UnknownFlag(flag.to_string())),
        other => return Err(CliParseError::UnknownSubcommand(other.to_string())),
    };

    if let Some(extra) = iter.next() {
        if extra.starts_with('-') {
            return Err(CliParseError::UnknownFlag(extra.to_string()));
        }
        return Err(CliParseError::UnexpectedArgument(extra.to_string()));
    }
    Ok(CliInvocation::Command(command))
}

#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0} must be run inside tmux")]
    NotInTmux(&'static str),

    #[error(transparent)]
    Mux(#[from] MuxError),

    #[error(transparent)]
    Browse(#[from] BrowseError),
}

impl CliCommand {
    pub fn name(self) -> &'static str {
        match self {
            Self::Last => "last",
            Self::Browse => "browse",
        }
    }
}

pub fn run(command: CliCommand, backend: &dyn MuxBackend, config: &AppConfig) -> Result<(), CliRunError> {
    if !backend.is_in_tmux() {
        return Err(CliRunError::NotInTmux(command.name()));
    }

    match command {
        CliCommand::Last => {
            backend.switch_to_last()?;
            tracing::info!("switched to last session");
        }
        CliCommand::Browse => {
            let Some(dir) = run_browse(config)? else {
                return Ok(());
            };
            let session = switch_or_create_session(backend, &dir)?;
            tracing::info!(session = %session, "switched to browsed directory");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::fake::FakeBackend;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn parse_defaults_to_tui_when_no_args() {
        let parsed = parse_invocation(&args(&["tswitch"])).expect("parse");
        assert_eq!(parsed, CliInvocation::Tui);
    }

    #[test]
    fn parse_help_flag_wins() {
        let parsed = parse_invocation(&args(&["tswitch", "last", "--help"])).expect("parse");
        assert_eq!(parsed, CliInvocation::PrintHelp);
        let parsed = parse_invocation(&args(&["tswitch", "-V"])).expect("parse");
        assert_eq!(parsed, CliInvocation::PrintVersion);
    }

    #[test]
    fn parse_subcommands() {
        assert_eq!(
            parse_invocation(&args(&["tswitch", "last"])).expect("parse"),
            CliInvocation::Command(CliCommand::Last)
        );
        assert_eq!(
            parse_invocation(&args(&["tswitch", "browse"])).expect("parse"),
            CliInvocation::Command(CliCommand::Browse)
        );
    }

    #[test]
    fn parse_rejects_unknown_input() {
        assert!(matches!(
            parse_invocation(&args(&["tswitch", "jump"])),
            Err(CliParseError::UnknownSubcommand(name)) if name == "jump"
        ));
        assert!(matches!(
            parse_invocation(&args(&["tswitch", "--fast"])),
            Err(CliParseError::UnknownFlag(_))
        ));
        assert!(matches!(
            parse_invocation(&args(&["tswitch", "last", "now"])),
            Err(CliParseError::UnexpectedArgument(_))
        ));
    }

    #[test]
    fn last_switches_client() {
        let backend = FakeBackend::with_sessions(&["a"]);
        run(CliCommand::Last, &backend, &AppConfig::default()).expect("run");
        assert_eq!(backend.calls(), vec!["switch last".to_string()]);
    }

    #[test]
    fn subcommands_require_tmux() {
        let backend = FakeBackend {
            in_tmux: false,
            ..FakeBackend::with_sessions(&["a"])
        };
        let error = run(CliCommand::Last, &backend, &AppConfig::default()).expect_err("should fail");
        assert_eq!(error.to_string(), "last must be run inside tmux");
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn browse_without_directories_fails_before_spawning() {
        let backend = FakeBackend::with_sessions(&["a"]);
        let error = run(CliCommand::Browse, &backend, &AppConfig::default()).expect_err("should fail");
        assert!(matches!(error, CliRunError::Browse(BrowseError::NoDirectories)));
    }
}
