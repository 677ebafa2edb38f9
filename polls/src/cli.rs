// Copyright (c) James Kassemi, SC, US. All rights reserved.
use core_types::{CandidateIndex, PollIndex};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Show {
        poll: PollIndex,
    },
    Create {
        title: String,
        candidates: Vec<String>,
    },
    Vote {
        poll: PollIndex,
        candidate: CandidateIndex,
    },
    End {
        poll: PollIndex,
    },
    Watch,
}

impl Command {
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::Create { .. } | Command::Vote { .. } | Command::End { .. }
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error(
        "usage: polls <list | show <poll> | create <title> <candidate>... | vote <poll> <candidate> | end <poll> | watch>"
    )]
    Usage,
    #[error("invalid {what} {value:?}: expected a non-negative integer")]
    InvalidIndex { what: &'static str, value: String },
}

fn index<T: FromStr>(what: &'static str, value: Option<String>) -> Result<T, CliError> {
    let value = value.ok_or(CliError::Usage)?;
    value
        .parse()
        .map_err(|_| CliError::InvalidIndex { what, value })
}

pub fn parse<I>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let command = args.next().ok_or(CliError::Usage)?;
    let parsed = match command.as_str() {
        "list" => Command::List,
        "watch" => Command::Watch,
        "show" => Command::Show {
            poll: index("poll", args.next())?,
        },
        "end" => Command::End {
            poll: index("poll", args.next())?,
        },
        "vote" => Command::Vote {
            poll: index("poll", args.next())?,
            candidate: index("candidate", args.next())?,
        },
        "create" => {
            let title = args.next().ok_or(CliError::Usage)?;
            Command::Create {
                title,
                candidates: args.by_ref().collect(),
            }
        }
        _ => return Err(CliError::Usage),
    };
    if args.next().is_some() {
        return Err(CliError::Usage);
    }
    Ok(parsed)
}
