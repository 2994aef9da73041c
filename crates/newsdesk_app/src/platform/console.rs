//! Line-oriented input. Lines starting with `:` drive the directory view;
//! everything else is a desk command for the dispatcher.

use newsdesk_core::{Msg, Schema};

use super::render::Facet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Send(Msg),
    ShowTable,
    ShowFacet(Facet),
    ShowHelp,
    Quit,
    Error(String),
    Nothing,
}

pub const HELP: &str = "\
Console commands:
  :mode researchers|journalists   switch directory
  :org [NAME]                     filter by organization (no NAME clears)
  :topic [NAME]                   filter by topic (no NAME clears)
  :orgs, :topics                  list the exact values :org and :topic accept
  :find [TEXT]                    free-text filter (no TEXT clears)
  :select N                       select row N of the table
  :recent                         recent work for the selected person
  :export PATH                    write the visible rows as CSV
  :tape                           market and headline tapes
  :list                           show the table again
  :help                           this text
  :quit                           leave
Anything else is a desk command, e.g. `guide`, `7`, `stock aapl`, `cmdty`.";

pub fn parse_line(line: &str) -> ConsoleInput {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleInput::Nothing;
    }
    let Some(rest) = line.strip_prefix(':') else {
        return ConsoleInput::Send(Msg::CommandSubmitted(line.to_string()));
    };

    let (verb, arg) = match rest.split_once(char::is_whitespace) {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (rest, ""),
    };
    let optional = || (!arg.is_empty()).then(|| arg.to_string());

    match verb.to_ascii_lowercase().as_str() {
        "mode" => match arg.parse::<Schema>() {
            Ok(schema) => ConsoleInput::Send(Msg::ModeSelected(schema)),
            Err(err) => ConsoleInput::Error(err.to_string()),
        },
        "org" => ConsoleInput::Send(Msg::OrganizationChanged(optional())),
        "topic" => ConsoleInput::Send(Msg::TopicChanged(optional())),
        "find" => ConsoleInput::Send(Msg::QueryChanged(arg.to_string())),
        "select" => match arg.parse::<usize>() {
            Ok(row) if row >= 1 => ConsoleInput::Send(Msg::RowSelected(row - 1)),
            _ => ConsoleInput::Error(format!("expected a row number, got {arg:?}")),
        },
        "recent" => ConsoleInput::Send(Msg::RecentWorkRequested),
        "export" if arg.is_empty() => ConsoleInput::Error("usage: :export PATH".to_string()),
        "export" => ConsoleInput::Send(Msg::ExportRequested {
            path: arg.to_string(),
        }),
        "orgs" => ConsoleInput::ShowFacet(Facet::Organizations),
        "topics" => ConsoleInput::ShowFacet(Facet::Topics),
        "tape" => ConsoleInput::Send(Msg::TapeRequested),
        "list" | "ls" => ConsoleInput::ShowTable,
        "help" | "h" | "?" => ConsoleInput::ShowHelp,
        "quit" | "q" | "exit" => ConsoleInput::Quit,
        other => ConsoleInput::Error(format!("unknown console command :{other} (try :help)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_lines_are_desk_commands() {
        assert_eq!(
            parse_line("  stock aapl "),
            ConsoleInput::Send(Msg::CommandSubmitted("stock aapl".into()))
        );
        assert_eq!(parse_line("   "), ConsoleInput::Nothing);
    }

    #[test]
    fn filters_take_optional_values() {
        assert_eq!(
            parse_line(":org Brookings Institution"),
            ConsoleInput::Send(Msg::OrganizationChanged(Some("Brookings Institution".into())))
        );
        assert_eq!(
            parse_line(":topic"),
            ConsoleInput::Send(Msg::TopicChanged(None))
        );
        assert_eq!(
            parse_line(":find"),
            ConsoleInput::Send(Msg::QueryChanged(String::new()))
        );
    }

    #[test]
    fn rows_are_one_based_on_the_console() {
        assert_eq!(parse_line(":select 3"), ConsoleInput::Send(Msg::RowSelected(2)));
        assert!(matches!(parse_line(":select 0"), ConsoleInput::Error(_)));
        assert!(matches!(parse_line(":select x"), ConsoleInput::Error(_)));
    }

    #[test]
    fn mode_names_are_case_insensitive() {
        assert_eq!(
            parse_line(":MODE Journalists"),
            ConsoleInput::Send(Msg::ModeSelected(Schema::Journalists))
        );
        assert!(matches!(parse_line(":mode pundits"), ConsoleInput::Error(_)));
    }

    #[test]
    fn export_needs_a_path() {
        assert!(matches!(parse_line(":export"), ConsoleInput::Error(_)));
        assert_eq!(
            parse_line(":export out/rows.csv"),
            ConsoleInput::Send(Msg::ExportRequested {
                path: "out/rows.csv".into()
            })
        );
    }

    #[test]
    fn housekeeping_commands() {
        assert_eq!(parse_line(":q"), ConsoleInput::Quit);
        assert_eq!(parse_line(":help"), ConsoleInput::ShowHelp);
        assert_eq!(parse_line(":list"), ConsoleInput::ShowTable);
        assert_eq!(parse_line(":tape"), ConsoleInput::Send(Msg::TapeRequested));
        assert_eq!(parse_line(":Orgs"), ConsoleInput::ShowFacet(Facet::Organizations));
        assert_eq!(parse_line(":topics"), ConsoleInput::ShowFacet(Facet::Topics));
        assert!(matches!(parse_line(":bogus"), ConsoleInput::Error(_)));
    }
}
