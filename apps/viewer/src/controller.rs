//! Terminal input mapping and command dispatch from input to the engine queue.

use gallery_core::{EngineCommand, TabSet};
use tokio::sync::mpsc::{error::TrySendError, Sender};

#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    Select(usize),
    Drag(f32),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Accepts a 1-based tab number, a tab key or title, `drag <position>`,
/// `help` and `q`.
pub fn parse_input(line: &str, tabs: &TabSet) -> InputAction {
    let input = line.trim();
    if input.is_empty() {
        return InputAction::Empty;
    }

    let lower = input.to_ascii_lowercase();
    match lower.as_str() {
        "q" | "quit" | "exit" => return InputAction::Quit,
        "?" | "h" | "help" => return InputAction::Help,
        _ => {}
    }

    if let Some(position) = lower.strip_prefix("drag ") {
        return match position.trim().parse::<f32>() {
            Ok(position) => InputAction::Drag(position),
            Err(_) => InputAction::Unknown(input.to_string()),
        };
    }

    if let Ok(number) = input.parse::<usize>() {
        return match number.checked_sub(1) {
            Some(index) => InputAction::Select(index),
            None => InputAction::Unknown(input.to_string()),
        };
    }

    tabs.iter()
        .find(|tab| {
            tab.key.as_str().eq_ignore_ascii_case(input) || tab.title.eq_ignore_ascii_case(input)
        })
        .map(|tab| InputAction::Select(tab.display_index))
        .unwrap_or_else(|| InputAction::Unknown(input.to_string()))
}

pub fn help_text(tabs: &TabSet) -> String {
    let mut text = String::from("commands:\n");
    for tab in tabs.iter() {
        text.push_str(&format!(
            "  {} | {} | {}  show {}\n",
            tab.display_index + 1,
            tab.key,
            tab.title,
            tab.title
        ));
    }
    text.push_str("  drag <position>  move the tab indicator\n");
    text.push_str("  q  quit");
    text
}

pub fn dispatch_engine_command(
    commands: &Sender<EngineCommand>,
    command: EngineCommand,
    status: &mut String,
) {
    let command_name = match &command {
        EngineCommand::SelectTab { .. } => "select_tab",
        EngineCommand::SetTransitionPosition(_) => "set_transition_position",
        EngineCommand::AdvanceTransition(_) => "advance_transition",
        EngineCommand::SettleTransition => "settle_transition",
    };

    match commands.try_send(command) {
        Ok(()) => tracing::debug!(command = command_name, "queued input->engine command"),
        Err(TrySendError::Full(_)) => {
            *status = "engine command queue is full; please retry".to_string();
        }
        Err(TrySendError::Closed(_)) => {
            *status = "gallery engine stopped; restart the viewer".to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[test]
    fn numbers_are_one_based() {
        let tabs = TabSet::default();
        assert_eq!(parse_input("1", &tabs), InputAction::Select(0));
        assert_eq!(parse_input(" 2 ", &tabs), InputAction::Select(1));
        assert_eq!(parse_input("7", &tabs), InputAction::Select(6));
        assert_eq!(parse_input("0", &tabs), InputAction::Unknown("0".into()));
    }

    #[test]
    fn keys_and_titles_select_case_insensitively() {
        let tabs = TabSet::default();
        assert_eq!(parse_input("wonderself", &tabs), InputAction::Select(1));
        assert_eq!(parse_input("My Gallery", &tabs), InputAction::Select(0));
        assert_eq!(parse_input("gallery", &tabs), InputAction::Select(0));
        assert_eq!(
            parse_input("trending", &tabs),
            InputAction::Unknown("trending".into())
        );
    }

    #[test]
    fn parses_control_words() {
        let tabs = TabSet::default();
        assert_eq!(parse_input("", &tabs), InputAction::Empty);
        assert_eq!(parse_input("Q", &tabs), InputAction::Quit);
        assert_eq!(parse_input("help", &tabs), InputAction::Help);
        assert_eq!(parse_input("drag 0.5", &tabs), InputAction::Drag(0.5));
        assert_eq!(
            parse_input("drag far", &tabs),
            InputAction::Unknown("drag far".into())
        );
    }

    #[test]
    fn help_lists_every_tab() {
        let text = help_text(&TabSet::default());
        assert!(text.contains("1 | gallery | My Gallery"));
        assert!(text.contains("2 | wonderSelf | WonderSelf"));
    }

    #[test]
    fn dispatch_reports_full_and_closed_queues() {
        let (commands, mut command_rx) = mpsc::channel(1);
        let mut status = String::new();

        dispatch_engine_command(&commands, EngineCommand::SettleTransition, &mut status);
        assert!(status.is_empty());

        dispatch_engine_command(&commands, EngineCommand::SettleTransition, &mut status);
        assert!(status.contains("full"));

        assert!(matches!(
            command_rx.try_recv(),
            Ok(EngineCommand::SettleTransition)
        ));
        drop(command_rx);
        dispatch_engine_command(&commands, EngineCommand::SettleTransition, &mut status);
        assert!(status.contains("stopped"));
    }
}
