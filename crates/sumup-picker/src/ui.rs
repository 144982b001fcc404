//! UI rendering

use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};

use crate::engine::PickerEngine;
use crate::record::MembershipRecord;

const SEARCH_PLACEHOLDER: &str = "Type to filter...";

/// Render the whole picker
pub fn render(frame: &mut Frame, engine: &PickerEngine) {
    let para = Paragraph::new(frame_text(engine)).wrap(Wrap { trim: false });
    frame.render_widget(para, frame.area());
}

/// Half-open range of rows to show so the cursor stays near the middle
pub fn visible_window(len: usize, cursor: usize, max_visible: usize) -> (usize, usize) {
    if len <= max_visible {
        return (0, len);
    }
    let half = max_visible / 2;
    let start = cursor.saturating_sub(half);
    let end = (start + max_visible).min(len);
    (end.saturating_sub(max_visible), end)
}

/// Build the full frame as styled text
pub fn frame_text(engine: &PickerEngine) -> Text<'static> {
    if let Some(err) = engine.error() {
        return Text::from(vec![
            Line::from(Span::styled(
                format!("Error: {}", err),
                Style::default().fg(Color::Red),
            )),
            Line::default(),
            help_line("ctrl+c/q: quit"),
        ]);
    }

    let mut lines = vec![title_line(engine), Line::default()];

    if engine.is_searching() {
        lines.push(search_line(engine));
        lines.push(Line::default());
    }

    let items = engine.displayed();
    let max_visible = engine.config().visible_rows;
    let (start, end) = visible_window(items.len(), engine.cursor(), max_visible);

    for (i, record) in items.iter().enumerate().take(end).skip(start) {
        lines.push(item_line(record, i == engine.cursor()));
    }

    if items.is_empty() {
        let text = if engine.is_loading() {
            "Loading..."
        } else {
            "No items found."
        };
        lines.push(Line::from(text));
    } else if items.len() > max_visible {
        lines.push(Line::default());
        lines.push(Line::from(format!(
            "(Showing {}-{} of {})",
            start + 1,
            end,
            items.len()
        )));
    }

    lines.push(Line::default());
    lines.push(help_line(&help_text(engine)));

    Text::from(lines)
}

fn title_line(engine: &PickerEngine) -> Line<'static> {
    let title = match engine.navigation().current().parent_name() {
        Some(name) => format!("Select a merchant from: {}", name),
        None => "Select a merchant or organization:".to_string(),
    };
    Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
}

fn search_line(engine: &PickerEngine) -> Line<'static> {
    let input = engine.input();
    let cursor_style = Style::default().fg(Color::White).bg(Color::DarkGray);
    let text_style = Style::default().fg(Color::White);

    let mut spans = vec![Span::raw("Search: ")];

    if input.is_empty() {
        spans.push(Span::styled("█", text_style));
        spans.push(Span::styled(
            SEARCH_PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        let (before, after) = input.text().split_at(input.cursor());
        let mut rest = after.chars();
        if !before.is_empty() {
            spans.push(Span::styled(before.to_string(), text_style));
        }
        match rest.next() {
            Some(c) => spans.push(Span::styled(c.to_string(), cursor_style)),
            None => spans.push(Span::styled("█", text_style)),
        }
        let after_cursor = rest.as_str();
        if !after_cursor.is_empty() {
            spans.push(Span::styled(after_cursor.to_string(), text_style));
        }
    }

    if engine.is_loading() {
        spans.push(Span::styled(
            " (loading...)",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::DIM),
        ));
    }
    Line::from(spans)
}

/// Plain label of a row, without the cursor marker
pub fn item_label(record: &MembershipRecord) -> String {
    if record.is_organization() {
        format!(
            "Organization: {} ({})",
            record.resource_name, record.resource_id
        )
    } else {
        let code = record.merchant_code_attribute().unwrap_or("-");
        format!("{} ({})", record.resource_name, code)
    }
}

fn item_line(record: &MembershipRecord, is_selected: bool) -> Line<'static> {
    let marker = if is_selected { ">" } else { " " };
    let text = format!("{} {}", marker, item_label(record));

    let style = if is_selected {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else if record.is_organization() {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default()
    };
    Line::from(Span::styled(text, style))
}

pub fn help_text(engine: &PickerEngine) -> String {
    if engine.is_searching() {
        return "esc: exit search | enter: confirm | ctrl+c: quit".to_string();
    }
    let mut help = String::from("↑/↓ or j/k: navigate | /: search | enter: select");
    if engine.navigation().can_go_back() {
        help.push_str(" | esc: back");
    }
    help.push_str(" | ctrl+c/q: quit");
    help
}

fn help_line(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::Indexed(241)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Effect, FetchResponse, PickerEvent};
    use crate::record::FetchError;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{Terminal, backend::TestBackend};

    fn press(engine: &mut PickerEngine, code: KeyCode) {
        engine.handle(PickerEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn plain(text: &Text<'_>) -> String {
        text.lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn merchants(n: usize) -> Vec<MembershipRecord> {
        (1..=n)
            .map(|i| MembershipRecord::merchant(format!("m{i}"), format!("Shop {i}")))
            .collect()
    }

    #[test]
    fn test_visible_window() {
        assert_eq!(visible_window(3, 2, 10), (0, 3));
        assert_eq!(visible_window(30, 0, 10), (0, 10));
        assert_eq!(visible_window(30, 4, 10), (0, 10));
        assert_eq!(visible_window(30, 5, 10), (0, 10));
        assert_eq!(visible_window(30, 6, 10), (1, 11));
        assert_eq!(visible_window(30, 15, 10), (10, 20));
        assert_eq!(visible_window(30, 29, 10), (20, 30));
        assert_eq!(visible_window(0, 0, 10), (0, 0));
    }

    #[test]
    fn test_root_frame() {
        let engine = PickerEngine::new(vec![
            MembershipRecord::organization("org1", "Acme"),
            MembershipRecord::merchant("m1", "Acme Shop").with_attribute("merchant_code", "MC1"),
            MembershipRecord::merchant("m2", "Corner Cafe"),
        ]);
        insta::assert_snapshot!(plain(&frame_text(&engine)), @r"
        Select a merchant or organization:

        > Organization: Acme (org1)
          Acme Shop (MC1)
          Corner Cafe (-)

        ↑/↓ or j/k: navigate | /: search | enter: select | ctrl+c/q: quit
        ");
    }

    #[test]
    fn test_truncated_list_shows_range() {
        let mut engine = PickerEngine::new(merchants(25));
        for _ in 0..12 {
            press(&mut engine, KeyCode::Down);
        }
        let text = plain(&frame_text(&engine));
        assert!(text.contains("(Showing 8-17 of 25)"));
        assert!(text.contains("> Shop 13 (-)"));
        assert!(!text.contains("Shop 7 "));
        assert!(!text.contains("Shop 18 "));
    }

    #[test]
    fn test_drilled_level_shows_breadcrumb_and_loading() {
        let mut engine = PickerEngine::new(vec![MembershipRecord::organization("org1", "Acme")]);
        press(&mut engine, KeyCode::Enter);
        insta::assert_snapshot!(plain(&frame_text(&engine)), @r"
        Select a merchant from: Acme

        Loading...

        ↑/↓ or j/k: navigate | /: search | enter: select | esc: back | ctrl+c/q: quit
        ");
    }

    #[test]
    fn test_empty_list_and_search_mode() {
        let mut engine = PickerEngine::new(Vec::new());
        press(&mut engine, KeyCode::Char('/'));
        let text = plain(&frame_text(&engine));
        assert!(text.contains("Search: █Type to filter..."));
        assert!(text.contains("No items found."));
        assert!(text.contains("esc: exit search | enter: confirm | ctrl+c: quit"));
        // q is query text while the input has focus
        assert!(!text.contains("ctrl+c/q"));

        press(&mut engine, KeyCode::Char('a'));
        press(&mut engine, KeyCode::Char('b'));
        press(&mut engine, KeyCode::Left);
        let text = plain(&frame_text(&engine));
        assert!(text.contains("Search: ab\n"));
    }

    #[test]
    fn test_search_line_while_fetch_in_flight() {
        let mut engine = PickerEngine::new(merchants(2));
        press(&mut engine, KeyCode::Char('/'));
        press(&mut engine, KeyCode::Char('a'));
        let effects = engine.handle(PickerEvent::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::NONE,
        )));
        let ticket = match effects.as_slice() {
            [Effect::ArmDebounce { ticket, .. }] => *ticket,
            other => panic!("unexpected {other:?}"),
        };
        let fetch = engine.handle(PickerEvent::DebounceFired(ticket));
        assert!(matches!(fetch.as_slice(), [Effect::Fetch(_)]));

        insta::assert_snapshot!(plain(&frame_text(&engine)), @r"
        Select a merchant or organization:

        Search: ac█ (loading...)

        > Shop 1 (-)
          Shop 2 (-)

        esc: exit search | enter: confirm | ctrl+c: quit
        ");
    }

    #[test]
    fn test_failed_fetch_shows_error_view() {
        let mut engine = PickerEngine::new(vec![MembershipRecord::organization("org1", "Acme")]);
        let effects = engine.handle(PickerEvent::Key(KeyEvent::new(
            KeyCode::Enter,
            KeyModifiers::NONE,
        )));
        let request = match effects.as_slice() {
            [Effect::Fetch(request)] => request.clone(),
            other => panic!("unexpected {other:?}"),
        };
        engine.handle(PickerEvent::FetchCompleted(FetchResponse {
            request,
            result: Err(FetchError::new("service unavailable")),
        }));

        insta::assert_snapshot!(plain(&frame_text(&engine)), @r"
        Error: service unavailable

        ctrl+c/q: quit
        ");
    }

    #[test]
    fn test_render_into_terminal_buffer() {
        let engine = PickerEngine::new(merchants(2));
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal.draw(|f| render(f, &engine)).unwrap();

        let buffer = terminal.backend().buffer();
        let first_row: String = (0..buffer.area.width)
            .map(|x| buffer[(x, 0)].symbol())
            .collect();
        assert_eq!(first_row.trim_end(), "Select a merchant or organization:");
    }
}
