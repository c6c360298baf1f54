use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppMode, FormFocus};
use crate::models::GenerationStatus;

pub fn color_from_name(name: &str) -> Color {
    match name.to_ascii_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        _ => Color::White,
    }
}

pub fn render_create_form(frame: &mut Frame, app: &App, area: Rect) {
    let accent = color_from_name(&app.theme.accent_color);
    let border = color_from_name(&app.theme.border_color);
    let highlight = color_from_name(&app.theme.highlight_color);

    let form_width = area.width.min(70);
    let form_height = area.height.min(17);
    let form_area = Rect {
        x: area.x + (area.width.saturating_sub(form_width)) / 2,
        y: area.y + (area.height.saturating_sub(form_height)) / 2,
        width: form_width,
        height: form_height,
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Heading
            Constraint::Length(7), // Prompt
            Constraint::Length(3), // Genre
            Constraint::Length(3), // Art style
            Constraint::Length(1), // Hint
        ])
        .split(form_area);

    let heading = Paragraph::new(vec![
        Line::from(Span::styled(
            "Weave Your Tale",
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Describe your idea, and watch the magic unfold.",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(heading, rows[0]);

    let prompt_focused = app.focus == FormFocus::Prompt;
    let (prompt_text, prompt_style) = if app.prompt_input.is_empty() {
        (
            "E.g., A lonely robot who discovers a flower in a cyberpunk wasteland...",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (
            app.prompt_input.as_str(),
            Style::default().fg(Color::White),
        )
    };
    let prompt = Paragraph::new(prompt_text)
        .style(prompt_style)
        .block(field_block(
            " Your Story Concept ",
            prompt_focused,
            border,
            highlight,
        ))
        .wrap(Wrap { trim: false });
    frame.render_widget(prompt, rows[1]);

    render_selector(
        frame,
        rows[2],
        " Genre ",
        app.genre.label(),
        app.focus == FormFocus::Genre,
        border,
        highlight,
    );
    render_selector(
        frame,
        rows[3],
        " Art Style ",
        app.art_style.label(),
        app.focus == FormFocus::ArtStyle,
        border,
        highlight,
    );

    let hint = if app.is_generating() {
        "Weaving magic..."
    } else {
        "Press Enter to generate"
    };
    let hint_widget = Paragraph::new(hint)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hint_widget, rows[4]);
}

fn field_block(title: &str, focused: bool, border: Color, highlight: Color) -> Block<'_> {
    let color = if focused { highlight } else { border };
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(color))
}

fn render_selector(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    value: &str,
    focused: bool,
    border: Color,
    highlight: Color,
) {
    let style = if focused {
        Style::default().fg(highlight).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let selector = Paragraph::new(format!("◀ {value} ▶"))
        .alignment(Alignment::Center)
        .style(style)
        .block(field_block(title, focused, border, highlight));
    frame.render_widget(selector, area);
}

pub fn render_story_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let accent = color_from_name(&app.theme.accent_color);
    let Some(story) = app.current_story().cloned() else {
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("[ {} ]", story.params.genre.label()),
            Style::default().fg(accent),
        )),
        Line::from(Span::styled(
            story.title.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for content_line in story.content.lines() {
        lines.push(Line::from(content_line.to_string()));
    }

    lines.push(Line::from(""));
    lines.push(asset_line(
        "Illustration",
        story.image_path.as_deref(),
        "Visualizing...",
        "no illustration",
        app.is_generating(),
    ));
    lines.push(asset_line(
        "Narration",
        story.audio_path.as_deref(),
        "Summoning the narrator...",
        "no narration",
        app.is_generating(),
    ));

    // Account for line wrapping to find the true visual height, then clamp
    // the scroll offset against it
    let available_width = area.width.max(1) as usize;
    let mut total_visual_lines = 0;
    for line in &lines {
        let line_width = line.width();
        if line_width == 0 {
            total_visual_lines += 1;
        } else {
            total_visual_lines += line_width.div_ceil(available_width);
        }
    }

    let visible_height = area.height as usize;
    let max_scroll = total_visual_lines.saturating_sub(visible_height);
    let actual_scroll = app.scroll_offset.min(max_scroll);
    if app.scroll_offset != actual_scroll {
        app.scroll_offset = actual_scroll;
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(actual_scroll).unwrap_or(u16::MAX), 0));

    frame.render_widget(paragraph, area);
}

fn asset_line(
    label: &str,
    path: Option<&std::path::Path>,
    pending: &str,
    missing: &str,
    generating: bool,
) -> Line<'static> {
    match path {
        Some(path) => Line::from(vec![
            Span::styled(format!("{label}: "), Style::default().fg(Color::DarkGray)),
            Span::styled(
                path.display().to_string(),
                Style::default().fg(Color::Green),
            ),
        ]),
        None if generating => Line::from(Span::styled(
            format!("{label}: {pending}"),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )),
        None => Line::from(Span::styled(
            format!("{label}: {missing}"),
            Style::default().fg(Color::DarkGray),
        )),
    }
}

pub fn render_history_list(frame: &mut Frame, app: &App, area: Rect) {
    let border = color_from_name(&app.theme.border_color);
    let highlight = color_from_name(&app.theme.highlight_color);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Story History ")
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.stories.is_empty() {
        let empty = Paragraph::new("No stories yet. Press Esc and weave one.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let mut lines = Vec::new();
    for (i, story) in app.stories.iter().enumerate() {
        let selected = i == app.history_index;
        let marker = if selected { "❯ " } else { "  " };

        let mut extras = String::new();
        if story.image_path.is_some() {
            extras.push_str(" [art]");
        }
        if story.audio_path.is_some() {
            extras.push_str(" [audio]");
        }

        let style = if selected {
            Style::default().fg(highlight).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{}", story.title), style),
            Span::styled(
                format!(
                    "  {} · {}{extras}",
                    story.params.genre.label(),
                    story.created_at.format("%Y-%m-%d %H:%M")
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    // Keep the selection on screen
    let visible_height = inner.height as usize;
    let offset = app
        .history_index
        .saturating_sub(visible_height.saturating_sub(1));

    let list = Paragraph::new(lines).scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0));
    frame.render_widget(list, inner);
}

pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let accent = color_from_name(&app.theme.accent_color);

    let (text, style) = match app.loading.status {
        GenerationStatus::Error => (
            app.loading.message.clone().unwrap_or_default(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        GenerationStatus::GeneratingText
        | GenerationStatus::GeneratingImage
        | GenerationStatus::GeneratingAudio => {
            let message = app.loading.message.clone().unwrap_or_default();
            #[allow(clippy::cast_possible_truncation)]
            let dots = app
                .stage_since
                .map_or(0, |since| (since.elapsed().as_millis() / 300 % 3) as usize);
            (
                format!("{message}{}", ".".repeat(dots + 1)),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            )
        }
        GenerationStatus::Idle | GenerationStatus::Complete => (
            app.model_name.clone(),
            Style::default().fg(Color::DarkGray),
        ),
    };

    let status = Paragraph::new(text)
        .alignment(Alignment::Right)
        .style(style);

    frame.render_widget(status, area);
}

pub fn render_bottom_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if app.exit_pending {
        (
            "Press Ctrl+C again to exit, Esc to cancel",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else {
        let keymap = match app.mode {
            AppMode::Create => {
                "Enter: Generate | Tab: Field | ◀/▶: Change | Ctrl+L: History | Ctrl+H: Help | Ctrl+C: Quit"
            }
            AppMode::Story => "Esc: Back | Up/Down: Scroll | Ctrl+L: History | Ctrl+H: Help",
            AppMode::History => "Enter: Open | d: Delete | Up/Down: Select | Esc: Close",
        };
        (keymap, Style::default().fg(Color::DarkGray))
    };

    let bar = Paragraph::new(text).alignment(Alignment::Center).style(style);

    frame.render_widget(bar, area);
}

pub fn render_help_window(frame: &mut Frame, area: Rect) {
    let help_text = vec![
        Line::from(Span::styled(
            "TaleWeave - Keyboard Shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "General:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("  Ctrl+H        - Show/hide this help"),
        Line::from("  Ctrl+L        - Story history"),
        Line::from("  Ctrl+Q        - Quit application"),
        Line::from("  Ctrl+C        - Quit application (press twice)"),
        Line::from(""),
        Line::from(Span::styled(
            "Create:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("  Typing        - Edit the story concept"),
        Line::from("  Tab           - Next field"),
        Line::from("  Left/Right    - Change genre or art style"),
        Line::from("  Enter         - Generate story"),
        Line::from(""),
        Line::from(Span::styled(
            "Story:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("  Up/Down       - Scroll"),
        Line::from("  PgUp/PgDn     - Scroll faster"),
        Line::from("  Home/End      - Jump to start/end"),
        Line::from("  Esc           - Back to the form"),
        Line::from(""),
        Line::from(Span::styled(
            "History:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("  Up/Down       - Select story"),
        Line::from("  Enter         - Open story"),
        Line::from("  d / Delete    - Delete story"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Ctrl+H or Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    // Calculate centered position
    let popup_width = 60;
    let popup_height = 30;
    let x = (area.width.saturating_sub(popup_width)) / 2;
    let y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: popup_width.min(area.width),
        height: popup_height.min(area.height),
    };

    frame.render_widget(Clear, popup_area);
    frame.render_widget(help_paragraph, popup_area);
}
