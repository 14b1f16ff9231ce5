pub mod format;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use crate::app::{App, FeedbackKind};
use crate::celebration::ResultAnimation;
use crate::difficulty::{Difficulty, SpeedRank};
use crate::session::SessionSummary;
use format::{format_time, pad_right};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const TIME_WARNING_SECS: u32 = 10;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        screen::current_screen(self.phase()).render(self, area, buf);
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn tier_line(d: Difficulty, selected: bool) -> Line<'static> {
    let cfg = d.config();
    let time = match cfg.time_limit_secs {
        0 => "untimed".to_string(),
        t => format!("{} limit", format_time(t)),
    };
    let penalty = match cfg.penalty_secs {
        0 => String::new(),
        p => format!("+{p}s per mistake"),
    };
    let text = format!(
        "{} {}. {} {} options   {}   {}",
        if selected { "▶" } else { " " },
        d.index() + 1,
        pad_right(cfg.label, 7),
        cfg.option_count,
        pad_right(&time, 10),
        pad_right(&penalty, 16),
    );

    let style = if selected {
        bold().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Line::from(Span::styled(text, style))
}

pub(crate) fn render_menu(app: &App, area: Rect, buf: &mut Buffer) {
    let mut lines = vec![
        Line::from(Span::styled("ELİFBA", bold().fg(Color::Cyan))),
        Line::from(Span::styled(
            "Arabic alphabet quiz",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        Line::default(),
    ];

    let best = app.game.best_score().points();
    if best > 0 {
        lines.push(Line::from(Span::styled(
            format!("🏆 Best score: {best}"),
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::default());
    }

    for d in Difficulty::ALL {
        lines.push(tier_line(d, d == app.menu_selection));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!(
            "Sound: {}",
            if app.game.sound_enabled() { "on" } else { "off" }
        ),
        dim(),
    )));

    if let Some(err) = &app.last_error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            bold().fg(Color::Red),
        )));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "↑/↓ choose / (enter) or 1-4 start / (s)ound / (q)uit",
        Style::default().add_modifier(Modifier::ITALIC),
    )));

    let height = lines.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
}

pub(crate) fn render_playing(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(session) = app.game.session() else {
        return;
    };
    let Some(current) = session.current_letter() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // stats
            Constraint::Length(1), // progress
            Constraint::Length(1),
            Constraint::Length(3), // prompt
            Constraint::Length(1), // feedback
            Constraint::Min(6),    // options
            Constraint::Length(1), // legend
        ])
        .split(area);

    let total = session.order.len();
    let combo_style = if app.combo_pulse_until.is_some() {
        bold().fg(Color::Black).bg(Color::Yellow)
    } else if session.combo > 1 {
        bold().fg(Color::Yellow)
    } else {
        dim()
    };

    let time_span = match session.remaining_seconds() {
        Some(left) if left <= TIME_WARNING_SECS => Span::styled(
            format!("⏱ {}", format_time(left)),
            bold().fg(Color::Red).add_modifier(Modifier::SLOW_BLINK),
        ),
        Some(left) => Span::styled(format!("⏱ {}", format_time(left)), bold()),
        None => Span::styled(
            format!("⏱ {}", format_time(session.elapsed_seconds)),
            bold(),
        ),
    };

    let stats = Line::from(vec![
        Span::styled(format!("{} pts", session.total_points), bold().fg(Color::Cyan)),
        Span::raw("   "),
        Span::styled(format!("combo x{}", session.combo), combo_style),
        Span::raw("   "),
        Span::styled(
            format!("{}/{}", (session.current_index + 1).min(total), total),
            bold(),
        ),
        Span::raw("   "),
        time_span,
        Span::raw("   "),
        Span::styled(format!("✓ {}", session.score), bold().fg(Color::Green)),
        Span::raw("   "),
        Span::styled(
            if app.game.sound_enabled() { "♪ on" } else { "♪ off" },
            dim(),
        ),
    ]);
    Paragraph::new(stats)
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let ratio = if total == 0 {
        0.0
    } else {
        (session.current_index as f64 / total as f64).clamp(0.0, 1.0)
    };
    Gauge::default()
        .gauge_style(Style::default().fg(Color::Green).bg(Color::DarkGray))
        .ratio(ratio)
        .label(format!("{}/{}", session.current_index, total))
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(current.latin.clone(), bold().fg(Color::White)))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Which letter is this? ")
                .title_alignment(Alignment::Center),
        )
        .render(chunks[3], buf);

    if let Some(feedback) = &app.feedback {
        let style = match feedback.kind {
            FeedbackKind::Correct => bold().fg(Color::Green),
            FeedbackKind::Wrong => bold().fg(Color::Red),
        };
        Paragraph::new(Span::styled(feedback.text.clone(), style))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
    }

    render_option_grid(&session.current_options, chunks[5], buf);

    Paragraph::new(Span::styled(
        "1-8 answer / (space) replay / (s)ound / (esc) end",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[6], buf);
}

/// Two rows of numbered cards.
fn render_option_grid(options: &[crate::alphabet::Letter], area: Rect, buf: &mut Buffer) {
    if options.is_empty() {
        return;
    }
    let columns = options.len().div_ceil(2);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3)])
        .split(area);

    for (row_idx, row) in options.chunks(columns).enumerate() {
        let Some(row_area) = rows.get(row_idx) else {
            break;
        };
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(*row_area);

        for (col_idx, letter) in row.iter().enumerate() {
            let number = row_idx * columns + col_idx + 1;
            let card = Line::from(vec![
                Span::styled(format!("{number}  "), dim()),
                Span::styled(letter.arabic.clone(), bold()),
            ]);
            Paragraph::new(card)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL))
                .render(cells[col_idx], buf);
        }
    }
}

pub(crate) fn render_computing(area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        "Calculating results…",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);
}

fn result_title(summary: &SessionSummary) -> &'static str {
    if summary.perfect {
        return "Perfect!";
    }
    match summary.stars {
        3 => "Great job!",
        2 => "Good!",
        _ => "Keep going!",
    }
}

fn star_spans(summary: &SessionSummary, scale: [f64; 3]) -> Vec<Span<'static>> {
    (0..3)
        .map(|i| {
            let earned = i < summary.stars as usize;
            let (symbol, style) = match scale[i] {
                s if earned && s >= 1.0 => ("★", bold().fg(Color::Yellow)),
                s if earned && s > 0.0 => ("✦", Style::default().fg(Color::Yellow)),
                _ => ("☆", dim()),
            };
            Span::styled(format!(" {symbol} "), style)
        })
        .collect()
}

pub(crate) fn render_result(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(summary) = app.game.summary() else {
        render_computing(area, buf);
        return;
    };

    let (opacity, scale, shown_points, revealed) = match &app.result_animation {
        Some(anim) => {
            let frame = anim.frame(app.now);
            (frame.opacity, frame.star_scale, frame.shown_points, frame.done)
        }
        None => (1.0, [1.0; 3], summary.total_points, true),
    };
    let fade = if opacity < 1.0 { dim() } else { Style::default() };

    let speed = match summary.speed_rank {
        SpeedRank::None => String::new(),
        rank => format!("  {} {rank}", rank.icon()),
    };

    let mut lines = vec![
        Line::from(Span::styled(
            result_title(summary),
            bold().fg(Color::Yellow).patch(fade),
        )),
        Line::default(),
        Line::from(star_spans(summary, scale)),
        Line::default(),
        Line::from(Span::styled(
            format!("{shown_points} points"),
            bold().fg(Color::Cyan).patch(fade),
        )),
    ];
    if summary.new_record {
        lines.push(Line::from(Span::styled(
            "🏆 New record!",
            bold().fg(Color::Magenta),
        )));
    }
    lines.push(Line::default());

    let rows = [
        (
            "Time",
            format!("{}{speed}", format_time(summary.elapsed_seconds)),
        ),
        ("Accuracy", format!("{:.0}%", summary.accuracy)),
        ("Max combo", format!("x{}", summary.max_combo)),
        (
            "Correct",
            format!("{}/{}", summary.score, summary.total_letters),
        ),
        ("Wrong answers", summary.wrong_count.to_string()),
        ("Difficulty", summary.difficulty.to_string()),
    ];
    for (label, value) in rows {
        lines.push(Line::from(vec![
            Span::styled(pad_right(label, 15), dim().patch(fade)),
            Span::styled(pad_right(&value, 14), bold().patch(fade)),
        ]));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "(r)etry / (m)enu",
        Style::default().add_modifier(Modifier::ITALIC),
    )));

    let height = lines.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .render(chunks[1], buf);

    // sparkles wait for the card to finish counting up
    if let Some(anim) = app.result_animation.as_ref().filter(|_| revealed) {
        render_sparkles(anim, app, area, buf);
    }
}

/// Draws sparkles on empty cells around the result card.
fn render_sparkles(anim: &ResultAnimation, app: &App, area: Rect, buf: &mut Buffer) {
    let colors = [
        Color::Yellow,
        Color::Magenta,
        Color::Cyan,
        Color::Green,
        Color::LightYellow,
    ];

    for sparkle in anim.visible_sparkles(app.now) {
        let x = area.x + (sparkle.x * area.width as f64) as u16;
        let y = area.y + (sparkle.y * area.height as f64) as u16;

        if let Some(cell) = buf.cell_mut((x, y)) {
            if cell.symbol() != " " {
                continue;
            }
            cell.set_symbol(&sparkle.symbol.to_string());
            cell.set_style(Style::default().fg(colors[sparkle.color_index % colors.len()]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::game::Game;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::time::{Duration, Instant};

    fn app() -> App {
        App::new(Game::headless(11).unwrap(), Config::default(), Instant::now())
    }

    fn rendered(app: &App) -> String {
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer.content.iter().map(|c| c.symbol()).collect()
    }

    fn press(app: &mut App, code: KeyCode, now: Instant) {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE), now);
    }

    fn answer_all(app: &mut App, now: Instant) {
        while app.game.session().is_some_and(|s| s.is_playing()) {
            let session = app.game.session().unwrap();
            let current = session.current_letter().unwrap();
            let idx = session
                .current_options
                .iter()
                .position(|o| o.same_glyph(current))
                .unwrap();
            let key = char::from_digit(idx as u32 + 1, 10).unwrap();
            press(app, KeyCode::Char(key), now);
        }
    }

    #[test]
    fn test_menu_lists_tiers() {
        let app = app();
        let content = rendered(&app);

        assert!(content.contains("ELİFBA"));
        for d in Difficulty::ALL {
            assert!(content.contains(d.config().label));
        }
        assert!(content.contains("untimed"));
        assert!(content.contains("+10s per mistake"));
        assert!(!content.contains("Best score"));
    }

    #[test]
    fn test_playing_shows_prompt_and_options() {
        let mut app = app();
        let now = Instant::now();
        app.start_game(Difficulty::Medium, now);

        let content = rendered(&app);
        let session = app.game.session().unwrap();
        assert!(content.contains(&session.current_letter().unwrap().latin));
        assert!(content.contains("1/28"));
        assert!(content.contains("Which letter is this?"));
        for option in &session.current_options {
            assert!(content.contains(&option.arabic));
        }
        assert!(content.contains("1:30"));
    }

    #[test]
    fn test_playing_time_warning() {
        let mut app = app();
        let now = Instant::now();
        app.start_game(Difficulty::Hard, now);
        app.on_tick(now + Duration::from_secs(55));

        assert!(rendered(&app).contains("0:05"));
    }

    #[test]
    fn test_computing_screen_after_last_answer() {
        let mut app = app();
        let now = Instant::now();
        app.start_game(Difficulty::Easy, now);
        answer_all(&mut app, now);
        assert!(rendered(&app).contains("Calculating results"));
    }

    #[test]
    fn test_perfect_result() {
        let mut app = app();
        let now = Instant::now();
        app.start_game(Difficulty::Easy, now);
        answer_all(&mut app, now);

        app.on_tick(now + Duration::from_secs(1));
        app.on_tick(now + Duration::from_secs(10));

        let content = rendered(&app);
        assert!(content.contains("Perfect!"));
        assert!(content.contains("6850 points"));
        assert!(content.contains("New record!"));
        assert!(content.contains("28/28"));
        assert!(content.contains("x28"));
    }

    #[test]
    fn test_result_reveal_starts_empty() {
        let mut app = app();
        let now = Instant::now();
        app.start_game(Difficulty::Easy, now);
        answer_all(&mut app, now);
        app.on_tick(now + Duration::from_secs(1));

        let content = rendered(&app);
        assert!(content.contains("0 points"));
        assert!(!content.contains("6850"));
        assert!(content.contains("☆"));
    }

    #[test]
    fn test_no_sparkles_during_reveal() {
        let mut app = app();
        let now = Instant::now();
        app.start_game(Difficulty::Easy, now);
        answer_all(&mut app, now);
        app.on_tick(now + Duration::from_secs(1));
        assert_eq!(app.game.summary().unwrap().stars, 3);

        let content = rendered(&app);
        for symbol in ['✦', '✧', '*', '+'] {
            assert!(!content.contains(symbol), "unexpected {symbol}");
        }
    }

    #[test]
    fn test_best_score_on_menu_after_game() {
        let mut app = app();
        let now = Instant::now();
        app.start_game(Difficulty::Expert, now);
        answer_all(&mut app, now);
        app.on_tick(now + Duration::from_secs(10));

        press(&mut app, KeyCode::Char('m'), now + Duration::from_secs(10));
        let content = rendered(&app);
        assert!(content.contains("Best score"));
    }

    #[test]
    fn test_result_title_by_stars() {
        let summary = |stars, perfect| SessionSummary {
            difficulty: Difficulty::Easy,
            stars,
            speed_rank: SpeedRank::None,
            accuracy: 50.0,
            score: 14,
            total_letters: 28,
            total_points: 0,
            max_combo: 0,
            wrong_count: if perfect { 0 } else { 3 },
            elapsed_seconds: 0,
            perfect,
            new_record: false,
        };

        assert_eq!(result_title(&summary(1, true)), "Perfect!");
        assert_eq!(result_title(&summary(3, false)), "Great job!");
        assert_eq!(result_title(&summary(2, false)), "Good!");
        assert_eq!(result_title(&summary(1, false)), "Keep going!");
    }
}
