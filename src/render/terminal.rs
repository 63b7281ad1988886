use std::{
    io::{self, Stdout},
    time::Duration,
};

use ratatui::{
    DefaultTerminal, Terminal,
    backend::{Backend, CrosstermBackend},
    buffer::Buffer,
    crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Paragraph, Widget, Wrap},
};

use super::{
    FrameSink,
    frame::{Frame, FrameLine},
};
use crate::state::display::Rgb;

/// Draws frames through a ratatui [`Terminal`].
///
/// [`TerminalSink::stdout`] takes over the terminal (raw mode, alternate screen) and hands it back
/// on [`FrameSink::close`] or drop.
pub struct TerminalSink<B: Backend = CrosstermBackend<Stdout>> {
    terminal: Terminal<B>,
    owns_screen: bool,
}

impl TerminalSink {
    /// Take over standard output.
    pub fn stdout() -> io::Result<Self> {
        let terminal: DefaultTerminal = ratatui::try_init()?;
        Ok(Self {
            terminal,
            owns_screen: true,
        })
    }
}

impl<B: Backend> TerminalSink<B> {
    /// Draw onto `backend` without touching the process terminal.
    pub fn with_backend(backend: B) -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new(backend)?,
            owns_screen: false,
        })
    }

    /// Backend frames are drawn to.
    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }
}

impl<B: Backend + Send> FrameSink for TerminalSink<B> {
    fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        self.terminal.draw(|f| f.render_widget(frame, f.area()))?;
        Ok(())
    }

    fn quit_requested(&mut self) -> io::Result<bool> {
        // Raw mode turns Ctrl+C into a key press instead of SIGINT.
        if !self.owns_screen || !event::poll(Duration::ZERO)? {
            return Ok(false);
        }
        let Event::Key(key) = event::read()? else {
            return Ok(false);
        };
        let quit = key.kind == KeyEventKind::Press
            && match key.code {
                KeyCode::Char('q') | KeyCode::Esc => true,
                KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
                _ => false,
            };
        Ok(quit)
    }

    fn close(&mut self) -> io::Result<()> {
        if std::mem::take(&mut self.owns_screen) {
            ratatui::try_restore()?;
        }
        Ok(())
    }
}

impl<B: Backend> Drop for TerminalSink<B> {
    fn drop(&mut self) {
        if self.owns_screen {
            ratatui::restore();
        }
    }
}

impl Widget for &Frame {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [header, _, body] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(area);
        let [left, right] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(header);

        if let Some(clock) = &self.clock {
            Line::from(clock.as_str()).render(left, buf);
        }
        Line::from(self.date.as_str())
            .right_aligned()
            .render(right, buf);

        let rows = Layout::vertical(self.body.iter().map(row_constraint))
            .flex(Flex::Center)
            .split(body);
        for (line, row) in self.body.iter().zip(rows.iter()) {
            block(line).render(*row, buf);
        }
    }
}

fn row_constraint(line: &FrameLine) -> Constraint {
    match line.card {
        Some(_) => Constraint::Fill(1),
        None => {
            let lines = line.text.lines().count().max(1);
            Constraint::Length(u16::try_from(lines).unwrap_or(u16::MAX))
        }
    }
}

fn block(line: &FrameLine) -> Paragraph<'_> {
    let paragraph = Paragraph::new(line.text.as_str())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    match line.card {
        Some(card) => paragraph.block(Block::bordered()).style(card_style(card)),
        None => paragraph,
    }
}

fn card_style(card: Rgb) -> Style {
    Style::new()
        .bg(Color::Rgb(card.r, card.g, card.b))
        .fg(Color::White)
}
