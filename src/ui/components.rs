//! Panels for the terminal interface

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph};
use ratatui::Frame;
use std::collections::VecDeque;

use super::{Phase, Progress};

/// Status panel showing current phase and info
pub struct StatusPanel {
    phase: Phase,
    info: String,
}

impl StatusPanel {
    pub fn new() -> Self {
        Self {
            phase: Phase::Loading,
            info: String::new(),
        }
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let color = match self.phase {
            Phase::Complete => Color::Green,
            _ => Color::Cyan,
        };
        let phase_style = Style::default().fg(color).add_modifier(Modifier::BOLD);

        let phase_indicator = match self.phase {
            Phase::Loading => "◐",
            Phase::UpdatingSde => "↓",
            Phase::Fetching => "⇄",
            Phase::Writing => "✎",
            Phase::Complete => "✓",
        };

        let lines = vec![
            Line::from(vec![
                Span::styled(format!(" {} ", phase_indicator), phase_style),
                Span::styled(self.phase.to_string(), phase_style),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::raw("   "),
                Span::styled(&self.info, Style::default().fg(Color::Gray)),
            ]),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" zKillboard Export  (q to stop) ")
            .border_style(Style::default().fg(Color::Blue));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// Progress panel showing a page gauge
pub struct ProgressPanel {
    progress: Option<Progress>,
}

impl ProgressPanel {
    pub fn new() -> Self {
        Self { progress: None }
    }

    pub fn set_progress(&mut self, progress: Progress) {
        self.progress = Some(progress);
    }

    pub fn clear(&mut self) {
        self.progress = None;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(Color::Blue));

        let Some(progress) = &self.progress else {
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        };

        let label = if progress.total > 0 {
            format!(
                "{}: {}/{} ({:.0}%)",
                progress.label,
                progress.current,
                progress.total,
                progress.ratio() * 100.0
            )
        } else {
            progress.label.clone()
        };

        let gauge = Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
            .ratio(progress.ratio().min(1.0))
            .label(label);

        frame.render_widget(gauge, area);
    }
}

/// Activity log; downloads, cache hits and HTTP errors are colored apart
pub struct LogPanel {
    entries: VecDeque<String>,
    max_entries: usize,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: 500,
        }
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.entries.push_back(message.into());
        if self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    fn style_for(entry: &str) -> Style {
        if entry.starts_with("HTTP error") {
            Style::default().fg(Color::Red)
        } else if entry.starts_with("Cached:") {
            Style::default().fg(Color::DarkGray)
        } else if entry.starts_with("Download:") {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::White)
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Activity ")
            .border_style(Style::default().fg(Color::Blue));

        let visible_height = area.height.saturating_sub(2) as usize; // -2 for borders
        let start = self.entries.len().saturating_sub(visible_height);

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .skip(start)
            .map(|entry| ListItem::new(Span::styled(format!(" {}", entry), Self::style_for(entry))))
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_panel_caps_entries() {
        let mut panel = LogPanel::new();
        for i in 0..600 {
            panel.add(format!("Download: {}", i));
        }
        assert_eq!(panel.entries.len(), 500);
        assert_eq!(panel.entries.front().unwrap(), "Download: 100");
    }

    #[test]
    fn test_log_styles() {
        assert_eq!(LogPanel::style_for("HTTP error 502: x").fg, Some(Color::Red));
        assert_eq!(LogPanel::style_for("Cached: x").fg, Some(Color::DarkGray));
    }
}
