use rand::Rng;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::game::{Arena, Game, Phase};
use crate::grid::Cell;

/// Draws the board one terminal cell per box: obstacles, then the snake, then
/// the food on top, matching the source's paint order.
impl Widget for &Arena {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let pos_of = |cell: Cell| -> Option<ratatui::layout::Position> {
            let col = (cell.x / self.grid.box_size) as u16;
            let row = (cell.y / self.grid.box_size) as u16;
            (col < area.width && row < area.height)
                .then(|| ratatui::layout::Position::new(area.x + col, area.y + row))
        };

        for obs in &self.obstacles {
            if let Some(pos) = pos_of(*obs) {
                buf[pos].set_symbol("▒").set_fg(Color::Red);
            }
        }

        for cell in self.snake.cells() {
            if let Some(pos) = pos_of(cell) {
                buf[pos].set_symbol(" ").set_bg(Color::Green);
            }
        }
        if let Some(pos) = pos_of(self.snake.head()) {
            buf[pos]
                .set_symbol("@")
                .set_bg(Color::Green)
                .set_fg(Color::Black);
        }

        if let Some(pos) = pos_of(self.food) {
            buf[pos].set_symbol("●").set_fg(Color::Yellow);
        }
    }
}

impl<R: Rng> Game<R> {
    pub fn render(&self, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title + score
                Constraint::Min(0),    // Board
            ])
            .split(frame.area());

        let score_text = match self.phase() {
            Phase::Playing(arena) => format!("OUROS    Score: {}", arena.score),
            Phase::GameOver { final_score, .. } => format!("OUROS    Score: {final_score}"),
            _ => "OUROS".to_string(),
        };
        frame.render_widget(
            Paragraph::new(score_text)
                .alignment(Alignment::Left)
                .block(Block::default().borders(Borders::ALL)),
            layout[0],
        );

        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(layout[1]);
        frame.render_widget(block, layout[1]);

        match &self.phase {
            Phase::Start => {
                frame.render_widget(
                    Paragraph::new("Classic Snake Game\n\nPress any key to start")
                        .alignment(Alignment::Center),
                    centered_vertically(inner, 3),
                );
            }
            Phase::Playing(arena) => {
                frame.render_widget(arena, board_rect(arena, inner));
            }
            Phase::GameOver { arena, final_score } => {
                frame.render_widget(arena, board_rect(arena, inner));
                frame.render_widget(
                    Paragraph::new(format!(
                        "GAME OVER\nScore: {final_score}\nPress any key to restart"
                    ))
                    .alignment(Alignment::Center),
                    centered_vertically(inner, 3),
                );
            }
            Phase::Exit => {}
        }
    }
}

/// The board drawn at one terminal cell per box, centered in `area` and
/// clipped when the terminal is too small.
fn board_rect(arena: &Arena, area: Rect) -> Rect {
    let width = (arena.grid.cols() as u16).min(area.width);
    let height = (arena.grid.rows() as u16).min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn centered_vertically(area: Rect, lines: u16) -> Rect {
    let height = lines.min(area.height);
    Rect {
        x: area.x,
        y: area.y + (area.height - height) / 2,
        width: area.width,
        height,
    }
}
