//! Rendering layer: all terminal output lives here.
//!
//! Receives a [`RenderSnapshot`] and translates it into crossterm commands.
//! The playfield is scaled to whatever the terminal currently measures: row 0
//! is the HUD, rows 1 and h-2 are the border, and the last row holds the
//! controls hint.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use space_defender::entities::Rect;
use space_defender::render::{RenderSnapshot, Renderer, Sprite, SpriteKind};
use space_defender::session::SessionState;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_ENEMY: Color = Color::Red;
const C_PROJECTILE: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;

pub struct TerminalRenderer<'a, W: Write> {
    out: &'a mut W,
}

impl<'a, W: Write> TerminalRenderer<'a, W> {
    pub fn new(out: &'a mut W) -> Self {
        Self { out }
    }
}

impl<W: Write> Renderer for TerminalRenderer<'_, W> {
    fn render(&mut self, snapshot: &RenderSnapshot) -> std::io::Result<()> {
        let (cols, rows) = terminal::size()?;
        render(self.out, snapshot, Grid::new(cols, rows, snapshot))
    }
}

// ── Playfield → cell mapping ──────────────────────────────────────────────────

/// Inner drawing area between the border walls.
#[derive(Clone, Copy)]
struct Grid {
    cols: u16,
    rows: u16,
    sx: f32,
    sy: f32,
}

impl Grid {
    fn new(cols: u16, rows: u16, snapshot: &RenderSnapshot) -> Self {
        let inner_w = cols.saturating_sub(2).max(1);
        let inner_h = rows.saturating_sub(4).max(1);
        Self {
            cols,
            rows,
            sx: f32::from(inner_w) / snapshot.width,
            sy: f32::from(inner_h) / snapshot.height,
        }
    }

    fn first_col(&self) -> i32 {
        1
    }

    fn last_col(&self) -> i32 {
        i32::from(self.cols) - 2
    }

    fn first_row(&self) -> i32 {
        2
    }

    fn last_row(&self) -> i32 {
        i32::from(self.rows) - 3
    }

    /// Columns of the left and right walls, hugging the inner area.
    fn wall_cols(&self) -> (u16, u16) {
        let left = (self.first_col() - 1).max(0) as u16;
        let right = (self.last_col() + 1).max(i32::from(left)) as u16;
        (left, right)
    }

    /// Rows of the top and bottom walls.
    fn wall_rows(&self) -> (u16, u16) {
        let top = (self.first_row() - 1).max(0) as u16;
        let bottom = (self.last_row() + 1).max(i32::from(top)) as u16;
        (top, bottom)
    }

    fn inner_cols(&self) -> usize {
        (self.last_col() - self.first_col() + 1).max(0) as usize
    }

    /// Cells covered by `rect`, at least one in each direction, clipped to
    /// the inner area.  `None` when entirely outside it.
    fn cells(&self, rect: &Rect) -> Option<(i32, i32, i32, i32)> {
        let c0 = self.first_col() + (rect.left() * self.sx).floor() as i32;
        let c1 = (self.first_col() + (rect.right() * self.sx).ceil() as i32 - 1).max(c0);
        let r0 = self.first_row() + (rect.top() * self.sy).floor() as i32;
        let r1 = (self.first_row() + (rect.bottom() * self.sy).ceil() as i32 - 1).max(r0);

        let c0 = c0.max(self.first_col());
        let c1 = c1.min(self.last_col());
        let r0 = r0.max(self.first_row());
        let r1 = r1.min(self.last_row());
        (c0 <= c1 && r0 <= r1).then_some((c0, c1, r0, r1))
    }
}

// ── Frame ─────────────────────────────────────────────────────────────────────

fn render<W: Write>(out: &mut W, snapshot: &RenderSnapshot, grid: Grid) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, grid)?;
    draw_hud(out, snapshot, grid)?;

    match snapshot.state {
        SessionState::Menu => draw_menu(out, snapshot, grid)?,
        SessionState::Playing | SessionState::Paused | SessionState::GameOver => {
            for sprite in snapshot.sprites.iter().filter(|s| s.visible) {
                draw_sprite(out, sprite, grid)?;
            }
        }
    }

    match snapshot.state {
        SessionState::Paused => draw_paused(out, grid)?,
        SessionState::GameOver => draw_game_over(out, snapshot, grid)?,
        _ => {}
    }

    draw_controls_hint(out, snapshot, grid)?;

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, grid.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, grid: Grid) -> std::io::Result<()> {
    let (left, right) = grid.wall_cols();
    let (top, bottom) = grid.wall_rows();
    let span = "─".repeat(grid.inner_cols());

    out.queue(style::SetForegroundColor(C_BORDER))?;
    for (row, (l, r)) in [(top, ('┌', '┐')), (bottom, ('└', '┘'))] {
        out.queue(cursor::MoveTo(left, row))?;
        out.queue(Print(format!("{l}{span}{r}")))?;
    }
    for row in top + 1..bottom {
        for col in [left, right] {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print('│'))?;
        }
    }
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, snapshot: &RenderSnapshot, grid: Grid) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!(
        "Score:{:>6}  Hi:{:>6}",
        snapshot.score, snapshot.high_score
    )))?;

    if snapshot.state != SessionState::Menu {
        let level = format!("[ x{:.2} {:>4.0}s ]", snapshot.difficulty, snapshot.elapsed);
        let lx = (grid.cols / 2).saturating_sub(level.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(lx, 0))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print(&level))?;
    }

    let hearts = "♥".repeat(snapshot.lives() as usize);
    let lives_str = format!("Lives:{hearts}");
    let rx = grid
        .cols
        .saturating_sub(lives_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives_str))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_sprite<W: Write>(out: &mut W, sprite: &Sprite, grid: Grid) -> std::io::Result<()> {
    let Some((c0, c1, r0, r1)) = grid.cells(&sprite.rect) else {
        return Ok(());
    };
    let (color, glyph) = match sprite.kind {
        SpriteKind::Player => (C_PLAYER, "█"),
        SpriteKind::Enemy => (C_ENEMY, "▓"),
        SpriteKind::Projectile => (C_PROJECTILE, "║"),
    };
    out.queue(style::SetForegroundColor(color))?;
    for row in r0..=r1 {
        out.queue(cursor::MoveTo(c0 as u16, row as u16))?;
        // The ship's top row is its nose.
        let cell = if sprite.kind == SpriteKind::Player && row == r0 {
            "▲"
        } else {
            glyph
        };
        out.queue(Print(cell.repeat((c1 - c0 + 1) as usize)))?;
    }
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_centered<W: Write>(
    out: &mut W,
    grid: Grid,
    row: u16,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    let col = (grid.cols / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

fn draw_menu<W: Write>(out: &mut W, snapshot: &RenderSnapshot, grid: Grid) -> std::io::Result<()> {
    let cy = grid.rows / 2;
    draw_centered(out, grid, cy.saturating_sub(3), "★  SPACE  DEFENDER  ★", Color::Cyan)?;
    if snapshot.high_score > 0 {
        let best = format!("Best Score: {}", snapshot.high_score);
        draw_centered(out, grid, cy.saturating_sub(2), &best, Color::Yellow)?;
    }
    draw_centered(out, grid, cy, "Press ENTER to start", Color::White)?;
    draw_centered(out, grid, cy + 2, "Shoot the falling enemies before they reach you.", C_HINT)?;
    Ok(())
}

fn draw_paused<W: Write>(out: &mut W, grid: Grid) -> std::io::Result<()> {
    let start = (grid.rows / 2).saturating_sub(2);
    let lines = ["╔════════════════════╗", "║       PAUSED       ║", "╚════════════════════╝"];
    for (i, line) in lines.iter().enumerate() {
        draw_centered(out, grid, start + i as u16, line, Color::Yellow)?;
    }
    draw_centered(out, grid, start + 3, "P - Resume  Q - Quit", Color::White)?;
    Ok(())
}

fn draw_game_over<W: Write>(
    out: &mut W,
    snapshot: &RenderSnapshot,
    grid: Grid,
) -> std::io::Result<()> {
    let score_line = format!("Final Score: {:>6}", snapshot.score);
    let (best_line, best_color) = if snapshot.new_high_score {
        (format!("★ NEW BEST: {:>6} ★", snapshot.high_score), Color::Yellow)
    } else {
        (format!("Best Score:  {:>6}", snapshot.high_score), Color::DarkGrey)
    };

    let lines = ["╔════════════════════╗", "║    GAME  OVER      ║", "╚════════════════════╝"];
    let start = (grid.rows / 2).saturating_sub(3);
    for (i, line) in lines.iter().enumerate() {
        draw_centered(out, grid, start + i as u16, line, Color::Red)?;
    }
    let row = start + lines.len() as u16;
    draw_centered(out, grid, row, &score_line, Color::Yellow)?;
    draw_centered(out, grid, row + 1, &best_line, best_color)?;
    draw_centered(out, grid, row + 2, "R - Play Again  M - Menu  Q - Quit", Color::White)?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(
    out: &mut W,
    snapshot: &RenderSnapshot,
    grid: Grid,
) -> std::io::Result<()> {
    let hint = match snapshot.state {
        SessionState::Menu => "ENTER : Start   Q : Quit",
        SessionState::Playing => "← → / A D : Move   SPACE : Shoot   P : Pause   Q : Quit",
        SessionState::Paused => "P : Resume   Q : Quit",
        SessionState::GameOver => "R : Restart   M : Menu   Q : Quit",
    };
    out.queue(cursor::MoveTo(1, grid.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(hint))?;
    Ok(())
}
