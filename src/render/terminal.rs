//! TerminalRenderer: flushes a rasterized canvas to a real terminal

use std::io::{self, Write};

use crossterm::{
    QueueableCommand, cursor,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal,
};

use super::RenderSink;
use super::canvas::{Canvas, Tint, rasterize};
use crate::sim::World;

/// Used when the terminal size cannot be queried
const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// Restores the terminal on `exit` or, failing that, on drop
pub struct TerminalRenderer {
    stdout: io::Stdout,
    last: Option<Canvas>,
    active: bool,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            last: None,
            active: false,
        }
    }

    /// Whether raw mode and the alternate screen are (possibly) on
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn enter(&mut self) -> io::Result<()> {
        self.active = true;
        terminal::enable_raw_mode()?;
        self.stdout.queue(terminal::EnterAlternateScreen)?;
        self.stdout.queue(cursor::Hide)?;
        self.stdout.queue(terminal::DisableLineWrap)?;
        self.stdout.flush()?;
        Ok(())
    }

    pub fn exit(&mut self) -> io::Result<()> {
        self.active = false;
        self.last = None;
        restore(&mut self.stdout)
    }

    /// Skip the write when nothing changed since the previous frame
    fn draw(&mut self, canvas: Canvas) -> io::Result<()> {
        if self.last.as_ref() == Some(&canvas) {
            return Ok(());
        }

        let mut current: Option<Tint> = None;
        for y in 0..canvas.rows() {
            self.stdout.queue(cursor::MoveTo(0, y))?;
            for x in 0..canvas.cols() {
                let glyph = canvas.get(x, y).unwrap_or_default();
                if current != Some(glyph.tint) {
                    self.stdout.queue(SetForegroundColor(tint_color(glyph.tint)))?;
                    current = Some(glyph.tint);
                }
                self.stdout.queue(Print(glyph.ch))?;
            }
        }
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        self.last = Some(canvas);
        Ok(())
    }
}

impl Drop for TerminalRenderer {
    fn drop(&mut self) {
        if self.active {
            let _ = self.exit();
        }
    }
}

/// Leave the alternate screen and raw mode
///
/// Safe to call when the terminal was never set up; usable from a panic hook.
pub fn restore(out: &mut impl Write) -> io::Result<()> {
    out.queue(ResetColor)?;
    out.queue(SetAttribute(Attribute::Reset))?;
    out.queue(terminal::EnableLineWrap)?;
    out.queue(cursor::Show)?;
    out.queue(terminal::LeaveAlternateScreen)?;
    out.flush()?;
    terminal::disable_raw_mode()
}

impl RenderSink for TerminalRenderer {
    fn present(&mut self, world: &World) {
        let (cols, rows) = terminal::size().unwrap_or(FALLBACK_SIZE);
        let canvas = rasterize(world, cols, rows);
        if let Err(e) = self.draw(canvas) {
            log::warn!("Render error: {:?}", e);
            self.last = None;
        }
    }
}

fn tint_color(tint: Tint) -> Color {
    match tint {
        Tint::Plain => Color::Reset,
        Tint::Border => Color::DarkGrey,
        Tint::Player => Color::Green,
        Tint::Hazard => Color::Red,
        Tint::Pickup => Color::Yellow,
        Tint::Hud => Color::White,
    }
}
