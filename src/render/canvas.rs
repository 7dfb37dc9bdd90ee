//! Character framebuffer rasterized from the world
//!
//! Pure and terminal-independent: the playfield is scaled into the grid
//! below a one-line HUD, framed by a border.

use glam::Vec2;

use crate::sim::{EntityKind, Payload, Phase, Rect, Side, World};

/// Color class of a cell; the terminal maps these to real colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tint {
    #[default]
    Plain,
    Border,
    Player,
    Hazard,
    Pickup,
    Hud,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub tint: Tint,
}

impl Default for Glyph {
    fn default() -> Self {
        Self {
            ch: ' ',
            tint: Tint::Plain,
        }
    }
}

/// 2D grid of glyphs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    cols: u16,
    rows: u16,
    cells: Vec<Glyph>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Glyph::default(); cols as usize * rows as usize],
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Glyph> {
        if x < self.cols && y < self.rows {
            Some(self.cells[y as usize * self.cols as usize + x as usize])
        } else {
            None
        }
    }

    /// Out-of-range writes are dropped
    pub fn put(&mut self, x: i32, y: i32, ch: char, tint: Tint) {
        if x < 0 || y < 0 || x >= self.cols as i32 || y >= self.rows as i32 {
            return;
        }
        let idx = y as usize * self.cols as usize + x as usize;
        self.cells[idx] = Glyph { ch, tint };
    }

    pub fn text(&mut self, x: i32, y: i32, s: &str, tint: Tint) {
        for (i, ch) in s.chars().enumerate() {
            self.put(x + i as i32, y, ch, tint);
        }
    }

    /// Row as a plain string (for tests and logging)
    pub fn row(&self, y: u16) -> String {
        (0..self.cols)
            .map(|x| self.get(x, y).map_or(' ', |g| g.ch))
            .collect()
    }
}

/// Playfield-to-grid transform for the area inside the border
struct Viewport {
    origin: (i32, i32),
    scale: Vec2,
}

impl Viewport {
    fn new(world: &World, cols: u16, rows: u16) -> Self {
        let inner_cols = cols.saturating_sub(2).max(1) as f32;
        let inner_rows = rows.saturating_sub(3).max(1) as f32;
        Self {
            origin: (1, 2),
            scale: Vec2::new(
                inner_cols / world.playfield.width,
                inner_rows / world.playfield.height,
            ),
        }
    }

    /// Cell span covered by a rectangle; always at least one cell
    fn span(&self, rect: Rect) -> (i32, i32, i32, i32) {
        let min = rect.min * self.scale;
        let max = rect.max() * self.scale;
        let x0 = min.x.floor() as i32;
        let y0 = min.y.floor() as i32;
        let x1 = (max.x.ceil() as i32).max(x0 + 1);
        let y1 = (max.y.ceil() as i32).max(y0 + 1);
        (x0 + self.origin.0, y0 + self.origin.1, x1 + self.origin.0, y1 + self.origin.1)
    }

    fn fill(&self, canvas: &mut Canvas, rect: Rect, ch: char, tint: Tint) {
        let (x0, y0, x1, y1) = self.span(rect);
        let (max_x, max_y) = (canvas.cols as i32 - 2, canvas.rows as i32 - 2);
        for y in y0.max(self.origin.1)..y1.min(max_y + 1) {
            for x in x0.max(self.origin.0)..x1.min(max_x + 1) {
                canvas.put(x, y, ch, tint);
            }
        }
    }
}

/// Draw the world into a `cols` x `rows` canvas
pub fn rasterize(world: &World, cols: u16, rows: u16) -> Canvas {
    let mut canvas = Canvas::new(cols, rows);
    let view = Viewport::new(world, cols, rows);

    draw_border(&mut canvas);
    let hud = format!(" {}  score {} ", world.variant.as_str(), world.score);
    canvas.text(0, 0, &hud, Tint::Hud);

    for entity in &world.entities {
        match (&entity.kind, &entity.payload) {
            (EntityKind::Player, Payload::Snake(body)) => {
                for (i, seg) in body.segments.iter().enumerate().rev() {
                    let ch = if i == 0 { '@' } else { 'o' };
                    view.fill(&mut canvas, Rect::new(*seg, Vec2::ONE), ch, Tint::Player);
                }
            }
            (EntityKind::Player, _) => view.fill(&mut canvas, entity.bounds(), '@', Tint::Player),
            (EntityKind::Obstacle, Payload::Enemy { code }) => {
                view.fill(&mut canvas, entity.bounds(), 'W', Tint::Hazard);
                let (x0, _, _, y1) = view.span(entity.bounds());
                canvas.text(x0, y1, code, Tint::Hazard);
            }
            (EntityKind::Obstacle, _) => view.fill(&mut canvas, entity.bounds(), '#', Tint::Hazard),
            (EntityKind::Projectile, Payload::Missile { side: Side::Hostile }) => {
                view.fill(&mut canvas, entity.bounds(), '!', Tint::Hazard)
            }
            (EntityKind::Projectile, _) => view.fill(&mut canvas, entity.bounds(), '|', Tint::Player),
            (EntityKind::Consumable, _) => view.fill(&mut canvas, entity.bounds(), '*', Tint::Pickup),
        }
    }

    let banner = match world.phase {
        Phase::Running => None,
        Phase::Paused => Some("PAUSED - press P".to_string()),
        Phase::GameOver => Some(format!("GAME OVER - score {} - R to restart", world.score)),
    };
    if let Some(banner) = banner {
        let x = (cols as i32 - banner.chars().count() as i32) / 2;
        canvas.text(x.max(0), rows as i32 / 2, &banner, Tint::Hud);
    }
    canvas
}

fn draw_border(canvas: &mut Canvas) {
    let (right, bottom) = (canvas.cols as i32 - 1, canvas.rows as i32 - 1);
    let top = 1;
    for x in 0..=right {
        canvas.put(x, top, '-', Tint::Border);
        canvas.put(x, bottom, '-', Tint::Border);
    }
    for y in top..=bottom {
        canvas.put(0, y, '|', Tint::Border);
        canvas.put(right, y, '|', Tint::Border);
    }
    for (x, y) in [(0, top), (right, top), (0, bottom), (right, bottom)] {
        canvas.put(x, y, '+', Tint::Border);
    }
}
