use crate::Position;
use Direction::*;

const INITIAL_SPEED: f32 = 0.1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

/// Snake on a wrapping grid. The head moves a fraction of a cell per tick
/// (`speed`), the body follows whole cells.
#[derive(Clone, Debug)]
pub struct Snake {
    grid_width: i32,
    grid_height: i32,
    head_x: f32,
    head_y: f32,
    body: Vec<Position>,
    direction: Direction,
    speed: f32,
    size: usize,
    alive: bool,
    pending_growth: usize,
}

impl Snake {
    pub fn new(grid_width: usize, grid_height: usize) -> Self {
        Snake {
            grid_width: grid_width as i32,
            grid_height: grid_height as i32,
            head_x: (grid_width / 2) as f32,
            head_y: (grid_height / 2) as f32,
            body: vec![],
            direction: Up,
            speed: INITIAL_SPEED,
            size: 1,
            alive: true,
            pending_growth: 0,
        }
    }

    /// Advances one tick. Entering a new cell drags the body along and kills
    /// the snake if the head lands on its own body.
    pub fn update(&mut self) {
        let prev_cell = self.head();
        self.move_head();
        let current_cell = self.head();

        if current_cell != prev_cell {
            self.move_body(current_cell, prev_cell);
        }
    }

    pub fn grow_body(&mut self) {
        self.pending_growth += 1;
        self.size += 1;
    }

    pub fn snake_cell(&self, x: i32, y: i32) -> bool {
        let cell = Position::new(x, y);
        self.head() == cell || self.body.contains(&cell)
    }

    pub fn head(&self) -> Position {
        Position::new(self.head_x as i32, self.head_y as i32)
    }

    /// Body segments from tail to neck, excluding the head.
    pub fn body(&self) -> &[Position] {
        &self.body
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn grid_width(&self) -> usize {
        self.grid_width as usize
    }

    pub fn grid_height(&self) -> usize {
        self.grid_height as usize
    }

    pub fn set_direction(&mut self, new_direction: Direction) {
        match (&new_direction, &self.direction) {
            (Up, Down) | (Down, Up) | (Right, Left) | (Left, Right) if self.size > 1 => {},
            _ => self.direction = new_direction,
        };
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn head_char(&self) -> char {
        match self.direction {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn move_head(&mut self) {
        match self.direction {
            Up => self.head_y -= self.speed,
            Down => self.head_y += self.speed,
            Left => self.head_x -= self.speed,
            Right => self.head_x += self.speed,
        }

        self.head_x = wrap(self.head_x, self.grid_width as f32);
        self.head_y = wrap(self.head_y, self.grid_height as f32);
    }

    fn move_body(&mut self, current_cell: Position, prev_cell: Position) {
        self.body.push(prev_cell);

        if self.pending_growth > 0 {
            self.pending_growth -= 1;
        } else {
            self.body.remove(0);
        }

        if self.body.contains(&current_cell) {
            self.alive = false;
        }
    }
}

fn wrap(value: f32, limit: f32) -> f32 {
    let wrapped = value.rem_euclid(limit);
    // rem_euclid of a tiny negative value rounds up to `limit` itself
    if wrapped >= limit { 0.0 } else { wrapped }
}
