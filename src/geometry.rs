use core::ops::{Add, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

/// Page scroll offsets (`pageXOffset` / `pageYOffset`).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollOffset {
    pub x: f64,
    pub y: f64,
}

impl ScrollOffset {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add<ScrollOffset> for Point {
    type Output = Point;

    fn add(self, scroll: ScrollOffset) -> Point {
        Point::new(self.x + scroll.x, self.y + scroll.y)
    }
}

impl Sub<ScrollOffset> for Point {
    type Output = Point;

    fn sub(self, scroll: ScrollOffset) -> Point {
        Point::new(self.x - scroll.x, self.y - scroll.y)
    }
}

impl Sub for ScrollOffset {
    type Output = ScrollOffset;

    fn sub(self, other: ScrollOffset) -> ScrollOffset {
        ScrollOffset::new(self.x - other.x, self.y - other.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    // Half-open on the far edges so adjacent boxes never both claim a point.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }
}

pub fn squared_distance(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

pub fn squared(value: f64) -> f64 {
    value * value
}
