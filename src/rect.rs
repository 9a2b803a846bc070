use glam::{vec2, Vec2};

/// A rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Rect {
    /// The position of the top-left corner
    /// of this rectangle.
    pub pos: Vec2,
    /// The side lengths of this rectangle.
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(vec2(x, y), vec2(width, height))
    }

    pub fn x(&self) -> f32 {
        self.pos.x
    }

    pub fn y(&self) -> f32 {
        self.pos.y
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    /// The bottom-right corner.
    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    pub fn offset(self, offset: Vec2) -> Self {
        Self {
            pos: self.pos + offset,
            size: self.size,
        }
    }

    pub fn contains(self, pos: Vec2) -> bool {
        pos.x >= self.pos.x
            && pos.y >= self.pos.y
            && pos.x < (self.pos.x + self.size.x)
            && pos.y < (self.pos.y + self.size.y)
    }

    /// The smallest rectangle enclosing both `self` and `other`.
    ///
    /// Zero-sized rectangles still count, so a newline at the end
    /// of a line extends the union to its position.
    pub fn union(self, other: Rect) -> Self {
        let min = self.pos.min(other.pos);
        let max = self.max().max(other.max());
        Self {
            pos: min,
            size: max - min,
        }
    }

    /// The union of all rectangles in `rects`, or `None` if there are none.
    pub fn union_all(rects: impl IntoIterator<Item = Rect>) -> Option<Self> {
        rects.into_iter().reduce(Rect::union)
    }
}
