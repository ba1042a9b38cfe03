//! Rectangle type used to address pixel requests.
//!
//! Every `copy_pixels` call in a pipeline names the area it wants with a
//! [`Rect`]. Stages forward narrowed rectangles upstream (usually a single
//! row at a time) and validate incoming rectangles against their own size.
//!
//! # Coordinate System
//!
//! All coordinates use the standard image convention:
//! - Origin (0, 0) is at the **top-left** corner
//! - X increases to the right
//! - Y increases downward
//!
//! ```text
//! (0,0) ────────► X
//!   │
//!   │   ┌──────────┐
//!   │   │ request  │
//!   │   └──────────┘
//!   ▼
//!   Y
//! ```
//!
//! # Usage
//!
//! ```rust
//! use rescale_core::Rect;
//!
//! let bounds = Rect::from_size(640, 480);
//! let request = Rect::new(0, 10, 640, 1);
//! assert!(bounds.contains_rect(&request));
//! assert_eq!(request.bottom(), 11);
//! ```

/// A rectangle defined by origin (x, y) and dimensions (width, height).
///
/// Edges are computed in `u64` so that a hostile request such as
/// `Rect::new(u32::MAX, 0, 2, 1)` is rejected rather than wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// X coordinate of the left edge (inclusive)
    pub x: u32,
    /// Y coordinate of the top edge (inclusive)
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Creates a new rectangle with the given origin and dimensions.
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from origin (0, 0) with given dimensions.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rescale_core::Rect;
    ///
    /// let rect = Rect::from_size(1920, 1080);
    /// assert_eq!((rect.x, rect.y), (0, 0));
    /// ```
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Returns the X coordinate of the right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Returns the Y coordinate of the bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    /// Returns the area of the rectangle in pixels.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns `true` if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if this rectangle fully contains another.
    ///
    /// An empty rectangle is contained if its origin lies within (or on the
    /// far edge of) this rectangle.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rescale_core::Rect;
    ///
    /// let outer = Rect::new(0, 0, 100, 100);
    /// assert!(outer.contains_rect(&Rect::new(10, 10, 50, 50)));
    /// assert!(!outer.contains_rect(&Rect::new(60, 10, 50, 50)));
    /// ```
    #[inline]
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns the intersection of this rectangle with another.
    ///
    /// Returns `None` if the rectangles don't overlap.
    #[inline]
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if (x as u64) < right && (y as u64) < bottom {
            Some(Rect::new(x, y, (right - x as u64) as u32, (bottom - y as u64) as u32))
        } else {
            None
        }
    }

    /// Returns the single-row rectangle at absolute row `y` spanning this
    /// rectangle's columns.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rescale_core::Rect;
    ///
    /// let rect = Rect::new(4, 0, 16, 8);
    /// assert_eq!(rect.row(3), Rect::new(4, 3, 16, 1));
    /// ```
    #[inline]
    pub const fn row(&self, y: u32) -> Rect {
        Rect::new(self.x, y, self.width, 1)
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}x{})", self.x, self.y, self.width, self.height)
    }
}
