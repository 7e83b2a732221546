//! Wrapped collision space
//!
//! A fixed grid of square cells over the unrolled tower surface. Columns wrap:
//! column `columns - 1` is adjacent to column `0`, so a box cast across the
//! right edge sees bodies registered at the left edge and vice versa. Rows do
//! not wrap; the parts of a body outside the vertical range are simply not
//! registered.
//!
//! The space owns every body. Positions can only change through
//! [`WrappedSpace::move_to`], which re-registers the body, so a body's cells
//! always match its current box.

use std::collections::HashSet;
use std::ops::BitOr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{wrap, wrap_f32};

/// Set of collision tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Tags(u8);

impl Tags {
    pub const NONE: Tags = Tags(0);
    pub const SOLID: Tags = Tags(1 << 0);
    pub const PLATFORM: Tags = Tags(1 << 1);
    pub const RAMP: Tags = Tags(1 << 2);
    /// Everything a falling body can stand on
    pub const GROUND: Tags = Tags(Self::SOLID.0 | Self::PLATFORM.0 | Self::RAMP.0);

    /// True if any tag in `other` is present
    #[inline]
    pub fn intersects(self, other: Tags) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Tags {
    type Output = Tags;

    fn bitor(self, rhs: Tags) -> Tags {
        Tags(self.0 | rhs.0)
    }
}

/// Handle to a body owned by the space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyId {
    index: u32,
    generation: u32,
}

/// What a body belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Player,
    /// A platform living in the given pool slot
    Platform { slot: usize },
    /// Static level geometry
    Scenery,
}

/// An axis-aligned box registered in the space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub size: Vec2,
    pub tags: Tags,
    pub kind: BodyKind,
    /// Flat cell indices this body is registered in
    #[serde(skip)]
    cells: Vec<usize>,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2, tags: Tags, kind: BodyKind) -> Self {
        Self {
            pos,
            size,
            tags,
            kind,
            cells: Vec::new(),
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

#[derive(Debug, Clone, Default)]
struct BodySlot {
    generation: u32,
    body: Option<Body>,
}

/// Grid coordinate of a cell (column already wrapped)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub col: i32,
    pub row: i32,
}

/// A cell touched by a cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactCell {
    pub coord: CellCoord,
    /// Top-left corner in the caster's unwrapped frame
    pub origin: Vec2,
}

/// A body touched by a cast, captured at query time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactBody {
    pub id: BodyId,
    /// Position in the caster's unwrapped frame
    pub pos: Vec2,
    pub size: Vec2,
    pub tags: Tags,
    pub kind: BodyKind,
}

impl ContactBody {
    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }
}

/// Result of a box cast. Bodies and cells are ordered nearest first.
#[derive(Debug, Clone)]
pub struct Contact {
    pub mover: BodyId,
    mover_pos: Vec2,
    mover_size: Vec2,
    pub dx: f32,
    pub dy: f32,
    pub bodies: Vec<ContactBody>,
    pub cells: Vec<ContactCell>,
}

impl Contact {
    /// Contacted bodies carrying any of `tags`, nearest first
    pub fn bodies_by_tags(&self, tags: Tags) -> impl Iterator<Item = &ContactBody> + '_ {
        self.bodies.iter().filter(move |b| b.tags.intersects(tags))
    }

    /// Corrective delta that places the mover flush against `body`
    pub fn contact_with_body(&self, body: &ContactBody) -> Vec2 {
        self.contact_with_box(body.pos, body.size)
    }

    /// Corrective delta that places the mover flush against `cell`
    pub fn contact_with_cell(&self, cell: &ContactCell, cell_size: f32) -> Vec2 {
        self.contact_with_box(cell.origin, Vec2::splat(cell_size))
    }

    fn contact_with_box(&self, pos: Vec2, size: Vec2) -> Vec2 {
        let mut delta = Vec2::ZERO;
        if self.dx < 0.0 {
            delta.x = pos.x + size.x - self.mover_pos.x;
        } else if self.dx > 0.0 {
            delta.x = pos.x - self.mover_size.x - self.mover_pos.x;
        }
        if self.dy < 0.0 {
            delta.y = pos.y + size.y - self.mover_pos.y;
        } else if self.dy > 0.0 {
            delta.y = pos.y - self.mover_size.y - self.mover_pos.y;
        }
        delta
    }
}

/// Fixed-size cell grid with horizontal wrap-around
#[derive(Debug, Clone)]
pub struct WrappedSpace {
    cell_size: f32,
    columns: i32,
    rows: i32,
    cells: Vec<Vec<BodyId>>,
    slots: Vec<BodySlot>,
    free: Vec<u32>,
}

impl WrappedSpace {
    /// Create a space covering `width` x `height` pixels
    pub fn new(width: f32, height: f32, cell_size: f32) -> Self {
        let columns = (width / cell_size).ceil().max(1.0) as i32;
        let rows = (height / cell_size).ceil().max(1.0) as i32;
        Self {
            cell_size,
            columns,
            rows,
            cells: vec![Vec::new(); (columns * rows) as usize],
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn columns(&self) -> i32 {
        self.columns
    }

    /// Width of the wrapped axis in pixels
    #[inline]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_size
    }

    /// Number of bodies currently registered
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.body.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a body and return its handle
    pub fn add(&mut self, body: Body) -> BodyId {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.generation = slot.generation.wrapping_add(1);
                slot.body = Some(body);
                BodyId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(BodySlot {
                    generation: 0,
                    body: Some(body),
                });
                BodyId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        self.resync(id);
        id
    }

    /// Unregister a body. Stale handles are ignored.
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let cells = self.get(id)?.cells.clone();
        self.unlink(id, &cells);
        let slot = &mut self.slots[id.index as usize];
        let body = slot.body.take();
        self.free.push(id.index);
        body
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.body.as_ref())
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.get(id).is_some()
    }

    /// Move a body and re-register it
    pub fn move_to(&mut self, id: BodyId, pos: Vec2) {
        if let Some(body) = self.body_mut(id) {
            body.pos = pos;
            self.resync(id);
        }
    }

    /// Re-register a body in the cells matching its current box
    pub fn resync(&mut self, id: BodyId) {
        let Some(body) = self.get(id) else {
            return;
        };
        let old = body.cells.clone();
        let new = self.covered_cells(body.pos, body.size);
        if old == new {
            return;
        }
        self.unlink(id, &old);
        for &cell in &new {
            self.cells[cell].push(id);
        }
        if let Some(body) = self.body_mut(id) {
            body.cells = new;
        }
    }

    /// Cast `id`'s box by `(dx, dy)` and collect the bodies tagged with any of
    /// `filter` in the cells it would cover. A non-zero delta is extended to at
    /// least one pixel. Returns `None` when nothing matches.
    pub fn query(&self, id: BodyId, dx: f32, dy: f32, filter: Tags) -> Option<Contact> {
        let mover = self.get(id)?;
        let dx = nudge(dx);
        let dy = nudge(dy);

        let (cx, cy) = self.world_to_cell(mover.pos.x + dx, mover.pos.y + dy);
        let (ex, ey) = self.world_to_cell(
            mover.pos.x + mover.size.x + dx - 1.0,
            mover.pos.y + mover.size.y + dy - 1.0,
        );

        let mut seen_bodies = HashSet::new();
        let mut seen_cells = HashSet::new();
        let mut bodies = Vec::new();
        let mut cells = Vec::new();

        for y in cy..=ey {
            if y < 0 || y >= self.rows {
                continue;
            }
            for x in cx..=ex {
                let col = wrap(x, self.columns);
                let flat = (y * self.columns + col) as usize;
                let mut blocked = false;
                for &other_id in &self.cells[flat] {
                    if other_id == id {
                        continue;
                    }
                    let Some(other) = self.get(other_id) else {
                        continue;
                    };
                    if !other.tags.intersects(filter) {
                        continue;
                    }
                    // A body spanning several cells blocks each of them
                    blocked = true;
                    if !seen_bodies.insert(other_id) {
                        continue;
                    }
                    bodies.push(ContactBody {
                        id: other_id,
                        pos: Vec2::new(self.unwrap_near(other.pos.x, mover.pos.x), other.pos.y),
                        size: other.size,
                        tags: other.tags,
                        kind: other.kind,
                    });
                }
                if blocked && seen_cells.insert(flat) {
                    cells.push(ContactCell {
                        coord: CellCoord { col, row: y },
                        origin: Vec2::new(x as f32 * self.cell_size, y as f32 * self.cell_size),
                    });
                }
            }
        }

        if bodies.is_empty() {
            return None;
        }

        let center = mover.center();
        let half_cell = Vec2::splat(self.cell_size * 0.5);
        bodies.sort_by(|a, b| {
            let da = (a.pos + a.size * 0.5).distance_squared(center);
            let db = (b.pos + b.size * 0.5).distance_squared(center);
            da.total_cmp(&db)
        });
        cells.sort_by(|a, b| {
            let da = (a.origin + half_cell).distance_squared(center);
            let db = (b.origin + half_cell).distance_squared(center);
            da.total_cmp(&db)
        });

        Some(Contact {
            mover: id,
            mover_pos: mover.pos,
            mover_size: mover.size,
            dx,
            dy,
            bodies,
            cells,
        })
    }

    /// True if any body in the cell carries any of `tags`
    pub fn cell_has_tags(&self, coord: CellCoord, tags: Tags) -> bool {
        if coord.row < 0 || coord.row >= self.rows {
            return false;
        }
        let col = wrap(coord.col, self.columns);
        self.cells[(coord.row * self.columns + col) as usize]
            .iter()
            .filter_map(|&id| self.get(id))
            .any(|b| b.tags.intersects(tags))
    }

    /// Motion parallel to the blocking surface of `cell` that would carry the
    /// mover around it. `None` if the neighbouring cell on that side holds any
    /// of `avoid`, or if the mover is centred on the cell.
    pub fn slide_against_cell(
        &self,
        contact: &Contact,
        cell: &ContactCell,
        avoid: Tags,
    ) -> Option<Vec2> {
        let half = self.cell_size * 0.5;
        let cell_center = cell.origin + Vec2::splat(half);
        let mover_center = contact.mover_pos + contact.mover_size * 0.5;
        let diff = mover_center - cell_center;
        let CellCoord { col, row } = cell.coord;

        let blocked = |c: i32, r: i32| self.cell_has_tags(CellCoord { col: c, row: r }, avoid);

        let mut slide = Vec2::ZERO;
        if contact.dy != 0.0 {
            if diff.x > 0.0 && !blocked(col + 1, row) {
                slide.x = cell_center.x + half - contact.mover_pos.x;
            } else if diff.x < 0.0 && !blocked(col - 1, row) {
                slide.x = cell_center.x - half - (contact.mover_pos.x + contact.mover_size.x);
            } else {
                return None;
            }
        }
        if contact.dx != 0.0 {
            if diff.y > 0.0 && !blocked(col, row + 1) {
                slide.y = cell_center.y + half - contact.mover_pos.y;
            } else if diff.y < 0.0 && !blocked(col, row - 1) {
                slide.y = cell_center.y - half - (contact.mover_pos.y + contact.mover_size.y);
            } else {
                return None;
            }
        }
        Some(slide)
    }

    /// Cells holding at least one body, row-major
    pub fn occupied_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(flat, _)| CellCoord {
                col: flat as i32 % self.columns,
                row: flat as i32 / self.columns,
            })
    }

    /// Bodies registered in a cell
    pub fn bodies_in(&self, coord: CellCoord) -> &[BodyId] {
        if coord.row < 0 || coord.row >= self.rows {
            return &[];
        }
        let col = wrap(coord.col, self.columns);
        &self.cells[(coord.row * self.columns + col) as usize]
    }

    /// Unwrapped cell coordinates of a world point
    #[inline]
    pub fn world_to_cell(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Express `x` as the copy nearest to `reference` around the cylinder
    pub fn unwrap_near(&self, x: f32, reference: f32) -> f32 {
        let width = self.width();
        let mut delta = wrap_f32(x - reference, width);
        if delta >= width * 0.5 {
            delta -= width;
        }
        reference + delta
    }

    fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.body.as_mut())
    }

    fn unlink(&mut self, id: BodyId, cells: &[usize]) {
        for &cell in cells {
            self.cells[cell].retain(|&other| other != id);
        }
    }

    fn covered_cells(&self, pos: Vec2, size: Vec2) -> Vec<usize> {
        let (cx, cy) = self.world_to_cell(pos.x, pos.y);
        let (ex, ey) = self.world_to_cell(pos.x + size.x - 1.0, pos.y + size.y - 1.0);
        // A body never needs more than one lap of columns
        let ex = ex.min(cx + self.columns - 1);

        let mut out = Vec::new();
        for y in cy.max(0)..=ey.min(self.rows - 1) {
            for x in cx..=ex {
                out.push((y * self.columns + wrap(x, self.columns)) as usize);
            }
        }
        out
    }
}

/// Extend a non-zero cast distance to at least one pixel
#[inline]
fn nudge(d: f32) -> f32 {
    if d < 0.0 {
        d.min(-1.0)
    } else if d > 0.0 {
        d.max(1.0)
    } else {
        d
    }
}
