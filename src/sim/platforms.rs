//! Platform pool and procedural spawner
//!
//! Platforms live in a fixed-capacity arena. A slot is allocated once and then
//! recycled: releasing a platform only clears its `used` flag and removes its
//! body from the space, so slot indices stay stable for anything keyed by them
//! (draw layers, the player's ground handle).

use std::collections::HashSet;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::space::{Body, BodyId, BodyKind, Tags, WrappedSpace};
use super::tween::{Easing, Tween, TweenSequence};
use crate::Settings;
use crate::consts::SIM_DT;

/// Placement attempts per platform before giving up on it
const PLACEMENT_ATTEMPTS: usize = 3;

/// Motion profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    /// Drifts down with the world scroll only
    Normal,
    /// Eases back and forth horizontally while drifting down
    Oscillating,
}

impl PlatformKind {
    pub fn size(&self) -> Vec2 {
        match self {
            PlatformKind::Normal => Vec2::new(32.0, 16.0),
            PlatformKind::Oscillating => Vec2::new(16.0, 16.0),
        }
    }
}

/// A pooled platform. Identity is the slot index that holds it.
#[derive(Debug, Clone)]
pub struct Platform {
    pub body: BodyId,
    pub kind: PlatformKind,
    pub used: bool,
    /// Horizontal easing for oscillating platforms
    motion: Option<TweenSequence>,
}

impl Platform {
    fn new(body: BodyId, kind: PlatformKind, origin: Vec2, spawner: &SpawnerConfig) -> Self {
        let motion = match kind {
            PlatformKind::Normal => None,
            PlatformKind::Oscillating => {
                let far = origin.x + spawner.oscillation_travel;
                let half = spawner.oscillation_half_period;
                let easing = spawner.oscillation_easing;
                Some(
                    TweenSequence::new(Tween::new(origin.x, far, half, easing))
                        .then(Tween::new(far, origin.x, half, easing)),
                )
            }
        };
        Self {
            body,
            kind,
            used: true,
            motion,
        }
    }

    /// Advance motion by one fixed tick and drift by the scroll speed
    fn advance(&mut self, space: &mut WrappedSpace, scroll_speed: f32) -> Option<Vec2> {
        let mut pos = space.get(self.body)?.pos;
        if let Some(motion) = self.motion.as_mut() {
            let (x, done) = motion.update(SIM_DT);
            if done {
                motion.reset();
            }
            pos.x = x;
        }
        pos.y += scroll_speed;
        space.move_to(self.body, pos);
        Some(pos)
    }
}

/// Grid cell chosen by the spawner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    pub col: i32,
    pub row: i32,
}

impl GridCoord {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// This cell and its eight neighbours
    pub fn neighborhood(self) -> impl Iterator<Item = GridCoord> {
        (-1..=1).flat_map(move |dy| {
            (-1..=1).map(move |dx| GridCoord::new(self.col + dx, self.row + dy))
        })
    }
}

/// One accepted placement from a generation batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub coord: GridCoord,
    pub kind: PlatformKind,
    /// `None` if the pool was full
    pub slot: Option<usize>,
}

/// What one pool update did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolReport {
    /// Live platforms above the bottom of the spawn band
    pub in_band: usize,
    /// Slots released this tick, in slot order
    pub released: Vec<usize>,
    /// Platforms placed by a triggered generation batch
    pub generated: usize,
}

/// Spawner tuning, copied from [`Settings`]
#[derive(Debug, Clone)]
pub struct SpawnerConfig {
    pub capacity: usize,
    pub base_batch: usize,
    pub tile_size: f32,
    pub tower_offset: f32,
    pub columns: i32,
    pub rows: i32,
    pub oscillating_percent: u32,
    pub oscillation_travel: f32,
    pub oscillation_half_period: f32,
    pub oscillation_easing: Easing,
    /// Platforms above this line count towards the spawn band
    pub band_bottom: f32,
    /// Release margin below the player's bottom edge
    pub release_margin: f32,
}

impl SpawnerConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            capacity: settings.pool_capacity,
            base_batch: settings.base_batch,
            tile_size: settings.tile_size,
            tower_offset: settings.tower_offset,
            columns: settings.spawn_columns,
            rows: settings.spawn_rows,
            oscillating_percent: settings.oscillating_percent,
            oscillation_travel: settings.oscillation_travel,
            oscillation_half_period: settings.oscillation_half_period,
            oscillation_easing: settings.oscillation_easing,
            band_bottom: settings.screen_height,
            release_margin: settings.half_height(),
        }
    }

    /// World position of a spawn grid cell
    pub fn grid_to_world(&self, coord: GridCoord) -> Vec2 {
        Vec2::new(
            self.tower_offset + coord.col as f32 * self.tile_size,
            coord.row as f32 * self.tile_size,
        )
    }
}

/// Fixed-capacity platform arena plus the generation rules that fill it
#[derive(Debug, Clone)]
pub struct PlatformSpawner {
    slots: Vec<Option<Platform>>,
    config: SpawnerConfig,
}

impl PlatformSpawner {
    pub fn new(config: SpawnerConfig) -> Self {
        Self {
            slots: (0..config.capacity).map(|_| None).collect(),
            config,
        }
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots currently in use
    pub fn live_count(&self) -> usize {
        self.iter_live().count()
    }

    /// The platform in `slot`, if that slot is in use
    pub fn get(&self, slot: usize) -> Option<&Platform> {
        self.slots
            .get(slot)
            .and_then(|s| s.as_ref())
            .filter(|p| p.used)
    }

    /// Whether a slot handle still refers to a live platform
    pub fn is_live(&self, slot: usize) -> bool {
        self.get(slot).is_some()
    }

    /// Live platforms in slot order
    pub fn iter_live(&self) -> impl Iterator<Item = (usize, &Platform)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().filter(|p| p.used).map(|p| (i, p)))
    }

    /// Place a platform in the first free slot. Does nothing when the pool is
    /// full.
    pub fn spawn(
        &mut self,
        space: &mut WrappedSpace,
        pos: Vec2,
        kind: PlatformKind,
        tags: Tags,
    ) -> Option<usize> {
        let Some(slot) = self
            .slots
            .iter()
            .position(|s| s.as_ref().is_none_or(|p| !p.used))
        else {
            log::trace!("Platform pool full, skipping spawn at {pos}");
            return None;
        };

        let body = space.add(Body::new(pos, kind.size(), tags, BodyKind::Platform { slot }));
        self.slots[slot] = Some(Platform::new(body, kind, pos, &self.config));
        Some(slot)
    }

    /// Free a slot and unregister its body
    pub fn release(&mut self, space: &mut WrappedSpace, slot: usize) {
        if let Some(Some(platform)) = self.slots.get_mut(slot) {
            space.remove(platform.body);
            platform.used = false;
        }
    }

    /// Release every slot
    pub fn sweep(&mut self, space: &mut WrappedSpace) {
        for slot in 0..self.slots.len() {
            self.release(space, slot);
        }
    }

    /// Place up to `count` platforms on the spawn grid. Each platform gets
    /// three tries at a cell whose 3x3 neighbourhood holds no other cell
    /// chosen in this batch; platforms that fail all tries are skipped.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        space: &mut WrappedSpace,
        rng: &mut R,
        count: usize,
    ) -> Vec<Placement> {
        let mut taken: HashSet<GridCoord> = HashSet::new();
        let mut placements = Vec::with_capacity(count);

        for _ in 0..count {
            for _ in 0..PLACEMENT_ATTEMPTS {
                let coord = GridCoord::new(
                    rng.random_range(0..self.config.columns),
                    rng.random_range(0..self.config.rows),
                );
                if coord.neighborhood().any(|c| taken.contains(&c)) {
                    continue;
                }
                taken.insert(coord);

                let kind = if rng.random_range(0..100) < self.config.oscillating_percent {
                    PlatformKind::Oscillating
                } else {
                    PlatformKind::Normal
                };
                let pos = self.config.grid_to_world(coord);
                let slot = self.spawn(space, pos, kind, Tags::PLATFORM);
                placements.push(Placement { coord, kind, slot });
                break;
            }
        }

        log::debug!(
            "Generated {} of {} platforms ({} live)",
            placements.len(),
            count,
            self.live_count()
        );
        placements
    }

    /// One fixed tick: move every live platform, release the ones that fell
    /// past the player, and refill when the spawn band is empty.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        space: &mut WrappedSpace,
        rng: &mut R,
        scroll_speed: f32,
        player_bottom: f32,
        difficulty: u32,
    ) -> PoolReport {
        let mut report = PoolReport::default();
        let release_line = player_bottom + self.config.release_margin;

        for slot in 0..self.slots.len() {
            let Some(platform) = self.slots[slot].as_mut().filter(|p| p.used) else {
                continue;
            };
            let Some(pos) = platform.advance(space, scroll_speed) else {
                continue;
            };
            if pos.y < self.config.band_bottom {
                report.in_band += 1;
            }
            if pos.y > release_line {
                self.release(space, slot);
                report.released.push(slot);
            }
        }

        if !report.released.is_empty() {
            log::debug!("Released platform slots {:?}", report.released);
        }

        if report.in_band == 0 {
            let count = self.config.base_batch + difficulty as usize;
            report.generated = self
                .generate(space, rng, count)
                .iter()
                .filter(|p| p.slot.is_some())
                .count();
        }

        report
    }
}
