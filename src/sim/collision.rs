//! Contact resolution for the player against the wrapped space
//!
//! Horizontal and vertical motion are resolved separately. The horizontal
//! pass only stops against solids. The vertical pass lands on solids, slides
//! around the corners of solids it barely clips, and treats landing on a
//! platform as fatal.

use super::player::{Player, Support};
use super::space::{BodyKind, Tags, WrappedSpace};

/// Largest vertical step resolved in one tick
pub const MAX_VERTICAL_STEP: f32 = 16.0;
/// Largest sideways nudge allowed when sliding around a solid corner
pub const MAX_SLIDE: f32 = 8.0;

/// Move the player by its horizontal speed, stopping flush against solids
pub fn resolve_horizontal(player: &mut Player, space: &mut WrappedSpace) {
    let Some(mut pos) = space.get(player.body).map(|b| b.pos) else {
        return;
    };

    let mut dx = player.speed.x;
    if let Some(contact) = space.query(player.body, player.speed.x, 0.0, Tags::SOLID) {
        if let Some(cell) = contact.cells.first() {
            dx = contact.contact_with_cell(cell, space.cell_size()).x;
        }
        player.speed.x = 0.0;
    }

    pos.x += dx;
    space.move_to(player.body, pos);
}

/// Resolve vertical contacts and return the corrected vertical delta.
///
/// Updates `on_ground`, `ignore_platform` and `dead` as side effects. The
/// delta is only applied by the caller in jump mode.
pub fn resolve_vertical(player: &mut Player, space: &mut WrappedSpace) -> f32 {
    player.on_ground = None;

    let mut dy = player.speed.y.clamp(-MAX_VERTICAL_STEP, MAX_VERTICAL_STEP);
    let mut cast = dy;
    // Look one pixel further when falling so contact is seen before overlap
    if dy >= 0.0 {
        cast += 1.0;
    }

    let Some(contact) = space.query(player.body, 0.0, cast, Tags::GROUND) else {
        return dy;
    };
    let Some(me) = space.get(player.body).cloned() else {
        return dy;
    };

    if let Some(first) = contact.cells.first() {
        if dy >= 0.0 && space.cell_has_tags(first.coord, Tags::SOLID) {
            let slide = space
                .slide_against_cell(&contact, first, Tags::SOLID)
                .filter(|s| s.x.abs() <= MAX_SLIDE);
            if let Some(slide) = slide {
                let mut pos = me.pos;
                pos.x += slide.x;
                space.move_to(player.body, pos);
                return dy;
            }
        }
    }

    // Ground candidate height, for comparing against solids below
    let mut ground_top: Option<f32> = None;

    let platform = contact.bodies_by_tags(Tags::PLATFORM).find(|b| match b.kind {
        BodyKind::Platform { slot } => player.ignore_platform != Some(slot),
        _ => true,
    });
    if let Some(platform) = platform {
        let overlaps = !(me.right() < platform.pos.x || me.pos.x > platform.right());
        if overlaps && me.pos.y - me.size.y < platform.pos.y {
            dy = contact.contact_with_body(platform).y;
            player.on_ground = Some(match platform.kind {
                BodyKind::Platform { slot } => Support::Platform { slot },
                _ => Support::Body(platform.id),
            });
            ground_top = Some(platform.pos.y);
            player.dead = true;
        }
    }

    if let Some(solid) = contact.bodies_by_tags(Tags::SOLID).next() {
        if ground_top.is_none_or(|top| top >= solid.pos.y) {
            dy = contact.contact_with_body(solid).y;
            player.speed.y = 0.0;
            if solid.pos.y > me.pos.y {
                player.on_ground = Some(Support::Body(solid.id));
            }
        }
    }

    if player.on_ground.is_some() {
        player.ignore_platform = None;
    }

    dy
}
