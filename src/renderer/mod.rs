//! Scene painting
//!
//! Pure consumer of simulation state: nothing in here mutates gameplay.
//! Sprite lookups that return `None` fall back to primitive shapes, and all
//! coordinates are rounded to whole pixels before they reach the surface to
//! avoid sub-pixel blur.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod surface;

pub use surface::{Color, NoSprites, SpriteAtlas, SpriteId, Surface};

use glam::Vec2;

use crate::consts::*;
use crate::sim::{Blast, Cup, ObjectKind, Session};

const BACKGROUND: Color = Color::rgb(255, 255, 255);
const SNACK_FILL: Color = Color::rgb(139, 69, 19);
const BOMB_FILL: Color = Color::rgb(255, 0, 0);
const HEART_FILL: Color = Color::rgb(255, 105, 180);
const CUP_FILL: Color = Color::rgb(139, 69, 19);
const CUP_BORDER: Color = Color::rgb(101, 67, 33);
const HUD_TEXT: Color = Color::rgb(0, 0, 0);
const LOST_TEXT: Color = Color::rgb(231, 76, 60);

/// Round to whole pixels before any draw call
#[inline]
fn px(v: f32) -> i32 {
    v.round() as i32
}

/// Per-frame render toggles supplied by the orchestrator
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// FPS readout to draw, if the overlay is enabled
    pub fps: Option<f32>,
    /// Blast particle bursts (rings always draw)
    pub particle_effects: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            fps: None,
            particle_effects: true,
        }
    }
}

/// Paints one frame of simulation state onto a surface.
pub struct RenderEngine;

impl RenderEngine {
    /// Full frame: background, falling objects, cup, fill overlay, blast
    /// effects, then HUD text.
    pub fn render<S: Surface, A: SpriteAtlas>(
        surface: &mut S,
        atlas: &A,
        session: &Session,
        cup: &Cup,
        options: RenderOptions,
    ) {
        surface.clear();
        Self::draw_background(surface);
        Self::draw_objects(surface, atlas, session);
        Self::draw_cup(surface, atlas, cup, session);
        Self::draw_cup_fill(surface, atlas, cup, session.item_count());
        Self::draw_blasts(surface, session, options.particle_effects);
        Self::draw_lost_flash(surface, session);
        if let Some(fps) = options.fps {
            Self::draw_fps(surface, fps);
        }
    }

    fn draw_background<S: Surface>(surface: &mut S) {
        let (w, h) = (surface.width(), surface.height());
        surface.fill_rect(0, 0, px(w), px(h), BACKGROUND);
    }

    fn draw_objects<S: Surface, A: SpriteAtlas>(surface: &mut S, atlas: &A, session: &Session) {
        for object in session.objects() {
            match atlas.item_sprite(object.kind) {
                Some(sprite) => surface.draw_sprite(
                    sprite,
                    px(object.pos.x),
                    px(object.pos.y),
                    px(object.size.x),
                    px(object.size.y),
                ),
                None => Self::draw_object_primitive(surface, object.kind, object.pos, object.size),
            }
        }
    }

    fn draw_object_primitive<S: Surface>(
        surface: &mut S,
        kind: ObjectKind,
        pos: Vec2,
        size: Vec2,
    ) {
        let center = pos + size * 0.5;
        match kind {
            ObjectKind::Snack => {
                surface.fill_circle(px(center.x), px(center.y), px(size.x / 2.0), SNACK_FILL);
            }
            ObjectKind::Bomb => {
                surface.fill_rect(px(pos.x), px(pos.y), px(size.x), px(size.y), BOMB_FILL);
            }
            ObjectKind::Heart => {
                // Rough two-lobe heart: two circles over a block
                let radius = size.x / 4.0;
                surface.fill_circle(
                    px(center.x - radius / 2.0),
                    px(center.y - radius / 2.0),
                    px(radius),
                    HEART_FILL,
                );
                surface.fill_circle(
                    px(center.x + radius / 2.0),
                    px(center.y - radius / 2.0),
                    px(radius),
                    HEART_FILL,
                );
                surface.fill_rect(
                    px(center.x - radius),
                    px(center.y - radius / 2.0),
                    px(radius * 2.0),
                    px(radius),
                    HEART_FILL,
                );
            }
        }
    }

    fn draw_cup<S: Surface, A: SpriteAtlas>(
        surface: &mut S,
        atlas: &A,
        cup: &Cup,
        session: &Session,
    ) {
        if let Some(sprite) = atlas.cup_sprite(session.difficulty()) {
            surface.draw_sprite(
                sprite,
                px(cup.pos.x),
                px(cup.pos.y),
                px(cup.size.x),
                px(cup.size.y),
            );
            return;
        }
        surface.fill_rect(
            px(cup.pos.x),
            px(cup.pos.y),
            px(cup.size.x),
            px(cup.size.y),
            CUP_FILL,
        );
        surface.stroke_rect(
            px(cup.pos.x),
            px(cup.pos.y),
            px(cup.size.x),
            px(cup.size.y),
            2.0,
            CUP_BORDER,
        );
    }

    /// Progress overlay for the cup contents; without an overlay sprite the
    /// caught items stack up as small dots inside the cup.
    fn draw_cup_fill<S: Surface, A: SpriteAtlas>(
        surface: &mut S,
        atlas: &A,
        cup: &Cup,
        item_count: u32,
    ) {
        if item_count == 0 {
            return;
        }

        let progress = item_count.min(10);
        if let Some(sprite) = atlas.fill_overlay(progress) {
            surface.draw_sprite(
                sprite,
                px(cup.pos.x),
                px(cup.pos.y),
                px(cup.size.x),
                px(cup.size.y),
            );
            return;
        }

        let item_size = 10.0;
        let margin = 24.0;
        let spacing = 2.0;
        let inner_width = cup.size.x - margin * 2.0;
        let per_row = ((inner_width / (item_size + spacing)) as u32).max(1);
        let start_y = cup.pos.y + cup.size.y - margin - item_size;

        for i in 0..item_count {
            let row = i / per_row;
            let col = i % per_row;
            let x = cup.pos.x + margin + col as f32 * (item_size + spacing);
            let y = start_y - row as f32 * (item_size + spacing);
            match atlas.fill_item() {
                Some(sprite) => {
                    surface.draw_sprite(sprite, px(x), px(y), px(item_size), px(item_size));
                }
                None => {
                    surface.fill_circle(
                        px(x + item_size / 2.0),
                        px(y + item_size / 2.0),
                        px(item_size / 2.0),
                        SNACK_FILL,
                    );
                }
            }
        }
    }

    /// Expanding ring burst for each live blast. Animation runs shorter than
    /// the blast's simulation lifetime, so late-life blasts draw nothing.
    fn draw_blasts<S: Surface>(surface: &mut S, session: &Session, particles: bool) {
        let now = session.elapsed_ms();
        for blast in session.blasts() {
            let age = now - blast.created_ms;
            let progress = age / BLAST_ANIM_MS;
            if !(0.0..1.0).contains(&progress) {
                continue;
            }
            Self::draw_blast(surface, blast, progress, particles);
        }
    }

    fn draw_blast<S: Surface>(surface: &mut S, blast: &Blast, progress: f32, particles: bool) {
        let opacity = 1.0 - progress;
        let radius = blast.radius * (1.0 + progress * 3.0);
        let (cx, cy) = (px(blast.pos.x), px(blast.pos.y));

        surface.fill_circle(cx, cy, px(radius * 2.0), BOMB_FILL.with_alpha(opacity));
        surface.stroke_circle(
            cx,
            cy,
            px(radius * 1.5),
            12.0,
            Color::rgba(255, 165, 0, opacity),
        );
        surface.stroke_circle(cx, cy, px(radius), 8.0, Color::rgba(255, 200, 0, opacity));
        surface.stroke_circle(
            cx,
            cy,
            px(radius * 0.6),
            6.0,
            Color::rgba(255, 255, 0, opacity),
        );
        surface.fill_circle(
            cx,
            cy,
            px(radius * 0.5),
            Color::rgba(255, 255, 255, opacity * 0.9),
        );

        if !particles {
            return;
        }
        let count = 16;
        let distance = radius * (1.0 + progress * 2.0);
        let particle_size = 8.0 * (1.0 - progress * 0.3);
        for i in 0..count {
            let angle = std::f32::consts::TAU * i as f32 / count as f32;
            surface.fill_circle(
                px(blast.pos.x + angle.cos() * distance),
                px(blast.pos.y + angle.sin() * distance),
                px(particle_size),
                Color::rgba(255, 140, 0, opacity),
            );
        }
    }

    /// Fading "YOU LOST!" banner while a blast is still alive
    fn draw_lost_flash<S: Surface>(surface: &mut S, session: &Session) {
        let now = session.elapsed_ms();
        let Some(age) = session
            .blasts()
            .iter()
            .map(|b| now - b.created_ms)
            .reduce(f32::min)
        else {
            return;
        };
        if age >= BLAST_TTL_MS {
            return;
        }
        let opacity = (1.0 - age / BLAST_TTL_MS).max(0.0);
        let scale = 1.0 + (age / 1000.0) * 0.5;
        surface.fill_text_centered(
            "YOU LOST!",
            px(surface.width() / 2.0),
            px(surface.height() / 2.0),
            px(48.0 * scale),
            LOST_TEXT.with_alpha(opacity),
        );
    }

    fn draw_fps<S: Surface>(surface: &mut S, fps: f32) {
        surface.fill_text(&format!("FPS: {fps:.1}"), 10, 30, 16, HUD_TEXT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Difficulty, WorldBounds};

    /// Records draw calls so tests can assert paint order and rounding
    #[derive(Default)]
    struct RecordingSurface {
        ops: Vec<Op>,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Clear,
        FillRect(i32, i32, i32, i32),
        StrokeRect(i32, i32, i32, i32),
        FillCircle(i32, i32, i32),
        StrokeCircle(i32, i32, i32),
        Sprite(SpriteId, i32, i32, i32, i32),
        Text(String, i32, i32),
    }

    impl Surface for RecordingSurface {
        fn width(&self) -> f32 {
            800.0
        }

        fn height(&self) -> f32 {
            600.0
        }

        fn clear(&mut self) {
            self.ops.push(Op::Clear);
        }

        fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, _color: Color) {
            self.ops.push(Op::FillRect(x, y, w, h));
        }

        fn stroke_rect(&mut self, x: i32, y: i32, w: i32, h: i32, _lw: f32, _color: Color) {
            self.ops.push(Op::StrokeRect(x, y, w, h));
        }

        fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, _color: Color) {
            self.ops.push(Op::FillCircle(cx, cy, r));
        }

        fn stroke_circle(&mut self, cx: i32, cy: i32, r: i32, _lw: f32, _color: Color) {
            self.ops.push(Op::StrokeCircle(cx, cy, r));
        }

        fn draw_sprite(&mut self, sprite: SpriteId, x: i32, y: i32, w: i32, h: i32) {
            self.ops.push(Op::Sprite(sprite, x, y, w, h));
        }

        fn fill_text(&mut self, text: &str, x: i32, y: i32, _size: i32, _color: Color) {
            self.ops.push(Op::Text(text.to_string(), x, y));
        }

        fn fill_text_centered(&mut self, text: &str, x: i32, y: i32, _size: i32, _color: Color) {
            self.ops.push(Op::Text(text.to_string(), x, y));
        }
    }

    /// Atlas that answers every lookup with the same sprite
    struct FullAtlas;

    impl SpriteAtlas for FullAtlas {
        fn item_sprite(&self, _kind: ObjectKind) -> Option<SpriteId> {
            Some(SpriteId(1))
        }

        fn cup_sprite(&self, _difficulty: Difficulty) -> Option<SpriteId> {
            Some(SpriteId(2))
        }

        fn fill_overlay(&self, _progress: u32) -> Option<SpriteId> {
            Some(SpriteId(3))
        }

        fn fill_item(&self) -> Option<SpriteId> {
            None
        }
    }

    const BOUNDS: WorldBounds = WorldBounds {
        width: 800.0,
        height: 600.0,
    };

    fn session_and_cup() -> (Session, Cup) {
        let mut session = Session::new(Difficulty::Easy, 7);
        session.start();
        (session, Cup::centered(BOUNDS))
    }

    #[test]
    fn test_clear_and_background_come_first() {
        let (session, cup) = session_and_cup();
        let mut surface = RecordingSurface::default();
        RenderEngine::render(
            &mut surface,
            &NoSprites,
            &session,
            &cup,
            RenderOptions::default(),
        );
        assert_eq!(surface.ops[0], Op::Clear);
        assert_eq!(surface.ops[1], Op::FillRect(0, 0, 800, 600));
    }

    #[test]
    fn test_cup_primitive_fallback() {
        let (session, cup) = session_and_cup();
        let mut surface = RecordingSurface::default();
        RenderEngine::render(
            &mut surface,
            &NoSprites,
            &session,
            &cup,
            RenderOptions::default(),
        );
        // No sprites at all without an atlas
        assert!(!surface.ops.iter().any(|op| matches!(op, Op::Sprite(..))));
        // Cup body plus border
        assert!(surface.ops.iter().any(|op| matches!(op, Op::StrokeRect(..))));
    }

    #[test]
    fn test_cup_sprite_used_when_available() {
        let (session, cup) = session_and_cup();
        let mut surface = RecordingSurface::default();
        RenderEngine::render(
            &mut surface,
            &FullAtlas,
            &session,
            &cup,
            RenderOptions::default(),
        );
        assert!(
            surface
                .ops
                .iter()
                .any(|op| matches!(op, Op::Sprite(SpriteId(2), ..)))
        );
        // Sprite replaces the primitive cup entirely
        assert!(!surface.ops.iter().any(|op| matches!(op, Op::StrokeRect(..))));
    }

    #[test]
    fn test_coordinates_rounded_to_whole_pixels() {
        let (session, mut cup) = session_and_cup();
        cup.pos.x = 100.4;
        cup.pos.y = 99.6;
        let mut surface = RecordingSurface::default();
        RenderEngine::render(
            &mut surface,
            &FullAtlas,
            &session,
            &cup,
            RenderOptions::default(),
        );
        assert!(
            surface
                .ops
                .iter()
                .any(|op| matches!(op, Op::Sprite(SpriteId(2), 100, 100, ..)))
        );
    }

    #[test]
    fn test_fill_overlay_drawn_only_with_items() {
        let (mut session, cup) = session_and_cup();
        let mut surface = RecordingSurface::default();
        RenderEngine::render(
            &mut surface,
            &FullAtlas,
            &session,
            &cup,
            RenderOptions::default(),
        );
        let overlays = |s: &RecordingSurface| {
            s.ops
                .iter()
                .filter(|op| matches!(op, Op::Sprite(SpriteId(3), ..)))
                .count()
        };
        assert_eq!(overlays(&surface), 0);

        session.set_item_count(4);
        let mut surface = RecordingSurface::default();
        RenderEngine::render(
            &mut surface,
            &FullAtlas,
            &session,
            &cup,
            RenderOptions::default(),
        );
        assert_eq!(overlays(&surface), 1);
    }

    #[test]
    fn test_fallback_fill_stacks_dots() {
        let (mut session, cup) = session_and_cup();
        session.set_item_count(5);
        let mut surface = RecordingSurface::default();
        RenderEngine::render(
            &mut surface,
            &NoSprites,
            &session,
            &cup,
            RenderOptions::default(),
        );
        // One dot per caught item (no other circles in a blast-free frame)
        let dots = surface
            .ops
            .iter()
            .filter(|op| matches!(op, Op::FillCircle(..)))
            .count();
        assert_eq!(dots, 5);
    }

    #[test]
    fn test_fps_text_only_when_requested() {
        let (session, cup) = session_and_cup();
        let mut surface = RecordingSurface::default();
        RenderEngine::render(
            &mut surface,
            &NoSprites,
            &session,
            &cup,
            RenderOptions::default(),
        );
        assert!(!surface.ops.iter().any(|op| matches!(op, Op::Text(..))));

        let mut surface = RecordingSurface::default();
        RenderEngine::render(
            &mut surface,
            &NoSprites,
            &session,
            &cup,
            RenderOptions {
                fps: Some(59.9),
                particle_effects: true,
            },
        );
        assert!(
            surface
                .ops
                .iter()
                .any(|op| matches!(op, Op::Text(t, 10, 30) if t.starts_with("FPS:")))
        );
    }

    #[test]
    fn test_objects_drawn_before_cup() {
        let (mut session, cup) = session_and_cup();
        // Put one object anywhere visible
        let handle = session.debug_pool().acquire().unwrap();
        session.debug_pool().get_mut(handle).unwrap().pos = glam::Vec2::new(50.0, 50.0);

        let mut surface = RecordingSurface::default();
        RenderEngine::render(
            &mut surface,
            &FullAtlas,
            &session,
            &cup,
            RenderOptions::default(),
        );
        let object_idx = surface
            .ops
            .iter()
            .position(|op| matches!(op, Op::Sprite(SpriteId(1), ..)))
            .expect("object sprite");
        let cup_idx = surface
            .ops
            .iter()
            .position(|op| matches!(op, Op::Sprite(SpriteId(2), ..)))
            .expect("cup sprite");
        assert!(object_idx < cup_idx);
    }
}
