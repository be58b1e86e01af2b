//! Canvas 2D surface backend (browser only)
//!
//! HiDPI-aware: the backing store is scaled by devicePixelRatio while the
//! drawing context keeps logical-pixel coordinates. Image smoothing stays off
//! for crisp pixel-art sprites.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::surface::{Color, SpriteId, Surface};
use crate::sim::{Difficulty, ObjectKind};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    sprites: Vec<HtmlImageElement>,
    logical_width: f32,
    logical_height: f32,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let mut surface = Self {
            canvas,
            ctx,
            sprites: Vec::new(),
            logical_width: 0.0,
            logical_height: 0.0,
        };
        surface.fit_to_element()?;
        Ok(surface)
    }

    /// Re-read the element's CSS size and rebuild the HiDPI backing store.
    /// Call on every window resize.
    pub fn fit_to_element(&mut self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let dpr = window.device_pixel_ratio();
        let rect = self.canvas.get_bounding_client_rect();
        let (w, h) = (rect.width(), rect.height());

        self.canvas.set_width((w * dpr) as u32);
        self.canvas.set_height((h * dpr) as u32);
        // Absolute transform so repeated resizes don't stack scale factors
        self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
        self.ctx.set_image_smoothing_enabled(false);

        self.logical_width = w as f32;
        self.logical_height = h as f32;
        Ok(())
    }

    /// Register an image. It may still be loading; it draws as nothing until
    /// complete.
    pub fn register_sprite(&mut self, image: HtmlImageElement) -> SpriteId {
        self.sprites.push(image);
        SpriteId(self.sprites.len() as u32 - 1)
    }

    fn loaded_sprite(&self, id: SpriteId) -> Option<&HtmlImageElement> {
        self.sprites
            .get(id.0 as usize)
            .filter(|img| img.complete() && img.natural_width() > 0)
    }
}

impl Surface for CanvasSurface {
    fn width(&self) -> f32 {
        self.logical_width
    }

    fn height(&self) -> f32 {
        self.logical_height
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.logical_width as f64,
            self.logical_height as f64,
        );
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn stroke_rect(&mut self, x: i32, y: i32, w: i32, h: i32, line_width: f32, color: Color) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(line_width as f64);
        self.ctx.stroke_rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            cx as f64,
            cy as f64,
            radius.max(0) as f64,
            0.0,
            std::f64::consts::TAU,
        );
        self.ctx.fill();
    }

    fn stroke_circle(&mut self, cx: i32, cy: i32, radius: i32, line_width: f32, color: Color) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(line_width as f64);
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            cx as f64,
            cy as f64,
            radius.max(0) as f64,
            0.0,
            std::f64::consts::TAU,
        );
        self.ctx.stroke();
    }

    fn draw_sprite(&mut self, sprite: SpriteId, x: i32, y: i32, w: i32, h: i32) {
        let Some(image) = self.loaded_sprite(sprite) else {
            return;
        };
        let _ = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            image, x as f64, y as f64, w as f64, h as f64,
        );
    }

    fn fill_text(&mut self, text: &str, x: i32, y: i32, size_px: i32, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.set_font(&format!("{size_px}px monospace"));
        self.ctx.set_text_align("left");
        let _ = self.ctx.fill_text(text, x as f64, y as f64);
    }

    fn fill_text_centered(&mut self, text: &str, x: i32, y: i32, size_px: i32, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.set_font(&format!("bold {size_px}px sans-serif"));
        self.ctx.set_text_align("center");
        let _ = self.ctx.fill_text(text, x as f64, y as f64);
    }
}

struct AtlasEntry {
    id: SpriteId,
    image: HtmlImageElement,
}

/// Sprite atlas backed by DOM images. Lookups answer `None` until an image
/// has actually arrived, which keeps "asset not yet available" a permanent
/// fallback-rendering case rather than an error.
pub struct DomAtlas {
    snack: Option<AtlasEntry>,
    bomb: Option<AtlasEntry>,
    heart: Option<AtlasEntry>,
    cups: [Option<AtlasEntry>; 3],
    overlays: Vec<Option<AtlasEntry>>,
    fill_item: Option<AtlasEntry>,
}

impl DomAtlas {
    /// Kick off loading for the whole sprite set. Loading is backgrounded by
    /// the browser; nothing here blocks the first tick.
    pub fn load(surface: &mut CanvasSurface) -> Self {
        let mut load = |path: &str| -> Option<AtlasEntry> {
            match HtmlImageElement::new() {
                Ok(image) => {
                    image.set_src(path);
                    let id = surface.register_sprite(image.clone());
                    Some(AtlasEntry { id, image })
                }
                Err(err) => {
                    log::warn!("could not create image for {path}: {err:?}");
                    None
                }
            }
        };

        let overlays = (1..=10)
            .map(|n| load(&format!("assets/overlay_{n}.png")))
            .collect();

        Self {
            snack: load("assets/snack.png"),
            bomb: load("assets/bomb.png"),
            heart: load("assets/heart.png"),
            cups: [
                load("assets/cup_easy.png"),
                load("assets/cup_medium.png"),
                load("assets/cup_hard.png"),
            ],
            overlays,
            fill_item: load("assets/fill_item.png"),
        }
    }

    fn ready(entry: &Option<AtlasEntry>) -> Option<SpriteId> {
        entry
            .as_ref()
            .filter(|e| e.image.complete() && e.image.natural_width() > 0)
            .map(|e| e.id)
    }
}

impl super::surface::SpriteAtlas for DomAtlas {
    fn item_sprite(&self, kind: ObjectKind) -> Option<SpriteId> {
        match kind {
            ObjectKind::Snack => Self::ready(&self.snack),
            ObjectKind::Bomb => Self::ready(&self.bomb),
            ObjectKind::Heart => Self::ready(&self.heart),
        }
    }

    fn cup_sprite(&self, difficulty: Difficulty) -> Option<SpriteId> {
        let slot = match difficulty {
            Difficulty::Easy => &self.cups[0],
            Difficulty::Medium => &self.cups[1],
            Difficulty::Hard => &self.cups[2],
        };
        Self::ready(slot)
    }

    fn fill_overlay(&self, progress: u32) -> Option<SpriteId> {
        if progress == 0 {
            return None;
        }
        let index = (progress as usize - 1).min(self.overlays.len().saturating_sub(1));
        self.overlays.get(index).and_then(Self::ready)
    }

    fn fill_item(&self) -> Option<SpriteId> {
        Self::ready(&self.fill_item)
    }
}
