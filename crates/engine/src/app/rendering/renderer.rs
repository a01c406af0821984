use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::{DrawCommand, Frame, Point};
use crate::resources::{resolve_image_path, ResourceKind, ResourceTable, RsrcId};

use super::Viewport;

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const TEXT_COLOR: [u8; 4] = [235, 235, 220, 255];
const PLACEHOLDER_SIZE_PX: u32 = 32;
const DEFAULT_FONT_SIZE: u32 = 16;

struct LoadedSprite {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SourceRect {
    x: u32,
    width: u32,
    height: u32,
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    resources_dir: PathBuf,
    resources: ResourceTable,
    sprite_cache: HashMap<RsrcId, Option<LoadedSprite>>,
    warned_missing_rsrc_ids: HashSet<RsrcId>,
}

impl Renderer {
    pub fn new(
        window: Arc<Window>,
        resources_dir: PathBuf,
        resources: ResourceTable,
    ) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            resources_dir,
            resources,
            sprite_cache: HashMap::new(),
            warned_missing_rsrc_ids: HashSet::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_frame(&mut self, frame: &Frame) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        let Viewport { width, height } = self.viewport;
        let resources_dir = self.resources_dir.as_path();
        let resources = &self.resources;
        let sprite_cache = &mut self.sprite_cache;
        let warned = &mut self.warned_missing_rsrc_ids;
        let target = self.pixels.frame_mut();
        for chunk in target.chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }

        for command in frame.commands() {
            match command {
                DrawCommand::Image {
                    rsrc_id,
                    frame: frame_idx,
                    pos,
                } => {
                    let frames = match resources.get(*rsrc_id).map(|desc| desc.kind) {
                        Some(ResourceKind::SpriteSheet { frames }) => frames,
                        _ => 1,
                    };
                    match resolve_cached_sprite(
                        sprite_cache,
                        warned,
                        resources,
                        resources_dir,
                        *rsrc_id,
                    ) {
                        Some(sprite) => {
                            let source = sprite_frame_rect(
                                sprite.width,
                                sprite.height,
                                frames,
                                *frame_idx,
                            );
                            blit_sprite(target, width, height, *pos, sprite, source);
                        }
                        None => draw_rect(
                            target,
                            width,
                            height,
                            *pos,
                            PLACEHOLDER_SIZE_PX,
                            PLACEHOLDER_SIZE_PX,
                            placeholder_color(*rsrc_id),
                        ),
                    }
                }
                DrawCommand::Text { font_id, text, pos } => {
                    let size = match resources.get(*font_id).map(|desc| desc.kind) {
                        Some(ResourceKind::Font { size }) => size,
                        _ => DEFAULT_FONT_SIZE,
                    };
                    draw_text_placeholder(target, width, height, *pos, text, size);
                }
            }
        }

        self.pixels.render()
    }
}

fn resolve_cached_sprite<'a>(
    cache: &'a mut HashMap<RsrcId, Option<LoadedSprite>>,
    warned_missing_rsrc_ids: &mut HashSet<RsrcId>,
    resources: &ResourceTable,
    resources_dir: &Path,
    rsrc_id: RsrcId,
) -> Option<&'a LoadedSprite> {
    if !cache.contains_key(&rsrc_id) {
        let sprite = match resources.get(rsrc_id) {
            Some(desc) => match resolve_image_path(resources_dir, desc.key) {
                Ok(path) => match load_sprite_rgba(&path) {
                    Ok(sprite) => Some(sprite),
                    Err(reason) => {
                        warn_sprite_load_once(
                            warned_missing_rsrc_ids,
                            rsrc_id,
                            Some(path.as_path()),
                            reason.as_str(),
                        );
                        None
                    }
                },
                Err(reason) => {
                    warn_sprite_load_once(warned_missing_rsrc_ids, rsrc_id, None, reason.as_str());
                    None
                }
            },
            None => {
                warn_sprite_load_once(warned_missing_rsrc_ids, rsrc_id, None, "unknown_rsrc_id");
                None
            }
        };
        cache.insert(rsrc_id, sprite);
    }
    cache.get(&rsrc_id).and_then(Option::as_ref)
}

fn load_sprite_rgba(path: &Path) -> Result<LoadedSprite, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedSprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

fn warn_sprite_load_once(
    warned: &mut HashSet<RsrcId>,
    rsrc_id: RsrcId,
    resolved_path: Option<&Path>,
    reason: &str,
) {
    if !warned.insert(rsrc_id) {
        return;
    }
    let path_display = resolved_path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unresolved>".to_string());
    warn!(
        rsrc_id = rsrc_id.0,
        path = %path_display,
        reason = reason,
        "renderer_sprite_load_failed_using_placeholder"
    );
}

fn sprite_frame_rect(sheet_width: u32, sheet_height: u32, frames: u32, frame: u32) -> SourceRect {
    let frames = frames.max(1);
    let frame_width = (sheet_width / frames).max(1);
    let frame = frame % frames;
    SourceRect {
        x: (frame * frame_width).min(sheet_width.saturating_sub(1)),
        width: frame_width.min(sheet_width),
        height: sheet_height,
    }
}

fn placeholder_color(rsrc_id: RsrcId) -> [u8; 4] {
    let hash = rsrc_id.0.wrapping_mul(0x9e37_79b9);
    [
        96 + (hash >> 24) as u8 % 128,
        96 + (hash >> 16) as u8 % 128,
        96 + (hash >> 8) as u8 % 128,
        255,
    ]
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}

fn draw_rect(
    frame: &mut [u8],
    width: u32,
    height: u32,
    top_left: Point,
    rect_width: u32,
    rect_height: u32,
    color: [u8; 4],
) {
    let bottom = (top_left.y + rect_height as i32).min(height as i32);
    let right = (top_left.x + rect_width as i32).min(width as i32);
    for y in top_left.y.max(0)..bottom {
        for x in top_left.x.max(0)..right {
            write_pixel_rgba_clipped(frame, width as usize, x, y, color);
        }
    }
}

fn draw_text_placeholder(
    frame: &mut [u8],
    width: u32,
    height: u32,
    pos: Point,
    text: &str,
    font_size: u32,
) {
    let glyph_width = (font_size / 2).max(1);
    let glyph_height = (font_size * 3 / 4).max(1);
    let advance = glyph_width as i32 + (font_size / 8).max(1) as i32;
    for (idx, ch) in text.chars().enumerate() {
        if ch.is_whitespace() {
            continue;
        }
        let glyph_pos = Point::new(pos.x + idx as i32 * advance, pos.y);
        draw_rect(
            frame,
            width,
            height,
            glyph_pos,
            glyph_width,
            glyph_height,
            TEXT_COLOR,
        );
    }
}

fn blit_sprite(
    frame: &mut [u8],
    width: u32,
    height: u32,
    top_left: Point,
    sprite: &LoadedSprite,
    source: SourceRect,
) {
    if sprite.width == 0 || sprite.height == 0 || width == 0 || height == 0 {
        return;
    }
    let expected_rgba_len = sprite.width as usize * sprite.height as usize * 4;
    if sprite.rgba.len() < expected_rgba_len {
        return;
    }

    let frame_width = width as usize;
    let sprite_width = sprite.width as usize;
    for dy in 0..source.height.min(sprite.height) {
        let out_y = top_left.y + dy as i32;
        if out_y < 0 || out_y >= height as i32 {
            continue;
        }
        let src_row_offset = dy as usize * sprite_width * 4;
        let dst_row_offset = out_y as usize * frame_width * 4;
        for dx in 0..source.width {
            let src_x = (source.x + dx) as usize;
            if src_x >= sprite_width {
                break;
            }
            let out_x = top_left.x + dx as i32;
            if out_x < 0 || out_x >= width as i32 {
                continue;
            }
            let src_offset = src_row_offset + src_x * 4;
            let alpha = sprite.rgba[src_offset + 3];
            if alpha == 0 {
                continue;
            }
            let dst_offset = dst_row_offset + out_x as usize * 4;
            frame[dst_offset] = sprite.rgba[src_offset];
            frame[dst_offset + 1] = sprite.rgba[src_offset + 1];
            frame[dst_offset + 2] = sprite.rgba[src_offset + 2];
            frame[dst_offset + 3] = alpha;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceDesc;
    use tempfile::TempDir;

    fn pixel(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * width + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    fn two_frame_sheet() -> LoadedSprite {
        // 2x1 sheet: red frame then green frame.
        LoadedSprite {
            width: 2,
            height: 1,
            rgba: vec![255, 0, 0, 255, 0, 255, 0, 255],
        }
    }

    #[test]
    fn renderer_type_is_non_generic() {
        let _ = std::mem::size_of::<Renderer>();
    }

    #[test]
    fn write_pixel_ignores_out_of_bounds() {
        let mut frame = vec![0u8; 2 * 2 * 4];
        write_pixel_rgba_clipped(&mut frame, 2, -1, 0, [1, 1, 1, 1]);
        write_pixel_rgba_clipped(&mut frame, 2, 2, 0, [1, 1, 1, 1]);
        write_pixel_rgba_clipped(&mut frame, 2, 0, 2, [1, 1, 1, 1]);
        assert!(frame.iter().all(|byte| *byte == 0));

        write_pixel_rgba_clipped(&mut frame, 2, 1, 1, [9, 8, 7, 6]);
        assert_eq!(pixel(&frame, 2, 1, 1), [9, 8, 7, 6]);
    }

    #[test]
    fn sprite_frame_rect_selects_horizontal_strip_cell() {
        assert_eq!(
            sprite_frame_rect(30, 10, 3, 1),
            SourceRect {
                x: 10,
                width: 10,
                height: 10
            }
        );
        assert_eq!(sprite_frame_rect(30, 10, 3, 4).x, 10);
        assert_eq!(sprite_frame_rect(30, 10, 0, 0).width, 30);
    }

    #[test]
    fn blit_copies_only_the_selected_frame() {
        let sprite = two_frame_sheet();
        let mut frame = vec![0u8; 3 * 1 * 4];
        let source = sprite_frame_rect(sprite.width, sprite.height, 2, 1);

        blit_sprite(&mut frame, 3, 1, Point::new(1, 0), &sprite, source);

        assert_eq!(pixel(&frame, 3, 0, 0), [0, 0, 0, 0]);
        assert_eq!(pixel(&frame, 3, 1, 0), [0, 255, 0, 255]);
        assert_eq!(pixel(&frame, 3, 2, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn text_placeholder_skips_whitespace() {
        let mut frame = vec![0u8; 40 * 20 * 4];
        draw_text_placeholder(&mut frame, 40, 20, Point::new(0, 0), "a b", 8);

        assert_eq!(pixel(&frame, 40, 0, 0), TEXT_COLOR);
        assert_eq!(pixel(&frame, 40, 5, 0), [0, 0, 0, 0]);
        assert_eq!(pixel(&frame, 40, 10, 0), TEXT_COLOR);
    }

    #[test]
    fn missing_sprite_is_cached_as_placeholder_and_warned_once() {
        let temp = TempDir::new().expect("tempdir");
        let table = ResourceTable::new(&[ResourceDesc {
            id: RsrcId(4),
            key: "p/missing",
            kind: ResourceKind::Image,
        }])
        .expect("table");
        let mut cache = HashMap::new();
        let mut warned = HashSet::new();

        for _ in 0..2 {
            assert!(resolve_cached_sprite(&mut cache, &mut warned, &table, temp.path(), RsrcId(4))
                .is_none());
        }
        assert_eq!(cache.len(), 1);
        assert_eq!(warned.len(), 1);
    }

    #[test]
    fn placeholder_color_is_stable_per_id() {
        assert_eq!(placeholder_color(RsrcId(3)), placeholder_color(RsrcId(3)));
        assert_eq!(placeholder_color(RsrcId(3))[3], 255);
    }
}
