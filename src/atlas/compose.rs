//! Grid composition and fallback tiles.

use cosmic_text::{
    Attrs, Buffer, Color, Family, FontSystem, Metrics, Shaping, SwashCache,
    Weight,
};
use image::imageops::{self, FilterType};
use image::{Pixel, Rgba, RgbaImage};

use super::{atlas_size, cell_origin, AtlasImage, CellContent};
use crate::items::MenuItem;

/// Layout constants below are authored against a 512 px cell and scaled
/// proportionally for other sizes.
const REFERENCE_CELL: f32 = 512.0;
const TILE_BACKGROUND: Rgba<u8> = Rgba([5, 5, 5, 255]);
const TILE_BORDER: Rgba<u8> = Rgba([255, 255, 255, 61]);
const BORDER_INSET: f32 = 12.0;
const TEXT_LEFT: f32 = 28.0;
const TITLE_BASELINE: f32 = 56.0;
const TITLE_SIZE: f32 = 24.0;
const CAPTION_BASELINE: f32 = 92.0;
const CAPTION_SIZE: f32 = 18.0;
const TITLE_MAX_CHARS: usize = 36;
const UNTITLED_LABEL: &str = "Snapshot unavailable";
const CAPTION: &str = "Preview unavailable";

/// Compose the atlas grid from per-item decode results.
///
/// `images[i]` is the decoded thumbnail of `items[i]`, or `None` when it
/// failed; those cells get a fallback tile. Cells past the last item stay
/// fully transparent.
#[must_use]
pub fn compose_atlas(
    items: &[MenuItem],
    images: &[Option<RgbaImage>],
    cell_size: u32,
) -> AtlasImage {
    let size = atlas_size(items.len());
    let mut image = RgbaImage::new(size * cell_size, size * cell_size);
    let mut cells = vec![CellContent::Empty; (size * size) as usize];
    // Font discovery is slow; only pay for it when a tile needs text.
    let mut text: Option<TileText> = None;

    for (index, item) in items.iter().enumerate() {
        let (x, y) = cell_origin(index, size, cell_size);
        if let Some(thumb) = images.get(index).and_then(Option::as_ref) {
            log::debug!("drawing loaded image {index} at ({x}, {y})");
            let resized = imageops::resize(
                thumb,
                cell_size,
                cell_size,
                FilterType::Triangle,
            );
            imageops::replace(&mut image, &resized, i64::from(x), i64::from(y));
            cells[index] = CellContent::Loaded;
        } else {
            log::warn!(
                "drawing fallback tile {index} for '{}' ({})",
                item.title,
                item.image
            );
            let text = text.get_or_insert_with(TileText::new);
            draw_fallback_tile(&mut image, (x, y), cell_size, &item.title, text);
            cells[index] = CellContent::Fallback;
        }
    }

    AtlasImage {
        image,
        atlas_size: size,
        cell_size,
        cells,
    }
}

/// The title as printed on a fallback tile.
#[must_use]
pub fn tile_label(title: &str) -> String {
    if title.is_empty() {
        UNTITLED_LABEL.to_owned()
    } else {
        title.chars().take(TITLE_MAX_CHARS).collect()
    }
}

fn draw_fallback_tile(
    image: &mut RgbaImage,
    origin: (u32, u32),
    cell_size: u32,
    title: &str,
    text: &mut TileText,
) {
    let (x0, y0) = origin;
    let k = cell_size as f32 / REFERENCE_CELL;
    let cell = CellRect {
        x: x0,
        y: y0,
        size: cell_size,
    };

    for y in y0..y0 + cell_size {
        for x in x0..x0 + cell_size {
            image.put_pixel(x, y, TILE_BACKGROUND);
        }
    }

    let inset = (BORDER_INSET * k).round() as u32;
    if cell_size > inset * 2 {
        let (left, top) = (x0 + inset, y0 + inset);
        let (right, bottom) =
            (x0 + cell_size - inset - 1, y0 + cell_size - inset - 1);
        for x in left..=right {
            image.get_pixel_mut(x, top).blend(&TILE_BORDER);
            image.get_pixel_mut(x, bottom).blend(&TILE_BORDER);
        }
        for y in top + 1..bottom {
            image.get_pixel_mut(left, y).blend(&TILE_BORDER);
            image.get_pixel_mut(right, y).blend(&TILE_BORDER);
        }
    }

    let left = TEXT_LEFT * k;
    text.draw(
        image,
        &cell,
        &TextRun {
            text: &tile_label(title),
            left,
            top: (TITLE_BASELINE - TITLE_SIZE) * k,
            size: TITLE_SIZE * k,
            weight: Weight::SEMIBOLD,
            color: Color::rgba(255, 255, 255, 217),
        },
    );
    text.draw(
        image,
        &cell,
        &TextRun {
            text: CAPTION,
            left,
            top: (CAPTION_BASELINE - CAPTION_SIZE) * k,
            size: CAPTION_SIZE * k,
            weight: Weight::NORMAL,
            color: Color::rgba(255, 255, 255, 140),
        },
    );
}

/// Pixel bounds of one atlas cell; text never bleeds outside it.
struct CellRect {
    x: u32,
    y: u32,
    size: u32,
}

impl CellRect {
    fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x as i32
            && y >= self.y as i32
            && x < (self.x + self.size) as i32
            && y < (self.y + self.size) as i32
    }
}

/// One line of tile text, positioned relative to the cell origin.
struct TextRun<'a> {
    text: &'a str,
    left: f32,
    top: f32,
    size: f32,
    weight: Weight,
    color: Color,
}

/// CPU text rasterizer for fallback tiles.
struct TileText {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

impl TileText {
    fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
        }
    }

    fn draw(&mut self, image: &mut RgbaImage, cell: &CellRect, run: &TextRun) {
        if run.size < 1.0 {
            return;
        }
        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics::new(run.size, run.size * 1.25),
        );
        let width = cell.size as f32 - run.left * 2.0;
        buffer.set_size(
            &mut self.font_system,
            Some(width.max(1.0)),
            Some(run.size * 1.5),
        );
        let attrs = Attrs::new().family(Family::SansSerif).weight(run.weight);
        buffer.set_text(&mut self.font_system, run.text, attrs, Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let ox = cell.x as i32 + run.left as i32;
        let oy = cell.y as i32 + run.top as i32;
        buffer.draw(
            &mut self.font_system,
            &mut self.swash_cache,
            run.color,
            |x, y, w, h, color| {
                let src = Rgba([color.r(), color.g(), color.b(), color.a()]);
                for dy in 0..h as i32 {
                    for dx in 0..w as i32 {
                        let (px, py) = (ox + x + dx, oy + y + dy);
                        if cell.contains(px, py) {
                            image
                                .get_pixel_mut(px as u32, py as u32)
                                .blend(&src);
                        }
                    }
                }
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str) -> MenuItem {
        MenuItem {
            image: format!("{title}.png"),
            link: String::new(),
            title: title.to_owned(),
            description: String::new(),
        }
    }

    fn solid(color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(8, 8, Rgba(color))
    }

    #[test]
    fn five_loaded_items_fill_five_of_nine_cells() {
        let items: Vec<_> = (0..5).map(|i| item(&format!("item{i}"))).collect();
        let images: Vec<_> =
            (0..5).map(|_| Some(solid([200, 10, 10, 255]))).collect();
        let atlas = compose_atlas(&items, &images, 16);

        assert_eq!(atlas.atlas_size, 3);
        assert_eq!(atlas.image.dimensions(), (48, 48));
        assert_eq!(atlas.loaded_count(), 5);
        assert_eq!(atlas.empty_count(), 4);

        for index in 0..9 {
            let (x, y) = cell_origin(index, 3, 16);
            let center = atlas.image.get_pixel(x + 8, y + 8);
            if index < 5 {
                assert_eq!(center.0, [200, 10, 10, 255]);
            } else {
                assert_eq!(center.0[3], 0, "cell {index} should be blank");
            }
        }
    }

    #[test]
    fn failed_item_gets_fallback_background_and_border() {
        let items: Vec<_> = (0..5).map(|i| item(&format!("t{i}"))).collect();
        let mut images: Vec<_> =
            (0..5).map(|_| Some(solid([0, 255, 0, 255]))).collect();
        images[1] = None;
        let atlas = compose_atlas(&items, &images, 64);

        assert_eq!(atlas.atlas_size, 3);
        assert_eq!(atlas.loaded_count(), 4);
        assert_eq!(atlas.fallback_count(), 1);
        assert_eq!(atlas.empty_count(), 4);
        assert_eq!(atlas.cells[1], CellContent::Fallback);
        let (x, y) = cell_origin(1, 3, 64);
        // Corner is outside the inset border: pure background.
        assert_eq!(atlas.image.get_pixel(x + 1, y + 1).0, [5, 5, 5, 255]);
        // Border line (inset 12 * 64/512 = 1.5 → 2 px) is lighter.
        let border = atlas.image.get_pixel(x + 32, y + 2).0;
        assert!(border[0] > 5 && border[3] == 255);
        // Loaded neighbours are untouched.
        assert_eq!(atlas.image.get_pixel(10, 10).0, [0, 255, 0, 255]);
        let (x, y) = cell_origin(2, 3, 64);
        assert_eq!(atlas.image.get_pixel(x + 32, y + 32).0, [0, 255, 0, 255]);
    }

    #[test]
    fn missing_decode_results_count_as_failures() {
        let items = vec![item("a"), item("b"), item("c")];
        let atlas = compose_atlas(&items, &[Some(solid([1, 2, 3, 255]))], 8);
        assert_eq!(atlas.loaded_count(), 1);
        assert_eq!(atlas.fallback_count(), 2);
        assert_eq!(atlas.empty_count(), 1);
    }

    #[test]
    fn tile_label_truncates_long_titles() {
        assert_eq!(tile_label(""), UNTITLED_LABEL);
        let long = "x".repeat(50);
        assert_eq!(tile_label(&long).chars().count(), TITLE_MAX_CHARS);
        assert_eq!(tile_label("Work"), "Work");
    }
}
