//! PDF output for an [`AlbumPlan`].
//!
//! Every page group becomes one landscape page. The printable area inside the
//! margin is split into equal-width cells, one per photo, and each photo is
//! scaled to fit its cell without distortion and centered in it. Photos are
//! resampled to [`IMAGE_DPI`] at their placed size and stored as JPEG, or as
//! Flate-compressed RGB plus soft mask when they carry transparency.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use log::{debug, warn};
use std::path::Path;

use super::planner::{AlbumPlan, PageGroup};
use super::{AlbumError, Result};

/// A4 landscape in points
pub const PAGE_WIDTH_PT: f32 = 841.89;
pub const PAGE_HEIGHT_PT: f32 = 595.28;
pub const PAGE_MARGIN_PT: f32 = 10.0;
pub const CELL_PADDING_PT: f32 = 2.0;

/// Pixel density photos are resampled to for their placed size
pub const IMAGE_DPI: f32 = 150.0;
const JPEG_QUALITY: u8 = 85;

/// Axis aligned rectangle in PDF user space (origin bottom left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn inset(&self, amount: f32) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            (self.width - 2.0 * amount).max(0.0),
            (self.height - 2.0 * amount).max(0.0),
        )
    }

    /// Largest rect with the given aspect ratio that fits inside `self`,
    /// centered on both axes.
    pub fn fit(&self, image_width: u32, image_height: u32) -> Self {
        if image_width == 0 || image_height == 0 {
            return Self::new(self.x + self.width / 2.0, self.y + self.height / 2.0, 0.0, 0.0);
        }

        let scale = (self.width / image_width as f32).min(self.height / image_height as f32);
        let width = image_width as f32 * scale;
        let height = image_height as f32 * scale;

        Self::new(
            self.x + (self.width - width) / 2.0,
            self.y + (self.height - height) / 2.0,
            width,
            height,
        )
    }
}

#[derive(Debug, Clone)]
pub struct AlbumRenderer {
    page_width: f32,
    page_height: f32,
    margin: f32,
    padding: f32,
}

impl Default for AlbumRenderer {
    fn default() -> Self {
        Self {
            page_width: PAGE_WIDTH_PT,
            page_height: PAGE_HEIGHT_PT,
            margin: PAGE_MARGIN_PT,
            padding: CELL_PADDING_PT,
        }
    }
}

impl AlbumRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders the plan into a complete PDF document.
    pub fn render(&self, plan: &AlbumPlan) -> Result<Vec<u8>> {
        if plan.is_empty() {
            return Err(AlbumError::EmptyPlan);
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut kids = Vec::with_capacity(plan.page_count());
        for (index, group) in plan.groups.iter().enumerate() {
            debug!(
                "Rendering page {} ({}, {} photo(s))",
                index + 1,
                group.arrangement.as_str(),
                group.photos.len()
            );
            let page_id = self.render_page(&mut doc, pages_id, group)?;
            kids.push(Object::Reference(page_id));
        }

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(kids.len() as i64)),
            ("Kids", Object::Array(kids)),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        doc.compress();

        let mut output = Vec::new();
        doc.save_to(&mut output)?;
        Ok(output)
    }

    /// Equal-width cells across the printable area, left to right.
    pub fn cells(&self, count: usize) -> Vec<Rect> {
        let area = Rect::new(
            self.margin,
            self.margin,
            self.page_width - 2.0 * self.margin,
            self.page_height - 2.0 * self.margin,
        );
        let cell_width = area.width / count.max(1) as f32;

        (0..count)
            .map(|i| {
                Rect::new(
                    area.x + i as f32 * cell_width,
                    area.y,
                    cell_width,
                    area.height,
                )
                .inset(self.padding)
            })
            .collect()
    }

    fn render_page(
        &self,
        doc: &mut Document,
        pages_id: ObjectId,
        group: &PageGroup,
    ) -> Result<ObjectId> {
        let mut content = String::new();
        let mut xobjects = Dictionary::new();

        for (slot, (cell, photo)) in self
            .cells(group.photos.len())
            .into_iter()
            .zip(group.photos)
            .enumerate()
        {
            let image = load_image_or_placeholder(photo.file_path());
            let placed = cell.fit(image.width(), image.height());
            let (max_width, max_height) = pixel_size(&placed);
            let image = downscale(image, max_width, max_height);
            // only the encoded stream outlives this iteration
            let image_id = embed_image(doc, &image)?;

            let name = format!("Im{}", slot);
            content.push_str(&format!(
                "q {} 0 0 {} {} {} cm /{} Do Q\n",
                placed.width, placed.height, placed.x, placed.y, name
            ));
            xobjects.set(name.as_bytes(), Object::Reference(image_id));
        }

        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        Ok(doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(self.page_width),
                    Object::Real(self.page_height),
                ]),
            ),
            ("Resources", Object::Dictionary(resources)),
            ("Contents", Object::Reference(content_id)),
        ])))
    }
}

/// 1x1 fully transparent image drawn in place of unreadable photos
pub fn placeholder_image() -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0])))
}

fn load_image(path: &Path) -> Result<DynamicImage> {
    let to_error = |reason: String| AlbumError::ImageLoad {
        path: path.display().to_string(),
        reason,
    };

    let bytes = std::fs::read(path).map_err(|e| to_error(e.to_string()))?;
    image::load_from_memory(&bytes).map_err(|e| to_error(e.to_string()))
}

fn load_image_or_placeholder(path: &Path) -> DynamicImage {
    load_image(path).unwrap_or_else(|e| {
        warn!("{}, using placeholder", e);
        placeholder_image()
    })
}

/// Pixels needed to cover `rect` at [`IMAGE_DPI`]
fn pixel_size(rect: &Rect) -> (u32, u32) {
    let to_pixels = |points: f32| ((points / 72.0 * IMAGE_DPI).ceil() as u32).max(1);
    (to_pixels(rect.width), to_pixels(rect.height))
}

/// Shrinks the image to fit within the bounds, keeping its aspect ratio.
/// Smaller images are left alone.
fn downscale(image: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    if image.width() <= max_width && image.height() <= max_height {
        return image;
    }
    image.resize(max_width, max_height, FilterType::Lanczos3)
}

/// Adds the image as a DeviceRGB XObject. Opaque images are JPEG encoded;
/// images with an alpha channel get a Flate-compressed soft mask instead.
fn embed_image(doc: &mut Document, image: &DynamicImage) -> Result<ObjectId> {
    let (width, height) = image.dimensions();
    let mut dict = image_dictionary(width, height, "DeviceRGB");

    if image.color().has_alpha() {
        let alpha: Vec<u8> = image.to_rgba8().pixels().map(|p| p[3]).collect();
        let mut smask = Stream::new(image_dictionary(width, height, "DeviceGray"), alpha);
        smask.compress()?;
        let smask_id = doc.add_object(smask);
        dict.set("SMask", Object::Reference(smask_id));

        let mut stream = Stream::new(dict, image.to_rgb8().into_raw());
        stream.compress()?;
        return Ok(doc.add_object(stream));
    }

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode_image(&image.to_rgb8())?;
    dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
    Ok(doc.add_object(Stream::new(dict, jpeg).with_compression(false)))
}

fn image_dictionary(width: u32, height: u32, color_space: &str) -> Dictionary {
    Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(i64::from(width))),
        ("Height", Object::Integer(i64::from(height))),
        ("ColorSpace", Object::Name(color_space.as_bytes().to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::album::planner::{Arrangement, PageGroup};
    use crate::photo_types::PhotoRecord;
    use chrono::Utc;
    use image::RgbImage;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PhotoRecord {
        let path = dir.join(name);
        RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]))
            .save(&path)
            .unwrap();
        PhotoRecord::new(name, path, 0, Utc::now())
    }

    fn plan_of<'a>(groups: &[&'a [PhotoRecord]]) -> AlbumPlan<'a> {
        AlbumPlan {
            groups: groups
                .iter()
                .map(|photos| PageGroup {
                    arrangement: Arrangement::for_count(photos.len()).unwrap(),
                    photos: *photos,
                })
                .collect(),
        }
    }

    fn xobject_counts(bytes: &[u8]) -> Vec<usize> {
        let doc = Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|page_id| {
                let page = doc.get_dictionary(*page_id).unwrap();
                page.get(b"Resources")
                    .and_then(Object::as_dict)
                    .and_then(|resources| resources.get(b"XObject"))
                    .and_then(Object::as_dict)
                    .map(|xobjects| xobjects.len())
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_empty_plan_is_rejected() {
        let result = AlbumRenderer::new().render(&AlbumPlan::default());
        assert!(matches!(result, Err(AlbumError::EmptyPlan)));
    }

    #[test]
    fn test_one_page_per_group() {
        let temp_dir = TempDir::new().unwrap();
        let photos: Vec<PhotoRecord> = (0..6)
            .map(|i| write_png(temp_dir.path(), &format!("{}.png", i), 8, 6))
            .collect();

        let plan = plan_of(&[&photos[0..3], &photos[3..5], &photos[5..6]]);
        let bytes = AlbumRenderer::new().render(&plan).unwrap();

        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(xobject_counts(&bytes), vec![3, 2, 1]);
    }

    #[test]
    fn test_missing_photo_keeps_its_page() {
        let temp_dir = TempDir::new().unwrap();
        let good = vec![
            write_png(temp_dir.path(), "a.png", 4, 4),
            write_png(temp_dir.path(), "b.png", 4, 4),
        ];
        let mut with_missing = good.clone();
        with_missing[1] = PhotoRecord::new(
            "gone.jpg",
            temp_dir.path().join("gone.jpg"),
            0,
            Utc::now(),
        );

        let renderer = AlbumRenderer::new();
        let good_bytes = renderer
            .render(&plan_of(&[&good[0..1], &good[1..2]]))
            .unwrap();
        let missing_bytes = renderer
            .render(&plan_of(&[&with_missing[0..1], &with_missing[1..2]]))
            .unwrap();

        assert_eq!(xobject_counts(&good_bytes), xobject_counts(&missing_bytes));
    }

    #[test]
    fn test_undecodable_file_uses_placeholder() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();

        let image = load_image_or_placeholder(&path);
        assert_eq!(image.dimensions(), (1, 1));
        assert!(image.color().has_alpha());
        assert!(matches!(
            load_image(&path),
            Err(AlbumError::ImageLoad { .. })
        ));
    }

    fn image_xobjects(bytes: &[u8]) -> Vec<Dictionary> {
        let doc = Document::load_mem(bytes).unwrap();
        doc.objects
            .values()
            .filter_map(|object| object.as_stream().ok())
            .filter(|stream| {
                stream.dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(&b"Image"[..])
                    && stream.dict.get(b"ColorSpace").and_then(Object::as_name).ok()
                        == Some(&b"DeviceRGB"[..])
            })
            .map(|stream| stream.dict.clone())
            .collect()
    }

    #[test]
    fn test_large_photos_are_resampled_to_their_cell() {
        let temp_dir = TempDir::new().unwrap();
        let photos: Vec<PhotoRecord> = (0..3)
            .map(|i| write_png(temp_dir.path(), &format!("{}.png", i), 1200, 900))
            .collect();

        let renderer = AlbumRenderer::new();
        let bytes = renderer.render(&plan_of(&[&photos])).unwrap();
        let (max_width, max_height) = pixel_size(&renderer.cells(3)[0]);

        let images = image_xobjects(&bytes);
        assert_eq!(images.len(), 3);
        for dict in &images {
            let width = dict.get(b"Width").and_then(Object::as_i64).unwrap();
            let height = dict.get(b"Height").and_then(Object::as_i64).unwrap();
            assert!(width <= i64::from(max_width), "width {}", width);
            assert!(height <= i64::from(max_height), "height {}", height);
            assert!(width < 1200 && height < 900);
            assert_eq!(
                dict.get(b"Filter").and_then(Object::as_name).unwrap(),
                b"DCTDecode"
            );
        }
        // opaque photos are stored lossy, far below raw RGB size
        assert!(bytes.len() < 3 * (max_width * max_height * 3) as usize);
    }

    #[test]
    fn test_small_photos_keep_their_size() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(40, 30));
        let kept = downscale(image, 563, 422);
        assert_eq!(kept.dimensions(), (40, 30));

        let image = DynamicImage::ImageRgb8(RgbImage::new(4000, 3000));
        let shrunk = downscale(image, 563, 422);
        assert!(shrunk.width() <= 563 && shrunk.height() <= 422);
    }

    #[test]
    fn test_transparent_image_gets_compressed_soft_mask() {
        let mut doc = Document::with_version("1.5");
        let image_id = embed_image(&mut doc, &placeholder_image()).unwrap();

        let stream = doc.get_object(image_id).unwrap().as_stream().unwrap();
        let smask_id = stream.dict.get(b"SMask").unwrap().as_reference().unwrap();
        let smask = doc.get_object(smask_id).unwrap().as_stream().unwrap();
        assert_eq!(
            smask.dict.get(b"ColorSpace").and_then(Object::as_name).unwrap(),
            b"DeviceGray"
        );
        assert_eq!(smask.get_plain_content().unwrap(), vec![0]);
    }

    #[test]
    fn test_pages_are_landscape() {
        let temp_dir = TempDir::new().unwrap();
        let photos = vec![write_png(temp_dir.path(), "a.png", 3, 9)];
        let bytes = AlbumRenderer::new().render(&plan_of(&[&photos])).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let media_box = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"MediaBox")
            .and_then(Object::as_array)
            .unwrap()
            .clone();
        let width = media_box[2].as_float().unwrap();
        let height = media_box[3].as_float().unwrap();
        assert!(width > height);
    }

    #[test]
    fn test_cells_split_width_evenly() {
        let renderer = AlbumRenderer::new();
        let cells = renderer.cells(3);
        assert_eq!(cells.len(), 3);

        let expected_width = (PAGE_WIDTH_PT - 2.0 * PAGE_MARGIN_PT) / 3.0 - 2.0 * CELL_PADDING_PT;
        for cell in &cells {
            assert!((cell.width - expected_width).abs() < 0.01);
            assert!((cell.y - (PAGE_MARGIN_PT + CELL_PADDING_PT)).abs() < 0.01);
        }
        assert!(cells[0].x < cells[1].x && cells[1].x < cells[2].x);

        let single = renderer.cells(1);
        assert!((single[0].x - (PAGE_MARGIN_PT + CELL_PADDING_PT)).abs() < 0.01);
    }

    #[test]
    fn test_fit_preserves_aspect_and_centers() {
        let cell = Rect::new(0.0, 0.0, 200.0, 100.0);

        let wide = cell.fit(400, 100);
        assert_eq!(wide, Rect::new(0.0, 25.0, 200.0, 50.0));

        let tall = cell.fit(50, 100);
        assert_eq!(tall, Rect::new(75.0, 0.0, 50.0, 100.0));

        // small images are scaled up
        let tiny = cell.fit(1, 1);
        assert_eq!(tiny, Rect::new(50.0, 0.0, 100.0, 100.0));
    }
}
