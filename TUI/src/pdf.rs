//! Image-to-PDF assembly: one centered, aspect-preserving page per image.

use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use thiserror::Error;

/// A4 in PDF points
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;

const JPEG_QUALITY: u8 = 95;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("no images selected")]
    NoImages,
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot decode {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("pdf assembly failed: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("jpeg encoding failed: {0}")]
    Encode(image::ImageError),
    #[error("cannot serialize document: {0}")]
    Write(String),
}

/// Where an image lands on a page, in points from the bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Fit to the page width, or to the height if that overflows, and center.
pub fn fit_to_page(img_width: u32, img_height: u32, page_width: f32, page_height: f32) -> Placement {
    let (iw, ih) = (img_width.max(1) as f32, img_height.max(1) as f32);

    let mut width = page_width;
    let mut height = ih * page_width / iw;
    if height > page_height {
        height = page_height;
        width = iw * page_height / ih;
    }

    Placement {
        x: (page_width - width) / 2.0,
        y: (page_height - height) / 2.0,
        width,
        height,
    }
}

/// True when the path's extension names an image format we can decode.
pub fn is_image_path(path: &Path) -> bool {
    ImageFormat::from_path(path).is_ok_and(|format| format.reading_enabled())
}

pub fn load_image(path: &Path) -> Result<DynamicImage, PdfError> {
    let reader = ImageReader::open(path).map_err(|source| PdfError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = reader.with_guessed_format().map_err(|source| PdfError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    reader.decode().map_err(|source| PdfError::Image {
        path: path.to_path_buf(),
        source,
    })
}

fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>, PdfError> {
    let rgb = image.to_rgb8();
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    rgb.write_with_encoder(encoder).map_err(PdfError::Encode)?;
    Ok(buf)
}

/// Build a PDF with one page per image, in the given order.
pub fn images_to_pdf(images: &[DynamicImage]) -> Result<Vec<u8>, PdfError> {
    if images.is_empty() {
        return Err(PdfError::NoImages);
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(images.len());

    for image in images {
        let jpeg = encode_jpeg(image)?;
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width() as i64,
                "Height" => image.height() as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        ));

        let place = fit_to_page(image.width(), image.height(), PAGE_WIDTH, PAGE_HEIGHT);
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        place.width.into(),
                        0.into(),
                        0.into(),
                        place.height.into(),
                        place.x.into(),
                        place.y.into(),
                    ],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    if let Err(e) = doc.save_to(&mut out) {
        return Err(PdfError::Write(e.to_string()));
    }
    Ok(out)
}

/// Decode each file in order, then write the assembled document to `output`.
pub fn convert_files(paths: &[PathBuf], output: &Path) -> Result<usize, PdfError> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        tracing::debug!(path = %path.display(), "rasterizing");
        images.push(load_image(path)?);
    }

    let bytes = images_to_pdf(&images)?;
    std::fs::write(output, bytes).map_err(|source| PdfError::Io {
        path: output.to_path_buf(),
        source,
    })?;

    tracing::info!(pages = images.len(), output = %output.display(), "pdf written");
    Ok(images.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 30, 90])))
    }

    fn page_image_widths(doc: &Document) -> Vec<i64> {
        doc.get_pages()
            .values()
            .map(|page_id| {
                let page = doc.get_object(*page_id).unwrap().as_dict().unwrap();
                let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
                let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
                let image_id = xobjects.get(b"Im0").unwrap().as_reference().unwrap();
                let stream = doc.get_object(image_id).unwrap().as_stream().unwrap();
                stream.dict.get(b"Width").unwrap().as_i64().unwrap()
            })
            .collect()
    }

    #[test]
    fn test_fit_wide_image_uses_page_width() {
        let place = fit_to_page(2000, 1000, 600.0, 800.0);
        assert_eq!(place.width, 600.0);
        assert_eq!(place.height, 300.0);
        assert_eq!(place.x, 0.0);
        assert_eq!(place.y, 250.0);
    }

    #[test]
    fn test_fit_tall_image_uses_page_height() {
        let place = fit_to_page(100, 400, 600.0, 800.0);
        assert_eq!(place.height, 800.0);
        assert_eq!(place.width, 200.0);
        assert_eq!(place.x, 200.0);
        assert_eq!(place.y, 0.0);
    }

    #[test]
    fn test_fit_preserves_aspect_ratio() {
        let place = fit_to_page(640, 480, PAGE_WIDTH, PAGE_HEIGHT);
        let ratio = place.width / place.height;
        assert!((ratio - 640.0 / 480.0).abs() < 1e-3);
        assert!(place.width <= PAGE_WIDTH && place.height <= PAGE_HEIGHT);
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        assert!(matches!(images_to_pdf(&[]), Err(PdfError::NoImages)));
    }

    #[test]
    fn test_three_images_three_pages_in_order() {
        let images = vec![solid(10, 20), solid(30, 20), solid(50, 20)];
        let bytes = images_to_pdf(&images).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
        assert_eq!(page_image_widths(&doc), vec![10, 30, 50]);
    }

    #[test]
    fn test_convert_files_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for (i, width) in [8u32, 16, 24].iter().enumerate() {
            let path = dir.path().join(format!("img{i}.png"));
            solid(*width, 8).save(&path).unwrap();
            paths.push(path);
        }
        let output = dir.path().join("out.pdf");

        let pages = convert_files(&paths, &output).unwrap();

        assert_eq!(pages, 3);
        let doc = Document::load(&output).unwrap();
        assert_eq!(page_image_widths(&doc), vec![8, 16, 24]);
    }

    #[test]
    fn test_convert_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = convert_files(&[dir.path().join("nope.png")], &dir.path().join("o.pdf"));
        assert!(matches!(result, Err(PdfError::Io { .. })));
    }

    #[test]
    fn test_is_image_path() {
        assert!(is_image_path(Path::new("photo.JPG")));
        assert!(is_image_path(Path::new("scan.png")));
        assert!(!is_image_path(Path::new("notes.txt")));
        assert!(!is_image_path(Path::new("no_extension")));
    }
}
