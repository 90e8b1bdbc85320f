//! PDF serialization of a laid-out [`Document`] via printpdf.
//!
//! Output is reproducible: no XMP packet, no ICC profile, no creation or
//! modification dates, and a trailer `/ID` derived from the caller's key
//! instead of a random one.

use crate::assets::Assets;
use crate::layout::{Document, Element, FontStyle, Rgb};
use crate::metrics::PT_TO_MM;
use lopdf::{Object, StringFormat};
use printpdf::image_crate::GenericImageView;
use printpdf::{
    BuiltinFont, Color, CustomPdfConformance, Image, ImageTransform, IndirectFontRef, Line, Mm,
    PdfConformance, PdfDocument, PdfLayerReference, Point,
};
use sha2::{Digest, Sha256};
use std::io::BufWriter;
use thiserror::Error;
use tracing::debug;

/// Resolution images are embedded at before scaling.
const IMAGE_DPI: f32 = 300.0;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("PDF font error: {0}")]
    Font(String),
    #[error("PDF save error: {0}")]
    Save(String),
    #[error("PDF post-processing error: {0}")]
    Normalize(#[from] lopdf::Error),
    #[error("PDF write error: {0}")]
    Io(#[from] std::io::Error),
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
        }
    }
}

/// Serialize `document` to PDF bytes. `key` seeds the document ID.
pub fn write(document: &Document, assets: &Assets, key: &str) -> Result<Vec<u8>, PdfError> {
    let setup = document.setup;
    let (doc, page1, layer1) =
        PdfDocument::new(&document.title, Mm(setup.width), Mm(setup.height), "Layer 1");
    let doc = doc.with_conformance(PdfConformance::Custom(CustomPdfConformance {
        requires_icc_profile: false,
        requires_xmp_metadata: false,
        ..Default::default()
    }));

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| PdfError::Font(e.to_string()))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| PdfError::Font(e.to_string()))?,
    };

    for (index, page) in document.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (page_index, layer_index) =
                doc.add_page(Mm(setup.width), Mm(setup.height), "Layer 1");
            doc.get_page(page_index).get_layer(layer_index)
        };
        for element in &page.elements {
            draw(&layer, element, &fonts, assets, setup.height);
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| PdfError::Save(e.to_string()))?;
    let raw = buf
        .into_inner()
        .map_err(|e| PdfError::Save(e.to_string()))?;
    debug!(pages = document.pages.len(), bytes = raw.len(), "serialized PDF");

    stabilize(&raw, key)
}

fn draw(
    layer: &PdfLayerReference,
    element: &Element,
    fonts: &Fonts,
    assets: &Assets,
    page_height: f32,
) {
    match element {
        Element::Text {
            x,
            y,
            size,
            style,
            text,
        } => {
            layer.use_text(text.as_str(), *size, Mm(*x), Mm(page_height - y), fonts.get(*style));
        }
        Element::Rule {
            x1,
            x2,
            y,
            weight,
            color,
        } => {
            let y = Mm(page_height - y);
            layer.set_outline_color(color_of(*color));
            layer.set_outline_thickness(weight / PT_TO_MM);
            layer.add_line(Line {
                points: vec![(Point::new(Mm(*x1), y), false), (Point::new(Mm(*x2), y), false)],
                is_closed: false,
            });
        }
        Element::Image {
            asset,
            x,
            y,
            width,
            height,
        } => {
            let Some(image) = assets.get(*asset) else {
                return;
            };
            let (px_w, px_h) = image.dimensions();
            if px_w == 0 || px_h == 0 {
                return;
            }
            let natural_w = px_w as f32 / IMAGE_DPI * 25.4;
            let natural_h = px_h as f32 / IMAGE_DPI * 25.4;
            Image::from_dynamic_image(image).add_to_layer(
                layer.clone(),
                ImageTransform {
                    translate_x: Some(Mm(*x)),
                    translate_y: Some(Mm(page_height - y - height)),
                    scale_x: Some(width / natural_w),
                    scale_y: Some(height / natural_h),
                    dpi: Some(IMAGE_DPI),
                    ..Default::default()
                },
            );
        }
    }
}

fn color_of(Rgb(r, g, b): Rgb) -> Color {
    let channel = |c: u8| f32::from(c) / 255.0;
    Color::Rgb(printpdf::Rgb::new(channel(r), channel(g), channel(b), None))
}

/// Strip the time-dependent and random parts printpdf writes.
fn stabilize(raw: &[u8], key: &str) -> Result<Vec<u8>, PdfError> {
    let mut doc = lopdf::Document::load_mem(raw)?;

    let id = document_id(key).into_bytes();
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(id.clone(), StringFormat::Literal),
            Object::String(id, StringFormat::Literal),
        ]),
    );

    if let Ok(info_id) = doc.trailer.get(b"Info").and_then(Object::as_reference) {
        if let Ok(info) = doc.get_object_mut(info_id).and_then(Object::as_dict_mut) {
            info.remove(b"CreationDate");
            info.remove(b"ModDate");
        }
    }
    if let Ok(root_id) = doc.trailer.get(b"Root").and_then(Object::as_reference) {
        if let Ok(catalog) = doc.get_object_mut(root_id).and_then(Object::as_dict_mut) {
            catalog.remove(b"Metadata");
        }
    }
    doc.prune_objects();

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

/// First 16 bytes of SHA-256 over `key`, hex encoded
fn document_id(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    hex::encode(&digest[..16])
}
