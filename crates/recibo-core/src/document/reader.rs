//! Low-level document access using lopdf and pdf-extract.

use image::{DynamicImage, ImageBuffer, Rgba};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, trace};

use crate::error::AcquireError;

/// Read-only view over a loaded receipt document.
#[derive(Debug)]
pub struct DocumentReader {
    document: Document,
    raw_data: Vec<u8>,
}

impl DocumentReader {
    /// Load a document from bytes.
    ///
    /// Documents encrypted with an empty password are decrypted
    /// transparently; any other encryption is rejected.
    pub fn load(data: &[u8]) -> Result<Self, AcquireError> {
        let mut doc = Document::load_mem(data)
            .map_err(|e| AcquireError::InvalidDocument(e.to_string()))?;

        let raw_data = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(AcquireError::InvalidDocument("document is encrypted".into()));
            }
            debug!("Decrypted document with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| AcquireError::InvalidDocument(e.to_string()))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(AcquireError::InvalidDocument("document has no pages".into()));
        }

        debug!("Loaded document with {} pages", page_count);
        Ok(Self {
            document: doc,
            raw_data,
        })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Extract machine-encoded text from the whole document.
    pub fn extract_text(&self) -> Result<String, AcquireError> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| AcquireError::InvalidDocument(e.to_string()))
    }

    /// Machine text per page, in page order.
    ///
    /// pdf-extract yields one undifferentiated block, so pages are
    /// apportioned by line count; good enough for joining back together.
    pub fn page_texts(&self) -> Result<Vec<String>, AcquireError> {
        let full_text = self.extract_text()?;
        let lines: Vec<&str> = full_text.lines().collect();
        let page_count = self.page_count() as usize;

        if page_count <= 1 || lines.is_empty() {
            return Ok(vec![full_text]);
        }

        let lines_per_page = lines.len().div_ceil(page_count);
        Ok(lines
            .chunks(lines_per_page)
            .map(|chunk| chunk.join("\n"))
            .collect())
    }

    /// The embedded image of the first page, at its intrinsic resolution.
    ///
    /// Scanned receipts embed each page as a single full-page image; that
    /// image is what the OCR fallback consumes.
    pub fn first_page_image(&self) -> Option<DynamicImage> {
        let pages = self.document.get_pages();
        if let Some(page_id) = pages.get(&1) {
            if let Some(resources) = self.page_resources(*page_id) {
                if let Ok(xobjects) = resources.get(b"XObject") {
                    if let Ok((_, Object::Dictionary(xobj_dict))) =
                        self.document.dereference(xobjects)
                    {
                        for (_name, obj_ref) in xobj_dict.iter() {
                            if let Ok((_, obj)) = self.document.dereference(obj_ref) {
                                if let Some(img) = self.decode_image_object(obj) {
                                    return Some(img);
                                }
                            }
                        }
                    }
                }
            }
        }

        // Some writers attach the scan outside the page resources; take the
        // first decodable image object anywhere in the document.
        debug!("No XObject image on page 1, scanning all objects");
        self.document
            .objects
            .iter()
            .find_map(|(_, obj)| self.decode_image_object(obj))
    }

    /// Resources dictionary for a page, following Parent inheritance.
    fn page_resources(&self, page_id: ObjectId) -> Option<lopdf::Dictionary> {
        let mut node_id = page_id;
        loop {
            let Ok(Object::Dictionary(dict)) = self.document.get_object(node_id) else {
                return None;
            };
            if let Ok(resources) = dict.get(b"Resources") {
                if let Ok((_, Object::Dictionary(res))) = self.document.dereference(resources) {
                    return Some(res.clone());
                }
            }
            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => node_id = *parent_id,
                _ => return None,
            }
        }
    }

    fn decode_image_object(&self, obj: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = obj else {
            return None;
        };
        let dict = &stream.dict;

        let subtype = dict.get(b"Subtype").ok()?;
        if subtype.as_name().ok()? != b"Image" {
            return None;
        }

        let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
        let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;
        trace!("Found image object: {}x{}", width, height);

        let filter_name = dict.get(b"Filter").ok().and_then(|f| match f {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            _ => None,
        });

        if let Some(b"DCTDecode") = filter_name {
            // JPEG scan data is stored as-is
            return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                .ok();
        }
        if matches!(
            filter_name,
            Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode")
        ) {
            trace!("Unsupported image filter, skipping");
            return None;
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);
        if bits != 8 {
            trace!("Unsupported bits per component: {}", bits);
            return None;
        }

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                Object::Reference(r) => {
                    self.document.get_object(*r).ok().and_then(|o| o.as_name().ok())
                }
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        decode_raw_image(&data, width, height, color_space)
    }
}

/// Expand raw 8-bit RGB or grayscale samples into an RGBA image.
fn decode_raw_image(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
) -> Option<DynamicImage> {
    let pixels = (width * height) as usize;
    let mut rgba = Vec::with_capacity(pixels * 4);

    match color_space {
        b"DeviceRGB" | b"RGB" if data.len() >= pixels * 3 => {
            for chunk in data[..pixels * 3].chunks_exact(3) {
                rgba.extend_from_slice(&[chunk[0], chunk[1], chunk[2], 255]);
            }
        }
        b"DeviceGray" | b"G" if data.len() >= pixels => {
            for &gray in &data[..pixels] {
                rgba.extend_from_slice(&[gray, gray, gray, 255]);
            }
        }
        _ => {
            trace!(
                "Could not decode image: colorspace={:?}, data_len={}",
                String::from_utf8_lossy(color_space),
                data.len()
            );
            return None;
        }
    }

    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba).map(DynamicImage::ImageRgba8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_rejects_garbage_bytes() {
        let err = DocumentReader::load(b"not a pdf").unwrap_err();
        assert!(matches!(err, AcquireError::InvalidDocument(_)));
    }

    #[test]
    fn decode_raw_gray_image() {
        let data = vec![128u8; 4];
        let img = decode_raw_image(&data, 2, 2, b"DeviceGray").unwrap();
        assert_eq!(img.width(), 2);
        assert_eq!(img.height(), 2);
    }

    #[test]
    fn decode_raw_image_rejects_short_data() {
        assert!(decode_raw_image(&[0u8; 3], 2, 2, b"DeviceRGB").is_none());
    }
}
