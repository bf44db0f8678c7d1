//! Decoding of the IDX binary files used by MNIST and its derivatives
//! (Fashion-MNIST, EMNIST, …).
//!
//! # IDX3 image file layout
//! ```text
//! bytes  0-3:   0x00000803  (magic: uint8 data, 3 dimensions)
//! bytes  4-7:   N           (number of images, big-endian u32)
//! bytes  8-11:  rows        (image height in pixels, big-endian u32)
//! bytes 12-15:  cols        (image width in pixels, big-endian u32)
//! bytes 16..:   N * rows * cols bytes, row-major, uint8
//! ```
//!
//! # IDX1 label file layout
//! ```text
//! bytes  0-3:   0x00000801  (magic: uint8 data, 1 dimension)
//! bytes  4-7:   N           (number of labels, big-endian u32)
//! bytes  8..:   N bytes, each a class index in [0, n_classes)
//! ```

use crate::data::Dataset;
use crate::error::{Error, Result};

pub const IMAGE_MAGIC: u32 = 0x0000_0803;
pub const LABEL_MAGIC: u32 = 0x0000_0801;

const IMAGE_HEADER_LEN: usize = 16;
const LABEL_HEADER_LEN: usize = 8;

/// Decodes an IDX3 image file into one vector per image, each pixel divided
/// by 255.0 so values lie in `[0.0, 1.0]`.
///
/// With `limit = Some(n)` only the first `n` images are decoded. The file
/// must still hold every record its header declares.
pub fn parse_idx_images(bytes: &[u8], limit: Option<usize>) -> Result<Vec<Vec<f64>>> {
    if bytes.len() < IMAGE_HEADER_LEN {
        return Err(Error::Format(format!(
            "IDX image file too short: expected at least {} header bytes, got {}",
            IMAGE_HEADER_LEN, bytes.len()
        )));
    }

    let magic = read_be_u32(bytes, 0);
    if magic != IMAGE_MAGIC {
        return Err(Error::Format(format!(
            "invalid magic number in IDX image file: expected {:#010x}, got {:#010x}",
            IMAGE_MAGIC, magic
        )));
    }

    let n_items = read_be_u32(bytes, 4) as usize;
    let rows = read_be_u32(bytes, 8) as usize;
    let cols = read_be_u32(bytes, 12) as usize;

    let n_pixels = rows.checked_mul(cols).ok_or_else(|| {
        Error::Format(format!("IDX image file: rows * cols overflows (rows={}, cols={})", rows, cols))
    })?;
    let data_len = n_items.checked_mul(n_pixels).ok_or_else(|| {
        Error::Format(format!(
            "IDX image file: item count * pixel count overflows (n_items={}, n_pixels={})",
            n_items, n_pixels
        ))
    })?;

    let available = bytes.len() - IMAGE_HEADER_LEN;
    if available < data_len {
        return Err(Error::Format(format!(
            "IDX image file truncated: header declares {} images of {}x{} pixels \
             ({} data bytes), but only {} data bytes follow the header",
            n_items, rows, cols, data_len, available
        )));
    }
    if n_pixels == 0 && n_items > 0 {
        return Err(Error::Format(format!(
            "IDX image file declares {} images of size {}x{}",
            n_items, rows, cols
        )));
    }

    let keep = limit.map_or(n_items, |limit| limit.min(n_items));
    let images = bytes[IMAGE_HEADER_LEN..IMAGE_HEADER_LEN + keep * n_pixels]
        .chunks_exact(n_pixels.max(1))
        .map(|chunk| chunk.iter().map(|&px| px as f64 / 255.0).collect())
        .collect();

    Ok(images)
}

/// Decodes an IDX1 label file into one-hot vectors of length `n_classes`.
pub fn parse_idx_labels(bytes: &[u8], limit: Option<usize>, n_classes: usize) -> Result<Vec<Vec<f64>>> {
    if n_classes < 2 {
        return Err(Error::Format(format!("n_classes must be at least 2, got {}", n_classes)));
    }
    if bytes.len() < LABEL_HEADER_LEN {
        return Err(Error::Format(format!(
            "IDX label file too short: expected at least {} header bytes, got {}",
            LABEL_HEADER_LEN, bytes.len()
        )));
    }

    let magic = read_be_u32(bytes, 0);
    if magic != LABEL_MAGIC {
        return Err(Error::Format(format!(
            "invalid magic number in IDX label file: expected {:#010x}, got {:#010x}",
            LABEL_MAGIC, magic
        )));
    }

    let n_items = read_be_u32(bytes, 4) as usize;
    let available = bytes.len() - LABEL_HEADER_LEN;
    if available < n_items {
        return Err(Error::Format(format!(
            "IDX label file truncated: header declares {} labels, but only {} data bytes follow the header",
            n_items, available
        )));
    }

    let keep = limit.map_or(n_items, |limit| limit.min(n_items));
    bytes[LABEL_HEADER_LEN..LABEL_HEADER_LEN + keep]
        .iter()
        .enumerate()
        .map(|(i, &class)| one_hot(class as usize, n_classes).ok_or_else(|| {
            Error::Format(format!(
                "IDX label at index {}: class {} is out of range for {} classes",
                i, class, n_classes
            ))
        }))
        .collect()
}

/// Decodes a matching image/label file pair into a dataset.
///
/// Both headers must declare the same number of records.
pub fn parse_idx_pair(
    image_bytes: &[u8],
    label_bytes: &[u8],
    n_classes: usize,
    limit: Option<usize>,
) -> Result<Dataset> {
    let inputs = parse_idx_images(image_bytes, limit)?;
    let targets = parse_idx_labels(label_bytes, limit, n_classes)?;

    let declared_images = read_be_u32(image_bytes, 4);
    let declared_labels = read_be_u32(label_bytes, 4);
    if declared_images != declared_labels {
        return Err(Error::Format(format!(
            "IDX file mismatch: image file declares {} items but label file declares {}",
            declared_images, declared_labels
        )));
    }

    Ok(Dataset { inputs, targets })
}

/// One-hot encoding of `class` over `n_classes`, or `None` if out of range.
pub fn one_hot(class: usize, n_classes: usize) -> Option<Vec<f64>> {
    if class >= n_classes {
        return None;
    }
    let mut encoded = vec![0.0f64; n_classes];
    encoded[class] = 1.0;
    Some(encoded)
}

// Callers check the header length first.
fn read_be_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}
