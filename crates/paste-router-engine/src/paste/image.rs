//! Image paste and media UI collaborators

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use log::warn;

use crate::clipboard::{ClipboardData, ClipboardItem};
use crate::editing::{Block, BlockKind};

/// An image ready to be inserted as a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    /// URL the image is loaded from (possibly a `data:` URL)
    pub src: String,
    pub mime: String,
    /// Size of the original image data in bytes
    pub byte_len: usize,
}

impl ImageDescriptor {
    pub fn to_block(&self) -> Block {
        Block::atom(BlockKind::Image {
            src: self.src.clone(),
            mime: self.mime.clone(),
        })
    }
}

/// Reads pasted image data
pub trait ImagePasteHandler {
    fn read_image(&self, item: &ClipboardItem) -> Option<ImageDescriptor>;
}

/// Inlines pasted images as base64 `data:` URLs
#[derive(Debug, Clone, Default)]
pub struct DataUrlImageHandler {
    max_bytes: Option<usize>,
}

impl DataUrlImageHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse images larger than `max_bytes`
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }
}

impl ImagePasteHandler for DataUrlImageHandler {
    fn read_image(&self, item: &ClipboardItem) -> Option<ImageDescriptor> {
        let ClipboardData::Bytes { bytes } = &item.data else {
            return None;
        };
        if !item.mime.starts_with("image/") || bytes.is_empty() {
            return None;
        }
        if let Some(max) = self.max_bytes.filter(|max| bytes.len() > *max) {
            warn!(
                "Pasted {} image is {} bytes, over the {} byte limit",
                item.mime,
                bytes.len(),
                max
            );
            return None;
        }

        Some(ImageDescriptor {
            src: format!("data:{};base64,{}", item.mime, BASE64.encode(bytes)),
            mime: item.mime.clone(),
            byte_len: bytes.len(),
        })
    }
}

/// Wires up media drag/resize behavior once per editor
///
/// The dispatcher calls `initialize` on mount and `teardown` on unmount;
/// each is called at most once per mount.
pub trait MediaUiInitializer {
    fn initialize(&mut self);
    fn teardown(&mut self);
}

/// For hosts without media UI
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMediaUi;

impl MediaUiInitializer for NoMediaUi {
    fn initialize(&mut self) {}
    fn teardown(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G'];

    #[test]
    fn test_png_becomes_data_url() {
        let item = ClipboardItem::bytes("image/png", PNG_HEADER.to_vec());
        let image = DataUrlImageHandler::new().read_image(&item).unwrap();

        assert_eq!(image.src, "data:image/png;base64,iVBORw==");
        assert_eq!(image.mime, "image/png");
        assert_eq!(image.byte_len, 4);
    }

    #[test]
    fn test_descriptor_to_block() {
        let image = ImageDescriptor {
            src: "data:image/gif;base64,R0lG".to_string(),
            mime: "image/gif".to_string(),
            byte_len: 3,
        };

        let block = image.to_block();
        assert!(block.kind.is_atom());
        assert_eq!(block.kind.label(), "image(image/gif)");
    }

    #[test]
    fn test_non_image_items_are_ignored() {
        let handler = DataUrlImageHandler::new();

        assert_eq!(handler.read_image(&ClipboardItem::text("image/png", "nope")), None);
        assert_eq!(
            handler.read_image(&ClipboardItem::bytes("application/pdf", vec![1])),
            None
        );
        assert_eq!(handler.read_image(&ClipboardItem::bytes("image/png", vec![])), None);
    }

    #[test]
    fn test_size_limit() {
        let item = ClipboardItem::bytes("image/png", PNG_HEADER.to_vec());

        assert_eq!(DataUrlImageHandler::new().with_max_bytes(3).read_image(&item), None);
        assert!(DataUrlImageHandler::new().with_max_bytes(4).read_image(&item).is_some());
    }
}
