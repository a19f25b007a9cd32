//! Texture data and device upload.

use crate::device::{DeviceResult, RenderDevice, TextureHandle};
use image::{DynamicImage, GenericImageView};

/// Decoded RGBA8 pixel data.
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub name: String,
}

impl TextureData {
    /// Decode texture data from an encoded image (png, jpeg, ...).
    pub fn from_bytes(bytes: &[u8], name: &str) -> Result<Self, String> {
        let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
        Ok(Self::from_image(img, name))
    }

    fn from_image(img: DynamicImage, name: &str) -> Self {
        let (width, height) = img.dimensions();
        let data = img.to_rgba8().into_raw();
        Self {
            width,
            height,
            data,
            name: name.to_string(),
        }
    }

    /// Create a 1x1 solid color texture.
    pub fn solid_color(color: [u8; 4], name: &str) -> Self {
        Self {
            width: 1,
            height: 1,
            data: color.to_vec(),
            name: name.to_string(),
        }
    }

    /// Create a default white texture.
    pub fn white() -> Self {
        Self::solid_color([255, 255, 255, 255], "white")
    }

    /// Create a checkerboard texture with 8 pixel cells.
    pub fn checkerboard(size: u32, color1: [u8; 4], color2: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity((size * size * 4) as usize);

        for y in 0..size {
            for x in 0..size {
                let is_even = ((x / 8) + (y / 8)) % 2 == 0;
                let color = if is_even { color1 } else { color2 };
                data.extend_from_slice(&color);
            }
        }

        Self {
            width: size,
            height: size,
            data,
            name: "checkerboard".to_string(),
        }
    }
}

/// Device texture created from [`TextureData`].
pub struct Texture {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
    pub name: String,
}

impl Texture {
    /// Upload texture data to the device.
    pub fn create<D: RenderDevice>(device: &mut D, data: &TextureData) -> DeviceResult<Self> {
        let handle = device.create_texture_rgba8(data.width, data.height, &data.data)?;
        Ok(Self {
            handle,
            width: data.width,
            height: data.height,
            name: data.name.clone(),
        })
    }

    /// Release the device texture.
    pub fn destroy<D: RenderDevice>(self, device: &mut D) {
        device.destroy_texture(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HeadlessDevice;

    #[test]
    fn test_solid_color_is_single_pixel() {
        let data = TextureData::solid_color([10, 20, 30, 255], "test");
        assert_eq!(data.width, 1);
        assert_eq!(data.height, 1);
        assert_eq!(data.data, vec![10, 20, 30, 255]);
    }

    #[test]
    fn test_checkerboard_dimensions() {
        let data = TextureData::checkerboard(32, [255, 255, 255, 255], [0, 0, 0, 255]);
        assert_eq!(data.width, 32);
        assert_eq!(data.height, 32);
        assert_eq!(data.data.len(), 32 * 32 * 4);
        // First cell uses color1, the cell 8 pixels over uses color2.
        assert_eq!(&data.data[0..4], &[255, 255, 255, 255]);
        let second_cell = (8 * 4) as usize;
        assert_eq!(&data.data[second_cell..second_cell + 4], &[0, 0, 0, 255]);
    }

    #[test]
    fn test_from_bytes_decodes_png() {
        let mut bytes = Vec::new();
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
        image::DynamicImage::ImageRgba8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageOutputFormat::Png,
            )
            .unwrap();

        let data = TextureData::from_bytes(&bytes, "decoded").unwrap();
        assert_eq!(data.width, 2);
        assert_eq!(data.height, 2);
        assert_eq!(&data.data[0..4], &[1, 2, 3, 255]);
    }

    #[test]
    fn test_create_uploads_to_device() {
        let mut device = HeadlessDevice::new();
        let texture = Texture::create(&mut device, &TextureData::white()).unwrap();
        assert_eq!(texture.width, 1);
        assert_eq!(device.live_texture_count(), 1);
        texture.destroy(&mut device);
        assert_eq!(device.live_texture_count(), 0);
    }
}
