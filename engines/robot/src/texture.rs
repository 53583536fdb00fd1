use robot_viewer_framework::{
    DeviceError, FilterMode, ImageSource, RenderDevice, SamplerSettings, TextureImage, WrapMode,
};
use tracing::{debug, error, info};

use crate::{error::AssetError, settings::TextureSettings};

/// The textures the scene is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    /// Tileable material covering every box part.
    Surface,
    /// 64×64 atlas mapped onto the head.
    Head,
}

impl TextureSlot {
    #[must_use]
    pub fn is_tileable(self) -> bool {
        matches!(self, Self::Surface)
    }

    #[must_use]
    pub fn url(self, settings: &TextureSettings) -> &str {
        match self {
            Self::Surface => &settings.surface,
            Self::Head => &settings.head,
        }
    }
}

/// RGBA8 pixels with the bottom row first, ready for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Decodes PNG or JPEG data.
    ///
    /// Images are stored top row first while texture coordinates start at the bottom, so the
    /// rows are flipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not a supported image.
    pub fn decode(url: &str, bytes: &[u8]) -> Result<Self, AssetError> {
        let image = image::load_from_memory(bytes).map_err(|error| AssetError::Decode {
            url: url.to_owned(),
            reason: error.to_string(),
        })?;
        let image = image.flipv().into_rgba8();
        Ok(Self {
            width: image.width(),
            height: image.height(),
            pixels: image.into_raw(),
        })
    }

    /// A single opaque white pixel.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![u8::MAX; 4],
        }
    }

    fn as_texture_image(&self) -> TextureImage<'_> {
        TextureImage {
            width: self.width,
            height: self.height,
            pixels: &self.pixels,
        }
    }

    #[must_use]
    pub fn is_power_of_two(&self) -> bool {
        self.width.is_power_of_two() && self.height.is_power_of_two()
    }
}

/// Sampler for an image of the given dimensions and whether mipmaps are to be generated.
///
/// Mipmap generation is undefined for non-power-of-two dimensions in WebGL 1, those images are
/// clamped and filtered linearly.
#[must_use]
pub fn sampler_for(image: &DecodedImage, tileable: bool) -> (SamplerSettings, bool) {
    if image.is_power_of_two() {
        let wrap = if tileable {
            WrapMode::Repeat
        } else {
            WrapMode::ClampToEdge
        };
        let sampler = SamplerSettings {
            wrap,
            min_filter: FilterMode::LinearMipmapLinear,
        };
        (sampler, true)
    } else {
        let sampler = SamplerSettings {
            wrap: WrapMode::ClampToEdge,
            min_filter: FilterMode::Linear,
        };
        (sampler, false)
    }
}

/// Replaces the content of `texture`, keeping its identity.
///
/// # Errors
///
/// Returns an error if the device refused the upload.
pub fn apply_image<D: RenderDevice>(
    device: &mut D,
    texture: &D::Texture,
    image: &DecodedImage,
    tileable: bool,
) -> Result<(), DeviceError> {
    device.upload_texture(texture, image.as_texture_image())?;
    let (sampler, mipmaps) = sampler_for(image, tileable);
    device.configure_sampler(texture, sampler);
    if mipmaps {
        device.generate_mipmaps(texture);
    }
    debug!(
        "uploaded {}x{} texture (mipmaps: {mipmaps})",
        image.width, image.height
    );
    Ok(())
}

/// Creates a texture showing the 1×1 white placeholder.
///
/// # Errors
///
/// Returns an error if the device cannot create textures at all.
pub fn create_placeholder<D: RenderDevice>(device: &mut D) -> Result<D::Texture, DeviceError> {
    let texture = device.create_texture()?;
    apply_image(device, &texture, &DecodedImage::placeholder(), false)?;
    Ok(texture)
}

/// Fetches and decodes a single image.
///
/// # Errors
///
/// Returns an error if the image cannot be fetched or decoded.
pub async fn fetch_image<S: ImageSource>(
    source: &S,
    url: &str,
) -> Result<DecodedImage, AssetError> {
    let bytes = source.fetch(url).await?;
    DecodedImage::decode(url, &bytes)
}

/// Loads the image shown by `slot`.
///
/// Never fails: an image that cannot be fetched or decoded is logged and resolves to `None`,
/// leaving the placeholder in place for good.
pub async fn load_texture<S: ImageSource>(
    source: &S,
    url: &str,
    slot: TextureSlot,
) -> Option<DecodedImage> {
    match fetch_image(source, url).await {
        Ok(image) => {
            info!("loaded {slot:?} texture from `{url}`");
            Some(image)
        }
        Err(error) => {
            error!("using placeholder for {slot:?}: {error}");
            None
        }
    }
}

/// Decoded images for every slot, `None` where loading failed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SceneImages {
    pub surface: Option<DecodedImage>,
    pub head: Option<DecodedImage>,
}

impl SceneImages {
    /// Fetches all scene images. Failures are logged and leave the slot empty.
    pub async fn fetch<S: ImageSource>(source: &S, settings: &TextureSettings) -> Self {
        let mut images = Self::default();
        for slot in [TextureSlot::Surface, TextureSlot::Head] {
            *images.get_mut(slot) = load_texture(source, slot.url(settings), slot).await;
        }
        images
    }

    fn get_mut(&mut self, slot: TextureSlot) -> &mut Option<DecodedImage> {
        match slot {
            TextureSlot::Surface => &mut self.surface,
            TextureSlot::Head => &mut self.head,
        }
    }

    #[must_use]
    pub fn get(&self, slot: TextureSlot) -> Option<&DecodedImage> {
        match slot {
            TextureSlot::Surface => self.surface.as_ref(),
            TextureSlot::Head => self.head.as_ref(),
        }
    }
}

/// One texture object per slot, created during setup and never replaced.
pub struct SceneTextures<D: RenderDevice> {
    pub surface: D::Texture,
    pub head: D::Texture,
}

impl<D: RenderDevice> SceneTextures<D> {
    /// Creates placeholder textures for every slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot create textures.
    pub fn new(device: &mut D) -> Result<Self, DeviceError> {
        Ok(Self {
            surface: create_placeholder(device)?,
            head: create_placeholder(device)?,
        })
    }

    #[must_use]
    pub fn get(&self, slot: TextureSlot) -> &D::Texture {
        match slot {
            TextureSlot::Surface => &self.surface,
            TextureSlot::Head => &self.head,
        }
    }

    /// Uploads the loaded images. Slots without an image keep showing the placeholder.
    pub fn install(&self, device: &mut D, images: &SceneImages) {
        for slot in [TextureSlot::Surface, TextureSlot::Head] {
            let Some(image) = images.get(slot) else {
                continue;
            };
            if let Err(error) = apply_image(device, self.get(slot), image, slot.is_tileable()) {
                error!("keeping placeholder for {slot:?}: {error}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgba, RgbaImage};
    use robot_viewer_framework::{MemoryImageSource, RecordingDevice};

    use super::*;

    fn png(width: u32, height: u32, top: [u8; 4], rest: [u8; 4]) -> Vec<u8> {
        let image = RgbaImage::from_fn(width, height, |_, y| {
            if y == 0 {
                Rgba(top)
            } else {
                Rgba(rest)
            }
        });
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decoding_flips_rows() {
        let red = [255, 0, 0, 255];
        let blue = [0, 0, 255, 255];
        let image = DecodedImage::decode("two.png", &png(1, 2, red, blue)).unwrap();

        assert_eq!((image.width, image.height), (1, 2));
        assert_eq!(image.pixels, [blue, red].concat());
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            DecodedImage::decode("broken.png", b"not an image"),
            Err(AssetError::Decode { .. })
        ));
    }

    #[test]
    fn sampler_depends_on_dimensions_and_tiling() {
        let white = [255; 4];
        let square = DecodedImage::decode("a.png", &png(64, 64, white, white)).unwrap();
        let odd = DecodedImage::decode("b.png", &png(60, 64, white, white)).unwrap();

        let (sampler, mipmaps) = sampler_for(&square, true);
        assert!(mipmaps);
        assert_eq!(sampler.wrap, WrapMode::Repeat);
        assert_eq!(sampler.min_filter, FilterMode::LinearMipmapLinear);

        let (sampler, mipmaps) = sampler_for(&square, false);
        assert!(mipmaps);
        assert_eq!(sampler.wrap, WrapMode::ClampToEdge);

        let (sampler, mipmaps) = sampler_for(&odd, true);
        assert!(!mipmaps);
        assert_eq!(sampler.wrap, WrapMode::ClampToEdge);
        assert_eq!(sampler.min_filter, FilterMode::Linear);
    }

    #[test]
    fn missing_asset_resolves_with_placeholder() {
        let mut device = RecordingDevice::new((600, 600));
        let textures = SceneTextures::new(&mut device).unwrap();
        let source = MemoryImageSource::new();

        let surface = TextureSlot::Surface;
        let image = pollster::block_on(load_texture(&source, "textures/nowhere.png", surface));
        assert_eq!(image, None);

        let images = SceneImages {
            surface: image,
            head: None,
        };
        textures.install(&mut device, &images);

        let record = device.texture(textures.surface).unwrap();
        assert_eq!((record.width, record.height), (1, 1));
        assert_eq!(record.pixels, vec![255; 4]);
        assert!(device.is_texture(&textures.surface));
    }

    #[test]
    fn available_asset_is_decoded() {
        let url = "textures/head.png";
        let mut source = MemoryImageSource::new();
        source.insert(url, png(64, 64, [255; 4], [0; 4]));

        let head = pollster::block_on(load_texture(&source, url, TextureSlot::Head));

        let head = head.unwrap();
        assert_eq!((head.width, head.height), (64, 64));
        assert!(head.is_power_of_two());
    }

    #[test]
    fn loaded_asset_replaces_content_not_identity() {
        let mut device = RecordingDevice::new((600, 600));
        let textures = SceneTextures::new(&mut device).unwrap();
        let white = [255; 4];

        let mut source = MemoryImageSource::new();
        let settings = TextureSettings::default();
        source.insert(&settings.surface, png(16, 16, white, white));
        source.insert(&settings.head, b"corrupt".to_vec());

        let images = pollster::block_on(SceneImages::fetch(&source, &settings));
        assert!(images.surface.is_some());
        assert!(images.head.is_none());

        textures.install(&mut device, &images);

        let surface = device.texture(textures.surface).unwrap();
        assert_eq!((surface.width, surface.height), (16, 16));
        assert!(surface.mipmaps);
        assert_eq!(
            surface.sampler.map(|sampler| sampler.wrap),
            Some(WrapMode::Repeat)
        );

        let head = device.texture(textures.head).unwrap();
        assert_eq!((head.width, head.height), (1, 1));
    }
}
