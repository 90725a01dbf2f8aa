// GL textures and texture views

use super::call::GlCall;
use super::convert;
use super::shared::GlShared;
use crate::core::NativeHandle;
use crate::enums::{ImageLayout, TextureType};
use crate::error::{Error, Result};
use crate::flags::SampleCountFlag;
use crate::resource::{Texture, TextureInfo, TextureView, TextureViewInfo};

pub struct GlTexture<'d> {
    shared: &'d GlShared,
    initial_layout: ImageLayout,
    image: Option<(u32, TextureInfo)>,
}

impl<'d> GlTexture<'d> {
    pub fn new(shared: &'d GlShared, initial_layout: ImageLayout) -> Self {
        Self {
            shared,
            initial_layout,
            image: None,
        }
    }

    fn release_image(&mut self) {
        if let Some((name, _)) = self.image.take() {
            self.shared.release(GlCall::DeleteTexture(name));
        }
    }
}

/// The immutable storage call for a texture shape.
fn storage_call(texture: u32, format: u32, info: &TextureInfo) -> GlCall {
    let levels = info.mip_levels as i32;
    let (width, height, depth) = (
        info.extent.x as i32,
        info.extent.y as i32,
        info.extent.z as i32,
    );
    let layers = info.layer_count as i32;
    let multisampled = info.samples != SampleCountFlag::E1;
    let samples = info.samples.count() as i32;

    match info.texture_type {
        TextureType::E1D => GlCall::TextureStorage1D {
            texture,
            levels,
            format,
            width,
        },
        TextureType::E2D if multisampled => GlCall::TextureStorage2DMultisample {
            texture,
            samples,
            format,
            width,
            height,
        },
        // Cube faces are implied by the target.
        TextureType::E2D | TextureType::Cube => GlCall::TextureStorage2D {
            texture,
            levels,
            format,
            width,
            height,
        },
        TextureType::E1DArray => GlCall::TextureStorage2D {
            texture,
            levels,
            format,
            width,
            height: layers,
        },
        TextureType::E2DArray if multisampled => GlCall::TextureStorage3DMultisample {
            texture,
            samples,
            format,
            width,
            height,
            depth: layers,
        },
        TextureType::E2DArray | TextureType::CubeArray => GlCall::TextureStorage3D {
            texture,
            levels,
            format,
            width,
            height,
            depth: layers,
        },
        TextureType::E3D => GlCall::TextureStorage3D {
            texture,
            levels,
            format,
            width,
            height,
            depth,
        },
    }
}

impl Texture for GlTexture<'_> {
    fn info(&self) -> Option<&TextureInfo> {
        self.image.as_ref().map(|(_, info)| info)
    }

    fn initial_layout(&self) -> ImageLayout {
        self.initial_layout
    }

    fn native(&self) -> Option<NativeHandle> {
        self.image.as_ref().map(|(name, _)| NativeHandle::Gl(*name))
    }

    fn make_image(&mut self, info: TextureInfo) -> Result<()> {
        let format = convert::internal_format(info.format)?;
        self.release_image();

        let shared = self.shared;
        let _guard = shared.guard()?;
        let target = convert::texture_target(info.texture_type, info.samples);
        let name = shared.create(GlCall::CreateTexture { target })?;
        if let Err(e) = shared.call(storage_call(name, format, &info)) {
            shared.release(GlCall::DeleteTexture(name));
            return Err(e);
        }
        log::debug!(
            "Texture {}: {:?} {:?} {}x{}x{}, {} layers, {} levels",
            name,
            info.texture_type,
            info.format,
            info.extent.x,
            info.extent.y,
            info.extent.z,
            info.layer_count,
            info.mip_levels
        );
        self.image = Some((name, info));
        Ok(())
    }

    fn make_view(&self, info: TextureViewInfo) -> Result<Box<dyn TextureView + '_>> {
        let (texture, samples) = self
            .image
            .as_ref()
            .map(|(name, info)| (*name, info.samples))
            .ok_or_else(|| Error::precondition("Texture has no image yet"))?;
        let view = GlTextureView::new(self.shared, texture, samples, info)?;
        Ok(Box::new(view))
    }
}

impl Drop for GlTexture<'_> {
    fn drop(&mut self) {
        self.release_image();
    }
}

pub struct GlTextureView<'d> {
    shared: &'d GlShared,
    info: TextureViewInfo,
    texture: u32,
    name: u32,
}

impl<'d> GlTextureView<'d> {
    fn new(
        shared: &'d GlShared,
        texture: u32,
        samples: SampleCountFlag,
        info: TextureViewInfo,
    ) -> Result<Self> {
        let format = convert::internal_format(info.format)?;
        let _guard = shared.guard()?;
        let name = shared.create(GlCall::GenTexture)?;
        let view = Self {
            shared,
            info,
            texture,
            name,
        };
        let range = &info.subresource;
        shared.call(GlCall::TextureView {
            texture: name,
            target: convert::texture_target(info.view_type, samples),
            original: texture,
            format,
            min_level: range.base_mip_level,
            num_levels: range.level_count,
            min_layer: range.base_array_layer,
            num_layers: range.layer_count,
        })?;
        Ok(view)
    }
}

impl TextureView for GlTextureView<'_> {
    fn info(&self) -> &TextureViewInfo {
        &self.info
    }

    fn texture(&self) -> NativeHandle {
        NativeHandle::Gl(self.texture)
    }

    fn native(&self) -> NativeHandle {
        NativeHandle::Gl(self.name)
    }
}

impl Drop for GlTextureView<'_> {
    fn drop(&mut self) {
        self.shared.release(GlCall::DeleteTexture(self.name));
    }
}

/// The window's default framebuffer, seen as a texture view. GL names it 0.
pub struct GlDefaultView {
    info: TextureViewInfo,
}

impl GlDefaultView {
    pub fn new(info: TextureViewInfo) -> Self {
        Self { info }
    }
}

impl TextureView for GlDefaultView {
    fn info(&self) -> &TextureViewInfo {
        &self.info
    }

    fn texture(&self) -> NativeHandle {
        NativeHandle::Gl(0)
    }

    fn native(&self) -> NativeHandle {
        NativeHandle::Gl(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::PixelFormat;
    use glam::UVec2;

    #[test]
    fn array_layers_become_the_last_dimension() {
        let info = TextureInfo::new_2d_array(PixelFormat::R8G8B8A8, UVec2::new(64, 32), 5);
        match storage_call(3, 0x8058, &info) {
            GlCall::TextureStorage3D {
                width,
                height,
                depth,
                ..
            } => assert_eq!((width, height, depth), (64, 32, 5)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn multisampled_2d_storage_has_no_levels() {
        let info = TextureInfo::new_2d(PixelFormat::R8G8B8A8, UVec2::new(8, 8))
            .with_samples(SampleCountFlag::E4);
        assert!(matches!(
            storage_call(1, 0x8058, &info),
            GlCall::TextureStorage2DMultisample { samples: 4, .. }
        ));
    }
}
