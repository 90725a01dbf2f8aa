// Textures and texture views
//
// A texture has no storage until `set_image` fixes its format, dimensionality, extent, layer
// count, mip level count and sample count. Calling it again releases the previous storage and
// builds a new one. Views borrow their texture, so storage cannot be replaced while one exists.

use glam::{UVec2, UVec3};

use crate::core::NativeHandle;
use crate::enums::{ImageLayout, ImageTiling, PixelFormat, TextureType};
use crate::error::{Error, Result};
use crate::flags::{ImageAspectFlags, ImageUsageFlags, MemoryPropertyFlags, SampleCountFlag};

/// Everything `set_image` fixes about a texture's storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    pub format: PixelFormat,
    pub texture_type: TextureType,
    /// Unused dimensions are 1.
    pub extent: UVec3,
    pub layer_count: u32,
    pub mip_levels: u32,
    pub samples: SampleCountFlag,
    pub usage: ImageUsageFlags,
    pub tiling: ImageTiling,
    pub memory_flags: MemoryPropertyFlags,
}

impl TextureInfo {
    fn with_shape(format: PixelFormat, texture_type: TextureType, extent: UVec3, layers: u32) -> Self {
        let usage = if format.is_depth_or_stencil_format() {
            ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT | ImageUsageFlags::SAMPLED
        } else {
            ImageUsageFlags::COLOUR_ATTACHMENT
                | ImageUsageFlags::SAMPLED
                | ImageUsageFlags::TRANSFER_DST
        };
        Self {
            format,
            texture_type,
            extent,
            layer_count: layers,
            mip_levels: 1,
            samples: SampleCountFlag::E1,
            usage,
            tiling: ImageTiling::Optimal,
            memory_flags: MemoryPropertyFlags::DEVICE_LOCAL,
        }
    }

    pub fn new_1d(format: PixelFormat, width: u32) -> Self {
        Self::with_shape(format, TextureType::E1D, UVec3::new(width, 1, 1), 1)
    }

    pub fn new_2d(format: PixelFormat, size: UVec2) -> Self {
        Self::with_shape(format, TextureType::E2D, size.extend(1), 1)
    }

    pub fn new_3d(format: PixelFormat, size: UVec3) -> Self {
        Self::with_shape(format, TextureType::E3D, size, 1)
    }

    pub fn new_cube(format: PixelFormat, size: u32) -> Self {
        Self::with_shape(format, TextureType::Cube, UVec3::new(size, size, 1), 6)
    }

    pub fn new_1d_array(format: PixelFormat, width: u32, layers: u32) -> Self {
        Self::with_shape(format, TextureType::E1DArray, UVec3::new(width, 1, 1), layers)
    }

    pub fn new_2d_array(format: PixelFormat, size: UVec2, layers: u32) -> Self {
        Self::with_shape(format, TextureType::E2DArray, size.extend(1), layers)
    }

    pub fn with_mip_levels(mut self, mip_levels: u32) -> Self {
        self.mip_levels = mip_levels;
        self
    }

    /// Mip levels down to 1x1.
    pub fn with_full_mip_chain(mut self) -> Self {
        self.mip_levels = self.max_mip_levels();
        self
    }

    pub fn with_samples(mut self, samples: SampleCountFlag) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_usage(mut self, usage: ImageUsageFlags) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_tiling(mut self, tiling: ImageTiling) -> Self {
        self.tiling = tiling;
        self
    }

    pub fn with_memory_flags(mut self, memory_flags: MemoryPropertyFlags) -> Self {
        self.memory_flags = memory_flags;
        self
    }

    pub fn max_mip_levels(&self) -> u32 {
        let largest = self.extent.max_element().max(1);
        u32::BITS - largest.leading_zeros()
    }

    /// Extent of mip level `level`. No dimension drops below 1.
    pub fn mip_extent(&self, level: u32) -> UVec3 {
        (self.extent >> level.min(31)).max(UVec3::ONE)
    }

    /// The whole texture: every mip level and layer.
    pub fn full_subresource_range(&self) -> ImageSubresourceRange {
        ImageSubresourceRange {
            aspect_mask: self.format.aspect_mask(),
            base_mip_level: 0,
            level_count: self.mip_levels,
            base_array_layer: 0,
            layer_count: self.layer_count,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| Err(Error::precondition(reason));

        if self.format == PixelFormat::Undefined {
            return fail("Texture format is undefined".to_string());
        }
        if self.extent.min_element() == 0 {
            return fail(format!("Texture extent {} has an empty dimension", self.extent));
        }

        let flat_y = self.extent.y == 1;
        let flat_z = self.extent.z == 1;
        let layers = self.layer_count;
        let shape_ok = match self.texture_type {
            TextureType::E1D => flat_y && flat_z && layers == 1,
            TextureType::E2D => flat_z && layers == 1,
            TextureType::E3D => layers == 1,
            TextureType::Cube => flat_z && self.extent.x == self.extent.y && layers == 6,
            TextureType::E1DArray => flat_y && flat_z && layers >= 1,
            TextureType::E2DArray => flat_z && layers >= 1,
            TextureType::CubeArray => {
                flat_z && self.extent.x == self.extent.y && layers >= 6 && layers % 6 == 0
            }
        };
        if !shape_ok {
            return fail(format!(
                "{:?} texture cannot have extent {} with {} layers",
                self.texture_type, self.extent, layers
            ));
        }

        if self.mip_levels == 0 || self.mip_levels > self.max_mip_levels() {
            return fail(format!(
                "{} mip levels requested, extent {} allows 1..={}",
                self.mip_levels,
                self.extent,
                self.max_mip_levels()
            ));
        }

        if self.samples != SampleCountFlag::E1 {
            let multisampled_type =
                matches!(self.texture_type, TextureType::E2D | TextureType::E2DArray);
            if !multisampled_type || self.mip_levels != 1 {
                return fail(format!(
                    "{:?} texture with {} mip levels cannot be multisampled",
                    self.texture_type, self.mip_levels
                ));
            }
        }

        Ok(())
    }
}

/// A selected slice of a texture's mip levels and layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSubresourceRange {
    pub aspect_mask: ImageAspectFlags,
    pub base_mip_level: u32,
    pub level_count: u32,
    pub base_array_layer: u32,
    pub layer_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureViewInfo {
    pub view_type: TextureType,
    pub format: PixelFormat,
    pub subresource: ImageSubresourceRange,
}

impl TextureViewInfo {
    /// Checks the view against the texture it looks into.
    pub fn validate(&self, texture: &TextureInfo) -> Result<()> {
        let range = &self.subresource;
        let levels_end = range.base_mip_level.checked_add(range.level_count);
        let layers_end = range.base_array_layer.checked_add(range.layer_count);

        if range.level_count == 0 || levels_end.map_or(true, |end| end > texture.mip_levels) {
            return Err(Error::precondition(format!(
                "View mip levels {}+{} exceed the texture's {}",
                range.base_mip_level, range.level_count, texture.mip_levels
            )));
        }
        if range.layer_count == 0 || layers_end.map_or(true, |end| end > texture.layer_count) {
            return Err(Error::precondition(format!(
                "View layers {}+{} exceed the texture's {}",
                range.base_array_layer, range.layer_count, texture.layer_count
            )));
        }

        let layers_ok = match self.view_type {
            TextureType::E1D | TextureType::E2D | TextureType::E3D => range.layer_count == 1,
            TextureType::Cube => range.layer_count == 6,
            TextureType::CubeArray => range.layer_count % 6 == 0,
            TextureType::E1DArray | TextureType::E2DArray => true,
        };
        let type_ok = match texture.texture_type {
            TextureType::E1D | TextureType::E1DArray => {
                matches!(self.view_type, TextureType::E1D | TextureType::E1DArray)
            }
            TextureType::E3D => self.view_type == TextureType::E3D,
            TextureType::E2D | TextureType::E2DArray => {
                matches!(self.view_type, TextureType::E2D | TextureType::E2DArray)
            }
            TextureType::Cube | TextureType::CubeArray => !matches!(
                self.view_type,
                TextureType::E1D | TextureType::E1DArray | TextureType::E3D
            ),
        };
        if !layers_ok || !type_ok {
            return Err(Error::precondition(format!(
                "{:?} view with {} layers does not fit a {:?} texture",
                self.view_type, range.layer_count, texture.texture_type
            )));
        }

        if self.format.aspect_mask() != texture.format.aspect_mask() {
            return Err(Error::precondition(format!(
                "View format {:?} is not compatible with {:?}",
                self.format, texture.format
            )));
        }

        Ok(())
    }
}

pub trait Texture {
    /// `None` until `set_image` succeeds.
    fn info(&self) -> Option<&TextureInfo>;

    fn initial_layout(&self) -> ImageLayout;

    /// `None` until `set_image` succeeds.
    fn native(&self) -> Option<NativeHandle>;

    /// Backend hook: releases any previous storage and allocates storage for `info`.
    fn make_image(&mut self, info: TextureInfo) -> Result<()>;

    /// Backend hook: `info` is already validated against this texture.
    fn make_view(&self, info: TextureViewInfo) -> Result<Box<dyn TextureView + '_>>;

    fn set_image(&mut self, info: TextureInfo) -> Result<()> {
        info.validate()?;
        self.make_image(info)
    }

    fn set_image_1d(&mut self, format: PixelFormat, width: u32, usage: ImageUsageFlags) -> Result<()> {
        self.set_image(TextureInfo::new_1d(format, width).with_usage(usage))
    }

    fn set_image_2d(&mut self, format: PixelFormat, size: UVec2, usage: ImageUsageFlags) -> Result<()> {
        self.set_image(TextureInfo::new_2d(format, size).with_usage(usage))
    }

    fn set_image_3d(&mut self, format: PixelFormat, size: UVec3, usage: ImageUsageFlags) -> Result<()> {
        self.set_image(TextureInfo::new_3d(format, size).with_usage(usage))
    }

    fn set_image_cube(&mut self, format: PixelFormat, size: u32, usage: ImageUsageFlags) -> Result<()> {
        self.set_image(TextureInfo::new_cube(format, size).with_usage(usage))
    }

    fn set_image_1d_array(
        &mut self,
        format: PixelFormat,
        width: u32,
        layers: u32,
        usage: ImageUsageFlags,
    ) -> Result<()> {
        self.set_image(TextureInfo::new_1d_array(format, width, layers).with_usage(usage))
    }

    fn set_image_2d_array(
        &mut self,
        format: PixelFormat,
        size: UVec2,
        layers: u32,
        usage: ImageUsageFlags,
    ) -> Result<()> {
        self.set_image(TextureInfo::new_2d_array(format, size, layers).with_usage(usage))
    }

    fn create_view(
        &self,
        view_type: TextureType,
        format: PixelFormat,
        base_mip_level: u32,
        level_count: u32,
        base_array_layer: u32,
        layer_count: u32,
    ) -> Result<Box<dyn TextureView + '_>> {
        let texture = self
            .info()
            .ok_or_else(|| Error::precondition("Texture has no image yet"))?;
        let info = TextureViewInfo {
            view_type,
            format,
            subresource: ImageSubresourceRange {
                aspect_mask: format.aspect_mask(),
                base_mip_level,
                level_count,
                base_array_layer,
                layer_count,
            },
        };
        info.validate(texture)?;
        self.make_view(info)
    }

    /// A view over the whole texture with its own type and format.
    fn create_default_view(&self) -> Result<Box<dyn TextureView + '_>> {
        let texture = self
            .info()
            .ok_or_else(|| Error::precondition("Texture has no image yet"))?;
        let (view_type, format, levels, layers) = (
            texture.texture_type,
            texture.format,
            texture.mip_levels,
            texture.layer_count,
        );
        self.create_view(view_type, format, 0, levels, 0, layers)
    }
}

/// A look into a subresource range of a texture.
pub trait TextureView {
    fn info(&self) -> &TextureViewInfo;

    /// The texture looked into.
    fn texture(&self) -> NativeHandle;

    fn native(&self) -> NativeHandle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_mip_chain_reaches_one_texel() {
        let info = TextureInfo::new_2d(PixelFormat::R8G8B8A8, UVec2::new(256, 64)).with_full_mip_chain();
        assert_eq!(info.mip_levels, 9);
        assert!(info.validate().is_ok());
        assert!(info.clone().with_mip_levels(10).validate().is_err());
        assert_eq!(info.mip_extent(2), UVec3::new(64, 16, 1));
        assert_eq!(info.mip_extent(8), UVec3::ONE);
    }

    #[test]
    fn shapes_are_checked() {
        assert!(TextureInfo::new_cube(PixelFormat::R8G8B8A8, 32).validate().is_ok());
        let mut cube = TextureInfo::new_cube(PixelFormat::R8G8B8A8, 32);
        cube.extent.y = 16;
        assert!(cube.validate().is_err());
        assert!(TextureInfo::new_2d(PixelFormat::Undefined, UVec2::ONE).validate().is_err());
        assert!(TextureInfo::new_1d(PixelFormat::R8, 0).validate().is_err());
    }

    #[test]
    fn only_single_level_2d_textures_are_multisampled() {
        let size = UVec2::new(64, 64);
        let ms = TextureInfo::new_2d(PixelFormat::R8G8B8A8, size).with_samples(SampleCountFlag::E4);
        assert!(ms.validate().is_ok());
        assert!(ms.clone().with_mip_levels(2).validate().is_err());
        assert!(TextureInfo::new_3d(PixelFormat::R8, UVec3::splat(4))
            .with_samples(SampleCountFlag::E4)
            .validate()
            .is_err());
    }

    #[test]
    fn views_stay_inside_their_texture() {
        let texture = TextureInfo::new_2d_array(PixelFormat::R8G8B8A8, UVec2::new(16, 16), 4)
            .with_mip_levels(3);
        let view = |view_type, level, levels, layer, layers| TextureViewInfo {
            view_type,
            format: PixelFormat::R8G8B8A8,
            subresource: ImageSubresourceRange {
                aspect_mask: ImageAspectFlags::COLOUR,
                base_mip_level: level,
                level_count: levels,
                base_array_layer: layer,
                layer_count: layers,
            },
        };

        assert!(view(TextureType::E2D, 2, 1, 3, 1).validate(&texture).is_ok());
        assert!(view(TextureType::E2DArray, 0, 3, 0, 4).validate(&texture).is_ok());
        assert!(view(TextureType::E2D, 2, 2, 0, 1).validate(&texture).is_err());
        assert!(view(TextureType::E2D, 0, 1, 0, 2).validate(&texture).is_err());
        assert!(view(TextureType::E3D, 0, 1, 0, 1).validate(&texture).is_err());
    }
}
