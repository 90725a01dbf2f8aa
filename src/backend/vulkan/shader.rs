// Vulkan shader modules: SPIR-V only

use anyhow::Context;
use ash::vk;

use super::convert;
use super::shared::VulkanShared;
use crate::core::NativeHandle;
use crate::error::{Error, Result};
use crate::flags::ShaderStageFlags;
use crate::shader::ShaderModule;

pub struct VulkanShaderModule<'d> {
    shared: &'d VulkanShared,
    stage: ShaderStageFlags,
    module: Option<vk::ShaderModule>,
}

impl<'d> VulkanShaderModule<'d> {
    pub fn new(shared: &'d VulkanShared, stage: ShaderStageFlags) -> Result<Self> {
        if stage.bits().count_ones() != 1 {
            return Err(Error::precondition(format!(
                "Shader module stage {stage:?} is not a single stage"
            )));
        }
        Ok(Self {
            shared,
            stage,
            module: None,
        })
    }
}

impl ShaderModule for VulkanShaderModule<'_> {
    fn stage(&self) -> ShaderStageFlags {
        self.stage
    }

    fn load_glsl(&mut self, _source: &str) -> Result<()> {
        Err(Error::Unsupported(
            "Vulkan shader modules load SPIR-V, not GLSL source".to_string(),
        ))
    }

    fn load_spirv(&mut self, code: &[u32]) -> Result<()> {
        if code.is_empty() {
            return Err(Error::construction("Shader module", "SPIR-V code is empty"));
        }
        let create_info = vk::ShaderModuleCreateInfo::builder().code(code);
        let module = unsafe { self.shared.device.create_shader_module(&create_info, None) }
            .with_context(|| format!("Failed to create {:?} shader module", self.stage))?;

        if let Some(previous) = self.module.replace(module) {
            unsafe { self.shared.device.destroy_shader_module(previous, None) };
        }
        log::debug!("Loaded {} SPIR-V words for {:?}", code.len(), self.stage);
        Ok(())
    }

    fn native(&self) -> Option<NativeHandle> {
        self.module.map(convert::native)
    }
}

impl Drop for VulkanShaderModule<'_> {
    fn drop(&mut self) {
        if let Some(module) = self.module {
            unsafe { self.shared.device.destroy_shader_module(module, None) };
        }
    }
}
