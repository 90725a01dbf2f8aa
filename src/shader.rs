// Shader modules
//
// GL compiles source text, Vulkan loads SPIR-V. Each backend rejects the other's input with
// `Error::Unsupported`.

use crate::core::NativeHandle;
use crate::error::Result;
use crate::flags::ShaderStageFlags;

pub trait ShaderModule {
    /// Exactly one stage.
    fn stage(&self) -> ShaderStageFlags;

    /// Compiles GLSL source. Fails with a construction error carrying the compiler log.
    fn load_glsl(&mut self, source: &str) -> Result<()>;

    /// Loads a pre-compiled SPIR-V binary.
    fn load_spirv(&mut self, code: &[u32]) -> Result<()>;

    /// `None` until code is loaded.
    fn native(&self) -> Option<NativeHandle>;
}

/// Splits a compiler or linker log into lines worth reporting.
pub(crate) fn log_lines(log: &str) -> impl Iterator<Item = &str> {
    log.lines().map(str::trim_end).filter(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_log_lines_are_skipped() {
        let lines: Vec<_> = log_lines("0(3) : warning: unused\n\n  \n").collect();
        assert_eq!(lines, vec!["0(3) : warning: unused"]);
    }
}
