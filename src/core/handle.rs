// Backend object handles
//
// Objects of one backend reach each other's native objects through these raw values,
// never through downcasts.

use crate::error::{Error, Result};

/// Raw name of a backend object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeHandle {
    /// A GL object name.
    Gl(u32),
    /// A Vulkan non-dispatchable handle, as returned by `vk::Handle::as_raw`.
    Vulkan(u64),
}

impl NativeHandle {
    /// The GL name, or a foreign-object error naming `what`.
    pub fn gl(self, what: &'static str) -> Result<u32> {
        match self {
            Self::Gl(name) => Ok(name),
            Self::Vulkan(_) => Err(Error::ForeignObject(what)),
        }
    }

    /// The raw Vulkan handle, or a foreign-object error naming `what`.
    pub fn vulkan(self, what: &'static str) -> Result<u64> {
        match self {
            Self::Vulkan(raw) => Ok(raw),
            Self::Gl(_) => Err(Error::ForeignObject(what)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_refuse_the_other_backend() {
        assert_eq!(NativeHandle::Gl(7).gl("buffer").unwrap(), 7);
        assert!(matches!(
            NativeHandle::Gl(7).vulkan("buffer"),
            Err(Error::ForeignObject("buffer"))
        ));
        assert_eq!(NativeHandle::Vulkan(42).vulkan("image").unwrap(), 42);
    }
}
