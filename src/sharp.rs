//! Host-side resource descriptors ("sharps").
//!
//! These mirror the 128/256-bit descriptor words the driver binds for the
//! shader: V# for buffers, S# for samplers, T# for images. The translator
//! borrows them read-only while declaring the shader interface; only the V#
//! stride participates in uniform-buffer layout for now.

/// V# buffer resource descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSharp {
    /// Base address of the buffer in guest memory.
    pub base: u64,
    /// Record stride in bytes.
    pub stride: u32,
    /// Number of records in the buffer.
    pub num_records: u32,
    /// Raw data-format field; unused until typed buffer loads land.
    pub format: u32,
}

/// S# sampler resource descriptor. Not consumed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SamplerSharp {
    pub raw: [u32; 4],
}

/// T# image resource descriptor. Not consumed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureSharp {
    pub raw: [u32; 8],
}
