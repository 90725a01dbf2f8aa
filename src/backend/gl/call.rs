// GL calls as values
//
// Every GL entry point the backend uses is one `GlCall` variant. A `GlContext` executes them,
// which keeps the backend free of ambient global state and lets tests record the exact call
// stream. Entry points follow the GL 4.5 direct-state-access names.

/// One GL entry point with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    // Fixed-function state
    Enable(u32),
    Disable(u32),
    ClipControl { origin: u32, depth: u32 },
    LogicOp(u32),
    BlendColor([f32; 4]),
    BlendEquationSeparatei { buffer: u32, rgb: u32, alpha: u32 },
    BlendFuncSeparatei { buffer: u32, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32 },
    ColorMaski { buffer: u32, mask: [bool; 4] },
    DepthFunc(u32),
    DepthMask(bool),
    DepthBounds { min: f64, max: f64 },
    StencilFuncSeparate { face: u32, func: u32, reference: i32, mask: u32 },
    StencilOpSeparate { face: u32, sfail: u32, dpfail: u32, dppass: u32 },
    StencilMaskSeparate { face: u32, mask: u32 },
    SampleMaski { index: u32, mask: u32 },
    MinSampleShading(f32),
    PolygonMode { face: u32, mode: u32 },
    CullFace(u32),
    FrontFace(u32),
    PolygonOffset { factor: f32, units: f32 },
    PolygonOffsetClamp { factor: f32, units: f32, clamp: f32 },
    LineWidth(f32),
    PatchParameteri { pname: u32, value: i32 },
    ViewportIndexedf { index: u32, x: f32, y: f32, width: f32, height: f32 },
    DepthRangeIndexed { index: u32, near: f64, far: f64 },
    ScissorIndexed { index: u32, x: i32, y: i32, width: i32, height: i32 },

    // Buffers
    CreateBuffer,
    NamedBufferStorage { buffer: u32, size: u64, flags: u32 },
    NamedBufferSubData { buffer: u32, offset: u64, data: Vec<u8> },
    GetNamedBufferSubData { buffer: u32, offset: u64, size: u64 },
    BindBufferRange { target: u32, index: u32, buffer: u32, offset: u64, size: u64 },
    BindBuffer { target: u32, buffer: u32 },
    CopyNamedBufferSubData { read: u32, write: u32, read_offset: u64, write_offset: u64, size: u64 },
    DeleteBuffer(u32),

    // Vertex arrays
    CreateVertexArray,
    BindVertexArray(u32),
    VertexArrayVertexBuffer { vao: u32, binding: u32, buffer: u32, offset: u64, stride: u32 },
    VertexArrayElementBuffer { vao: u32, buffer: u32 },
    VertexArrayAttribFormat { vao: u32, attrib: u32, size: i32, ty: u32, normalized: bool, offset: u32 },
    VertexArrayAttribIFormat { vao: u32, attrib: u32, size: i32, ty: u32, offset: u32 },
    VertexArrayAttribBinding { vao: u32, attrib: u32, binding: u32 },
    VertexArrayBindingDivisor { vao: u32, binding: u32, divisor: u32 },
    EnableVertexArrayAttrib { vao: u32, attrib: u32 },
    DisableVertexArrayAttrib { vao: u32, attrib: u32 },
    DeleteVertexArray(u32),

    // Textures
    CreateTexture { target: u32 },
    /// A bare name, as `glTextureView` requires.
    GenTexture,
    TextureStorage1D { texture: u32, levels: i32, format: u32, width: i32 },
    TextureStorage2D { texture: u32, levels: i32, format: u32, width: i32, height: i32 },
    TextureStorage3D { texture: u32, levels: i32, format: u32, width: i32, height: i32, depth: i32 },
    TextureStorage2DMultisample { texture: u32, samples: i32, format: u32, width: i32, height: i32 },
    TextureStorage3DMultisample {
        texture: u32,
        samples: i32,
        format: u32,
        width: i32,
        height: i32,
        depth: i32,
    },
    TextureView {
        texture: u32,
        target: u32,
        original: u32,
        format: u32,
        min_level: u32,
        num_levels: u32,
        min_layer: u32,
        num_layers: u32,
    },
    TextureBufferRange { texture: u32, format: u32, buffer: u32, offset: u64, size: u64 },
    PixelStorei { pname: u32, value: i32 },
    /// `offset` points into the bound pixel unpack buffer, as do the other sub-image uploads.
    TextureSubImage1D { texture: u32, level: i32, x: i32, width: i32, format: u32, ty: u32, offset: u64 },
    TextureSubImage2D {
        texture: u32,
        level: i32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        offset: u64,
    },
    TextureSubImage3D {
        texture: u32,
        level: i32,
        x: i32,
        y: i32,
        z: i32,
        width: i32,
        height: i32,
        depth: i32,
        format: u32,
        ty: u32,
        offset: u64,
    },
    CompressedTextureSubImage2D {
        texture: u32,
        level: i32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        size: i32,
        offset: u64,
    },
    CompressedTextureSubImage3D {
        texture: u32,
        level: i32,
        x: i32,
        y: i32,
        z: i32,
        width: i32,
        height: i32,
        depth: i32,
        format: u32,
        size: i32,
        offset: u64,
    },
    BindTextureUnit { unit: u32, texture: u32 },
    BindImageTexture { unit: u32, texture: u32, level: i32, layered: bool, layer: i32, access: u32, format: u32 },
    DeleteTexture(u32),

    // Samplers
    CreateSampler,
    SamplerParameteri { sampler: u32, pname: u32, value: i32 },
    SamplerParameterf { sampler: u32, pname: u32, value: f32 },
    SamplerParameterfv { sampler: u32, pname: u32, value: [f32; 4] },
    SamplerParameterIiv { sampler: u32, pname: u32, value: [i32; 4] },
    BindSampler { unit: u32, sampler: u32 },
    DeleteSampler(u32),

    // Framebuffers
    CreateFramebuffer,
    NamedFramebufferTexture { framebuffer: u32, attachment: u32, texture: u32, level: i32 },
    NamedFramebufferTextureLayer { framebuffer: u32, attachment: u32, texture: u32, level: i32, layer: i32 },
    NamedFramebufferDrawBuffers { framebuffer: u32, buffers: Vec<u32> },
    NamedFramebufferReadBuffer { framebuffer: u32, buffer: u32 },
    CheckNamedFramebufferStatus { framebuffer: u32, target: u32 },
    BindFramebuffer { target: u32, framebuffer: u32 },
    ClearNamedFramebufferfv { framebuffer: u32, buffer: u32, draw_buffer: i32, value: [f32; 4] },
    ClearNamedFramebufferiv { framebuffer: u32, buffer: u32, draw_buffer: i32, value: [i32; 4] },
    ClearNamedFramebufferfi { framebuffer: u32, buffer: u32, draw_buffer: i32, depth: f32, stencil: i32 },
    BlitNamedFramebuffer {
        read: u32,
        draw: u32,
        src: [i32; 4],
        dst: [i32; 4],
        mask: u32,
        filter: u32,
    },
    InvalidateNamedFramebufferData { framebuffer: u32, attachments: Vec<u32> },
    DeleteFramebuffer(u32),
    TextureBarrier,
    MemoryBarrier(u32),

    // Shaders and programs
    CreateShader(u32),
    ShaderSource { shader: u32, source: String },
    ShaderBinary { shader: u32, format: u32, binary: Vec<u8> },
    SpecializeShader { shader: u32, entry_point: String },
    CompileShader(u32),
    GetShaderiv { shader: u32, pname: u32 },
    GetShaderInfoLog(u32),
    DeleteShader(u32),
    CreateProgram,
    ProgramParameteri { program: u32, pname: u32, value: i32 },
    AttachShader { program: u32, shader: u32 },
    DetachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    GetProgramiv { program: u32, pname: u32 },
    GetProgramInfoLog(u32),
    DeleteProgram(u32),
    CreateProgramPipeline,
    UseProgramStages { pipeline: u32, stages: u32, program: u32 },
    ValidateProgramPipeline(u32),
    GetProgramPipelineiv { pipeline: u32, pname: u32 },
    GetProgramPipelineInfoLog(u32),
    BindProgramPipeline(u32),
    DeleteProgramPipeline(u32),

    // Drawing
    DrawArraysInstancedBaseInstance { mode: u32, first: i32, count: i32, instances: i32, base_instance: u32 },
    DrawElementsInstancedBaseVertexBaseInstance {
        mode: u32,
        count: i32,
        ty: u32,
        offset: u64,
        instances: i32,
        base_vertex: i32,
        base_instance: u32,
    },

    // Queries
    CreateQuery { target: u32 },
    BeginQuery { target: u32, query: u32 },
    EndQuery(u32),
    QueryCounter { query: u32, target: u32 },
    GetQueryObjectui64v { query: u32, pname: u32 },
    DeleteQuery(u32),

    // Synchronisation
    FenceSync,
    ClientWaitSync { sync: u64, flags: u32, timeout_ns: u64 },
    DeleteSync(u64),
    Flush,
    Finish,
}

impl GlCall {
    /// The GL entry point name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Enable(_) => "glEnable",
            Self::Disable(_) => "glDisable",
            Self::ClipControl { .. } => "glClipControl",
            Self::LogicOp(_) => "glLogicOp",
            Self::BlendColor(_) => "glBlendColor",
            Self::BlendEquationSeparatei { .. } => "glBlendEquationSeparatei",
            Self::BlendFuncSeparatei { .. } => "glBlendFuncSeparatei",
            Self::ColorMaski { .. } => "glColorMaski",
            Self::DepthFunc(_) => "glDepthFunc",
            Self::DepthMask(_) => "glDepthMask",
            Self::DepthBounds { .. } => "glDepthBoundsEXT",
            Self::StencilFuncSeparate { .. } => "glStencilFuncSeparate",
            Self::StencilOpSeparate { .. } => "glStencilOpSeparate",
            Self::StencilMaskSeparate { .. } => "glStencilMaskSeparate",
            Self::SampleMaski { .. } => "glSampleMaski",
            Self::MinSampleShading(_) => "glMinSampleShading",
            Self::PolygonMode { .. } => "glPolygonMode",
            Self::CullFace(_) => "glCullFace",
            Self::FrontFace(_) => "glFrontFace",
            Self::PolygonOffset { .. } => "glPolygonOffset",
            Self::PolygonOffsetClamp { .. } => "glPolygonOffsetClamp",
            Self::LineWidth(_) => "glLineWidth",
            Self::PatchParameteri { .. } => "glPatchParameteri",
            Self::ViewportIndexedf { .. } => "glViewportIndexedf",
            Self::DepthRangeIndexed { .. } => "glDepthRangeIndexed",
            Self::ScissorIndexed { .. } => "glScissorIndexed",
            Self::CreateBuffer => "glCreateBuffers",
            Self::NamedBufferStorage { .. } => "glNamedBufferStorage",
            Self::NamedBufferSubData { .. } => "glNamedBufferSubData",
            Self::GetNamedBufferSubData { .. } => "glGetNamedBufferSubData",
            Self::BindBufferRange { .. } => "glBindBufferRange",
            Self::BindBuffer { .. } => "glBindBuffer",
            Self::CopyNamedBufferSubData { .. } => "glCopyNamedBufferSubData",
            Self::DeleteBuffer(_) => "glDeleteBuffers",
            Self::CreateVertexArray => "glCreateVertexArrays",
            Self::BindVertexArray(_) => "glBindVertexArray",
            Self::VertexArrayVertexBuffer { .. } => "glVertexArrayVertexBuffer",
            Self::VertexArrayElementBuffer { .. } => "glVertexArrayElementBuffer",
            Self::VertexArrayAttribFormat { .. } => "glVertexArrayAttribFormat",
            Self::VertexArrayAttribIFormat { .. } => "glVertexArrayAttribIFormat",
            Self::VertexArrayAttribBinding { .. } => "glVertexArrayAttribBinding",
            Self::VertexArrayBindingDivisor { .. } => "glVertexArrayBindingDivisor",
            Self::EnableVertexArrayAttrib { .. } => "glEnableVertexArrayAttrib",
            Self::DisableVertexArrayAttrib { .. } => "glDisableVertexArrayAttrib",
            Self::DeleteVertexArray(_) => "glDeleteVertexArrays",
            Self::CreateTexture { .. } => "glCreateTextures",
            Self::GenTexture => "glGenTextures",
            Self::TextureStorage1D { .. } => "glTextureStorage1D",
            Self::TextureStorage2D { .. } => "glTextureStorage2D",
            Self::TextureStorage3D { .. } => "glTextureStorage3D",
            Self::TextureStorage2DMultisample { .. } => "glTextureStorage2DMultisample",
            Self::TextureStorage3DMultisample { .. } => "glTextureStorage3DMultisample",
            Self::TextureView { .. } => "glTextureView",
            Self::TextureBufferRange { .. } => "glTextureBufferRange",
            Self::PixelStorei { .. } => "glPixelStorei",
            Self::TextureSubImage1D { .. } => "glTextureSubImage1D",
            Self::TextureSubImage2D { .. } => "glTextureSubImage2D",
            Self::TextureSubImage3D { .. } => "glTextureSubImage3D",
            Self::CompressedTextureSubImage2D { .. } => "glCompressedTextureSubImage2D",
            Self::CompressedTextureSubImage3D { .. } => "glCompressedTextureSubImage3D",
            Self::BindTextureUnit { .. } => "glBindTextureUnit",
            Self::BindImageTexture { .. } => "glBindImageTexture",
            Self::DeleteTexture(_) => "glDeleteTextures",
            Self::CreateSampler => "glCreateSamplers",
            Self::SamplerParameteri { .. } => "glSamplerParameteri",
            Self::SamplerParameterf { .. } => "glSamplerParameterf",
            Self::SamplerParameterfv { .. } => "glSamplerParameterfv",
            Self::SamplerParameterIiv { .. } => "glSamplerParameterIiv",
            Self::BindSampler { .. } => "glBindSampler",
            Self::DeleteSampler(_) => "glDeleteSamplers",
            Self::CreateFramebuffer => "glCreateFramebuffers",
            Self::NamedFramebufferTexture { .. } => "glNamedFramebufferTexture",
            Self::NamedFramebufferTextureLayer { .. } => "glNamedFramebufferTextureLayer",
            Self::NamedFramebufferDrawBuffers { .. } => "glNamedFramebufferDrawBuffers",
            Self::NamedFramebufferReadBuffer { .. } => "glNamedFramebufferReadBuffer",
            Self::CheckNamedFramebufferStatus { .. } => "glCheckNamedFramebufferStatus",
            Self::BindFramebuffer { .. } => "glBindFramebuffer",
            Self::ClearNamedFramebufferfv { .. } => "glClearNamedFramebufferfv",
            Self::ClearNamedFramebufferiv { .. } => "glClearNamedFramebufferiv",
            Self::ClearNamedFramebufferfi { .. } => "glClearNamedFramebufferfi",
            Self::BlitNamedFramebuffer { .. } => "glBlitNamedFramebuffer",
            Self::InvalidateNamedFramebufferData { .. } => "glInvalidateNamedFramebufferData",
            Self::DeleteFramebuffer(_) => "glDeleteFramebuffers",
            Self::TextureBarrier => "glTextureBarrier",
            Self::MemoryBarrier(_) => "glMemoryBarrier",
            Self::CreateShader(_) => "glCreateShader",
            Self::ShaderSource { .. } => "glShaderSource",
            Self::ShaderBinary { .. } => "glShaderBinary",
            Self::SpecializeShader { .. } => "glSpecializeShader",
            Self::CompileShader(_) => "glCompileShader",
            Self::GetShaderiv { .. } => "glGetShaderiv",
            Self::GetShaderInfoLog(_) => "glGetShaderInfoLog",
            Self::DeleteShader(_) => "glDeleteShader",
            Self::CreateProgram => "glCreateProgram",
            Self::ProgramParameteri { .. } => "glProgramParameteri",
            Self::AttachShader { .. } => "glAttachShader",
            Self::DetachShader { .. } => "glDetachShader",
            Self::LinkProgram(_) => "glLinkProgram",
            Self::GetProgramiv { .. } => "glGetProgramiv",
            Self::GetProgramInfoLog(_) => "glGetProgramInfoLog",
            Self::DeleteProgram(_) => "glDeleteProgram",
            Self::CreateProgramPipeline => "glCreateProgramPipelines",
            Self::UseProgramStages { .. } => "glUseProgramStages",
            Self::ValidateProgramPipeline(_) => "glValidateProgramPipeline",
            Self::GetProgramPipelineiv { .. } => "glGetProgramPipelineiv",
            Self::GetProgramPipelineInfoLog(_) => "glGetProgramPipelineInfoLog",
            Self::BindProgramPipeline(_) => "glBindProgramPipeline",
            Self::DeleteProgramPipeline(_) => "glDeleteProgramPipelines",
            Self::DrawArraysInstancedBaseInstance { .. } => "glDrawArraysInstancedBaseInstance",
            Self::DrawElementsInstancedBaseVertexBaseInstance { .. } => {
                "glDrawElementsInstancedBaseVertexBaseInstance"
            }
            Self::CreateQuery { .. } => "glCreateQueries",
            Self::BeginQuery { .. } => "glBeginQuery",
            Self::EndQuery(_) => "glEndQuery",
            Self::QueryCounter { .. } => "glQueryCounter",
            Self::GetQueryObjectui64v { .. } => "glGetQueryObjectui64v",
            Self::DeleteQuery(_) => "glDeleteQueries",
            Self::FenceSync => "glFenceSync",
            Self::ClientWaitSync { .. } => "glClientWaitSync",
            Self::DeleteSync(_) => "glDeleteSync",
            Self::Flush => "glFlush",
            Self::Finish => "glFinish",
        }
    }
}

/// What a GL call returned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GlValue {
    #[default]
    None,
    /// A new object name.
    Name(u32),
    Int(i32),
    /// Query results and sync object pointers.
    UInt64(u64),
    /// Info logs.
    Text(String),
    Bytes(Vec<u8>),
}

impl GlValue {
    pub fn name(&self) -> Option<u32> {
        match *self {
            Self::Name(name) if name != 0 => Some(name),
            _ => None,
        }
    }

    pub fn int(&self) -> Option<i32> {
        match *self {
            Self::Int(value) => Some(value),
            _ => None,
        }
    }

    pub fn uint64(&self) -> Option<u64> {
        match *self {
            Self::UInt64(value) => Some(value),
            _ => None,
        }
    }

    /// Text, or an empty string for anything else.
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            _ => String::new(),
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}
