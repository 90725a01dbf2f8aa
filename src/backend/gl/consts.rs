// GL enumerant values used by the immediate-mode backend

pub const NO_ERROR: u32 = 0;
pub const NONE: u32 = 0;
pub const ZERO: u32 = 0;
pub const ONE: u32 = 1;

// Errors
pub const INVALID_ENUM: u32 = 0x0500;
pub const INVALID_VALUE: u32 = 0x0501;
pub const INVALID_OPERATION: u32 = 0x0502;
pub const OUT_OF_MEMORY: u32 = 0x0505;
pub const INVALID_FRAMEBUFFER_OPERATION: u32 = 0x0506;

// Capabilities
pub const BLEND: u32 = 0x0BE2;
pub const CULL_FACE: u32 = 0x0B44;
pub const DEPTH_TEST: u32 = 0x0B71;
pub const STENCIL_TEST: u32 = 0x0B90;
pub const SCISSOR_TEST: u32 = 0x0C11;
pub const COLOR_LOGIC_OP: u32 = 0x0BF2;
pub const DEPTH_CLAMP: u32 = 0x864F;
pub const POLYGON_OFFSET_POINT: u32 = 0x2A01;
pub const POLYGON_OFFSET_LINE: u32 = 0x2A02;
pub const POLYGON_OFFSET_FILL: u32 = 0x8037;
pub const RASTERIZER_DISCARD: u32 = 0x8C89;
pub const MULTISAMPLE: u32 = 0x809D;
pub const SAMPLE_ALPHA_TO_COVERAGE: u32 = 0x809E;
pub const SAMPLE_ALPHA_TO_ONE: u32 = 0x809F;
pub const SAMPLE_SHADING: u32 = 0x8C36;
pub const SAMPLE_MASK: u32 = 0x8E51;
pub const PRIMITIVE_RESTART_FIXED_INDEX: u32 = 0x8D69;
pub const DEPTH_BOUNDS_TEST_EXT: u32 = 0x8890;
pub const TEXTURE_CUBE_MAP_SEAMLESS: u32 = 0x884F;

// Comparison functions
pub const NEVER: u32 = 0x0200;
pub const LESS: u32 = 0x0201;
pub const EQUAL: u32 = 0x0202;
pub const LEQUAL: u32 = 0x0203;
pub const GREATER: u32 = 0x0204;
pub const NOTEQUAL: u32 = 0x0205;
pub const GEQUAL: u32 = 0x0206;
pub const ALWAYS: u32 = 0x0207;

// Blend factors and equations
pub const SRC_COLOR: u32 = 0x0300;
pub const ONE_MINUS_SRC_COLOR: u32 = 0x0301;
pub const SRC_ALPHA: u32 = 0x0302;
pub const ONE_MINUS_SRC_ALPHA: u32 = 0x0303;
pub const DST_ALPHA: u32 = 0x0304;
pub const ONE_MINUS_DST_ALPHA: u32 = 0x0305;
pub const DST_COLOR: u32 = 0x0306;
pub const ONE_MINUS_DST_COLOR: u32 = 0x0307;
pub const SRC_ALPHA_SATURATE: u32 = 0x0308;
pub const CONSTANT_COLOR: u32 = 0x8001;
pub const ONE_MINUS_CONSTANT_COLOR: u32 = 0x8002;
pub const CONSTANT_ALPHA: u32 = 0x8003;
pub const ONE_MINUS_CONSTANT_ALPHA: u32 = 0x8004;
pub const SRC1_ALPHA: u32 = 0x8589;
pub const SRC1_COLOR: u32 = 0x88F9;
pub const ONE_MINUS_SRC1_COLOR: u32 = 0x88FA;
pub const ONE_MINUS_SRC1_ALPHA: u32 = 0x88FB;
pub const FUNC_ADD: u32 = 0x8006;
pub const MIN: u32 = 0x8007;
pub const MAX: u32 = 0x8008;
pub const FUNC_SUBTRACT: u32 = 0x800A;
pub const FUNC_REVERSE_SUBTRACT: u32 = 0x800B;

// Logic ops
pub const CLEAR: u32 = 0x1500;
pub const AND: u32 = 0x1501;
pub const AND_REVERSE: u32 = 0x1502;
pub const COPY: u32 = 0x1503;
pub const AND_INVERTED: u32 = 0x1504;
pub const NOOP: u32 = 0x1505;
pub const XOR: u32 = 0x1506;
pub const OR: u32 = 0x1507;
pub const NOR: u32 = 0x1508;
pub const EQUIV: u32 = 0x1509;
pub const INVERT: u32 = 0x150A;
pub const OR_REVERSE: u32 = 0x150B;
pub const COPY_INVERTED: u32 = 0x150C;
pub const OR_INVERTED: u32 = 0x150D;
pub const NAND: u32 = 0x150E;
pub const SET: u32 = 0x150F;

// Stencil ops
pub const KEEP: u32 = 0x1E00;
pub const REPLACE: u32 = 0x1E01;
pub const INCR: u32 = 0x1E02;
pub const DECR: u32 = 0x1E03;
pub const INCR_WRAP: u32 = 0x8507;
pub const DECR_WRAP: u32 = 0x8508;

// Faces and polygon modes
pub const FRONT: u32 = 0x0404;
pub const BACK: u32 = 0x0405;
pub const FRONT_AND_BACK: u32 = 0x0408;
pub const CW: u32 = 0x0900;
pub const CCW: u32 = 0x0901;
pub const POINT: u32 = 0x1B00;
pub const LINE: u32 = 0x1B01;
pub const FILL: u32 = 0x1B02;

// Primitives
pub const POINTS: u32 = 0x0000;
pub const LINES: u32 = 0x0001;
pub const LINE_STRIP: u32 = 0x0003;
pub const TRIANGLES: u32 = 0x0004;
pub const TRIANGLE_STRIP: u32 = 0x0005;
pub const TRIANGLE_FAN: u32 = 0x0006;
pub const LINES_ADJACENCY: u32 = 0x000A;
pub const LINE_STRIP_ADJACENCY: u32 = 0x000B;
pub const TRIANGLES_ADJACENCY: u32 = 0x000C;
pub const TRIANGLE_STRIP_ADJACENCY: u32 = 0x000D;
pub const PATCHES: u32 = 0x000E;
pub const PATCH_VERTICES: u32 = 0x8E72;

// Clip control
pub const LOWER_LEFT: u32 = 0x8CA1;
pub const UPPER_LEFT: u32 = 0x8CA2;
pub const NEGATIVE_ONE_TO_ONE: u32 = 0x935E;
pub const ZERO_TO_ONE: u32 = 0x935F;

// Buffers
pub const UNIFORM_BUFFER: u32 = 0x8A11;
pub const SHADER_STORAGE_BUFFER: u32 = 0x90D2;
pub const MAP_READ_BIT: u32 = 0x0001;
pub const MAP_WRITE_BIT: u32 = 0x0002;
pub const MAP_PERSISTENT_BIT: u32 = 0x0040;
pub const MAP_COHERENT_BIT: u32 = 0x0080;
pub const DYNAMIC_STORAGE_BIT: u32 = 0x0100;
pub const CLIENT_STORAGE_BIT: u32 = 0x0200;
pub const PIXEL_UNPACK_BUFFER: u32 = 0x88EC;

// Pixel transfer
pub const UNPACK_ROW_LENGTH: u32 = 0x0CF2;
pub const UNPACK_ALIGNMENT: u32 = 0x0CF5;
pub const UNPACK_IMAGE_HEIGHT: u32 = 0x806E;
pub const RED: u32 = 0x1903;
pub const RG: u32 = 0x8227;
pub const RGB: u32 = 0x1907;
pub const RGBA: u32 = 0x1908;
pub const BGRA: u32 = 0x80E1;
pub const RED_INTEGER: u32 = 0x8D94;
pub const STENCIL_INDEX: u32 = 0x1901;
pub const DEPTH_COMPONENT: u32 = 0x1902;
pub const HALF_FLOAT: u32 = 0x140B;
pub const UNSIGNED_INT_24_8: u32 = 0x84FA;
pub const FLOAT_32_UNSIGNED_INT_24_8_REV: u32 = 0x8DAD;

// Texture targets
pub const TEXTURE_1D: u32 = 0x0DE0;
pub const TEXTURE_2D: u32 = 0x0DE1;
pub const TEXTURE_3D: u32 = 0x806F;
pub const TEXTURE_CUBE_MAP: u32 = 0x8513;
pub const TEXTURE_1D_ARRAY: u32 = 0x8C18;
pub const TEXTURE_2D_ARRAY: u32 = 0x8C1A;
pub const TEXTURE_BUFFER: u32 = 0x8C2A;
pub const TEXTURE_CUBE_MAP_ARRAY: u32 = 0x9009;
pub const TEXTURE_2D_MULTISAMPLE: u32 = 0x9100;
pub const TEXTURE_2D_MULTISAMPLE_ARRAY: u32 = 0x9102;

// Sized internal formats
pub const R8: u32 = 0x8229;
pub const RG8: u32 = 0x822B;
pub const RGB8: u32 = 0x8051;
pub const RGBA8: u32 = 0x8058;
pub const SRGB8_ALPHA8: u32 = 0x8C43;
pub const R16F: u32 = 0x822D;
pub const RG16F: u32 = 0x822F;
pub const RGBA16F: u32 = 0x881A;
pub const R32F: u32 = 0x822E;
pub const RG32F: u32 = 0x8230;
pub const RGB32F: u32 = 0x8815;
pub const RGBA32F: u32 = 0x8814;
pub const R32UI: u32 = 0x8236;
pub const DEPTH_COMPONENT16: u32 = 0x81A5;
pub const DEPTH24_STENCIL8: u32 = 0x88F0;
pub const DEPTH_COMPONENT32F: u32 = 0x8CAC;
pub const DEPTH32F_STENCIL8: u32 = 0x8CAD;
pub const STENCIL_INDEX8: u32 = 0x8D48;
pub const COMPRESSED_RGB_S3TC_DXT1_EXT: u32 = 0x83F0;
pub const COMPRESSED_RGBA_S3TC_DXT1_EXT: u32 = 0x83F1;
pub const COMPRESSED_RGBA_S3TC_DXT3_EXT: u32 = 0x83F2;
pub const COMPRESSED_RGBA_S3TC_DXT5_EXT: u32 = 0x83F3;

// Sampler parameters
pub const TEXTURE_MAG_FILTER: u32 = 0x2800;
pub const TEXTURE_MIN_FILTER: u32 = 0x2801;
pub const TEXTURE_WRAP_S: u32 = 0x2802;
pub const TEXTURE_WRAP_T: u32 = 0x2803;
pub const TEXTURE_WRAP_R: u32 = 0x8072;
pub const TEXTURE_MIN_LOD: u32 = 0x813A;
pub const TEXTURE_MAX_LOD: u32 = 0x813B;
pub const TEXTURE_LOD_BIAS: u32 = 0x8501;
pub const TEXTURE_BORDER_COLOR: u32 = 0x1004;
pub const TEXTURE_MAX_ANISOTROPY: u32 = 0x84FE;
pub const TEXTURE_COMPARE_MODE: u32 = 0x884C;
pub const TEXTURE_COMPARE_FUNC: u32 = 0x884D;
pub const COMPARE_REF_TO_TEXTURE: u32 = 0x884E;
pub const NEAREST: u32 = 0x2600;
pub const LINEAR: u32 = 0x2601;
pub const NEAREST_MIPMAP_NEAREST: u32 = 0x2700;
pub const LINEAR_MIPMAP_NEAREST: u32 = 0x2701;
pub const NEAREST_MIPMAP_LINEAR: u32 = 0x2702;
pub const LINEAR_MIPMAP_LINEAR: u32 = 0x2703;
pub const REPEAT: u32 = 0x2901;
pub const CLAMP_TO_BORDER: u32 = 0x812D;
pub const CLAMP_TO_EDGE: u32 = 0x812F;
pub const MIRRORED_REPEAT: u32 = 0x8370;
pub const MIRROR_CLAMP_TO_EDGE: u32 = 0x8743;

// Image units
pub const READ_ONLY: u32 = 0x88B8;
pub const WRITE_ONLY: u32 = 0x88B9;
pub const READ_WRITE: u32 = 0x88BA;

// Framebuffers
pub const READ_FRAMEBUFFER: u32 = 0x8CA8;
pub const DRAW_FRAMEBUFFER: u32 = 0x8CA9;
pub const FRAMEBUFFER: u32 = 0x8D40;
pub const FRAMEBUFFER_COMPLETE: u32 = 0x8CD5;
pub const COLOR_ATTACHMENT0: u32 = 0x8CE0;
pub const DEPTH_ATTACHMENT: u32 = 0x8D00;
pub const STENCIL_ATTACHMENT: u32 = 0x8D20;
pub const DEPTH_STENCIL_ATTACHMENT: u32 = 0x821A;
pub const COLOR: u32 = 0x1800;
pub const DEPTH: u32 = 0x1801;
pub const STENCIL: u32 = 0x1802;
pub const DEPTH_STENCIL: u32 = 0x84F9;
pub const COLOR_BUFFER_BIT: u32 = 0x4000;
pub const DEPTH_BUFFER_BIT: u32 = 0x0100;
pub const STENCIL_BUFFER_BIT: u32 = 0x0400;

// Shaders and programs
pub const FRAGMENT_SHADER: u32 = 0x8B30;
pub const VERTEX_SHADER: u32 = 0x8B31;
pub const GEOMETRY_SHADER: u32 = 0x8DD9;
pub const TESS_EVALUATION_SHADER: u32 = 0x8E87;
pub const TESS_CONTROL_SHADER: u32 = 0x8E88;
pub const COMPUTE_SHADER: u32 = 0x91B9;
pub const COMPILE_STATUS: u32 = 0x8B81;
pub const LINK_STATUS: u32 = 0x8B82;
pub const VALIDATE_STATUS: u32 = 0x8B83;
pub const PROGRAM_SEPARABLE: u32 = 0x8258;
pub const SHADER_BINARY_FORMAT_SPIR_V: u32 = 0x9551;
pub const VERTEX_SHADER_BIT: u32 = 0x0001;
pub const FRAGMENT_SHADER_BIT: u32 = 0x0002;
pub const GEOMETRY_SHADER_BIT: u32 = 0x0004;
pub const TESS_CONTROL_SHADER_BIT: u32 = 0x0008;
pub const TESS_EVALUATION_SHADER_BIT: u32 = 0x0010;
pub const COMPUTE_SHADER_BIT: u32 = 0x0020;

// Vertex and index data types
pub const UNSIGNED_BYTE: u32 = 0x1401;
pub const UNSIGNED_SHORT: u32 = 0x1403;
pub const INT: u32 = 0x1404;
pub const UNSIGNED_INT: u32 = 0x1405;
pub const FLOAT: u32 = 0x1406;

// Queries
pub const SAMPLES_PASSED: u32 = 0x8914;
pub const TIMESTAMP: u32 = 0x8E28;
pub const QUERY_RESULT: u32 = 0x8866;

// Sync objects
pub const SYNC_GPU_COMMANDS_COMPLETE: u32 = 0x9117;
pub const SYNC_FLUSH_COMMANDS_BIT: u32 = 0x0001;
pub const ALREADY_SIGNALED: u32 = 0x911A;
pub const TIMEOUT_EXPIRED: u32 = 0x911B;
pub const CONDITION_SATISFIED: u32 = 0x911C;
pub const WAIT_FAILED: u32 = 0x911D;

// Memory barriers
pub const VERTEX_ATTRIB_ARRAY_BARRIER_BIT: u32 = 0x0001;
pub const ELEMENT_ARRAY_BARRIER_BIT: u32 = 0x0002;
pub const UNIFORM_BARRIER_BIT: u32 = 0x0004;
pub const TEXTURE_FETCH_BARRIER_BIT: u32 = 0x0008;
pub const SHADER_IMAGE_ACCESS_BARRIER_BIT: u32 = 0x0020;
pub const COMMAND_BARRIER_BIT: u32 = 0x0040;
pub const PIXEL_BUFFER_BARRIER_BIT: u32 = 0x0080;
pub const TEXTURE_UPDATE_BARRIER_BIT: u32 = 0x0100;
pub const BUFFER_UPDATE_BARRIER_BIT: u32 = 0x0200;
pub const FRAMEBUFFER_BARRIER_BIT: u32 = 0x0400;
pub const SHADER_STORAGE_BARRIER_BIT: u32 = 0x2000;
pub const CLIENT_MAPPED_BUFFER_BARRIER_BIT: u32 = 0x4000;
pub const ALL_BARRIER_BITS: u32 = 0xFFFF_FFFF;

/// Readable name of an error code.
pub fn error_name(code: u32) -> &'static str {
    match code {
        NO_ERROR => "GL_NO_ERROR",
        INVALID_ENUM => "GL_INVALID_ENUM",
        INVALID_VALUE => "GL_INVALID_VALUE",
        INVALID_OPERATION => "GL_INVALID_OPERATION",
        OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        _ => "unknown GL error",
    }
}
