//! The slice of a WebGL-style graphics API the viewer draws through.
//!
//! [`RenderDevice`] is implemented by [`WebGlDevice`] in the browser and by [`RecordingDevice`]
//! everywhere else.

mod recording;
#[cfg(target_family = "wasm")]
mod web_gl;

use std::fmt::{self, Display};

use glam::{Mat4, Vec3};

pub use recording::{Command, Handle, RecordingDevice, TextureRecord};
#[cfg(target_family = "wasm")]
pub use web_gl::WebGlDevice;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceError(pub String);

impl Display for DeviceError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl std::error::Error for DeviceError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl Display for ShaderStage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
    Lines,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

/// Minification filter. Magnification is always linear.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterMode {
    Linear,
    LinearMipmapLinear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerSettings {
    pub wrap: WrapMode,
    pub min_filter: FilterMode,
}

/// Tightly packed RGBA8 pixels, bottom row first.
#[derive(Clone, Copy, Debug)]
pub struct TextureImage<'pixels> {
    pub width: u32,
    pub height: u32,
    pub pixels: &'pixels [u8],
}

pub trait RenderDevice {
    type Shader;
    type Program;
    type Buffer;
    type Texture;
    type UniformLocation;

    /// Current size of the drawing surface in pixels.
    fn surface_size(&self) -> (u32, u32);

    /// # Errors
    ///
    /// Returns the compiler diagnostics if the source does not compile.
    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self::Shader, DeviceError>;

    fn delete_shader(&mut self, shader: Self::Shader);

    /// # Errors
    ///
    /// Returns the linker diagnostics if the shaders cannot be linked.
    fn link_program(
        &mut self,
        vertex: &Self::Shader,
        fragment: &Self::Shader,
    ) -> Result<Self::Program, DeviceError>;

    /// # Errors
    ///
    /// Returns the validation diagnostics if the program cannot execute in the current state.
    fn validate_program(&mut self, program: &Self::Program) -> Result<(), DeviceError>;

    fn use_program(&mut self, program: &Self::Program);

    fn attribute_location(&mut self, program: &Self::Program, name: &str) -> Option<u32>;

    fn uniform_location(
        &mut self,
        program: &Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;

    /// Creates a static vertex buffer holding `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer could not be allocated.
    fn create_buffer(&mut self, data: &[u8]) -> Result<Self::Buffer, DeviceError>;

    /// Feeds the attribute at `location` from `buffer`, `components` floats per vertex.
    fn bind_attribute(&mut self, buffer: &Self::Buffer, location: u32, components: u8);

    fn enable_attribute(&mut self, location: u32);

    fn disable_attribute(&mut self, location: u32);

    /// # Errors
    ///
    /// Returns an error if the texture could not be allocated.
    fn create_texture(&mut self) -> Result<Self::Texture, DeviceError>;

    /// Replaces the content of `texture`, keeping its identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the image does not fit the texture limits of the device.
    fn upload_texture(
        &mut self,
        texture: &Self::Texture,
        image: TextureImage<'_>,
    ) -> Result<(), DeviceError>;

    fn configure_sampler(&mut self, texture: &Self::Texture, sampler: SamplerSettings);

    fn generate_mipmaps(&mut self, texture: &Self::Texture);

    /// Whether `texture` still refers to a live texture object.
    fn is_texture(&self, texture: &Self::Texture) -> bool;

    fn bind_texture(&mut self, unit: u32, texture: &Self::Texture);

    fn set_uniform_matrix(&mut self, location: &Self::UniformLocation, matrix: &Mat4);

    fn set_uniform_color(&mut self, location: &Self::UniformLocation, color: Vec3);

    fn set_uniform_sampler(&mut self, location: &Self::UniformLocation, unit: u32);

    /// Clears color and depth of the whole surface.
    fn clear(&mut self, color: [f32; 4]);

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32);
}

