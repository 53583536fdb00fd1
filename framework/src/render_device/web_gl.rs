use glam::{Mat4, Vec3};
use tracing::{debug, info};
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGlBuffer, WebGlProgram, WebGlRenderingContext as Gl, WebGlShader,
    WebGlTexture, WebGlUniformLocation,
};

use super::{
    DeviceError, FilterMode, Primitive, RenderDevice, SamplerSettings, ShaderStage, TextureImage,
    WrapMode,
};

/// A [`RenderDevice`] drawing into a `<canvas>` through WebGL 1.
pub struct WebGlDevice {
    canvas: HtmlCanvasElement,
    context: Gl,
}

#[expect(
    clippy::cast_possible_wrap,
    reason = "WebGL enum values are small positive integers"
)]
fn gl_enum(value: u32) -> i32 {
    value as i32
}

fn gl_size(value: u32) -> Result<i32, DeviceError> {
    i32::try_from(value).map_err(|_| DeviceError(format!("{value} exceeds the WebGL limits")))
}

impl WebGlDevice {
    /// Attaches to the canvas element with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no such canvas or the browser does not support WebGL.
    pub fn from_canvas_id(canvas_id: &str) -> Result<Self, DeviceError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| DeviceError("no document available".to_owned()))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| DeviceError(format!("no element with id `{canvas_id}`")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| DeviceError(format!("element `{canvas_id}` is not a canvas")))?;
        let context = canvas
            .get_context("webgl")
            .map_err(|error| DeviceError(format!("{error:?}")))?
            .ok_or_else(|| DeviceError("WebGL not supported".to_owned()))?
            .dyn_into::<Gl>()
            .map_err(|_| DeviceError("unexpected rendering context".to_owned()))?;

        context.enable(Gl::DEPTH_TEST);
        info!(
            "attached to canvas `{canvas_id}` ({}x{})",
            canvas.width(),
            canvas.height()
        );

        Ok(Self { canvas, context })
    }
}

impl RenderDevice for WebGlDevice {
    type Shader = WebGlShader;
    type Program = WebGlProgram;
    type Buffer = WebGlBuffer;
    type Texture = WebGlTexture;
    type UniformLocation = WebGlUniformLocation;

    fn surface_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<WebGlShader, DeviceError> {
        let kind = match stage {
            ShaderStage::Vertex => Gl::VERTEX_SHADER,
            ShaderStage::Fragment => Gl::FRAGMENT_SHADER,
        };
        let shader = self
            .context
            .create_shader(kind)
            .ok_or_else(|| DeviceError(format!("unable to create {stage} shader")))?;
        self.context.shader_source(&shader, source);
        self.context.compile_shader(&shader);

        if self
            .context
            .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
        {
            Ok(shader)
        } else {
            let log = self
                .context
                .get_shader_info_log(&shader)
                .unwrap_or_default();
            self.context.delete_shader(Some(&shader));
            Err(DeviceError(log))
        }
    }

    fn delete_shader(&mut self, shader: WebGlShader) {
        self.context.delete_shader(Some(&shader));
    }

    fn link_program(
        &mut self,
        vertex: &WebGlShader,
        fragment: &WebGlShader,
    ) -> Result<WebGlProgram, DeviceError> {
        let program = self
            .context
            .create_program()
            .ok_or_else(|| DeviceError("unable to create program".to_owned()))?;
        self.context.attach_shader(&program, vertex);
        self.context.attach_shader(&program, fragment);
        self.context.link_program(&program);

        if self
            .context
            .get_program_parameter(&program, Gl::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
        {
            Ok(program)
        } else {
            let log = self
                .context
                .get_program_info_log(&program)
                .unwrap_or_default();
            self.context.delete_program(Some(&program));
            Err(DeviceError(log))
        }
    }

    fn validate_program(&mut self, program: &WebGlProgram) -> Result<(), DeviceError> {
        self.context.validate_program(program);
        if self
            .context
            .get_program_parameter(program, Gl::VALIDATE_STATUS)
            .as_bool()
            .unwrap_or(false)
        {
            Ok(())
        } else {
            Err(DeviceError(
                self.context
                    .get_program_info_log(program)
                    .unwrap_or_default(),
            ))
        }
    }

    fn use_program(&mut self, program: &WebGlProgram) {
        self.context.use_program(Some(program));
    }

    fn attribute_location(&mut self, program: &WebGlProgram, name: &str) -> Option<u32> {
        // -1 marks an unknown or inactive attribute
        u32::try_from(self.context.get_attrib_location(program, name)).ok()
    }

    fn uniform_location(
        &mut self,
        program: &WebGlProgram,
        name: &str,
    ) -> Option<WebGlUniformLocation> {
        self.context.get_uniform_location(program, name)
    }

    fn create_buffer(&mut self, data: &[u8]) -> Result<WebGlBuffer, DeviceError> {
        let buffer = self
            .context
            .create_buffer()
            .ok_or_else(|| DeviceError("unable to create buffer".to_owned()))?;
        self.context.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffer));
        self.context
            .buffer_data_with_u8_array(Gl::ARRAY_BUFFER, data, Gl::STATIC_DRAW);
        debug!("uploaded vertex buffer of {} bytes", data.len());
        Ok(buffer)
    }

    fn bind_attribute(&mut self, buffer: &WebGlBuffer, location: u32, components: u8) {
        self.context.bind_buffer(Gl::ARRAY_BUFFER, Some(buffer));
        self.context.vertex_attrib_pointer_with_i32(
            location,
            i32::from(components),
            Gl::FLOAT,
            false,
            0,
            0,
        );
    }

    fn enable_attribute(&mut self, location: u32) {
        self.context.enable_vertex_attrib_array(location);
    }

    fn disable_attribute(&mut self, location: u32) {
        self.context.disable_vertex_attrib_array(location);
    }

    fn create_texture(&mut self) -> Result<WebGlTexture, DeviceError> {
        self.context
            .create_texture()
            .ok_or_else(|| DeviceError("unable to create texture".to_owned()))
    }

    fn upload_texture(
        &mut self,
        texture: &WebGlTexture,
        image: TextureImage<'_>,
    ) -> Result<(), DeviceError> {
        self.context.bind_texture(Gl::TEXTURE_2D, Some(texture));
        self.context
            .tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
                Gl::TEXTURE_2D,
                0,
                gl_enum(Gl::RGBA),
                gl_size(image.width)?,
                gl_size(image.height)?,
                0,
                Gl::RGBA,
                Gl::UNSIGNED_BYTE,
                Some(image.pixels),
            )
            .map_err(|error| DeviceError(format!("{error:?}")))
    }

    fn configure_sampler(&mut self, texture: &WebGlTexture, sampler: SamplerSettings) {
        let wrap = gl_enum(match sampler.wrap {
            WrapMode::Repeat => Gl::REPEAT,
            WrapMode::ClampToEdge => Gl::CLAMP_TO_EDGE,
        });
        let min_filter = gl_enum(match sampler.min_filter {
            FilterMode::Linear => Gl::LINEAR,
            FilterMode::LinearMipmapLinear => Gl::LINEAR_MIPMAP_LINEAR,
        });

        self.context.bind_texture(Gl::TEXTURE_2D, Some(texture));
        self.context
            .tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_S, wrap);
        self.context
            .tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_T, wrap);
        self.context
            .tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MIN_FILTER, min_filter);
        self.context
            .tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MAG_FILTER, gl_enum(Gl::LINEAR));
    }

    fn generate_mipmaps(&mut self, texture: &WebGlTexture) {
        self.context.bind_texture(Gl::TEXTURE_2D, Some(texture));
        self.context.generate_mipmap(Gl::TEXTURE_2D);
    }

    fn is_texture(&self, texture: &WebGlTexture) -> bool {
        self.context.is_texture(Some(texture))
    }

    fn bind_texture(&mut self, unit: u32, texture: &WebGlTexture) {
        self.context.active_texture(Gl::TEXTURE0 + unit);
        self.context.bind_texture(Gl::TEXTURE_2D, Some(texture));
    }

    fn set_uniform_matrix(&mut self, location: &WebGlUniformLocation, matrix: &Mat4) {
        self.context.uniform_matrix4fv_with_f32_array(
            Some(location),
            false,
            &matrix.to_cols_array(),
        );
    }

    fn set_uniform_color(&mut self, location: &WebGlUniformLocation, color: Vec3) {
        self.context
            .uniform3f(Some(location), color.x, color.y, color.z);
    }

    fn set_uniform_sampler(&mut self, location: &WebGlUniformLocation, unit: u32) {
        self.context
            .uniform1i(Some(location), i32::try_from(unit).unwrap_or(0));
    }

    fn clear(&mut self, [red, green, blue, alpha]: [f32; 4]) {
        let (width, height) = self.surface_size();
        self.context.viewport(
            0,
            0,
            gl_size(width).unwrap_or(i32::MAX),
            gl_size(height).unwrap_or(i32::MAX),
        );
        self.context.clear_color(red, green, blue, alpha);
        self.context
            .clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) {
        let mode = match primitive {
            Primitive::Triangles => Gl::TRIANGLES,
            Primitive::Lines => Gl::LINES,
        };
        self.context.draw_arrays(
            mode,
            i32::try_from(first).unwrap_or(i32::MAX),
            i32::try_from(count).unwrap_or(0),
        );
    }
}
