use std::collections::{BTreeSet, HashMap, HashSet};

use glam::{Mat4, Vec3};
use tracing::trace;

use super::{DeviceError, Primitive, RenderDevice, SamplerSettings, ShaderStage, TextureImage};

/// Opaque object name handed out by the [`RecordingDevice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u32);

/// A state changing call issued to the [`RecordingDevice`].
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Clear([f32; 4]),
    UseProgram(Handle),
    BindAttribute {
        buffer: Handle,
        location: u32,
        components: u8,
    },
    EnableAttribute(u32),
    DisableAttribute(u32),
    BindTexture { unit: u32, texture: Handle },
    UniformMatrix { location: Handle, matrix: Mat4 },
    UniformColor { location: Handle, color: Vec3 },
    UniformSampler { location: Handle, unit: u32 },
    Draw {
        primitive: Primitive,
        first: u32,
        count: u32,
        /// attribute locations enabled at the time of the draw
        enabled_attributes: Vec<u32>,
        /// texture bound to unit 0 at the time of the draw
        texture: Option<Handle>,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextureRecord {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub sampler: Option<SamplerSettings>,
    pub mipmaps: bool,
    /// `false` once the texture has been invalidated
    pub live: bool,
}

struct ProgramRecord {
    /// attribute names in declaration order
    attributes: Vec<String>,
    uniforms: HashSet<String>,
}

/// A headless [`RenderDevice`] remembering every call.
///
/// Shader sources are scanned for `attribute` and `uniform` declarations so location lookups
/// behave like they do on a real driver. Failures can be injected to exercise error paths.
pub struct RecordingDevice {
    surface_size: (u32, u32),
    next_handle: u32,
    commands: Vec<Command>,
    shaders: HashMap<Handle, (ShaderStage, String)>,
    programs: HashMap<Handle, ProgramRecord>,
    buffers: HashMap<Handle, Vec<u8>>,
    textures: HashMap<Handle, TextureRecord>,
    uniform_names: HashMap<Handle, String>,
    enabled_attributes: BTreeSet<u32>,
    bound_texture: Option<Handle>,
    failing_stage: Option<ShaderStage>,
    failing_link: bool,
    failing_validation: bool,
    hidden_names: HashSet<String>,
}

impl RecordingDevice {
    #[must_use]
    pub fn new(surface_size: (u32, u32)) -> Self {
        Self {
            surface_size,
            next_handle: 1,
            commands: Vec::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            uniform_names: HashMap::new(),
            enabled_attributes: BTreeSet::new(),
            bound_texture: None,
            failing_stage: None,
            failing_link: false,
            failing_validation: false,
            hidden_names: HashSet::new(),
        }
    }

    pub fn set_surface_size(&mut self, surface_size: (u32, u32)) {
        self.surface_size = surface_size;
    }

    /// Makes every following compilation of `stage` shaders fail.
    pub fn fail_compile(&mut self, stage: ShaderStage) {
        self.failing_stage = Some(stage);
    }

    pub fn fail_link(&mut self) {
        self.failing_link = true;
    }

    pub fn fail_validation(&mut self) {
        self.failing_validation = true;
    }

    /// Pretends the driver optimized away the attribute or uniform called `name`.
    pub fn hide_location(&mut self, name: &str) {
        self.hidden_names.insert(name.to_owned());
    }

    /// Simulates a texture object that was deleted behind the viewer's back.
    pub fn invalidate_texture(&mut self, texture: Handle) {
        if let Some(record) = self.textures.get_mut(&texture) {
            record.live = false;
        }
    }

    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// All recorded draw calls in submission order.
    pub fn draws(&self) -> impl Iterator<Item = &Command> {
        self.commands
            .iter()
            .filter(|command| matches!(command, Command::Draw { .. }))
    }

    #[must_use]
    pub fn texture(&self, texture: Handle) -> Option<&TextureRecord> {
        self.textures.get(&texture)
    }

    #[must_use]
    pub fn buffer(&self, buffer: Handle) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(Vec::as_slice)
    }

    #[must_use]
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Shaders that were compiled but not deleted yet.
    #[must_use]
    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    #[must_use]
    pub fn uniform_name(&self, location: Handle) -> Option<&str> {
        self.uniform_names.get(&location).map(String::as_str)
    }

    /// The matrix most recently assigned to the uniform called `name`.
    #[must_use]
    pub fn last_matrix(&self, name: &str) -> Option<Mat4> {
        self.commands
            .iter()
            .rev()
            .find_map(|command| match command {
                Command::UniformMatrix { location, matrix }
                    if self.uniform_name(*location) == Some(name) =>
                {
                    Some(*matrix)
                }
                _ => None,
            })
    }

    fn next_handle(&mut self) -> Handle {
        let handle = Handle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn record(&mut self, command: Command) {
        trace!("{command:?}");
        self.commands.push(command);
    }
}

/// Names declared with `keyword` (`attribute` or `uniform`) in GLSL source.
fn declarations<'source>(
    source: &'source str,
    keyword: &'source str,
) -> impl Iterator<Item = &'source str> {
    source.lines().filter_map(move |line| {
        let line = line.trim().strip_suffix(';')?;
        let mut tokens = line.split_whitespace();
        (tokens.next()? == keyword).then(|| tokens.last()).flatten()
    })
}

impl RenderDevice for RecordingDevice {
    type Shader = Handle;
    type Program = Handle;
    type Buffer = Handle;
    type Texture = Handle;
    type UniformLocation = Handle;

    fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<Handle, DeviceError> {
        if self.failing_stage == Some(stage) {
            return Err(DeviceError(format!("ERROR: 0:1: '{stage}' : syntax error")));
        }
        let handle = self.next_handle();
        self.shaders.insert(handle, (stage, source.to_owned()));
        Ok(handle)
    }

    fn delete_shader(&mut self, shader: Handle) {
        self.shaders.remove(&shader);
    }

    fn link_program(&mut self, vertex: &Handle, fragment: &Handle) -> Result<Handle, DeviceError> {
        if self.failing_link {
            return Err(DeviceError("varying mismatch".to_owned()));
        }
        let (Some((ShaderStage::Vertex, vertex)), Some((ShaderStage::Fragment, fragment))) =
            (self.shaders.get(vertex), self.shaders.get(fragment))
        else {
            return Err(DeviceError("missing vertex or fragment shader".to_owned()));
        };

        let record = ProgramRecord {
            attributes: declarations(vertex, "attribute")
                .map(str::to_owned)
                .collect(),
            uniforms: declarations(vertex, "uniform")
                .chain(declarations(fragment, "uniform"))
                .map(str::to_owned)
                .collect(),
        };
        let handle = self.next_handle();
        self.programs.insert(handle, record);
        Ok(handle)
    }

    fn validate_program(&mut self, program: &Handle) -> Result<(), DeviceError> {
        if self.failing_validation || !self.programs.contains_key(program) {
            return Err(DeviceError("program is not valid".to_owned()));
        }
        Ok(())
    }

    fn use_program(&mut self, program: &Handle) {
        self.record(Command::UseProgram(*program));
    }

    fn attribute_location(&mut self, program: &Handle, name: &str) -> Option<u32> {
        if self.hidden_names.contains(name) {
            return None;
        }
        let position = self
            .programs
            .get(program)?
            .attributes
            .iter()
            .position(|attribute| attribute == name)?;
        u32::try_from(position).ok()
    }

    fn uniform_location(&mut self, program: &Handle, name: &str) -> Option<Handle> {
        let uniforms = &self.programs.get(program)?.uniforms;
        if self.hidden_names.contains(name) || !uniforms.contains(name) {
            return None;
        }
        let handle = self.next_handle();
        self.uniform_names.insert(handle, name.to_owned());
        Some(handle)
    }

    fn create_buffer(&mut self, data: &[u8]) -> Result<Handle, DeviceError> {
        let handle = self.next_handle();
        self.buffers.insert(handle, data.to_vec());
        Ok(handle)
    }

    fn bind_attribute(&mut self, buffer: &Handle, location: u32, components: u8) {
        self.record(Command::BindAttribute {
            buffer: *buffer,
            location,
            components,
        });
    }

    fn enable_attribute(&mut self, location: u32) {
        self.enabled_attributes.insert(location);
        self.record(Command::EnableAttribute(location));
    }

    fn disable_attribute(&mut self, location: u32) {
        self.enabled_attributes.remove(&location);
        self.record(Command::DisableAttribute(location));
    }

    fn create_texture(&mut self) -> Result<Handle, DeviceError> {
        let handle = self.next_handle();
        self.textures.insert(
            handle,
            TextureRecord {
                live: true,
                ..TextureRecord::default()
            },
        );
        Ok(handle)
    }

    fn upload_texture(
        &mut self,
        texture: &Handle,
        image: TextureImage<'_>,
    ) -> Result<(), DeviceError> {
        let expected = u64::from(image.width) * u64::from(image.height) * 4;
        if u64::try_from(image.pixels.len()).ok() != Some(expected) {
            return Err(DeviceError(format!(
                "{}x{} image needs {expected} bytes, got {}",
                image.width,
                image.height,
                image.pixels.len()
            )));
        }
        let record = self
            .textures
            .get_mut(texture)
            .ok_or_else(|| DeviceError(format!("unknown texture {texture:?}")))?;
        record.width = image.width;
        record.height = image.height;
        record.pixels = image.pixels.to_vec();
        record.mipmaps = false;
        Ok(())
    }

    fn configure_sampler(&mut self, texture: &Handle, sampler: SamplerSettings) {
        if let Some(record) = self.textures.get_mut(texture) {
            record.sampler = Some(sampler);
        }
    }

    fn generate_mipmaps(&mut self, texture: &Handle) {
        if let Some(record) = self.textures.get_mut(texture) {
            record.mipmaps = true;
        }
    }

    fn is_texture(&self, texture: &Handle) -> bool {
        self.textures.get(texture).is_some_and(|record| record.live)
    }

    fn bind_texture(&mut self, unit: u32, texture: &Handle) {
        if unit == 0 {
            self.bound_texture = Some(*texture);
        }
        self.record(Command::BindTexture {
            unit,
            texture: *texture,
        });
    }

    fn set_uniform_matrix(&mut self, location: &Handle, matrix: &Mat4) {
        self.record(Command::UniformMatrix {
            location: *location,
            matrix: *matrix,
        });
    }

    fn set_uniform_color(&mut self, location: &Handle, color: Vec3) {
        self.record(Command::UniformColor {
            location: *location,
            color,
        });
    }

    fn set_uniform_sampler(&mut self, location: &Handle, unit: u32) {
        self.record(Command::UniformSampler {
            location: *location,
            unit,
        });
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.record(Command::Clear(color));
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) {
        let enabled_attributes = self.enabled_attributes.iter().copied().collect();
        self.record(Command::Draw {
            primitive,
            first,
            count,
            enabled_attributes,
            texture: self.bound_texture,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = "
        attribute vec3 a_position;
        attribute vec2 a_tex_coord;
        uniform mat4 u_model;
        void main() {}
    ";
    const FRAGMENT: &str = "
        precision mediump float;
        uniform sampler2D u_texture;
        void main() {}
    ";

    fn program(device: &mut RecordingDevice) -> Handle {
        let vertex = device.compile_shader(ShaderStage::Vertex, VERTEX).unwrap();
        let fragment = device
            .compile_shader(ShaderStage::Fragment, FRAGMENT)
            .unwrap();
        device.link_program(&vertex, &fragment).unwrap()
    }

    #[test]
    fn locations_follow_declarations() {
        let mut device = RecordingDevice::new((100, 100));
        let program = program(&mut device);

        assert_eq!(device.attribute_location(&program, "a_position"), Some(0));
        assert_eq!(device.attribute_location(&program, "a_tex_coord"), Some(1));
        assert_eq!(device.attribute_location(&program, "a_color"), None);

        let sampler = device.uniform_location(&program, "u_texture").unwrap();
        assert_eq!(device.uniform_name(sampler), Some("u_texture"));
        assert!(device.uniform_location(&program, "u_color").is_none());

        device.hide_location("u_model");
        assert!(device.uniform_location(&program, "u_model").is_none());
    }

    #[test]
    fn injected_failures() {
        let mut device = RecordingDevice::new((100, 100));
        device.fail_compile(ShaderStage::Fragment);
        assert!(device.compile_shader(ShaderStage::Vertex, VERTEX).is_ok());
        assert!(device
            .compile_shader(ShaderStage::Fragment, FRAGMENT)
            .is_err());
    }

    #[test]
    fn draw_captures_enabled_attributes_and_texture() {
        let mut device = RecordingDevice::new((100, 100));
        let texture = device.create_texture().unwrap();
        device.enable_attribute(0);
        device.enable_attribute(1);
        device.disable_attribute(1);
        device.bind_texture(0, &texture);
        device.draw_arrays(Primitive::Triangles, 0, 36);

        assert_eq!(
            device.draws().last(),
            Some(&Command::Draw {
                primitive: Primitive::Triangles,
                first: 0,
                count: 36,
                enabled_attributes: vec![0],
                texture: Some(texture),
            })
        );
    }

    #[test]
    fn upload_checks_pixel_count() {
        let mut device = RecordingDevice::new((100, 100));
        let texture = device.create_texture().unwrap();
        let image = TextureImage {
            width: 2,
            height: 2,
            pixels: &[0; 12],
        };
        assert!(device.upload_texture(&texture, image).is_err());

        let pixels = [255; 16];
        let image = TextureImage {
            width: 2,
            height: 2,
            pixels: &pixels,
        };
        device.upload_texture(&texture, image).unwrap();
        assert_eq!(device.texture(texture).map(|record| record.width), Some(2));
        assert!(device.is_texture(&texture));

        device.invalidate_texture(texture);
        assert!(!device.is_texture(&texture));
    }
}
