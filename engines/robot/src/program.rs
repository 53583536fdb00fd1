use robot_viewer_framework::{RenderDevice, ShaderStage};
use tracing::{debug, warn};

use crate::error::{ResourceError, SetupError};

const TEXTURED_VERTEX: &str = include_str!("../shaders/textured.vert");
const TEXTURED_FRAGMENT: &str = include_str!("../shaders/textured.frag");
const FLAT_COLOR_VERTEX: &str = include_str!("../shaders/flat_color.vert");
const FLAT_COLOR_FRAGMENT: &str = include_str!("../shaders/flat_color.frag");

pub const POSITION: &str = "a_position";
pub const TEX_COORD: &str = "a_tex_coord";
pub const MODEL: &str = "u_model";
pub const VIEW: &str = "u_view";
pub const PROJECTION: &str = "u_projection";
pub const COLOR: &str = "u_color";
pub const SAMPLER: &str = "u_texture";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderVariant {
    /// One uniform RGB color per draw.
    FlatColor,
    /// Colors sampled from a 2D texture.
    Textured,
}

impl ShaderVariant {
    #[must_use]
    pub fn sources(self) -> (&'static str, &'static str) {
        match self {
            Self::FlatColor => (FLAT_COLOR_VERTEX, FLAT_COLOR_FRAGMENT),
            Self::Textured => (TEXTURED_VERTEX, TEXTURED_FRAGMENT),
        }
    }
}

/// Compiles and links a shader pair.
///
/// The shader objects are released in every case. A program failing validation is still
/// returned, the failure is only logged.
///
/// # Errors
///
/// Returns the compiler or linker diagnostic.
pub fn compile_program<D: RenderDevice>(
    device: &mut D,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<D::Program, SetupError> {
    let vertex = device
        .compile_shader(ShaderStage::Vertex, vertex_source)
        .map_err(|error| SetupError::Compile {
            stage: ShaderStage::Vertex,
            log: error.0,
        })?;
    let fragment = match device.compile_shader(ShaderStage::Fragment, fragment_source) {
        Ok(fragment) => fragment,
        Err(error) => {
            device.delete_shader(vertex);
            return Err(SetupError::Compile {
                stage: ShaderStage::Fragment,
                log: error.0,
            });
        }
    };

    let linked = device.link_program(&vertex, &fragment);
    device.delete_shader(vertex);
    device.delete_shader(fragment);
    let program = linked.map_err(|error| SetupError::Link(error.0))?;

    if let Err(error) = device.validate_program(&program) {
        warn!("program failed validation: {error}");
    }
    Ok(program)
}

/// A linked program together with its resolved locations.
///
/// Locations the driver does not report are kept as `None`; draws depending on them fail
/// individually.
pub struct Program<D: RenderDevice> {
    pub variant: ShaderVariant,
    pub handle: D::Program,
    position: Option<u32>,
    tex_coord: Option<u32>,
    model: Option<D::UniformLocation>,
    view: Option<D::UniformLocation>,
    projection: Option<D::UniformLocation>,
    color: Option<D::UniformLocation>,
    sampler: Option<D::UniformLocation>,
}

fn require<T>(location: Option<T>, name: &'static str) -> Result<T, ResourceError> {
    location.ok_or(ResourceError::MissingLocation(name))
}

impl<D: RenderDevice> Program<D> {
    /// # Errors
    ///
    /// Returns an error if the shaders of `variant` fail to compile or link.
    pub fn new(device: &mut D, variant: ShaderVariant) -> Result<Self, SetupError> {
        let (vertex_source, fragment_source) = variant.sources();
        let handle = compile_program(device, vertex_source, fragment_source)?;

        let mut attribute = |name: &str| {
            let location = device.attribute_location(&handle, name);
            if location.is_none() {
                warn!("{variant:?} program has no attribute `{name}`");
            }
            location
        };
        let position = attribute(POSITION);
        let tex_coord = match variant {
            ShaderVariant::Textured => attribute(TEX_COORD),
            ShaderVariant::FlatColor => None,
        };

        let mut uniform = |name: &str| {
            let location = device.uniform_location(&handle, name);
            if location.is_none() {
                warn!("{variant:?} program has no uniform `{name}`");
            }
            location
        };
        let model = uniform(MODEL);
        let view = uniform(VIEW);
        let projection = uniform(PROJECTION);
        let (color, sampler) = match variant {
            ShaderVariant::FlatColor => (uniform(COLOR), None),
            ShaderVariant::Textured => (None, uniform(SAMPLER)),
        };

        debug!("{variant:?} program ready");
        Ok(Self {
            variant,
            handle,
            position,
            tex_coord,
            model,
            view,
            projection,
            color,
            sampler,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the program has no active position attribute.
    pub fn position(&self) -> Result<u32, ResourceError> {
        require(self.position, POSITION)
    }

    /// # Errors
    ///
    /// Returns an error if the program has no active texture coordinate attribute.
    pub fn tex_coord(&self) -> Result<u32, ResourceError> {
        require(self.tex_coord, TEX_COORD)
    }

    /// Texture coordinate location, if this program samples a texture at all.
    #[must_use]
    pub fn tex_coord_location(&self) -> Option<u32> {
        self.tex_coord
    }

    /// # Errors
    ///
    /// Returns an error if the program has no active model matrix.
    pub fn model(&self) -> Result<&D::UniformLocation, ResourceError> {
        require(self.model.as_ref(), MODEL)
    }

    /// # Errors
    ///
    /// Returns an error if the program has no active view matrix.
    pub fn view(&self) -> Result<&D::UniformLocation, ResourceError> {
        require(self.view.as_ref(), VIEW)
    }

    /// # Errors
    ///
    /// Returns an error if the program has no active projection matrix.
    pub fn projection(&self) -> Result<&D::UniformLocation, ResourceError> {
        require(self.projection.as_ref(), PROJECTION)
    }

    /// # Errors
    ///
    /// Returns an error if the program has no active color uniform.
    pub fn color(&self) -> Result<&D::UniformLocation, ResourceError> {
        require(self.color.as_ref(), COLOR)
    }

    /// # Errors
    ///
    /// Returns an error if the program has no active sampler.
    pub fn sampler(&self) -> Result<&D::UniformLocation, ResourceError> {
        require(self.sampler.as_ref(), SAMPLER)
    }
}
