//! The fixed robot anatomy and the per-frame draw sequence.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Quat, Vec3};
use lib_geometry::{build_cube, build_grid, build_head_cube, Mesh};
use robot_viewer_framework::{DeviceError, Primitive, RenderDevice};
use tracing::{debug, warn};

use crate::{
    camera::CameraMatrices,
    error::{ResourceError, SetupError},
    program::{Program, ShaderVariant},
    settings::ViewerSettings,
    texture::{SceneTextures, TextureSlot},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartShape {
    /// The shared unit cube.
    Box,
    /// The cube mapped onto the head atlas, turned to face -Y.
    Head,
}

/// One immutable piece of the robot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Part {
    pub name: &'static str,
    pub shape: PartShape,
    pub scale: Vec3,
    pub translation: Vec3,
    pub texture: TextureSlot,
}

const fn part(name: &'static str, scale: [f32; 3], translation: [f32; 3]) -> Part {
    Part {
        name,
        shape: PartShape::Box,
        scale: Vec3::from_array(scale),
        translation: Vec3::from_array(translation),
        texture: TextureSlot::Surface,
    }
}

/// Feet, legs, torso, arms and head, standing on the ground plane. The head is drawn last.
pub const ROBOT_PARTS: [Part; 8] = [
    part("left foot", [2.0, 3.0, 1.0], [-1.5, -0.5, 0.5]),
    part("right foot", [2.0, 3.0, 1.0], [1.5, -0.5, 0.5]),
    part("left leg", [2.0, 2.0, 6.0], [-1.5, 0.0, 4.0]),
    part("right leg", [2.0, 2.0, 6.0], [1.5, 0.0, 4.0]),
    part("torso", [6.0, 3.0, 8.0], [0.0, 0.0, 11.0]),
    part("left arm", [2.0, 2.0, 8.0], [-4.0, 0.0, 11.0]),
    part("right arm", [2.0, 2.0, 8.0], [4.0, 0.0, 11.0]),
    Part {
        name: "head",
        shape: PartShape::Head,
        scale: Vec3::new(4.0, 4.0, 4.0),
        translation: Vec3::new(0.0, 0.0, 17.0),
        texture: TextureSlot::Head,
    },
];

impl Part {
    #[must_use]
    pub fn rotation(&self) -> Quat {
        match self.shape {
            PartShape::Box => Quat::IDENTITY,
            PartShape::Head => Quat::from_rotation_z(FRAC_PI_2),
        }
    }

    /// translate ∘ rotate ∘ scale
    #[must_use]
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation(), self.translation)
    }

    /// Box parts repeat the surface texture once per unit of their size.
    #[must_use]
    pub fn mesh(&self) -> Mesh {
        match self.shape {
            PartShape::Box => build_cube(self.scale),
            PartShape::Head => build_head_cube(),
        }
    }
}

struct MeshBuffers<D: RenderDevice> {
    positions: D::Buffer,
    tex_coords: D::Buffer,
    vertex_count: u32,
}

fn vertex_count(count: usize) -> Result<u32, SetupError> {
    u32::try_from(count)
        .map_err(|_| SetupError::Buffer(DeviceError(format!("{count} vertices are too many"))))
}

impl<D: RenderDevice> MeshBuffers<D> {
    fn upload(device: &mut D, mesh: &Mesh) -> Result<Self, SetupError> {
        Ok(Self {
            positions: device
                .create_buffer(mesh.position_bytes())
                .map_err(SetupError::Buffer)?,
            tex_coords: device
                .create_buffer(mesh.tex_coord_bytes())
                .map_err(SetupError::Buffer)?,
            vertex_count: vertex_count(mesh.vertex_count())?,
        })
    }
}

/// Programs and buffers created once during setup and used by every frame.
pub struct RenderContext<D: RenderDevice> {
    textured: Program<D>,
    flat_color: Program<D>,
    /// one entry per [`ROBOT_PARTS`] entry
    parts: Vec<MeshBuffers<D>>,
    grid: D::Buffer,
    grid_vertex_count: u32,
    grid_color: Vec3,
    clear_color: [f32; 4],
}

impl<D: RenderDevice> RenderContext<D> {
    /// Compiles both programs and uploads all geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if a program fails to build or a buffer cannot be created.
    pub fn new(device: &mut D, settings: &ViewerSettings) -> Result<Self, SetupError> {
        let textured = Program::new(device, ShaderVariant::Textured)?;
        let flat_color = Program::new(device, ShaderVariant::FlatColor)?;

        let parts = ROBOT_PARTS
            .iter()
            .map(|part| MeshBuffers::upload(device, &part.mesh()))
            .collect::<Result<Vec<_>, _>>()?;

        let grid_positions = build_grid(settings.grid.extent, settings.grid.step);
        let grid = device
            .create_buffer(bytemuck::cast_slice(&grid_positions))
            .map_err(SetupError::Buffer)?;
        let grid_vertex_count = vertex_count(grid_positions.len() / 3)?;

        debug!(
            "render context ready: {} part meshes, grid {} vertices",
            parts.len(),
            grid_vertex_count
        );
        Ok(Self {
            textured,
            flat_color,
            parts,
            grid,
            grid_vertex_count,
            grid_color: settings.grid.color(),
            clear_color: settings.clear_color,
        })
    }

    /// Draws one frame.
    ///
    /// Every part is drawn independently; a failing part is logged and does not keep the
    /// others from being drawn. Returns `true` only if every part and the grid were drawn.
    pub fn draw_scene(
        &self,
        device: &mut D,
        matrices: &CameraMatrices,
        textures: &SceneTextures<D>,
    ) -> bool {
        device.clear(self.clear_color);

        let mut complete = match self.begin_parts(device, matrices) {
            Ok(()) => {
                let mut complete = true;
                for (part, buffers) in ROBOT_PARTS.iter().zip(&self.parts) {
                    if let Err(error) = self.draw_part(device, part, buffers, textures) {
                        warn!("failed to draw {}: {error}", part.name);
                        complete = false;
                    }
                }
                complete
            }
            Err(error) => {
                warn!("failed to draw the robot: {error}");
                false
            }
        };

        if let Err(error) = self.draw_grid(device, matrices) {
            warn!("failed to draw the grid: {error}");
            complete = false;
        }
        complete
    }

    fn begin_parts(&self, device: &mut D, matrices: &CameraMatrices) -> Result<(), ResourceError> {
        let program = &self.textured;
        device.use_program(&program.handle);
        device.set_uniform_matrix(program.view()?, &matrices.view);
        device.set_uniform_matrix(program.projection()?, &matrices.projection);
        device.set_uniform_sampler(program.sampler()?, 0);
        device.enable_attribute(program.position()?);
        device.enable_attribute(program.tex_coord()?);
        Ok(())
    }

    fn draw_part(
        &self,
        device: &mut D,
        part: &Part,
        buffers: &MeshBuffers<D>,
        textures: &SceneTextures<D>,
    ) -> Result<(), ResourceError> {
        let texture = textures.get(part.texture);
        if !device.is_texture(texture) {
            return Err(ResourceError::InvalidTexture(part.name));
        }

        let program = &self.textured;
        device.bind_attribute(&buffers.positions, program.position()?, 3);
        device.bind_attribute(&buffers.tex_coords, program.tex_coord()?, 2);
        device.bind_texture(0, texture);
        device.set_uniform_matrix(program.model()?, &part.model_matrix());
        device.draw_arrays(Primitive::Triangles, 0, buffers.vertex_count);
        Ok(())
    }

    /// The grid has no texture coordinates, so that attribute is switched off for this draw.
    fn draw_grid(&self, device: &mut D, matrices: &CameraMatrices) -> Result<(), ResourceError> {
        let program = &self.flat_color;
        let tex_coord = self.textured.tex_coord_location();

        device.use_program(&program.handle);
        device.set_uniform_matrix(program.model()?, &Mat4::IDENTITY);
        device.set_uniform_matrix(program.view()?, &matrices.view);
        device.set_uniform_matrix(program.projection()?, &matrices.projection);
        device.set_uniform_color(program.color()?, self.grid_color);

        let position = program.position()?;
        if let Some(tex_coord) = tex_coord {
            device.disable_attribute(tex_coord);
        }
        device.enable_attribute(position);
        device.bind_attribute(&self.grid, position, 3);
        device.draw_arrays(Primitive::Lines, 0, self.grid_vertex_count);
        if let Some(tex_coord) = tex_coord {
            device.enable_attribute(tex_coord);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lib_geometry::VERTICES_PER_CUBE;
    use robot_viewer_framework::{render_device::Command, RecordingDevice};

    use super::*;
    use crate::{
        camera::{compute_matrices, CameraState, ViewParameters},
        settings::LensSettings,
    };

    fn setup() -> (
        RecordingDevice,
        RenderContext<RecordingDevice>,
        SceneTextures<RecordingDevice>,
    ) {
        let mut device = RecordingDevice::new((600, 600));
        let context = RenderContext::new(&mut device, &ViewerSettings::default()).unwrap();
        let textures = SceneTextures::new(&mut device).unwrap();
        device.take_commands();
        (device, context, textures)
    }

    fn matrices() -> CameraMatrices {
        let state = CameraState::Static(ViewParameters::default());
        compute_matrices(&state, (600, 600), &LensSettings::default()).unwrap()
    }

    fn draw_counts(device: &RecordingDevice) -> Vec<(Primitive, u32)> {
        device
            .draws()
            .filter_map(|command| match command {
                Command::Draw {
                    primitive, count, ..
                } => Some((*primitive, *count)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn anatomy_is_complete() {
        let names = ROBOT_PARTS.map(|part| part.name);
        assert_eq!(
            names,
            [
                "left foot",
                "right foot",
                "left leg",
                "right leg",
                "torso",
                "left arm",
                "right arm",
                "head"
            ]
        );
        let heads: Vec<_> = ROBOT_PARTS
            .iter()
            .filter(|part| part.shape == PartShape::Head)
            .collect();
        assert_eq!(heads.len(), 1);
        assert_eq!(heads[0].texture, TextureSlot::Head);
    }

    #[test]
    fn robot_stands_on_the_ground() {
        let lowest = ROBOT_PARTS
            .iter()
            .map(|part| part.translation.z - part.scale.z / 2.0)
            .fold(f32::INFINITY, f32::min);
        assert!(lowest.abs() < 1e-6);
    }

    #[test]
    fn head_faces_front() {
        let head = ROBOT_PARTS
            .iter()
            .find(|part| part.shape == PartShape::Head)
            .unwrap();
        // the atlas front cell sits on the -X face of the head mesh
        let front = head.model_matrix().transform_vector3(Vec3::NEG_X);
        assert!(front.normalize().abs_diff_eq(Vec3::NEG_Y, 1e-6));
    }

    #[test]
    fn surface_repeats_with_part_size() {
        for part in &ROBOT_PARTS {
            let largest = part.mesh().tex_coords.into_iter().fold(0.0, f32::max);
            if part.shape == PartShape::Box {
                assert_eq!(largest, part.scale.max_element(), "{}", part.name);
            } else {
                assert!(largest <= 1.0);
            }
        }
    }

    #[test]
    fn every_part_gets_its_own_buffers() {
        let mut device = RecordingDevice::new((600, 600));
        let context = RenderContext::new(&mut device, &ViewerSettings::default()).unwrap();
        // positions and texture coordinates per part, plus the grid
        assert_eq!(device.buffer_count(), 2 * ROBOT_PARTS.len() + 1);

        let torso = &context.parts[4];
        let tex_coords = device.buffer(torso.tex_coords).unwrap();
        assert_eq!(tex_coords, ROBOT_PARTS[4].mesh().tex_coord_bytes());
    }

    #[test]
    fn frame_draws_parts_then_grid() {
        let (mut device, context, textures) = setup();
        let matrices = matrices();

        assert!(context.draw_scene(&mut device, &matrices, &textures));

        let draws = draw_counts(&device);
        let parts = ROBOT_PARTS.len();
        assert_eq!(draws.len(), parts + 1);
        let cube_vertices = u32::try_from(VERTICES_PER_CUBE).unwrap();
        assert!(draws[..parts]
            .iter()
            .all(|draw| *draw == (Primitive::Triangles, cube_vertices)));
        assert_eq!(draws[parts], (Primitive::Lines, 21 * 2 * 2));

        assert!(matches!(device.commands().first(), Some(Command::Clear(_))));
        assert_eq!(device.last_matrix("u_view"), Some(matrices.view));
        assert_eq!(
            device.last_matrix("u_projection"),
            Some(matrices.projection)
        );
    }

    #[test]
    fn grid_is_drawn_without_texture_coordinates() {
        let (mut device, context, textures) = setup();
        let tex_coord = context.textured.tex_coord_location().unwrap();

        context.draw_scene(&mut device, &matrices(), &textures);

        let commands = device.commands();
        let grid = commands
            .iter()
            .position(|command| {
                matches!(
                    command,
                    Command::Draw {
                        primitive: Primitive::Lines,
                        ..
                    }
                )
            })
            .unwrap();
        let Command::Draw {
            enabled_attributes, ..
        } = &commands[grid]
        else {
            unreachable!();
        };
        assert!(!enabled_attributes.contains(&tex_coord));
        assert!(commands[grid..].contains(&Command::EnableAttribute(tex_coord)));
    }

    #[test]
    fn invalid_texture_fails_only_its_parts() {
        let (mut device, context, textures) = setup();
        device.invalidate_texture(textures.head);

        assert!(!context.draw_scene(&mut device, &matrices(), &textures));

        let draws = draw_counts(&device);
        // every box part and the grid still made it
        assert_eq!(draws.len(), ROBOT_PARTS.len());
        assert_eq!(draws.last(), Some(&(Primitive::Lines, 84)));
    }

    #[test]
    fn missing_location_fails_the_frame_but_not_the_grid() {
        let mut device = RecordingDevice::new((600, 600));
        device.hide_location("u_texture");
        let context = RenderContext::new(&mut device, &ViewerSettings::default()).unwrap();
        let textures = SceneTextures::new(&mut device).unwrap();
        device.take_commands();

        assert!(!context.draw_scene(&mut device, &matrices(), &textures));
        assert_eq!(draw_counts(&device), [(Primitive::Lines, 84)]);
    }
}
