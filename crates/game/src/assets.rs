use glam::{Vec3, Vec4};
use prism_common::{MaterialHandle, MeshHandle, RenderPriority, Transform};
use prism_render::{
    geometry, texture, AssetLibrary, GraphicsContext, Material, Mesh, RenderError,
    ResourceFactory, ShaderProgram, Skybox,
};
use prism_scene::{Animation, Entity};

/// Priority of materials drawn with the lit pixel shader.
pub const LIT: RenderPriority = RenderPriority(0);
/// Priority of materials drawn with the unlit pixel shader.
pub const UNLIT: RenderPriority = RenderPriority(1);

/// Everything the demo uploads at startup.
#[derive(Debug, Clone)]
pub struct GameAssets {
    library: AssetLibrary,
    skybox: Skybox,
    palette: Vec<Entity>,
    showcase: Vec<Entity>,
}

struct Handles {
    cube: MeshHandle,
    sphere: MeshHandle,
    ground: MeshHandle,
    checker: MaterialHandle,
    red: MaterialHandle,
    bumpy: MaterialHandle,
    gold: MaterialHandle,
    glow: MaterialHandle,
}

impl GameAssets {
    /// Build the shader, texture, mesh and material set through `ctx`.
    pub fn load<C>(ctx: &mut C) -> Result<Self, RenderError>
    where
        C: GraphicsContext + ResourceFactory + ?Sized,
    {
        let lit_vs = ctx.create_shader(ShaderProgram::LitVertex)?;
        let lit_ps = ctx.create_shader(ShaderProgram::LitPixel)?;
        let unlit_ps = ctx.create_shader(ShaderProgram::UnlitPixel)?;
        let sky_vs = ctx.create_shader(ShaderProgram::SkyVertex)?;
        let sky_ps = ctx.create_shader(ShaderProgram::SkyPixel)?;

        let checker = ctx.create_texture(
            "checker",
            &texture::checkerboard(256, 8, [230, 230, 230, 255], [60, 60, 70, 255]),
        )?;
        let ripples = ctx.create_texture("ripples", &texture::ripple_normal(128, 4.0, 0.6))?;
        let sky = ctx.create_cubemap(
            "sky",
            &texture::sky_gradient(128, [40, 90, 200], [200, 220, 240], [50, 45, 40]),
        )?;

        let mut library = AssetLibrary::new();
        let cube = library.add_mesh(Mesh::from_data(ctx, "cube", &geometry::cube(1.0))?);
        let sphere = library.add_mesh(Mesh::from_data(
            ctx,
            "sphere",
            &geometry::sphere(0.5, 24, 12),
        )?);
        let ground = library.add_mesh(Mesh::from_data(ctx, "ground", &geometry::plane(1.0))?);

        let handles = Handles {
            cube,
            sphere,
            ground,
            checker: library.add_material(
                Material::new("checker", Vec4::ONE, lit_vs, lit_ps)
                    .with_diffuse(checker)
                    .with_normal_map(ripples)
                    .with_priority(LIT),
            ),
            red: library.add_material(
                Material::new("red", Vec4::new(0.9, 0.2, 0.2, 1.0), lit_vs, lit_ps)
                    .with_priority(LIT),
            ),
            bumpy: library.add_material(
                Material::new("bumpy", Vec4::new(0.3, 0.6, 1.0, 1.0), lit_vs, lit_ps)
                    .with_normal_map(ripples)
                    .with_priority(LIT),
            ),
            gold: library.add_material(
                Material::new("gold", Vec4::new(1.0, 0.8, 0.2, 1.0), lit_vs, unlit_ps)
                    .with_priority(UNLIT),
            ),
            glow: library.add_material(
                Material::new("glow", Vec4::new(0.6, 1.0, 0.6, 1.0), lit_vs, unlit_ps)
                    .with_diffuse(checker)
                    .with_priority(UNLIT),
            ),
        };

        let palette = palette(&library, &handles)?;
        let showcase = showcase(&library, &handles)?;
        tracing::info!(
            meshes = library.mesh_count(),
            materials = library.material_count(),
            "assets loaded"
        );

        Ok(Self {
            skybox: Skybox::new(cube, sky_vs, sky_ps, sky),
            library,
            palette,
            showcase,
        })
    }

    pub fn library(&self) -> &AssetLibrary {
        &self.library
    }

    pub fn skybox(&self) -> &Skybox {
        &self.skybox
    }

    /// Prototypes that batch-added geometry is copied from.
    pub fn palette(&self) -> &[Entity] {
        &self.palette
    }

    /// Hand-placed entities present from the first frame.
    pub fn showcase(&self) -> &[Entity] {
        &self.showcase
    }
}

fn palette(library: &AssetLibrary, h: &Handles) -> Result<Vec<Entity>, RenderError> {
    let scaled = |s: f32| {
        let mut t = Transform::new();
        t.set_scale(Vec3::splat(s));
        t
    };
    Ok(vec![
        library.entity(h.cube, h.checker)?,
        library.entity(h.cube, h.red)?.with_transform(scaled(0.6)),
        library
            .entity(h.sphere, h.bumpy)?
            .with_transform(scaled(1.4))
            .with_animation(Animation::Spin {
                rate: Vec3::new(0.0, 1.0, 0.0),
            }),
        library
            .entity(h.cube, h.gold)?
            .with_transform(scaled(0.8))
            .with_animation(Animation::Spin {
                rate: Vec3::new(0.7, 0.3, 0.0),
            }),
        library
            .entity(h.sphere, h.glow)?
            .with_animation(Animation::Bob {
                origin: Vec3::ZERO,
                axis: Vec3::Y,
                amplitude: 0.5,
                frequency: 2.0,
            }),
    ])
}

fn showcase(library: &AssetLibrary, h: &Handles) -> Result<Vec<Entity>, RenderError> {
    let mut ground = Transform::from_position(Vec3::new(0.0, -4.0, 15.0));
    ground.set_scale(Vec3::new(60.0, 1.0, 60.0));

    Ok(vec![
        library.entity(h.ground, h.checker)?.with_transform(ground),
        library
            .entity(h.cube, h.red)?
            .with_transform(Transform::from_position(Vec3::new(-3.0, 0.0, 5.0)))
            .with_animation(Animation::Spin {
                rate: Vec3::new(0.0, 1.5, 0.0),
            }),
        library
            .entity(h.sphere, h.bumpy)?
            .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, 5.0)))
            .with_animation(Animation::Bob {
                origin: Vec3::new(0.0, 0.0, 5.0),
                axis: Vec3::X,
                amplitude: 1.5,
                frequency: 1.0,
            }),
        library
            .entity(h.cube, h.gold)?
            .with_transform(Transform::from_position(Vec3::new(3.0, 0.0, 5.0)))
            .with_animation(Animation::Pulse {
                base: Vec3::ONE,
                amplitude: 0.3,
                frequency: 3.0,
            }),
    ])
}
