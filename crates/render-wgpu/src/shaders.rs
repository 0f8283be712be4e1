//! WGSL sources for the built-in shader programs.
//!
//! Every program is its own module. Vertex programs expose `vs_main`, pixel
//! programs `fs_main`. Bind groups are shared by all pipelines:
//! group 0 = frame lighting, group 1 = per-draw object data (dynamic offset),
//! group 2 = material textures (2D pair or cubemap, by pipeline state).

use prism_render::ShaderProgram;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const PIXEL_ENTRY: &str = "fs_main";

pub fn source(program: ShaderProgram) -> &'static str {
    match program {
        ShaderProgram::LitVertex => LIT_VS,
        ShaderProgram::LitPixel => LIT_PS,
        ShaderProgram::UnlitPixel => UNLIT_PS,
        ShaderProgram::SkyVertex => SKY_VS,
        ShaderProgram::SkyPixel => SKY_PS,
    }
}

const LIT_VS: &str = r#"
struct Object {
    world: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    tint: vec4<f32>,
};

@group(1) @binding(0)
var<uniform> object: Object;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) tangent: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) tangent: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = object.world * vec4<f32>(vertex.position, 1.0);
    var out: VertexOutput;
    out.clip_position = object.projection * object.view * world_pos;
    out.world_position = world_pos.xyz;
    out.normal = (object.world * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.uv = vertex.uv;
    out.tangent = (object.world * vec4<f32>(vertex.tangent, 0.0)).xyz;
    return out;
}
"#;

const LIT_PS: &str = r#"
struct DirectionalLight {
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    direction: vec4<f32>,
};

struct PointLight {
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    // xyz = position, w = range
    position_range: vec4<f32>,
};

struct Lighting {
    directional: array<DirectionalLight, 3>,
    point: array<PointLight, 4>,
    // x = directional count, y = point count
    counts: vec4<u32>,
};

struct Object {
    world: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    tint: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> lighting: Lighting;
@group(1) @binding(0)
var<uniform> object: Object;
@group(2) @binding(0)
var diffuse_map: texture_2d<f32>;
@group(2) @binding(1)
var normal_map: texture_2d<f32>;
@group(2) @binding(2)
var surface_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) tangent: vec3<f32>,
};

fn surface_normal(in: VertexOutput) -> vec3<f32> {
    let n = normalize(in.normal);
    let t = normalize(in.tangent - n * dot(in.tangent, n));
    let b = cross(t, n);
    let sampled = textureSample(normal_map, surface_sampler, in.uv).xyz * 2.0 - 1.0;
    return normalize(mat3x3<f32>(t, b, n) * sampled);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(diffuse_map, surface_sampler, in.uv) * object.tint;
    let n = surface_normal(in);

    var light = vec3<f32>(0.0);
    for (var i = 0u; i < lighting.counts.x; i++) {
        let l = lighting.directional[i];
        let to_light = normalize(-l.direction.xyz);
        light += l.ambient.rgb + l.diffuse.rgb * max(dot(n, to_light), 0.0);
    }
    for (var i = 0u; i < lighting.counts.y; i++) {
        let l = lighting.point[i];
        let offset = l.position_range.xyz - in.world_position;
        let dist = length(offset);
        let falloff = saturate(1.0 - dist / max(l.position_range.w, 0.0001));
        let lambert = max(dot(n, offset / max(dist, 0.0001)), 0.0);
        light += (l.ambient.rgb + l.diffuse.rgb * lambert) * falloff * falloff;
    }
    return vec4<f32>(albedo.rgb * light, albedo.a);
}
"#;

const UNLIT_PS: &str = r#"
struct Object {
    world: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    tint: vec4<f32>,
};

@group(1) @binding(0)
var<uniform> object: Object;
@group(2) @binding(0)
var diffuse_map: texture_2d<f32>;
@group(2) @binding(2)
var surface_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(2) uv: vec2<f32>,
};

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(diffuse_map, surface_sampler, in.uv) * object.tint;
}
"#;

const SKY_VS: &str = r#"
struct Object {
    world: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    tint: vec4<f32>,
};

@group(1) @binding(0)
var<uniform> object: Object;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {
    // Rotation only, so the sky stays centred on the camera.
    let rotation = mat4x4<f32>(
        vec4<f32>(object.view[0].xyz, 0.0),
        vec4<f32>(object.view[1].xyz, 0.0),
        vec4<f32>(object.view[2].xyz, 0.0),
        vec4<f32>(0.0, 0.0, 0.0, 1.0),
    );
    let clip = object.projection * rotation * vec4<f32>(position, 1.0);
    var out: VertexOutput;
    // z = w puts every sky fragment on the far plane.
    out.clip_position = clip.xyww;
    out.direction = position;
    return out;
}
"#;

const SKY_PS: &str = r#"
@group(2) @binding(0)
var sky_map: texture_cube<f32>;
@group(2) @binding(1)
var sky_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(sky_map, sky_sampler, in.direction);
}
"#;
