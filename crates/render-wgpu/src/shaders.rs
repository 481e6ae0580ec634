/// Lit pass: Phong shading from the ambient, key and point lights, PCF
/// shadows from the key light, linear fog. Used by both the solid and the
/// wireframe pipelines.
pub const WORLD_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    ambient: vec4<f32>,
    key_dir: vec4<f32>,
    key_color: vec4<f32>,
    point_pos: vec4<f32>,
    point_color: vec4<f32>,
    fog_color: vec4<f32>,
    // x: fog near, y: fog far, z: shadow texel size, w: depth bias
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0)
var shadow_map: texture_depth_2d;
@group(1) @binding(1)
var shadow_sampler: sampler_comparison;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    // rgb emissive, w shininess
    @location(7) emissive: vec4<f32>,
    // x specular strength, y receives shadow
    @location(8) surface: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec3<f32>,
    @location(3) emissive: vec4<f32>,
    @location(4) surface: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = globals.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.color = instance.color.rgb;
    out.emissive = instance.emissive;
    out.surface = instance.surface;
    return out;
}

fn shadow_visibility(world_pos: vec3<f32>) -> f32 {
    let light_clip = globals.light_view_proj * vec4<f32>(world_pos, 1.0);
    let ndc = light_clip.xyz / light_clip.w;
    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5);
    if (uv.x < 0.0 || uv.x > 1.0 || uv.y < 0.0 || uv.y > 1.0 || ndc.z > 1.0) {
        return 1.0;
    }
    let texel = globals.params.z;
    let depth = ndc.z - globals.params.w;
    var lit = 0.0;
    for (var x = -1; x <= 1; x++) {
        for (var y = -1; y <= 1; y++) {
            let offset = vec2<f32>(f32(x), f32(y)) * texel;
            lit += textureSampleCompareLevel(shadow_map, shadow_sampler, uv + offset, depth);
        }
    }
    return lit / 9.0;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    let to_eye = globals.camera_pos.xyz - in.world_pos;
    let v = normalize(to_eye);
    let shininess = max(in.emissive.w, 1.0);
    let specular = in.surface.x;

    var visibility = 1.0;
    if (in.surface.y > 0.5) {
        visibility = shadow_visibility(in.world_pos);
    }

    let l_key = normalize(globals.key_dir.xyz);
    let h_key = normalize(l_key + v);
    let key_diffuse = max(dot(n, l_key), 0.0);
    let key_spec = pow(max(dot(n, h_key), 0.0), shininess) * specular * step(0.0, dot(n, l_key));

    let l_point = normalize(globals.point_pos.xyz - in.world_pos);
    let h_point = normalize(l_point + v);
    let point_diffuse = max(dot(n, l_point), 0.0);
    let point_spec = pow(max(dot(n, h_point), 0.0), shininess) * specular * step(0.0, dot(n, l_point));

    let key = globals.key_color.rgb * visibility;
    let point = globals.point_color.rgb;
    let diffuse = globals.ambient.rgb + key * key_diffuse + point * point_diffuse;
    let highlight = key * key_spec + point * point_spec;
    let lit = in.color * diffuse + highlight + in.emissive.rgb;

    let fog_near = globals.params.x;
    let fog_far = globals.params.y;
    let fog = clamp((length(to_eye) - fog_near) / max(fog_far - fog_near, 0.0001), 0.0, 1.0);
    return vec4<f32>(mix(lit, globals.fog_color.rgb, fog), 1.0);
}
"#;

/// Depth-only pass from the key light's shadow camera.
pub const SHADOW_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    ambient: vec4<f32>,
    key_dir: vec4<f32>,
    key_color: vec4<f32>,
    point_pos: vec4<f32>,
    point_color: vec4<f32>,
    fog_color: vec4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
};

@vertex
fn vs_shadow(vertex: VertexInput, instance: InstanceInput) -> @builtin(position) vec4<f32> {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    return globals.light_view_proj * model * vec4<f32>(vertex.position, 1.0);
}
"#;
