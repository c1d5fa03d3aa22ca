use std::borrow::Cow;

use wgpu::naga::front::glsl::{Frontend, Options};
use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};
use wgpu::naga::{Module, ShaderStage};

/// Uniform names declared by [`FRAGMENT_HEADER`]; transitions must not redeclare them.
const PROVIDED_UNIFORMS: [&str; 4] = ["from", "to", "progress", "ratio"];

/// Compiles the static quad vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("quad vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Compiles an assembled transition as GLSL.
pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    label: &str,
    fragment: &AssembledFragment,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(fragment.source.clone()),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

/// A tunable declared by a transition as `uniform T name; // = default`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionParameter {
    pub ty: String,
    pub name: String,
    /// `None` when the declaration carried no default and `T(0)` was used.
    pub default: Option<String>,
}

/// Header, transition body and footer joined into one fragment shader.
#[derive(Debug, Clone)]
pub struct AssembledFragment {
    pub source: String,
    pub parameters: Vec<TransitionParameter>,
}

/// Produces a self-contained GLSL fragment shader from a transition file.
///
/// 1. Drop the `#version` directive and `precision` statements.
/// 2. Drop uniform declarations already provided by [`FRAGMENT_HEADER`].
/// 3. Turn remaining `uniform T name; // = expr` parameters into constants.
/// 4. Join [`FRAGMENT_HEADER`], the transition and [`FRAGMENT_FOOTER`].
///
/// Removed lines are kept as blank lines so that compiler diagnostics, which
/// restart at line 1 after the header, match the transition file.
pub fn assemble_fragment(source: &str) -> AssembledFragment {
    let mut sanitized = String::with_capacity(source.len());
    let mut parameters = Vec::new();
    let mut skipped_version = false;

    for line in source.lines() {
        let trimmed = line.trim_start();
        if !skipped_version && trimmed.starts_with("#version") {
            skipped_version = true;
            sanitized.push('\n');
            continue;
        }
        if trimmed.starts_with("precision ") {
            sanitized.push('\n');
            continue;
        }
        match rewrite_uniform(trimmed) {
            UniformRewrite::NotUniform => sanitized.push_str(line),
            UniformRewrite::Drop => {}
            UniformRewrite::Constants { code, params } => {
                sanitized.push_str(&code);
                parameters.extend(params);
            }
        }
        sanitized.push('\n');
    }

    AssembledFragment {
        source: format!("{FRAGMENT_HEADER}\n#line 1\n{sanitized}{FRAGMENT_FOOTER}"),
        parameters,
    }
}

enum UniformRewrite {
    NotUniform,
    Drop,
    Constants {
        code: String,
        params: Vec<TransitionParameter>,
    },
}

fn rewrite_uniform(trimmed: &str) -> UniformRewrite {
    let Some(rest) = trimmed.strip_prefix("uniform ") else {
        return UniformRewrite::NotUniform;
    };
    let (code, comment) = match rest.split_once("//") {
        Some((code, comment)) => (code, Some(comment)),
        None => (rest, None),
    };
    let Some(declaration) = code.trim().strip_suffix(';') else {
        return UniformRewrite::NotUniform;
    };
    let Some((ty, names)) = declaration.trim().split_once(char::is_whitespace) else {
        return UniformRewrite::NotUniform;
    };
    let names: Vec<&str> = names.split(',').map(str::trim).collect();
    if names
        .iter()
        .any(|name| name.is_empty() || name.contains('[') || name.contains(' '))
    {
        return UniformRewrite::NotUniform;
    }

    let names: Vec<&str> = names
        .into_iter()
        .filter(|name| !PROVIDED_UNIFORMS.contains(name))
        .collect();
    if names.is_empty() {
        return UniformRewrite::Drop;
    }
    if ty.starts_with("sampler") || ty.starts_with("texture") {
        // Extra textures cannot be bound; leave it for the compiler to report.
        return UniformRewrite::NotUniform;
    }

    let default = match (names.len(), comment) {
        (1, Some(comment)) => comment
            .trim()
            .strip_prefix('=')
            .map(|expr| expr.trim().trim_end_matches(';').trim().to_string())
            .filter(|expr| !expr.is_empty()),
        _ => None,
    };

    let mut code = String::new();
    let mut params = Vec::with_capacity(names.len());
    for name in names {
        let value = default.clone().unwrap_or_else(|| format!("{ty}(0)"));
        if !code.is_empty() {
            code.push(' ');
        }
        code.push_str(&format!("const {ty} {name} = {value};"));
        params.push(TransitionParameter {
            ty: ty.to_string(),
            name: name.to_string(),
            default: default.clone(),
        });
    }
    UniformRewrite::Constants { code, params }
}

/// Diagnostic produced when a shader stage does not survive the GLSL frontend.
#[derive(Debug, thiserror::Error)]
pub enum ShaderCheckError {
    #[error("{stage} shader failed to parse:\n{diagnostic}")]
    Parse {
        stage: &'static str,
        diagnostic: String,
    },
    #[error("{stage} shader failed validation:\n{diagnostic}")]
    Validation {
        stage: &'static str,
        diagnostic: String,
    },
}

/// Parses and validates the vertex stage without a GPU.
pub fn check_vertex() -> Result<Module, ShaderCheckError> {
    check_glsl(VERTEX_SHADER_GLSL, ShaderStage::Vertex, "vertex")
}

/// Parses and validates an assembled fragment stage without a GPU.
pub fn check_fragment(fragment: &AssembledFragment) -> Result<Module, ShaderCheckError> {
    check_glsl(&fragment.source, ShaderStage::Fragment, "fragment")
}

fn check_glsl(
    source: &str,
    stage: ShaderStage,
    label: &'static str,
) -> Result<Module, ShaderCheckError> {
    let mut frontend = Frontend::default();
    let module = frontend
        .parse(&Options::from(stage), source)
        .map_err(|errors| ShaderCheckError::Parse {
            stage: label,
            diagnostic: errors.emit_to_string(source),
        })?;
    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|error| ShaderCheckError::Validation {
            stage: label,
            diagnostic: error.emit_to_string(source),
        })?;
    Ok(module)
}

/// Vertex stage: clip position is `pos` itself, `uv` is `pos` remapped from
/// [-1, 1] to [0, 1]. Mirrored on the CPU by [`crate::quad`].
pub const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 pos;
layout(location = 0) out vec2 uv;

void main() {
    uv = (pos + vec2(1.0)) / 2.0;
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

/// GLSL prologue injected ahead of every transition.
///
/// The uniform block layout must match `TransitionUniforms` in
/// `gpu/uniforms.rs`. `from` and `to` expand to combined samplers so
/// transitions can call `texture(from, p)` as well as the accessors.
pub const FRAGMENT_HEADER: &str = r"#version 450
layout(location = 0) in vec2 uv;
layout(location = 0) out vec4 fragColor;

layout(std140, set = 0, binding = 0) uniform TransitionParams {
    float _progress;
    float _ratio;
    vec2 _resolution;
} glideshow_params;

#define progress glideshow_params._progress
#define ratio glideshow_params._ratio

layout(set = 1, binding = 0) uniform texture2D glideshow_from_texture;
layout(set = 1, binding = 1) uniform sampler glideshow_from_sampler;
layout(set = 1, binding = 2) uniform texture2D glideshow_to_texture;
layout(set = 1, binding = 3) uniform sampler glideshow_to_sampler;

#define from sampler2D(glideshow_from_texture, glideshow_from_sampler)
#define to sampler2D(glideshow_to_texture, glideshow_to_sampler)

vec4 getFromColor(vec2 coord) {
    return texture(from, coord);
}

vec4 getToColor(vec2 coord) {
    return texture(to, coord);
}
";

/// GLSL epilogue that hands the interpolated coordinate to the transition.
pub const FRAGMENT_FOOTER: &str = r"
void main() {
    fragColor = transition(uv);
}
";
