//! Image material shaders. The post-process pair lives in `postprocess`.

pub const IMAGE_VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 position;
layout(location = 1) in vec2 uv;

uniform mat4 projectionMatrix;
uniform mat4 viewMatrix;
uniform mat4 modelMatrix;
uniform float time;
uniform vec2 hover;
uniform float hoverState;

out vec2 vUv;
out float vNoise;

void main() {
    vec3 p = position;
    float dist = distance(uv, hover);
    p.z += hoverState * 10.0 * sin(dist * 10.0 + time);
    vNoise = hoverState * sin(dist * 10.0 - time);
    vUv = uv;
    gl_Position = projectionMatrix * viewMatrix * modelMatrix * vec4(p, 1.0);
}
"#;

pub const IMAGE_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

uniform sampler2D uImage;
uniform sampler2D oceanTexture;
uniform float hoverState;
uniform float time;

in vec2 vUv;
in float vNoise;
out vec4 fragColor;

void main() {
    vec2 uv = vUv + vec2(0.0, 0.01 * vNoise);
    vec4 image = texture(uImage, uv);
    vec4 overlay = texture(oceanTexture, vUv + vec2(time * 0.01, 0.0));
    fragColor = mix(image, image * overlay, 0.3 * hoverState);
    fragColor.rgb += 0.05 * vNoise;
}
"#;

/// Uniform names looked up once per program.
pub const IMAGE_UNIFORMS: &[&str] = &[
    "projectionMatrix",
    "viewMatrix",
    "modelMatrix",
    "time",
    "hover",
    "hoverState",
    "uImage",
    "oceanTexture",
];

pub const POST_UNIFORMS: &[&str] = &[
    "colorBuffer",
    "scrollSpeed",
    "time",
    "falloffStart",
    "falloffPower",
    "skew",
    "speedGain",
];
