use std::collections::HashMap;

use anyhow::Context;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, HtmlImageElement, WebGl2RenderingContext as GL, WebGlFramebuffer, WebGlProgram,
    WebGlRenderbuffer, WebGlShader, WebGlTexture, WebGlUniformLocation, WebGlVertexArrayObject,
};

use super::shaders::{IMAGE_FRAGMENT_SHADER, IMAGE_UNIFORMS, IMAGE_VERTEX_SHADER, POST_UNIFORMS};
use super::JsResultExt;
use crate::config::GalleryConfig;
use crate::gallery::Gallery;
use crate::geometry::{PlaneGeometry, QUAD_INDICES, QUAD_VERTICES};
use crate::layout::Viewport;
use crate::postprocess::{POST_FRAGMENT_SHADER, POST_VERTEX_SHADER};
use crate::scheduler::Renderer;

struct Program {
    program: WebGlProgram,
    uniforms: HashMap<&'static str, WebGlUniformLocation>,
}

impl Program {
    fn new(gl: &GL, vertex: &str, fragment: &str, names: &[&'static str]) -> anyhow::Result<Self> {
        let vs = compile_shader(gl, GL::VERTEX_SHADER, vertex)?;
        let fs = compile_shader(gl, GL::FRAGMENT_SHADER, fragment)?;
        let program = gl.create_program().context("failed to create program")?;
        gl.attach_shader(&program, &vs);
        gl.attach_shader(&program, &fs);
        gl.link_program(&program);
        if !gl.get_program_parameter(&program, GL::LINK_STATUS).as_bool().unwrap_or(false) {
            let error = gl.get_program_info_log(&program).unwrap_or_else(|| "unknown error".into());
            anyhow::bail!("failed to link program: {error}");
        }

        // uniforms the compiler optimised away simply have no location
        let uniforms = names
            .iter()
            .filter_map(|&name| gl.get_uniform_location(&program, name).map(|loc| (name, loc)))
            .collect();
        Ok(Self { program, uniforms })
    }

    fn at(&self, name: &str) -> Option<&WebGlUniformLocation> {
        self.uniforms.get(name)
    }
}

fn compile_shader(gl: &GL, kind: u32, source: &str) -> anyhow::Result<WebGlShader> {
    let shader = gl.create_shader(kind).context("failed to create shader")?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if !gl.get_shader_parameter(&shader, GL::COMPILE_STATUS).as_bool().unwrap_or(false) {
        let error = gl.get_shader_info_log(&shader).unwrap_or_else(|| "unknown error".into());
        anyhow::bail!("failed to compile shader: {error}");
    }
    Ok(shader)
}

struct Mesh {
    vao: WebGlVertexArrayObject,
    count: i32,
}

impl Mesh {
    /// Upload interleaved vertices; `layout` lists (location, components).
    fn new(gl: &GL, vertices: &[f32], indices: &[u16], layout: &[(u32, i32)]) -> anyhow::Result<Self> {
        let vao = gl.create_vertex_array().context("failed to create vertex array")?;
        gl.bind_vertex_array(Some(&vao));

        let vbo = gl.create_buffer().context("failed to create vertex buffer")?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&vbo));
        gl.buffer_data_with_array_buffer_view(
            GL::ARRAY_BUFFER,
            &js_sys::Float32Array::from(vertices),
            GL::STATIC_DRAW,
        );

        let stride: i32 = layout.iter().map(|(_, n)| n * 4).sum();
        let mut offset = 0;
        for &(location, components) in layout {
            gl.enable_vertex_attrib_array(location);
            gl.vertex_attrib_pointer_with_i32(location, components, GL::FLOAT, false, stride, offset);
            offset += components * 4;
        }

        let ibo = gl.create_buffer().context("failed to create index buffer")?;
        gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&ibo));
        gl.buffer_data_with_array_buffer_view(
            GL::ELEMENT_ARRAY_BUFFER,
            &js_sys::Uint16Array::from(indices),
            GL::STATIC_DRAW,
        );

        gl.bind_vertex_array(None);
        Ok(Self { vao, count: indices.len() as i32 })
    }

    fn draw(&self, gl: &GL) {
        gl.bind_vertex_array(Some(&self.vao));
        gl.draw_elements_with_i32(GL::TRIANGLES, self.count, GL::UNSIGNED_SHORT, 0);
        gl.bind_vertex_array(None);
    }
}

fn set_sampling(gl: &GL) {
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, GL::LINEAR as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, GL::LINEAR as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE as i32);
}

fn white_texture(gl: &GL) -> anyhow::Result<WebGlTexture> {
    let texture = gl.create_texture().context("failed to create texture")?;
    gl.bind_texture(GL::TEXTURE_2D, Some(&texture));
    gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
        GL::TEXTURE_2D,
        0,
        GL::RGBA as i32,
        1,
        1,
        0,
        GL::RGBA,
        GL::UNSIGNED_BYTE,
        Some(&[255u8, 255, 255, 255][..]),
    )
    .js_context("upload placeholder texel")?;
    set_sampling(gl);
    Ok(texture)
}

/// Texture from a decoded image; broken images get a white texel.
fn image_texture(gl: &GL, img: &HtmlImageElement) -> anyhow::Result<WebGlTexture> {
    if img.natural_width() == 0 {
        log::warn!("image {} has no pixels, using placeholder", img.src());
        return white_texture(gl);
    }
    let texture = gl.create_texture().context("failed to create texture")?;
    gl.bind_texture(GL::TEXTURE_2D, Some(&texture));
    gl.pixel_storei(GL::UNPACK_FLIP_Y_WEBGL, 1);
    gl.tex_image_2d_with_u32_and_u32_and_html_image_element(
        GL::TEXTURE_2D,
        0,
        GL::RGBA as i32,
        GL::RGBA,
        GL::UNSIGNED_BYTE,
        img,
    )
    .js_context("upload image texture")?;
    gl.pixel_storei(GL::UNPACK_FLIP_Y_WEBGL, 0);
    set_sampling(gl);
    Ok(texture)
}

/// Offscreen colour + depth target for the base pass.
struct RenderTarget {
    framebuffer: WebGlFramebuffer,
    color: WebGlTexture,
    depth: WebGlRenderbuffer,
    width: i32,
    height: i32,
}

impl RenderTarget {
    fn new(gl: &GL, width: i32, height: i32) -> anyhow::Result<Self> {
        let color = gl.create_texture().context("failed to create target texture")?;
        gl.bind_texture(GL::TEXTURE_2D, Some(&color));
        gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
            GL::TEXTURE_2D,
            0,
            GL::RGBA as i32,
            width,
            height,
            0,
            GL::RGBA,
            GL::UNSIGNED_BYTE,
            None,
        )
        .js_context("allocate target texture")?;
        set_sampling(gl);

        let depth = gl.create_renderbuffer().context("failed to create depth buffer")?;
        gl.bind_renderbuffer(GL::RENDERBUFFER, Some(&depth));
        gl.renderbuffer_storage(GL::RENDERBUFFER, GL::DEPTH_COMPONENT16, width, height);

        let framebuffer = gl.create_framebuffer().context("failed to create framebuffer")?;
        gl.bind_framebuffer(GL::FRAMEBUFFER, Some(&framebuffer));
        gl.framebuffer_texture_2d(GL::FRAMEBUFFER, GL::COLOR_ATTACHMENT0, GL::TEXTURE_2D, Some(&color), 0);
        gl.framebuffer_renderbuffer(GL::FRAMEBUFFER, GL::DEPTH_ATTACHMENT, GL::RENDERBUFFER, Some(&depth));
        let status = gl.check_framebuffer_status(GL::FRAMEBUFFER);
        gl.bind_framebuffer(GL::FRAMEBUFFER, None);
        if status != GL::FRAMEBUFFER_COMPLETE {
            anyhow::bail!("render target incomplete: 0x{status:x}");
        }
        Ok(Self { framebuffer, color, depth, width, height })
    }

    fn delete(self, gl: &GL) {
        gl.delete_framebuffer(Some(&self.framebuffer));
        gl.delete_texture(Some(&self.color));
        gl.delete_renderbuffer(Some(&self.depth));
    }
}

/// WebGL2 backend: image planes, then the distortion pass when compositing.
pub struct GlRenderer {
    gl: GL,
    canvas: HtmlCanvasElement,
    pixel_ratio: f64,
    images: Program,
    post: Program,
    plane: Mesh,
    quad: Mesh,
    textures: Vec<WebGlTexture>,
    overlay: WebGlTexture,
    target: Option<RenderTarget>,
}

impl GlRenderer {
    pub fn new(
        canvas: HtmlCanvasElement,
        sources: &[HtmlImageElement],
        overlay: Option<&HtmlImageElement>,
        config: &GalleryConfig,
        pixel_ratio: f64,
    ) -> anyhow::Result<Self> {
        let options = js_sys::Object::new();
        js_sys::Reflect::set(&options, &"antialias".into(), &true.into()).js_context("context options")?;
        js_sys::Reflect::set(&options, &"alpha".into(), &true.into()).js_context("context options")?;
        let gl: GL = canvas
            .get_context_with_context_options("webgl2", &options)
            .js_context("webgl2 context")?
            .context("WebGL2 not supported")?
            .dyn_into()
            .map_err(|_| anyhow::anyhow!("context is not WebGL2"))?;

        let images = Program::new(&gl, IMAGE_VERTEX_SHADER, IMAGE_FRAGMENT_SHADER, IMAGE_UNIFORMS)?;
        let post = Program::new(&gl, POST_VERTEX_SHADER, POST_FRAGMENT_SHADER, POST_UNIFORMS)?;

        let geometry = PlaneGeometry::new(config.plane_segments);
        let plane = Mesh::new(&gl, &geometry.vertices, &geometry.indices, &[(0, 3), (1, 2)])?;
        let quad = Mesh::new(&gl, &QUAD_VERTICES, &QUAD_INDICES, &[(0, 2)])?;

        let textures = sources
            .iter()
            .map(|img| image_texture(&gl, img))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let overlay = match overlay {
            Some(img) => image_texture(&gl, img)?,
            None => white_texture(&gl)?,
        };

        log::info!("webgl2 ready, {} textures, pixel ratio {pixel_ratio}", textures.len());
        Ok(Self {
            gl,
            canvas,
            pixel_ratio,
            images,
            post,
            plane,
            quad,
            textures,
            overlay,
            target: None,
        })
    }

    fn buffer_size(&self) -> (i32, i32) {
        (self.canvas.width() as i32, self.canvas.height() as i32)
    }

    fn draw_images(&self, gallery: &Gallery) {
        let gl = &self.gl;
        let (w, h) = self.buffer_size();
        gl.viewport(0, 0, w, h);
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
        gl.enable(GL::DEPTH_TEST);
        gl.disable(GL::CULL_FACE);

        let p = &self.images;
        gl.use_program(Some(&p.program));
        gl.uniform_matrix4fv_with_f32_array(p.at("projectionMatrix"), false, &gallery.camera.projection().to_cols_array());
        gl.uniform_matrix4fv_with_f32_array(p.at("viewMatrix"), false, &gallery.camera.view().to_cols_array());
        gl.uniform1i(p.at("uImage"), 0);
        gl.uniform1i(p.at("oceanTexture"), 1);
        gl.active_texture(GL::TEXTURE1);
        gl.bind_texture(GL::TEXTURE_2D, Some(&self.overlay));

        for (image, texture) in gallery.registry.images().iter().zip(&self.textures) {
            let m = &image.material;
            gl.uniform_matrix4fv_with_f32_array(p.at("modelMatrix"), false, &image.mesh.model_matrix().to_cols_array());
            gl.uniform1f(p.at("time"), m.time);
            gl.uniform2f(p.at("hover"), m.hover.x, m.hover.y);
            gl.uniform1f(p.at("hoverState"), m.hover_state);
            gl.active_texture(GL::TEXTURE0);
            gl.bind_texture(GL::TEXTURE_2D, Some(texture));
            self.plane.draw(gl);
        }
    }

    fn ensure_target(&mut self) -> anyhow::Result<()> {
        let (w, h) = self.buffer_size();
        let stale = self.target.as_ref().map_or(true, |t| t.width != w || t.height != h);
        if stale {
            if let Some(old) = self.target.take() {
                old.delete(&self.gl);
            }
            self.target = Some(RenderTarget::new(&self.gl, w.max(1), h.max(1))?);
        }
        Ok(())
    }
}

impl Renderer for GlRenderer {
    fn render_scene(&mut self, gallery: &Gallery) -> anyhow::Result<()> {
        self.gl.bind_framebuffer(GL::FRAMEBUFFER, None);
        self.draw_images(gallery);
        Ok(())
    }

    fn composite(&mut self, gallery: &Gallery) -> anyhow::Result<()> {
        self.ensure_target()?;
        let target = self.target.as_ref().context("render target missing")?;
        let gl = &self.gl;

        gl.bind_framebuffer(GL::FRAMEBUFFER, Some(&target.framebuffer));
        self.draw_images(gallery);
        gl.bind_framebuffer(GL::FRAMEBUFFER, None);

        let (w, h) = self.buffer_size();
        gl.viewport(0, 0, w, h);
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(GL::COLOR_BUFFER_BIT);
        gl.disable(GL::DEPTH_TEST);

        let p = &self.post;
        let d = &gallery.distortion;
        gl.use_program(Some(&p.program));
        gl.active_texture(GL::TEXTURE0);
        gl.bind_texture(GL::TEXTURE_2D, Some(&target.color));
        gl.uniform1i(p.at("colorBuffer"), 0);
        gl.uniform1f(p.at("scrollSpeed"), gallery.post.scroll_speed);
        gl.uniform1f(p.at("time"), gallery.post.time);
        gl.uniform1f(p.at("falloffStart"), d.falloff_start);
        gl.uniform1f(p.at("falloffPower"), d.falloff_power);
        gl.uniform1f(p.at("skew"), d.skew);
        gl.uniform1f(p.at("speedGain"), d.speed_gain);
        self.quad.draw(gl);

        if gl.is_context_lost() {
            anyhow::bail!("webgl context lost");
        }
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) -> anyhow::Result<()> {
        let width = (viewport.width as f64 * self.pixel_ratio).round().max(1.0) as u32;
        let height = (viewport.height as f64 * self.pixel_ratio).round().max(1.0) as u32;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        let style = self.canvas.style();
        style
            .set_property("width", &format!("{}px", viewport.width))
            .js_context("canvas width")?;
        style
            .set_property("height", &format!("{}px", viewport.height))
            .js_context("canvas height")?;
        // rebuilt lazily at the next composite
        if let Some(old) = self.target.take() {
            old.delete(&self.gl);
        }
        Ok(())
    }
}
