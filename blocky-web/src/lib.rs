/// Blocky Web - WebGL2 backend and JavaScript bindings
///
/// The page owns the canvas, the UI controls and the `requestAnimationFrame`
/// loop; this crate turns their events into session updates and redraws.
use blocky_core::{
    AffineTransform, AnimationGroup, FrameRenderer, FrameReport, JointId, MarkKind, Rasterizer,
    RenderError, RenderResult, Rgba, Session, SessionConfig, Viewport,
};
use nalgebra::Matrix4;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation,
};

const VERTEX_SHADER: &str = r#"#version 300 es
in vec4 a_Position;
uniform mat4 u_ModelMatrix;
uniform float u_Size;
void main() {
    gl_Position = u_ModelMatrix * a_Position;
    gl_PointSize = u_Size;
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
uniform vec4 u_FragColor;
out vec4 outColor;
void main() {
    outColor = u_FragColor;
}
"#;

/// Engine graphics context backed by a WebGL2 canvas.
pub struct WebGlRasterizer {
    gl: Gl,
    buffer: Option<WebGlBuffer>,
    a_position: u32,
    u_frag_color: WebGlUniformLocation,
    u_model_matrix: WebGlUniformLocation,
    u_size: WebGlUniformLocation,
}

impl WebGlRasterizer {
    /// Acquire the context and build the shader program.
    pub fn create(canvas: &HtmlCanvasElement, clear_color: Rgba) -> RenderResult<Self> {
        let gl = canvas
            .get_context("webgl2")
            .map_err(|_| RenderError::context("canvas refused a webgl2 context"))?
            .ok_or_else(|| RenderError::context("webgl2 is not supported"))?
            .dyn_into::<Gl>()
            .map_err(|_| RenderError::context("context is not WebGl2RenderingContext"))?;

        let program = link_program(&gl, VERTEX_SHADER, FRAGMENT_SHADER)?;
        gl.use_program(Some(&program));

        let a_position = gl.get_attrib_location(&program, "a_Position");
        if a_position < 0 {
            return Err(RenderError::link("a_Position is not an active attribute"));
        }
        let uniform = |name: &str| {
            gl.get_uniform_location(&program, name)
                .ok_or_else(|| RenderError::link(format!("{name} is not an active uniform")))
        };
        let u_frag_color = uniform("u_FragColor")?;
        let u_model_matrix = uniform("u_ModelMatrix")?;
        let u_size = uniform("u_Size")?;

        let [r, g, b, a] = clear_color.to_array();
        gl.clear_color(r, g, b, a);

        Ok(Self {
            gl,
            buffer: None,
            a_position: a_position as u32,
            u_frag_color,
            u_model_matrix,
            u_size,
        })
    }

    /// The vertex buffer is created on first use and recreated after a
    /// failed allocation.
    fn buffer(&mut self) -> RenderResult<WebGlBuffer> {
        if let Some(buffer) = &self.buffer {
            return Ok(buffer.clone());
        }
        let buffer = self
            .gl
            .create_buffer()
            .ok_or_else(|| RenderError::buffer("create_buffer returned null"))?;
        self.buffer = Some(buffer.clone());
        Ok(buffer)
    }
}

impl Rasterizer for WebGlRasterizer {
    fn clear(&mut self, color: bool, depth: bool) {
        let mut mask = 0;
        if color {
            mask |= Gl::COLOR_BUFFER_BIT;
        }
        if depth {
            mask |= Gl::DEPTH_BUFFER_BIT;
        }
        self.gl.clear(mask);
    }

    fn set_depth_test(&mut self, enabled: bool) {
        if enabled {
            self.gl.enable(Gl::DEPTH_TEST);
        } else {
            self.gl.disable(Gl::DEPTH_TEST);
        }
    }

    fn upload_vertices(&mut self, vertices: &[f32]) -> RenderResult<()> {
        let buffer = self.buffer()?;
        self.gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffer));
        self.gl.buffer_data_with_u8_array(
            Gl::ARRAY_BUFFER,
            bytemuck::cast_slice(vertices),
            Gl::DYNAMIC_DRAW,
        );
        if self.gl.get_error() == Gl::OUT_OF_MEMORY {
            self.buffer = None;
            return Err(RenderError::buffer(format!(
                "out of memory uploading {} floats",
                vertices.len()
            )));
        }
        self.gl
            .vertex_attrib_pointer_with_i32(self.a_position, 3, Gl::FLOAT, false, 0, 0);
        self.gl.enable_vertex_attrib_array(self.a_position);
        Ok(())
    }

    fn set_uniform_color(&mut self, color: Rgba) {
        self.gl
            .uniform4f(Some(&self.u_frag_color), color.r, color.g, color.b, color.a);
    }

    fn set_uniform_transform(&mut self, transform: &Matrix4<f32>) {
        self.gl.uniform_matrix4fv_with_f32_array(
            Some(&self.u_model_matrix),
            false,
            transform.as_slice(),
        );
    }

    fn set_point_size(&mut self, size: f32) {
        self.gl.uniform1f(Some(&self.u_size), size);
    }

    fn draw_triangles(&mut self, vertex_count: usize) {
        self.gl.draw_arrays(Gl::TRIANGLES, 0, vertex_count as i32);
    }

    fn draw_points(&mut self, vertex_count: usize) {
        self.gl.draw_arrays(Gl::POINTS, 0, vertex_count as i32);
    }
}

fn compile_shader(gl: &Gl, kind: u32, source: &str) -> RenderResult<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| RenderError::shader("unable to create shader object"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(RenderError::shader(log))
    }
}

fn link_program(gl: &Gl, vertex: &str, fragment: &str) -> RenderResult<WebGlProgram> {
    let vertex = compile_shader(gl, Gl::VERTEX_SHADER, vertex)?;
    let fragment = compile_shader(gl, Gl::FRAGMENT_SHADER, fragment)?;
    let program = gl
        .create_program()
        .ok_or_else(|| RenderError::link("unable to create program object"))?;
    gl.attach_shader(&program, &vertex);
    gl.attach_shader(&program, &fragment);
    gl.link_program(&program);

    if gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(RenderError::link(log))
    }
}

/// Mark kinds in the order the page's buttons use: 0 point, 1 triangle,
/// 2 circle.
fn mark_kind(code: u8) -> MarkKind {
    match code {
        1 => MarkKind::Triangle,
        2 => MarkKind::Circle,
        _ => MarkKind::Point,
    }
}

fn animation_group(code: u8) -> Option<AnimationGroup> {
    AnimationGroup::ALL.get(code as usize).copied()
}

/// Console text for a frame that dropped primitives, if any were dropped.
fn skip_message(pass: &str, report: &FrameReport) -> Option<String> {
    (report.skipped > 0).then(|| {
        format!(
            "blocky: {pass} frame skipped {} of {} primitives (vertex buffer allocation failed)",
            report.skipped,
            report.submitted + report.skipped
        )
    })
}

/// Session plus WebGL backend, driven from JavaScript.
#[wasm_bindgen]
pub struct BlockyApp {
    session: Session,
    raster: WebGlRasterizer,
    started_ms: Option<f64>,
    last_skipped: usize,
}

#[wasm_bindgen]
impl BlockyApp {
    /// Bind to the canvas with the given element id. Fails once, up front,
    /// if the context or the shader program is unavailable.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<BlockyApp, JsValue> {
        let canvas = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(canvas_id))
            .and_then(|e| e.dyn_into::<HtmlCanvasElement>().ok())
            .ok_or_else(|| RenderError::context(format!("no canvas with id {canvas_id}")))
            .and_then(|canvas| {
                let config = SessionConfig::default();
                WebGlRasterizer::create(&canvas, config.clear_color).map(|raster| (canvas, raster))
            });

        let (canvas, raster) = match canvas {
            Ok(pair) => pair,
            Err(err) => {
                web_sys::console::error_1(&JsValue::from_str(&err.to_string()));
                return Err(JsValue::from_str(&err.to_string()));
            }
        };

        let viewport = Viewport::new(canvas.width(), canvas.height());
        Ok(BlockyApp {
            session: Session::new(&SessionConfig::default(), viewport),
            raster,
            started_ms: None,
            last_skipped: 0,
        })
    }

    pub fn set_selected_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.session.set_selected_color(Rgba::new(r, g, b, a));
    }

    pub fn set_selected_size(&mut self, size: f32) {
        self.session.set_selected_size(size);
    }

    pub fn set_selected_segments(&mut self, segments: u32) {
        self.session.set_selected_segments(segments);
    }

    pub fn set_selected_kind(&mut self, kind: u8) {
        self.session.set_selected_kind(mark_kind(kind));
    }

    /// Joints are numbered in walk order, hips first. Unknown indices are
    /// ignored.
    pub fn set_joint_angle(&mut self, joint: usize, degrees: f32) {
        if let Some(joint) = JointId::ALL.get(joint) {
            self.session.set_joint_angle(*joint, degrees);
        }
    }

    /// 0 = torso, 1 = head and limbs.
    pub fn set_animation_enabled(&mut self, group: u8, enabled: bool) {
        match animation_group(group) {
            Some(group) => self.session.set_animation_enabled(group, enabled),
            None => warn!(group, "unknown animation group"),
        }
    }

    pub fn set_global_rotation(&mut self, degrees: f32) {
        self.session.set_global_rotation(degrees);
    }

    /// Place a mark at a canvas-relative pixel and redraw the marks.
    pub fn place_mark_at(&mut self, x: f32, y: f32) {
        self.session.place_mark_at(x, y);
        self.render();
    }

    pub fn undo(&mut self) {
        self.session.undo();
        self.render();
    }

    pub fn clear(&mut self) {
        self.session.clear();
        self.render();
    }

    pub fn load_preset_scene(&mut self) {
        self.session.load_preset_scene();
        self.render();
    }

    pub fn reset_pose(&mut self) {
        self.session.reset_pose();
    }

    /// Full redraw of the 2D marks. Returns the number of marks drawn.
    pub fn render(&mut self) -> usize {
        let report = FrameRenderer::flat().render_frame(
            &mut self.raster,
            self.session.marks(),
            &AffineTransform::identity(),
        );
        self.finish("2d", report)
    }

    /// One tick of the 3D loop; `now_ms` is the requestAnimationFrame
    /// timestamp. Returns the number of cubes drawn.
    pub fn frame(&mut self, now_ms: f64) -> usize {
        let started = *self.started_ms.get_or_insert(now_ms);
        let elapsed = ((now_ms - started) / 1000.0) as f32;
        let model = self.session.build_model(elapsed);
        let global = self.session.global_transform();
        let report = FrameRenderer::depth_tested().render_frame(
            &mut self.raster,
            &model.instances,
            &global,
        );
        self.finish("3d", report)
    }

    /// Primitives dropped by the most recent `render` or `frame`.
    #[wasm_bindgen(getter)]
    pub fn skipped(&self) -> usize {
        self.last_skipped
    }

    fn finish(&mut self, pass: &str, report: FrameReport) -> usize {
        self.last_skipped = report.skipped;
        if let Some(message) = skip_message(pass, &report) {
            web_sys::console::warn_1(&JsValue::from_str(&message));
        }
        report.submitted
    }
}
