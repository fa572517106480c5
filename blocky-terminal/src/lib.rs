/// Terminal host for the blocky engine
use blocky_core::{
    AffineTransform, AnimationGroup, FrameRenderer, JointId, MarkKind, Rgba, Session,
};
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::{error, info};

pub mod config;
pub mod renderer;

pub use config::{AppConfig, Cli, Mode};
pub use renderer::SoftwareRasterizer;

/// Rows reserved above the canvas for the status line
const STATUS_ROWS: u16 = 1;
const IDLE_POLL: Duration = Duration::from_millis(250);
const ROTATION_STEP: f32 = 5.0;
const ANGLE_STEP: f32 = 5.0;
const SIZE_STEP: f32 = 1.0;
const CHANNEL_STEP: f32 = 0.1;

const PAINT_KEYS: &str =
    "p/t/c kind 1-4 color r/g/b +/- size [/] segs u undo x clear l preset | Tab 3D q quit";
const ANIMAL_KEYS: &str = "space/1/2 animate arrows rotate/select +/- bend 0 reset | Tab 2D q quit";

/// Main application struct for the terminal host
pub struct TerminalApp {
    session: Session,
    raster: SoftwareRasterizer,
    mode: Mode,
    selected_joint: JointId,
    running: bool,
    dirty: bool,
    frame_time: Duration,
    started: Instant,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let (cols, rows) = terminal::size()?;
        let raster = SoftwareRasterizer::for_cells(
            cols,
            rows.saturating_sub(STATUS_ROWS),
            config.session.clear_color,
        )
        .inspect_err(|err| error!(error = %err, "cannot create drawing surface"))?;
        let session = Session::new(&config.session, raster.viewport());

        Ok(Self {
            session,
            raster,
            mode: config.mode,
            selected_joint: JointId::Head,
            running: true,
            dirty: true,
            frame_time: Duration::from_millis(1000 / u64::from(config.fps.max(1))),
            started: Instant::now(),
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        info!(mode = ?self.mode, "terminal loop started");

        while self.running {
            let frame_start = Instant::now();

            // 2D redraws only on input; 3D redraws every tick.
            let timeout = match self.mode {
                Mode::Paint => IDLE_POLL,
                Mode::Animal => self.frame_time,
            };
            if event::poll(timeout)? {
                self.handle_event(event::read()?);
                while event::poll(Duration::ZERO)? {
                    self.handle_event(event::read()?);
                }
            }

            if self.mode == Mode::Animal || self.dirty {
                self.render()?;
                self.dirty = false;
                self.frame_count += 1;
            }

            if self.mode == Mode::Animal {
                let elapsed = frame_start.elapsed();
                if elapsed < self.frame_time {
                    std::thread::sleep(self.frame_time - elapsed);
                }
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(cols, rows) => {
                self.raster
                    .resize(cols as usize, rows.saturating_sub(STATUS_ROWS) as usize * 2);
                self.session.resize(self.raster.viewport());
                self.dirty = true;
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, .. }: KeyEvent) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Tab => {
                self.mode = match self.mode {
                    Mode::Paint => Mode::Animal,
                    Mode::Animal => Mode::Paint,
                };
                info!(mode = ?self.mode, "mode switched");
            }
            _ => match self.mode {
                Mode::Paint => self.handle_paint_key(code),
                Mode::Animal => self.handle_animal_key(code),
            },
        }
        self.dirty = true;
    }

    fn handle_paint_key(&mut self, code: KeyCode) {
        let selection = *self.session.selection();
        match code {
            KeyCode::Char('p') => self.session.set_selected_kind(MarkKind::Point),
            KeyCode::Char('t') => self.session.set_selected_kind(MarkKind::Triangle),
            KeyCode::Char('c') => self.session.set_selected_kind(MarkKind::Circle),
            KeyCode::Char('1') => self.session.set_selected_color(Rgba::RED),
            KeyCode::Char('2') => self.session.set_selected_color(Rgba::GREEN),
            KeyCode::Char('3') => self.session.set_selected_color(Rgba::BLUE),
            KeyCode::Char('4') => self.session.set_selected_color(Rgba::WHITE),
            KeyCode::Char(ch @ ('r' | 'g' | 'b' | 'R' | 'G' | 'B')) => {
                let channel = match ch.to_ascii_lowercase() {
                    'r' => 0,
                    'g' => 1,
                    _ => 2,
                };
                let step = if ch.is_ascii_uppercase() {
                    -CHANNEL_STEP
                } else {
                    CHANNEL_STEP
                };
                let current = selection.color.to_array()[channel];
                self.session
                    .set_selected_color(selection.color.with_channel(channel, current + step));
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.session.set_selected_size(selection.size + SIZE_STEP)
            }
            KeyCode::Char('-') => self.session.set_selected_size(selection.size - SIZE_STEP),
            KeyCode::Char(']') => self.session.set_selected_segments(selection.segments + 1),
            KeyCode::Char('[') => self
                .session
                .set_selected_segments(selection.segments.saturating_sub(1)),
            KeyCode::Char('u') => self.session.undo(),
            KeyCode::Char('x') => self.session.clear(),
            KeyCode::Char('l') => self.session.load_preset_scene(),
            _ => {}
        }
    }

    fn handle_animal_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(' ') => {
                let enable = !AnimationGroup::ALL
                    .iter()
                    .any(|g| self.session.animation_enabled(*g));
                for group in AnimationGroup::ALL {
                    self.session.set_animation_enabled(group, enable);
                }
            }
            KeyCode::Char('1') => self.toggle_group(AnimationGroup::Torso),
            KeyCode::Char('2') => self.toggle_group(AnimationGroup::Limbs),
            KeyCode::Left => self
                .session
                .set_global_rotation(self.session.global_rotation() - ROTATION_STEP),
            KeyCode::Right => self
                .session
                .set_global_rotation(self.session.global_rotation() + ROTATION_STEP),
            KeyCode::Up => self.selected_joint = self.selected_joint.prev(),
            KeyCode::Down => self.selected_joint = self.selected_joint.next(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.nudge_joint(ANGLE_STEP),
            KeyCode::Char('-') => self.nudge_joint(-ANGLE_STEP),
            KeyCode::Char('0') => self.session.reset_pose(),
            _ => {}
        }
    }

    fn toggle_group(&mut self, group: AnimationGroup) {
        let enabled = self.session.animation_enabled(group);
        self.session.set_animation_enabled(group, !enabled);
    }

    fn nudge_joint(&mut self, delta: f32) {
        let angle = self.session.joint_angle(self.selected_joint);
        self.session.set_joint_angle(self.selected_joint, angle + delta);
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.mode != Mode::Paint || mouse.row < STATUS_ROWS {
            return;
        }
        if let MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) =
            mouse.kind
        {
            // Cell center: half a pixel across, between the two stacked pixels.
            let x = mouse.column as f32 + 0.5;
            let y = (mouse.row - STATUS_ROWS) as f32 * 2.0 + 1.0;
            self.session.place_mark_at(x, y);
            self.dirty = true;
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let report = match self.mode {
            Mode::Paint => FrameRenderer::flat().render_frame(
                &mut self.raster,
                self.session.marks(),
                &AffineTransform::identity(),
            ),
            Mode::Animal => {
                let elapsed = self.started.elapsed().as_secs_f32();
                let model = self.session.build_model(elapsed);
                let global = self.session.global_transform();
                FrameRenderer::depth_tested().render_frame(
                    &mut self.raster,
                    &model.instances,
                    &global,
                )
            }
        };

        let status: String = self
            .status_line(report.skipped)
            .chars()
            .take(self.raster.width())
            .collect();

        let mut stdout = stdout();
        self.raster.present(&mut stdout, STATUS_ROWS)?;

        // Draw status line
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetBackgroundColor(Color::Black),
            SetForegroundColor(Color::Yellow),
            terminal::Clear(ClearType::CurrentLine),
            Print(status),
            ResetColor
        )?;

        stdout.flush()
    }

    fn status_line(&self, skipped: usize) -> String {
        let mut line = match self.mode {
            Mode::Paint => {
                let s = self.session.selection();
                format!(
                    "BLOCKY paint | {:?} rgb({:.1},{:.1},{:.1}) size {:.0} segs {} | marks {} | {}",
                    s.kind,
                    s.color.r,
                    s.color.g,
                    s.color.b,
                    s.size,
                    s.segments,
                    self.session.marks().len(),
                    PAINT_KEYS,
                )
            }
            Mode::Animal => {
                let on_off = |g| if self.session.animation_enabled(g) { "on" } else { "off" };
                format!(
                    "BLOCKY animal | FPS {:.1} | {} {:.0}deg | torso {} limbs {} | rot {:.0} | {}",
                    self.fps,
                    self.selected_joint.name(),
                    self.session.joint_angle(self.selected_joint),
                    on_off(AnimationGroup::Torso),
                    on_off(AnimationGroup::Limbs),
                    self.session.global_rotation(),
                    ANIMAL_KEYS,
                )
            }
        };
        if skipped > 0 {
            line.push_str(&format!(" | {skipped} skipped"));
        }
        line
    }
}
