/// Example: print a single frame of the animal (or the preset drawing)
///
/// Usage: cargo run --example snapshot -- [seconds|preset]
use blocky_core::{AffineTransform, AnimationGroup, FrameRenderer, Rgba, Session};
use blocky_terminal::SoftwareRasterizer;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use std::env;
use std::io::{self, Write};

fn main() -> anyhow::Result<()> {
    let arg = env::args().nth(1);
    let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));

    let mut raster = SoftwareRasterizer::for_cells(cols, rows.saturating_sub(1), Rgba::BLACK)?;
    let mut session = Session::new(&Default::default(), raster.viewport());

    let report = match arg.as_deref() {
        Some("preset") => {
            session.load_preset_scene();
            FrameRenderer::flat().render_frame(
                &mut raster,
                session.marks(),
                &AffineTransform::identity(),
            )
        }
        other => {
            let seconds: f32 = other.and_then(|s| s.parse().ok()).unwrap_or(0.5);
            for group in AnimationGroup::ALL {
                session.set_animation_enabled(group, true);
            }
            session.set_global_rotation(-30.0);
            let model = session.build_model(seconds);
            FrameRenderer::depth_tested().render_frame(
                &mut raster,
                &model.instances,
                &session.global_transform(),
            )
        }
    };

    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All))?;
    raster.present(&mut stdout, 0)?;
    writeln!(stdout)?;
    writeln!(stdout, "{} primitives drawn, {} skipped", report.submitted, report.skipped)?;
    stdout.flush()?;
    Ok(())
}
