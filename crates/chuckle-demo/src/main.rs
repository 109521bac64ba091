use std::cell::Cell;
use std::f32::consts::TAU;
use std::rc::Rc;

use anyhow::Result;
use glam::{Vec2, Vec3};

use chuckle_core::device::{AddressMode, RenderDevice, SamplerSettings, TextureHandle, WgpuDevice};
use chuckle_core::frame::{FrameCtx, FrameFinishedCtx};
use chuckle_core::input::KeyCode;
use chuckle_core::logging::{init_logging, LoggingConfig};
use chuckle_core::paint::Color;
use chuckle_core::quickdraw::{Topology, Vertex};
use chuckle_core::random::{PerlinNoise, Randomizer};
use chuckle_core::{paths, RenderWindow, WindowSettings};

const NOISE_SIZE: u32 = 128;
const STAR_COUNT: usize = 64;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let settings = WindowSettings::new("chuckle demo", 960.0, 640.0)
        .clear_color(Color::gray(0.08))
        .target_fps(120.0)
        .show_metrics(true);
    let mut window = RenderWindow::open(settings)?;
    // Graph in the top-right corner, scaled for the 120 fps target.
    let (width_px, _) = window.device().size_in_pixels();
    let overlay = window.metrics_overlay_mut();
    overlay.origin = Vec2::new(width_px as f32 - overlay.size.x - 8.0, 8.0);
    overlay.min_scale_fps = 120.0;

    let noise_texture = create_noise_texture(window.device_mut(), 7)?;
    let tiled = window
        .device_mut()
        .create_sampler(SamplerSettings::NEAREST.with_address(AddressMode::Repeat))?;

    let mut rng = Randomizer::new(1234);
    let stars: Vec<Vec2> = (0..STAR_COUNT)
        .map(|_| Vec2::new(rng.randomf(0.0, 960.0), rng.randomf(0.0, 640.0)))
        .collect();

    let capture = Rc::new(Cell::new(false));
    let capture_requested = capture.clone();
    let mut time = 0.0f32;

    window.set_draw_function(move |ctx: &mut FrameCtx<'_, WgpuDevice>| {
        time += ctx.dt as f32;

        if ctx.input.key_pressed(KeyCode::Escape) {
            ctx.request_close();
        }
        if ctx.input.key_pressed(KeyCode::KeyS) {
            capture_requested.set(true);
        }

        let qd = &mut *ctx.quick_draw;
        let (w, h) = (ctx.size.0 as f32, ctx.size.1 as f32);

        qd.set_color(Color::gray(0.6));
        qd.points(&stars);

        qd.set_color(Color::WHITE);
        qd.tex(noise_texture, 40.0, 120.0, 296.0, 376.0, Some(tiled));

        qd.set_color(Color::rgb(0.9, 0.3, 0.2));
        qd.rect(340.0, 120.0, 440.0, 220.0);
        qd.set_color(Color::rgb(1.0, 0.8, 0.3));
        qd.line_rect(336.0, 116.0, 444.0, 224.0);

        qd.set_color(Color::rgb(0.2, 0.6, 0.9));
        qd.circle(530.0, 170.0, 50.0);
        qd.set_color(Color::WHITE);
        qd.line_circle_subdivided(530.0, 170.0, 56.0, 48);

        qd.set_color(Color::GREEN);
        qd.rects(&[Vec2::new(360.0, 300.0), Vec2::new(400.0, 300.0)], 10.0);
        qd.line_rects(&[Vec2::new(440.0, 300.0)], 10.0);

        let wave: Vec<Vec2> = (0..=64)
            .map(|i| {
                let t = i as f32 / 64.0;
                Vec2::new(40.0 + t * (w - 80.0), h - 80.0 + (t * TAU * 3.0 + time).sin() * 30.0)
            })
            .collect();
        qd.set_color(Color::rgb(0.9, 0.9, 0.4));
        qd.line_strip(&wave, false);

        // A vertex-colored triangle keeps its own colors.
        qd.draw_vertices(
            &[
                Vertex::new(Vec3::new(640.0, 380.0, 0.0), Color::RED),
                Vertex::new(Vec3::new(760.0, 380.0, 0.0), Color::GREEN),
                Vertex::new(Vec3::new(700.0, 280.0, 0.0), Color::BLUE),
            ],
            Topology::Triangles,
            None,
            None,
        );

        // Nested transforms: a ring of squares orbiting a spinning hub.
        qd.push_transform();
        qd.translate(760.0, 170.0);
        qd.rotate(time * 0.5);
        qd.set_color(Color::rgb(0.7, 0.4, 0.9));
        qd.convex_polygon(&hexagon(24.0));
        for i in 0..8 {
            qd.push_transform();
            qd.rotate(i as f32 * TAU / 8.0);
            qd.translate(70.0, 0.0);
            qd.rotate(-time * 2.0);
            qd.set_color(Color::rgb(0.4, 0.9, 0.7).with_alpha(0.8));
            qd.rect(-8.0, -8.0, 8.0, 8.0);
            qd.pop_transform();
        }
        qd.pop_transform();

        Ok(())
    });

    window.set_frame_finished_callback(move |ctx: &mut FrameFinishedCtx<'_, WgpuDevice>| {
        if capture.replace(false) {
            let path = paths::executable_directory_name()?
                .join(format!("chuckle-frame-{}.png", ctx.frame_index));
            ctx.device.save_frame(&path)?;
        }
        Ok(())
    });

    window.run()?;
    log::info!(
        "fps at exit: {:.1} average, {:.1} last frame",
        window.fps(),
        window.fps_counter().latest()
    );
    Ok(())
}

fn hexagon(radius: f32) -> Vec<Vec2> {
    (0..6)
        .map(|i| {
            let a = i as f32 * TAU / 6.0;
            Vec2::new(a.cos(), a.sin()) * radius
        })
        .collect()
}

fn create_noise_texture<D: RenderDevice>(device: &mut D, seed: u64) -> Result<TextureHandle> {
    let noise = PerlinNoise::new(seed);
    let mut pixels = Vec::with_capacity((NOISE_SIZE * NOISE_SIZE * 4) as usize);
    for y in 0..NOISE_SIZE {
        for x in 0..NOISE_SIZE {
            let n = noise.noise2(x as f32 / 16.0, y as f32 / 16.0);
            let v = ((n * 0.5 + 0.5) * 255.0) as u8;
            pixels.extend_from_slice(&[v / 3, v / 2, v, 255]);
        }
    }
    device.create_texture(NOISE_SIZE, NOISE_SIZE, &pixels)
}
