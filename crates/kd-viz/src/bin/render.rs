//! Ray traces the demo scene and shows the image.
//!
//! Usage: `render [OUTPUT.png] [SETTINGS.toml]`

use std::path::PathBuf;

use anyhow::Context;
use image::DynamicImage;
use kd_raytracer::{RenderSettings, render};
use kd_viz::demo::{demo_camera, demo_scene};
use kd_viz::{init_logger, texture_size};
use log::LevelFilter;
use macroquad::prelude::*;

struct Args {
    output: Option<PathBuf>,
    settings: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut args = std::env::args().skip(1);
    Args {
        output: args.next().map(PathBuf::from),
        settings: args.next().map(PathBuf::from),
    }
}

fn trace(args: &Args) -> anyhow::Result<(image::RgbImage, RenderSettings)> {
    let settings = match &args.settings {
        Some(path) => RenderSettings::load(path)
            .with_context(|| format!("reading settings from {}", path.display()))?,
        None => RenderSettings::default(),
    };

    let scene = demo_scene(&settings).context("building demo scene")?;
    let stats = scene.tree().stats();
    log::info!("tree: {stats}");

    let image = render(&scene, &demo_camera(&settings), &settings);
    if let Some(path) = &args.output {
        image
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {}", path.display());
    }
    Ok((image, settings))
}

#[macroquad::main("k-d Ray Tracer")]
async fn main() {
    init_logger(LevelFilter::Info);

    let args = parse_args();
    let result = trace(&args).and_then(|(image, settings)| {
        let size = texture_size(settings.width, settings.height)?;
        Ok((image, size, settings))
    });
    let (image, (width, height), settings) = match result {
        Ok(result) => result,
        Err(err) => {
            log::error!("{err:#}");
            return;
        }
    };

    let rgba = DynamicImage::ImageRgb8(image).into_rgba8();
    let texture = Texture2D::from_rgba8(width, height, rgba.as_raw());
    texture.set_filter(FilterMode::Nearest);

    loop {
        clear_background(BLACK);

        let scale = (screen_width() / settings.width as f32)
            .min(screen_height() / settings.height as f32);
        let size = vec2(settings.width as f32, settings.height as f32) * scale;
        draw_texture_ex(
            &texture,
            (screen_width() - size.x) / 2.0,
            (screen_height() - size.y) / 2.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(size),
                ..Default::default()
            },
        );

        draw_text(
            &format!("{}x{}", settings.width, settings.height),
            10.0,
            20.0,
            18.0,
            DARKGRAY,
        );

        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        next_frame().await
    }
}
