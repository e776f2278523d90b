use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use glint_renderer::{
    render, Camera, Color, Dielectric, EnvironmentMap, FrameBuffer, HittableList, Lambertian,
    Metal, Point3, Sphere, Vec3,
};

const USAGE: &str = "\
Usage: glint_cli [OPTIONS]

Options:
  --env <PATH>      Equirectangular environment image for the background
  --output <PATH>   Output PNG path (default render.png)
  --width <N>       Image width in pixels (default 800)
  --spp <N>         Samples per pixel (default 50)
  --depth <N>       Maximum ray bounces (default 20)
  --frames <N>      Render N frames, orbiting the camera between passes
  -h, --help        Print this help
";

struct Options {
    width: u32,
    samples_per_pixel: u32,
    max_depth: u32,
    frames: u32,
    output: PathBuf,
    environment: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: 800,
            samples_per_pixel: 50,
            max_depth: 20,
            frames: 1,
            output: PathBuf::from("render.png"),
            environment: None,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let options = match parse_args(&args[1..])? {
        Some(options) => options,
        None => return Ok(()),
    };

    log::info!("Starting glint");

    let world = build_scene();

    let environment = options.environment.as_ref().and_then(|path| {
        match EnvironmentMap::load(path) {
            Ok(map) => Some(map),
            Err(err) => {
                log::warn!(
                    "Could not load environment map {}: {err}; falling back to the sky gradient",
                    path.display()
                );
                None
            }
        }
    });

    let mut camera = Camera::new()
        .with_image(16.0 / 9.0, options.width)
        .with_quality(options.samples_per_pixel, options.max_depth)
        .with_view(
            Point3::new(0.0, 0.0, -1.0),
            Point3::new(0.0, 0.0, 1.0),
            Vec3::Y,
        )
        .with_lens(45.0, 1.0, 3.4);

    let mut buffer = FrameBuffer::new(1, 1);

    for frame in 0..options.frames {
        if frame > 0 {
            // Coarse orbit: slide right, then yaw back toward the subject.
            camera.translate(Vec3::new(0.35, 0.0, 0.0));
            camera.rotate(-0.1, 0.0);
        }

        let started = Instant::now();
        render(&mut camera, &world, environment.as_ref(), &mut buffer);
        log::info!(
            "Frame {} of {} rendered in {:.2?}",
            frame + 1,
            options.frames,
            started.elapsed()
        );

        let path = frame_path(&options.output, frame, options.frames);
        save_png(&buffer, &path)?;
        log::info!("Wrote {}", path.display());
    }

    Ok(())
}

/// The stock scene: a large ground sphere, a hollow glass bubble, and a
/// fuzzy gold sphere.
fn build_scene() -> HittableList {
    let ground = Arc::new(Lambertian::new(Color::new(0.9, 0.8, 0.3)));
    let bubble = Arc::new(Dielectric::new(1.0 / 1.5));
    let gold = Arc::new(Metal::new(Color::new(0.8, 0.6, 0.2), 0.1));

    let mut world = HittableList::new();
    world.add(Arc::new(Sphere::new(
        Point3::new(0.0, -50.5, 1.0),
        50.0,
        ground,
    )));
    world.add(Arc::new(Sphere::new(
        Point3::new(-1.0, 0.0, 1.0),
        0.4,
        bubble,
    )));
    world.add(Arc::new(Sphere::new(Point3::new(1.0, 0.0, 1.0), 0.5, gold)));
    world
}

/// Returns `None` when the invocation only asked for help.
fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut options = Options::default();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--env" => {
                options.environment = Some(PathBuf::from(flag_value(&mut iter, arg)?));
            }
            "--output" => {
                options.output = PathBuf::from(flag_value(&mut iter, arg)?);
            }
            "--width" => {
                options.width = flag_value(&mut iter, arg)?
                    .parse()
                    .context("--width expects a pixel count")?;
            }
            "--spp" => {
                options.samples_per_pixel = flag_value(&mut iter, arg)?
                    .parse()
                    .context("--spp expects a sample count")?;
            }
            "--depth" => {
                options.max_depth = flag_value(&mut iter, arg)?
                    .parse()
                    .context("--depth expects a bounce count")?;
            }
            "--frames" => {
                options.frames = flag_value(&mut iter, arg)?
                    .parse()
                    .context("--frames expects a frame count")?;
            }
            "-h" | "--help" => {
                print!("{USAGE}");
                return Ok(None);
            }
            other => bail!("unknown argument '{other}'\n{USAGE}"),
        }
    }

    Ok(Some(options))
}

fn flag_value<'a>(iter: &mut std::slice::Iter<'a, String>, flag: &str) -> Result<&'a String> {
    iter.next().with_context(|| format!("{flag} expects a value"))
}

/// Single-frame runs keep the output path as given; multi-frame runs number
/// each frame before the extension.
fn frame_path(output: &Path, frame: u32, frames: u32) -> PathBuf {
    if frames <= 1 {
        return output.to_path_buf();
    }
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("frame");
    let ext = output.extension().and_then(|s| s.to_str()).unwrap_or("png");
    output.with_file_name(format!("{stem}_{frame:03}.{ext}"))
}

fn save_png(buffer: &FrameBuffer, path: &Path) -> Result<()> {
    let image = image::RgbImage::from_raw(buffer.width(), buffer.height(), buffer.to_rgb8())
        .context("frame buffer dimensions disagree with its pixel data")?;
    image
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
