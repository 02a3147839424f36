use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::info;

use lumen::render::{render_floor, RenderSettings};
use lumen::{LightKind, Scene};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let xml = fs::read_to_string(&options.path)
        .with_context(|| format!("failed to read scene {}", options.path.display()))?;
    let scene = Scene::from_xml(&xml)
        .with_context(|| format!("failed to load scene {}", options.path.display()))?;

    println!(
        "Loaded scene with {} lights ({} directional, {} point, {} spot)",
        scene.lights.len(),
        scene.count(LightKind::Directional),
        scene.count(LightKind::Point),
        scene.count(LightKind::Spot)
    );
    for scene_light in &scene.lights {
        let light = scene_light.light;
        let color = light.color();
        println!(
            " - {} color=({:.2}, {:.2}, {:.2}) intensity={:.2}",
            light.kind(),
            color.x,
            color.y,
            color.z,
            light.intensity()
        );
    }

    if options.summary_only {
        return Ok(());
    }

    let base_dir = options.path.parent().unwrap_or(Path::new("."));
    let material = scene
        .material(base_dir)
        .context("failed to load material")?;
    let floor_material = material.bind(&scene.floor_draw());

    let mut settings = RenderSettings::default();
    if let Some((width, height)) = options.size {
        settings.width = width;
        settings.height = height;
    }
    if let Some(threads) = options.threads {
        settings.threads = threads;
    }
    let aspect = settings.width.max(1) as f32 / settings.height.max(1) as f32;
    let frame = scene.frame(options.time, aspect)?;

    info!(
        "rendering {}x{} at t={:.2}s",
        settings.width, settings.height, options.time
    );
    let image = render_floor(&frame, &floor_material, &scene.floor_plane(), &settings);
    image.save(&options.output)?;
    println!(
        "Wrote {}x{} image to {}",
        image.width,
        image.height,
        options.output.display()
    );
    Ok(())
}

struct CliOptions {
    path: PathBuf,
    output: PathBuf,
    size: Option<(u32, u32)>,
    threads: Option<usize>,
    time: f32,
    summary_only: bool,
}

const USAGE: &str =
    "Usage: lumen <scene.xml> [--output <file.png>] [--size <W>x<H>] [--threads <N>] [--time <seconds>] [--summary-only]";

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let Some(path) = args.next() else {
            return Err(anyhow!(USAGE));
        };
        let mut options = Self {
            path: PathBuf::from(path),
            output: PathBuf::from("frame.png"),
            size: None,
            threads: None,
            time: 0.0,
            summary_only: false,
        };
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--summary-only" => options.summary_only = true,
                "--output" => options.output = PathBuf::from(value(&mut args, &arg)?),
                "--size" => options.size = Some(parse_size(&value(&mut args, &arg)?)?),
                "--threads" => {
                    options.threads = Some(
                        value(&mut args, &arg)?
                            .parse()
                            .context("--threads expects a whole number")?,
                    )
                }
                "--time" => {
                    options.time = value(&mut args, &arg)?
                        .parse()
                        .context("--time expects seconds")?
                }
                other => {
                    return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                }
            }
        }
        Ok(options)
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{flag} expects a value"))
}

fn parse_size(value: &str) -> Result<(u32, u32)> {
    let (width, height) = value
        .split_once('x')
        .ok_or_else(|| anyhow!("--size expects <W>x<H>, got {value}"))?;
    let width = width.parse().context("invalid width")?;
    let height = height.parse().context("invalid height")?;
    Ok((width, height))
}
