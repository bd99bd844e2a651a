//! Render a procedurally built voxel sphere to PNG.
//!
//! Usage:
//!   cargo run --release --bin render_scene -- [--depth 7] [--quad 9] [--cubemap] [--out render.png]

use glam::DVec3;

use quadvox::core::{logging, Camera};
use quadvox::octree::create_test_sphere;
use quadvox::render::{CubeFace, Presenter, RenderConfig, Renderer};

struct Args {
    depth: u32,
    quad_depth: u32,
    cubemap: bool,
    out: String,
}

fn parse_args() -> Args {
    let mut args = Args {
        depth: 7,
        quad_depth: 9,
        cubemap: false,
        out: "render.png".to_string(),
    };
    let argv: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < argv.len() {
        match argv[i].as_str() {
            "--depth" => {
                i += 1;
                args.depth = argv[i].parse().expect("--depth takes a number");
            }
            "--quad" => {
                i += 1;
                args.quad_depth = argv[i].parse().expect("--quad takes a number");
            }
            "--cubemap" => args.cubemap = true,
            "--out" => {
                i += 1;
                args.out = argv[i].clone();
            }
            other => {
                eprintln!("unknown argument: {}", other);
                eprintln!("usage: render_scene [--depth N] [--quad N] [--cubemap] [--out FILE]");
                std::process::exit(1);
            }
        }
        i += 1;
    }
    args
}

/// Convert a row-major BGRA8 buffer to an RGBA PNG
fn save_png(path: &str, pixels: &[u32], width: u32, height: u32) {
    let mut rgba = Vec::with_capacity(pixels.len() * 4);
    for row in 0..height {
        for col in 0..width {
            let c = pixels[(row * width + col) as usize];
            rgba.push((c >> 16) as u8);
            rgba.push((c >> 8) as u8);
            rgba.push(c as u8);
            rgba.push(0xff);
        }
    }
    let img = image::RgbaImage::from_raw(width, height, rgba).expect("pixel buffer size mismatch");
    img.save(path).expect("failed to write image");
    log::info!("wrote {}", path);
}

struct PngPresenter {
    prefix: String,
}

impl Presenter for PngPresenter {
    fn present(&mut self, face: CubeFace, pixels: &[u32], size: u32) {
        let path = format!("{}_{:?}.png", self.prefix, face);
        save_png(&path, pixels, size, size);
    }
}

fn main() {
    logging::init();
    let args = parse_args();

    log::info!("building sphere scene at depth {}", args.depth);
    let radius = (1u32 << args.depth) as f64 * 0.35;
    let store = create_test_sphere(args.depth, radius).expect("scene construction failed");
    log::info!(
        "{} nodes, {:.1} MiB",
        store.node_count(),
        store.memory_usage() as f64 / (1024.0 * 1024.0)
    );

    let size = 1u32 << args.quad_depth;
    let config = RenderConfig {
        width: size,
        height: size,
        quad_depth: args.quad_depth,
        scene_depth: args.depth,
        frustum: quadvox::math::Frustum::symmetric(1.0),
    };
    let mut renderer = Renderer::new(config).expect("invalid configuration");

    let scene = (1u32 << args.depth) as f64;
    let camera = Camera::look_at(
        DVec3::new(0.6 * scene, -0.45 * scene, -1.8 * scene),
        DVec3::ZERO,
        DVec3::Y,
    );

    if args.cubemap {
        let prefix = args.out.trim_end_matches(".png").to_string();
        let mut presenter = PngPresenter { prefix };
        renderer.render_cubemap(&store, &camera, &mut presenter);
    } else {
        let pixels = renderer.render(&store, &camera).to_vec();
        save_png(&args.out, &pixels, size, size);
    }
}
