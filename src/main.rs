// Copyright 2020 TwoCookingMice

use wavepath::core::properties::PropertyValue;
use wavepath::core::scene_loader::load_scene;
use wavepath::integrators::path::PathIntegrator;
use wavepath::io::exr_utils;
use wavepath::renderers::simple::{Renderer, SimpleRenderer, DEFAULT_BLOCK_SIZE};
use wavepath::samplers::independent::IndependentSampler;

use std::env;
use std::process;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <scene.xml> <output.exr> [--spp N] [--max-depth N] [--rr-depth N] \
               [--hide-emitters] [--seed N] [--camera N] [--block-size N]", program);
    process::exit(1);
}

fn parse_flag<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).and_then(|v| v.parse::<T>().ok()) {
        Some(value) => value,
        None => {
            eprintln!("Missing or invalid value for {}.", flag);
            process::exit(1);
        }
    }
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        usage(&args[0]);
    }

    let input_path = &args[1];
    let output_path = &args[2];
    let mut spp_override: Option<u32> = None;
    let mut max_depth_override: Option<i64> = None;
    let mut rr_depth_override: Option<i64> = None;
    let mut hide_emitters = false;
    let mut seed_override: Option<u64> = None;
    let mut camera_id: usize = 0;
    let mut block_size: usize = DEFAULT_BLOCK_SIZE;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--spp" => {
                i += 1;
                spp_override = Some(parse_flag(&args, i, "--spp"));
            }
            "--max-depth" => {
                i += 1;
                max_depth_override = Some(parse_flag(&args, i, "--max-depth"));
            }
            "--rr-depth" => {
                i += 1;
                rr_depth_override = Some(parse_flag(&args, i, "--rr-depth"));
            }
            "--hide-emitters" => hide_emitters = true,
            "--seed" => {
                i += 1;
                seed_override = Some(parse_flag(&args, i, "--seed"));
            }
            "--camera" => {
                i += 1;
                camera_id = parse_flag(&args, i, "--camera");
            }
            "--block-size" => {
                i += 1;
                block_size = parse_flag(&args, i, "--block-size");
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                usage(&args[0]);
            }
        }
        i += 1;
    }

    let loaded = match load_scene(input_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("{}", e);
            process::exit(1);
        }
    };

    let mut integrator_props = loaded.integrator;
    if let Some(depth) = max_depth_override {
        integrator_props.set("max_depth", PropertyValue::Integer(depth));
    }
    if let Some(depth) = rr_depth_override {
        integrator_props.set("rr_depth", PropertyValue::Integer(depth));
    }
    if hide_emitters {
        integrator_props.set("hide_emitters", PropertyValue::Boolean(true));
    }
    let integrator = match PathIntegrator::from_properties(&integrator_props) {
        Ok(integrator) => integrator,
        Err(e) => {
            log::error!("Invalid integrator configuration: {}", e);
            process::exit(1);
        }
    };

    let sampler = IndependentSampler::new(spp_override.unwrap_or(loaded.sample_count),
                                          seed_override.unwrap_or(loaded.seed));
    let renderer = SimpleRenderer::new(Box::new(integrator), camera_id)
        .with_block_size(block_size);

    let film = match renderer.render(&loaded.scene, &sampler) {
        Ok(film) => film,
        Err(e) => {
            log::error!("Rendering failed: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = exr_utils::write_film_to_exr(&film, output_path) {
        log::error!("EXR written error: {}.", e);
        process::exit(1);
    }
}
