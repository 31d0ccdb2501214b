// Copyright @yucwang 2021

use crate::core::batch::Mask;
use crate::core::computation_node::{generate_node_id, ComputationNode};
use crate::core::film::Film;
use crate::core::integrator::SamplingIntegrator;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::math::constants::{Float, Vector2f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::Spectrum;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

pub use super::renderer::{RenderError, Renderer};

pub const DEFAULT_BLOCK_SIZE: usize = 32;

// Pixel range of one image block, end exclusive.
#[derive(Debug, Clone, Copy)]
struct Block {
    index: usize,
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

impl Block {
    fn width(&self) -> usize {
        self.x1 - self.x0
    }

    fn height(&self) -> usize {
        self.y1 - self.y0
    }
}

/// Splits the image into square blocks and traces each block as a single
/// wavefront of `block pixels x spp` camera rays.
pub struct SimpleRenderer<S: Spectrum> {
    id: String,
    integrator: Box<dyn SamplingIntegrator<S>>,
    camera_id: usize,
    block_size: usize,
    thread_count: Option<usize>,
    show_progress: bool,
}

impl<S: Spectrum> ComputationNode for SimpleRenderer<S> {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("SimpleRenderer[camera={}, block_size={}, integrator={}]",
                self.camera_id, self.block_size, self.integrator.to_string())
    }
}

impl<S: Spectrum> Renderer<S> for SimpleRenderer<S> {
    fn render(&self, scene: &Scene<S>, sampler: &dyn Sampler) -> Result<Film, RenderError> {
        let sensor = scene.camera(self.camera_id)
            .ok_or(RenderError::MissingSensor(self.camera_id))?;

        let (width, height) = sensor.resolution();
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyFilm { width, height });
        }
        let spp = sampler.sample_count().max(1) as usize;
        let aov_names = self.integrator.aov_names();

        let block_size = self.block_size.max(1);
        let blocks_x = (width + block_size - 1) / block_size;
        let blocks_y = (height + block_size - 1) / block_size;
        let total_blocks = blocks_x * blocks_y;

        let thread_count = self.thread_count.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }).max(1);

        log::info!("Rendering {} with {}: {}x{}, {} spp, {} blocks on {} threads.",
                   sensor.describe(), self.integrator.to_string(), width, height, spp, total_blocks, thread_count);

        let progress = if self.show_progress {
            ProgressBar::new(total_blocks as u64)
        } else {
            ProgressBar::hidden()
        };
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} blocks")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let next_block = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel::<(Block, Film)>();
        let mut film = Film::new(width, height, &aov_names);

        thread::scope(|scope| {
            for _ in 0..thread_count {
                let next_block = Arc::clone(&next_block);
                let tx = tx.clone();
                let mut block_sampler = sampler.fork();
                let aov_names = &aov_names;
                scope.spawn(move || {
                    loop {
                        let index = next_block.fetch_add(1, Ordering::Relaxed);
                        if index >= total_blocks {
                            break;
                        }

                        let x0 = (index % blocks_x) * block_size;
                        let y0 = (index / blocks_x) * block_size;
                        let block = Block {
                            index,
                            x0,
                            y0,
                            x1: (x0 + block_size).min(width),
                            y1: (y0 + block_size).min(height),
                        };
                        let block_film = self.render_block(scene, sensor, block_sampler.as_mut(),
                                                           &block, spp, aov_names);
                        if tx.send((block, block_film)).is_err() {
                            break;
                        }
                    }
                });
            }

            drop(tx);
            for _ in 0..total_blocks {
                if let Ok((block, block_film)) = rx.recv() {
                    film.put_block(block.x0, block.y0, &block_film);
                    progress.inc(1);
                }
            }
        });
        progress.finish_and_clear();
        log::info!("Rendering finished.");

        Ok(film)
    }
}

impl<S: Spectrum> SimpleRenderer<S> {
    pub fn new(integrator: Box<dyn SamplingIntegrator<S>>, camera_id: usize) -> Self {
        Self {
            id: generate_node_id("SimpleRenderer"),
            integrator,
            camera_id,
            block_size: DEFAULT_BLOCK_SIZE,
            thread_count: None,
            show_progress: true,
        }
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    pub fn with_threads(mut self, thread_count: usize) -> Self {
        self.thread_count = Some(thread_count.max(1));
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    // Lane `k` traces sample `k % spp` of pixel `k / spp`. The sampler is
    // seeded from the block index, so results do not depend on which
    // thread picked the block up.
    fn render_block(&self,
                    scene: &Scene<S>,
                    sensor: &dyn Sensor,
                    sampler: &mut dyn Sampler,
                    block: &Block,
                    spp: usize,
                    aov_names: &[String]) -> Film {
        let (width, height) = sensor.resolution();
        let block_width = block.width();
        let lanes = block_width * block.height() * spp;
        let active = Mask::new(lanes, true);

        sampler.seed(block.index as u64, lanes);
        let jitter = sampler.next_2d(&active);
        let rays: Vec<Ray3f> = (0..lanes)
            .map(|lane| {
                let pixel = lane / spp;
                let x = block.x0 + pixel % block_width;
                let y = block.y0 + pixel / block_width;
                let u = Vector2f::new((x as Float + jitter[lane].x) / width as Float,
                                      (y as Float + jitter[lane].y) / height as Float);
                sensor.sample_ray(&u)
            })
            .collect();

        let output = self.integrator.sample(scene, sampler, &rays, &active);

        let mut film = Film::new(block_width, block.height(), aov_names);
        let mut values = vec![0.0; film.channel_count()];
        for lane in 0..lanes {
            let pixel = lane / spp;
            values[..3].copy_from_slice(&output.radiance[lane].to_rgb());
            values[3] = if output.valid[lane] { 1.0 } else { 0.0 };
            for (slot, aov) in values[4..].iter_mut().zip(output.aovs.iter()) {
                *slot = aov[lane];
            }
            film.put(pixel % block_width, pixel / block_width, &values);
        }
        film
    }
}
