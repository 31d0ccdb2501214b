/* Copyright 2020 @TwoCookingMice */

use crate::core::film::Film;
use crate::math::bitmap::Bitmap;

use exr::prelude::*;

pub type ExrResult<T> = std::result::Result<T, exr::error::Error>;

/// One named plane of a decoded image, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ExrChannel {
    pub name: String,
    pub samples: Vec<f32>,
}

// Write every channel of `bitmap` as an f32 channel of a single layer.
pub fn write_bitmap_to_exr(bitmap: &Bitmap,
                           channel_names: &[String],
                           file_path: &str) -> ExrResult<()> {
    log::info!("Starting writing openexr images: {}.", file_path);

    let mut list = SmallVec::<[AnyChannel<FlatSamples>; 4]>::new();
    for (c, name) in channel_names.iter().enumerate().take(bitmap.channels()) {
        let name = Text::new_or_none(name.as_str())
            .ok_or_else(|| exr::error::Error::Invalid(format!("channel name {}", name).into()))?;
        list.push(AnyChannel {
            name,
            sample_data: FlatSamples::F32(bitmap.channel(c)),
            quantize_linearly: false,
            sampling: Vec2(1, 1),
        });
    }

    let image = Image::from_channels((bitmap.width(), bitmap.height()), AnyChannels::sort(list));
    image.write().to_file(file_path)?;
    log::info!("EXR written to: {}.", file_path);
    Ok(())
}

pub fn write_film_to_exr(film: &Film, file_path: &str) -> ExrResult<()> {
    write_bitmap_to_exr(&film.develop(), film.channel_names(), file_path)
}

// Read all channels of the first valid layer. Returns (width, height, channels).
pub fn read_exr_channels(file_path: &str) -> ExrResult<(usize, usize, Vec<ExrChannel>)> {
    log::info!("Starting reading OpenEXR image from: {}.", file_path);

    let image = read()
        .no_deep_data()
        .largest_resolution_level()
        .all_channels()
        .first_valid_layer()
        .all_attributes()
        .from_file(file_path)?;

    let size = image.layer_data.size;
    let channels = image.layer_data.channel_data.list.iter()
        .map(|channel| ExrChannel {
            name: channel.name.to_string(),
            samples: channel.sample_data.values_as_f32().collect(),
        })
        .collect();

    log::info!("OpenEXR loaded, width = {}, height = {}.", size.width(), size.height());
    Ok((size.width(), size.height(), channels))
}
