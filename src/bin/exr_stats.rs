use wavepath::io::exr_utils::read_exr_channels;

// Per-channel statistics of a rendered image, including the AOV channels.
fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <image.exr>", args[0]);
        std::process::exit(1);
    }

    let (width, height, channels) = read_exr_channels(&args[1])
        .unwrap_or_else(|e| panic!("failed to read {}: {}", args[1], e));

    println!("Size: {}x{} ({} pixels)", width, height, width * height);
    for channel in &channels {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0f64;
        let mut non_finite = 0usize;
        for v in &channel.samples {
            if !v.is_finite() {
                non_finite += 1;
                continue;
            }
            min = min.min(*v);
            max = max.max(*v);
            sum += *v as f64;
        }
        let n = (channel.samples.len() - non_finite).max(1) as f64;
        println!("{:>8}: min {:.6}, max {:.6}, mean {:.6}, non-finite {}",
                 channel.name, min, max, sum / n, non_finite);
    }
}
