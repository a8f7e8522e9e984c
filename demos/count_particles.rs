use std::path::PathBuf;

use flexi_logger::Logger;
use particle_extract::{
    ExportOptions, FilterParams, MorphChain, MorphKind, MorphOp, PipelineOptions,
    raster::{base_name, load_raster, raster_to_gray},
    render::{REGION_OUTLINE, binary_to_gray, draw_region_boxes},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _logger = Logger::try_with_env_or_str("info")?.start()?;

    let mut args = std::env::args().skip(1);
    let input = PathBuf::from(args.next().unwrap_or_else(|| "assets/sample.png".to_owned()));
    let output = args.next().map(PathBuf::from);

    // 1. Load and pick a threshold with Otsu's method
    let image = load_raster(&input)?;
    let threshold = imageproc::contrast::otsu_level(&raster_to_gray(&image)).max(1);
    println!("Loaded {} (Otsu threshold {threshold})", input.display());

    // 2. Denoise, threshold and clean up the mask
    let params = FilterParams::new(1.0, 3, threshold)?;
    let mut chain = MorphChain::new();
    chain.push(MorphOp::new(MorphKind::Opening, 3)?);
    chain.push(MorphOp::new(MorphKind::Closing, 2)?);
    for line in chain.descriptions() {
        println!("  {line}");
    }

    let run = particle_extract::run(&image, &params, &chain, &PipelineOptions::default())?;
    if run.is_overloaded() {
        println!("Warning! Too many particles! ({} found)", run.count());
    } else {
        println!("Particles: {}", run.count());
    }

    // 3. Visualize region boxes next to the input
    let overlay = draw_region_boxes(&binary_to_gray(run.binary()), run.labeling(), REGION_OUTLINE);
    let overlay_path = input.with_extension("regions.png");
    overlay.save(&overlay_path)?;
    println!("Saved {}", overlay_path.display());

    // 4. Export masks when an output directory was given
    if let Some(root) = output {
        let name = base_name(&input).unwrap_or("image");
        let summary = run.export(&image, &root, name, &ExportOptions::default())?;
        println!(
            "Wrote {} masks and {}",
            summary.mask_paths.len(),
            summary.image_path.display()
        );
    }

    Ok(())
}
