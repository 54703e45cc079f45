use quadgrid::core::{QuadCorners, CORNER_RECORD_LEN};
use quadgrid::decode::to_hex;
use quadgrid::fs::load_rgba;
use quadgrid::{decode_rgba, GridSpec, PackParams, SampleParams};

#[cfg(feature = "tracing")]
use quadgrid::core::init_tracing;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    init_tracing(false, log::LevelFilter::Info);

    let mut args = std::env::args().skip(1);
    let (Some(image_path), Some(corners_path)) = (args.next(), args.next()) else {
        eprintln!("Usage: decode_image <image_path> <corners.bin>");
        return Ok(());
    };

    let image = load_rgba(&image_path)?;
    let record = std::fs::read(&corners_path)?;
    if record.len() != CORNER_RECORD_LEN {
        eprintln!("{corners_path}: expected {CORNER_RECORD_LEN} bytes, got {}", record.len());
        return Ok(());
    }
    let corners = QuadCorners::from_bytes(&record)?;

    let bytes = decode_rgba(
        &image,
        &corners,
        GridSpec::default(),
        SampleParams::default(),
        &PackParams::default(),
        0,
    )?;
    println!("{}", to_hex(&bytes));
    Ok(())
}
