// Renders every built-in preset over a synthetic test card

use std::path::PathBuf;

use timecam::{
    catalog::Catalog,
    photo::{loader, PixelBuffer, PixelLayout},
    pipeline::{Pipeline, PipelineInput},
};

const CARD_WIDTH: u32 = 320;
const CARD_HEIGHT: u32 = 240;

/// Color bars over the top half, a gray ramp over the bottom half
fn test_card() -> PixelBuffer {
    const BARS: [[u8; 3]; 7] = [
        [192, 192, 192],
        [192, 192, 0],
        [0, 192, 192],
        [0, 192, 0],
        [192, 0, 192],
        [192, 0, 0],
        [0, 0, 192],
    ];

    let mut data = Vec::with_capacity((CARD_WIDTH * CARD_HEIGHT * 3) as usize);
    for y in 0..CARD_HEIGHT {
        for x in 0..CARD_WIDTH {
            if y < CARD_HEIGHT / 2 {
                let bar = (x * BARS.len() as u32 / CARD_WIDTH) as usize;
                data.extend_from_slice(&BARS[bar]);
            } else {
                let level = (x * 255 / (CARD_WIDTH - 1)) as u8;
                data.extend_from_slice(&[level, level, level]);
            }
        }
    }

    PixelBuffer::new(CARD_WIDTH, CARD_HEIGHT, PixelLayout::Rgb8, data)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("preset_sheet"));
    std::fs::create_dir_all(&out_dir)?;

    println!("Rendering preset sheet into {:?}", out_dir);

    let catalog = Catalog::builtin()?;
    catalog.validate()?;

    let pipeline = Pipeline::new();
    let card = test_card();
    loader::save(&card, out_dir.join("test_card.png"), 90)?;

    for era in catalog.eras() {
        println!("\n{} - {}", era.name(), era.description());

        for preset in era.presets() {
            let outcome = pipeline.apply(
                PipelineInput::new(card.clone(), preset.clone())
                    .with_date_stamp(era.name())
                    .with_grain_seed(era.year() as u64),
            );

            if let Some(reason) = outcome.reason() {
                println!("   {} fell back: {}", preset.name, reason);
                continue;
            }

            let path = out_dir.join(format!("{}_{}.png", era.id(), preset.id));
            loader::save(outcome.image(), &path, 90)?;
            println!("   {} -> {:?}", preset.name, path);
        }
    }

    println!("\nDone.");
    Ok(())
}
