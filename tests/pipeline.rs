use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use timecam::{
    catalog::{Catalog, FilterPreset},
    photo::{Frame, PixelBuffer, PixelLayout},
    pipeline::{
        self, DepthCompositor, FallbackReason, GrainStage, Pipeline, PipelineInput, Stage,
        StageContext, ToneStage, VignetteStage,
    },
    Result,
};

/// Horizontal and vertical gradients in red and green, constant blue
fn gradient(width: u32, height: u32) -> PixelBuffer {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            data.push((x * 255 / width.max(1)) as u8);
            data.push((y * 255 / height.max(1)) as u8);
            data.push(90);
        }
    }
    PixelBuffer::new(width, height, PixelLayout::Rgb8, data)
}

fn mean(buffer: &PixelBuffer, x0: u32, y0: u32, x1: u32, y1: u32) -> f64 {
    let channels = buffer.layout.channels();
    let mut sum = 0.0;
    let mut count = 0.0;
    for y in y0..y1 {
        for x in x0..x1 {
            for &c in &buffer.pixel(x, y)[..channels.min(3)] {
                sum += c as f64;
                count += 1.0;
            }
        }
    }
    sum / count
}

/// Mean over the outermost two-pixel ring of the image
fn border_mean(buffer: &PixelBuffer) -> f64 {
    let (w, h) = (buffer.width, buffer.height);
    let top = mean(buffer, 0, 0, w, 2);
    let bottom = mean(buffer, 0, h - 2, w, h);
    let left = mean(buffer, 0, 2, 2, h - 2);
    let right = mean(buffer, w - 2, 2, w, h - 2);
    (top + bottom + left + right) / 4.0
}

struct Recording {
    calls: Arc<AtomicUsize>,
}

impl DepthCompositor for Recording {
    fn name(&self) -> &str {
        "recording"
    }

    fn composite(&self, _frame: &mut Frame, _radius: f32) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn dimensions_are_preserved_for_every_preset_and_layout() {
    let catalog = Catalog::builtin().unwrap();
    let renderer = Pipeline::new();
    let layouts = [PixelLayout::Luma8, PixelLayout::LumaA8, PixelLayout::Rgb8, PixelLayout::Rgba8];

    for era in catalog.eras() {
        for preset in era.presets() {
            for layout in layouts {
                for (w, h) in [(1, 1), (7, 3), (64, 40)] {
                    let data = vec![140; (w * h) as usize * layout.channels()];
                    let source = PixelBuffer::new(w, h, layout, data);
                    let outcome = renderer.apply(
                        PipelineInput::new(source, preset.clone())
                            .with_portrait(true)
                            .with_date_stamp(era.name()),
                    );

                    assert!(!outcome.is_fallback(), "{} {} {}x{}", preset.name, layout, w, h);
                    let output = outcome.into_image();
                    assert_eq!((output.width, output.height, output.layout), (w, h, layout));
                    assert!(output.is_well_formed());
                }
            }
        }
    }
}

#[test]
fn zero_strength_only_keeps_color_controls() {
    let source = gradient(32, 24);

    // Every strength-scaled parameter set, saturation and contrast neutral
    let scaled_only = FilterPreset::new("Scaled", 0.8, 0.5, 0.12, 1.0, 1.0, 0.3);
    let untouched = pipeline::apply(source.clone(), &scaled_only, 0.0, false, None);
    assert_eq!(untouched, source);

    // Saturation and contrast still apply at full value
    let full = FilterPreset::new("Full", 0.8, 0.5, 0.12, 1.1, 1.2, 0.3);
    let color_only = FilterPreset::new("Color", 0.0, 0.0, 0.0, 1.1, 1.2, 0.0);
    let at_zero = pipeline::apply(source.clone(), &full, 0.0, false, None);
    let reference = pipeline::apply(source.clone(), &color_only, 1.0, false, None);
    assert_ne!(at_zero, source);
    assert_eq!(at_zero, reference);
}

#[test]
fn stronger_vignette_darkens_the_border() {
    let source = PixelBuffer::filled_rgb(80, 60, [150, 150, 150]);
    let border_for = |vignette: f32| {
        let preset = FilterPreset::new("Vignette", 0.0, vignette, 0.0, 1.0, 1.0, 0.0);
        border_mean(&pipeline::apply(source.clone(), &preset, 1.0, false, None))
    };

    let light = border_for(0.15);
    let medium = border_for(0.3);
    let heavy = border_for(0.6);

    assert!(light < 150.0);
    assert!(medium < light);
    assert!(heavy < medium);
}

#[test]
fn grain_without_amplitude_is_identity() {
    let source = gradient(20, 20);

    for grain in [0.0, -0.4] {
        let preset = FilterPreset::new("Clean", grain, 0.0, 0.0, 1.0, 1.0, 0.0);
        assert_eq!(pipeline::apply(source.clone(), &preset, 1.0, false, None), source);
    }

    // Positive grain at zero strength also collapses to nothing
    let grainy = FilterPreset::new("Grainy", 0.9, 0.0, 0.0, 1.0, 1.0, 0.0);
    assert_eq!(pipeline::apply(source.clone(), &grainy, 0.0, false, None), source);
}

#[test]
fn portrait_compositor_only_runs_for_portrait_captures() {
    let calls = Arc::new(AtomicUsize::new(0));
    let renderer = Pipeline::with_depth_compositor(Box::new(Recording { calls: calls.clone() }));
    let source = gradient(16, 16);
    let preset = FilterPreset::neutral();

    renderer.apply(PipelineInput::new(source.clone(), preset.clone()).with_portrait(false));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    renderer.apply(PipelineInput::new(source.clone(), preset.clone()).with_portrait(true).with_strength(0.0));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    renderer.apply(PipelineInput::new(source, preset).with_portrait(true).with_strength(0.5));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn portrait_blur_softens_and_vanishes_at_zero_strength() {
    let source = gradient(40, 40);
    let neutral = FilterPreset::neutral();

    let unchanged = pipeline::apply(source.clone(), &neutral, 0.0, true, None);
    assert_eq!(unchanged, source);

    let blurred = pipeline::apply(source.clone(), &neutral, 1.0, true, None);
    assert_ne!(blurred, source);
    assert_eq!((blurred.width, blurred.height), (40, 40));
}

#[test]
fn absent_stamp_matches_a_pipeline_without_a_stamp_stage() {
    let source = gradient(48, 48);
    let preset = FilterPreset::new("Stamped", 0.5, 0.4, 0.1, 1.1, 0.9, 0.2);
    let seed = 1999;

    let rendered = Pipeline::new()
        .apply(PipelineInput::new(source.clone(), preset.clone()).with_grain_seed(seed))
        .into_image();

    let stages: [Box<dyn Stage>; 3] = [
        Box::new(ToneStage::new()),
        Box::new(VignetteStage::new()),
        Box::new(GrainStage::new()),
    ];
    let ctx = StageContext {
        preset: &preset,
        strength: 1.0,
        portrait: false,
        date_stamp: None,
        grain_seed: Some(seed),
    };
    let mut frame = Frame::from_buffer(&source).unwrap();
    for stage in &stages {
        if stage.is_active(&ctx) {
            stage.apply(&mut frame, &ctx).unwrap();
        }
    }
    let without_stamp = frame.to_buffer(&source).unwrap();

    assert_eq!(rendered, without_stamp);

    // An empty stamp is the same as no stamp
    let empty = Pipeline::new()
        .apply(PipelineInput::new(source, preset).with_grain_seed(seed).with_date_stamp(""))
        .into_image();
    assert_eq!(empty, rendered);
}

#[test]
fn stamp_marks_the_bottom_right_corner() {
    let source = PixelBuffer::filled_rgb(120, 80, [40, 40, 40]);
    let neutral = FilterPreset::neutral();

    let stamped = pipeline::apply(source.clone(), &neutral, 1.0, false, Some("1999"));
    assert_ne!(stamped, source);

    // Top half is untouched; the stamp lives in the strip near the bottom
    assert_eq!(mean(&stamped, 0, 0, 120, 40), 40.0);
    assert!(mean(&stamped, 60, 52, 108, 76) > 40.0);
}

#[test]
fn seeded_grain_is_reproducible_and_unseeded_grain_is_not() {
    let source = PixelBuffer::filled_rgb(32, 32, [128, 128, 128]);
    let preset = FilterPreset::new("Grain", 0.5, 0.0, 0.0, 1.0, 1.0, 0.0);
    let renderer = Pipeline::new();
    let render = |seed: Option<u64>| {
        renderer
            .apply(PipelineInput::new(source.clone(), preset.clone()).with_optional_grain_seed(seed))
            .into_image()
    };

    assert_eq!(render(Some(42)), render(Some(42)));
    assert_ne!(render(Some(42)), render(Some(43)));
    assert_ne!(render(None), render(None));
}

#[test]
fn disposable_daylight_on_mid_gray() {
    let catalog = Catalog::builtin().unwrap();
    let (_, preset) = catalog.resolve("1999", Some("Disposable Daylight")).unwrap();
    assert_eq!(
        (preset.grain, preset.vignette, preset.tint, preset.contrast, preset.saturation, preset.exposure),
        (0.6, 0.4, 0.0, 1.0, 1.05, 0.1)
    );

    let source = PixelBuffer::filled_rgb(100, 100, [128, 128, 128]);
    let output = pipeline::apply(source.clone(), preset, 1.0, false, None);
    assert_eq!((output.width, output.height), (100, 100));

    // Exposure brightens: check the same preset without grain at the center
    let mut clean = preset.clone();
    clean.grain = 0.0;
    let clean_output = pipeline::apply(source.clone(), &clean, 1.0, false, None);
    let center = clean_output.pixel(50, 50);
    assert!(center.iter().all(|&c| c > 128), "center {:?}", center);
    assert!(center[0] == center[1] && center[1] == center[2]);

    // Edges are visibly darker than the middle
    let middle = mean(&output, 40, 40, 60, 60);
    let border = border_mean(&output);
    assert!(border + 20.0 < middle, "border {} middle {}", border, middle);

    // Grain leaves per-pixel variance
    let values: Vec<f64> = output.data.iter().map(|&c| c as f64).collect();
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    assert!(variance > 0.0);
}

#[test]
fn undecodable_input_is_passed_through() {
    let preset = Catalog::builtin().unwrap().first().first_preset().clone();
    let broken = [
        PixelBuffer::new(0, 0, PixelLayout::Rgb8, Vec::new()),
        PixelBuffer::new(10, 10, PixelLayout::Rgba8, vec![7; 17]),
        PixelBuffer::new(0, 5, PixelLayout::Luma8, Vec::new()),
        // Headers whose byte count overflows or wraps to zero
        PixelBuffer::new(u32::MAX, u32::MAX, PixelLayout::Rgba8, Vec::new()),
        PixelBuffer::new(1 << 31, 1 << 31, PixelLayout::Rgba8, Vec::new()),
    ];

    for source in broken {
        let outcome = Pipeline::new().apply(
            PipelineInput::new(source.clone(), preset.clone())
                .with_portrait(true)
                .with_date_stamp("1999"),
        );
        assert_eq!(outcome.reason(), Some(&FallbackReason::Undecodable));
        assert_eq!(outcome.into_image(), source);

        assert_eq!(pipeline::apply(source.clone(), &preset, 1.0, false, None), source);
    }
}
