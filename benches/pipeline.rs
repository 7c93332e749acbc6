use criterion::{black_box, criterion_group, criterion_main, Criterion};

use timecam::{
    catalog::Catalog,
    photo::PixelBuffer,
    pipeline::{Pipeline, PipelineInput},
};

fn full_frame_render(c: &mut Criterion) {
    let catalog = Catalog::builtin().unwrap();
    let preset = catalog.first().first_preset().clone();
    let source = PixelBuffer::filled_rgb(1280, 720, [128, 110, 96]);
    let pipeline = Pipeline::new();

    let mut group = c.benchmark_group("render_720p");
    group.sample_size(20);

    group.bench_function("photo", |b| {
        b.iter(|| {
            let input = PipelineInput::new(source.clone(), preset.clone())
                .with_date_stamp("1999")
                .with_grain_seed(1);
            black_box(pipeline.apply(black_box(input)))
        })
    });

    group.bench_function("portrait", |b| {
        b.iter(|| {
            let input = PipelineInput::new(source.clone(), preset.clone())
                .with_portrait(true)
                .with_grain_seed(1);
            black_box(pipeline.apply(black_box(input)))
        })
    });

    group.finish();
}

criterion_group!(benches, full_frame_render);
criterion_main!(benches);
