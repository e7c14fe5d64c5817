use criterion::{criterion_group, criterion_main, Criterion};
use layerfilter::{BorderPolicy, Channel, Convolver, FilterConfig, Image, Kernel, Layer};
use std::hint::black_box;
use std::num::NonZeroUsize;

fn make_layer(channel: Channel, width: usize, height: usize) -> Layer {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            data.push((((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF) as u8);
        }
    }
    Layer::from_vec(channel, data, height, width).unwrap()
}

fn bench_convolver(c: &mut Criterion) {
    let layer = make_layer(Channel::Grayscale, 512, 512);
    let image = Image::new(
        Channel::RGBA
            .iter()
            .map(|&ch| make_layer(ch, 512, 512))
            .collect(),
    )
    .unwrap();

    let laplacian = Convolver::new(Kernel::laplacian_16());
    c.bench_function("laplacian3_gray_auto_workers", |b| {
        b.iter(|| black_box(laplacian.apply_layer(&layer).unwrap()));
    });

    let single = Convolver::new(Kernel::laplacian_16()).with_config(FilterConfig {
        workers: NonZeroUsize::new(1),
        ..FilterConfig::default()
    });
    c.bench_function("laplacian3_gray_one_worker", |b| {
        b.iter(|| black_box(single.apply_layer(&layer).unwrap()));
    });

    let blur = Convolver::new(Kernel::box_blur(7).unwrap()).with_config(FilterConfig {
        border: BorderPolicy::Replicate,
        ..FilterConfig::default()
    });
    c.bench_function("box7_rgba_replicate", |b| {
        b.iter(|| black_box(blur.apply(&image).unwrap()));
    });

    #[cfg(feature = "rayon")]
    {
        let rayon = Convolver::new(Kernel::laplacian_16()).with_config(FilterConfig {
            backend: layerfilter::Backend::Rayon,
            ..FilterConfig::default()
        });
        c.bench_function("laplacian3_gray_rayon", |b| {
            b.iter(|| black_box(rayon.apply_layer(&layer).unwrap()));
        });
    }
}

criterion_group!(benches, bench_convolver);
criterion_main!(benches);
