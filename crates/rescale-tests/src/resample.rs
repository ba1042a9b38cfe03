//! Numeric properties of resampled output.

use approx::assert_abs_diff_eq;
use rescale_core::{ImageBuffer, PixelFormat, PixelSource};
use rescale_ops::{resize, ConvolutionTransform, Filter, ResizeSettings};

use crate::sources::pattern;

const FILTERS: [Filter; 11] = [
    Filter::Nearest,
    Filter::Average,
    Filter::Linear,
    Filter::Hermite,
    Filter::Quadratic,
    Filter::Mitchell,
    Filter::CatmullRom,
    Filter::Cubic,
    Filter::CubicSmoother,
    Filter::Lanczos,
    Filter::Spline36,
];

const INTEGER_FORMATS: [PixelFormat; 9] = [
    PixelFormat::Grey8,
    PixelFormat::Grey16,
    PixelFormat::CbCr8,
    PixelFormat::Bgr24,
    PixelFormat::Bgr48,
    PixelFormat::Bgra32,
    PixelFormat::Pbgra32,
    PixelFormat::Bgra64,
    PixelFormat::Pbgra64,
];

fn run<S: PixelSource>(mut stage: S) -> ImageBuffer {
    ImageBuffer::from_source(&mut stage).unwrap()
}

fn mean(data: &[u8]) -> f64 {
    data.iter().map(|&v| f64::from(v)).sum::<f64>() / data.len() as f64
}

#[test]
fn test_downscale_example() {
    let src = ImageBuffer::from_vec(4, 1, PixelFormat::Grey8, vec![10, 20, 30, 40]).unwrap();
    let s = Filter::Average.settings().unwrap();
    let out = run(ConvolutionTransform::new(src, 2, 1, &s).unwrap());
    assert_eq!(out.data(), &[15, 35]);
}

#[test]
fn test_point_identity_all_formats() {
    let s = Filter::Nearest.settings().unwrap();
    for format in INTEGER_FORMATS {
        let src = pattern(17, 11, format).unwrap();
        let out = run(ConvolutionTransform::new(src.clone(), 17, 11, &s).unwrap());
        assert_eq!(out, src, "{format}");
    }
}

#[test]
fn test_interpolating_filters_identity() {
    // Kernels that are 1 at 0 and 0 at every other integer reproduce the
    // source exactly at scale 1.
    for filter in [Filter::Linear, Filter::CatmullRom, Filter::Lanczos, Filter::Spline36, Filter::Hermite] {
        let s = filter.settings().unwrap();
        let src = pattern(19, 13, PixelFormat::Bgra32).unwrap();
        let out = run(ConvolutionTransform::new(src.clone(), 19, 13, &s).unwrap());
        assert_eq!(out, src, "{filter:?}");
    }
}

#[test]
fn test_constant_image_stays_constant() {
    let px8 = [17u8, 200, 99, 255];
    let px16 = [1234u16, 65535, 0, 40000];
    for filter in FILTERS {
        let s = filter.settings().unwrap();
        for (w, h) in [(7, 5), (31, 2), (1, 9), (64, 64)] {
            let data = px8.repeat(12 * 10);
            let src = ImageBuffer::from_vec(12, 10, PixelFormat::Bgra32, data).unwrap();
            let out = run(ConvolutionTransform::new(src, w, h, &s).unwrap());
            assert!(out.data().chunks_exact(4).all(|p| p == px8), "{filter:?} {w}x{h}");

            let samples = px16.repeat(12 * 10);
            let src = ImageBuffer::from_u16(12, 10, PixelFormat::Bgra64, &samples).unwrap();
            let out = run(ConvolutionTransform::new(src, w, h, &s).unwrap());
            assert!(out.samples_u16().chunks_exact(4).all(|p| p == px16), "{filter:?} {w}x{h}");
        }
    }
}

#[test]
fn test_downscale_preserves_mean() {
    let src = pattern(120, 90, PixelFormat::Grey8).unwrap();
    for filter in [Filter::Average, Filter::Linear, Filter::Spline36] {
        let out = resize(&src, &ResizeSettings::new(40, 30).with_filter(filter)).unwrap();
        assert_abs_diff_eq!(mean(out.data()), mean(src.data()), epsilon = 4.0);
    }
}

#[test]
fn test_ramp_stays_monotonic() {
    let data: Vec<u8> = (0..8).flat_map(|_| (0..100u32).map(|x| (x * 2 + 20) as u8)).collect();
    let src = ImageBuffer::from_vec(100, 8, PixelFormat::Grey8, data).unwrap();
    for filter in [Filter::Linear, Filter::Hermite] {
        let out = resize(&src, &ResizeSettings::new(37, 3).with_filter(filter)).unwrap();
        for y in 0..3 {
            let row = out.row(y);
            assert!(row.windows(2).all(|w| w[0] <= w[1]), "{filter:?}: {row:?}");
        }
    }
}

#[test]
fn test_alpha_never_rings() {
    // A step in both color and alpha, upscaled with a ringing kernel.
    let mut data = Vec::new();
    for x in 0..10 {
        let v = if x < 5 { 50 } else { 200 };
        data.extend_from_slice(&[v, v, v, v]);
    }
    let src = ImageBuffer::from_vec(10, 1, PixelFormat::Bgra32, data).unwrap();
    let s = Filter::Lanczos.settings().unwrap();
    let out = run(ConvolutionTransform::new(src, 25, 1, &s).unwrap());

    let alpha: Vec<u8> = out.data().chunks_exact(4).map(|p| p[3]).collect();
    let color: Vec<u8> = out.data().chunks_exact(4).map(|p| p[0]).collect();
    assert!(alpha.iter().all(|&a| (50..=200).contains(&a)), "{alpha:?}");
    assert!(color.iter().any(|&c| !(50..=200).contains(&c)), "{color:?}");
}

#[test]
fn test_premultiplied_stays_valid() {
    // Color never exceeds alpha in a premultiplied image resized with a
    // non-negative kernel.
    let mut data = Vec::new();
    for i in 0..(23 * 17) {
        let a = ((i * 37) % 256) as u8;
        let c = ((u32::from(a) * ((i as u32 * 11) % 256)) / 255) as u8;
        data.extend_from_slice(&[c, c / 2, a / 3, a]);
    }
    let src = ImageBuffer::from_vec(23, 17, PixelFormat::Pbgra32, data).unwrap();
    for filter in [Filter::Linear, Filter::Average, Filter::Hermite] {
        let out = resize(&src, &ResizeSettings::new(9, 40).with_filter(filter)).unwrap();
        for p in out.data().chunks_exact(4) {
            assert!(p[0] <= p[3] && p[1] <= p[3] && p[2] <= p[3], "{filter:?}: {p:?}");
        }
    }
}

#[test]
fn test_extreme_ratios() {
    let src = pattern(300, 2, PixelFormat::Bgr24).unwrap();
    let tiny = resize(&src, &ResizeSettings::new(1, 1).with_filter(Filter::Lanczos)).unwrap();
    assert_eq!(tiny.data().len(), 3);

    let one = ImageBuffer::from_vec(1, 1, PixelFormat::Grey8, vec![77]).unwrap();
    for filter in FILTERS {
        let big = resize(&one, &ResizeSettings::new(50, 3).with_filter(filter)).unwrap();
        assert!(big.data().iter().all(|&v| v == 77), "{filter:?}");
    }
}

#[test]
fn test_blur_softens() {
    let src = pattern(64, 64, PixelFormat::Grey8).unwrap();
    let sharp = resize(&src, &ResizeSettings::new(48, 48).with_filter(Filter::CatmullRom)).unwrap();
    let soft = resize(
        &src,
        &ResizeSettings::new(48, 48).with_filter(Filter::CatmullRom).with_blur(2.0),
    )
    .unwrap();

    let energy = |img: &ImageBuffer| -> u64 {
        img.data()
            .windows(2)
            .map(|w| u64::from(w[0].abs_diff(w[1])))
            .sum()
    };
    assert!(energy(&soft) < energy(&sharp));
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_matches_sequential() {
    let src = pattern(211, 157, PixelFormat::Bgra32).unwrap();
    let s = ResizeSettings::new(97, 203).with_filter(Filter::Lanczos);
    assert_eq!(rescale_ops::parallel::resize_par(&src, &s).unwrap(), resize(&src, &s).unwrap());
}
