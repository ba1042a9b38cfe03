//! Unsharp-mask stage behind a resampler.

use rescale_core::{ImageBuffer, PixelFormat, PixelSource, Rect};
use rescale_ops::{build_pipeline, resize, Convolver, Filter, ResizeSettings, UnsharpMask, UnsharpMaskSettings};

use crate::init_tracing;
use crate::sources::{pattern, CountingSource};

#[test]
fn test_zero_amount_is_bit_exact() {
    for format in [PixelFormat::Grey8, PixelFormat::Bgra32, PixelFormat::Bgr48, PixelFormat::Pbgra64] {
        let convolver = Convolver::for_format(format).unwrap();
        let original = pattern(31, 1, format).unwrap();
        let blurred = pattern(31, 2, format).unwrap();
        let mut out = vec![0u8; original.data().len()];
        for threshold in [0, 1, 40, 255] {
            convolver.sharpen_line(original.data(), blurred.row(1), &mut out, 0, threshold);
            assert_eq!(out.as_slice(), original.data(), "{format} t={threshold}");
        }
    }
}

#[test]
fn test_sharpened_resize_fetches_each_row_once() {
    init_tracing();
    let mut src = CountingSource::new(pattern(80, 120, PixelFormat::Bgr24).unwrap());
    let settings = ResizeSettings::new(30, 45)
        .with_filter(Filter::Lanczos)
        .with_unsharp(UnsharpMaskSettings::new(75, 0.5, 2));

    {
        let mut stage = build_pipeline(&mut src, &settings).unwrap();
        let out = ImageBuffer::from_source(&mut stage).unwrap();
        assert_eq!((out.width(), out.height()), (30, 45));
    }
    assert_eq!(src.distinct(), 120);
    assert_eq!(src.fetches(), src.distinct());
}

#[test]
fn test_unsharp_over_resampler_reads_once() {
    let counted = CountingSource::new(pattern(60, 90, PixelFormat::Grey8).unwrap());
    let s = Filter::CatmullRom.settings().unwrap();
    let resampled = rescale_ops::ConvolutionTransform::new(counted, 40, 50, &s).unwrap();
    let mut stage = UnsharpMask::new(resampled, UnsharpMaskSettings::new(100, 1.0, 0)).unwrap();

    ImageBuffer::from_source(&mut stage).unwrap();
    // Each resampled row is produced once, so each source row is read once.
    assert_eq!(stage.rows_fetched(), 50);
    let resampled = stage.into_inner();
    let counted = resampled.source();
    assert_eq!(counted.fetches(), counted.distinct());
}

#[test]
fn test_sharpening_raises_edge_contrast() {
    // Vertical edge: dark left half, bright right half.
    let data: Vec<u8> = (0..40).flat_map(|_| (0..40).map(|x| if x < 20 { 60 } else { 180 })).collect();
    let src = ImageBuffer::from_vec(40, 40, PixelFormat::Grey8, data).unwrap();

    let plain_settings = ResizeSettings::new(20, 20).with_filter(Filter::Linear);
    let plain = resize(&src, &plain_settings).unwrap();
    let sharp = resize(&src, &plain_settings.clone().with_unsharp(UnsharpMaskSettings::new(150, 1.0, 0))).unwrap();

    let span = |img: &ImageBuffer| {
        let row = img.row(10);
        let lo = *row.iter().min().unwrap();
        let hi = *row.iter().max().unwrap();
        hi - lo
    };
    assert!(span(&sharp) > span(&plain));
    // Far from the edge nothing changes.
    assert_eq!(sharp.row(10)[0], plain.row(10)[0]);
    assert_eq!(sharp.row(10)[19], plain.row(10)[19]);
}

#[test]
fn test_threshold_suppresses_small_detail() {
    // Low-amplitude texture below the threshold survives untouched.
    let data: Vec<u8> = (0..32 * 32).map(|i| 128 + (i % 3) as u8).collect();
    let src = ImageBuffer::from_vec(32, 32, PixelFormat::Grey8, data).unwrap();
    let mut stage = UnsharpMask::new(src.clone(), UnsharpMaskSettings::new(300, 1.0, 10)).unwrap();
    let out = ImageBuffer::from_source(&mut stage).unwrap();
    assert_eq!(out, src);
}

#[test]
fn test_tile_requests_match_full_frame() {
    let settings = ResizeSettings::new(37, 29).with_unsharp(UnsharpMaskSettings::new(60, 0.8, 1));
    let src = pattern(70, 50, PixelFormat::Bgra32).unwrap();
    let full = resize(&src, &settings).unwrap();

    let mut stage = build_pipeline(src.view(), &settings).unwrap();
    let bpp = 4;
    for (x, y, w, h) in [(0, 0, 10, 7), (10, 0, 27, 7), (0, 7, 37, 22)] {
        let stride = w as usize * bpp;
        let mut buf = vec![0u8; stride * h as usize];
        stage.copy_pixels(Rect::new(x, y, w, h), stride, &mut buf).unwrap();
        for r in 0..h {
            let start = x as usize * bpp;
            assert_eq!(
                &buf[r as usize * stride..(r as usize + 1) * stride],
                &full.row(y + r)[start..start + stride]
            );
        }
    }
}
