//! Row-window behavior seen from upstream: fetch counts, reloads, retries.

use rescale_core::{ImageBuffer, PixelFormat, PixelSource, Rect};
use rescale_ops::{ConvolutionTransform, Filter};

use crate::init_tracing;
use crate::sources::{pattern, CountingSource, FlakySource};

fn read_rows<S: PixelSource>(stage: &mut S, order: impl IntoIterator<Item = u32>) -> Vec<Vec<u8>> {
    let (width, _) = stage.size();
    let row_bytes = stage.format().row_bytes(width).unwrap();
    order
        .into_iter()
        .map(|y| {
            let mut row = vec![0u8; row_bytes];
            stage.copy_pixels(Rect::new(0, y, width, 1), row_bytes, &mut row).unwrap();
            row
        })
        .collect()
}

#[test]
fn test_top_to_bottom_fetches_each_row_once() {
    init_tracing();
    for (filter, out_w, out_h) in [
        (Filter::Lanczos, 20, 37),
        (Filter::Linear, 61, 250),
        (Filter::Spline36, 13, 9),
        (Filter::Nearest, 50, 120),
    ] {
        let src = CountingSource::new(pattern(50, 120, PixelFormat::Bgr24).unwrap());
        let mut stage = ConvolutionTransform::new(src, out_w, out_h, &filter.settings().unwrap()).unwrap();
        read_rows(&mut stage, 0..out_h);

        let counted = stage.source();
        assert_eq!(counted.fetches(), counted.distinct(), "{filter:?}");
        assert_eq!(stage.rows_fetched(), counted.fetches() as u64);
        // Downscaling or not, every source row contributes somewhere.
        if filter != Filter::Nearest {
            assert_eq!(counted.distinct(), 120, "{filter:?}");
        }
    }
}

#[test]
fn test_single_call_matches_row_calls() {
    let s = Filter::CatmullRom.settings().unwrap();
    let src = pattern(33, 47, PixelFormat::Bgra32).unwrap();

    let mut whole = ConvolutionTransform::new(src.clone(), 21, 30, &s).unwrap();
    let all = ImageBuffer::from_source(&mut whole).unwrap();

    let mut by_row = ConvolutionTransform::new(src, 21, 30, &s).unwrap();
    let rows = read_rows(&mut by_row, 0..30);
    for (y, row) in rows.iter().enumerate() {
        assert_eq!(row.as_slice(), all.row(y as u32));
    }
}

#[test]
fn test_repeated_row_is_not_refetched() {
    let s = Filter::Mitchell.settings().unwrap();
    let src = CountingSource::new(pattern(16, 40, PixelFormat::Grey8).unwrap());
    let mut stage = ConvolutionTransform::new(src, 16, 20, &s).unwrap();

    let first = read_rows(&mut stage, [7]);
    let fetched = stage.source().fetches();
    let again = read_rows(&mut stage, [7, 7]);
    assert_eq!(stage.source().fetches(), fetched);
    assert_eq!(first[0], again[0]);
    assert_eq!(first[0], again[1]);
}

#[test]
fn test_pathological_order_reloads_window() {
    // Box 100 -> 10: ten-row windows with no overlap.
    let s = Filter::Average.settings().unwrap();
    let src = CountingSource::new(pattern(4, 100, PixelFormat::Grey8).unwrap());
    let mut stage = ConvolutionTransform::new(src, 4, 10, &s).unwrap();
    assert_eq!(stage.vertical_map().sample_count(), 10);

    let rows = read_rows(&mut stage, [9, 0, 9]);
    assert_eq!(stage.source().fetches(), 30);
    assert_eq!(rows[0], rows[2]);
}

#[test]
fn test_backwards_order_is_still_correct() {
    let s = Filter::Lanczos.settings().unwrap();
    let src = pattern(24, 64, PixelFormat::Bgr48).unwrap();

    let mut forward = ConvolutionTransform::new(src.clone(), 18, 29, &s).unwrap();
    let expected = read_rows(&mut forward, 0..29);

    let mut backward = ConvolutionTransform::new(src, 18, 29, &s).unwrap();
    let mut rows = read_rows(&mut backward, (0..29).rev());
    rows.reverse();
    assert_eq!(rows, expected);
}

#[test]
fn test_retry_after_upstream_failure() {
    init_tracing();
    let s = Filter::CatmullRom.settings().unwrap();
    let image = pattern(40, 100, PixelFormat::Bgr24).unwrap();

    let mut clean = ConvolutionTransform::new(image.clone(), 20, 50, &s).unwrap();
    let expected = read_rows(&mut clean, 0..50);

    let flaky = CountingSource::new(FlakySource::new(image, 57, 2));
    let mut stage = ConvolutionTransform::new(flaky, 20, 50, &s).unwrap();
    let row_bytes = 20 * 3;
    let mut got = Vec::new();
    let mut errors = 0;
    for y in 0..50 {
        let mut row = vec![0u8; row_bytes];
        loop {
            match stage.copy_pixels(Rect::new(0, y, 20, 1), row_bytes, &mut row) {
                Ok(()) => break,
                Err(e) => {
                    assert!(!e.is_request_error());
                    errors += 1;
                    assert!(errors <= 2);
                }
            }
        }
        got.push(row);
    }

    assert_eq!(errors, 2);
    assert_eq!(stage.source().inner().failures(), 2);
    assert_eq!(got, expected);
    // Rows fetched before the failure were kept.
    let counted = stage.source();
    assert_eq!(counted.fetches(), counted.distinct());
}

#[test]
fn test_rejected_request_touches_nothing() {
    let s = Filter::Linear.settings().unwrap();
    let src = CountingSource::new(pattern(8, 8, PixelFormat::Grey8).unwrap());
    let mut stage = ConvolutionTransform::new(src, 6, 6, &s).unwrap();

    let mut buf = vec![0xAA; 64];
    assert!(stage.copy_pixels(Rect::new(0, 5, 6, 2), 6, &mut buf).is_err());
    assert!(stage.copy_pixels(Rect::new(0, 0, 6, 2), 5, &mut buf).is_err());
    assert!(stage.copy_pixels(Rect::new(0, 0, 6, 2), 6, &mut buf[..11]).is_err());
    assert_eq!(stage.source().fetches(), 0);
    assert!(buf.iter().all(|&b| b == 0xAA));
}

#[test]
fn test_padded_stride() {
    let s = Filter::Spline36.settings().unwrap();
    let src = pattern(30, 30, PixelFormat::Bgr24).unwrap();

    let mut a = ConvolutionTransform::new(src.clone(), 10, 10, &s).unwrap();
    let tight = ImageBuffer::from_source(&mut a).unwrap();

    let mut b = ConvolutionTransform::new(src, 10, 10, &s).unwrap();
    let stride = 10 * 3 + 5;
    let mut buf = vec![0x55u8; stride * 10];
    b.copy_pixels(Rect::new(0, 0, 10, 10), stride, &mut buf).unwrap();
    for y in 0..10usize {
        let row = &buf[y * stride..y * stride + 30];
        assert_eq!(row, tight.row(y as u32));
        if y < 9 {
            assert!(buf[y * stride + 30..(y + 1) * stride].iter().all(|&p| p == 0x55));
        }
    }
}
