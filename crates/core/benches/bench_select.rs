//! Performance benchmark for track selection
//!
//! Selection re-runs on every parameter or capability change, so a call over
//! a typical streaming manifest should stay well under a millisecond.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;
use trackselect_core::capabilities::{DeclaredDecoder, DeclaredRendererCapabilities, RendererCapabilities};
use trackselect_core::format::{Format, SelectionFlags, TrackType};
use trackselect_core::{mime, DefaultTrackSelector, MediaPeriodId, Parameters, TrackGroup, TrackGroupArray, TrackSelector};

/// Create a manifest with one video ladder of `rungs` tracks plus
/// `languages` audio and subtitle groups
fn create_test_groups(rungs: usize, languages: usize) -> TrackGroupArray {
    const LANGUAGES: [&str; 8] = ["en", "de", "fr", "es", "it", "ja", "ko", "pt"];

    let ladder = (0..rungs)
        .map(|i| {
            let height = 144 * (i as u32 + 1);
            Format::builder()
                .sample_mime_type(mime::VIDEO_H264)
                .size(height * 16 / 9, height)
                .frame_rate(30.0)
                .bitrate(400_000 * (i as u32 + 1))
                .build()
        })
        .collect();
    let mut groups = vec![TrackGroup::new("video", ladder).unwrap()];

    for language in LANGUAGES.iter().cycle().take(languages) {
        let audio = (0..3)
            .map(|i| {
                Format::builder()
                    .sample_mime_type(mime::AUDIO_AAC)
                    .language(language)
                    .channel_count(2)
                    .sample_rate(48_000)
                    .bitrate(64_000 * (i + 1))
                    .build()
            })
            .collect();
        groups.push(TrackGroup::new(format!("audio-{}", language), audio).unwrap());
        groups.push(
            TrackGroup::new(
                format!("text-{}", language),
                vec![Format::builder()
                    .sample_mime_type(mime::TEXT_VTT)
                    .language(language)
                    .selection_flags(SelectionFlags::FORCED)
                    .build()],
            )
            .unwrap(),
        );
    }
    TrackGroupArray::new(groups)
}

fn renderers() -> Vec<DeclaredRendererCapabilities> {
    vec![
        DeclaredRendererCapabilities::new("video", TrackType::Video)
            .with_decoder(DeclaredDecoder::new(mime::VIDEO_H264).with_hardware_acceleration(true)),
        DeclaredRendererCapabilities::new("audio", TrackType::Audio).with_decoder(DeclaredDecoder::new(mime::AUDIO_AAC)),
        DeclaredRendererCapabilities::new("text", TrackType::Text).with_decoder(DeclaredDecoder::new(mime::TEXT_VTT)),
    ]
}

/// Benchmark selection with growing manifests
fn bench_select(c: &mut Criterion) {
    let declared = renderers();
    let renderers: Vec<&dyn RendererCapabilities> = declared.iter().map(|r| r as &dyn RendererCapabilities).collect();
    let selector = DefaultTrackSelector::new(
        Parameters::builder()
            .preferred_audio_languages(["ja", "en"])
            .viewport_size(1920, 1080, true)
            .build(),
    );
    let period = MediaPeriodId::new("bench");

    let mut group = c.benchmark_group("select_tracks");
    group.measurement_time(Duration::from_secs(5));

    for (rungs, languages) in [(4, 2), (8, 4), (12, 8)] {
        let groups = create_test_groups(rungs, languages);
        group.bench_with_input(
            BenchmarkId::new("rungs_languages", format!("{}x{}", rungs, languages)),
            &groups,
            |b, groups| {
                b.iter(|| {
                    let result = selector.select_tracks(black_box(&renderers), black_box(groups), &period);
                    black_box(result)
                });
            },
        );
    }

    group.finish();
}

/// Benchmark parameter serialization round trip
fn bench_parameters_round_trip(c: &mut Criterion) {
    let params = Parameters::builder()
        .preferred_audio_languages(["de", "en"])
        .preferred_text_languages(["de"])
        .max_video_size_sd()
        .build();

    c.bench_function("parameters_json_round_trip", |b| {
        b.iter(|| {
            let json = params.to_json().unwrap();
            black_box(Parameters::from_json(black_box(&json)).unwrap())
        });
    });
}

criterion_group!(benches, bench_select, bench_parameters_round_trip);

criterion_main!(benches);
