//! Filter-graph integration tests: from FFmpeg log text to script text.

use scrub_media::graph::{FilterGraph, GraphError, Instruction, SegmentKind};
use scrub_media::{normalize_silences, parse_duration, parse_loudness, parse_sample_rate, parse_silences};
use scrub_models::{
    format_fixed, gain_to_target, parse_timestamp, silence_threshold_db, FilterGraphParams,
    HastenMode, PanMode, Resolution, SilenceInterval,
};

const PROBE_LOG: &str = "\
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'lecture.mp4':
  Duration: 00:01:00.00, start: 0.000000, bitrate: 900 kb/s
    Stream #0:0(und): Video: h264 (High), yuv420p, 1280x720, 800 kb/s, 30 fps
    Stream #0:1(und): Audio: aac (LC), 44100 Hz, stereo, fltp, 96 kb/s
";

const SILENCE_LOG: &str = "\
[silencedetect @ 0x5581] silence_start: 10
[silencedetect @ 0x5581] silence_end: 14 | silence_duration: 4
[silencedetect @ 0x5581] silence_start: 58
size=N/A time=00:01:00.00 bitrate=N/A speed= 512x
";

const LOUDNESS_LOG: &str = "\
[Parsed_ebur128_0 @ 0x5581] Summary:

  Integrated loudness:
    I:         -26.0 LUFS
    Threshold: -36.8 LUFS

  Loudness range:
    LRA:         9.1 LU
    Threshold:  -46.9 LUFS
    LRA low:    -31.4 LUFS
    LRA high:   -22.3 LUFS
";

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_end_to_end_single_silence() {
    let silences = parse_silences(SILENCE_LOG).unwrap();
    let params = FilterGraphParams::new(2.0).with_delay(0.25);
    let graph = FilterGraph::build(&silences, &params).unwrap();

    let segments = graph.segments();
    assert_eq!(segments.len(), 3);

    assert_eq!(segments[0].kind, SegmentKind::Regular);
    assert_close(segments[0].start, 0.0);
    assert_close(segments[0].end.unwrap(), 10.25);

    assert_eq!(segments[1].kind, SegmentKind::SpedUp);
    assert_close(segments[1].start, 10.25);
    assert_close(segments[1].end.unwrap(), 13.75);
    assert_close(segments[1].output_duration(60.0, 2.0), 1.75);

    assert_eq!(segments[2].kind, SegmentKind::Regular);
    assert_close(segments[2].start, 13.75);
    assert_eq!(segments[2].end, None);

    let concat = graph
        .instructions()
        .iter()
        .find_map(|i| match i {
            Instruction::Concatenate { inputs, .. } => Some(inputs.len()),
            _ => None,
        })
        .unwrap();
    assert_eq!(concat, 3);

    let duration = parse_duration(PROBE_LOG).unwrap();
    assert_close(graph.output_duration(duration), 60.0 - 1.75);
    assert_close(graph.time_saved(), 1.75);
}

#[test]
fn test_trailing_open_silence_left_untouched() {
    let silences = parse_silences(SILENCE_LOG).unwrap();
    assert_eq!(silences.last().unwrap(), &SilenceInterval::open(58.0));

    let normalized = normalize_silences(&silences);
    assert_eq!(normalized, vec![SilenceInterval::closed(10.0, 14.0)]);

    let graph = FilterGraph::build(&silences, &FilterGraphParams::new(2.0)).unwrap();
    let tail = graph.segments().last().unwrap();
    assert_eq!(tail.kind, SegmentKind::Regular);
    assert!(tail.start < 58.0);
    assert_eq!(tail.end, None);
}

#[test]
fn test_zero_silences_pass_through() {
    let silences = parse_silences("size=N/A time=00:01:00.00 bitrate=N/A").unwrap_or_default();
    let graph = FilterGraph::build(&silences, &FilterGraphParams::default()).unwrap();

    assert_eq!(graph.segments().len(), 1);
    assert!(!graph.has_concatenation());
    assert!(!graph.to_script().contains("concat"));
    assert_close(graph.output_duration(60.0), 60.0);
}

#[test]
fn test_invalid_delay_rejected_before_script() {
    let params = FilterGraphParams::new(2.0).with_delay(1.5);
    let result = FilterGraph::build(&[SilenceInterval::closed(10.0, 12.0)], &params);
    assert!(matches!(result, Err(GraphError::InvalidParameters(_))));
}

#[test]
fn test_malformed_intervals_rejected() {
    let silences = vec![
        SilenceInterval::closed(10.0, 14.0),
        SilenceInterval::closed(12.0, 16.0),
    ];
    let result = FilterGraph::build(&silences, &FilterGraphParams::new(2.0));
    assert!(matches!(result, Err(GraphError::MalformedIntervals { .. })));
}

#[test]
fn test_full_pipeline_from_logs() {
    let rate = parse_sample_rate(PROBE_LOG).unwrap();
    let loudness = parse_loudness(LOUDNESS_LOG).unwrap();
    let input_lufs = loudness.integrated().unwrap();

    let gain = gain_to_target(input_lufs, -18.0, true);
    assert_close(gain, 5.0);
    assert_close(silence_threshold_db(input_lufs, -18.0, -18.0), -26.0);

    let params = FilterGraphParams::new(8.0)
        .with_hasten(HastenMode::Pitch)
        .with_sample_rate(rate)
        .with_rescale(Resolution::FULL_HD)
        .with_pan(PanMode::Left)
        .with_gain_db(gain);
    let script = FilterGraph::build(&parse_silences(SILENCE_LOG).unwrap(), &params)
        .unwrap()
        .to_script();

    let lines: Vec<&str> = script.lines().collect();
    assert_eq!(
        lines,
        vec![
            "[0:v]trim=0.0000:10.2500,setpts=PTS-STARTPTS[v1];",
            "[0:a]atrim=0.0000:10.2500,asetpts=PTS-STARTPTS[a1];",
            "[0:v]trim=10.2500:13.7500,setpts=(PTS-STARTPTS)/8.0[v2];",
            "[0:a]atrim=10.2500:13.7500,asetpts=PTS-STARTPTS,asetrate=352800,aresample=44100,volume=0.0[a2];",
            "[0:v]trim=start=13.7500,setpts=PTS-STARTPTS[v3];",
            "[0:a]atrim=start=13.7500,asetpts=PTS-STARTPTS[a3];",
            "[v1][a1][v2][a2][v3][a3]concat=n=3:v=1:a=1[vn][an];",
            "[vn]scale=w=1920:h=1080:force_original_aspect_ratio=decrease[scaled];",
            "[scaled]pad=1920:1080:(ow-iw)/2:(oh-ih)/2[v];",
            "[an]pan=stereo|c0=c0|c1=c0,volume=5.0dB[a]",
        ]
    );
}

#[test]
fn test_many_silences_are_contiguous() {
    let silences: Vec<SilenceInterval> = (0..50)
        .map(|i| {
            let start = 5.0 + i as f64 * 7.3;
            SilenceInterval::closed(start, start + 2.0 + (i % 4) as f64)
        })
        .collect();
    let params = FilterGraphParams::new(6.0).with_delay(0.3);
    let graph = FilterGraph::build(&silences, &params).unwrap();

    assert_eq!(graph.segments().len(), 2 * silences.len() + 1);
    for pair in graph.segments().windows(2) {
        assert_eq!(pair[0].end, Some(pair[1].start));
    }

    let expected_saved: f64 = silences
        .iter()
        .map(|s| {
            let sped = s.span().unwrap() - 2.0 * params.delay;
            sped - sped / params.factor
        })
        .sum();
    assert!((graph.time_saved() - expected_saved).abs() < 1e-6);
}

#[test]
fn test_timestamp_properties() {
    assert_close(parse_timestamp("01:02:03.500").unwrap(), 3723.5);

    for value in [0.0, 1.0 / 3.0, 10.25, 987.65432, 3723.5] {
        let round_tripped: f64 = format_fixed(value).parse().unwrap();
        assert!((round_tripped - value).abs() <= 5e-5);
    }
}
