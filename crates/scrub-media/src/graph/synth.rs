//! Partition of the timeline into regular and sped-up segments.
//!
//! For `N` normalized silences the timeline `[0, EOF)` is split into
//! `2N + 1` segments:
//!
//! ```text
//!  0          s1+d    e1-d          s2+d    e2-d                 EOF
//!  |  REGULAR  | SPED_UP |  REGULAR  | SPED_UP |     REGULAR      |
//! ```
//!
//! `d` is the delay kept at normal speed at both edges of every silence.

use tracing::debug;

use scrub_models::{FilterGraphParams, HastenMode, SilenceInterval};

use super::instruction::{AudioHasten, Instruction, Port};
use super::segment::Segment;
use super::GraphError;
use crate::filters::atempo_stages;

/// Output of the synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    /// Segments in timeline order; `2N + 1` of them.
    pub segments: Vec<Segment>,
    /// Segment instructions followed by the concatenation (if any).
    pub instructions: Vec<Instruction>,
    /// Speedup factor applied to sped-up segments.
    pub factor: f64,
}

impl Synthesis {
    /// Number of sped-up segments.
    pub fn silence_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_sped_up()).count()
    }

    /// Seconds removed from the output.
    pub fn time_saved(&self) -> f64 {
        self.segments.iter().map(|s| s.time_saved(self.factor)).sum()
    }

    /// Output length for an input of `total_duration` seconds.
    pub fn output_duration(&self, total_duration: f64) -> f64 {
        self.segments
            .iter()
            .map(|s| s.output_duration(total_duration, self.factor))
            .sum()
    }
}

/// Build segment and concatenation instructions for normalized silences.
///
/// The final pair is written to `video_out` / `audio_out`. With no silences a
/// single pass-through segment writes there directly and no concatenation is
/// emitted.
///
/// Parameters and intervals are checked before anything is built:
/// every silence must be closed, start after 0, end after its start and
/// after the previous silence, and be longer than twice the delay.
pub fn synthesize(
    silences: &[SilenceInterval],
    params: &FilterGraphParams,
    video_out: Port,
    audio_out: Port,
) -> Result<Synthesis, GraphError> {
    params.validate()?;
    let spans = check_intervals(silences, params.delay)?;
    for span in &spans {
        params.check_delay_against(*span)?;
    }

    let factor = params.factor;
    let delay = params.delay;

    if silences.is_empty() {
        debug!("No silences, building pass-through graph");
        return Ok(Synthesis {
            segments: vec![Segment::tail(0.0)],
            instructions: vec![Instruction::RegularSegment {
                index: 1,
                start: 0.0,
                end: None,
                video_out,
                audio_out,
            }],
            factor,
        });
    }

    let segment_count = 2 * silences.len() + 1;
    let mut segments = Vec::with_capacity(segment_count);
    let mut instructions = Vec::with_capacity(segment_count + 1);
    let mut concat_inputs = Vec::with_capacity(segment_count);
    let mut previous_end = 0.0;

    for (i, silence) in silences.iter().enumerate() {
        // Closedness was checked above
        let Some(silence_end) = silence.end else {
            return Err(GraphError::malformed(i, "silence has no end"));
        };

        let regular_index = 2 * i + 1;
        let sped_index = 2 * i + 2;
        let speedup_begin = silence.start + delay;
        let speedup_end = silence_end - delay;

        segments.push(Segment::regular(previous_end, speedup_begin));
        instructions.push(Instruction::RegularSegment {
            index: regular_index,
            start: previous_end,
            end: Some(speedup_begin),
            video_out: Port::segment_video(regular_index),
            audio_out: Port::segment_audio(regular_index),
        });

        segments.push(Segment::sped_up(speedup_begin, speedup_end));
        instructions.push(Instruction::SpedUpSegment {
            index: sped_index,
            start: speedup_begin,
            end: speedup_end,
            factor,
            audio: hasten_audio(params, speedup_begin, speedup_end),
            volume: silent_volume(params),
            video_out: Port::segment_video(sped_index),
            audio_out: Port::segment_audio(sped_index),
        });

        concat_inputs.push((
            Port::segment_video(regular_index),
            Port::segment_audio(regular_index),
        ));
        concat_inputs.push((
            Port::segment_video(sped_index),
            Port::segment_audio(sped_index),
        ));

        previous_end = speedup_end;
    }

    segments.push(Segment::tail(previous_end));
    instructions.push(Instruction::RegularSegment {
        index: segment_count,
        start: previous_end,
        end: None,
        video_out: Port::segment_video(segment_count),
        audio_out: Port::segment_audio(segment_count),
    });
    concat_inputs.push((
        Port::segment_video(segment_count),
        Port::segment_audio(segment_count),
    ));

    instructions.push(Instruction::Concatenate {
        inputs: concat_inputs,
        video_out,
        audio_out,
    });

    debug!(
        silences = silences.len(),
        segments = segments.len(),
        factor,
        delay,
        "Synthesized filter graph segments"
    );

    Ok(Synthesis {
        segments,
        instructions,
        factor,
    })
}

/// Check ordering and bounds; returns the span of each silence.
/// Every silence must be closed, start after 0 and follow the previous one.
/// The regular stretch between two silences, widened by `delay` on both
/// sides, must not be empty.
fn check_intervals(silences: &[SilenceInterval], delay: f64) -> Result<Vec<f64>, GraphError> {
    let mut spans = Vec::with_capacity(silences.len());
    let mut previous_end: Option<f64> = None;

    for (i, silence) in silences.iter().enumerate() {
        let Some(end) = silence.end else {
            return Err(GraphError::malformed(i, "silence has no end"));
        };
        if !silence.start.is_finite() || !end.is_finite() {
            return Err(GraphError::malformed(i, "non-finite bound"));
        }
        if silence.start <= 0.0 {
            return Err(GraphError::malformed(
                i,
                format!("start {} is not after the beginning of the file", silence.start),
            ));
        }
        if end <= silence.start {
            return Err(GraphError::malformed(
                i,
                format!("end {} is not after start {}", end, silence.start),
            ));
        }
        if let Some(previous_end) = previous_end {
            if silence.start < previous_end {
                return Err(GraphError::malformed(
                    i,
                    format!(
                        "start {} overlaps or precedes the previous silence ending at {}",
                        silence.start, previous_end
                    ),
                ));
            }
            if silence.start - previous_end + 2.0 * delay <= 0.0 {
                return Err(GraphError::malformed(
                    i,
                    format!(
                        "start {} touches the previous silence, leaving no regular segment",
                        silence.start
                    ),
                ));
            }
        }

        previous_end = Some(end);
        spans.push(end - silence.start);
    }

    Ok(spans)
}

fn hasten_audio(params: &FilterGraphParams, begin: f64, end: f64) -> AudioHasten {
    match params.hasten {
        HastenMode::Tempo => AudioHasten::Tempo {
            stages: atempo_stages(params.factor),
        },
        HastenMode::Pitch => AudioHasten::Pitch {
            rate: (params.factor * params.sample_rate as f64).round() as u32,
            resample_to: params.sample_rate,
        },
        HastenMode::Truncate => AudioHasten::Truncate {
            end: begin + (end - begin) / params.factor,
        },
    }
}

/// Pitch mode is always muted, so the multiplier only applies to the others.
fn silent_volume(params: &FilterGraphParams) -> Option<f64> {
    if params.hasten == HastenMode::Pitch || params.silent_volume == 1.0 {
        None
    } else {
        Some(params.silent_volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::segment::SegmentKind;

    fn outputs() -> (Port, Port) {
        (Port::named("vn"), Port::named("an"))
    }

    fn build(silences: &[SilenceInterval], params: &FilterGraphParams) -> Synthesis {
        let (v, a) = outputs();
        synthesize(silences, params, v, a).unwrap()
    }

    #[test]
    fn test_single_silence_scenario() {
        let params = FilterGraphParams::new(2.0).with_delay(0.25);
        let synthesis = build(&[SilenceInterval::closed(10.0, 14.0)], &params);

        assert_eq!(
            synthesis.segments,
            vec![
                Segment::regular(0.0, 10.25),
                Segment::sped_up(10.25, 13.75),
                Segment::tail(13.75),
            ]
        );
        let sped = synthesis.segments[1];
        assert!((sped.output_duration(60.0, 2.0) - 1.75).abs() < 1e-9);

        match synthesis.instructions.last() {
            Some(Instruction::Concatenate {
                inputs,
                video_out,
                audio_out,
            }) => {
                assert_eq!(inputs.len(), 3);
                assert_eq!(inputs[0], (Port::segment_video(1), Port::segment_audio(1)));
                assert_eq!(inputs[2], (Port::segment_video(3), Port::segment_audio(3)));
                assert_eq!(video_out, &Port::named("vn"));
                assert_eq!(audio_out, &Port::named("an"));
            }
            other => panic!("expected concatenation, got {:?}", other),
        }
    }

    #[test]
    fn test_segment_count_and_contiguity() {
        let silences = vec![
            SilenceInterval::closed(3.0, 6.0),
            SilenceInterval::closed(10.0, 14.0),
            SilenceInterval::closed(14.5, 20.0),
            SilenceInterval::closed(41.2, 44.9),
        ];
        let params = FilterGraphParams::new(8.0).with_delay(0.25);
        let synthesis = build(&silences, &params);

        assert_eq!(synthesis.segments.len(), 2 * silences.len() + 1);
        assert_eq!(synthesis.segments[0].start, 0.0);
        assert_eq!(synthesis.segments.last().unwrap().end, None);
        for pair in synthesis.segments.windows(2) {
            assert_eq!(pair[0].end, Some(pair[1].start));
            assert!(pair[0].start < pair[1].start);
        }
        for (i, segment) in synthesis.segments.iter().enumerate() {
            let expected = if i % 2 == 0 {
                SegmentKind::Regular
            } else {
                SegmentKind::SpedUp
            };
            assert_eq!(segment.kind, expected);
        }
    }

    #[test]
    fn test_sped_up_duration_and_time_saved() {
        let silences = vec![
            SilenceInterval::closed(10.0, 14.0),
            SilenceInterval::closed(30.0, 40.0),
        ];
        let params = FilterGraphParams::new(4.0).with_delay(0.5);
        let synthesis = build(&silences, &params);

        for (segment, silence) in synthesis
            .segments
            .iter()
            .filter(|s| s.is_sped_up())
            .zip(&silences)
        {
            let span = silence.span().unwrap();
            let expected = (span - 2.0 * params.delay) / params.factor;
            assert!((segment.output_duration(100.0, params.factor) - expected).abs() < 1e-9);
        }

        // (3 - 0.75) + (9 - 2.25)
        assert!((synthesis.time_saved() - 9.0).abs() < 1e-9);
        assert!((synthesis.output_duration(100.0) - 91.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_silences_is_pass_through() {
        let params = FilterGraphParams::default();
        let synthesis = build(&[], &params);

        assert_eq!(synthesis.segments, vec![Segment::tail(0.0)]);
        assert_eq!(
            synthesis.instructions,
            vec![Instruction::RegularSegment {
                index: 1,
                start: 0.0,
                end: None,
                video_out: Port::named("vn"),
                audio_out: Port::named("an"),
            }]
        );
        assert_eq!(synthesis.time_saved(), 0.0);
    }

    #[test]
    fn test_rejects_delay_too_long() {
        let params = FilterGraphParams::new(2.0).with_delay(1.5);
        let (v, a) = outputs();
        let err = synthesize(&[SilenceInterval::closed(10.0, 12.0)], &params, v, a).unwrap_err();
        assert!(matches!(err, GraphError::InvalidParameters(_)));
    }

    #[test]
    fn test_rejects_non_positive_factor() {
        let params = FilterGraphParams::new(0.0);
        let (v, a) = outputs();
        let err = synthesize(&[], &params, v, a).unwrap_err();
        assert!(matches!(err, GraphError::InvalidParameters(_)));
    }

    #[test]
    fn test_rejects_out_of_order_intervals() {
        let params = FilterGraphParams::new(2.0);
        let silences = vec![
            SilenceInterval::closed(20.0, 24.0),
            SilenceInterval::closed(10.0, 14.0),
        ];
        let (v, a) = outputs();
        let err = synthesize(&silences, &params, v, a).unwrap_err();
        assert!(matches!(err, GraphError::MalformedIntervals { index: 1, .. }));
    }

    #[test]
    fn test_touching_intervals_need_a_delay() {
        let silences = vec![
            SilenceInterval::closed(10.0, 14.0),
            SilenceInterval::closed(14.0, 18.0),
        ];

        let (v, a) = outputs();
        let err = synthesize(&silences, &FilterGraphParams::new(2.0).with_delay(0.0), v, a)
            .unwrap_err();
        assert!(matches!(err, GraphError::MalformedIntervals { index: 1, .. }));

        let synthesis = build(&silences, &FilterGraphParams::new(2.0).with_delay(0.25));
        assert_eq!(synthesis.segments.len(), 5);
        let middle = &synthesis.segments[2];
        assert!(!middle.is_sped_up());
        assert!((middle.end.unwrap() - middle.start - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_inverted_and_open_intervals() {
        let params = FilterGraphParams::new(2.0);
        let (v, a) = outputs();
        let err = synthesize(&[SilenceInterval::closed(14.0, 10.0)], &params, v, a).unwrap_err();
        assert!(matches!(err, GraphError::MalformedIntervals { index: 0, .. }));

        let (v, a) = outputs();
        let err = synthesize(&[SilenceInterval::open(14.0)], &params, v, a).unwrap_err();
        assert!(matches!(err, GraphError::MalformedIntervals { index: 0, .. }));
    }

    #[test]
    fn test_hasten_modes() {
        let silences = [SilenceInterval::closed(10.0, 14.0)];

        let tempo = build(&silences, &FilterGraphParams::new(8.0));
        assert!(matches!(
            &tempo.instructions[1],
            Instruction::SpedUpSegment { audio: AudioHasten::Tempo { stages }, volume: None, .. }
                if stages == &vec![2.0, 2.0, 2.0]
        ));

        let pitch = build(
            &silences,
            &FilterGraphParams::new(2.0)
                .with_hasten(HastenMode::Pitch)
                .with_sample_rate(48_000)
                .with_silent_volume(0.5),
        );
        assert!(matches!(
            &pitch.instructions[1],
            Instruction::SpedUpSegment {
                audio: AudioHasten::Pitch { rate: 96_000, resample_to: 48_000 },
                volume: None,
                ..
            }
        ));

        let trunc = build(
            &silences,
            &FilterGraphParams::new(2.0)
                .with_hasten(HastenMode::Truncate)
                .with_silent_volume(0.5),
        );
        match &trunc.instructions[1] {
            Instruction::SpedUpSegment {
                audio: AudioHasten::Truncate { end },
                volume,
                ..
            } => {
                assert!((end - 12.0).abs() < 1e-9);
                assert_eq!(*volume, Some(0.5));
            }
            other => panic!("expected truncated segment, got {:?}", other),
        }
    }
}
