//! Serialization of instructions to `-filter_complex_script` text.

use super::instruction::{AudioHasten, Instruction, Port};
use crate::filters;

/// Render one instruction as filter chains, each with its port labels.
pub fn render_chains(instruction: &Instruction) -> Vec<String> {
    match instruction {
        Instruction::RegularSegment {
            start,
            end,
            video_out,
            audio_out,
            ..
        } => vec![
            format!(
                "{}{},{}{}",
                Port::InputVideo,
                filters::trim(*start, *end),
                filters::RESET_PTS,
                video_out
            ),
            format!(
                "{}{},{}{}",
                Port::InputAudio,
                filters::atrim(*start, *end),
                filters::RESET_AUDIO_PTS,
                audio_out
            ),
        ],

        Instruction::SpedUpSegment {
            start,
            end,
            factor,
            audio,
            volume,
            video_out,
            audio_out,
            ..
        } => {
            let video = format!(
                "{}{},{}{}",
                Port::InputVideo,
                filters::trim(*start, Some(*end)),
                filters::compress_pts(*factor),
                video_out
            );

            let mut audio_filters = Vec::with_capacity(5);
            match audio {
                AudioHasten::Tempo { stages } => {
                    audio_filters.push(filters::atrim(*start, Some(*end)));
                    audio_filters.push(filters::RESET_AUDIO_PTS.to_string());
                    audio_filters.push(filters::atempo_chain(stages));
                }
                AudioHasten::Pitch { rate, resample_to } => {
                    audio_filters.push(filters::atrim(*start, Some(*end)));
                    audio_filters.push(filters::RESET_AUDIO_PTS.to_string());
                    audio_filters.push(filters::asetrate(*rate));
                    audio_filters.push(filters::aresample(*resample_to));
                    audio_filters.push(filters::MUTE.to_string());
                }
                AudioHasten::Truncate { end: truncated_end } => {
                    audio_filters.push(filters::atrim(*start, Some(*truncated_end)));
                    audio_filters.push(filters::RESET_AUDIO_PTS.to_string());
                }
            }
            if let Some(multiplier) = volume {
                audio_filters.push(filters::volume(*multiplier));
            }

            let audio = format!(
                "{}{}{}",
                Port::InputAudio,
                audio_filters.join(","),
                audio_out
            );

            vec![video, audio]
        }

        Instruction::Concatenate {
            inputs,
            video_out,
            audio_out,
        } => {
            let labels: String = inputs
                .iter()
                .map(|(video, audio)| format!("{}{}", video, audio))
                .collect();
            vec![format!(
                "{}{}{}{}",
                labels,
                filters::concat(inputs.len()),
                video_out,
                audio_out
            )]
        }

        Instruction::Scale {
            input,
            scaled,
            output,
            resolution,
        } => vec![
            format!("{}{}{}", input, filters::scale_to_fit(*resolution), scaled),
            format!("{}{}{}", scaled, filters::pad_centered(*resolution), output),
        ],

        Instruction::PanGain {
            input,
            output,
            pan,
            gain_db,
        } => {
            let mut audio_filters: Vec<String> = Vec::with_capacity(2);
            if let Some(pan) = filters::pan(*pan) {
                audio_filters.push(pan.to_string());
            }
            if *gain_db != 0.0 || audio_filters.is_empty() {
                audio_filters.push(filters::volume_db(*gain_db));
            }
            vec![format!("{}{}{}", input, audio_filters.join(","), output)]
        }
    }
}

/// Render instructions as a script: one chain per line, `;` between chains.
pub fn write_script(instructions: &[Instruction]) -> String {
    instructions
        .iter()
        .flat_map(render_chains)
        .collect::<Vec<_>>()
        .join(";\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrub_models::{PanMode, Resolution};

    #[test]
    fn test_regular_segment_chains() {
        let chains = render_chains(&Instruction::RegularSegment {
            index: 1,
            start: 0.0,
            end: Some(10.25),
            video_out: Port::segment_video(1),
            audio_out: Port::segment_audio(1),
        });
        assert_eq!(
            chains,
            vec![
                "[0:v]trim=0.0000:10.2500,setpts=PTS-STARTPTS[v1]",
                "[0:a]atrim=0.0000:10.2500,asetpts=PTS-STARTPTS[a1]",
            ]
        );
    }

    #[test]
    fn test_final_segment_is_open() {
        let chains = render_chains(&Instruction::RegularSegment {
            index: 3,
            start: 13.75,
            end: None,
            video_out: Port::segment_video(3),
            audio_out: Port::segment_audio(3),
        });
        assert_eq!(chains[0], "[0:v]trim=start=13.7500,setpts=PTS-STARTPTS[v3]");
        assert_eq!(chains[1], "[0:a]atrim=start=13.7500,asetpts=PTS-STARTPTS[a3]");
    }

    fn sped_up(audio: AudioHasten, volume: Option<f64>) -> Instruction {
        Instruction::SpedUpSegment {
            index: 2,
            start: 10.25,
            end: 13.75,
            factor: 2.0,
            audio,
            volume,
            video_out: Port::segment_video(2),
            audio_out: Port::segment_audio(2),
        }
    }

    #[test]
    fn test_sped_up_tempo() {
        let chains = render_chains(&sped_up(AudioHasten::Tempo { stages: vec![2.0] }, None));
        assert_eq!(
            chains,
            vec![
                "[0:v]trim=10.2500:13.7500,setpts=(PTS-STARTPTS)/2.0[v2]",
                "[0:a]atrim=10.2500:13.7500,asetpts=PTS-STARTPTS,atempo=2.0[a2]",
            ]
        );
    }

    #[test]
    fn test_sped_up_pitch() {
        let chains = render_chains(&sped_up(
            AudioHasten::Pitch {
                rate: 88_200,
                resample_to: 44_100,
            },
            None,
        ));
        assert_eq!(
            chains[1],
            "[0:a]atrim=10.2500:13.7500,asetpts=PTS-STARTPTS,asetrate=88200,aresample=44100,volume=0.0[a2]"
        );
    }

    #[test]
    fn test_sped_up_truncate_with_volume() {
        let chains = render_chains(&sped_up(AudioHasten::Truncate { end: 12.0 }, Some(0.25)));
        assert_eq!(
            chains[1],
            "[0:a]atrim=10.2500:12.0000,asetpts=PTS-STARTPTS,volume=0.25[a2]"
        );
    }

    #[test]
    fn test_concatenate() {
        let chains = render_chains(&Instruction::Concatenate {
            inputs: (1..=3)
                .map(|i| (Port::segment_video(i), Port::segment_audio(i)))
                .collect(),
            video_out: Port::named("vn"),
            audio_out: Port::named("an"),
        });
        assert_eq!(
            chains,
            vec!["[v1][a1][v2][a2][v3][a3]concat=n=3:v=1:a=1[vn][an]"]
        );
    }

    #[test]
    fn test_scale() {
        let chains = render_chains(&Instruction::Scale {
            input: Port::named("vn"),
            scaled: Port::named("scaled"),
            output: Port::named("v"),
            resolution: Resolution::FULL_HD,
        });
        assert_eq!(
            chains,
            vec![
                "[vn]scale=w=1920:h=1080:force_original_aspect_ratio=decrease[scaled]",
                "[scaled]pad=1920:1080:(ow-iw)/2:(oh-ih)/2[v]",
            ]
        );
    }

    #[test]
    fn test_pan_gain_variants() {
        let render = |pan, gain_db| {
            render_chains(&Instruction::PanGain {
                input: Port::named("an"),
                output: Port::named("a"),
                pan,
                gain_db,
            })
            .remove(0)
        };
        assert_eq!(
            render(PanMode::Left, 3.0),
            "[an]pan=stereo|c0=c0|c1=c0,volume=3.0dB[a]"
        );
        assert_eq!(render(PanMode::Right, 0.0), "[an]pan=stereo|c0=c1|c1=c1[a]");
        assert_eq!(render(PanMode::None, -2.5), "[an]volume=-2.5dB[a]");
    }

    #[test]
    fn test_script_layout() {
        let script = write_script(&[
            Instruction::RegularSegment {
                index: 1,
                start: 0.0,
                end: None,
                video_out: Port::named("v"),
                audio_out: Port::named("a"),
            },
        ]);
        assert_eq!(
            script,
            "[0:v]trim=start=0.0000,setpts=PTS-STARTPTS[v];\n[0:a]atrim=start=0.0000,asetpts=PTS-STARTPTS[a]"
        );
        assert!(!script.ends_with(';'));
    }
}
