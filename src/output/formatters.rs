//! Pure format renderers for TXT, JSON, SRT, and VTT.
//!
//! Each renderer maps the same segment sequence independently, so outputs
//! for one run are mutually consistent. Timestamps clamp negative values
//! to zero; values past 99 hours are a reported error rather than a
//! silent wraparound (SRT/VTT hour fields are two digits).

use serde::Serialize;

use crate::transcribe::{Metadata, Segment};
use crate::{Error, Result};

/// Format segments as plain text, one `[start - end]: text` line each.
pub fn format_txt(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| format!("[{:.2} - {:.2}]: {}", s.start, s.end, s.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    transcript: &'a [Segment],
    metadata: &'a Metadata,
}

/// Format segments and metadata as pretty-printed JSON.
pub fn format_json(segments: &[Segment], metadata: &Metadata) -> Result<String> {
    let output = JsonOutput {
        transcript: segments,
        metadata,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format segments as SRT subtitle blocks.
pub fn format_srt(segments: &[Segment]) -> Result<String> {
    let blocks: Result<Vec<String>> = segments
        .iter()
        .map(|s| {
            Ok(format!(
                "{}\n{} --> {}\n{}",
                s.id,
                srt_timestamp(s.start)?,
                srt_timestamp(s.end)?,
                s.text.trim()
            ))
        })
        .collect();

    Ok(blocks?.join("\n\n"))
}

/// Format segments and metadata as WebVTT.
///
/// Emits the `WEBVTT` header, a `NOTE` block with the title when one is
/// present, and unindexed cues.
pub fn format_vtt(segments: &[Segment], metadata: &Metadata) -> Result<String> {
    let mut parts = vec!["WEBVTT".to_string()];

    if !metadata.title.is_empty() {
        parts.push(format!("NOTE Title\n{}", metadata.title));
    }

    for segment in segments {
        parts.push(format!(
            "{} --> {}\n{}",
            vtt_timestamp(segment.start)?,
            vtt_timestamp(segment.end)?,
            segment.text.trim()
        ));
    }

    Ok(parts.join("\n\n"))
}

/// Format seconds as an SRT timestamp (`HH:MM:SS,mmm`).
pub fn srt_timestamp(seconds: f64) -> Result<String> {
    let (hours, minutes, secs, millis) = timestamp_parts(seconds)?;
    Ok(format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis))
}

/// Format seconds as a VTT timestamp (`HH:MM:SS.mmm`).
pub fn vtt_timestamp(seconds: f64) -> Result<String> {
    let (hours, minutes, secs, millis) = timestamp_parts(seconds)?;
    Ok(format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis))
}

/// Split seconds into (hours, minutes, seconds, milliseconds).
///
/// Negative inputs clamp to zero. Hours must fit the two-digit subtitle
/// field, so anything at or past 100 hours is an error.
fn timestamp_parts(seconds: f64) -> Result<(u64, u64, u64, u64)> {
    let clamped = seconds.max(0.0);

    let total_seconds = clamped.floor() as u64;
    let hours = total_seconds / 3600;
    if hours > 99 {
        return Err(Error::TimestampOverflow(seconds));
    }

    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    // Clamp to 999 so rounding never spills into the next second
    let millis = ((clamped.fract() * 1000.0).round() as u64).min(999);

    Ok((hours, minutes, secs, millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn sample_segments() -> Vec<Segment> {
        vec![
            Segment::new(1, 0.0, 5.2, "Welcome."),
            Segment::new(2, 5.2, 10.5, "Today."),
            Segment::new(3, 10.5, 12.0, "Bye."),
        ]
    }

    fn sample_metadata() -> Metadata {
        Metadata {
            title: "Test Video".to_string(),
            source: "video.mp4".to_string(),
            duration: Some(12.0),
            model: "tiny".to_string(),
            language: Some("en".to_string()),
        }
    }

    proptest! {
        #[test]
        fn prop_srt_timestamp_fields_in_range(seconds in 0.0f64..356_400.0) {
            let result = srt_timestamp(seconds).unwrap();
            let (time, millis) = result.split_once(',').unwrap();
            let parts: Vec<u64> = time.split(':').map(|p| p.parse().unwrap()).collect();
            prop_assert_eq!(parts.len(), 3);
            prop_assert!(parts[0] <= 99);
            prop_assert!(parts[1] < 60);
            prop_assert!(parts[2] < 60);
            prop_assert_eq!(millis.len(), 3);
            prop_assert!(millis.parse::<u64>().unwrap() < 1000);
        }

        #[test]
        fn prop_vtt_uses_dot_not_comma(seconds in 0.0f64..356_400.0) {
            let result = vtt_timestamp(seconds).unwrap();
            prop_assert!(result.contains('.'));
            prop_assert!(!result.contains(','));
        }

        #[test]
        fn prop_renderers_produce_one_unit_per_segment(count in 0usize..20) {
            let segments: Vec<Segment> = (0..count)
                .map(|i| Segment::new(i + 1, i as f64, i as f64 + 1.0, format!("seg {}", i)))
                .collect();

            let txt = format_txt(&segments);
            let lines = if txt.is_empty() { 0 } else { txt.lines().count() };
            prop_assert_eq!(lines, count);

            let srt = format_srt(&segments).unwrap();
            prop_assert_eq!(srt.matches(" --> ").count(), count);

            let vtt = format_vtt(&segments, &sample_metadata()).unwrap();
            prop_assert_eq!(vtt.matches(" --> ").count(), count);
        }

        #[test]
        fn prop_rendering_is_idempotent(start in 0.0f64..1000.0, len in 0.0f64..30.0) {
            let segments = vec![Segment::new(1, start, start + len, "repeatable")];
            prop_assert_eq!(format_srt(&segments).unwrap(), format_srt(&segments).unwrap());
            prop_assert_eq!(format_txt(&segments), format_txt(&segments));
        }
    }

    #[test]
    fn test_txt_lines() {
        let txt = format_txt(&sample_segments());
        assert_eq!(
            txt,
            "[0.00 - 5.20]: Welcome.\n[5.20 - 10.50]: Today.\n[10.50 - 12.00]: Bye."
        );
    }

    #[test]
    fn test_txt_empty() {
        assert_eq!(format_txt(&[]), "");
    }

    #[test]
    fn test_srt_scenario_from_video() {
        let srt = format_srt(&sample_segments()).unwrap();
        assert!(srt.starts_with(
            "1\n00:00:00,000 --> 00:00:05,200\nWelcome.\n\n2\n00:00:05,200 --> 00:00:10,500\nToday."
        ));
        assert!(srt.ends_with("3\n00:00:10,500 --> 00:00:12,000\nBye."));
    }

    #[test]
    fn test_srt_empty() {
        assert_eq!(format_srt(&[]).unwrap(), "");
    }

    #[test]
    fn test_srt_round_trip() {
        let srt = format_srt(&sample_segments()).unwrap();

        // Parse the blocks back out and compare to the inputs
        for (block, original) in srt.split("\n\n").zip(sample_segments()) {
            let mut lines = block.lines();
            let id: usize = lines.next().unwrap().parse().unwrap();
            let times = lines.next().unwrap();
            let text = lines.next().unwrap();

            let (start_str, end_str) = times.split_once(" --> ").unwrap();
            let parse = |s: &str| -> f64 {
                let (hms, ms) = s.split_once(',').unwrap();
                let parts: Vec<f64> = hms.split(':').map(|p| p.parse().unwrap()).collect();
                parts[0] * 3600.0 + parts[1] * 60.0 + parts[2] + ms.parse::<f64>().unwrap() / 1000.0
            };

            assert_eq!(id, original.id);
            assert!((parse(start_str) - original.start).abs() < 0.001);
            assert!((parse(end_str) - original.end).abs() < 0.001);
            assert_eq!(text, original.text);
        }
    }

    #[test]
    fn test_vtt_structure() {
        let vtt = format_vtt(&sample_segments(), &sample_metadata()).unwrap();
        assert!(vtt.starts_with("WEBVTT\n\nNOTE Title\nTest Video\n\n"));
        assert!(vtt.contains("00:00:00.000 --> 00:00:05.200\nWelcome."));
        assert!(vtt.contains("00:00:10.500 --> 00:00:12.000\nBye."));
    }

    #[test]
    fn test_vtt_empty_segments_keeps_header() {
        let vtt = format_vtt(&[], &sample_metadata()).unwrap();
        assert_eq!(vtt, "WEBVTT\n\nNOTE Title\nTest Video");
    }

    #[test]
    fn test_vtt_without_title_skips_note() {
        let mut metadata = sample_metadata();
        metadata.title = String::new();
        let vtt = format_vtt(&[], &metadata).unwrap();
        assert_eq!(vtt, "WEBVTT");
    }

    #[test]
    fn test_json_shape() {
        let json = format_json(&sample_segments(), &sample_metadata()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        let transcript = parsed["transcript"].as_array().unwrap();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[0]["id"], 1);
        assert_eq!(transcript[0]["start"], 0.0);
        assert_eq!(transcript[0]["end"], 5.2);
        assert_eq!(transcript[0]["text"], "Welcome.");

        let metadata = &parsed["metadata"];
        assert_eq!(metadata["title"], "Test Video");
        assert_eq!(metadata["source"], "video.mp4");
        assert_eq!(metadata["duration"], 12.0);
        assert_eq!(metadata["model"], "tiny");
        assert_eq!(metadata["language"], "en");
    }

    #[test]
    fn test_json_null_optionals() {
        let mut metadata = sample_metadata();
        metadata.duration = None;
        metadata.language = None;

        let json = format_json(&[], &metadata).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(parsed["transcript"].as_array().unwrap().is_empty());
        assert!(parsed["metadata"]["duration"].is_null());
        assert!(parsed["metadata"]["language"].is_null());
    }

    #[test]
    fn test_timestamp_zero_and_rounding() {
        assert_eq!(srt_timestamp(0.0).unwrap(), "00:00:00,000");
        assert_eq!(srt_timestamp(65.5).unwrap(), "00:01:05,500");
        assert_eq!(srt_timestamp(3661.123).unwrap(), "01:01:01,123");
        assert_eq!(srt_timestamp(59.9999).unwrap(), "00:00:59,999");
        assert_eq!(vtt_timestamp(3599.999).unwrap(), "00:59:59.999");
    }

    #[test]
    fn test_timestamp_clamps_negative() {
        assert_eq!(srt_timestamp(-5.0).unwrap(), "00:00:00,000");
        assert_eq!(vtt_timestamp(-0.001).unwrap(), "00:00:00.000");
    }

    #[test]
    fn test_timestamp_overflow_past_99_hours() {
        // 99:59:59.999 is the last representable instant
        assert!(srt_timestamp(359_999.999).is_ok());
        assert!(matches!(
            srt_timestamp(360_000.0),
            Err(Error::TimestampOverflow(_))
        ));
        assert!(matches!(
            vtt_timestamp(1_000_000.0),
            Err(Error::TimestampOverflow(_))
        ));
    }

    #[test]
    fn test_unicode_passes_through() {
        let segments = vec![Segment::new(1, 0.0, 3.0, "Café résumé 中文 🎵")];
        assert!(format_txt(&segments).contains("Café résumé 中文 🎵"));
        assert!(format_srt(&segments).unwrap().contains("Café résumé 中文 🎵"));
    }
}
