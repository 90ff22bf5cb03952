//! Human readable summaries for the `info` subcommand

use anyhow::Result;
use cwburst_core::envelope::edge_samples;
use cwburst_engine::EngineConfig;
use cwburst_keying::code::lookup;
use cwburst_keying::timing::cpm_to_wpm;
use std::fmt::Write;

fn ms(samples: usize, sample_rate: u32) -> f64 {
    samples as f64 * 1000.0 / sample_rate as f64
}

/// Describe the element timing `config` produces
pub fn timing_report(config: &EngineConfig) -> Result<String> {
    let keying = config.keying();
    let sr = config.sample_rate;
    let timing = keying.timing(sr, edge_samples(sr, config.tuning.rise_fall_ms))?;

    let mut out = String::new();
    writeln!(out, "Device:          {}", config.device)?;
    writeln!(out, "Sample rate:     {} Hz", sr)?;
    writeln!(
        out,
        "Speed:           {} CpM ({} WPM)",
        keying.code_speed,
        cpm_to_wpm(keying.code_speed)
    )?;
    if timing.farnsworth {
        writeln!(
            out,
            "Farnsworth:      characters at {} CpM ({} WPM)",
            timing.char_speed,
            cpm_to_wpm(timing.char_speed)
        )?;
    } else {
        writeln!(out, "Farnsworth:      off")?;
    }
    writeln!(out, "Waveform:        {}", config.tuning.waveform)?;
    if config.tuning.constant_tone {
        writeln!(out, "Pitch:           {} Hz", config.tuning.tone_frequency)?;
    } else {
        writeln!(out, "Pitch:           random, {}..{} Hz", sr / 90, sr / 50)?;
    }
    writeln!(
        out,
        "Rise/fall:       {:.1} ms ({} samples)",
        config.tuning.rise_fall_ms, timing.edge
    )?;
    writeln!(out, "Dot:             {:.1} ms ({} samples)", ms(timing.dot, sr), timing.dot)?;
    writeln!(out, "Dash:            {:.1} ms ({} samples)", ms(timing.dash, sr), timing.dash)?;
    writeln!(
        out,
        "Element gap:     {:.1} ms ({} samples)",
        ms(timing.element_gap(), sr),
        timing.element_gap()
    )?;
    writeln!(
        out,
        "Character gap:   {:.1} ms ({} samples after the last element gap)",
        ms(timing.char_gap, sr),
        timing.char_gap
    )?;
    writeln!(out, "Buffer limit:    {} s", config.max_buffer_seconds)?;
    Ok(out)
}

/// Table of every character with a code
pub fn code_chart() -> String {
    let mut out = String::new();
    let chars = ('A'..='Z').chain('0'..='9').chain(['/', '+']);
    for (i, ch) in chars.filter_map(|c| lookup(c).map(|code| (c, code))).enumerate() {
        let _ = write!(out, "{}  {:<7}", ch.0, ch.1.pattern());
        out.push(if i % 6 == 5 { '\n' } else { ' ' });
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_report_standard() {
        let report = timing_report(&EngineConfig::default()).unwrap();
        assert!(report.contains("200 CpM (40 WPM)"));
        assert!(report.contains("Farnsworth:      off"));
        assert!(report.contains("Dot:             30.0 ms (1323 samples)"));
        // Tone is lengthened by the 88-sample edge, the gap shortened by it
        assert!(report.contains("Element gap:     28.0 ms (1235 samples)"));
        assert!(report.contains("Character gap:   60.0 ms (2646 samples"));
    }

    #[test]
    fn test_timing_report_farnsworth() {
        let config = EngineConfig {
            code_speed: 100,
            min_char_speed: 250,
            ..EngineConfig::default()
        };
        let report = timing_report(&config).unwrap();
        assert!(report.contains("characters at 250 CpM (50 WPM)"));
        // 3 * (44100 * 6 / 100) - 44100 * 6 / 250
        assert!(report.contains("(6880 samples after the last element gap)"));
    }

    #[test]
    fn test_code_chart() {
        let chart = code_chart();
        assert!(chart.contains("S  ...    "));
        assert!(chart.contains("+  .-.-.  "));
        assert_eq!(chart.lines().count(), 7);
    }
}
