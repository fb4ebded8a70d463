// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//! Playback shows up as `Playback` duration spans (one per play/pause
//! stretch), everything else as instant events.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use morph_core::time::HostTime;

use crate::recorder::{RecordedEvent, decode};

const PLAYBACK: &str = "Playback";

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Host times are already in microseconds, the unit the format expects.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut playing = false;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Capture(e) => {
                let r = e.bounding_box;
                events.push(instant(
                    "Capture",
                    "Probe",
                    e.at,
                    json!({
                        "endpoint": format!("{:?}", e.endpoint),
                        "x": r.x0,
                        "y": r.y0,
                        "width": r.width(),
                        "height": r.height(),
                        "opacity": e.opacity,
                    }),
                ));
            }
            RecordedEvent::Compare(e) => {
                events.push(instant(
                    "Compare",
                    "Probe",
                    e.at,
                    json!({ "order": format!("{:?}", e.order) }),
                ));
            }
            RecordedEvent::Play(e) => {
                playing = true;
                events.push(json!({
                    "ph": "B",
                    "name": PLAYBACK,
                    "cat": "Player",
                    "ts": e.at.micros(),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "remaining_ms": e.remaining.as_millis_f64(),
                        "strategy": format!("{:?}", e.strategy),
                    }
                }));
            }
            RecordedEvent::Pause(e) => {
                playing = false;
                events.push(end(e.at, json!({ "remaining_ms": e.remaining.as_millis_f64() })));
            }
            RecordedEvent::Frame(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": "Opacity",
                    "cat": "Frame",
                    "ts": e.at.micros(),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "from": e.opacity_from,
                        "to": e.opacity_to,
                    }
                }));
            }
            RecordedEvent::Complete(e) => {
                if playing {
                    playing = false;
                    events.push(end(e.at, json!({ "completed": true })));
                }
                events.push(instant("Complete", "Player", e.at, json!({})));
            }
            RecordedEvent::Teardown(e) => {
                if playing {
                    playing = false;
                    events.push(end(e.at, json!({ "completed": false })));
                }
                events.push(instant("Teardown", "Player", e.at, json!({})));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn instant(name: &str, cat: &str, at: HostTime, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": cat,
        "ts": at.micros(),
        "pid": 0,
        "tid": 0,
        "s": "t",
        "args": args,
    })
}

fn end(at: HostTime, args: Value) -> Value {
    json!({
        "ph": "E",
        "name": PLAYBACK,
        "cat": "Player",
        "ts": at.micros(),
        "pid": 0,
        "tid": 0,
        "args": args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use morph_core::player::Strategy;
    use morph_core::time::Duration;
    use morph_core::trace::{CompleteEvent, PauseEvent, PlayEvent, TeardownEvent, TraceSink};

    fn play(rec: &mut RecorderSink, at: u64) {
        rec.on_play(&PlayEvent {
            at: HostTime(at),
            remaining: Duration::from_millis(400),
            strategy: Strategy::Keyframes,
        });
    }

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        play(&mut rec, 1_000);
        rec.on_pause(&PauseEvent {
            at: HostTime(101_000),
            remaining: Duration::from_millis(300),
        });
        play(&mut rec, 200_000);
        rec.on_complete(&CompleteEvent {
            at: HostTime(500_000),
        });
        rec.on_teardown(&TeardownEvent {
            at: HostTime(500_000),
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        let phases: Vec<&str> = parsed.iter().map(|e| e["ph"].as_str().unwrap()).collect();
        assert_eq!(phases, ["B", "E", "B", "E", "i", "i"], "got: {json_str}");
        assert_eq!(parsed[0]["name"], "Playback");
        assert_eq!(parsed[0]["ts"], 1_000);
        assert_eq!(parsed[0]["args"]["strategy"], "Keyframes");
        assert_eq!(parsed[3]["args"]["completed"], true);
        assert_eq!(parsed[4]["name"], "Complete");
        assert_eq!(parsed[5]["name"], "Teardown");
    }

    #[test]
    fn teardown_closes_an_open_span() {
        let mut rec = RecorderSink::new();
        play(&mut rec, 0);
        rec.on_teardown(&TeardownEvent {
            at: HostTime(50_000),
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1]["ph"], "E");
        assert_eq!(parsed[1]["args"]["completed"], false);
        assert_eq!(parsed[2]["name"], "Teardown");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
