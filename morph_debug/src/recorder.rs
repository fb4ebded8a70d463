// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use kurbo::Rect;
use morph_core::player::Strategy;
use morph_core::stacking::StackingOrder;
use morph_core::time::{Duration, HostTime};
use morph_core::trace::{
    CaptureEvent, CompareEvent, CompleteEvent, Endpoint, FrameEvent, PauseEvent, PlayEvent,
    TeardownEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_CAPTURE: u8 = 1;
const TAG_COMPARE: u8 = 2;
const TAG_PLAY: u8 = 3;
const TAG_PAUSE: u8 = 4;
const TAG_FRAME: u8 = 5;
const TAG_COMPLETE: u8 = 6;
const TAG_TEARDOWN: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_time(&mut self, t: HostTime) {
        self.write_u64(t.micros());
    }

    fn write_duration(&mut self, d: Duration) {
        self.write_u64(d.micros());
    }
}

impl TraceSink for RecorderSink {
    fn on_capture(&mut self, e: &CaptureEvent) {
        self.write_u8(TAG_CAPTURE);
        self.write_time(e.at);
        self.write_u8(match e.endpoint {
            Endpoint::From => 0,
            Endpoint::To => 1,
        });
        let r = e.bounding_box;
        for v in [r.x0, r.y0, r.x1, r.y1, e.opacity] {
            self.write_f64(v);
        }
    }

    fn on_compare(&mut self, e: &CompareEvent) {
        self.write_u8(TAG_COMPARE);
        self.write_time(e.at);
        self.write_u8(match e.order {
            StackingOrder::Above => 0,
            StackingOrder::Below => 1,
        });
    }

    fn on_play(&mut self, e: &PlayEvent) {
        self.write_u8(TAG_PLAY);
        self.write_time(e.at);
        self.write_duration(e.remaining);
        self.write_u8(match e.strategy {
            Strategy::Keyframes => 0,
            Strategy::Timer => 1,
        });
    }

    fn on_pause(&mut self, e: &PauseEvent) {
        self.write_u8(TAG_PAUSE);
        self.write_time(e.at);
        self.write_duration(e.remaining);
    }

    fn on_frame(&mut self, e: &FrameEvent) {
        self.write_u8(TAG_FRAME);
        self.write_time(e.at);
        self.write_f64(e.t);
        self.write_f64(e.opacity_from);
        self.write_f64(e.opacity_to);
    }

    fn on_complete(&mut self, e: &CompleteEvent) {
        self.write_u8(TAG_COMPLETE);
        self.write_time(e.at);
    }

    fn on_teardown(&mut self, e: &TeardownEvent) {
        self.write_u8(TAG_TEARDOWN);
        self.write_time(e.at);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`CaptureEvent`].
    Capture(CaptureEvent),
    /// A [`CompareEvent`].
    Compare(CompareEvent),
    /// A [`PlayEvent`].
    Play(PlayEvent),
    /// A [`PauseEvent`].
    Pause(PauseEvent),
    /// A [`FrameEvent`].
    Frame(FrameEvent),
    /// A [`CompleteEvent`].
    Complete(CompleteEvent),
    /// A [`TeardownEvent`].
    Teardown(TeardownEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events. Stops at the first unknown tag or
/// truncated record.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.take().map(f64::from_le_bytes)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_duration(&mut self) -> Option<Duration> {
        self.read_u64().map(Duration)
    }

    fn decode_capture(&mut self) -> Option<RecordedEvent> {
        let at = self.read_time()?;
        let endpoint = match self.read_u8()? {
            0 => Endpoint::From,
            _ => Endpoint::To,
        };
        let (x0, y0) = (self.read_f64()?, self.read_f64()?);
        let (x1, y1) = (self.read_f64()?, self.read_f64()?);
        Some(RecordedEvent::Capture(CaptureEvent {
            at,
            endpoint,
            bounding_box: Rect::new(x0, y0, x1, y1),
            opacity: self.read_f64()?,
        }))
    }

    fn decode_compare(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Compare(CompareEvent {
            at: self.read_time()?,
            order: match self.read_u8()? {
                0 => StackingOrder::Above,
                _ => StackingOrder::Below,
            },
        }))
    }

    fn decode_play(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Play(PlayEvent {
            at: self.read_time()?,
            remaining: self.read_duration()?,
            strategy: match self.read_u8()? {
                0 => Strategy::Keyframes,
                _ => Strategy::Timer,
            },
        }))
    }

    fn decode_pause(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Pause(PauseEvent {
            at: self.read_time()?,
            remaining: self.read_duration()?,
        }))
    }

    fn decode_frame(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Frame(FrameEvent {
            at: self.read_time()?,
            t: self.read_f64()?,
            opacity_from: self.read_f64()?,
            opacity_to: self.read_f64()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_CAPTURE => self.decode_capture(),
            TAG_COMPARE => self.decode_compare(),
            TAG_PLAY => self.decode_play(),
            TAG_PAUSE => self.decode_pause(),
            TAG_FRAME => self.decode_frame(),
            TAG_COMPLETE => Some(RecordedEvent::Complete(CompleteEvent {
                at: self.read_time()?,
            })),
            TAG_TEARDOWN => Some(RecordedEvent::Teardown(TeardownEvent {
                at: self.read_time()?,
            })),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use morph_core::document::Document;
    use morph_core::transition::{TransitionOptions, transition};

    use super::*;

    #[test]
    fn capture_keeps_geometry() {
        let mut rec = RecorderSink::new();
        rec.on_capture(&CaptureEvent {
            at: HostTime(42),
            endpoint: Endpoint::To,
            bounding_box: Rect::new(1.5, 2.0, 101.5, 52.0),
            opacity: 0.25,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 1);
        match &events[0] {
            RecordedEvent::Capture(e) => {
                assert_eq!(e.at, HostTime(42));
                assert_eq!(e.endpoint, Endpoint::To);
                assert_eq!(e.bounding_box, Rect::new(1.5, 2.0, 101.5, 52.0));
                assert_eq!(e.opacity, 0.25);
            }
            other => panic!("expected Capture, got {other:?}"),
        }
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_complete(&CompleteEvent { at: HostTime(1) });
        rec.on_pause(&PauseEvent {
            at: HostTime(2),
            remaining: Duration::from_millis(3),
        });
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 1, "the cut pause record is dropped");
        assert!(matches!(events[0], RecordedEvent::Complete(_)));
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }

    #[test]
    fn records_a_whole_transition() {
        let mut doc = Document::new();
        let body = doc.body();
        let from = doc.create_element("div");
        let to = doc.create_element("div");
        for (node, left) in [(from, "0px"), (to, "200px")] {
            doc.set_styles(
                node,
                &[
                    ("position", "absolute"),
                    ("left", left),
                    ("width", "100px"),
                    ("height", "100px"),
                ],
            );
            doc.append(body, node);
        }

        let recorder = Rc::new(RefCell::new(RecorderSink::new()));
        let options = TransitionOptions::default()
            .with_duration(Duration::from_millis(100))
            .with_timer(true)
            .with_sink(Rc::clone(&recorder));
        let mut player = transition(&mut doc, &from, &to, options).unwrap();
        doc.advance(Duration::from_millis(100));
        player.tick(&mut doc);

        let events: Vec<_> = decode(recorder.borrow().as_bytes()).collect();
        let kinds: Vec<&str> = events
            .iter()
            .map(|e| match e {
                RecordedEvent::Capture(_) => "capture",
                RecordedEvent::Compare(_) => "compare",
                RecordedEvent::Play(_) => "play",
                RecordedEvent::Pause(_) => "pause",
                RecordedEvent::Frame(_) => "frame",
                RecordedEvent::Complete(_) => "complete",
                RecordedEvent::Teardown(_) => "teardown",
            })
            .collect();
        assert_eq!(
            kinds,
            ["capture", "capture", "compare", "frame", "play", "complete", "teardown"]
        );
        match events[4] {
            RecordedEvent::Play(e) => {
                assert_eq!(e.strategy, Strategy::Timer);
                assert_eq!(e.remaining, Duration::from_millis(100));
            }
            other => panic!("expected Play, got {other:?}"),
        }
    }
}
