// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Times are
//! printed in milliseconds.

use std::io::Write;

use morph_core::time::{Duration, HostTime};
use morph_core::trace::{
    CaptureEvent, CompareEvent, CompleteEvent, FrameEvent, PauseEvent, PlayEvent, TeardownEvent,
    TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn ms(t: HostTime) -> f64 {
    Duration(t.micros()).as_millis_f64()
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_capture(&mut self, e: &CaptureEvent) {
        let r = e.bounding_box;
        let _ = writeln!(
            self.writer,
            "[capture] {:?} at {:.1}ms box=({:.1}, {:.1}) {:.1}×{:.1} opacity={}",
            e.endpoint,
            ms(e.at),
            r.x0,
            r.y0,
            r.width(),
            r.height(),
            e.opacity,
        );
    }

    fn on_compare(&mut self, e: &CompareEvent) {
        let _ = writeln!(
            self.writer,
            "[compare] at {:.1}ms from is {:?}",
            ms(e.at),
            e.order,
        );
    }

    fn on_play(&mut self, e: &PlayEvent) {
        let _ = writeln!(
            self.writer,
            "[play] at {:.1}ms remaining={:.1}ms strategy={:?}",
            ms(e.at),
            e.remaining.as_millis_f64(),
            e.strategy,
        );
    }

    fn on_pause(&mut self, e: &PauseEvent) {
        let _ = writeln!(
            self.writer,
            "[pause] at {:.1}ms remaining={:.1}ms",
            ms(e.at),
            e.remaining.as_millis_f64(),
        );
    }

    fn on_frame(&mut self, e: &FrameEvent) {
        let _ = writeln!(
            self.writer,
            "[frame] at {:.1}ms t={:.3} opacity={:.3}/{:.3}",
            ms(e.at),
            e.t,
            e.opacity_from,
            e.opacity_to,
        );
    }

    fn on_complete(&mut self, e: &CompleteEvent) {
        let _ = writeln!(self.writer, "[complete] at {:.1}ms", ms(e.at));
    }

    fn on_teardown(&mut self, e: &TeardownEvent) {
        let _ = writeln!(self.writer, "[teardown] at {:.1}ms", ms(e.at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use morph_core::stacking::StackingOrder;
    use morph_core::trace::Endpoint;

    #[test]
    fn pretty_print_capture() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_capture(&CaptureEvent {
            at: HostTime(1_500),
            endpoint: Endpoint::From,
            bounding_box: Rect::new(10.0, 20.0, 110.0, 70.0),
            opacity: 0.5,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.starts_with("[capture] From at 1.5ms"), "got: {output}");
        assert!(output.contains("box=(10.0, 20.0) 100.0×50.0"), "got: {output}");
        assert!(output.contains("opacity=0.5"), "got: {output}");
    }

    #[test]
    fn one_line_per_event() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_compare(&CompareEvent {
            at: HostTime(0),
            order: StackingOrder::Above,
        });
        sink.on_pause(&PauseEvent {
            at: HostTime(200_000),
            remaining: Duration::from_millis(150),
        });
        sink.on_teardown(&TeardownEvent {
            at: HostTime(250_000),
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3, "got: {output}");
        assert_eq!(lines[0], "[compare] at 0.0ms from is Above");
        assert_eq!(lines[1], "[pause] at 200.0ms remaining=150.0ms");
        assert_eq!(lines[2], "[teardown] at 250.0ms");
    }
}
