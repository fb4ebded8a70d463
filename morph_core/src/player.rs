// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Playback state machine.
//!
//! A [`Player`] owns both endpoint clones and drives them from `t = 0` to
//! `t = 1`. Frames come from one of two strategies, chosen when the player is
//! built:
//!
//! - [`Strategy::Keyframes`] — the remaining part of the transition is baked
//!   into two `@keyframes` rules and handed to the host's animation engine.
//!   The host reports each clone's end event through
//!   [`Player::animation_ended`].
//! - [`Strategy::Timer`] — the host calls [`Player::tick`] once per display
//!   frame and the player writes inline styles itself.
//!
//! Both strategies share the same state machine:
//!
//! ```text
//!   Idle ──play──▶ Playing ──pause/goto──▶ Paused ──play──▶ Playing
//!                     │                                        │
//!                     └──────── completion / teardown ─────────┴──▶ TornDown
//! ```
//!
//! `TornDown` is terminal: the clones are detached and the player ignores
//! every further call.

use alloc::boxed::Box;
use core::fmt;
use core::mem;

use crate::backend::Host;
use crate::clone::Proxy;
use crate::easing::Easing;
use crate::interpolate::Interpolators;
use crate::keyframes;
use crate::time::{Duration, HostTime};
use crate::trace::{CompleteEvent, PauseEvent, PlayEvent, TeardownEvent, TraceSink, Tracer};
use crate::transition::TransitionOptions;

/// Lifecycle state of a [`Player`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerState {
    /// Built but never played.
    Idle,
    /// Frames are being produced.
    Playing,
    /// Stopped mid-way; `play` resumes.
    Paused,
    /// Clones released. Terminal.
    TornDown,
}

/// How a player produces frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Generated `@keyframes` run by the host.
    Keyframes,
    /// Inline styles written on every [`Player::tick`].
    Timer,
}

/// Outcome of a [`Player::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tick {
    /// A frame was written; call `tick` again next frame.
    Continue,
    /// The transition completed during this tick.
    Finished,
    /// Nothing to do: not playing, or frames come from keyframes.
    Idle,
}

#[derive(Debug)]
enum Playback<S> {
    Stopped,
    Keyframes { sheet: S },
    Timer,
}

/// Drives one transition between two clones.
pub struct Player<H: Host> {
    from: Proxy<H::Node>,
    to: Proxy<H::Node>,
    interpolators: Interpolators,
    easing: Easing,
    duration: Duration,
    remaining: Duration,
    end_time: Option<HostTime>,
    keyframe_interval: Duration,
    strategy: Strategy,
    playback: Playback<H::Sheet>,
    state: PlayerState,
    pending_ends: u8,
    done: Option<Box<dyn FnOnce()>>,
    sink: Option<Box<dyn TraceSink>>,
}

impl<H: Host> fmt::Debug for Player<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("easing", &self.easing)
            .field("duration", &self.duration)
            .field("remaining", &self.remaining)
            .field("end_time", &self.end_time)
            .field("strategy", &self.strategy)
            .field("playback", &self.playback)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<H: Host> Player<H> {
    /// Builds an idle player over two inserted clones.
    ///
    /// The strategy is [`Strategy::Keyframes`] when the host runs keyframes
    /// natively and `options.use_timer` is unset.
    pub fn new(
        host: &H,
        from: Proxy<H::Node>,
        to: Proxy<H::Node>,
        interpolators: Interpolators,
        options: TransitionOptions,
    ) -> Self {
        let strategy = if host.supports_keyframes() && !options.use_timer {
            Strategy::Keyframes
        } else {
            Strategy::Timer
        };
        Self {
            from,
            to,
            interpolators,
            easing: options.easing,
            duration: options.duration,
            remaining: options.duration,
            end_time: None,
            keyframe_interval: options.keyframe_interval,
            strategy,
            playback: Playback::Stopped,
            state: PlayerState::Idle,
            pending_ends: 0,
            done: options.done,
            sink: options.sink,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Returns `true` while playing.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == PlayerState::Playing
    }

    /// How frames are produced. A keyframe player whose stylesheet could not
    /// be injected reports [`Strategy::Timer`] from then on.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Total length of the transition.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time left to play as of the last `play`, `pause` or `tick`.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// When the transition will end, while playing.
    #[must_use]
    pub fn end_time(&self) -> Option<HostTime> {
        self.end_time
    }

    /// The clone standing in for the `from` node.
    #[must_use]
    pub fn from_proxy(&self) -> &Proxy<H::Node> {
        &self.from
    }

    /// The clone standing in for the `to` node.
    #[must_use]
    pub fn to_proxy(&self) -> &Proxy<H::Node> {
        &self.to
    }

    /// Returns `true` if `node` is one of this player's clones (or an SVG
    /// wrapper around one).
    #[must_use]
    pub fn owns(&self, node: &H::Node) -> bool {
        self.from.owns(node) || self.to.owns(node)
    }

    /// Starts or resumes playback.
    ///
    /// The frame for the current position is written immediately. Does
    /// nothing while playing or after teardown.
    pub fn play(&mut self, host: &mut H) {
        if matches!(self.state, PlayerState::Playing | PlayerState::TornDown) {
            return;
        }
        let now = host.now();
        self.end_time = Some(now.saturating_add(self.remaining));
        self.state = PlayerState::Playing;
        self.apply(host, self.easing.apply(self.progress()));

        self.playback = match self.strategy {
            Strategy::Keyframes => match self.start_keyframes(host) {
                Some(sheet) => Playback::Keyframes { sheet },
                None => {
                    self.strategy = Strategy::Timer;
                    Playback::Timer
                }
            },
            Strategy::Timer => Playback::Timer,
        };

        let event = PlayEvent {
            at: now,
            remaining: self.remaining,
            strategy: self.strategy,
        };
        Tracer::from_boxed(&mut self.sink).play(&event);
    }

    /// Stops playback where it is.
    ///
    /// Keyframe animations are frozen: the clones' rendered values become
    /// inline styles and the stylesheet is removed. Does nothing unless
    /// playing.
    pub fn pause(&mut self, host: &mut H) {
        if self.state != PlayerState::Playing {
            return;
        }
        let now = host.now();
        if let Some(end) = self.end_time.take() {
            self.remaining = end.saturating_duration_since(now);
        }
        self.state = PlayerState::Paused;
        if let Playback::Keyframes { sheet } = mem::replace(&mut self.playback, Playback::Stopped) {
            self.from.freeze(host);
            self.to.freeze(host);
            host.remove_stylesheet(sheet);
        }

        let event = PauseEvent {
            at: now,
            remaining: self.remaining,
        };
        Tracer::from_boxed(&mut self.sink).pause(&event);
    }

    /// Pauses, then shows the transition at linear position `pos` (eased
    /// before sampling).
    pub fn goto(&mut self, host: &mut H, pos: f64) {
        if self.state == PlayerState::TornDown {
            return;
        }
        self.pause(host);
        self.apply(host, self.easing.apply(pos));
    }

    /// Advances timer playback to the host's current time.
    ///
    /// Completes the transition once its end time is reached.
    pub fn tick(&mut self, host: &mut H) -> Tick {
        if self.state != PlayerState::Playing || !matches!(self.playback, Playback::Timer) {
            return Tick::Idle;
        }
        let now = host.now();
        let end = self.end_time.unwrap_or(now);
        self.remaining = end.saturating_duration_since(now);
        if now >= end {
            self.finish(host);
            return Tick::Finished;
        }
        self.apply(host, self.easing.apply(self.progress()));
        Tick::Continue
    }

    /// Reports that the keyframe animation on `target` ended.
    ///
    /// The transition completes once both clones have reported. Events for
    /// other nodes are ignored. Returns `true` if this call completed it.
    pub fn animation_ended(&mut self, host: &mut H, target: &H::Node) -> bool {
        if self.state != PlayerState::Playing
            || !matches!(self.playback, Playback::Keyframes { .. })
            || !self.owns(target)
        {
            return false;
        }
        self.pending_ends = self.pending_ends.saturating_sub(1);
        if self.pending_ends > 0 {
            return false;
        }
        self.finish(host);
        true
    }

    /// Removes the clones and any stylesheet and drops the completion
    /// callback without calling it. Safe to call repeatedly.
    pub fn teardown(&mut self, host: &mut H) {
        if self.state == PlayerState::TornDown {
            return;
        }
        self.state = PlayerState::TornDown;
        self.end_time = None;
        self.done = None;
        if let Playback::Keyframes { sheet } = mem::replace(&mut self.playback, Playback::Stopped) {
            host.remove_stylesheet(sheet);
        }
        self.from.detach(host);
        self.to.detach(host);

        let event = TeardownEvent { at: host.now() };
        Tracer::from_boxed(&mut self.sink).teardown(&event);
    }

    fn finish(&mut self, host: &mut H) {
        let done = self.done.take();
        self.remaining = Duration::ZERO;
        let event = CompleteEvent { at: host.now() };
        Tracer::from_boxed(&mut self.sink).complete(&event);
        self.teardown(host);
        if let Some(done) = done {
            done();
        }
    }

    fn start_keyframes(&mut self, host: &mut H) -> Option<H::Sheet> {
        let set = keyframes::generate(
            &self.interpolators,
            &self.easing,
            self.remaining,
            self.duration,
            self.keyframe_interval,
        );
        let sheet = host.insert_stylesheet(&set.css)?;
        self.from
            .animate_with_keyframes(host, &set.from_name, self.remaining);
        self.to.animate_with_keyframes(host, &set.to_name, self.remaining);
        self.pending_ends = 2;
        Some(sheet)
    }

    /// Linear progress implied by `remaining`. A zero-length transition is
    /// always complete.
    fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let p = 1.0 - self.remaining.as_millis_f64() / self.duration.as_millis_f64();
        p.clamp(0.0, 1.0)
    }

    fn apply(&mut self, host: &mut H, t: f64) {
        let frame = self.interpolators.sample(t);
        self.from.set_opacity(host, frame.opacity.from);
        self.to.set_opacity(host, frame.opacity.to);
        self.from.set_transform(host, &frame.transform.from);
        self.to.set_transform(host, &frame.transform.to);
        if let Some(colors) = frame.background_color {
            self.from.set_background_color(host, colors.from);
            self.to.set_background_color(host, colors.to);
        }
        if let Some(radii) = &frame.border_radius {
            self.from.set_border_radius(host, &radii.from);
            self.to.set_border_radius(host, &radii.to);
        }

        #[cfg(feature = "trace-rich")]
        {
            let event = crate::trace::FrameEvent {
                at: host.now(),
                t,
                opacity_from: frame.opacity.from,
                opacity_to: frame.opacity.to,
            };
            Tracer::from_boxed(&mut self.sink).frame(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use kurbo::Rect;

    use super::*;
    use crate::document::{Document, NodeId};
    use crate::transition::transition;

    fn child(doc: &mut Document, parent: NodeId, styles: &[(&str, &str)]) -> NodeId {
        let node = doc.create_element("div");
        doc.set_styles(node, styles);
        doc.append(parent, node);
        node
    }

    /// Two 100×100 siblings, the second 200px to the right.
    fn siblings() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let a = child(&mut doc, body, &[("width", "100px"), ("height", "100px")]);
        let b = child(
            &mut doc,
            body,
            &[
                ("position", "relative"),
                ("left", "200px"),
                ("width", "100px"),
                ("height", "100px"),
            ],
        );
        (doc, a, b)
    }

    fn timer(ms: u64) -> TransitionOptions {
        TransitionOptions::default()
            .with_duration(Duration::from_millis(ms))
            .with_timer(true)
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let calls = Rc::new(Cell::new(0));
        let inner = calls.clone();
        (calls, move || inner.set(inner.get() + 1))
    }

    #[test]
    fn zero_duration_lands_on_destination() {
        let (mut doc, a, b) = siblings();
        let player = transition(&mut doc, &a, &b, timer(0)).unwrap();
        let clone = *player.from_proxy().clone_node();
        assert_eq!(
            doc.bounding_client_rect(&clone),
            Rect::new(200.0, 0.0, 300.0, 100.0),
            "from clone covers the destination box"
        );
        assert_eq!(doc.inline_style(&clone, "opacity"), "1");
    }

    #[test]
    fn timer_playback_runs_to_completion() {
        let (mut doc, a, b) = siblings();
        let (calls, done) = counter();
        let mut player = transition(&mut doc, &a, &b, timer(100).with_done(done)).unwrap();
        assert_eq!(player.strategy(), Strategy::Timer);
        assert_eq!(player.state(), PlayerState::Playing);
        let clone = *player.from_proxy().clone_node();

        doc.advance(Duration::from_millis(50));
        assert_eq!(player.tick(&mut doc), Tick::Continue);
        let rect = doc.bounding_client_rect(&clone);
        assert!((rect.x0 - 100.0).abs() < 1e-9, "halfway at linear easing: {rect:?}");
        assert_eq!(player.remaining(), Duration::from_millis(50));

        doc.advance(Duration::from_millis(50));
        assert_eq!(player.tick(&mut doc), Tick::Finished);
        assert_eq!(player.state(), PlayerState::TornDown);
        assert_eq!(calls.get(), 1);
        assert!(!doc.is_attached(clone));
        assert_eq!(player.tick(&mut doc), Tick::Idle);
        assert_eq!(calls.get(), 1, "done runs once");
    }

    #[test]
    fn pause_then_play_keeps_remaining() {
        let (mut doc, a, b) = siblings();
        let mut player = transition(&mut doc, &a, &b, timer(400)).unwrap();
        doc.advance(Duration::from_millis(100));
        player.pause(&mut doc);
        assert_eq!(player.state(), PlayerState::Paused);
        assert_eq!(player.remaining(), Duration::from_millis(300));
        assert_eq!(player.tick(&mut doc), Tick::Idle);

        doc.advance(Duration::from_millis(1_000));
        player.play(&mut doc);
        assert_eq!(player.remaining(), Duration::from_millis(300));
        let now = doc.now();
        assert_eq!(player.end_time(), Some(now + Duration::from_millis(300)));
    }

    #[test]
    fn teardown_twice_is_a_no_op() {
        let (mut doc, a, b) = siblings();
        let (calls, done) = counter();
        let mut player = transition(&mut doc, &a, &b, timer(400).with_done(done)).unwrap();
        let body = doc.body();
        assert_eq!(doc.children(&body).len(), 4);

        player.teardown(&mut doc);
        player.teardown(&mut doc);
        assert_eq!(player.state(), PlayerState::TornDown);
        assert_eq!(doc.children(&body), [a, b]);
        assert_eq!(calls.get(), 0, "teardown drops the callback");

        player.play(&mut doc);
        assert_eq!(player.state(), PlayerState::TornDown, "terminal");
    }

    #[test]
    fn goto_pauses_and_applies_the_eased_position() {
        let (mut doc, a, b) = siblings();
        let options = timer(400).with_easing(Easing::EaseIn);
        let mut player = transition(&mut doc, &a, &b, options).unwrap();
        player.goto(&mut doc, 0.5);
        assert_eq!(player.state(), PlayerState::Paused);
        let rect = doc.bounding_client_rect(player.from_proxy().clone_node());
        assert!((rect.x0 - 25.0).abs() < 1e-9, "ease-in of 0.5 is 0.125: {rect:?}");
    }

    #[test]
    fn keyframe_playback_waits_for_both_clones() {
        let (mut doc, a, b) = siblings();
        let (calls, done) = counter();
        let options = TransitionOptions::default().with_done(done);
        let mut player = transition(&mut doc, &a, &b, options).unwrap();
        assert_eq!(player.strategy(), Strategy::Keyframes);
        assert_eq!(doc.stylesheets().count(), 1);
        let from = *player.from_proxy().clone_node();
        let to = *player.to_proxy().clone_node();
        assert!(doc.inline_style(&from, "animation-name").starts_with("morph-"));
        assert_eq!(player.tick(&mut doc), Tick::Idle, "keyframes need no ticks");

        assert!(!player.animation_ended(&mut doc, &a), "foreign targets are ignored");
        assert!(!player.animation_ended(&mut doc, &from));
        assert_eq!(calls.get(), 0);
        assert!(player.animation_ended(&mut doc, &to));
        assert_eq!(calls.get(), 1);
        assert_eq!(doc.stylesheets().count(), 0);
        assert_eq!(player.state(), PlayerState::TornDown);
    }

    #[test]
    fn pausing_keyframes_freezes_and_drops_the_sheet() {
        let (mut doc, a, b) = siblings();
        let options = TransitionOptions::default().with_duration(Duration::from_millis(200));
        let mut player = transition(&mut doc, &a, &b, options).unwrap();
        let from = *player.from_proxy().clone_node();
        doc.advance(Duration::from_millis(50));
        player.pause(&mut doc);
        assert_eq!(doc.stylesheets().count(), 0);
        assert_eq!(doc.inline_style(&from, "animation"), "none");
        assert_eq!(player.remaining(), Duration::from_millis(150));

        player.play(&mut doc);
        assert_eq!(doc.stylesheets().count(), 1, "resuming bakes a new sheet");
        let name = doc.inline_style(&from, "animation-name");
        assert!(doc.stylesheets().any(|css| css.contains(&name)), "{name}");
    }

    #[test]
    fn missing_keyframe_support_selects_the_timer() {
        let (mut doc, a, b) = siblings();
        doc.set_keyframes_supported(false);
        let options = TransitionOptions::default().with_duration(Duration::from_millis(200));
        let player = transition(&mut doc, &a, &b, options).unwrap();
        assert_eq!(player.strategy(), Strategy::Timer);
        assert_eq!(doc.stylesheets().count(), 0);
    }
}
