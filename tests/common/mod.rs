//! Recording fakes for the host collaborators
#![allow(dead_code)]

use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use break_reminder::{
    config::DismissPolicy,
    error::{ReminderError, ReminderResult},
    events::Event,
    services::{
        AudioCue, Delivered, NotificationGateway, PresentationSurface, TimerKind, TimerRegistry,
        TimerToken,
    },
    state::{Alert, CountdownSession, ReminderScheduler},
    tasks::Coordinator,
};

pub const COUNTDOWN_SECONDS: u64 = 20;

#[derive(Debug, Default)]
pub struct TimerLog {
    pub installs: Vec<(TimerToken, Duration)>,
    pub cancels: Vec<TimerToken>,
    pub active: Vec<TimerToken>,
}

impl TimerLog {
    pub fn active_of(&self, kind: TimerKind) -> Vec<TimerToken> {
        self.active.iter().copied().filter(|t| t.kind == kind).collect()
    }

    pub fn installs_of(&self, kind: TimerKind) -> usize {
        self.installs.iter().filter(|(t, _)| t.kind == kind).count()
    }

    pub fn cancels_of(&self, kind: TimerKind) -> usize {
        self.cancels.iter().filter(|t| t.kind == kind).count()
    }
}

/// Timer registry that never fires on its own; tests deliver ticks by hand
pub struct ManualTimers {
    log: Arc<Mutex<TimerLog>>,
    generations: Arc<AtomicU64>,
    owned: HashSet<TimerToken>,
}

impl ManualTimers {
    pub fn new(log: Arc<Mutex<TimerLog>>, generations: Arc<AtomicU64>) -> Self {
        Self {
            log,
            generations,
            owned: HashSet::new(),
        }
    }
}

impl TimerRegistry for ManualTimers {
    fn install(&mut self, kind: TimerKind, period: Duration) -> TimerToken {
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let token = TimerToken { kind, generation };
        let mut log = self.log.lock().unwrap();
        log.installs.push((token, period));
        log.active.push(token);
        self.owned.insert(token);
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        if self.owned.remove(&token) {
            let mut log = self.log.lock().unwrap();
            log.cancels.push(token);
            log.active.retain(|t| *t != token);
        }
    }

    fn active(&self) -> usize {
        self.owned.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Clear(String),
    Notify { id: String, title: String, body: String },
}

#[derive(Default)]
pub struct RecordingGateway {
    pub calls: Mutex<Vec<GatewayCall>>,
    pub fail: AtomicBool,
}

impl RecordingGateway {
    pub fn notifications(&self) -> Vec<GatewayCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, GatewayCall::Notify { .. }))
            .cloned()
            .collect()
    }

    pub fn notify_count(&self) -> usize {
        self.notifications().len()
    }
}

impl NotificationGateway for RecordingGateway {
    fn notify(&self, id: &str, title: &str, body: &str) -> ReminderResult<Delivered> {
        self.calls.lock().unwrap().push(GatewayCall::Notify {
            id: id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });
        if self.fail.load(Ordering::SeqCst) {
            Err(ReminderError::delivery("transport closed"))
        } else {
            Ok(Delivered::now(id))
        }
    }

    fn clear_pending(&self, id: &str) {
        self.calls.lock().unwrap().push(GatewayCall::Clear(id.to_string()));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceCall {
    Show,
    Render(u64),
    Hide,
}

#[derive(Default)]
pub struct RecordingSurface {
    pub calls: Mutex<Vec<SurfaceCall>>,
}

impl RecordingSurface {
    pub fn count(&self, call: SurfaceCall) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    pub fn last(&self) -> Option<SurfaceCall> {
        self.calls.lock().unwrap().last().copied()
    }
}

impl PresentationSurface for RecordingSurface {
    fn show(&self) {
        self.calls.lock().unwrap().push(SurfaceCall::Show);
    }

    fn render(&self, remaining_seconds: u64) {
        self.calls.lock().unwrap().push(SurfaceCall::Render(remaining_seconds));
    }

    fn hide(&self) {
        self.calls.lock().unwrap().push(SurfaceCall::Hide);
    }
}

#[derive(Default)]
pub struct RecordingAudio {
    pub plays: AtomicUsize,
}

impl RecordingAudio {
    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl AudioCue for RecordingAudio {
    fn play_completion(&self) {
        self.plays.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Collaborators {
    pub gateway: Arc<RecordingGateway>,
    pub surface: Arc<RecordingSurface>,
    pub audio: Arc<RecordingAudio>,
}

impl Collaborators {
    pub fn new() -> Self {
        Self {
            gateway: Arc::new(RecordingGateway::default()),
            surface: Arc::new(RecordingSurface::default()),
            audio: Arc::new(RecordingAudio::default()),
        }
    }

    /// Build a coordinator on top of the given timer registries
    pub fn coordinator(
        &self,
        interval: Duration,
        policy: DismissPolicy,
        wake_up_timers: Box<dyn TimerRegistry>,
        countdown_timers: Box<dyn TimerRegistry>,
    ) -> Coordinator {
        let gateway: Arc<dyn NotificationGateway> = self.gateway.clone();
        let surface: Arc<dyn PresentationSurface> = self.surface.clone();
        let audio: Arc<dyn AudioCue> = self.audio.clone();

        let scheduler = ReminderScheduler::new(
            interval,
            Alert::break_reminder(COUNTDOWN_SECONDS),
            wake_up_timers,
            gateway,
        );
        let countdown = CountdownSession::new(countdown_timers, surface, audio);
        Coordinator::new(scheduler, countdown, COUNTDOWN_SECONDS, policy)
    }
}

/// Coordinator driven by manual timers
pub struct Harness {
    pub coordinator: Coordinator,
    pub timers: Arc<Mutex<TimerLog>>,
    pub fakes: Collaborators,
}

impl Harness {
    pub fn new(interval_seconds: u64, policy: DismissPolicy) -> Self {
        let timers = Arc::new(Mutex::new(TimerLog::default()));
        let generations = Arc::new(AtomicU64::new(0));
        let fakes = Collaborators::new();

        let coordinator = fakes.coordinator(
            Duration::from_secs(interval_seconds),
            policy,
            Box::new(ManualTimers::new(Arc::clone(&timers), Arc::clone(&generations))),
            Box::new(ManualTimers::new(Arc::clone(&timers), generations)),
        );

        Self {
            coordinator,
            timers,
            fakes,
        }
    }

    pub fn active(&self, kind: TimerKind) -> Vec<TimerToken> {
        self.timers.lock().unwrap().active_of(kind)
    }

    /// Fire the single active timer of `kind`
    pub fn fire(&mut self, kind: TimerKind) {
        let active = self.active(kind);
        assert_eq!(active.len(), 1, "expected exactly one active {:?} timer", kind);
        self.coordinator.handle(Event::Tick(active[0]));
    }

    pub fn fire_countdown(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.fire(TimerKind::Countdown);
        }
    }
}
