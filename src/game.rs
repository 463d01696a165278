//! Game orchestrator
//!
//! Owns the session together with everything the simulation must not touch:
//! the persistent profile, the key-value store and the score submitter.
//! After every frame it drains the session's events and performs the
//! matching side effects.

use crate::economy::{Profile, PurchaseError, RunSummary, ShopItem};
use crate::persistence::{AD_STATUS_KEY, KeyValueStore, load_profile, load_tuning, save_profile};
use crate::platform::{FrameClock, TouchGestures, action_for_key};
use crate::sim::{GameEvent, GameSession, InputAction, MysteryReward, RenderSnapshot};
use crate::submit::{ScoreSubmitter, SubmissionStatus, SubmitTarget};
use crate::tuning::Tuning;

pub struct Game<S: KeyValueStore, N: ScoreSubmitter> {
    pub session: GameSession,
    profile: Profile,
    store: S,
    submitter: N,
    /// Balance before upgrades are applied
    base_tuning: Tuning,
    clock: FrameClock,
    touch: TouchGestures,
    last_run: Option<RunSummary>,
}

impl<S: KeyValueStore, N: ScoreSubmitter> Game<S, N> {
    /// Balance comes from the store's tuning overrides, if present
    pub fn new(store: S, submitter: N, seed: u64) -> Self {
        let tuning = load_tuning(&store);
        Self::with_tuning(store, submitter, seed, tuning)
    }

    pub fn with_tuning(store: S, submitter: N, seed: u64, base_tuning: Tuning) -> Self {
        let profile = load_profile(&store);
        Self {
            session: GameSession::new(seed, base_tuning.upgraded(&profile.upgrades)),
            profile,
            store,
            submitter,
            base_tuning,
            clock: FrameClock::new(),
            touch: TouchGestures::new(),
            last_run: None,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn submitter(&self) -> &N {
        &self.submitter
    }

    pub fn submission_status(&self) -> SubmissionStatus {
        self.submitter.status()
    }

    /// Result of the most recent finished run
    pub fn last_run(&self) -> Option<RunSummary> {
        self.last_run
    }

    fn upgraded_tuning(&self) -> Tuning {
        self.base_tuning.upgraded(&self.profile.upgrades)
    }

    /// Start or restart a run with the current upgrades
    pub fn start_run(&mut self) {
        self.session.set_tuning(self.upgraded_tuning());
        self.session.start();
        self.clock.reset();
        self.process_events();
    }

    /// Animation-frame entry point: timestamp in, one clamped step
    pub fn frame(&mut self, now_ms: f64) {
        let dt = self.clock.frame_delta(now_ms);
        self.step(dt);
    }

    /// Advance by an explicit delta
    pub fn step(&mut self, dt: f32) {
        self.session.tick(dt);
        self.process_events();
    }

    pub fn apply(&mut self, action: InputAction) {
        self.session.apply(action);
    }

    /// Keyboard input; returns whether the key was bound
    pub fn key_down(&mut self, key: &str) -> bool {
        match action_for_key(key) {
            Some(action) => {
                self.session.apply(action);
                true
            }
            None => false,
        }
    }

    pub fn touch_start(&mut self, x: f32, y: f32, now_ms: f64) {
        if !self.session.is_running() {
            return;
        }
        if let Some(action) = self.touch.touch_start(x, y, now_ms) {
            self.session.apply(action);
        }
    }

    pub fn touch_end(&mut self, x: f32, y: f32) {
        if let Some(action) = self.touch.touch_end(x, y) {
            self.session.apply(action);
        }
    }

    /// Spend a headstart from the inventory, if the offer is open
    pub fn use_headstart(&mut self) -> bool {
        if !self.session.headstart_offer_open() || !self.profile.take_headstart() {
            return false;
        }
        self.save();
        self.session.activate_headstart();
        self.process_events();
        true
    }

    /// Buy from the shop by item id
    pub fn buy(&mut self, item_id: &str) -> Result<u64, PurchaseError> {
        let item = ShopItem::from_id(item_id)?;
        let cost = self.profile.buy(item).inspect_err(|e| {
            log::info!("Purchase of {item_id} refused: {e}");
        })?;
        self.save();
        if !self.session.is_running() {
            self.session.set_tuning(self.upgraded_tuning());
        }
        Ok(cost)
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        self.session.snapshot()
    }

    fn save(&mut self) {
        save_profile(&mut self.store, &self.profile);
    }

    fn process_events(&mut self) {
        for event in self.session.drain_events() {
            match event {
                GameEvent::MysteryBoxOpened(reward) => {
                    if reward == MysteryReward::Headstart {
                        self.profile.grant_headstart();
                    }
                    log::debug!("Mystery box: {reward:?}");
                    self.save();
                }
                GameEvent::RunEnded { score, coins } => self.finish_run(score, coins),
                _ => {}
            }
        }
    }

    fn finish_run(&mut self, score: u64, coins: u32) {
        let summary = self.profile.record_run(score, coins);
        if summary.new_high_score {
            log::info!("New high score: {score}");
        }
        self.save();
        self.last_run = Some(summary);

        if let Err(e) = self.store.set(AD_STATUS_KEY, "running") {
            log::warn!("Could not set {AD_STATUS_KEY}: {e}");
        }
        let target = SubmitTarget::from_store(&self.store);
        self.submitter.submit(&target, target.submission(score));
    }
}
