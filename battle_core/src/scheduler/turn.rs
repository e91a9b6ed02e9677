//! Turn execution: selection, minigame, damage, suspension and delay

use super::TurnScheduler;
use crate::clock::WaitStep;
use crate::damage::resolve_damage_with_rng;
use crate::events::{BattleEvent, SkipReason};
use crate::minigame::{MinigameContext, MinigameRunner};
use crate::pause::PauseSource;
use crate::types::{ActionOutcome, BattleResult, CombatantId, Team, TurnState};
use rand::Rng;
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

impl TurnScheduler {
    /// Play turns until one side is left or the turn limit is reached
    pub async fn run(&mut self) -> BattleResult {
        loop {
            if let Some(result) = self.run_turn().await {
                return result;
            }
        }
    }

    /// Play a single turn
    ///
    /// Returns the result once the battle is over; later calls keep
    /// returning it without doing anything.
    pub async fn run_turn(&mut self) -> Option<BattleResult> {
        if let Some(result) = self.result {
            return Some(result);
        }

        self.prune_dead();
        if let Some(result) = self.check_end() {
            return Some(self.finish(result));
        }
        let Some(&actor) = self.order.get(self.cursor) else {
            return Some(self.finish(BattleResult::Draw));
        };

        self.turn += 1;
        self.set_state(TurnState::ActionSelecting);
        let id = self.combatants[actor].id().clone();
        debug!(combatant = %id, turn = self.turn, "turn started");
        self.session.emit(BattleEvent::TurnStarted {
            combatant: id.clone(),
            turn: self.turn,
        });

        match self.select_target(actor) {
            Ok(target) => {
                self.set_state(TurnState::ActionResolving);
                self.resolve_action(actor, target).await;
            }
            Err(reason) => self.skip(&id, reason),
        }

        self.set_state(TurnState::TurnComplete);
        self.set_state(TurnState::Idle);
        self.advance_cursor();

        if let Some(result) = self.check_end() {
            return Some(self.finish(result));
        }
        self.turn_delay().await;
        None
    }

    /// First living opponent in turn order
    fn select_target(&self, actor: usize) -> Result<usize, SkipReason> {
        let attacker = &self.combatants[actor];
        if attacker.stats().is_none() {
            return Err(SkipReason::MissingStats);
        }
        self.order
            .iter()
            .copied()
            .find(|&i| self.combatants[i].team != attacker.team && self.combatants[i].is_alive())
            .ok_or(SkipReason::NoTarget)
    }

    fn skip(&mut self, id: &CombatantId, reason: SkipReason) {
        warn!(combatant = %id, reason = ?reason, "action skipped");
        self.session.emit(BattleEvent::ActionSkipped {
            combatant: id.clone(),
            reason,
        });
    }

    async fn resolve_action(&mut self, actor: usize, target: usize) {
        // A cutscene or stray hitstop may still hold the gate
        self.settle_pause().await;

        let attacker = self.combatants[actor].id().clone();
        let outcome = match self.combatants[actor].action.minigame.clone() {
            Some(minigame) => match self.play_minigame(&attacker, &minigame).await {
                Some(outcome) => outcome,
                None => {
                    self.skip(&attacker, SkipReason::MissingMinigame(minigame));
                    return;
                }
            },
            None => ActionOutcome::Success,
        };

        let (amount, critical) = self.roll_damage(actor, target, outcome);
        let defender = self.combatants[target].id().clone();
        if let Some(change) = self.combatants[target].apply_damage(amount) {
            debug!(
                attacker = %attacker,
                target = %defender,
                amount,
                outcome = %outcome,
                critical,
                remaining = change.after,
                "damage applied"
            );
            self.session.emit(BattleEvent::DamageApplied {
                attacker: attacker.clone(),
                target: defender.clone(),
                amount,
                outcome,
                critical,
                remaining: change.after,
            });
            if change.died {
                info!(combatant = %defender, killer = %attacker, "combatant died");
                self.session.emit(BattleEvent::Death { combatant: defender });
            }
        }

        let hitstop = self.session.settings().hitstop();
        if amount > 0 && !hitstop.is_zero() {
            drop(self.session.clock().hitstop(hitstop));
        }

        self.settle_pause().await;
    }

    /// Run the combatant's minigame under the `Minigame` pause source
    ///
    /// `None` when the id cannot be instantiated.
    async fn play_minigame(&mut self, attacker: &CombatantId, minigame: &str) -> Option<ActionOutcome> {
        let seed = self.session.rng_mut().gen::<u64>();
        let mut game = match self.session.registry().create(minigame, seed) {
            Ok(game) => game,
            Err(e) => {
                error!(combatant = %attacker, error = %e, "minigame unavailable");
                return None;
            }
        };

        let deadline = self.session.settings().minigame_deadline();
        let ctx = MinigameContext::new(
            attacker.clone(),
            self.session.pause().clone(),
            self.session.inputs().subscribe(),
            deadline,
        );

        let guard = self.session.pause().guard(PauseSource::Minigame);
        self.suspend();
        self.session.emit(BattleEvent::MinigameStarted {
            combatant: attacker.clone(),
            minigame: minigame.to_string(),
            deadline_secs: deadline.as_secs_f64(),
        });

        let report = MinigameRunner::run(game.as_mut(), ctx).await;
        guard.release();

        self.session.emit(BattleEvent::MinigameFinished {
            combatant: attacker.clone(),
            minigame: minigame.to_string(),
            outcome: report.outcome,
            timed_out: report.timed_out,
        });
        self.resume().await;

        Some(report.outcome)
    }

    /// Final damage for `outcome`, and whether it crit
    fn roll_damage(&mut self, actor: usize, target: usize, outcome: ActionOutcome) -> (u32, bool) {
        if !self.session.outcomes().deals_damage(outcome) {
            debug!(outcome = %outcome, "outcome gates damage");
            return (0, false);
        }

        let (Some(attacker), Some(defender)) =
            (self.combatants[actor].stats(), self.combatants[target].stats())
        else {
            return (0, false);
        };
        let action = &self.combatants[actor].action;
        let roll = resolve_damage_with_rng(
            attacker,
            defender,
            action.raw_damage,
            action.element,
            self.session.rng_mut(),
        );
        debug!(roll = %roll.summary(), "damage rolled");

        (self.session.outcomes().scale(outcome, roll.amount), roll.is_critical)
    }

    fn suspend(&mut self) {
        self.set_state(TurnState::Suspended);
        self.session.emit(BattleEvent::PausedChanged { paused: true });
    }

    /// Leave `Suspended` once every pause source has released
    async fn resume(&mut self) {
        let pause = self.session.pause().clone();
        pause.wait_until_clear().await;
        self.set_state(TurnState::ActionResolving);
        self.session.emit(BattleEvent::PausedChanged { paused: false });
    }

    async fn settle_pause(&mut self) {
        if self.session.pause().is_paused() {
            debug!(sources = ?self.session.pause().snapshot().active_sources(), "turn suspended");
            self.suspend();
            self.resume().await;
        }
    }

    /// Scaled delay between turns; regeneration advances on the same ticks
    ///
    /// A pause held between turns freezes the delay and is reported to
    /// observers, but leaves the turn state at `Idle`.
    async fn turn_delay(&mut self) {
        let delay = self.session.settings().turn_delay();
        if delay.is_zero() {
            return;
        }

        let clock = self.session.clock().clone();
        let combatants = &mut self.combatants;
        let session = &mut self.session;
        let mut healed: BTreeMap<usize, u32> = BTreeMap::new();
        clock
            .wait_scaled(delay, |step| match step {
                WaitStep::Advanced(dt) => {
                    for (index, combatant) in combatants.iter_mut().enumerate() {
                        if !combatant.is_alive() {
                            continue;
                        }
                        if let Some(change) = combatant.tick_regen(dt) {
                            *healed.entry(index).or_insert(0) += change.gained();
                        }
                    }
                }
                WaitStep::Suspended => {
                    debug!("turn delay suspended");
                    session.emit(BattleEvent::PausedChanged { paused: true });
                }
                WaitStep::Resumed => session.emit(BattleEvent::PausedChanged { paused: false }),
            })
            .await;

        for (index, amount) in healed {
            let combatant = self.combatants[index].id().clone();
            self.session.emit(BattleEvent::Healed { combatant, amount });
        }
    }

    /// Drop combatants that died since the last pass
    fn prune_dead(&mut self) {
        let combatants = &self.combatants;
        let mut cursor = self.cursor;
        let mut position = 0;
        self.order.retain(|&index| {
            let keep = !combatants[index].is_dead();
            if !keep {
                debug!(combatant = %combatants[index].id(), "removed from turn order");
                if position < cursor {
                    cursor -= 1;
                }
            }
            position += 1;
            keep
        });
        self.cursor = if self.order.is_empty() {
            0
        } else {
            cursor % self.order.len()
        };
    }

    fn advance_cursor(&mut self) {
        if !self.order.is_empty() {
            self.cursor = (self.cursor + 1) % self.order.len();
        }
    }

    fn check_end(&self) -> Option<BattleResult> {
        let alive = |team: Team| {
            self.combatants
                .iter()
                .any(|c| c.team == team && c.is_alive())
        };

        match (alive(Team::Player), alive(Team::Enemy)) {
            (true, false) => Some(BattleResult::Victory(Team::Player)),
            (false, true) => Some(BattleResult::Victory(Team::Enemy)),
            (false, false) => Some(BattleResult::Draw),
            (true, true) => {
                let limit = self.session.settings().max_turns;
                (limit > 0 && self.turn >= limit).then_some(BattleResult::Draw)
            }
        }
    }

    fn finish(&mut self, result: BattleResult) -> BattleResult {
        if self.result.is_none() {
            self.result = Some(result);
            info!(result = ?result, turns = self.turn, "battle over");
            self.session.emit(BattleEvent::BattleEnded { result });
        }
        result
    }
}
